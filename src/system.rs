use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use arboard::Clipboard;

use crate::models::Template;
use crate::repo::TemplateStore;

const STORE_FILE: &str = "templates.json";
pub(crate) const LOG_FILE: &str = "ptb.log";

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("无法定位用户目录")]
    HomeNotFound,

    #[error("创建目录失败: {} ({source})", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("读取失败: {} ({source})", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("写入失败: {} ({source})", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("序列化失败: {source}")]
    Serialize { source: serde_json::Error },
}

/// File-backed store holding the whole template collection as one JSON
/// document. Absent or unparseable data loads as an empty collection.
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn open_default() -> Result<Self, StoreError> {
        Ok(Self {
            path: config_dir()?.join(STORE_FILE),
        })
    }

    #[cfg(test)]
    pub(crate) fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TemplateStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Template>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };
        match serde_json::from_str::<Vec<Template>>(&content) {
            Ok(templates) => Ok(templates),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    err = %err,
                    "忽略无法解析的模板文件"
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, templates: &[Template]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source: err,
            })?;
        }
        let json = serde_json::to_string_pretty(templates)
            .map_err(|err| StoreError::Serialize { source: err })?;
        fs::write(&self.path, json).map_err(|err| StoreError::Write {
            path: self.path.clone(),
            source: err,
        })?;
        tracing::debug!(path = %self.path.display(), count = templates.len(), "已写入模板文件");
        Ok(())
    }
}

pub(crate) fn set_clipboard(text: &str) -> Result<(), String> {
    Clipboard::new()
        .and_then(|mut cb| cb.set_text(text.to_string()))
        .map_err(|err| format!("复制失败: {err}"))
}

pub(crate) fn config_dir() -> Result<PathBuf, StoreError> {
    let home = env::var_os("USERPROFILE")
        .or_else(|| env::var_os("HOME"))
        .map(PathBuf::from)
        .ok_or(StoreError::HomeNotFound)?;
    Ok(home.join(".config").join("ptb"))
}
