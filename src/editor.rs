use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Field, FieldKind, Template, UNNAMED_TEMPLATE_NAME};
use crate::repo::TemplateRepository;
use crate::system::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MoveDirection {
    Up,
    Down,
}

/// Editing session. `current` is `None` until a template is created or
/// loaded; field ids come from a session counter that is never reused while
/// the template stays open.
#[derive(Clone, Debug)]
pub(crate) struct Editor {
    current: Option<Template>,
    next_field_id: u64,
}

impl Editor {
    pub(crate) fn new() -> Self {
        Self {
            current: None,
            next_field_id: 1,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.current.is_some()
    }

    pub(crate) fn current(&self) -> Option<&Template> {
        self.current.as_ref()
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut Template> {
        self.current.as_mut()
    }

    pub(crate) fn new_template(&mut self) {
        self.current = Some(Template::new(new_template_id()));
        self.next_field_id = 1;
    }

    pub(crate) fn load_template(&mut self, repo: &TemplateRepository, id: &str) {
        let Some(template) = repo.get_by_id(id) else {
            return;
        };
        self.next_field_id = next_field_id_for(&template.fields);
        self.current = Some(template.clone());
    }

    pub(crate) fn add_field(&mut self, kind: FieldKind) -> String {
        if self.current.is_none() {
            self.new_template();
        }
        let id = self.next_field_id.to_string();
        self.next_field_id += 1;
        if let Some(template) = self.current.as_mut() {
            template.fields.push(Field::new(kind, id.clone()));
        }
        id
    }

    pub(crate) fn remove_field(&mut self, id: &str) {
        if let Some(template) = self.current.as_mut() {
            template.fields.retain(|field| field.id() != id);
        }
    }

    pub(crate) fn move_field(&mut self, id: &str, direction: MoveDirection) {
        let Some(template) = self.current.as_mut() else {
            return;
        };
        let Some(position) = template.fields.iter().position(|field| field.id() == id) else {
            return;
        };
        match direction {
            MoveDirection::Up if position > 0 => {
                template.fields.swap(position, position - 1);
            }
            MoveDirection::Down if position + 1 < template.fields.len() => {
                template.fields.swap(position, position + 1);
            }
            _ => {}
        }
    }

    /// Persists the open template, returning `Ok(false)` when nothing is
    /// open. A blank name becomes the unnamed fallback, also in memory.
    pub(crate) fn save(&mut self, repo: &mut TemplateRepository) -> Result<bool, StoreError> {
        let Some(template) = self.current.as_mut() else {
            return Ok(false);
        };
        if template.name.is_empty() {
            template.name = UNNAMED_TEMPLATE_NAME.to_string();
        }
        repo.upsert(template.clone())?;
        Ok(true)
    }

    pub(crate) fn delete(
        &mut self,
        repo: &mut TemplateRepository,
        id: &str,
    ) -> Result<(), StoreError> {
        repo.delete(id)?;
        if self.current.as_ref().is_some_and(|template| template.id == id) {
            self.current = None;
        }
        Ok(())
    }
}

fn new_template_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    millis.to_string()
}

fn next_field_id_for(fields: &[Field]) -> u64 {
    fields
        .iter()
        .filter_map(|field| field.id().parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}
