use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_TEMPLATE_NAME: &str = "New Template";
pub(crate) const UNNAMED_TEMPLATE_NAME: &str = "Unnamed Template";
pub(crate) const DEFAULT_XML_TAG: &str = "tag";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    List,
    Xml,
    Filepath,
}

impl FieldKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::List => "List",
            FieldKind::Xml => "XML",
            FieldKind::Filepath => "Filepath",
        }
    }

    /// Placeholder hint shown in the content input of each kind.
    pub(crate) fn content_hint(self) -> &'static str {
        match self {
            FieldKind::Text => "Content",
            FieldKind::List => "List Items (one per line)",
            FieldKind::Xml => "Content (will be wrapped in XML tags)",
            FieldKind::Filepath => "Directory or file location",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum Field {
    Text {
        id: String,
        #[serde(default)]
        label: String,
        #[serde(default)]
        content: String,
    },
    List {
        id: String,
        #[serde(default)]
        label: String,
        #[serde(default)]
        content: String,
    },
    Xml {
        id: String,
        #[serde(default)]
        label: String,
        #[serde(default)]
        content: String,
        #[serde(rename = "xmlTag", default = "default_xml_tag")]
        tag: String,
    },
    Filepath {
        id: String,
        #[serde(default)]
        content: String,
    },
}

fn default_xml_tag() -> String {
    DEFAULT_XML_TAG.to_string()
}

impl Field {
    pub(crate) fn new(kind: FieldKind, id: String) -> Self {
        match kind {
            FieldKind::Text => Field::Text {
                id,
                label: String::new(),
                content: String::new(),
            },
            FieldKind::List => Field::List {
                id,
                label: String::new(),
                content: String::new(),
            },
            FieldKind::Xml => Field::Xml {
                id,
                label: String::new(),
                content: String::new(),
                tag: DEFAULT_XML_TAG.to_string(),
            },
            FieldKind::Filepath => Field::Filepath {
                id,
                content: String::new(),
            },
        }
    }

    pub(crate) fn id(&self) -> &str {
        match self {
            Field::Text { id, .. }
            | Field::List { id, .. }
            | Field::Xml { id, .. }
            | Field::Filepath { id, .. } => id,
        }
    }

    pub(crate) fn kind(&self) -> FieldKind {
        match self {
            Field::Text { .. } => FieldKind::Text,
            Field::List { .. } => FieldKind::List,
            Field::Xml { .. } => FieldKind::Xml,
            Field::Filepath { .. } => FieldKind::Filepath,
        }
    }

    pub(crate) fn content(&self) -> &str {
        match self {
            Field::Text { content, .. }
            | Field::List { content, .. }
            | Field::Xml { content, .. }
            | Field::Filepath { content, .. } => content,
        }
    }

    pub(crate) fn content_mut(&mut self) -> &mut String {
        match self {
            Field::Text { content, .. }
            | Field::List { content, .. }
            | Field::Xml { content, .. }
            | Field::Filepath { content, .. } => content,
        }
    }

    pub(crate) fn label(&self) -> Option<&str> {
        match self {
            Field::Text { label, .. } | Field::List { label, .. } | Field::Xml { label, .. } => {
                Some(label)
            }
            Field::Filepath { .. } => None,
        }
    }

    pub(crate) fn label_mut(&mut self) -> Option<&mut String> {
        match self {
            Field::Text { label, .. } | Field::List { label, .. } | Field::Xml { label, .. } => {
                Some(label)
            }
            Field::Filepath { .. } => None,
        }
    }

    pub(crate) fn tag_mut(&mut self) -> Option<&mut String> {
        match self {
            Field::Xml { tag, .. } => Some(tag),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Template {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) fields: Vec<Field>,
}

impl Template {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            name: DEFAULT_TEMPLATE_NAME.to_string(),
            fields: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_serializes_with_lowercase_type_tag() {
        let field = Field::new(FieldKind::Text, "1".to_string());
        let json: serde_json::Value = serde_json::to_value(&field).expect("to_value");
        assert_eq!(json["type"], "text");
        assert_eq!(json["id"], "1");
        assert_eq!(json["label"], "");
        assert_eq!(json["content"], "");
    }

    #[test]
    fn xml_tag_serializes_under_camel_case_key() {
        let field = Field::new(FieldKind::Xml, "2".to_string());
        let json: serde_json::Value = serde_json::to_value(&field).expect("to_value");
        assert_eq!(json["type"], "xml");
        assert_eq!(json["xmlTag"], "tag");
        assert!(json.get("tag").is_none());
    }

    #[test]
    fn missing_xml_tag_defaults_on_deserialize() {
        let raw = r#"{"type":"xml","id":"3","label":"","content":"body"}"#;
        let field: Field = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(
            field,
            Field::Xml {
                id: "3".to_string(),
                label: String::new(),
                content: "body".to_string(),
                tag: "tag".to_string(),
            }
        );
    }

    #[test]
    fn missing_label_and_content_default_to_empty() {
        let raw = r#"{"type":"list","id":"4"}"#;
        let field: Field = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(field.label(), Some(""));
        assert_eq!(field.content(), "");
    }

    #[test]
    fn filepath_carries_no_label() {
        let mut field = Field::new(FieldKind::Filepath, "5".to_string());
        assert_eq!(field.label(), None);
        assert!(field.label_mut().is_none());
        assert!(field.tag_mut().is_none());
    }

    #[test]
    fn template_round_trips() {
        let template = Template {
            id: "1700000000000".to_string(),
            name: "Review".to_string(),
            fields: vec![
                Field::new(FieldKind::Text, "1".to_string()),
                Field::new(FieldKind::Xml, "2".to_string()),
            ],
        };
        let json = serde_json::to_string(&template).expect("serialize");
        let restored: Template = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, template);
    }

    #[test]
    fn new_template_uses_default_name() {
        let template = Template::new("42".to_string());
        assert_eq!(template.name, DEFAULT_TEMPLATE_NAME);
        assert!(template.fields.is_empty());
    }
}
