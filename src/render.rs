use crate::models::{DEFAULT_XML_TAG, Field};

// Deterministic: the same field sequence always produces the same document.
// Fields whose content is blank after trimming are skipped entirely.
pub(crate) fn render(fields: &[Field]) -> String {
    let mut output = String::new();
    for field in fields {
        if field.content().trim().is_empty() {
            continue;
        }

        if let Some(label) = field.label() {
            if !label.is_empty() {
                output.push_str(label);
                output.push_str("\n\n");
            }
        }

        match field {
            Field::Text { content, .. } => {
                output.push_str(content);
                output.push_str("\n\n");
            }
            Field::List { content, .. } => {
                let items = content.split('\n').filter(|item| !item.trim().is_empty());
                for (index, item) in items.enumerate() {
                    output.push_str(&format!("{}. {item}\n", index + 1));
                }
                output.push('\n');
            }
            Field::Xml { content, tag, .. } => {
                let tag = if tag.is_empty() { DEFAULT_XML_TAG } else { tag };
                output.push_str(&format!("<{tag}>\n{content}\n</{tag}>\n\n"));
            }
            Field::Filepath { content, .. } => {
                output.push_str(&format!("Filepath: {content}\n\n"));
            }
        }
    }
    output.trim_end().to_string()
}
