use std::collections::HashMap;

use draftwise_core::{DraftwiseError, Value};
use regex::Regex;

/// A prompt with `{{name}}` placeholders. Unknown placeholders render empty.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, vars: &HashMap<String, Value>) -> Result<String, DraftwiseError> {
        let pattern = placeholder_pattern()?;
        let rendered = pattern.replace_all(&self.template, |caps: &regex::Captures| {
            let key = &caps[1];
            match vars.get(key) {
                Some(value) => value
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| value.to_string()),
                None => String::new(),
            }
        });
        Ok(rendered.to_string())
    }

    /// Renders from string pairs, for the common case of plain-text variables.
    pub fn render_str(&self, vars: &[(&str, &str)]) -> Result<String, DraftwiseError> {
        let map = vars
            .iter()
            .map(|(key, value)| (key.to_string(), Value::from(*value)))
            .collect();
        self.render(&map)
    }
}

fn placeholder_pattern() -> Result<Regex, DraftwiseError> {
    Regex::new(r"\{\{\s*(\w+)\s*\}\}").map_err(|e| DraftwiseError::InvalidConfig(e.to_string()))
}
