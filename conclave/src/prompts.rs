//! Prompt template registry and placeholder substitution.

use std::collections::HashMap;

use tracing::debug;

use crate::config::default_prompts;

/// Keyed prompt templates. A missing key renders as an empty string.
#[derive(Debug, Clone, Default)]
pub struct PromptTemplates {
    templates: HashMap<String, String>,
}

impl PromptTemplates {
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Built-in templates, with `overrides` replacing entries of the same key.
    pub fn with_defaults(overrides: &HashMap<String, String>) -> Self {
        let mut templates = default_prompts();
        templates.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { templates }
    }

    pub fn get(&self, key: &str) -> &str {
        match self.templates.get(key) {
            Some(t) => t,
            None => {
                debug!(template = key, "prompt template missing, using empty text");
                ""
            }
        }
    }

    pub fn render(&self, key: &str, values: &[(&str, &str)]) -> String {
        render_template(self.get(key), values)
    }
}

/// Substitute `{name}` placeholders.
///
/// `{{` and `}}` produce literal braces. Placeholders with no matching value
/// are copied through unchanged.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            match tail[1..].find('}') {
                Some(end) => {
                    let name = &tail[1..1 + end];
                    match values.iter().find(|(k, _)| *k == name) {
                        Some((_, value)) => out.push_str(value),
                        None => out.push_str(&tail[..end + 2]),
                    }
                    rest = &tail[end + 2..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        } else {
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
