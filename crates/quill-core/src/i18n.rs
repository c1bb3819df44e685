//! Localized text lookup.
//!
//! Panels never format user-facing strings themselves. They ask a
//! [`TextLookup`] for a key plus named arguments. [`TextBundle`] is the stock
//! implementation over a flat key-to-template map.

use std::collections::HashMap;

use crate::error::{QuillError, Result};

/// Source of localized strings.
pub trait TextLookup: Send + Sync {
    /// Resolve `key`, substituting `{{name}}` placeholders from `args`.
    fn text(&self, key: &str, args: &[(&str, String)]) -> String;
}

/// Flat key -> template map with `{{name}}` interpolation.
///
/// Unknown keys resolve to the key itself so missing translations stay
/// visible instead of rendering blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBundle {
    entries: HashMap<String, String>,
}

impl TextBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a TOML document. Nested tables become dotted keys, so
    /// `[grammarChecker] error = "..."` is looked up as `grammarChecker.error`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(content)?;
        let mut bundle = Self::new();
        flatten_toml("", &value, &mut bundle)?;
        Ok(bundle)
    }

    /// Parse a nested JSON resource file of the kind web i18n tooling emits.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let mut bundle = Self::new();
        flatten_json("", &value, &mut bundle)?;
        Ok(bundle)
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_toml(prefix: &str, value: &toml::Value, bundle: &mut TextBundle) -> Result<()> {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                flatten_toml(&join_key(prefix, key), child, bundle)?;
            }
            Ok(())
        }
        toml::Value::String(s) => {
            bundle.insert(prefix, s.clone());
            Ok(())
        }
        other => Err(QuillError::TextBundle(format!(
            "{}: expected a string, found {}",
            prefix,
            other.type_str()
        ))),
    }
}

fn flatten_json(prefix: &str, value: &serde_json::Value, bundle: &mut TextBundle) -> Result<()> {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                flatten_json(&join_key(prefix, key), child, bundle)?;
            }
            Ok(())
        }
        serde_json::Value::String(s) => {
            bundle.insert(prefix, s.clone());
            Ok(())
        }
        other => Err(QuillError::TextBundle(format!(
            "{}: expected a string, found {}",
            prefix, other
        ))),
    }
}

/// Replace every `{{name}}` with the matching argument. Unmatched
/// placeholders are left as written.
fn interpolate(template: &str, args: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{{{}}}}}", name), value);
    }
    out
}

impl TextLookup for TextBundle {
    fn text(&self, key: &str, args: &[(&str, String)]) -> String {
        match self.entries.get(key) {
            Some(template) => interpolate(template, args),
            None => key.to_string(),
        }
    }
}
