//! Property name → wire key translation.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::metadata::PropertyMetadata;

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

pub trait NamingStrategy: Send + Sync {
    fn translate_name(&self, property: &PropertyMetadata) -> String;
}

/// Keys are the property names as declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdenticalNaming;

impl NamingStrategy for IdenticalNaming {
    fn translate_name(&self, property: &PropertyMetadata) -> String {
        property.name.clone()
    }
}

/// `firstName` → `first_name` (separator and casing configurable).
#[derive(Debug, Clone)]
pub struct CamelCaseNaming {
    pub separator: String,
    pub lower_case: bool,
}

impl Default for CamelCaseNaming {
    fn default() -> Self {
        Self { separator: "_".into(), lower_case: true }
    }
}

impl NamingStrategy for CamelCaseNaming {
    fn translate_name(&self, property: &PropertyMetadata) -> String {
        let replacement = format!("${{1}}{}${{2}}", self.separator);
        let split = CAMEL_BOUNDARY.replace_all(&property.name, replacement.as_str());
        if self.lower_case { split.to_lowercase() } else { split.into_owned() }
    }
}

/// An explicit `serialized_name` wins; everything else goes to the wrapped strategy.
#[derive(Debug, Clone, Default)]
pub struct SerializedNameNaming<S> {
    pub fallback: S,
}

impl<S> SerializedNameNaming<S> {
    pub fn new(fallback: S) -> Self {
        Self { fallback }
    }
}

impl<S: NamingStrategy> NamingStrategy for SerializedNameNaming<S> {
    fn translate_name(&self, property: &PropertyMetadata) -> String {
        match &property.serialized_name {
            Some(name) => name.clone(),
            None => self.fallback.translate_name(property),
        }
    }
}
