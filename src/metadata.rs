//! Pre-resolved class metadata. Where it comes from (attributes, config files, codegen)
//! is someone else's problem; the engine only asks for it by class name.
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::TypeDesc;
use crate::value::{Object, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,
    /// Declared type; `None` lets the navigator infer from the runtime value.
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDesc>,
    #[serde(default)]
    pub serialized_name: Option<String>,
    /// Merge this property's map into the parent instead of nesting it.
    #[serde(default)]
    pub inline: bool,
}

impl PropertyMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ty: None, serialized_name: None, inline: false }
    }

    pub fn typed(name: impl Into<String>, ty: &str) -> Result<Self> {
        Ok(Self { ty: Some(TypeDesc::parse(ty)?), ..Self::new(name) })
    }

    pub fn serialized_as(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    pub fn inlined(mut self) -> Self {
        self.inline = true;
        self
    }

    /// Runtime value of this property on `object`; an unset field reads as null.
    pub fn get_value(&self, object: &Object) -> Value {
        object.read(&self.name).clone()
    }

    pub fn set_value(&self, object: &mut Object, value: Value) {
        object.set(self.name.clone(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassMetadata {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyMetadata>,
}

impl ClassMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), properties: Vec::new() }
    }

    pub fn property(mut self, property: PropertyMetadata) -> Self {
        self.properties.push(property);
        self
    }
}

/// Lookup of class metadata by type name.
pub trait MetadataSource: Send + Sync {
    fn class_metadata(&self, class: &str) -> Option<&ClassMetadata>;
}

/// In-memory metadata keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    classes: IndexMap<String, ClassMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: ClassMetadata) -> &mut Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn with(mut self, class: ClassMetadata) -> Self {
        self.register(class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Load `{ "<Class>": { "properties": [ ... ] }, ... }`.
    pub fn from_json(src: &str) -> Result<Self> {
        let raw: IndexMap<String, ClassMetadata> =
            crate::path_de::from_str_with_path(src).map_err(|e| Error::Config(e.to_string()))?;
        let mut registry = Self::new();
        for (name, mut class) in raw {
            class.name = name;
            registry.register(class);
        }
        Ok(registry)
    }
}

impl MetadataSource for MetadataRegistry {
    fn class_metadata(&self, class: &str) -> Option<&ClassMetadata> {
        self.classes.get(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_registry_from_json() {
        let registry = MetadataRegistry::from_json(r#"{
            "User": { "properties": [
                { "name": "id", "type": "int" },
                { "name": "tags", "type": "list<string>", "serialized_name": "labels" },
                { "name": "address", "type": "Address", "inline": true }
            ]},
            "Address": {}
        }"#).unwrap();

        assert_eq!(registry.len(), 2);
        let user = registry.class_metadata("User").unwrap();
        assert_eq!(user.name, "User");
        assert_eq!(user.properties[1].serialized_name.as_deref(), Some("labels"));
        assert_eq!(user.properties[1].ty.as_ref().unwrap().to_string(), "list<string>");
        assert!(user.properties[2].inline);
        assert!(registry.class_metadata("Address").unwrap().properties.is_empty());
    }

    #[test]
    fn config_errors_carry_the_json_path() {
        let err = MetadataRegistry::from_json(r#"{"User": {"properties": [{"name": "id", "type": "list<"}]}}"#)
            .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::Config(_)));
        assert!(msg.contains("User.properties[0].type"), "{msg}");
    }

    #[test]
    fn accessor_reads_unset_fields_as_null() {
        let prop = PropertyMetadata::new("name");
        let mut obj = Object::new("User");
        assert_eq!(prop.get_value(&obj), Value::Null);
        prop.set_value(&mut obj, Value::from("ada"));
        assert_eq!(prop.get_value(&obj), Value::from("ada"));
    }
}
