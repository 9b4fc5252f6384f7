//! Per-call state: caller policies and attributes (`Context`), and the same context bound
//! to its collaborators for the duration of one traversal (`Traversal`).
use indexmap::IndexMap;

use crate::construct::ObjectConstructor;
use crate::metadata::MetadataSource;
use crate::naming::NamingStrategy;
use crate::navigator::Navigator;

/// Attribute key holding a textual type expression used when no explicit type is given.
pub const INITIAL_TYPE: &str = "initial_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Serialization,
    Deserialization,
}

/// Caller-owned options for one serialize/deserialize call. Never shared across calls.
#[derive(Debug, Clone)]
pub struct Context {
    direction: Direction,
    serialize_null: Option<bool>,
    attributes: IndexMap<String, Option<String>>,
}

impl Context {
    pub fn serialization() -> Self {
        Self::new(Direction::Serialization)
    }

    pub fn deserialization() -> Self {
        Self::new(Direction::Deserialization)
    }

    fn new(direction: Direction) -> Self {
        Self { direction, serialize_null: None, attributes: IndexMap::new() }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn with_serialize_null(mut self, include: bool) -> Self {
        self.serialize_null = Some(include);
        self
    }

    pub fn set_serialize_null(&mut self, include: Option<bool>) {
        self.serialize_null = include;
    }

    pub fn serialize_null(&self) -> Option<bool> {
        self.serialize_null
    }

    /// Nulls are written only when explicitly enabled; unset means omit.
    pub fn should_serialize_null(&self) -> bool {
        self.serialize_null == Some(true)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), Some(value.into()));
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Option<String>) {
        self.attributes.insert(key.into(), value);
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// `None` both for a missing key and for a key set without a value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_deref())
    }

    pub fn with_initial_type(self, ty: impl Into<String>) -> Self {
        self.with_attribute(INITIAL_TYPE, ty)
    }

    pub fn initial_type(&self) -> Option<&str> {
        self.attribute(INITIAL_TYPE)
    }
}

/// Supplies the context used when a caller passes none.
pub trait ContextFactory: Send + Sync {
    fn serialization_context(&self) -> Context;
    fn deserialization_context(&self) -> Context;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContextFactory {
    pub serialize_null: Option<bool>,
}

impl ContextFactory for DefaultContextFactory {
    fn serialization_context(&self) -> Context {
        let mut ctx = Context::serialization();
        ctx.set_serialize_null(self.serialize_null);
        ctx
    }

    fn deserialization_context(&self) -> Context {
        let mut ctx = Context::deserialization();
        ctx.set_serialize_null(self.serialize_null);
        ctx
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TRAVERSAL
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub navigator: &'a dyn Navigator,
    pub metadata: &'a dyn MetadataSource,
    pub naming: &'a dyn NamingStrategy,
    pub constructor: &'a dyn ObjectConstructor,
}

/// A `Context` bound to the format and collaborators of a single traversal.
pub struct Traversal<'a> {
    context: Context,
    format: String,
    with: Collaborators<'a>,
    visiting: Vec<String>,
}

impl<'a> Traversal<'a> {
    pub fn new(context: Context, format: impl Into<String>, with: Collaborators<'a>) -> Self {
        Self { context, format: format.into(), with, visiting: Vec::new() }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn direction(&self) -> Direction {
        self.context.direction()
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn should_serialize_null(&self) -> bool {
        self.context.should_serialize_null()
    }

    pub fn navigator(&self) -> &'a dyn Navigator {
        self.with.navigator
    }

    pub fn metadata(&self) -> &'a dyn MetadataSource {
        self.with.metadata
    }

    pub fn naming(&self) -> &'a dyn NamingStrategy {
        self.with.naming
    }

    pub fn constructor(&self) -> &'a dyn ObjectConstructor {
        self.with.constructor
    }

    /// Enter a container (class name or collection type); diagnostics only.
    pub fn start_visiting(&mut self, marker: impl Into<String>) {
        self.visiting.push(marker.into());
    }

    pub fn stop_visiting(&mut self) {
        self.visiting.pop();
    }

    pub fn depth(&self) -> usize {
        self.visiting.len()
    }

    /// `User -> list<Address> -> Address`
    pub fn visiting_path(&self) -> String {
        if self.visiting.is_empty() {
            return "<root>".into();
        }
        self.visiting.join(" -> ")
    }
}
