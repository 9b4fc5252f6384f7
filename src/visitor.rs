//! Format visitors: the per-kind operations a navigator dispatches into, and the
//! explicit stack of open composites they build with.
use crate::context::Traversal;
use crate::error::{Error, Result};
use crate::metadata::{ClassMetadata, PropertyMetadata};
use crate::node::Node;
use crate::types::TypeDesc;
use crate::value::{Object, Value};

/// How the facade drives a visitor. Fixed per implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorProtocol {
    /// `initialize` → navigate → `set_result`; output is read back from the visitor.
    Staged,
    /// No initialization and no stored result; the navigator's return value is the output.
    Legacy,
}

pub trait SerializationVisitor {
    fn protocol(&self) -> VisitorProtocol {
        VisitorProtocol::Staged
    }

    /// Reset the open-composite stack and the stored result.
    fn initialize(&mut self) {}

    fn visit_null(&mut self, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node>;
    fn visit_bool(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node>;
    fn visit_int(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node>;
    fn visit_float(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node>;
    fn visit_string(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node>;

    /// Lists and maps. Two type parameters produce a map, anything else a sequence.
    fn visit_array(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node>;

    fn start_visiting_object(
        &mut self,
        class: &ClassMetadata,
        object: &Object,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<()>;

    fn visit_property(
        &mut self,
        property: &PropertyMetadata,
        object: &Object,
        cx: &mut Traversal<'_>,
    ) -> Result<()>;

    /// Must pair with exactly one `start_visiting_object`.
    fn end_visiting_object(
        &mut self,
        class: &ClassMetadata,
        object: &Object,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<Node>;

    /// Whether the object currently being built already has `key`.
    fn has_data(&self, key: &str) -> bool;

    /// Overwrite (or add) `key` on the object currently being built.
    fn set_data(&mut self, key: &str, value: Node) -> Result<()>;

    /// Number of composites started but not yet ended.
    fn open_depth(&self) -> usize;

    fn set_result(&mut self, node: Node);
    fn root(&self) -> Option<&Node>;
    fn take_result(&mut self) -> Option<Node>;

    /// Encode a finished document in this visitor's wire format.
    fn encode(&self, node: &Node) -> Result<String>;

    fn render(&self) -> Result<String> {
        match self.root() {
            Some(node) => self.encode(node),
            None => Err(Error::StackDiscipline("render called before a result was stored".into())),
        }
    }
}

pub trait DeserializationVisitor {
    fn protocol(&self) -> VisitorProtocol {
        VisitorProtocol::Staged
    }

    /// Parse raw input into the document shape the navigator walks.
    fn prepare(&self, input: &str) -> Result<Node>;

    fn initialize(&mut self) {}

    fn visit_null(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value>;
    fn visit_bool(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value>;
    fn visit_int(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value>;
    fn visit_float(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value>;
    fn visit_string(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value>;
    fn visit_array(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value>;

    fn start_visiting_object(
        &mut self,
        class: &ClassMetadata,
        data: &Node,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<()>;

    fn visit_property(
        &mut self,
        property: &PropertyMetadata,
        data: &Node,
        cx: &mut Traversal<'_>,
    ) -> Result<()>;

    fn end_visiting_object(
        &mut self,
        class: &ClassMetadata,
        data: &Node,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<Value>;

    fn open_depth(&self) -> usize;

    fn set_result(&mut self, value: Value);
    fn take_result(&mut self) -> Option<Value>;
}

// ————————————————————————————————————————————————————————————————————————————
// OPEN-COMPOSITE STACK
// ————————————————————————————————————————————————————————————————————————————

/// The composite currently being filled plus the parents parked beneath it.
#[derive(Debug, Clone)]
pub struct DocumentStack<T> {
    parked: Vec<T>,
    current: Option<T>,
}

impl<T> Default for DocumentStack<T> {
    fn default() -> Self {
        Self { parked: Vec::new(), current: None }
    }
}

impl<T> DocumentStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.parked.clear();
        self.current = None;
    }

    /// Park the current builder (if any) and make `fresh` current.
    pub fn open(&mut self, fresh: T) {
        if let Some(parent) = self.current.replace(fresh) {
            self.parked.push(parent);
        }
    }

    /// Hand back the current builder and restore its parent.
    pub fn close(&mut self) -> Result<T> {
        let done = self.current.take().ok_or_else(|| {
            Error::StackDiscipline("end_visiting_object without a matching start_visiting_object".into())
        })?;
        self.current = self.parked.pop();
        Ok(done)
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current.as_mut()
    }

    pub fn depth(&self) -> usize {
        self.parked.len() + usize::from(self.current.is_some())
    }
}
