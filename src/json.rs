//! Reference format: JSON text in, JSON text out, with object key order preserved.
use indexmap::IndexMap;
use tracing::trace;

use crate::coerce::{self, Coerced};
use crate::context::Traversal;
use crate::error::{Error, Result};
use crate::metadata::{ClassMetadata, PropertyMetadata};
use crate::node::{self, Node};
use crate::types::TypeDesc;
use crate::value::{Object, Value};
use crate::visitor::{DeserializationVisitor, DocumentStack, SerializationVisitor};

pub const FORMAT: &str = "json";

fn accept_lossy<T>(coerced: Coerced<T>, ty: &TypeDesc, cx: &Traversal<'_>) -> T {
    if coerced.lossy {
        trace!(ty = %ty, at = %cx.visiting_path(), "lossy coercion");
    }
    coerced.value
}

fn not_a_collection(kind: &str, ty: &TypeDesc, cx: &Traversal<'_>) -> Error {
    Error::Navigation(format!(
        "expected a collection for `{ty}`, got {kind} (at {})",
        cx.visiting_path()
    ))
}

// ————————————————————————————————————————————————————————————————————————————
// SERIALIZATION
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
pub struct JsonSerializationVisitor {
    stack: DocumentStack<IndexMap<String, Node>>,
    root: Option<Node>,
    pretty: bool,
}

impl JsonSerializationVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true, ..Self::default() }
    }

    /// `None` when the entry is dropped by the null policy.
    fn visit_entry(
        &mut self,
        value: &Value,
        ty: Option<&TypeDesc>,
        cx: &mut Traversal<'_>,
    ) -> Result<Option<Node>> {
        let node = cx.navigator().accept(value, ty, self, cx)?;
        if node.is_null() && !cx.should_serialize_null() {
            return Ok(None);
        }
        Ok(Some(node))
    }

    fn collect_entries(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        let element = ty.element();
        match (value, ty.is_map()) {
            (Value::List(xs), false) => {
                let mut out = Vec::with_capacity(xs.len());
                for x in xs {
                    out.extend(self.visit_entry(x, element, cx)?);
                }
                Ok(Node::Seq(out))
            }
            (Value::Map(m), false) => {
                let mut out = Vec::with_capacity(m.len());
                for x in m.values() {
                    out.extend(self.visit_entry(x, element, cx)?);
                }
                Ok(Node::Seq(out))
            }
            (Value::List(xs), true) => {
                let mut out = IndexMap::with_capacity(xs.len());
                for (i, x) in xs.iter().enumerate() {
                    if let Some(node) = self.visit_entry(x, element, cx)? {
                        out.insert(i.to_string(), node);
                    }
                }
                Ok(Node::Map(out))
            }
            (Value::Map(m), true) => {
                let mut out = IndexMap::with_capacity(m.len());
                for (k, x) in m {
                    if let Some(node) = self.visit_entry(x, element, cx)? {
                        out.insert(k.clone(), node);
                    }
                }
                Ok(Node::Map(out))
            }
            (other, _) => Err(not_a_collection(other.kind(), ty, cx)),
        }
    }

    fn current_object(&mut self, op: &str) -> Result<&mut IndexMap<String, Node>> {
        self.stack
            .current_mut()
            .ok_or_else(|| Error::StackDiscipline(format!("{op} outside of an object")))
    }
}

impl SerializationVisitor for JsonSerializationVisitor {
    fn initialize(&mut self) {
        self.stack.reset();
        self.root = None;
    }

    fn visit_null(&mut self, _ty: &TypeDesc, _cx: &mut Traversal<'_>) -> Result<Node> {
        Ok(Node::Null)
    }

    fn visit_bool(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        Ok(Node::Bool(accept_lossy(coerce::to_bool(value), ty, cx)))
    }

    fn visit_int(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        Ok(Node::Int(accept_lossy(coerce::to_int(value), ty, cx)))
    }

    fn visit_float(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        Ok(Node::Float(accept_lossy(coerce::to_float(value), ty, cx)))
    }

    fn visit_string(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        Ok(Node::Str(accept_lossy(coerce::to_string(value), ty, cx)))
    }

    fn visit_array(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        cx.start_visiting(ty.to_string());
        let result = self.collect_entries(value, ty, cx);
        cx.stop_visiting();
        result
    }

    fn start_visiting_object(
        &mut self,
        _class: &ClassMetadata,
        _object: &Object,
        _ty: &TypeDesc,
        _cx: &mut Traversal<'_>,
    ) -> Result<()> {
        self.stack.open(IndexMap::new());
        Ok(())
    }

    fn visit_property(
        &mut self,
        property: &PropertyMetadata,
        object: &Object,
        cx: &mut Traversal<'_>,
    ) -> Result<()> {
        let value = property.get_value(object);
        let node = cx.navigator().accept(&value, property.ty.as_ref(), self, cx)?;
        if node.is_null() && !cx.should_serialize_null() {
            return Ok(());
        }
        let key = cx.naming().translate_name(property);
        let current = self.current_object("visit_property")?;
        match node {
            Node::Map(fields) if property.inline => current.extend(fields),
            node => {
                current.insert(key, node);
            }
        }
        Ok(())
    }

    fn end_visiting_object(
        &mut self,
        _class: &ClassMetadata,
        _object: &Object,
        _ty: &TypeDesc,
        _cx: &mut Traversal<'_>,
    ) -> Result<Node> {
        Ok(Node::Map(self.stack.close()?))
    }

    fn has_data(&self, key: &str) -> bool {
        self.stack.current().is_some_and(|m| m.contains_key(key))
    }

    fn set_data(&mut self, key: &str, value: Node) -> Result<()> {
        self.current_object("set_data")?.insert(key.to_string(), value);
        Ok(())
    }

    fn open_depth(&self) -> usize {
        self.stack.depth()
    }

    fn set_result(&mut self, node: Node) {
        self.root = Some(node);
    }

    fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    fn take_result(&mut self) -> Option<Node> {
        self.root.take()
    }

    fn encode(&self, node: &Node) -> Result<String> {
        Ok(node::encode_json(node, self.pretty)?)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DESERIALIZATION
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
pub struct JsonDeserializationVisitor {
    stack: DocumentStack<Object>,
    result: Option<Value>,
}

impl JsonDeserializationVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_entries(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        let element = ty.element();
        let navigator = cx.navigator();
        match (data, ty.is_map()) {
            (Node::Map(m), true) => {
                let mut out = IndexMap::with_capacity(m.len());
                for (k, x) in m {
                    out.insert(k.clone(), navigator.accept_data(x, element, self, cx)?);
                }
                Ok(Value::Map(out))
            }
            (Node::Seq(xs), true) => {
                let mut out = IndexMap::with_capacity(xs.len());
                for (i, x) in xs.iter().enumerate() {
                    out.insert(i.to_string(), navigator.accept_data(x, element, self, cx)?);
                }
                Ok(Value::Map(out))
            }
            (Node::Seq(xs), false) => {
                let mut out = Vec::with_capacity(xs.len());
                for x in xs {
                    out.push(navigator.accept_data(x, element, self, cx)?);
                }
                Ok(Value::List(out))
            }
            (Node::Map(m), false) => {
                let mut out = Vec::with_capacity(m.len());
                for x in m.values() {
                    out.push(navigator.accept_data(x, element, self, cx)?);
                }
                Ok(Value::List(out))
            }
            (other, _) => Err(not_a_collection(other.kind(), ty, cx)),
        }
    }
}

impl DeserializationVisitor for JsonDeserializationVisitor {
    fn prepare(&self, input: &str) -> Result<Node> {
        let json: serde_json::Value =
            crate::path_de::from_str_with_path(input).map_err(|e| Error::Decoding(e.to_string()))?;
        Ok(Node::from_plain(json))
    }

    fn initialize(&mut self) {
        self.stack.reset();
        self.result = None;
    }

    fn visit_null(&mut self, _data: &Node, _ty: &TypeDesc, _cx: &mut Traversal<'_>) -> Result<Value> {
        Ok(Value::Null)
    }

    fn visit_bool(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        Ok(Value::Bool(accept_lossy(coerce::to_bool(data), ty, cx)))
    }

    fn visit_int(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        Ok(Value::Int(accept_lossy(coerce::to_int(data), ty, cx)))
    }

    fn visit_float(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        Ok(Value::Float(accept_lossy(coerce::to_float(data), ty, cx)))
    }

    fn visit_string(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        Ok(Value::Str(accept_lossy(coerce::to_string(data), ty, cx)))
    }

    fn visit_array(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        cx.start_visiting(ty.to_string());
        let result = self.collect_entries(data, ty, cx);
        cx.stop_visiting();
        result
    }

    fn start_visiting_object(
        &mut self,
        class: &ClassMetadata,
        data: &Node,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<()> {
        let object = cx.constructor().construct(class, data, ty);
        self.stack.open(object);
        Ok(())
    }

    fn visit_property(
        &mut self,
        property: &PropertyMetadata,
        data: &Node,
        cx: &mut Traversal<'_>,
    ) -> Result<()> {
        let navigator = cx.navigator();
        let value = if property.inline {
            // the inlined fields sit at this level, so the whole map is its data
            navigator.accept_data(data, property.ty.as_ref(), self, cx)?
        } else {
            let key = cx.naming().translate_name(property);
            let Some(raw) = data.as_map().and_then(|m| m.get(&key)) else {
                return Ok(());
            };
            navigator.accept_data(raw, property.ty.as_ref(), self, cx)?
        };
        let current = self
            .stack
            .current_mut()
            .ok_or_else(|| Error::StackDiscipline("visit_property outside of an object".into()))?;
        property.set_value(current, value);
        Ok(())
    }

    fn end_visiting_object(
        &mut self,
        _class: &ClassMetadata,
        _data: &Node,
        _ty: &TypeDesc,
        _cx: &mut Traversal<'_>,
    ) -> Result<Value> {
        Ok(Value::Object(self.stack.close()?))
    }

    fn open_depth(&self) -> usize {
        self.stack.depth()
    }

    fn set_result(&mut self, value: Value) {
        self.result = Some(value);
    }

    fn take_result(&mut self) -> Option<Value> {
        self.result.take()
    }
}
