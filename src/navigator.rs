//! Traversal driver: decides, per value and declared type, which visitor operation runs.
use tracing::trace;

use crate::context::Traversal;
use crate::error::{Error, Result};
use crate::metadata::{ClassMetadata, MetadataSource};
use crate::node::Node;
use crate::types::TypeDesc;
use crate::value::{Object, Value};
use crate::visitor::{DeserializationVisitor, SerializationVisitor};

pub trait Navigator: Send + Sync {
    /// Serialize `value`; a missing type is inferred from the runtime value.
    fn accept(
        &self,
        value: &Value,
        ty: Option<&TypeDesc>,
        visitor: &mut dyn SerializationVisitor,
        cx: &mut Traversal<'_>,
    ) -> Result<Node>;

    /// Rebuild a value from `data`; a missing type is inferred from the node kind.
    fn accept_data(
        &self,
        data: &Node,
        ty: Option<&TypeDesc>,
        visitor: &mut dyn DeserializationVisitor,
        cx: &mut Traversal<'_>,
    ) -> Result<Value>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Collection,
    Class,
}

/// Registered classes shadow the built-in names.
fn kind_of(ty: &TypeDesc, metadata: &dyn MetadataSource) -> Kind {
    if metadata.class_metadata(&ty.name).is_some() {
        return Kind::Class;
    }
    if ty.is(&["null"]) {
        Kind::Null
    } else if ty.is(&["bool", "boolean"]) {
        Kind::Bool
    } else if ty.is(&["int", "integer"]) {
        Kind::Int
    } else if ty.is(&["float", "double"]) {
        Kind::Float
    } else if ty.is(&["string"]) {
        Kind::Str
    } else if ty.is(&["array", "list", "map"]) {
        Kind::Collection
    } else {
        Kind::Class
    }
}

/// `mixed` declares nothing; the runtime value decides.
fn is_mixed(ty: &TypeDesc, metadata: &dyn MetadataSource) -> bool {
    ty.is(&["mixed"]) && metadata.class_metadata(&ty.name).is_none()
}

fn infer_from_value(value: &Value) -> TypeDesc {
    match value {
        Value::Null => TypeDesc::new("NULL"),
        Value::Bool(_) => TypeDesc::new("bool"),
        Value::Int(_) => TypeDesc::new("int"),
        Value::Float(_) => TypeDesc::new("float"),
        Value::Str(_) => TypeDesc::new("string"),
        Value::List(_) => TypeDesc::new("array"),
        Value::Map(_) => keyed_mixed(),
        Value::Object(o) => TypeDesc::new(o.class.clone()),
    }
}

fn infer_from_node(data: &Node) -> TypeDesc {
    match data {
        Node::Null => TypeDesc::new("NULL"),
        Node::Bool(_) => TypeDesc::new("bool"),
        Node::Int(_) => TypeDesc::new("int"),
        Node::Float(_) => TypeDesc::new("float"),
        Node::Str(_) => TypeDesc::new("string"),
        Node::Seq(_) => TypeDesc::new("array"),
        Node::Map(_) => keyed_mixed(),
    }
}

fn keyed_mixed() -> TypeDesc {
    TypeDesc::with_params("array", vec![TypeDesc::new("string"), TypeDesc::new("mixed")])
}

/// Reference navigator: scalar kinds, collections, and classes known to the metadata source.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphNavigator;

impl GraphNavigator {
    fn class_metadata<'a>(&self, ty: &TypeDesc, cx: &Traversal<'a>) -> Result<&'a ClassMetadata> {
        cx.metadata().class_metadata(&ty.name).ok_or_else(|| {
            Error::Navigation(format!("no metadata for type `{ty}` (at {})", cx.visiting_path()))
        })
    }

    fn serialize_object(
        &self,
        class: &ClassMetadata,
        object: &Object,
        ty: &TypeDesc,
        visitor: &mut dyn SerializationVisitor,
        cx: &mut Traversal<'_>,
    ) -> Result<Node> {
        visitor.start_visiting_object(class, object, ty, cx)?;
        for property in &class.properties {
            visitor.visit_property(property, object, cx)?;
        }
        visitor.end_visiting_object(class, object, ty, cx)
    }

    fn deserialize_object(
        &self,
        class: &ClassMetadata,
        data: &Node,
        ty: &TypeDesc,
        visitor: &mut dyn DeserializationVisitor,
        cx: &mut Traversal<'_>,
    ) -> Result<Value> {
        visitor.start_visiting_object(class, data, ty, cx)?;
        for property in &class.properties {
            visitor.visit_property(property, data, cx)?;
        }
        visitor.end_visiting_object(class, data, ty, cx)
    }
}

impl Navigator for GraphNavigator {
    fn accept(
        &self,
        value: &Value,
        ty: Option<&TypeDesc>,
        visitor: &mut dyn SerializationVisitor,
        cx: &mut Traversal<'_>,
    ) -> Result<Node> {
        let inferred;
        let ty = match ty {
            Some(ty) if !is_mixed(ty, cx.metadata()) => ty,
            _ => {
                inferred = infer_from_value(value);
                &inferred
            }
        };
        trace!(depth = cx.depth(), ty = %ty, kind = value.kind(), "serialize");

        if value.is_null() {
            return visitor.visit_null(ty, cx);
        }
        match kind_of(ty, cx.metadata()) {
            Kind::Null => visitor.visit_null(ty, cx),
            Kind::Bool => visitor.visit_bool(value, ty, cx),
            Kind::Int => visitor.visit_int(value, ty, cx),
            Kind::Float => visitor.visit_float(value, ty, cx),
            Kind::Str => visitor.visit_string(value, ty, cx),
            Kind::Collection => visitor.visit_array(value, ty, cx),
            Kind::Class => {
                let class = self.class_metadata(ty, cx)?;
                let Value::Object(object) = value else {
                    return Err(Error::Navigation(format!(
                        "expected an instance of `{ty}`, got {} (at {})",
                        value.kind(),
                        cx.visiting_path()
                    )));
                };
                cx.start_visiting(ty.to_string());
                let result = self.serialize_object(class, object, ty, visitor, cx);
                cx.stop_visiting();
                result
            }
        }
    }

    fn accept_data(
        &self,
        data: &Node,
        ty: Option<&TypeDesc>,
        visitor: &mut dyn DeserializationVisitor,
        cx: &mut Traversal<'_>,
    ) -> Result<Value> {
        let inferred;
        let ty = match ty {
            Some(ty) if !is_mixed(ty, cx.metadata()) => ty,
            _ => {
                inferred = infer_from_node(data);
                &inferred
            }
        };
        trace!(depth = cx.depth(), ty = %ty, kind = data.kind(), "deserialize");

        if data.is_null() {
            return visitor.visit_null(data, ty, cx);
        }
        match kind_of(ty, cx.metadata()) {
            Kind::Null => visitor.visit_null(data, ty, cx),
            Kind::Bool => visitor.visit_bool(data, ty, cx),
            Kind::Int => visitor.visit_int(data, ty, cx),
            Kind::Float => visitor.visit_float(data, ty, cx),
            Kind::Str => visitor.visit_string(data, ty, cx),
            Kind::Collection => visitor.visit_array(data, ty, cx),
            Kind::Class => {
                let class = self.class_metadata(ty, cx)?;
                if !matches!(data, Node::Map(_)) {
                    return Err(Error::Navigation(format!(
                        "expected a map for `{ty}`, got {} (at {})",
                        data.kind(),
                        cx.visiting_path()
                    )));
                }
                cx.start_visiting(ty.to_string());
                let result = self.deserialize_object(class, data, ty, visitor, cx);
                cx.stop_visiting();
                result
            }
        }
    }
}
