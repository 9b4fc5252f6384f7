use crate::metadata::ClassMetadata;
use crate::node::Node;
use crate::types::TypeDesc;
use crate::value::Object;

/// Produces the instance a deserialization fills in.
pub trait ObjectConstructor: Send + Sync {
    fn construct(&self, class: &ClassMetadata, data: &Node, ty: &TypeDesc) -> Object;
}

/// A fresh, empty instance of the declared class.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjectConstructor;

impl ObjectConstructor for DefaultObjectConstructor {
    fn construct(&self, class: &ClassMetadata, _data: &Node, _ty: &TypeDesc) -> Object {
        Object::new(class.name.clone())
    }
}
