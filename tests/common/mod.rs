#![allow(dead_code)]

use graphwalk::context::Collaborators;
use graphwalk::{
    ClassMetadata, Context, DefaultObjectConstructor, DeserializationVisitor, GraphNavigator, IdenticalNaming,
    MetadataRegistry, Navigator, Node, Object, PropertyMetadata, SerializationVisitor, Serializer, Traversal,
    TypeDesc, Value,
};

pub fn prop(name: &str, ty: &str) -> PropertyMetadata {
    PropertyMetadata::typed(name, ty).unwrap()
}

pub fn registry() -> MetadataRegistry {
    MetadataRegistry::new()
        .with(
            ClassMetadata::new("User")
                .property(prop("id", "int"))
                .property(prop("name", "string"))
                .property(prop("tags", "list<string>")),
        )
        .with(
            ClassMetadata::new("Address")
                .property(prop("street", "string"))
                .property(prop("city", "string")),
        )
        .with(
            ClassMetadata::new("Person")
                .property(prop("address", "Address").inlined())
                .property(prop("age", "int")),
        )
        .with(
            ClassMetadata::new("Team")
                .property(prop("teamName", "string"))
                .property(prop("lead", "User"))
                .property(prop("members", "list<User>"))
                .property(prop("scores", "map<string,int>"))
                .property(PropertyMetadata::typed("motto", "string").unwrap().serialized_as("slogan")),
        )
        .with(ClassMetadata::new("Empty"))
}

pub fn serializer() -> Serializer {
    Serializer::builder().metadata(registry()).build()
}

pub fn user(id: i64, name: Option<&str>, tags: &[&str]) -> Value {
    Object::new("User")
        .with("id", id)
        .with("name", name)
        .with("tags", tags.to_vec())
        .into()
}

pub fn team() -> Value {
    let mut scores = indexmap::IndexMap::new();
    scores.insert("q3".to_string(), Value::Int(7));
    scores.insert("q1".to_string(), Value::Int(3));
    Object::new("Team")
        .with("teamName", "core")
        .with("lead", user(1, Some("ada"), &["lead"]))
        .with("members", vec![user(2, Some("bob"), &[]), user(3, Some("cy"), &["x", "y"])])
        .with("scores", Value::Map(scores))
        .with("motto", "ship it")
        .into()
}

pub fn collaborators<'a>(metadata: &'a MetadataRegistry) -> Collaborators<'a> {
    Collaborators {
        navigator: &GraphNavigator,
        metadata,
        naming: &IdenticalNaming,
        constructor: &DefaultObjectConstructor,
    }
}

pub fn traversal<'a>(metadata: &'a MetadataRegistry, context: Context) -> Traversal<'a> {
    Traversal::new(context, "json", collaborators(metadata))
}

/// Opens a composite and never closes it.
pub struct LeakyNavigator;

impl Navigator for LeakyNavigator {
    fn accept(
        &self,
        _value: &Value,
        _ty: Option<&TypeDesc>,
        visitor: &mut dyn SerializationVisitor,
        cx: &mut Traversal<'_>,
    ) -> graphwalk::Result<Node> {
        let class = ClassMetadata::new("Leak");
        let object = Object::new("Leak");
        visitor.start_visiting_object(&class, &object, &TypeDesc::new("Leak"), cx)?;
        Ok(Node::empty_map())
    }

    fn accept_data(
        &self,
        data: &Node,
        _ty: Option<&TypeDesc>,
        visitor: &mut dyn DeserializationVisitor,
        cx: &mut Traversal<'_>,
    ) -> graphwalk::Result<Value> {
        let class = ClassMetadata::new("Leak");
        visitor.start_visiting_object(&class, data, &TypeDesc::new("Leak"), cx)?;
        Ok(Value::Null)
    }
}
