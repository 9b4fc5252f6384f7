//! Visitors that predate the staged protocol must produce the same output.
mod common;

use common::*;
use graphwalk::{
    ClassMetadata, Context, DeserializationVisitor, Error, JsonDeserializationVisitor, JsonSerializationVisitor,
    Node, Object, PropertyMetadata, Result, SerializationVisitor, Serializer, Traversal, TypeDesc, Value,
    VisitorProtocol,
};

#[derive(Debug, Default)]
struct LegacyJson(JsonSerializationVisitor);

impl SerializationVisitor for LegacyJson {
    fn protocol(&self) -> VisitorProtocol {
        VisitorProtocol::Legacy
    }

    fn initialize(&mut self) {
        panic!("legacy visitors are never initialized");
    }

    fn visit_null(&mut self, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        self.0.visit_null(ty, cx)
    }

    fn visit_bool(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        self.0.visit_bool(value, ty, cx)
    }

    fn visit_int(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        self.0.visit_int(value, ty, cx)
    }

    fn visit_float(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        self.0.visit_float(value, ty, cx)
    }

    fn visit_string(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        self.0.visit_string(value, ty, cx)
    }

    fn visit_array(&mut self, value: &Value, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Node> {
        self.0.visit_array(value, ty, cx)
    }

    fn start_visiting_object(
        &mut self,
        class: &ClassMetadata,
        object: &Object,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<()> {
        self.0.start_visiting_object(class, object, ty, cx)
    }

    fn visit_property(&mut self, property: &PropertyMetadata, object: &Object, cx: &mut Traversal<'_>) -> Result<()> {
        self.0.visit_property(property, object, cx)
    }

    fn end_visiting_object(
        &mut self,
        class: &ClassMetadata,
        object: &Object,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<Node> {
        self.0.end_visiting_object(class, object, ty, cx)
    }

    fn has_data(&self, key: &str) -> bool {
        self.0.has_data(key)
    }

    fn set_data(&mut self, key: &str, value: Node) -> Result<()> {
        self.0.set_data(key, value)
    }

    fn open_depth(&self) -> usize {
        self.0.open_depth()
    }

    fn set_result(&mut self, _node: Node) {
        panic!("legacy visitors never store a result");
    }

    fn root(&self) -> Option<&Node> {
        None
    }

    fn take_result(&mut self) -> Option<Node> {
        None
    }

    fn encode(&self, node: &Node) -> Result<String> {
        self.0.encode(node)
    }
}

#[derive(Debug, Default)]
struct LegacyJsonReader(JsonDeserializationVisitor);

impl DeserializationVisitor for LegacyJsonReader {
    fn protocol(&self) -> VisitorProtocol {
        VisitorProtocol::Legacy
    }

    fn prepare(&self, input: &str) -> Result<Node> {
        self.0.prepare(input)
    }

    fn initialize(&mut self) {
        panic!("legacy visitors are never initialized");
    }

    fn visit_null(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        self.0.visit_null(data, ty, cx)
    }

    fn visit_bool(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        self.0.visit_bool(data, ty, cx)
    }

    fn visit_int(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        self.0.visit_int(data, ty, cx)
    }

    fn visit_float(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        self.0.visit_float(data, ty, cx)
    }

    fn visit_string(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        self.0.visit_string(data, ty, cx)
    }

    fn visit_array(&mut self, data: &Node, ty: &TypeDesc, cx: &mut Traversal<'_>) -> Result<Value> {
        self.0.visit_array(data, ty, cx)
    }

    fn start_visiting_object(
        &mut self,
        class: &ClassMetadata,
        data: &Node,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<()> {
        self.0.start_visiting_object(class, data, ty, cx)
    }

    fn visit_property(&mut self, property: &PropertyMetadata, data: &Node, cx: &mut Traversal<'_>) -> Result<()> {
        self.0.visit_property(property, data, cx)
    }

    fn end_visiting_object(
        &mut self,
        class: &ClassMetadata,
        data: &Node,
        ty: &TypeDesc,
        cx: &mut Traversal<'_>,
    ) -> Result<Value> {
        self.0.end_visiting_object(class, data, ty, cx)
    }

    fn open_depth(&self) -> usize {
        self.0.open_depth()
    }

    fn set_result(&mut self, _value: Value) {
        panic!("legacy visitors never store a result");
    }

    fn take_result(&mut self) -> Option<Value> {
        None
    }
}

fn legacy_serializer() -> Serializer {
    Serializer::builder()
        .metadata(registry())
        .serialization_visitor("json", LegacyJson::default)
        .deserialization_visitor("json", LegacyJsonReader::default)
        .build()
}

#[test]
fn legacy_serialization_matches_staged() {
    let staged = serializer();
    let legacy = legacy_serializer();
    let inputs = [
        team(),
        user(7, None, &["a"]),
        Value::from(vec![1, 2, 3]),
        Value::Int(5),
        Value::Null,
    ];
    for input in &inputs {
        assert_eq!(
            legacy.serialize(input, "json", None, None).unwrap(),
            staged.serialize(input, "json", None, None).unwrap(),
        );
        let with_nulls = || Some(Context::serialization().with_serialize_null(true));
        assert_eq!(
            legacy.serialize(input, "json", with_nulls(), None).unwrap(),
            staged.serialize(input, "json", with_nulls(), None).unwrap(),
        );
    }
}

#[test]
fn legacy_to_array_matches_staged() {
    assert_eq!(
        legacy_serializer().to_array(&team(), None, None).unwrap(),
        serializer().to_array(&team(), None, None).unwrap(),
    );
}

#[test]
fn legacy_deserialization_matches_staged() {
    let staged = serializer();
    let legacy = legacy_serializer();
    let text = staged.serialize(&team(), "json", None, None).unwrap();
    assert_eq!(
        legacy.deserialize(&text, "Team", "json", None).unwrap(),
        staged.deserialize(&text, "Team", "json", None).unwrap(),
    );
    assert_eq!(legacy.deserialize("[1,\"2\"]", "list<int>", "json", None).unwrap(), Value::from(vec![1, 2]));
}

#[test]
fn legacy_traversals_must_close_every_composite() {
    let s = Serializer::builder()
        .navigator(LeakyNavigator)
        .serialization_visitor("json", LegacyJson::default)
        .deserialization_visitor("json", LegacyJsonReader::default)
        .build();
    let err = s.serialize(&Value::Int(1), "json", None, None).unwrap_err();
    assert!(matches!(err, Error::StackDiscipline(_)), "{err}");
    assert!(matches!(s.to_array(&Value::Int(1), None, None), Err(Error::StackDiscipline(_))));
    assert!(matches!(s.deserialize("{}", "int", "json", None), Err(Error::StackDiscipline(_))));
    assert!(matches!(s.from_array(serde_json::json!({}), "int", None), Err(Error::StackDiscipline(_))));
}

#[test]
fn protocol_is_fixed_per_implementation() {
    assert_eq!(JsonSerializationVisitor::new().protocol(), VisitorProtocol::Staged);
    assert_eq!(LegacyJson::default().protocol(), VisitorProtocol::Legacy);
    assert_eq!(LegacyJsonReader::default().protocol(), VisitorProtocol::Legacy);
}
