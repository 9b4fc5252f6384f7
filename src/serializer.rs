//! Entry point: picks the visitor for a format, resolves the initial type, binds the
//! context to its collaborators and extracts the result. Holds no traversal state.
use indexmap::IndexMap;
use tracing::debug;

use crate::construct::{DefaultObjectConstructor, ObjectConstructor};
use crate::context::{Collaborators, Context, ContextFactory, DefaultContextFactory, Direction, Traversal};
use crate::error::{Error, Result};
use crate::json::{self, JsonDeserializationVisitor, JsonSerializationVisitor};
use crate::metadata::{MetadataRegistry, MetadataSource};
use crate::naming::{CamelCaseNaming, NamingStrategy, SerializedNameNaming};
use crate::navigator::{GraphNavigator, Navigator};
use crate::node::Node;
use crate::types::TypeDesc;
use crate::value::Value;
use crate::visitor::{DeserializationVisitor, SerializationVisitor, VisitorProtocol};

pub type SerializationVisitorFactory = Box<dyn Fn() -> Box<dyn SerializationVisitor> + Send + Sync>;
pub type DeserializationVisitorFactory = Box<dyn Fn() -> Box<dyn DeserializationVisitor> + Send + Sync>;

pub struct Serializer {
    navigator: Box<dyn Navigator>,
    metadata: Box<dyn MetadataSource>,
    naming: Box<dyn NamingStrategy>,
    constructor: Box<dyn ObjectConstructor>,
    context_factory: Box<dyn ContextFactory>,
    serialization_visitors: IndexMap<String, SerializationVisitorFactory>,
    deserialization_visitors: IndexMap<String, DeserializationVisitorFactory>,
}

impl Serializer {
    pub fn builder() -> SerializerBuilder {
        SerializerBuilder::default()
    }

    pub fn serialize(
        &self,
        value: &Value,
        format: &str,
        context: Option<Context>,
        explicit_type: Option<&str>,
    ) -> Result<String> {
        let mut visitor = self.serialization_visitor(format)?;
        let context = self.serialization_context(context)?;
        let ty = resolve_type(explicit_type, &context)?;
        debug!(format, ty = ?ty.as_ref().map(ToString::to_string), protocol = ?visitor.protocol(), "serialize");

        let mut cx = Traversal::new(context, format, self.collaborators());
        match visitor.protocol() {
            VisitorProtocol::Staged => {
                self.run_serialization(visitor.as_mut(), value, ty.as_ref(), &mut cx)?;
                visitor.render()
            }
            VisitorProtocol::Legacy => {
                let node = self.navigator.accept(value, ty.as_ref(), visitor.as_mut(), &mut cx)?;
                ensure_closed(visitor.open_depth())?;
                visitor.encode(&node)
            }
        }
    }

    pub fn deserialize(&self, input: &str, ty: &str, format: &str, context: Option<Context>) -> Result<Value> {
        let mut visitor = self.deserialization_visitor(format)?;
        let ty = TypeDesc::parse(ty)?;
        let data = visitor.prepare(input)?;
        self.run_deserialization(visitor.as_mut(), &data, &ty, format, context)
    }

    /// Serialize through the reference format, returning plain ordered JSON values.
    /// Only maps and sequences are accepted as the outermost result.
    pub fn to_array(&self, value: &Value, context: Option<Context>, explicit_type: Option<&str>) -> Result<serde_json::Value> {
        let mut visitor = self.serialization_visitor(json::FORMAT)?;
        let context = self.serialization_context(context)?;
        let ty = resolve_type(explicit_type, &context)?;
        debug!(ty = ?ty.as_ref().map(ToString::to_string), protocol = ?visitor.protocol(), "to_array");

        let mut cx = Traversal::new(context, json::FORMAT, self.collaborators());
        let node = match visitor.protocol() {
            VisitorProtocol::Staged => {
                self.run_serialization(visitor.as_mut(), value, ty.as_ref(), &mut cx)?;
                visitor
                    .take_result()
                    .ok_or_else(|| Error::StackDiscipline("visitor dropped its stored result".into()))?
            }
            VisitorProtocol::Legacy => {
                let node = self.navigator.accept(value, ty.as_ref(), visitor.as_mut(), &mut cx)?;
                ensure_closed(visitor.open_depth())?;
                node
            }
        };

        match node.into_plain()? {
            plain @ (serde_json::Value::Object(_) | serde_json::Value::Array(_)) => Ok(plain),
            other => Err(Error::Shape(format!(
                "to_array needs a map or sequence at the top level, got `{other}`"
            ))),
        }
    }

    pub fn from_array(&self, data: serde_json::Value, ty: &str, context: Option<Context>) -> Result<Value> {
        let mut visitor = self.deserialization_visitor(json::FORMAT)?;
        let ty = TypeDesc::parse(ty)?;
        let data = Node::from_plain(data);
        self.run_deserialization(visitor.as_mut(), &data, &ty, json::FORMAT, context)
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.serialization_visitors.contains_key(format) || self.deserialization_visitors.contains_key(format)
    }

    // ————————————————————————————————————————————————————————————————————————
    // INTERNAL HELPERS
    // ————————————————————————————————————————————————————————————————————————

    fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            navigator: self.navigator.as_ref(),
            metadata: self.metadata.as_ref(),
            naming: self.naming.as_ref(),
            constructor: self.constructor.as_ref(),
        }
    }

    fn serialization_visitor(&self, format: &str) -> Result<Box<dyn SerializationVisitor>> {
        self.serialization_visitors
            .get(format)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))
    }

    fn deserialization_visitor(&self, format: &str) -> Result<Box<dyn DeserializationVisitor>> {
        self.deserialization_visitors
            .get(format)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))
    }

    fn serialization_context(&self, context: Option<Context>) -> Result<Context> {
        let context = context.unwrap_or_else(|| self.context_factory.serialization_context());
        expect_direction(&context, Direction::Serialization)?;
        Ok(context)
    }

    fn deserialization_context(&self, context: Option<Context>) -> Result<Context> {
        let context = context.unwrap_or_else(|| self.context_factory.deserialization_context());
        expect_direction(&context, Direction::Deserialization)?;
        Ok(context)
    }

    /// Staged protocol: reset, walk, verify every composite was closed, store the result.
    fn run_serialization(
        &self,
        visitor: &mut dyn SerializationVisitor,
        value: &Value,
        ty: Option<&TypeDesc>,
        cx: &mut Traversal<'_>,
    ) -> Result<()> {
        visitor.initialize();
        let node = self.navigator.accept(value, ty, visitor, cx)?;
        ensure_closed(visitor.open_depth())?;
        visitor.set_result(node);
        Ok(())
    }

    fn run_deserialization(
        &self,
        visitor: &mut dyn DeserializationVisitor,
        data: &Node,
        ty: &TypeDesc,
        format: &str,
        context: Option<Context>,
    ) -> Result<Value> {
        let context = self.deserialization_context(context)?;
        debug!(format, ty = %ty, protocol = ?visitor.protocol(), "deserialize");

        let mut cx = Traversal::new(context, format, self.collaborators());
        match visitor.protocol() {
            VisitorProtocol::Staged => {
                visitor.initialize();
                let value = self.navigator.accept_data(data, Some(ty), visitor, &mut cx)?;
                ensure_closed(visitor.open_depth())?;
                visitor.set_result(value);
                visitor
                    .take_result()
                    .ok_or_else(|| Error::StackDiscipline("visitor dropped its stored result".into()))
            }
            VisitorProtocol::Legacy => {
                let value = self.navigator.accept_data(data, Some(ty), visitor, &mut cx)?;
                ensure_closed(visitor.open_depth())?;
                Ok(value)
            }
        }
    }
}

/// explicit argument > `initial_type` attribute > inferred by the navigator
fn resolve_type(explicit_type: Option<&str>, context: &Context) -> Result<Option<TypeDesc>> {
    explicit_type
        .or_else(|| context.initial_type())
        .map(TypeDesc::parse)
        .transpose()
}

fn expect_direction(context: &Context, expected: Direction) -> Result<()> {
    if context.direction() != expected {
        return Err(Error::Context(format!(
            "expected a {expected:?} context, got {:?}",
            context.direction()
        )));
    }
    Ok(())
}

fn ensure_closed(open: usize) -> Result<()> {
    if open != 0 {
        return Err(Error::StackDiscipline(format!(
            "{open} composite(s) left open when the traversal finished"
        )));
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// CONFIGURATION
// ————————————————————————————————————————————————————————————————————————————

#[derive(Default)]
pub struct SerializerBuilder {
    navigator: Option<Box<dyn Navigator>>,
    metadata: Option<Box<dyn MetadataSource>>,
    naming: Option<Box<dyn NamingStrategy>>,
    constructor: Option<Box<dyn ObjectConstructor>>,
    context_factory: Option<Box<dyn ContextFactory>>,
    serialize_null: Option<bool>,
    serialization_visitors: IndexMap<String, SerializationVisitorFactory>,
    deserialization_visitors: IndexMap<String, DeserializationVisitorFactory>,
}

impl SerializerBuilder {
    pub fn navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Some(Box::new(navigator));
        self
    }

    pub fn metadata(mut self, metadata: impl MetadataSource + 'static) -> Self {
        self.metadata = Some(Box::new(metadata));
        self
    }

    pub fn naming(mut self, naming: impl NamingStrategy + 'static) -> Self {
        self.naming = Some(Box::new(naming));
        self
    }

    pub fn constructor(mut self, constructor: impl ObjectConstructor + 'static) -> Self {
        self.constructor = Some(Box::new(constructor));
        self
    }

    /// Takes precedence over `serialize_null`.
    pub fn context_factory(mut self, factory: impl ContextFactory + 'static) -> Self {
        self.context_factory = Some(Box::new(factory));
        self
    }

    /// Null policy of contexts created when the caller passes none.
    pub fn serialize_null(mut self, include: bool) -> Self {
        self.serialize_null = Some(include);
        self
    }

    pub fn serialization_visitor<F, V>(mut self, format: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: SerializationVisitor + 'static,
    {
        self.serialization_visitors.insert(
            format.into(),
            Box::new(move || Box::new(factory()) as Box<dyn SerializationVisitor>),
        );
        self
    }

    pub fn deserialization_visitor<F, V>(mut self, format: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: DeserializationVisitor + 'static,
    {
        self.deserialization_visitors.insert(
            format.into(),
            Box::new(move || Box::new(factory()) as Box<dyn DeserializationVisitor>),
        );
        self
    }

    pub fn build(mut self) -> Serializer {
        if !self.serialization_visitors.contains_key(json::FORMAT) {
            self = self.serialization_visitor(json::FORMAT, JsonSerializationVisitor::new);
        }
        if !self.deserialization_visitors.contains_key(json::FORMAT) {
            self = self.deserialization_visitor(json::FORMAT, JsonDeserializationVisitor::new);
        }
        let serialize_null = self.serialize_null;
        Serializer {
            navigator: self.navigator.unwrap_or_else(|| Box::new(GraphNavigator)),
            metadata: self.metadata.unwrap_or_else(|| Box::new(MetadataRegistry::new())),
            naming: self
                .naming
                .unwrap_or_else(|| Box::new(SerializedNameNaming::new(CamelCaseNaming::default()))),
            constructor: self.constructor.unwrap_or_else(|| Box::new(DefaultObjectConstructor)),
            context_factory: self
                .context_factory
                .unwrap_or_else(|| Box::new(DefaultContextFactory { serialize_null })),
            serialization_visitors: self.serialization_visitors,
            deserialization_visitors: self.deserialization_visitors,
        }
    }
}
