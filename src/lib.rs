//! Format-agnostic object-graph serialization.
//!
//! A navigator walks a [`Value`] under a declared [`TypeDesc`] and calls into a format
//! visitor, which assembles an intermediate [`Node`] document and renders it. The
//! inverse path parses input into a `Node` and rebuilds a typed `Value` from it.
//!
//! ```
//! use graphwalk::{ClassMetadata, MetadataRegistry, Object, PropertyMetadata, Serializer};
//!
//! let metadata = MetadataRegistry::new().with(
//!     ClassMetadata::new("User")
//!         .property(PropertyMetadata::typed("id", "int").unwrap())
//!         .property(PropertyMetadata::typed("name", "string").unwrap()),
//! );
//! let serializer = Serializer::builder().metadata(metadata).build();
//! let user = Object::new("User").with("id", 1).with("name", "ada");
//! let json = serializer.serialize(&user.into(), "json", None, None).unwrap();
//! assert_eq!(json, r#"{"id":1,"name":"ada"}"#);
//! ```
pub mod coerce;
pub mod construct;
pub mod context;
pub mod error;
pub mod json;
pub mod metadata;
pub mod naming;
pub mod navigator;
pub mod node;
pub mod path_de;
pub mod serializer;
pub mod types;
pub mod value;
pub mod visitor;

pub use construct::{DefaultObjectConstructor, ObjectConstructor};
pub use context::{Context, ContextFactory, DefaultContextFactory, Direction, Traversal, INITIAL_TYPE};
pub use error::{EncodingError, Error, Result};
pub use json::{JsonDeserializationVisitor, JsonSerializationVisitor};
pub use metadata::{ClassMetadata, MetadataRegistry, MetadataSource, PropertyMetadata};
pub use naming::{CamelCaseNaming, IdenticalNaming, NamingStrategy, SerializedNameNaming};
pub use navigator::{GraphNavigator, Navigator};
pub use node::Node;
pub use serializer::{Serializer, SerializerBuilder};
pub use types::TypeDesc;
pub use value::{Object, Value};
pub use visitor::{DeserializationVisitor, DocumentStack, SerializationVisitor, VisitorProtocol};
