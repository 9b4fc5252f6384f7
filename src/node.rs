//! The intermediate document: what visitors build while serializing and consume while
//! deserializing. Maps keep insertion order; every node owns its children.
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as Json;

use crate::error::EncodingError;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Node>),
    Map(IndexMap<String, Node>),
}

impl Node {
    pub fn empty_map() -> Self {
        Node::Map(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::Float(_) => "float",
            Node::Str(_) => "string",
            Node::Seq(_) => "sequence",
            Node::Map(_) => "map",
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Strip the engine container types, leaving plain ordered JSON values.
    /// Fails on non-finite floats, which `serde_json::Value` has no literal for.
    pub fn into_plain(self) -> Result<Json, EncodingError> {
        check_representable(&self, &mut String::from("$"))?;
        Ok(self.into_plain_unchecked())
    }

    fn into_plain_unchecked(self) -> Json {
        match self {
            Node::Null => Json::Null,
            Node::Bool(b) => Json::Bool(b),
            Node::Int(i) => Json::from(i),
            Node::Float(f) => Json::from(f),
            Node::Str(s) => Json::String(s),
            Node::Seq(xs) => Json::Array(xs.into_iter().map(Node::into_plain_unchecked).collect()),
            Node::Map(m) => {
                let mut out = serde_json::Map::with_capacity(m.len());
                for (k, v) in m {
                    out.insert(k, v.into_plain_unchecked());
                }
                Json::Object(out)
            }
        }
    }

    pub fn from_plain(value: Json) -> Self {
        match value {
            Json::Null => Node::Null,
            Json::Bool(b) => Node::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Node::Int(i),
                None => Node::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Node::Str(s),
            Json::Array(xs) => Node::Seq(xs.into_iter().map(Node::from_plain).collect()),
            Json::Object(m) => Node::Map(m.into_iter().map(|(k, v)| (k, Node::from_plain(v))).collect()),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Float(f) => serializer.serialize_f64(*f),
            Node::Str(s) => serializer.serialize_str(s),
            Node::Seq(xs) => {
                let mut seq = serializer.serialize_seq(Some(xs.len()))?;
                for x in xs {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
            Node::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// JSON TEXT
// ————————————————————————————————————————————————————————————————————————————

/// Render a document as JSON text. Read-only over `node`.
pub fn encode_json(node: &Node, pretty: bool) -> Result<String, EncodingError> {
    check_representable(node, &mut String::from("$"))?;
    let text = if pretty {
        serde_json::to_string_pretty(node)?
    } else {
        serde_json::to_string(node)?
    };
    Ok(text)
}

// serde_json silently writes `null` for NaN/inf; refuse instead.
fn check_representable(node: &Node, path: &mut String) -> Result<(), EncodingError> {
    match node {
        Node::Float(f) if !f.is_finite() => Err(EncodingError::Unrepresentable {
            path: path.clone(),
            reason: format!("non-finite float `{f}`"),
        }),
        Node::Seq(xs) => {
            for (i, x) in xs.iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{i}]"));
                check_representable(x, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        Node::Map(m) => {
            for (k, v) in m {
                let len = path.len();
                path.push('.');
                path.push_str(k);
                check_representable(v, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(entries: &[(&str, Node)]) -> Node {
        Node::Map(entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn renders_scalars_and_containers() {
        let node = map(&[
            ("n", Node::Null),
            ("b", Node::Bool(true)),
            ("i", Node::Int(-3)),
            ("f", Node::Float(1.5)),
            ("s", Node::Str("x\"y".into())),
            ("l", Node::Seq(vec![Node::Int(1), Node::Seq(vec![])])),
            ("m", Node::empty_map()),
        ]);
        assert_eq!(
            encode_json(&node, false).unwrap(),
            r#"{"n":null,"b":true,"i":-3,"f":1.5,"s":"x\"y","l":[1,[]],"m":{}}"#
        );
    }

    #[test]
    fn keeps_insertion_order() {
        let node = map(&[("c", Node::Int(1)), ("a", Node::Int(2)), ("b", Node::Int(3))]);
        assert_eq!(encode_json(&node, false).unwrap(), r#"{"c":1,"a":2,"b":3}"#);
    }

    #[test]
    fn non_finite_float_is_an_encoding_error() {
        let node = map(&[("xs", Node::Seq(vec![Node::Float(0.0), Node::Float(f64::NAN)]))]);
        match encode_json(&node, false).unwrap_err() {
            EncodingError::Unrepresentable { path, .. } => assert_eq!(path, "$.xs[1]"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn plain_conversion_strips_containers() {
        let node = map(&[("b", Node::Seq(vec![Node::Str("x".into())])), ("a", Node::empty_map())]);
        let plain = node.clone().into_plain().unwrap();
        assert_eq!(plain, json!({"b": ["x"], "a": {}}));
        let keys: Vec<_> = plain.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(Node::from_plain(plain), node);
    }

    #[test]
    fn plain_conversion_rejects_non_finite_floats() {
        let node = map(&[("xs", Node::Seq(vec![Node::Float(1.5), Node::Float(f64::NEG_INFINITY)]))]);
        match node.into_plain() {
            Err(EncodingError::Unrepresentable { path, .. }) => assert_eq!(path, "$.xs[1]"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
