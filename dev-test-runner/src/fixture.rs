//! Fixture files: a metadata registry plus a list of cases run against it.
use std::path::Path;

use anyhow::{Context as _, anyhow, bail};
use graphwalk::{
    CamelCaseNaming, Context, IdenticalNaming, MetadataRegistry, Object, SerializedNameNaming, Serializer, Value,
};
use indexmap::IndexMap;
use serde::Deserialize;

/// Key that turns a JSON object in a fixture into an [`Object`] instead of a map.
pub const CLASS_KEY: &str = "@class";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub naming: Naming,
    pub cases: Vec<Case>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    #[default]
    CamelCase,
    Identical,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Serialize,
    ToArray,
    Deserialize,
}

#[derive(Debug, Deserialize)]
pub struct Case {
    pub name: String,
    #[serde(default)]
    pub mode: Mode,
    /// Explicit type for serialization, required type for deserialization.
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub serialize_null: Option<bool>,
    pub input: serde_json::Value,
    #[serde(default)]
    pub expect: Option<serde_json::Value>,
    /// Substring of the expected error message.
    #[serde(default)]
    pub expect_error: Option<String>,
    /// Deserialize the serialized output under this type and compare with `input`.
    #[serde(default)]
    pub round_trip: Option<String>,
}

pub struct Loaded {
    pub serializer: Serializer,
    pub cases: Vec<Case>,
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

pub fn load(path: &Path) -> anyhow::Result<Loaded> {
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let fixture: Fixture = graphwalk::path_de::from_str_with_path(&source)
        .map_err(|e| anyhow!("parsing {}: {e}", path.display()))?;
    let metadata = match &fixture.metadata {
        serde_json::Value::Null => MetadataRegistry::new(),
        raw => MetadataRegistry::from_json(&raw.to_string())?,
    };
    let builder = Serializer::builder().metadata(metadata);
    let builder = match fixture.naming {
        Naming::CamelCase => builder.naming(SerializedNameNaming::new(CamelCaseNaming::default())),
        Naming::Identical => builder.naming(SerializedNameNaming::new(IdenticalNaming)),
    };
    Ok(Loaded { serializer: builder.build(), cases: fixture.cases })
}

/// Objects carrying [`CLASS_KEY`] become instances, other objects become maps.
pub fn to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(xs) => Value::List(xs.iter().map(to_value).collect()),
        serde_json::Value::Object(m) => match m.get(CLASS_KEY).and_then(|c| c.as_str()) {
            Some(class) => {
                let mut object = Object::new(class);
                for (k, v) in m.iter().filter(|(k, _)| *k != CLASS_KEY) {
                    object.set(k.clone(), to_value(v));
                }
                Value::Object(object)
            }
            None => Value::Map(m.iter().map(|(k, v)| (k.clone(), to_value(v))).collect::<IndexMap<_, _>>()),
        },
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXECUTION
// ————————————————————————————————————————————————————————————————————————————

impl Case {
    fn context(&self) -> Option<Context> {
        self.serialize_null.map(|include| Context::serialization().with_serialize_null(include))
    }

    /// `Ok(())` when the case behaves as written; `Err` carries the mismatch.
    pub fn run(&self, serializer: &Serializer) -> anyhow::Result<()> {
        let outcome = self.execute(serializer);
        match (&self.expect_error, outcome) {
            (Some(needle), Err(error)) => {
                let message = error.to_string();
                if !message.contains(needle.as_str()) {
                    bail!("expected an error containing `{needle}`, got `{message}`");
                }
                Ok(())
            }
            (Some(needle), Ok(())) => bail!("expected an error containing `{needle}`, got success"),
            (None, outcome) => outcome,
        }
    }

    fn execute(&self, serializer: &Serializer) -> anyhow::Result<()> {
        match self.mode {
            Mode::Serialize => {
                let text = serializer.serialize(&to_value(&self.input), "json", self.context(), self.ty.as_deref())?;
                if let Some(expect) = &self.expect {
                    let expect = expect.as_str().map(str::to_string).unwrap_or_else(|| expect.to_string());
                    if text != expect {
                        bail!("output mismatch\n  expected: {expect}\n    actual: {text}");
                    }
                }
                if let Some(ty) = &self.round_trip {
                    let back = serializer.deserialize(&text, ty, "json", None)?;
                    if back != to_value(&self.input) {
                        bail!("round trip mismatch\n  expected: {:?}\n    actual: {back:?}", to_value(&self.input));
                    }
                }
                Ok(())
            }
            Mode::ToArray => {
                let plain = serializer.to_array(&to_value(&self.input), self.context(), self.ty.as_deref())?;
                if let Some(expect) = &self.expect {
                    // compare as text so key order counts
                    if plain.to_string() != expect.to_string() {
                        bail!("output mismatch\n  expected: {expect}\n    actual: {plain}");
                    }
                }
                Ok(())
            }
            Mode::Deserialize => {
                let ty = self.ty.as_deref().ok_or_else(|| anyhow!("deserialize cases need a `type`"))?;
                let input = match &self.input {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                let value = serializer.deserialize(&input, ty, "json", None)?;
                if let Some(expect) = &self.expect {
                    let expect = to_value(expect);
                    if value != expect {
                        bail!("value mismatch\n  expected: {expect:?}\n    actual: {value:?}");
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_key_marks_instances() {
        let value = to_value(&json!({"@class": "User", "id": 1, "tags": {"a": 2.5}}));
        let object = value.as_object().unwrap();
        assert_eq!(object.class, "User");
        assert_eq!(object.fields.len(), 2);
        assert!(matches!(object.get("tags"), Some(Value::Map(_))));
        assert_eq!(to_value(&json!([1, null])), Value::List(vec![Value::Int(1), Value::Null]));
    }

    #[test]
    fn expected_errors_pass_only_on_matching_messages() {
        let serializer = Serializer::builder().build();
        let case: Case = serde_json::from_value(json!({
            "name": "bad type",
            "type": "list<",
            "input": [],
            "expect_error": "invalid type expression"
        }))
        .unwrap();
        assert!(case.run(&serializer).is_ok());

        let case: Case = serde_json::from_value(json!({
            "name": "ok",
            "input": [1],
            "expect": "[1]",
            "expect_error": "anything"
        }))
        .unwrap();
        assert!(case.run(&serializer).is_err());
    }
}
