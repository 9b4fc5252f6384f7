//! Declared type descriptors: `Name`, `Name<P>`, `Name<K, V>`, nested to any depth.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A parsed type expression. The arity of `params` carries meaning:
/// 0 = scalar/class, 1 = sequence of element, 2 = map of key → value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    pub name: String,
    pub params: Vec<TypeDesc>,
}

impl TypeDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), params: Vec::new() }
    }

    pub fn with_params(name: impl Into<String>, params: Vec<TypeDesc>) -> Self {
        Self { name: name.into(), params }
    }

    pub fn parse(src: &str) -> Result<Self> {
        let mut parser = Parser { src, bytes: src.as_bytes(), pos: 0, depth: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos < parser.bytes.len() {
            let reason = if parser.bytes[parser.pos] == b'>' {
                "unbalanced `>`"
            } else {
                "unexpected trailing input"
            };
            return Err(Error::type_syntax(src, parser.pos, reason));
        }
        Ok(ty)
    }

    /// Two parameters: keyed map.
    pub fn is_map(&self) -> bool {
        self.params.len() == 2
    }

    /// Element (or map value) type, if declared.
    pub fn element(&self) -> Option<&TypeDesc> {
        self.params.last()
    }

    pub fn key(&self) -> Option<&TypeDesc> {
        if self.is_map() { self.params.first() } else { None }
    }

    pub fn is(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.name.eq_ignore_ascii_case(n))
    }
}

/// Deepest `<` nesting accepted by [`TypeDesc::parse`].
pub const MAX_NESTING: usize = 256;

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn parse_type(&mut self) -> Result<TypeDesc> {
        self.skip_ws();
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'\\' | b':' | b'.') {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            let reason = match self.peek() {
                None => "expected a type name, found end of input",
                Some(b'<') => "type parameters without a type name",
                Some(_) => "expected a type name",
            };
            return Err(Error::type_syntax(self.src, self.pos, reason));
        }
        let name = self.src[start..self.pos].to_string();

        self.skip_ws();
        if self.peek() != Some(b'<') {
            return Ok(TypeDesc::new(name));
        }
        let open = self.pos;
        if self.depth == MAX_NESTING {
            return Err(Error::type_syntax(self.src, open, "type parameters nested too deeply"));
        }
        self.pos += 1;
        self.depth += 1;

        let mut params = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b'>') && params.is_empty() {
                return Err(Error::type_syntax(self.src, self.pos, "empty parameter list"));
            }
            params.push(self.parse_type()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                None => {
                    return Err(Error::type_syntax(self.src, open, "unbalanced `<`"));
                }
                Some(_) => {
                    return Err(Error::type_syntax(self.src, self.pos, "expected `,` or `>`"));
                }
            }
        }
        self.depth -= 1;
        Ok(TypeDesc { name, params })
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            f.write_str("<")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 { f.write_str(", ")?; }
                write!(f, "{p}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl FromStr for TypeDesc {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for TypeDesc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeDesc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let src = String::deserialize(deserializer)?;
        TypeDesc::parse(&src).map_err(serde::de::Error::custom)
    }
}
