//! Declared-type-directed scalar conversion.
//!
//! Conversions are permissive: they never fail, they report `lossy` instead. A value is
//! cast to whatever primitive kind its declared type names, so `"12"` declared as `int`
//! becomes `12` and `1.9` declared as `int` becomes `1`.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::Node;
use crate::value::Value;

static INT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[+-]?\d+").unwrap());
static FLOAT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

/// What a coercion sees of its input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarView<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
    Composite { empty: bool },
}

pub trait Scalar {
    fn view(&self) -> ScalarView<'_>;
}

impl Scalar for Value {
    fn view(&self) -> ScalarView<'_> {
        match self {
            Value::Null => ScalarView::Null,
            Value::Bool(b) => ScalarView::Bool(*b),
            Value::Int(i) => ScalarView::Int(*i),
            Value::Float(f) => ScalarView::Float(*f),
            Value::Str(s) => ScalarView::Str(s),
            Value::List(xs) => ScalarView::Composite { empty: xs.is_empty() },
            Value::Map(m) => ScalarView::Composite { empty: m.is_empty() },
            Value::Object(_) => ScalarView::Composite { empty: false },
        }
    }
}

impl Scalar for Node {
    fn view(&self) -> ScalarView<'_> {
        match self {
            Node::Null => ScalarView::Null,
            Node::Bool(b) => ScalarView::Bool(*b),
            Node::Int(i) => ScalarView::Int(*i),
            Node::Float(f) => ScalarView::Float(*f),
            Node::Str(s) => ScalarView::Str(s),
            Node::Seq(xs) => ScalarView::Composite { empty: xs.is_empty() },
            Node::Map(m) => ScalarView::Composite { empty: m.is_empty() },
        }
    }
}

/// A converted value plus whether information was dropped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced<T> {
    pub value: T,
    pub lossy: bool,
}

impl<T> Coerced<T> {
    fn exact(value: T) -> Self {
        Self { value, lossy: false }
    }

    fn lossy(value: T) -> Self {
        Self { value, lossy: true }
    }
}

pub fn to_bool(input: &impl Scalar) -> Coerced<bool> {
    match input.view() {
        ScalarView::Null => Coerced::exact(false),
        ScalarView::Bool(b) => Coerced::exact(b),
        ScalarView::Int(i) => Coerced::exact(i != 0),
        ScalarView::Float(f) => Coerced::exact(f != 0.0),
        ScalarView::Str(s) => Coerced::exact(!(s.is_empty() || s == "0")),
        ScalarView::Composite { empty } => Coerced::lossy(!empty),
    }
}

pub fn to_int(input: &impl Scalar) -> Coerced<i64> {
    match input.view() {
        ScalarView::Null => Coerced::exact(0),
        ScalarView::Bool(b) => Coerced::exact(b as i64),
        ScalarView::Int(i) => Coerced::exact(i),
        ScalarView::Float(f) => float_to_int(f),
        ScalarView::Str(s) => str_to_int(s),
        ScalarView::Composite { empty } => Coerced::lossy(if empty { 0 } else { 1 }),
    }
}

pub fn to_float(input: &impl Scalar) -> Coerced<f64> {
    match input.view() {
        ScalarView::Null => Coerced::exact(0.0),
        ScalarView::Bool(b) => Coerced::exact(if b { 1.0 } else { 0.0 }),
        ScalarView::Int(i) => Coerced { value: i as f64, lossy: i.unsigned_abs() > (1u64 << 53) },
        ScalarView::Float(f) => Coerced::exact(f),
        ScalarView::Str(s) => str_to_float(s),
        ScalarView::Composite { empty } => Coerced::lossy(if empty { 0.0 } else { 1.0 }),
    }
}

pub fn to_string(input: &impl Scalar) -> Coerced<String> {
    match input.view() {
        ScalarView::Null => Coerced::exact(String::new()),
        ScalarView::Bool(b) => Coerced::exact(if b { "1".into() } else { String::new() }),
        ScalarView::Int(i) => Coerced::exact(i.to_string()),
        ScalarView::Float(f) => Coerced::exact(f.to_string()),
        ScalarView::Str(s) => Coerced::exact(s.to_string()),
        ScalarView::Composite { .. } => Coerced::lossy(String::new()),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn float_to_int(f: f64) -> Coerced<i64> {
    if f.is_nan() {
        return Coerced::lossy(0);
    }
    // `as` saturates at the i64 bounds
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    Coerced { value: f as i64, lossy: f.fract() != 0.0 || !in_range }
}

fn str_to_int(s: &str) -> Coerced<i64> {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Coerced::exact(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return float_to_int(f);
        }
    }
    match INT_PREFIX.find(s) {
        Some(m) => {
            let digits = m.as_str().trim();
            let value = digits.parse::<i64>().unwrap_or(if digits.starts_with('-') { i64::MIN } else { i64::MAX });
            Coerced::lossy(value)
        }
        None => Coerced::lossy(0),
    }
}

fn str_to_float(s: &str) -> Coerced<f64> {
    let trimmed = s.trim();
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Coerced::exact(f);
        }
    }
    match FLOAT_PREFIX.find(s).and_then(|m| m.as_str().trim().parse::<f64>().ok()) {
        Some(f) => Coerced::lossy(f),
        None => Coerced::lossy(0.0),
    }
}
