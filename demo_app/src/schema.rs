//! Declarative input schemas for tools, and the validator that applies them.
//!
//! A tool's input is described by a static [`SchemaDescriptor`]: a table of [`FieldDescriptor`]s
//! plus a flag saying whether keys outside the table are rejected. The same table drives both
//! validation of incoming arguments and the JSON Schema advertised in `tools/list`, so the two
//! cannot drift apart.
//!
//! Validation is all-or-nothing. Every violation found is collected into one [`ValidationError`];
//! nothing short-circuits on the first problem.

use serde_json::{json, Map, Value};
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

/// The JSON type a field is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Number,
    String,
    Boolean,
}

impl FieldType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
        }
    }

    /// Coerce a raw JSON value to this type.
    ///
    /// Integers accept whole JSON numbers in `i64` range, floats without a fractional part,
    /// booleans (as 0 and 1), and strings holding a whole base-10 number. Such strings may carry
    /// `_` between digits and a zero fraction, so `"1_000"` and `"4.0"` both parse. Numbers accept
    /// any finite number, numeric string or boolean. Strings and booleans must already be of that
    /// JSON type.
    fn coerce(&self, value: &Value) -> Option<FieldValue> {
        match (self, value) {
            (FieldType::Integer, Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Some(FieldValue::Integer(i))
                } else if n.is_f64() {
                    n.as_f64().and_then(whole_f64_to_i64).map(FieldValue::Integer)
                } else {
                    // u64 above i64::MAX
                    None
                }
            }
            (FieldType::Integer, Value::Bool(b)) => Some(FieldValue::Integer(i64::from(*b))),
            (FieldType::Integer, Value::String(s)) => parse_integer_str(s).map(FieldValue::Integer),
            (FieldType::Number, Value::Number(n)) => n.as_f64().map(FieldValue::Number),
            (FieldType::Number, Value::Bool(b)) => {
                Some(FieldValue::Number(f64::from(u8::from(*b))))
            }
            (FieldType::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(FieldValue::Number),
            (FieldType::String, Value::String(s)) => Some(FieldValue::String(s.clone())),
            (FieldType::Boolean, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an optionally signed decimal integer. Single underscores may separate digits, and a
/// fractional part is allowed only if it is all zeros.
fn parse_integer_str(s: &str) -> Option<i64> {
    let s = s.trim();
    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (s, ""),
    };
    if !fraction.bytes().all(|b| b == b'0') {
        return None;
    }

    let (negative, digits) = match whole.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, whole.strip_prefix('+').unwrap_or(whole)),
    };
    let well_formed = !digits.is_empty()
        && digits.split('_').all(|group| {
            !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit())
        });
    if !well_formed {
        return None;
    }

    let mut cleaned = String::with_capacity(digits.len() + 1);
    if negative {
        cleaned.push('-');
    }
    cleaned.extend(digits.chars().filter(|c| *c != '_'));
    cleaned.parse().ok()
}

fn whole_f64_to_i64(f: f64) -> Option<i64> {
    // 2^63 as f64; i64::MAX itself is not representable.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A default substituted when a field is absent. Kept `const`-friendly so schemas can be statics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Integer(i64),
    Number(f64),
    String(&'static str),
    Boolean(bool),
}

impl FieldDefault {
    fn to_value(self) -> FieldValue {
        match self {
            FieldDefault::Integer(i) => FieldValue::Integer(i),
            FieldDefault::Number(n) => FieldValue::Number(n),
            FieldDefault::String(s) => FieldValue::String(s.to_string()),
            FieldDefault::Boolean(b) => FieldValue::Boolean(b),
        }
    }

    fn to_json(self) -> Value {
        match self {
            FieldDefault::Integer(i) => json!(i),
            FieldDefault::Number(n) => json!(n),
            FieldDefault::String(s) => json!(s),
            FieldDefault::Boolean(b) => json!(b),
        }
    }
}

/// A validated, coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    String(String),
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: FieldType,
    pub description: &'static str,
    pub default: Option<FieldDefault>,
    pub required: bool,
}

impl FieldDescriptor {
    /// An optional field with no default.
    pub const fn new(name: &'static str, ty: FieldType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            description,
            default: None,
            required: false,
        }
    }

    pub const fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// The declared shape of a tool's arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaDescriptor {
    pub fields: &'static [FieldDescriptor],
    pub reject_unknown_fields: bool,
}

impl SchemaDescriptor {
    pub const fn new(fields: &'static [FieldDescriptor]) -> Self {
        Self {
            fields,
            reject_unknown_fields: false,
        }
    }

    /// Reject any argument key that isn't a declared field.
    pub const fn deny_unknown_fields(mut self) -> Self {
        self.reject_unknown_fields = true;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Validate raw arguments, applying defaults and coercing each declared field.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<Arguments, ValidationError> {
        let mut values = BTreeMap::new();
        let mut violations = Vec::new();

        for field in self.fields {
            match raw.get(field.name) {
                Some(value) => match field.ty.coerce(value) {
                    Some(coerced) => {
                        values.insert(field.name, coerced);
                    }
                    None => violations.push(Violation::TypeMismatch {
                        field: field.name.to_string(),
                        expected: field.ty,
                        found: json_type_name(value),
                    }),
                },
                None => match field.default {
                    Some(default) => {
                        values.insert(field.name, default.to_value());
                    }
                    None if field.required => violations.push(Violation::MissingRequiredField {
                        field: field.name.to_string(),
                    }),
                    None => {}
                },
            }
        }

        if self.reject_unknown_fields {
            let mut unknown: Vec<&String> = raw
                .keys()
                .filter(|key| self.field(key).is_none())
                .collect();
            unknown.sort();
            violations.extend(
                unknown
                    .into_iter()
                    .map(|key| Violation::UnknownField { field: key.clone() }),
            );
        }

        if violations.is_empty() {
            Ok(Arguments { values })
        } else {
            Err(ValidationError { violations })
        }
    }

    /// The JSON Schema advertised to clients for this shape.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                let mut property = Map::new();
                property.insert("type".into(), json!(field.ty.as_str()));
                if let Some(default) = field.default {
                    property.insert("default".into(), default.to_json());
                }
                if !field.description.is_empty() {
                    property.insert("description".into(), json!(field.description));
                }
                (field.name.to_string(), Value::Object(property))
            })
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name)
            .collect();
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        if self.reject_unknown_fields {
            schema.insert("additionalProperties".into(), json!(false));
        }
        Value::Object(schema)
    }
}

/// Arguments that passed validation, keyed by field name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    values: BTreeMap<&'static str, FieldValue>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(FieldValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One problem found while validating arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingRequiredField {
        field: String,
    },
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: &'static str,
    },
    UnknownField {
        field: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingRequiredField { field } => write!(f, "{field}: field required"),
            Violation::TypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "{field}: expected {expected}, got {found}"),
            Violation::UnknownField { field } => {
                write!(f, "{field}: extra fields not permitted")
            }
        }
    }
}

/// Every violation found in one set of arguments. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_violations(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl From<Violation> for ValidationError {
    fn from(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

/// A typed tool input, built from arguments validated against its declared schema.
pub trait ToolInput: Sized {
    const SCHEMA: SchemaDescriptor;

    /// Build the typed value. `args` has already passed `SCHEMA`.
    fn from_arguments(args: &Arguments) -> Result<Self, ValidationError>;

    fn parse(raw: &Map<String, Value>) -> Result<Self, ValidationError> {
        let args = Self::SCHEMA.validate(raw)?;
        Self::from_arguments(&args)
    }
}
