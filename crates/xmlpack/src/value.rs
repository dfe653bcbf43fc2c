//! # Value Model
//!
//! The closed set of shapes shared by the encode and decode paths.

use std::collections::HashMap;
use std::fmt;

/// One datum on the wire.
///
/// `Struct` keeps every `(name, value)` pair in source order, duplicates
/// included. Name lookups (`get`, `to_map`) resolve duplicates last-write-wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
}

/// The variant of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Boolean,
    Integer,
    Double,
    String,
    Array,
    Struct,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Nil => "nil",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Struct => "struct",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Double(_) => Kind::Double,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Struct(_) => Kind::Struct,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to doubles; servers are loose about which one they send.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The full ordered member sequence of a struct.
    pub fn as_members(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Looks up a struct member by name. The last member with that name wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_members()?
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// A name to value view of a struct, last-write-wins over duplicates.
    pub fn to_map(&self) -> Option<HashMap<&str, &Value>> {
        let members = self.as_members()?;
        let mut map = HashMap::with_capacity(members.len());
        for (name, value) in members {
            map.insert(name.as_str(), value);
        }
        Some(map)
    }
}

/// Tears nested containers down from a heap worklist, so dropping a value
/// never recurses once per nesting level.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = match self {
            Value::Array(items) if !items.is_empty() => std::mem::take(items),
            Value::Struct(members) if !members.is_empty() => {
                std::mem::take(members).into_iter().map(|(_, v)| v).collect()
            }
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::Array(items) => pending.append(items),
                Value::Struct(members) => pending.extend(members.drain(..).map(|(_, v)| v)),
                _ => {}
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Boolean(b) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Integer(n.into()) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Integer(n) }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self { Value::Double(d) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self { Value::Array(items) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}

/// Collects `(name, value)` pairs into a `Struct`, preserving order.
impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Struct(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
