//! # Encoder
//!
//! Writes values as tagged markup into an owned buffer.
//!
//! ## Invariants
//! - A value is checked in full before its first byte is written, so a
//!   rejected value never leaves partial markup behind.
//! - Output is a pure function of the value and the `EncodeOptions`.

use std::fmt::Write;

use crate::error::Result;
use crate::error::Unsupported;
use crate::escape::escape;
use crate::value::Value;

/// How `Value::Nil` is spelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NilPolicy {
    /// `<boolean>0</boolean>`, the dialect every server understands.
    /// A decoded `false` and an encoded nil become indistinguishable.
    #[default]
    AsFalse,
    /// `<nil/>`, the extended dialect.
    Explicit,
}

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    pub nil: NilPolicy,
}

impl EncodeOptions {
    pub fn with_nil(mut self, nil: NilPolicy) -> Self {
        self.nil = nil;
        self
    }
}

/// Accumulates markup for one document.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: String,
    options: EncodeOptions,
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_options(EncodeOptions::default())
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        Self { buf: String::with_capacity(256), options }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Writes the `<?xml ...?>` prolog.
    pub fn prolog(&mut self) {
        self.buf.push_str(r#"<?xml version="1.0"?>"#);
    }

    /// Writes an opening tag. Tag names are trusted and written verbatim.
    pub fn open(&mut self, tag: &str) {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    pub fn close(&mut self, tag: &str) {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    /// Writes escaped text content.
    pub fn text(&mut self, text: &str) {
        self.buf.push_str(&escape(text));
    }

    /// Writes `<value>...</value>` around the typed markup of `val`.
    pub fn value(&mut self, val: &Value) -> Result<()> {
        check_value(val)?;
        self.write_value(val);
        Ok(())
    }

    /// Writes `<value>` around an integer. Every integer has a wire form.
    pub fn int_value(&mut self, n: i64) {
        self.write_value(&Value::Integer(n));
    }

    /// Writes `<value>` around a string.
    pub fn string_value(&mut self, s: &str) {
        self.open("value");
        self.open("string");
        self.text(s);
        self.close("string");
        self.close("value");
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    fn write_value(&mut self, val: &Value) {
        self.open("value");
        self.write_typed(val);
        self.close("value");
    }

    fn write_typed(&mut self, val: &Value) {
        match val {
            Value::Nil => match self.options.nil {
                NilPolicy::AsFalse => self.buf.push_str("<boolean>0</boolean>"),
                NilPolicy::Explicit => self.buf.push_str("<nil/>"),
            },
            Value::Boolean(b) => {
                self.buf.push_str(if *b { "<boolean>1</boolean>" } else { "<boolean>0</boolean>" });
            }
            Value::Integer(n) => {
                let tag = if i32::try_from(*n).is_ok() { "int" } else { "i8" };
                self.open(tag);
                // Writing into a String cannot fail.
                let _ = write!(self.buf, "{}", n);
                self.close(tag);
            }
            Value::Double(d) => {
                self.open("double");
                // f64's Display is the shortest round-trip decimal and never uses an exponent.
                let _ = write!(self.buf, "{}", d);
                self.close("double");
            }
            Value::String(s) => {
                self.open("string");
                self.text(s);
                self.close("string");
            }
            Value::Array(items) => {
                self.open("array");
                self.open("data");
                for item in items {
                    self.write_value(item);
                }
                self.close("data");
                self.close("array");
            }
            Value::Struct(members) => {
                self.open("struct");
                for (name, value) in members {
                    self.open("member");
                    self.open("name");
                    self.text(name);
                    self.close("name");
                    self.write_value(value);
                    self.close("member");
                }
                self.close("struct");
            }
        }
    }
}

/// Rejects values with no wire spelling, anywhere in the tree.
pub fn check_value(val: &Value) -> Result<()> {
    match val {
        Value::Double(d) if !d.is_finite() => Err(Unsupported::NonFiniteDouble(*d).into()),
        Value::Array(items) => items.iter().try_for_each(check_value),
        Value::Struct(members) => members.iter().try_for_each(|(_, v)| check_value(v)),
        _ => Ok(()),
    }
}

/// Encodes a single value, including its `<value>` wrapper.
pub fn encode_value(val: &Value) -> Result<String> {
    encode_value_with(val, &EncodeOptions::default())
}

pub fn encode_value_with(val: &Value, options: &EncodeOptions) -> Result<String> {
    let mut enc = Encoder::with_options(*options);
    enc.value(val)?;
    Ok(enc.into_string())
}
