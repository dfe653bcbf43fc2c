//! # Response Scanner
//!
//! Classifies a response document as a fault or a result.
//!
//! ## Invariants
//! - A `<fault>` element anywhere in the document wins, even when a
//!   well-formed `<params>` block is present too.
//! - A fault is never reported as success, whether or not a message can be
//!   recovered from it.
//! - A missing envelope element is `Malformed`, never an empty result.
//! - Only the first `<param>` is read; later ones are ignored.

use std::fmt;

use xmlpack::Decoder;
use xmlpack::Lexer;
use xmlpack::Malformed;
use xmlpack::TokenKind;
use xmlpack::Value;

use crate::error::Result;

/// Message used when a fault carries no readable text.
pub const NO_FAULT_MESSAGE: &str = "<protocol fault, no message>";

/// A remote-side error report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// `faultCode`, when the server sent an integer one.
    pub code: Option<i64>,
    pub message: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// What a well-formed response document says.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Fault(Fault),
}

impl Outcome {
    pub fn into_result(self) -> std::result::Result<Value, Fault> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Fault(fault) => Err(fault),
        }
    }
}

/// Scans a response document.
pub fn scan_response(document: &str) -> Result<Outcome> {
    if let Some(pos) = find_open(document, "fault")? {
        return Ok(Outcome::Fault(read_fault(&document[pos..])));
    }

    let mut dec = Decoder::new(document);
    require(&mut dec, "methodResponse")?;
    require(&mut dec, "params")?;
    require(&mut dec, "param")?;
    let value = dec.value_element()?;
    dec.expect_close("param")?;

    loop {
        match dec.next_element()? {
            Some(tok) if tok.kind == TokenKind::Open("param") => dec.skip_element("param")?,
            Some(tok) if tok.kind == TokenKind::Close("params") => break,
            Some(tok) => {
                return Err(Malformed::UnexpectedTag {
                    expected: "/params".to_string(),
                    found: tok.describe(),
                    pos: tok.pos,
                }
                .into());
            }
            None => return Err(Malformed::Unterminated("params".to_string()).into()),
        }
    }

    dec.expect_close("methodResponse")?;
    dec.finish()?;
    Ok(Outcome::Success(value))
}

/// Byte offset of the first `<tag>` in the document.
fn find_open(document: &str, tag: &str) -> Result<Option<usize>> {
    let mut lexer = Lexer::new(document);
    while let Some(tok) = lexer.next_token()? {
        if tok.kind == TokenKind::Open(tag) {
            return Ok(Some(tok.pos));
        }
    }
    Ok(None)
}

/// Consumes `<tag>`; anything else means the element is missing.
fn require(dec: &mut Decoder<'_>, tag: &'static str) -> Result<()> {
    match dec.next_element()? {
        Some(tok) if tok.kind == TokenKind::Open(tag) => Ok(()),
        _ => Err(Malformed::MissingElement(tag).into()),
    }
}

/// Builds a `Fault` from markup starting at `<fault>`.
///
/// The message is `faultString` when present, else the first string in the
/// fault value. When the value does not parse, the fault is salvaged from
/// its raw text instead.
fn read_fault(markup: &str) -> Fault {
    let mut dec = Decoder::new(markup);
    let value = match dec.expect_open("fault").and_then(|_| dec.value_element()) {
        Ok(value) => value,
        Err(_) => return salvage_fault(markup),
    };

    let code = value.get("faultCode").and_then(Value::as_i64);
    let message = value
        .get("faultString")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| first_string(&value))
        .map_or_else(|| NO_FAULT_MESSAGE.to_string(), str::to_string);

    Fault { code, message }
}

/// First `String` in the tree, depth-first in source order.
fn first_string(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
        Value::Array(items) => items.iter().find_map(first_string),
        Value::Struct(members) => members.iter().find_map(|(_, v)| first_string(v)),
        _ => None,
    }
}

/// Token-level reading of a fault whose value does not parse.
///
/// Text directly inside `<name>` labels the enclosing member and is never a
/// message. The `faultString` member's text wins, then the first text-typed
/// node (`<string>` or bare `<value>` text) before `</fault>`.
fn salvage_fault(markup: &str) -> Fault {
    let mut lexer = Lexer::new(markup);
    let mut enclosing: Option<&str> = None;
    let mut member: Option<String> = None;
    let mut code = None;
    let mut fault_string = None;
    let mut first_text = None;

    while let Ok(Some(tok)) = lexer.next_token() {
        match tok.kind {
            TokenKind::Close("fault") => break,
            TokenKind::Close("member") => {
                member = None;
                enclosing = None;
            }
            TokenKind::Open(name) => enclosing = Some(name),
            TokenKind::Close(_) => enclosing = None,
            TokenKind::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if enclosing == Some("name") {
                    member = Some(xmlpack::unescape(text).into_owned());
                    continue;
                }
                match (enclosing, member.as_deref()) {
                    (Some("int" | "i4" | "i8"), Some("faultCode")) => {
                        code = code.or_else(|| text.parse::<i64>().ok());
                    }
                    (Some("string" | "value"), member_name) => {
                        let text = xmlpack::unescape(text).into_owned();
                        if member_name == Some("faultString") && fault_string.is_none() {
                            fault_string = Some(text.clone());
                        }
                        first_text.get_or_insert(text);
                    }
                    _ => {}
                }
            }
        }
    }

    let message = fault_string.or(first_text).unwrap_or_else(|| NO_FAULT_MESSAGE.to_string());
    Fault { code, message }
}
