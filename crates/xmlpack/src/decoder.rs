//! # Decoder
//!
//! Pull parser over the [`Lexer`] token stream.
//!
//! Open arrays and structs live on a heap stack of frames rather than the
//! call stack. Each array element and struct member value is parsed to its
//! own matching `</value>` before the next sibling is looked at, so nested
//! containers delimit themselves. Running out of input before the matching
//! close is an error, never a truncated collection.
//!
//! ## Invariants
//! - No fixed depth limit unless `DecodeOptions::max_depth` asks for one.
//! - Every error carries no partial result.

use crate::error::Malformed;
use crate::error::Result;
use crate::escape::unescape;
use crate::lexer::Lexer;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::value::Value;

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Maximum array/struct nesting. `None` is unbounded.
    pub max_depth: Option<usize>,
}

impl DecodeOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Typed elements allowed directly inside `<value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeTag {
    Integer,
    Double,
    Boolean,
    Nil,
    String,
    Array,
    Struct,
}

impl TypeTag {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" | "i4" | "i8" => Some(TypeTag::Integer),
            "double" => Some(TypeTag::Double),
            "boolean" => Some(TypeTag::Boolean),
            "nil" => Some(TypeTag::Nil),
            "string" => Some(TypeTag::String),
            "array" => Some(TypeTag::Array),
            "struct" => Some(TypeTag::Struct),
            _ => None,
        }
    }
}

/// An array or struct whose closing tag has not been seen yet.
enum Frame {
    /// Items collected inside `<data>`.
    Array(Vec<Value>),
    /// Completed members, plus the member being read when inside `<member>`.
    Struct { members: Vec<(String, Value)>, member: Option<Member> },
}

impl Frame {
    /// Stores a finished child value.
    fn attach(&mut self, value: Value) {
        match self {
            Frame::Array(items) => items.push(value),
            Frame::Struct { member, .. } => member.get_or_insert_with(Member::default).value = Some(value),
        }
    }
}

#[derive(Default)]
struct Member {
    name: Option<String>,
    value: Option<Value>,
}

/// Pull decoder over one markup document.
///
/// The envelope layer walks wrappers with `expect_open`/`expect_close` and
/// hands each `<value>` to `value_element`.
pub struct Decoder<'a> {
    lexer: Lexer<'a>,
    options: DecodeOptions,
}

impl<'a> Decoder<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_options(src, DecodeOptions::default())
    }

    pub fn with_options(src: &'a str, options: DecodeOptions) -> Self {
        Self { lexer: Lexer::new(src), options }
    }

    /// Next open or close tag. Whitespace between elements is skipped; any
    /// other text is an error.
    pub fn next_element(&mut self) -> Result<Option<Token<'a>>> {
        loop {
            match self.lexer.next_token()? {
                Some(Token { kind: TokenKind::Text(text), pos }) => {
                    if !text.trim().is_empty() {
                        return Err(Malformed::UnexpectedText { text: text.trim().to_string(), pos }.into());
                    }
                }
                other => return Ok(other),
            }
        }
    }

    /// Consumes `<tag>`.
    pub fn expect_open(&mut self, tag: &'static str) -> Result<()> {
        match self.next_element()? {
            Some(Token { kind: TokenKind::Open(name), .. }) if name == tag => Ok(()),
            Some(tok) => Err(Malformed::UnexpectedTag {
                expected: tag.to_string(),
                found: tok.describe(),
                pos: tok.pos,
            }
            .into()),
            None => Err(Malformed::MissingElement(tag).into()),
        }
    }

    /// Consumes `</tag>`.
    pub fn expect_close(&mut self, tag: &str) -> Result<()> {
        match self.next_element()? {
            Some(Token { kind: TokenKind::Close(name), .. }) if name == tag => Ok(()),
            Some(Token { kind: TokenKind::Close(name), pos }) => Err(Malformed::MismatchedClose {
                expected: tag.to_string(),
                found: name.to_string(),
                pos,
            }
            .into()),
            Some(tok) => Err(Malformed::UnexpectedTag {
                expected: format!("/{}", tag),
                found: tok.describe(),
                pos: tok.pos,
            }
            .into()),
            None => Err(Malformed::Unterminated(tag.to_string()).into()),
        }
    }

    /// Skips everything up to and including the `</tag>` that closes an
    /// already consumed `<tag>`. Content is not validated.
    pub fn skip_element(&mut self, tag: &str) -> Result<()> {
        let mut open = 1usize;
        while open > 0 {
            match self.lexer.next_token()? {
                Some(Token { kind: TokenKind::Open(name), .. }) if name == tag => open += 1,
                Some(Token { kind: TokenKind::Close(name), .. }) if name == tag => open -= 1,
                Some(_) => {}
                None => return Err(Malformed::Unterminated(tag.to_string()).into()),
            }
        }
        Ok(())
    }

    /// Fails unless only whitespace remains.
    pub fn finish(&mut self) -> Result<()> {
        match self.next_element()? {
            None => Ok(()),
            Some(tok) => Err(Malformed::TrailingContent(tok.pos).into()),
        }
    }

    /// Parses a complete `<value>...</value>` element.
    pub fn value_element(&mut self) -> Result<Value> {
        self.expect_open("value")?;
        self.value_body(Some("value"))
    }

    /// Raw text up to `</tag>`, for leaf elements whose open tag was consumed.
    pub fn text_content(&mut self, tag: &str) -> Result<&'a str> {
        let text = match self.lexer.peek()? {
            Some(Token { kind: TokenKind::Text(text), .. }) => {
                self.lexer.next_token()?;
                text
            }
            _ => "",
        };
        match self.lexer.next_token()? {
            Some(Token { kind: TokenKind::Close(name), .. }) if name == tag => Ok(text),
            Some(Token { kind: TokenKind::Close(name), pos }) => Err(Malformed::MismatchedClose {
                expected: tag.to_string(),
                found: name.to_string(),
                pos,
            }
            .into()),
            Some(tok) => Err(Malformed::UnexpectedTag {
                expected: format!("/{}", tag),
                found: tok.describe(),
                pos: tok.pos,
            }
            .into()),
            None => Err(Malformed::Unterminated(tag.to_string()).into()),
        }
    }

    /// Content of a value element: bare text or one typed element, then the
    /// closing tag.
    ///
    /// `end` is the closing tag to stop at, or `None` when the content runs
    /// to the end of input. Arrays and structs are held on a heap stack of
    /// open frames, so nesting depth is bounded by memory only.
    fn value_body(&mut self, end: Option<&str>) -> Result<Value> {
        let mut stack = Vec::new();
        let mut done = self.value_start(&mut stack)?;

        loop {
            let value = match done.take() {
                Some(value) => value,
                None => {
                    done = self.step(&mut stack)?;
                    continue;
                }
            };

            match stack.last_mut() {
                Some(parent) => {
                    self.expect_close("value")?;
                    parent.attach(value);
                }
                None => {
                    self.close_body(end)?;
                    return Ok(value);
                }
            }
        }
    }

    fn close_body(&mut self, end: Option<&str>) -> Result<()> {
        match end {
            Some(tag) => self.expect_close(tag),
            None => self.finish(),
        }
    }

    /// Starts a value whose `<value>` open tag has been consumed. Returns the
    /// value when it is complete, or `None` after pushing a container frame.
    fn value_start(&mut self, stack: &mut Vec<Frame>) -> Result<Option<Value>> {
        let mut bare = "";
        if let Some(Token { kind: TokenKind::Text(text), .. }) = self.lexer.peek()? {
            self.lexer.next_token()?;
            bare = text;
        }

        match self.lexer.peek()? {
            Some(Token { kind: TokenKind::Open(name), pos }) => {
                if !bare.trim().is_empty() {
                    return Err(Malformed::UnexpectedText { text: bare.trim().to_string(), pos }.into());
                }
                self.lexer.next_token()?;
                self.typed_element(name, stack)
            }
            _ => Ok(Some(Value::String(unescape(bare.trim()).into_owned()))),
        }
    }

    fn typed_element(&mut self, name: &'a str, stack: &mut Vec<Frame>) -> Result<Option<Value>> {
        let tag = TypeTag::from_name(name).ok_or_else(|| Malformed::UnknownTag(name.to_string()))?;

        let value = match tag {
            TypeTag::Integer => {
                let text = self.text_content(name)?.trim();
                text.parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| Malformed::InvalidInteger(text.to_string()))?
            }
            TypeTag::Double => {
                let text = self.text_content(name)?.trim();
                match text.parse::<f64>() {
                    Ok(d) if d.is_finite() => Value::Double(d),
                    _ => return Err(Malformed::InvalidDouble(text.to_string()).into()),
                }
            }
            TypeTag::Boolean => match self.text_content(name)?.trim() {
                "1" => Value::Boolean(true),
                "0" => Value::Boolean(false),
                other => return Err(Malformed::InvalidBoolean(other.to_string()).into()),
            },
            TypeTag::Nil => {
                if !self.text_content(name)?.trim().is_empty() {
                    return Err(Malformed::NilWithContent.into());
                }
                Value::Nil
            }
            TypeTag::String => Value::String(unescape(self.text_content(name)?).into_owned()),
            TypeTag::Array => {
                self.enter(stack.len())?;
                return self.array_start(stack);
            }
            TypeTag::Struct => {
                self.enter(stack.len())?;
                stack.push(Frame::Struct { members: Vec::new(), member: None });
                return Ok(None);
            }
        };
        Ok(Some(value))
    }

    fn enter(&self, depth: usize) -> Result<()> {
        match self.options.max_depth {
            Some(max) if depth >= max => Err(Malformed::DepthLimitExceeded(max).into()),
            _ => Ok(()),
        }
    }

    /// After `<array>`: an optional `<data>` holding sibling values.
    fn array_start(&mut self, stack: &mut Vec<Frame>) -> Result<Option<Value>> {
        match self.next_element()? {
            Some(Token { kind: TokenKind::Close("array"), .. }) => Ok(Some(Value::Array(Vec::new()))),
            Some(Token { kind: TokenKind::Open("data"), .. }) => {
                stack.push(Frame::Array(Vec::new()));
                Ok(None)
            }
            Some(tok) => Err(Malformed::UnexpectedTag {
                expected: "data".to_string(),
                found: tok.describe(),
                pos: tok.pos,
            }
            .into()),
            None => Err(Malformed::Unterminated("array".to_string()).into()),
        }
    }

    /// Advances the innermost open container by one element.
    fn step(&mut self, stack: &mut Vec<Frame>) -> Result<Option<Value>> {
        let tok = self.next_element()?;
        match stack.pop() {
            Some(Frame::Array(items)) => self.array_step(tok, items, stack),
            Some(Frame::Struct { members, member }) => self.struct_step(tok, members, member, stack),
            None => Err(Malformed::UnexpectedEnd.into()),
        }
    }

    fn array_step(
        &mut self,
        tok: Option<Token<'a>>,
        items: Vec<Value>,
        stack: &mut Vec<Frame>,
    ) -> Result<Option<Value>> {
        match tok {
            Some(Token { kind: TokenKind::Open("value"), .. }) => {
                stack.push(Frame::Array(items));
                self.value_start(stack)
            }
            Some(Token { kind: TokenKind::Close("data"), .. }) => {
                self.expect_close("array")?;
                Ok(Some(Value::Array(items)))
            }
            Some(tok) => Err(Malformed::UnexpectedTag {
                expected: "value".to_string(),
                found: tok.describe(),
                pos: tok.pos,
            }
            .into()),
            None => Err(Malformed::Unterminated("data".to_string()).into()),
        }
    }

    /// Struct members in source order, duplicates kept. Inside a member the
    /// `<name>` and `<value>` may come in either order.
    fn struct_step(
        &mut self,
        tok: Option<Token<'a>>,
        mut members: Vec<(String, Value)>,
        member: Option<Member>,
        stack: &mut Vec<Frame>,
    ) -> Result<Option<Value>> {
        let index = members.len();
        let Some(mut member) = member else {
            return match tok {
                Some(Token { kind: TokenKind::Open("member"), .. }) => {
                    stack.push(Frame::Struct { members, member: Some(Member::default()) });
                    Ok(None)
                }
                Some(Token { kind: TokenKind::Close("struct"), .. }) => Ok(Some(Value::Struct(members))),
                Some(tok) => Err(Malformed::UnexpectedTag {
                    expected: "member".to_string(),
                    found: tok.describe(),
                    pos: tok.pos,
                }
                .into()),
                None => Err(Malformed::Unterminated("struct".to_string()).into()),
            };
        };

        match tok {
            Some(Token { kind: TokenKind::Open("name"), .. }) => {
                if member.name.is_some() {
                    return Err(Malformed::DuplicateMemberField { index, field: "name" }.into());
                }
                member.name = Some(unescape(self.text_content("name")?).into_owned());
                stack.push(Frame::Struct { members, member: Some(member) });
                Ok(None)
            }
            Some(Token { kind: TokenKind::Open("value"), .. }) => {
                if member.value.is_some() {
                    return Err(Malformed::DuplicateMemberField { index, field: "value" }.into());
                }
                stack.push(Frame::Struct { members, member: Some(member) });
                self.value_start(stack)
            }
            Some(Token { kind: TokenKind::Close("member"), .. }) => {
                let name = member.name.ok_or(Malformed::MissingMemberName { index })?;
                let value = member.value.ok_or(Malformed::MissingMemberValue { index })?;
                members.push((name, value));
                stack.push(Frame::Struct { members, member: None });
                Ok(None)
            }
            Some(tok) => Err(Malformed::UnexpectedTag {
                expected: "name".to_string(),
                found: tok.describe(),
                pos: tok.pos,
            }
            .into()),
            None => Err(Malformed::Unterminated("member".to_string()).into()),
        }
    }
}

/// Parses the inner markup of a `<value>` element.
///
/// Bare text (no type tag) decodes to a trimmed, unescaped `String`.
pub fn parse_value(markup: &str) -> Result<Value> {
    parse_value_with(markup, &DecodeOptions::default())
}

pub fn parse_value_with(markup: &str, options: &DecodeOptions) -> Result<Value> {
    Decoder::with_options(markup, *options).value_body(None)
}

/// Parses a complete `<value>` element, the inverse of `encode_value`.
pub fn decode_value(markup: &str) -> Result<Value> {
    decode_value_with(markup, &DecodeOptions::default())
}

pub fn decode_value_with(markup: &str, options: &DecodeOptions) -> Result<Value> {
    let mut dec = Decoder::with_options(markup, *options);
    let value = dec.value_element()?;
    dec.finish()?;
    Ok(value)
}
