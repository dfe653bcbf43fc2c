//! # Lexer
//!
//! Splits markup into open-tag, close-tag and text tokens.
//!
//! Only the constrained envelope grammar is recognised. A leading
//! `<?xml ...?>` prolog is skipped and attributes are ignored; comments,
//! CDATA, DOCTYPE and other processing instructions are errors. Tokens borrow from the input.

use crate::error::Malformed;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Open(&'a str),
    Close(&'a str),
    /// Raw text, still escaped, whitespace untouched.
    Text(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Byte offset of the token in the input.
    pub pos: usize,
}

impl<'a> Token<'a> {
    /// Short human form for error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Open(name) => format!("<{}>", name),
            TokenKind::Close(name) => format!("</{}>", name),
            TokenKind::Text(_) => "text".to_string(),
        }
    }
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    /// The close half of a self-closing tag.
    pending: Option<Token<'a>>,
    peeked: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0, pending: None, peeked: None }
    }

    /// Bytes consumed so far, excluding any peeked token.
    pub fn pos(&self) -> usize {
        match self.peeked {
            Some(tok) => tok.pos,
            None => self.pos,
        }
    }

    pub fn peek(&mut self) -> Result<Option<Token<'a>>> {
        if self.peeked.is_none() {
            self.peeked = self.lex()?;
        }
        Ok(self.peeked)
    }

    pub fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        match self.peeked.take() {
            Some(tok) => Ok(Some(tok)),
            None => self.lex(),
        }
    }

    fn lex(&mut self) -> Result<Option<Token<'a>>> {
        if let Some(tok) = self.pending.take() {
            return Ok(Some(tok));
        }

        let src = self.src;
        loop {
            let start = self.pos;
            let rest = &src[start..];
            if rest.is_empty() {
                return Ok(None);
            }

            if !rest.starts_with('<') {
                let len = rest.find('<').unwrap_or(rest.len());
                self.pos += len;
                return Ok(Some(Token { kind: TokenKind::Text(&rest[..len]), pos: start }));
            }

            if is_prolog(rest) && src[..start].trim().is_empty() {
                let end = rest.find("?>").ok_or(Malformed::UnexpectedEnd)?;
                self.pos += end + 2;
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                return Err(Malformed::UnsupportedMarkup(start).into());
            }

            let end = rest.find('>').ok_or(Malformed::UnexpectedEnd)?;
            self.pos += end + 1;

            if let Some(inner) = rest[..end].strip_prefix("</") {
                let name = inner.trim_end();
                check_name(name, start)?;
                return Ok(Some(Token { kind: TokenKind::Close(name), pos: start }));
            }

            let inner = &rest[1..end];
            let (inner, self_closing) = match inner.strip_suffix('/') {
                Some(inner) => (inner, true),
                None => (inner, false),
            };
            let name = inner.split(char::is_whitespace).next().unwrap_or("");
            check_name(name, start)?;

            if self_closing {
                self.pending = Some(Token { kind: TokenKind::Close(name), pos: start });
            }
            return Ok(Some(Token { kind: TokenKind::Open(name), pos: start }));
        }
    }
}

/// `<?xml` followed by whitespace or `?>`; `<?xml-stylesheet` is not a prolog.
fn is_prolog(rest: &str) -> bool {
    rest.strip_prefix("<?xml")
        .is_some_and(|after| after.starts_with("?>") || after.starts_with(char::is_whitespace))
}

fn check_name(name: &str, pos: usize) -> Result<()> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(Malformed::InvalidTag(pos).into())
    }
}
