//! # Error Definitions
//!
//! Encode failures and decode failures are kept apart: a value the encoder
//! refuses is a caller bug, while markup the decoder refuses is a peer bug.

use thiserror::Error;

/// Values that cannot be represented on the wire.
///
/// Raised before any text is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Unsupported {
    /// NaN or an infinity; the wire form has no spelling for these.
    #[error("non-finite double {0}")]
    NonFiniteDouble(f64),
    /// Method names are written verbatim and must be identifier-safe.
    #[error("invalid method name {0:?}")]
    InvalidMethodName(String),
}

/// Markup that does not match the value or envelope grammar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Malformed {
    /// The document bytes are not UTF-8.
    #[error("input is not valid UTF-8")]
    InvalidUtf8,
    /// Input ended inside a tag or before an element was closed.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// An element was opened and never closed.
    #[error("unterminated <{0}> element")]
    Unterminated(String),
    /// A closing tag does not match the innermost open element.
    #[error("expected </{expected}>, found </{found}> at byte {pos}")]
    MismatchedClose { expected: String, found: String, pos: usize },
    /// A tag was found where a different one was required.
    #[error("expected <{expected}>, found {found} at byte {pos}")]
    UnexpectedTag { expected: String, found: String, pos: usize },
    /// Non-whitespace text where only elements may appear.
    #[error("unexpected text {text:?} at byte {pos}")]
    UnexpectedText { text: String, pos: usize },
    /// A tag name outside the value grammar.
    #[error("unknown value tag <{0}>")]
    UnknownTag(String),
    /// Comments, CDATA, DOCTYPE and processing instructions are not part of the grammar.
    #[error("unsupported markup at byte {0}")]
    UnsupportedMarkup(usize),
    /// A tag with no name, or with characters a tag name cannot hold.
    #[error("invalid tag at byte {0}")]
    InvalidTag(usize),
    #[error("invalid integer {0:?}")]
    InvalidInteger(String),
    #[error("invalid double {0:?}")]
    InvalidDouble(String),
    #[error("invalid boolean {0:?}")]
    InvalidBoolean(String),
    /// A `<nil>` element with content.
    #[error("nil element has content")]
    NilWithContent,
    #[error("struct member {index} has no name")]
    MissingMemberName { index: usize },
    #[error("struct member {index} has no value")]
    MissingMemberValue { index: usize },
    /// A struct member carries more than one name or value.
    #[error("struct member {index} has a duplicate <{field}>")]
    DuplicateMemberField { index: usize, field: &'static str },
    /// A required envelope element is absent.
    #[error("missing <{0}> element")]
    MissingElement(&'static str),
    /// Content remains after the outermost element closed.
    #[error("trailing content at byte {0}")]
    TrailingContent(usize),
    /// Nesting went past `DecodeOptions::max_depth`.
    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),
}

/// Errors raised by the codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unsupported value: {0}")]
    Unsupported(#[from] Unsupported),
    #[error("malformed markup: {0}")]
    Malformed(#[from] Malformed),
}

impl Error {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed(_))
    }
}

/// Specialized `Result` for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
