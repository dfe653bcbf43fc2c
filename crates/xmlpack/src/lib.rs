//! # xmlpack
//!
//! A small, strict codec for the tagged-XML value format used by remote
//! method calls.
//!
//! ## Format
//!
//! - **Scalars**: `<int>`/`<i4>`/`<i8>`, `<double>`, `<boolean>` (`0`/`1`),
//!   `<string>`, `<nil/>`. Bare text inside `<value>` is a string.
//! - **Array**: `<array><data><value>..</value>..</data></array>`
//! - **Struct**: `<struct><member><name>..</name><value>..</value></member>..</struct>`
//!
//! Encoding and decoding are pure functions over in-memory text. There is
//! no shared state; every call builds a fresh tree owned by the caller.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod lexer;
pub mod value;


pub use crate::error::Error;
pub use crate::error::Malformed;
pub use crate::error::Result;
pub use crate::error::Unsupported;

pub use crate::value::Kind;
pub use crate::value::Value;

pub use crate::escape::escape;
pub use crate::escape::unescape;

pub use crate::encoder::EncodeOptions;
pub use crate::encoder::Encoder;
pub use crate::encoder::NilPolicy;
pub use crate::encoder::check_value;
pub use crate::encoder::encode_value;
pub use crate::encoder::encode_value_with;

pub use crate::decoder::DecodeOptions;
pub use crate::decoder::Decoder;
pub use crate::decoder::decode_value;
pub use crate::decoder::decode_value_with;
pub use crate::decoder::parse_value;
pub use crate::decoder::parse_value_with;

pub use crate::lexer::Lexer;
pub use crate::lexer::Token;
pub use crate::lexer::TokenKind;
