//! # Error Definitions
//!
//! A remote call fails in one of four ways, and callers must be able to tell
//! them apart: the server said no (`Fault`), the server sent garbage
//! (`Malformed`), the caller passed something unencodable (`Unsupported`),
//! or the bytes never made the trip (`Transport`).

use thiserror::Error;

use crate::response::Fault;
use crate::transport::TransportError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The remote side reported an error.
    #[error("remote fault: {0}")]
    Fault(Fault),
    /// The response does not match the envelope grammar.
    #[error("malformed response: {0}")]
    Malformed(xmlpack::Malformed),
    /// A parameter has no wire form. Nothing was sent.
    #[error("unsupported value: {0}")]
    Unsupported(xmlpack::Unsupported),
    /// The transport failed to deliver the call or its reply.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl From<xmlpack::Error> for Error {
    fn from(e: xmlpack::Error) -> Self {
        match e {
            xmlpack::Error::Malformed(m) => Self::Malformed(m),
            xmlpack::Error::Unsupported(u) => Self::Unsupported(u),
        }
    }
}

impl From<xmlpack::Malformed> for Error {
    fn from(e: xmlpack::Malformed) -> Self { Self::Malformed(e) }
}

impl From<xmlpack::Unsupported> for Error {
    fn from(e: xmlpack::Unsupported) -> Self { Self::Unsupported(e) }
}

/// Specialized `Result` for envelope and client operations.
pub type Result<T> = std::result::Result<T, Error>;
