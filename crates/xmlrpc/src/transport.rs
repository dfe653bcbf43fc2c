//! # Transport Abstraction
//!
//! A minimal, async interface for moving request bytes to a server and
//! response bytes back.
//!
//! The transport knows nothing about envelopes or values. Status codes,
//! headers, cookies, retries and session credentials all live inside a
//! concrete transport; the codec never sees them.

use thiserror::Error;

/// Errors that occur at the network/transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer is unreachable or the connection was dropped.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
    /// No response arrived in time.
    #[error("request timed out")]
    Timeout,
    /// Generic I/O error or internal transport failure.
    #[error("i/o error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Sends a request document and waits for the response document.
///
/// Object-safe, so clients hold it as `Arc<dyn Transport>`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Must return the raw reply bytes, uninterpreted.
    async fn call(&self, payload: &[u8]) -> Result<Vec<u8>>;
}

/// An in-process transport that hands each request to a closure.
///
/// Useful for embedding a server in the same process, and for tests.
pub struct FnTransport<F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync + 'static,
{
    handler: F,
}

impl<F> FnTransport<F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync + 'static,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait::async_trait]
impl<F> Transport for FnTransport<F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync + 'static,
{
    async fn call(&self, payload: &[u8]) -> Result<Vec<u8>> {
        (self.handler)(payload)
    }
}
