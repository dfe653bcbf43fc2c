//! # RPC Client
//!
//! Composes the envelope encoder, a transport, and the response scanner:
//! `scan_response(transport.call(encode_call(method, params)))`.
//!
//! The client is stateless beyond its transport handle. Concurrent calls
//! share nothing but that handle, so no ordering is imposed between them.

use std::sync::Arc;

use xmlpack::EncodeOptions;
use xmlpack::Malformed;
use xmlpack::Value;

use crate::envelope::encode_call_with;
use crate::error::Error;
use crate::error::Result;
use crate::response::Outcome;
use crate::response::scan_response;
use crate::transport::Transport;

/// Remote-call client over a transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    options: EncodeOptions,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_options(transport, EncodeOptions::default())
    }

    pub fn with_options(transport: Arc<dyn Transport>, options: EncodeOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Calls `method` and returns its result value.
    ///
    /// A server fault becomes `Error::Fault`; use `call_outcome` to branch on
    /// faults without treating them as errors.
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        match self.call_outcome(method, params).await? {
            Outcome::Success(value) => Ok(value),
            Outcome::Fault(fault) => Err(Error::Fault(fault)),
        }
    }

    /// Calls `method` and returns the response outcome as-is.
    pub async fn call_outcome(&self, method: &str, params: &[Value]) -> Result<Outcome> {
        let payload = encode_call_with(method, params, &self.options)?;
        tracing::debug!(method, params = params.len(), bytes = payload.len(), "sending call");

        let reply = self.transport.call(payload.as_bytes()).await.inspect_err(|e| {
            tracing::warn!(method, error = %e, "transport failed");
        })?;
        tracing::debug!(method, bytes = reply.len(), "received response");

        let document = std::str::from_utf8(&reply).map_err(|_| Error::Malformed(Malformed::InvalidUtf8))?;
        match scan_response(document) {
            Ok(Outcome::Fault(fault)) => {
                tracing::warn!(method, code = ?fault.code, message = %fault.message, "remote fault");
                Ok(Outcome::Fault(fault))
            }
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!(method, error = %e, "malformed response");
                Err(e)
            }
        }
    }
}
