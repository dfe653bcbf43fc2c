//! # xmlrpc
//!
//! Remote method calls over tagged-XML envelopes, built on `xmlpack`.
//!
//! ## Architecture
//!
//! - `envelope`: call and response documents around encoded values.
//! - `response`: classifies a response as a fault or a single result value.
//! - `transport`: the byte-moving seam; the only place I/O happens.
//! - `client`: `call(method, params)` composed from the three above.
//!
//! Everything but the transport is a pure function of its input.

pub mod client;
pub mod envelope;
pub mod error;
pub mod response;
pub mod transport;

#[cfg(test)]
mod tests;

pub use crate::error::Error;
pub use crate::error::Result;

pub use crate::envelope::Call;
pub use crate::envelope::check_method_name;
pub use crate::envelope::decode_call;
pub use crate::envelope::encode_call;
pub use crate::envelope::encode_call_with;
pub use crate::envelope::encode_fault;
pub use crate::envelope::encode_response;
pub use crate::envelope::encode_response_with;

pub use crate::response::Fault;
pub use crate::response::NO_FAULT_MESSAGE;
pub use crate::response::Outcome;
pub use crate::response::scan_response;

pub use crate::transport::FnTransport;
pub use crate::transport::Transport;
pub use crate::transport::TransportError;

pub use crate::client::Client;

pub use xmlpack::EncodeOptions;
pub use xmlpack::NilPolicy;
pub use xmlpack::Value;
