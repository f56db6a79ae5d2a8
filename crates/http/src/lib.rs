//! Transport-agnostic HTTP messages and the in-process HTTP client
//!
//! This crate defines the messages exchanged when HTTP-shaped handlers are
//! invoked without a network connection, and a client that produces and
//! consumes them. A request is a plain value (method, URL, headers, body);
//! whatever sits on the other side of the transport (an in-process executor,
//! a test double, an IPC bridge) answers with a plain response value.
//!
//! # Features
//!
//! - Serializable wire messages with a stable field order
//! - Case-insensitive, deduplicated header sets with "explicit wins" merging
//! - Pluggable body codecs (JSON, urlencoded forms)
//! - Blocking and async transports, independent of each other
//! - Per-request correlation ids (`X-Request-Id`)
//! - Debug dumps for request logging
//!
//! # Architecture
//!
//! - [`protocol`]: wire messages, headers and errors
//! - [`codec`]: body codecs
//! - [`client`]: the client and its transports
//! - [`dump`]: debug rendering of messages
//!
//! # Limitations
//!
//! - Bodies are always fully materialized, there is no streaming
//! - No socket I/O, TLS, or HTTP/1.1 framing

pub mod client;
pub mod codec;
pub mod dump;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

/// Correlation header attached by the client to every outbound request.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Generates a correlation id: 32 lowercase hex characters.
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
