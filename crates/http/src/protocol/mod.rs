//! Transport-agnostic HTTP message types.
//!
//! These are the types that cross the boundary between a caller and the
//! in-process executor. They carry no behaviour beyond lookups; translating
//! them into something a handler can consume is the job of the adapters in
//! the executor crate.
//!
//! - [`Request`] / [`Response`]: the wire message pair
//! - [`HttpHeader`] / [`HeaderSet`]: header list entries and the
//!   case-insensitive, deduplicated header collection
//! - [`Payload`]: an opaque typed object for in-memory fast paths
//! - [`ClientError`] / [`ClientBuildError`]: client failures

mod header;
pub use header::HeaderSet;
pub use header::HttpHeader;
pub use header::find_header;

mod request;
pub use request::Request;

mod response;
pub use response::Response;

mod payload;
pub use payload::Payload;

mod error;
pub use error::ClientBuildError;
pub use error::ClientError;
