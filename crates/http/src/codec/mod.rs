//! Body codecs used by the client to encode request bodies and decode
//! response bodies.
//!
//! A codec names a *format*; the media type sent in `Accept` and
//! `Content-Type` is always `application/{format}`.
//!
//! - [`JsonCodec`]: `application/json` via `serde_json`
//! - [`FormCodec`]: `application/x-www-form-urlencoded` via `serde_urlencoded`

mod form;
mod json;

pub use form::FormCodec;
pub use json::JsonCodec;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::protocol::ClientError;

/// Encodes values into request bodies and decodes response bodies into values.
pub trait BodyCodec: Send + Sync {
    /// The short format name, for example `json`.
    fn format(&self) -> &str;

    /// The media type announced for this format.
    fn media_type(&self) -> String {
        format!("application/{}", self.format())
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, ClientError>;

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ClientError>;
}
