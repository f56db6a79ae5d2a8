//! The wire request message.
//!
//! [`Request`] is the transport-agnostic form of an HTTP request: method, URL,
//! headers and a fully materialized body. Field order is part of the contract
//! for any versioned or binary encoding, so new fields may only be appended.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::protocol::header::{HttpHeader, find_header};
use crate::protocol::payload::Payload;

/// A transport-agnostic HTTP request.
///
/// `headers` and `body` are never absent: the defaults are an empty list and
/// an empty byte sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    /// Absolute (`http://host/path`) or root-relative (`/path?query`).
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HttpHeader>,
    #[serde(default)]
    pub body: Bytes,
    #[serde(skip)]
    pub payload: Option<Payload>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { method: method.into(), url: url.into(), ..Default::default() }
    }

    /// Appends a header, leaving any existing header with the same key in place.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader::new(key, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Returns the value of the first header matching `key`, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        find_header(&self.headers, key).map(|header| header.value.as_str())
    }
}
