//! The handler-facing view of a wire [`Request`].
//!
//! A [`RequestAdapter`] never mutates the wire request it wraps. Every derived
//! view (absolute URL, path info, query, form fields, uploaded files,
//! cookies, headers) is computed once when the adapter is built, so handlers
//! can read them as often as they like.
//!
//! The only mutable state is the [`Items`] bag, which hosts use to pass
//! values along the request (path parameters, the retry signal, caller
//! supplied properties).

mod items;
mod url;

pub use items::Item;
pub use items::Items;
pub use items::PATH_PARAMS_ITEM;
pub use items::RETRY_REQUEST_ITEM;
pub use url::LOCAL_AUTHORITY;

use bytes::Bytes;
use http::header;
use local_http::protocol::{HeaderSet, Request};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::cookie::{Cookie, parse_cookie_header};
use crate::multipart::{MultipartDecoder, ParseResult, UploadedFile};
use crate::params::ValueMap;

const X_FORWARDED_FOR: &str = "X-Forwarded-For";
const X_REAL_IP: &str = "X-Real-IP";

/// Errors of the typed extractors [`RequestAdapter::query_as`],
/// [`RequestAdapter::form_as`] and [`RequestAdapter::json_as`].
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid query string: {source}")]
    Query { source: serde_urlencoded::de::Error },

    #[error("invalid form: {source}")]
    Form { source: serde_urlencoded::de::Error },

    #[error("can't re-encode form fields: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    fn query(source: serde_urlencoded::de::Error) -> Self {
        Self::Query { source }
    }

    fn form(source: serde_urlencoded::de::Error) -> Self {
        Self::Form { source }
    }
}

#[derive(Debug)]
pub struct RequestAdapter {
    request: Request,
    absolute_uri: String,
    raw_url: String,
    path_info: String,
    operation_name: String,
    query_string: String,
    content_type: String,
    content_length: u64,
    headers: HeaderSet,
    query: ValueMap,
    form: ValueMap,
    files: Vec<UploadedFile>,
    cookies: Vec<Cookie>,
    items: Items,
}

impl RequestAdapter {
    pub fn new(request: Request) -> Self {
        Self::build(request, None)
    }

    /// Builds an adapter whose [`path_info`](Self::path_info) has `handler_path`
    /// removed from its front.
    pub fn with_handler_path(request: Request, handler_path: &str) -> Self {
        Self::build(request, Some(handler_path))
    }

    fn build(request: Request, handler_path: Option<&str>) -> Self {
        let resolved = url::resolve(&request.url);
        let (path, query_string) = url::split(&resolved);
        let raw_url = path.to_string();
        let query_string = query_string.unwrap_or_default().to_string();

        let path_info = {
            let decoded_path = url::decode_path(&raw_url);
            match handler_path {
                Some(handler_path) => url::strip_handler_path(&decoded_path, handler_path),
                None => decoded_path.into_owned(),
            }
        };
        let operation_name = url::last_segment(&path_info).to_string();

        let mut headers = HeaderSet::new();
        for header in &request.headers {
            headers.append(header.key.as_str(), header.value.as_str());
        }

        let content_type = headers.get(header::CONTENT_TYPE.as_str()).map(primary_media_type).unwrap_or_default();
        let content_length = headers
            .get(header::CONTENT_LENGTH.as_str())
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_default();

        let cookies = headers.get(header::COOKIE.as_str()).map(parse_cookie_header).unwrap_or_default();
        let ParseResult { files, fields: form } = decode_form(&content_type, &request.body);

        Self {
            absolute_uri: resolved.trim_end_matches('/').to_string(),
            raw_url,
            path_info,
            operation_name,
            query: url::parse_query(&query_string),
            query_string,
            content_type,
            content_length,
            headers,
            form,
            files,
            cookies,
            items: Items::new(),
            request,
        }
    }

    /// The wrapped wire request, untouched.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &str {
        &self.request.method
    }

    /// The request URL resolved against `http://localhost`, trailing `/` trimmed.
    pub fn absolute_uri(&self) -> &str {
        &self.absolute_uri
    }

    /// The URL path without query.
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    /// The percent-decoded path, without the handler mount path.
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// The last segment of [`path_info`](Self::path_info).
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// The primary media type of the `Content-Type` header, parameters
    /// removed. Empty when the header is missing.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Media types listed in `Accept`, parameters removed.
    pub fn accept_types(&self) -> Vec<&str> {
        self.header(header::ACCEPT.as_str())
            .map(|accept| {
                accept
                    .split(',')
                    .filter_map(|media| media.split(';').next())
                    .map(str::trim)
                    .filter(|media| !media.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header(header::USER_AGENT.as_str())
    }

    pub fn x_forwarded_for(&self) -> Option<&str> {
        self.header(X_FORWARDED_FOR)
    }

    pub fn x_real_ip(&self) -> Option<&str> {
        self.header(X_REAL_IP)
    }

    /// In-process requests never leave the machine.
    pub fn is_local(&self) -> bool {
        true
    }

    pub fn is_secure_connection(&self) -> bool {
        false
    }

    pub fn body(&self) -> &Bytes {
        &self.request.body
    }

    /// The body decoded as UTF-8, invalid sequences replaced.
    pub fn raw_body(&self) -> String {
        String::from_utf8_lossy(&self.request.body).into_owned()
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Form fields from a multipart or urlencoded body.
    pub fn form(&self) -> &ValueMap {
        &self.form
    }

    pub fn query(&self) -> &ValueMap {
        &self.query
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|cookie| cookie.name() == name)
    }

    pub fn cookie_value(&self, name: &str) -> Option<&str> {
        self.cookie(name).map(Cookie::value)
    }

    pub fn items(&self) -> &Items {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }

    /// Deserializes the query string into `T`.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, ExtractError> {
        serde_urlencoded::from_str(&self.query_string).map_err(ExtractError::query)
    }

    /// Deserializes the decoded form fields into `T`.
    pub fn form_as<T: DeserializeOwned>(&self) -> Result<T, ExtractError> {
        let encoded = serde_urlencoded::to_string(self.form.as_pairs())?;
        serde_urlencoded::from_str(&encoded).map_err(ExtractError::form)
    }

    /// Deserializes a JSON body into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, ExtractError> {
        Ok(serde_json::from_slice(&self.request.body)?)
    }
}

/// `"multipart/form-data, text/plain; charset=utf-8"` -> `"multipart/form-data"`.
fn primary_media_type(content_type: &str) -> String {
    content_type.split(';').next().and_then(|media| media.split(',').next()).unwrap_or_default().trim().to_string()
}

fn decode_form(content_type: &str, body: &Bytes) -> ParseResult {
    if content_type.eq_ignore_ascii_case(mime::MULTIPART_FORM_DATA.essence_str()) {
        return MultipartDecoder::new().decode(body);
    }

    if content_type.eq_ignore_ascii_case(mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()) {
        return match serde_urlencoded::from_bytes::<Vec<(String, String)>>(body) {
            Ok(pairs) => ParseResult { files: vec![], fields: pairs.into_iter().collect() },
            Err(e) => {
                debug!(error = %e, "skip malformed urlencoded form");
                ParseResult::default()
            }
        };
    }

    ParseResult::default()
}
