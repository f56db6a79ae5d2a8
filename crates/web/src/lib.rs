//! In-process execution of HTTP handlers
//!
//! This crate runs HTTP-shaped requests against an application without a
//! socket in between. A wire [`Request`](local_http::protocol::Request) is
//! wrapped in a [`RequestAdapter`]/[`ResponseAdapter`] pair, handed to a
//! [`Host`], and the buffered response is closed back into a wire
//! [`Response`](local_http::protocol::Response).
//!
//! # Features
//!
//! - Request views computed once: absolute URL, path info, query, cookies, headers
//! - `multipart/form-data` and urlencoded form decoding
//! - Buffered responses with cookies, finalized on close
//! - A retrying [`Executor`] with blocking and async entry points
//! - A path/method [`Router`] host built on `matchit`
//! - JSON clients wired to an executor through [`LocalClientFactory`]
//!
//! # Architecture
//!
//! - [`request`]: the request adapter and its item bag
//! - [`response`]: the response adapter
//! - [`multipart`]: multipart body decoding
//! - [`cookie`]: cookie parsing and `Set-Cookie` rendering
//! - [`host`]: the host contract and [`Dispatch`] outcome
//! - [`router`]: a host dispatching on path patterns and filters
//! - [`executor`]: the attempt loop
//! - [`config`]: executor settings
//! - [`factory`]: in-process clients
//!
//! # Example
//!
//! ```
//! use local_http::protocol::Request;
//! use local_web::{Dispatch, Executor, Router, host_fn, router::get};
//!
//! let router = Router::builder()
//!     .route("/api/ping", get(host_fn(|request, response| {
//!         let format = request.query().get("format").unwrap_or("text").to_string();
//!         response.write_str(&format);
//!         Dispatch::Dispatched
//!     })))
//!     .build()
//!     .unwrap();
//!
//! let executor = Executor::builder().host(router).build().unwrap();
//! let result = executor.execute(Request::new("GET", "/api/ping?format=json"));
//!
//! assert!(result.handler_found);
//! assert_eq!(result.response.status_code, 200);
//! assert_eq!(result.response.body_text(), "json");
//! ```

pub mod config;
pub mod cookie;
pub mod executor;
pub mod factory;
pub mod host;
pub mod multipart;
pub mod params;
pub mod request;
pub mod response;
pub mod router;

pub use config::ExecutorConfig;
pub use cookie::Cookie;
pub use executor::ExecutionContext;
pub use executor::ExecutionResult;
pub use executor::Executor;
pub use factory::LocalClientFactory;
pub use host::AsyncHost;
pub use host::Dispatch;
pub use host::Host;
pub use host::host_fn;
pub use multipart::MultipartDecoder;
pub use multipart::ParseResult;
pub use multipart::UploadedFile;
pub use params::ValueMap;
pub use request::RequestAdapter;
pub use response::ResponseAdapter;
pub use router::Router;
