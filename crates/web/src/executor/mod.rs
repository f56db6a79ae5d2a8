//! Runs wire requests against a [`Host`] in-process.
//!
//! One execution wraps the wire request into a fresh
//! [`RequestAdapter`]/[`ResponseAdapter`] pair per attempt and hands them to
//! the host:
//!
//! - [`Dispatch::NotFound`] ends the execution with `handler_found = false`,
//! - [`Dispatch::Dispatched`] ends it with the closed response,
//! - [`Dispatch::RetryRequested`], or a [`RETRY_REQUEST_ITEM`] left in the
//!   request items, starts another attempt until `max_attempts` is reached.
//!
//! The blocking entry points ([`Executor::execute`], [`Executor::execute_with`])
//! and the async ones ([`Executor::execute_async`],
//! [`Executor::execute_async_with`]) share the attempt bookkeeping but never
//! call into each other.
//!
//! # Example
//!
//! ```
//! use local_http::protocol::Request;
//! use local_web::executor::Executor;
//! use local_web::host::{host_fn, Dispatch};
//!
//! let executor = Executor::builder()
//!     .host(host_fn(|_, response| {
//!         response.write_str("pong");
//!         Dispatch::Dispatched
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let result = executor.execute(Request::new("GET", "/ping"));
//! assert!(result.handler_found);
//! assert_eq!(result.response.body_text(), "pong");
//! ```
//!
//! [`RETRY_REQUEST_ITEM`]: crate::request::RETRY_REQUEST_ITEM

mod context;

pub use context::ExecutionContext;
pub use context::ExecutionResult;

use std::sync::Arc;

use local_http::REQUEST_ID_HEADER;
use local_http::dump::Dump;
use local_http::new_request_id;
use local_http::protocol::Request;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::ExecutorConfig;
use crate::host::{AsyncHost, Dispatch, Host};
use crate::request::RequestAdapter;
use crate::response::ResponseAdapter;

#[derive(Debug)]
pub struct Executor<H> {
    host: Arc<H>,
    config: ExecutorConfig,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExecutorBuildError {
    #[error("host must be set")]
    MissingHost,
    #[error("max_attempts must be at least 1, got {max_attempts}")]
    InvalidMaxAttempts { max_attempts: usize },
}

impl<H> Executor<H> {
    pub fn builder() -> ExecutorBuilder<H> {
        ExecutorBuilder::new()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    fn adapters(&self, context: &ExecutionContext) -> (RequestAdapter, ResponseAdapter) {
        let request = context.request.clone();
        let mut adapter = match &self.config.handler_path {
            Some(handler_path) => RequestAdapter::with_handler_path(request, handler_path),
            None => RequestAdapter::new(request),
        };
        adapter.items_mut().extend(context.properties.iter().map(|(key, item)| (key.to_string(), Arc::clone(item))));

        (adapter, ResponseAdapter::new())
    }
}

impl<H: Host> Executor<H> {
    pub fn execute(&self, request: Request) -> ExecutionResult {
        self.execute_with(ExecutionContext::new(request))
    }

    pub fn execute_with(&self, context: ExecutionContext) -> ExecutionResult {
        let mut attempts = Attempts::start(&self.config, &context.request);
        loop {
            let (mut request, mut response) = self.adapters(&context);
            let dispatch = self.host.handle(&mut request, &mut response);
            if let Some(result) = attempts.complete(dispatch, &request, response) {
                return result;
            }
        }
    }
}

impl<H: AsyncHost> Executor<H> {
    pub async fn execute_async(&self, request: Request) -> ExecutionResult {
        self.execute_async_with(ExecutionContext::new(request)).await
    }

    pub async fn execute_async_with(&self, context: ExecutionContext) -> ExecutionResult {
        let mut attempts = Attempts::start(&self.config, &context.request);
        loop {
            let (mut request, mut response) = self.adapters(&context);
            let dispatch = self.host.handle_async(&mut request, &mut response).await;
            if let Some(result) = attempts.complete(dispatch, &request, response) {
                return result;
            }
        }
    }
}

impl<H> Clone for Executor<H> {
    fn clone(&self) -> Self {
        Self { host: Arc::clone(&self.host), config: self.config.clone() }
    }
}

/// Attempt bookkeeping for one execution.
struct Attempts<'a> {
    config: &'a ExecutorConfig,
    request_id: String,
    execution_id: String,
    count: usize,
}

impl<'a> Attempts<'a> {
    fn start(config: &'a ExecutorConfig, request: &Request) -> Self {
        let request_id = request.header(REQUEST_ID_HEADER).unwrap_or("-").to_string();
        let execution_id = new_request_id();

        if config.log_requests {
            debug!(request_id = %request_id, execution_id = %execution_id, "execute request\n{}", request.dump());
        }

        Self { config, request_id, execution_id, count: 0 }
    }

    /// Records one host call. Returns the result once the execution is over.
    fn complete(
        &mut self,
        dispatch: Dispatch,
        request: &RequestAdapter,
        response: ResponseAdapter,
    ) -> Option<ExecutionResult> {
        self.count += 1;

        let retry = match dispatch {
            Dispatch::NotFound => {
                if self.config.log_requests {
                    debug!(request_id = %self.request_id, execution_id = %self.execution_id, "no handler found");
                }
                return Some(ExecutionResult::not_found(response.into_inner(), self.count));
            }
            Dispatch::RetryRequested => true,
            Dispatch::Dispatched => request.items().retry_requested(),
        };

        if !retry {
            return Some(self.finish(response, false));
        }

        if self.count >= self.config.max_attempts {
            warn!(
                request_id = %self.request_id,
                execution_id = %self.execution_id,
                attempts = self.count,
                "retries exhausted, keeping the last response"
            );
            return Some(self.finish(response, true));
        }

        trace!(request_id = %self.request_id, execution_id = %self.execution_id, attempt = self.count, "host asked for a retry");
        None
    }

    fn finish(&self, response: ResponseAdapter, retries_exhausted: bool) -> ExecutionResult {
        let response = response.into_response();

        if self.config.log_requests {
            debug!(request_id = %self.request_id, execution_id = %self.execution_id, "got response\n{}", response.dump());
        }

        ExecutionResult::handled(response, self.count, retries_exhausted)
    }
}

#[derive(Debug)]
pub struct ExecutorBuilder<H> {
    host: Option<H>,
    config: ExecutorConfig,
}

impl<H> ExecutorBuilder<H> {
    fn new() -> Self {
        Self { host: None, config: ExecutorConfig::default() }
    }

    pub fn host(mut self, host: H) -> Self {
        self.host = Some(host);
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    pub fn log_requests(mut self, log_requests: bool) -> Self {
        self.config.log_requests = log_requests;
        self
    }

    pub fn handler_path(mut self, handler_path: impl Into<String>) -> Self {
        self.config.handler_path = Some(handler_path.into());
        self
    }

    pub fn build(self) -> Result<Executor<H>, ExecutorBuildError> {
        let host = self.host.ok_or(ExecutorBuildError::MissingHost)?;
        if self.config.max_attempts == 0 {
            return Err(ExecutorBuildError::InvalidMaxAttempts { max_attempts: self.config.max_attempts });
        }
        Ok(Executor { host: Arc::new(host), config: self.config })
    }
}
