use local_http::protocol::{Request, Response};

use crate::request::{Item, Items};

/// A request plus properties copied into the request items before every attempt.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub request: Request,
    pub properties: Items,
}

impl ExecutionContext {
    pub fn new(request: Request) -> Self {
        Self { request, properties: Items::new() }
    }

    pub fn with_property<T: std::any::Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn with_item(mut self, key: impl Into<String>, item: Item) -> Self {
        self.properties.insert_item(key, item);
        self
    }
}

impl From<Request> for ExecutionContext {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}

/// The outcome of one execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The response of the last attempt. Left untouched (status `0`) when no
    /// handler was found.
    pub response: Response,
    pub handler_found: bool,
    /// Number of times the host was called.
    pub attempts: usize,
    /// The host still asked for a retry when the attempt limit was reached.
    pub retries_exhausted: bool,
}

impl ExecutionResult {
    pub(crate) fn not_found(response: Response, attempts: usize) -> Self {
        Self { response, handler_found: false, attempts, retries_exhausted: false }
    }

    pub(crate) fn handled(response: Response, attempts: usize, retries_exhausted: bool) -> Self {
        Self { response, handler_found: true, attempts, retries_exhausted }
    }
}
