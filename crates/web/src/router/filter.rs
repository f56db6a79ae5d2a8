//! Request filtering module that provides composable request filters.
//!
//! This module implements a filter system that allows you to:
//! - Filter requests based on HTTP methods
//! - Filter requests based on headers
//! - Combine multiple filters using AND/OR logic
//! - Create custom filters using closures
//!
//! ## Thread Safety
//!
//! All filters must implement the `Filter` trait, which requires `Send + Sync`,
//! so a router can be shared by every thread executing requests.
//!
//! # Examples
//!
//! ```
//! use local_web::router::filter::{all_filter, any_filter, get_method, header};
//!
//! // Create a filter that matches GET requests
//! let get_filter = get_method();
//!
//! // Create a filter that checks for specific header
//! let auth_filter = header("Authorization", "Bearer token");
//!
//! // Combine filters with AND logic
//! let mut combined = all_filter();
//! combined.and(get_filter).and(auth_filter);
//! ```

use http::Method;

use crate::request::RequestAdapter;

/// Core trait for request filtering.
///
/// Implementors of this trait can be used to filter requests based on custom
/// logic. Filters can be composed using [`AllFilter`] and [`AnyFilter`].
pub trait Filter: Send + Sync {
    /// Check if the request matches this filter's criteria.
    ///
    /// Returns `true` if the request should be allowed, `false` otherwise.
    fn matches(&self, req: &RequestAdapter) -> bool;
}

/// A filter that wraps a closure.
struct FnFilter<F: Fn(&RequestAdapter) -> bool>(F);

impl<F: Fn(&RequestAdapter) -> bool + Send + Sync> Filter for FnFilter<F> {
    fn matches(&self, req: &RequestAdapter) -> bool {
        (self.0)(req)
    }
}

/// Creates a new filter from a closure.
///
/// # Example
/// ```
/// use local_web::router::filter::fn_filter;
///
/// let custom_filter = fn_filter(|req| req.path_info().starts_with("/api"));
/// ```
pub fn fn_filter<F>(f: F) -> impl Filter
where
    F: Fn(&RequestAdapter) -> bool + Send + Sync,
{
    FnFilter(f)
}

/// Creates a filter that always returns true.
pub fn true_filter() -> TrueFilter {
    TrueFilter
}

/// Creates a filter that always returns false.
pub fn false_filter() -> FalseFilter {
    FalseFilter
}

/// A filter that always returns true.
#[derive(Debug)]
pub struct TrueFilter;
impl Filter for TrueFilter {
    #[inline]
    fn matches(&self, _req: &RequestAdapter) -> bool {
        true
    }
}

/// A filter that always returns false.
#[derive(Debug)]
pub struct FalseFilter;
impl Filter for FalseFilter {
    #[inline]
    fn matches(&self, _req: &RequestAdapter) -> bool {
        false
    }
}

/// Creates a new OR-composed filter chain.
pub fn any_filter() -> AnyFilter {
    AnyFilter::new()
}

/// Compose filters with OR logic.
///
/// If any inner filter succeeds, the whole filter succeeds.
/// An empty filter chain returns true by default.
pub struct AnyFilter {
    filters: Vec<Box<dyn Filter>>,
}

impl AnyFilter {
    fn new() -> Self {
        Self { filters: vec![] }
    }

    /// Add a new filter to the OR chain.
    pub fn or<F: Filter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl Filter for AnyFilter {
    fn matches(&self, req: &RequestAdapter) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|filter| filter.matches(req))
    }
}

/// Creates a new AND-composed filter chain.
pub fn all_filter() -> AllFilter {
    AllFilter::new()
}

/// Compose filters with AND logic.
///
/// All inner filters must succeed for the whole filter to succeed.
/// An empty filter chain returns true by default.
pub struct AllFilter {
    filters: Vec<Box<dyn Filter>>,
}

impl AllFilter {
    fn new() -> Self {
        Self { filters: vec![] }
    }

    /// Add a new filter to the AND chain.
    pub fn and<F: Filter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl Filter for AllFilter {
    fn matches(&self, req: &RequestAdapter) -> bool {
        self.filters.iter().all(|filter| filter.matches(req))
    }
}

impl std::fmt::Debug for AnyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyFilter").field("len", &self.filters.len()).finish()
    }
}

impl std::fmt::Debug for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllFilter").field("len", &self.filters.len()).finish()
    }
}

/// A filter that matches HTTP methods.
///
/// Wire methods are plain strings, so the comparison ignores ASCII case.
#[derive(Debug)]
pub struct MethodFilter(Method);

impl Filter for MethodFilter {
    fn matches(&self, req: &RequestAdapter) -> bool {
        req.method().eq_ignore_ascii_case(self.0.as_str())
    }
}

macro_rules! method_filter {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Creates a filter that matches HTTP ", stringify!($upper_case_method), " requests.")]
        #[inline]
        pub fn $method() -> MethodFilter {
            MethodFilter(Method::$upper_case_method)
        }
    };
}

method_filter!(get_method, GET);
method_filter!(post_method, POST);
method_filter!(put_method, PUT);
method_filter!(delete_method, DELETE);
method_filter!(head_method, HEAD);
method_filter!(options_method, OPTIONS);
method_filter!(patch_method, PATCH);

/// Creates a filter that matches a header name and value.
///
/// Names compare case-insensitively, values exactly.
#[inline]
pub fn header(header_name: impl Into<String>, header_value: impl Into<String>) -> HeaderFilter {
    HeaderFilter { name: header_name.into(), value: header_value.into() }
}

/// A filter that matches HTTP headers.
#[derive(Debug)]
pub struct HeaderFilter {
    name: String,
    value: String,
}

impl Filter for HeaderFilter {
    fn matches(&self, req: &RequestAdapter) -> bool {
        req.header(&self.name).is_some_and(|value| value == self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_http::protocol::Request;

    fn adapter(method: &str) -> RequestAdapter {
        RequestAdapter::new(Request::new(method, "/api/ping").with_header("Authorization", "Bearer token"))
    }

    #[test]
    fn method_filter_ignores_case() {
        assert!(get_method().matches(&adapter("get")));
        assert!(get_method().matches(&adapter("GET")));
        assert!(!post_method().matches(&adapter("GET")));
    }

    #[test]
    fn header_filter() {
        assert!(header("authorization", "Bearer token").matches(&adapter("GET")));
        assert!(!header("Authorization", "Bearer other").matches(&adapter("GET")));
        assert!(!header("X-Missing", "x").matches(&adapter("GET")));
    }

    #[test]
    fn composed_filters() {
        let mut all = all_filter();
        all.and(get_method()).and(fn_filter(|req| req.path_info().starts_with("/api")));
        assert!(all.matches(&adapter("GET")));
        assert!(!all.matches(&adapter("POST")));

        let mut any = any_filter();
        any.or(false_filter()).or(post_method());
        assert!(any.matches(&adapter("POST")));
        assert!(!any.matches(&adapter("GET")));

        assert!(all_filter().matches(&adapter("GET")));
        assert!(any_filter().matches(&adapter("GET")));
        assert!(true_filter().matches(&adapter("GET")));
    }
}
