//! A [`Host`] that dispatches on path patterns and request filters.
//!
//! Routes are [`matchit`] patterns; each pattern holds a list of handlers
//! guarded by filters, typically a method filter:
//!
//! ```
//! use local_web::host::{host_fn, Dispatch};
//! use local_web::router::{get, post, Router};
//!
//! let router = Router::builder()
//!     .route("/api/ping", get(host_fn(|_, response| {
//!         response.write_str("pong");
//!         Dispatch::Dispatched
//!     })))
//!     .route("/api/users/{id}", post(host_fn(|_, _| Dispatch::Dispatched)))
//!     .build()
//!     .unwrap();
//! # let _ = router;
//! ```
//!
//! The first handler whose filter matches handles the request. When no
//! pattern or no filter matches, the router answers [`Dispatch::NotFound`].

pub mod filter;

use std::collections::HashMap;

use filter::{AllFilter, Filter};
use thiserror::Error;
use tracing::{debug, trace};

use crate::host::{Dispatch, Host};
use crate::request::{PATH_PARAMS_ITEM, RequestAdapter};
use crate::response::ResponseAdapter;

type RouterFilter = dyn Filter + Send + Sync + 'static;
type InnerRouter<T> = matchit::Router<T>;

/// Main router structure that handles request routing
pub struct Router {
    inner_router: InnerRouter<Vec<RouterItem>>,
}

/// A router item containing a filter and handler
pub struct RouterItem {
    filter: Box<RouterFilter>,
    handler: Box<dyn Host>,
}

/// Path parameters captured by a route pattern, stored in the request items
/// under [`PATH_PARAMS_ITEM`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

#[derive(Error, Debug)]
pub enum RouterBuildError {
    #[error("invalid route {path:?}: {source}")]
    InvalidRoute { path: String, source: matchit::InsertError },
}

impl Router {
    /// Creates a new router builder
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Matches a path against the router's routes
    ///
    /// Returns the candidate items for `path` and the captured path parameters,
    /// or `None` when no pattern matches.
    pub fn at(&self, path: &str) -> Option<(&[RouterItem], PathParams)> {
        match self.inner_router.at(path) {
            Ok(matched) => Some((matched.value.as_slice(), PathParams::from(&matched.params))),
            Err(e) => {
                trace!(path, error = %e, "no route matched");
                None
            }
        }
    }
}

impl Host for Router {
    fn handle(&self, request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch {
        let path = request.path_info().to_string();
        let Some((items, params)) = self.at(&path) else {
            return Dispatch::NotFound;
        };

        let Some(item) = items.iter().find(|item| item.filter.matches(request)) else {
            debug!(method = request.method(), path, "route matched but no filter accepted the request");
            return Dispatch::NotFound;
        };

        request.items_mut().insert(PATH_PARAMS_ITEM, params);
        item.handler.handle(request, response)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl RouterItem {
    /// Gets the filter for this router item
    pub fn filter(&self) -> &RouterFilter {
        self.filter.as_ref()
    }

    /// Gets the handler for this router item
    pub fn handler(&self) -> &dyn Host {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for RouterItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterItem").finish_non_exhaustive()
    }
}

impl PathParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<&matchit::Params<'_, '_>> for PathParams {
    fn from(params: &matchit::Params<'_, '_>) -> Self {
        Self { params: params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() }
    }
}

/// Reads the path parameters the router stored for this request.
pub fn path_params(request: &RequestAdapter) -> Option<&PathParams> {
    request.items().get::<PathParams>(PATH_PARAMS_ITEM)
}

#[derive(Debug, Default)]
pub struct RouterBuilder {
    data: HashMap<String, Vec<RouterItemBuilder>>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, route: impl Into<String>, item_builder: RouterItemBuilder) -> Self {
        let vec = self.data.entry(route.into()).or_default();
        vec.push(item_builder);
        self
    }

    /// Builds the router from the accumulated routes
    pub fn build(self) -> Result<Router, RouterBuildError> {
        let mut inner_router = InnerRouter::new();

        for (path, items) in self.data {
            let router_items = items.into_iter().map(RouterItemBuilder::build).collect::<Vec<_>>();

            inner_router
                .insert(path.as_str(), router_items)
                .map_err(|source| RouterBuildError::InvalidRoute { path, source })?;
        }

        Ok(Router { inner_router })
    }
}

macro_rules! method_router_filter {
    ($method:ident, $method_name:ident) => {
        #[doc = concat!("Routes ", stringify!($method_name), " requests to `handler`.")]
        pub fn $method<H: Host + 'static>(handler: H) -> RouterItemBuilder {
            let mut filters = filter::all_filter();
            filters.and(filter::$method_name());
            RouterItemBuilder { filters, handler: Box::new(handler) }
        }
    };
}

method_router_filter!(get, get_method);
method_router_filter!(post, post_method);
method_router_filter!(put, put_method);
method_router_filter!(delete, delete_method);
method_router_filter!(head, head_method);
method_router_filter!(options, options_method);
method_router_filter!(patch, patch_method);

/// Routes every method to `handler`.
pub fn any<H: Host + 'static>(handler: H) -> RouterItemBuilder {
    RouterItemBuilder { filters: filter::all_filter(), handler: Box::new(handler) }
}

pub struct RouterItemBuilder {
    filters: AllFilter,
    handler: Box<dyn Host>,
}

impl RouterItemBuilder {
    pub fn with<F: Filter + Send + Sync + 'static>(mut self, filter: F) -> Self {
        self.filters.and(filter);
        self
    }

    fn build(self) -> RouterItem {
        RouterItem { filter: Box::new(self.filters), handler: self.handler }
    }
}

impl std::fmt::Debug for RouterItemBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterItemBuilder").field("filters", &self.filters).finish_non_exhaustive()
    }
}
