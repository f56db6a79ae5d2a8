//! Clients wired to an in-process [`Executor`].

use http::{StatusCode, header};
use local_http::client::{Client, ClientBuilder, async_transport_fn};
use local_http::codec::JsonCodec;
use local_http::protocol::{ClientBuildError, Request, Response};

use crate::executor::{ExecutionResult, Executor};
use crate::host::Host;

/// Creates JSON clients whose requests never leave the process.
///
/// The blocking transport runs [`Executor::execute`], the async one
/// [`Executor::execute_async`]. A request no handler accepts comes back as a
/// `404` with a short text body.
///
/// ```
/// use local_web::factory::LocalClientFactory;
/// use local_web::executor::Executor;
/// use local_web::host::{host_fn, Dispatch};
///
/// let executor = Executor::builder()
///     .host(host_fn(|_, response| {
///         response.set_content_type("application/json");
///         response.write_str(r#"{"pong":true}"#);
///         Dispatch::Dispatched
///     }))
///     .build()
///     .unwrap();
///
/// let client = LocalClientFactory::new(executor).create_client().unwrap();
/// let reply: serde_json::Value = client.get("/ping").unwrap();
/// assert_eq!(reply["pong"], true);
/// ```
#[derive(Debug)]
pub struct LocalClientFactory<H> {
    executor: Executor<H>,
}

impl<H> Clone for LocalClientFactory<H> {
    fn clone(&self) -> Self {
        Self { executor: self.executor.clone() }
    }
}

impl<H: Host + 'static> LocalClientFactory<H> {
    pub fn new(executor: Executor<H>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Executor<H> {
        &self.executor
    }

    /// A builder with both transports set, for callers that want to add
    /// default headers or a URL prefix before building.
    pub fn client_builder(&self) -> ClientBuilder<JsonCodec> {
        let executor = self.executor.clone();
        let transport = move |request: Request| into_response(executor.execute(request));

        let executor = self.executor.clone();
        let async_transport = async_transport_fn(move |request: Request| {
            let executor = executor.clone();
            async move { into_response(executor.execute_async(request).await) }
        });

        Client::builder().transport(transport).async_transport(async_transport)
    }

    pub fn create_client(&self) -> Result<Client<JsonCodec>, ClientBuildError> {
        self.client_builder().build()
    }
}

fn into_response(result: ExecutionResult) -> Response {
    if result.handler_found {
        return result.response;
    }

    Response::new(StatusCode::NOT_FOUND.as_u16())
        .with_header(header::CONTENT_TYPE.as_str(), mime::TEXT_PLAIN_UTF_8.as_ref())
        .with_body("no handler found for request")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Dispatch, host_fn};
    use crate::router::{Router, get, path_params, post};
    use local_http::protocol::ClientError;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Greeting {
        message: String,
    }

    fn factory() -> LocalClientFactory<Router> {
        let router = Router::builder()
            .route(
                "/hello/{name}",
                get(host_fn(|request, response| {
                    let name = path_params(request).and_then(|params| params.get("name")).unwrap_or_default();
                    let body = serde_json::to_vec(&Greeting { message: format!("hello {name}") }).unwrap();
                    response.write(body);
                    Dispatch::Dispatched
                })),
            )
            .route(
                "/echo",
                post(host_fn(|request, response| {
                    response.set_content_type(request.content_type().to_string());
                    response.write(request.body().clone());
                    Dispatch::Dispatched
                })),
            )
            .route(
                "/fail",
                get(host_fn(|_, response| {
                    response.set_status_code(500);
                    response.write_str("boom");
                    Dispatch::Dispatched
                })),
            )
            .build()
            .unwrap();

        LocalClientFactory::new(Executor::builder().host(router).build().unwrap())
    }

    #[test]
    fn sync_round_trip() {
        let client = factory().create_client().unwrap();

        let greeting: Greeting = client.get("/hello/alice").unwrap();
        assert_eq!(greeting, Greeting { message: "hello alice".into() });

        let echoed: Greeting = client.post("/echo", &Greeting { message: "hi".into() }).unwrap();
        assert_eq!(echoed.message, "hi");
    }

    #[test]
    fn missing_route_is_404() {
        let client = factory().create_client().unwrap();

        let error = client.get::<Greeting>("/nowhere").unwrap_err();
        assert!(matches!(error, ClientError::Remote { status_code: 404, .. }));
    }

    #[test]
    fn handler_error_is_remote_error() {
        let client = factory().create_client().unwrap();

        let error = client.get::<Greeting>("/fail").unwrap_err();
        match error {
            ClientError::Remote { status_code, body } => {
                assert_eq!(status_code, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn async_round_trip() {
        let client = factory().client_builder().url_prefix("/hello").build().unwrap();

        let greeting: Greeting = client.get_async("/async").await.unwrap();
        assert_eq!(greeting.message, "hello async");
    }
}
