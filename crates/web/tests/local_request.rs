use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indoc::indoc;
use local_http::REQUEST_ID_HEADER;
use local_http::client::Client;
use local_http::protocol::{ClientError, Request};
use local_web::request::RETRY_REQUEST_ITEM;
use local_web::router::{get, path_params, post};
use local_web::{Dispatch, ExecutionContext, Executor, ExecutorConfig, LocalClientFactory, Router, host_fn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Upload {
    count: String,
    files: Vec<String>,
    content: String,
}

fn router(flaky_calls: Arc<AtomicUsize>) -> Router {
    Router::builder()
        .route(
            "/upload",
            post(host_fn(|request, response| {
                let upload = Upload {
                    count: request.form().get("count").unwrap_or_default().to_string(),
                    files: request.files().iter().map(|file| file.file_name.clone()).collect(),
                    content: request
                        .files()
                        .first()
                        .map(|file| String::from_utf8_lossy(&file.content).into_owned())
                        .unwrap_or_default(),
                };
                response.set_content_type("application/json");
                response.write(serde_json::to_vec(&upload).unwrap_or_default());
                Dispatch::Dispatched
            })),
        )
        .route(
            "/session",
            get(host_fn(|request, response| {
                let session = request.cookie_value("API-SESSION-ID").unwrap_or("none").to_string();
                response.add_session_cookie("seen", "1");
                response.write_str(&format!("\"{session}\""));
                Dispatch::Dispatched
            })),
        )
        .route(
            "/flaky/{times}",
            get(host_fn(move |request, response| {
                let times = path_params(request).and_then(|params| params.get("times")).and_then(|t| t.parse().ok());
                let call = flaky_calls.fetch_add(1, Ordering::SeqCst) + 1;
                if times.is_some_and(|times: usize| call < times) {
                    request.items_mut().insert(RETRY_REQUEST_ITEM, true);
                }
                response.write_str(&call.to_string());
                Dispatch::Dispatched
            })),
        )
        .route(
            "/echo-id",
            get(host_fn(|request, response| {
                let id = request.header(REQUEST_ID_HEADER).unwrap_or_default().to_string();
                response.write_str(&format!("\"{id}\""));
                Dispatch::Dispatched
            })),
        )
        .build()
        .unwrap()
}

fn executor(config: ExecutorConfig) -> (Executor<Router>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let executor = Executor::builder().host(router(Arc::clone(&calls))).config(config).build().unwrap();
    (executor, calls)
}

fn client() -> Client {
    let (executor, _) = executor(ExecutorConfig::default());
    LocalClientFactory::new(executor).create_client().unwrap()
}

#[test]
fn multipart_upload_through_the_executor() {
    let body = indoc! {r#"
        --WebKitFormBoundary7MA4YWxk
        Content-Disposition: form-data; name="count"

        10
        --WebKitFormBoundary7MA4YWxk
        Content-Disposition: form-data; name="file"; filename="c:\ssts\text.text"
        Content-Type: text/plain

        HELLO WORLD!
        --WebKitFormBoundary7MA4YWxk--
    "#}
    .replace('\n', "\r\n");

    let request = Request::new("POST", "/upload")
        .with_header("Content-Type", "multipart/form-data, multipart/form-data; boundary=WebKitFormBoundary7MA4YWxk")
        .with_body(body);

    let (executor, _) = executor(ExecutorConfig::default());
    let result = executor.execute(request);
    let upload: Upload = serde_json::from_slice(&result.response.body).unwrap();

    assert_eq!(
        upload,
        Upload { count: "10".into(), files: vec!["text.text".into()], content: "HELLO WORLD!".into() }
    );
}

#[test]
fn cookies_round_trip() {
    let request = Request::new("GET", "/session")
        .with_header("Cookie", "ss-id=0SJVAVnpdJc2kWkz8DXS; ss-pid=dOFpDDkr; API-SESSION-ID=17-4ab0");

    let (executor, _) = executor(ExecutorConfig::default());
    let response = executor.execute(request).response;

    assert_eq!(response.body_text(), "\"17-4ab0\"");
    assert_eq!(response.header("Set-Cookie"), Some("seen=1; path=/"));
}

#[test]
fn retry_item_until_success() {
    let (executor, calls) = executor(ExecutorConfig::default());

    let result = executor.execute(Request::new("GET", "/flaky/3"));

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(result.attempts, 3);
    assert!(!result.retries_exhausted);
    assert_eq!(result.response.body_text(), "3");
}

#[test]
fn retry_item_exhausts_attempts() {
    let config = ExecutorConfig { max_attempts: 2, ..ExecutorConfig::default() };
    let (executor, calls) = executor(config);

    let result = executor.execute(Request::new("GET", "/flaky/100"));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(result.retries_exhausted);
    assert_eq!(result.response.body_text(), "2");
}

#[test]
fn handler_path_and_properties() {
    let config = ExecutorConfig { handler_path: Some("api".into()), ..ExecutorConfig::default() };
    let (executor, _) = executor(config);

    let context = ExecutionContext::new(Request::new("GET", "/api/session")).with_property("tenant", 7_u32);
    let result = executor.execute_with(context);

    assert!(result.handler_found);
    assert_eq!(result.response.body_text(), "\"none\"");
}

#[test]
fn client_sends_correlation_id() {
    let id: String = client().get("/echo-id").unwrap();

    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn client_surfaces_missing_routes() {
    let error = client().get::<String>("/nowhere").unwrap_err();

    assert_eq!(error.status_code(), Some(404));
    assert!(matches!(error, ClientError::Remote { .. }));
}

#[tokio::test]
async fn async_client_uses_the_async_path() {
    let id: String = client().get_async("/echo-id").await.unwrap();

    assert_eq!(id.len(), 32);
}
