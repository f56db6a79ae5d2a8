use local_http::dump::Dump;
use local_http::protocol::Request;
use local_web::router::{get, post};
use local_web::{Dispatch, Executor, LocalClientFactory, RequestAdapter, ResponseAdapter, Router, host_fn};
use serde::{Deserialize, Serialize};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize, Serialize, Debug)]
pub struct User {
    name: String,
    zip: String,
}

fn ping(request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch {
    let format = request.query().get("format").unwrap_or("text");
    response.set_content_type("text/plain");
    response.write_str(&format!("pong ({format})\r\n"));
    Dispatch::Dispatched
}

fn create_user(request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch {
    match request.json_as::<User>() {
        Ok(user) => {
            info!(name = %user.name, "create user");
            response.set_status_code(201);
            response.set_content_type("application/json");
            response.add_session_cookie("last-user", &user.name);
            response.write(request.body().clone());
        }
        Err(e) => {
            response.set_status_code(400);
            response.write_str(&e.to_string());
        }
    }
    Dispatch::Dispatched
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::builder()
        .route("/api/ping", get(host_fn(ping)))
        .route("/api/users", post(host_fn(create_user)))
        .build()
        .expect("routes are valid");

    let executor = Executor::builder().host(router).log_requests(true).build().expect("executor config is valid");

    // raw exchange
    let result = executor.execute(Request::new("GET", "/api/ping?format=json"));
    info!(attempts = result.attempts, "raw exchange done\n{}", result.response.dump());

    // typed client, blocking and async
    let client = LocalClientFactory::new(executor).create_client().expect("both transports are set");
    let user = User { name: "alice".into(), zip: "310000".into() };

    let created: User = client.post("/api/users", &user).expect("user is created");
    info!(?created, "created with the blocking client");

    let created: User = client.post_async("/api/users", &user).await.expect("user is created");
    info!(?created, "created with the async client");

    match client.get::<User>("/api/missing") {
        Ok(_) => unreachable!("no route for /api/missing"),
        Err(e) => info!(error = %e, "missing route"),
    }
}
