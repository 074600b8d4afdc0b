//! End-to-end behaviour of the request lifecycle, driven through
//! `Pipeline::handle` without a socket.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use gatehouse::middleware::{self, Pipeline};
use gatehouse::{
    ApiError, BoxError, HttpError, Logger, NoRows, Request, RequestScope, Response, Router,
    ValidationErrors,
};
use http::{Method, StatusCode};

// ── Log capture ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_owned).collect()
    }

    fn access_lines(&self) -> Vec<String> {
        self.lines().into_iter().filter(|l| l.contains("ms] ")).collect()
    }
}

impl io::Write for Capture {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

fn pipeline(router: Router) -> (Pipeline, Capture) {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let logger = Logger::new(tracing::Dispatch::new(subscriber));
    (middleware::init(logger).wrap(router), capture)
}

fn request(method: Method, uri: &str) -> Request {
    Request::from_http(
        http::Request::builder().method(method).uri(uri).body(Bytes::new()).unwrap(),
    )
}

fn json(res: &Response) -> serde_json::Value {
    serde_json::from_slice(res.body()).unwrap()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn create_artist(_req: Request) -> Response {
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/artists/99")
        .json(br#"{"id":99,"name":"tester"}"#.to_vec())
}

async fn explode(_req: Request) -> Response {
    panic!("connection pool poisoned at db.internal:5432")
}

async fn missing_artist(_req: Request) -> Result<Response, NoRows> {
    Err(NoRows)
}

async fn invalid_artist(_req: Request) -> Result<Response, ValidationErrors> {
    Err(ValidationErrors::new().with("name", "cannot be blank"))
}

async fn conflict(_req: Request) -> Result<Response, ApiError> {
    Err(ApiError::new(StatusCode::CONFLICT, "DUPLICATE", "artist already exists"))
}

async fn teapot(_req: Request) -> Result<Response, HttpError> {
    Err(HttpError::from_status(StatusCode::IM_A_TEAPOT))
}

async fn needs_login(_req: Request) -> Result<Response, HttpError> {
    Err(HttpError::new(StatusCode::UNAUTHORIZED, "missing bearer token"))
}

async fn slow(_req: Request) -> Response {
    tokio::time::sleep(Duration::from_millis(20)).await;
    Response::text("done")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn handler_response_is_what_the_access_log_reports() {
    let (app, capture) = pipeline(Router::new().on(Method::POST, "/artists", create_artist));

    let res = app.handle(request(Method::POST, "/artists")).await;

    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(res.header("location"), Some("/artists/99"));

    let access = capture.access_lines();
    assert_eq!(access.len(), 1);
    let bytes = res.body().len();
    assert!(
        access[0].ends_with(&format!("POST /artists HTTP/1.1 201 {bytes}")),
        "{}",
        access[0],
    );
}

#[tokio::test]
async fn panicking_handler_yields_one_generic_500() {
    let (app, capture) = pipeline(Router::new().on(Method::GET, "/boom", explode));

    let res = app.handle(request(Method::GET, "/boom")).await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(&res);
    assert_eq!(body["error_code"], "INTERNAL_SERVER_ERROR");
    assert!(!String::from_utf8_lossy(res.body()).contains("db.internal"));

    let access = capture.access_lines();
    assert_eq!(access.len(), 1);
    assert!(access[0].contains("GET /boom HTTP/1.1 500"), "{}", access[0]);

    // The raw cause is logged, at error level, before the access line.
    let lines = capture.lines();
    let error_at = lines.iter().position(|l| l.contains("ERROR") && l.contains("db.internal"));
    let access_at = lines.iter().position(|l| l.contains("ms] "));
    assert!(error_at.unwrap() < access_at.unwrap());
}

#[tokio::test]
async fn handler_panicking_before_its_future_yields_one_generic_500() {
    let router = Router::new().on(Method::GET, "/users/{id}", |req: Request| {
        let id: u32 = req.param("id").unwrap().parse().unwrap();
        async move { Response::text(id.to_string()) }
    });
    let (app, capture) = pipeline(router);

    let res = app.handle(request(Method::GET, "/users/abc")).await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json(&res)["error_code"], "INTERNAL_SERVER_ERROR");
    assert!(res.header("x-request-id").is_some());

    let access = capture.access_lines();
    assert_eq!(access.len(), 1);
    assert!(access[0].contains("GET /users/abc HTTP/1.1 500"), "{}", access[0]);
}

#[tokio::test]
async fn no_rows_becomes_not_found() {
    let (app, _) = pipeline(Router::new().on(Method::GET, "/artists/{id}", missing_artist));

    let res = app.handle(request(Method::GET, "/artists/12345")).await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(json(&res)["message"], "the requested resource was not found");
}

#[tokio::test]
async fn unknown_route_becomes_not_found() {
    let (app, capture) = pipeline(Router::new());

    let res = app.handle(request(Method::GET, "/nowhere")).await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(json(&res)["error_code"], "NOT_FOUND");
    assert!(capture.access_lines()[0].contains("GET /nowhere HTTP/1.1 404"));
}

#[tokio::test]
async fn validation_failures_reach_the_client_verbatim() {
    let (app, _) = pipeline(Router::new().on(Method::POST, "/artists", invalid_artist));

    let res = app.handle(request(Method::POST, "/artists")).await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body = json(&res);
    assert_eq!(body["error_code"], "INVALID_DATA");
    assert_eq!(body["details"], serde_json::json!({ "name": "cannot be blank" }));
}

#[tokio::test]
async fn handler_api_errors_pass_through() {
    let (app, _) = pipeline(Router::new().on(Method::PUT, "/artists/{id}", conflict));

    let res = app.handle(request(Method::PUT, "/artists/1")).await;

    assert_eq!(res.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        json(&res),
        serde_json::json!({
            "status_code": 409,
            "error_code": "DUPLICATE",
            "message": "artist already exists",
        }),
    );
}

#[tokio::test]
async fn http_errors_map_by_status() {
    let (app, _) = pipeline(
        Router::new()
            .on(Method::GET, "/private", needs_login)
            .on(Method::GET, "/teapot", teapot),
    );

    let res = app.handle(request(Method::GET, "/private")).await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(&res)["message"], "missing bearer token");

    let res = app.handle(request(Method::GET, "/teapot")).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn exactly_one_scope_per_request() {
    let seen: Arc<Mutex<Vec<Arc<RequestScope>>>> = Arc::default();
    let slot = Arc::clone(&seen);
    let router = Router::new().on(Method::GET, "/scope", move |req: Request| {
        let slot = Arc::clone(&slot);
        async move {
            let first = req.scope_handle().cloned().ok_or("no scope")?;
            let again: *const RequestScope = req.scope();
            assert!(std::ptr::eq(Arc::as_ptr(&first), again));
            slot.lock().unwrap().push(first);
            Ok::<_, BoxError>(Response::text("ok"))
        }
    });
    let (app, _) = pipeline(router);

    app.handle(request(Method::GET, "/scope")).await;
    app.handle(request(Method::GET, "/scope")).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(!Arc::ptr_eq(&seen[0], &seen[1]));
    assert_ne!(seen[0].request_id(), seen[1].request_id());
    // Only the test still holds each scope once its request has finished.
    assert!(seen.iter().all(|s| Arc::strong_count(s) == 1));
}

#[tokio::test]
async fn elapsed_time_covers_the_handler() {
    let (app, capture) = pipeline(Router::new().on(Method::GET, "/slow", slow));

    app.handle(request(Method::GET, "/slow")).await;

    let line = &capture.access_lines()[0];
    let start = line.find('[').unwrap() + 1;
    let end = line.find("ms]").unwrap();
    let elapsed: f64 = line[start..end].parse().unwrap();
    assert!(elapsed >= 20.0, "{line}");
    assert_eq!(line[start..end].split('.').nth(1).map(str::len), Some(3));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let (app, capture) = pipeline(Router::new().on(Method::GET, "/slow", slow));

    let req = http::Request::get("/slow")
        .header("x-request-id", "trace-me")
        .body(Bytes::new())
        .unwrap();
    let res = app.handle(Request::from_http(req)).await;

    assert_eq!(res.header("x-request-id"), Some("trace-me"));
    assert!(capture.access_lines()[0].contains("request_id=trace-me"));
}
