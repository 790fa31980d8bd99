//! End-to-end tests: binding, business logic, auth gate and error rendering
//! through a [`Chain`].

use batt_core::{AppError, AuthUser, MessageResponse, NoParam, RequestContext};
use batt_extract::{Bind, BindStage, Params};
use batt_middleware::{
    auth_user, handler, AuthBearer, AuthResponders, BoxFuture, Chain, HandlerError,
    HandlerResult, Middleware, Next, Request, Response, ResponseExt,
};
use bytes::Bytes;
use http::{Method, StatusCode};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default, Bind)]
struct TestStruct {
    #[bind(query = "page")]
    page: i64,
    #[bind(params = "id")]
    id: String,
    #[bind(json = "name")]
    name: String,
}

#[derive(Debug, Serialize)]
struct Echo {
    page: i64,
    id: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct TraceTag(&'static str);

#[derive(Debug, thiserror::Error)]
#[error("downstream unavailable")]
struct Downstream;

async fn echo(_ctx: RequestContext, req: TestStruct) -> Result<Echo, AppError> {
    Ok(Echo {
        page: req.page,
        id: req.id,
        name: req.name,
    })
}

async fn hello(_ctx: RequestContext, _req: NoParam) -> Result<MessageResponse, AppError> {
    Ok(MessageResponse::base("Hello world"))
}

async fn resolve(_ctx: RequestContext, token: String) -> Option<User> {
    (token == "good").then(|| User {
        name: "ada".to_string(),
    })
}

// Reports which context values the endpoint can see.
async fn inspect(ctx: RequestContext, _req: NoParam) -> Result<MessageResponse, AppError> {
    let user = auth_user::<User>(&ctx).map_or("none", |u| u.name.as_str());
    let tag = ctx.extension::<TraceTag>().map_or("none", |t| t.0);
    Ok(MessageResponse::base(format!("{user}/{tag}")))
}

struct Tag;

impl Middleware for Tag {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            ctx.insert_extension(TraceTag("upstream"));
            next.run(ctx, request).await
        })
    }
}

fn body_json(response: &Response) -> serde_json::Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn bearer(value: &str) -> Request {
    http::Request::builder()
        .header("authorization", value)
        .body(Bytes::new())
        .unwrap()
}

#[tokio::test]
async fn test_concrete_scenario() {
    let chain = Chain::new(handler(echo, StatusCode::OK));

    let mut request = http::Request::builder()
        .method(Method::POST)
        .uri("/user/123?page=1")
        .header("content-type", "application/json")
        .body(Bytes::from_static(br#"{"name":"Hello"}"#))
        .unwrap();
    request
        .extensions_mut()
        .insert(Params::new().with("id", "123"));

    let response = chain.respond(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(&response),
        serde_json::json!({ "page": 1, "id": "123", "name": "Hello" })
    );
}

#[tokio::test]
async fn test_empty_request_no_param() {
    let chain = Chain::new(handler(hello, StatusCode::OK));

    let response = chain.respond(http::Request::new(Bytes::new())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), br#"{"message":"Hello world"}"#);
}

#[tokio::test]
async fn test_binding_errors_keep_their_stage() {
    let chain = Chain::new(handler(echo, StatusCode::OK));
    let mut ctx = RequestContext::new();

    let request = http::Request::builder()
        .uri("/user?page=abc")
        .body(Bytes::new())
        .unwrap();
    let err = chain.handle(&mut ctx, request).await.unwrap_err();
    assert_eq!(err.binding().map(|e| e.stage()), Some(BindStage::Query));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let request = http::Request::builder()
        .method(Method::POST)
        .header("content-type", "application/xml")
        .body(Bytes::from_static(b"<name>Hello</name>"))
        .unwrap();
    let err = chain.handle(&mut ctx, request).await.unwrap_err();
    assert_eq!(err.binding().map(|e| e.stage()), Some(BindStage::Body));
    assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_logic_error_is_propagated_unmodified() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let failing = handler(
        move |_ctx: RequestContext, _req: NoParam| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<MessageResponse, _>(Downstream) }
        },
        StatusCode::OK,
    );
    let chain = Chain::new(failing);

    let mut ctx = RequestContext::new();
    let err = chain
        .handle(&mut ctx, http::Request::new(Bytes::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::Logic(_)));
    assert!(err.logic_ref::<Downstream>().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let response = chain.respond(http::Request::new(Bytes::new())).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_logic_not_called_when_binding_fails() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let counted = handler(
        move |_ctx: RequestContext, req: TestStruct| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, AppError>(MessageResponse::base(req.name)) }
        },
        StatusCode::OK,
    );

    let request = http::Request::builder()
        .method(Method::POST)
        .header("content-type", "application/json")
        .body(Bytes::from_static(b"{broken"))
        .unwrap();
    let response = Chain::new(counted).respond(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_header_is_rejected() {
    let resolved = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&resolved);
    let gate = AuthBearer::new(move |ctx: RequestContext, token: String| {
        counter.fetch_add(1, Ordering::SeqCst);
        resolve(ctx, token)
    });
    let chain = Chain::new(handler(inspect, StatusCode::OK)).with(gate);

    let response = chain.respond(http::Request::new(Bytes::new())).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(&response),
        serde_json::json!({ "message": "Unauthenticated" })
    );
    assert_eq!(resolved.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_both_rejection_paths_are_distinct() {
    let responders = AuthResponders::default()
        .on_header_missing(|_| Response::message(StatusCode::UNAUTHORIZED, "header missing"))
        .on_invalid_user(|_| Response::message(StatusCode::FORBIDDEN, "invalid user"));
    let chain = Chain::new(handler(inspect, StatusCode::OK))
        .with(AuthBearer::new(resolve).responders(responders));

    let missing = chain.respond(http::Request::new(Bytes::new())).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(&missing)["message"], "header missing");

    // Wrong scheme takes the header-missing path, not the invalid-user one.
    let malformed = chain.respond(bearer("Token good")).await;
    assert_eq!(body_json(&malformed)["message"], "header missing");
    let no_space = chain.respond(bearer("Bearer")).await;
    assert_eq!(body_json(&no_space)["message"], "header missing");

    let invalid = chain.respond(bearer("Bearer bad")).await;
    assert_eq!(invalid.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(&invalid)["message"], "invalid user");
}

#[tokio::test]
async fn test_authenticated_user_reaches_logic() {
    let chain = Chain::new(handler(inspect, StatusCode::OK)).with(AuthBearer::new(resolve));

    let response = chain.respond(bearer("Bearer good")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(&response)["message"], "ada/none");
}

#[tokio::test]
async fn test_user_is_stored_in_context() {
    let chain = Chain::new(handler(inspect, StatusCode::OK)).with(AuthBearer::new(resolve));
    let mut ctx = RequestContext::new();

    chain.handle(&mut ctx, bearer("Bearer good")).await.unwrap();

    assert_eq!(
        ctx.extension::<AuthUser<User>>().map(AuthUser::get),
        Some(&User {
            name: "ada".to_string()
        })
    );
}

#[tokio::test]
async fn test_gate_keeps_upstream_values_by_default() {
    let chain = Chain::new(handler(inspect, StatusCode::OK))
        .with(Tag)
        .with(AuthBearer::new(resolve));

    let response = chain.respond(bearer("Bearer good")).await;

    assert_eq!(body_json(&response)["message"], "ada/upstream");
}

#[tokio::test]
async fn test_isolated_gate_drops_upstream_values() {
    let gate = AuthBearer::new(resolve).isolated();
    assert!(gate.is_isolated());
    let chain = Chain::new(handler(inspect, StatusCode::OK))
        .with(Tag)
        .with(gate);

    let mut ctx = RequestContext::new();
    let request_id = ctx.request_id();
    let response = chain.handle(&mut ctx, bearer("Bearer good")).await.unwrap();

    assert_eq!(body_json(&response)["message"], "ada/none");
    assert_eq!(ctx.request_id(), request_id);
}
