//! API Integration Tests
//!
//! Drive the full router against the in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use mini_wallet::api::{self, AppState};
use mini_wallet::auth::{TokenService, AUTH_SCHEME};
use mini_wallet::store::InMemoryStore;

const SECRET: &str = "integration-test-secret";

fn app() -> Router {
    api::build_app(AppState::in_memory(
        InMemoryStore::new(),
        TokenService::new(SECRET, 24),
    ))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("{}{}", AUTH_SCHEME, token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn form_request(method: &str, uri: &str, token: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .header("Authorization", format!("{}{}", AUTH_SCHEME, token))
        .body(Body::from(body))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("{}{}", AUTH_SCHEME, token))
        .body(Body::empty())
        .unwrap()
}

async fn init(app: &Router, customer_xid: &str) -> String {
    let (status, body) = send(
        app,
        json_request("POST", "/api/v1/init", None, json!({ "customer_xid": customer_xid })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "init failed: {}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

fn error_of(body: &Value) -> (&str, &str) {
    (
        body["error_list"][0]["error_name"].as_str().unwrap(),
        body["error_list"][0]["error_description"].as_str().unwrap(),
    )
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_wallet_scenario_e2e() {
    let app = app();
    let token = init(&app, "C1").await;

    // 1. Enable
    let (status, body) = send(&app, empty_request("POST", "/api/v1/wallet", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["owned_by"], "C1");
    assert_eq!(body["data"]["status"], "enabled");
    assert_eq!(body["data"]["balance"], "0");

    // 2. Deposit 1000 (form body)
    let (status, body) = send(
        &app,
        form_request("POST", "/api/v1/wallet/deposits", &token, "amount=1000&reference_id=R1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deposited_by"], "C1");
    assert_eq!(body["data"]["status"], "success");
    assert_eq!(body["data"]["amount"], "1000");
    assert_eq!(body["data"]["reference_id"], "R1");

    // 3. Withdraw 400 (JSON body)
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/wallet/withdrawals",
            Some(&token),
            json!({ "reference_id": "R2", "amount": "400" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["withdrawn_by"], "C1");
    assert_eq!(body["data"]["amount"], "400");

    let (_, body) = send(&app, empty_request("GET", "/api/v1/wallet", &token)).await;
    assert_eq!(body["data"]["balance"], "600");

    // 4. Withdraw more than the balance
    let (status, body) = send(
        &app,
        form_request("POST", "/api/v1/wallet/withdrawals", &token, "amount=1000&reference_id=R3"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);
    assert_eq!(error_of(&body), ("Withdrawal", "Wallet balance not enough"));

    let (_, body) = send(&app, empty_request("GET", "/api/v1/wallet/", &token)).await;
    assert_eq!(body["data"]["balance"], "600");

    // 5. Disable, then the balance is no longer visible
    let (status, body) = send(
        &app,
        form_request("PATCH", "/api/v1/wallet", &token, "is_disabled=true"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "disabled");

    let (status, body) = send(&app, empty_request("GET", "/api/v1/wallet", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&body), ("Wallet", "Wallet disabled"));
}

#[tokio::test]
async fn test_reference_reuse_over_http() {
    let app = app();
    let token = init(&app, "C1").await;
    send(&app, empty_request("POST", "/api/v1/wallet", &token)).await;

    let deposit = || {
        json_request(
            "POST",
            "/api/v1/wallet/deposits",
            Some(&token),
            json!({ "reference_id": "R1", "amount": 100 }),
        )
    };

    let (status, _) = send(&app, deposit()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, deposit()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_of(&body), ("Deposit", "Reference id already used"));

    let (_, body) = send(&app, empty_request("GET", "/api/v1/wallet", &token)).await;
    assert_eq!(body["data"]["balance"], "100");
}

#[tokio::test]
async fn test_wallet_state_errors() {
    let app = app();
    let token = init(&app, "C1").await;

    let (status, body) = send(&app, empty_request("GET", "/api/v1/wallet", &token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_of(&body), ("Wallet", "Wallet not enabled"));

    send(&app, empty_request("POST", "/api/v1/wallet", &token)).await;
    let (status, body) = send(&app, empty_request("POST", "/api/v1/wallet", &token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_of(&body), ("Wallet", "Wallet already enabled"));

    send(&app, form_request("PATCH", "/api/v1/wallet", &token, "is_disabled=true")).await;
    let (status, body) = send(
        &app,
        form_request("PATCH", "/api/v1/wallet", &token, "is_disabled=true"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_of(&body), ("Wallet", "Wallet already disabled"));

    let (status, body) = send(
        &app,
        form_request("POST", "/api/v1/wallet/deposits", &token, "amount=10&reference_id=R1"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_of(&body), ("Deposit", "Wallet disabled"));
}

#[tokio::test]
async fn test_request_validation() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request("POST", "/api/v1/init", None, json!({ "customer_xid": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), ("Request invalid", "Params customer_xid empty"));

    let token = init(&app, "C1").await;
    send(&app, empty_request("POST", "/api/v1/wallet", &token)).await;

    let cases = [
        (json!({ "amount": 10 }), "Params reference_id empty"),
        (json!({ "reference_id": "R1" }), "Params amount not valid"),
        (json!({ "reference_id": "R1", "amount": -10 }), "Params amount not valid"),
        (json!({ "reference_id": "R1", "amount": "ten" }), "Body not completed"),
    ];
    for (payload, expected) in cases {
        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/wallet/deposits", Some(&token), payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), ("Request invalid", expected));
    }

    let (status, body) = send(&app, empty_request("POST", "/api/v1/wallet/withdrawals", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), ("Request invalid", "Body not completed"));

    let (status, body) = send(
        &app,
        form_request("PATCH", "/api/v1/wallet", &token, "is_disabled=false"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), ("Request invalid", "Params is_disabled empty"));
}

#[tokio::test]
async fn test_authorization_failures() {
    let app = app();

    // Missing header
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/wallet")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), ("Request invalid", "Header Authorization empty"));

    // Signed with another key
    let foreign = TokenService::new("some-other-secret", 24).issue("C1").unwrap();
    let (status, body) = send(&app, empty_request("GET", "/api/v1/wallet", &foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    assert_eq!(error_of(&body).0, "Unauthorized user");

    // Not a token at all
    let (status, body) = send(&app, empty_request("GET", "/api/v1/wallet", "garbage")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body).0, "bad_request");
}

#[tokio::test]
async fn test_bare_token_is_accepted() {
    let app = app();
    let token = init(&app, "C1").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/wallet")
        .header("Authorization", token)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["owned_by"], "C1");
}

#[tokio::test]
async fn test_customers_are_isolated() {
    let app = app();
    let alice = init(&app, "alice").await;
    let bob = init(&app, "bob").await;

    send(&app, empty_request("POST", "/api/v1/wallet", &alice)).await;
    send(&app, empty_request("POST", "/api/v1/wallet", &bob)).await;
    send(
        &app,
        form_request("POST", "/api/v1/wallet/deposits", &alice, "amount=75&reference_id=A1"),
    )
    .await;

    let (_, body) = send(&app, empty_request("GET", "/api/v1/wallet", &alice)).await;
    assert_eq!(body["data"]["balance"], "75");

    let (_, body) = send(&app, empty_request("GET", "/api/v1/wallet", &bob)).await;
    assert_eq!(body["data"]["balance"], "0");
    assert_eq!(body["data"]["owned_by"], "bob");
}
