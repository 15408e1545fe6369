use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use pushrelay_common::Platform;
use pushrelay_fcm::{
    routes, FcmClient, ServiceAccountIdentityIssuer, StaticCredentials, TokenWorkflow,
};
use pushrelay_store::TokenStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE_ACCOUNT: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/service_account.json"
);

struct TestApp {
    router: Router,
    store: TokenStore,
    provider: MockServer,
}

async fn test_app() -> TestApp {
    let provider = MockServer::start().await;
    let store = TokenStore::in_memory();
    let client = Arc::new(FcmClient::new(
        reqwest::Client::new(),
        provider.uri(),
        Arc::new(StaticCredentials::new("test-bearer", "proj")),
    ));
    let workflow = TokenWorkflow::new(
        store.clone(),
        client.clone(),
        client,
        Arc::new(ServiceAccountIdentityIssuer::new(SERVICE_ACCOUNT)),
    );
    TestApp {
        router: routes(workflow),
        store,
        provider,
    }
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn device_info(platform: &str, device_id: &str) -> Value {
    json!({
        "user_id": "u1",
        "platform": platform,
        "device_model": "Pixel 8",
        "os_version": "Android 14",
        "app_version": "3.1.0",
        "device_id": device_id,
        "installation_id": format!("inst-{}", device_id)
    })
}

#[tokio::test]
async fn test_register_then_send() {
    let app = test_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/proj/messages:send"))
        .and(body_json(json!({
            "message": {"token": "T1", "notification": {"title": "Hi", "body": "Hello u1"}}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "projects/proj/messages/7"})),
        )
        .expect(1)
        .mount(&app.provider)
        .await;

    let (status, body) = call(
        &app.router,
        json_request(
            Method::POST,
            "/fcm/register",
            json!({"user_id": "u1", "platform": "android", "token": "T1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, body) = call(
        &app.router,
        json_request(
            Method::POST,
            "/fcm/send",
            json!({"user_id": "u1", "platform": "android", "title": "Hi", "body": "Hello u1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_send_to_unregistered_user_is_404() {
    let app = test_app().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.provider)
        .await;

    let (status, body) = call(
        &app.router,
        json_request(
            Method::POST,
            "/fcm/send",
            json!({"user_id": "ghost", "platform": "ios", "title": "t", "body": "b"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], 404);
}

#[tokio::test]
async fn test_send_provider_failure_is_500() {
    let app = test_app().await;
    app.store.put_simple("u1", "web", "stale").await.unwrap();
    Mock::given(method("POST"))
        .and(path("/v1/projects/proj/messages:send"))
        .respond_with(ResponseTemplate::new(404).set_body_string("UNREGISTERED"))
        .mount(&app.provider)
        .await;

    let (status, body) = call(
        &app.router,
        json_request(
            Method::POST,
            "/fcm/send",
            json!({"user_id": "u1", "platform": "web", "title": "t", "body": "b"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .contains("UNREGISTERED"));
}

#[tokio::test]
async fn test_malformed_bodies_are_400() {
    let app = test_app().await;
    for uri in ["/auth/token", "/fcm/register", "/fcm/generate", "/fcm/send"] {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = call(&app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }

    let missing_content_type = Request::builder()
        .method(Method::POST)
        .uri("/fcm/register")
        .body(Body::from(r#"{"user_id":"u1"}"#))
        .unwrap();
    let (status, _) = call(&app.router, missing_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_stores_record_and_echoes_device_info() {
    let app = test_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/proj/registrations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "issued-1"})))
        .expect(1)
        .mount(&app.provider)
        .await;

    let (status, body) = call(
        &app.router,
        json_request(
            Method::POST,
            "/fcm/generate",
            json!({"device_info": device_info("android", "dev-1")}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["token"], "issued-1");
    assert_eq!(result["device_info"], device_info("android", "dev-1"));
    assert!(result["generated_at"].is_string());
    assert!(result["expires_at"].is_string());

    let record = app
        .store
        .get_detailed("u1", Platform::Android, "dev-1")
        .await
        .unwrap();
    assert_eq!(record.token, "issued-1");
    let generated_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(result["generated_at"].clone()).unwrap();
    let expires_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(result["expires_at"].clone()).unwrap();
    assert_eq!(record.generated_at, generated_at);
    assert_eq!(record.expires_at, expires_at);
}

#[tokio::test]
async fn test_generate_rejects_unknown_platform() {
    let app = test_app().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "x"})))
        .expect(0)
        .mount(&app.provider)
        .await;

    let (status, body) = call(
        &app.router,
        json_request(
            Method::POST,
            "/fcm/generate",
            json!({"device_info": device_info("windows", "dev-1")}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .contains("windows"));
}

#[tokio::test]
async fn test_generate_provider_failure_is_500() {
    let app = test_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/proj/registrations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("UNAVAILABLE"))
        .mount(&app.provider)
        .await;

    let (status, _) = call(
        &app.router,
        json_request(
            Method::POST,
            "/fcm/generate",
            json!({"device_info": device_info("ios", "dev-9")}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.store.list_for_user("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_and_delete_device_tokens() {
    let app = test_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/proj/registrations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "issued"})))
        .mount(&app.provider)
        .await;

    for (platform, device) in [("android", "a"), ("web", "b")] {
        let (status, _) = call(
            &app.router,
            json_request(
                Method::POST,
                "/fcm/generate",
                json!({"device_info": device_info(platform, device)}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let list = |router: Router| async move {
        let request = Request::builder()
            .uri("/fcm/tokens/u1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice::<Vec<Value>>(&body).unwrap()
    };
    assert_eq!(list(app.router.clone()).await.len(), 2);

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri("/fcm/tokens/u1/web/b")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app.router, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let records = list(app.router.clone()).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["device_id"], "a");

    let bad_platform = Request::builder()
        .method(Method::DELETE)
        .uri("/fcm/tokens/u1/palm/a")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app.router, bad_platform).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_issue_identity_token() {
    let app = test_app().await;
    let (status, body) = call(
        &app.router,
        json_request(Method::POST, "/auth/token", json!({"user_id": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_slice(&body).unwrap();
    let token = response["custom_token"].as_str().unwrap();
    assert_eq!(token.split('.').count(), 3);

    let (status, _) = call(
        &app.router,
        json_request(Method::POST, "/auth/token", json!({"user_id": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_separator_in_ids() {
    let app = test_app().await;
    let (status, body) = call(
        &app.router,
        json_request(
            Method::POST,
            "/fcm/register",
            json!({"user_id": "detailed:u1:android", "platform": "ios", "token": "junk"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .contains("user_id"));
    assert!(app.store.list_for_user("u1").await.unwrap().is_empty());
}
