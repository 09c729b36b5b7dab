//! Shared helpers for the integration tests.
//!
//! Requests are sent straight to the router with `tower::ServiceExt::oneshot`;
//! Warcraft Logs is replaced by a `wiremock` server.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tbctxt_api::config::WarcraftLogsConfig;
use tbctxt_api::metrics::Metrics;
use tbctxt_api::reference::ReferenceData;
use tbctxt_api::upstream::WarcraftLogs;
use tbctxt_api::{router, AppState};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth/token";
pub const GRAPHQL_PATH: &str = "/api/v2/client";
pub const ACCESS_TOKEN: &str = "test-access-token";

/// base64("client-id:client-secret")
const BASIC_AUTH: &str = "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=";

pub fn wcl_config(server: &MockServer) -> WarcraftLogsConfig {
    WarcraftLogsConfig {
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        token_url: format!("{}{TOKEN_PATH}", server.uri()),
        api_url: format!("{}{GRAPHQL_PATH}", server.uri()),
        ..Default::default()
    }
}

pub fn build_app(config: WarcraftLogsConfig, reference: ReferenceData) -> Router {
    let metrics = Metrics::new().unwrap();
    let warcraft_logs = WarcraftLogs::try_from_config(config, metrics.clone()).unwrap();
    router(AppState {
        reference,
        warcraft_logs,
        metrics,
    })
}

pub fn proxy_app(server: &MockServer) -> Router {
    build_app(wcl_config(server), ReferenceData::default())
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = get(app, uri).await;
    let status = response.status();
    (status, body_json(response).await)
}

pub fn token_mock(expires_in: i64) -> Mock {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("authorization", BASIC_AUTH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "bearer",
            "expires_in": expires_in,
        })))
}

pub fn character_mock(response: ResponseTemplate) -> Mock {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .and(body_string_contains("characterData"))
        .respond_with(response)
}

pub fn gear_mock(response: ResponseTemplate) -> Mock {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .and(body_string_contains("reportData"))
        .respond_with(response)
}

pub fn character_body(name: &str, class_id: i64, reports: Value) -> Value {
    json!({
        "data": {
            "characterData": {
                "character": {
                    "name": name,
                    "classID": class_id,
                    "recentReports": { "data": reports }
                }
            }
        }
    })
}

pub fn one_report() -> Value {
    json!([{
        "code": "Xy7KbQ2mRz",
        "startTime": 1717000000000i64,
        "fights": [{ "id": 6, "name": "High King Maulgar" }]
    }])
}

pub fn gear_body(player_details: Value) -> Value {
    json!({
        "data": {
            "reportData": {
                "report": {
                    "masterData": { "actors": [] },
                    "playerDetails": player_details
                }
            }
        }
    })
}
