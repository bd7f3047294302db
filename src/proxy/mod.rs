// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin dashboard proxy.
//!
//! Relays `/api/proxy/*` to the API server and marks every response as
//! uncacheable. Upstream failures never leak through: the dashboard gets a
//! fixed 500 body instead.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use url::Url;

use crate::models::{AssetFieldsRequest, UpdateUserAssetsRequest};

const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid request body: {0}")]
    Body(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ProxyState {
    client: Client,
    upstream: Url,
}

impl ProxyState {
    pub fn new(upstream: Url) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .default_headers(no_cache_headers())
            .build()
            .map_err(|e| ProxyError::Client(e.to_string()))?;
        Ok(Self { client, upstream })
    }

    fn endpoint(&self, path: &str, query: Option<&str>) -> String {
        let base = self.upstream.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{base}/{path}?{q}"),
            None => format!("{base}/{path}"),
        }
    }

    /// Send a request upstream and return its JSON body.
    ///
    /// Any non-2xx status counts as a failure.
    async fn relay(&self, request: RequestBuilder) -> Result<Value, ProxyError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Status(status));
        }
        Ok(response.json().await?)
    }
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers
}

fn failure(body: Value) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn forward_get(
    State(state): State<ProxyState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let url = state.endpoint(&path, query.as_deref());
    tracing::debug!(%url, "proxying GET");

    match state.relay(state.client.get(&url)).await {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            tracing::warn!(%url, error = %e, "proxy GET failed");
            failure(json!({ "success": false, "error": "Failed to fetch data" }))
        }
    }
}

async fn forward_post(
    State(state): State<ProxyState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let url = state.endpoint(&path, query.as_deref());
    tracing::debug!(%url, "proxying POST");

    let result = match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => state.relay(state.client.post(&url).json(&payload)).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            tracing::warn!(%url, error = %e, "proxy POST failed");
            failure(json!({ "success": false, "error": "Failed to process request" }))
        }
    }
}

async fn user_assets(State(state): State<ProxyState>, Path(username): Path<String>) -> Response {
    let url = state.endpoint(&format!("getUserAssets/{username}"), None);

    match state.relay(state.client.get(&url)).await {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            tracing::warn!(%username, error = %e, "fetching user assets failed");
            failure(json!({ "error": "Failed to fetch user assets" }))
        }
    }
}

/// Fill in the dashboard's form defaults and post to `updateUserAssets`.
async fn update_user_assets(
    State(state): State<ProxyState>,
    Path(username): Path<String>,
    body: Bytes,
) -> Response {
    let url = state.endpoint("updateUserAssets", None);

    let result = match serde_json::from_slice::<AssetFieldsRequest>(&body) {
        Ok(fields) => {
            let payload = UpdateUserAssetsRequest {
                username: Some(username.clone()),
                student_id: fields.student_id,
                ticket_access: Some(fields.ticket_access.unwrap_or(false)),
                door_access: Some(fields.door_access.unwrap_or(false)),
                attendance: Some(fields.attendance.unwrap_or(0)),
            };
            state.relay(state.client.post(&url).json(&payload)).await
        }
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            tracing::warn!(%username, error = %e, "updating user assets failed");
            failure(json!({ "error": "Failed to update user assets" }))
        }
    }
}

fn no_cache_layer(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/proxy/getUserAssets/{username}", get(user_assets))
        .route("/api/proxy/updateUserAssets/{username}", post(update_user_assets))
        .route("/api/proxy/{*path}", get(forward_get).post(forward_post))
        .with_state(state)
        .layer(no_cache_layer(header::CACHE_CONTROL, NO_STORE))
        .layer(no_cache_layer(header::PRAGMA, "no-cache"))
        .layer(no_cache_layer(header::EXPIRES, "0"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        extract::Query,
        http::{Method, Request},
    };
    use std::collections::HashMap;
    use tower::ServiceExt;

    async fn upstream() -> Url {
        let app = Router::new()
            .route(
                "/transactions",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({ "success": true, "query": q }))
                }),
            )
            .route(
                "/transfer",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({ "success": true, "echo": body }))
                }),
            )
            .route(
                "/updateUserAssets",
                post(|Json(body): Json<Value>| async move { Json(body) }),
            )
            .route(
                "/getUserAssets/{username}",
                get(|Path(username): Path<String>| async move {
                    if username == "ghost" {
                        (StatusCode::NOT_FOUND, Json(json!({ "error": "User not found" })))
                    } else {
                        (StatusCode::OK, Json(json!({ "studentId": "S1", "user": username })))
                    }
                }),
            )
            .route(
                "/broken",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR })
                    .post(|| async { StatusCode::BAD_REQUEST }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}").parse().unwrap()
    }

    async fn proxy() -> Router {
        router(ProxyState::new(upstream().await).unwrap())
    }

    async fn call(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn endpoint_joins_path_and_query() {
        let state = ProxyState::new("http://localhost:2000/".parse().unwrap()).unwrap();
        assert_eq!(
            state.endpoint("transactions", Some("page=2")),
            "http://localhost:2000/transactions?page=2"
        );
        assert_eq!(state.endpoint("/users", Some("")), "http://localhost:2000/users");
    }

    #[tokio::test]
    async fn get_forwards_query_and_sets_no_cache() {
        let (status, headers, body) =
            call(proxy().await, Method::GET, "/api/proxy/transactions?page=2", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"]["page"], "2");
        assert_eq!(headers[header::CACHE_CONTROL], NO_STORE);
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert_eq!(headers[header::EXPIRES], "0");
    }

    #[tokio::test]
    async fn post_forwards_json_body() {
        let payload = json!({ "studentId": "S1", "merchantId": 0, "amount": "1" });
        let (status, _, body) =
            call(proxy().await, Method::POST, "/api/proxy/transfer", Some(payload.clone())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["echo"], payload);
    }

    #[tokio::test]
    async fn upstream_errors_become_500() {
        let app = proxy().await;

        let (status, headers, body) =
            call(app.clone(), Method::GET, "/api/proxy/broken", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": "Failed to fetch data" }));
        assert_eq!(headers[header::CACHE_CONTROL], NO_STORE);

        let (status, _, body) =
            call(app, Method::POST, "/api/proxy/broken", Some(json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": "Failed to process request" }));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_500() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let app = router(ProxyState::new(format!("http://{addr}").parse().unwrap()).unwrap());
        let (status, _, body) = call(app, Method::GET, "/api/proxy/users", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch data");
    }

    #[tokio::test]
    async fn update_user_assets_fills_defaults() {
        let (status, _, body) = call(
            proxy().await,
            Method::POST,
            "/api/proxy/updateUserAssets/alice",
            Some(json!({ "studentId": "S1" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "username": "alice",
                "studentId": "S1",
                "ticketAccess": false,
                "doorAccess": false,
                "attendance": 0
            })
        );
    }

    #[tokio::test]
    async fn user_assets_route_maps_not_found() {
        let app = proxy().await;

        let (status, _, body) =
            call(app.clone(), Method::GET, "/api/proxy/getUserAssets/alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], "alice");

        let (status, _, body) =
            call(app, Method::GET, "/api/proxy/getUserAssets/ghost", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch user assets" }));
    }
}
