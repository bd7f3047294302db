// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    ledger::UserAssets,
    models::{
        AttendanceResponse, AuthenticateResponse, BalancesResponse, BuyBearBucksRequest,
        BuyBearBucksResponse, CreateUserRequest, CreateUserResponse, IncrementAttendanceRequest,
        LoginRequest, LoginResponse, SuccessResponse, TransactionListResponse, TransactionView,
        TransferRequest, TxResponse, UpdateUserAssetsRequest, UserAssetsResponse,
        UserListResponse, UserSummary, ValidateAccessRequest, ValidateAccessResponse,
        WalletAddress,
    },
    state::AppState,
};

pub mod access;
pub mod accounts;
pub mod assets;
pub mod health;
pub mod payments;

/// JSON body extractor that treats an empty body as `T::default()`.
///
/// Missing fields then surface as the endpoint's own validation message.
/// Rejections use the `{error}` shape; handlers with another error body take
/// `Result<LenientJson<T>, ApiError>` and reshape it.
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            ApiError::bad_request("Invalid request body").with_details(e.body_text())
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(LenientJson(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(LenientJson)
            .map_err(|e| ApiError::bad_request("Invalid JSON body").with_details(e.to_string()))
    }
}

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/createUser", post(accounts::create_user))
        .route("/login", post(accounts::login))
        .route("/authenticateUser", get(accounts::authenticate_user))
        .route("/logout", post(accounts::logout))
        .route("/users", get(accounts::list_users))
        .route("/balances/{username}", get(assets::get_balances))
        .route("/updateUserAssets", post(assets::update_user_assets))
        .route("/getUserAssets/{username}", get(assets::get_user_assets))
        .route("/buybearbucks", post(assets::buy_bearbucks))
        .route("/transfer", post(payments::transfer))
        .route("/transactions", get(payments::list_transactions))
        .route("/incrementAttendance", post(access::increment_attendance))
        .route("/validateAccess", post(access::validate_access))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Registers the `bearer` session token scheme referenced by the account routes.
struct SessionAuth;

impl Modify for SessionAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionAuth),
    paths(
        accounts::create_user,
        accounts::login,
        accounts::authenticate_user,
        accounts::logout,
        accounts::list_users,
        assets::get_balances,
        assets::update_user_assets,
        assets::get_user_assets,
        assets::buy_bearbucks,
        payments::transfer,
        payments::list_transactions,
        access::increment_attendance,
        access::validate_access,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            WalletAddress,
            UserAssets,
            CreateUserRequest,
            CreateUserResponse,
            LoginRequest,
            LoginResponse,
            AuthenticateResponse,
            SuccessResponse,
            UserSummary,
            UserListResponse,
            BalancesResponse,
            UpdateUserAssetsRequest,
            TxResponse,
            UserAssetsResponse,
            BuyBearBucksRequest,
            BuyBearBucksResponse,
            TransferRequest,
            TransactionView,
            TransactionListResponse,
            IncrementAttendanceRequest,
            AttendanceResponse,
            ValidateAccessRequest,
            ValidateAccessResponse
        )
    ),
    tags(
        (name = "Accounts", description = "Signup, login and sessions"),
        (name = "Assets", description = "Balances, card fields and BRB purchases"),
        (name = "Payments", description = "Card payments and history"),
        (name = "Access", description = "Attendance and access checks"),
        (name = "Health", description = "Liveness and readiness")
    )
)]
struct ApiDoc;
