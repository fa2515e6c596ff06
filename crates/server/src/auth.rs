//! Bearer-token auth plumbing and the `/auth` handlers.

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts, StatusCode};
use axum::Json;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{decode_token, AuthConfig, AuthService};
use service::booking::repo::seaorm::SeaOrmBookingRepository;
use service::booking::service::BookingService;
use service::storage::BlobStore;

use crate::errors::ApiError;
use crate::rate_limit::FixedWindowLimiter;
use crate::validation::{validate_login, validate_register, LoginRequest, RegisterRequest};

/// Token issuing and verification settings shared by handlers and the
/// [`CallerId`] extractor.
#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

/// Shared application state.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub bookings: Arc<BookingService<SeaOrmBookingRepository>>,
    pub blob_store: Arc<dyn BlobStore>,
    pub auth_limiter: FixedWindowLimiter,
}

impl ServerState {
    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        AuthService::new(
            Arc::new(SeaOrmAuthRepository { db: self.db.clone() }),
            AuthConfig {
                jwt_secret: self.auth.jwt_secret.clone(),
                token_ttl_secs: self.auth.token_ttl_secs,
                password_algorithm: "argon2".into(),
            },
        )
    }
}

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
/// Used as a handler argument on protected routes; public routes simply do
/// not take it, so no middleware ordering can accidentally expose or lock
/// an endpoint.
pub struct CallerId(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<ServerState> for CallerId {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header_value.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

        match decode_token(&state.auth.jwt_secret, token) {
            Ok(user_id) => Ok(CallerId(user_id)),
            Err(e) => {
                warn!(error = %e, "bearer token rejected");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Create a user account.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Validation failed"),
        (status = 429, description = "Rate limited"),
    )
)]
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let input = validate_register(req)?;
    let user = state.auth_service().register(input).await?;
    info!(user_id = %user.id, "register ok");
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id: user.id })))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid credentials or validation failure"),
        (status = 429, description = "Rate limited"),
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let input = validate_login(req)?;
    let session = state.auth_service().login(input).await?;
    Ok(Json(LoginResponse { token: session.token }))
}
