use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
        extractors::JsonBody,
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).fallback(method_not_allowed))
        .route("/login", post(login).fallback(method_not_allowed))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::register(&state, payload).await?;
    Ok(Json(MessageResponse {
        message: "User registered successfully",
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = services::login(&state, payload).await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        user,
    }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
