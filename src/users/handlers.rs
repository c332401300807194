use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState, users::dto::PublicUser};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user", get(list_users))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.users.list().await?;
    debug!(count = users.len(), "listed users");
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}
