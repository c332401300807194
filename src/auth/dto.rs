use serde::{Deserialize, Serialize};

use crate::users::dto::PublicUser;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub uid: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Successful login: a message plus the account's public fields.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub user: PublicUser,
}
