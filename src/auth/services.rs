use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::dto::{LoginRequest, RegisterRequest},
    error::ApiError,
    state::AppState,
    users::{dto::PublicUser, repo_types::NewUser},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn blocking<T, F>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("password worker panicked")?
}

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<(), ApiError> {
    let email = normalize_email(&req.email);
    let uid = req.uid.trim().to_string();
    let full_name = req.full_name.trim().to_string();

    if uid.is_empty() {
        return Err(ApiError::BadRequest("uid is required".into()));
    }
    if full_name.is_empty() {
        return Err(ApiError::BadRequest("full_name is required".into()));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".into()));
    }

    if state.users.email_exists(&email).await? {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already exists".into()));
    }

    let passwords = state.passwords.clone();
    let password = req.password;
    let password_hash = blocking(move || passwords.hash(&password)).await?;

    let user = NewUser {
        uid,
        full_name,
        email,
        password_hash,
        role: req.role,
    };
    if let Err(e) = state.users.insert(&user).await {
        warn!(error = %e, uid = %user.uid, email = %user.email, "insert rejected");
        return Err(e.into());
    }

    info!(uid = %user.uid, email = %user.email, "user registered");
    Ok(())
}

/// Unknown email, wrong password and an unreadable stored hash all produce
/// the same error after the same amount of hashing work.
pub async fn login(state: &AppState, req: LoginRequest) -> Result<PublicUser, ApiError> {
    let email = normalize_email(&req.email);
    let user = state.users.find_by_email(&email).await?;

    let passwords = state.passwords.clone();
    let password = req.password;
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let verified = blocking(move || {
        Ok(match stored {
            Some(hash) => passwords.verify(&password, &hash),
            None => Ok(passwords.verify_dummy(&password)),
        })
    })
    .await?;

    let Some(user) = user else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    match verified {
        Ok(true) => {}
        Ok(false) => {
            warn!(email = %email, uid = %user.uid, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, uid = %user.uid, "stored password hash is unreadable");
            return Err(ApiError::InvalidCredentials);
        }
    }

    info!(uid = %user.uid, email = %user.email, "user logged in");
    Ok(user.into())
}
