use serde::Serialize;

use crate::users::repo_types::User;

/// Account fields safe to return to any caller.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub uid: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            uid: u.uid,
            full_name: u.full_name,
            email: u.email,
            role: u.role,
        }
    }
}
