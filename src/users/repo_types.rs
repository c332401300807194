use sqlx::FromRow;

/// User record in the `user` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub uid: String,
    pub full_name: String, // stored as `username`
    pub email: String,
    pub password_hash: String, // PHC string, never leaves the service
    pub role: String,
}

/// Row to insert on registration. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}
