use async_trait::async_trait;
use sqlx::MySqlPool;
use thiserror::Error;

use crate::users::repo_types::{NewUser, User};

/// Which unique key an insert collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    Email,
    Uid,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {0:?}")]
    Duplicate(DuplicateKey),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations the handlers depend on.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, in storage order.
    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Cheap pre-check before hashing; the unique constraint in `insert` is authoritative.
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    async fn insert(&self, user: &NewUser) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct MySqlUserStore {
    pool: MySqlPool,
}

impl MySqlUserStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for MySqlUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT uid, username AS full_name, email, password AS password_hash, role
            FROM `user`
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT uid, username AS full_name, email, password AS password_hash, role
            FROM `user`
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM `user` WHERE email = ?"#)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO `user` (uid, username, email, password, role)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.uid)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate(duplicate_key(db_err.message())))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// MySQL reports `Duplicate entry '<value>' for key '<index>'`; only the index
/// name tells which column collided. `uid` is the primary key, so any other
/// unique index is the email one.
fn duplicate_key(message: &str) -> DuplicateKey {
    let index = message
        .rsplit("for key")
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('\'');
    let index = index.rsplit('.').next().unwrap_or(index);
    if index.eq_ignore_ascii_case("PRIMARY") {
        DuplicateKey::Uid
    } else {
        DuplicateKey::Email
    }
}
