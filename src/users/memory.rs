use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::users::{
    repo::{DuplicateKey, StoreError, StoreResult, UserStore},
    repo_types::{NewUser, User},
};

/// In-memory `UserStore` with the same unique keys as the `user` table.
#[derive(Debug, Default, Clone)]
pub struct MemoryUserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.users.read().await.iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.uid == user.uid) {
            return Err(StoreError::Duplicate(DuplicateKey::Uid));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(DuplicateKey::Email));
        }
        users.push(User {
            uid: user.uid.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.clone(),
        });
        Ok(())
    }
}

/// Always reports the email as free, so duplicates are only caught by `insert`.
pub struct SkipPrecheck(pub MemoryUserStore);

#[async_trait]
impl UserStore for SkipPrecheck {
    async fn list(&self) -> StoreResult<Vec<User>> {
        self.0.list().await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.0.find_by_email(email).await
    }

    async fn email_exists(&self, _email: &str) -> StoreResult<bool> {
        Ok(false)
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<()> {
        self.0.insert(user).await
    }
}

/// Every call fails as if the database were unreachable.
pub struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn email_exists(&self, _email: &str) -> StoreResult<bool> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn insert(&self, _user: &NewUser) -> StoreResult<()> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

/// Sleeps before every call, for exercising the request timeout.
pub struct SlowStore(pub std::time::Duration);

#[async_trait]
impl UserStore for SlowStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }

    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
        tokio::time::sleep(self.0).await;
        Ok(None)
    }

    async fn email_exists(&self, _email: &str) -> StoreResult<bool> {
        tokio::time::sleep(self.0).await;
        Ok(false)
    }

    async fn insert(&self, _user: &NewUser) -> StoreResult<()> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(uid: &str, email: &str) -> NewUser {
        NewUser {
            uid: uid.into(),
            full_name: "Player".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            role: "member".into(),
        }
    }

    #[tokio::test]
    async fn insert_enforces_unique_email_and_uid() {
        let store = MemoryUserStore::new();
        store.insert(&new_user("u1", "a@x.com")).await.unwrap();

        let err = store.insert(&new_user("u2", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(DuplicateKey::Email)));

        let err = store.insert(&new_user("u1", "b@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(DuplicateKey::Uid)));

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(store.email_exists("a@x.com").await.unwrap());
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }
}
