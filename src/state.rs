use crate::auth::password::Passwords;
use crate::config::AppConfig;
use crate::db;
use crate::users::repo::{MySqlUserStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub passwords: Arc<Passwords>,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        let users = Arc::new(MySqlUserStore::new(pool)) as Arc<dyn UserStore>;
        let passwords = Arc::new(Passwords::new(config.hash)?);
        Ok(Self::from_parts(users, passwords))
    }

    pub fn from_parts(users: Arc<dyn UserStore>, passwords: Arc<Passwords>) -> Self {
        Self { users, passwords }
    }

    /// In-memory store and a cheap work factor.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::with_store(Arc::new(crate::users::memory::MemoryUserStore::new()))
    }

    #[cfg(test)]
    pub fn with_store(users: Arc<dyn UserStore>) -> Self {
        let passwords = Passwords::new(crate::config::HashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("cheap argon2 params are valid");
        Self::from_parts(users, Arc::new(passwords))
    }
}
