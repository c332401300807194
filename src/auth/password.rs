use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::HashConfig;

/// Verified against when the email is unknown, so both login failures cost a hash.
const DUMMY_PASSWORD: &str = "gameshop-dummy-password";

/// Argon2id hasher with a fixed work factor. Legacy bcrypt hashes
/// (`$2a$`, `$2b$`, `$2y$`) still verify.
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
    dummy_hash: String,
    #[cfg(test)]
    verifications: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl Passwords {
    pub fn new(cfg: HashConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow!("invalid argon2 params: {e}"))?;
        let mut passwords = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: String::new(),
            #[cfg(test)]
            verifications: Default::default(),
        };
        passwords.dummy_hash = passwords.hash(DUMMY_PASSWORD)?;
        Ok(passwords)
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch; `Err` only if the stored hash is unreadable.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        #[cfg(test)]
        self.verifications
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if is_bcrypt(hash) {
            return bcrypt::verify(plain, hash).map_err(|e| {
                error!(error = %e, "bcrypt verify error");
                anyhow!(e.to_string())
            });
        }

        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// Same work as a real `verify`, always `false`.
    pub fn verify_dummy(&self, plain: &str) -> bool {
        // a user whose password is the dummy still must not match
        let _ = self.verify(plain, &self.dummy_hash);
        false
    }

    #[cfg(test)]
    pub fn verifications(&self) -> usize {
        self.verifications.load(std::sync::atomic::Ordering::SeqCst)
    }
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|p| hash.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Passwords {
        Passwords::new(HashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("params are valid")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let passwords = cheap();
        let hash = passwords.hash("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords
            .verify("Secur3P@ssw0rd!", &hash)
            .expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let passwords = cheap();
        let hash = passwords.hash("correct-horse-battery-staple").unwrap();
        assert!(!passwords
            .verify("wrong-password", &hash)
            .expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let passwords = cheap();
        let a = passwords.hash("secret").unwrap();
        let b = passwords.hash("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = cheap().verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn legacy_bcrypt_hashes_verify() {
        let passwords = cheap();
        let legacy = bcrypt::hash("secret", 4).unwrap();
        assert!(passwords.verify("secret", &legacy).unwrap());
        assert!(!passwords.verify("nope", &legacy).unwrap());

        let go_style = legacy.replacen("$2b$", "$2a$", 1);
        assert!(passwords.verify("secret", &go_style).unwrap());
    }

    #[test]
    fn dummy_verify_never_matches_but_still_hashes() {
        let passwords = cheap();
        let before = passwords.verifications();
        assert!(!passwords.verify_dummy(DUMMY_PASSWORD));
        assert!(!passwords.verify_dummy("anything"));
        assert_eq!(passwords.verifications(), before + 2);
    }

    #[test]
    fn hashes_made_with_other_params_still_verify() {
        let hash = Passwords::new(HashConfig {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap()
        .hash("secret")
        .unwrap();
        assert!(cheap().verify("secret", &hash).unwrap());
    }

    #[test]
    fn rejects_impossible_params() {
        assert!(Passwords::new(HashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .is_err());
    }
}
