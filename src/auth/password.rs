// src/auth/password.rs
//! Argon2id password hashes in PHC string format.
//!
//! Hashing is deliberately slow, so both operations run on tokio's blocking pool.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

fn hash_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .context("Password hashing task failed")?
}

/// `Ok(false)` on mismatch, `Err` only when the stored hash is malformed.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
        .await
        .context("Password verification task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("Sicher123").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Sicher123", &hash).await.unwrap());
        assert!(!verify_password("sicher123", &hash).await.unwrap());
        assert_ne!(hash, hash_password("Sicher123").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash() {
        assert!(verify_password("Sicher123", "not-a-hash").await.is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_the_executor_free() {
        let ticked = Arc::new(AtomicBool::new(false));
        let flag = ticked.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        // On a single-threaded runtime the spawned task only runs if hashing yields.
        let hash = hash_password("Sicher123").await.unwrap();
        assert!(ticked.load(Ordering::SeqCst));
        assert!(verify_password("Sicher123", &hash).await.unwrap());
    }
}
