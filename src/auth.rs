//! Flat-file credential store.
//!
//! Users live in a CSV file with header `email,password`, created on first
//! use. Passwords are stored as bcrypt hashes. A successful login returns
//! the user's email as the bearer token.
//!
//! File access and hashing run on the blocking pool. Registration is
//! check-then-append; an async mutex serializes it within the process.
//! Writers in other processes are not coordinated.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{ServiceError, ServiceResult};

const HEADER: [&str; 2] = ["email", "password"];

/// bcrypt work factor for new hashes.
pub const HASH_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRow {
    email: String,
    password: String,
}

/// Body of a successful `POST /token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

pub struct UserStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UserStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a user. Fails with a bad request when the email is blank,
    /// the password is empty, or the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> ServiceResult<()> {
        let email = email.trim().to_string();
        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::bad_request("Email and password are required"));
        }

        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let password = password.to_string();
        let row_email = email.clone();
        let added = blocking(move || {
            if read_users(&path)?.iter().any(|u| u.email == row_email) {
                return Ok(false);
            }
            let password = hash_password(&password)?;
            append_user(&path, &UserRow { email: row_email, password })?;
            Ok(true)
        })
        .await?;

        if !added {
            return Err(ServiceError::bad_request("Email already exists"));
        }
        tracing::info!(email = %email, "Registered user");
        Ok(())
    }

    /// Verify credentials and issue the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<TokenResponse> {
        let username = username.trim().to_string();
        let path = self.path.clone();
        let password = password.to_string();
        let lookup = username.clone();
        let verified = blocking(move || {
            let users = read_users(&path)?;
            Ok(users
                .iter()
                .find(|u| u.email == lookup)
                .map(|u| verify_password(&password, &u.password))
                .unwrap_or(false))
        })
        .await?;

        if !verified {
            return Err(ServiceError::unauthorized("Invalid credentials"));
        }

        Ok(TokenResponse {
            access_token: username,
            token_type: "bearer".to_string(),
        })
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("User store task failed")?
}

fn ensure_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create users file: {}", path.display()))?;
    writer.write_record(HEADER)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), "Created users file");
    Ok(())
}

fn read_users(path: &Path) -> Result<Vec<UserRow>> {
    ensure_file(path)?;
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open users file: {}", path.display()))?;
    let mut users = Vec::new();
    for row in reader.deserialize() {
        let row: UserRow =
            row.with_context(|| format!("Malformed users file: {}", path.display()))?;
        users.push(row);
    }
    Ok(users)
}

fn append_user(path: &Path, user: &UserRow) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open users file: {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.serialize(user)?;
    writer.flush()?;
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, HASH_COST).context("Failed to hash password")
}

/// False for a wrong password and for a stored value that is not a bcrypt hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("s3cret").unwrap();
        assert!(stored.starts_with("$2"));
        assert!(verify_password("s3cret", &stored));
        assert!(!verify_password("wrong", &stored));
        assert_ne!(stored, hash_password("s3cret").unwrap(), "salt must differ per hash");
    }

    #[test]
    fn test_verify_rejects_malformed() {
        assert!(!verify_password("x", "no-separator"));
        assert!(!verify_password("x", "salt$0123abcd"));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let tmp = TempDir::new().unwrap();
        let store = UserStore::new(tmp.path().join("users.csv"));

        store.register("ana@example.com", "pw").await.unwrap();
        let token = store.login("ana@example.com", "pw").await.unwrap();
        assert_eq!(token.access_token, "ana@example.com");
        assert_eq!(token.token_type, "bearer");

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("email,password\n"));
        assert!(!content.contains(",pw\n"), "password must not be stored in clear");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = UserStore::new(tmp.path().join("users.csv"));

        store.register("ana@example.com", "pw").await.unwrap();
        let err = store.register("ana@example.com", "other").await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(ref m) if m == "Email already exists"));
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = UserStore::new(tmp.path().join("users.csv"));

        let err = store.register("  ", "pw").await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let tmp = TempDir::new().unwrap();
        let store = UserStore::new(tmp.path().join("users.csv"));
        store.register("ana@example.com", "pw").await.unwrap();

        assert!(matches!(
            store.login("ana@example.com", "nope").await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            store.login("bob@example.com", "pw").await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_file_io_yields_to_runtime() {
        let tmp = TempDir::new().unwrap();
        let store = UserStore::new(tmp.path().join("users.csv"));

        // On the single-threaded test runtime this task only runs if
        // register awaits off-thread work instead of blocking in place.
        let ticked = Arc::new(AtomicBool::new(false));
        let flag = ticked.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        store.register("ana@example.com", "pw").await.unwrap();
        assert!(ticked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_do_not_duplicate() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(UserStore::new(tmp.path().join("users.csv")));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.register("race@example.com", "pw").await.is_ok()
            }));
        }
        let mut ok = 0;
        for h in handles {
            if h.await.unwrap() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(read_users(store.path()).unwrap().len(), 1);
    }
}
