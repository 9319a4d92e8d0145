use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tokio::{sync::OnceCell, task};

/// Stand-in hash verified when no account matches, so both login failures cost one Argon2 run
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("Password task panicked")]
    Join(#[from] task::JoinError),
}

/// Hash a password with Argon2 on a blocking thread
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_string();
    task::spawn_blocking(move || hash_password_sync(&password)).await?
}

/// Check a plaintext password against a stored hash on a blocking thread
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await?
}

/// Spend the same work as a real verification and always report a mismatch
pub async fn verify_missing_account(password: &str) -> Result<bool, PasswordError> {
    let dummy = DUMMY_HASH.get_or_try_init(|| hash_password("devcamper-missing-account")).await?;
    verify_password(password, dummy).await?;
    Ok(false)
}

fn hash_password_sync(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Freshly generated reset token. Only `hashed` and `expires_at` are persisted.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub plaintext: String,
    pub hashed: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    const TOKEN_BYTES: usize = 20;

    pub fn generate(ttl: Duration) -> Self {
        let bytes: [u8; Self::TOKEN_BYTES] = rand::random();
        let plaintext = to_hex(&bytes);
        let hashed = hash_reset_token(&plaintext);
        Self {
            plaintext,
            hashed,
            expires_at: Utc::now() + ttl,
        }
    }
}

/// One-way digest used to look up reset tokens
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
