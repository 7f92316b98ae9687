use crate::models::User;
use crate::services::store::{Store, StoreError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while authenticating a request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided")]
    MissingCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token: user no longer exists")]
    UnknownUser,

    #[error("Unable to log in with provided credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Claims carried by an issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// The user a request was authenticated as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Run argon2 work on the blocking pool, off the async workers
async fn run_blocking<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
}

/// Password hashing, token issuing and token resolution.
///
/// Resolved identities are cached per user id so a burst of requests with
/// the same token does not hit the store each time. The token signature and
/// expiry are still checked on every call.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
    identities: moka::future::Cache<i64, Identity>,
}

impl AuthService {
    pub fn new(secret: &[u8], token_ttl_hours: i64, cache_size: u64, cache_ttl_secs: u64) -> Self {
        let identities = moka::future::CacheBuilder::new(cache_size)
            .time_to_live(std::time::Duration::from_secs(cache_ttl_secs))
            .build();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            token_ttl: Duration::hours(token_ttl_hours),
            identities,
        }
    }

    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims)
    }

    /// Register a new user with a hashed password
    pub async fn register(
        &self,
        store: &dyn Store,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let password = password.to_owned();
        let hash = run_blocking(move || Self::hash_password(&password)).await?;
        let user = store.create_user(username, &hash).await?;
        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and issue a token
    pub async fn login(
        &self,
        store: &dyn Store,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let user = store
            .find_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = password.to_owned();
        let hash = user.password_hash.clone();
        if !run_blocking(move || Self::verify_password(&password, &hash)).await? {
            tracing::info!("Rejected login for {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_token(&user)
    }

    /// Resolve a token to the user it was issued for
    pub async fn authenticate(&self, store: &dyn Store, token: &str) -> Result<Identity, AuthError> {
        let claims = self.decode_token(token)?;
        let user_id: i64 = claims.sub.parse().map_err(|_| AuthError::UnknownUser)?;

        if let Some(identity) = self.identities.get(&user_id).await {
            return Ok(identity);
        }

        let user = store.get_user(user_id).await?.ok_or(AuthError::UnknownUser)?;
        let identity = Identity {
            user_id: user.id,
            username: user.username,
        };
        self.identities.insert(user_id, identity.clone()).await;

        Ok(identity)
    }
}
