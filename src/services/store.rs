use crate::core::PreferenceFilter;
use crate::models::{Dog, NewDog, PreferenceFields, Rating, RatingStatus, User, UserPreference};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading or writing records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

/// Persistent record store for users, dogs, ratings and preferences.
///
/// Upserts are single operations at this boundary: implementations must
/// keep at most one rating per (user, dog) and one preference per user
/// without a separate existence check.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a user, failing with `Conflict` if the username is taken
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    async fn insert_dog(&self, dog: NewDog) -> Result<Dog, StoreError>;

    async fn get_dog(&self, dog_id: i64) -> Result<Option<Dog>, StoreError>;

    /// Delete a dog and its ratings. Returns false if it did not exist.
    async fn delete_dog(&self, dog_id: i64) -> Result<bool, StoreError>;

    /// Dogs satisfying a preference filter, ordered by id
    async fn query_dogs(&self, filter: &PreferenceFilter) -> Result<Vec<Dog>, StoreError>;

    /// Dogs with the given ids, ordered by id. Unknown ids are skipped.
    async fn dogs_by_ids(&self, dog_ids: &[i64]) -> Result<Vec<Dog>, StoreError>;

    async fn ratings_for_user(&self, user_id: i64) -> Result<Vec<Rating>, StoreError>;

    async fn get_rating(&self, user_id: i64, dog_id: i64) -> Result<Option<Rating>, StoreError>;

    /// Set the status of a rating, creating it (not blacklisted) if absent
    async fn upsert_status(
        &self,
        user_id: i64,
        dog_id: i64,
        status: RatingStatus,
    ) -> Result<Rating, StoreError>;

    /// Set the blacklist flag of a rating, creating it (undecided) if absent
    async fn upsert_blacklist(
        &self,
        user_id: i64,
        dog_id: i64,
        blacklisted: bool,
    ) -> Result<Rating, StoreError>;

    async fn find_preference(&self, user_id: i64) -> Result<Option<UserPreference>, StoreError>;

    /// Return the user's preference, inserting `defaults` if none exists
    async fn get_or_create_preference(
        &self,
        user_id: i64,
        defaults: &PreferenceFields,
    ) -> Result<UserPreference, StoreError>;

    async fn upsert_preference(
        &self,
        user_id: i64,
        fields: &PreferenceFields,
    ) -> Result<UserPreference, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
