use crate::core::{matches_preferences, PreferenceFilter};
use crate::models::{Dog, NewDog, PreferenceFields, Rating, RatingStatus, User, UserPreference};
use crate::services::store::{Store, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    dogs: BTreeMap<i64, Dog>,
    /// Keyed by (user_id, dog_id)
    ratings: BTreeMap<(i64, i64), Rating>,
    /// Keyed by user_id
    preferences: BTreeMap<i64, UserPreference>,
    last_user_id: i64,
    last_dog_id: i64,
    last_rating_id: i64,
    last_preference_id: i64,
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

impl MemoryState {
    fn require_user(&self, user_id: i64) -> Result<(), StoreError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("user {}", user_id)))
        }
    }

    fn require_dog(&self, dog_id: i64) -> Result<(), StoreError> {
        if self.dogs.contains_key(&dog_id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("dog {}", dog_id)))
        }
    }

    /// Fetch the rating for (user, dog), inserting an undecided,
    /// non-blacklisted one if absent.
    fn rating_entry(&mut self, user_id: i64, dog_id: i64) -> Result<&mut Rating, StoreError> {
        self.require_user(user_id)?;
        self.require_dog(dog_id)?;

        let last_rating_id = &mut self.last_rating_id;
        Ok(self
            .ratings
            .entry((user_id, dog_id))
            .or_insert_with(|| Rating {
                id: next_id(last_rating_id),
                user_id,
                dog_id,
                status: RatingStatus::default(),
                blacklisted: false,
            }))
    }

    fn preference_entry(
        &mut self,
        user_id: i64,
        defaults: &PreferenceFields,
    ) -> Result<&mut UserPreference, StoreError> {
        self.require_user(user_id)?;

        let last_preference_id = &mut self.last_preference_id;
        Ok(self
            .preferences
            .entry(user_id)
            .or_insert_with(|| UserPreference {
                id: next_id(last_preference_id),
                user_id,
                age: defaults.age.clone(),
                gender: defaults.gender.clone(),
                size: defaults.size.clone(),
                microchipped: defaults.microchipped,
            }))
    }
}

/// In-process store backed by ordered maps.
///
/// All mutations take the write lock, so upserts are atomic with respect to
/// each other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rating rows, for asserting upsert behaviour
    pub async fn rating_count(&self) -> usize {
        self.state.read().await.ratings.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|user| user.username == username) {
            return Err(StoreError::Conflict(format!("username {}", username)));
        }

        let user = User {
            id: next_id(&mut state.last_user_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: chrono::Utc::now(),
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|user| user.username == username).cloned())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn insert_dog(&self, dog: NewDog) -> Result<Dog, StoreError> {
        let mut state = self.state.write().await;
        let dog = dog.with_id(next_id(&mut state.last_dog_id));
        state.dogs.insert(dog.id, dog.clone());
        Ok(dog)
    }

    async fn get_dog(&self, dog_id: i64) -> Result<Option<Dog>, StoreError> {
        Ok(self.state.read().await.dogs.get(&dog_id).cloned())
    }

    async fn delete_dog(&self, dog_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let existed = state.dogs.remove(&dog_id).is_some();
        state.ratings.retain(|(_, rated_dog), _| *rated_dog != dog_id);
        Ok(existed)
    }

    async fn query_dogs(&self, filter: &PreferenceFilter) -> Result<Vec<Dog>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .dogs
            .values()
            .filter(|dog| matches_preferences(dog, filter))
            .cloned()
            .collect())
    }

    async fn dogs_by_ids(&self, dog_ids: &[i64]) -> Result<Vec<Dog>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .dogs
            .values()
            .filter(|dog| dog_ids.contains(&dog.id))
            .cloned()
            .collect())
    }

    async fn ratings_for_user(&self, user_id: i64) -> Result<Vec<Rating>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .ratings
            .values()
            .filter(|rating| rating.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_rating(&self, user_id: i64, dog_id: i64) -> Result<Option<Rating>, StoreError> {
        Ok(self.state.read().await.ratings.get(&(user_id, dog_id)).cloned())
    }

    async fn upsert_status(
        &self,
        user_id: i64,
        dog_id: i64,
        status: RatingStatus,
    ) -> Result<Rating, StoreError> {
        let mut state = self.state.write().await;
        let rating = state.rating_entry(user_id, dog_id)?;
        rating.status = status;
        Ok(rating.clone())
    }

    async fn upsert_blacklist(
        &self,
        user_id: i64,
        dog_id: i64,
        blacklisted: bool,
    ) -> Result<Rating, StoreError> {
        let mut state = self.state.write().await;
        let rating = state.rating_entry(user_id, dog_id)?;
        rating.blacklisted = blacklisted;
        Ok(rating.clone())
    }

    async fn find_preference(&self, user_id: i64) -> Result<Option<UserPreference>, StoreError> {
        Ok(self.state.read().await.preferences.get(&user_id).cloned())
    }

    async fn get_or_create_preference(
        &self,
        user_id: i64,
        defaults: &PreferenceFields,
    ) -> Result<UserPreference, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.preference_entry(user_id, defaults)?.clone())
    }

    async fn upsert_preference(
        &self,
        user_id: i64,
        fields: &PreferenceFields,
    ) -> Result<UserPreference, StoreError> {
        let mut state = self.state.write().await;
        let preference = state.preference_entry(user_id, fields)?;
        preference.age = fields.age.clone();
        preference.gender = fields.gender.clone();
        preference.size = fields.size.clone();
        preference.microchipped = fields.microchipped;
        Ok(preference.clone())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
