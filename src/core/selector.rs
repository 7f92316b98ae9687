use crate::core::filters::{matches_preferences, PreferenceFilter};
use crate::models::{Dog, Rating, RatingStatus};
use crate::services::{Store, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Cursor value meaning "start from the beginning"
pub const CURSOR_START: i64 = -1;

/// Errors that can occur while selecting the next dog
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("No {0} dogs found")]
    NotFound(RatingStatus),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Build the candidate set for a bucket, sorted ascending by id.
///
/// - liked / disliked: dogs the user rated with that status and has not
///   blacklisted
/// - undecided: dogs matching the preference filter that are either
///   unrated, or rated undecided and not blacklisted
///
/// `dogs` may contain dogs outside the bucket; they are dropped here.
pub fn collect_candidates(
    bucket: RatingStatus,
    dogs: Vec<Dog>,
    ratings: &[Rating],
    filter: &PreferenceFilter,
) -> Vec<Dog> {
    let by_dog: HashMap<i64, &Rating> = ratings.iter().map(|r| (r.dog_id, r)).collect();

    let mut candidates: Vec<Dog> = dogs
        .into_iter()
        .filter(|dog| match by_dog.get(&dog.id) {
            Some(rating) => {
                !rating.blacklisted
                    && rating.status == bucket
                    && (bucket != RatingStatus::Undecided || matches_preferences(dog, filter))
            }
            None => bucket == RatingStatus::Undecided && matches_preferences(dog, filter),
        })
        .collect();

    candidates.sort_by_key(|dog| dog.id);
    candidates.dedup_by_key(|dog| dog.id);
    candidates
}

/// First candidate with an id greater than `cursor`, wrapping around to the
/// smallest id. `candidates` must be sorted ascending by id.
#[inline]
pub fn next_after(candidates: &[Dog], cursor: i64) -> Option<&Dog> {
    candidates
        .iter()
        .find(|dog| dog.id > cursor)
        .or_else(|| candidates.first())
}

/// Pages through the dogs in a user's rating bucket.
///
/// Read-only: a user without stored preferences is matched against the
/// default (open) preferences without persisting them.
#[derive(Clone)]
pub struct DogSelector {
    store: Arc<dyn Store>,
}

impl DogSelector {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Next dog in `bucket` after `cursor`, wrapping around.
    ///
    /// Fails with `NotFound` when the bucket is empty.
    pub async fn next_dog(
        &self,
        user_id: i64,
        bucket: RatingStatus,
        cursor: i64,
    ) -> Result<Dog, SelectorError> {
        let ratings = self.store.ratings_for_user(user_id).await?;

        let (dogs, filter) = match bucket {
            RatingStatus::Undecided => {
                let filter = match self.store.find_preference(user_id).await? {
                    Some(preference) => PreferenceFilter::from_preference(&preference),
                    None => PreferenceFilter::from_fields(&Default::default()),
                };
                (self.store.query_dogs(&filter).await?, filter)
            }
            RatingStatus::Liked | RatingStatus::Disliked => {
                let dog_ids: Vec<i64> = ratings
                    .iter()
                    .filter(|r| r.status == bucket && !r.blacklisted)
                    .map(|r| r.dog_id)
                    .collect();
                (self.store.dogs_by_ids(&dog_ids).await?, PreferenceFilter::default())
            }
        };

        let candidates = collect_candidates(bucket, dogs, &ratings, &filter);

        tracing::debug!(
            "User {} has {} {} candidates (cursor {})",
            user_id,
            candidates.len(),
            bucket,
            cursor
        );

        next_after(&candidates, cursor)
            .cloned()
            .ok_or(SelectorError::NotFound(bucket))
    }
}
