use crate::models::domain::{MicrochipPreference, Rating, UserPreference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response for user registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
}

/// Response for login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Stored preferences as served to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub id: i64,
    pub age: String,
    pub gender: String,
    pub size: String,
    pub microchipped: MicrochipPreference,
}

impl From<UserPreference> for PreferenceResponse {
    fn from(preference: UserPreference) -> Self {
        Self {
            id: preference.id,
            age: preference.age,
            gender: preference.gender,
            size: preference.size,
            microchipped: preference.microchipped,
        }
    }
}

/// Rating link as served after a status or blacklist change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingResponse {
    pub id: i64,
    pub user_id: i64,
    pub dog_id: i64,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            user_id: rating.user_id,
            dog_id: rating.dog_id,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    /// Per-field messages for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}
