//! Pug or Ugh - dog selection service for the Pug or Ugh adoption app
//!
//! Users rate dogs as liked, disliked or undecided, store adoption
//! preferences, and page through the dogs in each bucket with a wrapping
//! "next" cursor.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{DogSelector, PreferenceFilter, SelectorError, CURSOR_START};
pub use error::ApiError;
pub use models::{Dog, Rating, RatingStatus, UserPreference};
pub use routes::{configure_routes, AppState};
pub use services::{AuthService, MemoryStore, PostgresClient, Store, StoreError};
