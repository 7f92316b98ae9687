// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Dog, DogSize, Gender, MicrochipPreference, NewDog, PreferenceFields, Rating, RatingStatus,
    User, UserPreference,
};
pub use requests::{LoginRequest, NewDogRequest, PreferencesRequest, RegisterRequest};
pub use responses::{
    ErrorResponse, HealthResponse, LoginResponse, PreferenceResponse, RatingResponse,
    RegisterResponse,
};
