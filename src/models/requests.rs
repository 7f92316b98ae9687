use crate::core::brackets::bracket_tokens;
use crate::core::tokens::normalize_tokens;
use crate::models::domain::{DogSize, Gender, MicrochipPreference, NewDog, PreferenceFields};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

const GENDER_TOKENS: [&str; 3] = ["m", "f", "u"];
const SIZE_TOKENS: [&str; 4] = ["s", "m", "l", "xl"];
const MICROCHIP_TOKENS: [&str; 3] = ["y", "n", "e"];

fn invalid_choice(message: String) -> ValidationError {
    let mut error = ValidationError::new("invalid_choice");
    error.message = Some(Cow::Owned(message));
    error
}

fn validate_tokens(raw: &str, allowed: &[&'static str]) -> Result<(), ValidationError> {
    normalize_tokens(raw, allowed)
        .map(|_| ())
        .map_err(|e| invalid_choice(e.to_string()))
}

fn validate_single(raw: &str, allowed: &[&'static str]) -> Result<(), ValidationError> {
    let value = raw.trim();
    if allowed.iter().any(|choice| *choice == value) {
        Ok(())
    } else {
        Err(invalid_choice(format!(
            "'{}' is not a valid choice, expected one of: {}",
            raw,
            allowed.join(", ")
        )))
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("This field may not be blank."));
        Err(error)
    } else {
        Ok(())
    }
}

fn validate_age_tokens(value: &str) -> Result<(), ValidationError> {
    let brackets: Vec<&'static str> = bracket_tokens().collect();
    validate_tokens(value, &brackets)
}

fn validate_gender_tokens(value: &str) -> Result<(), ValidationError> {
    validate_tokens(value, &GENDER_TOKENS)
}

fn validate_size_tokens(value: &str) -> Result<(), ValidationError> {
    validate_tokens(value, &SIZE_TOKENS)
}

fn validate_microchip(value: &str) -> Result<(), ValidationError> {
    validate_single(value, &MICROCHIP_TOKENS)
}

fn validate_gender(value: &str) -> Result<(), ValidationError> {
    validate_single(value, &GENDER_TOKENS)
}

fn validate_size(value: &str) -> Result<(), ValidationError> {
    validate_single(value, &SIZE_TOKENS)
}

/// Request to register a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1 to 150 characters"),
        custom(function = "validate_not_blank")
    )]
    pub username: String,
    #[validate(length(min = 1, message = "Password may not be blank"))]
    pub password: String,
}

/// Request to obtain a token
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password may not be blank"))]
    pub password: String,
}

/// Request to replace a user's preferences
///
/// Multi-valued fields are comma-separated token lists; an empty list
/// places no constraint on that field.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreferencesRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_age_tokens"))]
    pub age: String,
    #[serde(default)]
    #[validate(custom(function = "validate_gender_tokens"))]
    pub gender: String,
    #[serde(default)]
    #[validate(custom(function = "validate_size_tokens"))]
    pub size: String,
    #[serde(default = "default_microchipped")]
    #[validate(custom(function = "validate_microchip"))]
    pub microchipped: String,
}

fn default_microchipped() -> String {
    MicrochipPreference::Either.code().to_string()
}

impl PreferencesRequest {
    /// Trimmed, deduplicated fields ready to store. Call after `validate`.
    pub fn normalized(&self) -> Result<PreferenceFields, crate::core::InvalidToken> {
        let brackets: Vec<&'static str> = bracket_tokens().collect();

        Ok(PreferenceFields {
            age: normalize_tokens(&self.age, &brackets)?,
            gender: normalize_tokens(&self.gender, &GENDER_TOKENS)?,
            size: normalize_tokens(&self.size, &SIZE_TOKENS)?,
            microchipped: MicrochipPreference::from_code(&self.microchipped),
        })
    }
}

/// Request to add a dog
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDogRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "Image filename must be 1 to 255 characters"))]
    pub image_filename: String,
    #[validate(length(min = 1, max = 255, message = "Breed must be 1 to 255 characters"))]
    pub breed: String,
    #[validate(range(min = 0, max = 200, message = "Age must be between 0 and 200"))]
    pub age: i32,
    #[validate(custom(function = "validate_gender"))]
    pub gender: String,
    #[validate(custom(function = "validate_size"))]
    pub size: String,
    #[serde(default)]
    pub microchipped: bool,
}

impl NewDogRequest {
    /// Convert to a domain dog. Returns `None` if the enum fields do not
    /// parse, which `validate` rules out.
    pub fn to_new_dog(&self) -> Option<NewDog> {
        Some(NewDog {
            name: self.name.trim().to_string(),
            image_filename: self.image_filename.trim().to_string(),
            breed: self.breed.trim().to_string(),
            age: self.age,
            gender: Gender::from_code(self.gender.trim())?,
            size: DogSize::from_code(self.size.trim())?,
            microchipped: self.microchipped,
        })
    }
}
