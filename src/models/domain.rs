use serde::{Deserialize, Serialize};
use std::fmt;

/// Dog gender as stored and served (`m`, `f`, `u`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
    #[serde(rename = "u")]
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unknown];

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
            Gender::Unknown => "u",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.code() == code)
    }
}

/// Dog size as stored and served (`s`, `m`, `l`, `xl`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DogSize {
    #[serde(rename = "s")]
    Small,
    #[serde(rename = "m")]
    Medium,
    #[serde(rename = "l")]
    Large,
    #[serde(rename = "xl")]
    ExtraLarge,
}

impl DogSize {
    pub const ALL: [DogSize; 4] = [
        DogSize::Small,
        DogSize::Medium,
        DogSize::Large,
        DogSize::ExtraLarge,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            DogSize::Small => "s",
            DogSize::Medium => "m",
            DogSize::Large => "l",
            DogSize::ExtraLarge => "xl",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

/// A dog available for adoption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: i64,
    pub name: String,
    pub image_filename: String,
    pub breed: String,
    /// Age in months
    pub age: i32,
    pub gender: Gender,
    pub size: DogSize,
    pub microchipped: bool,
}

impl fmt::Display for Dog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} ({})", self.id, self.name, self.gender.code())
    }
}

/// A dog that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewDog {
    pub name: String,
    pub image_filename: String,
    pub breed: String,
    pub age: i32,
    pub gender: Gender,
    pub size: DogSize,
    pub microchipped: bool,
}

impl NewDog {
    pub fn with_id(self, id: i64) -> Dog {
        Dog {
            id,
            name: self.name,
            image_filename: self.image_filename,
            breed: self.breed,
            age: self.age,
            gender: self.gender,
            size: self.size,
            microchipped: self.microchipped,
        }
    }
}

/// Rating bucket a user has placed a dog in.
///
/// Serialized by name (`liked`, `disliked`, `undecided`) on the wire and
/// stored as a single character code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingStatus {
    Liked,
    Disliked,
    #[default]
    Undecided,
}

impl RatingStatus {
    pub fn code(&self) -> &'static str {
        match self {
            RatingStatus::Liked => "l",
            RatingStatus::Disliked => "d",
            RatingStatus::Undecided => "u",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "l" => Some(RatingStatus::Liked),
            "d" => Some(RatingStatus::Disliked),
            "u" => Some(RatingStatus::Undecided),
            _ => None,
        }
    }
}

impl fmt::Display for RatingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RatingStatus::Liked => "liked",
            RatingStatus::Disliked => "disliked",
            RatingStatus::Undecided => "undecided",
        };
        f.write_str(name)
    }
}

/// A user's rating of a single dog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub dog_id: i64,
    pub status: RatingStatus,
    pub blacklisted: bool,
}

/// Microchip preference (`y`, `n`, `e` for either)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MicrochipPreference {
    #[serde(rename = "y")]
    Yes,
    #[serde(rename = "n")]
    No,
    #[serde(rename = "e")]
    Either,
}

impl MicrochipPreference {
    pub fn code(&self) -> &'static str {
        match self {
            MicrochipPreference::Yes => "y",
            MicrochipPreference::No => "n",
            MicrochipPreference::Either => "e",
        }
    }

    /// Anything other than `y` or `n` means no preference.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "y" => MicrochipPreference::Yes,
            "n" => MicrochipPreference::No,
            _ => MicrochipPreference::Either,
        }
    }

    /// The microchip value a dog must have, if any
    pub fn required(&self) -> Option<bool> {
        match self {
            MicrochipPreference::Yes => Some(true),
            MicrochipPreference::No => Some(false),
            MicrochipPreference::Either => None,
        }
    }
}

/// Normalized preference fields, as written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceFields {
    pub age: String,
    pub gender: String,
    pub size: String,
    pub microchipped: MicrochipPreference,
}

impl Default for PreferenceFields {
    /// Preferences created on first access admit every dog.
    fn default() -> Self {
        Self {
            age: "b,y,a,s".to_string(),
            gender: "m,f,u".to_string(),
            size: "s,m,l,xl".to_string(),
            microchipped: MicrochipPreference::Either,
        }
    }
}

/// A user's stored adoption preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreference {
    pub id: i64,
    pub user_id: i64,
    pub age: String,
    pub gender: String,
    pub size: String,
    pub microchipped: MicrochipPreference,
}

/// A registered user
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
