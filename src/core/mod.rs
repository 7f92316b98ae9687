// Core algorithm exports
pub mod brackets;
pub mod filters;
pub mod selector;
pub mod tokens;

pub use brackets::{resolve_age_brackets, AgeSet, AGE_BRACKETS};
pub use filters::{matches_preferences, PreferenceFilter};
pub use selector::{collect_candidates, next_after, DogSelector, SelectorError, CURSOR_START};
pub use tokens::{normalize_tokens, split_tokens, InvalidToken};
