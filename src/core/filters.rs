use crate::core::brackets::{resolve_age_brackets, AgeSet};
use crate::core::tokens::split_tokens;
use crate::models::{Dog, DogSize, Gender, MicrochipPreference, PreferenceFields, UserPreference};

/// Preference predicate applied to undecided candidates.
///
/// `None` in any field means that dimension is unconstrained. An empty
/// stored token list is treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceFilter {
    pub genders: Option<Vec<Gender>>,
    pub sizes: Option<Vec<DogSize>>,
    pub ages: Option<AgeSet>,
    pub microchipped: Option<bool>,
}

impl PreferenceFilter {
    pub fn from_preference(preference: &UserPreference) -> Self {
        Self::build(
            &preference.age,
            &preference.gender,
            &preference.size,
            preference.microchipped,
        )
    }

    pub fn from_fields(fields: &PreferenceFields) -> Self {
        Self::build(&fields.age, &fields.gender, &fields.size, fields.microchipped)
    }

    fn build(age: &str, gender: &str, size: &str, microchipped: MicrochipPreference) -> Self {
        let genders: Vec<Gender> = split_tokens(gender).filter_map(Gender::from_code).collect();
        let sizes: Vec<DogSize> = split_tokens(size).filter_map(DogSize::from_code).collect();
        let ages = resolve_age_brackets(split_tokens(age));

        Self {
            genders: (!genders.is_empty()).then_some(genders),
            sizes: (!sizes.is_empty()).then_some(sizes),
            ages: (!ages.is_empty()).then_some(ages),
            microchipped: microchipped.required(),
        }
    }

    /// Gender codes for pushing the filter down into SQL
    pub fn gender_codes(&self) -> Option<Vec<String>> {
        self.genders
            .as_ref()
            .map(|genders| genders.iter().map(|g| g.code().to_string()).collect())
    }

    /// Size codes for pushing the filter down into SQL
    pub fn size_codes(&self) -> Option<Vec<String>> {
        self.sizes
            .as_ref()
            .map(|sizes| sizes.iter().map(|s| s.code().to_string()).collect())
    }
}

/// Check whether a dog satisfies a user's preferences
#[inline]
pub fn matches_preferences(dog: &Dog, filter: &PreferenceFilter) -> bool {
    if let Some(genders) = &filter.genders {
        if !genders.contains(&dog.gender) {
            return false;
        }
    }

    if let Some(sizes) = &filter.sizes {
        if !sizes.contains(&dog.size) {
            return false;
        }
    }

    if let Some(ages) = &filter.ages {
        if !ages.contains(dog.age) {
            return false;
        }
    }

    if let Some(microchipped) = filter.microchipped {
        if dog.microchipped != microchipped {
            return false;
        }
    }

    true
}
