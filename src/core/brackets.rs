use std::ops::RangeInclusive;

/// Age bracket tokens and the inclusive age range (in months) each covers.
///
/// Adjacent brackets never share a boundary value.
pub static AGE_BRACKETS: [(&str, RangeInclusive<i32>); 4] = [
    ("b", 0..=10),
    ("y", 11..=20),
    ("a", 21..=89),
    ("s", 90..=200),
];

/// Valid bracket tokens, in table order
pub fn bracket_tokens() -> impl Iterator<Item = &'static str> {
    AGE_BRACKETS.iter().map(|(token, _)| *token)
}

/// Union of the age ranges selected by a set of bracket tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeSet {
    ranges: Vec<RangeInclusive<i32>>,
}

impl AgeSet {
    #[inline]
    pub fn contains(&self, age: i32) -> bool {
        self.ranges.iter().any(|range| range.contains(&age))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[RangeInclusive<i32>] {
        &self.ranges
    }

    /// Lower and upper bounds as parallel vectors, for pushing into SQL
    pub fn bounds(&self) -> (Vec<i32>, Vec<i32>) {
        self.ranges.iter().map(|r| (*r.start(), *r.end())).unzip()
    }
}

/// Resolve bracket tokens to the ages they cover.
///
/// Tokens are trimmed and duplicates collapse. Unknown tokens contribute
/// nothing, and an empty input resolves to an empty set.
pub fn resolve_age_brackets<'a, I>(tokens: I) -> AgeSet
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted: Vec<&str> = tokens.into_iter().map(str::trim).collect();

    let ranges = AGE_BRACKETS
        .iter()
        .filter(|(token, _)| wanted.contains(token))
        .map(|(_, range)| range.clone())
        .collect();

    AgeSet { ranges }
}
