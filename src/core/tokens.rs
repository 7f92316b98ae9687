use thiserror::Error;

/// A preference token outside its allowed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{token}' is not a valid choice, expected one of: {}", .allowed.join(", "))]
pub struct InvalidToken {
    pub token: String,
    pub allowed: Vec<&'static str>,
}

/// Split a comma-separated token list, trimming whitespace and dropping
/// empty entries.
pub fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|token| !token.is_empty())
}

/// Normalize a comma-separated token list against its allowed values.
///
/// Tokens are trimmed and deduplicated, keeping first-seen order, then
/// rejoined with commas. The first token outside `allowed` is reported.
pub fn normalize_tokens(raw: &str, allowed: &[&'static str]) -> Result<String, InvalidToken> {
    let mut seen: Vec<&str> = Vec::new();

    for token in split_tokens(raw) {
        if !allowed.iter().any(|choice| *choice == token) {
            return Err(InvalidToken {
                token: token.to_string(),
                allowed: allowed.to_vec(),
            });
        }
        if !seen.contains(&token) {
            seen.push(token);
        }
    }

    Ok(seen.join(","))
}
