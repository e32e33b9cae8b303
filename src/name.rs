//! Naming rule shared by configs and settings

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("name pattern is a valid regex")
});

/// Returns true if `name` can be used as a config or setting name.
///
/// Names start with an ASCII letter followed by any number of ASCII letters,
/// digits and underscores. Matching is case-sensitive.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Validate a config or setting name
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if the name does not follow the naming rule.
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}
