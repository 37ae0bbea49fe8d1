//! Errors for building values from text or JSON.

use thiserror::Error;

/// Errors that occur when converting external data into a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Text is neither a single letter nor a decimal integer.
    #[error("invalid value '{0}'")]
    Invalid(String),

    /// A character value must be a single ASCII letter.
    #[error("invalid letter '{0}' (expected A-Z)")]
    NotALetter(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid() {
        assert_eq!(
            ValueError::Invalid("1.5".to_string()).to_string(),
            "invalid value '1.5'"
        );
    }

    #[test]
    fn display_not_a_letter() {
        assert_eq!(
            ValueError::NotALetter('?').to_string(),
            "invalid letter '?' (expected A-Z)"
        );
    }
}
