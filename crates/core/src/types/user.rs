//! Client-supplied user identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`UserId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UserIdError {
    /// The input is empty or only whitespace.
    #[error("user id cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("user id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains control characters.
    #[error("user id cannot contain control characters")]
    ControlCharacter,
}

/// An opaque user identifier sent by clients in the `X-User-ID` header.
///
/// The service has no account system of its own; this string is the key for
/// helpful votes, wishlists, and notifications.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Length: 1-128 characters after trimming
/// - No control characters
///
/// ## Examples
///
/// ```
/// use product_review_core::UserId;
///
/// assert_eq!(UserId::parse("  u1 ").map(|u| u.into_inner()), Ok("u1".to_string()));
/// assert!(UserId::parse("").is_err());
/// assert!(UserId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Maximum length of a user id.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `UserId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 128
    /// characters, or contains control characters.
    pub fn parse(s: &str) -> Result<Self, UserIdError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(UserIdError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(UserIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(UserIdError::ControlCharacter);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the user id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `UserId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = UserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let user = UserId::parse("\tshopper-42 ").expect("valid");
        assert_eq!(user.as_str(), "shopper-42");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(UserId::parse(""), Err(UserIdError::Empty));
        assert_eq!(UserId::parse("  "), Err(UserIdError::Empty));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = "u".repeat(UserId::MAX_LENGTH + 1);
        assert_eq!(
            UserId::parse(&long),
            Err(UserIdError::TooLong {
                max: UserId::MAX_LENGTH
            })
        );
        assert!(UserId::parse(&"u".repeat(UserId::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_parse_rejects_control_characters() {
        assert_eq!(UserId::parse("a\u{0}b"), Err(UserIdError::ControlCharacter));
    }
}
