//! Input validation for client-submitted content.

use serde::Deserialize;

use crate::types::{ProductId, Rating, RatingError};

/// Validation failures reported back to clients as `400 Bad Request`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is missing or blank.
    #[error("{field} is required")]
    Blank {
        /// Field name as sent by the client.
        field: &'static str,
    },
    /// A text field is shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Field name as sent by the client.
        field: &'static str,
        /// Minimum length.
        min: usize,
    },
    /// A text field is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name as sent by the client.
        field: &'static str,
        /// Maximum length.
        max: usize,
    },
    /// Rating outside `1..=5`.
    #[error(transparent)]
    Rating(#[from] RatingError),
    /// Sort field outside the whitelist.
    #[error("cannot sort by '{0}'")]
    InvalidSort(String),
    /// Negative page index.
    #[error("page must be zero or greater (got {0})")]
    InvalidPage(i64),
}

/// Check a trimmed text field against length bounds.
fn bounded_text(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(ValidationError::Blank { field });
    }
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Raw review body as posted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    /// Display name of the reviewer.
    #[serde(default)]
    pub reviewer_name: String,
    /// Review text.
    #[serde(default)]
    pub comment: String,
    /// Star rating; range-checked by [`ReviewDraft::parse`].
    pub rating: i64,
}

/// A review that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Product being reviewed.
    pub product_id: ProductId,
    /// Trimmed reviewer name.
    pub reviewer_name: String,
    /// Trimmed comment.
    pub comment: String,
    /// Star rating.
    pub rating: Rating,
}

impl ReviewDraft {
    /// Shortest accepted reviewer name.
    pub const NAME_MIN: usize = 2;
    /// Longest accepted reviewer name.
    pub const NAME_MAX: usize = 100;
    /// Shortest accepted comment.
    pub const COMMENT_MIN: usize = 10;
    /// Longest accepted comment.
    pub const COMMENT_MAX: usize = 2000;

    /// Validate a posted review.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn parse(product_id: ProductId, input: &ReviewInput) -> Result<Self, ValidationError> {
        let reviewer_name = bounded_text(
            "reviewerName",
            &input.reviewer_name,
            Self::NAME_MIN,
            Self::NAME_MAX,
        )?;
        let comment = bounded_text(
            "comment",
            &input.comment,
            Self::COMMENT_MIN,
            Self::COMMENT_MAX,
        )?;
        let rating = Rating::new(input.rating)?;
        Ok(Self {
            product_id,
            reviewer_name,
            comment,
            rating,
        })
    }
}

/// Raw notification body as posted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    /// Short headline.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub message: String,
    /// Related product, if any.
    pub product_id: Option<ProductId>,
}

/// A notification that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    /// Trimmed title.
    pub title: String,
    /// Trimmed message.
    pub message: String,
    /// Related product. Not required to exist.
    pub product_id: Option<ProductId>,
}

impl NotificationDraft {
    /// Longest accepted title.
    pub const TITLE_MAX: usize = 200;
    /// Longest accepted message.
    pub const MESSAGE_MAX: usize = 2000;

    /// Validate a posted notification.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn parse(input: &NotificationInput) -> Result<Self, ValidationError> {
        Ok(Self {
            title: bounded_text("title", &input.title, 1, Self::TITLE_MAX)?,
            message: bounded_text("message", &input.message, 1, Self::MESSAGE_MAX)?,
            product_id: input.product_id,
        })
    }
}

/// Longest accepted chat question.
pub const CHAT_QUESTION_MAX: usize = 1000;

/// Validate a chat question, returning it trimmed.
///
/// # Errors
///
/// Returns `Blank` for an empty question and `TooLong` past 1000 characters.
pub fn chat_question(raw: &str) -> Result<String, ValidationError> {
    bounded_text("question", raw, 1, CHAT_QUESTION_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(name: &str, comment: &str, rating: i64) -> ReviewInput {
        ReviewInput {
            reviewer_name: name.to_string(),
            comment: comment.to_string(),
            rating,
        }
    }

    #[test]
    fn test_valid_review_is_trimmed() {
        let draft = ReviewDraft::parse(
            ProductId::new(1),
            &review("  Sarah ", " Worth every penny. ", 5),
        )
        .expect("valid");
        assert_eq!(draft.reviewer_name, "Sarah");
        assert_eq!(draft.comment, "Worth every penny.");
        assert_eq!(draft.rating.get(), 5);
    }

    #[test]
    fn test_review_name_too_short() {
        let err = ReviewDraft::parse(ProductId::new(1), &review("J", "Great product overall", 4))
            .expect_err("short name");
        assert_eq!(
            err,
            ValidationError::TooShort {
                field: "reviewerName",
                min: 2
            }
        );
    }

    #[test]
    fn test_review_comment_bounds() {
        let short = ReviewDraft::parse(ProductId::new(1), &review("Emma", "meh", 2));
        assert!(matches!(
            short,
            Err(ValidationError::TooShort {
                field: "comment",
                ..
            })
        ));

        let long = "x".repeat(ReviewDraft::COMMENT_MAX + 1);
        let too_long = ReviewDraft::parse(ProductId::new(1), &review("Emma", &long, 2));
        assert!(matches!(
            too_long,
            Err(ValidationError::TooLong {
                field: "comment",
                ..
            })
        ));
    }

    #[test]
    fn test_review_blank_name() {
        let err = ReviewDraft::parse(ProductId::new(1), &review("   ", "Fast delivery and good quality.", 4))
            .expect_err("blank");
        assert_eq!(err, ValidationError::Blank { field: "reviewerName" });
    }

    #[test]
    fn test_review_rating_out_of_range() {
        let err = ReviewDraft::parse(ProductId::new(1), &review("David", "Screen is beautiful.", 0))
            .expect_err("rating");
        assert_eq!(err.to_string(), "rating must be between 1 and 5 (got 0)");
    }

    #[test]
    fn test_review_input_accepts_camel_case() {
        let input: ReviewInput = serde_json::from_str(
            r#"{"reviewerName":"Olivia","comment":"I love the design.","rating":4}"#,
        )
        .expect("deserialize");
        assert_eq!(input.reviewer_name, "Olivia");
        assert_eq!(input.rating, 4);
    }

    #[test]
    fn test_notification_bounds() {
        let ok = NotificationDraft::parse(&NotificationInput {
            title: "Price drop".to_string(),
            message: "An item on your wishlist is cheaper".to_string(),
            product_id: Some(ProductId::new(3)),
        })
        .expect("valid");
        assert_eq!(ok.product_id, Some(ProductId::new(3)));

        let blank = NotificationDraft::parse(&NotificationInput {
            title: " ".to_string(),
            message: "body".to_string(),
            product_id: None,
        });
        assert_eq!(blank, Err(ValidationError::Blank { field: "title" }));
    }

    #[test]
    fn test_chat_question() {
        assert_eq!(chat_question("  Is it waterproof? "), Ok("Is it waterproof?".to_string()));
        assert_eq!(chat_question("   "), Err(ValidationError::Blank { field: "question" }));
        assert!(matches!(
            chat_question(&"q".repeat(CHAT_QUESTION_MAX + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }
}
