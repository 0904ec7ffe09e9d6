//! `X-User-ID` extractors.
//!
//! The service trusts the header as an opaque caller identity. A blank header
//! counts as absent.

use axum::{extract::FromRequestParts, http::request::Parts};

use product_review_core::UserId;

use crate::error::{AppError, set_sentry_user};

/// Header carrying the caller's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

fn header_user(parts: &Parts) -> Result<Option<UserId>, AppError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::BadRequest("X-User-ID must be visible ASCII".to_string()))?;
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let user = UserId::parse(raw)?;
    set_sentry_user(&user);
    Ok(Some(user))
}

/// Extractor that requires an `X-User-ID` header.
///
/// Rejects with `400 Bad Request` when the header is missing or blank.
pub struct RequireUser(pub UserId);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_user(parts)?
            .map(Self)
            .ok_or_else(|| AppError::BadRequest("X-User-ID header is required".to_string()))
    }
}

/// Extractor for an optional `X-User-ID` header.
///
/// Missing or blank headers yield `None`; malformed ones are still rejected.
pub struct OptionalUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_user(parts).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(user: Option<&str>) -> Parts {
        let mut builder = Request::builder();
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        builder.body(()).expect("request").into_parts().0
    }

    #[tokio::test]
    async fn test_require_user_reads_header() {
        let RequireUser(user) = RequireUser::from_request_parts(&mut parts(Some(" u1 ")), &())
            .await
            .ok()
            .expect("user");
        assert_eq!(user.as_str(), "u1");
    }

    #[tokio::test]
    async fn test_require_user_rejects_missing_and_blank() {
        for header in [None, Some("   ")] {
            let result = RequireUser::from_request_parts(&mut parts(header), &()).await;
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[tokio::test]
    async fn test_optional_user_treats_blank_as_anonymous() {
        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts(Some("")), &())
            .await
            .ok()
            .expect("extract");
        assert!(user.is_none());

        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts(None), &())
            .await
            .ok()
            .expect("extract");
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_optional_user_rejects_oversized_id() {
        let long = "u".repeat(UserId::MAX_LENGTH + 1);
        let result = OptionalUser::from_request_parts(&mut parts(Some(&long)), &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
