//! Review listing, posting, and helpful-vote handlers.

use axum::{Json, extract::State};
use serde::Deserialize;

use product_review_core::{
    Page, PageRequest, ProductId, Rating, ReviewId, ReviewInput, ReviewSortField, SortSpec,
    ValidationError,
};

use crate::error::Result;
use crate::middleware::{OptionalUser, RequireUser};
use crate::models::Review;
use crate::services::CatalogService;
use crate::state::AppState;

use super::extract::{ApiJson, ApiPath, ApiQuery};

/// Query parameters for a product's reviews.
#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub rating: Option<i64>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

fn catalog(state: &AppState) -> CatalogService<'_> {
    CatalogService::new(state.store(), state.assistant())
}

/// `GET /api/products/{id}/reviews`
pub async fn index(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> Result<Json<Page<Review>>> {
    let rating = query
        .rating
        .map(Rating::new)
        .transpose()
        .map_err(ValidationError::from)?;
    let page = PageRequest::from_query(query.page, query.size)?;
    let sort = SortSpec::<ReviewSortField>::parse(query.sort.as_deref())?;

    let reviews = catalog(&state).list_reviews(id, rating, page, sort).await?;
    Ok(Json(reviews))
}

/// `POST /api/products/{id}/reviews`
pub async fn create(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> Result<Json<Review>> {
    Ok(Json(catalog(&state).add_review(id, &input).await?))
}

/// `PUT /api/products/reviews/{id}/helpful`
pub async fn toggle_helpful(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    ApiPath(id): ApiPath<ReviewId>,
) -> Result<Json<Review>> {
    let review = catalog(&state).toggle_helpful(id, user.as_ref()).await?;
    Ok(Json(review))
}

/// `GET /api/products/reviews/voted`
pub async fn voted(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<ReviewId>>> {
    Ok(Json(catalog(&state).voted_review_ids(&user).await?))
}
