//! Product listing, stats, detail, and Q&A handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use product_review_core::{
    CatalogFilter, CatalogStats, Page, PageRequest, ProductId, ProductSortField, SortSpec,
};

use crate::error::Result;
use crate::models::{Product, ProductDetail};
use crate::services::CatalogService;
use crate::state::AppState;

use super::extract::{ApiJson, ApiPath, ApiQuery};

/// Query parameters for the product list.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

/// Query parameters for catalog stats.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Body of a product question.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
}

/// Answer to a product question.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

fn catalog(state: &AppState) -> CatalogService<'_> {
    CatalogService::new(state.store(), state.assistant())
}

/// `GET /api/products`
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Page<Product>>> {
    let filter = CatalogFilter::new(query.category.as_deref(), query.search.as_deref());
    let page = PageRequest::from_query(query.page, query.size)?;
    let sort = SortSpec::<ProductSortField>::parse(query.sort.as_deref())?;

    let products = catalog(&state).list_products(&filter, page, sort).await?;
    Ok(Json(products))
}

/// `GET /api/products/stats`
pub async fn stats(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> Result<Json<CatalogStats>> {
    let filter = CatalogFilter::new(query.category.as_deref(), query.search.as_deref());
    Ok(Json(catalog(&state).global_stats(&filter).await?))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductDetail>> {
    Ok(Json(catalog(&state).product_detail(id).await?))
}

/// `POST /api/products/{id}/chat`
pub async fn chat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let answer = catalog(&state).chat(id, &request.question).await?;
    Ok(Json(ChatResponse { answer }))
}
