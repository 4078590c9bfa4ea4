use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    sampling::{WIDGET_DRAWS, sample_indices},
    state::AppState,
};

pub const NO_RESULTS_MESSAGE: &str = "Sorry we couldn't find any results";

/// Optional price bounds on the category page. They arrive as raw query
/// strings; the filter only applies when both are present and numeric,
/// otherwise the whole category is shown.
#[derive(Debug, Deserialize)]
pub struct PriceBounds {
    #[serde(rename = "min_Price")]
    pub min_price: Option<String>,
    #[serde(rename = "max_Price")]
    pub max_price: Option<String>,
}

impl PriceBounds {
    pub fn range(&self) -> Option<(f64, f64)> {
        let min = self.min_price.as_deref()?.trim().parse().ok()?;
        let max = self.max_price.as_deref()?.trim().parse().ok()?;
        Some((min, max))
    }
}

pub async fn home(State(state): State<AppState>) -> AppResult<Html<String>> {
    let products = state.repo.list_all().await?;
    let most_viewed = state.repo.most_viewed().await?;
    let picks = sample_indices(WIDGET_DRAWS, products.len());
    state.views.home(&products, &most_viewed, &picks)
}

pub async fn browse_category(
    State(state): State<AppState>,
    Path((device, page)): Path<(String, String)>,
    Query(bounds): Query<PriceBounds>,
) -> AppResult<Html<String>> {
    let companies = state.repo.distinct_companies(&device).await?;
    let products = state.repo.find_by_category(&device, bounds.range()).await?;
    if products.is_empty() {
        // A valid empty state, not an error.
        return state.views.no_results(NO_RESULTS_MESSAGE);
    }
    state.views.category(&products, &device, &page, &companies)
}

pub async fn browse_category_company(
    State(state): State<AppState>,
    Path((device, company, page)): Path<(String, String, String)>,
) -> AppResult<Html<String>> {
    let products = state
        .repo
        .find_by_category_and_company(&device, &company)
        .await?;
    let companies = state.repo.distinct_companies(&device).await?;
    state
        .views
        .category_company(&products, &device, &company, &page, &companies)
}

pub async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let selected = state
        .repo
        .increment_seen(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut related = state.repo.find_by_category(&selected.cat, None).await?;
    // Draw before removal: the rail indexes the sibling list minus the
    // current product.
    let picks = sample_indices(WIDGET_DRAWS, related.len().saturating_sub(1));
    if let Some(position) = related.iter().position(|p| p.id == selected.id) {
        related.remove(position);
    }

    state.views.product_detail(&selected, &related, &picks)
}
