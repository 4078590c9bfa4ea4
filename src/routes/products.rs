use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::ProductForm,
    routes::catalog::NO_RESULTS_MESSAGE,
    state::AppState,
    upload,
};

pub async fn create_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.views.create_form()
}

pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let (form, image) = upload::read_product_submission(multipart, &state.upload_dir).await?;
    state.repo.create(form, image).await?;
    Ok(Redirect::to("/db/create"))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let keyword = query.q.unwrap_or_default();
    if keyword.trim().is_empty() {
        return state.views.no_results(NO_RESULTS_MESSAGE);
    }
    let results = state.repo.text_search(&keyword).await?;
    if results.is_empty() {
        return state.views.no_results(NO_RESULTS_MESSAGE);
    }
    state.views.results(&results)
}

pub async fn list_products(State(state): State<AppState>) -> AppResult<Html<String>> {
    let products = state.repo.list_all().await?;
    state.views.list(&products)
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let product = state
        .repo
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;
    state.views.update_form(&product)
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> AppResult<Redirect> {
    // An unknown id is a no-op here; the redirect happens either way.
    state.repo.update(&id, form).await?;
    Ok(Redirect::to("/db/list"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    state.repo.delete(&id).await?;
    Ok(Redirect::to("/db/list"))
}
