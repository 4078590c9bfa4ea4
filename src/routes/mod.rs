use axum::{Router, routing::get};

use crate::state::AppState;

pub mod catalog;
pub mod products;

// Build the page router without binding state; it is provided at the top level.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/home", get(catalog::home))
        .route("/category/{device}/{page}", get(catalog::browse_category))
        .route(
            "/category/{device}/{company}/{page}",
            get(catalog::browse_category_company),
        )
        .route("/product/{id}", get(catalog::product_detail))
        .route(
            "/db/create",
            get(products::create_form).post(products::create_product),
        )
        .route("/db/search", get(products::search))
        .route("/db/list", get(products::list_products))
        .route(
            "/db/update/{id}",
            get(products::update_form)
                .put(products::update_product)
                // Plain HTML forms cannot issue PUT; accept POST as well.
                .post(products::update_product),
        )
        .route("/db/delete/{id}", get(products::delete_product))
}
