use std::sync::{Arc, LazyLock};

use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::error::AppResult;
use crate::models::Product;

const HOME: &str = include_str!("../templates/home.hbs");
const CAT_PRODUCTS: &str = include_str!("../templates/cat_products.hbs");
const CAT_PRODUCTS_CO: &str = include_str!("../templates/cat_products_co.hbs");
const PRODUCT: &str = include_str!("../templates/product.hbs");
const CREATE: &str = include_str!("../templates/create.hbs");
const UPDATE: &str = include_str!("../templates/update.hbs");
const LIST: &str = include_str!("../templates/list.hbs");
const RESULTS: &str = include_str!("../templates/results.hbs");
const NO_RESULTS: &str = include_str!("../templates/no_results.hbs");

/// Registry used by the error responder, which has no access to request
/// state. Registration of an embedded template only fails on a template
/// syntax error, which the view tests catch.
static FALLBACK: LazyLock<Handlebars<'static>> = LazyLock::new(|| {
    let mut registry = Handlebars::new();
    registry
        .register_template_string("no_results", NO_RESULTS)
        .expect("embedded no_results template is valid");
    registry
});

/// Render the shared "no results" page, used both for valid empty states
/// and as the error/fallback body.
pub fn render_fallback(message: &str) -> String {
    FALLBACK
        .render("no_results", &json!({ "message": message }))
        .unwrap_or_else(|_| format!("<!doctype html><html><body><p>{message}</p></body></html>"))
}

/// Template-friendly projection of a product; ids become hex strings so
/// templates can build links.
#[derive(Debug, Serialize)]
struct ProductView {
    id: String,
    product: String,
    price: f64,
    co: String,
    qty: i64,
    desc: String,
    cat: String,
    country: String,
    is_discount: bool,
    discount: f64,
    image: String,
    seen: i64,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            product: p.product.clone(),
            price: p.price,
            co: p.co.clone(),
            qty: p.qty,
            desc: p.desc.clone(),
            cat: p.cat.clone(),
            country: p.country.clone(),
            is_discount: p.is_discount,
            discount: p.discount,
            image: p.image.clone(),
            seen: p.seen,
        }
    }
}

fn project(products: &[Product]) -> Vec<ProductView> {
    products.iter().map(ProductView::from).collect()
}

/// All page templates, registered once at startup and shared across
/// handlers.
#[derive(Clone)]
pub struct Views {
    registry: Arc<Handlebars<'static>>,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_template_string("home", HOME)?;
        registry.register_template_string("cat_products", CAT_PRODUCTS)?;
        registry.register_template_string("cat_products_co", CAT_PRODUCTS_CO)?;
        registry.register_template_string("product", PRODUCT)?;
        registry.register_template_string("create", CREATE)?;
        registry.register_template_string("update", UPDATE)?;
        registry.register_template_string("list", LIST)?;
        registry.register_template_string("results", RESULTS)?;
        registry.register_template_string("no_results", NO_RESULTS)?;
        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    fn render<T: Serialize>(&self, name: &str, data: &T) -> AppResult<Html<String>> {
        Ok(Html(self.registry.render(name, data)?))
    }

    pub fn home(
        &self,
        products: &[Product],
        most_viewed: &[Product],
        random_picks: &[usize],
    ) -> AppResult<Html<String>> {
        self.render(
            "home",
            &json!({
                "products": project(products),
                "most_viewed": project(most_viewed),
                "random_picks": random_picks,
            }),
        )
    }

    pub fn category(
        &self,
        products: &[Product],
        device: &str,
        page: &str,
        companies: &[String],
    ) -> AppResult<Html<String>> {
        self.render(
            "cat_products",
            &json!({
                "products": project(products),
                "device": device,
                "page": page,
                "companies": companies,
            }),
        )
    }

    pub fn category_company(
        &self,
        products: &[Product],
        device: &str,
        company: &str,
        page: &str,
        companies: &[String],
    ) -> AppResult<Html<String>> {
        self.render(
            "cat_products_co",
            &json!({
                "products": project(products),
                "device": device,
                "company": company,
                "page": page,
                "companies": companies,
            }),
        )
    }

    pub fn product_detail(
        &self,
        selected: &Product,
        related: &[Product],
        random_picks: &[usize],
    ) -> AppResult<Html<String>> {
        self.render(
            "product",
            &json!({
                "selected": ProductView::from(selected),
                "related": project(related),
                "random_picks": random_picks,
            }),
        )
    }

    pub fn create_form(&self) -> AppResult<Html<String>> {
        self.render("create", &json!({}))
    }

    pub fn update_form(&self, product: &Product) -> AppResult<Html<String>> {
        self.render("update", &json!({ "product": ProductView::from(product) }))
    }

    pub fn list(&self, products: &[Product]) -> AppResult<Html<String>> {
        self.render("list", &json!({ "products": project(products) }))
    }

    pub fn results(&self, products: &[Product]) -> AppResult<Html<String>> {
        self.render("results", &json!({ "products": project(products) }))
    }

    pub fn no_results(&self, message: &str) -> AppResult<Html<String>> {
        self.render("no_results", &json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn sample_product() -> Product {
        Product {
            id: Some(ObjectId::new()),
            product: "Phone X".into(),
            price: 500.0,
            co: "Acme".into(),
            qty: 3,
            desc: "A phone".into(),
            cat: "PHONES".into(),
            country: "Unknown".into(),
            is_discount: true,
            discount: 50.0,
            image: "123phone.png".into(),
            seen: 7,
        }
    }

    #[test]
    fn all_templates_register() {
        Views::new().unwrap();
    }

    #[test]
    fn home_renders_products_and_picks() {
        let views = Views::new().unwrap();
        let product = sample_product();
        let html = views
            .home(std::slice::from_ref(&product), &[product.clone()], &[0, 0])
            .unwrap();
        assert!(html.0.contains("Phone X"));
        assert!(html.0.contains(&product.id.unwrap().to_hex()));
    }

    #[test]
    fn fallback_renders_the_message() {
        let html = render_fallback("Sorry we couldn't find any results");
        assert!(html.contains("Sorry we couldn&#x27;t find any results") || html.contains("Sorry we couldn't find any results"));
    }

    #[test]
    fn update_form_is_prefilled() {
        let views = Views::new().unwrap();
        let html = views.update_form(&sample_product()).unwrap();
        assert!(html.0.contains("Phone X"));
        assert!(html.0.contains("500"));
    }
}
