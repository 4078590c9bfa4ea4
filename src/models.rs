use mongodb::bson::{Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

fn default_desc() -> String {
    "Nothing to show".to_string()
}

fn default_country() -> String {
    "Unknown".to_string()
}

/// A catalog product as stored in the `products` collection.
///
/// `_id` is assigned by the store on insert and never changes afterwards.
/// `cat` is always persisted upper-cased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub product: String,
    pub price: f64,
    #[serde(default)]
    pub co: String,
    #[serde(default)]
    pub qty: i64,
    #[serde(default = "default_desc")]
    pub desc: String,
    #[serde(default)]
    pub cat: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(rename = "isDiscount", default)]
    pub is_discount: bool,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub seen: i64,
}

/// Raw text fields from the create/update forms. Everything arrives as a
/// string (multipart or urlencoded); parsing and validation happen here so
/// both submission paths share the same schema rules.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductForm {
    pub product: Option<String>,
    pub price: Option<String>,
    pub co: Option<String>,
    pub qty: Option<String>,
    pub desc: Option<String>,
    pub cat: Option<String>,
    pub country: Option<String>,
    pub discount: Option<String>,
}

impl ProductForm {
    /// Assign a field by its form name. Unknown fields are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "product" => self.product = Some(value),
            "price" => self.price = Some(value),
            "co" => self.co = Some(value),
            "qty" => self.qty = Some(value),
            "desc" => self.desc = Some(value),
            "cat" => self.cat = Some(value),
            "country" => self.country = Some(value),
            "discount" => self.discount = Some(value),
            _ => {}
        }
    }

    /// Build a new product from the creation form. Required fields are
    /// `product` and `price`; `cat` is upper-cased and `is_discount` is
    /// derived from a non-zero `discount`.
    pub fn into_product(self, image: String) -> AppResult<Product> {
        let product = required(self.product, "product")?;
        let price = parse_f64(&required(self.price, "price")?, "price")?;
        let discount = match present(self.discount) {
            Some(value) => parse_f64(&value, "discount")?,
            None => 0.0,
        };
        let qty = match present(self.qty) {
            Some(value) => parse_i64(&value, "qty")?,
            None => 0,
        };

        Ok(Product {
            id: None,
            product,
            price,
            co: present(self.co).unwrap_or_default(),
            qty,
            desc: present(self.desc).unwrap_or_else(default_desc),
            cat: self.cat.unwrap_or_default().to_uppercase(),
            country: present(self.country).unwrap_or_else(default_country),
            is_discount: discount != 0.0,
            discount,
            image,
            seen: 0,
        })
    }

    /// Build the `$set` payload for an update. Only submitted fields are
    /// touched; `image`, `seen` and `isDiscount` keep their stored values.
    pub fn update_document(self) -> AppResult<Document> {
        let product = required(self.product, "product")?;
        let price = parse_f64(&required(self.price, "price")?, "price")?;

        let mut update = doc! { "product": product, "price": price };
        if let Some(co) = self.co {
            update.insert("co", co);
        }
        if let Some(qty) = present(self.qty) {
            update.insert("qty", parse_i64(&qty, "qty")?);
        }
        if let Some(desc) = self.desc {
            update.insert("desc", desc);
        }
        if let Some(cat) = self.cat {
            update.insert("cat", cat.to_uppercase());
        }
        if let Some(country) = self.country {
            update.insert("country", country);
        }
        if let Some(discount) = present(self.discount) {
            update.insert("discount", parse_f64(&discount, "discount")?);
        }
        Ok(update)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, field: &'static str) -> AppResult<String> {
    present(value).ok_or(AppError::MissingField(field))
}

fn parse_f64(value: &str, field: &'static str) -> AppResult<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidField(field))
}

fn parse_i64(value: &str, field: &'static str) -> AppResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidField(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone_form() -> ProductForm {
        ProductForm {
            product: Some("Phone X".into()),
            price: Some("500".into()),
            cat: Some("phones".into()),
            discount: Some("50".into()),
            ..Default::default()
        }
    }

    #[test]
    fn create_normalizes_category_and_derives_discount() {
        let product = phone_form().into_product("img.png".into()).unwrap();
        assert_eq!(product.cat, "PHONES");
        assert!(product.is_discount);
        assert_eq!(product.discount, 50.0);
        assert_eq!(product.price, 500.0);
    }

    #[test]
    fn create_applies_defaults() {
        let form = ProductForm {
            product: Some("Widget".into()),
            price: Some("10".into()),
            ..Default::default()
        };
        let product = form.into_product("img.png".into()).unwrap();
        assert_eq!(product.desc, "Nothing to show");
        assert_eq!(product.country, "Unknown");
        assert_eq!(product.qty, 0);
        assert_eq!(product.seen, 0);
        assert!(!product.is_discount);
        assert_eq!(product.discount, 0.0);
    }

    #[test]
    fn zero_discount_is_not_a_discount() {
        let mut form = phone_form();
        form.discount = Some("0".into());
        let product = form.into_product("img.png".into()).unwrap();
        assert!(!product.is_discount);
    }

    #[test]
    fn missing_required_fields_name_the_field() {
        let mut form = phone_form();
        form.product = None;
        match form.into_product("img.png".into()) {
            Err(AppError::MissingField(field)) => assert_eq!(field, "product"),
            other => panic!("expected missing-field error, got {other:?}"),
        }

        let mut form = phone_form();
        form.price = Some("   ".into());
        match form.into_product("img.png".into()) {
            Err(AppError::MissingField(field)) => assert_eq!(field, "price"),
            other => panic!("expected missing-field error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_price_is_invalid() {
        let mut form = phone_form();
        form.price = Some("cheap".into());
        assert!(matches!(
            form.into_product("img.png".into()),
            Err(AppError::InvalidField("price"))
        ));
    }

    #[test]
    fn update_document_normalizes_category_and_skips_protected_fields() {
        let update = phone_form().update_document().unwrap();
        assert_eq!(update.get_str("cat").unwrap(), "PHONES");
        assert!(!update.contains_key("seen"));
        assert!(!update.contains_key("image"));
        assert!(!update.contains_key("isDiscount"));
    }

    #[test]
    fn update_document_only_sets_submitted_fields() {
        let form = ProductForm {
            product: Some("Widget".into()),
            price: Some("10".into()),
            ..Default::default()
        };
        let update = form.update_document().unwrap();
        assert!(!update.contains_key("co"));
        assert!(!update.contains_key("desc"));
        assert!(!update.contains_key("country"));
    }
}
