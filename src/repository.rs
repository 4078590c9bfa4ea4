use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Bson, Document, doc, oid::ObjectId},
    options::ReturnDocument,
};
use tracing::instrument;

use crate::error::AppResult;
use crate::models::{Product, ProductForm};

pub const COLLECTION: &str = "products";

/// Typed access to the `products` collection. Cloneable; clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct ProductRepository {
    collection: Collection<Product>,
}

impl ProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Product>(COLLECTION),
        }
    }

    /// Equality filter on the upper-cased category, with an optional
    /// exclusive price range.
    fn category_filter(category: &str, price_range: Option<(f64, f64)>) -> Document {
        let mut filter = doc! { "cat": category.to_uppercase() };
        if let Some((min, max)) = price_range {
            filter.insert("price", doc! { "$gt": min, "$lt": max });
        }
        filter
    }

    /// Facet values: distinct non-empty company names.
    fn facet_values(values: Vec<Bson>) -> Vec<String> {
        values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect()
    }

    pub async fn list_all(&self) -> AppResult<Vec<Product>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn most_viewed(&self) -> AppResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "seen": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    pub async fn find_by_category(
        &self,
        category: &str,
        price_range: Option<(f64, f64)>,
    ) -> AppResult<Vec<Product>> {
        let filter = Self::category_filter(category, price_range);
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    pub async fn find_by_category_and_company(
        &self,
        category: &str,
        company: &str,
    ) -> AppResult<Vec<Product>> {
        let filter = doc! { "cat": category.to_uppercase(), "co": company };
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn distinct_companies(&self, category: &str) -> AppResult<Vec<String>> {
        let values = self
            .collection
            .distinct("co", doc! { "cat": category.to_uppercase() })
            .await?;
        Ok(Self::facet_values(values))
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Product>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.collection.find_one(doc! { "_id": oid }).await?)
    }

    /// Atomically bump the view counter, returning the record as it was
    /// before the increment (the detail page shows the pre-view count).
    #[instrument(skip(self))]
    pub async fn increment_seen(&self, id: &str) -> AppResult<Option<Product>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let product = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$inc": { "seen": 1 } })
            .return_document(ReturnDocument::Before)
            .await?;
        Ok(product)
    }

    /// Free-text search over the `product` and `desc` text index.
    #[instrument(skip(self))]
    pub async fn text_search(&self, keyword: &str) -> AppResult<Vec<Product>> {
        let filter = doc! { "$text": { "$search": keyword } };
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, form))]
    pub async fn create(&self, form: ProductForm, image: String) -> AppResult<ObjectId> {
        let product = form.into_product(image)?;
        let result = self.collection.insert_one(&product).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow::anyhow!("store returned a non-ObjectId identifier"))?;
        tracing::info!(product_id = %id, "product created");
        Ok(id)
    }

    /// Apply the submitted fields to an existing record. No upsert: an
    /// unknown id returns `None` and leaves the collection untouched.
    #[instrument(skip(self, form))]
    pub async fn update(&self, id: &str, form: ProductForm) -> AppResult<Option<Product>> {
        let update = form.update_document()?;
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": update })
            .return_document(ReturnDocument::After)
            .await?;
        if updated.is_some() {
            tracing::info!(product_id = %oid, "product updated");
        }
        Ok(updated)
    }

    /// Idempotent delete; removing a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(0);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        if result.deleted_count > 0 {
            tracing::info!(product_id = %oid, "product deleted");
        }
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_filter_uppercases() {
        let filter = ProductRepository::category_filter("phones", None);
        assert_eq!(filter.get_str("cat").unwrap(), "PHONES");
        assert!(!filter.contains_key("price"));
    }

    #[test]
    fn category_filter_price_bounds_are_exclusive() {
        let filter = ProductRepository::category_filter("phones", Some((100.0, 600.0)));
        let price = filter.get_document("price").unwrap();
        assert_eq!(price.get_f64("$gt").unwrap(), 100.0);
        assert_eq!(price.get_f64("$lt").unwrap(), 600.0);
        assert!(!price.contains_key("$gte"));
        assert!(!price.contains_key("$lte"));
    }

    #[test]
    fn facet_values_drop_empty_and_non_string_entries() {
        let values = vec![
            Bson::String("Acme".into()),
            Bson::String(String::new()),
            Bson::Null,
            Bson::String("Globex".into()),
        ];
        assert_eq!(
            ProductRepository::facet_values(values),
            vec!["Acme".to_string(), "Globex".to_string()]
        );
    }
}
