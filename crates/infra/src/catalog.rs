//! Catalog integrity guard.
//!
//! Every product write goes through [`CatalogService`], which enforces:
//! - the product's category resolves to an existing category (by name);
//! - a supplied `createdAt` parses;
//! - field-level validation;
//! - the decrement-or-delete policy on removal.
//!
//! Updates and removals both write with compare-and-swap against the
//! version they read, so neither can undo a concurrent stock change.
//!
//! Rejected writes leave the store untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use catalog_core::{CategoryId, DomainError, ProductId};
use catalog_products::{Category, LOW_STOCK_THRESHOLD, NewCategory, Product, ProductDraft, RemovalOutcome};

use crate::error::ServiceResult;
use crate::store::{DocumentStore, Filter};

/// Conditional writes re-read the product this many times before giving up.
const MAX_WRITE_ATTEMPTS: usize = 3;

const SEARCH_FIELDS: &[&str] = &["name", "description"];

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn DocumentStore<Product>>,
    categories: Arc<dyn DocumentStore<Category>>,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn DocumentStore<Product>>,
        categories: Arc<dyn DocumentStore<Category>>,
    ) -> Self {
        Self { products, categories }
    }

    pub async fn create_category(&self, input: NewCategory) -> ServiceResult<Category> {
        input.validate()?;
        if self.find_category(&input.name).await?.is_some() {
            return Err(DomainError::conflict(format!("category '{}' already exists", input.name.trim())).into());
        }
        let category = self.categories.insert(input.into_category(CategoryId::new())).await?;
        info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub async fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.find_all(&Filter::All).await?)
    }

    pub async fn find_category(&self, name: &str) -> ServiceResult<Option<Category>> {
        Ok(self.categories.find_one(&Filter::eq("name", name.trim())).await?)
    }

    /// Checks shared by create and update, in order: category reference,
    /// timestamp, fields.
    async fn check_draft(&self, draft: &ProductDraft) -> ServiceResult<Option<DateTime<Utc>>> {
        if self.find_category(&draft.category).await?.is_none() {
            return Err(DomainError::invalid_reference(format!(
                "category '{}' does not exist",
                draft.category.trim()
            ))
            .into());
        }
        let created_at = draft.created_at()?;
        draft.validate()?;
        Ok(created_at)
    }

    pub async fn create_product(&self, draft: ProductDraft) -> ServiceResult<Product> {
        let created_at = self.check_draft(&draft).await?.unwrap_or_else(Utc::now);
        let product = self
            .products
            .insert(Product::create(ProductId::new(), draft, created_at))
            .await?;
        info!(product_id = %product.id, category = %product.category, "product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: ProductId, draft: ProductDraft) -> ServiceResult<Product> {
        let created_at = self.check_draft(&draft).await?;
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self.get_product(id).await?;
            let revised = current.revise(draft.clone(), created_at);
            if self.products.compare_and_swap(&current, revised.clone()).await? {
                info!(product_id = %id, "product updated");
                return Ok(revised);
            }
            debug!(product_id = %id, attempt, "product changed during update, retrying");
        }
        Err(DomainError::conflict(format!("product {id} kept changing during update")).into())
    }

    /// Remove one unit of a product, deleting it when the last unit goes.
    pub async fn remove_product(&self, id: ProductId) -> ServiceResult<RemovalOutcome> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self.get_product(id).await?;
            match current.after_removal() {
                Some(next) => {
                    if self.products.compare_and_swap(&current, next.clone()).await? {
                        info!(product_id = %id, remaining = next.stock_count, "stock count decreased");
                        return Ok(RemovalOutcome::Decremented { product: next });
                    }
                }
                None => {
                    if self.products.delete_if(&current).await? {
                        info!(product_id = %id, "product deleted");
                        return Ok(RemovalOutcome::Deleted { id });
                    }
                }
            }
            debug!(product_id = %id, attempt, "product changed during removal, retrying");
        }
        Err(DomainError::conflict(format!("product {id} kept changing during removal")).into())
    }

    pub async fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        Ok(self.products.find(&id).await?.ok_or(DomainError::NotFound)?)
    }

    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.products.find_all(&Filter::All).await?)
    }

    /// Case-insensitive substring search over name and description.
    pub async fn search_products(&self, query: &str) -> ServiceResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("search query cannot be empty").into());
        }
        Ok(self
            .products
            .find_all(&Filter::contains_any(SEARCH_FIELDS, query))
            .await?)
    }

    pub async fn low_stock_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self
            .products
            .find_all(&Filter::lt("stockCount", f64::from(LOW_STOCK_THRESHOLD)))
            .await?)
    }
}
