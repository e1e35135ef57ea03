use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Pagination, Product, ProductView, UpdateProduct};
use crate::repository::ProductRepository;

/// Service layer for Product business logic
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// Log the full detail of persistence failures; callers only see the variant.
fn handle_db_error(err: ProductError) -> ProductError {
    match &err {
        ProductError::Database(detail) | ProductError::Internal(detail) => {
            tracing::error!(error = %detail, "Product persistence failed");
        }
        ProductError::Conflict(detail) => {
            tracing::warn!(detail = %detail, "Product unique constraint violated");
        }
        ProductError::NotFound(_) | ProductError::Validation(_) => {}
    }
    err
}

/// The stored slug must keep at least one letter or digit.
fn ensure_slug(product: &Product) -> ProductResult<()> {
    if product.slug.is_empty() {
        return Err(ProductError::Validation(
            "slug: must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(())
}

/// Only the hyphenated form counts as an id, so 32-hex-digit slugs stay
/// reachable.
fn parse_id_term(term: &str) -> Option<Uuid> {
    if term.len() != 36 {
        return None;
    }
    Uuid::try_parse(term).ok()
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateProduct) -> ProductResult<ProductView> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let product = Product::new(input);
        ensure_slug(&product)?;

        let product = self
            .repository
            .create(product)
            .await
            .map_err(handle_db_error)?;

        Ok(product.into())
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self, page: Pagination) -> ProductResult<Vec<ProductView>> {
        page.validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let products = self.repository.list(page).await.map_err(handle_db_error)?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    /// Look up by primary key when `term` parses as a UUID, otherwise by
    /// title (any case) or slug.
    #[instrument(skip(self))]
    pub async fn find_one(&self, term: &str) -> ProductResult<Product> {
        let found = match parse_id_term(term) {
            Some(id) => self.repository.find_by_id(id).await,
            None => self.repository.find_by_slug_or_title(term).await,
        }
        .map_err(handle_db_error)?;

        found.ok_or_else(|| ProductError::not_found_term(term))
    }

    pub async fn find_one_plain(&self, term: &str) -> ProductResult<ProductView> {
        self.find_one(term).await.map(ProductView::from)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<ProductView> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let mut product = self
            .repository
            .find_by_id(id)
            .await
            .map_err(handle_db_error)?
            .ok_or_else(|| ProductError::not_found_id(id))?;

        let images = product.apply_update(input);
        ensure_slug(&product)?;

        let updated = self
            .repository
            .update(product, images)
            .await
            .map_err(handle_db_error)?;

        Ok(updated.into())
    }

    /// Remove the product `term` resolves to, with its images.
    #[instrument(skip(self))]
    pub async fn remove(&self, term: &str) -> ProductResult<()> {
        let product = self.find_one(term).await?;

        let deleted = self
            .repository
            .delete(product.id)
            .await
            .map_err(handle_db_error)?;

        if !deleted {
            return Err(ProductError::not_found_term(term));
        }
        Ok(())
    }

    /// Delete every product. Not exposed over HTTP.
    #[instrument(skip(self))]
    pub async fn delete_all_products(&self) -> ProductResult<u64> {
        self.repository.delete_all().await.map_err(handle_db_error)
    }
}
