use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Pagination, Product, ProductImage};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and its images atomically
    async fn create(&self, product: Product) -> ProductResult<Product>;

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Title compared case-insensitively, slug compared to `term` lowercased
    async fn find_by_slug_or_title(&self, term: &str) -> ProductResult<Option<Product>>;

    /// Page of products oldest first
    async fn list(&self, page: Pagination) -> ProductResult<Vec<Product>>;

    /// Persist the scalar fields of `product`; when `images` is given, replace
    /// every image row with it. All in one transaction.
    async fn update(
        &self,
        product: Product,
        images: Option<Vec<String>>,
    ) -> ProductResult<Product>;

    /// Delete a product with its images. `false` when no row matched.
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Delete every product, returning how many rows went
    async fn delete_all(&self) -> ProductResult<u64>;
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Rows are kept in insertion order, which is also listing order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject `product` if another row already holds its title or slug
fn check_unique(products: &[Product], product: &Product) -> ProductResult<()> {
    for other in products.iter().filter(|p| p.id != product.id) {
        if other.title == product.title {
            return Err(ProductError::Conflict(format!(
                "Key (title)=({}) already exists.",
                product.title
            )));
        }
        if other.slug == product.slug {
            return Err(ProductError::Conflict(format!(
                "Key (slug)=({}) already exists.",
                product.slug
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        check_unique(&products, &product)?;

        products.push(product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug_or_title(&self, term: &str) -> ProductResult<Option<Product>> {
        let title = term.to_uppercase();
        let slug = term.to_lowercase();

        let products = self.products.read().await;
        Ok(products
            .iter()
            .find(|p| p.title.to_uppercase() == title || p.slug == slug)
            .cloned())
    }

    async fn list(&self, page: Pagination) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        mut product: Product,
        images: Option<Vec<String>>,
    ) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        check_unique(&products, &product)?;

        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| ProductError::not_found_id(product.id))?;

        if let Some(urls) = images {
            product.images = urls.into_iter().map(ProductImage::new).collect();
        } else {
            product.images = slot.images.clone();
        }
        *slot = product.clone();

        tracing::info!(product_id = %product.id, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);

        let deleted = products.len() < before;
        if deleted {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(deleted)
    }

    async fn delete_all(&self) -> ProductResult<u64> {
        let mut products = self.products.write().await;
        let count = products.len() as u64;
        products.clear();

        tracing::warn!(count, "Deleted all products");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProduct, Gender};

    fn product(title: &str, images: &[&str]) -> Product {
        Product::new(CreateProduct {
            title: title.to_string(),
            price: 10.0,
            description: None,
            slug: None,
            stock: 0,
            sizes: vec![],
            gender: Gender::Unisex,
            tags: vec![],
            images: images.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_title() {
        let repo = InMemoryProductRepository::new();
        repo.create(product("Tee", &[])).await.unwrap();

        let mut duplicate = product("Tee", &[]);
        duplicate.slug = "other-slug".into();
        let err = repo.create(duplicate).await.unwrap_err();
        assert!(matches!(err, ProductError::Conflict(ref m) if m.contains("(title)")));
    }

    #[tokio::test]
    async fn test_lookup_by_title_any_case_or_slug() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(product("Slim Fit Tee", &[])).await.unwrap();

        let by_title = repo.find_by_slug_or_title("sLiM fIt TeE").await.unwrap();
        let by_slug = repo.find_by_slug_or_title("SLIM-FIT-TEE").await.unwrap();
        assert_eq!(by_title.map(|p| p.id), Some(created.id));
        assert_eq!(by_slug.map(|p| p.id), Some(created.id));
        assert!(repo.find_by_slug_or_title("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_or_keeps_images() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(product("Tee", &["a.jpg", "b.jpg"])).await.unwrap();

        let kept = repo.update(created.clone(), None).await.unwrap();
        assert_eq!(kept.images.len(), 2);

        let replaced = repo
            .update(created, Some(vec!["c.jpg".to_string()]))
            .await
            .unwrap();
        assert_eq!(replaced.images.len(), 1);
        assert_eq!(replaced.images[0].url, "c.jpg");
    }

    #[tokio::test]
    async fn test_list_pages_in_insertion_order() {
        let repo = InMemoryProductRepository::new();
        for title in ["First", "Second", "Third"] {
            repo.create(product(title, &[])).await.unwrap();
        }

        let page = repo.list(Pagination::new(1, 1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Second");
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let repo = InMemoryProductRepository::new();
        let a = repo.create(product("A", &[])).await.unwrap();
        repo.create(product("B", &[])).await.unwrap();

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        assert_eq!(repo.delete_all().await.unwrap(), 1);
        assert!(repo.list(Pagination::default()).await.unwrap().is_empty());
    }
}
