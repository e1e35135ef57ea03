use async_trait::async_trait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    entity::{self, product, product_image},
    error::{ProductError, ProductResult},
    models::{Pagination, Product, ProductImage},
    repository::ProductRepository,
};

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Image rows for `product_ids`, grouped by product and sorted by position
    async fn load_images<C: ConnectionTrait>(
        conn: &C,
        product_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<product_image::Model>>, DbErr> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = product_image::Entity::find()
            .filter(product_image::Column::ProductId.is_in(product_ids))
            .order_by_asc(product_image::Column::Position)
            .order_by_asc(product_image::Column::Id)
            .all(conn)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<product_image::Model>> = HashMap::new();
        for row in rows {
            grouped.entry(row.product_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn with_images(&self, model: Option<product::Model>) -> ProductResult<Option<Product>> {
        let Some(model) = model else {
            return Ok(None);
        };

        let mut images = Self::load_images(&self.db, vec![model.id]).await?;
        let rows = images.remove(&model.id).unwrap_or_default();
        entity::into_domain(model, rows).map(Some)
    }

    async fn insert_images(
        txn: &DatabaseTransaction,
        product_id: Uuid,
        images: &[ProductImage],
    ) -> Result<(), DbErr> {
        if images.is_empty() {
            return Ok(());
        }
        product_image::Entity::insert_many(product_image::active_models(product_id, images))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn write_new(
        txn: &DatabaseTransaction,
        product: &Product,
    ) -> Result<product::Model, DbErr> {
        let row = product::ActiveModel::from(product).insert(txn).await?;
        Self::insert_images(txn, product.id, &product.images).await?;
        Ok(row)
    }

    /// Images are cleared before the row is written so a failing row update
    /// rolls the deletion back with it.
    async fn write_update(
        txn: &DatabaseTransaction,
        product: &Product,
        images: Option<&[ProductImage]>,
    ) -> Result<product::Model, DbErr> {
        if images.is_some() {
            product_image::Entity::delete_many()
                .filter(product_image::Column::ProductId.eq(product.id))
                .exec(txn)
                .await?;
        }

        let row = product::ActiveModel {
            created_at: NotSet,
            ..product::ActiveModel::from(product)
        }
        .update(txn)
        .await?;

        if let Some(images) = images {
            Self::insert_images(txn, product.id, images).await?;
        }
        Ok(row)
    }

    async fn rollback(txn: DatabaseTransaction, product_id: Option<Uuid>) {
        if let Err(e) = txn.rollback().await {
            tracing::error!(product_id = ?product_id, error = %e, "Failed to roll back transaction");
        }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let txn = self.db.begin().await?;

        let row = match Self::write_new(&txn, &product).await {
            Ok(row) => row,
            Err(e) => {
                Self::rollback(txn, Some(product.id)).await;
                return Err(e.into());
            }
        };
        txn.commit().await?;

        tracing::info!(product_id = %product.id, "Created product");

        // Timestamps as stored, at database precision
        Ok(Product {
            images: product.images,
            ..entity::into_domain(row, Vec::new())?
        })
    }

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let model = product::Entity::find_by_id(id).one(&self.db).await?;
        self.with_images(model).await
    }

    async fn find_by_slug_or_title(&self, term: &str) -> ProductResult<Option<Product>> {
        let model = product::Entity::find()
            .filter(
                Condition::any()
                    .add(Expr::cust_with_values(
                        r#"UPPER("products"."title") = $1"#,
                        [term.to_uppercase()],
                    ))
                    .add(product::Column::Slug.eq(term.to_lowercase())),
            )
            .one(&self.db)
            .await?;

        self.with_images(model).await
    }

    async fn list(&self, page: Pagination) -> ProductResult<Vec<Product>> {
        let models = product::Entity::find()
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await?;

        let ids = models.iter().map(|m| m.id).collect();
        let mut images = Self::load_images(&self.db, ids).await?;

        models
            .into_iter()
            .map(|model| {
                let rows = images.remove(&model.id).unwrap_or_default();
                entity::into_domain(model, rows)
            })
            .collect()
    }

    async fn update(
        &self,
        product: Product,
        images: Option<Vec<String>>,
    ) -> ProductResult<Product> {
        let id = product.id;
        let replacement: Option<Vec<ProductImage>> =
            images.map(|urls| urls.into_iter().map(ProductImage::new).collect());

        let txn = self.db.begin().await?;

        let row = match Self::write_update(&txn, &product, replacement.as_deref()).await {
            Ok(row) => row,
            Err(DbErr::RecordNotUpdated) => {
                Self::rollback(txn, Some(id)).await;
                return Err(ProductError::not_found_id(id));
            }
            Err(e) => {
                Self::rollback(txn, Some(id)).await;
                return Err(e.into());
            }
        };

        let mut stored = Self::load_images(&txn, vec![id]).await?;
        txn.commit().await?;

        tracing::info!(product_id = %id, images_replaced = replacement.is_some(), "Updated product");
        entity::into_domain(row, stored.remove(&id).unwrap_or_default())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let txn = self.db.begin().await?;

        let result = async {
            product_image::Entity::delete_many()
                .filter(product_image::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            product::Entity::delete_by_id(id).exec(&txn).await
        }
        .await;

        let rows_affected = match result {
            Ok(res) => res.rows_affected,
            Err(e) => {
                Self::rollback(txn, Some(id)).await;
                return Err(e.into());
            }
        };
        txn.commit().await?;

        if rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_all(&self) -> ProductResult<u64> {
        let txn = self.db.begin().await?;

        let result = async {
            product_image::Entity::delete_many().exec(&txn).await?;
            product::Entity::delete_many().exec(&txn).await
        }
        .await;

        let rows_affected = match result {
            Ok(res) => res.rows_affected,
            Err(e) => {
                Self::rollback(txn, None).await;
                return Err(e.into());
            }
        };
        txn.commit().await?;

        tracing::warn!(count = rows_affected, "Deleted all products");
        Ok(rows_affected)
    }
}
