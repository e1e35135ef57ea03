//! Sea-ORM entities for the `products` and `product_images` tables

pub mod product;
pub mod product_image;

use serde::de::DeserializeOwned;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductImage};

fn decode_list<T: DeserializeOwned>(
    id: uuid::Uuid,
    column: &str,
    value: serde_json::Value,
) -> ProductResult<Vec<T>> {
    serde_json::from_value(value).map_err(|e| {
        ProductError::Internal(format!("product {} has malformed {}: {}", id, column, e))
    })
}

/// Assemble a domain product from its row and image rows.
///
/// `images` must already be sorted by position.
pub fn into_domain(
    model: product::Model,
    images: Vec<product_image::Model>,
) -> ProductResult<Product> {
    let sizes = decode_list(model.id, "sizes", model.sizes)?;
    let tags = decode_list(model.id, "tags", model.tags)?;

    Ok(Product {
        id: model.id,
        title: model.title,
        price: model.price,
        description: model.description,
        slug: model.slug,
        stock: model.stock,
        sizes,
        gender: model.gender,
        tags,
        images: images
            .into_iter()
            .map(|image| ProductImage {
                id: image.id,
                url: image.url,
            })
            .collect(),
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use serde_json::json;

    fn row(sizes: serde_json::Value) -> product::Model {
        let now = chrono::Utc::now().into();
        product::Model {
            id: uuid::Uuid::now_v7(),
            title: "Tee".to_string(),
            price: 10.0,
            description: None,
            slug: "tee".to_string(),
            stock: 1,
            sizes,
            gender: Gender::Men,
            tags: json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_into_domain_keeps_image_order() {
        let model = row(json!(["S", "M"]));
        let images = ["b.jpg", "a.jpg"]
            .iter()
            .enumerate()
            .map(|(position, url)| product_image::Model {
                id: uuid::Uuid::now_v7(),
                product_id: model.id,
                url: url.to_string(),
                position: position as i32,
            })
            .collect();

        let product = into_domain(model, images).unwrap();
        assert_eq!(product.sizes, vec!["S", "M"]);
        let urls: Vec<&str> = product.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn test_malformed_json_column_is_internal() {
        let err = into_domain(row(json!({"not": "a list"})), Vec::new()).unwrap_err();
        assert!(matches!(err, ProductError::Internal(ref m) if m.contains("sizes")));
    }
}
