use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Every image URL must be non-blank
#[allow(clippy::ptr_arg)]
fn validate_image_urls(urls: &Vec<String>) -> Result<(), validator::ValidationError> {
    if urls.iter().any(|url| url.trim().is_empty()) {
        return Err(validator::ValidationError::new("empty_image_url"));
    }
    Ok(())
}

/// Turn arbitrary text into a URL-safe slug.
///
/// ```
/// use domain_products::models::slugify;
///
/// assert_eq!(slugify("Men's  Chill Crew Neck"), "mens-chill-crew-neck");
/// assert_eq!(slugify("--Kids_Hoodie--"), "kids-hoodie");
/// assert_eq!(slugify("Ñandú Tee"), "ñandú-tee");
/// ```
///
/// Letters and digits of any script are kept. Text with neither yields an
/// empty slug, which the service rejects.
pub fn slugify(source: &str) -> String {
    let mut slug = String::with_capacity(source.len());
    let mut pending_dash = false;

    for c in source.chars().filter(|c| *c != '\'') {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Target audience of a product
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_gender")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "men")]
    Men,
    #[sea_orm(string_value = "women")]
    Women,
    #[sea_orm(string_value = "kid")]
    Kid,
    #[sea_orm(string_value = "unisex")]
    Unisex,
}

/// Image row owned by a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub url: String,
}

impl ProductImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            url: url.into(),
        }
    }
}

/// Product with its image rows, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    /// Unique, matched case-insensitively on lookup
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    /// Unique, lowercase and hyphenated
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product as returned over HTTP, images flattened to their URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    #[schema(example = json!(["https://cdn.example.com/1740176-00-A_0_2000.jpg"]))]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            description: product.description,
            slug: product.slug,
            stock: product.stock,
            sizes: product.sizes,
            gender: product.gender,
            tags: product.tags,
            images: product.images.into_iter().map(|image| image.url).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// DTO for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Men's Chill Crew Neck Sweatshirt")]
    pub title: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Derived from the title when omitted
    #[validate(length(min = 1))]
    #[serde(default)]
    pub slug: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub sizes: Vec<String>,
    pub gender: Gender,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(custom(function = "validate_image_urls"))]
    #[serde(default)]
    pub images: Vec<String>,
}

/// DTO for a partial update; `images`, when present, replaces the whole list
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub slug: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub gender: Option<Gender>,
    pub tags: Option<Vec<String>>,
    #[validate(custom(function = "validate_image_urls"))]
    pub images: Option<Vec<String>>,
}

/// Page selection for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate, ToSchema, IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page size
    #[validate(range(min = 1))]
    #[serde(default = "default_limit")]
    #[param(default = 10, minimum = 1)]
    pub limit: u64,
    /// Rows to skip
    #[serde(default)]
    #[param(default = 0, minimum = 0)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }
}

impl Product {
    /// Build a new product; the slug falls back to the title.
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        let slug = slugify(input.slug.as_deref().unwrap_or(&input.title));

        Self {
            id: Uuid::now_v7(),
            title: input.title,
            price: input.price,
            description: input.description,
            slug,
            stock: input.stock,
            sizes: input.sizes,
            gender: input.gender,
            tags: input.tags,
            images: input.images.into_iter().map(ProductImage::new).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the scalar fields of `update` into `self`.
    ///
    /// Images are not touched here; the replacement list, if any, is
    /// handed back so it can be written in the same transaction as the row.
    pub fn apply_update(&mut self, update: UpdateProduct) -> Option<Vec<String>> {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(slug) = update.slug {
            self.slug = slugify(&slug);
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.updated_at = Utc::now();

        update.images
    }
}
