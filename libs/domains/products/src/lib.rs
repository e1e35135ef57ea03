//! Products Domain
//!
//! Catalogue products with ordered image URLs, stored in PostgreSQL.
//!
//! ```text
//! handlers  → HTTP endpoints, OpenAPI doc
//! service   → validation, lookup by UUID or slug/title, error classification
//! repository→ persistence trait, in-memory and PostgreSQL implementations
//! models    → domain types and DTOs
//! ```
//!
//! ```rust,no_run
//! use domain_products::{handlers, InMemoryProductRepository, ProductService};
//!
//! let service = ProductService::new(InMemoryProductRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use models::{
    CreateProduct, Gender, Pagination, Product, ProductImage, ProductView, UpdateProduct, slugify,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
