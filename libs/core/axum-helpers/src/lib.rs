//! # Axum Helpers
//!
//! Building blocks shared by the HTTP services:
//!
//! - **[`errors`]**: [`AppError`] and the JSON [`ErrorResponse`] body with stable error codes
//! - **[`extractors`]**: UUID path, validated JSON and validated query extractors
//! - **[`http`]**: CORS and security header middleware
//! - **[`server`]**: router assembly with API docs, health endpoints, graceful shutdown
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes)
//!     .await?
//!     .merge(health_router(config.app));
//!
//! create_production_app(router, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks,
};

pub use http::{cors_layer_from_env, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson, ValidatedQuery};
