//! Shared application state.

/// Cloned into every handler; the connection is an `Arc`-backed pool.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
}
