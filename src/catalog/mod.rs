use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod repo;

#[cfg(test)]
pub use repo::memory;
pub use repo::{CatalogStore, PgCatalogStore};

pub fn router() -> Router<AppState> {
    handlers::catalog_routes()
}
