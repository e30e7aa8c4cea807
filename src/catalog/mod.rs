//! Read-only lookups against the external food databases, for browsing before
//! anything is added to a meal.

mod dto;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::catalog_routes()
}
