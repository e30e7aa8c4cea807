use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{ProductDetails, RecipeHit, RecipeQuery};
use crate::{error::AppError, state::AppState};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products/:barcode", get(get_product))
        .route("/recipes", get(search_recipes))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<Json<ProductDetails>, AppError> {
    let barcode = barcode.trim().to_string();
    let product = state
        .foods
        .lookup_product(&barcode)
        .await
        .map_err(|e| {
            warn!(%barcode, error = %e, "product lookup failed");
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::ProductNotFound(barcode.clone()))?;

    Ok(Json(ProductDetails {
        per_100g_display: product.per_100g.formatted(),
        product,
    }))
}

#[instrument(skip(state))]
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(q): Query<RecipeQuery>,
) -> Result<Json<Vec<RecipeHit>>, AppError> {
    let query = q.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::BadRequest("No recipe query provided".into()));
    }

    let candidates = state.foods.search_recipes(query).await.map_err(|e| {
        warn!(%query, error = %e, "recipe search failed");
        AppError::from(e)
    })?;
    if candidates.is_empty() {
        info!(%query, "no recipe found for the query");
        return Err(AppError::NoRecipes(query.to_string()));
    }

    Ok(Json(candidates.into_iter().map(RecipeHit::from).collect()))
}
