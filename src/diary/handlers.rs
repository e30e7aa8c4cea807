use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    AddProductRequest, AddRecipeRequest, AddedEntryResponse, AnalyzeRecipeRequest,
    CreatedSessionResponse, GoalRequest, GoalResponse, RemovedEntryResponse, ReplaceSlotRequest,
    SaveRecipeRequest, SlotResponse,
};
use super::services::{add_product_to_meal, analyze_and_add, session_handle};
use crate::{
    error::AppError,
    foods::RecipeCandidate,
    ledger::{EntrySource, LedgerError, MealSlot},
    session::{SessionError, SessionSummary},
    state::AppState,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_summary).delete(end_session))
        .route("/sessions/:id/goal", put(set_goal))
        .route("/sessions/:id/recipes", get(list_recipes).post(save_recipe))
}

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions/:id/meals/:slot", get(list_slot).put(replace_slot))
        .route("/sessions/:id/meals/:slot/products", post(add_product))
        .route("/sessions/:id/meals/:slot/recipes", post(add_recipe))
        .route("/sessions/:id/meals/:slot/analysis", post(add_analyzed_recipe))
        .route("/sessions/:id/meals/:slot/entries/:index", delete(remove_entry))
}

#[instrument(skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreatedSessionResponse>), AppError> {
    let id = state.sessions.create().await?;
    Ok((StatusCode::CREATED, Json(CreatedSessionResponse { id })))
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(session.summary()))
}

#[instrument(skip(state))]
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        let live = state.sessions.len().await;
        info!(session_id = %id, live, "session closed by client");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(id))
    }
}

#[instrument(skip(state))]
pub async fn list_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, MealSlot)>,
) -> Result<Json<SlotResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    let entries = session.ledger().slot(slot).to_vec();
    Ok(Json(SlotResponse {
        slot,
        subtotal: entries.iter().map(|e| &e.nutrients).sum(),
        entries,
    }))
}

/// Rewrites a slot as the listed subset of its current entries, in the
/// listed order. An empty `keep` clears the slot.
#[instrument(skip(state))]
pub async fn replace_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, MealSlot)>,
    Json(body): Json<ReplaceSlotRequest>,
) -> Result<Json<SlotResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;

    let current = session.ledger().slot(slot);
    let mut seen = HashSet::with_capacity(body.keep.len());
    let mut kept = Vec::with_capacity(body.keep.len());
    for &index in &body.keep {
        let entry = current.get(index).ok_or(SessionError::Ledger(LedgerError::IndexOutOfRange {
            slot,
            index,
            len: current.len(),
        }))?;
        if !seen.insert(index) {
            return Err(AppError::BadRequest(format!("index {index} listed twice")));
        }
        kept.push(entry.clone());
    }

    let old = session.replace_slot(slot, kept)?;
    info!(session_id = %id, %slot, before = old.len(), after = body.keep.len(), "slot replaced");
    let entries = session.ledger().slot(slot).to_vec();
    Ok(Json(SlotResponse {
        slot,
        subtotal: entries.iter().map(|e| &e.nutrients).sum(),
        entries,
    }))
}

#[instrument(skip(state, body))]
pub async fn add_product(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, MealSlot)>,
    Json(body): Json<AddProductRequest>,
) -> Result<(StatusCode, Json<AddedEntryResponse>), AppError> {
    let added = add_product_to_meal(&state, id, slot, &body.barcode, body.quantity_g).await?;
    info!(session_id = %id, %slot, barcode = %body.barcode, "product added to meal");
    Ok((StatusCode::CREATED, Json(added)))
}

#[instrument(skip(state, body))]
pub async fn add_recipe(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, MealSlot)>,
    Json(body): Json<AddRecipeRequest>,
) -> Result<(StatusCode, Json<AddedEntryResponse>), AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }

    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    let (index, entry) = session.add_recipe_serving(
        slot,
        name,
        &body.nutrients,
        body.servings,
        EntrySource::Recipe,
    )?;
    info!(session_id = %id, %slot, recipe = %name, "recipe serving added");
    Ok((
        StatusCode::CREATED,
        Json(AddedEntryResponse {
            slot,
            index,
            entry,
            total: *session.total(),
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn add_analyzed_recipe(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, MealSlot)>,
    Json(body): Json<AnalyzeRecipeRequest>,
) -> Result<(StatusCode, Json<AddedEntryResponse>), AppError> {
    let added = analyze_and_add(&state, id, slot, body).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

#[instrument(skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    Path((id, slot, index)): Path<(Uuid, MealSlot, usize)>,
) -> Result<Json<RemovedEntryResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    let removed = session.remove_entry_at(slot, index)?;
    info!(session_id = %id, %slot, index, "entry removed from meal");
    Ok(Json(RemovedEntryResponse {
        slot,
        removed,
        total: *session.total(),
    }))
}

#[instrument(skip(state))]
pub async fn set_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<GoalRequest>,
) -> Result<Json<GoalResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.set_calorie_goal(body.calories)?;
    Ok(Json(GoalResponse {
        calorie_goal: session.calorie_goal(),
        goal_progress_percent: session.goal_progress(),
    }))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RecipeCandidate>>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(session.saved_recipes().to_vec()))
}

#[instrument(skip(state, body))]
pub async fn save_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SaveRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeCandidate>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if !(body.servings.is_finite() && body.servings > 0.0) {
        return Err(SessionError::InvalidYield(body.servings).into());
    }
    let recipe = RecipeCandidate::new(
        body.name.trim(),
        body.servings,
        body.totals.sanitized(),
        body.total_weight_g,
        body.image,
    );
    let handle = session_handle(&state, id).await?;
    handle.lock().await.save_recipe(recipe.clone());
    Ok((StatusCode::CREATED, Json(recipe)))
}
