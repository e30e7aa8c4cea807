use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{AddedEntryResponse, AnalyzeRecipeRequest};
use crate::error::AppError;
use crate::ledger::{EntrySource, MealSlot};
use crate::session::{SessionError, SessionHandle};
use crate::state::AppState;

pub async fn session_handle(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or(AppError::SessionNotFound(id))
}

/// Looks the barcode up first and only then touches the session, so a failed
/// lookup leaves the ledger exactly as it was. The session is fetched again
/// after the lookup in case it ended in the meantime.
pub async fn add_product_to_meal(
    state: &AppState,
    session_id: Uuid,
    slot: MealSlot,
    barcode: &str,
    quantity_g: f64,
) -> Result<AddedEntryResponse, AppError> {
    session_handle(state, session_id).await?;
    let barcode = barcode.trim();

    let product = match state.foods.lookup_product(barcode).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            info!(%session_id, %barcode, "product not found");
            return Err(AppError::ProductNotFound(barcode.to_string()));
        }
        Err(e) => {
            warn!(%session_id, %barcode, error = %e, "product lookup failed");
            return Err(e.into());
        }
    };

    let handle = session_handle(state, session_id).await?;
    let mut session = handle.lock().await;
    let (index, entry) = session.add_product(slot, &product, quantity_g)?;
    Ok(AddedEntryResponse {
        slot,
        index,
        entry,
        total: *session.total(),
    })
}

pub async fn analyze_and_add(
    state: &AppState,
    session_id: Uuid,
    slot: MealSlot,
    req: AnalyzeRecipeRequest,
) -> Result<AddedEntryResponse, AppError> {
    session_handle(state, session_id).await?;

    let ingredients: Vec<String> = req
        .ingredients
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if ingredients.is_empty() {
        return Err(AppError::BadRequest("ingredients must not be empty".into()));
    }
    if !(req.servings.is_finite() && req.servings > 0.0) {
        return Err(SessionError::InvalidYield(req.servings).into());
    }
    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("My recipe")
        .to_string();

    let totals = state
        .foods
        .analyze_ingredients(&title, &ingredients)
        .await
        .map_err(|e| {
            warn!(%session_id, error = %e, "ingredient analysis failed");
            AppError::from(e)
        })?;

    let handle = session_handle(state, session_id).await?;
    let mut session = handle.lock().await;
    let (index, entry) =
        session.add_recipe_serving(slot, &title, &totals, req.servings, EntrySource::Analysis)?;
    Ok(AddedEntryResponse {
        slot,
        index,
        entry,
        total: *session.total(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::foods::{FoodSource, LookupError, Product, RecipeCandidate};
    use crate::nutrition::NutrientRecord;
    use crate::session::SessionStore;

    /// Ends the session it is pointed at while a lookup is in flight.
    struct EndsSessionMidLookup {
        sessions: Arc<SessionStore>,
        target: Mutex<Option<Uuid>>,
    }

    impl EndsSessionMidLookup {
        async fn end_target(&self) {
            let target = *self.target.lock().unwrap();
            if let Some(id) = target {
                self.sessions.remove(id).await;
            }
        }
    }

    #[async_trait]
    impl FoodSource for EndsSessionMidLookup {
        async fn lookup_product(&self, code: &str) -> Result<Option<Product>, LookupError> {
            self.end_target().await;
            Ok(Some(Product {
                barcode: code.to_string(),
                name: "Yogurt".into(),
                brands: None,
                image_url: None,
                ingredients_text: None,
                nutrition_grade: None,
                per_100g: NutrientRecord {
                    calories: 60.0,
                    ..NutrientRecord::ZERO
                },
            }))
        }

        async fn search_recipes(&self, _query: &str) -> Result<Vec<RecipeCandidate>, LookupError> {
            Ok(Vec::new())
        }

        async fn analyze_ingredients(
            &self,
            _title: &str,
            _ingredients: &[String],
        ) -> Result<NutrientRecord, LookupError> {
            self.end_target().await;
            Ok(NutrientRecord::ZERO)
        }
    }

    fn state_with_racing_foods() -> (AppState, Arc<EndsSessionMidLookup>) {
        let base = AppState::fake();
        let foods = Arc::new(EndsSessionMidLookup {
            sessions: base.sessions.clone(),
            target: Mutex::new(None),
        });
        let state = AppState {
            foods: foods.clone(),
            ..base
        };
        (state, foods)
    }

    #[tokio::test]
    async fn session_ended_during_product_lookup_is_not_found() {
        let (state, foods) = state_with_racing_foods();
        let id = state.sessions.create().await.unwrap();
        *foods.target.lock().unwrap() = Some(id);

        let res = add_product_to_meal(&state, id, MealSlot::Lunch, "4011200296908", 150.0).await;
        assert!(matches!(res, Err(AppError::SessionNotFound(missing)) if missing == id));
        assert!(state.sessions.get(id).await.is_none());
    }

    #[tokio::test]
    async fn session_ended_during_analysis_is_not_found() {
        let (state, foods) = state_with_racing_foods();
        let id = state.sessions.create().await.unwrap();
        *foods.target.lock().unwrap() = Some(id);

        let req = AnalyzeRecipeRequest {
            title: None,
            ingredients: vec!["1 apple".into()],
            servings: 1.0,
        };
        let res = analyze_and_add(&state, id, MealSlot::Snacks, req).await;
        assert!(matches!(res, Err(AppError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn missing_session_is_reported_before_any_lookup() {
        let (state, foods) = state_with_racing_foods();
        let other = state.sessions.create().await.unwrap();
        *foods.target.lock().unwrap() = Some(other);

        let missing = Uuid::new_v4();
        let res = add_product_to_meal(&state, missing, MealSlot::Lunch, "4011200296908", 100.0).await;
        assert!(matches!(res, Err(AppError::SessionNotFound(_))));
        assert!(state.sessions.get(other).await.is_some());
    }
}
