use crate::config::AppConfig;
use crate::foods::{FoodSource, HttpFoodSource};
use crate::session::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionStore>,
    pub foods: Arc<dyn FoodSource>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let foods = Arc::new(HttpFoodSource::new(&config.food_api)?) as Arc<dyn FoodSource>;
        Ok(Self::from_parts(config, foods))
    }

    pub fn from_parts(config: Arc<AppConfig>, foods: Arc<dyn FoodSource>) -> Self {
        let sessions = Arc::new(SessionStore::new(config.max_sessions));
        Self {
            config,
            sessions,
            foods,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::FoodApiConfig;
        use crate::foods::{LookupError, Product, RecipeCandidate};
        use crate::nutrition::NutrientRecord;
        use async_trait::async_trait;

        #[derive(Clone)]
        struct FakeFoods;
        #[async_trait]
        impl FoodSource for FakeFoods {
            async fn lookup_product(&self, code: &str) -> Result<Option<Product>, LookupError> {
                if !crate::foods::barcode::is_valid_barcode(code) {
                    return Err(LookupError::InvalidBarcode(code.to_string()));
                }
                match code {
                    "4011200296908" => Ok(Some(Product {
                        barcode: code.to_string(),
                        name: "Apple".into(),
                        brands: None,
                        image_url: None,
                        ingredients_text: None,
                        nutrition_grade: Some("a".into()),
                        per_100g: NutrientRecord {
                            calories: 52.0,
                            fat: 0.2,
                            carbohydrates: 14.0,
                            proteins: 0.3,
                            ..NutrientRecord::ZERO
                        },
                    })),
                    "99999999" => Err(LookupError::Transport("connection refused".into())),
                    _ => Ok(None),
                }
            }

            async fn search_recipes(&self, query: &str) -> Result<Vec<RecipeCandidate>, LookupError> {
                match query {
                    "curry" => Ok(vec![RecipeCandidate::new(
                        "Chicken Curry",
                        4.0,
                        NutrientRecord {
                            calories: 800.0,
                            fat: 40.0,
                            ..NutrientRecord::ZERO
                        },
                        Some(1500.0),
                        None,
                    )]),
                    "offline" => Err(LookupError::Upstream { status: 503 }),
                    _ => Ok(Vec::new()),
                }
            }

            async fn analyze_ingredients(
                &self,
                _title: &str,
                ingredients: &[String],
            ) -> Result<NutrientRecord, LookupError> {
                let n = ingredients.len() as f64;
                Ok(NutrientRecord {
                    calories: 100.0 * n,
                    proteins: 5.0 * n,
                    ..NutrientRecord::ZERO
                })
            }
        }

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            max_sessions: 3,
            food_api: FoodApiConfig {
                products_base_url: "http://fake.local".into(),
                recipes_base_url: "http://fake.local".into(),
                app_id: "test".into(),
                app_key: "test".into(),
                timeout_secs: 1,
            },
        });

        Self::from_parts(config, Arc::new(FakeFoods) as Arc<dyn FoodSource>)
    }
}
