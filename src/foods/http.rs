use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{barcode, edamam, openfoodfacts, FoodSource, LookupError, Product, RecipeCandidate};
use crate::config::FoodApiConfig;
use crate::nutrition::NutrientRecord;

/// Live [`FoodSource`] backed by Open Food Facts and Edamam. No retries: a
/// failed call is reported once and the caller decides what to show.
#[derive(Clone)]
pub struct HttpFoodSource {
    client: reqwest::Client,
    products_base_url: String,
    recipes_base_url: String,
    app_id: String,
    app_key: String,
}

impl HttpFoodSource {
    pub fn new(cfg: &FoodApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(concat!("mealtally/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self::with_client(client, cfg))
    }

    pub fn with_client(client: reqwest::Client, cfg: &FoodApiConfig) -> Self {
        Self {
            client,
            products_base_url: cfg.products_base_url.trim_end_matches('/').to_string(),
            recipes_base_url: cfg.recipes_base_url.trim_end_matches('/').to_string(),
            app_id: cfg.app_id.clone(),
            app_key: cfg.app_key.clone(),
        }
    }
}

fn check_status(status: StatusCode) -> Result<(), LookupError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(LookupError::Upstream {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl FoodSource for HttpFoodSource {
    async fn lookup_product(&self, code: &str) -> Result<Option<Product>, LookupError> {
        if !barcode::is_valid_barcode(code) {
            return Err(LookupError::InvalidBarcode(code.to_string()));
        }
        let url = format!("{}/api/v0/product/{}.json", self.products_base_url, code);
        let res = self.client.get(&url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            debug!(barcode = %code, "product lookup 404");
            return Ok(None);
        }
        check_status(res.status())?;

        let body: openfoodfacts::ProductResponse = res.json().await?;
        Ok(openfoodfacts::into_product(code, body))
    }

    async fn search_recipes(&self, query: &str) -> Result<Vec<RecipeCandidate>, LookupError> {
        let url = format!("{}/search", self.recipes_base_url);
        let res = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
            ])
            .send()
            .await?;
        if let Err(e) = check_status(res.status()) {
            warn!(%query, error = %e, "recipe search failed");
            return Err(e);
        }

        let body: edamam::SearchResponse = res.json().await?;
        Ok(edamam::into_candidates(body))
    }

    async fn analyze_ingredients(
        &self,
        title: &str,
        ingredients: &[String],
    ) -> Result<NutrientRecord, LookupError> {
        let url = format!("{}/api/nutrition-details", self.recipes_base_url);
        let res = self
            .client
            .post(&url)
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
            ])
            .json(&edamam::AnalysisRequest {
                title,
                ingr: ingredients,
            })
            .send()
            .await?;
        check_status(res.status())?;

        let body: edamam::AnalysisResponse = res.json().await?;
        Ok(edamam::analysis_totals(&body))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    use super::*;

    async fn product(Path(file): Path<String>) -> Result<Json<Value>, StatusCode> {
        match file.as_str() {
            "4011200296908.json" => Ok(Json(json!({
                "status": 1,
                "product": {
                    "product_name": "Apple",
                    "nutriments": { "energy-kcal_100g": 52, "fat_100g": "0.2" }
                }
            }))),
            "12345678.json" => Ok(Json(json!({ "status": 0 }))),
            "87654321.json" => Err(StatusCode::INTERNAL_SERVER_ERROR),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }

    async fn search(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        assert_eq!(q.get("app_id").map(String::as_str), Some("id"));
        let hits = if q.get("q").map(String::as_str) == Some("soup") {
            json!([{ "recipe": {
                "label": "Tomato Soup",
                "yield": 2,
                "totalNutrients": { "ENERC_KCAL": { "quantity": 300, "unit": "kcal" } }
            }}])
        } else {
            json!([])
        };
        Json(json!({ "hits": hits }))
    }

    async fn analysis(Json(body): Json<Value>) -> Json<Value> {
        let n = body["ingr"].as_array().map(Vec::len).unwrap_or(0) as f64;
        Json(json!({ "calories": 50.0 * n, "totalNutrients": {} }))
    }

    fn local(cfg: &FoodApiConfig) -> HttpFoodSource {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .unwrap();
        HttpFoodSource::with_client(client, cfg)
    }

    async fn source() -> HttpFoodSource {
        let app = Router::new()
            .route("/api/v0/product/:file", get(product))
            .route("/search", get(search))
            .route("/api/nutrition-details", post(analysis));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        local(&FoodApiConfig {
            products_base_url: base.clone(),
            recipes_base_url: format!("{base}/"),
            app_id: "id".into(),
            app_key: "key".into(),
            timeout_secs: 5,
        })
    }

    #[tokio::test]
    async fn product_lookup_outcomes() {
        let foods = source().await;

        let apple = foods.lookup_product("4011200296908").await.unwrap().unwrap();
        assert_eq!(apple.name, "Apple");
        assert_eq!(apple.per_100g.fat, 0.2);

        assert!(foods.lookup_product("12345678").await.unwrap().is_none());
        assert!(foods.lookup_product("11111111").await.unwrap().is_none());
        assert!(matches!(
            foods.lookup_product("87654321").await,
            Err(LookupError::Upstream { status: 500 })
        ));
        assert!(matches!(
            foods.lookup_product("../etc").await,
            Err(LookupError::InvalidBarcode(_))
        ));
    }

    #[tokio::test]
    async fn recipe_search_and_analysis() {
        let foods = source().await;

        let hits = foods.search_recipes("soup").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].per_serving.calories, 150.0);
        assert!(foods.search_recipes("nothing").await.unwrap().is_empty());

        let totals = foods
            .analyze_ingredients("Salad", &["1 tomato".to_string(), "1 cucumber".to_string()])
            .await
            .unwrap();
        assert_eq!(totals.calories, 100.0);
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let foods = local(&FoodApiConfig {
            products_base_url: "http://127.0.0.1:1".into(),
            recipes_base_url: "http://127.0.0.1:1".into(),
            app_id: String::new(),
            app_key: String::new(),
            timeout_secs: 2,
        });
        assert!(matches!(
            foods.lookup_product("4011200296908").await,
            Err(LookupError::Transport(_))
        ));
    }
}
