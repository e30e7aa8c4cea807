use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct FoodApiConfig {
    pub products_base_url: String,
    pub recipes_base_url: String,
    pub app_id: String,
    pub app_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_sessions: usize,
    pub food_api: FoodApiConfig,
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_id = std::env::var("EDAMAM_APP_ID").unwrap_or_default();
        let app_key = std::env::var("EDAMAM_APP_KEY").unwrap_or_default();
        if app_id.is_empty() || app_key.is_empty() {
            warn!("EDAMAM_APP_ID / EDAMAM_APP_KEY not set; recipe search and analysis will fail");
        }

        let food_api = FoodApiConfig {
            products_base_url: std::env::var("OFF_BASE_URL")
                .unwrap_or_else(|_| "https://world.openfoodfacts.org".into()),
            recipes_base_url: std::env::var("EDAMAM_BASE_URL")
                .unwrap_or_else(|_| "https://api.edamam.com".into()),
            app_id,
            app_key,
            timeout_secs: parsed_or("HTTP_TIMEOUT_SECS", 10),
        };
        anyhow::ensure!(food_api.timeout_secs > 0, "HTTP_TIMEOUT_SECS must be positive");

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_or("APP_PORT", 8080),
            max_sessions: parsed_or("MAX_SESSIONS", 10_000),
            food_api,
        })
    }
}
