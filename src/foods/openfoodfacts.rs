//! Open Food Facts product payloads.
//!
//! Nutriment keys look like `energy-kcal_100g` or `saturated-fat_100g` and the
//! values arrive as numbers, numeric strings, or not at all.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{null_as_default, Product};
use crate::nutrition::NutrientRecord;

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub status: Value,
    pub product: Option<RawProduct>,
}

#[derive(Debug, Deserialize)]
pub struct RawProduct {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub image_url: Option<String>,
    pub ingredients_text: Option<String>,
    pub nutrition_grades: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nutriments: Map<String, Value>,
}

/// Reads a number the way the food APIs send them. Anything unusable is 0.
pub fn lenient_number(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite()).unwrap_or(0.0)
}

pub fn nutrients_per_100g(nutriments: &Map<String, Value>) -> NutrientRecord {
    let get = |key: &str| lenient_number(nutriments.get(key));
    NutrientRecord {
        calories: get("energy-kcal_100g"),
        fat: get("fat_100g"),
        saturated_fat: get("saturated-fat_100g"),
        carbohydrates: get("carbohydrates_100g"),
        proteins: get("proteins_100g"),
        sodium: get("sodium_100g"),
        sugars: get("sugars_100g"),
    }
    .sanitized()
}

/// `None` unless the response says the product was found.
pub fn into_product(barcode: &str, resp: ProductResponse) -> Option<Product> {
    if lenient_number(Some(&resp.status)) != 1.0 {
        return None;
    }
    let raw = resp.product?;
    let name = raw
        .product_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown product".to_string());

    Some(Product {
        barcode: barcode.to_string(),
        name,
        brands: raw.brands,
        image_url: raw.image_url,
        ingredients_text: raw.ingredients_text,
        nutrition_grade: raw.nutrition_grades,
        per_100g: nutrients_per_100g(&raw.nutriments),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> ProductResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn found_product_is_normalized() {
        let resp = parse(json!({
            "status": 1,
            "product": {
                "product_name": "Crunchy Peanut Butter",
                "brands": "Acme",
                "nutriments": {
                    "energy-kcal_100g": 588,
                    "fat_100g": "50.4",
                    "saturated-fat_100g": 10.1,
                    "carbohydrates_100g": 20,
                    "proteins_100g": 25,
                    "sodium_100g": 0.43,
                    "sugars_100g": 9.2,
                    "fiber_100g": 6
                }
            }
        }));
        let p = into_product("3017620422003", resp).unwrap();
        assert_eq!(p.name, "Crunchy Peanut Butter");
        assert_eq!(p.brands.as_deref(), Some("Acme"));
        assert_eq!(p.per_100g.calories, 588.0);
        assert_eq!(p.per_100g.fat, 50.4);
        assert_eq!(p.per_100g.saturated_fat, 10.1);
        assert_eq!(p.per_100g.sodium, 0.43);
    }

    #[test]
    fn missing_and_garbage_fields_become_zero() {
        let resp = parse(json!({
            "status": 1,
            "product": {
                "product_name": "Plain Water",
                "nutriments": {
                    "energy-kcal_100g": null,
                    "fat_100g": "n/a",
                    "proteins_100g": -1
                }
            }
        }));
        let p = into_product("00000000", resp).unwrap();
        assert_eq!(p.per_100g, NutrientRecord::ZERO);
    }

    #[test]
    fn status_zero_means_not_found() {
        let resp = parse(json!({ "status": 0, "status_verbose": "product not found" }));
        assert!(into_product("12345678", resp).is_none());
    }

    #[test]
    fn blank_name_gets_placeholder() {
        let resp = parse(json!({ "status": 1, "product": { "product_name": "  " } }));
        let p = into_product("12345678", resp).unwrap();
        assert_eq!(p.name, "Unknown product");
        assert_eq!(p.per_100g.sugars, 0.0);
    }

    #[test]
    fn null_nutriments_read_as_empty() {
        let resp = parse(json!({
            "status": 1,
            "product": { "product_name": "Mystery Bar", "nutriments": null }
        }));
        let p = into_product("12345678", resp).unwrap();
        assert_eq!(p.name, "Mystery Bar");
        assert_eq!(p.per_100g, NutrientRecord::ZERO);
    }
}
