use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn empty_collections() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// A catalog dish, serialized with the public field names clients expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    #[serde(rename = "categoryName", default)]
    pub category_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
    #[serde(rename = "isPopular", default)]
    pub is_popular: bool,
    pub name: String,
    /// `price`, `star` and `time` are stored as they appear in the catalog
    /// (number, string or null) and are never read by ranking.
    #[serde(default)]
    pub price: serde_json::Value,
    #[serde(default)]
    pub star: serde_json::Value,
    #[serde(default)]
    pub time: serde_json::Value,
    #[serde(default)]
    pub cuisine_type: String,
    #[serde(default)]
    pub dish_characteristics: Vec<String>,
    #[serde(default)]
    pub main_ingredients: Vec<String>,
    /// Nested metadata block, passed through untouched
    #[serde(rename = "__collections__", default = "empty_collections")]
    pub collections: serde_json::Value,
}

impl Dish {
    /// Text fed to the embedding model: name, description, category and ingredients.
    pub fn representation(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.description,
            self.category_name,
            self.main_ingredients.join(" ")
        )
    }

    /// Lower-cased fields searched by the ranking keyword matcher.
    pub fn ranking_fields(&self) -> [String; 5] {
        [
            self.name.to_lowercase(),
            self.description.to_lowercase(),
            self.category_name.to_lowercase(),
            self.main_ingredients.join(" ").to_lowercase(),
            self.dish_characteristics.join(" ").to_lowercase(),
        ]
    }

    /// Lower-cased fields searched by the fallback substring search.
    pub fn fallback_fields(&self) -> [String; 6] {
        [
            self.category_name.to_lowercase(),
            self.description.to_lowercase(),
            self.name.to_lowercase(),
            self.cuisine_type.to_lowercase(),
            self.dish_characteristics.join(" ").to_lowercase(),
            self.main_ingredients.join(" ").to_lowercase(),
        ]
    }
}

/// The read-only set of dishes, in the order they appear in the source file.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<(String, Dish)>,
}

impl Catalog {
    pub fn new(entries: Vec<(String, Dish)>) -> Self {
        Self { entries }
    }

    /// Parse a `{ "<key>": { ...dish... }, ... }` document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| ApiError::CatalogLoad(format!("Catalog is not a JSON object: {}", e)))?;

        let entries = raw
            .into_iter()
            .map(|(key, value)| {
                serde_json::from_value::<Dish>(value)
                    .map(|dish| (key.clone(), dish))
                    .map_err(|e| ApiError::CatalogLoad(format!("Invalid dish '{}': {}", key, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ApiError::CatalogLoad(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Dish> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, dish)| dish)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn dishes(&self) -> impl ExactSizeIterator<Item = &Dish> {
        self.entries.iter().map(|(_, dish)| dish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "pho": {
            "categoryName": "Soup",
            "description": "Warm beef noodle soup",
            "imageUrl": "https://img/pho.png",
            "isDeleted": false,
            "isPopular": true,
            "name": "Pho",
            "price": "45000",
            "star": 4.8,
            "time": 30,
            "cuisine_type": "Vietnamese",
            "dish_characteristics": ["warm", "comforting"],
            "main_ingredients": ["beef", "rice noodles"],
            "__collections__": {"reviews": {"a": 1}}
        },
        "salad": {
            "categoryName": "Salad",
            "description": "Fresh greens",
            "name": "Garden Salad",
            "price": 30000,
            "star": "4.1",
            "time": "10 mins"
        }
    }"#;

    #[test]
    fn test_catalog_preserves_file_order() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["pho", "salad"]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_stored_values_come_back_unchanged() {
        let catalog = Catalog::from_json(CATALOG).unwrap();

        let pho = serde_json::to_value(catalog.get("pho").unwrap()).unwrap();
        assert_eq!(pho["price"], serde_json::json!("45000"));
        assert_eq!(pho["star"], serde_json::json!(4.8));
        assert_eq!(pho["time"], serde_json::json!(30));

        let salad = serde_json::to_value(catalog.get("salad").unwrap()).unwrap();
        assert_eq!(salad["price"], serde_json::json!(30000));
        assert_eq!(salad["star"], serde_json::json!("4.1"));
        assert_eq!(salad["time"], serde_json::json!("10 mins"));

        let salad = catalog.get("salad").unwrap();
        assert!(salad.main_ingredients.is_empty());
        assert_eq!(salad.collections, serde_json::json!({}));
    }

    #[test]
    fn test_null_or_missing_values_load() {
        let catalog = Catalog::from_json(
            r#"{"tea": {"name": "Tea", "price": null, "time": null}}"#,
        )
        .unwrap();
        let tea = catalog.get("tea").unwrap();
        assert!(tea.price.is_null());
        assert!(tea.star.is_null());
        assert!(tea.time.is_null());
    }

    #[test]
    fn test_public_field_names_round_trip() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let json = serde_json::to_value(catalog.get("pho").unwrap()).unwrap();
        assert_eq!(json["categoryName"], "Soup");
        assert_eq!(json["isPopular"], true);
        assert_eq!(json["__collections__"]["reviews"]["a"], 1);
        assert!(json.get("category_name").is_none());
    }

    #[test]
    fn test_representation_and_fields() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let pho = catalog.get("pho").unwrap();
        assert_eq!(
            pho.representation(),
            "Pho Warm beef noodle soup Soup beef rice noodles"
        );
        assert_eq!(pho.ranking_fields()[4], "warm comforting");
        assert_eq!(pho.fallback_fields()[3], "vietnamese");
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        assert!(matches!(
            Catalog::from_json("[1, 2]"),
            Err(ApiError::CatalogLoad(_))
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"x": {"description": "no name"}}"#),
            Err(ApiError::CatalogLoad(_))
        ));
    }
}
