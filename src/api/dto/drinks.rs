/*
 * Responsibility
 * - Drinks の request/response DTO
 * - recipe の正規化 (array / single object / JSON 文字列を許容)
 * - validation (形式チェック) 用の validate() を持たせる
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    // Omitted in the public short form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub color: String,
    pub parts: i64,
}

#[derive(Debug, Serialize)]
pub struct DrinkResponse {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl DrinkResponse {
    /// Full representation, including ingredient names.
    pub fn long(id: i64, title: String, recipe: Vec<Ingredient>) -> Self {
        Self { id, title, recipe }
    }

    /// Public representation: ingredient names withheld.
    pub fn short(id: i64, title: String, recipe: Vec<Ingredient>) -> Self {
        let recipe = recipe
            .into_iter()
            .map(|i| Ingredient { name: None, ..i })
            .collect();

        Self { id, title, recipe }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksEnvelope {
    pub success: bool,
    pub drinks: Vec<DrinkResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeleteEnvelope {
    pub success: bool,
    pub delete: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: String,
    #[serde(default)]
    pub recipe: Value,
}

impl CreateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    // None: field missing (keep the stored recipe)
    #[serde(default)]
    pub recipe: Option<Value>,
}

impl UpdateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        match &self.title {
            None => Err("title is required"),
            Some(t) if t.trim().is_empty() => Err("title cannot be empty"),
            Some(_) => Ok(()),
        }
    }
}

/// Bring a submitted recipe into the stored shape: a non-empty JSON array of
/// ingredients. A single ingredient object and a JSON-encoded string of
/// either form are accepted as well.
pub fn normalize_recipe(recipe: &Value) -> Result<Vec<Ingredient>, &'static str> {
    let candidate = match recipe {
        Value::String(raw) => {
            serde_json::from_str::<Value>(raw).map_err(|_| "recipe is not valid JSON")?
        }
        other => other.clone(),
    };

    let items = match candidate {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => return Err("recipe must be an ingredient or a list of ingredients"),
    };

    if items.is_empty() {
        return Err("recipe must contain at least one ingredient");
    }

    serde_json::from_value::<Vec<Ingredient>>(Value::Array(items))
        .map_err(|_| "every ingredient needs a color and parts")
}
