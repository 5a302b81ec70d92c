#![allow(dead_code)]

use rust_decimal::Decimal;
use uuid::Uuid;

use mealdrop_api::config::AppConfig;
use mealdrop_api::entities::{ingredient, ingredient_unit};
use mealdrop_api::services::catalog::SaveIngredientRequest;
use mealdrop_api::services::recipes::{RecipeLineInput, SaveRecipeRequest};
use mealdrop_api::AppState;

/// Fresh application state over an in-memory SQLite database with the full
/// migration set (including the unit seed) applied.
pub async fn setup() -> AppState {
    let mut config = AppConfig::new("sqlite::memory:", "test");
    config.db_max_connections = 1;
    config.db_min_connections = 1;
    config.auto_migrate = true;

    mealdrop_api::logging::init_tracing(&config);

    AppState::new(config).await.expect("failed to build test app state")
}

/// Looks up one of the seeded measurement units by name.
pub async fn seeded_unit(app: &AppState, name: &str) -> ingredient_unit::Model {
    app.services
        .catalog
        .list_units()
        .await
        .expect("failed to list units")
        .into_iter()
        .find(|u| u.name == name)
        .unwrap_or_else(|| panic!("seeded unit {name} missing"))
}

pub async fn create_ingredient(
    app: &AppState,
    name: &str,
    stock: Decimal,
    unit_id: Uuid,
    cost_per_unit: Decimal,
) -> ingredient::Model {
    app.services
        .catalog
        .create_ingredient(SaveIngredientRequest {
            name: name.to_string(),
            quantity: stock,
            unit_id,
            cost_per_unit,
        })
        .await
        .expect("failed to create ingredient")
}

/// A recipe line pointing straight at a catalog ingredient.
pub fn direct_line(ingredient_id: Uuid, quantity: Decimal) -> RecipeLineInput {
    RecipeLineInput {
        ingredient_id: Some(ingredient_id),
        ingredient_name: None,
        unit_id: None,
        quantity,
    }
}

/// A free-text recipe line with an explicit unit.
pub fn free_text_line(name: &str, unit_id: Uuid, quantity: Decimal) -> RecipeLineInput {
    RecipeLineInput {
        ingredient_id: None,
        ingredient_name: Some(name.to_string()),
        unit_id: Some(unit_id),
        quantity,
    }
}

pub fn recipe_request(name: &str, lines: Vec<RecipeLineInput>) -> SaveRecipeRequest {
    SaveRecipeRequest {
        name: name.to_string(),
        instructions: String::new(),
        lines,
    }
}
