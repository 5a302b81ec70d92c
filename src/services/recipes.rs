use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        ingredient::Entity as IngredientEntity,
        ingredient_unit::Entity as IngredientUnitEntity,
        meal_recipe::{self, Entity as MealRecipeEntity},
        recipe::{self, Entity as RecipeEntity},
        recipe_ingredient::{self, Entity as RecipeIngredientEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{IngredientRef, Money},
    services::catalog::CatalogService,
};

/// One ingredient line of a recipe payload. Either `ingredient_id` (catalog
/// link) or `ingredient_name` + `unit_id` (free text) must be usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeLineInput {
    pub ingredient_id: Option<Uuid>,
    pub ingredient_name: Option<String>,
    pub unit_id: Option<Uuid>,
    pub quantity: Decimal,
}

/// Payload for creating or updating a recipe. Lines replace the existing set
/// wholesale; they are validated together before anything is written.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SaveRecipeRequest {
    #[validate(length(min = 1, max = 200, message = "Recipe name is required"))]
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub lines: Vec<RecipeLineInput>,
}

/// Cost of one batch of a recipe. Unresolved lines contribute zero and are
/// counted so callers can warn that the total is understated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCost {
    pub total: Money,
    pub unresolved_lines: u32,
}

/// Service for recipes and their ingredient lines, including batch costing
/// and stock-shortage queries.
#[derive(Clone)]
pub struct RecipeService {
    db: Arc<DatabaseConnection>,
    catalog: Arc<CatalogService>,
    event_sender: Option<Arc<EventSender>>,
}

impl RecipeService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        catalog: Arc<CatalogService>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            catalog,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(recipe_name = %request.name))]
    pub async fn create_recipe(
        &self,
        request: SaveRecipeRequest,
    ) -> Result<(recipe::Model, Vec<recipe_ingredient::Model>), ServiceError> {
        let canonical_lines = Self::validate_request(&request)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        Self::check_line_references(&txn, &canonical_lines).await?;

        let recipe_id = Uuid::new_v4();
        let recipe = recipe::ActiveModel {
            id: Set(recipe_id),
            name: Set(request.name.trim().to_string()),
            instructions: Set(request.instructions.clone()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = recipe.insert(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to create recipe");
            ServiceError::db_error(e)
        })?;

        let lines = Self::insert_lines(&txn, recipe_id, &canonical_lines).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(recipe_id = %recipe_id, line_count = lines.len(), "Recipe created");
        self.emit(Event::RecipeSaved(recipe_id)).await;
        Ok((created, lines))
    }

    /// Updates a recipe, replacing its entire line set.
    #[instrument(skip(self, request), fields(recipe_id = %recipe_id))]
    pub async fn update_recipe(
        &self,
        recipe_id: Uuid,
        request: SaveRecipeRequest,
    ) -> Result<(recipe::Model, Vec<recipe_ingredient::Model>), ServiceError> {
        let canonical_lines = Self::validate_request(&request)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let existing = RecipeEntity::find_by_id(recipe_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {recipe_id} not found")))?;

        Self::check_line_references(&txn, &canonical_lines).await?;

        let mut active: recipe::ActiveModel = existing.into();
        active.name = Set(request.name.trim().to_string());
        active.instructions = Set(request.instructions.clone());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        RecipeIngredientEntity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let lines = Self::insert_lines(&txn, recipe_id, &canonical_lines).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(recipe_id = %recipe_id, line_count = lines.len(), "Recipe updated");
        self.emit(Event::RecipeSaved(recipe_id)).await;
        Ok((updated, lines))
    }

    #[instrument(skip(self))]
    pub async fn get_recipe(
        &self,
        recipe_id: Uuid,
    ) -> Result<(recipe::Model, Vec<recipe_ingredient::Model>), ServiceError> {
        let db = &*self.db;
        let recipe = RecipeEntity::find_by_id(recipe_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {recipe_id} not found")))?;
        let lines = Self::lines_of_in(db, recipe_id).await?;
        Ok((recipe, lines))
    }

    #[instrument(skip(self))]
    pub async fn list_recipes(&self) -> Result<Vec<recipe::Model>, ServiceError> {
        RecipeEntity::find()
            .order_by_asc(recipe::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletes a recipe and its lines. Fails while any meal still includes
    /// the recipe.
    #[instrument(skip(self))]
    pub async fn delete_recipe(&self, recipe_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let recipe = RecipeEntity::find_by_id(recipe_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {recipe_id} not found")))?;

        let meal_refs = MealRecipeEntity::find()
            .filter(meal_recipe::Column::RecipeId.eq(recipe_id))
            .count(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if meal_refs > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Recipe \"{}\" is referenced by {} meal(s)",
                recipe.name, meal_refs
            )));
        }

        RecipeIngredientEntity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        RecipeEntity::delete_by_id(recipe_id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(recipe_id = %recipe_id, "Recipe deleted");
        self.emit(Event::RecipeDeleted(recipe_id)).await;
        Ok(())
    }

    // --- Costing ---

    /// Cost of one batch: Σ quantity × cost_per_unit over resolved lines.
    /// Unresolved lines are skipped, not errors — an incomplete recipe still
    /// has a defined (possibly understated) cost.
    #[instrument(skip(self))]
    pub async fn calculate_cost(&self, recipe_id: Uuid) -> Result<RecipeCost, ServiceError> {
        self.calculate_cost_in(&*self.db, recipe_id).await
    }

    pub(crate) async fn calculate_cost_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        recipe_id: Uuid,
    ) -> Result<RecipeCost, ServiceError> {
        let lines = Self::lines_of_in(conn, recipe_id).await?;

        let mut total = Money::zero(self.catalog.currency().to_string());
        let mut unresolved_lines = 0u32;

        for line in &lines {
            let resolved = self.catalog.resolve_reference_in(conn, line).await?;
            match resolved.unit_cost() {
                Some(unit_cost) => {
                    total = total.add(&unit_cost.mul_decimal(line.quantity))?;
                }
                None => unresolved_lines += 1,
            }
        }

        Ok(RecipeCost {
            total,
            unresolved_lines,
        })
    }

    /// How much of a line's ingredient is missing from stock. Unresolved
    /// lines are 100% short. Cost and availability are independent: this
    /// never feeds into `calculate_cost`.
    #[instrument(skip(self, line), fields(line_id = %line.id))]
    pub async fn missing_amount(
        &self,
        line: &recipe_ingredient::Model,
    ) -> Result<Decimal, ServiceError> {
        let resolved = self.catalog.resolve_reference(line).await?;
        let missing = match resolved.quantity_in_stock() {
            Some(stock) => (line.quantity - stock).max(Decimal::ZERO),
            None => line.quantity,
        };
        Ok(missing)
    }

    #[instrument(skip(self, line), fields(line_id = %line.id))]
    pub async fn is_in_stock(
        &self,
        line: &recipe_ingredient::Model,
    ) -> Result<bool, ServiceError> {
        Ok(self.missing_amount(line).await?.is_zero())
    }

    pub(crate) async fn lines_of_in<C: ConnectionTrait>(
        conn: &C,
        recipe_id: Uuid,
    ) -> Result<Vec<recipe_ingredient::Model>, ServiceError> {
        RecipeIngredientEntity::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_ingredient::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Validates the payload and canonicalizes every line (a direct catalog
    /// reference clears the free-text fields). Nothing is persisted until
    /// every line passes.
    fn validate_request(
        request: &SaveRecipeRequest,
    ) -> Result<Vec<(IngredientRef, Decimal)>, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let mut canonical = Vec::with_capacity(request.lines.len());
        for (index, line) in request.lines.iter().enumerate() {
            let reference = IngredientRef::from_parts(
                line.ingredient_id,
                line.ingredient_name.as_deref().unwrap_or(""),
                line.unit_id,
            );
            reference
                .validate_for_save()
                .map_err(|e| ServiceError::ValidationError(format!("line {}: {e}", index + 1)))?;
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: quantity must be positive",
                    index + 1
                )));
            }
            canonical.push((reference, line.quantity));
        }
        Ok(canonical)
    }

    /// Confirms every referenced catalog row exists before lines are written.
    async fn check_line_references<C: ConnectionTrait>(
        conn: &C,
        lines: &[(IngredientRef, Decimal)],
    ) -> Result<(), ServiceError> {
        for (reference, _) in lines {
            match reference {
                IngredientRef::Direct(ingredient_id) => {
                    IngredientEntity::find_by_id(*ingredient_id)
                        .one(conn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Ingredient {ingredient_id} not found"))
                        })?;
                }
                IngredientRef::FreeText {
                    unit_id: Some(unit_id),
                    ..
                } => {
                    IngredientUnitEntity::find_by_id(*unit_id)
                        .one(conn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Unit {unit_id} not found"))
                        })?;
                }
                IngredientRef::FreeText { unit_id: None, .. } => {}
            }
        }
        Ok(())
    }

    async fn insert_lines<C: ConnectionTrait>(
        conn: &C,
        recipe_id: Uuid,
        lines: &[(IngredientRef, Decimal)],
    ) -> Result<Vec<recipe_ingredient::Model>, ServiceError> {
        let mut created = Vec::with_capacity(lines.len());
        for (reference, quantity) in lines {
            let (ingredient_id, ingredient_name, unit_id) = match reference {
                IngredientRef::Direct(id) => (Some(*id), String::new(), None),
                IngredientRef::FreeText { name, unit_id } => (None, name.clone(), *unit_id),
            };

            let line = recipe_ingredient::ActiveModel {
                id: Set(Uuid::new_v4()),
                recipe_id: Set(recipe_id),
                ingredient_id: Set(ingredient_id),
                ingredient_name: Set(ingredient_name),
                unit_id: Set(unit_id),
                quantity: Set(*quantity),
                created_at: Set(Utc::now()),
            };
            created.push(line.insert(conn).await.map_err(ServiceError::db_error)?);
        }
        Ok(created)
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send recipe event");
            }
        }
    }
}
