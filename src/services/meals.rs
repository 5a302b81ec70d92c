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
        meal::{self, Entity as MealEntity},
        meal_recipe::{self, Entity as MealRecipeEntity},
        menu_item::{self, Entity as MenuItemEntity},
        recipe::Entity as RecipeEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::Money,
    services::recipes::RecipeService,
};

/// One recipe line of a meal payload. `quantity` is the servings multiplier
/// and defaults to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecipeInput {
    pub recipe_id: Uuid,
    pub quantity: Option<Decimal>,
}

/// Payload for creating or updating a meal. Recipe lines replace the
/// existing set wholesale.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SaveMealRequest {
    #[validate(length(min = 1, max = 200, message = "Meal name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub customer_price: Option<Decimal>,
    #[serde(default)]
    pub recipes: Vec<MealRecipeInput>,
}

/// Cost of one meal: Σ recipe cost × servings multiplier, with the combined
/// unresolved-line count of its recipes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCost {
    pub total: Money,
    pub unresolved_lines: u32,
}

/// Service for meals (recipe collections with a customer price) and their
/// derived cost and profit figures.
#[derive(Clone)]
pub struct MealService {
    db: Arc<DatabaseConnection>,
    recipes: Arc<RecipeService>,
    event_sender: Option<Arc<EventSender>>,
    currency: String,
}

impl MealService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        recipes: Arc<RecipeService>,
        event_sender: Option<Arc<EventSender>>,
        currency: String,
    ) -> Self {
        Self {
            db,
            recipes,
            event_sender,
            currency,
        }
    }

    #[instrument(skip(self, request), fields(meal_name = %request.name))]
    pub async fn create_meal(
        &self,
        request: SaveMealRequest,
    ) -> Result<(meal::Model, Vec<meal_recipe::Model>), ServiceError> {
        Self::validate_request(&request)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        Self::check_recipes_exist(&txn, &request.recipes).await?;

        let meal_id = Uuid::new_v4();
        let meal = meal::ActiveModel {
            id: Set(meal_id),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description.clone()),
            customer_price: Set(request.customer_price),
            currency: Set(self.currency.clone()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = meal.insert(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to create meal");
            ServiceError::db_error(e)
        })?;

        let lines = Self::insert_lines(&txn, meal_id, &request.recipes).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(meal_id = %meal_id, recipe_count = lines.len(), "Meal created");
        self.emit(Event::MealSaved(meal_id)).await;
        Ok((created, lines))
    }

    /// Updates a meal, replacing its entire recipe line set.
    #[instrument(skip(self, request), fields(meal_id = %meal_id))]
    pub async fn update_meal(
        &self,
        meal_id: Uuid,
        request: SaveMealRequest,
    ) -> Result<(meal::Model, Vec<meal_recipe::Model>), ServiceError> {
        Self::validate_request(&request)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let existing = MealEntity::find_by_id(meal_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Meal {meal_id} not found")))?;

        Self::check_recipes_exist(&txn, &request.recipes).await?;

        let mut active: meal::ActiveModel = existing.into();
        active.name = Set(request.name.trim().to_string());
        active.description = Set(request.description.clone());
        active.customer_price = Set(request.customer_price);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        MealRecipeEntity::delete_many()
            .filter(meal_recipe::Column::MealId.eq(meal_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let lines = Self::insert_lines(&txn, meal_id, &request.recipes).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(meal_id = %meal_id, recipe_count = lines.len(), "Meal updated");
        self.emit(Event::MealSaved(meal_id)).await;
        Ok((updated, lines))
    }

    #[instrument(skip(self))]
    pub async fn get_meal(
        &self,
        meal_id: Uuid,
    ) -> Result<(meal::Model, Vec<meal_recipe::Model>), ServiceError> {
        let db = &*self.db;
        let meal = MealEntity::find_by_id(meal_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Meal {meal_id} not found")))?;
        let lines = Self::lines_of_in(db, meal_id).await?;
        Ok((meal, lines))
    }

    #[instrument(skip(self))]
    pub async fn list_meals(&self) -> Result<Vec<meal::Model>, ServiceError> {
        MealEntity::find()
            .order_by_asc(meal::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletes a meal and its recipe lines. Fails while any menu item still
    /// offers the meal.
    #[instrument(skip(self))]
    pub async fn delete_meal(&self, meal_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let meal = MealEntity::find_by_id(meal_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Meal {meal_id} not found")))?;

        let menu_refs = MenuItemEntity::find()
            .filter(menu_item::Column::MealId.eq(meal_id))
            .count(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if menu_refs > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Meal \"{}\" is referenced by {} menu item(s)",
                meal.name, menu_refs
            )));
        }

        MealRecipeEntity::delete_many()
            .filter(meal_recipe::Column::MealId.eq(meal_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        MealEntity::delete_by_id(meal_id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(meal_id = %meal_id, "Meal deleted");
        self.emit(Event::MealDeleted(meal_id)).await;
        Ok(())
    }

    // --- Costing ---

    /// Cost of one meal: Σ recipe cost × servings multiplier.
    #[instrument(skip(self))]
    pub async fn calculate_cost(&self, meal_id: Uuid) -> Result<MealCost, ServiceError> {
        self.calculate_cost_in(&*self.db, meal_id).await
    }

    pub(crate) async fn calculate_cost_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        meal_id: Uuid,
    ) -> Result<MealCost, ServiceError> {
        let lines = Self::lines_of_in(conn, meal_id).await?;

        let mut total = Money::zero(self.currency.clone());
        let mut unresolved_lines = 0u32;

        for line in &lines {
            let recipe_cost = self.recipes.calculate_cost_in(conn, line.recipe_id).await?;
            total = total.add(&recipe_cost.total.mul_decimal(line.quantity))?;
            unresolved_lines += recipe_cost.unresolved_lines;
        }

        Ok(MealCost {
            total,
            unresolved_lines,
        })
    }

    /// Projected profit: (customer price or zero) minus cost. Negative is a
    /// valid signal, not an error.
    #[instrument(skip(self))]
    pub async fn projected_profit(&self, meal_id: Uuid) -> Result<Money, ServiceError> {
        let db = &*self.db;
        let meal = MealEntity::find_by_id(meal_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Meal {meal_id} not found")))?;

        let cost = self.calculate_cost_in(db, meal_id).await?;
        meal.price_or_zero().subtract(&cost.total)
    }

    pub(crate) async fn lines_of_in<C: ConnectionTrait>(
        conn: &C,
        meal_id: Uuid,
    ) -> Result<Vec<meal_recipe::Model>, ServiceError> {
        MealRecipeEntity::find()
            .filter(meal_recipe::Column::MealId.eq(meal_id))
            .order_by_asc(meal_recipe::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    fn validate_request(request: &SaveMealRequest) -> Result<(), ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if let Some(price) = request.customer_price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Customer price cannot be negative".to_string(),
                ));
            }
        }
        for (index, line) in request.recipes.iter().enumerate() {
            if let Some(quantity) = line.quantity {
                if quantity <= Decimal::ZERO {
                    return Err(ServiceError::ValidationError(format!(
                        "line {}: servings must be positive",
                        index + 1
                    )));
                }
            }
        }
        Ok(())
    }

    async fn check_recipes_exist<C: ConnectionTrait>(
        conn: &C,
        lines: &[MealRecipeInput],
    ) -> Result<(), ServiceError> {
        for line in lines {
            RecipeEntity::find_by_id(line.recipe_id)
                .one(conn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Recipe {} not found", line.recipe_id))
                })?;
        }
        Ok(())
    }

    async fn insert_lines<C: ConnectionTrait>(
        conn: &C,
        meal_id: Uuid,
        lines: &[MealRecipeInput],
    ) -> Result<Vec<meal_recipe::Model>, ServiceError> {
        let mut created = Vec::with_capacity(lines.len());
        for line in lines {
            let meal_recipe = meal_recipe::ActiveModel {
                id: Set(Uuid::new_v4()),
                meal_id: Set(meal_id),
                recipe_id: Set(line.recipe_id),
                quantity: Set(line.quantity.unwrap_or(Decimal::ONE)),
                created_at: Set(Utc::now()),
            };
            created.push(meal_recipe.insert(conn).await.map_err(ServiceError::db_error)?);
        }
        Ok(created)
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send meal event");
            }
        }
    }
}
