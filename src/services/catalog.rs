use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        ingredient::{self, Entity as IngredientEntity},
        ingredient_unit::{self, Entity as IngredientUnitEntity},
        recipe_ingredient::{self, Entity as RecipeIngredientEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{IngredientRef, Money},
};

/// Payload for creating or updating a catalog ingredient.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SaveIngredientRequest {
    #[validate(length(min = 1, max = 100, message = "Ingredient name is required"))]
    pub name: String,
    pub quantity: Decimal,
    pub unit_id: Uuid,
    pub cost_per_unit: Decimal,
}

/// Outcome of resolving a recipe line's ingredient reference.
///
/// `Unresolved` is a defined state, not an error: costing skips the line and
/// the fulfillment report keys it by its free-text name.
#[derive(Debug, Clone)]
pub enum ResolvedIngredient {
    Resolved {
        ingredient: ingredient::Model,
        unit: ingredient_unit::Model,
    },
    Unresolved {
        name: String,
        unit: Option<ingredient_unit::Model>,
    },
}

impl ResolvedIngredient {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedIngredient::Resolved { .. })
    }

    /// Catalog name when resolved, the free-text name otherwise.
    pub fn display_name(&self) -> &str {
        match self {
            ResolvedIngredient::Resolved { ingredient, .. } => &ingredient.name,
            ResolvedIngredient::Unresolved { name, .. } => name,
        }
    }

    /// Unit name for display; empty when an unresolved line carries no unit.
    pub fn unit_name(&self) -> &str {
        match self {
            ResolvedIngredient::Resolved { unit, .. } => &unit.name,
            ResolvedIngredient::Unresolved { unit, .. } => {
                unit.as_ref().map(|u| u.name.as_str()).unwrap_or("")
            }
        }
    }

    pub fn unit_cost(&self) -> Option<Money> {
        match self {
            ResolvedIngredient::Resolved { ingredient, .. } => Some(ingredient.unit_cost()),
            ResolvedIngredient::Unresolved { .. } => None,
        }
    }

    pub fn quantity_in_stock(&self) -> Option<Decimal> {
        match self {
            ResolvedIngredient::Resolved { ingredient, .. } => Some(ingredient.quantity),
            ResolvedIngredient::Unresolved { .. } => None,
        }
    }
}

/// Service owning the ingredient catalog and its measurement units. Also the
/// home of ingredient reference resolution, which every costing path and the
/// fulfillment report go through.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
    currency: String,
}

impl CatalogService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Option<Arc<EventSender>>,
        currency: String,
    ) -> Self {
        Self {
            db,
            event_sender,
            currency,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    // --- Units ---

    /// Creates a measurement unit. Names are unique, compared
    /// case-insensitively.
    #[instrument(skip(self))]
    pub async fn create_unit(&self, name: &str) -> Result<ingredient_unit::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Unit name is required".to_string(),
            ));
        }

        let db = &*self.db;
        if Self::find_unit_by_name_in(db, name).await?.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "Unit \"{name}\" already exists"
            )));
        }

        let unit = ingredient_unit::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        };

        let created = unit.insert(db).await.map_err(|e| {
            error!(error = %e, unit_name = %name, "Failed to create ingredient unit");
            ServiceError::db_error(e)
        })?;

        info!(unit_id = %created.id, unit_name = %created.name, "Ingredient unit created");
        self.emit(Event::IngredientUnitSaved(created.id)).await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_units(&self) -> Result<Vec<ingredient_unit::Model>, ServiceError> {
        IngredientUnitEntity::find()
            .order_by_asc(ingredient_unit::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get_unit(&self, unit_id: Uuid) -> Result<ingredient_unit::Model, ServiceError> {
        IngredientUnitEntity::find_by_id(unit_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Unit {unit_id} not found")))
    }

    /// Deletes a unit. Fails while any ingredient or recipe line still
    /// measures in it.
    #[instrument(skip(self))]
    pub async fn delete_unit(&self, unit_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let unit = IngredientUnitEntity::find_by_id(unit_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Unit {unit_id} not found")))?;

        let ingredient_refs = IngredientEntity::find()
            .filter(ingredient::Column::UnitId.eq(unit_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let line_refs = RecipeIngredientEntity::find()
            .filter(recipe_ingredient::Column::UnitId.eq(unit_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if ingredient_refs > 0 || line_refs > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Unit \"{}\" is referenced by {} ingredient(s) and {} recipe line(s)",
                unit.name, ingredient_refs, line_refs
            )));
        }

        unit.delete(db).await.map_err(ServiceError::db_error)?;
        info!(unit_id = %unit_id, "Ingredient unit deleted");
        self.emit(Event::IngredientUnitDeleted(unit_id)).await;
        Ok(())
    }

    // --- Ingredients ---

    #[instrument(skip(self, request), fields(ingredient_name = %request.name))]
    pub async fn create_ingredient(
        &self,
        request: SaveIngredientRequest,
    ) -> Result<ingredient::Model, ServiceError> {
        self.validate_ingredient_request(&request)?;

        let db = &*self.db;
        // The unit must exist before anything is written.
        self.get_unit(request.unit_id).await?;

        let ingredient = ingredient::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            quantity: Set(request.quantity),
            unit_id: Set(request.unit_id),
            cost_per_unit: Set(request.cost_per_unit),
            currency: Set(self.currency.clone()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = ingredient.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to create ingredient");
            ServiceError::db_error(e)
        })?;

        info!(ingredient_id = %created.id, ingredient_name = %created.name, "Ingredient created");
        self.emit(Event::IngredientSaved(created.id)).await;
        Ok(created)
    }

    #[instrument(skip(self, request), fields(ingredient_id = %ingredient_id))]
    pub async fn update_ingredient(
        &self,
        ingredient_id: Uuid,
        request: SaveIngredientRequest,
    ) -> Result<ingredient::Model, ServiceError> {
        self.validate_ingredient_request(&request)?;

        let db = &*self.db;
        let existing = self.get_ingredient(ingredient_id).await?;
        self.get_unit(request.unit_id).await?;

        let mut active: ingredient::ActiveModel = existing.into();
        active.name = Set(request.name.trim().to_string());
        active.quantity = Set(request.quantity);
        active.unit_id = Set(request.unit_id);
        active.cost_per_unit = Set(request.cost_per_unit);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, ingredient_id = %ingredient_id, "Failed to update ingredient");
            ServiceError::db_error(e)
        })?;

        info!(ingredient_id = %ingredient_id, "Ingredient updated");
        self.emit(Event::IngredientSaved(ingredient_id)).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_ingredient(
        &self,
        ingredient_id: Uuid,
    ) -> Result<ingredient::Model, ServiceError> {
        IngredientEntity::find_by_id(ingredient_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Ingredient {ingredient_id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn list_ingredients(&self) -> Result<Vec<ingredient::Model>, ServiceError> {
        IngredientEntity::find()
            .order_by_asc(ingredient::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletes an ingredient. Fails while any recipe line references it
    /// directly; free-text lines never block (they are not links).
    #[instrument(skip(self))]
    pub async fn delete_ingredient(&self, ingredient_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let ingredient = self.get_ingredient(ingredient_id).await?;

        let line_refs = RecipeIngredientEntity::find()
            .filter(recipe_ingredient::Column::IngredientId.eq(ingredient_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if line_refs > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Ingredient \"{}\" is referenced by {} recipe line(s)",
                ingredient.name, line_refs
            )));
        }

        ingredient.delete(db).await.map_err(ServiceError::db_error)?;
        info!(ingredient_id = %ingredient_id, "Ingredient deleted");
        self.emit(Event::IngredientDeleted(ingredient_id)).await;
        Ok(())
    }

    /// Case-insensitive exact-name lookup. First match (oldest row) wins.
    #[instrument(skip(self))]
    pub async fn find_ingredient_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ingredient::Model>, ServiceError> {
        Self::find_ingredient_by_name_in(&*self.db, name).await
    }

    // --- Reference resolution ---

    /// Resolves a recipe line against the catalog (see
    /// [`ResolvedIngredient`]). Pure per-call: nothing is cached across
    /// catalog mutations.
    #[instrument(skip(self, line), fields(line_id = %line.id))]
    pub async fn resolve_reference(
        &self,
        line: &recipe_ingredient::Model,
    ) -> Result<ResolvedIngredient, ServiceError> {
        self.resolve_reference_in(&*self.db, line).await
    }

    /// Transaction-scoped variant: costing and aggregation run every lookup
    /// of one pass on the same connection so the snapshot stays consistent.
    pub(crate) async fn resolve_reference_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        line: &recipe_ingredient::Model,
    ) -> Result<ResolvedIngredient, ServiceError> {
        match line.ingredient_ref() {
            IngredientRef::Direct(ingredient_id) => {
                let ingredient = IngredientEntity::find_by_id(ingredient_id)
                    .one(conn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Ingredient {ingredient_id} not found"))
                    })?;
                let unit = Self::unit_of_in(conn, &ingredient).await?;
                Ok(ResolvedIngredient::Resolved { ingredient, unit })
            }
            IngredientRef::FreeText { name, unit_id } => {
                if !name.is_empty() {
                    if let Some(ingredient) = Self::find_ingredient_by_name_in(conn, &name).await? {
                        let unit = Self::unit_of_in(conn, &ingredient).await?;
                        return Ok(ResolvedIngredient::Resolved { ingredient, unit });
                    }
                }

                let unit = match unit_id {
                    Some(id) => IngredientUnitEntity::find_by_id(id)
                        .one(conn)
                        .await
                        .map_err(ServiceError::db_error)?,
                    None => None,
                };
                Ok(ResolvedIngredient::Unresolved { name, unit })
            }
        }
    }

    async fn find_ingredient_by_name_in<C: ConnectionTrait>(
        conn: &C,
        name: &str,
    ) -> Result<Option<ingredient::Model>, ServiceError> {
        IngredientEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(ingredient::Column::Name)))
                    .eq(name.trim().to_lowercase()),
            )
            .order_by_asc(ingredient::Column::CreatedAt)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn find_unit_by_name_in<C: ConnectionTrait>(
        conn: &C,
        name: &str,
    ) -> Result<Option<ingredient_unit::Model>, ServiceError> {
        IngredientUnitEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(ingredient_unit::Column::Name)))
                    .eq(name.trim().to_lowercase()),
            )
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn unit_of_in<C: ConnectionTrait>(
        conn: &C,
        ingredient: &ingredient::Model,
    ) -> Result<ingredient_unit::Model, ServiceError> {
        IngredientUnitEntity::find_by_id(ingredient.unit_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Unit {} not found", ingredient.unit_id))
            })
    }

    fn validate_ingredient_request(&self, request: &SaveIngredientRequest) -> Result<(), ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Stock quantity cannot be negative".to_string(),
            ));
        }
        if request.cost_per_unit < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Cost per unit cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send catalog event");
            }
        }
    }
}
