use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        meal_recipe::{self, Entity as MealRecipeEntity},
        menu_item::Entity as MenuItemEntity,
        menu_week::Entity as MenuWeekEntity,
        order::{self, Entity as OrderEntity},
        order_item::{self, Entity as OrderItemEntity},
        recipe_ingredient::{self, Entity as RecipeIngredientEntity},
    },
    errors::ServiceError,
    models::OrderStatus,
    services::catalog::CatalogService,
};

/// Aggregated need for one ingredient name. The unit is carried for display
/// only; it never disambiguates buckets and no conversion is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub quantity: Decimal,
    pub unit: String,
}

/// Consolidated grocery list for one week's paid orders, keyed by ingredient
/// display name. BTreeMap keeps iteration in name order for presentation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingList {
    pub entries: BTreeMap<String, ShoppingListEntry>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&ShoppingListEntry> {
        self.entries.get(name)
    }
}

/// Batch-fulfillment reporting: how much of every ingredient the chef must
/// have on hand to cook a week's paid orders.
#[derive(Clone)]
pub struct FulfillmentService {
    db: Arc<DatabaseConnection>,
    catalog: Arc<CatalogService>,
}

impl FulfillmentService {
    pub fn new(db: Arc<DatabaseConnection>, catalog: Arc<CatalogService>) -> Self {
        Self { db, catalog }
    }

    /// Walks order item → menu item → meal → recipe → ingredient line for
    /// every PAID order of the week and sums the three-level quantity
    /// product (per-batch amount × servings per meal × meals ordered) per
    /// ingredient display name.
    ///
    /// All reads happen inside one transaction so quantities and catalog
    /// state are mutually consistent for the whole pass.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, menu_week_id: Uuid) -> Result<ShoppingList, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        MenuWeekEntity::find_by_id(menu_week_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Menu week {menu_week_id} not found"))
            })?;

        let paid_orders = OrderEntity::find()
            .filter(order::Column::MenuWeekId.eq(menu_week_id))
            .filter(order::Column::Status.eq(OrderStatus::Paid))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let mut list = ShoppingList::default();

        for paid_order in &paid_orders {
            let items = OrderItemEntity::find()
                .filter(order_item::Column::OrderId.eq(paid_order.id))
                .all(&txn)
                .await
                .map_err(ServiceError::db_error)?;

            for item in items {
                let menu_item = MenuItemEntity::find_by_id(item.menu_item_id)
                    .one(&txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                // Unassigned (or vanished) menu items contribute nothing.
                let Some(meal_id) = menu_item.and_then(|mi| mi.meal_id) else {
                    continue;
                };

                let meal_recipes = MealRecipeEntity::find()
                    .filter(meal_recipe::Column::MealId.eq(meal_id))
                    .all(&txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                for meal_recipe in &meal_recipes {
                    let lines = RecipeIngredientEntity::find()
                        .filter(recipe_ingredient::Column::RecipeId.eq(meal_recipe.recipe_id))
                        .all(&txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    for line in &lines {
                        let resolved = self.catalog.resolve_reference_in(&txn, line).await?;
                        let name = resolved.display_name().trim();
                        if name.is_empty() {
                            continue;
                        }

                        let needed =
                            line.quantity * meal_recipe.quantity * Decimal::from(item.quantity);

                        list.entries
                            .entry(name.to_string())
                            .and_modify(|entry| entry.quantity += needed)
                            .or_insert_with(|| ShoppingListEntry {
                                quantity: needed,
                                unit: resolved.unit_name().to_string(),
                            });
                    }
                }
            }
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(
            menu_week_id = %menu_week_id,
            paid_orders = paid_orders.len(),
            distinct_ingredients = list.len(),
            "Fulfillment aggregation complete"
        );
        Ok(list)
    }
}
