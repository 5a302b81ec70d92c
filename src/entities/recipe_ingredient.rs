use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::IngredientRef;

/// One ingredient line of a recipe. The ingredient reference is polymorphic:
/// either `ingredient_id` points at the catalog, or `ingredient_name` +
/// `unit_id` describe an ingredient the catalog does not carry yet. A saved
/// line holds exactly one of the two forms.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_ingredients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub ingredient_id: Option<Uuid>,
    pub ingredient_name: String,
    pub unit_id: Option<Uuid>,
    /// Amount needed for one batch of the recipe.
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn ingredient_ref(&self) -> IngredientRef {
        IngredientRef::from_parts(self.ingredient_id, &self.ingredient_name, self.unit_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id"
    )]
    Recipe,
    #[sea_orm(
        belongs_to = "super::ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::ingredient::Column::Id"
    )]
    Ingredient,
    #[sea_orm(
        belongs_to = "super::ingredient_unit::Entity",
        from = "Column::UnitId",
        to = "super::ingredient_unit::Column::Id"
    )]
    Unit,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredient.def()
    }
}

impl Related<super::ingredient_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
