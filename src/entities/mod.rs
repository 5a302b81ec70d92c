pub mod ingredient;
pub mod ingredient_unit;
pub mod meal;
pub mod meal_recipe;
pub mod menu_item;
pub mod menu_week;
pub mod order;
pub mod order_item;
pub mod recipe;
pub mod recipe_ingredient;
