pub mod catalog;
pub mod fulfillment;
pub mod meals;
pub mod menus;
pub mod orders;
pub mod recipes;

pub use catalog::{CatalogService, ResolvedIngredient};
pub use fulfillment::{FulfillmentService, ShoppingList, ShoppingListEntry};
pub use meals::{MealCost, MealService};
pub use menus::MenuService;
pub use orders::OrderService;
pub use recipes::{RecipeCost, RecipeService};
