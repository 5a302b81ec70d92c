//! Order line pricing: creation-time snapshots, synchronous totals
//! recompute, idempotent re-saves and the forward-only status machine.

mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use uuid::Uuid;

use mealdrop_api::entities::{menu_item, menu_week};
use mealdrop_api::errors::ServiceError;
use mealdrop_api::models::OrderStatus;
use mealdrop_api::services::meals::{MealRecipeInput, SaveMealRequest};
use mealdrop_api::services::menus::CreateMenuWeekRequest;
use mealdrop_api::services::orders::{CreateOrderRequest, OrderLineRequest, SaveOrderItemRequest};
use mealdrop_api::AppState;

use common::{create_ingredient, direct_line, recipe_request, seeded_unit, setup};

/// Seeds an active week offering two meals:
/// "Bread Basket" priced $2.00 costing $1.00 and
/// "Feast" priced $3.00 costing $1.50.
async fn seed_storefront(app: &AppState) -> (menu_week::Model, menu_item::Model, menu_item::Model) {
    let pounds = seeded_unit(app, "Pounds").await;
    let flour = create_ingredient(app, "Flour", dec!(50), pounds.id, dec!(0.50)).await;

    let (basket_recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request("Bread", vec![direct_line(flour.id, dec!(2))]))
        .await
        .unwrap();
    let (feast_recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request("Feast Base", vec![direct_line(flour.id, dec!(3))]))
        .await
        .unwrap();

    let (basket, _) = app
        .services
        .meals
        .create_meal(meal_request("Bread Basket", Some(dec!(2.00)), basket_recipe.id))
        .await
        .unwrap();
    let (feast, _) = app
        .services
        .meals
        .create_meal(meal_request("Feast", Some(dec!(3.00)), feast_recipe.id))
        .await
        .unwrap();

    let week = app
        .services
        .menus
        .create_week(CreateMenuWeekRequest {
            name: "Week of March 3".to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            activate: true,
        })
        .await
        .unwrap();

    let basket_item = app
        .services
        .menus
        .add_menu_item(week.id, Some(basket.id))
        .await
        .unwrap();
    let feast_item = app
        .services
        .menus
        .add_menu_item(week.id, Some(feast.id))
        .await
        .unwrap();

    (week, basket_item, feast_item)
}

fn meal_request(name: &str, price: Option<rust_decimal::Decimal>, recipe_id: Uuid) -> SaveMealRequest {
    SaveMealRequest {
        name: name.to_string(),
        description: String::new(),
        customer_price: price,
        recipes: vec![MealRecipeInput {
            recipe_id,
            quantity: Some(dec!(1)),
        }],
    }
}

#[tokio::test]
async fn order_totals_are_the_sum_of_line_snapshots() {
    let app = setup().await;
    let (week, basket_item, feast_item) = seed_storefront(&app).await;

    let (order, items) = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            customer_name: "Ada".to_string(),
            lines: vec![
                OrderLineRequest {
                    menu_item_id: basket_item.id,
                    quantity: 1,
                },
                OrderLineRequest {
                    menu_item_id: feast_item.id,
                    quantity: 1,
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(order.menu_week_id, Some(week.id));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(items.len(), 2);

    let basket_line = &items[0];
    assert_eq!(basket_line.meal_name, "Bread Basket");
    assert_eq!(basket_line.unit_price, dec!(2.00));
    assert_eq!(basket_line.unit_cost, dec!(1.00));
    assert_eq!(basket_line.line_profit, dec!(1.00));

    assert_eq!(order.total_price, dec!(5.00));
    assert_eq!(order.total_cost, dec!(2.50));
    assert_eq!(order.total_profit, dec!(2.50));
}

#[tokio::test]
async fn line_amounts_scale_with_quantity() {
    let app = setup().await;
    let (_, basket_item, _) = seed_storefront(&app).await;

    let (order, items) = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            customer_name: String::new(),
            lines: vec![OrderLineRequest {
                menu_item_id: basket_item.id,
                quantity: 4,
            }],
        })
        .await
        .unwrap();

    assert_eq!(items[0].line_price, dec!(8.00));
    assert_eq!(items[0].line_cost, dec!(4.00));
    assert_eq!(order.total_profit, dec!(4.00));
}

#[tokio::test]
async fn resaving_with_the_same_quantity_is_idempotent() {
    let app = setup().await;
    let (_, basket_item, _) = seed_storefront(&app).await;

    let (order, items) = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            customer_name: String::new(),
            lines: vec![OrderLineRequest {
                menu_item_id: basket_item.id,
                quantity: 2,
            }],
        })
        .await
        .unwrap();

    let resaved = app
        .services
        .orders
        .save_order_item(SaveOrderItemRequest {
            order_item_id: Some(items[0].id),
            order_id: order.id,
            menu_item_id: basket_item.id,
            quantity: 2,
        })
        .await
        .unwrap();

    assert_eq!(resaved.unit_price, items[0].unit_price);
    assert_eq!(resaved.unit_cost, items[0].unit_cost);
    assert_eq!(resaved.line_price, items[0].line_price);
    assert_eq!(resaved.meal_name, items[0].meal_name);

    let (order, _) = app.services.orders.get_order(order.id).await.unwrap();
    assert_eq!(order.total_price, dec!(4.00));
}

#[tokio::test]
async fn resave_picks_up_price_changes_but_keeps_the_frozen_name() {
    let app = setup().await;
    let (_, basket_item, _) = seed_storefront(&app).await;

    let (order, items) = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            customer_name: String::new(),
            lines: vec![OrderLineRequest {
                menu_item_id: basket_item.id,
                quantity: 1,
            }],
        })
        .await
        .unwrap();
    assert_eq!(items[0].meal_name, "Bread Basket");

    // Rename and reprice the meal under the order.
    let meal_id = basket_item.meal_id.unwrap();
    let (meal, lines) = app.services.meals.get_meal(meal_id).await.unwrap();
    app.services
        .meals
        .update_meal(
            meal_id,
            SaveMealRequest {
                name: "Artisan Bread Basket".to_string(),
                description: meal.description,
                customer_price: Some(dec!(4.00)),
                recipes: lines
                    .iter()
                    .map(|l| MealRecipeInput {
                        recipe_id: l.recipe_id,
                        quantity: Some(l.quantity),
                    })
                    .collect(),
            },
        )
        .await
        .unwrap();

    // Until the line is saved again, the old snapshot stands.
    let (_, stale_items) = app.services.orders.get_order(order.id).await.unwrap();
    assert_eq!(stale_items[0].unit_price, dec!(2.00));

    let resaved = app
        .services
        .orders
        .save_order_item(SaveOrderItemRequest {
            order_item_id: Some(items[0].id),
            order_id: order.id,
            menu_item_id: basket_item.id,
            quantity: 1,
        })
        .await
        .unwrap();

    // Price re-snapshots; the name stays frozen at first save.
    assert_eq!(resaved.unit_price, dec!(4.00));
    assert_eq!(resaved.meal_name, "Bread Basket");

    let (order, _) = app.services.orders.get_order(order.id).await.unwrap();
    assert_eq!(order.total_price, dec!(4.00));
    assert_eq!(order.total_profit, dec!(3.00));
}

#[tokio::test]
async fn unassigned_menu_items_price_at_zero() {
    let app = setup().await;
    let (week, _, _) = seed_storefront(&app).await;

    let bare_item = app.services.menus.add_menu_item(week.id, None).await.unwrap();

    let (order, items) = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            customer_name: String::new(),
            lines: vec![OrderLineRequest {
                menu_item_id: bare_item.id,
                quantity: 3,
            }],
        })
        .await
        .unwrap();

    assert_eq!(items[0].meal_name, "");
    assert_eq!(items[0].unit_price, dec!(0));
    assert_eq!(items[0].unit_cost, dec!(0));
    assert_eq!(order.total_price, dec!(0));
}

#[tokio::test]
async fn orders_require_an_active_week_and_matching_items() {
    let app = setup().await;
    let (_, basket_item, _) = seed_storefront(&app).await;

    // A second, inactive week with its own item.
    let other_week = app
        .services
        .menus
        .create_week(CreateMenuWeekRequest {
            name: "Week of March 10".to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            activate: false,
        })
        .await
        .unwrap();
    let stray_item = app.services.menus.add_menu_item(other_week.id, None).await.unwrap();

    assert_matches!(
        app.services
            .orders
            .create_order(CreateOrderRequest {
                customer_id: Uuid::new_v4(),
                customer_name: String::new(),
                lines: vec![OrderLineRequest {
                    menu_item_id: stray_item.id,
                    quantity: 1,
                }],
            })
            .await,
        Err(ServiceError::ValidationError(_))
    );

    // An empty cart never creates an order shell.
    assert_matches!(
        app.services
            .orders
            .create_order(CreateOrderRequest {
                customer_id: Uuid::new_v4(),
                customer_name: String::new(),
                lines: vec![OrderLineRequest {
                    menu_item_id: basket_item.id,
                    quantity: 0,
                }],
            })
            .await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn status_machine_is_forward_only() {
    let app = setup().await;
    let (_, basket_item, _) = seed_storefront(&app).await;

    let (order, _) = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            customer_name: String::new(),
            lines: vec![OrderLineRequest {
                menu_item_id: basket_item.id,
                quantity: 1,
            }],
        })
        .await
        .unwrap();

    let paid = app
        .services
        .orders
        .update_status(order.id, OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);

    assert_matches!(
        app.services
            .orders
            .update_status(order.id, OrderStatus::Pending)
            .await,
        Err(ServiceError::InvalidStatus(_))
    );

    let fulfilled = app
        .services
        .orders
        .update_status(order.id, OrderStatus::Fulfilled)
        .await
        .unwrap();
    assert_eq!(fulfilled.status, OrderStatus::Fulfilled);

    assert_matches!(
        app.services
            .orders
            .update_status(order.id, OrderStatus::Paid)
            .await,
        Err(ServiceError::InvalidStatus(_))
    );
}

#[tokio::test]
async fn adding_a_line_to_an_existing_order_refreshes_totals() {
    let app = setup().await;
    let (_, basket_item, feast_item) = seed_storefront(&app).await;

    let (order, _) = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            customer_name: String::new(),
            lines: vec![OrderLineRequest {
                menu_item_id: basket_item.id,
                quantity: 1,
            }],
        })
        .await
        .unwrap();
    assert_eq!(order.total_price, dec!(2.00));

    app.services
        .orders
        .save_order_item(SaveOrderItemRequest {
            order_item_id: None,
            order_id: order.id,
            menu_item_id: feast_item.id,
            quantity: 2,
        })
        .await
        .unwrap();

    let (order, items) = app.services.orders.get_order(order.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(order.total_price, dec!(8.00));
    assert_eq!(order.total_cost, dec!(4.00));
    assert_eq!(order.total_profit, dec!(4.00));
}

#[tokio::test]
async fn meal_deletion_is_blocked_while_on_a_menu() {
    let app = setup().await;
    let (_, basket_item, _) = seed_storefront(&app).await;
    let meal_id = basket_item.meal_id.unwrap();

    assert_matches!(
        app.services.meals.delete_meal(meal_id).await,
        Err(ServiceError::ReferentialIntegrity(_))
    );

    // Unassigning the item lifts the block.
    app.services
        .menus
        .assign_meal(basket_item.id, None)
        .await
        .unwrap();
    app.services.meals.delete_meal(meal_id).await.unwrap();
}

#[tokio::test]
async fn recipe_deletion_is_blocked_while_in_a_meal() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let flour = create_ingredient(&app, "Flour", dec!(5), pounds.id, dec!(0.50)).await;

    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request("Bread", vec![direct_line(flour.id, dec!(1))]))
        .await
        .unwrap();
    let (meal, _) = app
        .services
        .meals
        .create_meal(meal_request("Basket", None, recipe.id))
        .await
        .unwrap();

    assert_matches!(
        app.services.recipes.delete_recipe(recipe.id).await,
        Err(ServiceError::ReferentialIntegrity(_))
    );

    app.services.meals.delete_meal(meal.id).await.unwrap();
    app.services.recipes.delete_recipe(recipe.id).await.unwrap();
}
