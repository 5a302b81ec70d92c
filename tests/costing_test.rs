//! Recipe and meal costing: additive sums, the lenient skip-on-unresolved
//! policy, multipliers, projected profit and stock-shortage queries.

mod common;

use rust_decimal_macros::dec;

use mealdrop_api::services::meals::{MealRecipeInput, SaveMealRequest};

use common::{create_ingredient, direct_line, free_text_line, recipe_request, seeded_unit, setup};

#[tokio::test]
async fn recipe_cost_sums_resolved_lines_and_skips_unresolved() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let grams = seeded_unit(&app, "Grams").await;
    let flour = create_ingredient(&app, "Flour", dec!(10), pounds.id, dec!(0.50)).await;

    // Flour is in the catalog; Yeast is not and contributes nothing.
    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request(
            "Bread",
            vec![
                direct_line(flour.id, dec!(2)),
                free_text_line("Yeast", grams.id, dec!(1)),
            ],
        ))
        .await
        .unwrap();

    let cost = app.services.recipes.calculate_cost(recipe.id).await.unwrap();
    assert_eq!(cost.total.amount, dec!(1.00));
    assert_eq!(cost.total.currency, "USD");
    assert_eq!(cost.unresolved_lines, 1);
}

#[tokio::test]
async fn free_text_lines_that_resolve_contribute_their_cost() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    create_ingredient(&app, "Sugar", dec!(4), pounds.id, dec!(1.25)).await;

    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request(
            "Syrup",
            vec![free_text_line("sugar", pounds.id, dec!(2))],
        ))
        .await
        .unwrap();

    let cost = app.services.recipes.calculate_cost(recipe.id).await.unwrap();
    assert_eq!(cost.total.amount, dec!(2.50));
    assert_eq!(cost.unresolved_lines, 0);
}

#[tokio::test]
async fn empty_recipe_costs_zero() {
    let app = setup().await;

    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request("Water", vec![]))
        .await
        .unwrap();

    let cost = app.services.recipes.calculate_cost(recipe.id).await.unwrap();
    assert!(cost.total.is_zero());
    assert_eq!(cost.unresolved_lines, 0);
}

#[tokio::test]
async fn meal_cost_multiplies_recipe_cost_by_servings() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let flour = create_ingredient(&app, "Flour", dec!(10), pounds.id, dec!(0.50)).await;

    // One batch costs $1.00.
    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request("Bread", vec![direct_line(flour.id, dec!(2))]))
        .await
        .unwrap();

    let (meal, _) = app
        .services
        .meals
        .create_meal(SaveMealRequest {
            name: "Bread Basket".to_string(),
            description: String::new(),
            customer_price: Some(dec!(5.00)),
            recipes: vec![MealRecipeInput {
                recipe_id: recipe.id,
                quantity: Some(dec!(3)),
            }],
        })
        .await
        .unwrap();

    let cost = app.services.meals.calculate_cost(meal.id).await.unwrap();
    assert_eq!(cost.total.amount, dec!(3.00));

    let profit = app.services.meals.projected_profit(meal.id).await.unwrap();
    assert_eq!(profit.amount, dec!(2.00));
}

#[tokio::test]
async fn unpriced_meal_profit_is_negative_cost() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let flour = create_ingredient(&app, "Flour", dec!(10), pounds.id, dec!(0.50)).await;

    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request("Bread", vec![direct_line(flour.id, dec!(6))]))
        .await
        .unwrap();

    let (meal, _) = app
        .services
        .meals
        .create_meal(SaveMealRequest {
            name: "Day-Old Bread".to_string(),
            description: String::new(),
            customer_price: None,
            recipes: vec![MealRecipeInput {
                recipe_id: recipe.id,
                quantity: None,
            }],
        })
        .await
        .unwrap();

    // price_or_zero() - cost: a loss, not an error.
    let profit = app.services.meals.projected_profit(meal.id).await.unwrap();
    assert_eq!(profit.amount, dec!(-3.00));
}

#[tokio::test]
async fn meal_cost_carries_unresolved_counts_up_from_recipes() {
    let app = setup().await;
    let grams = seeded_unit(&app, "Grams").await;

    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request(
            "Mystery Stew",
            vec![
                free_text_line("Eye of Newt", grams.id, dec!(3)),
                free_text_line("Wool of Bat", grams.id, dec!(2)),
            ],
        ))
        .await
        .unwrap();

    let (meal, _) = app
        .services
        .meals
        .create_meal(SaveMealRequest {
            name: "Witches' Special".to_string(),
            description: String::new(),
            customer_price: Some(dec!(9.99)),
            recipes: vec![MealRecipeInput {
                recipe_id: recipe.id,
                quantity: Some(dec!(2)),
            }],
        })
        .await
        .unwrap();

    let cost = app.services.meals.calculate_cost(meal.id).await.unwrap();
    assert!(cost.total.is_zero());
    assert_eq!(cost.unresolved_lines, 2);

    // Understated cost makes the whole price look like profit.
    let profit = app.services.meals.projected_profit(meal.id).await.unwrap();
    assert_eq!(profit.amount, dec!(9.99));
}

#[tokio::test]
async fn missing_amount_measures_the_stock_shortage() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let grams = seeded_unit(&app, "Grams").await;
    let flour = create_ingredient(&app, "Flour", dec!(5), pounds.id, dec!(0.50)).await;

    let (_, lines) = app
        .services
        .recipes
        .create_recipe(recipe_request(
            "Big Bake",
            vec![
                direct_line(flour.id, dec!(2)),
                direct_line(flour.id, dec!(8)),
                free_text_line("Yeast", grams.id, dec!(4)),
            ],
        ))
        .await
        .unwrap();

    // Stock 5 covers a need of 2.
    assert_eq!(
        app.services.recipes.missing_amount(&lines[0]).await.unwrap(),
        dec!(0)
    );
    assert!(app.services.recipes.is_in_stock(&lines[0]).await.unwrap());

    // Need 8, stock 5: short by 3.
    assert_eq!(
        app.services.recipes.missing_amount(&lines[1]).await.unwrap(),
        dec!(3)
    );
    assert!(!app.services.recipes.is_in_stock(&lines[1]).await.unwrap());

    // Unresolved lines are 100% short.
    assert_eq!(
        app.services.recipes.missing_amount(&lines[2]).await.unwrap(),
        dec!(4)
    );
    assert!(!app.services.recipes.is_in_stock(&lines[2]).await.unwrap());
}

#[tokio::test]
async fn cost_ignores_stock_levels() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    // Zero stock, but a known unit cost.
    let truffles = create_ingredient(&app, "Truffles", dec!(0), pounds.id, dec!(120.00)).await;

    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request(
            "Truffle Pasta",
            vec![direct_line(truffles.id, dec!(0.25))],
        ))
        .await
        .unwrap();

    let cost = app.services.recipes.calculate_cost(recipe.id).await.unwrap();
    assert_eq!(cost.total.amount, dec!(30.00));
}
