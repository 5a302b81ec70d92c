//! Catalog tests: unit seeding, ingredient reference resolution and the
//! referential-integrity rules guarding deletes.

mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;

use mealdrop_api::errors::ServiceError;
use mealdrop_api::migrator::DEFAULT_UNITS;
use mealdrop_api::services::catalog::ResolvedIngredient;

use common::{create_ingredient, direct_line, free_text_line, recipe_request, seeded_unit, setup};

#[tokio::test]
async fn migrator_seeds_standard_units() {
    let app = setup().await;

    let units = app.services.catalog.list_units().await.unwrap();
    assert_eq!(units.len(), DEFAULT_UNITS.len());
    for name in DEFAULT_UNITS {
        assert!(
            units.iter().any(|u| u.name == name),
            "seeded unit {name} missing"
        );
    }
}

#[tokio::test]
async fn duplicate_unit_names_are_rejected_case_insensitively() {
    let app = setup().await;

    assert_matches!(
        app.services.catalog.create_unit("pounds").await,
        Err(ServiceError::ValidationError(_))
    );

    let created = app.services.catalog.create_unit("Bushels").await.unwrap();
    assert_eq!(created.name, "Bushels");
}

#[tokio::test]
async fn free_text_resolves_case_insensitively_against_the_catalog() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let flour = create_ingredient(&app, "Flour", dec!(10), pounds.id, dec!(0.50)).await;

    let (_, lines) = app
        .services
        .recipes
        .create_recipe(recipe_request(
            "Bread",
            vec![free_text_line("fLoUr", pounds.id, dec!(2))],
        ))
        .await
        .unwrap();

    let resolved = app.services.catalog.resolve_reference(&lines[0]).await.unwrap();
    assert_matches!(
        &resolved,
        ResolvedIngredient::Resolved { ingredient, unit }
            if ingredient.id == flour.id && unit.name == "Pounds"
    );
    // Display name comes from the catalog, not the free text.
    assert_eq!(resolved.display_name(), "Flour");
}

#[tokio::test]
async fn unmatched_free_text_stays_unresolved_with_its_unit() {
    let app = setup().await;
    let grams = seeded_unit(&app, "Grams").await;

    let (_, lines) = app
        .services
        .recipes
        .create_recipe(recipe_request(
            "Exotic Dish",
            vec![free_text_line("Dragonfruit", grams.id, dec!(4))],
        ))
        .await
        .unwrap();

    let resolved = app.services.catalog.resolve_reference(&lines[0]).await.unwrap();
    assert!(!resolved.is_resolved());
    assert_eq!(resolved.display_name(), "Dragonfruit");
    assert_eq!(resolved.unit_name(), "Grams");
    assert_eq!(resolved.unit_cost(), None);
}

#[tokio::test]
async fn direct_reference_clears_free_text_fields() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let flour = create_ingredient(&app, "Flour", dec!(10), pounds.id, dec!(0.50)).await;

    let mut line = direct_line(flour.id, dec!(1));
    line.ingredient_name = Some("stale free text".to_string());
    line.unit_id = Some(pounds.id);

    let (_, lines) = app
        .services
        .recipes
        .create_recipe(recipe_request("Bread", vec![line]))
        .await
        .unwrap();

    assert_eq!(lines[0].ingredient_id, Some(flour.id));
    assert_eq!(lines[0].ingredient_name, "");
    assert_eq!(lines[0].unit_id, None);
}

#[tokio::test]
async fn line_validation_rejects_incomplete_references() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;

    // Neither a direct reference nor free text.
    let empty = mealdrop_api::services::recipes::RecipeLineInput {
        ingredient_id: None,
        ingredient_name: None,
        unit_id: Some(pounds.id),
        quantity: dec!(1),
    };
    assert_matches!(
        app.services
            .recipes
            .create_recipe(recipe_request("Broken", vec![empty]))
            .await,
        Err(ServiceError::ValidationError(_))
    );

    // Free text without a unit.
    let unitless = mealdrop_api::services::recipes::RecipeLineInput {
        ingredient_id: None,
        ingredient_name: Some("Saffron".to_string()),
        unit_id: None,
        quantity: dec!(1),
    };
    assert_matches!(
        app.services
            .recipes
            .create_recipe(recipe_request("Broken", vec![unitless]))
            .await,
        Err(ServiceError::ValidationError(_))
    );

    // Nothing was persisted along the way.
    assert!(app.services.recipes.list_recipes().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_directly_referenced_ingredient_fails() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let flour = create_ingredient(&app, "Flour", dec!(10), pounds.id, dec!(0.50)).await;

    let (recipe, _) = app
        .services
        .recipes
        .create_recipe(recipe_request("Bread", vec![direct_line(flour.id, dec!(2))]))
        .await
        .unwrap();

    assert_matches!(
        app.services.catalog.delete_ingredient(flour.id).await,
        Err(ServiceError::ReferentialIntegrity(_))
    );

    // Once the recipe is gone the delete goes through.
    app.services.recipes.delete_recipe(recipe.id).await.unwrap();
    app.services.catalog.delete_ingredient(flour.id).await.unwrap();
}

#[tokio::test]
async fn free_text_lines_do_not_block_ingredient_deletion() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    let flour = create_ingredient(&app, "Flour", dec!(10), pounds.id, dec!(0.50)).await;

    // The line names the same ingredient but carries no direct link.
    app.services
        .recipes
        .create_recipe(recipe_request(
            "Bread",
            vec![free_text_line("Flour", pounds.id, dec!(2))],
        ))
        .await
        .unwrap();

    app.services.catalog.delete_ingredient(flour.id).await.unwrap();
}

#[tokio::test]
async fn deleting_a_referenced_unit_fails() {
    let app = setup().await;
    let bushels = app.services.catalog.create_unit("Bushels").await.unwrap();
    let apples = create_ingredient(&app, "Apples", dec!(3), bushels.id, dec!(8.00)).await;

    assert_matches!(
        app.services.catalog.delete_unit(bushels.id).await,
        Err(ServiceError::ReferentialIntegrity(_))
    );

    app.services.catalog.delete_ingredient(apples.id).await.unwrap();
    app.services.catalog.delete_unit(bushels.id).await.unwrap();
}

#[tokio::test]
async fn deleting_a_unit_referenced_by_a_free_text_line_fails() {
    let app = setup().await;
    let firkins = app.services.catalog.create_unit("Firkins").await.unwrap();

    app.services
        .recipes
        .create_recipe(recipe_request(
            "Ale Bread",
            vec![free_text_line("Ale", firkins.id, dec!(1))],
        ))
        .await
        .unwrap();

    assert_matches!(
        app.services.catalog.delete_unit(firkins.id).await,
        Err(ServiceError::ReferentialIntegrity(_))
    );
}

#[tokio::test]
async fn ingredient_lookup_is_exact_but_case_insensitive() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;
    create_ingredient(&app, "flour", dec!(5), pounds.id, dec!(0.40)).await;

    let found = app
        .services
        .catalog
        .find_ingredient_by_name("FLOUR")
        .await
        .unwrap();
    assert!(found.is_some());

    // Substrings and typos do not match.
    assert!(app
        .services
        .catalog
        .find_ingredient_by_name("flou")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn negative_quantities_and_costs_are_rejected() {
    let app = setup().await;
    let pounds = seeded_unit(&app, "Pounds").await;

    let request = mealdrop_api::services::catalog::SaveIngredientRequest {
        name: "Flour".to_string(),
        quantity: dec!(-1),
        unit_id: pounds.id,
        cost_per_unit: dec!(0.50),
    };
    assert_matches!(
        app.services.catalog.create_ingredient(request).await,
        Err(ServiceError::ValidationError(_))
    );
}
