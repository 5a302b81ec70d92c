use sea_orm_migration::prelude::*;

pub use m20250301_000011_seed_ingredient_units::DEFAULT_UNITS;

/// Embedded schema migrator. The schema is owned by the crate so tests and
/// deployments run the exact same DDL.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_ingredient_units_table::Migration),
            Box::new(m20250301_000002_create_ingredients_table::Migration),
            Box::new(m20250301_000003_create_recipes_table::Migration),
            Box::new(m20250301_000004_create_recipe_ingredients_table::Migration),
            Box::new(m20250301_000005_create_meals_table::Migration),
            Box::new(m20250301_000006_create_meal_recipes_table::Migration),
            Box::new(m20250301_000007_create_menu_weeks_table::Migration),
            Box::new(m20250301_000008_create_menu_items_table::Migration),
            Box::new(m20250301_000009_create_orders_table::Migration),
            Box::new(m20250301_000010_create_order_items_table::Migration),
            Box::new(m20250301_000011_seed_ingredient_units::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_ingredient_units_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_ingredient_units_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(IngredientUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(IngredientUnits::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(IngredientUnits::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(IngredientUnits::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(IngredientUnits::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum IngredientUnits {
        Table,
        Id,
        Name,
        CreatedAt,
    }
}

mod m20250301_000002_create_ingredients_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_ingredient_units_table::IngredientUnits;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_ingredients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Ingredients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Ingredients::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Ingredients::Name).string().not_null())
                        .col(
                            ColumnDef::new(Ingredients::Quantity)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Ingredients::UnitId).uuid().not_null())
                        .col(
                            ColumnDef::new(Ingredients::CostPerUnit)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Ingredients::Currency).string().not_null())
                        .col(ColumnDef::new(Ingredients::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Ingredients::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ingredients_unit_id")
                                .from(Ingredients::Table, Ingredients::UnitId)
                                .to(IngredientUnits::Table, IngredientUnits::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ingredients_name")
                        .table(Ingredients::Table)
                        .col(Ingredients::Name)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ingredients_unit_id")
                        .table(Ingredients::Table)
                        .col(Ingredients::UnitId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Ingredients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Ingredients {
        Table,
        Id,
        Name,
        Quantity,
        UnitId,
        CostPerUnit,
        Currency,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_recipes_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_recipes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Recipes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Recipes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Recipes::Name).string().not_null())
                        .col(
                            ColumnDef::new(Recipes::Instructions)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Recipes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Recipes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipes_name")
                        .table(Recipes::Table)
                        .col(Recipes::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Recipes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Recipes {
        Table,
        Id,
        Name,
        Instructions,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000004_create_recipe_ingredients_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_ingredient_units_table::IngredientUnits;
    use super::m20250301_000002_create_ingredients_table::Ingredients;
    use super::m20250301_000003_create_recipes_table::Recipes;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_recipe_ingredients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RecipeIngredients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RecipeIngredients::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RecipeIngredients::RecipeId).uuid().not_null())
                        .col(ColumnDef::new(RecipeIngredients::IngredientId).uuid().null())
                        .col(
                            ColumnDef::new(RecipeIngredients::IngredientName)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(RecipeIngredients::UnitId).uuid().null())
                        .col(
                            ColumnDef::new(RecipeIngredients::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeIngredients::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recipe_ingredients_recipe_id")
                                .from(RecipeIngredients::Table, RecipeIngredients::RecipeId)
                                .to(Recipes::Table, Recipes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recipe_ingredients_ingredient_id")
                                .from(RecipeIngredients::Table, RecipeIngredients::IngredientId)
                                .to(Ingredients::Table, Ingredients::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recipe_ingredients_unit_id")
                                .from(RecipeIngredients::Table, RecipeIngredients::UnitId)
                                .to(IngredientUnits::Table, IngredientUnits::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipe_ingredients_recipe_id")
                        .table(RecipeIngredients::Table)
                        .col(RecipeIngredients::RecipeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipe_ingredients_ingredient_id")
                        .table(RecipeIngredients::Table)
                        .col(RecipeIngredients::IngredientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RecipeIngredients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum RecipeIngredients {
        Table,
        Id,
        RecipeId,
        IngredientId,
        IngredientName,
        UnitId,
        Quantity,
        CreatedAt,
    }
}

mod m20250301_000005_create_meals_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_meals_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Meals::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Meals::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Meals::Name).string().not_null())
                        .col(
                            ColumnDef::new(Meals::Description)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Meals::CustomerPrice).decimal().null())
                        .col(ColumnDef::new(Meals::Currency).string().not_null())
                        .col(ColumnDef::new(Meals::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Meals::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Meals::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Meals {
        Table,
        Id,
        Name,
        Description,
        CustomerPrice,
        Currency,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000006_create_meal_recipes_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000003_create_recipes_table::Recipes;
    use super::m20250301_000005_create_meals_table::Meals;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000006_create_meal_recipes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MealRecipes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MealRecipes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MealRecipes::MealId).uuid().not_null())
                        .col(ColumnDef::new(MealRecipes::RecipeId).uuid().not_null())
                        .col(
                            ColumnDef::new(MealRecipes::Quantity)
                                .decimal()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(MealRecipes::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_meal_recipes_meal_id")
                                .from(MealRecipes::Table, MealRecipes::MealId)
                                .to(Meals::Table, Meals::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_meal_recipes_recipe_id")
                                .from(MealRecipes::Table, MealRecipes::RecipeId)
                                .to(Recipes::Table, Recipes::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_meal_recipes_meal_id")
                        .table(MealRecipes::Table)
                        .col(MealRecipes::MealId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_meal_recipes_recipe_id")
                        .table(MealRecipes::Table)
                        .col(MealRecipes::RecipeId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MealRecipes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MealRecipes {
        Table,
        Id,
        MealId,
        RecipeId,
        Quantity,
        CreatedAt,
    }
}

mod m20250301_000007_create_menu_weeks_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000007_create_menu_weeks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MenuWeeks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(MenuWeeks::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(MenuWeeks::Name).string().not_null())
                        .col(ColumnDef::new(MenuWeeks::StartDate).date().not_null())
                        .col(
                            ColumnDef::new(MenuWeeks::IsActive)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(MenuWeeks::IsArchived)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(MenuWeeks::ArchivedAt).timestamp().null())
                        .col(ColumnDef::new(MenuWeeks::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menu_weeks_is_active")
                        .table(MenuWeeks::Table)
                        .col(MenuWeeks::IsActive)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MenuWeeks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MenuWeeks {
        Table,
        Id,
        Name,
        StartDate,
        IsActive,
        IsArchived,
        ArchivedAt,
        CreatedAt,
    }
}

mod m20250301_000008_create_menu_items_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000005_create_meals_table::Meals;
    use super::m20250301_000007_create_menu_weeks_table::MenuWeeks;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000008_create_menu_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MenuItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(MenuItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(MenuItems::MenuWeekId).uuid().not_null())
                        .col(ColumnDef::new(MenuItems::MealId).uuid().null())
                        .col(ColumnDef::new(MenuItems::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_items_menu_week_id")
                                .from(MenuItems::Table, MenuItems::MenuWeekId)
                                .to(MenuWeeks::Table, MenuWeeks::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_items_meal_id")
                                .from(MenuItems::Table, MenuItems::MealId)
                                .to(Meals::Table, Meals::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menu_items_menu_week_id")
                        .table(MenuItems::Table)
                        .col(MenuItems::MenuWeekId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MenuItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MenuItems {
        Table,
        Id,
        MenuWeekId,
        MealId,
        CreatedAt,
    }
}

mod m20250301_000009_create_orders_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000007_create_menu_weeks_table::MenuWeeks;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000009_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(Orders::CustomerName)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Orders::MenuWeekId).uuid().null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(
                            ColumnDef::new(Orders::TotalPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TotalCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TotalProfit)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Currency).string().not_null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_menu_week_id")
                                .from(Orders::Table, Orders::MenuWeekId)
                                .to(MenuWeeks::Table, MenuWeeks::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_menu_week_id")
                        .table(Orders::Table)
                        .col(Orders::MenuWeekId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        CustomerId,
        CustomerName,
        MenuWeekId,
        Status,
        TotalPrice,
        TotalCost,
        TotalProfit,
        Currency,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000010_create_order_items_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000008_create_menu_items_table::MenuItems;
    use super::m20250301_000009_create_orders_table::Orders;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000010_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::MenuItemId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::MealName)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::UnitCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::LinePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::LineCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::LineProfit)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(OrderItems::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(OrderItems::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_menu_item_id")
                                .from(OrderItems::Table, OrderItems::MenuItemId)
                                .to(MenuItems::Table, MenuItems::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_menu_item_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::MenuItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItems {
        Table,
        Id,
        OrderId,
        MenuItemId,
        Quantity,
        MealName,
        UnitPrice,
        UnitCost,
        LinePrice,
        LineCost,
        LineProfit,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000011_seed_ingredient_units {

    use chrono::Utc;
    use sea_orm_migration::prelude::*;
    use uuid::Uuid;

    use super::m20250301_000001_create_ingredient_units_table::IngredientUnits;

    /// The standard measurement units every deployment starts with.
    pub const DEFAULT_UNITS: [&str; 14] = [
        "Pounds",
        "Ounces",
        "Grams",
        "Kilograms",
        "Milligrams",
        "Milliliters",
        "Liters",
        "Teaspoons",
        "Tablespoons",
        "Cups",
        "Pints",
        "Quarts",
        "Gallons",
        "Quantity/Count",
    ];

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000011_seed_ingredient_units"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut insert = Query::insert()
                .into_table(IngredientUnits::Table)
                .columns([
                    IngredientUnits::Id,
                    IngredientUnits::Name,
                    IngredientUnits::CreatedAt,
                ])
                .to_owned();

            let now = Utc::now();
            for name in DEFAULT_UNITS {
                insert.values_panic([Uuid::new_v4().into(), name.into(), now.into()]);
            }

            manager.exec_stmt(insert).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .exec_stmt(
                    Query::delete()
                        .from_table(IngredientUnits::Table)
                        .cond_where(Expr::col(IngredientUnits::Name).is_in(DEFAULT_UNITS))
                        .to_owned(),
                )
                .await
        }
    }
}
