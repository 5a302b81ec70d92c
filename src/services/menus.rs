use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        meal::Entity as MealEntity,
        menu_item::{self, Entity as MenuItemEntity},
        menu_week::{self, Entity as MenuWeekEntity},
        order_item::{self, Entity as OrderItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::Money,
    services::meals::MealService,
};

/// Payload for creating an ordering window.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateMenuWeekRequest {
    #[validate(length(min = 1, max = 100, message = "Week name is required"))]
    pub name: String,
    pub start_date: NaiveDate,
    /// Activate immediately, deactivating every other non-archived week.
    #[serde(default)]
    pub activate: bool,
}

/// Service for menu weeks and the items offered on them.
#[derive(Clone)]
pub struct MenuService {
    db: Arc<DatabaseConnection>,
    meals: Arc<MealService>,
    event_sender: Option<Arc<EventSender>>,
}

impl MenuService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        meals: Arc<MealService>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            meals,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(week_name = %request.name))]
    pub async fn create_week(
        &self,
        request: CreateMenuWeekRequest,
    ) -> Result<menu_week::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        if request.activate {
            Self::deactivate_siblings(&txn, None).await?;
        }

        let week = menu_week::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            start_date: Set(request.start_date),
            is_active: Set(request.activate),
            is_archived: Set(false),
            archived_at: Set(None),
            created_at: Set(Utc::now()),
        };
        let created = week.insert(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to create menu week");
            ServiceError::db_error(e)
        })?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(week_id = %created.id, active = created.is_active, "Menu week created");
        if created.is_active {
            self.emit(Event::MenuWeekActivated(created.id)).await;
        }
        Ok(created)
    }

    /// Makes `week_id` the single active non-archived week by first clearing
    /// the flag on every sibling. Exclusivity is enforced only here, at
    /// activation time; two concurrent activations race last-writer-wins.
    #[instrument(skip(self))]
    pub async fn activate_week(&self, week_id: Uuid) -> Result<menu_week::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let week = MenuWeekEntity::find_by_id(week_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu week {week_id} not found")))?;

        if week.is_archived {
            return Err(ServiceError::InvalidOperation(format!(
                "Menu week \"{}\" is archived and cannot be activated",
                week.name
            )));
        }

        Self::deactivate_siblings(&txn, Some(week_id)).await?;

        let mut active: menu_week::ActiveModel = week.into();
        active.is_active = Set(true);
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(week_id = %week_id, "Menu week activated");
        self.emit(Event::MenuWeekActivated(week_id)).await;
        Ok(updated)
    }

    /// Archives a week: deactivates it, marks it archived and stamps the
    /// time. Irreversible; archiving twice is an error.
    #[instrument(skip(self))]
    pub async fn archive_week(&self, week_id: Uuid) -> Result<menu_week::Model, ServiceError> {
        let db = &*self.db;

        let week = MenuWeekEntity::find_by_id(week_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu week {week_id} not found")))?;

        if week.is_archived {
            return Err(ServiceError::InvalidOperation(format!(
                "Menu week \"{}\" is already archived",
                week.name
            )));
        }

        let mut active: menu_week::ActiveModel = week.into();
        active.is_active = Set(false);
        active.is_archived = Set(true);
        active.archived_at = Set(Some(Utc::now()));
        let archived = active.update(db).await.map_err(ServiceError::db_error)?;

        info!(week_id = %week_id, "Menu week archived");
        self.emit(Event::MenuWeekArchived(week_id)).await;
        Ok(archived)
    }

    /// The currently active non-archived week, if any.
    #[instrument(skip(self))]
    pub async fn active_week(&self) -> Result<Option<menu_week::Model>, ServiceError> {
        MenuWeekEntity::find()
            .filter(menu_week::Column::IsActive.eq(true))
            .filter(menu_week::Column::IsArchived.eq(false))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get_week(&self, week_id: Uuid) -> Result<menu_week::Model, ServiceError> {
        MenuWeekEntity::find_by_id(week_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu week {week_id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn list_weeks(&self) -> Result<Vec<menu_week::Model>, ServiceError> {
        MenuWeekEntity::find()
            .order_by_desc(menu_week::Column::StartDate)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    // --- Menu items ---

    /// Offers a meal on a week. `meal_id` may be empty while the item is
    /// still being configured.
    #[instrument(skip(self))]
    pub async fn add_menu_item(
        &self,
        week_id: Uuid,
        meal_id: Option<Uuid>,
    ) -> Result<menu_item::Model, ServiceError> {
        let db = &*self.db;

        let week = self.get_week(week_id).await?;
        if week.is_archived {
            return Err(ServiceError::InvalidOperation(format!(
                "Menu week \"{}\" is archived",
                week.name
            )));
        }
        if let Some(meal_id) = meal_id {
            Self::check_meal_exists(db, meal_id).await?;
        }

        let item = menu_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            menu_week_id: Set(week_id),
            meal_id: Set(meal_id),
            created_at: Set(Utc::now()),
        };
        let created = item.insert(db).await.map_err(ServiceError::db_error)?;

        info!(menu_item_id = %created.id, week_id = %week_id, "Menu item added");
        Ok(created)
    }

    /// Points a menu item at a meal (or back to unassigned).
    #[instrument(skip(self))]
    pub async fn assign_meal(
        &self,
        menu_item_id: Uuid,
        meal_id: Option<Uuid>,
    ) -> Result<menu_item::Model, ServiceError> {
        let db = &*self.db;

        let item = self.get_menu_item(menu_item_id).await?;
        if let Some(meal_id) = meal_id {
            Self::check_meal_exists(db, meal_id).await?;
        }

        let mut active: menu_item::ActiveModel = item.into();
        active.meal_id = Set(meal_id);
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        info!(menu_item_id = %menu_item_id, "Menu item reassigned");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_menu_item(&self, menu_item_id: Uuid) -> Result<menu_item::Model, ServiceError> {
        MenuItemEntity::find_by_id(menu_item_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {menu_item_id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn list_menu_items(
        &self,
        week_id: Uuid,
    ) -> Result<Vec<menu_item::Model>, ServiceError> {
        MenuItemEntity::find()
            .filter(menu_item::Column::MenuWeekId.eq(week_id))
            .order_by_asc(menu_item::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Removes a menu item. Fails while any order line references it.
    #[instrument(skip(self))]
    pub async fn remove_menu_item(&self, menu_item_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let item = self.get_menu_item(menu_item_id).await?;

        let order_refs = OrderItemEntity::find()
            .filter(order_item::Column::MenuItemId.eq(menu_item_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if order_refs > 0 {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Menu item {} is referenced by {} order line(s)",
                item.id, order_refs
            )));
        }

        MenuItemEntity::delete_by_id(menu_item_id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(menu_item_id = %menu_item_id, "Menu item removed");
        Ok(())
    }

    /// Display helper: profit the chef can expect from one sale of the item.
    /// `None` while the item is unassigned or the meal has no price.
    #[instrument(skip(self, item), fields(menu_item_id = %item.id))]
    pub async fn projected_profit(
        &self,
        item: &menu_item::Model,
    ) -> Result<Option<Money>, ServiceError> {
        let Some(meal_id) = item.meal_id else {
            return Ok(None);
        };
        let (meal, _) = self.meals.get_meal(meal_id).await?;
        if meal.customer_price.is_none() {
            return Ok(None);
        }
        Ok(Some(self.meals.projected_profit(meal_id).await?))
    }

    async fn deactivate_siblings<C: sea_orm::ConnectionTrait>(
        conn: &C,
        keep: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut update = MenuWeekEntity::update_many()
            .col_expr(menu_week::Column::IsActive, Expr::value(false))
            .filter(menu_week::Column::IsArchived.eq(false));
        if let Some(keep) = keep {
            update = update.filter(menu_week::Column::Id.ne(keep));
        }
        update.exec(conn).await.map_err(ServiceError::db_error)?;
        Ok(())
    }

    async fn check_meal_exists<C: sea_orm::ConnectionTrait>(
        conn: &C,
        meal_id: Uuid,
    ) -> Result<(), ServiceError> {
        MealEntity::find_by_id(meal_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Meal {meal_id} not found")))?;
        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send menu event");
            }
        }
    }
}
