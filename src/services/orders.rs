use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        meal::{self, Entity as MealEntity},
        menu_item::{self, Entity as MenuItemEntity},
        menu_week::{self, Entity as MenuWeekEntity},
        order::{self, Entity as OrderEntity},
        order_item::{self, Entity as OrderItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Money, OrderStatus},
    services::meals::MealService,
};

/// One requested line of a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// Payload for placing an order against the active week.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    #[validate(length(max = 150, message = "Customer name is too long"))]
    #[serde(default)]
    pub customer_name: String,
    pub lines: Vec<OrderLineRequest>,
}

/// Payload for creating or re-saving a single order line.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveOrderItemRequest {
    /// Existing line to update; a new line is created when empty.
    pub order_item_id: Option<Uuid>,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// Service for customer orders: line pricing snapshots, derived totals and
/// the forward-only status machine.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    meals: Arc<MealService>,
    event_sender: Option<Arc<EventSender>>,
    currency: String,
}

impl OrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        meals: Arc<MealService>,
        event_sender: Option<Arc<EventSender>>,
        currency: String,
    ) -> Self {
        Self {
            db,
            meals,
            event_sender,
            currency,
        }
    }

    /// Places an order against the currently active week. Lines with a
    /// non-positive quantity are dropped; an order with no surviving line is
    /// rejected outright, so no empty shell is ever persisted.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<(order::Model, Vec<order_item::Model>), ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let lines: Vec<&OrderLineRequest> =
            request.lines.iter().filter(|l| l.quantity > 0).collect();
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "Order has no items".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let active_week = MenuWeekEntity::find()
            .filter(menu_week::Column::IsActive.eq(true))
            .filter(menu_week::Column::IsArchived.eq(false))
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::InvalidOperation("Ordering is currently closed".to_string())
            })?;

        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            customer_id: Set(request.customer_id),
            customer_name: Set(request.customer_name.trim().to_string()),
            menu_week_id: Set(Some(active_week.id)),
            status: Set(OrderStatus::Pending),
            total_price: Set(Decimal::ZERO),
            total_cost: Set(Decimal::ZERO),
            total_profit: Set(Decimal::ZERO),
            currency: Set(self.currency.clone()),
            ..Default::default()
        };
        let order = order.insert(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to create order");
            ServiceError::db_error(e)
        })?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let menu_item = Self::menu_item_in(&txn, line.menu_item_id).await?;
            if menu_item.menu_week_id != active_week.id {
                return Err(ServiceError::ValidationError(format!(
                    "Menu item {} is not offered this week",
                    menu_item.id
                )));
            }
            let item = self
                .write_item_snapshot(&txn, &order, &menu_item, line.quantity, None)
                .await?;
            items.push(item);
        }

        let order = self.recompute_totals_in(&txn, order_id).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(order_id = %order_id, item_count = items.len(), "Order created");
        self.emit(Event::OrderCreated(order_id)).await;
        Ok((order, items))
    }

    /// Creates or re-saves one order line, snapshotting the meal's current
    /// price and cost, then refreshes the parent order's totals — all inside
    /// one transaction, so the totals are never observably stale.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn save_order_item(
        &self,
        request: SaveOrderItemRequest,
    ) -> Result<order_item::Model, ServiceError> {
        if request.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let order = OrderEntity::find_by_id(request.order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", request.order_id))
            })?;

        let existing = match request.order_item_id {
            Some(item_id) => {
                let item = OrderItemEntity::find_by_id(item_id)
                    .one(&txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Order item {item_id} not found"))
                    })?;
                if item.order_id != order.id {
                    return Err(ServiceError::InvalidOperation(format!(
                        "Order item {item_id} does not belong to order {}",
                        order.id
                    )));
                }
                Some(item)
            }
            None => None,
        };

        let menu_item = Self::menu_item_in(&txn, request.menu_item_id).await?;
        let item = self
            .write_item_snapshot(&txn, &order, &menu_item, request.quantity, existing)
            .await?;

        self.recompute_totals_in(&txn, order.id).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(order_id = %order.id, order_item_id = %item.id, "Order item saved");
        self.emit(Event::OrderItemSaved {
            order_id: order.id,
            order_item_id: item.id,
        })
        .await;
        Ok(item)
    }

    /// Rewrites an order's totals from the live sum of its items. Invoked by
    /// every item write; exposed for callers that mutate items out of band.
    #[instrument(skip(self))]
    pub async fn recompute_totals(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;
        let order = self.recompute_totals_in(&txn, order_id).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;
        Ok(order)
    }

    /// Advances the forward-only status machine
    /// (PENDING → PAID → FULFILLED).
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let db = &*self.db;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let old_status = order.status;
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "cannot move order from {old_status} to {new_status}"
            )));
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        info!(order_id = %order_id, old_status = %old_status, new_status = %new_status, "Order status updated");
        self.emit(Event::OrderStatusChanged {
            order_id,
            old_status,
            new_status,
        })
        .await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        order_id: Uuid,
    ) -> Result<(order::Model, Vec<order_item::Model>), ServiceError> {
        let db = &*self.db;
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;
        let items = Self::items_of_in(db, order_id).await?;
        Ok((order, items))
    }

    #[instrument(skip(self))]
    pub async fn list_orders_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<order::Model>, ServiceError> {
        OrderEntity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn list_orders_for_week(
        &self,
        week_id: Uuid,
    ) -> Result<Vec<order::Model>, ServiceError> {
        OrderEntity::find()
            .filter(order::Column::MenuWeekId.eq(week_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Computes and writes one line's snapshot. An unassigned menu item
    /// prices at zero with an empty meal name. A `meal_name` already present
    /// on the line is kept as-is: the name freezes at first save even if the
    /// meal is later renamed.
    async fn write_item_snapshot<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: &order::Model,
        menu_item: &menu_item::Model,
        quantity: i32,
        existing: Option<order_item::Model>,
    ) -> Result<order_item::Model, ServiceError> {
        let meal = match menu_item.meal_id {
            Some(meal_id) => MealEntity::find_by_id(meal_id)
                .one(conn)
                .await
                .map_err(ServiceError::db_error)?,
            None => None,
        };

        let unit_price = meal
            .as_ref()
            .map(meal::Model::price_or_zero)
            .unwrap_or_else(|| Money::zero(order.currency.clone()));
        let unit_cost = match &meal {
            Some(meal) => self.meals.calculate_cost_in(conn, meal.id).await?.total,
            None => Money::zero(order.currency.clone()),
        };

        let quantity_dec = Decimal::from(quantity);
        let line_price = unit_price.mul_decimal(quantity_dec);
        let line_cost = unit_cost.mul_decimal(quantity_dec);
        let line_profit = line_price.subtract(&line_cost)?;

        let meal_name = match &existing {
            Some(item) if !item.meal_name.is_empty() => item.meal_name.clone(),
            _ => meal.as_ref().map(|m| m.name.clone()).unwrap_or_default(),
        };

        let saved = match existing {
            Some(item) => {
                let mut active: order_item::ActiveModel = item.into();
                active.menu_item_id = Set(menu_item.id);
                active.quantity = Set(quantity);
                active.meal_name = Set(meal_name);
                active.unit_price = Set(unit_price.amount);
                active.unit_cost = Set(unit_cost.amount);
                active.line_price = Set(line_price.amount);
                active.line_cost = Set(line_cost.amount);
                active.line_profit = Set(line_profit.amount);
                active.updated_at = Set(Some(Utc::now()));
                active.update(conn).await.map_err(ServiceError::db_error)?
            }
            None => {
                let item = order_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_id: Set(order.id),
                    menu_item_id: Set(menu_item.id),
                    quantity: Set(quantity),
                    meal_name: Set(meal_name),
                    unit_price: Set(unit_price.amount),
                    unit_cost: Set(unit_cost.amount),
                    line_price: Set(line_price.amount),
                    line_cost: Set(line_cost.amount),
                    line_profit: Set(line_profit.amount),
                    ..Default::default()
                };
                item.insert(conn).await.map_err(ServiceError::db_error)?
            }
        };
        Ok(saved)
    }

    /// The totals rewrite shared by every item-write path. Reads the current
    /// items fresh on the same connection as the triggering write.
    pub(crate) async fn recompute_totals_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let items = Self::items_of_in(conn, order_id).await?;

        let mut total_price = Money::zero(order.currency.clone());
        let mut total_cost = Money::zero(order.currency.clone());
        for item in &items {
            total_price = total_price.add(&Money::new(item.line_price, order.currency.clone()))?;
            total_cost = total_cost.add(&Money::new(item.line_cost, order.currency.clone()))?;
        }
        let total_profit = total_price.subtract(&total_cost)?;

        let mut active: order::ActiveModel = order.into();
        active.total_price = Set(total_price.amount);
        active.total_cost = Set(total_cost.amount);
        active.total_profit = Set(total_profit.amount);
        active.updated_at = Set(Some(Utc::now()));
        active.update(conn).await.map_err(ServiceError::db_error)
    }

    pub(crate) async fn items_of_in<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn menu_item_in<C: ConnectionTrait>(
        conn: &C,
        menu_item_id: Uuid,
    ) -> Result<menu_item::Model, ServiceError> {
        MenuItemEntity::find_by_id(menu_item_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {menu_item_id} not found")))
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send order event");
            }
        }
    }
}
