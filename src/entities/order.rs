use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Money, OrderStatus};

/// A customer order. The three totals are derived from the live sum of the
/// order's items and rewritten inside the same transaction as any item save,
/// so they are never observably stale.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub menu_week_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn total_price(&self) -> Money {
        Money::new(self.total_price, self.currency.clone())
    }

    pub fn total_cost(&self) -> Money {
        Money::new(self.total_cost, self.currency.clone())
    }

    pub fn total_profit(&self) -> Money {
        Money::new(self.total_profit, self.currency.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::menu_week::Entity",
        from = "Column::MenuWeekId",
        to = "super::menu_week::Column::Id"
    )]
    MenuWeek,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::menu_week::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuWeek.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
