//! Mealdrop API Library
//!
//! Backend core for a small food-service ordering platform. A chef manages
//! an ingredient catalog, recipes, meals and weekly menus; customers place
//! orders against the active week; the chef fulfills paid orders from an
//! aggregated shopping list. Costs derive bottom-up: ingredient unit cost →
//! recipe batch cost → meal cost → order line snapshot → order totals.
//!
//! HTTP surfaces, authentication and rendering are embedding-application
//! concerns; this crate exposes entities, services and a schema migrator.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod models;
pub mod services;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::{
    CatalogService, FulfillmentService, MealService, MenuService, OrderService, RecipeService,
};

/// The wired-up domain services, shared by the embedding application.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub recipes: Arc<RecipeService>,
    pub meals: Arc<MealService>,
    pub menus: Arc<MenuService>,
    pub orders: Arc<OrderService>,
    pub fulfillment: Arc<FulfillmentService>,
}

impl AppServices {
    pub fn build(
        db: Arc<DatabaseConnection>,
        config: &AppConfig,
        event_sender: &EventSender,
    ) -> Self {
        let sender = Some(Arc::new(event_sender.clone()));
        let catalog = Arc::new(CatalogService::new(
            db.clone(),
            sender.clone(),
            config.currency.clone(),
        ));
        let recipes = Arc::new(RecipeService::new(
            db.clone(),
            catalog.clone(),
            sender.clone(),
        ));
        let meals = Arc::new(MealService::new(
            db.clone(),
            recipes.clone(),
            sender.clone(),
            config.currency.clone(),
        ));
        let menus = Arc::new(MenuService::new(db.clone(), meals.clone(), sender.clone()));
        let orders = Arc::new(OrderService::new(
            db.clone(),
            meals.clone(),
            sender,
            config.currency.clone(),
        ));
        let fulfillment = Arc::new(FulfillmentService::new(db, catalog.clone()));

        Self {
            catalog,
            recipes,
            meals,
            menus,
            orders,
            fulfillment,
        }
    }
}

/// Application state: connection pool, configuration, event channel and the
/// service graph.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub services: AppServices,
}

impl AppState {
    /// Connects to the database (migrating when configured), opens the
    /// domain event channel with a logging consumer, and builds the service
    /// graph.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db = Arc::new(db::establish_connection(&config).await?);
        if config.auto_migrate {
            db::run_migrations(&db).await?;
        }

        let (event_sender, receiver) = events::channel();
        let _ = events::spawn_event_logger(receiver);

        let services = AppServices::build(db.clone(), &config, &event_sender);

        Ok(Self {
            db,
            config,
            event_sender,
            services,
        })
    }
}
