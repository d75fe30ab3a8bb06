//! Inventario de concesionario
//!
//! Registro de vehículos con estado de venta consistente y métricas de
//! ventas por vendedor, expuesto como API HTTP sobre PostgreSQL.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_middleware;
use crate::state::AppState;

/// Router completo de la aplicación con su estado
pub fn build_router(state: AppState) -> Router {
    let cors = cors_middleware(&state.config.cors_origins);

    Router::new()
        .merge(routes::health_routes::create_health_router())
        .nest("/api/vehicles", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/salespeople", routes::salesperson_routes::create_salesperson_router())
        .nest("/api/customers", routes::customer_routes::create_customer_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
