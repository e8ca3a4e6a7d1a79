//! Car catalog backend
//!
//! API REST del catálogo de vehículos de alquiler: CRUD con imágenes en un
//! host externo, autenticación del administrador y el pipeline de catálogo
//! del cliente (caché, filtros, orden y paginación).

pub mod catalog;
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
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::cors::cors_layer;
use crate::routes::{auth_routes, health_routes, vehicle_routes};
use crate::state::AppState;

/// Router completo de la API
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/cars", vehicle_routes::create_vehicle_router(state.clone()))
        .nest("/api/auth", auth_routes::create_auth_router(state.clone()))
        .merge(health_routes::create_health_router())
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
