//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean exactamente
//! al schema PostgreSQL (`cars`) y las sesiones de administrador.

pub mod auth;
pub mod vehicle;

pub use vehicle::{get_type_category, ImageSlot, StoredImage, Vehicle, VehicleType};
