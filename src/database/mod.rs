//! Módulo de base de datos
//!
//! Maneja la conexión, el schema y los datos de ejemplo de PostgreSQL

pub mod connection;

pub use connection::{seed_if_empty, DatabaseConnection};
