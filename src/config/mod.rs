//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y credenciales del host de imágenes.

pub mod database;
pub mod environment;

pub use environment::*;
