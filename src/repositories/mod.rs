//! Repositorios
//!
//! Acceso a datos de vehículos. `VehicleStore` es la única puerta de escritura
//! hacia la tabla `cars`; cada operación afecta una sola fila.

pub mod memory_vehicle_store;
pub mod vehicle_repository;

use async_trait::async_trait;

use crate::models::vehicle::{Vehicle, VehicleProperties, VehicleRecord};
use crate::utils::errors::AppError;

pub use memory_vehicle_store::MemoryVehicleStore;
pub use vehicle_repository::PgVehicleRepository;

/// Operaciones de almacenamiento de vehículos
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Insertar una fila nueva; el `id` lo asigna el almacén
    async fn insert(&self, record: &VehicleRecord) -> Result<Vehicle, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Vehicle>, AppError>;

    /// Todas las filas ordenadas por `id` ascendente
    async fn list_all(&self) -> Result<Vec<Vehicle>, AppError>;

    /// Reemplazar propiedades e imágenes; `None` si el id no existe
    async fn update(&self, id: i32, record: &VehicleRecord) -> Result<Option<Vehicle>, AppError>;

    /// Reemplazar solo propiedades; las columnas de imagen no se tocan
    async fn update_properties(
        &self,
        id: i32,
        properties: &VehicleProperties,
    ) -> Result<Option<Vehicle>, AppError>;

    /// `false` si el id no existía
    async fn delete(&self, id: i32) -> Result<bool, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}
