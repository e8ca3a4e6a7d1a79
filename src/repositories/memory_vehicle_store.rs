//! Almacén en memoria
//!
//! Implementación de `VehicleStore` sin base de datos, para desarrollo local
//! (`STORE_BACKEND=memory`) y para los tests. Los ids crecen de forma
//! monotónica y nunca se reutilizan, igual que una secuencia SERIAL.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::VehicleStore;
use crate::models::vehicle::{Vehicle, VehicleProperties, VehicleRecord};
use crate::utils::errors::AppError;

#[derive(Default)]
struct Inner {
    rows: BTreeMap<i32, Vehicle>,
    last_id: i32,
}

#[derive(Default)]
pub struct MemoryVehicleStore {
    inner: RwLock<Inner>,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_properties(vehicle: &mut Vehicle, props: &VehicleProperties) {
    vehicle.brand = props.brand.clone();
    vehicle.model = props.model.clone();
    vehicle.year = props.year;
    vehicle.color = props.color.clone();
    vehicle.seats = props.seats;
    vehicle.horsepower = props.horsepower;
    vehicle.vehicle_type = props.vehicle_type.as_str().to_string();
    vehicle.category = props.category();
    vehicle.price_per_day = props.price_per_day;
    vehicle.price_per_week = props.price_per_week;
    vehicle.price_per_month = props.price_per_month;
    vehicle.updated_at = Utc::now();
}

fn apply_images(vehicle: &mut Vehicle, record: &VehicleRecord) {
    let [image1, image2, image3] = record.images.clone();
    vehicle.image1 = image1.url;
    vehicle.image1_public_id = image1.public_id;
    vehicle.image2 = image2.url;
    vehicle.image2_public_id = image2.public_id;
    vehicle.image3 = image3.url;
    vehicle.image3_public_id = image3.public_id;
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn insert(&self, record: &VehicleRecord) -> Result<Vehicle, AppError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;

        let now = Utc::now();
        let props = &record.properties;
        let mut vehicle = Vehicle {
            id: inner.last_id,
            brand: props.brand.clone(),
            model: props.model.clone(),
            year: props.year,
            image1: None,
            image2: None,
            image3: None,
            image1_public_id: None,
            image2_public_id: None,
            image3_public_id: None,
            color: None,
            seats: None,
            horsepower: None,
            vehicle_type: String::new(),
            category: 0,
            price_per_day: None,
            price_per_week: None,
            price_per_month: None,
            created_at: now,
            updated_at: now,
        };
        apply_properties(&mut vehicle, props);
        apply_images(&mut vehicle, record);

        inner.rows.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Vehicle>, AppError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Vehicle>, AppError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, id: i32, record: &VehicleRecord) -> Result<Option<Vehicle>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(vehicle) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };

        apply_properties(vehicle, &record.properties);
        apply_images(vehicle, record);
        Ok(Some(vehicle.clone()))
    }

    async fn update_properties(
        &self,
        id: i32,
        properties: &VehicleProperties,
    ) -> Result<Option<Vehicle>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(vehicle) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };

        apply_properties(vehicle, properties);
        Ok(Some(vehicle.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.rows.len() as i64)
    }
}
