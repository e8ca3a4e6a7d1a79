//! Configuración de conexión a PostgreSQL
//!
//! Este módulo maneja la conexión a la base de datos, la creación idempotente
//! del schema `cars` y los datos de ejemplo para una base vacía.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::database::DatabaseConfig;
use crate::models::vehicle::{StoredImage, VehicleProperties, VehicleRecord, VehicleType};
use crate::repositories::VehicleStore;

/// Sentencias del schema; cada una es idempotente
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cars (
        id SERIAL PRIMARY KEY,
        brand VARCHAR(100) NOT NULL,
        model VARCHAR(100) NOT NULL,
        year INTEGER NOT NULL,
        image1 TEXT,
        image2 TEXT,
        image3 TEXT,
        color VARCHAR(50),
        seats INTEGER,
        horsepower INTEGER,
        type VARCHAR(50) NOT NULL DEFAULT 'Luxury',
        category INTEGER NOT NULL DEFAULT 5,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "ALTER TABLE cars ADD COLUMN IF NOT EXISTS price_per_day NUMERIC(10, 2)",
    "ALTER TABLE cars ADD COLUMN IF NOT EXISTS price_per_week NUMERIC(10, 2)",
    "ALTER TABLE cars ADD COLUMN IF NOT EXISTS price_per_month NUMERIC(10, 2)",
    "ALTER TABLE cars ADD COLUMN IF NOT EXISTS image1_public_id TEXT",
    "ALTER TABLE cars ADD COLUMN IF NOT EXISTS image2_public_id TEXT",
    "ALTER TABLE cars ADD COLUMN IF NOT EXISTS image3_public_id TEXT",
    "ALTER TABLE cars ADD COLUMN IF NOT EXISTS updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
    r#"
    DO $$
    BEGIN
        IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'cars_category_range') THEN
            ALTER TABLE cars ADD CONSTRAINT cars_category_range CHECK (category BETWEEN 1 AND 5);
        END IF;
    END $$
    "#,
];

/// Conexión a la base de datos
#[derive(Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Conectar usando `DATABASE_URL`
    pub async fn new_default() -> Result<Self> {
        Self::new(&DatabaseConfig::from_env()?).await
    }

    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("🔗 Conectando a PostgreSQL: {}", config.masked_url());

        let pool = config
            .create_pool()
            .await
            .context("Error creando el pool de PostgreSQL")?;

        info!("✅ PostgreSQL conectado exitosamente");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Crear tabla y columnas que falten
    pub async fn init_schema(&self) -> Result<()> {
        info!("🛠️ Inicializando schema de la base de datos...");

        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Error ejecutando schema: {}", statement.trim()))?;
        }

        info!("✅ Schema inicializado");
        Ok(())
    }
}

/// Vehículos de ejemplo para una base vacía
pub fn sample_vehicles() -> Vec<VehicleRecord> {
    let seeded = |name: &str| {
        StoredImage::external(format!(
            "https://res.cloudinary.com/dwwhagql2/image/upload/v1/car-images/{}",
            name
        ))
    };

    let sample = |brand: &str,
                  model: &str,
                  color: &str,
                  seats: i32,
                  horsepower: i32,
                  vehicle_type: VehicleType,
                  slug: &str| {
        VehicleRecord {
            properties: VehicleProperties {
                brand: brand.to_string(),
                model: model.to_string(),
                year: 2023,
                color: Some(color.to_string()),
                seats: Some(seats),
                horsepower: Some(horsepower),
                vehicle_type,
                price_per_day: None,
                price_per_week: None,
                price_per_month: None,
            },
            images: [
                seeded(&format!("{}-1", slug)),
                seeded(&format!("{}-2", slug)),
                seeded(&format!("{}-3", slug)),
            ],
        }
    };

    vec![
        sample("Lamborghini", "Huracán", "Yellow", 2, 640, VehicleType::Sport, "lamborghini"),
        sample("Mercedes-Benz", "G63 AMG", "Black", 5, 577, VehicleType::Suv, "g63"),
        sample("Rolls-Royce", "Cullinan", "Silver", 5, 563, VehicleType::Luxury, "rolls"),
    ]
}

/// Insertar los datos de ejemplo si el almacén está vacío; devuelve cuántos se insertaron
pub async fn seed_if_empty(store: &dyn VehicleStore) -> Result<usize> {
    let count = store.count().await?;
    if count > 0 {
        info!("📦 La base ya contiene {} vehículos", count);
        return Ok(0);
    }

    warn!("📦 No hay vehículos, insertando datos de ejemplo...");
    let samples = sample_vehicles();
    for record in &samples {
        store.insert(record).await?;
    }

    info!("✅ {} vehículos de ejemplo insertados", samples.len());
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryVehicleStore;

    #[test]
    fn test_sample_categories_follow_type() {
        for record in sample_vehicles() {
            let props = &record.properties;
            assert_eq!(props.category(), props.vehicle_type.category());
            assert!(record.images[0].url.is_some());
        }
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let store = MemoryVehicleStore::new();
        assert_eq!(seed_if_empty(&store).await.unwrap(), 3);
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 3);
    }
}
