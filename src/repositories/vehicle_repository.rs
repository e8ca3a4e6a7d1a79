use async_trait::async_trait;
use sqlx::PgPool;

use super::VehicleStore;
use crate::models::vehicle::{Vehicle, VehicleProperties, VehicleRecord};
use crate::utils::errors::AppError;

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStore for PgVehicleRepository {
    async fn insert(&self, record: &VehicleRecord) -> Result<Vehicle, AppError> {
        let props = &record.properties;
        let [image1, image2, image3] = &record.images;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO cars (
                brand, model, year,
                image1, image2, image3,
                image1_public_id, image2_public_id, image3_public_id,
                color, seats, horsepower, type, category,
                price_per_day, price_per_week, price_per_month
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(&props.brand)
        .bind(&props.model)
        .bind(props.year)
        .bind(&image1.url)
        .bind(&image2.url)
        .bind(&image3.url)
        .bind(&image1.public_id)
        .bind(&image2.public_id)
        .bind(&image3.public_id)
        .bind(&props.color)
        .bind(props.seats)
        .bind(props.horsepower)
        .bind(props.vehicle_type.as_str())
        .bind(props.category())
        .bind(props.price_per_day)
        .bind(props.price_per_week)
        .bind(props.price_per_month)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn list_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM cars ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    async fn update(&self, id: i32, record: &VehicleRecord) -> Result<Option<Vehicle>, AppError> {
        let props = &record.properties;
        let [image1, image2, image3] = &record.images;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE cars
            SET brand = $1, model = $2, year = $3,
                image1 = $4, image2 = $5, image3 = $6,
                image1_public_id = $7, image2_public_id = $8, image3_public_id = $9,
                color = $10, seats = $11, horsepower = $12, type = $13, category = $14,
                price_per_day = $15, price_per_week = $16, price_per_month = $17,
                updated_at = NOW()
            WHERE id = $18
            RETURNING *
            "#,
        )
        .bind(&props.brand)
        .bind(&props.model)
        .bind(props.year)
        .bind(&image1.url)
        .bind(&image2.url)
        .bind(&image3.url)
        .bind(&image1.public_id)
        .bind(&image2.public_id)
        .bind(&image3.public_id)
        .bind(&props.color)
        .bind(props.seats)
        .bind(props.horsepower)
        .bind(props.vehicle_type.as_str())
        .bind(props.category())
        .bind(props.price_per_day)
        .bind(props.price_per_week)
        .bind(props.price_per_month)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn update_properties(
        &self,
        id: i32,
        props: &VehicleProperties,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE cars
            SET brand = $1, model = $2, year = $3,
                color = $4, seats = $5, horsepower = $6, type = $7, category = $8,
                price_per_day = $9, price_per_week = $10, price_per_month = $11,
                updated_at = NOW()
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&props.brand)
        .bind(&props.model)
        .bind(props.year)
        .bind(&props.color)
        .bind(props.seats)
        .bind(props.horsepower)
        .bind(props.vehicle_type.as_str())
        .bind(props.category())
        .bind(props.price_per_day)
        .bind(props.price_per_week)
        .bind(props.price_per_month)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
