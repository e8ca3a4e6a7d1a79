//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente a la tabla `cars` con primary key `id` (SERIAL).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

/// Tipo comercial del vehículo. `category` se deriva siempre de aquí.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VehicleType {
    Economy,
    Sport,
    #[serde(rename = "SUV")]
    Suv,
    Convertible,
    #[default]
    Luxury,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Suv,
        VehicleType::Sport,
        VehicleType::Luxury,
        VehicleType::Convertible,
        VehicleType::Economy,
    ];

    /// Parsear sin distinguir mayúsculas; vacío o desconocido -> Luxury
    pub fn parse(value: Option<&str>) -> Self {
        let Some(text) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };

        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(text))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Economy => "Economy",
            VehicleType::Sport => "Sport",
            VehicleType::Suv => "SUV",
            VehicleType::Convertible => "Convertible",
            VehicleType::Luxury => "Luxury",
        }
    }

    /// Categoría numérica persistida junto al tipo
    pub fn category(&self) -> i32 {
        match self {
            VehicleType::Economy => 1,
            VehicleType::Sport => 2,
            VehicleType::Suv => 3,
            VehicleType::Convertible => 4,
            VehicleType::Luxury => 5,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categoría para un tipo en texto libre (desconocido -> 5)
pub fn get_type_category(vehicle_type: &str) -> i32 {
    VehicleType::parse(Some(vehicle_type)).category()
}

/// Posición de imagen dentro de la ficha (image1..image3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ImageSlot {
    #[serde(rename = "image1")]
    First,
    #[serde(rename = "image2")]
    Second,
    #[serde(rename = "image3")]
    Third,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 3] = [ImageSlot::First, ImageSlot::Second, ImageSlot::Third];

    pub fn index(&self) -> usize {
        match self {
            ImageSlot::First => 0,
            ImageSlot::Second => 1,
            ImageSlot::Third => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Número 1-based usado en los nombres de campo del formulario
    pub fn number(&self) -> usize {
        self.index() + 1
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image{}", self.number())
    }
}

/// Imagen almacenada: URL pública y, si vive en el host, su handle remoto
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredImage {
    pub url: Option<String>,
    pub public_id: Option<String>,
}

impl StoredImage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn external(url: String) -> Self {
        Self {
            url: Some(url),
            public_id: None,
        }
    }

    pub fn hosted(url: String, public_id: String) -> Self {
        Self {
            url: Some(url),
            public_id: Some(public_id),
        }
    }
}

/// Vehicle principal - mapea exactamente a la tabla `cars`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub image1: Option<String>,
    pub image2: Option<String>,
    pub image3: Option<String>,
    #[serde(skip)]
    pub image1_public_id: Option<String>,
    #[serde(skip)]
    pub image2_public_id: Option<String>,
    #[serde(skip)]
    pub image3_public_id: Option<String>,
    pub color: Option<String>,
    pub seats: Option<i32>,
    pub horsepower: Option<i32>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub vehicle_type: String,
    pub category: i32,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price_per_day: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price_per_week: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price_per_month: Option<Decimal>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn image(&self, slot: ImageSlot) -> StoredImage {
        let (url, public_id) = match slot {
            ImageSlot::First => (&self.image1, &self.image1_public_id),
            ImageSlot::Second => (&self.image2, &self.image2_public_id),
            ImageSlot::Third => (&self.image3, &self.image3_public_id),
        };
        StoredImage {
            url: url.clone(),
            public_id: public_id.clone(),
        }
    }

    pub fn images(&self) -> [StoredImage; 3] {
        ImageSlot::ALL.map(|slot| self.image(slot))
    }

    /// Handles remotos de las imágenes que viven en el host, con su slot
    pub fn hosted_public_ids(&self) -> Vec<(ImageSlot, String)> {
        ImageSlot::ALL
            .into_iter()
            .filter_map(|slot| self.image(slot).public_id.map(|id| (slot, id)))
            .collect()
    }
}

/// Atributos editables sin imágenes (texto, specs y precios)
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct VehicleProperties {
    #[validate(length(min = 1, max = 100))]
    pub brand: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(range(min = 1900, max = 2099))]
    pub year: i32,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    pub seats: Option<i32>,
    pub horsepower: Option<i32>,
    pub vehicle_type: VehicleType,
    pub price_per_day: Option<Decimal>,
    pub price_per_week: Option<Decimal>,
    pub price_per_month: Option<Decimal>,
}

impl VehicleProperties {
    /// Siempre coincide con `vehicle_type`
    pub fn category(&self) -> i32 {
        self.vehicle_type.category()
    }
}

/// Fila completa a insertar o reemplazar (propiedades + 3 imágenes)
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub properties: VehicleProperties,
    pub images: [StoredImage; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        let cases = [
            ("Economy", 1),
            ("Sport", 2),
            ("SUV", 3),
            ("Convertible", 4),
            ("Luxury", 5),
            ("Hovercraft", 5),
        ];
        for (vehicle_type, expected) in cases {
            assert_eq!(get_type_category(vehicle_type), expected, "type {}", vehicle_type);
        }
    }

    #[test]
    fn test_type_parse_is_case_insensitive() {
        assert_eq!(VehicleType::parse(Some("suv")), VehicleType::Suv);
        assert_eq!(VehicleType::parse(Some(" sport ")), VehicleType::Sport);
        assert_eq!(VehicleType::parse(None), VehicleType::Luxury);
        assert_eq!(VehicleType::parse(Some("")), VehicleType::Luxury);
    }

    #[test]
    fn test_image_slot_naming() {
        assert_eq!(ImageSlot::First.to_string(), "image1");
        assert_eq!(ImageSlot::from_index(2), Some(ImageSlot::Third));
        assert_eq!(ImageSlot::from_index(3), None);
    }

    #[test]
    fn test_vehicle_json_shape() {
        let json = serde_json::json!({
            "id": 3,
            "brand": "Rolls-Royce",
            "model": "Cullinan",
            "year": 2023,
            "image1": "https://cdn.example.com/rolls-1.jpg",
            "image2": null,
            "image3": null,
            "color": "Silver",
            "seats": 5,
            "horsepower": 563,
            "type": "Luxury",
            "category": 5,
            "price_per_day": 1500.5,
            "price_per_week": null,
            "price_per_month": null
        });

        let vehicle: Vehicle = serde_json::from_value(json).unwrap();
        assert_eq!(vehicle.vehicle_type, "Luxury");
        assert_eq!(vehicle.price_per_day, Some(Decimal::new(15005, 1)));
        assert_eq!(vehicle.image1_public_id, None);

        let back = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(back["type"], "Luxury");
        assert!(back.get("image1_public_id").is_none());
    }
}
