use serde::{Deserialize, Serialize};

use crate::models::vehicle::Vehicle;
use crate::services::image_resolver::ImageWarning;
use crate::utils::validation::deserialize_lenient_string;

// Campos de texto del formulario de vehículo (multipart o JSON)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleForm {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub seats: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub horsepower: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "deserialize_lenient_string")]
    pub vehicle_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub price_per_day: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub price_per_week: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub price_per_month: Option<String>,
}

impl VehicleForm {
    /// Asignar un campo de texto por su nombre; devuelve false si no es un campo del formulario
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let target = match name {
            "brand" => &mut self.brand,
            "model" => &mut self.model,
            "year" => &mut self.year,
            "color" => &mut self.color,
            "seats" => &mut self.seats,
            "horsepower" => &mut self.horsepower,
            "type" => &mut self.vehicle_type,
            "price_per_day" => &mut self.price_per_day,
            "price_per_week" => &mut self.price_per_week,
            "price_per_month" => &mut self.price_per_month,
            _ => return false,
        };
        *target = Some(value);
        true
    }
}

// Response de escritura: el vehículo más avisos de imágenes que fallaron
#[derive(Debug, Serialize)]
pub struct VehicleWriteResponse {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ImageWarning>,
}

// Response genérica con mensaje
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_accepts_numbers_and_strings() {
        let form: VehicleForm = serde_json::from_str(
            r#"{"brand": "BMW", "year": 2021, "seats": "4", "type": "Sport", "price_per_day": 99.5}"#,
        )
        .unwrap();
        assert_eq!(form.year.as_deref(), Some("2021"));
        assert_eq!(form.seats.as_deref(), Some("4"));
        assert_eq!(form.vehicle_type.as_deref(), Some("Sport"));
        assert_eq!(form.price_per_day.as_deref(), Some("99.5"));
        assert_eq!(form.model, None);
    }

    #[test]
    fn test_set_field() {
        let mut form = VehicleForm::default();
        assert!(form.set_field("type", "SUV".into()));
        assert!(!form.set_field("category", "3".into()));
        assert_eq!(form.vehicle_type.as_deref(), Some("SUV"));
    }
}
