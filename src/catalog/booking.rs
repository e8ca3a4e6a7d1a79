//! Intención de reserva por WhatsApp
//!
//! No se persiste nada: solo se arma el enlace con un mensaje prellenado.

use crate::models::vehicle::Vehicle;

/// Número de reservas por defecto
pub const DEFAULT_BOOKING_PHONE: &str = "+971563995002";

pub fn booking_message(vehicle: &Vehicle) -> String {
    format!("Hello! I'm interested in the {} {}", vehicle.brand, vehicle.model)
}

/// Enlace `wa.me` con el mensaje codificado
pub fn whatsapp_link(phone: &str, vehicle: &Vehicle) -> String {
    format!(
        "https://wa.me/{}?text={}",
        phone.trim(),
        urlencoding::encode(&booking_message(vehicle))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_link() {
        let vehicle: Vehicle = serde_json::from_value(serde_json::json!({
            "id": 1,
            "brand": "Rolls-Royce",
            "model": "Cullinan",
            "year": 2023,
            "image1": null,
            "image2": null,
            "image3": null,
            "color": null,
            "seats": null,
            "horsepower": null,
            "type": "Luxury",
            "category": 5
        }))
        .unwrap();

        assert_eq!(
            whatsapp_link(DEFAULT_BOOKING_PHONE, &vehicle),
            "https://wa.me/+971563995002?text=Hello%21%20I%27m%20interested%20in%20the%20Rolls-Royce%20Cullinan"
        );
    }
}
