//! Navegación entre las imágenes de cada ficha
//!
//! El índice vive por id de vehículo y no depende de los filtros.

use std::collections::HashMap;

use crate::models::vehicle::{ImageSlot, Vehicle};

const SLOTS: usize = ImageSlot::ALL.len();

#[derive(Debug, Clone, Default)]
pub struct ImageCarousel {
    positions: HashMap<i32, usize>,
}

impl ImageCarousel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self, vehicle_id: i32) -> usize {
        self.positions.get(&vehicle_id).copied().unwrap_or(0)
    }

    pub fn next(&mut self, vehicle_id: i32) -> usize {
        let index = (self.index(vehicle_id) + 1) % SLOTS;
        self.positions.insert(vehicle_id, index);
        index
    }

    pub fn previous(&mut self, vehicle_id: i32) -> usize {
        let index = (self.index(vehicle_id) + SLOTS - 1) % SLOTS;
        self.positions.insert(vehicle_id, index);
        index
    }

    /// URL de la imagen actual; un slot vacío cae en image1
    pub fn current_image<'a>(&self, vehicle: &'a Vehicle) -> Option<&'a str> {
        let slot = ImageSlot::from_index(self.index(vehicle.id)).unwrap_or(ImageSlot::First);
        let url = match slot {
            ImageSlot::First => &vehicle.image1,
            ImageSlot::Second => &vehicle.image2,
            ImageSlot::Third => &vehicle.image3,
        };
        url.as_deref().or(vehicle.image1.as_deref())
    }

    /// Texto "n / 3" del indicador
    pub fn indicator(&self, vehicle_id: i32) -> String {
        format!("{} / {}", self.index(vehicle_id) + 1, SLOTS)
    }
}
