pub mod auth_controller;
pub mod vehicle_controller;
