pub mod auth_routes;
pub mod health_routes;
pub mod vehicle_routes;
