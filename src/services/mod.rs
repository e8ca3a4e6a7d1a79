//! Services module
//!
//! Este módulo contiene la lógica de negocio y las integraciones externas:
//! el host de imágenes, la resolución de imágenes por slot, el CRUD de
//! vehículos y la autenticación del administrador.

pub mod auth_service;
pub mod image_host_service;
pub mod image_resolver;
pub mod vehicle_service;

pub use auth_service::AdminAuthService;
pub use image_host_service::{DisabledImageHost, HostedAssetClient, HostedImage, ImageHost};
pub use image_resolver::{ImageInputs, ImageResolver, ImageSource, ImageWarning, SlotInput};
pub use vehicle_service::{VehicleService, VehicleWrite};
