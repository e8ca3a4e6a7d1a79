//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::VehicleStore;
use crate::services::{AdminAuthService, ImageHost, ImageResolver, VehicleService};
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub vehicles: VehicleService,
    pub auth: AdminAuthService,
    pub login_limiter: RateLimitState,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        store: Arc<dyn VehicleStore>,
        image_host: Arc<dyn ImageHost>,
    ) -> AppResult<Self> {
        let auth = AdminAuthService::new(&config)?;
        Ok(Self::with_auth(config, store, image_host, auth))
    }

    /// Estado con un servicio de autenticación ya construido
    pub fn with_auth(
        config: EnvironmentConfig,
        store: Arc<dyn VehicleStore>,
        image_host: Arc<dyn ImageHost>,
        auth: AdminAuthService,
    ) -> Self {
        let folder = config
            .image_host
            .as_ref()
            .map(|host| host.folder.clone())
            .unwrap_or_else(|| "car-images".to_string());

        let resolver = ImageResolver::new(image_host, folder, config.upload_temp_dir.clone());

        Self {
            login_limiter: RateLimitState::for_login(&config),
            vehicles: VehicleService::new(store, resolver),
            auth,
            config: Arc::new(config),
        }
    }
}
