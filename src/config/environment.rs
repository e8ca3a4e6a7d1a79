//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

/// Backend de almacenamiento de vehículos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Credenciales del host de imágenes (compatible con Cloudinary)
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub api_base: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub store_backend: StoreBackend,
    pub seed_sample_data: bool,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub admin_username: String,
    pub admin_password_hash: Option<String>,
    pub admin_password: Option<String>,
    pub cors_origins: Vec<String>,
    pub login_rate_limit_requests: u32,
    pub login_rate_limit_window: u64,
    pub upload_temp_dir: PathBuf,
    pub image_host: Option<ImageHostConfig>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 5000,
            host: "0.0.0.0".to_string(),
            store_backend: StoreBackend::Postgres,
            seed_sample_data: true,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration: 3600, // 1 hora
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            admin_password: None,
            cors_origins: Vec::new(),
            login_rate_limit_requests: 5,
            login_rate_limit_window: 15 * 60, // 15 minutos
            upload_temp_dir: PathBuf::from("temp-uploads"),
            image_host: None,
        }
    }
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let is_production = environment == "production";

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if is_production => return Err(anyhow!("JWT_SECRET must be set in production")),
            _ => defaults.jwt_secret,
        };

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("postgres") | Err(_) => StoreBackend::Postgres,
            Ok(other) => return Err(anyhow!("STORE_BACKEND '{}' no soportado", other)),
        };

        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            store_backend,
            seed_sample_data: parse_var("SEED_SAMPLE_DATA", defaults.seed_sample_data)?,
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            admin_username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").ok().filter(|h| !h.is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            login_rate_limit_requests: parse_var(
                "LOGIN_RATE_LIMIT_REQUESTS",
                defaults.login_rate_limit_requests,
            )?,
            login_rate_limit_window: parse_var(
                "LOGIN_RATE_LIMIT_WINDOW",
                defaults.login_rate_limit_window,
            )?,
            upload_temp_dir: env::var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_temp_dir),
            image_host: ImageHostConfig::from_env(),
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ImageHostConfig {
    /// Solo se configura si existen las tres credenciales
    pub fn from_env() -> Option<Self> {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME").ok()?;
        let api_key = env::var("CLOUDINARY_API_KEY").ok()?;
        let api_secret = env::var("CLOUDINARY_API_SECRET").ok()?;

        Some(Self {
            api_base: env::var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".to_string()),
            cloud_name,
            api_key,
            api_secret,
            folder: env::var("IMAGE_HOST_FOLDER").unwrap_or_else(|_| "car-images".to_string()),
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value", name)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "0.0.0.0:5000");
        assert_eq!(config.login_rate_limit_requests, 5);
        assert_eq!(config.login_rate_limit_window, 900);
    }

    #[test]
    fn test_parse_var_default_when_missing() {
        let value: u16 = parse_var("CAR_CATALOG_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }
}
