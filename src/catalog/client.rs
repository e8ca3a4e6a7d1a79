//! Cliente HTTP del catálogo
//!
//! Lee primero de la caché; si no hay datos frescos pide `GET /api/cars`.
//! Una petición nueva aborta la que esté en curso, y una respuesta vieja
//! nunca sobrescribe la caché. Sin reintentos.

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

use super::cache::{CatalogCache, CATALOG_KEY};
use crate::models::vehicle::Vehicle;

/// Mensaje genérico para el visitante
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load cars";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Fetch cancelled by a newer request")]
    Cancelled,

    #[error("Fetch task failed: {0}")]
    Task(String),
}

impl ClientError {
    pub fn failure_message(&self) -> &'static str {
        LOAD_FAILURE_MESSAGE
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

// Petición en curso; la generación solo cambia con este lock tomado
#[derive(Default)]
struct InFlight {
    generation: u64,
    handle: Option<AbortHandle>,
}

pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    cache: Mutex<CatalogCache>,
    in_flight: Mutex<InFlight>,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self::with_cache(base_url, CatalogCache::default(), reqwest::Client::builder().build()?))
    }

    pub fn with_cache(base_url: impl Into<String>, cache: CatalogCache, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Mutex::new(cache),
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Listado desde la caché si es fresco; si no, del servidor
    pub async fn load(&self) -> Result<Vec<Vehicle>, ClientError> {
        if let Some(entry) = self.cache.lock().await.get_fresh(CATALOG_KEY, Utc::now()) {
            tracing::debug!("📦 Catálogo servido desde caché ({} vehículos)", entry.value.len());
            return Ok(entry.value.clone());
        }

        self.refresh().await
    }

    /// Pedir el listado al servidor, abortando cualquier petición anterior
    pub async fn refresh(&self) -> Result<Vec<Vehicle>, ClientError> {
        let url = format!("{}/api/cars", self.base_url);
        let http = self.http.clone();

        let (generation, task) = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.generation += 1;

            let task = tokio::spawn(async move {
                let response = http.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(ClientError::Status(response.status()));
                }
                Ok(response.json::<Vec<Vehicle>>().await?)
            });

            if let Some(previous) = in_flight.handle.replace(task.abort_handle()) {
                previous.abort();
            }
            (in_flight.generation, task)
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ClientError::Cancelled),
            Err(e) => Err(ClientError::Task(e.to_string())),
        };

        let mut in_flight = self.in_flight.lock().await;
        // Otra petición (o un cancel) empezó mientras esperábamos
        if in_flight.generation != generation {
            return Err(ClientError::Cancelled);
        }
        in_flight.handle = None;

        let vehicles = result.map_err(|e| {
            tracing::error!("❌ Error cargando el catálogo: {}", e);
            e
        })?;

        // Con el lock de in_flight tomado ninguna petición nueva escribe antes
        self.cache.lock().await.put(CATALOG_KEY, vehicles.clone(), Utc::now());
        Ok(vehicles)
    }

    /// Abortar la petición en curso (p. ej. al desmontar la vista)
    pub async fn cancel(&self) {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.generation += 1;
        if let Some(handle) = in_flight.handle.take() {
            handle.abort();
        }
    }

    pub async fn invalidate(&self) {
        self.cache.lock().await.invalidate(CATALOG_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_is_generic() {
        assert_eq!(ClientError::Cancelled.failure_message(), "Failed to load cars");
        assert_eq!(
            ClientError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR).failure_message(),
            "Failed to load cars"
        );
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = CatalogClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let client = CatalogClient::new("http://127.0.0.1:1").unwrap();
        let err = client.load().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
