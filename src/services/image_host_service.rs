//! Cliente del host de imágenes
//!
//! API compatible con Cloudinary: subida multipart firmada a
//! `{api_base}/{cloud}/image/upload` y borrado por `public_id` en
//! `{api_base}/{cloud}/image/destroy`. Las firmas usan SHA-256 sobre los
//! parámetros ordenados más el secreto.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::environment::ImageHostConfig;

/// Imagen subida: URL segura y handle para borrarla después
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub secure_url: String,
    pub public_id: String,
}

/// Host externo de imágenes
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Subir un archivo local dentro de `folder`
    async fn upload(&self, file: &Path, folder: &str) -> Result<HostedImage>;

    /// Borrar una imagen por su handle remoto
    async fn delete(&self, public_id: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct UploadApiResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyApiResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
    message: String,
}

pub struct HostedAssetClient {
    config: ImageHostConfig,
    client: reqwest::Client,
}

impl HostedAssetClient {
    pub fn new(config: ImageHostConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    async fn read_error(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        match response.json::<ApiErrorBody>().await {
            Ok(body) => anyhow!("Image host returned {}: {}", status, body.error.message),
            Err(_) => anyhow!("Image host returned {}", status),
        }
    }
}

/// Firma de la API: `sha256("k1=v1&k2=v2" + secret)` con claves ordenadas
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ImageHost for HostedAssetClient {
    async fn upload(&self, file: &Path, folder: &str) -> Result<HostedImage> {
        log::info!("☁️ Subiendo imagen {} a la carpeta '{}'", file.display(), folder);

        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("No se pudo leer {}", file.display()))?;

        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let timestamp = Self::timestamp();
        let signature = sign_params(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name))
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .context("Error de red subiendo imagen")?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: UploadApiResponse = response
            .json()
            .await
            .context("Respuesta de subida inválida")?;

        log::info!("✅ Imagen subida: {}", body.public_id);
        Ok(HostedImage {
            secure_url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        log::info!("🗑️ Borrando imagen remota {}", public_id);

        let timestamp = Self::timestamp();
        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.config.api_key.clone()),
            ("signature_algorithm", "sha256".to_string()),
            ("signature", signature),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await
            .context("Error de red borrando imagen")?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: DestroyApiResponse = response
            .json()
            .await
            .context("Respuesta de borrado inválida")?;

        // "not found" también cuenta: la imagen ya no existe
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(anyhow!("Borrado rechazado por el host: {}", other)),
        }
    }
}

/// Host usado cuando no hay credenciales: las subidas fallan, los borrados no hacen nada
pub struct DisabledImageHost;

#[async_trait]
impl ImageHost for DisabledImageHost {
    async fn upload(&self, _file: &Path, _folder: &str) -> Result<HostedImage> {
        Err(anyhow!("Image host is not configured"))
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        log::warn!("⚠️ Host de imágenes no configurado, no se borra {}", public_id);
        Ok(())
    }
}
