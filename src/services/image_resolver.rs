//! Resolución de imágenes por slot
//!
//! Convierte lo que llega del formulario (archivo subido, URL directa o
//! "mantener la actual") en la URL que se guarda en cada slot. Los archivos
//! se escriben primero en un directorio temporal y se borran después del
//! intento de subida, tanto si sale bien como si falla.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::image_host_service::ImageHost;
use crate::models::vehicle::{ImageSlot, StoredImage, Vehicle};

/// Archivo subido guardado en disco mientras dura la request
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    removed: bool,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Borrar el archivo temporal
    pub async fn remove(mut self) {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("🧹 Archivo temporal borrado: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("⚠️ No se pudo borrar {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        // Requests abortadas o con error de validación no dejan archivos huérfanos
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Origen de una imagen nueva
#[derive(Debug)]
pub enum ImageSource {
    Upload(StagedUpload),
    Url(String),
}

/// Lo que el formulario pide para un slot
#[derive(Debug, Default)]
pub struct SlotInput {
    pub source: Option<ImageSource>,
    /// `Some(true)` mantener, `Some(false)` reemplazar o vaciar, `None` mantener salvo que haya origen nuevo
    pub keep: Option<bool>,
}

/// Entradas de los tres slots
#[derive(Debug, Default)]
pub struct ImageInputs {
    pub slots: [SlotInput; 3],
}

impl ImageInputs {
    pub fn slot(&self, slot: ImageSlot) -> &SlotInput {
        &self.slots[slot.index()]
    }

    pub fn slot_mut(&mut self, slot: ImageSlot) -> &mut SlotInput {
        &mut self.slots[slot.index()]
    }

    pub fn has_source(&self, slot: ImageSlot) -> bool {
        self.slot(slot).source.is_some()
    }
}

/// Fallo parcial: el vehículo se guardó pero una imagen no
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageWarning {
    pub slot: ImageSlot,
    pub message: String,
}

/// Resultado de resolver los tres slots
#[derive(Debug, Default)]
pub struct ResolvedImages {
    pub images: [StoredImage; 3],
    pub warnings: Vec<ImageWarning>,
    /// Handles remotos que dejan de estar referenciados
    pub orphaned: Vec<(ImageSlot, String)>,
}

impl ResolvedImages {
    /// Handles de imágenes subidas en esta request
    pub fn uploaded_public_ids(&self, previous: Option<&Vehicle>) -> Vec<(ImageSlot, String)> {
        let old: Vec<String> = previous
            .map(|v| v.hosted_public_ids().into_iter().map(|(_, id)| id).collect())
            .unwrap_or_default();
        ImageSlot::ALL
            .into_iter()
            .zip(self.images.iter())
            .filter_map(|(slot, image)| image.public_id.clone().map(|id| (slot, id)))
            .filter(|(_, id)| !old.contains(id))
            .collect()
    }
}

#[derive(Clone)]
pub struct ImageResolver {
    host: Arc<dyn ImageHost>,
    folder: String,
    temp_dir: PathBuf,
}

impl ImageResolver {
    pub fn new(host: Arc<dyn ImageHost>, folder: impl Into<String>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            host,
            folder: folder.into(),
            temp_dir: temp_dir.into(),
        }
    }

    /// Guardar los bytes recibidos en el directorio temporal
    pub async fn stage(&self, bytes: &[u8], original_name: Option<&str>) -> Result<StagedUpload> {
        tokio::fs::create_dir_all(&self.temp_dir)
            .await
            .with_context(|| format!("No se pudo crear {}", self.temp_dir.display()))?;

        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();

        let path = self.temp_dir.join(format!("{}{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("No se pudo escribir {}", path.display()))?;

        debug!("📥 Archivo temporal creado: {} ({} bytes)", path.display(), bytes.len());
        Ok(StagedUpload { path, removed: false })
    }

    /// Subir o aceptar la URL; el archivo temporal se borra siempre
    async fn store_source(&self, slot: ImageSlot, source: ImageSource) -> Result<StoredImage, ImageWarning> {
        match source {
            ImageSource::Url(url) => Ok(StoredImage::external(url)),
            ImageSource::Upload(staged) => {
                let result = self.host.upload(staged.path(), &self.folder).await;
                staged.remove().await;

                match result {
                    Ok(hosted) => {
                        info!("☁️ {} subida: {}", slot, hosted.public_id);
                        Ok(StoredImage::hosted(hosted.secure_url, hosted.public_id))
                    }
                    Err(e) => {
                        warn!("⚠️ Error subiendo {}: {:#}", slot, e);
                        Err(ImageWarning {
                            slot,
                            message: format!("Upload of {} failed: {}", slot, e),
                        })
                    }
                }
            }
        }
    }

    /// Slots de un vehículo nuevo: origen o vacío
    pub async fn resolve_for_create(&self, inputs: ImageInputs) -> ResolvedImages {
        let mut resolved = ResolvedImages::default();

        for (index, input) in inputs.slots.into_iter().enumerate() {
            let Some(slot) = ImageSlot::from_index(index) else { continue };
            let Some(source) = input.source else { continue };

            match self.store_source(slot, source).await {
                Ok(image) => resolved.images[index] = image,
                Err(warning) => resolved.warnings.push(warning),
            }
        }

        resolved
    }

    /// Slots de un vehículo existente según los flags `keep`
    pub async fn resolve_for_update(&self, current: &Vehicle, inputs: ImageInputs) -> ResolvedImages {
        let mut resolved = ResolvedImages::default();

        for (index, input) in inputs.slots.into_iter().enumerate() {
            let Some(slot) = ImageSlot::from_index(index) else { continue };
            let existing = current.image(slot);

            let next = match (input.keep, input.source) {
                (Some(true), Some(ignored)) => {
                    warn!("⚠️ {} marcado para mantener, se ignora el origen nuevo", slot);
                    if let ImageSource::Upload(staged) = ignored {
                        staged.remove().await;
                    }
                    existing.clone()
                }
                (Some(true), None) | (None, None) => existing.clone(),
                (Some(false), None) => StoredImage::empty(),
                (_, Some(ImageSource::Url(url))) if existing.url.as_deref() == Some(url.as_str()) => {
                    existing.clone()
                }
                (_, Some(source)) => match self.store_source(slot, source).await {
                    Ok(image) => image,
                    Err(warning) => {
                        resolved.warnings.push(warning);
                        existing.clone()
                    }
                },
            };

            if let Some(old_id) = &existing.public_id {
                if next.public_id.as_ref() != Some(old_id) {
                    resolved.orphaned.push((slot, old_id.clone()));
                }
            }

            resolved.images[index] = next;
        }

        resolved
    }

    /// Liberar imágenes remotas; los fallos solo se registran
    pub async fn release(&self, public_ids: &[(ImageSlot, String)]) -> Vec<ImageWarning> {
        if public_ids.is_empty() {
            return Vec::new();
        }

        let results = join_all(public_ids.iter().map(|(_, id)| self.host.delete(id))).await;

        let mut warnings = Vec::new();
        for ((slot, public_id), result) in public_ids.iter().zip(results) {
            if let Err(e) = result {
                warn!("⚠️ No se pudo borrar la imagen remota {} de {}: {:#}", public_id, slot, e);
                warnings.push(ImageWarning {
                    slot: *slot,
                    message: format!("Failed to release {} ({}): {}", slot, public_id, e),
                });
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::image_host_service::HostedImage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Host falso: falla si el archivo o el handle contienen "fail"
    #[derive(Default)]
    struct FakeHost {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageHost for FakeHost {
        async fn upload(&self, file: &Path, folder: &str) -> Result<HostedImage> {
            let content = tokio::fs::read_to_string(file).await?;
            if content.contains("fail") {
                anyhow::bail!("simulated outage");
            }
            Ok(HostedImage {
                secure_url: format!("https://cdn.example.com/{}/{}", folder, content),
                public_id: format!("{}/{}", folder, content),
            })
        }

        async fn delete(&self, public_id: &str) -> Result<()> {
            if public_id.contains("fail") {
                anyhow::bail!("host down");
            }
            self.deleted.lock().unwrap().push(public_id.to_string());
            Ok(())
        }
    }

    fn resolver(dir: &Path) -> (ImageResolver, Arc<FakeHost>) {
        let host = Arc::new(FakeHost::default());
        (ImageResolver::new(host.clone(), "car-images", dir), host)
    }

    fn vehicle_with_hosted_image() -> Vehicle {
        Vehicle {
            id: 1,
            brand: "Audi".into(),
            model: "R8".into(),
            year: 2022,
            image1: Some("https://cdn.example.com/car-images/old".into()),
            image2: Some("https://elsewhere.example.com/b.jpg".into()),
            image3: None,
            image1_public_id: Some("car-images/old".into()),
            image2_public_id: None,
            image3_public_id: None,
            color: None,
            seats: None,
            horsepower: None,
            vehicle_type: "Sport".into(),
            category: 2,
            price_per_day: None,
            price_per_week: None,
            price_per_month: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_upload_success_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let (resolver, _) = resolver(dir.path());

        let mut inputs = ImageInputs::default();
        let staged = resolver.stage(b"new", Some("photo.JPG")).await.unwrap();
        assert!(staged.path().to_string_lossy().ends_with(".jpg"));
        inputs.slot_mut(ImageSlot::First).source = Some(ImageSource::Upload(staged));

        let resolved = resolver.resolve_for_create(inputs).await;
        assert_eq!(resolved.images[0].public_id.as_deref(), Some("car-images/new"));
        assert!(resolved.warnings.is_empty());
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_is_a_warning_and_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let (resolver, _) = resolver(dir.path());

        let mut inputs = ImageInputs::default();
        inputs.slot_mut(ImageSlot::First).source =
            Some(ImageSource::Url("https://example.com/a.jpg".into()));
        let staged = resolver.stage(b"fail", Some("b.png")).await.unwrap();
        inputs.slot_mut(ImageSlot::Second).source = Some(ImageSource::Upload(staged));

        let resolved = resolver.resolve_for_create(inputs).await;
        assert_eq!(resolved.images[0].url.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(resolved.images[1], StoredImage::empty());
        assert_eq!(resolved.warnings.len(), 1);
        assert_eq!(resolved.warnings[0].slot, ImageSlot::Second);
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_keep_flag_semantics() {
        let dir = tempfile::tempdir().unwrap();
        let (resolver, _) = resolver(dir.path());
        let current = vehicle_with_hosted_image();

        // slot1 keep=true sin origen, slot2 keep=false sin origen, slot3 sin flag
        let mut inputs = ImageInputs::default();
        inputs.slot_mut(ImageSlot::First).keep = Some(true);
        inputs.slot_mut(ImageSlot::Second).keep = Some(false);

        let resolved = resolver.resolve_for_update(&current, inputs).await;
        assert_eq!(resolved.images[0], current.image(ImageSlot::First));
        assert_eq!(resolved.images[1], StoredImage::empty());
        assert_eq!(resolved.images[2], StoredImage::empty());
        assert!(resolved.orphaned.is_empty());
    }

    #[tokio::test]
    async fn test_replacing_hosted_image_orphans_old_handle() {
        let dir = tempfile::tempdir().unwrap();
        let (resolver, _) = resolver(dir.path());
        let current = vehicle_with_hosted_image();

        let mut inputs = ImageInputs::default();
        inputs.slot_mut(ImageSlot::First).keep = Some(false);
        inputs.slot_mut(ImageSlot::First).source =
            Some(ImageSource::Url("https://example.com/new.jpg".into()));

        let resolved = resolver.resolve_for_update(&current, inputs).await;
        assert_eq!(resolved.images[0].url.as_deref(), Some("https://example.com/new.jpg"));
        assert_eq!(resolved.orphaned, vec![(ImageSlot::First, "car-images/old".to_string())]);
        // slot2 sin flag ni origen se mantiene
        assert_eq!(resolved.images[1], current.image(ImageSlot::Second));
    }

    #[tokio::test]
    async fn test_failed_replacement_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let (resolver, _) = resolver(dir.path());
        let current = vehicle_with_hosted_image();

        let mut inputs = ImageInputs::default();
        let staged = resolver.stage(b"fail", None).await.unwrap();
        inputs.slot_mut(ImageSlot::First).source = Some(ImageSource::Upload(staged));

        let resolved = resolver.resolve_for_update(&current, inputs).await;
        assert_eq!(resolved.images[0], current.image(ImageSlot::First));
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.orphaned.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_staged_upload_is_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let (resolver, _) = resolver(dir.path());
        {
            let _staged = resolver.stage(b"abandoned", None).await.unwrap();
            assert_eq!(temp_files(dir.path()), 1);
        }
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_release_calls_host() {
        let dir = tempfile::tempdir().unwrap();
        let (resolver, host) = resolver(dir.path());
        let warnings = resolver
            .release(&[
                (ImageSlot::First, "car-images/a".to_string()),
                (ImageSlot::Second, "car-images/b".to_string()),
            ])
            .await;
        assert!(warnings.is_empty());
        assert_eq!(host.deleted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_release_failure_names_the_slot() {
        let dir = tempfile::tempdir().unwrap();
        let (resolver, _) = resolver(dir.path());

        let mut current = vehicle_with_hosted_image();
        current.image3 = Some("https://cdn.example.com/car-images/third".into());
        current.image3_public_id = Some("car-images/fail-third".into());

        let mut inputs = ImageInputs::default();
        inputs.slot_mut(ImageSlot::First).keep = Some(true);
        inputs.slot_mut(ImageSlot::Third).keep = Some(false);

        let resolved = resolver.resolve_for_update(&current, inputs).await;
        assert_eq!(resolved.orphaned, vec![(ImageSlot::Third, "car-images/fail-third".to_string())]);

        let warnings = resolver.release(&resolved.orphaned).await;
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].slot, ImageSlot::Third);
        assert!(warnings[0].message.contains("image3"));
    }
}
