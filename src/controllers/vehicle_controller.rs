use axum::extract::multipart::{Field, Multipart};

use crate::dto::vehicle_dto::{VehicleForm, VehicleWriteResponse};
use crate::models::vehicle::{ImageSlot, Vehicle};
use crate::services::image_resolver::{ImageInputs, ImageResolver, ImageSource, StagedUpload};
use crate::services::vehicle_service::{VehicleService, VehicleWrite};
use crate::utils::errors::{bad_request_error, AppError, AppResult};
use crate::utils::validation::{clean_text, parse_flag};

/// Máximo de archivos por request
pub const MAX_FILES: usize = 3;

/// Formulario multipart ya separado en texto e imágenes
#[derive(Debug, Default)]
pub struct VehicleSubmission {
    pub form: VehicleForm,
    pub images: ImageInputs,
}

// Slot indicado por el nombre del campo: "image2", "image2_url", "imageUrl2", "keepImage2"
fn slot_from_suffix(name: &str, prefix: &str, suffix: &str) -> Option<ImageSlot> {
    let number = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
    let index = number.parse::<usize>().ok()?.checked_sub(1)?;
    ImageSlot::from_index(index)
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", e))
}

async fn read_text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(multipart_error)
}

/// Leer el multipart: campos de texto al formulario, archivos al directorio temporal
pub async fn parse_vehicle_multipart(
    resolver: &ImageResolver,
    mut multipart: Multipart,
) -> AppResult<VehicleSubmission> {
    let mut submission = VehicleSubmission::default();
    let mut slot_files: Vec<(ImageSlot, StagedUpload)> = Vec::new();
    let mut loose_files: Vec<StagedUpload> = Vec::new();
    let mut urls_only = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_string);

        if let Some(file_name) = file_name {
            if name != "images" && slot_from_suffix(&name, "image", "").is_none() {
                log::debug!("Archivo en campo desconocido '{}' ignorado", name);
                continue;
            }

            let bytes = field.bytes().await.map_err(multipart_error)?;
            // Input de archivo vacío en el navegador
            if bytes.is_empty() && file_name.is_empty() {
                continue;
            }

            if slot_files.len() + loose_files.len() >= MAX_FILES {
                return Err(bad_request_error("At most 3 images can be uploaded"));
            }

            let staged = resolver
                .stage(&bytes, Some(&file_name))
                .await
                .map_err(|e| AppError::Internal(format!("{:#}", e)))?;

            match slot_from_suffix(&name, "image", "") {
                Some(slot) => slot_files.push((slot, staged)),
                None => loose_files.push(staged),
            }
            continue;
        }

        let url_slot = slot_from_suffix(&name, "image", "_url")
            .or_else(|| slot_from_suffix(&name, "imageUrl", ""))
            .or_else(|| slot_from_suffix(&name, "image", ""));
        if let Some(slot) = url_slot {
            if let Some(url) = clean_text(Some(&read_text(field).await?)) {
                submission.images.slot_mut(slot).source = Some(ImageSource::Url(url));
            }
            continue;
        }

        if let Some(slot) = slot_from_suffix(&name, "keepImage", "") {
            submission.images.slot_mut(slot).keep = parse_flag(Some(&read_text(field).await?));
            continue;
        }

        if name == "uploadMethod" {
            urls_only = read_text(field).await?.trim().eq_ignore_ascii_case("url");
            continue;
        }

        let value = read_text(field).await?;
        if !submission.form.set_field(&name, value) {
            log::debug!("Campo '{}' ignorado", name);
        }
    }

    if urls_only {
        // Los archivos se borran al soltarlos
        if !slot_files.is_empty() || !loose_files.is_empty() {
            log::warn!("⚠️ uploadMethod=url: se ignoran los archivos recibidos");
        }
        return Ok(submission);
    }

    // El archivo explícito del slot tiene prioridad sobre la URL
    for (slot, staged) in slot_files {
        submission.images.slot_mut(slot).source = Some(ImageSource::Upload(staged));
    }

    // "images" repetido: en orden, a los slots libres que no se mantienen
    let mut loose = loose_files.into_iter();
    for slot in ImageSlot::ALL {
        let input = submission.images.slot(slot);
        if input.source.is_some() || input.keep == Some(true) {
            continue;
        }
        match loose.next() {
            Some(staged) => submission.images.slot_mut(slot).source = Some(ImageSource::Upload(staged)),
            None => break,
        }
    }
    if loose.next().is_some() {
        log::warn!("⚠️ Sobran archivos: todos los slots están ocupados o se mantienen");
    }

    Ok(submission)
}

pub struct VehicleController {
    service: VehicleService,
}

impl VehicleController {
    pub fn new(service: VehicleService) -> Self {
        Self { service }
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = self.service.list().await?;
        log::info!("📋 Devolviendo {} vehículos", vehicles.len());
        Ok(vehicles)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Vehicle> {
        self.service.get(id).await
    }

    pub async fn create(&self, multipart: Multipart) -> AppResult<VehicleWriteResponse> {
        let submission = parse_vehicle_multipart(self.service.images(), multipart).await?;
        let write = self.service.create(submission.form, submission.images).await?;
        Ok(into_response(write))
    }

    pub async fn update(&self, id: i32, multipart: Multipart) -> AppResult<VehicleWriteResponse> {
        let submission = parse_vehicle_multipart(self.service.images(), multipart).await?;
        let write = self.service.update(id, submission.form, submission.images).await?;
        Ok(into_response(write))
    }

    pub async fn update_properties(&self, id: i32, form: VehicleForm) -> AppResult<Vehicle> {
        self.service.update_properties(id, form).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.service.delete(id).await
    }
}

fn into_response(write: VehicleWrite) -> VehicleWriteResponse {
    VehicleWriteResponse {
        vehicle: write.vehicle,
        warnings: write.warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_from_field_names() {
        assert_eq!(slot_from_suffix("image2", "image", ""), Some(ImageSlot::Second));
        assert_eq!(slot_from_suffix("image3_url", "image", "_url"), Some(ImageSlot::Third));
        assert_eq!(slot_from_suffix("imageUrl1", "imageUrl", ""), Some(ImageSlot::First));
        assert_eq!(slot_from_suffix("keepImage2", "keepImage", ""), Some(ImageSlot::Second));
        assert_eq!(slot_from_suffix("image4", "image", ""), None);
        assert_eq!(slot_from_suffix("image0", "image", ""), None);
        assert_eq!(slot_from_suffix("images", "image", ""), None);
    }
}
