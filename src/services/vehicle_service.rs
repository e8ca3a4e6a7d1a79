//! Servicio CRUD de vehículos
//!
//! Valida el formulario, resuelve las imágenes y delega la persistencia al
//! `VehicleStore`. La categoría se calcula siempre a partir del tipo.

use std::sync::Arc;

use validator::Validate;

use super::image_resolver::{ImageInputs, ImageResolver, ImageWarning};
use crate::dto::vehicle_dto::VehicleForm;
use crate::models::vehicle::{ImageSlot, Vehicle, VehicleProperties, VehicleRecord, VehicleType};
use crate::repositories::VehicleStore;
use crate::utils::errors::{bad_request_error, not_found_error, AppResult};
use crate::utils::validation::{clean_text, coerce_non_negative_int, coerce_price, parse_year};

const RESOURCE: &str = "Car";

/// Resultado de una escritura con imágenes
#[derive(Debug)]
pub struct VehicleWrite {
    pub vehicle: Vehicle,
    pub warnings: Vec<ImageWarning>,
}

/// Convertir el formulario en propiedades validadas
pub fn validate_form(form: &VehicleForm) -> AppResult<VehicleProperties> {
    let brand = clean_text(form.brand.as_deref());
    let model = clean_text(form.model.as_deref());
    let year = parse_year(form.year.as_deref());

    let (Some(brand), Some(model), Some(year)) = (brand, model, year) else {
        return Err(bad_request_error("Brand, model, and year are required"));
    };

    let properties = VehicleProperties {
        brand,
        model,
        year,
        color: clean_text(form.color.as_deref()),
        seats: coerce_non_negative_int(form.seats.as_deref()),
        horsepower: coerce_non_negative_int(form.horsepower.as_deref()),
        vehicle_type: VehicleType::parse(form.vehicle_type.as_deref()),
        price_per_day: coerce_price(form.price_per_day.as_deref()),
        price_per_week: coerce_price(form.price_per_week.as_deref()),
        price_per_month: coerce_price(form.price_per_month.as_deref()),
    };

    properties.validate()?;
    Ok(properties)
}

#[derive(Clone)]
pub struct VehicleService {
    store: Arc<dyn VehicleStore>,
    images: ImageResolver,
}

impl VehicleService {
    pub fn new(store: Arc<dyn VehicleStore>, images: ImageResolver) -> Self {
        Self { store, images }
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    async fn load(&self, id: i32) -> AppResult<Vehicle> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(RESOURCE, id))
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        self.store.list_all().await
    }

    pub async fn get(&self, id: i32) -> AppResult<Vehicle> {
        self.load(id).await
    }

    pub async fn create(&self, form: VehicleForm, inputs: ImageInputs) -> AppResult<VehicleWrite> {
        let properties = validate_form(&form)?;

        if !inputs.has_source(ImageSlot::First) {
            return Err(bad_request_error("At least one image is required"));
        }

        let resolved = self.images.resolve_for_create(inputs).await;
        if resolved.images[ImageSlot::First.index()].url.is_none() {
            self.images.release(&resolved.uploaded_public_ids(None)).await;
            return Err(bad_request_error("Image 1 upload failed"));
        }

        let record = VehicleRecord {
            properties,
            images: resolved.images.clone(),
        };

        let vehicle = match self.store.insert(&record).await {
            Ok(vehicle) => vehicle,
            Err(e) => {
                // Las imágenes recién subidas quedarían huérfanas
                self.images.release(&resolved.uploaded_public_ids(None)).await;
                return Err(e);
            }
        };

        log::info!("🚗 Vehículo creado: {} {} {} (id {})", vehicle.brand, vehicle.model, vehicle.year, vehicle.id);
        Ok(VehicleWrite {
            vehicle,
            warnings: resolved.warnings,
        })
    }

    pub async fn update(&self, id: i32, form: VehicleForm, inputs: ImageInputs) -> AppResult<VehicleWrite> {
        let current = self.load(id).await?;
        let properties = validate_form(&form)?;

        let resolved = self.images.resolve_for_update(&current, inputs).await;
        let record = VehicleRecord {
            properties,
            images: resolved.images.clone(),
        };

        let updated = match self.store.update(id, &record).await {
            Ok(Some(vehicle)) => vehicle,
            Ok(None) => {
                self.images.release(&resolved.uploaded_public_ids(Some(&current))).await;
                return Err(not_found_error(RESOURCE, id));
            }
            Err(e) => {
                self.images.release(&resolved.uploaded_public_ids(Some(&current))).await;
                return Err(e);
            }
        };

        let mut warnings = resolved.warnings;
        warnings.extend(self.images.release(&resolved.orphaned).await);

        log::info!("✏️ Vehículo {} actualizado", id);
        Ok(VehicleWrite {
            vehicle: updated,
            warnings,
        })
    }

    /// Actualizar solo texto, specs y precios; las imágenes no se tocan
    pub async fn update_properties(&self, id: i32, form: VehicleForm) -> AppResult<Vehicle> {
        self.load(id).await?;
        let properties = validate_form(&form)?;

        let updated = self
            .store
            .update_properties(id, &properties)
            .await?
            .ok_or_else(|| not_found_error(RESOURCE, id))?;

        log::info!("✏️ Propiedades del vehículo {} actualizadas", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let current = self.load(id).await?;

        if !self.store.delete(id).await? {
            return Err(not_found_error(RESOURCE, id));
        }

        // Solo con la fila ya borrada
        self.images.release(&current.hosted_public_ids()).await;

        log::info!("🗑️ Vehículo {} eliminado", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryVehicleStore;
    use crate::services::image_host_service::DisabledImageHost;
    use crate::services::image_resolver::ImageSource;
    use crate::models::vehicle::StoredImage;
    use crate::services::image_host_service::{HostedImage, ImageHost};
    use crate::utils::errors::AppError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::path::Path;
    use std::sync::Mutex;

    /// Host que solo registra los borrados
    #[derive(Default)]
    struct RecordingHost {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageHost for RecordingHost {
        async fn upload(&self, _file: &Path, _folder: &str) -> anyhow::Result<HostedImage> {
            anyhow::bail!("uploads not used here")
        }

        async fn delete(&self, public_id: &str) -> anyhow::Result<()> {
            self.deleted.lock().unwrap().push(public_id.to_string());
            Ok(())
        }
    }

    /// Almacén en memoria cuyo borrado siempre falla
    #[derive(Default)]
    struct BrokenDeleteStore {
        inner: MemoryVehicleStore,
    }

    #[async_trait]
    impl VehicleStore for BrokenDeleteStore {
        async fn insert(&self, record: &VehicleRecord) -> AppResult<Vehicle> {
            self.inner.insert(record).await
        }

        async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
            self.inner.find_by_id(id).await
        }

        async fn list_all(&self) -> AppResult<Vec<Vehicle>> {
            self.inner.list_all().await
        }

        async fn update(&self, id: i32, record: &VehicleRecord) -> AppResult<Option<Vehicle>> {
            self.inner.update(id, record).await
        }

        async fn update_properties(
            &self,
            id: i32,
            properties: &VehicleProperties,
        ) -> AppResult<Option<Vehicle>> {
            self.inner.update_properties(id, properties).await
        }

        async fn delete(&self, _id: i32) -> AppResult<bool> {
            Err(AppError::Internal("disk full".to_string()))
        }

        async fn count(&self) -> AppResult<i64> {
            self.inner.count().await
        }
    }

    fn service(dir: &std::path::Path) -> VehicleService {
        let store: Arc<dyn VehicleStore> = Arc::new(MemoryVehicleStore::new());
        let resolver = ImageResolver::new(Arc::new(DisabledImageHost), "car-images", dir);
        VehicleService::new(store, resolver)
    }

    fn form(brand: &str, model: &str, year: &str) -> VehicleForm {
        VehicleForm {
            brand: Some(brand.into()),
            model: Some(model.into()),
            year: Some(year.into()),
            ..Default::default()
        }
    }

    fn url_inputs(url: &str) -> ImageInputs {
        let mut inputs = ImageInputs::default();
        inputs.slot_mut(ImageSlot::First).source = Some(ImageSource::Url(url.into()));
        inputs
    }

    #[test]
    fn test_validate_form_coerces_numbers() {
        let mut f = form("  Toyota ", "Corolla", "2024");
        f.seats = Some("abc".into());
        f.horsepower = Some("-5".into());
        f.price_per_day = Some("45.90".into());
        f.vehicle_type = Some("economy".into());

        let props = validate_form(&f).unwrap();
        assert_eq!(props.brand, "Toyota");
        assert_eq!(props.seats, None);
        assert_eq!(props.horsepower, None);
        assert_eq!(props.price_per_day, Some(Decimal::new(4590, 2)));
        assert_eq!(props.category(), 1);
    }

    #[test]
    fn test_validate_form_errors() {
        assert!(matches!(validate_form(&form("", "X", "2020")), Err(AppError::BadRequest(_))));
        assert!(matches!(validate_form(&form("A", "X", "soon")), Err(AppError::BadRequest(_))));
        assert!(matches!(validate_form(&form("A", "X", "1850")), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_requires_first_image() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let result = service.create(form("A", "B", "2020"), ImageInputs::default()).await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "At least one image is required"));
    }

    #[tokio::test]
    async fn test_failed_upload_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let mut inputs = url_inputs("https://example.com/1.jpg");
        let staged = service.images().stage(b"bytes", Some("2.jpg")).await.unwrap();
        inputs.slot_mut(ImageSlot::Second).source = Some(ImageSource::Upload(staged));

        let write = service.create(form("A", "B", "2020"), inputs).await.unwrap();
        assert_eq!(write.vehicle.image1.as_deref(), Some("https://example.com/1.jpg"));
        assert_eq!(write.vehicle.image2, None);
        assert_eq!(write.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejected_when_first_image_upload_fails() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let mut inputs = ImageInputs::default();
        let staged = service.images().stage(b"bytes", Some("1.jpg")).await.unwrap();
        inputs.slot_mut(ImageSlot::First).source = Some(ImageSource::Upload(staged));
        inputs.slot_mut(ImageSlot::Second).source = Some(ImageSource::Url("https://example.com/2.jpg".into()));

        let result = service.create(form("A", "B", "2020"), inputs).await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Image 1 upload failed"));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_of_missing_vehicle_is_not_found_before_validation() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let result = service.update(42, form("", "", ""), ImageInputs::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_properties_keeps_images_and_recomputes_category() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let created = service
            .create(form("A", "B", "2020"), url_inputs("https://example.com/1.jpg"))
            .await
            .unwrap()
            .vehicle;

        let mut changes = form("A", "B", "2021");
        changes.vehicle_type = Some("SUV".into());
        let updated = service.update_properties(created.id, changes).await.unwrap();

        assert_eq!(updated.image1, created.image1);
        assert_eq!(updated.year, 2021);
        assert_eq!(updated.category, 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let created = service
            .create(form("A", "B", "2020"), url_inputs("https://example.com/1.jpg"))
            .await
            .unwrap()
            .vehicle;

        service.delete(created.id).await.unwrap();
        assert!(matches!(service.get(created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_row_delete_keeps_hosted_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(BrokenDeleteStore::default());
        let host = Arc::new(RecordingHost::default());
        let service = VehicleService::new(
            store.clone(),
            ImageResolver::new(host.clone(), "car-images", dir.path()),
        );

        let record = VehicleRecord {
            properties: validate_form(&form("A", "B", "2020")).unwrap(),
            images: [
                StoredImage::hosted("https://cdn.example.com/a.jpg".into(), "car-images/a".into()),
                StoredImage::empty(),
                StoredImage::empty(),
            ],
        };
        let created = store.insert(&record).await.unwrap();

        assert!(matches!(service.delete(created.id).await, Err(AppError::Internal(_))));
        assert!(host.deleted.lock().unwrap().is_empty());
        assert!(service.get(created.id).await.is_ok());
    }
}
