use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{MessageResponse, VehicleForm, VehicleWriteResponse};
use crate::middleware::auth::require_admin;
use crate::models::vehicle::Vehicle;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Límite del body multipart (3 imágenes)
pub const MAX_UPLOAD_BODY_BYTES: usize = 30 * 1024 * 1024;

pub fn create_vehicle_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle));

    // Rutas de escritura: solo administrador
    let admin = Router::new()
        .route("/", post(create_vehicle))
        .route("/upload", post(create_vehicle))
        .route("/:id", put(update_vehicle).delete(delete_vehicle))
        .route("/:id/upload", put(update_vehicle))
        .route("/:id/properties", put(update_vehicle_properties))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
        .route_layer(from_fn_with_state(state, require_admin));

    public.merge(admin)
}

fn controller(state: &AppState) -> VehicleController {
    VehicleController::new(state.vehicles.clone())
}

async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, AppError> {
    let vehicles = controller(&state).list().await?;
    Ok(Json(vehicles))
}

async fn get_vehicle(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vehicle>, AppError> {
    let Path(id) = path?;
    let vehicle = controller(&state).get_by_id(id).await?;
    Ok(Json(vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<VehicleWriteResponse>), AppError> {
    let multipart = multipart?;
    let response = controller(&state).create(multipart).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VehicleWriteResponse>, AppError> {
    let Path(id) = path?;
    let multipart = multipart?;
    let response = controller(&state).update(id, multipart).await?;
    Ok(Json(response))
}

async fn update_vehicle_properties(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    form: Result<Json<VehicleForm>, JsonRejection>,
) -> Result<Json<Vehicle>, AppError> {
    let Path(id) = path?;
    let Json(form) = form?;
    let vehicle = controller(&state).update_properties(id, form).await?;
    Ok(Json(vehicle))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = path?;
    controller(&state).delete(id).await?;
    Ok(Json(MessageResponse::new("Car deleted successfully")))
}
