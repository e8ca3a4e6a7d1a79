use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::from_fn_with_state,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{LoginRequest, ValidateResponse};
use crate::middleware::{auth::token_from_headers, require_admin, login_rate_limit};
use crate::models::auth::AdminIdentity;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Configura las rutas de autenticación del administrador
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let login_route = post(login).route_layer(from_fn_with_state(state.clone(), login_rate_limit));

    Router::new()
        .route("/admin/login", login_route.clone())
        .route("/admin/auth", login_route)
        .route(
            "/admin/validate",
            get(validate).route_layer(from_fn_with_state(state, require_admin)),
        )
        .route("/admin/logout", post(logout))
}

fn session_cookie(token: &str, max_age: u64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "adminToken={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))
}

async fn login(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = request?;
    let response = AuthController::new(state.auth.clone()).login(request).await?;

    let token = response.token.clone().unwrap_or_default();
    let cookie = session_cookie(&token, state.auth.token_ttl(), state.config.is_production())?;

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(response)))
}

async fn validate(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
) -> Json<ValidateResponse> {
    Json(AuthController::new(state.auth.clone()).validate(identity))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = token_from_headers(&headers).ok();
    let response = AuthController::new(state.auth.clone())
        .logout(token.as_deref())
        .await;

    let cleared = session_cookie("", 0, state.config.is_production())?;
    Ok((AppendHeaders([(header::SET_COOKIE, cleared)]), Json(response)))
}
