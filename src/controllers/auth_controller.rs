use crate::dto::auth_dto::{LoginRequest, LoginResponse, LogoutResponse, ValidateResponse};
use crate::models::auth::AdminIdentity;
use crate::services::auth_service::AdminAuthService;
use crate::utils::errors::{AppError, AppResult};

pub struct AuthController {
    auth: AdminAuthService,
}

impl AuthController {
    pub fn new(auth: AdminAuthService) -> Self {
        Self { auth }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(AppError::BadRequest("Username and password are required".to_string()));
        }

        let token = self.auth.login(request.username.trim(), &request.password).await?;
        Ok(LoginResponse::success(token))
    }

    pub fn validate(&self, identity: AdminIdentity) -> ValidateResponse {
        ValidateResponse {
            success: true,
            user: identity,
        }
    }

    /// Revocar la sesión si el token sigue siendo válido; siempre responde éxito
    pub async fn logout(&self, token: Option<&str>) -> LogoutResponse {
        if let Some(token) = token {
            match self.auth.validate(token).await {
                Ok(identity) => {
                    self.auth.logout(&identity).await;
                }
                Err(_) => log::debug!("Logout con token inválido o ya revocado"),
            }
        }

        LogoutResponse {
            success: true,
            message: "Logout successful".to_string(),
        }
    }
}
