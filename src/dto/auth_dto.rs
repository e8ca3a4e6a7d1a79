use serde::{Deserialize, Serialize};

use crate::models::auth::AdminIdentity;

// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: Option<String>,
    pub message: String,
}

impl LoginResponse {
    pub fn success(token: String) -> Self {
        Self {
            success: true,
            token: Some(token),
            message: "Login successful".to_string(),
        }
    }
}

// Validate response
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub user: AdminIdentity,
}

// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}
