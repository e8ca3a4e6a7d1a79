use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::jwt::JwtClaims;

/// Identidad del administrador autenticado (se adjunta a la request)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub username: String,
    pub role: String,
    #[serde(skip)]
    pub session_id: String,
}

impl From<&JwtClaims> for AdminIdentity {
    fn from(claims: &JwtClaims) -> Self {
        Self {
            username: claims.sub.clone(),
            role: claims.role.clone(),
            session_id: claims.jti.clone(),
        }
    }
}

/// Sesión emitida por el servidor; el token solo es válido mientras exista
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        let expires_at = Utc
            .timestamp_opt(claims.exp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self {
            session_id: claims.jti.clone(),
            username: claims.sub.clone(),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
