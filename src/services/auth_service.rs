//! Autenticación del administrador
//!
//! Credenciales únicas (`ADMIN_USERNAME` + hash bcrypt) y sesiones registradas
//! en el servidor: un JWT solo es válido mientras su `jti` siga en el registro.

use std::collections::HashMap;
use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use tokio::sync::RwLock;

use crate::config::environment::EnvironmentConfig;
use crate::models::auth::{AdminIdentity, AdminSession};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, verify_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Incorrect username or password";

#[derive(Clone)]
pub struct AdminAuthService {
    jwt: JwtConfig,
    username: String,
    password_hash: Option<String>,
    sessions: Arc<RwLock<HashMap<String, AdminSession>>>,
}

impl AdminAuthService {
    pub fn new(config: &EnvironmentConfig) -> AppResult<Self> {
        let password_hash = match (&config.admin_password_hash, &config.admin_password) {
            (Some(hash), _) => Some(hash.clone()),
            (None, Some(plain)) => {
                tracing::warn!("⚠️ ADMIN_PASSWORD en texto plano, usa ADMIN_PASSWORD_HASH en producción");
                Some(hash(plain, DEFAULT_COST).map_err(|e| AppError::Hash(e.to_string()))?)
            }
            (None, None) => {
                tracing::warn!("⚠️ Sin credenciales de administrador: el login está deshabilitado");
                None
            }
        };

        Ok(Self::with_hash(JwtConfig::from(config), config.admin_username.clone(), password_hash))
    }

    pub fn with_hash(jwt: JwtConfig, username: String, password_hash: Option<String>) -> Self {
        Self {
            jwt,
            username,
            password_hash,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Verificar credenciales y emitir un token con sesión registrada
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let Some(stored_hash) = self.password_hash.clone() else {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        // bcrypt es costoso: fuera del runtime async
        let candidate = password.to_string();
        let password_ok = tokio::task::spawn_blocking(move || verify(candidate, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if username != self.username || !password_ok {
            tracing::warn!("🔒 Login fallido para '{}'", username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let (token, claims) = generate_token(username, &self.jwt)?;
        let session = AdminSession::from_claims(&claims);

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired());
        sessions.insert(session.session_id.clone(), session);

        tracing::info!("🔑 Login de administrador: {}", username);
        Ok(token)
    }

    /// Token válido y sesión viva
    pub async fn validate(&self, token: &str) -> AppResult<AdminIdentity> {
        let claims = verify_token(token, &self.jwt)?;

        let sessions = self.sessions.read().await;
        match sessions.get(&claims.jti) {
            Some(session) if !session.is_expired() => Ok(AdminIdentity::from(&claims)),
            _ => Err(AppError::Unauthorized("Session expired or revoked".to_string())),
        }
    }

    /// Revocar la sesión; devuelve false si ya no existía
    pub async fn logout(&self, identity: &AdminIdentity) -> bool {
        let removed = self.sessions.write().await.remove(&identity.session_id).is_some();
        if removed {
            tracing::info!("👋 Logout de administrador: {}", identity.username);
        }
        removed
    }

    /// Vida del token en segundos
    pub fn token_ttl(&self) -> u64 {
        self.jwt.expiration
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.values().filter(|s| !s.is_expired()).count()
    }
}
