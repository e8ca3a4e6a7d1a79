//! Middleware de autenticación del administrador
//!
//! Acepta el token desde `Authorization: Bearer` o desde la cookie
//! `adminToken`, lo valida contra el registro de sesiones e inyecta la
//! `AdminIdentity` en las extensions de la request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_cookies, extract_token_from_header},
    },
};

/// Token del header o, si no hay header, de la cookie
pub fn token_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        return extract_token_from_header(auth_header).map(str::to_string);
    }

    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_token_from_cookies)
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// Middleware que exige una sesión de administrador válida
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(request.headers())?;
    let identity = state.auth.validate(&token).await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("adminToken=from-cookie"));
        assert_eq!(token_from_headers(&headers).unwrap(), "from-header");
    }

    #[test]
    fn test_cookie_fallback_and_missing() {
        let mut headers = HeaderMap::new();
        assert!(token_from_headers(&headers).is_err());

        headers.insert(header::COOKIE, HeaderValue::from_static("lang=es; adminToken=abc"));
        assert_eq!(token_from_headers(&headers).unwrap(), "abc");
    }
}
