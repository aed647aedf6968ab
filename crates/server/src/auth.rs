//! API key authentication
//!
//! When `server.auth.enabled` is set, every path outside
//! `server.auth.public_paths` needs `Authorization: Bearer <api_key>`.
//! Rejections use the same JSON error body as the handlers.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use avatar_assistant_config::Settings;

use crate::ServerError;

static DISABLED_WARNING_LOGGED: AtomicBool = AtomicBool::new(false);

const BEARER_PREFIX: &str = "Bearer ";

/// Access rule for one request path
#[derive(Debug, PartialEq, Eq)]
enum Access {
    Open,
    RequiresKey(String),
}

/// Resolve the rule for `path` from the current settings
fn access_for(settings: &Settings, path: &str) -> Result<Access, ServerError> {
    let auth = &settings.server.auth;

    if !auth.enabled {
        if !DISABLED_WARNING_LOGGED.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "API authentication is disabled; set AVATAR_ASSISTANT__SERVER__AUTH__ENABLED=true in production"
            );
        }
        return Ok(Access::Open);
    }

    if auth.public_paths.iter().any(|prefix| path.starts_with(prefix.as_str())) {
        return Ok(Access::Open);
    }

    match auth.api_key.as_deref() {
        Some(key) if !key.is_empty() => Ok(Access::RequiresKey(key.to_string())),
        _ => {
            tracing::error!("Authentication is enabled without an API key");
            Err(ServerError::Internal(
                "Server authentication not configured".to_string(),
            ))
        }
    }
}

/// Token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Result<&str, ServerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ServerError::Auth("Missing Authorization header".to_string()))?;

    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| {
            ServerError::InvalidRequest(
                "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
            )
        })
}

/// Check `request` against the configured key
fn authorize(config: &Arc<RwLock<Settings>>, request: &Request) -> Result<(), ServerError> {
    let path = request.uri().path();
    // Guard released here, before the handler runs
    let access = access_for(&config.read(), path)?;

    let Access::RequiresKey(expected) = access else {
        return Ok(());
    };

    let provided = bearer_token(request.headers())?;
    if keys_match(provided.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        tracing::warn!(
            path = %path,
            forwarded_for = ?request.headers().get("X-Forwarded-For"),
            "Rejected request with invalid API key"
        );
        Err(ServerError::Auth("Invalid API key".to_string()))
    }
}

/// Middleware enforcing the API key
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let Some(config) = request.extensions().get::<Arc<RwLock<Settings>>>().cloned() else {
        tracing::error!("Settings extension missing from request");
        return ServerError::Internal("Server configuration error".to_string()).into_response();
    };

    match authorize(&config, &request) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Compare in time independent of where the keys differ
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    fn settings_with_key(key: Option<&str>) -> Settings {
        let mut settings = Settings::default();
        settings.server.auth.enabled = true;
        settings.server.auth.api_key = key.map(str::to_string);
        settings
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match(b"secret", b"secret"));
        assert!(!keys_match(b"secret", b"secre"));
        assert!(!keys_match(b"secret", b"secreT"));
    }

    #[test]
    fn test_access_for_paths() {
        assert_eq!(
            access_for(&Settings::default(), "/api/sessions").unwrap(),
            Access::Open
        );

        let settings = settings_with_key(Some("secret"));
        assert_eq!(access_for(&settings, "/health").unwrap(), Access::Open);
        assert_eq!(
            access_for(&settings, "/media/audio/speech_1.mp3").unwrap(),
            Access::Open
        );
        assert_eq!(
            access_for(&settings, "/api/sessions").unwrap(),
            Access::RequiresKey("secret".to_string())
        );

        let settings = settings_with_key(None);
        assert!(matches!(
            access_for(&settings, "/api/sessions"),
            Err(ServerError::Internal(_))
        ));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(ServerError::Auth(_))));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            bearer_token(&headers),
            Err(ServerError::InvalidRequest(_))
        ));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn test_authorize_rejects_wrong_key() {
        let config = Arc::new(RwLock::new(settings_with_key(Some("secret"))));
        let request = Request::get("/api/sessions")
            .header(header::AUTHORIZATION, "Bearer nope")
            .body(Body::empty())
            .unwrap();

        let err = authorize(&config, &request).unwrap_err();
        assert_eq!(err.to_string(), "Authentication error: Invalid API key");
    }
}
