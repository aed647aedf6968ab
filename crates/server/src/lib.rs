//! Avatar Assistant Server
//!
//! Provides the HTTP API for sessions, knowledge uploads and chat turns, and
//! serves synthesized audio.

pub mod auth;
pub mod http;
pub mod metrics;
pub mod session;
pub mod state;

pub use crate::auth::auth_middleware;
pub use crate::http::create_router;
pub use crate::metrics::{
    init_metrics, record_avatar_latency, record_error, record_llm_latency, record_request,
    record_total_latency, record_tts_latency,
};
pub use crate::session::{Session, SessionManager};
pub use crate::state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use avatar_assistant_agent::AgentError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    Session(String),

    #[error("Max sessions reached")]
    SessionLimit,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Session(_) => StatusCode::NOT_FOUND,
            ServerError::SessionLimit => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::CredentialsMissing | AgentError::EmptyInput => {
                ServerError::InvalidRequest(err.to_string())
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status = StatusCode::from(self);
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
