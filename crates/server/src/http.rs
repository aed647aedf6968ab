//! HTTP Endpoints
//!
//! REST API for the avatar assistant.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use avatar_assistant_agent::ProfileUpdate;
use avatar_assistant_rag::{IngestReport, KnowledgeBase, UploadedDocument};

use crate::auth::auth_middleware;
use crate::metrics::{metrics_handler, record_request, record_turn};
use crate::session::Session;
use crate::state::AppState;
use crate::ServerError;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.timeout_seconds);
    let audio_dir = config.voice.output_dir.clone();
    drop(config);

    let router = Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route(
            "/api/sessions/:id",
            get(get_session).patch(update_session).delete(delete_session),
        )
        .route("/api/sessions/:id/knowledge", post(upload_knowledge))
        .route("/api/sessions/:id/messages", get(list_messages))
        // Chat endpoint
        .route("/api/chat/:id", post(chat))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Synthesized speech
        .nest_service("/media/audio", ServeDir::new(audio_dir));

    router
        .layer(axum::middleware::from_fn(auth_middleware))
        .layer(Extension(state.config.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty or all invalid, falls back to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEFAULT_CORS_ORIGIN);
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(DEFAULT_CORS_ORIGIN))
            .allow_methods(CORS_METHODS)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(CORS_METHODS)
        .allow_headers(Any)
}

fn find_session(state: &AppState, id: &str) -> Result<std::sync::Arc<Session>, ServerError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| ServerError::Session(id.to_string()))
}

/// Session summary. Credentials are reported as present or absent only.
#[derive(Debug, Serialize)]
struct SessionSummary {
    session_id: String,
    active: bool,
    created_at: String,
    language: avatar_assistant_core::LanguagePreference,
    credentials_configured: bool,
    avatar_configured: bool,
    knowledge_sources: Vec<String>,
    turn_count: usize,
}

impl SessionSummary {
    fn of(session: &Session) -> Self {
        let profile = session.assistant.profile();
        Self {
            session_id: session.id.clone(),
            active: session.is_active(),
            created_at: session.created_at.to_rfc3339(),
            language: profile.language,
            credentials_configured: profile.credentials.is_configured(),
            avatar_configured: profile.avatar.target().is_some(),
            knowledge_sources: session.assistant.knowledge().sources().to_vec(),
            turn_count: session.assistant.conversation().len(),
        }
    }
}

/// Create session. An empty body is allowed and settings supply whatever
/// the body omits. A body that is present must be a valid profile.
async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionSummary>), ServerError> {
    let update = if body.iter().all(u8::is_ascii_whitespace) {
        ProfileUpdate::default()
    } else {
        serde_json::from_slice::<ProfileUpdate>(&body)
            .map_err(|e| ServerError::InvalidBody(e.to_string()))?
    };
    let session = state.sessions.create(state.new_assistant(update))?;
    Ok((StatusCode::CREATED, Json(SessionSummary::of(&session))))
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, ServerError> {
    let session = find_session(&state, &id)?;
    Ok(Json(SessionSummary::of(&session)))
}

/// Update credentials, language or avatar settings
async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<SessionSummary>, ServerError> {
    let session = find_session(&state, &id)?;
    session.touch();
    session.assistant.update_profile(update);
    tracing::info!(session_id = %id, "Session profile updated");
    Ok(Json(SessionSummary::of(&session)))
}

/// Delete session
async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if state.sessions.remove(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct KnowledgeUpload {
    documents: Vec<UploadedDocument>,
}

#[derive(Debug, Serialize)]
struct KnowledgeResponse {
    #[serde(flatten)]
    report: IngestReport,
    corpus_bytes: usize,
}

/// Replace the session's knowledge corpus
async fn upload_knowledge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(upload): Json<KnowledgeUpload>,
) -> Result<Json<KnowledgeResponse>, ServerError> {
    let session = find_session(&state, &id)?;
    session.touch();

    let (knowledge, report) = KnowledgeBase::from_documents(&upload.documents);
    let corpus_bytes = knowledge.len_bytes();
    session.assistant.replace_knowledge(knowledge);

    tracing::info!(
        session_id = %id,
        accepted = report.accepted.len(),
        skipped = report.skipped.len(),
        corpus_bytes,
        "Knowledge corpus replaced"
    );

    Ok(Json(KnowledgeResponse {
        report,
        corpus_bytes,
    }))
}

/// Conversation turns in order
async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = find_session(&state, &id)?;
    let turns = session.assistant.conversation().turns();
    Ok(Json(serde_json::json!({
        "messages": turns,
        "count": turns.len(),
    })))
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    is_apology: bool,
    /// Path of the synthesized speech on this server
    audio_url: Option<String>,
    video_url: Option<String>,
    notices: Vec<String>,
    turn_count: usize,
}

/// Chat endpoint
async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let session = match find_session(&state, &id) {
        Ok(session) => session,
        Err(e) => {
            record_request("chat", StatusCode::NOT_FOUND.as_u16());
            return Err(e);
        }
    };

    session.touch();

    match session.assistant.process_turn(&request.message).await {
        Ok(outcome) => {
            record_turn(&outcome);
            record_request("chat", StatusCode::OK.as_u16());
            Ok(Json(ChatResponse {
                audio_url: outcome
                    .audio
                    .as_ref()
                    .map(|audio| format!("/media/audio/{}", audio.file_name)),
                response: outcome.text,
                is_apology: outcome.is_apology,
                video_url: outcome.video_url,
                notices: outcome.notices,
                turn_count: outcome.turn_count,
            }))
        }
        Err(e) => {
            tracing::warn!(session_id = %id, error = %e, "Chat turn rejected");
            let err = ServerError::from(e);
            let status = match &err {
                ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            record_request("chat", status.as_u16());
            Err(err)
        }
    }
}

/// Liveness with basic service info
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.get_config();
    let environment = format!("{:?}", config.environment).to_lowercase();
    drop(config);

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": environment,
        "sessions": state.sessions.count(),
    }))
}

/// Readiness: the audio output directory must be writable. The LLM
/// endpoint is probed with the configured fallback key, if any, and
/// reported without affecting readiness.
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    // parking_lot guards aren't Send, extract before awaiting
    let (audio_dir, llm_endpoint, llm_key, avatar_configured) = {
        let config = state.get_config();
        (
            config.voice.output_dir.clone(),
            config.llm.endpoint.clone(),
            config.llm.api_key.clone().filter(|key| !key.trim().is_empty()),
            config.avatar.base_url.is_some(),
        )
    };

    let llm_status = match llm_key {
        None => "not_configured",
        Some(key) => match state.backends.models.language_model(&key) {
            Ok(model) => {
                if model.is_available().await {
                    "ok"
                } else {
                    "unreachable"
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM backend could not be built for readiness");
                "unavailable"
            }
        },
    };

    let audio_ok = match tokio::fs::create_dir_all(&audio_dir).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %audio_dir.display(), error = %e, "Audio output directory unavailable");
            false
        }
    };

    let status_code = if audio_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "ready": audio_ok,
            "sessions": state.sessions.count(),
            "checks": {
                "audio_output": {
                    "status": if audio_ok { "ok" } else { "unavailable" },
                    "path": audio_dir.display().to_string(),
                },
                "llm": { "status": llm_status, "endpoint": llm_endpoint },
                "avatar": { "configured": avatar_configured },
            }
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_assistant_config::Settings;

    #[tokio::test]
    async fn test_router_creation() {
        let state = AppState::new(Settings::default()).unwrap();
        let _ = create_router(state);
    }

    #[test]
    fn test_cors_layer_falls_back_on_invalid_origins() {
        let _ = build_cors_layer(&["bad\norigin".to_string()], true);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["https://example.com".to_string()], true);
    }
}
