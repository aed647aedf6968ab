//! Speech and avatar contract tests against in-process stub servers

use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use avatar_assistant_core::{AvatarRenderer, AvatarRequest, TextToSpeech};
use avatar_assistant_pipeline::{AvatarVideoSynthesizer, ElevenLabsConfig, ElevenLabsTts};

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn avatar_request() -> AvatarRequest {
    AvatarRequest {
        text: "Use the reset link.".to_string(),
        audio_url: Some("https://assistant.example/media/audio/speech_1.mp3".to_string()),
        avatar_image: "https://images.example/face.png".to_string(),
    }
}

#[tokio::test]
async fn speech_is_written_to_output_dir() {
    let router = Router::new().route(
        "/v1/text-to-speech/voice-1",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["xi-api-key"], "el-key");
            assert_eq!(body["text"], "Use the reset link.");
            assert_eq!(body["model_id"], "eleven_multilingual_v2");
            vec![0x49u8, 0x44, 0x33, 0x04]
        }),
    );
    let endpoint = spawn_stub(router).await;
    let dir = tempfile::tempdir().unwrap();

    let tts = ElevenLabsTts::new(ElevenLabsConfig {
        endpoint,
        voice_id: "voice-1".to_string(),
        output_dir: dir.path().join("audio"),
        ..ElevenLabsConfig::default()
    })
    .unwrap();

    let artifact = tts.synthesize("Use the reset link.", "el-key").await.unwrap();

    assert_eq!(artifact.size_bytes, 4);
    assert!(artifact.path.starts_with(dir.path()));
    assert_eq!(std::fs::read(&artifact.path).unwrap(), vec![0x49, 0x44, 0x33, 0x04]);
}

#[tokio::test]
async fn speech_http_error_is_reported() {
    let router = Router::new().route(
        "/v1/text-to-speech/voice-1",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid_api_key") }),
    );
    let endpoint = spawn_stub(router).await;
    let dir = tempfile::tempdir().unwrap();

    let tts = ElevenLabsTts::new(ElevenLabsConfig {
        endpoint,
        voice_id: "voice-1".to_string(),
        output_dir: dir.path().to_path_buf(),
        ..ElevenLabsConfig::default()
    })
    .unwrap();

    let err = tts.synthesize("hello", "bad-key").await.unwrap_err();
    assert!(err.to_string().contains("401"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn avatar_success_joins_base_and_path() {
    let router = Router::new().route(
        "/generate_avatar",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["text"], "Use the reset link.");
            assert_eq!(body["avatar_image"], "https://images.example/face.png");
            Json(json!({"status": "success", "video_url": "/videos/abc.mp4"}))
        }),
    );
    let base = spawn_stub(router).await;
    let avatar = AvatarVideoSynthesizer::new(Duration::from_secs(5)).unwrap();

    let url = avatar.render(&base, &avatar_request()).await;

    assert_eq!(url, Some(format!("{}/videos/abc.mp4", base)));
}

#[tokio::test]
async fn avatar_non_success_status_is_none() {
    let router = Router::new().route(
        "/generate_avatar",
        post(|| async { Json(json!({"status": "error", "video_url": "/videos/ignored.mp4"})) }),
    );
    let base = spawn_stub(router).await;
    let avatar = AvatarVideoSynthesizer::new(Duration::from_secs(5)).unwrap();

    assert!(avatar.render(&base, &avatar_request()).await.is_none());
}

#[tokio::test]
async fn avatar_malformed_body_is_none() {
    let router = Router::new().route("/generate_avatar", post(|| async { "not json" }));
    let base = spawn_stub(router).await;
    let avatar = AvatarVideoSynthesizer::new(Duration::from_secs(5)).unwrap();

    assert!(avatar.render(&base, &avatar_request()).await.is_none());
}

#[tokio::test]
async fn avatar_timeout_is_none() {
    let router = Router::new().route(
        "/generate_avatar",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"status": "success", "video_url": "/videos/late.mp4"}))
        }),
    );
    let base = spawn_stub(router).await;
    let avatar = AvatarVideoSynthesizer::new(Duration::from_millis(200)).unwrap();

    assert!(avatar.render(&base, &avatar_request()).await.is_none());
}
