//! Turn orchestration with mock providers

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use avatar_assistant_agent::{
    AgentError, AssistantBackends, AssistantConfig, AssistantProfile, AvatarAssistant,
    AvatarSettings, Credentials, ModelProvider, ProfileUpdate, TurnStage,
};
use avatar_assistant_config::prompts::APOLOGY_PREFIX;
use avatar_assistant_core::{
    AvatarRenderer, AvatarRequest, Error, GenerateRequest, GenerateResponse, LanguageModel,
    LanguagePreference, Result, SpeechArtifact, TextToSpeech, TurnRole,
};
use avatar_assistant_rag::{KnowledgeBase, UploadedDocument};

struct MockModel {
    reply: Option<String>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.requests.lock().push(request);
        match &self.reply {
            Some(text) => Ok(GenerateResponse::new(text.clone())),
            None => Err(Error::Llm("HTTP 429: rate limited".to_string())),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

struct MockTts {
    fail: bool,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl TextToSpeech for MockTts {
    async fn synthesize(&self, text: &str, credential: &str) -> Result<SpeechArtifact> {
        self.calls.lock().push((text.to_string(), credential.to_string()));
        if self.fail {
            return Err(Error::Speech("quota exceeded".to_string()));
        }
        Ok(SpeechArtifact {
            path: PathBuf::from("/tmp/audio/speech_1.mp3"),
            file_name: "speech_1.mp3".to_string(),
            size_bytes: 3,
        })
    }

    fn model_name(&self) -> &str {
        "mock-tts"
    }
}

struct MockAvatar {
    video: Option<String>,
    requests: Arc<Mutex<Vec<(String, AvatarRequest)>>>,
}

#[async_trait]
impl AvatarRenderer for MockAvatar {
    async fn render(&self, base_url: &str, request: &AvatarRequest) -> Option<String> {
        self.requests.lock().push((base_url.to_string(), request.clone()));
        self.video.as_ref().map(|path| format!("{}{}", base_url, path))
    }
}

#[derive(Default)]
struct Probe {
    llm: Arc<Mutex<Vec<GenerateRequest>>>,
    tts: Arc<Mutex<Vec<(String, String)>>>,
    avatar: Arc<Mutex<Vec<(String, AvatarRequest)>>>,
}

struct Harness {
    reply: Option<&'static str>,
    tts_fails: bool,
    video: Option<&'static str>,
}

impl Harness {
    fn ok() -> Self {
        Self {
            reply: Some("Use the reset link."),
            tts_fails: false,
            video: Some("/videos/abc.mp4"),
        }
    }

    fn build(self, profile: AssistantProfile, knowledge: KnowledgeBase) -> (AvatarAssistant, Probe) {
        let probe = Probe::default();

        let reply = self.reply.map(str::to_string);
        let llm_requests = probe.llm.clone();
        let models: Arc<dyn ModelProvider> = Arc::new(
            move |_key: &str| -> std::result::Result<Arc<dyn LanguageModel>, AgentError> {
                Ok(Arc::new(MockModel {
                    reply: reply.clone(),
                    requests: llm_requests.clone(),
                }))
            },
        );

        let backends = AssistantBackends::new(
            models,
            Arc::new(MockTts {
                fail: self.tts_fails,
                calls: probe.tts.clone(),
            }),
            Arc::new(MockAvatar {
                video: self.video.map(str::to_string),
                requests: probe.avatar.clone(),
            }),
        );

        let config = AssistantConfig {
            audio_public_base: Some("https://assistant.example/media/audio".to_string()),
            ..AssistantConfig::default()
        };

        (
            AvatarAssistant::new(config, backends, profile, Arc::new(knowledge)),
            probe,
        )
    }
}

fn configured_profile() -> AssistantProfile {
    AssistantProfile {
        credentials: Credentials::new(Some("sk-test".to_string()), Some("el-test".to_string())),
        language: LanguagePreference::English,
        avatar: AvatarSettings {
            base_url: Some("http://render.local".to_string()),
            image_url: Some("http://images.local/face.png".to_string()),
        },
    }
}

fn faq_knowledge() -> KnowledgeBase {
    let docs = vec![UploadedDocument::new(
        "faq.txt",
        Some("text/plain"),
        "reset your password here\ncontact support for billing",
    )];
    KnowledgeBase::from_documents(&docs).0
}

#[tokio::test]
async fn full_turn_produces_text_audio_and_video() {
    let (assistant, probe) = Harness::ok().build(configured_profile(), faq_knowledge());

    let outcome = assistant.process_turn("How do I reset my password?").await.unwrap();

    assert_eq!(outcome.text, "Use the reset link.");
    assert!(!outcome.is_apology);
    assert!(outcome.audio.is_some());
    assert_eq!(
        outcome.audio_ref.as_deref(),
        Some("https://assistant.example/media/audio/speech_1.mp3")
    );
    assert_eq!(outcome.video_url.as_deref(), Some("http://render.local/videos/abc.mp4"));
    assert!(outcome.notices.is_empty());
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.turn_count, 2);

    let llm = probe.llm.lock();
    assert!(llm[0].messages[0]
        .content
        .contains("Knowledge context: reset your password here\n"));

    let tts = probe.tts.lock();
    assert_eq!(tts[0], ("Use the reset link.".to_string(), "el-test".to_string()));

    let avatar = probe.avatar.lock();
    assert_eq!(avatar[0].0, "http://render.local");
    assert_eq!(avatar[0].1.avatar_image, "http://images.local/face.png");
    assert_eq!(
        avatar[0].1.audio_url.as_deref(),
        Some("https://assistant.example/media/audio/speech_1.mp3")
    );

    let turns = assistant.conversation().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role(), TurnRole::User);
    assert_eq!(turns[0].text(), "How do I reset my password?");
    assert_eq!(turns[1].role(), TurnRole::Assistant);
    assert_eq!(turns[1].media_ref(), Some("http://render.local/videos/abc.mp4"));
}

#[tokio::test]
async fn missing_credentials_rejects_without_storing() {
    let mut profile = configured_profile();
    profile.credentials.voice_api_key = None;
    let (assistant, probe) = Harness::ok().build(profile, KnowledgeBase::empty());

    let err = assistant.process_turn("hello").await.unwrap_err();

    assert!(matches!(err, AgentError::CredentialsMissing));
    assert_eq!(err.to_string(), "Please configure your API keys first.");
    assert!(assistant.conversation().is_empty());
    assert!(probe.llm.lock().is_empty());
}

#[tokio::test]
async fn blank_input_is_rejected() {
    let (assistant, _) = Harness::ok().build(configured_profile(), KnowledgeBase::empty());

    let err = assistant.process_turn("   ").await.unwrap_err();

    assert!(matches!(err, AgentError::EmptyInput));
    assert!(assistant.conversation().is_empty());
}

#[tokio::test]
async fn completion_failure_stores_apology_without_media() {
    let harness = Harness {
        reply: None,
        ..Harness::ok()
    };
    let (assistant, probe) = harness.build(configured_profile(), KnowledgeBase::empty());

    let outcome = assistant.process_turn("hello").await.unwrap();

    assert!(outcome.is_apology);
    assert!(outcome.text.starts_with(APOLOGY_PREFIX));
    assert!(outcome.text.contains("rate limited"));
    assert!(outcome.audio.is_none());
    assert!(outcome.video_url.is_none());
    assert_eq!(outcome.failures, vec![TurnStage::Llm]);
    assert!(probe.tts.lock().is_empty());
    assert!(probe.avatar.lock().is_empty());

    let turns = assistant.conversation().turns();
    assert_eq!(turns[1].text(), outcome.text);
    assert!(turns[1].media_ref().is_none());
}

#[tokio::test]
async fn speech_failure_adds_notice_and_still_renders() {
    let harness = Harness {
        tts_fails: true,
        ..Harness::ok()
    };
    let (assistant, probe) = harness.build(configured_profile(), KnowledgeBase::empty());

    let outcome = assistant.process_turn("hello").await.unwrap();

    assert_eq!(outcome.text, "Use the reset link.");
    assert!(outcome.audio.is_none());
    assert_eq!(outcome.notices.len(), 1);
    assert!(outcome.notices[0].starts_with("Voice generation error:"));
    assert!(outcome.notices[0].contains("quota exceeded"));
    assert_eq!(outcome.failures, vec![TurnStage::Tts]);

    let avatar = probe.avatar.lock();
    assert_eq!(avatar.len(), 1);
    assert!(avatar[0].1.audio_url.is_none());
}

#[tokio::test]
async fn avatar_failure_is_silent() {
    let harness = Harness {
        video: None,
        ..Harness::ok()
    };
    let (assistant, _) = harness.build(configured_profile(), KnowledgeBase::empty());

    let outcome = assistant.process_turn("hello").await.unwrap();

    assert!(outcome.video_url.is_none());
    assert!(outcome.notices.is_empty());
    assert_eq!(outcome.failures, vec![TurnStage::Avatar]);
    assert!(assistant.conversation().turns()[1].media_ref().is_none());
}

#[tokio::test]
async fn avatar_skipped_without_target() {
    let mut profile = configured_profile();
    profile.avatar.image_url = None;
    let (assistant, probe) = Harness::ok().build(profile, KnowledgeBase::empty());

    let outcome = assistant.process_turn("hello").await.unwrap();

    assert!(outcome.video_url.is_none());
    assert!(outcome.timings.avatar.is_none());
    assert!(probe.avatar.lock().is_empty());
}

#[tokio::test]
async fn turns_accumulate_in_order() {
    let (assistant, _) = Harness::ok().build(configured_profile(), KnowledgeBase::empty());

    assistant.process_turn("first").await.unwrap();
    let outcome = assistant.process_turn("second").await.unwrap();

    assert_eq!(outcome.turn_count, 4);
    let texts: Vec<String> = assistant
        .conversation()
        .turns()
        .iter()
        .map(|t| t.text().to_string())
        .collect();
    assert_eq!(
        texts,
        vec!["first", "Use the reset link.", "second", "Use the reset link."]
    );
}

#[tokio::test]
async fn profile_and_knowledge_updates_apply_to_next_turn() {
    let (assistant, probe) =
        Harness::ok().build(AssistantProfile::default(), KnowledgeBase::empty());

    assert!(assistant.process_turn("password").await.is_err());

    assistant.update_profile(ProfileUpdate {
        llm_api_key: Some("sk-new".to_string()),
        voice_api_key: Some("el-new".to_string()),
        language: Some(LanguagePreference::Hindi),
        ..Default::default()
    });
    assistant.replace_knowledge(faq_knowledge());

    assistant.process_turn("password").await.unwrap();

    let llm = probe.llm.lock();
    let system = &llm[0].messages[0].content;
    assert!(system.contains("Language preference: Hindi"));
    assert!(system.contains("Knowledge context: reset your password here"));
}
