//! Talking-avatar video synthesis
//!
//! The render service is operator-hosted and reached at
//! `{base_url}/generate_avatar`. It answers with a status and a video path
//! relative to the base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use avatar_assistant_config::constants::endpoints;
use avatar_assistant_config::AvatarConfig;
use avatar_assistant_core::{AvatarRenderer, AvatarRequest};

use crate::PipelineError;

#[derive(Debug, Deserialize)]
struct AvatarResponse {
    status: String,
    #[serde(default)]
    video_url: Option<String>,
}

/// Client for the avatar render service
pub struct AvatarVideoSynthesizer {
    client: Client,
}

impl AvatarVideoSynthesizer {
    pub fn new(timeout: Duration) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn from_settings(settings: &AvatarConfig) -> Result<Self, PipelineError> {
        Self::new(Duration::from_secs(settings.timeout_seconds))
    }

    fn generate_url(base_url: &str) -> String {
        format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            endpoints::AVATAR_GENERATE_PATH
        )
    }

    /// Request a video. The returned URL is the base URL followed by the
    /// service's `video_url`, unvalidated.
    pub async fn try_generate(
        &self,
        base_url: &str,
        request: &AvatarRequest,
    ) -> Result<String, PipelineError> {
        let response = self
            .client
            .post(Self::generate_url(base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Avatar(format!("HTTP {}", status)));
        }

        let body: AvatarResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::InvalidResponse(e.to_string()))?;

        if body.status != "success" {
            return Err(PipelineError::Avatar(format!(
                "Render status '{}'",
                body.status
            )));
        }

        let video_url = body.video_url.ok_or_else(|| {
            PipelineError::InvalidResponse("Missing video_url".to_string())
        })?;

        Ok(format!("{}{}", base_url, video_url))
    }
}

#[async_trait]
impl AvatarRenderer for AvatarVideoSynthesizer {
    async fn render(&self, base_url: &str, request: &AvatarRequest) -> Option<String> {
        match self.try_generate(base_url, request).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(base_url = %base_url, error = %e, "Avatar video not produced");
                None
            }
        }
    }
}
