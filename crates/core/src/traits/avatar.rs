//! Avatar video trait

use crate::AvatarRequest;
use async_trait::async_trait;

/// Talking-avatar video interface
///
/// Implementations:
/// - `AvatarVideoSynthesizer` - operator-hosted `/generate_avatar` endpoint
#[async_trait]
pub trait AvatarRenderer: Send + Sync + 'static {
    /// Render a video, returning its URL, or `None` when the service did not
    /// produce one. Failures never propagate past this call.
    async fn render(&self, base_url: &str, request: &AvatarRequest) -> Option<String>;
}
