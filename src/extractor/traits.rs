use crate::extractor::models::VideoInfo;
use crate::utils::error::VodError;
use async_trait::async_trait;

/// Core trait for broadcast metadata sources
///
/// This trait isolates the session from the specific platform API, so the loop can be
/// driven by a canned extractor in tests.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g., "twitch-legacy")
    fn id(&self) -> &'static str;

    /// Resolves a numeric broadcast id into its metadata and renditions
    async fn extract_info(&self, broadcast_id: &str) -> Result<VideoInfo, VodError>;
}
