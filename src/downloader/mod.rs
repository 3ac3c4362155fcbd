//! Download and conversion of a selected rendition

pub mod engine;
pub mod merger;

pub use engine::DownloadEngine;
pub use merger::FfmpegConverter;

use crate::extractor::Rendition;
use crate::utils::error::VodError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Produces a playable file for a rendition
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch `rendition` and convert it next to `destination` (extension is added).
    /// Returns the path of the written file.
    async fn download(
        &self,
        rendition: &Rendition,
        destination: &Path,
    ) -> Result<PathBuf, VodError>;
}
