//! vodloader library

pub mod downloader;
pub mod extractor;
pub mod session;
pub mod utils;

// Re-export main types for easier use
pub use downloader::{DownloadEngine, Downloader, FfmpegConverter};
pub use extractor::{Extractor, Rendition, TwitchExtractor, VideoInfo};
pub use session::{BatchSummary, Session};
pub use utils::{AppConfig, VodError};
