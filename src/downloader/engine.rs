//! Sequential chunk download engine

use crate::downloader::merger::{cleanup_work_dir, output_path_for, FfmpegConverter};
use crate::downloader::Downloader;
use crate::extractor::{Chunk, Rendition};
use crate::utils::config::AppConfig;
use crate::utils::error::VodError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

/// Interval between progress log lines while a chunk streams
const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Downloads a rendition's chunks one after another, then hands them to ffmpeg
pub struct DownloadEngine {
    client: Client,
    converter: FfmpegConverter,
}

impl DownloadEngine {
    pub fn new(converter: FfmpegConverter) -> Result<Self, VodError> {
        let client = Client::builder()
            .user_agent(concat!("vodloader/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self { client, converter })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, VodError> {
        Self::new(FfmpegConverter::new(&config.ffmpeg_bin))
    }

    async fn run(&self, rendition: &Rendition, destination: &Path) -> Result<PathBuf> {
        let parent = destination
            .parent()
            .context("Destination has no parent directory")?;
        let created = missing_dirs(parent);
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let work_dir = parent.join(format!(".{}.parts", Uuid::new_v4()));
        let created_work_dir = tokio::fs::create_dir(&work_dir)
            .await
            .with_context(|| format!("Failed to create {}", work_dir.display()));
        let result = match created_work_dir {
            Ok(()) => {
                let result = self.fetch_and_convert(rendition, &work_dir, destination).await;
                cleanup_work_dir(&work_dir).await;
                result
            }
            Err(e) => Err(e),
        };

        if result.is_err() {
            remove_empty_dirs(&created).await;
        }
        result
    }

    async fn fetch_and_convert(
        &self,
        rendition: &Rendition,
        work_dir: &Path,
        destination: &Path,
    ) -> Result<PathBuf> {
        let total = rendition.chunks.len();
        let mut parts = Vec::with_capacity(total);

        for (index, chunk) in rendition.chunks.iter().enumerate() {
            let part = work_dir.join(part_file_name(index, chunk));
            info!("Downloading chunk {}/{} ({})", index + 1, total, rendition.quality);
            self.download_chunk(&chunk.url, &part)
                .await
                .with_context(|| format!("chunk {}/{} from {}", index + 1, total, chunk.url))?;
            parts.push(part);
        }

        let output = output_path_for(destination);
        self.converter.convert(&parts, work_dir, &output).await?;
        Ok(output)
    }

    /// Stream one chunk to disk
    async fn download_chunk(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", response.status()));
        }

        let total_size = response.content_length();
        let mut file = File::create(path).await?;
        let mut downloaded = 0u64;

        let start_time = Instant::now();
        let mut last_update_time = start_time;

        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let bytes = chunk_result?;
            file.write_all(&bytes).await?;
            downloaded += bytes.len() as u64;

            let now = Instant::now();
            if now.duration_since(last_update_time) >= PROGRESS_INTERVAL {
                let elapsed = now.duration_since(start_time).as_secs_f64();
                match total_size {
                    Some(total) if total > 0 => info!(
                        "{:.1}% at {:.2} MB/s",
                        downloaded as f64 / total as f64 * 100.0,
                        downloaded as f64 / elapsed / 1024.0 / 1024.0
                    ),
                    _ => info!(
                        "{} bytes at {:.2} MB/s",
                        downloaded,
                        downloaded as f64 / elapsed / 1024.0 / 1024.0
                    ),
                }
                last_update_time = now;
            }
        }

        file.flush().await?;
        debug!("Wrote {} bytes to {}", downloaded, path.display());
        Ok(downloaded)
    }
}

#[async_trait]
impl Downloader for DownloadEngine {
    async fn download(
        &self,
        rendition: &Rendition,
        destination: &Path,
    ) -> Result<PathBuf, VodError> {
        if rendition.chunks.is_empty() {
            return Err(VodError::NoRenditionsAvailable);
        }
        self.run(rendition, destination)
            .await
            .map_err(|e| VodError::Download(format!("{:#}", e)))
    }
}

/// Directories between `dir` and its nearest existing ancestor, deepest first
fn missing_dirs(dir: &Path) -> Vec<PathBuf> {
    dir.ancestors()
        .take_while(|d| !d.as_os_str().is_empty() && !d.exists())
        .map(Path::to_path_buf)
        .collect()
}

// Only removes directories that are still empty
async fn remove_empty_dirs(dirs: &[PathBuf]) {
    for dir in dirs {
        if let Err(e) = tokio::fs::remove_dir(dir).await {
            debug!("Keeping {}: {}", dir.display(), e);
            break;
        }
    }
}

/// `part_0003.flv`, keeping the extension of the chunk URL when there is one
pub fn part_file_name(index: usize, chunk: &Chunk) -> String {
    let ext = url::Url::parse(&chunk.url)
        .ok()
        .and_then(|u| {
            Path::new(u.path())
                .extension()
                .and_then(|e| e.to_str())
                .filter(|e| {
                    !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric())
                })
                .map(str::to_string)
        })
        .unwrap_or_else(|| "bin".to_string());
    format!("part_{:04}.{}", index, ext)
}
