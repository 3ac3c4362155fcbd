//! Twitch past broadcast extractor
//!
//! Metadata comes from two endpoints of the legacy Twitch API:
//! - `{api_base}/kraken/videos/a{id}`: title, channel, game, recording time
//! - `{api_base}/api/videos/a{id}`: the chunk table, one chunk list per quality

use crate::extractor::models::{Chunk, Rendition, VideoInfo};
use crate::extractor::selector::quality_rank;
use crate::extractor::traits::Extractor;
use crate::utils::config::AppConfig;
use crate::utils::error::VodError;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Label the API uses for the original stream quality
const API_SOURCE_LABEL: &str = "live";

#[derive(Debug, Deserialize)]
struct KrakenVideo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    recorded_at: Option<String>,
    #[serde(default)]
    game: Option<String>,
    channel: KrakenChannel,
}

#[derive(Debug, Deserialize)]
struct KrakenChannel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChunkTable {
    #[serde(default)]
    chunks: BTreeMap<String, Vec<Chunk>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Extractor backed by the Twitch HTTP API
pub struct TwitchExtractor {
    client: Client,
    api_base: String,
}

impl TwitchExtractor {
    pub fn new(api_base: &str, client_id: Option<&str>) -> Result<Self, VodError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.twitchtv.v3+json"),
        );
        if let Some(client_id) = client_id {
            let value = reqwest::header::HeaderValue::from_str(client_id).map_err(|_| {
                VodError::Configuration(format!(
                    "client_id contains invalid characters: {client_id:?}"
                ))
            })?;
            headers.insert("client-id", value);
        }

        let client = Client::builder()
            .user_agent(concat!("vodloader/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, VodError> {
        Self::new(&config.api_base, config.client_id.as_deref())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, VodError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VodError::MetadataApi(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VodError::MetadataApi(format!("reading response from {url}: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or_else(|| status.to_string());
            warn!("API returned {} for {}", status, url);
            return Err(VodError::MetadataApi(format!("{detail} ({status})")));
        }

        serde_json::from_str(&body)
            .map_err(|e| VodError::MetadataApi(format!("unexpected response from {url}: {e}")))
    }
}

#[async_trait]
impl Extractor for TwitchExtractor {
    fn id(&self) -> &'static str {
        "twitch-legacy"
    }

    async fn extract_info(&self, broadcast_id: &str) -> Result<VideoInfo, VodError> {
        info!("Resolving broadcast {}", broadcast_id);

        let video: KrakenVideo = self
            .get_json(&format!("{}/kraken/videos/a{}", self.api_base, broadcast_id))
            .await?;
        let table: ChunkTable = self
            .get_json(&format!("{}/api/videos/a{}", self.api_base, broadcast_id))
            .await?;

        let info = build_video_info(broadcast_id, video, table);
        debug!(
            "Broadcast {} has qualities {:?}",
            broadcast_id,
            info.quality_labels()
        );
        Ok(info)
    }
}

fn build_video_info(broadcast_id: &str, video: KrakenVideo, table: ChunkTable) -> VideoInfo {
    let mut renditions: Vec<Rendition> = table
        .chunks
        .into_iter()
        .filter(|(_, chunks)| !chunks.is_empty())
        .map(|(quality, chunks)| Rendition {
            quality: if quality == API_SOURCE_LABEL {
                "source".to_string()
            } else {
                quality
            },
            chunks,
        })
        .collect();
    renditions.sort_by_key(|r| quality_rank(&r.quality));

    VideoInfo {
        broadcast_id: broadcast_id.to_string(),
        title: video.title.unwrap_or_else(|| broadcast_id.to_string()),
        channel_name: video.channel.name,
        meta_game: video.game,
        start_time: video
            .recorded_at
            .as_deref()
            .map(normalize_start_time)
            .unwrap_or_default(),
        renditions,
    }
}

/// RFC 3339 timestamps become `YYYY-MM-DD_HH-MM-SS`; anything else is kept as is
pub fn normalize_start_time(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d_%H-%M-%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
