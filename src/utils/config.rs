//! Application configuration
//!
//! Stored as an INI file with a single `[DEFAULT]` section:
//!
//! ```text
//! [DEFAULT]
//! download_folder = /data/vods
//! ffmpeg_bin = /usr/bin/ffmpeg
//! ```

use crate::utils::error::VodError;
use config::{Config, File, FileFormat};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "twitch_download.cfg";

/// Base URL of the metadata API
pub const DEFAULT_API_BASE: &str = "https://api.twitch.tv";

/// Application settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Root of the library
    pub download_folder: PathBuf,

    /// Converter binary
    pub ffmpeg_bin: PathBuf,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Sent as `Client-ID` when set
    #[serde(default)]
    pub client_id: Option<String>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "DEFAULT", alias = "default")]
    section: AppConfig,
}

impl AppConfig {
    pub fn new(download_folder: impl Into<PathBuf>, ffmpeg_bin: impl Into<PathBuf>) -> Self {
        Self {
            download_folder: download_folder.into(),
            ffmpeg_bin: ffmpeg_bin.into(),
            api_base: default_api_base(),
            client_id: None,
        }
    }

    /// Read the config file. `Ok(None)` when it does not exist yet.
    pub fn load(path: &Path) -> Result<Option<Self>, VodError> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Config::builder()
            .add_source(File::from_str(&contents, FileFormat::Ini))
            .build()
            .and_then(|c| c.try_deserialize::<ConfigFile>())
            .map_err(|e| invalid_file(path, e))?;

        info!("Loaded configuration from {}", path.display());
        Ok(Some(config.section))
    }

    /// Both paths must exist before anything is downloaded
    pub fn validate(&self) -> Result<(), VodError> {
        if !self.download_folder.is_dir() {
            return Err(VodError::Configuration(format!(
                "download_folder {} is not an existing directory",
                self.download_folder.display()
            )));
        }
        if !self.ffmpeg_bin.is_file() {
            return Err(VodError::Configuration(format!(
                "ffmpeg_bin {} does not exist",
                self.ffmpeg_bin.display()
            )));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), VodError> {
        let mut contents = String::from("[DEFAULT]\n");
        contents.push_str(&format!(
            "download_folder = {}\n",
            escape_value(&self.download_folder.to_string_lossy())
        ));
        contents.push_str(&format!(
            "ffmpeg_bin = {}\n",
            escape_value(&self.ffmpeg_bin.to_string_lossy())
        ));
        if self.api_base != DEFAULT_API_BASE {
            contents.push_str(&format!("api_base = {}\n", escape_value(&self.api_base)));
        }
        if let Some(client_id) = &self.client_id {
            contents.push_str(&format!("client_id = {}\n", escape_value(client_id)));
        }

        std::fs::write(path, contents)?;
        info!("Wrote configuration to {}", path.display());
        Ok(())
    }

    /// Load and validate `path`, running the interactive setup when it is missing.
    ///
    /// `input` is the same reader the session continues with afterwards.
    pub async fn load_or_setup<R: AsyncBufRead + Unpin, W: Write>(
        path: &Path,
        input: &mut R,
        out: &mut W,
    ) -> Result<Self, VodError> {
        let config = match Self::load(path)? {
            Some(config) => config,
            None => {
                writeln!(out, "config_file not found!")?;
                let config = first_run_setup(input, out).await?;
                config.save(path)?;
                config
            }
        };
        config.validate().map_err(|e| match e {
            VodError::Configuration(msg) => invalid_file(path, msg),
            other => other,
        })?;
        Ok(config)
    }
}

fn invalid_file(path: &Path, cause: impl std::fmt::Display) -> VodError {
    VodError::Configuration(format!(
        "\n\n{}\n\nFix the {} or delete it to generate a new one.",
        cause,
        path.display()
    ))
}

// rust-ini unescapes backslashes when reading
fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\")
}

/// Ask for the download folder and the ffmpeg binary until both exist
pub async fn first_run_setup<R: AsyncBufRead + Unpin, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<AppConfig, VodError> {
    let download_default = dirs::download_dir().filter(|d| d.is_dir());
    let download_folder = prompt_existing_path(
        input,
        out,
        "specify download folder",
        download_default,
        "invalid download directory!",
        Path::is_dir,
    )
    .await?;

    let ffmpeg_default = which::which("ffmpeg").ok();
    let ffmpeg_bin = prompt_existing_path(
        input,
        out,
        "specify the \"ffmpeg\" binary (full path)",
        ffmpeg_default,
        "ffmpeg not found!",
        Path::is_file,
    )
    .await?;

    Ok(AppConfig::new(download_folder, ffmpeg_bin))
}

async fn prompt_existing_path<R: AsyncBufRead + Unpin, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    default: Option<PathBuf>,
    invalid_message: &str,
    accept: fn(&Path) -> bool,
) -> Result<PathBuf, VodError> {
    loop {
        match &default {
            Some(d) => write!(out, "{} [{}]: ", prompt, d.display())?,
            None => write!(out, "{}: ", prompt)?,
        }
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).await? == 0 {
            return Err(VodError::Configuration(
                "setup aborted before all paths were given".to_string(),
            ));
        }

        let answer = line.trim();
        let candidate = match (answer.is_empty(), &default) {
            (false, _) => expand_home(answer).absolutize()?.into_owned(),
            (true, Some(d)) => d.clone(),
            (true, None) => continue,
        };

        if accept(&candidate) {
            return Ok(candidate);
        }
        writeln!(out, "{}", invalid_message)?;
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path[1..].trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}
