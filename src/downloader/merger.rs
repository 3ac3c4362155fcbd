//! Chunk conversion through ffmpeg

use anyhow::{Context, Result};
use chrono::Local;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// Container written for every converted broadcast
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Name of the concat demuxer list inside a working directory
const CONCAT_LIST: &str = "concat.txt";

/// Wrapper around the external ffmpeg binary
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    ffmpeg_bin: PathBuf,
}

impl FfmpegConverter {
    pub fn new(ffmpeg_bin: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
        }
    }

    /// Remux downloaded chunk files, in order, into `output`
    pub async fn convert(&self, parts: &[PathBuf], work_dir: &Path, output: &Path) -> Result<()> {
        if parts.is_empty() {
            return Err(anyhow::anyhow!("No chunks to convert"));
        }

        let input = if parts.len() == 1 {
            ConvertInput::Single(parts[0].clone())
        } else {
            let list = work_dir.join(CONCAT_LIST);
            tokio::fs::write(&list, concat_list(parts))
                .await
                .with_context(|| format!("Failed to write {}", list.display()))?;
            ConvertInput::Concat(list)
        };

        let args = ffmpeg_args(&input, output);
        debug!("Running {} {:?}", self.ffmpeg_bin.display(), args);

        let result = AsyncCommand::new(&self.ffmpeg_bin)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to start {}", self.ffmpeg_bin.display()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            error!("ffmpeg failed ({}): {}", result.status, stderr.trim());
            remove_partial_output(output).await;
            return Err(anyhow::anyhow!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.lines().last().unwrap_or("no output")
            ));
        }

        info!("Converted {} chunk(s) into {}", parts.len(), output.display());
        Ok(())
    }
}

/// What ffmpeg reads from
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertInput {
    Single(PathBuf),
    Concat(PathBuf),
}

/// Command line for a stream-copy remux into `output`
pub fn ffmpeg_args(input: &ConvertInput, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error"]
        .iter()
        .map(OsString::from)
        .collect();

    match input {
        ConvertInput::Single(path) => {
            args.push("-i".into());
            args.push(path.into());
        }
        ConvertInput::Concat(list) => {
            for arg in ["-f", "concat", "-safe", "0", "-i"] {
                args.push(arg.into());
            }
            args.push(list.into());
        }
    }

    for arg in ["-c", "copy", "-bsf:a", "aac_adtstoasc"] {
        args.push(arg.into());
    }
    args.push(output.into());
    args
}

/// Concat demuxer list; single quotes are escaped the way ffmpeg expects
pub fn concat_list(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|p| {
            let escaped = p.to_string_lossy().replace('\'', r"'\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

/// `<destination>.mp4`, or a timestamped sibling when that file already exists
pub fn output_path_for(destination: &Path) -> PathBuf {
    let with_ext = |suffix: &str| {
        let mut name = destination.as_os_str().to_owned();
        name.push(suffix);
        name.push(".");
        name.push(OUTPUT_EXTENSION);
        PathBuf::from(name)
    };

    let target = with_ext("");
    if !target.exists() {
        return target;
    }

    warn!("{} already exists, adding timestamp", target.display());
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    with_ext(&format!("_{}", timestamp))
}

// Whatever ffmpeg wrote before failing is not a usable broadcast
async fn remove_partial_output(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => debug!("Removed partial output {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {}: {}", output.display(), e),
    }
}

/// Remove a working directory with all downloaded chunks
pub async fn cleanup_work_dir(work_dir: &Path) {
    if !work_dir.exists() {
        return;
    }
    if let Err(e) = tokio::fs::remove_dir_all(work_dir).await {
        warn!(
            "Failed to remove working directory {}: {}",
            work_dir.display(),
            e
        );
    } else {
        debug!("Removed working directory: {}", work_dir.display());
    }
}
