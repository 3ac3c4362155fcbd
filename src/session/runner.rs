//! Interactive and batch session loops

use crate::downloader::Downloader;
use crate::extractor::{select_rendition, Extractor, QUALITY_ORDER};
use crate::session::input::{Command, Request};
use crate::utils::config::AppConfig;
use crate::utils::error::VodError;
use crate::utils::organizer::destination_path;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

const BANNER: &str = "vodloader\n=========\n\nYou can enter broadcast ids, help or exit";

/// Print usage for interactive mode
pub fn print_help<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "In this interactive mode you can enter the broadcast id or the URL of a past broadcast.\n\
         Append the quality after the broadcast.\n\
         The best available quality is selected by default.\n\
         Examples:\n\
         \thttp://www.twitch.tv/esltv_sc2/b/585041281 720p\n\
         \thttp://www.twitch.tv/esltv_sc2/b/585041281\n\
         \t585041281\n\
         \t585041281 240p\n\n\
         Available qualities: {}\n\n\
         Downloads are stored as <library>/<game>/<channel>/<title>_<start time>.mp4\n\
         and converted with ffmpeg once all chunks are downloaded.",
        QUALITY_ORDER.join(", ")
    )
}

/// Result of a batch run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSummary {
    pub downloaded: Vec<PathBuf>,
    pub failed: Vec<String>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives requests through extraction, path building, selection and download
pub struct Session<E, D> {
    config: AppConfig,
    extractor: E,
    downloader: D,
}

impl<E: Extractor, D: Downloader> Session<E, D> {
    pub fn new(config: AppConfig, extractor: E, downloader: D) -> Self {
        Self {
            config,
            extractor,
            downloader,
        }
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Resolve, select and download one broadcast
    pub async fn process(&self, request: &Request) -> Result<PathBuf, VodError> {
        debug!(
            "Resolving {} through {}",
            request.broadcast_id,
            self.extractor.id()
        );
        let info = self.extractor.extract_info(&request.broadcast_id).await?;
        let destination = destination_path(&self.config.download_folder, &info);
        let rendition = select_rendition(&info.renditions, request.quality.as_deref())?;

        info!(
            "{} by {} ({}), quality {}, {} chunk(s)",
            info.title,
            info.channel_name,
            info.category(),
            rendition.quality,
            rendition.chunks.len()
        );
        if let Some(seconds) = rendition.duration() {
            debug!("Broadcast length {}s", seconds);
        }

        self.downloader.download(rendition, &destination).await
    }

    /// Process a request and tell the user how it went
    async fn report<W: Write>(
        &self,
        request: &Request,
        out: &mut W,
    ) -> std::io::Result<Option<PathBuf>> {
        match self.process(request).await {
            Ok(path) => {
                writeln!(out, "Saved {}", path.display())?;
                Ok(Some(path))
            }
            Err(e) => {
                warn!("Broadcast {} failed: {}", request.broadcast_id, e);
                writeln!(out, "{}", e)?;
                Ok(None)
            }
        }
    }

    /// Read lines until `exit` or end of input
    pub async fn run_interactive<R, W>(&self, mut input: R, out: &mut W) -> Result<(), VodError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "{}", BANNER)?;
        let mut buf = Vec::new();

        loop {
            write!(out, "> ")?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                debug!("End of input, leaving interactive mode");
                writeln!(out)?;
                return Ok(());
            }
            // Undecodable bytes end up as replacement characters and fail identifier parsing
            let line = String::from_utf8_lossy(&buf);

            match Command::parse(&line) {
                Ok(Command::Exit) => return Ok(()),
                Ok(Command::Help) => print_help(out)?,
                Ok(Command::Fetch(request)) => {
                    self.report(&request, out).await?;
                }
                Err(VodError::EmptyInput) => {
                    writeln!(out, "Enter a broadcast id or URL, help or exit")?;
                }
                Err(e) => {
                    writeln!(out, "{}\n", e)?;
                    print_help(out)?;
                }
            }
        }
    }

    /// Process every argument in order; a failure never stops the run
    pub async fn run_batch<W: Write>(
        &self,
        args: &[String],
        out: &mut W,
    ) -> Result<BatchSummary, VodError> {
        let mut summary = BatchSummary::default();

        for (index, arg) in args.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, args.len(), arg);
            let outcome = match Request::parse(arg) {
                Ok(request) => self.report(&request, out).await?,
                Err(e) => {
                    warn!("Skipping {:?}: {}", arg, e);
                    writeln!(out, "{}: {}", arg, e)?;
                    None
                }
            };

            match outcome {
                Some(path) => summary.downloaded.push(path),
                None => summary.failed.push(arg.clone()),
            }
        }

        Ok(summary)
    }
}
