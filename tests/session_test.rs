//! Session flows driven by a canned extractor and a recording downloader,
//! without network or ffmpeg.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::io::BufReader;
use vodloader::extractor::{Chunk, Rendition, VideoInfo};
use vodloader::session::Request;
use vodloader::{AppConfig, Downloader, Extractor, Session, VodError};

struct CannedExtractor {
    videos: HashMap<String, VideoInfo>,
}

#[async_trait]
impl Extractor for CannedExtractor {
    fn id(&self) -> &'static str {
        "canned"
    }

    async fn extract_info(&self, broadcast_id: &str) -> Result<VideoInfo, VodError> {
        self.videos
            .get(broadcast_id)
            .cloned()
            .ok_or_else(|| VodError::MetadataApi(format!("video a{} not found", broadcast_id)))
    }
}

#[derive(Default)]
struct RecordingDownloader {
    calls: Mutex<Vec<(String, PathBuf)>>,
}

#[async_trait]
impl Downloader for RecordingDownloader {
    async fn download(
        &self,
        rendition: &Rendition,
        destination: &Path,
    ) -> Result<PathBuf, VodError> {
        self.calls
            .lock()
            .unwrap()
            .push((rendition.quality.clone(), destination.to_path_buf()));
        let mut output = destination.as_os_str().to_owned();
        output.push(".mp4");
        Ok(PathBuf::from(output))
    }
}

fn rendition(quality: &str) -> Rendition {
    Rendition {
        quality: quality.to_string(),
        chunks: vec![Chunk {
            url: format!("http://media.example/{}/a.flv", quality),
            length: Some(1800),
        }],
    }
}

fn finals() -> VideoInfo {
    VideoInfo {
        broadcast_id: "585041281".to_string(),
        title: "Finals".to_string(),
        channel_name: "esltv_sc2".to_string(),
        meta_game: Some("StarCraft II".to_string()),
        start_time: "2014-08-01".to_string(),
        renditions: vec![rendition("source"), rendition("720p"), rendition("240p")],
    }
}

fn untitled_game() -> VideoInfo {
    VideoInfo {
        broadcast_id: "111".to_string(),
        title: "Q&A: what's next?".to_string(),
        channel_name: "someone".to_string(),
        meta_game: None,
        start_time: "2014-11-03_20-00-00".to_string(),
        renditions: vec![rendition("480p")],
    }
}

fn session(library: &Path) -> Session<CannedExtractor, RecordingDownloader> {
    let videos = [finals(), untitled_game()]
        .into_iter()
        .map(|v| (v.broadcast_id.clone(), v))
        .collect();
    Session::new(
        AppConfig::new(library, library.join("ffmpeg")),
        CannedExtractor { videos },
        RecordingDownloader::default(),
    )
}

fn calls(session: &Session<CannedExtractor, RecordingDownloader>) -> Vec<(String, PathBuf)> {
    session.downloader().calls.lock().unwrap().clone()
}

#[tokio::test]
async fn process_builds_destination_and_passes_quality() {
    let temp = TempDir::new().expect("temp dir");
    let session = session(temp.path());

    let request = Request::parse("585041281 720p").unwrap();
    let saved = session.process(&request).await.expect("download");

    let expected = temp
        .path()
        .join("StarCraft II")
        .join("esltv_sc2")
        .join("Finals_2014-08-01");
    assert_eq!(calls(&session), vec![("720p".to_string(), expected.clone())]);
    assert_eq!(saved, expected.with_extension("mp4"));
}

#[tokio::test]
async fn process_uses_best_quality_and_no_meta_game() {
    let temp = TempDir::new().expect("temp dir");
    let session = session(temp.path());

    session.process(&Request::parse("111").unwrap()).await.unwrap();
    session.process(&Request::parse("585041281").unwrap()).await.unwrap();

    let recorded = calls(&session);
    assert_eq!(recorded[0].0, "480p");
    assert_eq!(
        recorded[0].1,
        temp.path()
            .join("no_meta_game")
            .join("someone")
            .join("Q&A_ what's next__2014-11-03_20-00-00")
    );
    assert_eq!(recorded[1].0, "source");
}

#[tokio::test]
async fn process_reports_missing_quality() {
    let temp = TempDir::new().expect("temp dir");
    let session = session(temp.path());

    let result = session.process(&Request::parse("111 720p").unwrap()).await;
    match result {
        Err(VodError::QualityNotFound { requested, available }) => {
            assert_eq!(requested, "720p");
            assert_eq!(available, vec!["480p".to_string()]);
        }
        other => panic!("expected QualityNotFound, got {:?}", other),
    }
    assert!(calls(&session).is_empty());
}

#[tokio::test]
async fn interactive_session_survives_errors_until_exit() {
    let temp = TempDir::new().expect("temp dir");
    let session = session(temp.path());

    let input = tokio_test::io::Builder::new()
        .read(b"help\n")
        .read(b"\n")
        .read(b"585041281 720p extra\n")
        .read(b"999\n")
        .read(b"http://www.twitch.tv/esltv_sc2/b/585041281 720P\n")
        .read(b"exit\n")
        .build();
    let mut out = Vec::new();

    session
        .run_interactive(BufReader::new(input), &mut out)
        .await
        .expect("interactive run");

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Available qualities: source, 720p, 480p, 360p, 240p"));
    assert!(printed.contains("invalid input"));
    assert!(printed.contains("TwitchApiError: video a999 not found"));
    assert!(printed.contains("Saved "));

    let recorded = calls(&session);
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "720p");
}

#[tokio::test]
async fn interactive_session_reports_undecodable_line() {
    let temp = TempDir::new().expect("temp dir");
    let session = session(temp.path());

    let input = tokio_test::io::Builder::new()
        .read(b"\xff\xfe 123\n")
        .read(b"help\n")
        .read(b"exit\n")
        .build();
    let mut out = Vec::new();

    session
        .run_interactive(BufReader::new(input), &mut out)
        .await
        .expect("interactive run");

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("invalid input"));
    assert!(printed.contains("Available qualities"));
    assert!(calls(&session).is_empty());
}

#[tokio::test]
async fn interactive_session_ends_on_eof() {
    let temp = TempDir::new().expect("temp dir");
    let session = session(temp.path());

    let input = tokio_test::io::Builder::new().read(b"111\n").build();
    let mut out = Vec::new();

    session
        .run_interactive(BufReader::new(input), &mut out)
        .await
        .expect("interactive run");
    assert_eq!(calls(&session).len(), 1);
}

#[tokio::test]
async fn batch_continues_after_failed_lookup() {
    let temp = TempDir::new().expect("temp dir");
    let session = session(temp.path());

    let args = vec!["404".to_string(), "585041281".to_string()];
    let mut out = Vec::new();
    let summary = session.run_batch(&args, &mut out).await.expect("batch run");

    assert_eq!(summary.failed, vec!["404".to_string()]);
    assert_eq!(summary.downloaded.len(), 1);
    assert!(!summary.is_success());

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("TwitchApiError"));
    assert_eq!(calls(&session)[0].0, "source");
}

#[tokio::test]
async fn batch_accepts_quoted_quality_and_rejects_garbage() {
    let temp = TempDir::new().expect("temp dir");
    let session = session(temp.path());

    let args = vec![
        "not-an-id".to_string(),
        "https://www.twitch.tv/esltv_sc2/b/585041281 240p".to_string(),
    ];
    let mut out = Vec::new();
    let summary = session.run_batch(&args, &mut out).await.expect("batch run");

    assert_eq!(summary.failed, vec!["not-an-id".to_string()]);
    assert_eq!(calls(&session), vec![(
        "240p".to_string(),
        temp.path().join("StarCraft II").join("esltv_sc2").join("Finals_2014-08-01"),
    )]);
}
