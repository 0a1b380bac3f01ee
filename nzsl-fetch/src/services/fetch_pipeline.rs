//! Query → identifier → video URL → local file
//!
//! One request walks `Received → Resolving → Locating → Downloading → Done`.
//! A failure stops the walk; the error records the stage it stopped in.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use nzsl_common::config::Settings;
use nzsl_common::NzslId;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use super::asset_downloader::{AssetDownloader, DownloadError, DownloadOutcome};
use super::corpus::CorpusError;
use super::gloss_resolver::GlossResolver;
use super::video_locator::{LocateError, VideoLocator};

/// Request progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Resolving,
    Locating,
    Downloading,
    Done,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStage::Received => "received",
            RequestStage::Resolving => "resolving",
            RequestStage::Locating => "locating",
            RequestStage::Downloading => "downloading",
            RequestStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Empty or absent query
    #[error("Query parameter \"q\" is required")]
    MissingQuery,

    /// No gloss term matched
    #[error("No matching entries found for '{query}'")]
    NoMatch { query: String },

    /// Corpus directory unusable
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// Blocking corpus scan panicked or was cancelled
    #[error("Corpus scan aborted: {0}")]
    ScanAborted(#[from] tokio::task::JoinError),

    /// Sign page has no main video
    #[error("No video found for ID: {nzsl_id}")]
    NoVideo { nzsl_id: NzslId },

    /// Sign page fetch failed
    #[error("Failed to fetch sign page for ID {nzsl_id}: {source}")]
    Upstream {
        nzsl_id: NzslId,
        #[source]
        source: LocateError,
    },

    /// Video transfer or file write failed
    #[error("Failed to download video for ID {nzsl_id}: {source}")]
    Download {
        nzsl_id: NzslId,
        #[source]
        source: DownloadError,
    },
}

impl FetchError {
    /// Stage the request stopped in
    pub fn stage(&self) -> RequestStage {
        match self {
            FetchError::MissingQuery => RequestStage::Received,
            FetchError::NoMatch { .. } | FetchError::Corpus(_) | FetchError::ScanAborted(_) => {
                RequestStage::Resolving
            }
            FetchError::NoVideo { .. } | FetchError::Upstream { .. } => RequestStage::Locating,
            FetchError::Download { .. } => RequestStage::Downloading,
        }
    }

    /// Identifier resolved before the failure, if any
    pub fn nzsl_id(&self) -> Option<NzslId> {
        match self {
            FetchError::NoVideo { nzsl_id }
            | FetchError::Upstream { nzsl_id, .. }
            | FetchError::Download { nzsl_id, .. } => Some(*nzsl_id),
            _ => None,
        }
    }
}

/// A video that is now on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    pub nzsl_id: NzslId,
    pub source_url: Url,
    pub local_path: PathBuf,
    pub outcome: DownloadOutcome,
}

/// Resolver, locator and downloader wired together
#[derive(Debug)]
pub struct FetchPipeline {
    resolver: GlossResolver,
    locator: VideoLocator,
    downloader: AssetDownloader,
    video_dir: PathBuf,
}

impl FetchPipeline {
    pub fn new(
        resolver: GlossResolver,
        locator: VideoLocator,
        downloader: AssetDownloader,
        video_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            locator,
            downloader,
            video_dir: video_dir.into(),
        }
    }

    /// Build the pipeline and its shared HTTP client from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self::new(
            GlossResolver::new(&settings.lookup_dir),
            VideoLocator::new(http.clone(), settings.base_url.clone()),
            AssetDownloader::new(http),
            &settings.video_dir,
        ))
    }

    /// Resolve `query` and download its video
    pub async fn fetch_by_query(&self, query: &str) -> Result<VideoAsset, FetchError> {
        let result = self.run_query(query).await;
        if let Err(e) = &result {
            warn!(query = %query, stage = %e.stage(), "Fetch failed: {}", e);
        }
        result
    }

    async fn run_query(&self, query: &str) -> Result<VideoAsset, FetchError> {
        if query.is_empty() {
            return Err(FetchError::MissingQuery);
        }

        let nzsl_id = self
            .resolve(query)
            .await?
            .ok_or_else(|| FetchError::NoMatch {
                query: query.to_string(),
            })?;
        info!(query = %query, nzsl_id, "Found match for query");

        self.run_id(nzsl_id).await
    }

    /// Look `query` up in the corpus without downloading anything
    pub async fn resolve(&self, query: &str) -> Result<Option<NzslId>, FetchError> {
        let resolver = self.resolver.clone();
        let query = query.to_string();
        let found = tokio::task::spawn_blocking(move || resolver.resolve(&query)).await??;
        Ok(found)
    }

    /// Download the video of a known sign
    pub async fn fetch_by_id(&self, nzsl_id: NzslId) -> Result<VideoAsset, FetchError> {
        let result = self.run_id(nzsl_id).await;
        if let Err(e) = &result {
            warn!(nzsl_id, stage = %e.stage(), "Fetch failed: {}", e);
        }
        result
    }

    async fn run_id(&self, nzsl_id: NzslId) -> Result<VideoAsset, FetchError> {
        let source_url = self
            .locator
            .locate(nzsl_id)
            .await
            .map_err(|source| FetchError::Upstream { nzsl_id, source })?
            .ok_or(FetchError::NoVideo { nzsl_id })?;

        let local_path = self.video_dir.join(video_file_name(nzsl_id, &source_url));

        let outcome = self
            .downloader
            .download(&source_url, &local_path)
            .await
            .map_err(|source| FetchError::Download { nzsl_id, source })?;

        info!(nzsl_id, file = %local_path.display(), stage = %RequestStage::Done, "Video ready");
        Ok(VideoAsset {
            nzsl_id,
            source_url,
            local_path,
            outcome,
        })
    }
}

/// `<id>_<last path segment>`, e.g. `42_cat.mp4`
pub fn video_file_name(nzsl_id: NzslId, video_url: &Url) -> String {
    let remote = video_url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("video");
    format!("{}_{}", nzsl_id, remote)
}

/// Shared handle used by the HTTP layer
pub type SharedPipeline = Arc<FetchPipeline>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_last_segment_without_query() {
        let url = Url::parse("https://media.example/videos/2020/cat.mp4?token=abc").unwrap();
        assert_eq!(video_file_name(42, &url), "42_cat.mp4");
    }

    #[test]
    fn file_name_falls_back_when_segment_empty() {
        let url = Url::parse("https://media.example/videos/").unwrap();
        assert_eq!(video_file_name(7, &url), "7_video");
    }

    #[test]
    fn stages_follow_failure_point() {
        assert_eq!(FetchError::MissingQuery.stage(), RequestStage::Received);
        assert_eq!(
            FetchError::NoMatch { query: "x".into() }.stage(),
            RequestStage::Resolving
        );
        assert_eq!(FetchError::NoVideo { nzsl_id: 1 }.stage(), RequestStage::Locating);
        assert_eq!(FetchError::NoVideo { nzsl_id: 1 }.nzsl_id(), Some(1));
        assert_eq!(FetchError::MissingQuery.nzsl_id(), None);
    }

    #[tokio::test]
    async fn empty_query_rejected_before_corpus_scan() {
        let settings = nzsl_common::config::Settings::resolve(
            &nzsl_common::config::Overrides {
                lookup_dir: Some(PathBuf::from("/definitely/not/here")),
                ..Default::default()
            },
            &Default::default(),
        )
        .unwrap();
        let pipeline = FetchPipeline::from_settings(&settings).unwrap();

        let err = pipeline.fetch_by_query("").await.unwrap_err();
        assert!(matches!(err, FetchError::MissingQuery));

        let err = pipeline.fetch_by_query("cat").await.unwrap_err();
        assert!(matches!(err, FetchError::Corpus(CorpusError::PathNotFound(_))));
    }
}
