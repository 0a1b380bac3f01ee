//! Lookup and download services

pub mod asset_downloader;
pub mod corpus;
pub mod corpus_reducer;
pub mod fetch_pipeline;
pub mod gloss_resolver;
pub mod video_locator;

pub use asset_downloader::{AssetDownloader, DownloadError, DownloadOutcome};
pub use corpus::CorpusError;
pub use corpus_reducer::{CorpusReducer, ReduceSummary};
pub use fetch_pipeline::{FetchError, FetchPipeline, RequestStage, VideoAsset};
pub use gloss_resolver::{GlossIndex, GlossResolver};
pub use video_locator::{LocateError, VideoLocator};
