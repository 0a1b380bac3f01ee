//! Sign page scraper
//!
//! Fetches `<base_url><id>` and reads the `src` of the first `<source>` inside
//! `<video class="main_video">`. A page without one is a normal outcome
//! (`Ok(None)`), not an error.

use nzsl_common::NzslId;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::info;
use url::Url;

/// Where the sign video lives on a sign page
pub const VIDEO_SOURCE_SELECTOR: &str = "video.main_video source";

/// Sign page lookup errors
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Cannot build sign page URL for ID {nzsl_id}: {source}")]
    PageUrl {
        nzsl_id: NzslId,
        #[source]
        source: url::ParseError,
    },

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Sign page {url} returned HTTP {status}")]
    Status { url: Url, status: StatusCode },

    #[error("Invalid video URL '{src}' on {url}: {source}")]
    VideoUrl {
        url: Url,
        src: String,
        #[source]
        source: url::ParseError,
    },
}

/// Finds the video URL for a sign
#[derive(Debug, Clone)]
pub struct VideoLocator {
    http: reqwest::Client,
    base_url: Url,
}

impl VideoLocator {
    /// `base_url` must end with `/`; see `nzsl_common::config::normalize_base_url`
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Sign page URL for `nzsl_id`
    pub fn page_url(&self, nzsl_id: NzslId) -> Result<Url, LocateError> {
        self.base_url
            .join(&nzsl_id.to_string())
            .map_err(|source| LocateError::PageUrl { nzsl_id, source })
    }

    /// Fetch the sign page and return the absolute video URL, if any
    pub async fn locate(&self, nzsl_id: NzslId) -> Result<Option<Url>, LocateError> {
        let url = self.page_url(nzsl_id)?;
        info!(nzsl_id, url = %url, "Fetching sign page");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| LocateError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocateError::Status { url, status });
        }

        let html = response
            .text()
            .await
            .map_err(|source| LocateError::Network {
                url: url.clone(),
                source,
            })?;

        let Some(src) = extract_video_src(&html) else {
            info!(nzsl_id, "No video found on sign page");
            return Ok(None);
        };

        // Relative sources resolve against the page they came from
        let video_url = url.join(&src).map_err(|source| LocateError::VideoUrl {
            url: url.clone(),
            src: src.clone(),
            source,
        })?;

        info!(nzsl_id, video_url = %video_url, "Found video");
        Ok(Some(video_url))
    }
}

/// Pull the main video's source URL out of a sign page
///
/// Missing element, missing attribute and empty attribute all yield `None`.
pub fn extract_video_src(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(VIDEO_SOURCE_SELECTOR).expect("valid selector");

    document
        .select(&selector)
        .next()
        .and_then(|source| source.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}
