//! Shared test fixtures
//!
//! - A local axum server standing in for the NZSL sign site
//! - Corpus directory builders
//! - Settings pointing at both

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use nzsl_common::config::{Overrides, Settings, TomlConfig};
use url::Url;

/// Sign ids the mock site knows about
pub const ID_RELATIVE_VIDEO: u64 = 42;
pub const ID_NO_VIDEO: u64 = 43;
pub const ID_PAGE_ERROR: u64 = 44;
pub const ID_ABSOLUTE_VIDEO: u64 = 45;
pub const ID_MISSING_VIDEO: u64 = 46;
pub const ID_SLOW_VIDEO: u64 = 47;
pub const ID_EMPTY_SRC: u64 = 48;

#[derive(Clone)]
struct SiteState {
    origin: String,
    page_hits: Arc<AtomicUsize>,
    video_hits: Arc<AtomicUsize>,
}

/// Running mock sign site
pub struct MockSignSite {
    /// `http://127.0.0.1:<port>/signs/`
    pub base_url: Url,
    pub origin: String,
    page_hits: Arc<AtomicUsize>,
    video_hits: Arc<AtomicUsize>,
}

impl MockSignSite {
    /// Sign page requests served so far
    pub fn page_hits(&self) -> usize {
        self.page_hits.load(Ordering::SeqCst)
    }

    /// Video requests served so far
    pub fn video_hits(&self) -> usize {
        self.video_hits.load(Ordering::SeqCst)
    }

    pub fn video_url(&self, name: &str) -> Url {
        Url::parse(&format!("{}/videos/{}", self.origin, name)).unwrap()
    }
}

/// Video body served for `name`
pub fn video_bytes(name: &str) -> Vec<u8> {
    format!("FAKE-MP4:{}", name).into_bytes()
}

fn page_with_source(src: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Sign</title></head>
<body>
  <div class="sign">
    <video class="main_video" controls preload="auto">
      <source src="{}" type="video/mp4">
    </video>
  </div>
</body></html>"#,
        src
    )
}

async fn sign_page(State(state): State<SiteState>, UrlPath(id): UrlPath<u64>) -> Response {
    state.page_hits.fetch_add(1, Ordering::SeqCst);

    match id {
        ID_RELATIVE_VIDEO => Html(page_with_source("/videos/cat.mp4")).into_response(),
        ID_NO_VIDEO => Html("<html><body><h1>bird</h1><p>No video yet</p></body></html>".to_string())
            .into_response(),
        ID_PAGE_ERROR => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        ID_ABSOLUTE_VIDEO => Html(page_with_source(&format!(
            "{}/videos/dog.mp4?v=3",
            state.origin
        )))
        .into_response(),
        ID_MISSING_VIDEO => Html(page_with_source("/videos/missing.mp4")).into_response(),
        ID_SLOW_VIDEO => Html(page_with_source("/videos/slow.mp4")).into_response(),
        ID_EMPTY_SRC => Html(page_with_source("")).into_response(),
        _ => (StatusCode::NOT_FOUND, "no such sign").into_response(),
    }
}

async fn video(State(state): State<SiteState>, UrlPath(name): UrlPath<String>) -> Response {
    state.video_hits.fetch_add(1, Ordering::SeqCst);

    match name.as_str() {
        "missing.mp4" => (StatusCode::NOT_FOUND, "gone").into_response(),
        "slow.mp4" => {
            tokio::time::sleep(Duration::from_millis(200)).await;
            ([(header::CONTENT_TYPE, "video/mp4")], video_bytes(&name)).into_response()
        }
        _ => ([(header::CONTENT_TYPE, "video/mp4")], video_bytes(&name)).into_response(),
    }
}

/// Start the mock site on an ephemeral port
pub async fn spawn_sign_site() -> MockSignSite {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    let origin = format!("http://{}", addr);

    let page_hits = Arc::new(AtomicUsize::new(0));
    let video_hits = Arc::new(AtomicUsize::new(0));
    let state = SiteState {
        origin: origin.clone(),
        page_hits: page_hits.clone(),
        video_hits: video_hits.clone(),
    };

    let app = Router::new()
        .route("/signs/:id", get(sign_page))
        .route("/videos/:name", get(video))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock site crashed");
    });

    MockSignSite {
        base_url: Url::parse(&format!("{}/signs/", origin)).unwrap(),
        origin,
        page_hits,
        video_hits,
    }
}

/// Write one raw record file
pub fn write_record(dir: &Path, file: &str, json: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(file), json).expect("Should write record");
}

/// Corpus covering every mock site case
pub fn write_standard_corpus(dir: &Path) {
    write_record(
        dir,
        "cat.json",
        r#"{"nzsl_id": 42, "gloss": {"english": ["cat"], "english_secondary": ["kitten", "pussycat"]}, "videos": []}"#,
    );
    write_record(
        dir,
        "bird.json",
        r#"{"nzsl_id": 43, "gloss": {"english": ["bird"], "english_secondary": []}}"#,
    );
    write_record(
        dir,
        "broken_page.json",
        r#"{"nzsl_id": 44, "gloss": {"english": ["error"], "english_secondary": []}}"#,
    );
    write_record(
        dir,
        "dog.json",
        r#"{"nzsl_id": 45, "gloss": {"english": ["Dog"], "english_secondary": ["puppy"]}}"#,
    );
    write_record(
        dir,
        "gone.json",
        r#"{"nzsl_id": 46, "gloss": {"english": ["vanished"], "english_secondary": []}}"#,
    );
    write_record(
        dir,
        "slow.json",
        r#"{"nzsl_id": 47, "gloss": {"english": ["slow"], "english_secondary": []}}"#,
    );
}

/// Settings aimed at a mock site and temp directories
pub fn test_settings(site_base: &Url, lookup_dir: &Path, video_dir: &Path) -> Settings {
    let overrides = Overrides {
        base_url: Some(site_base.to_string()),
        lookup_dir: Some(lookup_dir.to_path_buf()),
        video_dir: Some(video_dir.to_path_buf()),
        request_timeout_secs: Some(10),
        ..Default::default()
    };
    Settings::resolve(&overrides, &TomlConfig::default()).expect("Valid test settings")
}

/// Every regular file in `dir`, sorted
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}
