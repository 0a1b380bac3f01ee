//! HTTP API handlers for nzsl-fetch

pub mod buildinfo;
pub mod download;
pub mod health;

pub use buildinfo::get_build_info;
pub use download::download_video;
pub use health::health_routes;
