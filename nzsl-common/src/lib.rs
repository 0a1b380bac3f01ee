//! # NZSL Common Library
//!
//! Shared code for the nzsl-fetch service and CLI:
//! - Sign corpus record types
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod corpus;
pub mod error;

pub use corpus::{NzslId, SignRecord};
pub use error::{Error, Result};
