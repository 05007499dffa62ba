//! Utility modules for m3u-playback
//!
//! This module contains reusable utilities that can be used
//! across different parts of the system.

pub mod url;

pub use url::UrlUtils;
