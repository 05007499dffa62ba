//! Centralized error handling for m3u-playback
//!
//! # Error Categories
//!
//! - **Resolve Errors**: network, status, body and URL failures of a single
//!   resolution step. Always recovered by falling back to the last good URL.
//! - **Attach Errors**: script loading and streaming session failures. Always
//!   recovered by aborting the attachment pass.
//! - **App Errors**: configuration, player and I/O failures surfaced at the
//!   binary edge.
//!
//! # Usage
//!
//! ```rust
//! use m3u_playback::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("max_playlist_bytes must be > 0"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for a single resolution step
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Convenience type alias for attachment steps
pub type AttachResult<T> = Result<T, AttachError>;
