//! Stream URL resolution and adaptive playback attachment for M3U/HLS playlists.
//!
//! - [`resolver`]: follows redirects and nested manifests to a playable URL.
//! - [`playback`]: wraps an existing player, rewrites playlist entries with
//!   resolved URLs and attaches HLS playback to the preview audio element.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod playback;
pub mod resolver;
pub mod utils;

pub use playback::{PlaybackAttacher, Player, Playlist};
pub use resolver::{Resolution, Resolver, Termination};
