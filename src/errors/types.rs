//! Error type definitions for m3u-playback
//!
//! Resolution and attachment are best-effort: none of these errors reach the
//! caller of `Resolver::resolve` or of the wrapped `Player::play`. They exist so
//! that each failing step has a typed cause to log and to record in the
//! `Resolution` / `AttachOutcome` results.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Stream resolution errors
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Playback attachment errors
    #[error("Attach error: {0}")]
    Attach(#[from] AttachError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Errors reported by the wrapped external player
    #[error("Player error: {message}")]
    Player { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised by a single resolution step.
///
/// `Clone` so the cause can be kept in a `Termination::Failed` while the
/// resolver keeps its fallback URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Transport level failure (DNS, connect, TLS, redirect loop, timeout)
    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    /// Server answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be read
    #[error("Failed to read body from {url}: {message}")]
    Body { url: String, message: String },

    /// A URL could not be parsed or joined
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Errors raised while attaching a playback mechanism to a media element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    /// The adaptive-streaming client script could not be loaded
    #[error("Failed to load client script {url}: {message}")]
    ScriptLoad { url: String, message: String },

    /// The client library cannot run on this host, or refused to construct a session
    #[error("Failed to create streaming session: {message}")]
    SessionCreate { message: String },

    /// Binding the session to the media element failed
    #[error("Failed to bind session to media element: {message}")]
    Bind { message: String },

    /// The session rejected the source
    #[error("Failed to load source {url}: {message}")]
    LoadSource { url: String, message: String },
}

/// A media element refused to start playback (autoplay policy, aborted load).
/// Suppressed by the attacher; never treated as a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("play() rejected: {reason}")]
pub struct PlayRejected {
    pub reason: String,
}

impl PlayRejected {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a player error
    pub fn player<S: Into<String>>(message: S) -> Self {
        Self::Player {
            message: message.into(),
        }
    }
}

impl ResolveError {
    pub fn request<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn body<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Body {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn invalid_url<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl AttachError {
    pub fn script_load<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::ScriptLoad {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn session_create<S: Into<String>>(message: S) -> Self {
        Self::SessionCreate {
            message: message.into(),
        }
    }

    pub fn bind<S: Into<String>>(message: S) -> Self {
        Self::Bind {
            message: message.into(),
        }
    }
}
