//! Error types for the placement engine.
//!
//! Asset failures ([`LoadError`]) travel to the caller that started the load.
//! Hit-test failures ([`HitTestFailure`]) never leave the surface classifier.
//! Async completions that find their session or object gone are not errors at
//! all: those operations resolve to `Ok(None)`.

use crate::gfx::scene::ObjectId;

/// Result alias for placement and texture operations.
pub type Result<T, E = PlacementError> = std::result::Result<T, E>;

/// Failure to fetch or parse a model or texture.
///
/// `Clone` because a single failed fetch is reported to every caller that was
/// waiting on the same in-flight request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to parse model `{url}`: {reason}")]
    Parse { url: String, reason: String },

    #[error("failed to decode texture `{url}`: {reason}")]
    Decode { url: String, reason: String },

    #[error("unsupported asset format for `{url}`")]
    UnsupportedFormat { url: String },
}

impl LoadError {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// URL of the asset that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. }
            | Self::Parse { url, .. }
            | Self::Decode { url, .. }
            | Self::UnsupportedFormat { url } => url,
        }
    }
}

/// Errors reported by the object manager and the session.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    /// Product has no model url to load; nothing was created.
    #[error("product `{0}` has no usable model url")]
    NoModelAvailable(String),

    #[error("texture `{texture_id}` is not offered for product `{product_id}`")]
    UnknownTexture {
        product_id: String,
        texture_id: String,
    },

    #[error("no placed object with id {0}")]
    UnknownObject(ObjectId),

    #[error("no object is selected")]
    NothingSelected,

    /// The request arrived while no AR session is running.
    #[error("AR session is not active")]
    SessionInactive,

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Transient failure inside the per-frame hit test.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HitTestFailure {
    #[error("hit-test source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("hit test failed: {0}")]
    Query(String),
}

/// Rejected engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
