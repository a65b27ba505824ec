//! Crate error type
//!
//! Only the outer shell can fail (config parsing, asset I/O). The simulation
//! and geometry clamp instead of returning errors.

use thiserror::Error;

use crate::sim::SpriteKey;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to decode sprite {key:?}")]
    AssetDecode {
        key: SpriteKey,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to fetch sprite {key:?}: {message}")]
    AssetFetch { key: SpriteKey, message: String },

    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, Error>;
