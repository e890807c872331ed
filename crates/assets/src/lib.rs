//! Texture loading: decode on a background thread, hand results back by handle.
//!
//! The scene asks for textures through [`torusfield_common::TextureLoader`]
//! and gets a handle immediately. The renderer polls the [`LoadingManager`]
//! each frame and uploads whatever has finished.
//!
//! # Invariants
//! - Every request finishes exactly once, as loaded or failed.
//! - Failures are reported, never retried.

pub mod decode;
pub mod manager;

pub use decode::{CubeImage, ImageData, LoadedTexture, decode_cube, decode_file};
pub use manager::{LoadEvent, LoadProgress, LoadingManager};

use std::path::PathBuf;

/// Errors from texture loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cube face {path} is {got:?}, expected square {expected:?}")]
    CubeFaceMismatch {
        path: PathBuf,
        expected: (u32, u32),
        got: (u32, u32),
    },
    #[error("texture worker disconnected")]
    Disconnected,
    #[error("timed out with {pending} texture(s) still loading")]
    Timeout { pending: u32 },
}

pub fn crate_info() -> &'static str {
    "torusfield-assets v0.1.0"
}
