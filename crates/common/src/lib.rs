//! Shared vocabulary for the torusfield workspace.
//!
//! # Invariants
//! - Rotations are XYZ Euler angles in radians, applied X then Y then Z.
//! - Colors are stored in sRGB and converted to linear only for shading.

pub mod color;
pub mod loader;
pub mod types;

pub use color::{Color, ParseColorError};
pub use loader::{ColorSpace, CubeFaces, NoopLoader, TextureHandle, TextureLoader};
pub use types::{NodeId, Transform};
