//! wgpu render backend for the torus field scene.
//!
//! Draws the environment cube map as background, then every mesh node with
//! a metal/rough shader lit by the scene's ambient and point lights.
//! Camera motion comes from [`OrbitControls`].
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Orbit controls only move the camera node and its target.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitControls;
pub use gpu::WgpuRenderer;
