//! Rendering Adapter: renderer-agnostic interface and mesh generation.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - Render state derives from scene state and view.
//!
//! Mesh data for the parametric shapes lives here so every backend
//! tessellates them the same way. The text renderer is what headless runs
//! print each frame.

mod geometry;
mod renderer;

pub use geometry::MeshData;
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "torusfield-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
