//! Developer Tooling: read-only scene inspection.
//!
//! # Invariants
//! - Inspection never mutates the scene.

mod inspector;

pub use inspector::{MeshInfo, NodeInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "torusfield-tools v0.1.0"
}
