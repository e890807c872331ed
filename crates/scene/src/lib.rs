//! Scene state: graph, materials, camera, animation speed, and the builder
//! that assembles the torus field.
//!
//! # Invariants
//! - Nodes and materials are never removed once the scene is built.
//! - All mutable state lives in [`Scene`] and is passed explicitly.

pub mod builder;
pub mod camera;
pub mod config;
pub mod error;
pub mod graph;
pub mod material;
pub mod scene;
pub mod speed;

pub use builder::SceneBuilder;
pub use camera::PerspectiveCamera;
pub use config::{SceneConfig, TextureConfig};
pub use error::SceneError;
pub use graph::{Geometry, Node, NodeKind, SceneGraph};
pub use material::{MaterialId, MaterialLibrary, StandardMaterial};
pub use scene::{Scene, SceneHandles, Viewport};
pub use speed::AnimationSpeed;
