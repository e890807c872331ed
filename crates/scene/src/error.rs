use crate::material::MaterialId;
use std::path::PathBuf;
use torusfield_common::NodeId;

/// Errors from scene construction and mutation.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("material {0:?} not found")]
    MaterialNotFound(MaterialId),
    #[error("node {0:?} is not a camera")]
    NotACamera(NodeId),
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ConfigJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
