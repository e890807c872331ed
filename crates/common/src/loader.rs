use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque handle to a texture that may still be loading.
///
/// Handles are issued synchronously; pixel data arrives later (or never).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// How texel values should be interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Color images (albedo, environment).
    Srgb,
    /// Data images (normal maps).
    Linear,
}

/// The six faces of a cube map in `+X, -X, +Y, -Y, +Z, -Z` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeFaces(pub [PathBuf; 6]);

impl CubeFaces {
    /// Faces named `px nx py ny pz nz` with the given extension inside `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>, extension: &str) -> Self {
        let dir = dir.into();
        Self(
            ["px", "nx", "py", "ny", "pz", "nz"]
                .map(|face| dir.join(format!("{face}.{extension}"))),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.0.iter()
    }
}

/// Issues handles for textures and starts loading them.
///
/// Implementations never fail at request time; failures are reported by
/// the implementation's own channel (logs, events).
pub trait TextureLoader {
    fn load_texture(&mut self, path: PathBuf, color_space: ColorSpace) -> TextureHandle;

    fn load_cube(&mut self, faces: CubeFaces) -> TextureHandle;
}

/// Hands out handles without touching the filesystem.
///
/// Used by headless runs, where nothing is ever sampled.
#[derive(Debug, Default)]
pub struct NoopLoader {
    issued: u32,
}

impl NoopLoader {
    pub fn issued(&self) -> u32 {
        self.issued
    }

    fn next(&mut self) -> TextureHandle {
        let handle = TextureHandle(self.issued);
        self.issued += 1;
        handle
    }
}

impl TextureLoader for NoopLoader {
    fn load_texture(&mut self, _path: PathBuf, _color_space: ColorSpace) -> TextureHandle {
        self.next()
    }

    fn load_cube(&mut self, _faces: CubeFaces) -> TextureHandle {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_loader_issues_distinct_handles() {
        let mut loader = NoopLoader::default();
        let a = loader.load_texture(PathBuf::from("a.png"), ColorSpace::Srgb);
        let b = loader.load_cube(CubeFaces::from_dir("env", "png"));
        assert_ne!(a, b);
        assert_eq!(loader.issued(), 2);
    }

    #[test]
    fn cube_faces_follow_axis_order() {
        let faces = CubeFaces::from_dir("textures/environment", "png");
        let names: Vec<String> = faces
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"]);
    }
}
