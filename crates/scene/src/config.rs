use crate::error::SceneError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use torusfield_common::{Color, CubeFaces};

/// Texture paths, relative to the asset root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub normal_map: PathBuf,
    /// Albedo map for the knot material. Unset by default.
    pub color_map: Option<PathBuf>,
    pub environment: CubeFaces,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            normal_map: PathBuf::from("textures/plaster_grey_04_nor_dx_2k.jpg"),
            color_map: None,
            environment: CubeFaces::from_dir("textures/environment", "png"),
        }
    }
}

/// Initial values for everything the panel can change, plus asset paths.
///
/// Every field has a default, so a config file only lists what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub rings_color: Color,
    pub knot_color: Color,
    pub rings_metalness: f32,
    pub rings_roughness: f32,
    pub knot_metalness: f32,
    pub knot_roughness: f32,
    pub normal_scale: f32,
    /// Seed for the speed RNG; a fresh seed is drawn when unset.
    pub speed_seed: Option<u64>,
    pub textures: TextureConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rings_color: Color::from_srgb8([0xde, 0xde, 0xde]),
            knot_color: Color::from_srgb8([0xb0, 0xbd, 0xbf]),
            rings_metalness: 1.0,
            rings_roughness: 0.1395,
            knot_metalness: 0.25,
            knot_roughness: 0.1395,
            normal_scale: 1.0,
            speed_seed: None,
            textures: TextureConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| SceneError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| SceneError::ConfigJson {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("scene config loaded from {}", path.display());
        Ok(config)
    }

    /// RNG for speed resets: seeded when `speed_seed` is set, from OS
    /// entropy otherwise.
    pub fn speed_rng(&self) -> StdRng {
        match self.speed_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SceneError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_panel() {
        let c = SceneConfig::default();
        assert_eq!(c.rings_color.to_hex(), "#dedede");
        assert_eq!(c.knot_color.to_hex(), "#b0bdbf");
        assert_eq!(c.rings_metalness, 1.0);
        assert_eq!(c.knot_metalness, 0.25);
        assert_eq!(c.normal_scale, 1.0);
        assert!(c.textures.color_map.is_none());
    }

    #[test]
    fn partial_file_overrides_only_listed_fields() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, r##"{{ "rings_color": "#ff0000", "speed_seed": 9 }}"##).unwrap();

        let c = SceneConfig::load(tmp.path()).unwrap();
        assert_eq!(c.rings_color.to_hex(), "#ff0000");
        assert_eq!(c.speed_seed, Some(9));
        assert_eq!(c.knot_color.to_hex(), "#b0bdbf");
        assert_eq!(c.textures, TextureConfig::default());
    }

    #[test]
    fn bad_json_reports_path() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "not json").unwrap();
        let err = SceneConfig::load(tmp.path()).unwrap_err();
        assert!(matches!(err, SceneError::ConfigJson { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SceneConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SceneError::ConfigIo { .. }));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        use rand::Rng;
        let c = SceneConfig {
            speed_seed: Some(3),
            ..SceneConfig::default()
        };
        let a: f32 = c.speed_rng().r#gen();
        let b: f32 = c.speed_rng().r#gen();
        assert_eq!(a, b);
    }

    #[test]
    fn load_or_default_without_path() {
        assert_eq!(SceneConfig::load_or_default(None).unwrap(), SceneConfig::default());
    }
}
