use crate::error::SceneError;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use torusfield_common::{Color, TextureHandle};

/// Index of a material in the [`MaterialLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// Metal/rough surface description shared by any number of meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub name: String,
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    pub normal_scale: Vec2,
    pub env_map: Option<TextureHandle>,
}

impl StandardMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            map: None,
            normal_map: None,
            normal_scale: Vec2::ONE,
            env_map: None,
        }
    }
}

/// Owns every material; meshes refer to them by [`MaterialId`].
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: Vec<StandardMaterial>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: StandardMaterial) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    pub fn get(&self, id: MaterialId) -> Result<&StandardMaterial, SceneError> {
        self.materials
            .get(id.0 as usize)
            .ok_or(SceneError::MaterialNotFound(id))
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Result<&mut StandardMaterial, SceneError> {
        self.materials
            .get_mut(id.0 as usize)
            .ok_or(SceneError::MaterialNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &StandardMaterial)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i as u32), m))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let mut lib = MaterialLibrary::new();
        let a = lib.insert(StandardMaterial::new("a"));
        let b = lib.insert(StandardMaterial::new("b"));
        assert_eq!(a, MaterialId(0));
        assert_eq!(b, MaterialId(1));
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn missing_material_is_an_error() {
        let lib = MaterialLibrary::new();
        assert!(matches!(
            lib.get(MaterialId(3)),
            Err(SceneError::MaterialNotFound(MaterialId(3)))
        ));
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut lib = MaterialLibrary::new();
        let id = lib.insert(StandardMaterial::new("rings"));
        lib.get_mut(id).unwrap().metalness = 1.0;
        assert_eq!(lib.get(id).unwrap().metalness, 1.0);
    }
}
