use glam::Vec3;
use std::fmt::Write;
use torusfield_scene::{NodeKind, Scene, SceneError};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
}

impl RenderView {
    /// View through the scene's camera.
    pub fn from_scene(scene: &Scene) -> Result<Self, SceneError> {
        let id = scene.handles.camera;
        let camera = scene.graph.camera(id)?;
        Ok(Self {
            eye: scene.graph.world_position(id)?,
            target: camera.target,
            fov_degrees: camera.fov_degrees,
            aspect: camera.aspect,
        })
    }
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 6.0),
            target: Vec3::ZERO,
            fov_degrees: 35.0,
            aspect: 1.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view configuration, then produces
/// output. It never mutates the scene.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of the scene state.
///
/// Used by headless runs and tests; one call per frame.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (nodes={}, speed={:.4}) ===",
            scene.graph.node_count(),
            scene.speed.get()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees, view.aspect
        );

        let mut meshes: Vec<_> = scene.graph.meshes().collect();
        meshes.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        for (id, node, _, material) in meshes {
            let r = node.transform.rotation;
            let material = scene
                .materials
                .get(material)
                .map(|m| m.name.as_str())
                .unwrap_or("?");
            let _ = writeln!(
                out,
                "  {} [{}] rot=({:.4}, {:.4}, {:.4}) material={}",
                node.name,
                id.short(),
                r.x,
                r.y,
                r.z,
                material
            );
        }

        for (_, node) in scene.graph.lights() {
            if let NodeKind::AmbientLight { color, intensity }
            | NodeKind::PointLight { color, intensity } = &node.kind
            {
                let p = node.transform.position;
                let _ = writeln!(
                    out,
                    "  {} {} x{:.2} at ({:.1}, {:.1}, {:.1})",
                    node.name,
                    color,
                    intensity,
                    p.x,
                    p.y,
                    p.z
                );
            }
        }

        for (_, m) in scene.materials.iter() {
            let _ = writeln!(
                out,
                "  material {} color={} metalness={:.4} roughness={:.4} normalScale=({:.3}, {:.3})",
                m.name, m.color, m.metalness, m.roughness, m.normal_scale.x, m.normal_scale.y
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::Path;
    use torusfield_common::NoopLoader;
    use torusfield_scene::{SceneBuilder, SceneConfig, Viewport};

    fn scene() -> Scene {
        SceneBuilder::new(&SceneConfig::default(), Path::new("."))
            .build(
                Viewport::new(800.0, 400.0, 1.0),
                &mut NoopLoader::default(),
                &mut StdRng::seed_from_u64(8),
            )
            .unwrap()
    }

    #[test]
    fn view_comes_from_scene_camera() {
        let s = scene();
        let view = RenderView::from_scene(&s).unwrap();
        assert!((view.eye - Vec3::new(0.0, 0.0, 6.0)).length() < 1e-5);
        assert_eq!(view.target, Vec3::ZERO);
        assert_eq!(view.fov_degrees, 35.0);
        assert_eq!(view.aspect, 2.0);
    }

    #[test]
    fn text_lists_every_mesh_and_material() {
        let s = scene();
        let out = DebugTextRenderer::new().render(&s, &RenderView::from_scene(&s).unwrap());
        for name in ["torus_1", "torus_2", "torus_3", "torus_4", "torus_5", "torus_knot"] {
            assert!(out.contains(name), "{name} missing from\n{out}");
        }
        assert!(out.contains("color=#dedede"));
        assert!(out.contains("color=#b0bdbf"));
        assert!(out.contains("fov=35"));
    }

    #[test]
    fn text_reports_lights() {
        let s = scene();
        let out = DebugTextRenderer::new().render(&s, &RenderView::default());
        assert!(out.contains("x0.50 at (2.0, 3.0, 4.0)"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 35.0);
        assert_eq!(view.target, Vec3::ZERO);
    }
}
