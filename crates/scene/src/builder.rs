use crate::camera::PerspectiveCamera;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::graph::{Geometry, Node, NodeKind, SceneGraph};
use crate::material::{MaterialLibrary, StandardMaterial};
use crate::scene::{Scene, SceneHandles, Viewport};
use crate::speed::AnimationSpeed;
use glam::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::PI;
use std::path::Path;
use torusfield_common::{Color, ColorSpace, CubeFaces, TextureLoader, Transform};

/// One ring of the field: tube dimensions and resting rotation.
struct RingSpec {
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
    /// Initial X and Y rotation, in multiples of PI.
    turns: f32,
}

impl RingSpec {
    const fn new(radius: f32, tube: f32, tubular_segments: u32, turns: f32) -> Self {
        Self {
            radius,
            tube,
            radial_segments: 16,
            tubular_segments,
            turns,
        }
    }
}

const RINGS: [RingSpec; 5] = [
    RingSpec::new(3.0, 0.05, 64, 0.75),
    RingSpec::new(1.0, 0.025, 50, 0.0),
    RingSpec::new(1.5, 0.075, 50, 0.75),
    RingSpec::new(2.2, 0.12, 50, 0.25),
    RingSpec::new(4.0, 0.1, 32, 0.25),
];

pub const CAMERA_FOV_DEGREES: f32 = 35.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;
pub const CAMERA_DISTANCE: f32 = 6.0;

/// Assembles the torus field: lights, environment map, materials, five
/// rings, the knot, and the camera rig.
pub struct SceneBuilder<'a> {
    config: &'a SceneConfig,
    asset_root: &'a Path,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(config: &'a SceneConfig, asset_root: &'a Path) -> Self {
        Self { config, asset_root }
    }

    /// Build the scene. Texture requests go to `loader` and are not awaited;
    /// the initial speed is drawn from `rng`.
    pub fn build(
        &self,
        viewport: Viewport,
        loader: &mut dyn TextureLoader,
        rng: &mut impl Rng,
    ) -> Result<Scene, SceneError> {
        let config = self.config;
        let mut graph = SceneGraph::new();
        let mut materials = MaterialLibrary::new();

        // Lights
        let ambient_light = graph.add(Node::new(
            "ambient_light",
            NodeKind::AmbientLight {
                color: Color::WHITE,
                intensity: 0.5,
            },
        ));
        let point_light = graph.add(
            Node::new(
                "point_light",
                NodeKind::PointLight {
                    color: Color::WHITE,
                    intensity: 0.5,
                },
            )
            .with_transform(Transform::from_position(Vec3::new(2.0, 3.0, 4.0))),
        );

        // Textures
        let textures = &config.textures;
        let normal_map =
            loader.load_texture(self.asset_root.join(&textures.normal_map), ColorSpace::Linear);
        let color_map = textures
            .color_map
            .as_ref()
            .map(|p| loader.load_texture(self.asset_root.join(p), ColorSpace::Srgb));
        let environment = loader.load_cube(CubeFaces(
            textures.environment.0.clone().map(|p| self.asset_root.join(p)),
        ));
        graph.set_background(environment);

        // Materials
        let knot_material = materials.insert(StandardMaterial {
            color: config.knot_color,
            metalness: config.knot_metalness,
            roughness: config.knot_roughness,
            map: color_map,
            normal_map: Some(normal_map),
            normal_scale: Vec2::splat(config.normal_scale),
            env_map: Some(environment),
            ..StandardMaterial::new("knot")
        });
        let rings_material = materials.insert(StandardMaterial {
            color: config.rings_color,
            metalness: config.rings_metalness,
            roughness: config.rings_roughness,
            env_map: Some(environment),
            ..StandardMaterial::new("rings")
        });

        // Meshes
        let rings: [_; 5] = std::array::from_fn(|i| {
            let spec = &RINGS[i];
            let angle = PI * spec.turns;
            graph.add(
                Node::mesh(
                    format!("torus_{}", i + 1),
                    Geometry::torus(
                        spec.radius,
                        spec.tube,
                        spec.radial_segments,
                        spec.tubular_segments,
                    ),
                    rings_material,
                )
                .with_transform(Transform::from_rotation(angle, angle, 0.0)),
            )
        });
        let knot = graph.add(Node::mesh(
            "torus_knot",
            Geometry::torus_knot(0.5, 0.2, 122, 32),
            knot_material,
        ));

        // Camera
        let camera_group = graph.add(Node::group("camera_group"));
        let camera = graph.add_child(
            camera_group,
            Node::new(
                "camera",
                NodeKind::Camera(PerspectiveCamera::new(
                    CAMERA_FOV_DEGREES,
                    viewport.aspect(),
                    CAMERA_NEAR,
                    CAMERA_FAR,
                )),
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, CAMERA_DISTANCE))),
        )?;

        let speed = AnimationSpeed::random(rng);

        tracing::info!(
            nodes = graph.node_count(),
            materials = materials.len(),
            speed = speed.get(),
            "scene built"
        );

        Ok(Scene {
            graph,
            materials,
            speed,
            viewport,
            handles: SceneHandles {
                rings_material,
                knot_material,
                rings,
                knot,
                camera_group,
                camera,
                ambient_light,
                point_light,
            },
        })
    }
}
