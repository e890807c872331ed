use torusfield_common::NodeId;
use torusfield_scene::{Geometry, Scene};

/// Scene inspector for developer tooling.
///
/// Read-only queries for the CLI and the debug overlay.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        SceneSummary {
            nodes: scene.graph.node_count(),
            meshes: scene.graph.meshes().count(),
            lights: scene.graph.lights().count(),
            materials: scene.materials.len(),
            speed: scene.speed.get(),
            background: scene.graph.background().is_some(),
        }
    }

    /// Name, kind, and transform of one node.
    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        scene.graph.get(id).map(|node| {
            let p = node.transform.position;
            let r = node.transform.rotation;
            let s = node.transform.scale;
            NodeInfo {
                id,
                name: node.name.clone(),
                kind: node.kind.label(),
                position: [p.x, p.y, p.z],
                rotation: [r.x, r.y, r.z],
                scale: [s.x, s.y, s.z],
                children: node.children().len(),
            }
        })
    }

    /// Every mesh node with its vertex/triangle budget, sorted by name.
    pub fn list_meshes(scene: &Scene) -> Vec<MeshInfo> {
        let mut meshes: Vec<MeshInfo> = scene
            .graph
            .meshes()
            .map(|(id, node, geometry, material)| MeshInfo {
                id,
                name: node.name.clone(),
                shape: match geometry {
                    Geometry::Torus { .. } => "torus",
                    Geometry::TorusKnot { .. } => "torus_knot",
                },
                material: scene
                    .materials
                    .get(material)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                vertices: vertex_count(&geometry),
                triangles: triangle_count(&geometry),
            })
            .collect();
        meshes.sort_by(|a, b| a.name.cmp(&b.name));
        meshes
    }
}

fn grid(geometry: &Geometry) -> (u32, u32) {
    match *geometry {
        Geometry::Torus {
            radial_segments,
            tubular_segments,
            ..
        } => (radial_segments, tubular_segments),
        Geometry::TorusKnot {
            tubular_segments,
            radial_segments,
            ..
        } => (tubular_segments, radial_segments),
    }
}

fn vertex_count(geometry: &Geometry) -> u32 {
    let (a, b) = grid(geometry);
    (a + 1) * (b + 1)
}

fn triangle_count(geometry: &Geometry) -> u32 {
    let (a, b) = grid(geometry);
    a * b * 2
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub lights: usize,
    pub materials: usize,
    pub speed: f32,
    pub background: bool,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} meshes={} lights={} materials={} speed={:.4} background={}",
            self.nodes,
            self.meshes,
            self.lights,
            self.materials,
            self.speed,
            if self.background { "yes" } else { "no" }
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub children: usize,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {} pos=({:.2}, {:.2}, {:.2}) rot=({:.3}, {:.3}, {:.3})",
            self.name,
            self.id.short(),
            self.kind,
            self.position[0],
            self.position[1],
            self.position[2],
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
        )
    }
}

#[derive(Debug, Clone)]
pub struct MeshInfo {
    pub id: NodeId,
    pub name: String,
    pub shape: &'static str,
    pub material: String,
    pub vertices: u32,
    pub triangles: u32,
}

impl std::fmt::Display for MeshInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<11} {:<10} material={:<5} vertices={} triangles={}",
            self.name, self.shape, self.material, self.vertices, self.triangles
        )
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
                Viewport::new(800.0, 600.0, 1.0),
                &mut NoopLoader::default(),
                &mut StdRng::seed_from_u64(21),
            )
            .unwrap()
    }

    #[test]
    fn summary_counts() {
        let s = scene();
        let summary = SceneInspector::summary(&s);
        assert_eq!(summary.meshes, 6);
        assert_eq!(summary.lights, 2);
        assert_eq!(summary.materials, 2);
        assert_eq!(summary.nodes, 6 + 2 + 2);
        assert!(summary.background);
        assert!(summary.speed < 0.2);
    }

    #[test]
    fn inspect_camera() {
        let s = scene();
        let info = SceneInspector::inspect_node(&s, s.handles.camera).unwrap();
        assert_eq!(info.kind, "camera");
        assert_eq!(info.position, [0.0, 0.0, 6.0]);
        let group = SceneInspector::inspect_node(&s, s.handles.camera_group).unwrap();
        assert_eq!(group.children, 1);
    }

    #[test]
    fn inspect_unknown_node() {
        let s = scene();
        assert!(SceneInspector::inspect_node(&s, NodeId::new()).is_none());
    }

    #[test]
    fn mesh_list_is_sorted_with_counts() {
        let s = scene();
        let meshes = SceneInspector::list_meshes(&s);
        let names: Vec<&str> = meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            ["torus_1", "torus_2", "torus_3", "torus_4", "torus_5", "torus_knot"]
        );
        assert_eq!(meshes[0].vertices, 17 * 65);
        assert_eq!(meshes[5].shape, "torus_knot");
        assert_eq!(meshes[5].material, "knot");
        assert_eq!(meshes[5].triangles, 122 * 32 * 2);
    }

    #[test]
    fn summary_display() {
        let s = scene();
        let text = SceneInspector::summary(&s).to_string();
        assert!(text.contains("meshes=6"));
        assert!(text.contains("background=yes"));
    }

    #[test]
    fn node_display_has_rotation() {
        let mut s = scene();
        s.graph.transform_mut(s.handles.knot).unwrap().rotation = glam::Vec3::new(0.5, 0.5, 0.0);
        let info = SceneInspector::inspect_node(&s, s.handles.knot).unwrap();
        assert!(info.to_string().contains("rot=(0.500, 0.500, 0.000)"));
    }
}
