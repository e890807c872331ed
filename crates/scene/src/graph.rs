use crate::camera::PerspectiveCamera;
use crate::error::SceneError;
use crate::material::MaterialId;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::TAU;
use torusfield_common::{Color, NodeId, TextureHandle, Transform};

/// Parametric shape of a mesh node. Vertex data is generated by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Ring in the XY plane, facing +Z.
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
        arc: f32,
    },
    /// (p, q) torus knot.
    TorusKnot {
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    },
}

impl Geometry {
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
            arc: TAU,
        }
    }

    pub fn torus_knot(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32) -> Self {
        Self::TorusKnot {
            radius,
            tube,
            tubular_segments,
            radial_segments,
            p: 2,
            q: 3,
        }
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: Geometry,
        material: MaterialId,
    },
    AmbientLight {
        color: Color,
        intensity: f32,
    },
    PointLight {
        color: Color,
        intensity: f32,
    },
    Camera(PerspectiveCamera),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Mesh { .. } => "mesh",
            Self::AmbientLight { .. } => "ambient_light",
            Self::PointLight { .. } => "point_light",
            Self::Camera(_) => "camera",
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, Self::AmbientLight { .. } | Self::PointLight { .. })
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: MaterialId) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Hierarchical collection of nodes.
///
/// Uses BTreeMap so iteration order is stable between runs of the same
/// build; `roots` keeps insertion order for display.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    background: Option<TextureHandle>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn background(&self) -> Option<TextureHandle> {
        self.background
    }

    pub fn set_background(&mut self, texture: TextureHandle) {
        self.background = Some(texture);
    }

    /// Insert a node at the root level.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId::new();
        node.parent = None;
        self.nodes.insert(id, node);
        self.roots.push(id);
        id
    }

    /// Insert a node under `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        let id = NodeId::new();
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::NodeNotFound(parent))?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform, SceneError> {
        self.nodes
            .get_mut(&id)
            .map(|n| &mut n.transform)
            .ok_or(SceneError::NodeNotFound(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
    }

    /// Local-to-world matrix, composed through every ancestor.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self
                .nodes
                .get(&current)
                .ok_or(SceneError::NodeNotFound(current))?;
            matrix = node.transform.matrix() * matrix;
            cursor = node.parent;
        }
        Ok(matrix)
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.transform_point3(Vec3::ZERO))
    }

    /// Mesh nodes with their geometry and material.
    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &Node, Geometry, MaterialId)> {
        self.nodes.iter().filter_map(|(id, node)| match node.kind {
            NodeKind::Mesh { geometry, material } => Some((*id, node, geometry, material)),
            _ => None,
        })
    }

    pub fn lights(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.kind.is_light())
            .map(|(id, n)| (*id, n))
    }

    pub fn camera(&self, id: NodeId) -> Result<&PerspectiveCamera, SceneError> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Camera(camera)) => Ok(camera),
            Some(_) => Err(SceneError::NotACamera(id)),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Result<&mut PerspectiveCamera, SceneError> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Camera(camera)) => Ok(camera),
            Some(_) => Err(SceneError::NotACamera(id)),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    /// World-space eye position and view matrix of a camera node.
    pub fn camera_view(&self, id: NodeId) -> Result<(Vec3, Mat4), SceneError> {
        let camera = self.camera(id)?;
        let eye = self.world_position(id)?;
        Ok((eye, camera.view_matrix(eye)))
    }

    pub fn view_projection(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let (_, view) = self.camera_view(id)?;
        Ok(self.camera(id)?.projection_matrix() * view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_starts_empty() {
        let g = SceneGraph::new();
        assert_eq!(g.node_count(), 0);
        assert!(g.background().is_none());
    }

    #[test]
    fn add_child_links_both_ways() {
        let mut g = SceneGraph::new();
        let group = g.add(Node::group("rig"));
        let child = g.add_child(group, Node::group("child")).unwrap();

        assert_eq!(g.get(child).unwrap().parent(), Some(group));
        assert_eq!(g.get(group).unwrap().children(), &[child]);
        assert_eq!(g.roots(), &[group]);
    }

    #[test]
    fn add_child_to_missing_parent_fails() {
        let mut g = SceneGraph::new();
        let err = g.add_child(NodeId::new(), Node::group("orphan"));
        assert!(matches!(err, Err(SceneError::NodeNotFound(_))));
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut g = SceneGraph::new();
        let parent = g.add(
            Node::group("parent")
                .with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
        );
        let child = g
            .add_child(
                parent,
                Node::group("child")
                    .with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))),
            )
            .unwrap();
        assert_eq!(g.world_position(child).unwrap(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn meshes_and_lights_are_filtered() {
        let mut g = SceneGraph::new();
        g.add(Node::mesh("ring", Geometry::torus(1.0, 0.1, 8, 16), MaterialId(0)));
        g.add(Node::new(
            "ambient",
            NodeKind::AmbientLight {
                color: Color::WHITE,
                intensity: 0.5,
            },
        ));
        g.add(Node::group("empty"));
        assert_eq!(g.meshes().count(), 1);
        assert_eq!(g.lights().count(), 1);
    }

    #[test]
    fn camera_lookup_checks_kind() {
        let mut g = SceneGraph::new();
        let group = g.add(Node::group("not a camera"));
        assert!(matches!(g.camera(group), Err(SceneError::NotACamera(_))));

        let cam = g.add(
            Node::new("camera", NodeKind::Camera(PerspectiveCamera::new(35.0, 1.0, 0.1, 100.0)))
                .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, 6.0))),
        );
        let (eye, view) = g.camera_view(cam).unwrap();
        assert_eq!(eye, Vec3::new(0.0, 0.0, 6.0));
        // Origin sits 6 units in front of the camera.
        let origin = view.transform_point3(Vec3::ZERO);
        assert!((origin.z + 6.0).abs() < 1e-5);
    }

    #[test]
    fn find_by_name() {
        let mut g = SceneGraph::new();
        let id = g.add(Node::group("camera_group"));
        assert_eq!(g.find_by_name("camera_group"), Some(id));
        assert_eq!(g.find_by_name("missing"), None);
    }
}
