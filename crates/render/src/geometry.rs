use glam::{Vec2, Vec3};
use std::f32::consts::TAU;
use torusfield_scene::Geometry;

/// Indexed triangle mesh with per-vertex shading attributes.
///
/// Attribute arrays are parallel; `tangents` carry handedness in `w`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub tangents: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let mut mesh = match *geometry {
            Geometry::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
                arc,
            } => torus(radius, tube, radial_segments, tubular_segments, arc),
            Geometry::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
                p,
                q,
            } => torus_knot(radius, tube, tubular_segments, radial_segments, p, q),
        };
        mesh.compute_tangents();
        tracing::trace!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "mesh generated"
        );
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) {
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv.to_array());
    }

    /// Push the two triangles of the quad `a b c d`.
    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    /// Per-vertex tangents from UV gradients, accumulated over triangles and
    /// orthogonalised against the normal.
    pub fn compute_tangents(&mut self) {
        let n = self.positions.len();
        let mut tan = vec![Vec3::ZERO; n];
        let mut bitan = vec![Vec3::ZERO; n];

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vec3::from(self.positions[i0]);
            let e1 = Vec3::from(self.positions[i1]) - p0;
            let e2 = Vec3::from(self.positions[i2]) - p0;
            let uv0 = Vec2::from(self.uvs[i0]);
            let d1 = Vec2::from(self.uvs[i1]) - uv0;
            let d2 = Vec2::from(self.uvs[i2]) - uv0;

            let det = d1.x * d2.y - d2.x * d1.y;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let sdir = (e1 * d2.y - e2 * d1.y) * r;
            let tdir = (e2 * d1.x - e1 * d2.x) * r;
            for i in [i0, i1, i2] {
                tan[i] += sdir;
                bitan[i] += tdir;
            }
        }

        self.tangents = (0..n)
            .map(|i| {
                let normal = Vec3::from(self.normals[i]);
                let t = tan[i] - normal * normal.dot(tan[i]);
                let t = t.try_normalize().unwrap_or_else(|| normal.any_orthonormal_vector());
                let w = if normal.cross(t).dot(bitan[i]) < 0.0 {
                    -1.0
                } else {
                    1.0
                };
                [t.x, t.y, t.z, w]
            })
            .collect();
    }
}

fn torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
    arc: f32,
) -> MeshData {
    let mut mesh = MeshData::default();

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * arc;
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = (position - center).normalize_or_zero();
            let uv = Vec2::new(
                i as f32 / tubular_segments as f32,
                j as f32 / radial_segments as f32,
            );
            mesh.push_vertex(position, normal, uv);
        }
    }

    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            mesh.push_quad(
                row * j + i - 1,
                row * (j - 1) + i - 1,
                row * (j - 1) + i,
                row * j + i,
            );
        }
    }
    mesh
}

fn knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let qu = q / p * u;
    let cs = qu.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * qu.sin() * 0.5,
    )
}

fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> MeshData {
    let mut mesh = MeshData::default();
    let (pf, qf) = (p as f32, q as f32);

    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * pf * TAU;
        let p1 = knot_curve(u, pf, qf, radius);
        let p2 = knot_curve(u + 0.01, pf, qf, radius);

        // Frame along the curve: T forward, N toward the outside, B binormal.
        let t = p2 - p1;
        let b = t.cross(p2 + p1).normalize_or_zero();
        let n = b.cross(t).normalize_or_zero();

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let position = p1 + n * cx + b * cy;
            let normal = (position - p1).normalize_or_zero();
            let uv = Vec2::new(
                i as f32 / tubular_segments as f32,
                j as f32 / radial_segments as f32,
            );
            mesh.push_vertex(position, normal, uv);
        }
    }

    let row = radial_segments + 1;
    for j in 1..=tubular_segments {
        for i in 1..=radial_segments {
            mesh.push_quad(
                row * (j - 1) + i - 1,
                row * j + i - 1,
                row * j + i,
                row * (j - 1) + i,
            );
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> MeshData {
        MeshData::from_geometry(&Geometry::torus(3.0, 0.05, 16, 64))
    }

    fn knot() -> MeshData {
        MeshData::from_geometry(&Geometry::torus_knot(0.5, 0.2, 122, 32))
    }

    #[test]
    fn torus_counts() {
        let m = ring();
        assert_eq!(m.vertex_count(), 17 * 65);
        assert_eq!(m.triangle_count(), 16 * 64 * 2);
        assert_eq!(m.normals.len(), m.vertex_count());
        assert_eq!(m.tangents.len(), m.vertex_count());
    }

    #[test]
    fn torus_knot_counts() {
        let m = knot();
        assert_eq!(m.vertex_count(), 123 * 33);
        assert_eq!(m.triangle_count(), 122 * 32 * 2);
    }

    #[test]
    fn torus_surface_is_tube_away_from_ring() {
        let m = ring();
        for p in &m.positions {
            let p = Vec3::from(*p);
            let ring_point = Vec3::new(p.x, p.y, 0.0).normalize() * 3.0;
            assert!(((p - ring_point).length() - 0.05).abs() < 1e-4);
        }
    }

    #[test]
    fn torus_lies_around_z_axis() {
        let m = ring();
        let max_z = m.positions.iter().map(|p| p[2].abs()).fold(0.0, f32::max);
        assert!(max_z <= 0.05 + 1e-6);
    }

    #[test]
    fn normals_and_tangents_are_unit_and_orthogonal() {
        for m in [ring(), knot()] {
            for (n, t) in m.normals.iter().zip(&m.tangents) {
                let n = Vec3::from(*n);
                let tv = Vec3::new(t[0], t[1], t[2]);
                assert!((n.length() - 1.0).abs() < 1e-4);
                assert!((tv.length() - 1.0).abs() < 1e-4);
                assert!(n.dot(tv).abs() < 1e-3);
                assert!(t[3] == 1.0 || t[3] == -1.0);
            }
        }
    }

    #[test]
    fn knot_stays_within_bounds() {
        // Curve radius peaks at radius * 1.5, plus the tube.
        let m = knot();
        for p in &m.positions {
            assert!(Vec3::from(*p).length() <= 0.5 * 1.5 + 0.2 + 1e-3);
        }
    }

    #[test]
    fn indices_in_range() {
        for m in [ring(), knot()] {
            let n = m.vertex_count() as u32;
            assert!(m.indices.iter().all(|&i| i < n));
        }
    }
}
