use std::f64::consts::{PI, TAU};
use torusfield_scene::{Scene, SceneError};

/// Radians per second the knot turns on X and Y, independent of speed.
pub const KNOT_RATE: f64 = 0.5;

/// New rotation for one ring. `None` leaves that axis as it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingRotation {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl RingRotation {
    fn both(x: f64, y: f64) -> Self {
        Self {
            x: Some(x as f32),
            y: Some(y as f32),
        }
    }
}

/// Ring rotations at `elapsed` seconds for a given speed factor.
///
/// Every component lies in `[-3π, 2π]`: a sine or cosine scaled by 2π,
/// shifted by at most -3π/4.
pub fn ring_rotations(elapsed: f64, speed: f32) -> [RingRotation; 5] {
    let angle = elapsed * speed as f64;
    let s = angle.sin() * TAU;
    let c = angle.cos() * TAU;
    let quarter = PI * 0.25;
    let three_quarters = PI * 0.75;
    [
        RingRotation::both(s - quarter, s - quarter),
        RingRotation {
            x: None,
            y: Some(s as f32),
        },
        RingRotation::both(s, s),
        RingRotation::both(c - quarter, s - quarter),
        RingRotation::both(c - three_quarters, s - three_quarters),
    ]
}

/// Knot rotation (x, y) at `elapsed` seconds.
pub fn knot_rotation(elapsed: f64) -> (f32, f32) {
    let angle = (elapsed * KNOT_RATE) as f32;
    (angle, angle)
}

/// Write this frame's rotations onto the knot and the rings.
pub fn animate(scene: &mut Scene, elapsed: f64) -> Result<(), SceneError> {
    let (kx, ky) = knot_rotation(elapsed);
    let knot = scene.graph.transform_mut(scene.handles.knot)?;
    knot.rotation.x = kx;
    knot.rotation.y = ky;

    let rotations = ring_rotations(elapsed, scene.speed.get());
    for (id, rotation) in scene.handles.rings.iter().zip(rotations) {
        let transform = scene.graph.transform_mut(*id)?;
        if let Some(x) = rotation.x {
            transform.rotation.x = x;
        }
        if let Some(y) = rotation.y {
            transform.rotation.y = y;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::Path;
    use torusfield_common::NoopLoader;
    use torusfield_scene::{AnimationSpeed, SceneBuilder, SceneConfig, Viewport};

    fn scene() -> Scene {
        SceneBuilder::new(&SceneConfig::default(), Path::new("."))
            .build(
                Viewport::new(800.0, 600.0, 1.0),
                &mut NoopLoader::default(),
                &mut StdRng::seed_from_u64(11),
            )
            .unwrap()
    }

    #[test]
    fn knot_is_half_elapsed_for_any_speed() {
        for t in [0.0, 0.1, 1.0, 7.25, 120.0, 3600.0] {
            let (x, y) = knot_rotation(t);
            assert_eq!(x, (0.5 * t) as f32);
            assert_eq!(y, x);
        }
        let mut a = scene();
        let mut b = scene();
        a.speed = AnimationSpeed::fixed(0.0);
        b.speed = AnimationSpeed::fixed(0.19);
        animate(&mut a, 9.0).unwrap();
        animate(&mut b, 9.0).unwrap();
        let ka = a.graph.get(a.handles.knot).unwrap().transform.rotation;
        let kb = b.graph.get(b.handles.knot).unwrap().transform.rotation;
        assert_eq!(ka, kb);
        assert_eq!(ka.x, 4.5);
    }

    #[test]
    fn ring_rotations_stay_bounded() {
        let low = -TAU - PI;
        let high = TAU;
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..2000 {
            let t = rand::Rng::gen_range(&mut rng, 0.0..10_000.0);
            let s = AnimationSpeed::random(&mut rng).get();
            for r in ring_rotations(t, s) {
                for v in [r.x, r.y].into_iter().flatten() {
                    let v = v as f64;
                    assert!(v >= low - 1e-5 && v <= high + 1e-5, "{v} at t={t} s={s}");
                }
            }
        }
    }

    #[test]
    fn zero_time_gives_phase_offsets() {
        let r = ring_rotations(0.0, 0.1);
        let q = (PI * 0.25) as f32;
        assert_eq!(r[0].y, Some(-q));
        assert_eq!(r[1], RingRotation { x: None, y: Some(0.0) });
        assert_eq!(r[2].x, Some(0.0));
        // cos(0) = 1, so the fourth ring starts a full turn minus an eighth.
        assert!((r[3].x.unwrap() - (TAU - PI * 0.25) as f32).abs() < 1e-6);
        assert!((r[4].y.unwrap() + (PI * 0.75) as f32).abs() < 1e-6);
    }

    #[test]
    fn second_ring_keeps_its_x() {
        let mut s = scene();
        let id = s.handles.rings[1];
        s.graph.transform_mut(id).unwrap().rotation.x = 0.3;
        animate(&mut s, 4.0).unwrap();
        assert_eq!(s.graph.get(id).unwrap().transform.rotation.x, 0.3);
    }

    #[test]
    fn animate_uses_scene_speed() {
        let mut s = scene();
        s.speed = AnimationSpeed::fixed(0.1);
        animate(&mut s, 5.0).unwrap();
        let expected = ((5.0f64 * 0.1f32 as f64).sin() * TAU) as f32;
        let got = s.graph.get(s.handles.rings[2]).unwrap().transform.rotation;
        assert_eq!(got.x, expected);
        assert_eq!(got.y, expected);
    }
}
