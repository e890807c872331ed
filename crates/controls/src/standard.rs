use crate::panel::{ControlError, DebugPanel};
use glam::Vec2;
use rand::rngs::StdRng;
use torusfield_scene::Scene;

/// Control keys of the standard panel.
pub mod keys {
    pub const RINGS_COLOR: &str = "material1Color";
    pub const KNOT_COLOR: &str = "material2Color";
    pub const RINGS_METALNESS: &str = "ringsMetalness";
    pub const RINGS_ROUGHNESS: &str = "ringsRoughness";
    pub const KNOT_METALNESS: &str = "TorusKnotMetalness";
    pub const KNOT_ROUGHNESS: &str = "TorusKnotRoughness";
    pub const NORMAL_SCALE: &str = "normalScale";
    pub const RESET_SPEED: &str = "resetRandomSpeed";
}

const UNIT_STEP: f32 = 0.0001;
const NORMAL_SCALE_MAX: f32 = 2.0;
const NORMAL_SCALE_STEP: f32 = 0.001;

impl DebugPanel {
    /// The scene's panel: two colors, metalness and roughness per material,
    /// the knot's normal scale, and a button that re-rolls the ring speed.
    ///
    /// Initial values are read from the scene. `rng` is owned by the reset
    /// button.
    pub fn standard(scene: &Scene, mut rng: StdRng) -> Result<Self, ControlError> {
        let rings_id = scene.handles.rings_material;
        let knot_id = scene.handles.knot_material;
        let rings = scene.materials.get(rings_id)?;
        let knot = scene.materials.get(knot_id)?;

        let mut panel = DebugPanel::new();
        panel.bind_color(keys::RINGS_COLOR, "ringsColor", rings.color, move |scene, color| {
            scene.materials.get_mut(rings_id)?.color = color;
            Ok(())
        })?;
        panel.bind_color(keys::KNOT_COLOR, "torusColor", knot.color, move |scene, color| {
            scene.materials.get_mut(knot_id)?.color = color;
            Ok(())
        })?;
        panel.bind_slider(
            keys::RINGS_METALNESS,
            "ringsMetalness",
            rings.metalness,
            0.0,
            1.0,
            UNIT_STEP,
            move |scene, v| {
                scene.materials.get_mut(rings_id)?.metalness = v;
                Ok(())
            },
        )?;
        panel.bind_slider(
            keys::RINGS_ROUGHNESS,
            "ringsRoughness",
            rings.roughness,
            0.0,
            1.0,
            UNIT_STEP,
            move |scene, v| {
                scene.materials.get_mut(rings_id)?.roughness = v;
                Ok(())
            },
        )?;
        panel.bind_slider(
            keys::KNOT_METALNESS,
            "TorusKnotMetalness",
            knot.metalness,
            0.0,
            1.0,
            UNIT_STEP,
            move |scene, v| {
                scene.materials.get_mut(knot_id)?.metalness = v;
                Ok(())
            },
        )?;
        panel.bind_slider(
            keys::KNOT_ROUGHNESS,
            "TorusKnotRoughness",
            knot.roughness,
            0.0,
            1.0,
            UNIT_STEP,
            move |scene, v| {
                scene.materials.get_mut(knot_id)?.roughness = v;
                Ok(())
            },
        )?;
        panel.bind_slider(
            keys::NORMAL_SCALE,
            "normalScale",
            knot.normal_scale.x,
            0.0,
            NORMAL_SCALE_MAX,
            NORMAL_SCALE_STEP,
            move |scene, v| {
                scene.materials.get_mut(knot_id)?.normal_scale = Vec2::splat(v);
                Ok(())
            },
        )?;
        panel.bind_button(keys::RESET_SPEED, "resetRandomSpeed", move |scene| {
            scene.speed.reset(&mut rng);
            Ok(())
        })?;
        Ok(panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlEvent, ControlKind};
    use rand::SeedableRng;
    use std::path::Path;
    use torusfield_common::{Color, NoopLoader};
    use torusfield_scene::{AnimationSpeed, SceneBuilder, SceneConfig, Viewport};

    fn scene() -> Scene {
        SceneBuilder::new(&SceneConfig::default(), Path::new("."))
            .build(
                Viewport::new(1280.0, 720.0, 1.0),
                &mut NoopLoader::default(),
                &mut StdRng::seed_from_u64(1),
            )
            .unwrap()
    }

    fn panel(scene: &Scene) -> DebugPanel {
        DebugPanel::standard(scene, StdRng::seed_from_u64(2)).unwrap()
    }

    #[test]
    fn starts_from_scene_values() {
        let s = scene();
        let p = panel(&s);
        let params = p.parameters();
        assert_eq!(params.color(keys::RINGS_COLOR), Some(Color::from_hex("#dedede").unwrap()));
        assert_eq!(params.color(keys::KNOT_COLOR), Some(Color::from_hex("#b0bdbf").unwrap()));
        assert_eq!(params.number(keys::RINGS_METALNESS), Some(1.0));
        assert_eq!(params.number(keys::NORMAL_SCALE), Some(1.0));
        assert!((params.number(keys::KNOT_METALNESS).unwrap() - 0.25).abs() < 1e-6);
        assert_eq!(p.controls().count(), 8);
    }

    #[test]
    fn ranges_match_widgets() {
        let s = scene();
        let p = panel(&s);
        let normal = p.controls().find(|c| c.key == keys::NORMAL_SCALE).unwrap();
        assert_eq!(
            normal.kind,
            ControlKind::Slider {
                min: 0.0,
                max: 2.0,
                step: 0.001
            }
        );
        let reset = p.controls().find(|c| c.key == keys::RESET_SPEED).unwrap();
        assert_eq!(reset.kind, ControlKind::Button);
    }

    #[test]
    fn rings_color_leaves_knot_alone() {
        let mut s = scene();
        let mut p = panel(&s);
        let knot_before = s.materials.get(s.handles.knot_material).unwrap().clone();
        let red = Color::from_hex("#ff0000").unwrap();

        p.dispatch(&mut s, ControlEvent::color(keys::RINGS_COLOR, red)).unwrap();

        assert_eq!(s.materials.get(s.handles.rings_material).unwrap().color, red);
        assert_eq!(s.materials.get(s.handles.knot_material).unwrap(), &knot_before);
    }

    #[test]
    fn knot_color_leaves_rings_alone() {
        let mut s = scene();
        let mut p = panel(&s);
        let rings_before = s.materials.get(s.handles.rings_material).unwrap().clone();
        let green = Color::from_hex("#00ff00").unwrap();

        p.dispatch(&mut s, ControlEvent::color(keys::KNOT_COLOR, green)).unwrap();

        assert_eq!(s.materials.get(s.handles.knot_material).unwrap().color, green);
        assert_eq!(s.materials.get(s.handles.rings_material).unwrap(), &rings_before);
        assert_eq!(p.parameters().color(keys::KNOT_COLOR), Some(green));
    }

    #[test]
    fn knot_sliders_only_touch_knot() {
        let mut s = scene();
        let mut p = panel(&s);
        let rings_before = s.materials.get(s.handles.rings_material).unwrap().clone();

        p.dispatch(&mut s, ControlEvent::number(keys::KNOT_ROUGHNESS, 0.6)).unwrap();
        p.dispatch(&mut s, ControlEvent::number(keys::KNOT_METALNESS, 0.9)).unwrap();

        let knot = s.materials.get(s.handles.knot_material).unwrap();
        assert!((knot.roughness - 0.6).abs() < 1e-4);
        assert!((knot.metalness - 0.9).abs() < 1e-4);
        assert_eq!(s.materials.get(s.handles.rings_material).unwrap(), &rings_before);
    }

    #[test]
    fn normal_scale_is_clamped_on_both_axes() {
        let mut s = scene();
        let mut p = panel(&s);
        p.dispatch(&mut s, ControlEvent::number(keys::NORMAL_SCALE, 5.0)).unwrap();
        let knot = s.materials.get(s.handles.knot_material).unwrap();
        assert_eq!(knot.normal_scale, Vec2::splat(2.0));
    }

    #[test]
    fn reset_rolls_a_new_speed_in_range() {
        let mut s = scene();
        let mut p = panel(&s);
        s.speed = AnimationSpeed::fixed(0.5);
        for _ in 0..50 {
            p.dispatch(&mut s, ControlEvent::trigger(keys::RESET_SPEED)).unwrap();
            let v = s.speed.get();
            assert!((0.0..AnimationSpeed::MAX).contains(&v), "{v}");
        }
    }
}
