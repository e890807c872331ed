use crate::control::{ControlEvent, ControlKind, ControlSpec, ControlValue, Parameters};
use torusfield_common::Color;
use torusfield_scene::{Scene, SceneError};

/// Errors raised while routing a control event.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("no control bound to key `{0}`")]
    UnknownControl(String),
    #[error("control `{key}` expects a {expected} value, got {got}")]
    KindMismatch {
        key: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("control `{key}` is already bound")]
    DuplicateKey { key: String },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

type Handler = Box<dyn FnMut(&mut Scene, ControlValue) -> Result<(), SceneError>>;

struct Binding {
    spec: ControlSpec,
    handler: Handler,
}

/// A set of controls, their current values, and one handler per control.
///
/// The panel never holds the scene. Handlers receive it on every dispatch.
#[derive(Default)]
pub struct DebugPanel {
    parameters: Parameters,
    bindings: Vec<Binding>,
}

impl std::fmt::Debug for DebugPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugPanel")
            .field("parameters", &self.parameters)
            .field("controls", &self.bindings.len())
            .finish()
    }
}

impl DebugPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Declared controls in registration order.
    pub fn controls(&self) -> impl Iterator<Item = &ControlSpec> {
        self.bindings.iter().map(|b| &b.spec)
    }

    pub fn bind_color<F>(
        &mut self,
        key: &str,
        label: &str,
        initial: Color,
        mut handler: F,
    ) -> Result<(), ControlError>
    where
        F: FnMut(&mut Scene, Color) -> Result<(), SceneError> + 'static,
    {
        self.bind(
            ControlSpec {
                key: key.to_string(),
                label: label.to_string(),
                kind: ControlKind::Color,
            },
            ControlValue::Color(initial),
            Box::new(move |scene, value| match value {
                ControlValue::Color(c) => handler(scene, c),
                _ => Ok(()),
            }),
        )
    }

    /// Bind a slider over `[min, max]` moving in increments of `step`.
    #[allow(clippy::too_many_arguments)]
    pub fn bind_slider<F>(
        &mut self,
        key: &str,
        label: &str,
        initial: f32,
        min: f32,
        max: f32,
        step: f32,
        mut handler: F,
    ) -> Result<(), ControlError>
    where
        F: FnMut(&mut Scene, f32) -> Result<(), SceneError> + 'static,
    {
        let kind = ControlKind::Slider { min, max, step };
        let initial = kind
            .normalize(ControlValue::Number(initial))
            .unwrap_or(ControlValue::Number(min));
        self.bind(
            ControlSpec {
                key: key.to_string(),
                label: label.to_string(),
                kind,
            },
            initial,
            Box::new(move |scene, value| match value {
                ControlValue::Number(v) => handler(scene, v),
                _ => Ok(()),
            }),
        )
    }

    pub fn bind_button<F>(
        &mut self,
        key: &str,
        label: &str,
        mut handler: F,
    ) -> Result<(), ControlError>
    where
        F: FnMut(&mut Scene) -> Result<(), SceneError> + 'static,
    {
        self.bind(
            ControlSpec {
                key: key.to_string(),
                label: label.to_string(),
                kind: ControlKind::Button,
            },
            ControlValue::Trigger,
            Box::new(move |scene, _| handler(scene)),
        )
    }

    fn bind(
        &mut self,
        spec: ControlSpec,
        initial: ControlValue,
        handler: Handler,
    ) -> Result<(), ControlError> {
        if self.bindings.iter().any(|b| b.spec.key == spec.key) {
            return Err(ControlError::DuplicateKey { key: spec.key });
        }
        self.parameters.set(&spec.key, initial);
        self.bindings.push(Binding { spec, handler });
        Ok(())
    }

    /// Route one event to its handler.
    ///
    /// The stored parameter is only updated when the handler succeeds.
    pub fn dispatch(&mut self, scene: &mut Scene, event: ControlEvent) -> Result<(), ControlError> {
        let binding = self
            .bindings
            .iter_mut()
            .find(|b| b.spec.key == event.key)
            .ok_or_else(|| ControlError::UnknownControl(event.key.clone()))?;

        let value = binding
            .spec
            .kind
            .normalize(event.value)
            .ok_or_else(|| ControlError::KindMismatch {
                key: event.key.clone(),
                expected: binding.spec.kind.kind_name(),
                got: event.value.kind_name(),
            })?;

        (binding.handler)(scene, value)?;
        self.parameters.set(&event.key, value);
        tracing::debug!(key = %event.key, ?value, "control changed");
        Ok(())
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
                Viewport::new(640.0, 480.0, 1.0),
                &mut NoopLoader::default(),
                &mut StdRng::seed_from_u64(5),
            )
            .unwrap()
    }

    #[test]
    fn slider_handler_sees_clamped_value() {
        let mut s = scene();
        let mut panel = DebugPanel::new();
        panel
            .bind_slider("roughness", "roughness", 0.5, 0.0, 1.0, 0.5, |scene, v| {
                let id = scene.handles.rings_material;
                scene.materials.get_mut(id)?.roughness = v;
                Ok(())
            })
            .unwrap();

        panel.dispatch(&mut s, ControlEvent::number("roughness", 7.0)).unwrap();
        assert_eq!(s.materials.get(s.handles.rings_material).unwrap().roughness, 1.0);
        assert_eq!(panel.parameters().number("roughness"), Some(1.0));
    }

    #[test]
    fn unknown_key_is_an_error() {
        let mut s = scene();
        let mut panel = DebugPanel::new();
        let err = panel.dispatch(&mut s, ControlEvent::trigger("nope")).unwrap_err();
        assert!(matches!(err, ControlError::UnknownControl(k) if k == "nope"));
    }

    #[test]
    fn wrong_value_kind_is_rejected() {
        let mut s = scene();
        let mut panel = DebugPanel::new();
        panel.bind_button("go", "go", |_| Ok(())).unwrap();
        let err = panel.dispatch(&mut s, ControlEvent::number("go", 1.0)).unwrap_err();
        assert!(matches!(
            err,
            ControlError::KindMismatch {
                expected: "trigger",
                got: "number",
                ..
            }
        ));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut panel = DebugPanel::new();
        panel.bind_button("go", "go", |_| Ok(())).unwrap();
        assert!(matches!(
            panel.bind_button("go", "again", |_| Ok(())),
            Err(ControlError::DuplicateKey { .. })
        ));
        assert_eq!(panel.controls().count(), 1);
    }

    #[test]
    fn failed_handler_keeps_old_value() {
        let mut s = scene();
        let mut panel = DebugPanel::new();
        let missing = torusfield_scene::MaterialId(42);
        panel
            .bind_color("c", "c", Color::WHITE, move |scene, color| {
                scene.materials.get_mut(missing)?.color = color;
                Ok(())
            })
            .unwrap();
        let red = Color::new(1.0, 0.0, 0.0);
        assert!(matches!(
            panel.dispatch(&mut s, ControlEvent::color("c", red)),
            Err(ControlError::Scene(_))
        ));
        assert_eq!(panel.parameters().color("c"), Some(Color::WHITE));
    }
}
