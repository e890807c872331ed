use crate::control::{ControlEvent, ControlKind, ControlValue};
use crate::panel::DebugPanel;
use torusfield_common::Color;
use torusfield_scene::Scene;

impl DebugPanel {
    /// Draw one widget per control and dispatch whatever changed this frame.
    ///
    /// Returns the number of events applied. Failed dispatches are logged
    /// and skipped so one bad handler cannot take the panel down.
    pub fn show(&mut self, ui: &mut egui::Ui, scene: &mut Scene) -> usize {
        let mut events = Vec::new();
        for spec in self.controls() {
            let label = spec.label.as_str();
            match (spec.kind, self.parameters().get(&spec.key)) {
                (ControlKind::Color, Some(ControlValue::Color(color))) => {
                    let mut rgb = color.to_srgb8();
                    ui.horizontal(|ui| {
                        if ui.color_edit_button_srgb(&mut rgb).changed() {
                            events.push(ControlEvent::color(&spec.key, Color::from_srgb8(rgb)));
                        }
                        ui.label(label);
                    });
                }
                (ControlKind::Slider { min, max, step }, Some(ControlValue::Number(value))) => {
                    let mut value = *value;
                    let slider = egui::Slider::new(&mut value, min..=max)
                        .step_by(step as f64)
                        .text(label);
                    if ui.add(slider).changed() {
                        events.push(ControlEvent::number(&spec.key, value));
                    }
                }
                (ControlKind::Button, _) => {
                    if ui.button(label).clicked() {
                        events.push(ControlEvent::trigger(&spec.key));
                    }
                }
                (kind, value) => {
                    tracing::warn!(
                        key = %spec.key,
                        kind = kind.kind_name(),
                        value = value.map_or("missing", ControlValue::kind_name),
                        "control has no value to draw"
                    );
                }
            }
        }

        let mut applied = 0;
        for event in events {
            let key = event.key.clone();
            match self.dispatch(scene, event) {
                Ok(()) => applied += 1,
                Err(err) => tracing::warn!(%key, error = %err, "control update rejected"),
            }
        }
        applied
    }
}
