use std::collections::BTreeMap;
use torusfield_common::Color;

/// Current value of a control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Color(Color),
    Number(f32),
    /// Buttons carry no value.
    Trigger,
}

impl ControlValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Number(_) => "number",
            Self::Trigger => "trigger",
        }
    }
}

/// Widget kind plus its declared constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Color,
    Slider { min: f32, max: f32, step: f32 },
    Button,
}

impl ControlKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Slider { .. } => "number",
            Self::Button => "trigger",
        }
    }

    /// Bring a value inside the declared constraints.
    ///
    /// Sliders snap to their step and clamp to their range; everything else
    /// passes through. Returns `None` when the value kind does not fit.
    pub fn normalize(&self, value: ControlValue) -> Option<ControlValue> {
        match (self, value) {
            (Self::Color, ControlValue::Color(_)) | (Self::Button, ControlValue::Trigger) => {
                Some(value)
            }
            (Self::Slider { min, max, step }, ControlValue::Number(v)) => {
                let snapped = if *step > 0.0 {
                    min + ((v - min) / step).round() * step
                } else {
                    v
                };
                Some(ControlValue::Number(snapped.clamp(*min, *max)))
            }
            _ => None,
        }
    }
}

/// Declaration of one control.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec {
    /// Parameter key, unique within a panel.
    pub key: String,
    /// Text shown next to the widget.
    pub label: String,
    pub kind: ControlKind,
}

/// A widget change: which control, and its new value.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEvent {
    pub key: String,
    pub value: ControlValue,
}

impl ControlEvent {
    pub fn new(key: impl Into<String>, value: ControlValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn color(key: impl Into<String>, color: Color) -> Self {
        Self::new(key, ControlValue::Color(color))
    }

    pub fn number(key: impl Into<String>, value: f32) -> Self {
        Self::new(key, ControlValue::Number(value))
    }

    pub fn trigger(key: impl Into<String>) -> Self {
        Self::new(key, ControlValue::Trigger)
    }
}

/// Flat map of control key to current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(BTreeMap<String, ControlValue>);

impl Parameters {
    pub fn get(&self, key: &str) -> Option<&ControlValue> {
        self.0.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f32> {
        match self.0.get(key) {
            Some(ControlValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn color(&self, key: &str) -> Option<Color> {
        match self.0.get(key) {
            Some(ControlValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    pub(crate) fn set(&mut self, key: &str, value: ControlValue) {
        self.0.insert(key.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ControlValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: ControlKind = ControlKind::Slider {
        min: 0.0,
        max: 1.0,
        step: 0.25,
    };

    #[test]
    fn slider_clamps_and_snaps() {
        assert_eq!(UNIT.normalize(ControlValue::Number(2.0)), Some(ControlValue::Number(1.0)));
        assert_eq!(UNIT.normalize(ControlValue::Number(-0.3)), Some(ControlValue::Number(0.0)));
        assert_eq!(UNIT.normalize(ControlValue::Number(0.3)), Some(ControlValue::Number(0.25)));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        assert_eq!(UNIT.normalize(ControlValue::Trigger), None);
        assert_eq!(ControlKind::Color.normalize(ControlValue::Number(1.0)), None);
        assert_eq!(
            ControlKind::Button.normalize(ControlValue::Trigger),
            Some(ControlValue::Trigger)
        );
    }

    #[test]
    fn parameters_typed_access() {
        let mut p = Parameters::default();
        p.set("normalScale", ControlValue::Number(1.0));
        p.set("material1Color", ControlValue::Color(Color::WHITE));
        assert_eq!(p.number("normalScale"), Some(1.0));
        assert_eq!(p.color("normalScale"), None);
        assert_eq!(p.color("material1Color"), Some(Color::WHITE));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn event_constructors() {
        assert_eq!(ControlEvent::trigger("reset").value, ControlValue::Trigger);
        assert_eq!(ControlEvent::number("n", 0.5).value.kind_name(), "number");
    }
}
