//! Debug Panel Binder: controls mapped to scene mutations.
//!
//! Each control has a key, a kind (color, slider, button) and exactly one
//! handler. Widgets produce [`ControlEvent`]s; [`DebugPanel::dispatch`]
//! routes each event to its handler with the scene passed explicitly.
//!
//! # Invariants
//! - Slider values reaching a handler are inside the declared range.
//! - A handler only touches the state it was bound to.

pub mod control;
pub mod panel;
pub mod standard;
pub mod ui;

pub use control::{ControlEvent, ControlKind, ControlSpec, ControlValue, Parameters};
pub use panel::{ControlError, DebugPanel};
pub use standard::keys;

pub fn crate_info() -> &'static str {
    "torusfield-controls v0.1.0"
}
