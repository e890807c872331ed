use rand::Rng;

/// Angular speed factor of the ring animation.
///
/// Always in `[0, MAX)`. Re-rolled from the panel; the RNG is injected so
/// tests and seeded runs are reproducible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpeed(f32);

impl AnimationSpeed {
    pub const MAX: f32 = 0.2;

    pub fn random(rng: &mut impl Rng) -> Self {
        Self(rng.gen_range(0.0..Self::MAX))
    }

    /// Fixed speed, clamped into range.
    pub fn fixed(value: f32) -> Self {
        Self(value.clamp(0.0, Self::MAX - f32::EPSILON))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn reset(&mut self, rng: &mut impl Rng) {
        *self = Self::random(rng);
        tracing::debug!(speed = self.0, "animation speed reset");
    }
}
