use crate::error::SceneError;
use crate::graph::SceneGraph;
use crate::material::{MaterialId, MaterialLibrary};
use crate::speed::AnimationSpeed;
use torusfield_common::NodeId;

/// Window size in logical pixels plus the pixel ratio used for the
/// drawing buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    /// Device ratios above this are rendered at this ratio.
    pub const MAX_PIXEL_RATIO: f32 = 2.0;

    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: device_pixel_ratio.clamp(f32::MIN_POSITIVE, Self::MAX_PIXEL_RATIO),
        }
    }

    /// Width over height. Heights under one pixel count as one, so a
    /// collapsed window still yields a finite projection.
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Drawing buffer size in physical pixels, never zero.
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            ((self.width * self.pixel_ratio).round() as u32).max(1),
            ((self.height * self.pixel_ratio).round() as u32).max(1),
        )
    }
}

/// Well-known nodes and materials, so the frame loop and the panel never
/// search the graph by name.
#[derive(Debug, Clone)]
pub struct SceneHandles {
    pub rings_material: MaterialId,
    pub knot_material: MaterialId,
    /// The five rings, in build order.
    pub rings: [NodeId; 5],
    pub knot: NodeId,
    pub camera_group: NodeId,
    pub camera: NodeId,
    pub ambient_light: NodeId,
    pub point_light: NodeId,
}

/// The whole mutable state of the running scene.
///
/// Built once by [`crate::SceneBuilder`], then passed by `&mut` to the
/// panel handlers, the frame loop and input handling in turn.
#[derive(Debug, Clone)]
pub struct Scene {
    pub graph: SceneGraph,
    pub materials: MaterialLibrary,
    pub speed: AnimationSpeed,
    pub viewport: Viewport,
    pub handles: SceneHandles,
}

impl Scene {
    /// Apply a window resize to the viewport and the camera aspect.
    pub fn resize(
        &mut self,
        width: f32,
        height: f32,
        device_pixel_ratio: f32,
    ) -> Result<(), SceneError> {
        self.viewport = Viewport::new(width, height, device_pixel_ratio);
        self.graph
            .camera_mut(self.handles.camera)?
            .set_viewport(&self.viewport);
        tracing::debug!(width, height, device_pixel_ratio, "viewport resized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        let v = Viewport::new(800.0, 600.0, 3.0);
        assert_eq!(v.pixel_ratio, 2.0);
        assert_eq!(v.buffer_size(), (1600, 1200));
    }

    #[test]
    fn buffer_never_zero() {
        let v = Viewport::new(0.0, 0.0, 1.0);
        assert_eq!(v.buffer_size(), (1, 1));
    }

    #[test]
    fn fractional_ratio_rounds() {
        let v = Viewport::new(1001.0, 500.0, 1.5);
        assert_eq!(v.buffer_size(), (1502, 750));
    }
}
