use super::ScreenPoint;

/// Pixel size of the render surface for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Maps a plane-local `(x, z)` pair to screen space.
    ///
    /// Fixed scale-and-center transform: a quarter of the viewport per unit,
    /// origin at the viewport center. Not a camera projection.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn project(&self, x: f32, z: f32) -> ScreenPoint {
        let w = self.width as f32;
        let h = self.height as f32;
        ScreenPoint::new(x * w / 4.0 + w / 2.0, z * h / 4.0 + h / 2.0)
    }
}
