use super::ScreenPoint;

/// Axis-aligned bounding box in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds2 {
    /// Computes the bounding box of a point set, or `None` if it is empty.
    #[must_use]
    pub fn from_points(points: &[ScreenPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for p in rest {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    /// Center of the box.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn center(&self) -> ScreenPoint {
        ScreenPoint::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Inclusive containment test.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn contains(&self, p: &ScreenPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}
