//! Boundary polygon to screen-space dot grid.

use crate::error::{OverlayError, Result};
use crate::math::polygon_2d::point_in_polygon;
use crate::math::{Bounds2, ScreenPoint, Viewport};

/// Parameters controlling the dot grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    /// Grid step in pixels, both axes.
    pub spacing: f32,
    /// Maximum number of dots emitted for one boundary.
    pub max_points: usize,
    /// Maximum number of `(x, z)` pairs read from one boundary.
    pub max_vertices: usize,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            spacing: 30.0,
            max_points: 200,
            max_vertices: 100,
        }
    }
}

/// Samples the interior of a plane boundary as a regular grid of points.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonSampler {
    params: SamplerParams,
}

impl PolygonSampler {
    /// Creates a new sampler.
    #[must_use]
    pub fn new(params: SamplerParams) -> Self {
        Self { params }
    }

    /// Samples `boundary`, returning an empty grid for any invalid input.
    #[must_use]
    pub fn sample(&self, boundary: &[f32], viewport: Viewport) -> Vec<ScreenPoint> {
        self.try_sample(boundary, viewport).unwrap_or_default()
    }

    /// Samples `boundary` into grid points lying inside the projected polygon.
    ///
    /// The grid starts at the top-left corner of the projected bounding box
    /// and advances by `spacing`, column by column. At most `max_points`
    /// points are returned.
    ///
    /// # Errors
    ///
    /// Returns `OverlayError::MalformedBoundary` if the boundary has an odd
    /// length or fewer than 3 pairs, and `OverlayError::SamplingFailure` if a
    /// read coordinate does not project to a finite screen point.
    pub fn try_sample(&self, boundary: &[f32], viewport: Viewport) -> Result<Vec<ScreenPoint>> {
        let polygon = self.project_boundary(boundary, viewport)?;
        if polygon.len() < 3 {
            return Ok(Vec::new());
        }
        let Some(bounds) = Bounds2::from_points(&polygon) else {
            return Ok(Vec::new());
        };
        Ok(self.walk_grid(&bounds, &polygon))
    }

    /// Projects at most `max_vertices` pairs of `boundary` to screen space.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::try_sample`].
    pub fn project_boundary(
        &self,
        boundary: &[f32],
        viewport: Viewport,
    ) -> Result<Vec<ScreenPoint>> {
        if boundary.len() < 6 || boundary.len() % 2 != 0 {
            return Err(OverlayError::MalformedBoundary {
                len: boundary.len(),
            });
        }

        let mut polygon = Vec::with_capacity((boundary.len() / 2).min(self.params.max_vertices));
        for (index, pair) in boundary
            .chunks_exact(2)
            .take(self.params.max_vertices)
            .enumerate()
        {
            let (x, z) = (pair[0], pair[1]);
            let projected = viewport.project(x, z);
            // Finite input can still overflow once scaled to the viewport.
            if !projected.x.is_finite() || !projected.y.is_finite() {
                return Err(OverlayError::SamplingFailure(format!(
                    "coordinate ({x}, {z}) at vertex {index} does not project to a finite point"
                )));
            }
            polygon.push(projected);
        }
        Ok(polygon)
    }

    fn walk_grid(&self, bounds: &Bounds2, polygon: &[ScreenPoint]) -> Vec<ScreenPoint> {
        let step = self.params.spacing;
        let mut dots = Vec::new();
        if self.params.max_points == 0 {
            return dots;
        }

        let mut x = bounds.min_x;
        'columns: while x <= bounds.max_x {
            let mut y = bounds.min_y;
            while y <= bounds.max_y {
                let candidate = ScreenPoint::new(x, y);
                if point_in_polygon(&candidate, polygon) {
                    dots.push(candidate);
                    if dots.len() >= self.params.max_points {
                        break 'columns;
                    }
                }
                // Step lost to precision (or non-positive spacing).
                let next = y + step;
                if next <= y {
                    break;
                }
                y = next;
            }
            let next = x + step;
            if next <= x {
                break;
            }
            x = next;
        }
        dots
    }
}
