mod fade;

pub use fade::FadeState;

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::canvas::{Canvas, Rgba};
use crate::clock::{Clock, SystemClock};
use crate::error::{OverlayError, Result};
use crate::math::{ScreenPoint, Viewport};
use crate::plane::{PlaneId, TrackedPlane};
use crate::sampling::{PolygonSampler, SamplerParams};

/// Parameters controlling the overlay's look.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayParams {
    /// Radius of each dot in pixels.
    pub dot_radius: f32,
    /// Dot fill color; its alpha is replaced by the faded `base_alpha`.
    pub dot_color: Rgba,
    /// Fill opacity once the fade-in has completed.
    pub base_alpha: u8,
    /// Time from the first non-empty update to full opacity.
    pub fade_duration: Duration,
    /// Dot grid settings.
    pub sampler: SamplerParams,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            dot_radius: 4.0,
            dot_color: Rgba::WHITE,
            base_alpha: 180,
            fade_duration: Duration::from_millis(300),
            sampler: SamplerParams::default(),
        }
    }
}

/// What a single [`OverlayState::update`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    /// Planes sampled for the first time, including failed ones.
    pub sampled: usize,
    /// Planes whose dots were already cached.
    pub cache_hits: usize,
    /// Planes that ended up with no dots because sampling failed.
    pub failures: Vec<(PlaneId, OverlayError)>,
}

/// Dot-grid overlay for the currently tracked planes.
///
/// Dots are sampled once per plane identity, at the viewport size current
/// when the identity is first seen, and kept until [`OverlayState::clear`].
/// Every cached dot is drawn while at least one plane is tracked, including
/// dots of planes that have since disappeared.
#[derive(Debug)]
pub struct OverlayState<C = SystemClock> {
    params: OverlayParams,
    sampler: PolygonSampler,
    clock: C,
    current: Vec<PlaneId>,
    dots: HashMap<PlaneId, Vec<ScreenPoint>>,
    fade: FadeState,
    redraw_requested: bool,
}

impl OverlayState<SystemClock> {
    /// Creates an overlay with default parameters and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(OverlayParams::default(), SystemClock::new())
    }
}

impl Default for OverlayState<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> OverlayState<C> {
    /// Creates an overlay driven by `clock`.
    #[must_use]
    pub fn with_clock(params: OverlayParams, clock: C) -> Self {
        Self {
            params,
            sampler: PolygonSampler::new(params.sampler),
            clock,
            current: Vec::new(),
            dots: HashMap::new(),
            fade: FadeState::new(),
            redraw_requested: false,
        }
    }

    /// Replaces the tracked plane set, sampling planes seen for the first
    /// time, advancing the fade-in and requesting a redraw.
    ///
    /// Never fails: a plane whose boundary cannot be sampled gets no dots
    /// and is reported in the returned summary.
    pub fn update<P: TrackedPlane>(
        &mut self,
        planes: &[P],
        viewport: Viewport,
    ) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        self.current.clear();

        for plane in planes {
            let id = plane.id();
            self.current.push(id);
            if self.dots.contains_key(&id) {
                summary.cache_hits += 1;
                continue;
            }

            summary.sampled += 1;
            let dots = match self.sample_plane(plane, viewport) {
                Ok(dots) => {
                    debug!(?id, dots = dots.len(), "sampled plane");
                    dots
                }
                Err(err) => {
                    match &err {
                        OverlayError::MalformedBoundary { .. } => {
                            debug!(?id, %err, "skipping plane");
                        }
                        OverlayError::SamplingFailure(_) => {
                            warn!(?id, %err, "failed to sample plane");
                        }
                    }
                    summary.failures.push((id, err));
                    Vec::new()
                }
            };
            self.dots.insert(id, dots);
        }

        if !self.current.is_empty() {
            self.fade.advance(self.clock.now(), self.params.fade_duration);
        }

        self.redraw_requested = true;
        summary
    }

    /// Draws every cached dot with the current fade applied.
    ///
    /// Does nothing while no plane is tracked. Clipping is left to the
    /// canvas, whose coordinate space may be transformed by the host.
    pub fn render<K: Canvas + ?Sized>(&self, canvas: &mut K, _viewport: Viewport) {
        if self.current.is_empty() {
            return;
        }

        let radius = self.params.dot_radius;
        let color = self.fill_color();
        for dot in self.dots.values().flatten() {
            canvas.fill_circle(*dot, radius, color);
        }
    }

    /// Forgets all planes and cached dots and restarts the fade-in.
    pub fn clear(&mut self) {
        self.current.clear();
        self.dots.clear();
        self.fade.reset();
        self.redraw_requested = true;
    }

    /// Returns and resets the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Fade-in progress in `[0, 1]`.
    #[must_use]
    pub fn fade_alpha(&self) -> f32 {
        self.fade.alpha()
    }

    /// Dot color including the faded opacity.
    #[must_use]
    pub fn fill_color(&self) -> Rgba {
        self.params
            .dot_color
            .with_alpha(self.fade.scale(self.params.base_alpha))
    }

    #[must_use]
    pub fn fade(&self) -> &FadeState {
        &self.fade
    }

    /// Planes passed to the last update.
    #[must_use]
    pub fn current_planes(&self) -> &[PlaneId] {
        &self.current
    }

    /// Identities with cached dots, in no particular order.
    pub fn cached_planes(&self) -> impl Iterator<Item = PlaneId> + '_ {
        self.dots.keys().copied()
    }

    /// Cached dots of one plane.
    #[must_use]
    pub fn dots_for(&self, id: PlaneId) -> Option<&[ScreenPoint]> {
        self.dots.get(&id).map(Vec::as_slice)
    }

    /// Total number of cached dots across all planes.
    #[must_use]
    pub fn dot_count(&self) -> usize {
        self.dots.values().map(Vec::len).sum()
    }

    fn sample_plane<P: TrackedPlane>(
        &self,
        plane: &P,
        viewport: Viewport,
    ) -> Result<Vec<ScreenPoint>> {
        let boundary = plane.boundary()?;
        self.sampler.try_sample(&boundary, viewport)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::borrow::Cow;
    use std::cell::{Cell, RefCell};

    use slotmap::SlotMap;

    use super::*;
    use crate::canvas::PixelCanvas;
    use crate::clock::ManualClock;
    use crate::plane::Plane;

    const VP: Viewport = Viewport {
        width: 400,
        height: 400,
    };

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn ids(n: usize) -> Vec<PlaneId> {
        let mut keys: SlotMap<PlaneId, ()> = SlotMap::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    /// 0.4 x 0.4 square centered on the plane origin.
    fn small_square() -> Vec<f32> {
        vec![-0.2, -0.2, 0.2, -0.2, 0.2, 0.2, -0.2, 0.2]
    }

    fn overlay() -> (OverlayState<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (
            OverlayState::with_clock(OverlayParams::default(), clock.clone()),
            clock,
        )
    }

    /// Plane that counts boundary reads and can be reshaped between frames.
    struct CountingPlane {
        id: PlaneId,
        boundary: RefCell<Vec<f32>>,
        reads: Cell<usize>,
    }

    impl CountingPlane {
        fn new(id: PlaneId, boundary: Vec<f32>) -> Self {
            Self {
                id,
                boundary: RefCell::new(boundary),
                reads: Cell::new(0),
            }
        }
    }

    impl TrackedPlane for CountingPlane {
        fn id(&self) -> PlaneId {
            self.id
        }

        fn boundary(&self) -> Result<Cow<'_, [f32]>> {
            self.reads.set(self.reads.get() + 1);
            Ok(Cow::Owned(self.boundary.borrow().clone()))
        }
    }

    /// Plane whose boundary can never be read.
    struct BrokenPlane(PlaneId);

    impl TrackedPlane for BrokenPlane {
        fn id(&self) -> PlaneId {
            self.0
        }

        fn boundary(&self) -> Result<Cow<'_, [f32]>> {
            Err(OverlayError::SamplingFailure("buffer released".into()))
        }
    }

    #[derive(Default)]
    struct RecordingCanvas {
        circles: Vec<(ScreenPoint, f32, Rgba)>,
    }

    impl Canvas for RecordingCanvas {
        fn fill_circle(&mut self, center: ScreenPoint, radius: f32, color: Rgba) {
            self.circles.push((center, radius, color));
        }
    }

    #[test]
    fn first_sight_samples_at_current_viewport() {
        let (mut overlay, _) = overlay();
        let id = ids(1)[0];
        let summary = overlay.update(&[Plane::new(id, small_square())], VP);

        assert_eq!(summary.sampled, 1);
        assert_eq!(summary.cache_hits, 0);
        assert!(summary.failures.is_empty());
        let expected = PolygonSampler::default().sample(&small_square(), VP);
        assert!(!expected.is_empty());
        assert_eq!(overlay.dots_for(id), Some(expected.as_slice()));
        assert_eq!(overlay.current_planes(), &[id]);
    }

    #[test]
    fn same_identity_is_sampled_once() {
        let (mut overlay, _) = overlay();
        let plane = CountingPlane::new(ids(1)[0], small_square());

        overlay.update(std::slice::from_ref(&plane), VP);
        let first = overlay.dots_for(plane.id).unwrap().to_vec();

        *plane.boundary.borrow_mut() = vec![-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0];
        let summary = overlay.update(std::slice::from_ref(&plane), Viewport::new(800, 600));

        assert_eq!(plane.reads.get(), 1);
        assert_eq!(summary.sampled, 0);
        assert_eq!(summary.cache_hits, 1);
        assert_eq!(overlay.dots_for(plane.id), Some(first.as_slice()));
    }

    #[test]
    fn new_identity_with_same_geometry_resamples() {
        let (mut overlay, _) = overlay();
        let ids = ids(2);
        overlay.update(&[Plane::new(ids[0], small_square())], VP);
        let summary = overlay.update(&[Plane::new(ids[1], small_square())], VP);

        assert_eq!(summary.sampled, 1);
        assert_eq!(overlay.cached_planes().count(), 2);
        assert_eq!(overlay.dots_for(ids[0]), overlay.dots_for(ids[1]));
    }

    #[test]
    fn failing_plane_does_not_affect_others() {
        init_tracing();
        let (mut overlay, _) = overlay();
        let ids = ids(3);
        let good = Plane::new(ids[0], small_square());
        let broken = BrokenPlane(ids[1]);
        let short = Plane::new(ids[2], vec![0.0, 0.0, 1.0, 1.0]);
        let planes: [&dyn TrackedPlane; 3] = [&good, &broken, &short];

        let summary = overlay.update(&planes, VP);

        assert_eq!(summary.sampled, 3);
        assert_eq!(summary.failures.len(), 2);
        assert!(matches!(
            summary.failures[0],
            (id, OverlayError::SamplingFailure(_)) if id == ids[1]
        ));
        assert_eq!(
            summary.failures[1],
            (ids[2], OverlayError::MalformedBoundary { len: 4 })
        );
        assert!(!overlay.dots_for(ids[0]).unwrap().is_empty());
        assert_eq!(overlay.dots_for(ids[1]), Some(&[][..]));
        assert_eq!(overlay.dots_for(ids[2]), Some(&[][..]));
    }

    #[test]
    fn failed_plane_is_not_retried() {
        let (mut overlay, _) = overlay();
        let id = ids(1)[0];
        overlay.update(&[BrokenPlane(id)], VP);
        let summary = overlay.update(&[BrokenPlane(id)], VP);
        assert_eq!(summary.cache_hits, 1);
        assert!(summary.failures.is_empty());
    }

    #[test]
    fn fade_ramps_over_duration() {
        let (mut overlay, clock) = overlay();
        let plane = Plane::new(ids(1)[0], small_square());

        clock.set(Duration::from_secs(10));
        overlay.update(std::slice::from_ref(&plane), VP);
        assert_eq!(overlay.fade_alpha(), 0.0);
        assert_eq!(overlay.fade().started_at(), Some(Duration::from_secs(10)));

        let mut previous = overlay.fade_alpha();
        for _ in 0..10 {
            clock.advance(Duration::from_millis(50));
            overlay.update(std::slice::from_ref(&plane), VP);
            let alpha = overlay.fade_alpha();
            assert!(alpha >= previous);
            assert!((0.0..=1.0).contains(&alpha));
            previous = alpha;
        }
        assert_eq!(overlay.fade_alpha(), 1.0);
        assert_eq!(overlay.fill_color(), Rgba::WHITE.with_alpha(180));
    }

    #[test]
    fn empty_update_keeps_fade() {
        let (mut overlay, clock) = overlay();
        let plane = Plane::new(ids(1)[0], small_square());

        overlay.update(std::slice::from_ref(&plane), VP);
        clock.advance(Duration::from_millis(150));
        overlay.update(std::slice::from_ref(&plane), VP);
        assert_eq!(overlay.fade_alpha(), 0.5);

        clock.advance(Duration::from_millis(100));
        overlay.update::<Plane>(&[], VP);
        assert_eq!(overlay.fade_alpha(), 0.5);
        assert_eq!(overlay.fade().started_at(), Some(Duration::ZERO));
        assert!(overlay.current_planes().is_empty());

        // Fade resumes from the first start.
        overlay.update(std::slice::from_ref(&plane), VP);
        assert!((overlay.fade_alpha() - 250.0 / 300.0).abs() < 1e-6);
    }

    #[test]
    fn clear_resets_everything_and_is_idempotent() {
        let (mut overlay, clock) = overlay();
        let plane = CountingPlane::new(ids(1)[0], small_square());

        overlay.update(std::slice::from_ref(&plane), VP);
        clock.advance(Duration::from_millis(400));
        overlay.update(std::slice::from_ref(&plane), VP);
        assert_eq!(overlay.fade_alpha(), 1.0);

        overlay.clear();
        overlay.clear();
        assert_eq!(overlay.fade_alpha(), 0.0);
        assert!(overlay.fade().started_at().is_none());
        assert_eq!(overlay.dot_count(), 0);
        assert_eq!(overlay.cached_planes().count(), 0);
        assert!(overlay.current_planes().is_empty());

        overlay.update(std::slice::from_ref(&plane), VP);
        assert_eq!(plane.reads.get(), 2);
        assert!(overlay.dot_count() > 0);
        assert_eq!(overlay.fade().started_at(), Some(Duration::from_millis(400)));
    }

    #[test]
    fn render_without_planes_draws_nothing() {
        let (mut overlay, _) = overlay();
        let mut canvas = RecordingCanvas::default();
        overlay.render(&mut canvas, VP);
        assert!(canvas.circles.is_empty());

        overlay.update(&[Plane::new(ids(1)[0], small_square())], VP);
        overlay.update::<Plane>(&[], VP);
        overlay.render(&mut canvas, VP);
        assert!(canvas.circles.is_empty());
    }

    #[test]
    fn render_draws_all_cached_planes() {
        let (mut overlay, clock) = overlay();
        let ids = ids(2);
        let left = Plane::new(ids[0], small_square());
        let right = Plane::new(ids[1], vec![0.5, -0.2, 0.9, -0.2, 0.9, 0.2, 0.5, 0.2]);

        overlay.update(&[left.clone(), right], VP);
        clock.advance(Duration::from_millis(150));
        // Only one plane this frame; the other's dots stay on screen.
        overlay.update(&[left], VP);

        let mut canvas = RecordingCanvas::default();
        overlay.render(&mut canvas, VP);

        assert_eq!(canvas.circles.len(), overlay.dot_count());
        for (_, radius, color) in &canvas.circles {
            assert_eq!(*radius, 4.0);
            assert_eq!(*color, Rgba::WHITE.with_alpha(90));
        }
    }

    #[test]
    fn render_draws_off_screen_dots_too() {
        let (mut overlay, _) = overlay();
        let id = ids(1)[0];
        let big = vec![0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0];
        overlay.update(&[Plane::new(id, big)], VP);
        assert_eq!(overlay.dot_count(), 200);

        let mut canvas = RecordingCanvas::default();
        overlay.render(&mut canvas, VP);

        // Most of the column lies below the viewport; the canvas clips.
        assert_eq!(canvas.circles.len(), overlay.dot_count());
        assert!(canvas.circles.iter().any(|(c, _, _)| c.y > 400.0));
    }

    #[test]
    fn update_and_clear_request_redraw() {
        let (mut overlay, _) = overlay();
        assert!(!overlay.take_redraw_request());

        overlay.update::<Plane>(&[], VP);
        assert!(overlay.take_redraw_request());
        assert!(!overlay.take_redraw_request());

        overlay.clear();
        assert!(overlay.take_redraw_request());
    }

    #[test]
    fn renders_to_pixels_after_fade_in() {
        let (mut overlay, clock) = overlay();
        let id = ids(1)[0];
        overlay.update(&[Plane::new(id, small_square())], VP);
        clock.advance(Duration::from_millis(300));
        overlay.update(&[Plane::new(id, small_square())], VP);

        let black = Rgba::new(0, 0, 0, 255);
        let mut canvas = PixelCanvas::new(VP.width, VP.height, black);
        overlay.render(&mut canvas, VP);

        let dot = overlay.dots_for(id).unwrap()[0];
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let px = canvas.pixel(dot.x as u32, dot.y as u32).unwrap();
        assert_eq!(px, Rgba::new(180, 180, 180, 255));
        assert_eq!(canvas.pixel(0, 0), Some(black));
    }
}
