use std::time::Duration;

/// Fade-in progress of the overlay.
///
/// The start time is latched on the first [`FadeState::advance`] after a
/// reset; only [`FadeState::reset`] clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FadeState {
    alpha: f32,
    start: Option<Duration>,
}

impl FadeState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current alpha in `[0, 1]`.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Clock reading at which the fade started, if it has.
    #[must_use]
    pub fn started_at(&self) -> Option<Duration> {
        self.start
    }

    /// Updates alpha for the clock reading `now` and returns it.
    ///
    /// Elapsed time is measured in whole milliseconds. Alpha never decreases
    /// between resets, even if `now` goes backwards.
    #[allow(clippy::cast_precision_loss)]
    pub fn advance(&mut self, now: Duration, duration: Duration) -> f32 {
        let start = *self.start.get_or_insert(now);
        let elapsed = now.saturating_sub(start).as_millis();
        let total = duration.as_millis();
        let target = if total == 0 {
            1.0
        } else {
            (elapsed as f32 / total as f32).min(1.0)
        };
        self.alpha = self.alpha.max(target);
        self.alpha
    }

    /// Scales an 8-bit base opacity by the current alpha, truncating.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scale(&self, base: u8) -> u8 {
        (f32::from(base) * self.alpha) as u8
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
