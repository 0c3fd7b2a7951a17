//! Per-session eye-openness calibration.
//!
//! Eye-closure thresholds are relative to how open this user's eyes normally
//! are (glasses, narrow eyes, and camera placement all shift the absolute
//! EAR), so the first `window` frames with a face establish a personal
//! baseline before any scoring begins.

/// Calibration lifecycle. `Calibrated` is terminal until an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPhase {
    Calibrating,
    Calibrated,
}

/// Accumulates an average-EAR baseline over a fixed warm-up window.
///
/// Frames without a face do not advance the window: only observed EAR values
/// count toward the `window` required samples.
#[derive(Debug, Clone)]
pub struct CalibrationTracker {
    accumulated_ear: f32,
    frame_count: u32,
    baseline_ear: f32,
    phase: CalibrationPhase,
    window: u32,
}

impl CalibrationTracker {
    pub fn new(window: u32) -> Self {
        Self {
            accumulated_ear: 0.0,
            frame_count: 0,
            baseline_ear: 0.0,
            phase: CalibrationPhase::Calibrating,
            window,
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn is_calibrated(&self) -> bool {
        self.phase == CalibrationPhase::Calibrated
    }

    /// Frames observed so far within the warm-up window.
    pub fn frames_observed(&self) -> u32 {
        self.frame_count
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// The frozen baseline. Meaningful only once [`Self::is_calibrated`].
    pub fn baseline_ear(&self) -> f32 {
        self.baseline_ear
    }

    /// Feed one frame's two-eye average EAR. No-op once calibrated.
    pub fn observe(&mut self, avg_ear: f32) {
        if self.phase == CalibrationPhase::Calibrated {
            return;
        }
        self.accumulated_ear += avg_ear;
        self.frame_count += 1;
        if self.frame_count == self.window {
            self.baseline_ear = self.accumulated_ear / self.window as f32;
            self.phase = CalibrationPhase::Calibrated;
            tracing::info!(
                baseline_ear = self.baseline_ear,
                frames = self.frame_count,
                "calibration complete"
            );
        }
    }

    /// Return to the initial `Calibrating` state.
    pub fn reset(&mut self) {
        *self = Self::new(self.window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_ear_yields_exact_baseline() {
        let mut tracker = CalibrationTracker::new(30);
        for _ in 0..30 {
            assert!(!tracker.is_calibrated());
            tracker.observe(0.25);
        }
        assert!(tracker.is_calibrated());
        assert!((tracker.baseline_ear() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn transitions_at_exact_window() {
        let mut tracker = CalibrationTracker::new(5);
        for i in 0..4 {
            tracker.observe(0.2);
            assert_eq!(tracker.frames_observed(), i + 1);
            assert_eq!(tracker.phase(), CalibrationPhase::Calibrating);
        }
        tracker.observe(0.2);
        assert_eq!(tracker.phase(), CalibrationPhase::Calibrated);
    }

    #[test]
    fn baseline_is_mean_of_varied_samples() {
        let mut tracker = CalibrationTracker::new(4);
        for v in [0.1, 0.2, 0.3, 0.4] {
            tracker.observe(v);
        }
        assert!((tracker.baseline_ear() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn observe_after_calibration_is_noop() {
        let mut tracker = CalibrationTracker::new(2);
        tracker.observe(0.2);
        tracker.observe(0.2);
        let baseline = tracker.baseline_ear();
        tracker.observe(0.9);
        assert_eq!(tracker.baseline_ear(), baseline);
        assert_eq!(tracker.frames_observed(), 2);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut tracker = CalibrationTracker::new(2);
        tracker.observe(0.2);
        tracker.observe(0.2);
        assert!(tracker.is_calibrated());
        tracker.reset();
        assert!(!tracker.is_calibrated());
        assert_eq!(tracker.frames_observed(), 0);
        assert_eq!(tracker.baseline_ear(), 0.0);
    }
}
