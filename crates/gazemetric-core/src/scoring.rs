//! Per-frame channel scoring: head-posture falloff, gaze-zone penalties,
//! eye-closure factor, and the temporal micro-movement penalty.

use std::collections::VecDeque;

use crate::config::EngineConfig;
use crate::landmarks::{GazePair, HorizontalZone, VerticalZone};
use crate::orientation::EulerAngles;

/// Head-posture score in [0, 1].
///
/// Each axis contributes a logistic falloff centered on `max_head_angle`;
/// the three are averaged, then a linear penalty for every degree beyond the
/// limit is subtracted. The logistic keeps small deviations nearly free while
/// the linear term punishes sustained large rotations.
pub fn head_posture_score(angles: &EulerAngles, config: &EngineConfig) -> f32 {
    let axes = [angles.pitch.abs(), angles.yaw.abs(), angles.roll.abs()];

    let base: f32 = axes
        .iter()
        .map(|a| 1.0 / (1.0 + (config.head_steepness * (a - config.max_head_angle)).exp()))
        .sum::<f32>()
        / 3.0;

    let excess: f32 = axes
        .iter()
        .map(|a| (a - config.max_head_angle).max(0.0) * config.head_excess_penalty)
        .sum();

    (base - excess).max(0.0)
}

/// Gaze-direction score in [0, 1] from both eyes' zone classification.
///
/// Off-center zones pay the table penalty on their axis; any deviation at all
/// additionally pays the flat off-center multiplier on top.
pub fn gaze_direction_score(gaze: &GazePair, config: &EngineConfig) -> f32 {
    let penalty = |centered: bool| if centered { 1.0 } else { config.off_center_penalty };

    let horizontal = (penalty(gaze.left.horizontal == HorizontalZone::Center)
        + penalty(gaze.right.horizontal == HorizontalZone::Center))
        / 2.0;
    let vertical = (penalty(gaze.left.vertical == VerticalZone::Center)
        + penalty(gaze.right.vertical == VerticalZone::Center))
        / 2.0;

    let mut score = horizontal * vertical;
    if !gaze.left.is_centered() || !gaze.right.is_centered() {
        score *= config.off_center_multiplier;
    }
    score
}

/// Eye-closure factor against the calibrated baseline: closed eyes earn no
/// gaze credit, squinting earns partial credit, open eyes full credit.
pub fn eye_closure_factor(avg_ear: f32, baseline_ear: f32, config: &EngineConfig) -> f32 {
    if avg_ear < baseline_ear * config.closed_ear_fraction {
        0.0
    } else if avg_ear < baseline_ear * config.squint_ear_fraction {
        config.squint_factor
    } else {
        1.0
    }
}

/// Short-horizon gaze instability detector.
///
/// Compares each frame's zones against the immediately preceding snapshot;
/// a rolling buffer of recent pairs is retained alongside for longer-window
/// analysis. Untouched by frames without a face.
#[derive(Debug, Clone)]
pub struct MicroMovementTracker {
    last: GazePair,
    history: VecDeque<GazePair>,
    capacity: usize,
}

impl MicroMovementTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            last: GazePair::centered(),
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record this frame's gaze and return the movement penalty, bounded by
    /// `movement_penalty_cap`. Horizontal and vertical zone changes (either
    /// eye) each add one penalty step.
    pub fn observe(&mut self, gaze: GazePair, config: &EngineConfig) -> f32 {
        self.history.push_back(gaze);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let mut penalty = 0.0;
        if gaze.left.horizontal != self.last.left.horizontal
            || gaze.right.horizontal != self.last.right.horizontal
        {
            penalty += config.movement_penalty;
        }
        if gaze.left.vertical != self.last.left.vertical
            || gaze.right.vertical != self.last.right.vertical
        {
            penalty += config.movement_penalty;
        }

        self.last = gaze;
        penalty.min(config.movement_penalty_cap)
    }

    pub fn history(&self) -> &VecDeque<GazePair> {
        &self.history
    }

    pub fn reset(&mut self) {
        self.last = GazePair::centered();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{GazeZone, HorizontalZone, VerticalZone};

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn zone(h: HorizontalZone, v: VerticalZone) -> GazeZone {
        GazeZone {
            horizontal: h,
            vertical: v,
        }
    }

    fn pair(h: HorizontalZone, v: VerticalZone) -> GazePair {
        GazePair {
            left: zone(h, v),
            right: zone(h, v),
        }
    }

    #[test]
    fn head_score_near_one_when_frontal() {
        let score = head_posture_score(&EulerAngles::default(), &config());
        assert!(score > 0.99 && score <= 1.0);
    }

    #[test]
    fn head_score_half_falloff_at_limit() {
        let angles = EulerAngles {
            pitch: 25.0,
            yaw: 0.0,
            roll: 0.0,
        };
        let score = head_posture_score(&angles, &config());
        // Pitch axis sits exactly at the logistic midpoint (0.5); the other
        // two axes remain near 1.0.
        assert!((score - (0.5 + 2.0 * 0.998) / 3.0).abs() < 0.01);
    }

    #[test]
    fn head_score_floors_at_zero_for_extreme_rotation() {
        let angles = EulerAngles {
            pitch: 90.0,
            yaw: 0.0,
            roll: 0.0,
        };
        assert_eq!(head_posture_score(&angles, &config()), 0.0);
    }

    #[test]
    fn head_score_symmetric_in_sign() {
        let pos = EulerAngles {
            pitch: 15.0,
            yaw: -10.0,
            roll: 5.0,
        };
        let neg = EulerAngles {
            pitch: -15.0,
            yaw: 10.0,
            roll: -5.0,
        };
        let c = config();
        assert_eq!(head_posture_score(&pos, &c), head_posture_score(&neg, &c));
    }

    #[test]
    fn gaze_score_centered_is_full() {
        let score = gaze_direction_score(&GazePair::centered(), &config());
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gaze_score_both_eyes_left() {
        // Horizontal penalty 0.1 both eyes, vertical 1.0, off-center x0.7.
        let score = gaze_direction_score(
            &pair(HorizontalZone::Left, VerticalZone::Center),
            &config(),
        );
        assert!((score - 0.07).abs() < 1e-6);
    }

    #[test]
    fn gaze_score_one_eye_off_center() {
        let gaze = GazePair {
            left: zone(HorizontalZone::Left, VerticalZone::Center),
            right: GazeZone::centered(),
        };
        // Horizontal average (0.1 + 1.0) / 2 = 0.55, vertical 1.0, x0.7.
        let score = gaze_direction_score(&gaze, &config());
        assert!((score - 0.385).abs() < 1e-6);
    }

    #[test]
    fn closure_factor_bands() {
        let c = config();
        let baseline = 0.3;
        assert_eq!(eye_closure_factor(0.05, baseline, &c), 0.0);
        assert_eq!(eye_closure_factor(0.10, baseline, &c), 0.3);
        assert_eq!(eye_closure_factor(0.30, baseline, &c), 1.0);
        // Exactly at the closed boundary counts as squinting, not closed.
        assert_eq!(eye_closure_factor(0.09, baseline, &c), 0.3);
    }

    #[test]
    fn movement_penalty_zero_for_steady_gaze() {
        let c = config();
        let mut tracker = MicroMovementTracker::new(c.gaze_history_len);
        for _ in 0..10 {
            assert_eq!(tracker.observe(GazePair::centered(), &c), 0.0);
        }
    }

    #[test]
    fn movement_penalty_per_axis() {
        let c = config();
        let mut tracker = MicroMovementTracker::new(c.gaze_history_len);
        tracker.observe(GazePair::centered(), &c);

        let horizontal_shift = pair(HorizontalZone::Left, VerticalZone::Center);
        assert!((tracker.observe(horizontal_shift, &c) - 0.2).abs() < 1e-6);

        let both_shift = pair(HorizontalZone::Right, VerticalZone::Up);
        assert!((tracker.observe(both_shift, &c) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn movement_penalty_bounded() {
        let c = config();
        let mut tracker = MicroMovementTracker::new(c.gaze_history_len);
        let sequence = [
            pair(HorizontalZone::Left, VerticalZone::Up),
            pair(HorizontalZone::Right, VerticalZone::Down),
            GazePair::centered(),
            pair(HorizontalZone::Left, VerticalZone::Down),
        ];
        for gaze in sequence {
            let penalty = tracker.observe(gaze, &c);
            assert!((0.0..=0.4).contains(&penalty));
        }
    }

    #[test]
    fn history_evicts_fifo_at_capacity() {
        let c = config();
        let mut tracker = MicroMovementTracker::new(5);
        for _ in 0..5 {
            tracker.observe(GazePair::centered(), &c);
        }
        let newest = pair(HorizontalZone::Left, VerticalZone::Center);
        tracker.observe(newest, &c);
        assert_eq!(tracker.history().len(), 5);
        assert_eq!(*tracker.history().back().unwrap(), newest);
    }
}
