//! Engine configuration: every scoring constant named and tunable.

use thiserror::Error;

use crate::eyewear::ScoreWeights;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("adaptive_frames must be at least 1")]
    ZeroAdaptiveFrames,
    #[error("{which} weights must sum to 1.0 (got {sum})")]
    InvalidWeights { which: &'static str, sum: f32 },
    #[error(
        "closure thresholds must satisfy 0 < closed ({closed}) < squint ({squint}) < 1"
    )]
    InvalidClosureThresholds { closed: f32, squint: f32 },
    #[error("{name} must be non-negative (got {value})")]
    NegativePenalty { name: &'static str, value: f32 },
    #[error("face-forward ratio band is empty ({min}..{max})")]
    InvalidFaceBand { min: f32, max: f32 },
    #[error("gaze_history_len must be at least 1")]
    EmptyGazeHistory,
}

/// All tunable constants for the scoring engine.
///
/// `Default` carries the reference values; individual fields can be
/// overridden via `GAZEMETRIC_*` environment variables or directly before
/// session construction. Validated once, fail-fast, when a session is built.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Warm-up frames (with a face) used to establish the EAR baseline.
    pub adaptive_frames: u32,
    /// Head angle (degrees) at which the logistic falloff crosses 0.5.
    pub max_head_angle: f32,
    /// Steepness of the logistic falloff around `max_head_angle`.
    pub head_steepness: f32,
    /// Linear penalty per degree of excess beyond `max_head_angle`.
    pub head_excess_penalty: f32,
    /// Gaze penalty for an off-center zone (center scores 1.0).
    pub off_center_penalty: f32,
    /// Flat multiplier applied once when any eye is off-center on any axis.
    pub off_center_multiplier: f32,
    /// Fraction of the baseline EAR below which eyes count as closed.
    pub closed_ear_fraction: f32,
    /// Fraction of the baseline EAR below which eyes count as squinting.
    pub squint_ear_fraction: f32,
    /// Closure factor applied while squinting.
    pub squint_factor: f32,
    /// Penalty added per axis whose gaze zone changed since the last frame.
    pub movement_penalty: f32,
    /// Upper bound on the total micro-movement penalty.
    pub movement_penalty_cap: f32,
    /// Rolling gaze-zone history capacity.
    pub gaze_history_len: usize,
    /// Blend-shape score above which an eyewear category counts as present.
    pub eyewear_threshold: f32,
    /// Channel weights without eyewear.
    pub default_weights: ScoreWeights,
    /// Channel weights when eyewear is detected.
    pub eyewear_weights: ScoreWeights,
    /// Face bounding-box width/height band considered frontal.
    pub face_forward_ratio_min: f32,
    pub face_forward_ratio_max: f32,
    /// Frame eye score below which the eye-contact hint fires.
    pub eye_feedback_threshold: f32,
    /// Frame head score below which the head-posture hint fires.
    pub head_feedback_threshold: f32,
    /// Seconds a shown feedback message stays on display.
    pub feedback_display_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            adaptive_frames: 30,
            max_head_angle: 25.0,
            head_steepness: 0.25,
            head_excess_penalty: 0.15,
            off_center_penalty: 0.1,
            off_center_multiplier: 0.7,
            closed_ear_fraction: 0.3,
            squint_ear_fraction: 0.5,
            squint_factor: 0.3,
            movement_penalty: 0.2,
            movement_penalty_cap: 0.4,
            gaze_history_len: 5,
            eyewear_threshold: 0.5,
            default_weights: ScoreWeights {
                eye_contact: 0.6,
                head_posture: 0.4,
            },
            eyewear_weights: ScoreWeights {
                eye_contact: 0.4,
                head_posture: 0.6,
            },
            face_forward_ratio_min: 0.7,
            face_forward_ratio_max: 1.3,
            eye_feedback_threshold: 0.5,
            head_feedback_threshold: 0.6,
            feedback_display_secs: 5,
        }
    }
}

impl EngineConfig {
    /// Defaults with `GAZEMETRIC_*` environment overrides for the most
    /// commonly tuned values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            adaptive_frames: env_u32("GAZEMETRIC_ADAPTIVE_FRAMES", defaults.adaptive_frames),
            max_head_angle: env_f32("GAZEMETRIC_MAX_HEAD_ANGLE", defaults.max_head_angle),
            eyewear_threshold: env_f32("GAZEMETRIC_EYEWEAR_THRESHOLD", defaults.eyewear_threshold),
            feedback_display_secs: env_u64(
                "GAZEMETRIC_FEEDBACK_DISPLAY_SECS",
                defaults.feedback_display_secs,
            ),
            ..defaults
        }
    }

    /// Reject invalid constants before any frame is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adaptive_frames == 0 {
            return Err(ConfigError::ZeroAdaptiveFrames);
        }
        if self.gaze_history_len == 0 {
            return Err(ConfigError::EmptyGazeHistory);
        }
        check_weights("default", &self.default_weights)?;
        check_weights("eyewear", &self.eyewear_weights)?;
        if !(self.closed_ear_fraction > 0.0
            && self.closed_ear_fraction < self.squint_ear_fraction
            && self.squint_ear_fraction < 1.0)
        {
            return Err(ConfigError::InvalidClosureThresholds {
                closed: self.closed_ear_fraction,
                squint: self.squint_ear_fraction,
            });
        }
        for (name, value) in [
            ("movement_penalty", self.movement_penalty),
            ("movement_penalty_cap", self.movement_penalty_cap),
            ("head_excess_penalty", self.head_excess_penalty),
            ("off_center_penalty", self.off_center_penalty),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::NegativePenalty { name, value });
            }
        }
        if !(self.face_forward_ratio_min < self.face_forward_ratio_max) {
            return Err(ConfigError::InvalidFaceBand {
                min: self.face_forward_ratio_min,
                max: self.face_forward_ratio_max,
            });
        }
        Ok(())
    }
}

fn check_weights(which: &'static str, weights: &ScoreWeights) -> Result<(), ConfigError> {
    let sum = weights.sum();
    if (sum - 1.0).abs() > 1e-3 || weights.eye_contact < 0.0 || weights.head_posture < 0.0 {
        return Err(ConfigError::InvalidWeights { which, sum });
    }
    Ok(())
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_adaptive_frames_rejected() {
        let config = EngineConfig {
            adaptive_frames: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroAdaptiveFrames)
        ));
    }

    #[test]
    fn unbalanced_weights_rejected() {
        let config = EngineConfig {
            default_weights: ScoreWeights {
                eye_contact: 0.6,
                head_posture: 0.6,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeights { which: "default", .. })
        ));
    }

    #[test]
    fn inverted_closure_thresholds_rejected() {
        let config = EngineConfig {
            closed_ear_fraction: 0.5,
            squint_ear_fraction: 0.3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidClosureThresholds { .. })
        ));
    }

    #[test]
    fn negative_penalty_rejected() {
        let config = EngineConfig {
            movement_penalty: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativePenalty {
                name: "movement_penalty",
                ..
            })
        ));
    }

    #[test]
    fn empty_face_band_rejected() {
        let config = EngineConfig {
            face_forward_ratio_min: 1.3,
            face_forward_ratio_max: 0.7,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFaceBand { .. })
        ));
    }
}
