//! Gazemetric scoring engine.
//!
//! Turns a stream of per-frame facial geometry — a fixed-index landmark
//! sequence, a facial transformation matrix, and optional blend-shape
//! intensities — into three running engagement percentages: eye-contact
//! quality, head-posture quality, and a weighted overall score.
//!
//! The landmark detector, video capture, and any UI are external
//! collaborators; this crate only consumes detector output. Drive it one
//! detection result at a time:
//!
//! ```
//! use gazemetric_core::{EngineConfig, FrameObservation, ScoringSession};
//!
//! let mut session = ScoringSession::new(EngineConfig::default())?;
//! session.start();
//! let report = session.process_frame(&FrameObservation::default());
//! assert!(!report.face_detected);
//! # Ok::<(), gazemetric_core::ConfigError>(())
//! ```
//!
//! The first `adaptive_frames` frames with a face calibrate a personal
//! eye-openness baseline; scoring is withheld until the baseline freezes.
//! After that every frame flows through eyewear detection, gaze and
//! head-posture scoring, and the running accumulator.

pub mod calibration;
pub mod config;
pub mod eyewear;
pub mod feedback;
pub mod landmarks;
pub mod orientation;
pub mod scoring;
pub mod session;

pub use calibration::{CalibrationPhase, CalibrationTracker};
pub use config::{ConfigError, EngineConfig};
pub use eyewear::{has_eyewear, BlendShape, ScoreWeights};
pub use feedback::{advise, FeedbackHint, FeedbackPresenter};
pub use landmarks::{
    detect_gaze, eye_aspect_ratio, face_aspect_ratio, iris_zone, is_face_forward, Bounds,
    GazePair, GazeZone, HorizontalZone, Landmark, VerticalZone,
};
pub use orientation::{euler_from_matrix, EulerAngles};
pub use scoring::{
    eye_closure_factor, gaze_direction_score, head_posture_score, MicroMovementTracker,
};
pub use session::{
    EnginePhase, FrameObservation, FrameReport, ScoringSession, SessionPercentages,
};
