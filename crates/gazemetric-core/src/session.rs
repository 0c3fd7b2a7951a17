//! Session state and the per-frame scoring pipeline.
//!
//! A [`ScoringSession`] owns every piece of mutable engine state —
//! calibration, running totals, gaze history, channel weights — and clears
//! them as one atomic unit on [`ScoringSession::start`]. The engine is
//! synchronous and single-threaded: `&mut self` on the frame path is the
//! serialization boundary, and each call is a bounded computation with no
//! internal suspension.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationTracker;
use crate::config::{ConfigError, EngineConfig};
use crate::eyewear::{has_eyewear, BlendShape, ScoreWeights};
use crate::feedback::{advise, FeedbackHint};
use crate::landmarks::{detect_gaze, eye_aspect_ratio, is_face_forward, mesh, Landmark};
use crate::orientation::euler_from_matrix;
use crate::scoring::{
    eye_closure_factor, gaze_direction_score, head_posture_score, MicroMovementTracker,
};

/// One detection result from the external landmark/pose detector.
///
/// Field names match the detector's JSON serialization, so recorded detector
/// output deserializes directly into this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameObservation {
    /// Ordered landmark sequence, absent when no face was detected.
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
    /// Flat facial transformation matrix, absent when unavailable.
    #[serde(default)]
    pub transform_matrix: Option<Vec<f32>>,
    /// Sparse named blend-shape intensities; may be empty.
    #[serde(default)]
    pub blend_shapes: Vec<BlendShape>,
}

/// Where the engine is in its per-session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EnginePhase {
    /// Warm-up window: frames feed the EAR baseline, scoring is withheld.
    Calibrating {
        frames_observed: u32,
        frames_required: u32,
    },
    /// Baseline frozen; every frame is scored and accumulated.
    Scoring,
}

/// Running averages over the session, as display percentages in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionPercentages {
    pub eye_contact: f32,
    pub head_posture: f32,
    pub overall: f32,
}

impl SessionPercentages {
    fn zero() -> Self {
        Self {
            eye_contact: 0.0,
            head_posture: 0.0,
            overall: 0.0,
        }
    }
}

/// Everything the engine can say about one processed frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub phase: EnginePhase,
    pub face_detected: bool,
    /// Frontal-face signal from the bounding-box aspect ratio. Informational
    /// only; scoring never gates on it.
    pub face_forward: Option<bool>,
    /// Last known eyewear state (persists across faceless frames).
    pub eyewear_detected: bool,
    /// This frame's eye-contact score (post micro-movement penalty).
    /// Present only on scored frames.
    pub frame_eye_score: Option<f32>,
    /// This frame's head-posture score. Absent while calibrating and on
    /// frames whose orientation matrix was missing.
    pub frame_head_score: Option<f32>,
    pub percentages: SessionPercentages,
    pub feedback: Vec<FeedbackHint>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SessionTotals {
    total_eye_score: f32,
    total_head_score: f32,
    total_frames: u64,
}

/// The engagement scoring engine for one capture session.
pub struct ScoringSession {
    config: EngineConfig,
    calibration: CalibrationTracker,
    totals: SessionTotals,
    movement: MicroMovementTracker,
    weights: ScoreWeights,
    eyewear: bool,
    active: bool,
}

impl ScoringSession {
    /// Build an inactive session, validating the configuration up front.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            calibration: CalibrationTracker::new(config.adaptive_frames),
            totals: SessionTotals::default(),
            movement: MicroMovementTracker::new(config.gaze_history_len),
            weights: config.default_weights,
            eyewear: false,
            active: false,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clear all session state as one atomic unit and accept frames.
    /// Idempotent: starting an already-started session re-zeroes it.
    pub fn start(&mut self) {
        self.calibration.reset();
        self.totals = SessionTotals::default();
        self.movement.reset();
        self.weights = self.config.default_weights;
        self.eyewear = false;
        self.active = true;
        tracing::info!(
            adaptive_frames = self.config.adaptive_frames,
            "scoring session started"
        );
    }

    /// Stop accepting frames. Idempotent; leaves accumulated state readable.
    pub fn end(&mut self) {
        if self.active {
            let p = self.percentages();
            tracing::info!(
                frames = self.totals.total_frames,
                eye_contact = p.eye_contact,
                head_posture = p.head_posture,
                overall = p.overall,
                "scoring session ended"
            );
        }
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn total_frames(&self) -> u64 {
        self.totals.total_frames
    }

    /// Process one detection result and return the updated scores.
    ///
    /// The frame counter advances on every call while the session is active,
    /// regardless of face presence; calls on an inactive session mutate
    /// nothing.
    pub fn process_frame(&mut self, observation: &FrameObservation) -> FrameReport {
        if !self.active {
            tracing::trace!("frame ignored: session not active");
            return self.report(false, None, None, None, Vec::new());
        }

        self.totals.total_frames += 1;

        match valid_landmarks(observation.landmarks.as_deref()) {
            Some(lms) => self.process_face_frame(lms, observation),
            None => self.process_faceless_frame(),
        }
    }

    fn process_face_frame(&mut self, lms: &[Landmark], observation: &FrameObservation) -> FrameReport {
        let eyewear = has_eyewear(&observation.blend_shapes, self.config.eyewear_threshold);
        if eyewear != self.eyewear {
            tracing::debug!(eyewear, "eyewear state changed; reweighting channels");
        }
        self.eyewear = eyewear;
        self.weights = if eyewear {
            self.config.eyewear_weights
        } else {
            self.config.default_weights
        };

        let face_forward = Some(is_face_forward(
            lms,
            self.config.face_forward_ratio_min,
            self.config.face_forward_ratio_max,
        ));

        let left_ear = eye_aspect_ratio(lms, &mesh::LEFT_EYE);
        let right_ear = eye_aspect_ratio(lms, &mesh::RIGHT_EYE);
        let avg_ear = (left_ear + right_ear) / 2.0;

        if !self.calibration.is_calibrated() {
            self.calibration.observe(avg_ear);
            return self.report(true, face_forward, None, None, Vec::new());
        }

        // Eye channel: gaze direction x closure, then the temporal penalty.
        let gaze = detect_gaze(lms);
        let direction = gaze_direction_score(&gaze, &self.config);
        let closure = eye_closure_factor(avg_ear, self.calibration.baseline_ear(), &self.config);
        let raw_eye = direction * closure;
        let movement_penalty = self.movement.observe(gaze, &self.config);
        let eye_score = (raw_eye - movement_penalty).max(0.0);
        self.totals.total_eye_score += eye_score;

        // Head channel: only when an orientation matrix is present.
        let head_score = observation
            .transform_matrix
            .as_deref()
            .and_then(euler_from_matrix)
            .map(|angles| head_posture_score(&angles, &self.config));
        match head_score {
            Some(head) => self.totals.total_head_score += head,
            None => tracing::debug!("orientation matrix missing; head channel skipped this frame"),
        }

        // Hints reflect the frame's scores before the movement penalty.
        let feedback = advise(raw_eye, head_score, &self.config);

        self.report(true, face_forward, Some(eye_score), head_score, feedback)
    }

    fn process_faceless_frame(&mut self) -> FrameReport {
        // Once calibrated, an absent face is a zero-contribution scored
        // frame: the denominator grows while the totals stand still. During
        // calibration the frame counts toward nothing else.
        let scores = if self.calibration.is_calibrated() {
            (Some(0.0), Some(0.0))
        } else {
            (None, None)
        };
        self.report(false, None, scores.0, scores.1, Vec::new())
    }

    fn report(
        &self,
        face_detected: bool,
        face_forward: Option<bool>,
        frame_eye_score: Option<f32>,
        frame_head_score: Option<f32>,
        feedback: Vec<FeedbackHint>,
    ) -> FrameReport {
        FrameReport {
            phase: self.phase(),
            face_detected,
            face_forward,
            eyewear_detected: self.eyewear,
            frame_eye_score,
            frame_head_score,
            percentages: self.percentages(),
            feedback,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        if self.calibration.is_calibrated() {
            EnginePhase::Scoring
        } else {
            EnginePhase::Calibrating {
                frames_observed: self.calibration.frames_observed(),
                frames_required: self.calibration.window(),
            }
        }
    }

    /// Current running averages. All zeros before the first processed frame
    /// (the denominator guard; no NaN ever escapes).
    pub fn percentages(&self) -> SessionPercentages {
        if self.totals.total_frames == 0 {
            return SessionPercentages::zero();
        }
        let frames = self.totals.total_frames as f32;
        let eye_avg = self.totals.total_eye_score / frames;
        let head_avg = self.totals.total_head_score / frames;
        let overall =
            eye_avg * self.weights.eye_contact + head_avg * self.weights.head_posture;
        SessionPercentages {
            eye_contact: eye_avg * 100.0,
            head_posture: head_avg * 100.0,
            overall: overall * 100.0,
        }
    }
}

/// A landmark sequence shorter than the mesh contract cannot be indexed
/// anatomically; treat it as a missing face rather than panicking.
fn valid_landmarks(landmarks: Option<&[Landmark]>) -> Option<&[Landmark]> {
    match landmarks {
        Some(lms) if lms.len() >= mesh::LANDMARK_COUNT => Some(lms),
        Some(lms) => {
            tracing::warn!(
                count = lms.len(),
                required = mesh::LANDMARK_COUNT,
                "landmark sequence too short; treating frame as missing face"
            );
            None
        }
        None => None,
    }
}
