//! Coaching feedback: a pure score-to-hint mapping plus a display-window
//! rate limiter for presentation layers.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::EngineConfig;

/// A coaching hint derived from the current frame's channel scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedbackHint {
    LookAtCamera,
    FaceCamera,
}

impl FeedbackHint {
    pub fn message(&self) -> &'static str {
        match self {
            FeedbackHint::LookAtCamera => "Look directly at the camera",
            FeedbackHint::FaceCamera => "Face the camera directly",
        }
    }
}

impl fmt::Display for FeedbackHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Map the current frame's scores to an ordered hint list.
///
/// `head_score` is `None` when the head channel was skipped for the frame
/// (missing orientation matrix); no posture hint fires in that case.
pub fn advise(eye_score: f32, head_score: Option<f32>, config: &EngineConfig) -> Vec<FeedbackHint> {
    let mut hints = Vec::new();
    if eye_score < config.eye_feedback_threshold {
        hints.push(FeedbackHint::LookAtCamera);
    }
    if let Some(head) = head_score {
        if head < config.head_feedback_threshold {
            hints.push(FeedbackHint::FaceCamera);
        }
    }
    hints
}

/// Holds the most recent non-empty hint set for a fixed display window.
///
/// A new non-empty submission replaces the current display and restarts the
/// window; empty submissions leave the current display to expire on its own.
/// Callers pass `now` explicitly so display timing stays deterministic under
/// test.
#[derive(Debug)]
pub struct FeedbackPresenter {
    ttl: Duration,
    hints: Vec<FeedbackHint>,
    shown_at: Option<Instant>,
}

impl FeedbackPresenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            hints: Vec::new(),
            shown_at: None,
        }
    }

    pub fn submit(&mut self, hints: Vec<FeedbackHint>, now: Instant) {
        if hints.is_empty() {
            return;
        }
        self.hints = hints;
        self.shown_at = Some(now);
    }

    /// The hints currently on display, if the window has not expired.
    pub fn active(&self, now: Instant) -> Option<&[FeedbackHint]> {
        let shown_at = self.shown_at?;
        if now.duration_since(shown_at) < self.ttl {
            Some(&self.hints)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.hints.clear();
        self.shown_at = None;
    }
}
