//! Landmark geometry: the face-mesh index contract and the pure ratio/zone
//! computations built on top of it.
//!
//! All coordinates are normalized to the frame (0..1 on each axis). Landmark
//! sequences are ordered and index-stable across frames for a given detector
//! configuration, so anatomical features are addressed by fixed index.

use serde::{Deserialize, Serialize};

/// Guard against division by a degenerate (near-zero) span.
pub(crate) const DIV_EPSILON: f32 = 1e-6;

/// Fixed anatomical indices into the face-mesh landmark sequence
/// (MediaPipe FaceLandmarker with iris refinement).
pub mod mesh {
    /// Length of a refined face-mesh landmark sequence.
    pub const LANDMARK_COUNT: usize = 478;

    /// Left eye: outer corner, inner corner, upper lid, lower lid.
    pub const LEFT_EYE: [usize; 4] = [33, 133, 159, 145];
    /// Right eye: inner corner, outer corner, upper lid, lower lid.
    pub const RIGHT_EYE: [usize; 4] = [362, 263, 386, 374];

    /// Center point of the left iris.
    pub const LEFT_IRIS_CENTER: usize = 468;
    /// Center point of the right iris.
    pub const RIGHT_IRIS_CENTER: usize = 473;
}

/// A single normalized landmark point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the face center; unused by the scoring geometry,
    /// carried through so detector output deserializes losslessly.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance in the landmark plane (z ignored).
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned extrema of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Horizontal gaze classification within the eye's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalZone {
    Left,
    Center,
    Right,
}

/// Vertical gaze classification within the eye's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalZone {
    Up,
    Center,
    Down,
}

/// Coarse iris position within one eye's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazeZone {
    pub horizontal: HorizontalZone,
    pub vertical: VerticalZone,
}

impl GazeZone {
    pub fn centered() -> Self {
        Self {
            horizontal: HorizontalZone::Center,
            vertical: VerticalZone::Center,
        }
    }

    pub fn is_centered(&self) -> bool {
        self.horizontal == HorizontalZone::Center && self.vertical == VerticalZone::Center
    }
}

/// Per-frame gaze classification for both eyes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazePair {
    pub left: GazeZone,
    pub right: GazeZone,
}

impl GazePair {
    pub fn centered() -> Self {
        Self {
            left: GazeZone::centered(),
            right: GazeZone::centered(),
        }
    }
}

/// Eye aspect ratio: vertical lid distance over twice the corner-to-corner
/// span. A proxy for how open the eye is; compared against a calibrated
/// per-session baseline rather than an absolute threshold.
///
/// `eye` lists corner, corner, upper lid, lower lid indices. The caller
/// guarantees the indices are in range for `landmarks`.
pub fn eye_aspect_ratio(landmarks: &[Landmark], eye: &[usize; 4]) -> f32 {
    let [c1, c2, lid_top, lid_bottom] = eye.map(|i| landmarks[i]);
    let horizontal = c1.distance(&c2);
    let vertical = lid_top.distance(&lid_bottom);
    vertical / (2.0 * horizontal + DIV_EPSILON)
}

/// Bounding box over the landmarks selected by `indices`. `indices` must be
/// non-empty and in range.
pub fn bounds_of(landmarks: &[Landmark], indices: &[usize]) -> Bounds {
    let first = landmarks[indices[0]];
    let mut b = Bounds {
        min_x: first.x,
        max_x: first.x,
        min_y: first.y,
        max_y: first.y,
    };
    for &i in &indices[1..] {
        let p = landmarks[i];
        b.min_x = b.min_x.min(p.x);
        b.max_x = b.max_x.max(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_y = b.max_y.max(p.y);
    }
    b
}

/// Bounding box over the full (non-empty) landmark sequence.
pub fn face_bounds(landmarks: &[Landmark]) -> Bounds {
    let mut b = Bounds {
        min_x: f32::MAX,
        max_x: f32::MIN,
        min_y: f32::MAX,
        max_y: f32::MIN,
    };
    for p in landmarks {
        b.min_x = b.min_x.min(p.x);
        b.max_x = b.max_x.max(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_y = b.max_y.max(p.y);
    }
    b
}

/// Width/height ratio of the full face bounding box. Roughly 1.0 for a
/// frontal face; narrows as the head turns.
pub fn face_aspect_ratio(landmarks: &[Landmark]) -> f32 {
    let b = face_bounds(landmarks);
    b.width() / (b.height() + DIV_EPSILON)
}

/// Whether the face bounding box ratio falls strictly inside the given band.
/// Surfaced as a signal only; scoring does not gate on it.
pub fn is_face_forward(landmarks: &[Landmark], ratio_min: f32, ratio_max: f32) -> bool {
    let ratio = face_aspect_ratio(landmarks);
    ratio > ratio_min && ratio < ratio_max
}

/// Classify an iris position within its eye's bounding box.
///
/// Each axis is split into quarters: the outer quarters classify as the
/// extremes, the middle half as center. Boundary points exactly on a quarter
/// line classify as center (strict inequality on the extremes), so the
/// classification is total with no gaps.
pub fn iris_zone(iris: &Landmark, eye: &Bounds) -> GazeZone {
    let x_quarter = eye.width() / 4.0;
    let y_quarter = eye.height() / 4.0;
    let dx = iris.x - eye.min_x;
    let dy = iris.y - eye.min_y;

    let horizontal = if dx < x_quarter {
        HorizontalZone::Left
    } else if dx > 3.0 * x_quarter {
        HorizontalZone::Right
    } else {
        HorizontalZone::Center
    };

    let vertical = if dy < y_quarter {
        VerticalZone::Up
    } else if dy > 3.0 * y_quarter {
        VerticalZone::Down
    } else {
        VerticalZone::Center
    };

    GazeZone {
        horizontal,
        vertical,
    }
}

/// Classify both irises against their eye bounding boxes.
pub fn detect_gaze(landmarks: &[Landmark]) -> GazePair {
    let left_bounds = bounds_of(landmarks, &mesh::LEFT_EYE);
    let right_bounds = bounds_of(landmarks, &mesh::RIGHT_EYE);
    GazePair {
        left: iris_zone(&landmarks[mesh::LEFT_IRIS_CENTER], &left_bounds),
        right: iris_zone(&landmarks[mesh::RIGHT_IRIS_CENTER], &right_bounds),
    }
}
