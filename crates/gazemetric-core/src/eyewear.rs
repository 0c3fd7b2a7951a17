//! Eyewear confound detection from blend-shape intensities.
//!
//! Lens reflections degrade iris tracking, so when glasses are detected the
//! channel weights shift trust from eye contact toward head posture.

use serde::{Deserialize, Serialize};

/// Blend-shape category names that indicate eyewear.
pub const EYEWEAR_CATEGORIES: [&str; 2] = ["eyeGlasses", "darkGlasses"];

/// A named blend-shape intensity from the detector. Sparse: categories the
/// detector did not emit are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendShape {
    pub category_name: String,
    pub score: f32,
}

/// Relative weight of the two score channels. Sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub eye_contact: f32,
    pub head_posture: f32,
}

impl ScoreWeights {
    pub fn sum(&self) -> f32 {
        self.eye_contact + self.head_posture
    }
}

/// Whether any eyewear category exceeds `threshold`. Absent categories score
/// zero; an empty set therefore never reports eyewear.
pub fn has_eyewear(blend_shapes: &[BlendShape], threshold: f32) -> bool {
    EYEWEAR_CATEGORIES.iter().any(|category| {
        blend_shapes
            .iter()
            .find(|b| b.category_name == *category)
            .map(|b| b.score)
            .unwrap_or(0.0)
            > threshold
    })
}
