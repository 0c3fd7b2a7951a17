//! Head orientation decoding from the detector's facial transformation matrix.

use serde::Serialize;

/// Minimum flat-matrix length consumed by the decoder (indices 0, 4, 8, 9, 10).
pub const MATRIX_MIN_LEN: usize = 11;

/// Decomposed head rotation relative to the camera, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EulerAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Decode pitch/yaw/roll from a flat column-major 4x4 transformation matrix.
///
/// Trusts that the input encodes a valid rotation; no orthonormality check
/// is performed. Returns `None` when the slice is too short to index.
pub fn euler_from_matrix(m: &[f32]) -> Option<EulerAngles> {
    if m.len() < MATRIX_MIN_LEN {
        return None;
    }
    let pitch = m[9].atan2(m[10]);
    let yaw = (-m[8]).atan2((m[9] * m[9] + m[10] * m[10]).sqrt());
    let roll = m[4].atan2(m[0]);
    Some(EulerAngles {
        pitch: pitch.to_degrees(),
        yaw: yaw.to_degrees(),
        roll: roll.to_degrees(),
    })
}
