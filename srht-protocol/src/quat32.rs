//! Smallest-three unit-quaternion compression
//!
//! Compresses a unit quaternion to 32 bits by dropping the component with
//! the largest magnitude (recoverable from the unit-length constraint) and
//! quantizing the remaining three to 10 bits each.
//!
//! # Bit layout
//!
//! ```text
//! bit  0..10   first retained component  (10 bits)
//! bit 10..20   second retained component (10 bits)
//! bit 20..30   third retained component  (10 bits)
//! bit 30..32   index of the dropped component (2 bits)
//! ```
//!
//! The layout is produced with explicit shifts and masks, so the encoded
//! word is identical on every platform and compiler.
//!
//! # Precision
//!
//! Once the largest-magnitude component is dropped, each retained component
//! lies in [-1/√2, 1/√2]. Quantizing that range to 10 bits with rounding
//! bounds the per-axis error at half a quantization step, about 6.9e-4.

use std::f32::consts::SQRT_2;

const RSQRT_2: f32 = 1.0 / SQRT_2;
/// Largest 10-bit code
const MAX_CODE: f32 = 1023.0;
const FIELD_MASK: u32 = 0x3ff;

/// Affine map [-1/√2, 1/√2] -> [0, 1023]
///
/// Clamped so an out-of-range component can never overflow its 10-bit
/// field into a neighbour.
#[inline]
fn quantize(v: f32) -> u32 {
    ((v * SQRT_2 + 1.0) * 0.5 * MAX_CODE).round().clamp(0.0, MAX_CODE) as u32
}

/// Inverse of [`quantize`]
#[inline]
fn dequantize(code: u32) -> f32 {
    ((code as f32) / MAX_CODE * 2.0 - 1.0) * RSQRT_2
}

/// Index of the component with the largest squared magnitude.
///
/// First-true evaluation order: on an exact tie the smaller index wins
/// (0 beats 1, 1 beats 2, 2 beats 3).
#[inline]
fn drop_index(x2: f32, y2: f32, z2: f32, w2: f32) -> u32 {
    if x2 >= y2 && x2 >= z2 && x2 >= w2 {
        0
    } else if y2 >= z2 && y2 >= w2 {
        1
    } else if z2 >= w2 {
        2
    } else {
        3
    }
}

/// Sign multiplier, treating exactly zero as positive.
#[inline]
fn sign(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

/// Compress a unit quaternion to 32 bits.
///
/// The retained components are multiplied by the sign of the dropped one,
/// which is valid because a quaternion and its negation represent the same
/// rotation. Deterministic and total: every input produces a code, but only
/// unit quaternions round-trip meaningfully.
pub fn pack(x: f32, y: f32, z: f32, w: f32) -> u32 {
    let drop = drop_index(x * x, y * y, z * z, w * w);

    let (a0, a1, a2) = match drop {
        0 => {
            let s = sign(x);
            (y * s, z * s, w * s)
        }
        1 => {
            let s = sign(y);
            (x * s, z * s, w * s)
        }
        2 => {
            let s = sign(z);
            (x * s, y * s, w * s)
        }
        _ => {
            let s = sign(w);
            (x * s, y * s, z * s)
        }
    };

    quantize(a0) | (quantize(a1) << 10) | (quantize(a2) << 20) | (drop << 30)
}

/// Reconstruct the four components from a [`pack`]ed code.
///
/// The dropped component is recovered as `sqrt(1 - Σ squares)`, always
/// non-negative. The input must be a genuine `pack` output for a unit
/// quaternion; a corrupted code can drive the square-root argument negative
/// and yield NaN. This is not guarded.
pub fn unpack(code: u32) -> [f32; 4] {
    let a0 = dequantize(code & FIELD_MASK);
    let a1 = dequantize((code >> 10) & FIELD_MASK);
    let a2 = dequantize((code >> 20) & FIELD_MASK);
    let dropped = (1.0 - (a0 * a0 + a1 * a1 + a2 * a2)).sqrt();

    match code >> 30 {
        0 => [dropped, a0, a1, a2],
        1 => [a0, dropped, a1, a2],
        2 => [a0, a1, dropped, a2],
        _ => [a0, a1, a2, dropped],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maximum per-axis quantization error: half a 10-bit step over [-1/√2, 1/√2]
    const MAX_ERROR: f32 = 6.92e-4;

    fn normalize(q: [f32; 4]) -> [f32; 4] {
        let len = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
        [q[0] / len, q[1] / len, q[2] / len, q[3] / len]
    }

    /// Compare up to overall sign: q and -q are the same rotation.
    ///
    /// The reconstructed (dropped) axis accumulates the retained axes'
    /// errors through the unit-length constraint, so the tolerance here is
    /// looser than the per-retained-axis bound.
    fn assert_same_rotation(a: [f32; 4], b: [f32; 4]) {
        let dot: f32 = (0..4).map(|i| a[i] * b[i]).sum();
        let s = if dot < 0.0 { -1.0 } else { 1.0 };
        for i in 0..4 {
            let err = (a[i] - s * b[i]).abs();
            assert!(
                err <= 4.0 * MAX_ERROR,
                "component {} off by {} (a={:?} b={:?})",
                i,
                err,
                a,
                b
            );
        }
    }

    #[test]
    fn test_identity_roundtrip() {
        let q = [0.0, 0.0, 0.0, 1.0];
        assert_same_rotation(q, unpack(pack(q[0], q[1], q[2], q[3])));
    }

    #[test]
    fn test_roundtrip_various_rotations() {
        // Hand-picked unit quaternions covering each drop slot and both signs
        let cases = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, -1.0],
            [0.5, 0.5, 0.5, 0.5],
            [-0.5, 0.5, -0.5, 0.5],
            [0.7071068, 0.7071068, 0.0, 0.0],
            [0.1, 0.2, 0.3, 0.9],
            [-0.3, 0.1, -0.8, 0.5],
            [0.36, -0.48, 0.6, -0.53],
        ];
        for case in cases {
            let q = normalize(case);
            let restored = unpack(pack(q[0], q[1], q[2], q[3]));
            assert_same_rotation(q, restored);
        }
    }

    #[test]
    fn test_pack_is_deterministic() {
        let q = normalize([0.1, -0.2, 0.3, 0.9]);
        let a = pack(q[0], q[1], q[2], q[3]);
        let b = pack(q[0], q[1], q[2], q[3]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_drop_selects_largest_component() {
        // w dominates
        let q = normalize([0.1, 0.2, 0.3, 0.9]);
        assert_eq!(pack(q[0], q[1], q[2], q[3]) >> 30, 3);
        // y dominates
        let q = normalize([0.1, -0.9, 0.3, 0.2]);
        assert_eq!(pack(q[0], q[1], q[2], q[3]) >> 30, 1);
    }

    #[test]
    fn test_drop_tie_break_prefers_smaller_index() {
        // All squared magnitudes equal: index 0 wins
        assert_eq!(pack(0.5, 0.5, 0.5, 0.5) >> 30, 0);
        // x and w tie, x wins
        assert_eq!(pack(0.7071068, 0.0, 0.0, 0.7071068) >> 30, 0);
        // y and z tie, y wins
        assert_eq!(pack(0.0, 0.7071068, 0.7071068, 0.0) >> 30, 1);
    }

    #[test]
    fn test_pack_unit_x_encodes_midpoint_zeros() {
        let code = pack(1.0, 0.0, 0.0, 0.0);
        assert_eq!(code >> 30, 0);
        // Affine-mapped zero: round((0*sqrt2 + 1) * 0.5 * 1023) = 512
        assert_eq!(code & FIELD_MASK, 512);
        assert_eq!((code >> 10) & FIELD_MASK, 512);
        assert_eq!((code >> 20) & FIELD_MASK, 512);
    }

    #[test]
    fn test_retained_axes_within_quantization_bound() {
        let q = normalize([0.36, -0.48, 0.6, -0.53]);
        let code = pack(q[0], q[1], q[2], q[3]);
        let restored = unpack(code);
        let drop = (code >> 30) as usize;

        // Sign-align: pack normalizes away the dropped component's sign
        let s = if q[drop] < 0.0 { -1.0 } else { 1.0 };
        for i in 0..4 {
            if i == drop {
                continue;
            }
            let err = (q[i] * s - restored[i]).abs();
            assert!(err <= MAX_ERROR, "axis {} off by {}", i, err);
        }
    }

    #[test]
    fn test_negated_quaternion_same_code() {
        // Sign normalization folds q and -q onto the same code
        let q = normalize([0.1, 0.2, 0.3, 0.9]);
        let a = pack(q[0], q[1], q[2], q[3]);
        let b = pack(-q[0], -q[1], -q[2], -q[3]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unpacked_is_unit_length() {
        let q = normalize([0.4, -0.3, 0.2, 0.84]);
        let restored = unpack(pack(q[0], q[1], q[2], q[3]));
        let len: f32 = restored.iter().map(|c| c * c).sum::<f32>().sqrt();
        assert!((len - 1.0).abs() < 2e-3, "length {}", len);
    }
}
