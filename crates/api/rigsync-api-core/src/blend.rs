//! Blending utilities for joint values.
//! - f32 linear interpolation for floats and vector components
//! - quaternion slerp (shortest-arc)
//! - kind-dispatched blending for `Value`

use crate::value::{Quat, Value, Vec3, QUAT_IDENTITY};

/// Linear interpolation for f32
#[inline]
pub fn lerp_f(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Lerp for fixed-size arrays
pub fn lerp_array<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = lerp_f(a[i], b[i], t);
    }
    out
}

#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    lerp_array(&a, &b, t)
}

#[inline]
fn dot4(a: Quat, b: Quat) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Normalize a quaternion represented as [x,y,z,w]
pub fn normalize_quat(q: Quat) -> Quat {
    let mag = dot4(q, q).sqrt();
    if mag == 0.0 || !mag.is_finite() {
        QUAT_IDENTITY
    } else {
        [q[0] / mag, q[1] / mag, q[2] / mag, q[3] / mag]
    }
}

/// Slerp between two unit quaternions q1, q2.
///
/// `t` is the fraction of the remaining angular distance to close; `t >= 1`
/// returns `q2` exactly and `t <= 0` returns `q1`.
pub fn slerp(q1: Quat, q2: Quat, t: f32) -> Quat {
    if t <= 0.0 {
        return normalize_quat(q1);
    }
    if t >= 1.0 {
        return normalize_quat(q2);
    }

    let qa = normalize_quat(q1);
    let mut qb = normalize_quat(q2);

    let mut dot = dot4(qa, qb);

    // Take the short path.
    if dot < 0.0 {
        qb = [-qb[0], -qb[1], -qb[2], -qb[3]];
        dot = -dot;
    }

    // If quaternions are close, use lerp
    const DOT_THRESHOLD: f32 = 0.9995;
    if dot > DOT_THRESHOLD {
        return normalize_quat(lerp_array(&qa, &qb, t));
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * t;
    let sin_theta = theta.sin();
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = sin_theta / sin_theta_0;

    [
        s0 * qa[0] + s1 * qb[0],
        s0 * qa[1] + s1 * qb[1],
        s0 * qa[2] + s1 * qb[2],
        s0 * qa[3] + s1 * qb[3],
    ]
}

/// Angle in radians between the orientations described by two quaternions.
/// `q` and `-q` describe the same orientation and yield 0.
pub fn quat_angle(a: Quat, b: Quat) -> f32 {
    let a = normalize_quat(a);
    let b = normalize_quat(b);
    // r = conj(a) * b
    let r = [
        a[3] * b[0] - a[0] * b[3] - a[1] * b[2] + a[2] * b[1],
        a[3] * b[1] - a[1] * b[3] - a[2] * b[0] + a[0] * b[2],
        a[3] * b[2] - a[2] * b[3] - a[0] * b[1] + a[1] * b[0],
        a[3] * b[3] + a[0] * b[0] + a[1] * b[1] + a[2] * b[2],
    ];
    let v = (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt();
    2.0 * v.atan2(r[3].abs())
}

/// Blend two Values according to their kinds.
/// Mismatched kinds are not coerced: `b` wins for t >= 0.5, otherwise `a`.
pub fn blend_values(a: &Value, b: &Value, t: f32) -> Value {
    match (a, b) {
        (Value::Float(af), Value::Float(bf)) => Value::Float(lerp_f(*af, *bf, t)),
        (Value::Vec3(aa), Value::Vec3(bb)) => Value::Vec3(lerp_array(aa, bb, t)),
        (Value::Quat(aq), Value::Quat(bq)) => Value::Quat(slerp(*aq, *bq, t)),
        _ => {
            if t < 0.5 {
                a.clone()
            } else {
                b.clone()
            }
        }
    }
}
