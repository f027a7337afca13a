//! Keyframe sampling.
//!
//! Segment values are blended linearly (positions) or by shortest-arc slerp
//! (rotations). Times before the first key hold the first value; times after
//! the last key hold the last value.

use rigsync_api_core::blend::blend_values;
use rigsync_api_core::Value;

use crate::data::{Keyframe, Track};

/// Find the segment [i, i+1] containing time t and the local fraction.
/// Returns (i, i, 0) when t is outside the keyed range.
fn find_segment(keys: &[Keyframe], t: f32) -> (usize, usize, f32) {
    let n = keys.len();
    if n == 0 || n == 1 || t <= keys[0].time {
        return (0, 0, 0.0);
    }
    if t >= keys[n - 1].time {
        return (n - 1, n - 1, 0.0);
    }
    // Keys are sorted; binary search for the first key after t.
    let hi = keys.partition_point(|k| k.time <= t).clamp(1, n - 1);
    let lo = hi - 1;
    let t0 = keys[lo].time;
    let t1 = keys[hi].time;
    let denom = (t1 - t0).max(f32::EPSILON);
    (lo, hi, ((t - t0) / denom).clamp(0.0, 1.0))
}

/// Sample a track at clip time `t` (seconds). `None` for a track without keys.
pub fn sample_track(track: &Track, t: f32) -> Option<Value> {
    let keys = &track.keyframes;
    if keys.is_empty() {
        return None;
    }
    let (i0, i1, lt) = find_segment(keys, t);
    if i0 == i1 {
        return Some(keys[i0].value.clone());
    }
    Some(blend_values(&keys[i0].value, &keys[i1].value, lt))
}

/// Wrap `t` into `[0, duration)`; zero-length clips always sample at 0.
pub fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}
