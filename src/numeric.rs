//! Epsilon-tolerant float predicates.
//!
//! Every probability or expected-time comparison in the engine goes
//! through these, never through raw `<`/`>`. Near-ties otherwise flap
//! between runs once convolution round-off accumulates.

/// Comparison tolerance for probabilities and expected times.
pub const EPSILON: f64 = 1e-6;

#[inline]
pub fn le(x: f64, y: f64) -> bool {
    x - y <= EPSILON
}

#[inline]
pub fn lt(x: f64, y: f64) -> bool {
    x - y < -EPSILON
}

#[inline]
pub fn eq(x: f64, y: f64) -> bool {
    (x - y).abs() <= EPSILON
}

#[inline]
pub fn neq(x: f64, y: f64) -> bool {
    !eq(x, y)
}

#[inline]
pub fn gt(x: f64, y: f64) -> bool {
    lt(y, x)
}

#[inline]
pub fn ge(x: f64, y: f64) -> bool {
    le(y, x)
}
