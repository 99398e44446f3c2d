//! Discretized travel-time distributions.
//!
//! A `Distribution` is a probability law over a fixed uniform grid: the
//! i-th support point is `i * delta` and the grid never changes for a
//! given instance. Both the probability mass function and its running
//! sum are kept so that convolution and dominance checks read straight
//! from arrays.

use crate::numeric::{eq, ge, gt, le};

/// Travel-time law on the instance's uniform support grid.
///
/// Invariants: `cdf` is non-decreasing, `cdf[last] == 1` within
/// tolerance, and `pdf[i] == cdf[i] - cdf[i-1]` for `i > 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    delta: u32,
    pdf: Vec<f64>,
    cdf: Vec<f64>,
}

impl Distribution {
    /// The "unreachable" placeholder: all mass on the last support
    /// point. Identity for pointwise-max aggregation.
    pub fn infinite(size: usize, delta: u32) -> Distribution {
        let mut pdf = vec![0.0; size];
        let mut cdf = vec![0.0; size];
        pdf[size - 1] = 1.0;
        cdf[size - 1] = 1.0;
        Distribution { delta, pdf, cdf }
    }

    /// All mass at time zero. Identity for convolution, used as the
    /// seed distribution of a search origin.
    pub fn zero(size: usize, delta: u32) -> Distribution {
        let mut pdf = vec![0.0; size];
        pdf[0] = 1.0;
        Distribution {
            delta,
            pdf,
            cdf: vec![1.0; size],
        }
    }

    /// Build from a mass function; the running sum is derived.
    pub fn from_pdf(delta: u32, pdf: Vec<f64>) -> Distribution {
        let mut acc = 0.0;
        let cdf = pdf
            .iter()
            .map(|p| {
                acc += p;
                acc
            })
            .collect();
        Distribution { delta, pdf, cdf }
    }

    pub fn from_parts(delta: u32, pdf: Vec<f64>, cdf: Vec<f64>) -> Distribution {
        debug_assert_eq!(pdf.len(), cdf.len());
        Distribution { delta, pdf, cdf }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.pdf.len()
    }

    #[inline]
    pub fn delta(&self) -> u32 {
        self.delta
    }

    /// Support value of the i-th grid point.
    #[inline]
    pub fn support(&self, index: usize) -> u32 {
        index as u32 * self.delta
    }

    #[inline]
    pub fn pdf_at(&self, index: usize) -> f64 {
        self.pdf[index]
    }

    #[inline]
    pub fn cdf_at(&self, index: usize) -> f64 {
        self.cdf[index]
    }

    #[inline]
    pub fn set_cdf_at(&mut self, index: usize, value: f64) {
        debug_assert!(le(0.0, value) && le(value, 1.0));
        self.cdf[index] = value;
    }

    #[inline]
    pub fn set_pdf_at(&mut self, index: usize, value: f64) {
        debug_assert!(le(0.0, value) && le(value, 1.0));
        self.pdf[index] = value;
    }

    pub fn is_infinite(&self) -> bool {
        self.size() > 1
            && self
                .cdf
                .iter()
                .position(|&v| eq(v, 1.0))
                .is_some_and(|i| i == self.size() - 1)
    }

    pub fn make_infinite(&mut self) {
        self.pdf.fill(0.0);
        self.cdf.fill(0.0);
        if let Some(last) = self.pdf.last_mut() {
            *last = 1.0;
        }
        if let Some(last) = self.cdf.last_mut() {
            *last = 1.0;
        }
    }

    /// Smallest possible realization: support value at the first index
    /// where the running sum leaves zero.
    pub fn min(&self) -> u32 {
        let i = self
            .cdf
            .iter()
            .position(|&v| gt(v, 0.0))
            .unwrap_or(self.size() - 1);
        self.support(i)
    }

    /// Largest possible realization: support value at the first index
    /// where the running sum reaches one.
    pub fn max(&self) -> u32 {
        let i = self
            .cdf
            .iter()
            .position(|&v| eq(v, 1.0))
            .unwrap_or(self.size() - 1);
        self.support(i)
    }

    /// Definition range `max() - min()`, the storage/compute cost proxy
    /// used as edge complexity.
    pub fn range(&self) -> u32 {
        let lo = self
            .cdf
            .iter()
            .position(|&v| gt(v, 0.0))
            .unwrap_or(self.size() - 1);
        let hi = self.cdf[lo..]
            .iter()
            .position(|&v| eq(v, 1.0))
            .map_or(self.size() - 1, |off| lo + off);
        self.support(hi) - self.support(lo)
    }

    /// Expected value over the support grid.
    pub fn esp(&self) -> f64 {
        self.pdf
            .iter()
            .enumerate()
            .map(|(i, p)| f64::from(self.support(i)) * p)
            .sum()
    }

    /// Quantile: smallest support value whose cumulated probability
    /// reaches `alpha`.
    pub fn eval_sup(&self, alpha: f64) -> u32 {
        debug_assert!(ge(alpha, 0.0) && le(alpha, 1.0));
        let i = self
            .cdf
            .iter()
            .position(|&v| le(alpha, v))
            .unwrap_or(self.size() - 1);
        self.support(i)
    }

    /// Truncated discrete convolution of two laws on the shared grid.
    ///
    /// `pdf[t] = sum_{tau<=t} self.pdf[tau] * other.pdf[t-tau]` and the
    /// analogous sum on `self.cdf`. Mass convolved past the grid end is
    /// folded into the last bucket: the final running-sum value is
    /// forced to 1 and the last mass value recomputed from it. Lossy by
    /// construction, not an accident.
    pub fn convolute(&self, other: &Distribution) -> Distribution {
        let n = self.size();
        debug_assert_eq!(n, other.size());
        let mut pdf = Vec::with_capacity(n);
        let mut cdf = Vec::with_capacity(n);
        for t in 0..n {
            let mut probsum_pdf = 0.0;
            let mut probsum_cdf = 0.0;
            for tau in 0..=t {
                probsum_pdf += self.pdf[tau] * other.pdf[t - tau];
                probsum_cdf += self.cdf[tau] * other.pdf[t - tau];
            }
            pdf.push(probsum_pdf);
            cdf.push(probsum_cdf);
        }
        if !eq(cdf[n - 1], 1.0) {
            cdf[n - 1] = 1.0;
            pdf[n - 1] = cdf[n - 1] - cdf[n - 2];
        }
        debug_assert!(eq(cdf[n - 1], 1.0));
        Distribution {
            delta: self.delta,
            pdf,
            cdf,
        }
    }

    /// Pointwise-max merge: afterwards
    /// `self.cdf[t] == max(self.cdf[t], other.cdf[t])` for all `t`,
    /// with the mass function recomputed from adjacent differences.
    pub fn aggregate(&mut self, other: &Distribution) {
        debug_assert_eq!(self.size(), other.size());
        self.cdf[0] = self.cdf[0].max(other.cdf[0]);
        self.pdf[0] = self.cdf[0];
        for t in 1..self.size() {
            self.cdf[t] = self.cdf[t].max(other.cdf[t]);
            self.pdf[t] = self.cdf[t] - self.cdf[t - 1];
        }
    }

    /// First-order stochastic dominance: `self.cdf[t] >= other.cdf[t]`
    /// everywhere and strictly somewhere. Stops early once both sums
    /// have reached one.
    pub fn dominates(&self, other: &Distribution) -> bool {
        let mut strict = false;
        for (mine, theirs) in self.cdf.iter().zip(other.cdf.iter()) {
            if !le(*theirs, *mine) {
                return false;
            }
            if !le(*mine, *theirs) {
                strict = true;
            }
            if eq(*mine, 1.0) && eq(*theirs, 1.0) {
                return strict;
            }
        }
        strict
    }

    /// Weak variant of [`dominates`](Self::dominates): ties everywhere
    /// still count.
    pub fn is_larger_than(&self, other: &Distribution) -> bool {
        for (mine, theirs) in self.cdf.iter().zip(other.cdf.iter()) {
            if !le(*theirs, *mine) {
                return false;
            }
            if eq(*mine, 1.0) && eq(*theirs, 1.0) {
                return true;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::eq;

    fn two_point(delta: u32, p0: f64) -> Distribution {
        Distribution::from_pdf(delta, vec![p0, 1.0 - p0])
    }

    #[test]
    fn from_pdf_builds_consistent_cdf() {
        let d = Distribution::from_pdf(5, vec![0.2, 0.3, 0.5]);
        assert!(eq(d.cdf_at(0), 0.2));
        assert!(eq(d.cdf_at(1), 0.5));
        assert!(eq(d.cdf_at(2), 1.0), "mass must sum to one");
        for t in 1..d.size() {
            assert!(
                eq(d.pdf_at(t), d.cdf_at(t) - d.cdf_at(t - 1)),
                "pdf must match adjacent cdf differences at t={}",
                t
            );
        }
    }

    #[test]
    fn infinite_distribution_shape() {
        let d = Distribution::infinite(4, 5);
        assert!(d.is_infinite());
        assert_eq!(d.min(), 15);
        assert_eq!(d.max(), 15);
        assert_eq!(d.range(), 0);
        let z = Distribution::zero(4, 5);
        assert!(!z.is_infinite());
        assert_eq!(z.min(), 0);
        assert_eq!(z.max(), 0);
    }

    #[test]
    fn convolute_truncates_into_last_bucket() {
        // Two 2-point laws on {0,5}: full convolution would need
        // support point 10, whose mass must fold into bucket 5.
        let a = two_point(5, 0.5);
        let b = two_point(5, 0.5);
        let c = a.convolute(&b);
        assert!(eq(c.pdf_at(0), 0.25));
        assert!(eq(c.cdf_at(0), 0.25));
        assert!(eq(c.cdf_at(1), 1.0), "renormalized tail must reach one");
        assert!(eq(c.pdf_at(1), 0.75));
    }

    #[test]
    fn convolute_with_zero_is_identity() {
        let a = Distribution::from_pdf(5, vec![0.2, 0.3, 0.5]);
        let z = Distribution::zero(3, 5);
        let c = a.convolute(&z);
        for t in 0..a.size() {
            assert!(eq(c.cdf_at(t), a.cdf_at(t)));
        }
    }

    #[test]
    fn aggregate_is_pointwise_max() {
        let mut a = Distribution::from_pdf(5, vec![0.2, 0.3, 0.5]);
        let b = Distribution::from_pdf(5, vec![0.4, 0.0, 0.6]);
        let a0 = a.clone();
        a.aggregate(&b);
        for t in 0..a.size() {
            assert!(eq(a.cdf_at(t), a0.cdf_at(t).max(b.cdf_at(t))));
        }
        for t in 1..a.size() {
            assert!(eq(a.pdf_at(t), a.cdf_at(t) - a.cdf_at(t - 1)));
        }
    }

    #[test]
    fn dominance_is_antisymmetric() {
        let strong = Distribution::from_pdf(5, vec![0.8, 0.1, 0.1]);
        let weak = Distribution::from_pdf(5, vec![0.2, 0.3, 0.5]);
        assert!(strong.dominates(&weak));
        assert!(!weak.dominates(&strong));
        assert!(!strong.dominates(&strong), "dominance must be strict");
        assert!(strong.is_larger_than(&strong));
        assert!(strong.is_larger_than(&weak));
        assert!(!weak.is_larger_than(&strong));
    }

    #[test]
    fn eval_sup_is_quantile() {
        let d = Distribution::from_pdf(5, vec![0.2, 0.3, 0.5]);
        assert_eq!(d.eval_sup(0.0), 0);
        assert_eq!(d.eval_sup(0.2), 0);
        assert_eq!(d.eval_sup(0.4), 5);
        assert_eq!(d.eval_sup(1.0), 10);
        assert!(eq(d.esp(), 0.2 * 0.0 + 0.3 * 5.0 + 0.5 * 10.0));
    }
}
