//! Binomial approximation of the hypergeometric distribution
//!
//! Drawing `n` input genes from a genome of `N` genes, of which `K` belong to
//! a pathway, follows the hypergeometric distribution. As long as `n` is small
//! compared to `N`, the binomial distribution with `p = K / N` is a close
//! approximation and much cheaper to evaluate.
use std::cmp;

use crate::f64_from_u64;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Binomial {
    trials: u64,
    p: f64,
}

impl Binomial {
    /// Constructs a binomial distribution of `trials` draws from
    /// a `population` that contains `successes`
    ///
    /// The success probability `successes / population` is clamped into `[0, 1]`.
    /// An empty population has a success probability of `0`.
    pub fn from_counts(successes: u64, population: u64, trials: u64) -> Self {
        let p = if population == 0 {
            0.0
        } else {
            (f64_from_u64(successes) / f64_from_u64(population)).clamp(0.0, 1.0)
        };
        Self { trials, p }
    }

    /// The number of draws (n)
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// The success probability (p)
    pub fn p(&self) -> f64 {
        self.p
    }

    /// The probability of exactly `k` successes
    ///
    /// # Formula
    ///
    /// ```text
    /// (n choose k) * p^k * (1-p)^(n-k)
    /// ```
    ///
    /// If `(n choose k)` overflows `f64`, the calculation is done in log space.
    pub fn pmf(&self, k: u64) -> f64 {
        if k > self.trials {
            return 0.0;
        }
        let failures = self.trials - k;
        let coefficient = binomial_coefficient(self.trials, k);
        if coefficient.is_finite() {
            coefficient * self.p.powf(f64_from_u64(k)) * (1.0 - self.p).powf(f64_from_u64(failures))
        } else {
            self.ln_pmf(k).exp()
        }
    }

    /// The natural logarithm of [`Binomial::pmf`]
    fn ln_pmf(&self, k: u64) -> f64 {
        ln_binomial_coefficient(self.trials, k)
            + f64_from_u64(k) * self.p.ln()
            + f64_from_u64(self.trials - k) * (1.0 - self.p).ln()
    }

    /// The factor between `pmf(k + 1)` and `pmf(k)`
    fn ratio(&self, k: u64) -> f64 {
        f64_from_u64(self.trials - k) / f64_from_u64(k + 1) * self.p / (1.0 - self.p)
    }

    /// The probability of `k` or more successes
    ///
    /// This is the survival function including `k`, i.e. `sf(k - 1)`.
    /// The result is clamped into `[0, 1]` to remove floating point overshoot.
    ///
    /// Only `pmf(k)` is calculated directly, all further terms of the tail
    /// follow from the recurrence `pmf(i + 1) = pmf(i) * ratio(i)`. If `pmf(k)`
    /// is too small for `f64`, the tail is walked in log space until the
    /// terms become representable.
    pub fn at_least(&self, k: u64) -> f64 {
        if k > self.trials {
            return 0.0;
        }
        if k == 0 || self.p >= 1.0 {
            return 1.0;
        }
        if self.p <= 0.0 {
            return 0.0;
        }
        let first = self.pmf(k);
        let tail = if first >= f64::MIN_POSITIVE {
            self.tail_from(k, first)
        } else {
            self.ln_tail_from(k)
        };
        tail.clamp(0.0, 1.0)
    }

    /// Sums `pmf(start..=n)`, given `pmf(start)`
    fn tail_from(&self, start: u64, first: f64) -> f64 {
        let mut term = first;
        let mut sum = first;
        for i in start..self.trials {
            let ratio = self.ratio(i);
            term *= ratio;
            sum += term;
            // terms only decrease after the mode
            if ratio < 1.0 && term <= sum * f64::EPSILON {
                break;
            }
        }
        sum
    }

    /// Walks the tail in log space until a term is representable
    fn ln_tail_from(&self, start: u64) -> f64 {
        let mut ln_term = self.ln_pmf(start);
        for i in start..=self.trials {
            let term = ln_term.exp();
            if term >= f64::MIN_POSITIVE {
                return self.tail_from(i, term);
            }
            if i == self.trials || self.ratio(i) < 1.0 {
                return 0.0;
            }
            ln_term += self.ratio(i).ln();
        }
        0.0
    }
}

/// Computes the binomial coefficient `n choose k`
///
/// Uses the multiplicative formula over `min(k, n - k)` factors,
/// which keeps the number of floating point operations and the
/// accumulated rounding error minimal.
///
/// # Remarks
///
/// Returns `0.0` if `k > n` and `f64::INFINITY` on overflow
pub fn binomial_coefficient(n: u64, k: u64) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = cmp::min(k, n - k);
    (1..=k).fold(1.0, |acc, i| {
        acc * f64_from_u64(n - k + i) / f64_from_u64(i)
    })
}

/// Computes the natural logarithm of `n choose k` with the multiplicative formula
///
/// # Remarks
///
/// Returns `f64::NEG_INFINITY` if `k > n`
pub fn ln_binomial_coefficient(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    let k = cmp::min(k, n - k);
    (1..=k).fold(0.0, |acc, i| {
        acc + (f64_from_u64(n - k + i) / f64_from_u64(i)).ln()
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use statrs::distribution::{Binomial as StatrsBinomial, DiscreteCDF};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-10 * b.abs().max(1.0)
    }

    #[test]
    fn coefficient() {
        assert!((binomial_coefficient(5, 0) - 1.0).abs() < f64::EPSILON);
        assert!((binomial_coefficient(5, 5) - 1.0).abs() < f64::EPSILON);
        assert!((binomial_coefficient(5, 2) - 10.0).abs() < f64::EPSILON);
        assert!((binomial_coefficient(5, 3) - 10.0).abs() < f64::EPSILON);
        assert!((binomial_coefficient(52, 5) - 2_598_960.0).abs() < f64::EPSILON);
        assert!(binomial_coefficient(3, 4).abs() < f64::EPSILON);
    }

    #[test]
    fn coefficient_matches_statrs() {
        for (n, k) in [(10, 3), (100, 50), (500, 7), (1000, 999), (60, 30)] {
            let expected = statrs::function::factorial::binomial(n, k);
            assert!(close(binomial_coefficient(n, k), expected), "{n} choose {k}");
            assert!(
                (ln_binomial_coefficient(n, k) - expected.ln()).abs() < 1e-9,
                "ln {n} choose {k}"
            );
        }
    }

    #[test]
    fn coefficient_overflow() {
        assert!(binomial_coefficient(2000, 1000).is_infinite());
        assert!(ln_binomial_coefficient(2000, 1000).is_finite());
        assert!(ln_binomial_coefficient(3, 4).is_infinite());
    }

    #[test]
    fn from_counts() {
        let binom = Binomial::from_counts(100, 20_000, 10);
        assert!((binom.p() - 0.005).abs() < f64::EPSILON);
        assert_eq!(binom.trials(), 10);

        let binom = Binomial::from_counts(30_000, 20_000, 10);
        assert!((binom.p() - 1.0).abs() < f64::EPSILON);

        let binom = Binomial::from_counts(10, 0, 10);
        assert!(binom.p().abs() < f64::EPSILON);
    }

    #[test]
    fn at_least_matches_statrs() {
        for (successes, trials, k) in [(68, 1, 1), (100, 25, 2), (300, 50, 4), (1000, 80, 10)] {
            let binom = Binomial::from_counts(successes, 20_000, trials);
            let reference = StatrsBinomial::new(binom.p(), trials).unwrap();
            // sf(x) is "more than x", we want "x or more"
            let expected = reference.sf(k - 1);
            assert!(
                close(binom.at_least(k), expected),
                "{} vs {}",
                binom.at_least(k),
                expected
            );
        }
    }

    #[test]
    fn at_least_edges() {
        let binom = Binomial::from_counts(100, 20_000, 10);
        assert!((binom.at_least(0) - 1.0).abs() < 1e-12);
        assert!(binom.at_least(11).abs() < f64::EPSILON);

        let empty = Binomial::from_counts(100, 20_000, 0);
        assert!(empty.at_least(1).abs() < f64::EPSILON);

        let certain = Binomial::from_counts(20_000, 20_000, 5);
        assert!((certain.at_least(5) - 1.0).abs() < f64::EPSILON);

        let impossible = Binomial::from_counts(0, 20_000, 5);
        assert!(impossible.at_least(1).abs() < f64::EPSILON);
    }

    #[test]
    fn large_sample_matches_statrs() {
        for (successes, trials, k) in [(200, 5000, 60), (200, 5000, 30), (1500, 8000, 700)] {
            let binom = Binomial::from_counts(successes, 20_000, trials);
            let reference = StatrsBinomial::new(binom.p(), trials).unwrap();
            let expected = reference.sf(k - 1);
            let pvalue = binom.at_least(k);
            assert!(
                (pvalue - expected).abs() <= 1e-7 * expected.max(1e-300),
                "{trials} / {k}: {pvalue} vs {expected}"
            );
        }
    }

    #[test]
    fn tail_with_underflowing_first_term() {
        // pmf(1) is far below f64::MIN_POSITIVE
        let binom = Binomial::from_counts(10_000, 20_000, 5000);
        assert!(binom.pmf(1) < f64::MIN_POSITIVE);
        assert!((binom.at_least(1) - 1.0).abs() < 1e-12);

        let reference = StatrsBinomial::new(0.5, 5000).unwrap();
        assert!((binom.at_least(2400) - reference.sf(2399)).abs() < 1e-10);

        assert!(binom.at_least(4000) < 1e-300);
    }

    #[test]
    fn large_sample_is_finite() {
        let binom = Binomial::from_counts(500, 20_000, 3000);
        let pvalue = binom.at_least(100);
        assert!(pvalue.is_finite());
        assert!((0.0..=1.0).contains(&pvalue));
    }
}
