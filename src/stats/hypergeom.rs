//! The hypergeometric distribution and its upper tail
//!
//! The survival function is calculated as a discrete sum over the
//! probability mass function in log-space, using the log-binomial
//! coefficients of `statrs`.
use std::cmp;

use statrs::function::factorial::ln_binomial;

use crate::{OraError, OraResult};

/// The hypergeometric distribution
///
/// Describes the number of successes when drawing `draws` items without
/// replacement from a `population` that contains `successes` success states.
///
/// In the overrepresentation analysis, the population is the universe,
/// the successes are the members of a set and the draws are the hits.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hypergeometric {
    population: u64,
    successes: u64,
    draws: u64,
}

impl Hypergeometric {
    /// Constructs a new hypergeometric distribution
    /// with a population (N) of `population`, number
    /// of successes (K) of `successes`, and number of draws
    /// (n) of `draws`
    ///
    /// # Errors
    ///
    /// [`OraError::InvalidInput`] if `successes > population` or `draws > population`
    pub fn new(population: u64, successes: u64, draws: u64) -> OraResult<Hypergeometric> {
        if successes > population || draws > population {
            Err(OraError::InvalidInput(format!(
                "hypergeometric parameters out of range: population {population}, successes {successes}, draws {draws}"
            )))
        } else {
            Ok(Hypergeometric {
                population,
                successes,
                draws,
            })
        }
    }

    /// The smallest possible number of observed successes
    ///
    /// ```text
    /// max(0, n + K - N)
    /// ```
    fn min(&self) -> u64 {
        (self.draws + self.successes).saturating_sub(self.population)
    }

    /// The largest possible number of observed successes
    ///
    /// ```text
    /// min(K, n)
    /// ```
    fn max(&self) -> u64 {
        cmp::min(self.successes, self.draws)
    }

    /// Probability to observe exactly `k` successes
    pub fn pmf(&self, k: u64) -> f64 {
        if k < self.min() || k > self.max() {
            return 0.0;
        }
        (ln_binomial(self.successes, k)
            + ln_binomial(self.population - self.successes, self.draws - k)
            - ln_binomial(self.population, self.draws))
        .exp()
    }

    /// Probability to observe `k` or more successes: `P(X >= k)`
    ///
    /// This is the inclusive upper tail used to test for enrichment.
    ///
    /// # Examples
    ///
    /// ```
    /// use overrep::stats::Hypergeometric;
    ///
    /// // 10 items in total, 5 of them in the set, 4 hits
    /// let hyper = Hypergeometric::new(10, 5, 4).unwrap();
    ///
    /// // 3 or more hits in the set
    /// assert!((hyper.upper_tail(3) - 55.0 / 210.0).abs() < 1e-12);
    /// // observing 0 or more is certain
    /// assert_eq!(hyper.upper_tail(0), 1.0);
    /// ```
    pub fn upper_tail(&self, k: u64) -> f64 {
        if k <= self.min() {
            1.0
        } else if k > self.max() {
            0.0
        } else {
            let ln_denom = ln_binomial(self.population, self.draws);
            let p = (k..=self.max()).fold(0.0, |acc, i| {
                acc + (ln_binomial(self.successes, i)
                    + ln_binomial(self.population - self.successes, self.draws - i)
                    - ln_denom)
                    .exp()
            });
            p.clamp(0.0, 1.0)
        }
    }

    /// The survival function `P(X > x)`
    pub fn sf(&self, x: u64) -> f64 {
        self.upper_tail(x + 1)
    }
}
