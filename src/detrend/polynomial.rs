//! Polynomial trend fitting
use log::debug;
use polyfit_rs::polyfit_rs::polyfit;
use thiserror::Error;

use crate::detrend::Interval;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default polynomial order
pub const DEFAULT_POLYNOMIAL_ORDER: usize = 10;

/// Trend fitting errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// A polynomial of order N requires N+1 finite samples
    #[error("fit requires {needed} finite samples, got {got}")]
    NotEnoughSamples { needed: usize, got: usize },
    /// Least squares resolution failure
    #[error("polynomial regression failure")]
    PolynomialFitFailure,
}

/// Trend of a complete series, obtained by [PolynomialDetrender::detrend].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detrended {
    /// Trend, co-indexed with the series. NaN outside fitted [Interval]s.
    pub trend: Vec<f64>,
    /// [Interval]s that could not be fitted, with the reason
    pub rejected: Vec<(Interval, FitError)>,
}

/// [PolynomialDetrender] fits a fixed order least squares polynomial
/// over each [Interval] of a series.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolynomialDetrender {
    /// Polynomial order
    pub order: usize,
}

impl Default for PolynomialDetrender {
    fn default() -> Self {
        Self {
            order: DEFAULT_POLYNOMIAL_ORDER,
        }
    }
}

impl PolynomialDetrender {
    /// Builds a new [PolynomialDetrender] of desired order
    pub fn new(order: usize) -> Self {
        Self { order }
    }

    /// Fits the polynomial over this slice and evaluates it at every index,
    /// NaN samples included (gaps are interpolated).
    ///
    /// Sample indices are mapped onto [-1, 1] prior fitting, which keeps
    /// high orders well conditioned.
    pub fn fit(&self, values: &[f64]) -> Result<Vec<f64>, FitError> {
        let needed = self.order + 1;
        let n = values.len();

        let abscissa = |i: usize| {
            if n > 1 {
                2.0 * i as f64 / (n - 1) as f64 - 1.0
            } else {
                0.0
            }
        };

        let (x, y): (Vec<f64>, Vec<f64>) = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| (abscissa(i), *v))
            .unzip();

        if x.len() < needed {
            return Err(FitError::NotEnoughSamples {
                needed,
                got: x.len(),
            });
        }

        let coefs = polyfit(&x, &y, self.order).or(Err(FitError::PolynomialFitFailure))?;

        let fitted = (0..n)
            .map(|i| {
                let x = abscissa(i);
                coefs.iter().rev().fold(0.0_f64, |acc, c| acc * x + c)
            })
            .collect::<Vec<_>>();

        if fitted.iter().any(|v| !v.is_finite()) {
            return Err(FitError::PolynomialFitFailure);
        }

        Ok(fitted)
    }

    /// Fits every [Interval] independently. The trend remains NaN
    /// outside the [Interval]s and within [Interval]s that could not be fitted.
    pub fn detrend(&self, tec: &[f64], intervals: &[Interval]) -> Detrended {
        let mut trend = vec![f64::NAN; tec.len()];
        let mut rejected = Vec::new();

        for interval in intervals.iter() {
            match self.fit(&tec[interval.range()]) {
                Ok(fitted) => {
                    trend[interval.range()].copy_from_slice(&fitted);
                },
                Err(e) => {
                    debug!("[{}:{}] trend rejected: {}", interval.start, interval.end, e);
                    rejected.push((*interval, e));
                },
            }
        }

        Detrended { trend, rejected }
    }
}

#[cfg(test)]
mod test {
    use super::{FitError, PolynomialDetrender};
    use crate::detrend::Interval;

    #[test]
    fn quadratic_is_recovered() {
        let values = (0..120)
            .map(|i| {
                let t = i as f64;
                12.0 + 0.05 * t - 2.0E-4 * t * t
            })
            .collect::<Vec<_>>();

        let fitted = PolynomialDetrender::new(2).fit(&values).unwrap();

        assert_eq!(fitted.len(), values.len());
        for (fitted, value) in fitted.iter().zip(values.iter()) {
            assert!((fitted - value).abs() < 1.0E-6, "{} != {}", fitted, value);
        }
    }

    #[test]
    fn interior_gaps_are_interpolated() {
        let mut values = (0..60).map(|i| 5.0 + 0.1 * i as f64).collect::<Vec<_>>();
        for value in values.iter_mut().take(35).skip(25) {
            *value = f64::NAN;
        }

        let fitted = PolynomialDetrender::new(1).fit(&values).unwrap();
        for (i, fitted) in fitted.iter().enumerate() {
            let expected = 5.0 + 0.1 * i as f64;
            assert!((fitted - expected).abs() < 1.0E-6);
        }
    }

    #[test]
    fn not_enough_samples() {
        let detrender = PolynomialDetrender::new(10);
        assert_eq!(
            detrender.fit(&[1.0, 2.0, 3.0, f64::NAN]),
            Err(FitError::NotEnoughSamples { needed: 11, got: 3 })
        );
    }

    #[test]
    fn short_interval_stays_nan() {
        let tec = (0..100).map(|i| 10.0 + 0.02 * i as f64).collect::<Vec<_>>();
        let intervals = [
            Interval { start: 0, end: 5 },
            Interval { start: 10, end: 90 },
        ];

        let detrended = PolynomialDetrender::new(10).detrend(&tec, &intervals);

        assert_eq!(detrended.trend.len(), tec.len());
        assert!(detrended.trend[0..5].iter().all(|v| v.is_nan()));
        assert!(detrended.trend[5..10].iter().all(|v| v.is_nan()));
        assert!(detrended.trend[10..90].iter().all(|v| v.is_finite()));
        assert!(detrended.trend[90..].iter().all(|v| v.is_nan()));

        assert_eq!(detrended.rejected.len(), 1);
        assert_eq!(detrended.rejected[0].0, intervals[0]);
    }
}
