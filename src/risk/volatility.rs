//! Average True Range over a trailing window of daily bars.

use statrs::statistics::Statistics;

use crate::models::{PriceBar, VolatilityEstimate};

/// Computes true range series and ATR.
pub struct VolatilityEstimator;

impl VolatilityEstimator {
    /// True range for every bar, oldest first.
    ///
    /// The first bar has no predecessor, so its own close stands in and the
    /// value reduces to `high - low`.
    pub fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
        let mut prev_close = match bars.first() {
            Some(bar) => bar.close,
            None => return Vec::new(),
        };

        bars.iter()
            .map(|bar| {
                let tr = bar.true_range(prev_close);
                prev_close = bar.close;
                tr
            })
            .collect()
    }

    /// Estimate ATR over the last `lookback` true ranges.
    ///
    /// Fewer bars than `lookback` is not an error: the estimate carries the
    /// last close with `atr` absent.
    pub fn estimate(bars: &[PriceBar], lookback: usize) -> VolatilityEstimate {
        let Some(last) = bars.last() else {
            return VolatilityEstimate::default();
        };

        let last_close = Some(last.close);

        if lookback == 0 || bars.len() < lookback {
            return VolatilityEstimate {
                atr: None,
                last_close,
            };
        }

        let ranges = Self::true_ranges(bars);
        let window = &ranges[ranges.len() - lookback..];

        VolatilityEstimate {
            atr: Some(window.iter().mean()),
            last_close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(rows: &[(f64, f64, f64)]) -> Vec<PriceBar> {
        rows.iter().map(|&(h, l, c)| PriceBar::new(h, l, c)).collect()
    }

    #[test]
    fn test_empty_series() {
        let est = VolatilityEstimator::estimate(&[], 14);
        assert_eq!(est.atr, None);
        assert_eq!(est.last_close, None);
        assert!(VolatilityEstimator::true_ranges(&[]).is_empty());
    }

    #[test]
    fn test_first_bar_uses_own_close() {
        let series = bars(&[(12.0, 9.0, 11.5)]);
        assert_eq!(VolatilityEstimator::true_ranges(&series), vec![3.0]);
    }

    #[test]
    fn test_true_range_uses_previous_close() {
        let series = bars(&[
            (10.0, 9.0, 9.5),
            (12.0, 11.0, 11.5), // gap up from 9.5
            (11.0, 8.0, 9.0),   // wide bar
            (9.5, 9.0, 9.25),   // inside
        ]);
        assert_eq!(
            VolatilityEstimator::true_ranges(&series),
            vec![1.0, 2.5, 3.5, 0.5]
        );
    }

    #[test]
    fn test_insufficient_history() {
        let series = bars(&[(10.0, 9.0, 9.5), (11.0, 9.5, 10.25)]);
        let est = VolatilityEstimator::estimate(&series, 3);
        assert_eq!(est.atr, None);
        assert_eq!(est.last_close, Some(10.25));
    }

    #[test]
    fn test_atr_averages_trailing_window() {
        let series = bars(&[
            (10.0, 9.0, 9.5),
            (12.0, 11.0, 11.5),
            (11.0, 8.0, 9.0),
            (10.0, 9.0, 9.5),
        ]);
        // True ranges: 1.0, 2.5, 3.5, 1.0; last three average to 7/3
        let est = VolatilityEstimator::estimate(&series, 3);
        let atr = est.atr.expect("enough history");
        assert!((atr - 7.0 / 3.0).abs() < 1e-12);
        assert_eq!(est.last_close, Some(9.5));
    }

    #[test]
    fn test_exact_lookback_length() {
        let series = bars(&[(10.0, 8.0, 9.0), (10.0, 8.0, 9.0)]);
        let est = VolatilityEstimator::estimate(&series, 2);
        assert_eq!(est.atr, Some(2.0));
    }

    #[test]
    fn test_zero_lookback_has_no_atr() {
        let series = bars(&[(10.0, 8.0, 9.0)]);
        let est = VolatilityEstimator::estimate(&series, 0);
        assert_eq!(est.atr, None);
        assert_eq!(est.last_close, Some(9.0));
    }

    #[test]
    fn test_atr_non_negative() {
        let mut series = Vec::new();
        let mut close = 100.0;
        for i in 0..60 {
            let swing = ((i * 7) % 11) as f64 * 0.37;
            close += if i % 3 == 0 { -swing } else { swing * 0.5 };
            series.push(PriceBar::new(close + swing, close - swing * 0.2, close));
        }
        for lookback in 1..=60 {
            let atr = VolatilityEstimator::estimate(&series, lookback).atr.unwrap();
            assert!(atr >= 0.0);
        }
    }

    #[test]
    fn test_flat_series_has_zero_atr() {
        let series = vec![PriceBar::new(5.0, 5.0, 5.0); 20];
        assert_eq!(VolatilityEstimator::estimate(&series, 14).atr, Some(0.0));
    }

    #[test]
    fn test_deterministic() {
        let series = bars(&[(10.0, 9.1, 9.7), (10.3, 9.4, 10.1), (10.9, 9.9, 10.6)]);
        let a = VolatilityEstimator::estimate(&series, 2).atr.unwrap();
        let b = VolatilityEstimator::estimate(&series, 2).atr.unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
