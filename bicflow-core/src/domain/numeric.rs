// bicflow-core/src/domain/numeric.rs
//
// Min-max scaling of the churn metrics. Bounds are batch-relative: they are
// observed over one upload, so the same raw value can scale differently in
// another upload.

use crate::domain::record::{ChurnMetric, ValidatedRecord};
use serde::Serialize;

/// Observed minimum and maximum of every churn metric over one batch.
/// Missing values count as 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchBounds {
    pub min: [f64; 6],
    pub max: [f64; 6],
}

impl Default for BatchBounds {
    fn default() -> Self {
        Self {
            min: [0.0; 6],
            max: [0.0; 6],
        }
    }
}

impl BatchBounds {
    /// Aggregation pass. An empty batch yields all-zero bounds.
    pub fn observe(records: &[ValidatedRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut bounds = Self {
            min: [f64::INFINITY; 6],
            max: [f64::NEG_INFINITY; 6],
        };
        for record in records {
            for metric in ChurnMetric::ALL {
                let i = metric.index();
                let value = record.metrics.value_or_zero(metric);
                bounds.min[i] = bounds.min[i].min(value);
                bounds.max[i] = bounds.max[i].max(value);
            }
        }
        bounds
    }

    pub fn range(&self, metric: ChurnMetric) -> (f64, f64) {
        (self.min[metric.index()], self.max[metric.index()])
    }
}

/// Scaled metrics and 0/1 flags of one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NormalizedFeatures {
    pub metrics: [f64; 6],
    pub is_reviewed: u8,
    pub is_self_authored: u8,
}

impl NormalizedFeatures {
    pub fn metric(&self, metric: ChurnMetric) -> f64 {
        self.metrics[metric.index()]
    }
}

pub struct NumericNormalizer;

impl NumericNormalizer {
    /// `(value - min) / (max - min)`, or 0 when the column has no spread.
    pub fn scale(value: f64, min: f64, max: f64) -> f64 {
        let spread = max - min;
        if spread == 0.0 {
            return 0.0;
        }
        let scaled = if spread.is_finite() {
            (value - min) / spread
        } else {
            // Bounds far apart overflow the subtraction; halves do not.
            (value / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
        };
        if scaled.is_nan() {
            return if value >= max { 1.0 } else { 0.0 };
        }
        scaled.clamp(0.0, 1.0)
    }

    /// Per-row pass. Flags are cast to 0/1, not scaled.
    pub fn normalize(record: &ValidatedRecord, bounds: &BatchBounds) -> NormalizedFeatures {
        let mut metrics = [0.0; 6];
        for metric in ChurnMetric::ALL {
            let (min, max) = bounds.range(metric);
            metrics[metric.index()] = Self::scale(record.metrics.value_or_zero(metric), min, max);
        }

        NormalizedFeatures {
            metrics,
            is_reviewed: u8::from(record.is_reviewed),
            is_self_authored: u8::from(record.is_self_authored),
        }
    }

    /// Both passes over a batch, in input order.
    pub fn normalize_batch(records: &[ValidatedRecord]) -> (BatchBounds, Vec<NormalizedFeatures>) {
        let bounds = BatchBounds::observe(records);
        let features = records
            .iter()
            .map(|record| Self::normalize(record, &bounds))
            .collect();
        (bounds, features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::ChurnMetrics;

    fn with_la(values: &[Option<f64>]) -> Vec<ValidatedRecord> {
        values
            .iter()
            .map(|la| ValidatedRecord {
                metrics: ChurnMetrics {
                    la: *la,
                    ..ChurnMetrics::default()
                },
                ..ValidatedRecord::default()
            })
            .collect()
    }

    fn la_norm(records: &[ValidatedRecord]) -> Vec<f64> {
        let (_, features) = NumericNormalizer::normalize_batch(records);
        features
            .iter()
            .map(|f| f.metric(ChurnMetric::LinesAdded))
            .collect()
    }

    #[test]
    fn test_two_rows_span_zero_to_one() {
        assert_eq!(la_norm(&with_la(&[Some(10.0), Some(30.0)])), vec![0.0, 1.0]);
    }

    #[test]
    fn test_extreme_bounds_stay_in_unit_range() {
        assert_eq!(
            la_norm(&with_la(&[Some(-1e308), Some(1e308), Some(0.0)])),
            vec![0.0, 1.0, 0.5]
        );
        assert_eq!(NumericNormalizer::scale(f64::MAX, -f64::MAX, f64::MAX), 1.0);
        assert_eq!(NumericNormalizer::scale(-f64::MAX, -f64::MAX, f64::MAX), 0.0);
    }

    #[test]
    fn test_single_row_is_zero() {
        assert_eq!(la_norm(&with_la(&[Some(10.0)])), vec![0.0]);
    }

    #[test]
    fn test_constant_column_is_zero() {
        assert_eq!(
            la_norm(&with_la(&[Some(7.0), Some(7.0), Some(7.0)])),
            vec![0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_missing_counts_as_zero() {
        let records = with_la(&[None, Some(5.0), Some(10.0)]);
        let bounds = BatchBounds::observe(&records);
        assert_eq!(bounds.range(ChurnMetric::LinesAdded), (0.0, 10.0));
        assert_eq!(la_norm(&records), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_min_and_max_rows_hit_the_bounds() {
        let records = with_la(&[Some(3.5), Some(-2.0), Some(11.25), Some(4.0)]);
        let norms = la_norm(&records);
        assert_eq!(norms[1], 0.0);
        assert_eq!(norms[2], 1.0);
        assert!(norms.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_batch_relative() {
        let alone = la_norm(&with_la(&[Some(10.0), Some(20.0)]));
        let wider = la_norm(&with_la(&[Some(10.0), Some(20.0), Some(30.0)]));
        assert_eq!(alone[1], 1.0);
        assert_eq!(wider[1], 0.5);
    }

    #[test]
    fn test_flags_are_cast() {
        let record = ValidatedRecord {
            is_reviewed: true,
            ..ValidatedRecord::default()
        };
        let features = NumericNormalizer::normalize(&record, &BatchBounds::default());
        assert_eq!(features.is_reviewed, 1);
        assert_eq!(features.is_self_authored, 0);
    }

    #[test]
    fn test_empty_batch() {
        let (bounds, features) = NumericNormalizer::normalize_batch(&[]);
        assert_eq!(bounds, BatchBounds::default());
        assert!(features.is_empty());
    }
}
