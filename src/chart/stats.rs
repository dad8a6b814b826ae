use std::collections::BTreeMap;

use chrono::Datelike;

use crate::data::model::{CategoricalField, NumericField, RecordTable};

// ---------------------------------------------------------------------------
// Frequency counts
// ---------------------------------------------------------------------------

/// Row count per distinct value, in order of first appearance.
pub fn value_counts(table: &RecordTable, field: CategoricalField) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut position: BTreeMap<&str, usize> = BTreeMap::new();
    for value in table.categorical(field) {
        match position.get(value) {
            Some(&i) => order[i].1 += 1,
            None => {
                position.insert(value, order.len());
                order.push((value.to_string(), 1));
            }
        }
    }
    order
}

// ---------------------------------------------------------------------------
// Time aggregation
// ---------------------------------------------------------------------------

/// Sum of `field` per calendar year, ascending. Rows with an unparsable date
/// or a missing value do not contribute.
pub fn yearly_sums(table: &RecordTable, field: NumericField) -> Vec<(i32, f64)> {
    let mut sums: BTreeMap<i32, f64> = BTreeMap::new();
    for row in &table.rows {
        let (Some(date), value) = (row.date.valid(), row.numeric(field)) else {
            continue;
        };
        if value.is_nan() {
            continue;
        }
        *sums.entry(date.year()).or_default() += value;
    }
    sums.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation of two columns over rows where both are present.
/// `NaN` when fewer than two pairs exist or either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Square correlation matrix, row-major in `fields` order.
///
/// The diagonal is always `1.0` and `m[i][j] == m[j][i]` holds bit-for-bit.
pub fn correlation_matrix(table: &RecordTable, fields: &[NumericField]) -> Vec<Vec<f64>> {
    let columns: Vec<Vec<f64>> = fields.iter().map(|&f| table.numeric(f).collect()).collect();
    let n = fields.len();
    let mut m = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            m[i][j] = r;
            m[j][i] = r;
        }
    }
    m
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// One histogram bucket covering `[lower, upper)`; the last bucket is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram with exactly `bins` buckets spanning the data.
///
/// A constant column gets a unit-wide span centred on its value. An empty
/// column still yields `bins` empty buckets over `[0, 1]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let (lo, hi) = match min_max(&present) {
        Some((lo, hi)) if lo < hi => (lo, hi),
        Some((v, _)) => (v - 0.5, v + 0.5),
        None => (0.0, 1.0),
    };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    if bins == 0 {
        return out;
    }
    for v in present {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Five-number summary with Tukey whiskers, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// `None` when no value is present.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let fence = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - fence, q3 + fence);

        let inside = sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let (lower_whisker, upper_whisker) =
            min_max(&inside.collect::<Vec<_>>()).unwrap_or((q1, q3));
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

/// Linear-interpolated quantile of sorted, NaN-free data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{mixed_table, record, two_year_table, ymd};
    use crate::data::model::RecordDate;

    #[test]
    fn counts_keep_first_appearance_order() {
        let mut rows = vec![
            record(RecordDate::Unparsable, 1.0, 1.0, 1.0),
            record(RecordDate::Unparsable, 1.0, 1.0, 1.0),
            record(RecordDate::Unparsable, 1.0, 1.0, 1.0),
        ];
        rows[0].shipping_method = "Air".into();
        rows[1].shipping_method = "Sea".into();
        rows[2].shipping_method = "Air".into();
        let table = RecordTable::from_rows(rows);

        assert_eq!(
            value_counts(&table, CategoricalField::ShippingMethod),
            vec![("Air".to_string(), 2), ("Sea".to_string(), 1)]
        );
    }

    #[test]
    fn yearly_sums_skip_missing_values_and_dates() {
        let table = RecordTable::from_rows(vec![
            record(RecordDate::Valid(ymd(2021, 2, 1)), 5.0, 0.0, 0.0),
            record(RecordDate::Valid(ymd(2021, 9, 1)), f64::NAN, 0.0, 0.0),
            record(RecordDate::Unparsable, 100.0, 0.0, 0.0),
            record(RecordDate::Valid(ymd(2023, 1, 1)), 2.5, 0.0, 0.0),
        ]);
        assert_eq!(
            yearly_sums(&table, NumericField::Quantity),
            vec![(2021, 5.0), (2023, 2.5)]
        );
    }

    #[test]
    fn pearson_of_linear_columns() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &up) - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &down) + 1.0).abs() < 1e-12);
        assert!(pearson(&xs, &[3.0; 4]).is_nan());
        assert!(pearson(&[1.0], &[2.0]).is_nan());
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let table = two_year_table();
        let fields = NumericField::ALL;
        let m = correlation_matrix(&table, &fields);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m[i].len(), 3);
            assert_eq!(m[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m[i][j].to_bits(), m[j][i].to_bits());
            }
        }
    }

    #[test]
    fn correlation_matrix_holds_pairwise_pearson_values() {
        let table = mixed_table();
        let columns: Vec<Vec<f64>> = NumericField::ALL
            .iter()
            .map(|&f| table.numeric(f).collect())
            .collect();
        let m = correlation_matrix(&table, &NumericField::ALL);

        assert!((m[0][1] + 0.8).abs() < 1e-12);
        assert_eq!(m[0][1], pearson(&columns[0], &columns[1]));
        assert_ne!(m[0][1], 1.0);

        // Quantity vs Weight uses the four rows where Weight is present.
        let expected = 3.5 / 43.75_f64.sqrt();
        assert!((m[0][2] - expected).abs() < 1e-12);
        assert_eq!(m[0][2], pearson(&columns[0], &columns[2]));
        assert_eq!(m[1][2], pearson(&columns[1], &columns[2]));

        for i in 0..3 {
            assert_eq!(m[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m[i][j].to_bits(), m[j][i].to_bits());
            }
        }
    }

    #[test]
    fn correlation_matrix_follows_field_order() {
        let table = mixed_table();
        let all = correlation_matrix(&table, &NumericField::ALL);
        let m = correlation_matrix(&table, &[NumericField::Weight, NumericField::Value]);

        assert_eq!(m.len(), 2);
        assert_eq!(m[0][0], 1.0);
        assert!((m[0][1] - all[2][1]).abs() < 1e-12);
        assert!((m[1][0] - all[1][2]).abs() < 1e-12);
        assert_ne!(m[0][1], all[0][1]);
    }

    #[test]
    fn histogram_spans_data_with_fixed_bucket_count() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let bins = histogram(&values, 30);
        assert_eq!(bins.len(), 30);
        assert_eq!(bins[0].lower, 0.0);
        assert!((bins[29].upper - 100.0).abs() < 1e-9);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 101);
    }

    #[test]
    fn histogram_of_constant_and_empty_columns() {
        let constant = histogram(&[4.0, 4.0, f64::NAN], 30);
        assert_eq!(constant.len(), 30);
        assert_eq!(constant.iter().map(|b| b.count).sum::<usize>(), 2);

        let empty = histogram(&[], 30);
        assert_eq!(empty.len(), 30);
        assert!(empty.iter().all(|b| b.count == 0));
    }

    #[test]
    fn box_summary_flags_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let summary = BoxSummary::from_values(&values).expect("non-empty");
        assert_eq!(summary.median, 3.5);
        assert_eq!(summary.q1, 2.25);
        assert_eq!(summary.q3, 4.75);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 5.0);
        assert_eq!(summary.outliers, vec![100.0]);

        assert!(BoxSummary::from_values(&[f64::NAN]).is_none());
    }
}
