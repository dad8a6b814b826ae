use chrono::NaiveDate;

use super::model::{RecordDate, RecordTable};

// ---------------------------------------------------------------------------
// Date range predicate
// ---------------------------------------------------------------------------

/// Inclusive calendar-date range. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range from two picked dates in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        DateRange {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Unparsable dates are never contained.
    pub fn contains(&self, date: RecordDate) -> bool {
        match date {
            RecordDate::Valid(d) => self.start <= d && d <= self.end,
            RecordDate::Unparsable => false,
        }
    }
}

/// Return a new table holding only the rows dated within `range`.
///
/// The input is left untouched and row order is preserved. An empty result
/// is valid.
pub fn filter_by_date(table: &RecordTable, range: DateRange) -> RecordTable {
    RecordTable::from_rows(
        table
            .rows
            .iter()
            .filter(|row| range.contains(row.date))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::fixtures::{record, two_year_table, ymd};

    #[test]
    fn second_half_of_2021() {
        let table = two_year_table();
        let range = DateRange::new(ymd(2021, 6, 1), ymd(2021, 12, 31));
        let out = filter_by_date(&table, range);

        assert_eq!(out.len(), 7);
        assert!(out
            .rows
            .iter()
            .all(|r| r.date >= RecordDate::Valid(ymd(2021, 6, 1))
                && r.date <= RecordDate::Valid(ymd(2021, 12, 31))));
        assert_eq!(table.len(), 24, "input must not be mutated");
    }

    #[test]
    fn reversed_bounds_are_normalized() {
        let range = DateRange::new(ymd(2022, 2, 1), ymd(2021, 2, 1));
        assert_eq!(range.start(), ymd(2021, 2, 1));
        assert_eq!(range.end(), ymd(2022, 2, 1));
    }

    #[test]
    fn single_day_range_may_be_empty() {
        let table = two_year_table();
        let day = ymd(2021, 3, 15);
        assert!(filter_by_date(&table, DateRange::new(day, day)).is_empty());

        let first = ymd(2021, 3, 1);
        assert_eq!(filter_by_date(&table, DateRange::new(first, first)).len(), 1);
    }

    #[test]
    fn unparsable_rows_are_dropped() {
        let table = RecordTable::from_rows(vec![
            record(RecordDate::Unparsable, 1.0, 1.0, 1.0),
            record(RecordDate::Valid(ymd(2021, 1, 1)), 2.0, 2.0, 2.0),
        ]);
        let range = DateRange::new(NaiveDate::MIN, NaiveDate::MAX);
        let out = filter_by_date(&table, range);
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows[0].quantity, 2.0);
    }

    fn day_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..730).prop_map(|offset| ymd(2021, 1, 1) + chrono::Duration::days(offset))
    }

    fn table_strategy() -> impl Strategy<Value = RecordTable> {
        prop::collection::vec(prop::option::weighted(0.9, day_strategy()), 0..60).prop_map(
            |dates| {
                let rows = dates
                    .into_iter()
                    .enumerate()
                    .map(|(i, d)| {
                        let date = d.map_or(RecordDate::Unparsable, RecordDate::Valid);
                        record(date, i as f64, 1.0, 1.0)
                    })
                    .collect();
                RecordTable::from_rows(rows)
            },
        )
    }

    proptest! {
        #[test]
        fn output_is_exactly_the_in_range_subset(
            table in table_strategy(),
            a in day_strategy(),
            b in day_strategy(),
        ) {
            let range = DateRange::new(a, b);
            let out = filter_by_date(&table, range);

            let expected: Vec<_> = table
                .rows
                .iter()
                .filter(|r| matches!(r.date, RecordDate::Valid(d) if range.start() <= d && d <= range.end()))
                .cloned()
                .collect();
            prop_assert_eq!(&out.rows, &expected);
            for row in &out.rows {
                prop_assert!(table.rows.contains(row));
            }
        }

        #[test]
        fn refiltering_by_a_superset_is_idempotent(
            table in table_strategy(),
            a in day_strategy(),
            b in day_strategy(),
            widen in 0i64..90,
        ) {
            let inner = DateRange::new(a, b);
            let outer = DateRange::new(
                inner.start() - chrono::Duration::days(widen),
                inner.end() + chrono::Duration::days(widen),
            );
            let once = filter_by_date(&table, inner);
            let twice = filter_by_date(&once, outer);
            prop_assert_eq!(once, twice);
        }
    }
}
