/// Chart layer: turns a filtered table and a field selection into a
/// [`ChartRequest`](request::ChartRequest) for the renderer.

pub mod request;
pub mod stats;

use crate::data::filter::{DateRange, filter_by_date};
use crate::data::model::RecordTable;
use crate::error::Result;

use request::{ChartRequest, FieldSelection, build_request};

/// One user interaction, captured by value.
///
/// Built fresh from the sidebar controls every time anything changes, so no
/// earlier interaction can leak into the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    /// `None` keeps every row, including those with an unparsable date.
    pub range: Option<DateRange>,
    pub selection: FieldSelection,
}

/// Filter stage followed by the chart request builder.
pub fn run_pipeline(table: &RecordTable, request: DashboardRequest) -> Result<ChartRequest> {
    let filtered;
    let rows = match request.range {
        Some(range) => {
            filtered = filter_by_date(table, range);
            log::debug!(
                "date range {}..={} keeps {} of {} rows",
                range.start(),
                range.end(),
                filtered.len(),
                table.len()
            );
            &filtered
        }
        None => table,
    };
    build_request(rows, &request.selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{two_year_table, ymd};
    use crate::data::model::NumericField;
    use crate::error::DashboardError;
    use super::request::ChartBody;

    #[test]
    fn second_half_of_2021_line_has_single_year_point() {
        let table = two_year_table();
        let request = DashboardRequest {
            range: Some(DateRange::new(ymd(2021, 6, 1), ymd(2021, 12, 31))),
            selection: FieldSelection::Line(NumericField::Quantity),
        };
        let chart = run_pipeline(&table, request).unwrap();

        let ChartBody::Line(line) = chart.body else {
            panic!("expected line chart");
        };
        // Quantities 6..=12 fall in June through December 2021.
        assert_eq!(line.points, vec![(2021, (6..=12).sum::<i32>() as f64)]);
    }

    #[test]
    fn no_range_keeps_every_year() {
        let table = two_year_table();
        let request = DashboardRequest {
            range: None,
            selection: FieldSelection::Line(NumericField::Quantity),
        };
        let ChartBody::Line(line) = run_pipeline(&table, request).unwrap().body else {
            panic!("expected line chart");
        };
        let years: Vec<i32> = line.points.iter().map(|p| p.0).collect();
        assert_eq!(years, [2021, 2022]);
    }

    #[test]
    fn empty_bar_selection_produces_no_chart() {
        let request = DashboardRequest {
            range: None,
            selection: FieldSelection::Bar(Vec::new()),
        };
        let err = run_pipeline(&two_year_table(), request).unwrap_err();
        assert!(matches!(err, DashboardError::IncompleteSelection { .. }));
    }
}
