use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use super::model::{CategoricalField, Column, NumericField, RecordDate, RecordTable, TradeRecord};
use crate::error::{DashboardError, Result};

/// Date layouts tried in order. The first match wins, so ISO forms go first.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the trade records file into a [`RecordTable`].
///
/// The header row must name every column in [`Column::ALL`], in any order;
/// extra columns are ignored. `Date` cells are coerced: a cell that matches
/// none of the accepted layouts becomes [`RecordDate::Unparsable`] instead of
/// failing the load.
pub fn load_table(path: &Path) -> Result<RecordTable> {
    if !path.exists() {
        return Err(DashboardError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();

    let index = column_index(&headers, path)?;
    let cell = |record: &csv::StringRecord, column: Column| -> String {
        record
            .get(index[&column])
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        let text = |f: CategoricalField| cell(&record, Column::Categorical(f));
        let number = |f: NumericField| parse_number(&cell(&record, Column::Numeric(f)));

        rows.push(TradeRecord {
            country: text(CategoricalField::Country),
            product: text(CategoricalField::Product),
            import_export: text(CategoricalField::ImportExport),
            category: text(CategoricalField::Category),
            port: text(CategoricalField::Port),
            shipping_method: text(CategoricalField::ShippingMethod),
            supplier: text(CategoricalField::Supplier),
            customer: text(CategoricalField::Customer),
            payment_terms: text(CategoricalField::PaymentTerms),
            quantity: number(NumericField::Quantity),
            value: number(NumericField::Value),
            weight: number(NumericField::Weight),
            date: parse_date(&cell(&record, Column::Date)),
        });
    }

    let table = RecordTable::from_rows(rows);
    let unparsable = table.unparsable_dates();
    if unparsable > 0 {
        log::warn!(
            "{unparsable} of {} rows in {} have an unparsable Date",
            table.len(),
            path.display()
        );
    }
    Ok(table)
}

fn csv_error(path: &Path, source: csv::Error) -> DashboardError {
    let path = path.to_path_buf();
    let message = source.to_string();
    match source.into_kind() {
        csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            DashboardError::SourceNotFound { path }
        }
        csv::ErrorKind::Io(io) => DashboardError::FileRead { path, source: io },
        _ => DashboardError::Csv { path, message },
    }
}

fn column_index(headers: &csv::StringRecord, path: &Path) -> Result<BTreeMap<Column, usize>> {
    Column::ALL
        .iter()
        .map(|&column| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}') == column.name())
                .map(|i| (column, i))
                .ok_or_else(|| DashboardError::MissingColumn {
                    column: column.name(),
                    path: path.to_path_buf(),
                })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Parse a numeric cell, yielding `NaN` for blanks and garbage.
fn parse_number(s: &str) -> f64 {
    s.replace(',', "").parse::<f64>().unwrap_or(f64::NAN)
}

/// Coerce a `Date` cell, never failing.
pub fn parse_date(s: &str) -> RecordDate {
    let s = s.trim();
    if s.is_empty() {
        return RecordDate::Unparsable;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .map_or(RecordDate::Unparsable, RecordDate::Valid)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::fixtures::ymd;

    const HEADER: &str = "Transaction_ID,Country,Product,Import_Export,Quantity,Value,Date,Category,Port,Customs_Code,Weight,Shipping_Method,Supplier,Customer,Invoice_Number,Payment_Terms";

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp file");
        writeln!(file, "{HEADER}").expect("write header");
        write!(file, "{body}").expect("write body");
        file
    }

    #[test]
    fn loads_rows_and_coerces_dates() {
        let file = write_csv(
            "t1,Chile,Copper,Export,120,5400.5,2021-06-15,Metals,Valparaiso,1,300.2,Sea,Andes,Osaka,9,Net 30\n\
             t2,Peru,Zinc,Import,80,1200,not a date,Metals,Callao,2,90,Air,Sierra,Lima Co,10,Prepaid\n\
             t3,Peru,Zinc,Import,,1200,07-12-2023,Metals,Callao,2,90,Air,Sierra,Lima Co,11,Prepaid\n",
        );
        let table = load_table(file.path()).expect("load");

        assert_eq!(table.len(), 3);
        let first = &table.rows[0];
        assert_eq!(first.country, "Chile");
        assert_eq!(first.import_export, "Export");
        assert_eq!(first.quantity, 120.0);
        assert_eq!(first.value, 5400.5);
        assert_eq!(first.date, RecordDate::Valid(ymd(2021, 6, 15)));

        assert_eq!(table.rows[1].date, RecordDate::Unparsable);
        assert_eq!(table.rows[1].shipping_method, "Air");

        assert!(table.rows[2].quantity.is_nan());
        assert_eq!(table.rows[2].date, RecordDate::Valid(ymd(2023, 12, 7)));
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let err = load_table(Path::new("/definitely/not/here/trades.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::SourceNotFound { .. }));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "Country,Product").expect("write");
        writeln!(file, "Chile,Copper").expect("write");

        let err = load_table(file.path()).unwrap_err();
        match err {
            DashboardError::MissingColumn { column, .. } => assert_eq!(column, "Import_Export"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let file = write_csv("t1,Chile,Copper\n");
        let err = load_table(file.path()).unwrap_err();
        assert!(matches!(err, DashboardError::Csv { .. }));
    }

    #[test]
    fn date_layouts() {
        assert_eq!(parse_date("2022-01-31"), RecordDate::Valid(ymd(2022, 1, 31)));
        assert_eq!(parse_date("2022/01/31"), RecordDate::Valid(ymd(2022, 1, 31)));
        assert_eq!(parse_date("31-01-2022"), RecordDate::Valid(ymd(2022, 1, 31)));
        assert_eq!(parse_date("01/31/2022"), RecordDate::Valid(ymd(2022, 1, 31)));
        assert_eq!(
            parse_date("2022-01-31 13:45:00"),
            RecordDate::Valid(ymd(2022, 1, 31))
        );
        assert_eq!(parse_date(""), RecordDate::Unparsable);
        assert_eq!(parse_date("2022-13-40"), RecordDate::Unparsable);
    }
}
