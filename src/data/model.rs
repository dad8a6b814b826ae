use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Every column the trade records file must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Categorical(CategoricalField),
    Numeric(NumericField),
    Date,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::Categorical(CategoricalField::Country),
        Column::Categorical(CategoricalField::Product),
        Column::Categorical(CategoricalField::ImportExport),
        Column::Categorical(CategoricalField::Category),
        Column::Categorical(CategoricalField::Port),
        Column::Categorical(CategoricalField::ShippingMethod),
        Column::Categorical(CategoricalField::Supplier),
        Column::Categorical(CategoricalField::Customer),
        Column::Categorical(CategoricalField::PaymentTerms),
        Column::Numeric(NumericField::Quantity),
        Column::Numeric(NumericField::Value),
        Column::Numeric(NumericField::Weight),
        Column::Date,
    ];

    /// Header text as it appears in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Column::Categorical(f) => f.name(),
            Column::Numeric(f) => f.name(),
            Column::Date => "Date",
        }
    }
}

/// Text-valued columns usable in pie and bar breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoricalField {
    Country,
    Product,
    ImportExport,
    Category,
    Port,
    ShippingMethod,
    Supplier,
    Customer,
    PaymentTerms,
}

impl CategoricalField {
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Country => "Country",
            CategoricalField::Product => "Product",
            CategoricalField::ImportExport => "Import_Export",
            CategoricalField::Category => "Category",
            CategoricalField::Port => "Port",
            CategoricalField::ShippingMethod => "Shipping_Method",
            CategoricalField::Supplier => "Supplier",
            CategoricalField::Customer => "Customer",
            CategoricalField::PaymentTerms => "Payment_Terms",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric columns usable on chart axes and in correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericField {
    Quantity,
    Value,
    Weight,
}

impl NumericField {
    pub const ALL: [NumericField; 3] = [
        NumericField::Quantity,
        NumericField::Value,
        NumericField::Weight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::Quantity => "Quantity",
            NumericField::Value => "Value",
            NumericField::Weight => "Weight",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// RecordDate – a coerced `Date` cell
// ---------------------------------------------------------------------------

/// The `Date` cell after coercion. Cells that fail to parse keep the row
/// but are marked `Unparsable`, which no date range ever contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecordDate {
    Valid(NaiveDate),
    Unparsable,
}

impl RecordDate {
    pub fn valid(self) -> Option<NaiveDate> {
        match self {
            RecordDate::Valid(d) => Some(d),
            RecordDate::Unparsable => None,
        }
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDate::Valid(d) => write!(f, "{d}"),
            RecordDate::Unparsable => write!(f, "<unparsable>"),
        }
    }
}

// ---------------------------------------------------------------------------
// TradeRecord – one row of the source file
// ---------------------------------------------------------------------------

/// A single import/export transaction.
///
/// Numeric cells that could not be parsed hold `f64::NAN` and are skipped
/// by every aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub country: String,
    pub product: String,
    pub import_export: String,
    pub category: String,
    pub port: String,
    pub shipping_method: String,
    pub supplier: String,
    pub customer: String,
    pub payment_terms: String,
    pub quantity: f64,
    pub value: f64,
    pub weight: f64,
    pub date: RecordDate,
}

impl TradeRecord {
    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Country => &self.country,
            CategoricalField::Product => &self.product,
            CategoricalField::ImportExport => &self.import_export,
            CategoricalField::Category => &self.category,
            CategoricalField::Port => &self.port,
            CategoricalField::ShippingMethod => &self.shipping_method,
            CategoricalField::Supplier => &self.supplier,
            CategoricalField::Customer => &self.customer,
            CategoricalField::PaymentTerms => &self.payment_terms,
        }
    }

    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Quantity => self.quantity,
            NumericField::Value => self.value,
            NumericField::Weight => self.weight,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All trade records in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    pub rows: Vec<TradeRecord>,
}

impl RecordTable {
    pub fn from_rows(rows: Vec<TradeRecord>) -> Self {
        RecordTable { rows }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest valid date, ignoring unparsable cells.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().filter_map(|r| r.date.valid());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    pub fn categorical(&self, field: CategoricalField) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |r| r.categorical(field))
    }

    pub fn numeric(&self, field: NumericField) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |r| r.numeric(field))
    }

    /// Number of rows whose date failed to parse.
    pub fn unparsable_dates(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.date == RecordDate::Unparsable)
            .count()
    }
}
