use crate::error::LoadError;
use crate::model::OrderRecord;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Decimal,
    Date,
    Category,
}

pub struct ColumnSpec {
    pub label: &'static str,
    pub alias: &'static str,
    pub kind: ColumnType,
}

/// Every column the dashboard reads. Other columns in the file are ignored.
pub const SCHEMA: &[ColumnSpec] = &[
    ColumnSpec { label: "発注番号", alias: "order_number", kind: ColumnType::Text },
    ColumnSpec { label: "発行区分", alias: "issue_type", kind: ColumnType::Integer },
    ColumnSpec { label: "発注日", alias: "order_date", kind: ColumnType::Date },
    ColumnSpec { label: "数量", alias: "quantity", kind: ColumnType::Integer },
    ColumnSpec { label: "納入期日", alias: "due_date", kind: ColumnType::Date },
    ColumnSpec { label: "売上金額JPY", alias: "sales_jpy", kind: ColumnType::Decimal },
    ColumnSpec { label: "仕入金額JPY", alias: "purchase_jpy", kind: ColumnType::Decimal },
    ColumnSpec { label: "生産工場", alias: "factory", kind: ColumnType::Category },
    ColumnSpec { label: "納入先", alias: "destination", kind: ColumnType::Category },
    ColumnSpec { label: "品名", alias: "item_name", kind: ColumnType::Category },
];

pub fn load_orders(path: &Path) -> Result<Vec<OrderRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match read_orders(file) {
        Ok(orders) => {
            tracing::info!(rows = orders.len(), path = %path.display(), "loaded orders");
            Ok(orders)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to load orders");
            Err(e)
        }
    }
}

pub fn read_orders<R: Read>(reader: R) -> Result<Vec<OrderRecord>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_headers(&headers)?;

    let mut orders = Vec::new();
    let mut record = csv::StringRecord::new();
    while csv_reader.read_record(&mut record)? {
        let order = record
            .deserialize::<OrderRecord>(Some(&headers))
            .map_err(|e| row_error(e, &headers, &record))?;
        orders.push(order);
    }

    Ok(orders)
}

fn check_headers(headers: &csv::StringRecord) -> Result<(), LoadError> {
    let missing: Vec<String> = SCHEMA
        .iter()
        .filter(|col| !headers.iter().any(|h| h == col.label || h == col.alias))
        .map(|col| format!("{} ({:?})", col.label, col.kind))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

fn row_error(err: csv::Error, headers: &csv::StringRecord, record: &csv::StringRecord) -> LoadError {
    if let csv::ErrorKind::Deserialize { pos, err: de } = err.kind() {
        // Errors raised from `de_date` carry no field index.
        let column = de
            .field()
            .and_then(|i| headers.get(i as usize))
            .or_else(|| bad_date_column(headers, record))
            .unwrap_or("?")
            .to_string();
        let line = pos
            .as_ref()
            .or(record.position())
            .map(|p| p.line())
            .unwrap_or(0);
        return LoadError::Row {
            line,
            column,
            message: de.kind().to_string(),
        };
    }
    LoadError::Csv(err)
}

/// First date column in `record` whose value does not parse.
fn bad_date_column<'h>(headers: &'h csv::StringRecord, record: &csv::StringRecord) -> Option<&'h str> {
    SCHEMA
        .iter()
        .filter(|col| col.kind == ColumnType::Date)
        .find_map(|col| {
            let idx = headers.iter().position(|h| h == col.label || h == col.alias)?;
            let value = record.get(idx)?;
            parse_date(value).is_none().then(|| &headers[idx])
        })
}

/// Accepts `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed by a time of day.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let day = text.trim().split([' ', 'T']).next()?;
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

pub(crate) fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'")))
}
