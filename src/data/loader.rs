use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray, Date32Array, Date64Array, LargeListArray, ListArray, StringArray};
use arrow::datatypes::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Order, OrderDataset};

/// Required source columns. Extra columns are ignored.
const COL_COUNTRY: &str = "shipCountryCode";
const COL_BRANDS: &str = "brands";
const COL_DATE: &str = "orderDate";

// ---------------------------------------------------------------------------
// LoadError – why a load was rejected
// ---------------------------------------------------------------------------

/// A load either yields a complete [`OrderDataset`] or fails as a whole;
/// no partial dataset is ever returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("reading file: {0}")]
    Io(#[from] std::io::Error),

    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: unparseable order date '{value}'")]
    BadDate { row: usize, value: String },

    #[error("row {row}: {message}")]
    MalformedRow { row: usize, message: String },
}

pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an order dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `shipCountryCode`, `brands`, `orderDate`
/// * `.json`    – `[{ "shipCountryCode": ..., "brands": ..., "orderDate": ... }, ...]`
/// * `.parquet` – same columns as string (or list/date-typed) columns
pub fn load_file(path: &Path) -> Result<OrderDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Row assembly helpers shared by all three loaders
// ---------------------------------------------------------------------------

/// Split a comma-joined brands cell into a trimmed, deduplicated set.
/// "A, A ,B" becomes {A, B}; the set may come out empty.
fn split_brands(cell: &str) -> BTreeSet<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a date-like string into a pure calendar date, stripping any
/// time-of-day component.
fn parse_order_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = s.parse::<NaiveDate>() {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    None
}

/// Build one [`Order`] from raw cells.  `Ok(None)` marks a row whose brand
/// set came out empty: such rows carry no analytical signal and are dropped
/// rather than failing the load.
fn build_order(row: usize, country: &str, brands_cell: &str, date_cell: &str) -> Result<Option<Order>> {
    let date = parse_order_date(date_cell).ok_or_else(|| LoadError::BadDate {
        row,
        value: date_cell.to_string(),
    })?;

    let brands = split_brands(brands_cell);
    if brands.is_empty() {
        return Ok(None);
    }

    Ok(Some(Order {
        country: country.trim().to_string(),
        date,
        brands,
    }))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming at least the three required columns;
/// `brands` holds a comma-joined string (quoted in the source file).
fn load_csv(path: &Path) -> Result<OrderDataset> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let col = |name: &'static str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let country_idx = col(COL_COUNTRY)?;
    let brands_idx = col(COL_BRANDS)?;
    let date_idx = col(COL_DATE)?;

    let mut orders = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let country = record.get(country_idx).unwrap_or("");
        let brands_cell = record.get(brands_idx).unwrap_or("");
        let date_cell = record.get(date_idx).unwrap_or("");

        if let Some(order) = build_order(row_no, country, brands_cell, date_cell)? {
            orders.push(order);
        }
    }

    Ok(OrderDataset::from_orders(orders))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "shipCountryCode": "US",
///     "brands": "Acme,Zephyr",
///     "orderDate": "2024-01-05"
///   },
///   ...
/// ]
/// ```
///
/// `brands` may also be a JSON array of strings (list-column exports).
fn load_json(path: &Path) -> Result<OrderDataset> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root.as_array().ok_or(LoadError::MalformedRow {
        row: 0,
        message: "expected top-level JSON array".to_string(),
    })?;

    let mut orders = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| LoadError::MalformedRow {
            row: i,
            message: "row is not a JSON object".to_string(),
        })?;

        let country = obj
            .get(COL_COUNTRY)
            .and_then(|v| v.as_str())
            .ok_or(LoadError::MissingColumn(COL_COUNTRY))?;
        let date_cell = obj
            .get(COL_DATE)
            .and_then(|v| v.as_str())
            .ok_or(LoadError::MissingColumn(COL_DATE))?;
        let brands_cell = match obj.get(COL_BRANDS) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(","),
            _ => return Err(LoadError::MissingColumn(COL_BRANDS)),
        };

        if let Some(order) = build_order(i, country, &brands_cell, date_cell)? {
            orders.push(order);
        }
    }

    Ok(OrderDataset::from_orders(orders))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet order export.
///
/// Expected schema:
/// - `shipCountryCode`: Utf8
/// - `brands`: Utf8 (comma-joined) or List<Utf8> / LargeList<Utf8>
/// - `orderDate`: Utf8, Date32 or Date64
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<OrderDataset> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut orders = Vec::new();
    let mut row_no = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let idx = |name: &'static str| -> Result<usize> {
            schema.index_of(name).map_err(|_| LoadError::MissingColumn(name))
        };
        let country_col = batch.column(idx(COL_COUNTRY)?).clone();
        let brands_col = batch.column(idx(COL_BRANDS)?).clone();
        let date_col = batch.column(idx(COL_DATE)?).clone();

        for row in 0..batch.num_rows() {
            let country = extract_string(&country_col, row).ok_or_else(|| LoadError::MalformedRow {
                row: row_no,
                message: format!("'{COL_COUNTRY}' is not a string"),
            })?;
            let brands_cell = extract_brands_cell(&brands_col, row_no, row)?;
            let date = extract_date(&date_col, row).ok_or_else(|| LoadError::BadDate {
                row: row_no,
                value: format!("{:?}", date_col.data_type()),
            })?;

            let brands = split_brands(&brands_cell);
            if !brands.is_empty() {
                orders.push(Order {
                    country: country.trim().to_string(),
                    date,
                    brands,
                });
            }
            row_no += 1;
        }
    }

    Ok(OrderDataset::from_orders(orders))
}

// -- Parquet / Arrow helpers --

/// Read a Utf8 or LargeUtf8 cell as an owned string.
fn extract_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}

/// Read the brands cell: either a comma-joined string column or a list of
/// strings, re-joined so [`split_brands`] handles both the same way.
fn extract_brands_cell(col: &Arc<dyn Array>, row_no: usize, row: usize) -> Result<String> {
    if let Some(s) = extract_string(col, row) {
        return Ok(s);
    }

    let items = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .map(|a| a.value(row)),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .map(|a| a.value(row)),
        _ => None,
    };

    let values = items.ok_or_else(|| LoadError::MalformedRow {
        row: row_no,
        message: format!("'{COL_BRANDS}' is neither a string nor a list, got {:?}", col.data_type()),
    })?;

    let strings = values
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| LoadError::MalformedRow {
            row: row_no,
            message: format!("'{COL_BRANDS}' list inner type is {:?}, expected Utf8", values.data_type()),
        })?;

    Ok(strings
        .iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(","))
}

/// Read the order date from a Utf8, Date32 or Date64 column.
fn extract_date(col: &Arc<dyn Array>, row: usize) -> Option<NaiveDate> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            extract_string(col, row).and_then(|s| parse_order_date(&s))
        }
        DataType::Date32 => col
            .as_any()
            .downcast_ref::<Date32Array>()
            .and_then(|a| a.value_as_date(row)),
        DataType::Date64 => col
            .as_any()
            .downcast_ref::<Date64Array>()
            .and_then(|a| a.value_as_date(row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn splits_trims_and_dedupes_brands() {
        let brands = split_brands("Acme, Acme ,Zephyr,");
        assert_eq!(brands.len(), 2);
        assert!(brands.contains("Acme"));
        assert!(brands.contains("Zephyr"));
    }

    #[test]
    fn strips_time_of_day() {
        assert_eq!(
            parse_order_date("2024-03-05 13:45:00"),
            Some(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
        assert_eq!(
            parse_order_date("2024-03-05T13:45:00Z"),
            Some(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
        assert_eq!(parse_order_date("not a date"), None);
    }

    #[test]
    fn csv_happy_path() {
        let path = write_temp(
            "brandscope_ok.csv",
            "orderId,shipCountryCode,brands,orderDate\n\
             1,US,\"Acme,Zephyr\",2024-01-01\n\
             2,FR,Acme,2024-01-02\n",
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.countries, vec!["FR", "US"]);
        assert_eq!(ds.brands, vec!["Acme", "Zephyr"]);
        assert_eq!(
            ds.date_span,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
            ))
        );
    }

    #[test]
    fn csv_missing_column_rejects_load() {
        let path = write_temp(
            "brandscope_missing.csv",
            "shipCountryCode,orderDate\nUS,2024-01-01\n",
        );
        match load_file(&path) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, COL_BRANDS),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn csv_bad_date_rejects_whole_load() {
        let path = write_temp(
            "brandscope_baddate.csv",
            "shipCountryCode,brands,orderDate\n\
             US,Acme,2024-01-01\n\
             FR,Zephyr,yesterday\n",
        );
        assert!(matches!(
            load_file(&path),
            Err(LoadError::BadDate { row: 1, .. })
        ));
    }

    #[test]
    fn empty_brand_rows_are_dropped() {
        let path = write_temp(
            "brandscope_emptybrands.csv",
            "shipCountryCode,brands,orderDate\n\
             US,\" , \",2024-01-01\n\
             FR,Acme,2024-01-02\n",
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.countries, vec!["FR"]);
    }

    #[test]
    fn json_records_with_list_brands() {
        let path = write_temp(
            "brandscope_ok.json",
            r#"[
              {"shipCountryCode": "US", "brands": ["Acme", "Zephyr"], "orderDate": "2024-01-01"},
              {"shipCountryCode": "DE", "brands": "Acme", "orderDate": "2024-01-03"}
            ]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.brands, vec!["Acme", "Zephyr"]);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(matches!(
            load_file(Path::new("orders.xlsx")),
            Err(LoadError::UnsupportedExtension(_))
        ));
    }
}
