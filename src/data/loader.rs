use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::error::{DataError, Result};
use super::model::{Dataset, Record};

/// Columns every input must provide, by their header names.
/// `Order ID` may also be spelled `OrderID`.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "Order ID",
    "Order Date",
    "Ship Date",
    "Region",
    "Category",
    "Sub-Category",
    "Segment",
    "Sales",
    "Profit",
    "Discount",
    "Quantity",
];

const ORDER_ID_ALIAS: &str = "OrderID";

/// Date layouts seen in exports of the dataset, tried in order.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%d-%m-%Y"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a transactions dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the Superstore column names (recommended)
/// * `.json`    – `[{ "Order ID": "...", "Sales": 1.0, ... }, ...]`
/// * `.parquet` – one column per field; dates as Date32 or text
///
/// The schema is checked once up front and every row is validated, so a
/// successfully loaded [`Dataset`] never needs further checks.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(Dataset::from_records(records))
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| DataError::MissingInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode file contents, falling back to Latin-1 when the bytes are not UTF-8.
fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        // every Latin-1 byte is the code point of the same value
        Err(e) => e.into_bytes().iter().map(|&b| char::from(b)).collect(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Fail with the full list of required columns the input lacks.
fn check_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let present: Vec<&str> = present.into_iter().map(str::trim).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&col| {
            !present.contains(&col) && !(col == "Order ID" && present.contains(&ORDER_ID_ALIAS))
        })
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::Schema { missing })
    }
}

// ---------------------------------------------------------------------------
// Row validation (shared by all formats)
// ---------------------------------------------------------------------------

/// One row as it appears in a CSV or JSON file, before validation.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Order ID", alias = "OrderID")]
    order_id: String,
    #[serde(rename = "Order Date")]
    order_date: String,
    #[serde(rename = "Ship Date")]
    ship_date: String,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Sub-Category")]
    sub_category: String,
    #[serde(rename = "Segment")]
    segment: String,
    #[serde(rename = "Sales")]
    sales: f64,
    #[serde(rename = "Profit")]
    profit: f64,
    #[serde(rename = "Discount")]
    discount: f64,
    #[serde(rename = "Quantity")]
    quantity: i64,
}

impl RawRow {
    /// Type and range checks. `row` is 1-based for error messages.
    fn into_record(self, row: usize) -> Result<Record> {
        if !self.sales.is_finite() || self.sales < 0.0 {
            return Err(DataError::invalid(
                row,
                "Sales",
                self.sales,
                "must be finite and >= 0",
            ));
        }
        if !self.profit.is_finite() {
            return Err(DataError::invalid(
                row,
                "Profit",
                self.profit,
                "must be finite",
            ));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(DataError::invalid(
                row,
                "Discount",
                self.discount,
                "must be between 0 and 1",
            ));
        }
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            DataError::invalid(row, "Quantity", self.quantity, "must be >= 0")
        })?;

        Ok(Record {
            order_date: parse_date(&self.order_date, row, "Order Date")?,
            ship_date: parse_date(&self.ship_date, row, "Ship Date")?,
            order_id: self.order_id,
            region: self.region,
            category: self.category,
            sub_category: self.sub_category,
            segment: self.segment,
            sales: self.sales,
            profit: self.profit,
            discount: self.discount,
            quantity,
        })
    }
}

fn parse_date(s: &str, row: usize, column: &str) -> Result<NaiveDate> {
    let s = s.trim();
    // drop a time part: "2016-11-08 00:00:00" or "2016-11-08T00:00:00"
    let day = s
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
        .ok_or_else(|| DataError::invalid(row, column, s, "unrecognised date"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Record>> {
    let text = decode_text(read_input(path)?);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    check_columns(reader.headers()?.iter())?;

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<RawRow>().enumerate() {
        let raw = result?;
        records.push(raw.into_record(i + 1)?);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`
/// with `date_format='iso'`):
///
/// ```json
/// [
///   { "Order ID": "CA-2016-152156", "Order Date": "2016-11-08", "Sales": 261.96, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Record>> {
    let text = decode_text(read_input(path)?);
    let rows: Vec<Map<String, JsonValue>> = serde_json::from_str(&text)?;

    if let Some(first) = rows.first() {
        check_columns(first.keys().map(String::as_str))?;
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, obj)| {
            let raw: RawRow = serde_json::from_value(JsonValue::Object(obj))?;
            raw.into_record(i + 1)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`), Polars or the
/// `generate_sample` binary.
///
/// Text columns may be any type with a display form (Utf8, LargeUtf8,
/// integers for IDs, Date32/Date64/Timestamp for dates). Measure columns may
/// be any numeric type.
fn load_parquet(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path).map_err(|source| DataError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    // a file with no row groups yields no batches, so check the file schema
    let schema = builder.schema();
    check_columns(schema.fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let offset = records.len();
        records.extend(batch_records(&batch, offset)?);
    }
    Ok(records)
}

fn batch_records(batch: &RecordBatch, offset: usize) -> Result<Vec<Record>> {
    let schema = batch.schema();

    // presence was checked in `load_parquet`; only "Order ID" has an alternative spelling
    let column = |name: &str| -> ArrayRef {
        let idx = schema
            .index_of(name)
            .or_else(|_| schema.index_of(ORDER_ID_ALIAS))
            .unwrap_or_default();
        batch.column(idx).clone()
    };

    let order_id = column("Order ID");
    let order_date = column("Order Date");
    let ship_date = column("Ship Date");
    let region = column("Region");
    let category = column("Category");
    let sub_category = column("Sub-Category");
    let segment = column("Segment");
    let sales = cast(&column("Sales"), &DataType::Float64)?;
    let profit = cast(&column("Profit"), &DataType::Float64)?;
    let discount = cast(&column("Discount"), &DataType::Float64)?;
    let quantity = cast(&column("Quantity"), &DataType::Int64)?;

    (0..batch.num_rows())
        .map(|i| {
            let row = offset + i + 1;
            let text = |col: &ArrayRef, name: &str| text_at(col, i, row, name);
            let raw = RawRow {
                order_id: text(&order_id, "Order ID")?,
                order_date: text(&order_date, "Order Date")?,
                ship_date: text(&ship_date, "Ship Date")?,
                region: text(&region, "Region")?,
                category: text(&category, "Category")?,
                sub_category: text(&sub_category, "Sub-Category")?,
                segment: text(&segment, "Segment")?,
                sales: float_at(&sales, i, row, "Sales")?,
                profit: float_at(&profit, i, row, "Profit")?,
                discount: float_at(&discount, i, row, "Discount")?,
                quantity: int_at(&quantity, i, row, "Quantity")?,
            };
            raw.into_record(row)
        })
        .collect()
}

// -- Arrow helpers --

fn text_at(col: &ArrayRef, i: usize, row: usize, name: &str) -> Result<String> {
    if col.is_null(i) {
        return Err(DataError::invalid(row, name, "<null>", "missing value"));
    }
    Ok(array_value_to_string(col, i)?)
}

fn float_at(col: &ArrayRef, i: usize, row: usize, name: &str) -> Result<f64> {
    if col.is_null(i) {
        return Err(DataError::invalid(row, name, "<null>", "missing value"));
    }
    Ok(col.as_primitive::<Float64Type>().value(i))
}

fn int_at(col: &ArrayRef, i: usize, row: usize, name: &str) -> Result<i64> {
    if col.is_null(i) {
        return Err(DataError::invalid(row, name, "<null>", "missing value"));
    }
    Ok(col.as_primitive::<Int64Type>().value(i))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::data::fixtures::date;

    const HEADER: &str = "Row ID,Order ID,Order Date,Ship Date,Ship Mode,Segment,Region,Category,Sub-Category,Sales,Quantity,Discount,Profit";

    fn write_temp(suffix: &str, bytes: &[u8]) -> NamedTempFile {
        let mut tmp = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        tmp.write_all(bytes).unwrap();
        tmp
    }

    #[test]
    fn test_load_csv() {
        let csv = format!(
            "{HEADER}\n\
             1,CA-2016-152156,11/8/2016,11/11/2016,Second Class,Consumer,South,Furniture,Bookcases,261.96,2,0,41.9136\n\
             2,CA-2016-152156,11/8/2016,11/11/2016,Second Class,Consumer,South,Furniture,Chairs,731.94,3,0,219.582\n\
             3,US-2015-108966,10/11/2015,10/18/2015,Standard Class,Consumer,South,Furniture,Tables,957.5775,5,0.45,-383.031\n"
        );
        let tmp = write_temp(".csv", csv.as_bytes());
        let ds = load_file(tmp.path()).unwrap();

        assert_eq!(ds.len(), 3);
        let first = &ds.records()[0];
        assert_eq!(first.order_id, "CA-2016-152156");
        assert_eq!(first.order_date, date(2016, 11, 8));
        assert_eq!(first.ship_date, date(2016, 11, 11));
        assert_eq!(first.sub_category, "Bookcases");
        assert_eq!(first.quantity, 2);
        assert_eq!(ds.records()[2].discount, 0.45);
        assert_eq!(ds.records()[2].profit, -383.031);
    }

    #[test]
    fn test_missing_file_is_missing_input() {
        let missing = Path::new("/definitely/not/here.csv");
        let err = load_file(missing).unwrap_err();
        assert!(matches!(err, DataError::MissingInput { .. }), "{err}");
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = "Order ID,Order Date,Ship Date,Region,Category,Sub-Category,Segment,Sales,Discount,Quantity\n";
        let tmp = write_temp(".csv", csv.as_bytes());
        match load_file(tmp.path()).unwrap_err() {
            DataError::Schema { missing } => assert_eq!(missing, vec!["Profit".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_order_id_alias_is_accepted() {
        let csv = "OrderID,Order Date,Ship Date,Region,Category,Sub-Category,Segment,Sales,Profit,Discount,Quantity\n\
                   A-1,2023-01-05,2023-01-07,West,Technology,Phones,Consumer,10.5,2.0,0.1,1\n";
        let tmp = write_temp(".csv", csv.as_bytes());
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.records()[0].order_id, "A-1");
    }

    #[test]
    fn test_latin1_bytes_are_decoded() {
        let mut bytes = format!("{HEADER}\n").into_bytes();
        bytes.extend_from_slice(
            b"1,A-1,1/5/2023,1/7/2023,First Class,Consumer,West,Technology,T\xe9l\xe9phones,10,1,0,1\n",
        );
        let tmp = write_temp(".csv", &bytes);
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.records()[0].sub_category, "Téléphones");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            ("1/5/2023", "-1", "0", "1", "Sales"),
            ("1/5/2023", "inf", "0", "1", "Sales"),
            ("1/5/2023", "10", "1.5", "1", "Discount"),
            ("1/5/2023", "10", "0", "-2", "Quantity"),
            ("not a date", "10", "0", "1", "Order Date"),
        ];
        for (date, sales, discount, quantity, bad) in cases {
            let csv = format!(
                "{HEADER}\n1,A-1,{date},1/7/2023,First Class,Consumer,West,Technology,Phones,{sales},{quantity},{discount},1\n"
            );
            let tmp = write_temp(".csv", csv.as_bytes());
            match load_file(tmp.path()).unwrap_err() {
                DataError::InvalidValue { row, column, .. } => {
                    assert_eq!(row, 1);
                    assert_eq!(column, bad);
                }
                other => panic!("expected invalid {bad}, got {other}"),
            }
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let tmp = write_temp(".xlsx", b"");
        assert!(matches!(
            load_file(tmp.path()).unwrap_err(),
            DataError::UnsupportedFormat(ext) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_load_json() {
        let json = r#"[
            {"Order ID": "A-1", "Order Date": "2023-01-05", "Ship Date": "2023-01-09",
             "Region": "West", "Category": "Technology", "Sub-Category": "Phones",
             "Segment": "Corporate", "Sales": 99.5, "Profit": -3.25, "Discount": 0.2,
             "Quantity": 4, "Customer Name": "Zoë"}
        ]"#;
        let tmp = write_temp(".json", json.as_bytes());
        let ds = load_file(tmp.path()).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.segment, "Corporate");
        assert_eq!(rec.profit, -3.25);
        assert_eq!(rec.quantity, 4);
    }

    #[test]
    fn test_json_schema_check() {
        let json = r#"[{"Order ID": "A-1", "Sales": 1.0}]"#;
        let tmp = write_temp(".json", json.as_bytes());
        match load_file(tmp.path()).unwrap_err() {
            DataError::Schema { missing } => {
                assert!(missing.contains(&"Region".to_string()));
                assert!(!missing.contains(&"Order ID".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_parquet() {
        let text = |v: &str| -> ArrayRef { Arc::new(StringArray::from(vec![v, v])) };
        // 19362 days after the epoch is 2023-01-05
        let dates = || -> ArrayRef { Arc::new(Date32Array::from(vec![19362, 19363])) };

        let fields: Vec<Field> = vec![
            Field::new("Order ID", DataType::Utf8, false),
            Field::new("Order Date", DataType::Date32, false),
            Field::new("Ship Date", DataType::Date32, false),
            Field::new("Region", DataType::Utf8, false),
            Field::new("Category", DataType::Utf8, false),
            Field::new("Sub-Category", DataType::Utf8, false),
            Field::new("Segment", DataType::Utf8, false),
            Field::new("Sales", DataType::Float64, false),
            Field::new("Profit", DataType::Float64, false),
            Field::new("Discount", DataType::Float64, false),
            Field::new("Quantity", DataType::Int64, false),
        ];
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                text("A-1"),
                dates(),
                dates(),
                text("East"),
                text("Furniture"),
                text("Chairs"),
                text("Home Office"),
                Arc::new(Float64Array::from(vec![10.0, 20.0])),
                Arc::new(Float64Array::from(vec![1.0, -2.0])),
                Arc::new(Float64Array::from(vec![0.0, 0.5])),
                Arc::new(Int64Array::from(vec![1, 3])),
            ],
        )
        .unwrap();

        let tmp = write_temp(".parquet", b"");
        let mut writer = ArrowWriter::try_new(tmp.reopen().unwrap(), schema, None)
            .unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].order_date, date(2023, 1, 5));
        assert_eq!(ds.records()[1].order_date, date(2023, 1, 6));
        assert_eq!(ds.records()[1].profit, -2.0);
        assert_eq!(ds.records()[1].quantity, 3);
        assert_eq!(ds.regions().iter().collect::<Vec<_>>(), vec!["East"]);
    }

    #[test]
    fn test_parquet_without_rows_still_checks_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Order ID", DataType::Utf8, false),
            Field::new("Sales", DataType::Float64, false),
        ]));
        let tmp = write_temp(".parquet", b"");
        // no write: the file holds a schema and zero row groups
        let writer = ArrowWriter::try_new(tmp.reopen().unwrap(), schema, None)
            .unwrap();
        writer.close().unwrap();

        match load_file(tmp.path()).unwrap_err() {
            DataError::Schema { missing } => {
                assert!(missing.contains(&"Region".to_string()));
                assert!(missing.contains(&"Profit".to_string()));
                assert!(!missing.contains(&"Sales".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
