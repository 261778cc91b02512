//! CSV export of fact series.

use polars::prelude::*;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A series row had a null cell.
    #[error("Missing {column} at row {row}")]
    MissingValue {
        /// Column name
        column: &'static str,
        /// Row index
        row: usize,
    },
}

#[derive(Debug, Serialize)]
struct SeriesRecord<'a> {
    metric: &'a str,
    period_end: &'a str,
    term: &'a str,
    value: f64,
}

/// Write a series frame (`period_end`, `term`, `value`) as CSV, labelling
/// each row with `metric`. Returns the number of rows written.
pub fn write_series_csv<W: Write>(
    writer: W,
    metric: &str,
    frame: &DataFrame,
) -> Result<usize, ExportError> {
    let dates = frame.column("period_end")?.cast(&DataType::String)?;
    let dates = dates.str()?;
    let terms = frame.column("term")?.str()?;
    let values = frame.column("value")?.f64()?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in 0..frame.height() {
        let record = SeriesRecord {
            metric,
            period_end: dates
                .get(row)
                .ok_or(ExportError::MissingValue { column: "period_end", row })?,
            term: terms.get(row).ok_or(ExportError::MissingValue { column: "term", row })?,
            value: values.get(row).ok_or(ExportError::MissingValue { column: "value", row })?,
        };
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(frame.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_series_csv() {
        let frame = DataFrame::new(vec![
            Series::new("period_end".into(), vec!["2023-03-31", "2023-06-30"]).into(),
            Series::new("term".into(), vec!["3M", "6M"]).into(),
            Series::new("value".into(), vec![1.5, 2.5]).into(),
        ])
        .unwrap()
        .lazy()
        .with_column(col("period_end").cast(DataType::Date))
        .collect()
        .unwrap();

        let mut out = Vec::new();
        let rows = write_series_csv(&mut out, "Net Profit", &frame).unwrap();

        assert_eq!(rows, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "metric,period_end,term,value\n\
             Net Profit,2023-03-31,3M,1.5\n\
             Net Profit,2023-06-30,6M,2.5\n"
        );
    }
}
