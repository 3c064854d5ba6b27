use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::data::record::RunLog;
use crate::error::Result;

/// A [`RunLog`] laid out column-wise, one column per mapped field.
#[derive(Clone)]
pub struct ColumnarTable {
    pub df: DataFrame,
}

impl ColumnarTable {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    /// Build the frame for a run log. Unmapped fields get no column.
    pub fn from_run_log(log: &RunLog) -> Result<Self> {
        let schema = log.schema();
        let records = log.records();
        let mut columns = Vec::new();

        if schema.sample_size.is_some() {
            let values: Vec<Option<u64>> = records.iter().map(|r| r.sample_size).collect();
            columns.push(Series::new("sample_size", values.as_slice()));
        }
        if schema.throughput.is_some() {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.throughput).collect();
            columns.push(Series::new("throughput", values.as_slice()));
        }
        if schema.latency.is_some() {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.latency).collect();
            columns.push(Series::new("latency", values.as_slice()));
        }
        if schema.bytes.is_some() {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.bytes).collect();
            columns.push(Series::new("bytes", values.as_slice()));
        }

        Ok(Self::new(DataFrame::new(columns)?))
    }

    /// Extract a value column as `Vec<f64>`
    pub fn column_f64(&self, col: &str) -> Option<Vec<f64>> {
        self.df.column(col).ok()?.f64().ok().map(|s| s.into_no_null_iter().collect())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df.get_column_names().into_iter().map(String::from).collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}
