use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One row of a run log. Which positional column fills which field is decided
/// by the [`Schema`] the file was loaded with, never by the file itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub sample_size: Option<u64>,
    pub throughput: Option<f64>,
    pub latency: Option<f64>,
    pub bytes: Option<f64>,
}

/// Value column a chart is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Throughput,
    Latency,
    Bytes,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Throughput => "throughput",
            Metric::Latency => "latency",
            Metric::Bytes => "bytes",
        }
    }

    pub fn select(&self, record: &MeasurementRecord) -> Option<f64> {
        match self {
            Metric::Throughput => record.throughput,
            Metric::Latency => record.latency,
            Metric::Bytes => record.bytes,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a log file was produced to measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Throughput,
    Latency,
    Saturation,
}

impl LogKind {
    pub fn metric(&self) -> Metric {
        match self {
            LogKind::Throughput => Metric::Throughput,
            LogKind::Latency => Metric::Latency,
            LogKind::Saturation => Metric::Bytes,
        }
    }
}

/// Explicit column layout of a log file.
///
/// The same positional column means different things in different producers
/// (column 1 is the ordered block count in a sweep run but the latency in a
/// two-column baseline run), so every load names its layout up front.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub kind: LogKind,
    /// Exact number of fields on every line.
    pub width: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
}

impl Schema {
    /// `sample_size ordered_blocks latency`, written by threshold sweeps.
    pub fn sweep_run(kind: LogKind) -> Self {
        Self {
            kind,
            width: 3,
            sample_size: Some(0),
            throughput: Some(1),
            latency: Some(2),
            bytes: None,
        }
    }

    /// `sample_size ordered_blocks latency nic_load avg_virtual_size`,
    /// written by bandwidth sweeps. The last column is not charted.
    pub fn bandwidth_run(kind: LogKind) -> Self {
        Self {
            kind,
            width: 5,
            sample_size: Some(0),
            throughput: Some(1),
            latency: Some(2),
            bytes: Some(3),
        }
    }

    /// `blocks latency`, the two-column baseline tier logs.
    pub fn baseline_scalar(kind: LogKind) -> Self {
        Self {
            kind,
            width: 2,
            sample_size: None,
            throughput: Some(0),
            latency: Some(1),
            bytes: None,
        }
    }

    /// `sample_size blocks nic_load`, the baseline NIC measurement run.
    pub fn baseline_run(kind: LogKind) -> Self {
        Self {
            kind,
            width: 3,
            sample_size: Some(0),
            throughput: Some(1),
            latency: None,
            bytes: Some(2),
        }
    }

    pub fn column(&self, metric: Metric) -> Option<usize> {
        match metric {
            Metric::Throughput => self.throughput,
            Metric::Latency => self.latency,
            Metric::Bytes => self.bytes,
        }
    }

    fn mapped(&self) -> [(&'static str, Option<usize>); 4] {
        [
            ("sample_size", self.sample_size),
            ("throughput", self.throughput),
            ("latency", self.latency),
            ("bytes", self.bytes),
        ]
    }

    /// Checks that the descriptor is self-consistent: indices in range,
    /// no column used twice, and the column backing `kind` mapped.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(Error::InvalidSchema("width must be at least 1".into()));
        }
        let mut seen = vec![None; self.width];
        for (name, index) in self.mapped() {
            let Some(index) = index else { continue };
            if index >= self.width {
                return Err(Error::InvalidSchema(format!(
                    "{name} column {index} is outside a {}-column layout",
                    self.width
                )));
            }
            if let Some(other) = seen[index].replace(name) {
                return Err(Error::InvalidSchema(format!(
                    "column {index} mapped to both {other} and {name}"
                )));
            }
        }
        let required = self.kind.metric();
        if self.column(required).is_none() {
            return Err(Error::InvalidSchema(format!(
                "{:?} log must map a {} column",
                self.kind,
                required.name()
            )));
        }
        Ok(())
    }
}

/// Identity of the run that produced a log, e.g. `Sparse Bullshark, threshold=1.3`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceId {
    pub protocol: String,
    pub dimension: String,
    pub parameter: f64,
}

impl SourceId {
    pub fn new(protocol: impl Into<String>, dimension: impl Into<String>, parameter: f64) -> Self {
        Self { protocol: protocol.into(), dimension: dimension.into(), parameter }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}={}", self.protocol, self.dimension, self.parameter)
    }
}

/// Non-empty, ordered records of one log file sharing one schema and source.
/// Every field the schema maps is filled on every record.
#[derive(Clone, Debug)]
pub struct RunLog {
    source: SourceId,
    path: PathBuf,
    schema: Schema,
    records: Vec<MeasurementRecord>,
}

impl RunLog {
    pub fn new(
        source: SourceId,
        path: impl Into<PathBuf>,
        schema: Schema,
        records: Vec<MeasurementRecord>,
    ) -> Result<Self> {
        let path = path.into();
        if records.is_empty() {
            return Err(Error::EmptyRunLog { path });
        }
        for (index, record) in records.iter().enumerate() {
            let fields = [
                ("sample_size", schema.sample_size, record.sample_size.is_some()),
                ("throughput", schema.throughput, record.throughput.is_some()),
                ("latency", schema.latency, record.latency.is_some()),
                ("bytes", schema.bytes, record.bytes.is_some()),
            ];
            if let Some((name, ..)) = fields.iter().find(|(_, column, filled)| column.is_some() && !filled) {
                return Err(Error::malformed(
                    &path,
                    index as u64 + 1,
                    format!("mapped field `{name}` is empty"),
                ));
            }
        }
        Ok(Self { source, path, schema, records })
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fails unless the schema maps `metric`.
    pub fn require(&self, metric: Metric) -> Result<()> {
        match self.schema.column(metric) {
            Some(_) => Ok(()),
            None => Err(Error::MissingColumn {
                source_id: self.source.to_string(),
                column: metric.name(),
            }),
        }
    }

    pub fn require_sample_size(&self) -> Result<()> {
        match self.schema.sample_size {
            Some(_) => Ok(()),
            None => Err(Error::MissingColumn {
                source_id: self.source.to_string(),
                column: "sample_size",
            }),
        }
    }
}
