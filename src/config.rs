use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::data::loader::DEFAULT_DELIMITER;
use crate::data::record::{LogKind, Metric, Schema};
use crate::error::{Error, Result};
use crate::metrics::aggregate::ReferenceReduction;
use crate::metrics::units::UnitConversion;
use crate::plot::chart::{AxisLabels, ChartBuilder, FigureSize, LegendPosition, TickRange};
use crate::sweep::catalog::{BaselineCatalog, BaselineEntry, SweepCatalog};
use crate::sweep::style::Palette;

const SPARSE: &str = "Sparse Bullshark";
const BASELINE: &str = "Bullshark";
const SAMPLE_SIZE: &str = "Sample size";

/// The built-in charts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    /// Latency of each quorum threshold, 1.0 to 2.0 times f, plus one.
    ThresholdLatency,
    /// Latency of the 5/10/20 Mb/s sweeps against the baseline tiers.
    BandwidthLatency,
    /// NIC load of the 2 Gb/s runs.
    NicSaturation,
    /// Ordered blocks per second of the 2 Gb/s runs.
    BlockRate,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::ThresholdLatency,
        ChartKind::BandwidthLatency,
        ChartKind::NicSaturation,
        ChartKind::BlockRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::ThresholdLatency => "threshold-latency",
            ChartKind::BandwidthLatency => "bandwidth-latency",
            ChartKind::NicSaturation => "nic-saturation",
            ChartKind::BlockRate => "block-rate",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryConfig {
    pub parameter: f64,
    pub file: PathBuf,
    pub label: String,
}

impl EntryConfig {
    fn new(parameter: f64, file: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self { parameter, file: file.into(), label: label.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub protocol: String,
    pub dimension: String,
    pub schema: Schema,
    #[serde(default)]
    pub palette: Palette,
    pub entries: Vec<EntryConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    pub protocol: String,
    pub schema: Schema,
    #[serde(default)]
    pub reduction: ReferenceReduction,
    pub entries: Vec<EntryConfig>,
}

/// Everything needed to turn a directory of run logs into one chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub name: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    pub metric: Metric,
    #[serde(default)]
    pub conversion: UnitConversion,
    pub labels: AxisLabels,
    #[serde(default)]
    pub legend: LegendPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_ticks: Option<TickRange>,
    #[serde(default)]
    pub size: FigureSize,
    pub sweep: SweepConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baselines: Option<BaselineConfig>,
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER as char
}

impl ChartConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound { path: path.to_path_buf() },
            _ => Error::Io(e),
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| Error::InvalidSchema(format!("delimiter {:?} is not ascii", self.delimiter)))
    }

    /// A schema's kind names the metric its files were written to measure;
    /// charting another metric from them is rejected.
    fn check_kind(&self, section: &str, schema: &Schema) -> Result<()> {
        if schema.kind.metric() != self.metric {
            return Err(Error::InvalidSchema(format!(
                "{section} schema holds {:?} logs but {} charts {}",
                schema.kind, self.name, self.metric
            )));
        }
        Ok(())
    }

    pub fn sweep_catalog(&self) -> Result<SweepCatalog> {
        let sweep = &self.sweep;
        self.check_kind("sweep", &sweep.schema)?;
        let builder = SweepCatalog::builder(&sweep.protocol, &sweep.dimension, sweep.schema.clone())
            .palette(sweep.palette);
        sweep
            .entries
            .iter()
            .fold(builder, |b, e| b.entry(e.parameter, &e.file, &e.label))
            .build()
    }

    pub fn baseline_catalog(&self) -> Result<BaselineCatalog> {
        let Some(baselines) = &self.baselines else {
            return Ok(BaselineCatalog::empty(self.sweep.schema.clone()));
        };
        self.check_kind("baseline", &baselines.schema)?;
        let entries = baselines
            .entries
            .iter()
            .map(|e| BaselineEntry {
                parameter: OrderedFloat(e.parameter),
                source: e.file.clone(),
                label: e.label.clone(),
            })
            .collect();
        BaselineCatalog::new(
            &baselines.protocol,
            &self.sweep.dimension,
            baselines.schema.clone(),
            baselines.reduction,
            entries,
        )
    }

    pub fn chart_builder(&self) -> ChartBuilder {
        ChartBuilder::new(self.labels.clone())
            .conversion(self.conversion)
            .y_ticks(self.y_ticks)
            .legend_position(self.legend)
            .size(self.size)
    }

    pub fn preset(kind: ChartKind) -> Self {
        match kind {
            ChartKind::ThresholdLatency => threshold_latency(),
            ChartKind::BandwidthLatency => bandwidth_latency(),
            ChartKind::NicSaturation => nic_saturation(),
            ChartKind::BlockRate => block_rate(),
        }
    }
}

fn threshold_latency() -> ChartConfig {
    let entries = [1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0]
        .into_iter()
        .map(|t: f64| {
            let quorum = if t == 1.0 { "f+1".to_string() } else { format!("{t}f+1") };
            EntryConfig::new(
                t,
                format!("sparse_bullshark_threshold_{t}.csv"),
                format!("{SPARSE} {quorum}"),
            )
        })
        .collect();

    ChartConfig {
        name: ChartKind::ThresholdLatency.name().into(),
        delimiter: default_delimiter(),
        metric: Metric::Latency,
        conversion: UnitConversion::per_hour(),
        labels: AxisLabels::new(SAMPLE_SIZE, "Latency (sec)"),
        legend: LegendPosition::UpperLeft,
        y_ticks: None,
        size: FigureSize { width: 1400, height: 600 },
        sweep: SweepConfig {
            protocol: SPARSE.into(),
            dimension: "threshold".into(),
            schema: Schema::sweep_run(LogKind::Latency),
            palette: Palette::Ramp,
            entries,
        },
        baselines: None,
    }
}

fn bandwidth_latency() -> ChartConfig {
    let tiers = [5.0, 10.0, 20.0];
    let sweep = tiers
        .iter()
        .map(|&mb| {
            EntryConfig::new(mb, format!("sparse_bullshark_{mb}.csv"), format!("{SPARSE} {mb}Mb/sec"))
        })
        .collect();
    let baselines = tiers
        .iter()
        .map(|&mb| EntryConfig::new(mb, format!("bullshark_{mb}.csv"), format!("{BASELINE} {mb}Mb/sec")))
        .collect();

    ChartConfig {
        name: ChartKind::BandwidthLatency.name().into(),
        delimiter: default_delimiter(),
        metric: Metric::Latency,
        conversion: UnitConversion::per_hour(),
        labels: AxisLabels::new(SAMPLE_SIZE, "Latency (sec)"),
        legend: LegendPosition::UpperLeft,
        y_ticks: None,
        size: FigureSize { width: 1400, height: 600 },
        sweep: SweepConfig {
            protocol: SPARSE.into(),
            dimension: "bandwidth".into(),
            schema: Schema::bandwidth_run(LogKind::Latency),
            palette: Palette::Paired,
            entries: sweep,
        },
        baselines: Some(BaselineConfig {
            protocol: BASELINE.into(),
            schema: Schema::baseline_scalar(LogKind::Latency),
            reduction: ReferenceReduction::Mean,
            entries: baselines,
        }),
    }
}

fn gigabit_sweep(kind: LogKind) -> SweepConfig {
    SweepConfig {
        protocol: SPARSE.into(),
        dimension: "bandwidth".into(),
        schema: Schema::bandwidth_run(kind),
        palette: Palette::Paired,
        entries: vec![EntryConfig::new(
            2000.0,
            "sparse_bullshark_2000.csv",
            format!("{SPARSE} 2Gb/sec"),
        )],
    }
}

fn gigabit_baseline(kind: LogKind, reduction: ReferenceReduction) -> BaselineConfig {
    BaselineConfig {
        protocol: BASELINE.into(),
        schema: Schema::baseline_run(kind),
        reduction,
        entries: vec![EntryConfig::new(2000.0, "bullshark_2000.csv", format!("{BASELINE} 2Gb/sec"))],
    }
}

fn nic_saturation() -> ChartConfig {
    ChartConfig {
        name: ChartKind::NicSaturation.name().into(),
        delimiter: default_delimiter(),
        metric: Metric::Bytes,
        conversion: UnitConversion::bytes_per_ms_to_mbps(),
        labels: AxisLabels::new(SAMPLE_SIZE, "Network card saturation Mb/sec"),
        legend: LegendPosition::UpperLeft,
        y_ticks: None,
        size: FigureSize::default(),
        sweep: gigabit_sweep(LogKind::Saturation),
        baselines: Some(gigabit_baseline(LogKind::Saturation, ReferenceReduction::MeanOfGroupMeans)),
    }
}

fn block_rate() -> ChartConfig {
    ChartConfig {
        name: ChartKind::BlockRate.name().into(),
        delimiter: default_delimiter(),
        metric: Metric::Throughput,
        conversion: UnitConversion::per_hour(),
        labels: AxisLabels::new(SAMPLE_SIZE, "Blocks per second"),
        legend: LegendPosition::UpperRight,
        y_ticks: Some(TickRange { start: 0.0, end: 100.0, step: 10.0 }),
        size: FigureSize::default(),
        sweep: gigabit_sweep(LogKind::Throughput),
        baselines: Some(gigabit_baseline(LogKind::Throughput, ReferenceReduction::Mean)),
    }
}
