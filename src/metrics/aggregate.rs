use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::record::{Metric, RunLog, SourceId};
use crate::error::Result;

/// Mean of one metric per distinct sample size, ascending by sample size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSeries {
    pub source: SourceId,
    pub metric: Metric,
    points: Vec<(u64, f64)>,
}

impl AggregatedSeries {
    pub fn points(&self) -> &[(u64, f64)] {
        &self.points
    }

    pub fn sample_sizes(&self) -> impl Iterator<Item = u64> + '_ {
        self.points.iter().map(|(x, _)| *x)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, y)| *y)
    }

    pub fn get(&self, sample_size: u64) -> Option<f64> {
        self.points
            .binary_search_by_key(&sample_size, |(x, _)| *x)
            .ok()
            .map(|i| self.points[i].1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A baseline run collapsed to a single number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValue {
    pub source: SourceId,
    pub metric: Metric,
    pub value: f64,
}

/// How a baseline run log is collapsed into its [`ReferenceValue`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceReduction {
    /// Mean over every record.
    #[default]
    Mean,
    /// Mean per sample size first, then the mean of those means, so that
    /// sample sizes with more repetitions do not weigh more.
    MeanOfGroupMeans,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Group `log` by sample size and average `metric` within each group.
pub fn aggregate(log: &RunLog, metric: Metric) -> Result<AggregatedSeries> {
    log.require(metric)?;
    log.require_sample_size()?;

    let mut groups: BTreeMap<u64, Accumulator> = BTreeMap::new();
    for record in log.records() {
        // Both columns are mapped, so every record fills them.
        if let (Some(x), Some(y)) = (record.sample_size, metric.select(record)) {
            groups.entry(x).or_default().push(y);
        }
    }

    let points: Vec<(u64, f64)> = groups.into_iter().map(|(x, acc)| (x, acc.mean())).collect();
    debug!(source = %log.source(), %metric, groups = points.len(), "aggregated series");
    Ok(AggregatedSeries { source: log.source().clone(), metric, points })
}

/// Average `metric` over the whole log, ignoring sample size.
pub fn aggregate_scalar(log: &RunLog, metric: Metric) -> Result<ReferenceValue> {
    log.require(metric)?;

    let mut acc = Accumulator::default();
    log.records().iter().filter_map(|r| metric.select(r)).for_each(|y| acc.push(y));

    debug!(source = %log.source(), %metric, value = acc.mean(), "aggregated reference");
    Ok(ReferenceValue { source: log.source().clone(), metric, value: acc.mean() })
}

pub fn reduce_reference(
    log: &RunLog,
    metric: Metric,
    reduction: ReferenceReduction,
) -> Result<ReferenceValue> {
    match reduction {
        ReferenceReduction::Mean => aggregate_scalar(log, metric),
        ReferenceReduction::MeanOfGroupMeans => {
            let series = aggregate(log, metric)?;
            let mut acc = Accumulator::default();
            series.values().for_each(|y| acc.push(y));
            Ok(ReferenceValue { source: series.source, metric, value: acc.mean() })
        }
    }
}
