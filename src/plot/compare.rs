use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::metrics::aggregate::{AggregatedSeries, ReferenceValue};
use crate::sweep::catalog::{BaselineCatalog, SweepCatalog};
use crate::sweep::style::Style;

/// One swept configuration drawn as a per-sample-size curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub label: String,
    pub style: Style,
    pub xs: Vec<u64>,
    pub ys: Vec<f64>,
}

/// One baseline configuration drawn as a constant line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub label: String,
    pub style: Style,
    pub y: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonChartSpec {
    pub curves: Vec<Curve>,
    pub references: Vec<ReferenceLine>,
}

/// Pair the swept curves with the baseline reference lines.
///
/// `series[i]` belongs to `catalog.entries()[i]` and `references[j]` to
/// `baselines.entries()[j]`. A baseline whose parameter equals a sweep
/// entry's parameter takes the palette's reference style at that entry's
/// position; the others continue the palette after the last sweep entry.
pub fn compare(
    catalog: &SweepCatalog,
    series: Vec<AggregatedSeries>,
    baselines: &BaselineCatalog,
    references: Vec<ReferenceValue>,
) -> Result<ComparisonChartSpec> {
    if series.len() != catalog.len() {
        return Err(Error::SeriesMismatch {
            what: "aggregated series",
            expected: catalog.len(),
            found: series.len(),
        });
    }
    if references.len() != baselines.len() {
        return Err(Error::SeriesMismatch {
            what: "reference values",
            expected: baselines.len(),
            found: references.len(),
        });
    }

    let curves = catalog
        .entries()
        .iter()
        .zip(series)
        .map(|(entry, series)| {
            let (xs, ys): (Vec<u64>, Vec<f64>) = series.points().iter().copied().unzip();
            Curve { label: entry.label.clone(), style: entry.style, xs, ys }
        })
        .collect();

    let palette = catalog.palette();
    let mut next_unpaired = catalog.len();

    let mut lines = Vec::with_capacity(references.len());
    for (entry, reference) in baselines.entries().iter().zip(references) {
        let style = match catalog.position(entry.parameter) {
            Some(index) => palette.reference_style(index),
            None => {
                let style = palette.reference_style(next_unpaired);
                next_unpaired += 1;
                style
            }
        };
        debug!(label = %entry.label, value = reference.value, "reference line");
        lines.push(ReferenceLine { label: entry.label.clone(), style, y: reference.value });
    }

    Ok(ComparisonChartSpec { curves, references: lines })
}
