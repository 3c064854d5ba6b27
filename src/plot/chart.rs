use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::units::UnitConversion;
use crate::plot::compare::{ComparisonChartSpec, Curve, ReferenceLine};
use crate::sweep::style::Style;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub x: String,
    pub y: String,
}

impl AxisLabels {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self { title: None, x: x.into(), y: y.into() }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Fixed y ticks `start, start + step, ..` up to and including `end`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

/// Upper bound on the number of ticks one range may produce.
pub const MAX_TICKS: usize = 1000;

impl TickRange {
    /// Number of steps after `start`, if the range is drawable.
    fn steps(&self) -> Result<usize> {
        let invalid = |reason: String| Err(Error::InvalidTicks(reason));
        if !(self.start.is_finite() && self.end.is_finite() && self.step.is_finite()) {
            return invalid(format!("{self:?} has a non-finite bound or step"));
        }
        if self.step <= 0.0 {
            return invalid(format!("step {} must be positive", self.step));
        }
        if self.end < self.start {
            return invalid(format!("end {} is below start {}", self.end, self.start));
        }
        let steps = ((self.end - self.start) / self.step + 1e-9).floor();
        if steps >= MAX_TICKS as f64 {
            return invalid(format!("{self:?} yields more than {MAX_TICKS} ticks"));
        }
        Ok(steps as usize)
    }

    pub fn validate(&self) -> Result<()> {
        self.steps().map(|_| ())
    }

    /// Tick positions, empty when the range is not drawable.
    pub fn values(&self) -> Vec<f64> {
        match self.steps() {
            Ok(steps) => (0..=steps).map(|i| self.start + i as f64 * self.step).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    #[default]
    UpperLeft,
    UpperRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: usize,
    pub height: usize,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self { width: 800, height: 600 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendKind {
    Curve,
    Reference,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub style: Style,
    pub kind: LegendKind,
}

/// A finished chart, in display units, ready for a renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub labels: AxisLabels,
    /// Every distinct sample size across all curves, ascending.
    pub x_ticks: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_ticks: Option<TickRange>,
    pub legend_position: LegendPosition,
    pub size: FigureSize,
    pub curves: Vec<Curve>,
    pub references: Vec<ReferenceLine>,
}

impl ChartSpec {
    /// Curves in sweep order, then reference lines in baseline order.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let curves = self.curves.iter().map(|c| LegendEntry {
            label: c.label.clone(),
            style: c.style,
            kind: LegendKind::Curve,
        });
        let references = self.references.iter().map(|r| LegendEntry {
            label: r.label.clone(),
            style: r.style,
            kind: LegendKind::Reference,
        });
        curves.chain(references).collect()
    }

    /// Horizontal extent reference lines are drawn across.
    pub fn x_extent(&self) -> (u64, u64) {
        match (self.x_ticks.first(), self.x_ticks.last()) {
            (Some(lo), Some(hi)) => (*lo, *hi),
            _ => (0, 1),
        }
    }
}

pub struct ChartBuilder {
    labels: AxisLabels,
    conversion: UnitConversion,
    y_ticks: Option<TickRange>,
    legend_position: LegendPosition,
    size: FigureSize,
}

impl ChartBuilder {
    pub fn new(labels: AxisLabels) -> Self {
        Self {
            labels,
            conversion: UnitConversion::identity(),
            y_ticks: None,
            legend_position: LegendPosition::default(),
            size: FigureSize::default(),
        }
    }

    pub fn conversion(mut self, conversion: UnitConversion) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn y_ticks(mut self, y_ticks: Option<TickRange>) -> Self {
        self.y_ticks = y_ticks;
        self
    }

    pub fn legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }

    pub fn size(mut self, size: FigureSize) -> Self {
        self.size = size;
        self
    }

    pub fn build(self, comparison: ComparisonChartSpec) -> Result<ChartSpec> {
        if comparison.curves.is_empty() && comparison.references.is_empty() {
            return Err(Error::EmptyChart);
        }
        if let Some(ticks) = &self.y_ticks {
            ticks.validate()?;
        }
        if let Some(c) = comparison.curves.iter().find(|c| c.xs.len() != c.ys.len()) {
            return Err(Error::SeriesMismatch {
                what: "curve values",
                expected: c.xs.len(),
                found: c.ys.len(),
            });
        }

        let conv = self.conversion;
        let x_ticks: BTreeSet<u64> =
            comparison.curves.iter().flat_map(|c| c.xs.iter().copied()).collect();

        let curves = comparison
            .curves
            .into_iter()
            .map(|c| Curve { ys: c.ys.into_iter().map(|y| conv.apply(y)).collect(), ..c })
            .collect();
        let references = comparison
            .references
            .into_iter()
            .map(|r| ReferenceLine { y: conv.apply(r.y), ..r })
            .collect();

        Ok(ChartSpec {
            labels: self.labels,
            x_ticks: x_ticks.into_iter().collect(),
            y_ticks: self.y_ticks,
            legend_position: self.legend_position,
            size: self.size,
            curves,
            references,
        })
    }
}

/// [`ChartBuilder`] with default ticks, legend and size.
pub fn build(
    comparison: ComparisonChartSpec,
    conversion: UnitConversion,
    labels: AxisLabels,
) -> Result<ChartSpec> {
    ChartBuilder::new(labels).conversion(conversion).build(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::style::Palette;
    use proptest::prelude::*;

    fn curve(label: &str, xs: Vec<u64>, ys: Vec<f64>) -> Curve {
        Curve { label: label.into(), style: Palette::Ramp.curve_style(0), xs, ys }
    }

    fn reference(label: &str, y: f64) -> ReferenceLine {
        ReferenceLine { label: label.into(), style: Palette::Paired.reference_style(0), y }
    }

    fn labels() -> AxisLabels {
        AxisLabels::new("Sample size", "Latency (sec)")
    }

    #[test]
    fn x_ticks_are_exact_sample_sizes() {
        let comparison = ComparisonChartSpec {
            curves: vec![
                curve("a", vec![100, 300], vec![1.0, 2.0]),
                curve("b", vec![100, 250, 1300], vec![1.0, 2.0, 3.0]),
            ],
            references: vec![],
        };
        let chart = build(comparison, UnitConversion::identity(), labels()).unwrap();
        assert_eq!(chart.x_ticks, vec![100, 250, 300, 1300]);
    }

    #[test]
    fn conversion_applies_to_curves_and_references() {
        let comparison = ComparisonChartSpec {
            curves: vec![curve("a", vec![10, 20], vec![37800.0, 18000.0])],
            references: vec![reference("base", 37800.0)],
        };
        let chart = build(comparison, UnitConversion::per_hour(), labels()).unwrap();
        assert_eq!(chart.curves[0].ys, vec![10.5, 5.0]);
        assert_eq!(chart.references[0].y, 10.5);
    }

    #[test]
    fn legend_lists_curves_then_references() {
        let comparison = ComparisonChartSpec {
            curves: vec![curve("c1", vec![1], vec![1.0]), curve("c2", vec![1], vec![1.0])],
            references: vec![reference("r2", 1.0), reference("r1", 1.0)],
        };
        let chart = build(comparison, UnitConversion::identity(), labels()).unwrap();
        let legend: Vec<(String, LegendKind)> =
            chart.legend().into_iter().map(|e| (e.label, e.kind)).collect();
        assert_eq!(
            legend,
            vec![
                ("c1".to_string(), LegendKind::Curve),
                ("c2".to_string(), LegendKind::Curve),
                ("r2".to_string(), LegendKind::Reference),
                ("r1".to_string(), LegendKind::Reference),
            ]
        );
    }

    #[test]
    fn empty_comparison_is_rejected() {
        let err = build(ComparisonChartSpec::default(), UnitConversion::identity(), labels()).unwrap_err();
        assert!(matches!(err, Error::EmptyChart));
    }

    #[test]
    fn reference_only_chart_has_unit_extent() {
        let comparison = ComparisonChartSpec { curves: vec![], references: vec![reference("r", 2.0)] };
        let chart = build(comparison, UnitConversion::identity(), labels()).unwrap();
        assert!(chart.x_ticks.is_empty());
        assert_eq!(chart.x_extent(), (0, 1));
    }

    #[test]
    fn tick_range_is_inclusive() {
        let ticks = TickRange { start: 0.0, end: 100.0, step: 10.0 }.values();
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[10], 100.0);
        assert!(TickRange { start: 0.0, end: 1.0, step: 0.0 }.values().is_empty());
    }

    #[test]
    fn undrawable_tick_ranges_are_rejected() {
        let ranges = [
            TickRange { start: 0.0, end: f64::INFINITY, step: 10.0 },
            TickRange { start: f64::NAN, end: 100.0, step: 10.0 },
            TickRange { start: 0.0, end: 100.0, step: -1.0 },
            TickRange { start: 100.0, end: 0.0, step: 10.0 },
            TickRange { start: 0.0, end: 1e12, step: 1.0 },
        ];
        for ticks in ranges {
            assert!(ticks.values().is_empty());
            let comparison = ComparisonChartSpec {
                curves: vec![curve("a", vec![1], vec![1.0])],
                references: vec![],
            };
            let err = ChartBuilder::new(labels()).y_ticks(Some(ticks)).build(comparison).unwrap_err();
            assert!(matches!(err, Error::InvalidTicks(_)));
        }
    }

    proptest! {
        #[test]
        fn ticks_equal_sorted_distinct_samples(
            groups in prop::collection::vec(prop::collection::btree_set(0u64..5000, 1..20), 1..6)
        ) {
            let curves = groups
                .iter()
                .enumerate()
                .map(|(i, xs)| {
                    let xs: Vec<u64> = xs.iter().copied().collect();
                    let ys = vec![1.0; xs.len()];
                    curve(&format!("c{i}"), xs, ys)
                })
                .collect();
            let chart = build(
                ComparisonChartSpec { curves, references: vec![] },
                UnitConversion::identity(),
                labels(),
            )
            .unwrap();
            let mut expected: Vec<u64> = groups.iter().flatten().copied().collect();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(chart.x_ticks, expected);
        }
    }
}
