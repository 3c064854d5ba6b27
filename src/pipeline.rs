use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::ChartConfig;
use crate::data::loader::load_run_log;
use crate::data::record::RunLog;
use crate::error::{Error, Result};
use crate::metrics::aggregate::{aggregate, reduce_reference};
use crate::plot::chart::ChartSpec;
use crate::plot::compare::{compare, ComparisonChartSpec};
use crate::plot::render::{OutputFormat, Renderer};
use crate::sweep::catalog::resolve;

/// Load, aggregate and pair every run log the config names. Values are
/// still in logged units.
pub fn build_comparison(config: &ChartConfig, data_dir: &Path) -> Result<ComparisonChartSpec> {
    let delimiter = config.delimiter_byte()?;
    let catalog = config.sweep_catalog()?;
    let baselines = config.baseline_catalog()?;

    let series = catalog
        .entries()
        .iter()
        .map(|entry| {
            let path = resolve(data_dir, &entry.source);
            let log = load_run_log(&path, delimiter, catalog.schema(), catalog.source_id(entry))?;
            aggregate(&log, config.metric)
        })
        .collect::<Result<Vec<_>>>()?;

    let references = baselines
        .entries()
        .iter()
        .map(|entry| {
            let path = resolve(data_dir, &entry.source);
            let log =
                load_run_log(&path, delimiter, baselines.schema(), baselines.source_id(entry))?;
            reduce_reference(&log, config.metric, baselines.reduction())
        })
        .collect::<Result<Vec<_>>>()?;

    compare(&catalog, series, &baselines, references)
}

pub fn build_chart(config: &ChartConfig, data_dir: &Path) -> Result<ChartSpec> {
    info!(chart = %config.name, data_dir = %data_dir.display(), "building chart");
    let comparison = build_comparison(config, data_dir)?;
    let chart = config.chart_builder().build(comparison)?;
    info!(
        chart = %config.name,
        curves = chart.curves.len(),
        references = chart.references.len(),
        "chart built"
    );
    Ok(chart)
}

pub fn render_chart(
    config: &ChartConfig,
    data_dir: &Path,
    renderer: &dyn Renderer,
) -> Result<ChartSpec> {
    let chart = build_chart(config, data_dir)?;
    renderer.render(&chart)?;
    Ok(chart)
}

/// Load the run log behind one sweep or baseline entry, looked up by its
/// parameter. Sweep entries win over baselines with the same parameter.
pub fn load_entry(config: &ChartConfig, data_dir: &Path, parameter: f64) -> Result<RunLog> {
    let delimiter = config.delimiter_byte()?;
    let wanted = OrderedFloat(parameter);

    let catalog = config.sweep_catalog()?;
    if let Some(entry) = catalog.entries().iter().find(|e| e.parameter == wanted) {
        let path = resolve(data_dir, &entry.source);
        return load_run_log(&path, delimiter, catalog.schema(), catalog.source_id(entry));
    }

    let baselines = config.baseline_catalog()?;
    if let Some(entry) = baselines.entries().iter().find(|e| e.parameter == wanted) {
        let path = resolve(data_dir, &entry.source);
        return load_run_log(&path, delimiter, baselines.schema(), baselines.source_id(entry));
    }

    Err(Error::catalog(format!("{} has no entry with parameter {parameter}", config.name)))
}

#[derive(Debug)]
pub struct ChartOutcome {
    pub name: String,
    pub output: PathBuf,
    pub result: Result<ChartSpec>,
}

/// Render every config into `out_dir` in parallel, one task per chart. A
/// failing chart does not stop the others.
pub fn render_all(
    configs: &[ChartConfig],
    data_dir: &Path,
    out_dir: &Path,
    format: OutputFormat,
    show_progress: bool,
) -> Vec<ChartOutcome> {
    let pb = if show_progress {
        ProgressBar::new(configs.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("##-"));
    }

    let outcomes: Vec<ChartOutcome> = configs
        .par_iter()
        .map(|config| {
            let output = format.output_path(out_dir, &config.name);
            let renderer = format.renderer(&output);
            let result = render_chart(config, data_dir, renderer.as_ref());
            if let Err(e) = &result {
                warn!(chart = %config.name, error = %e, "chart failed");
            }
            pb.inc(1);
            ChartOutcome { name: config.name.clone(), output, result }
        })
        .collect();

    pb.finish_and_clear();
    outcomes
}
