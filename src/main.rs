use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use bench_compare::config::{ChartConfig, ChartKind};
use bench_compare::data::columnar::ColumnarTable;
use bench_compare::pipeline::{build_chart, load_entry, render_all, render_chart};
use bench_compare::plot::chart::ChartSpec;
use bench_compare::plot::render::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use itertools::Itertools;
use tracing::{info, Level};

#[derive(Parser)]
#[command(
    name = "bench-compare",
    version,
    about = "Aggregate consensus benchmark run logs into comparison charts"
)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ChartSource {
    /// Built-in chart
    #[arg(long, value_enum)]
    chart: Option<ChartKind>,
    /// JSON chart config, e.g. an edited `preset` dump
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ChartSource {
    fn load(&self) -> anyhow::Result<ChartConfig> {
        match (self.chart, &self.config) {
            (Some(kind), _) => Ok(ChartConfig::preset(kind)),
            (None, Some(path)) => ChartConfig::from_path(path)
                .with_context(|| format!("loading chart config {}", path.display())),
            (None, None) => bail!("either --chart or --config is required"),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build one chart and write it to a file
    Render {
        #[command(flatten)]
        source: ChartSource,
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Defaults to the extension of --out
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Render every built-in chart in parallel
    RenderAll {
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        #[arg(long)]
        no_progress: bool,
    },
    /// Print a built-in chart's config as JSON
    Preset {
        #[arg(value_enum)]
        chart: ChartKind,
    },
    /// Print the aggregated values of a chart as a table
    Summarize {
        #[command(flatten)]
        source: ChartSource,
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
    },
    /// Print the raw run log behind one entry
    Inspect {
        #[command(flatten)]
        source: ChartSource,
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
        /// Sweep or baseline parameter, e.g. 1.3 or 10
        #[arg(long)]
        parameter: f64,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render { source, data_dir, out, format } => {
            let config = source.load()?;
            let format = format.unwrap_or_else(|| OutputFormat::from_path(&out));
            let renderer = format.renderer(&out);
            render_chart(&config, &data_dir, renderer.as_ref())
                .with_context(|| format!("rendering {}", config.name))?;
            info!(chart = %config.name, out = %out.display(), "done");
        }
        Command::RenderAll { data_dir, out_dir, format, no_progress } => {
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;
            let configs: Vec<ChartConfig> =
                ChartKind::ALL.into_iter().map(ChartConfig::preset).collect();
            let outcomes =
                render_all(&configs, &data_dir, &out_dir, format.unwrap_or_default(), !no_progress);

            for outcome in &outcomes {
                match &outcome.result {
                    Ok(_) => println!("{:<20} {}", outcome.name, outcome.output.display()),
                    Err(e) => println!("{:<20} FAILED: {e}", outcome.name),
                }
            }
            let failed = outcomes.iter().filter(|o| o.result.is_err()).map(|o| &o.name).join(", ");
            if !failed.is_empty() {
                bail!("charts failed: {failed}");
            }
        }
        Command::Preset { chart } => {
            println!("{}", ChartConfig::preset(chart).to_json()?);
        }
        Command::Summarize { source, data_dir } => {
            let config = source.load()?;
            let chart = build_chart(&config, &data_dir)
                .with_context(|| format!("building {}", config.name))?;
            println!("{}", summary_table(&chart));
        }
        Command::Inspect { source, data_dir, parameter } => {
            let config = source.load()?;
            let log = load_entry(&config, &data_dir, parameter)?;
            let table = ColumnarTable::from_run_log(&log)?;
            println!("{} ({})", log.source(), log.path().display());
            println!("{}", table.df);
        }
    }

    Ok(())
}

/// One row per curve across the x ticks, then one row per reference line.
fn summary_table(chart: &ChartSpec) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec![chart.labels.y.clone(), "color".to_string()];
    header.extend(chart.x_ticks.iter().map(|x| x.to_string()));
    header.push("reference".to_string());
    table.set_header(header);

    for curve in &chart.curves {
        let mut row = vec![curve.label.clone(), curve.style.color.hex()];
        row.extend(chart.x_ticks.iter().map(|tick| {
            curve
                .xs
                .iter()
                .zip(&curve.ys)
                .find(|(x, _)| *x == tick)
                .map(|(_, y)| format!("{y:.3}"))
                .unwrap_or_default()
        }));
        row.push(String::new());
        table.add_row(row);
    }
    for reference in &chart.references {
        let mut row = vec![reference.label.clone(), reference.style.color.hex()];
        row.extend(chart.x_ticks.iter().map(|_| String::new()));
        row.push(format!("{:.3}", reference.y));
        table.add_row(row);
    }
    table
}
