use std::fs;
use std::path::Path;

use bench_compare::config::{ChartConfig, ChartKind};
use bench_compare::data::columnar::ColumnarTable;
use bench_compare::pipeline::{build_chart, load_entry, render_all, render_chart};
use bench_compare::plot::plot_json::read_chart;
use bench_compare::plot::render::OutputFormat;
use bench_compare::Error;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Data for the 5/10/20 Mb/s latency chart: two sample sizes per sweep run.
fn bandwidth_fixture(dir: &Path) {
    for mb in [5, 10, 20] {
        let base = mb as f64 * 3600.0;
        write(
            dir,
            &format!("sparse_bullshark_{mb}.csv"),
            &format!(
                "100 40 {} 2048 7\n100 41 {} 2048 7\n200 39 {} 2048 7\n",
                base,
                base * 2.0,
                base * 3.0
            ),
        );
        write(dir, &format!("bullshark_{mb}.csv"), &format!("50 {}\n50 {}\n", base, base * 3.0));
    }
}

/// Data for the 2 Gb/s charts.
fn gigabit_fixture(dir: &Path) {
    write(
        dir,
        "sparse_bullshark_2000.csv",
        "100 72000 3600 1048576 9\n100 108000 3600 1048576 9\n200 36000 3600 2097152 9\n",
    );
    write(dir, "bullshark_2000.csv", "100 36000 1048576\n100 36000 1048576\n200 36000 3145728\n");
}

#[test]
fn bandwidth_latency_chart_from_disk() {
    let dir = TempDir::new().unwrap();
    bandwidth_fixture(dir.path());

    let config = ChartConfig::preset(ChartKind::BandwidthLatency);
    let chart = build_chart(&config, dir.path()).unwrap();

    assert_eq!(chart.x_ticks, vec![100, 200]);
    assert_eq!(chart.curves.len(), 3);
    assert_eq!(chart.references.len(), 3);

    let ten = &chart.curves[1];
    assert_eq!(ten.label, "Sparse Bullshark 10Mb/sec");
    assert!(close(ten.ys[0], 15.0));
    assert!(close(ten.ys[1], 30.0));

    assert_eq!(chart.references[2].label, "Bullshark 20Mb/sec");
    assert!(close(chart.references[2].y, 40.0));

    let legend: Vec<String> = chart.legend().into_iter().map(|e| e.label).collect();
    assert_eq!(legend[0], "Sparse Bullshark 5Mb/sec");
    assert_eq!(legend[3], "Bullshark 5Mb/sec");
}

#[test]
fn nic_saturation_uses_mean_of_group_means() {
    let dir = TempDir::new().unwrap();
    gigabit_fixture(dir.path());

    let chart = build_chart(&ChartConfig::preset(ChartKind::NicSaturation), dir.path()).unwrap();
    // 1 MiB per ms is 8000 Mb/s.
    assert!(close(chart.curves[0].ys[0], 8000.0));
    assert!(close(chart.curves[0].ys[1], 16000.0));
    // Group means 1 MiB and 3 MiB average to 2 MiB; a flat mean would give 5/3 MiB.
    assert!(close(chart.references[0].y, 16000.0));
}

#[test]
fn block_rate_counts_ordered_blocks() {
    let dir = TempDir::new().unwrap();
    gigabit_fixture(dir.path());

    let chart = build_chart(&ChartConfig::preset(ChartKind::BlockRate), dir.path()).unwrap();
    assert!(close(chart.curves[0].ys[0], 25.0));
    assert!(close(chart.curves[0].ys[1], 10.0));
    assert!(close(chart.references[0].y, 10.0));
    assert_eq!(chart.y_ticks.unwrap().values().len(), 11);
}

#[test]
fn threshold_chart_needs_every_run() {
    let dir = TempDir::new().unwrap();
    let config = ChartConfig::preset(ChartKind::ThresholdLatency);
    for entry in config.sweep.entries.iter().skip(1) {
        write(dir.path(), entry.file.to_str().unwrap(), "100 10 3600\n");
    }

    let err = build_chart(&config, dir.path()).unwrap_err();
    match err {
        Error::FileNotFound { path } => {
            assert_eq!(path, dir.path().join("sparse_bullshark_threshold_1.csv"))
        }
        other => panic!("unexpected error: {other}"),
    }

    write(dir.path(), "sparse_bullshark_threshold_1.csv", "100 10 7200\n300 10 3600\n");
    let chart = build_chart(&config, dir.path()).unwrap();
    assert_eq!(chart.curves.len(), 11);
    assert_eq!(chart.x_ticks, vec![100, 300]);
    assert!(chart.references.is_empty());
    assert!(close(chart.curves[0].ys[0], 2.0));
}

#[test]
fn empty_run_log_fails_the_chart() {
    let dir = TempDir::new().unwrap();
    bandwidth_fixture(dir.path());
    write(dir.path(), "bullshark_10.csv", "");

    let err = build_chart(&ChartConfig::preset(ChartKind::BandwidthLatency), dir.path()).unwrap_err();
    assert!(matches!(err, Error::EmptyRunLog { .. }));
}

#[test]
fn wrong_layout_is_a_schema_mismatch() {
    let dir = TempDir::new().unwrap();
    bandwidth_fixture(dir.path());
    // Three columns where the sweep writes five.
    write(dir.path(), "sparse_bullshark_5.csv", "100 40 3600\n");

    let err = build_chart(&ChartConfig::preset(ChartKind::BandwidthLatency), dir.path()).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { expected: 5, found: 3, .. }));
}

#[test]
fn render_writes_requested_format() {
    let dir = TempDir::new().unwrap();
    gigabit_fixture(dir.path());
    let config = ChartConfig::preset(ChartKind::BlockRate);

    let json = dir.path().join("block-rate.json");
    let chart = render_chart(&config, dir.path(), OutputFormat::Json.renderer(&json).as_ref()).unwrap();
    assert_eq!(read_chart(&json).unwrap(), chart);

    let html = dir.path().join("block-rate.html");
    render_chart(&config, dir.path(), OutputFormat::Html.renderer(&html).as_ref()).unwrap();
    assert!(fs::read_to_string(&html).unwrap().contains("Blocks per second"));
}

#[test]
fn render_all_reports_each_chart() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    bandwidth_fixture(data.path());
    gigabit_fixture(data.path());

    let configs: Vec<ChartConfig> = ChartKind::ALL.into_iter().map(ChartConfig::preset).collect();
    let outcomes = render_all(&configs, data.path(), out.path(), OutputFormat::Json, false);

    assert_eq!(outcomes.len(), 4);
    for outcome in &outcomes {
        if outcome.name == ChartKind::ThresholdLatency.name() {
            assert!(matches!(outcome.result, Err(Error::FileNotFound { .. })));
            assert!(!outcome.output.exists());
        } else {
            assert!(outcome.result.is_ok(), "{} failed", outcome.name);
            assert!(outcome.output.exists());
        }
    }
}

#[test]
fn custom_config_from_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "10,100,36000\n10,200,39600\n20,50,18000\n");
    write(dir.path(), "b.csv", "5,36000\n5,39600\n");
    let config_path = dir.path().join("chart.json");
    write(
        dir.path(),
        "chart.json",
        r#"{
            "name": "custom",
            "delimiter": ",",
            "metric": "latency",
            "conversion": { "divisor": 3600 },
            "labels": { "x": "Sample size", "y": "Latency (sec)" },
            "sweep": {
                "protocol": "Sparse Bullshark",
                "dimension": "bandwidth",
                "schema": { "kind": "latency", "width": 3, "sample_size": 0, "throughput": 1, "latency": 2 },
                "entries": [ { "parameter": 10, "file": "a.csv", "label": "Sparse Bullshark 10Mb/sec" } ]
            },
            "baselines": {
                "protocol": "Bullshark",
                "schema": { "kind": "latency", "width": 2, "throughput": 0, "latency": 1 },
                "entries": [ { "parameter": 10, "file": "b.csv", "label": "Bullshark 10Mb/sec" } ]
            }
        }"#,
    );

    let config = ChartConfig::from_path(&config_path).unwrap();
    let chart = build_chart(&config, dir.path()).unwrap();
    assert_eq!(chart.x_ticks, vec![10, 20]);
    assert!(close(chart.curves[0].ys[0], 10.5));
    assert!(close(chart.curves[0].ys[1], 5.0));
    assert!(close(chart.references[0].y, 10.5));
}

#[test]
fn inspect_loads_one_entry_as_a_frame() {
    let dir = TempDir::new().unwrap();
    bandwidth_fixture(dir.path());
    let config = ChartConfig::preset(ChartKind::BandwidthLatency);

    let log = load_entry(&config, dir.path(), 10.0).unwrap();
    assert_eq!(log.len(), 3);
    let table = ColumnarTable::from_run_log(&log).unwrap();
    assert_eq!(table.column_names(), ["sample_size", "throughput", "latency", "bytes"]);

    let err = load_entry(&config, dir.path(), 7.0).unwrap_err();
    assert!(matches!(err, Error::InvalidCatalog(_)));
}

#[test]
fn chart_metric_must_match_log_kind() {
    let dir = TempDir::new().unwrap();
    gigabit_fixture(dir.path());
    let mut config = ChartConfig::preset(ChartKind::NicSaturation);
    config.metric = bench_compare::data::record::Metric::Throughput;

    let err = build_chart(&config, dir.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidSchema(_)));
}
