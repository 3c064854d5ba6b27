use std::fs;
use std::path::PathBuf;

use plotly::color::Rgb as PlotlyRgb;
use plotly::common::{Anchor, DashType, Line, Marker, Mode, TickMode, Title};
use plotly::layout::{Axis, Legend};
use plotly::{Layout, Plot, Scatter};
use tracing::info;

use crate::error::Result;
use crate::plot::chart::{ChartSpec, LegendPosition};
use crate::plot::render::Renderer;
use crate::sweep::style::{Stroke, Style};

const PLOT_DIV: &str = "bench-compare-chart";

/// Writes a self-contained plotly HTML page.
pub struct HtmlRenderer {
    path: PathBuf,
}

impl HtmlRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, chart: &ChartSpec) -> Result<()> {
        fs::write(&self.path, page(chart))?;
        info!(path = %self.path.display(), "wrote html chart");
        Ok(())
    }
}

fn color(style: &Style) -> PlotlyRgb {
    PlotlyRgb::new(style.color.0, style.color.1, style.color.2)
}

fn line(style: &Style) -> Line {
    let line = Line::new().color(color(style)).width(2.0);
    match style.stroke {
        Stroke::Solid => line,
        Stroke::Dashed => line.dash(DashType::Dash),
    }
}

/// Build the plotly figure: one trace per curve, one flat trace per reference
/// line spanning the x ticks, in legend order.
pub fn to_plot(chart: &ChartSpec) -> Plot {
    let mut plot = Plot::new();

    for curve in &chart.curves {
        let mode = if curve.style.markers { Mode::LinesMarkers } else { Mode::Lines };
        let trace = Scatter::new(curve.xs.clone(), curve.ys.clone())
            .name(&curve.label)
            .mode(mode)
            .line(line(&curve.style))
            .marker(Marker::new().color(color(&curve.style)).size(6));
        plot.add_trace(trace);
    }

    let (lo, hi) = chart.x_extent();
    for reference in &chart.references {
        let trace = Scatter::new(vec![lo, hi], vec![reference.y, reference.y])
            .name(&reference.label)
            .mode(Mode::Lines)
            .line(line(&reference.style));
        plot.add_trace(trace);
    }

    let x_axis = Axis::new()
        .title(Title::new(&chart.labels.x))
        .tick_mode(TickMode::Array)
        .tick_values(chart.x_ticks.iter().map(|x| *x as f64).collect())
        .tick_text(chart.x_ticks.iter().map(|x| x.to_string()).collect());

    let mut y_axis = Axis::new().title(Title::new(&chart.labels.y));
    if let Some(ticks) = &chart.y_ticks {
        y_axis = y_axis.tick_mode(TickMode::Array).tick_values(ticks.values());
    }

    let legend = Legend::new().y(0.99).y_anchor(Anchor::Top);
    let legend = match chart.legend_position {
        LegendPosition::UpperLeft => legend.x(0.01).x_anchor(Anchor::Left),
        LegendPosition::UpperRight => legend.x(0.99).x_anchor(Anchor::Right),
    };

    let mut layout = Layout::new()
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend(legend)
        .width(chart.size.width)
        .height(chart.size.height);
    if let Some(title) = &chart.labels.title {
        layout = layout.title(Title::new(title));
    }
    plot.set_layout(layout);
    plot
}

fn page(chart: &ChartSpec) -> String {
    let plot_html = to_plot(chart).to_inline_html(Some(PLOT_DIV));
    let title = chart.labels.title.as_deref().unwrap_or(&chart.labels.y);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-2.12.1.min.js"></script>
</head>
<body>
{plot_html}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::chart::{AxisLabels, FigureSize, TickRange};
    use crate::plot::compare::{Curve, ReferenceLine};
    use crate::sweep::style::Palette;
    use tempfile::TempDir;

    fn chart() -> ChartSpec {
        ChartSpec {
            labels: AxisLabels::new("Sample size", "Blocks per second"),
            x_ticks: vec![100, 200],
            y_ticks: Some(TickRange { start: 0.0, end: 100.0, step: 10.0 }),
            legend_position: LegendPosition::UpperRight,
            size: FigureSize::default(),
            curves: vec![Curve {
                label: "Sparse Bullshark 2Gb/sec".into(),
                style: Palette::Paired.curve_style(2),
                xs: vec![100, 200],
                ys: vec![40.0, 35.5],
            }],
            references: vec![ReferenceLine {
                label: "Bullshark 2Gb/sec".into(),
                style: Palette::Paired.reference_style(2),
                y: 20.0,
            }],
        }
    }

    #[test]
    fn figure_contains_every_legend_label() {
        let json = to_plot(&chart()).to_json();
        assert!(json.contains("Sparse Bullshark 2Gb/sec"));
        assert!(json.contains("Bullshark 2Gb/sec"));
        assert!(json.contains("Blocks per second"));
    }

    #[test]
    fn upper_right_legend_is_anchored_inside_the_plot() {
        let json = to_plot(&chart()).to_json();
        assert!(json.contains(r#""xanchor":"right""#));
        assert!(json.contains(r#""yanchor":"top""#));
    }

    #[test]
    fn writes_html_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.html");
        HtmlRenderer::new(&path).render(&chart()).unwrap();
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(PLOT_DIV));
    }
}
