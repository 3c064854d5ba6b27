use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::plot::chart::ChartSpec;
use crate::plot::plot_html::HtmlRenderer;
use crate::plot::plot_json::JsonRenderer;

/// Draws a finished chart somewhere.
pub trait Renderer {
    fn render(&self, chart: &ChartSpec) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }

    pub fn renderer(&self, path: impl Into<PathBuf>) -> Box<dyn Renderer + Send + Sync> {
        match self {
            OutputFormat::Html => Box::new(HtmlRenderer::new(path)),
            OutputFormat::Json => Box::new(JsonRenderer::new(path)),
        }
    }

    /// Guess from a file extension, `html` unless it says `json`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Html,
        }
    }

    /// `<dir>/<name>.<ext>`
    pub fn output_path(&self, dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.{}", self.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out/chart.JSON")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out/chart.html")), OutputFormat::Html);
        assert_eq!(OutputFormat::from_path(Path::new("out/chart")), OutputFormat::Html);
    }

    #[test]
    fn output_path_uses_chart_name() {
        let path = OutputFormat::Json.output_path(Path::new("/tmp/charts"), "block-rate");
        assert_eq!(path, PathBuf::from("/tmp/charts/block-rate.json"));
    }
}
