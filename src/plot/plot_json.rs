use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::plot::chart::ChartSpec;
use crate::plot::render::Renderer;

/// Writes the [`ChartSpec`] as JSON for external plotting backends.
pub struct JsonRenderer {
    path: PathBuf,
}

impl JsonRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, chart: &ChartSpec) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, chart)?;
        writer.flush()?;
        info!(path = %self.path.display(), "wrote json chart");
        Ok(())
    }
}

pub fn read_chart(path: &Path) -> Result<ChartSpec> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
