use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ordered_float::OrderedFloat;

use crate::data::record::{Schema, SourceId};
use crate::error::{Error, Result};
use crate::metrics::aggregate::ReferenceReduction;
use crate::sweep::style::{Palette, Style};

/// One swept configuration: which file backs it and how it is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepEntry {
    pub parameter: OrderedFloat<f64>,
    pub source: PathBuf,
    pub label: String,
    pub style: Style,
}

/// Ordered entries of one sweep dimension, e.g. threshold multipliers
/// 1.0 to 2.0. Order is the declaration order, which must be ascending.
#[derive(Clone, Debug)]
pub struct SweepCatalog {
    protocol: String,
    dimension: String,
    schema: Schema,
    palette: Palette,
    entries: Vec<SweepEntry>,
}

impl SweepCatalog {
    pub fn builder(
        protocol: impl Into<String>,
        dimension: impl Into<String>,
        schema: Schema,
    ) -> SweepCatalogBuilder {
        SweepCatalogBuilder {
            protocol: protocol.into(),
            dimension: dimension.into(),
            schema,
            palette: Palette::default(),
            declared: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[SweepEntry] {
        &self.entries
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, parameter: OrderedFloat<f64>) -> Option<usize> {
        self.entries.iter().position(|e| e.parameter == parameter)
    }

    pub fn source_id(&self, entry: &SweepEntry) -> SourceId {
        SourceId::new(&self.protocol, &self.dimension, entry.parameter.into_inner())
    }
}

pub struct SweepCatalogBuilder {
    protocol: String,
    dimension: String,
    schema: Schema,
    palette: Palette,
    declared: Vec<(f64, PathBuf, String)>,
}

impl SweepCatalogBuilder {
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn entry(
        mut self,
        parameter: f64,
        source: impl Into<PathBuf>,
        label: impl Into<String>,
    ) -> Self {
        self.declared.push((parameter, source.into(), label.into()));
        self
    }

    pub fn build(self) -> Result<SweepCatalog> {
        self.schema.validate()?;
        if self.declared.is_empty() {
            return Err(Error::catalog(format!("{} sweep has no entries", self.dimension)));
        }
        check_parameters(self.declared.iter().map(|(p, ..)| *p))?;
        for pair in self.declared.windows(2) {
            if pair[0].0 >= pair[1].0 {
                return Err(Error::catalog(format!(
                    "{} entries must be declared in ascending order: {} then {}",
                    self.dimension, pair[0].0, pair[1].0
                )));
            }
        }

        let palette = self.palette;
        let entries = self
            .declared
            .into_iter()
            .enumerate()
            .map(|(index, (parameter, source, label))| SweepEntry {
                parameter: OrderedFloat(parameter),
                source,
                label,
                style: palette.curve_style(index),
            })
            .collect();

        Ok(SweepCatalog {
            protocol: self.protocol,
            dimension: self.dimension,
            schema: self.schema,
            palette,
            entries,
        })
    }
}

/// A non-swept configuration drawn as a reference line. `parameter` is the
/// nominal configuration it pairs with, e.g. `10.0` for "10 Mb/s".
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineEntry {
    pub parameter: OrderedFloat<f64>,
    pub source: PathBuf,
    pub label: String,
}

/// Baseline runs of one chart, in declaration order. May be empty.
#[derive(Clone, Debug)]
pub struct BaselineCatalog {
    protocol: String,
    dimension: String,
    schema: Schema,
    reduction: ReferenceReduction,
    entries: Vec<BaselineEntry>,
}

impl BaselineCatalog {
    pub fn new(
        protocol: impl Into<String>,
        dimension: impl Into<String>,
        schema: Schema,
        reduction: ReferenceReduction,
        entries: Vec<BaselineEntry>,
    ) -> Result<Self> {
        schema.validate()?;
        check_parameters(entries.iter().map(|e| e.parameter.into_inner()))?;
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.parameter) {
                return Err(Error::catalog(format!(
                    "baseline parameter {} declared twice",
                    entry.parameter
                )));
            }
        }
        Ok(Self { protocol: protocol.into(), dimension: dimension.into(), schema, reduction, entries })
    }

    pub fn empty(schema: Schema) -> Self {
        Self {
            protocol: String::new(),
            dimension: String::new(),
            schema,
            reduction: ReferenceReduction::Mean,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[BaselineEntry] {
        &self.entries
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn reduction(&self) -> ReferenceReduction {
        self.reduction
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source_id(&self, entry: &BaselineEntry) -> SourceId {
        SourceId::new(&self.protocol, &self.dimension, entry.parameter.into_inner())
    }
}

fn check_parameters(parameters: impl Iterator<Item = f64>) -> Result<()> {
    for p in parameters {
        if !p.is_finite() {
            return Err(Error::catalog(format!("parameter {p} is not finite")));
        }
    }
    Ok(())
}

/// Resolve an entry's declared source against the data directory.
pub fn resolve(data_dir: &Path, source: &Path) -> PathBuf {
    if source.is_absolute() {
        source.to_path_buf()
    } else {
        data_dir.join(source)
    }
}
