pub mod config;
pub mod error;
pub mod pipeline;

pub mod data {
    pub mod columnar;
    pub mod loader;
    pub mod record;
}

pub mod metrics {
    pub mod aggregate;
    pub mod units;
}

pub mod sweep {
    pub mod catalog;
    pub mod style;
}

pub mod plot {
    pub mod chart;
    pub mod compare;
    pub mod plot_html;
    pub mod plot_json;
    pub mod render;
}

pub use error::{Error, Result};
