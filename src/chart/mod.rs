// Chart module: renders radar and trend charts to PNG files.

pub mod radar;
pub mod style;
pub mod trend;

use crate::analyzer::{RadarChart, TrendTable};
use crate::config::ChartConfig;
use crate::model::ChartError;
use crate::utils::{file_stem_safe, open_with_system_viewer};

use plotters::style::RGBColor;
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub trait ChartRenderer {
    fn render_radar(&self, chart: &RadarChart) -> Result<PathBuf, ChartError>;
    fn render_trend(&self, table: &TrendTable) -> Result<PathBuf, ChartError>;
}

pub struct PlottersRenderer {
    output_dir: PathBuf,
    font: String,
    palette: Vec<RGBColor>,
    open_after_render: bool,
}

impl PlottersRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            font: style::pick_font(&config.font_candidates),
            palette: style::parse_palette(&config.palette),
            open_after_render: config.open_after_render,
        }
    }

    fn target(&self, stem: &str) -> Result<PathBuf, ChartError> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(self
            .output_dir
            .join(format!("{}.png", file_stem_safe(stem))))
    }

    fn finish(&self, path: PathBuf) -> PathBuf {
        info!("Chart written to {}", path.display());
        if self.open_after_render {
            open_with_system_viewer(&path);
        }
        path
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render_radar(&self, chart: &RadarChart) -> Result<PathBuf, ChartError> {
        let path = self.target(&format!("radar_{}", chart.period.label()))?;
        radar::draw_radar(chart, &path, &self.font, &self.palette)?;
        Ok(self.finish(path))
    }

    fn render_trend(&self, table: &TrendTable) -> Result<PathBuf, ChartError> {
        let path = self.target(&format!("trend_{}", table.indicator.name()))?;
        trend::draw_trend(table, &path, &self.font, &self.palette)?;
        Ok(self.finish(path))
    }
}
