//! Figure rendering for analysis results.
//!
//! Results are drawn as one or more line-chart panels placed side by side and written to an
//! SVG or PNG file with the [`plotters`] crate.

use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const PANEL_WIDTH: u32 = 640;
const PANEL_HEIGHT: u32 = 480;
const RANGE_PADDING: f64 = 0.05;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to draw figure: {0}")]
    Drawing(String),

    #[error("Failed to create figure directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported figure format '{0}'; expected svg or png")]
    UnsupportedFormat(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// Derives the format from the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| PlotError::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }

    /// Default formats written when a figure is saved under its default name.
    pub fn defaults() -> Vec<Self> {
        vec![Self::Svg, Self::Png]
    }
}

impl FromStr for ImageFormat {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            other => Err(PlotError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// One chart of a figure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Panel {
    /// Axis ranges covering every point, padded so lines do not touch the frame.
    pub fn ranges(&self) -> (Range<f64>, Range<f64>) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for &(x, y) in points.filter(|(x, y)| x.is_finite() && y.is_finite()) {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        (padded(x_min, x_max, 0.0), padded(y_min, y_max, RANGE_PADDING))
    }
}

fn padded(min: f64, max: f64, fraction: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min >= max {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * fraction;
    (min - pad)..(max + pad)
}

/// Replaces the extension of `stem` with the extension of `format`.
pub fn figure_path(stem: &Path, format: ImageFormat) -> PathBuf {
    stem.with_extension(format.extension())
}

/// Renders `panels` side by side into `path`.
pub fn render(panels: &[Panel], path: &Path, format: ImageFormat) -> Result<()> {
    if panels.is_empty() {
        return Err(PlotError::InvalidData("nothing to plot".to_string()));
    }
    crate::core::utils::files::ensure_parent(path)?;

    let size = (PANEL_WIDTH * panels.len() as u32, PANEL_HEIGHT);
    match format {
        ImageFormat::Svg => draw(SVGBackend::new(path, size).into_drawing_area(), panels),
        ImageFormat::Png => draw(BitMapBackend::new(path, size).into_drawing_area(), panels),
    }
}

fn draw<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, panels: &[Panel]) -> Result<()> {
    let drawing = |e: DrawingAreaErrorKind<DB::ErrorType>| PlotError::Drawing(e.to_string());

    root.fill(&WHITE).map_err(drawing)?;
    let areas = root.split_evenly((1, panels.len()));

    for (area, panel) in areas.iter().zip(panels) {
        let (x_range, y_range) = panel.ranges();
        let mut builder = ChartBuilder::on(area);
        builder.margin(15).x_label_area_size(45).y_label_area_size(60);
        if let Some(title) = &panel.title {
            builder.caption(title, ("sans-serif", 24));
        }
        let mut chart = builder
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .draw()
            .map_err(drawing)?;

        for (i, series) in panel.series.iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    series.points.iter().copied(),
                    color.stroke_width(2),
                ))
                .map_err(drawing)?
                .label(series.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        if panel.series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(drawing)?;
        }
    }

    root.present().map_err(drawing)?;
    Ok(())
}
