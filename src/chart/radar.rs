use crate::analyzer::radar::{RadarChart, RadarDimension};
use crate::model::ChartError;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::path::Path;

const SIZE: (u32, u32) = (800, 800);
const GRID_RINGS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

fn drawing_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}

/// Angle of spoke `i`, counter-clockwise from east.
pub fn spoke_angle(i: usize) -> f64 {
    2.0 * PI * i as f64 / RadarDimension::ALL.len() as f64
}

/// Radius of a normalized value when the radial origin sits at `origin` (<= 0).
pub fn plot_radius(value: f64, origin: f64) -> f64 {
    (value - origin) / (1.0 - origin)
}

fn to_xy(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.cos(), radius * angle.sin())
}

pub fn draw_radar(
    chart: &RadarChart,
    path: &Path,
    font: &str,
    palette: &[RGBColor],
) -> Result<(), ChartError> {
    if chart.profiles.is_empty() {
        return Err(ChartError::Empty);
    }

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_err)?;

    let mut plot = ChartBuilder::on(&root)
        .caption(chart.title(), (font, 28))
        .margin(30)
        .build_cartesian_2d(-1.4f64..1.4f64, -1.4f64..1.4f64)
        .map_err(drawing_err)?;

    let origin = chart
        .profiles
        .iter()
        .flat_map(|p| p.normalized)
        .fold(0.0, f64::min);

    let grid = RGBColor(200, 200, 200);
    for ring in GRID_RINGS {
        let circle: Vec<(f64, f64)> = (0..=72)
            .map(|k| to_xy(ring, 2.0 * PI * k as f64 / 72.0))
            .collect();
        plot.draw_series(std::iter::once(PathElement::new(circle, grid.stroke_width(1))))
            .map_err(drawing_err)?;
    }

    let label_style = TextStyle::from((font, 16).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (i, dimension) in RadarDimension::ALL.iter().enumerate() {
        let angle = spoke_angle(i);
        plot.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), to_xy(1.0, angle)],
            grid.stroke_width(1),
        )))
        .map_err(drawing_err)?;
        plot.draw_series(std::iter::once(Text::new(
            dimension.label().to_string(),
            to_xy(1.2, angle),
            label_style.clone(),
        )))
        .map_err(drawing_err)?;
    }

    for (i, profile) in chart.profiles.iter().enumerate() {
        let color = palette[i % palette.len()];
        let points: Vec<(f64, f64)> = profile
            .closed_polygon()
            .into_iter()
            .enumerate()
            .map(|(k, v)| to_xy(plot_radius(v, origin), spoke_angle(k)))
            .collect();

        plot.draw_series(std::iter::once(Polygon::new(
            points.clone(),
            color.mix(0.1).filled(),
        )))
        .map_err(drawing_err)?;
        plot.draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(drawing_err)?
            .label(profile.company.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    plot.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((font, 16))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(drawing_err)?;

    root.present().map_err(drawing_err)?;
    Ok(())
}
