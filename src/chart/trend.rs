use crate::analyzer::trend::TrendTable;
use crate::model::ChartError;

use plotters::prelude::*;
use std::path::Path;

const SIZE: (u32, u32) = (1000, 620);

fn drawing_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}

/// Value range with 10% headroom; a flat series still gets some height.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let span = max - min;
    let pad = if span == 0.0 {
        (max.abs() * 0.1).max(1.0)
    } else {
        span * 0.1
    };
    Some((min - pad, max + pad))
}

/// Label for a tick position; only exact category centres are labelled.
fn category_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

pub fn draw_trend(
    table: &TrendTable,
    path: &Path,
    font: &str,
    palette: &[RGBColor],
) -> Result<(), ChartError> {
    let labels = table.x_labels();
    let (y_min, y_max) = padded_range(
        table
            .lines
            .iter()
            .flat_map(|l| l.points.iter().map(|(_, v)| *v)),
    )
    .ok_or(ChartError::Empty)?;

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_err)?;

    let title = format!("{} - 趋势分析", table.indicator.name());
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (font, 26))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5f64..(labels.len() as f64 - 0.5), y_min..y_max)
        .map_err(drawing_err)?;

    let x_formatter = |x: &f64| category_label(&labels, *x);
    chart
        .configure_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&|y| format!("{:.2}", y))
        .label_style((font, 14))
        .draw()
        .map_err(drawing_err)?;

    for (i, line) in table.lines.iter().enumerate() {
        let color = palette[i % palette.len()];
        let points: Vec<(f64, f64)> = line
            .points
            .iter()
            .filter_map(|(year, v)| {
                labels
                    .iter()
                    .position(|l| l == year)
                    .map(|x| (x as f64, *v))
            })
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(drawing_err)?
            .label(line.company.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart
            .draw_series(points.into_iter().map(|(x, y)| {
                EmptyElement::at((x, y))
                    + Circle::new((0, 0), 4, color.filled())
                    + Text::new(format!("{:.2}", y), (-14, -20), (font, 12).into_font())
            }))
            .map_err(drawing_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((font, 14))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(drawing_err)?;

    root.present().map_err(drawing_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn range_pads_both_ends() {
        let (lo, hi) = padded_range([10.0, 20.0]).unwrap();
        assert_relative_eq!(lo, 9.0);
        assert_relative_eq!(hi, 21.0);
    }

    #[test]
    fn flat_range_still_has_height() {
        let (lo, hi) = padded_range([5.0]).unwrap();
        assert!(lo < 5.0 && hi > 5.0);
        assert!(padded_range(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn only_centres_get_labels() {
        let labels = vec!["2021".to_string(), "2022".to_string()];
        assert_eq!(category_label(&labels, 0.0), "2021");
        assert_eq!(category_label(&labels, 1.0), "2022");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }
}
