use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

use crate::chart::{
    Annotation, Axis, BarMode, ChartBody, ChartData, ChartDescription, ColorMapping, Datum,
    Font as FontSpec, Layer, Mark, Orientation, Styling, Table,
};
use crate::config::{OutputFormat, RenderOptions};
use crate::stats::BoxStats;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const LEGEND_WIDTH: u32 = 160;
const FONT_FAMILY: &str = "sans-serif";

/// Render a description in the requested output format.
pub fn render(desc: &ChartDescription, options: &RenderOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Json => {
            serde_json::to_vec_pretty(desc).context("Failed to serialize chart description")
        }
        OutputFormat::Png => render_png(desc, options.width, options.height),
        OutputFormat::Svg => render_svg(desc, options.width, options.height),
    }
}

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        anyhow::bail!("Image size must be non-zero (got {width}x{height})");
    }
    Ok(())
}

fn render_png(desc: &ChartDescription, width: u32, height: u32) -> Result<Vec<u8>> {
    check_size(width, height)?;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw(&root, desc)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

fn render_svg(desc: &ChartDescription, width: u32, height: u32) -> Result<Vec<u8>> {
    check_size(width, height)?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw(&root, desc)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, desc: &ChartDescription) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&parse_color(&desc.style.paper_background))
        .context("Failed to fill background")?;

    match &desc.body {
        ChartBody::Empty { annotation } => draw_annotation(root, annotation),
        ChartBody::Data(data) => draw_chart(root, data, &desc.style),
    }
}

fn draw_annotation<DB>(root: &DrawingArea<DB, Shift>, annotation: &Annotation) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (w, h) = root.dim_in_pixel();
    // Annotation coordinates are fractions of the canvas, origin bottom-left
    let x = (annotation.x * f64::from(w)) as i32;
    let y = ((1.0 - annotation.y) * f64::from(h)) as i32;
    let style = text_style(&annotation.font, annotation.font.size)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(annotation.text.clone(), (x, y), style))
        .context("Failed to draw annotation")
}

fn draw_chart<DB>(root: &DrawingArea<DB, Shift>, data: &ChartData, style: &Styling) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let font = text_style(&style.font, style.font.size);
    let area = root
        .titled(&data.title, text_style(&style.font, style.font.size + 6))
        .context("Failed to draw title")?;

    let (w, _) = area.dim_in_pixel();
    let (plot, legend) = if style.show_legend {
        area.split_horizontally(w.saturating_sub(LEGEND_WIDTH))
    } else {
        area.split_horizontally(w)
    };
    plot.fill(&parse_color(&style.plot_background))
        .context("Failed to fill plot background")?;
    if style.show_legend {
        draw_legend(&legend, data, &font)?;
    }

    let main = data.layers.first().context("Chart has no layers")?;
    match &main.mark {
        Mark::Histogram { opacity, bar_gap } => {
            draw_histogram(&plot, data, main, *opacity, *bar_gap, &font)
        }
        Mark::Bar { orientation, mode } => draw_bars(
            &plot,
            data,
            main,
            *mode,
            *orientation == Orientation::Horizontal,
            &font,
        ),
        Mark::Scatter => draw_scatter(&plot, data, main, &font),
        Mark::Box { orientation } => {
            draw_boxes(&plot, data, main, *orientation == Orientation::Horizontal, &font)
        }
        Mark::Line => draw_lines(&plot, data, main, &font),
        Mark::Heatmap {
            color_scale,
            text_auto,
        } => draw_heatmap(&plot, data, main, color_scale, *text_auto, &font),
        Mark::Area => draw_areas(&plot, data, main, &font),
    }
}

fn draw_legend<DB>(area: &DrawingArea<DB, Shift>, data: &ChartData, font: &TextStyle) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut y = 20;
    if let Some(title) = &data.legend_title {
        area.draw(&Text::new(title.clone(), (10, y), font.clone()))
            .context("Failed to draw legend title")?;
        y += 24;
    }

    match &data.color {
        ColorMapping::Categorical { entries, .. } => {
            for (label, color) in entries {
                area.draw(&Rectangle::new(
                    [(10, y), (24, y + 14)],
                    parse_color(color).filled(),
                ))
                .context("Failed to draw legend swatch")?;
                area.draw(&Text::new(label.clone(), (30, y), font.clone()))
                    .context("Failed to draw legend label")?;
                y += 20;
            }
        }
        ColorMapping::Continuous { scale, .. } => {
            // Vertical gradient, high values on top
            for step in 0..100 {
                let t = 1.0 - f64::from(step) / 99.0;
                area.draw(&Rectangle::new(
                    [(10, y + step * 2), (30, y + step * 2 + 2)],
                    color_scale(scale, t).filled(),
                ))
                .context("Failed to draw color bar")?;
            }
        }
    }
    Ok(())
}

fn build<'a, DB>(
    area: &'a DrawingArea<DB, Shift>,
    x_range: Range<f64>,
    y_range: Range<f64>,
) -> Result<Chart<'a, DB>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")
}

fn draw_mesh<DB>(chart: &mut Chart<'_, DB>, data: &ChartData, font: &TextStyle) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_fmt = tick_formatter(&data.x_axis);
    let y_fmt = tick_formatter(&data.y_axis);

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(data.x_axis.title.as_str())
        .y_desc(data.y_axis.title.as_str())
        .label_style(font.clone())
        .axis_desc_style(font.clone())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt);
    if let Some(categories) = &data.x_axis.categories {
        mesh.x_labels(categories.len().max(1));
    }
    if let Some(categories) = &data.y_axis.categories {
        mesh.y_labels(categories.len().max(1));
    }
    mesh.draw().context("Failed to draw mesh")
}

/// Tick labels. Discrete axes place category `i` at coordinate `i`.
fn tick_formatter(axis: &Axis) -> impl Fn(&f64) -> String + '_ {
    move |v: &f64| match &axis.categories {
        Some(categories) => {
            let idx = v.round();
            if idx < 0.0 || (v - idx).abs() > 1e-6 {
                return String::new();
            }
            categories.get(idx as usize).cloned().unwrap_or_default()
        }
        None => format_number(*v),
    }
}

/// Up to two decimals, trailing zeros dropped: `1`, `1.8`, `0.25`.
fn format_number(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn draw_histogram<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    layer: &Layer,
    opacity: f64,
    bar_gap: f64,
    font: &TextStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let t = &layer.table;
    let start = field(t, &layer.encoding.x, "x")?;
    let end = named(t, "bin_end")?;
    let count = field(t, &layer.encoding.y, "y")?;
    let series = field(t, &layer.encoding.color, "color")?;

    let x_range = span(
        t.rows
            .iter()
            .flat_map(|r| [num(r, start), num(r, end)])
            .flatten(),
        false,
    );
    let (stacked, tops) = stack_bins(t, [start, end, count, series]);
    let y_range = span(tops, true);

    let marginal = data.layers.get(1);
    let (_, h) = area.dim_in_pixel();
    let (top, bottom) = area.split_vertically(if marginal.is_some() { h / 5 } else { 0 });

    let mut chart = build(&bottom, x_range.clone(), y_range)?;
    draw_mesh(&mut chart, data, font)?;

    let bars = stacked.into_iter().map(|bar| {
        let gap = (bar.end - bar.start) * bar_gap / 2.0;
        let color = series_color(&data.color, &bar.series);
        Rectangle::new(
            [(bar.start + gap, bar.low), (bar.end - gap, bar.high)],
            color.mix(opacity).filled(),
        )
    });
    chart.draw_series(bars).context("Failed to draw histogram")?;

    if let Some(marginal) = marginal {
        draw_marginal_boxes(&top, data, marginal, x_range)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
struct StackedBar {
    start: f64,
    end: f64,
    low: f64,
    high: f64,
    series: String,
}

/// Stack histogram rows that share a bin, in row order. Returns the non-empty
/// bars and the stacked height of every bin.
fn stack_bins(table: &Table, [start, end, count, series]: [usize; 4]) -> (Vec<StackedBar>, Vec<f64>) {
    let mut bars = Vec::new();
    let mut heights: Vec<(f64, f64)> = Vec::new();
    for row in &table.rows {
        let (Some(s), Some(e), Some(n)) = (num(row, start), num(row, end), num(row, count)) else {
            continue;
        };
        let low = match heights.iter_mut().find(|(bin, _)| *bin == s) {
            Some((_, top)) => {
                let low = *top;
                *top += n;
                low
            }
            None => {
                heights.push((s, n));
                0.0
            }
        };
        if n > 0.0 {
            bars.push(StackedBar {
                start: s,
                end: e,
                low,
                high: low + n,
                series: label(row, series),
            });
        }
    }
    (bars, heights.into_iter().map(|(_, top)| top).collect())
}

/// Box summaries drawn above a histogram, sharing its x range.
fn draw_marginal_boxes<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    layer: &Layer,
    x_range: Range<f64>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let t = &layer.table;
    let series = field(t, &layer.encoding.color, "color")?;
    let n = t.rows.len().max(1);
    let mut chart = build(area, x_range, -0.5..(n as f64 - 0.5))?;

    for (i, row) in t.rows.iter().enumerate() {
        let Some(stats) = box_stats_from_row(t, row) else {
            continue;
        };
        let color = series_color(&data.color, &label(row, series));
        draw_box(&mut chart, i as f64, 0.3, &stats, color, true)?;
    }
    Ok(())
}

fn box_stats_from_row(table: &Table, row: &[Datum]) -> Option<BoxStats> {
    let get = |name: &str| table.column_index(name).and_then(|idx| num(row, idx));
    let outliers = match table.column_index("outliers").and_then(|idx| row.get(idx)) {
        Some(Datum::Floats(values)) => values.clone(),
        _ => Vec::new(),
    };
    Some(BoxStats {
        min: get("min")?,
        q1: get("q1")?,
        median: get("median")?,
        q3: get("q3")?,
        max: get("max")?,
        lower_whisker: get("lower_whisker")?,
        upper_whisker: get("upper_whisker")?,
        outliers,
    })
}

fn draw_box<DB>(
    chart: &mut Chart<'_, DB>,
    center: f64,
    half: f64,
    stats: &BoxStats,
    color: RGBColor,
    horizontal: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let pt = |value: f64, offset: f64| {
        if horizontal {
            (value, center + offset)
        } else {
            (center + offset, value)
        }
    };

    chart
        .draw_series([
            Rectangle::new([pt(stats.q1, -half), pt(stats.q3, half)], color.mix(0.4).filled()),
            Rectangle::new([pt(stats.q1, -half), pt(stats.q3, half)], color.stroke_width(1)),
        ])
        .context("Failed to draw box")?;
    chart
        .draw_series([
            PathElement::new(
                vec![pt(stats.median, -half), pt(stats.median, half)],
                color.stroke_width(2),
            ),
            PathElement::new(
                vec![pt(stats.lower_whisker, 0.0), pt(stats.q1, 0.0)],
                color.stroke_width(1),
            ),
            PathElement::new(
                vec![pt(stats.q3, 0.0), pt(stats.upper_whisker, 0.0)],
                color.stroke_width(1),
            ),
        ])
        .context("Failed to draw whiskers")?;
    chart
        .draw_series(
            stats
                .outliers
                .iter()
                .map(|&v| Circle::new(pt(v, 0.0), 2, color.filled())),
        )
        .context("Failed to draw outliers")?;
    Ok(())
}

fn draw_bars<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    layer: &Layer,
    mode: BarMode,
    horizontal: bool,
    font: &TextStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let t = &layer.table;
    let (cat_axis, cat_binding, value_binding) = if horizontal {
        (&data.y_axis, &layer.encoding.y, &layer.encoding.x)
    } else {
        (&data.x_axis, &layer.encoding.x, &layer.encoding.y)
    };
    let cat_idx = field(t, cat_binding, "category")?;
    let value_idx = field(t, value_binding, "value")?;
    let series_idx = field(t, &layer.encoding.color, "color")?;
    let categories = categories_of(cat_axis, t, cat_idx);

    let groups = group_rows(t, series_idx);
    let n_series = groups.len().max(1) as f64;
    let mut stacks = vec![0.0; categories.len()];
    // (center, half width, low, high, color)
    let mut bars = Vec::new();
    for (s, (key, rows)) in groups.iter().enumerate() {
        let color = series_color(&data.color, key);
        for row in rows {
            let Some(cat) = position(&categories, &label(row, cat_idx)) else {
                continue;
            };
            let Some(v) = num(row, value_idx) else {
                continue;
            };
            let (center, half, low) = match mode {
                BarMode::Group => {
                    let width = 0.8 / n_series;
                    (cat as f64 - 0.4 + width * (s as f64 + 0.5), width / 2.0, 0.0)
                }
                BarMode::Stack => {
                    let low = stacks[cat];
                    stacks[cat] += v;
                    (cat as f64, 0.4, low)
                }
            };
            bars.push((center, half, low, low + v, color));
        }
    }

    let value_range = span(bars.iter().flat_map(|b| [b.2, b.3]), true);
    let cat_range = discrete_range(&categories);
    let (x_range, y_range) = if horizontal {
        (value_range, cat_range)
    } else {
        (cat_range, value_range)
    };

    let mut chart = build(area, x_range, y_range)?;
    draw_mesh(&mut chart, data, font)?;
    chart
        .draw_series(bars.iter().map(|&(c, half, low, high, color)| {
            let corners = if horizontal {
                [(low, c - half), (high, c + half)]
            } else {
                [(c - half, low), (c + half, high)]
            };
            Rectangle::new(corners, color.filled())
        }))
        .context("Failed to draw bars")?;
    Ok(())
}

fn draw_scatter<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    layer: &Layer,
    font: &TextStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let t = &layer.table;
    let x = field(t, &layer.encoding.x, "x")?;
    let y = field(t, &layer.encoding.y, "y")?;
    let series = field(t, &layer.encoding.color, "color")?;
    let size = match &layer.encoding.size {
        Some(name) => t.column_index(name),
        None => None,
    };

    // Marker area follows |size| so negative revenue still gets a marker
    let max_size = size
        .map(|idx| {
            t.rows
                .iter()
                .filter_map(|r| num(r, idx))
                .map(f64::abs)
                .fold(0.0, f64::max)
        })
        .unwrap_or(0.0);
    let radius = |row: &[Datum]| -> i32 {
        match size.and_then(|idx| num(row, idx)) {
            Some(v) if max_size > 0.0 => (2.0 + 10.0 * (v.abs() / max_size).sqrt()) as i32,
            _ => 4,
        }
    };

    let mut chart = build(
        area,
        span(t.rows.iter().filter_map(|r| num(r, x)), false),
        span(t.rows.iter().filter_map(|r| num(r, y)), false),
    )?;
    draw_mesh(&mut chart, data, font)?;

    let mut points = Vec::new();
    for row in &t.rows {
        if let (Some(px), Some(py)) = (num(row, x), num(row, y)) {
            let color = series_color(&data.color, &label(row, series));
            points.push(Circle::new((px, py), radius(row.as_slice()), color.mix(0.6).filled()));
        }
    }
    chart.draw_series(points).context("Failed to draw points")?;
    Ok(())
}

fn draw_boxes<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    layer: &Layer,
    horizontal: bool,
    font: &TextStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let t = &layer.table;
    let (cat_axis, cat_binding, value_binding) = if horizontal {
        (&data.y_axis, &layer.encoding.y, &layer.encoding.x)
    } else {
        (&data.x_axis, &layer.encoding.x, &layer.encoding.y)
    };
    let cat_idx = field(t, cat_binding, "category")?;
    let value_idx = field(t, value_binding, "value")?;
    let series_idx = field(t, &layer.encoding.color, "color")?;
    let categories = categories_of(cat_axis, t, cat_idx);

    let groups = group_rows(t, series_idx);
    let width = 0.8 / groups.len().max(1) as f64;
    let mut boxes = Vec::new();
    for (s, (key, rows)) in groups.iter().enumerate() {
        let color = series_color(&data.color, key);
        for (cat, name) in categories.iter().enumerate() {
            let values: Vec<f64> = rows
                .iter()
                .filter(|r| label(r, cat_idx) == *name)
                .filter_map(|r| num(r, value_idx))
                .collect();
            if let Some(stats) = BoxStats::from_values(&values) {
                let center = cat as f64 - 0.4 + width * (s as f64 + 0.5);
                boxes.push((center, stats, color));
            }
        }
    }

    let value_range = span(t.rows.iter().filter_map(|r| num(r, value_idx)), false);
    let cat_range = discrete_range(&categories);
    let (x_range, y_range) = if horizontal {
        (value_range, cat_range)
    } else {
        (cat_range, value_range)
    };

    let mut chart = build(area, x_range, y_range)?;
    draw_mesh(&mut chart, data, font)?;
    for (center, stats, color) in &boxes {
        draw_box(&mut chart, *center, width * 0.4, stats, *color, horizontal)?;
    }
    Ok(())
}

fn draw_lines<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    layer: &Layer,
    font: &TextStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let t = &layer.table;
    let x = field(t, &layer.encoding.x, "x")?;
    let y = field(t, &layer.encoding.y, "y")?;
    let series = field(t, &layer.encoding.color, "color")?;
    let categories = categories_of(&data.x_axis, t, x);

    let mut chart = build(
        area,
        discrete_range(&categories),
        span(t.rows.iter().filter_map(|r| num(r, y)), false),
    )?;
    draw_mesh(&mut chart, data, font)?;

    for (key, rows) in group_rows(t, series) {
        let color = series_color(&data.color, &key);
        let mut points: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|r| Some((position(&categories, &label(r, x))? as f64, num(r, y)?)))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .context("Failed to draw line series")?;
        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
            .context("Failed to draw line markers")?;
    }
    Ok(())
}

fn draw_heatmap<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    layer: &Layer,
    scale: &str,
    text_auto: bool,
    font: &TextStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let t = &layer.table;
    let x = field(t, &layer.encoding.x, "x")?;
    let y = field(t, &layer.encoding.y, "y")?;
    let z = field(t, &layer.encoding.z, "z")?;
    let columns = categories_of(&data.x_axis, t, x);
    let rows = categories_of(&data.y_axis, t, y);
    let max = t
        .rows
        .iter()
        .filter_map(|r| num(r, z))
        .fold(0.0, f64::max);

    let mut chart = build(area, discrete_range(&columns), discrete_range(&rows))?;
    draw_mesh(&mut chart, data, font)?;

    for row in &t.rows {
        let (Some(cx), Some(cy), Some(v)) = (
            position(&columns, &label(row, x)),
            position(&rows, &label(row, y)),
            num(row, z),
        ) else {
            continue;
        };
        let (cx, cy) = (cx as f64, cy as f64);
        let intensity = if max > 0.0 { v / max } else { 0.0 };
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(cx - 0.5, cy - 0.5), (cx + 0.5, cy + 0.5)],
                color_scale(scale, intensity).filled(),
            )))
            .context("Failed to draw heatmap cell")?;

        if text_auto {
            let ink = if intensity > 0.5 { WHITE } else { BLACK };
            let style = font.color(&ink).pos(Pos::new(HPos::Center, VPos::Center));
            chart
                .draw_series(std::iter::once(Text::new(
                    format_number(v),
                    (cx, cy),
                    style,
                )))
                .context("Failed to draw heatmap label")?;
        }
    }
    Ok(())
}

fn draw_areas<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    layer: &Layer,
    font: &TextStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let t = &layer.table;
    let x = field(t, &layer.encoding.x, "x")?;
    let y = field(t, &layer.encoding.y, "y")?;
    let series = field(t, &layer.encoding.color, "color")?;
    let categories = categories_of(&data.x_axis, t, x);

    // One band per series stacked on the previous: (key, lower edge, upper edge)
    let mut baseline = vec![0.0; categories.len()];
    let mut bands = Vec::new();
    for (key, rows) in group_rows(t, series) {
        let mut values = vec![0.0; categories.len()];
        for row in rows {
            if let (Some(cat), Some(v)) = (position(&categories, &label(row, x)), num(row, y)) {
                values[cat] += v;
            }
        }
        let upper: Vec<f64> = baseline.iter().zip(&values).map(|(l, v)| l + v).collect();
        let lower = std::mem::replace(&mut baseline, upper.clone());
        bands.push((key, lower, upper));
    }

    let y_range = span(
        bands
            .iter()
            .flat_map(|(_, lo, hi)| lo.iter().chain(hi.iter()).copied()),
        true,
    );
    let mut chart = build(area, discrete_range(&categories), y_range)?;
    draw_mesh(&mut chart, data, font)?;

    for (key, lower, upper) in bands {
        let color = series_color(&data.color, &key);
        let top: Vec<(f64, f64)> = upper.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect();
        let mut outline = top.clone();
        outline.extend(lower.iter().enumerate().rev().map(|(i, &v)| (i as f64, v)));

        chart
            .draw_series(std::iter::once(Polygon::new(outline, color.mix(0.7).filled())))
            .context("Failed to draw area")?;
        chart
            .draw_series(LineSeries::new(top, color.stroke_width(1)))
            .context("Failed to draw area edge")?;
    }
    Ok(())
}

fn text_style(font: &FontSpec, size: u32) -> TextStyle<'static> {
    (FONT_FAMILY, f64::from(size))
        .into_font()
        .color(&parse_color(&font.color))
}

fn field(table: &Table, binding: &Option<String>, channel: &str) -> Result<usize> {
    let name = binding
        .as_ref()
        .with_context(|| format!("No field bound to the {channel} channel"))?;
    named(table, name)
}

fn named(table: &Table, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .with_context(|| format!("Table has no column '{name}'"))
}

fn num(row: &[Datum], idx: usize) -> Option<f64> {
    row.get(idx)?.as_f64()
}

fn label(row: &[Datum], idx: usize) -> String {
    row.get(idx).map(Datum::label).unwrap_or_default()
}

fn position(categories: &[String], value: &str) -> Option<usize> {
    categories.iter().position(|c| c == value)
}

fn categories_of(axis: &Axis, table: &Table, idx: usize) -> Vec<String> {
    match &axis.categories {
        Some(categories) => categories.clone(),
        None => {
            let mut seen: Vec<String> = Vec::new();
            for row in &table.rows {
                let l = label(row, idx);
                if !seen.contains(&l) {
                    seen.push(l);
                }
            }
            seen
        }
    }
}

fn discrete_range(categories: &[String]) -> Range<f64> {
    -0.5..(categories.len().max(1) as f64 - 0.5)
}

/// Rows grouped by the label in column `key`, in first-appearance order.
fn group_rows(table: &Table, key: usize) -> Vec<(String, Vec<&[Datum]>)> {
    let mut groups: Vec<(String, Vec<&[Datum]>)> = Vec::new();
    for row in &table.rows {
        let k = label(row, key);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, rows)) => rows.push(row),
            None => groups.push((k, vec![row.as_slice()])),
        }
    }
    groups
}

/// Padded value range. Degenerate ranges widen to ±1.
fn span(values: impl IntoIterator<Item = f64>, include_zero: bool) -> Range<f64> {
    let (mut lo, mut hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if lo == hi {
        return (lo - 1.0)..(hi + 1.0);
    }
    let padding = (hi - lo) * 0.05;
    (lo - padding)..(hi + padding)
}

fn series_color(mapping: &ColorMapping, key: &str) -> RGBColor {
    mapping.color_of(key).map(parse_color).unwrap_or(BLUE)
}

/// Parse `#RRGGBB` or a basic color name
pub fn parse_color(color: &str) -> RGBColor {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() == 6 {
            if let Ok(v) = u32::from_str_radix(hex, 16) {
                return RGBColor((v >> 16) as u8, (v >> 8) as u8, v as u8);
            }
        }
    }
    match color.to_ascii_lowercase().as_str() {
        "red" => RED,
        "green" => GREEN,
        "blue" => BLUE,
        "black" => BLACK,
        "yellow" => YELLOW,
        "cyan" => CYAN,
        "magenta" => MAGENTA,
        "white" => WHITE,
        _ => BLUE, // default
    }
}

/// ColorBrewer Blues, light to dark
const BLUES: [(u8, u8, u8); 9] = [
    (247, 251, 255),
    (222, 235, 247),
    (198, 219, 239),
    (158, 202, 225),
    (107, 174, 214),
    (66, 146, 198),
    (33, 113, 181),
    (8, 81, 156),
    (8, 48, 107),
];

/// Sample a continuous scale at `t` in [0, 1]. Only "Blues" is known; other
/// names fall back to it.
pub fn color_scale(_name: &str, t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (BLUES.len() - 1) as f64;
    let i = (pos.floor() as usize).min(BLUES.len() - 2);
    let frac = pos - i as f64;
    let (a, b) = (BLUES[i], BLUES[i + 1]);
    let lerp = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}
