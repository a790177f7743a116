use crate::chart::font;
use crate::chart::layout::GanttLayout;
use crate::chart::types::{AxisRange, BarRow, ChartError};
use crate::clickup::TaskRecord;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use tracing::info;

const WHITE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const INK: Rgb<u8> = Rgb([0x00, 0x00, 0x00]);
const BAR_EDGE: Rgb<u8> = Rgb([0x33, 0x33, 0x33]);
const GRID: Rgb<u8> = Rgb([0xcc, 0xcc, 0xcc]);

const BAR_ALPHA: f64 = 0.9;
const GRID_ALPHA: f64 = 0.2;
const BAR_HEIGHT: f64 = 0.7;
const LABEL_GAP_DAYS: f64 = 0.3;
const TICK_INTERVAL_DAYS: i64 = 2;

/// Canvas dimensions and text sizes for the rendered chart.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub pixels_per_inch: u32,
    pub min_height_inches: f64,
    pub inches_per_task: f64,
    pub margin: u32,
    pub title_band: u32,
    pub axis_band: u32,
    pub title_scale: u32,
    pub label_scale: u32,
    pub tick_scale: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        // 18in wide at 200dpi
        Self {
            width: 3600,
            pixels_per_inch: 200,
            min_height_inches: 6.0,
            inches_per_task: 0.5,
            margin: 120,
            title_band: 160,
            axis_band: 120,
            title_scale: 6,
            label_scale: 4,
            tick_scale: 3,
        }
    }
}

/// Rasterizes a [`GanttLayout`] into a PNG.
#[derive(Debug, Clone, Default)]
pub struct GanttRenderer {
    options: RenderOptions,
}

/// Pixel rectangle of the plotting area.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl PlotArea {
    fn x_for(&self, axis: &AxisRange, at: NaiveDateTime) -> f64 {
        let offset = (at - axis.start).num_seconds() as f64;
        self.left + offset / axis.span_seconds() as f64 * (self.right - self.left)
    }

    fn pixels_per_day(&self, axis: &AxisRange) -> f64 {
        (self.right - self.left) * 86_400.0 / axis.span_seconds() as f64
    }

    fn row_height(&self, rows: usize) -> f64 {
        (self.bottom - self.top) / rows.max(1) as f64
    }

    /// Slots count upward from the bottom edge.
    fn row_center(&self, slot: usize, rows: usize) -> f64 {
        self.bottom - (slot as f64 + 0.5) * self.row_height(rows)
    }
}

impl GanttRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Lay out `records` and render them under the title for `project_name`.
    pub fn render(&self, records: &[TaskRecord], project_name: &str) -> Result<Vec<u8>, ChartError> {
        info!("Rendering Gantt chart for {} ({} tasks)", project_name, records.len());
        let layout = GanttLayout::build(records)?;
        let png = self.render_layout(&layout, project_name)?;
        info!("Chart rendered: {} bars, {} bytes", layout.row_count(), png.len());
        Ok(png)
    }

    pub fn canvas_height(&self, rows: usize) -> u32 {
        let inches = self
            .options
            .min_height_inches
            .max(self.options.inches_per_task * rows as f64);
        (inches * self.options.pixels_per_inch as f64).round() as u32
    }

    /// Pixel bounds `(x0, y0, x1, y1)` of a bar on a canvas for `layout`.
    pub fn bar_bounds(&self, layout: &GanttLayout, row: &BarRow) -> (i64, i64, i64, i64) {
        let plot = self.plot_area(layout);
        let half = plot.row_height(layout.row_count()) * BAR_HEIGHT / 2.0;
        let center = plot.row_center(row.slot, layout.row_count());
        let right_edge = row
            .left
            .checked_add_signed(Duration::days(row.length_days))
            .unwrap_or(layout.axis.end);
        let x0 = plot.x_for(&layout.axis, row.left);
        let x1 = plot.x_for(&layout.axis, right_edge);

        (
            x0.round() as i64,
            (center - half).round() as i64,
            x1.round() as i64,
            (center + half).round() as i64,
        )
    }

    /// Top-left pixel of a row's label, right-aligned just before its bar.
    pub fn label_origin(&self, layout: &GanttLayout, row: &BarRow) -> (i64, i64) {
        let plot = self.plot_area(layout);
        let scale = self.options.label_scale;
        let label_right =
            plot.x_for(&layout.axis, row.left) - LABEL_GAP_DAYS * plot.pixels_per_day(&layout.axis);
        let x = label_right.round() as i64 - font::text_width(&row.name, scale) as i64;
        let y = plot.row_center(row.slot, layout.row_count()).round() as i64
            - font::text_height(scale) as i64 / 2;
        (x, y)
    }

    pub fn render_layout(&self, layout: &GanttLayout, project_name: &str) -> Result<Vec<u8>, ChartError> {
        let rows = layout.row_count();
        let width = self.options.width;
        let height = self.canvas_height(rows);
        let plot = self.plot_area(layout);
        let mut canvas = Canvas::new(width, height);

        self.draw_grid(&mut canvas, &plot, &layout.axis);

        for row in &layout.rows {
            let (x0, y0, x1, y1) = self.bar_bounds(layout, row);
            canvas.blend_rect(x0, y0, x1, y1, row.color.rgb(), BAR_ALPHA);
            canvas.outline_rect(x0, y0, x1, y1, 2, BAR_EDGE);

            let (label_x, label_y) = self.label_origin(layout, row);
            canvas.text(label_x, label_y, &row.name, self.options.label_scale, INK);
        }

        // bottom spine only
        canvas.fill_rect(
            plot.left as i64,
            plot.bottom as i64,
            plot.right as i64,
            plot.bottom as i64 + 2,
            INK,
        );
        self.draw_ticks(&mut canvas, &plot, &layout.axis);

        let title = format!("Diagrama de Gantt - {}", project_name);
        let scale = self.options.title_scale;
        let title_x = (width as i64 - font::text_width(&title, scale) as i64) / 2;
        let title_y = (self.options.title_band as i64 - font::text_height(scale) as i64) / 2;
        canvas.text(title_x, title_y, &title, scale, INK);
        canvas.text(title_x + 1, title_y, &title, scale, INK);

        canvas.encode_png()
    }

    fn plot_area(&self, layout: &GanttLayout) -> PlotArea {
        let width = self.options.width as f64;
        let height = self.canvas_height(layout.row_count()) as f64;
        let margin = self.options.margin as f64;
        let right = width - margin;

        PlotArea {
            left: self.plot_left(layout, right),
            top: self.options.title_band as f64,
            right,
            bottom: height - self.options.axis_band as f64,
        }
    }

    /// Left plot edge far enough right that every label starts inside the margin.
    ///
    /// A label on a bar at axis fraction `f` starts at
    /// `left + (f - gap) * (right - left) - width`; solving that for `left`
    /// gives the bound per row. Capped at half the canvas.
    fn plot_left(&self, layout: &GanttLayout, right: f64) -> f64 {
        let margin = self.options.margin as f64;
        let span = layout.axis.span_seconds() as f64;
        let gap = LABEL_GAP_DAYS * 86_400.0 / span;

        let needed = layout
            .rows
            .iter()
            .filter_map(|row| {
                let fraction = (row.left - layout.axis.start).num_seconds() as f64 / span;
                let k = fraction - gap;
                if k >= 1.0 {
                    return None;
                }
                let label = font::text_width(&row.name, self.options.label_scale) as f64;
                Some((margin + label - k * right) / (1.0 - k))
            })
            .fold(margin, f64::max);

        needed.ceil().min(self.options.width as f64 / 2.0)
    }

    /// Midnights every [`TICK_INTERVAL_DAYS`], stretched so there are never
    /// more ticks than `max_ticks`.
    fn tick_dates(axis: &AxisRange, max_ticks: usize) -> Vec<NaiveDateTime> {
        let span_days = axis.span_seconds() / 86_400 + 1;
        let natural = (span_days / TICK_INTERVAL_DAYS + 1) as usize;
        let stride = natural.div_ceil(max_ticks.max(1)).max(1) as i64;
        let step = Duration::days(TICK_INTERVAL_DAYS * stride);

        let mut tick = axis.start.date().and_time(NaiveTime::MIN);
        if tick < axis.start {
            tick += Duration::days(1);
        }

        let mut ticks = Vec::new();
        while tick <= axis.end {
            ticks.push(tick);
            match tick.checked_add_signed(step) {
                Some(next) => tick = next,
                None => break,
            }
        }
        ticks
    }

    fn max_ticks(plot: &PlotArea) -> usize {
        ((plot.right - plot.left) / 2.0).max(1.0) as usize
    }

    fn draw_grid(&self, canvas: &mut Canvas, plot: &PlotArea, axis: &AxisRange) {
        for tick in Self::tick_dates(axis, Self::max_ticks(plot)) {
            let x = plot.x_for(axis, tick).round() as i64;
            canvas.blend_rect(x, plot.top as i64, x + 1, plot.bottom as i64, GRID, GRID_ALPHA);
        }
    }

    fn draw_ticks(&self, canvas: &mut Canvas, plot: &PlotArea, axis: &AxisRange) {
        let scale = self.options.tick_scale;
        let ticks = Self::tick_dates(axis, Self::max_ticks(plot));
        let label_width = font::text_width("Mmm 00", scale) as f64;
        let spacing = match ticks.as_slice() {
            [first, second, ..] => plot.x_for(axis, *second) - plot.x_for(axis, *first),
            _ => plot.right - plot.left,
        };
        // thin out labels that would collide
        let every = ((label_width + 4.0 * scale as f64) / spacing).ceil().max(1.0) as usize;

        for (i, tick) in ticks.iter().enumerate() {
            let x = plot.x_for(axis, *tick).round() as i64;
            canvas.fill_rect(x, plot.bottom as i64, x + 2, plot.bottom as i64 + 12, INK);

            if i % every == 0 {
                let label = tick.format("%b %d").to_string();
                let w = font::text_width(&label, scale) as i64;
                canvas.text(x - w / 2, plot.bottom as i64 + 24, &label, scale, INK);
            }
        }
    }
}

/// RGB drawing surface with clipped primitives.
struct Canvas {
    image: RgbImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    /// Clamp a half-open span to `[0, limit)`.
    fn clip(lo: i64, hi: i64, limit: u32) -> Option<(u32, u32)> {
        let lo = lo.max(0);
        let hi = hi.min(limit as i64);
        (lo < hi).then_some((lo as u32, hi as u32))
    }

    fn blend_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>, alpha: f64) {
        let (Some((xa, xb)), Some((ya, yb))) = (
            Self::clip(x0, x1, self.image.width()),
            Self::clip(y0, y1, self.image.height()),
        ) else {
            return;
        };

        for y in ya..yb {
            for x in xa..xb {
                let pixel = self.image.get_pixel_mut(x, y);
                for c in 0..3 {
                    let blended = alpha * color.0[c] as f64 + (1.0 - alpha) * pixel.0[c] as f64;
                    pixel.0[c] = blended.round() as u8;
                }
            }
        }
    }

    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        self.blend_rect(x0, y0, x1, y1, color, 1.0);
    }

    fn outline_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, stroke: i64, color: Rgb<u8>) {
        self.fill_rect(x0, y0, x1, y0 + stroke, color);
        self.fill_rect(x0, y1 - stroke, x1, y1, color);
        self.fill_rect(x0, y0, x0 + stroke, y1, color);
        self.fill_rect(x1 - stroke, y0, x1, y1, color);
    }

    fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let scale_px = scale as i64;
        let advance = (font::ADVANCE * scale) as i64;

        for (i, c) in text.chars().enumerate() {
            let origin = x + i as i64 * advance;
            for col in 0..font::GLYPH_WIDTH {
                for row in 0..font::GLYPH_HEIGHT {
                    if font::is_set(c, col, row) {
                        let px = origin + col as i64 * scale_px;
                        let py = y + row as i64 * scale_px;
                        self.fill_rect(px, py, px + scale_px, py + scale_px, color);
                    }
                }
            }
        }
    }

    fn encode_png(&self) -> Result<Vec<u8>, ChartError> {
        let mut buf = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, FilterType::Adaptive);
        encoder
            .write_image(
                self.image.as_raw(),
                self.image.width(),
                self.image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| ChartError::Encode(e.to_string()))?;
        Ok(buf)
    }
}
