// Render projection
//
// Stateless mapping from (schedule, grid metrics) to a positioned set of
// visual records. Nothing here touches a UI toolkit beyond egui's geometry
// and color primitives; a thin presentation layer turns the records into
// actual widgets. Recomputing the projection is idempotent and
// side-effect-free, so callers may do it as often as they like.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use egui::{Color32, Pos2, Rect, Vec2};

use crate::grid::metrics::GridMetrics;
use crate::grid::visible_days;
use crate::models::schedule::{Meta, Schedule, DAY_LABELS, DEFAULT_BLOCK_COLOR};
use crate::models::settings::TimeFormat;
use crate::utils::time::format_minutes;

/// Horizontal inset between a block and its column edges.
pub const BLOCK_GAP: f32 = 2.0;
/// Floor on rendered block height, so a block is never too thin to grab.
pub const MIN_BLOCK_HEIGHT: f32 = 8.0;
pub const MIN_BLOCK_WIDTH: f32 = 8.0;
/// Height of the resize affordance strip at a block's bottom edge.
pub const HANDLE_HEIGHT: f32 = 8.0;

pub const FILL_ALPHA: f32 = 0.22;
pub const BORDER_ALPHA: f32 = 0.45;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Editable grids get resize affordances; read-only views do not.
    pub editable: bool,
    pub time_format: TimeFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            editable: true,
            time_format: TimeFormat::default(),
        }
    }
}

/// One day column header, in left-to-right display order.
#[derive(Debug, Clone, PartialEq)]
pub struct DayHeader {
    pub day_index: u8,
    pub label: String,
}

/// A positioned visual block. `rect` (and `handle`) are in canvas-local
/// coordinates: origin at the top-left of the first column, unscrolled.
#[derive(Debug, Clone)]
pub struct BlockVisual {
    pub id: String,
    pub day_index: u8,
    pub column: usize,
    pub rect: Rect,
    pub fill: Color32,
    pub border: Color32,
    pub title: String,
    pub time_label: Option<String>,
    /// Resize affordance at the bottom edge; present only in editable mode.
    pub handle: Option<Rect>,
}

/// Result of hit-testing a pointer position against rendered blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockHit {
    pub id: String,
    pub on_handle: bool,
}

/// The full positioned description of one grid frame.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub canvas_height: f32,
    pub col_width: f32,
    /// Canvas-local y offsets of hour gridlines, every 60 minutes from the
    /// window start.
    pub hour_lines: Vec<f32>,
    pub day_headers: Vec<DayHeader>,
    pub blocks: Vec<BlockVisual>,
}

impl GridLayout {
    /// Topmost block under a canvas-local position, preferring the resize
    /// handle when the position falls on it. Later-rendered blocks win.
    pub fn hit_test(&self, local: Pos2) -> Option<BlockHit> {
        self.blocks.iter().rev().find_map(|block| {
            if !block.rect.contains(local) {
                return None;
            }
            Some(BlockHit {
                id: block.id.clone(),
                on_handle: block.handle.map_or(false, |h| h.contains(local)),
            })
        })
    }
}

/// Project store state into a positioned layout for the given geometry.
///
/// Blocks on hidden days are skipped, never deleted: they stay in the
/// schedule and reappear when visibility changes.
pub fn project(schedule: &Schedule, metrics: &GridMetrics, options: &RenderOptions) -> GridLayout {
    let meta = &schedule.meta;
    let visible = metrics.visible_days();

    let mut hour_lines = Vec::new();
    let mut t = meta.start_minute;
    while t < meta.end_minute {
        hour_lines.push(metrics.top_of(t));
        t += 60;
    }

    let show_times = meta.show_time_in_events != Some(false);

    let mut blocks = Vec::with_capacity(schedule.items.len());
    for item in &schedule.items {
        let Some(column) = visible_days::column_of(visible, item.day_index) else {
            continue;
        };

        let top = metrics.top_of(item.start);
        let height = (item.duration_minutes() as f32 * metrics.px_per_minute).max(MIN_BLOCK_HEIGHT);
        let left = metrics.left_of_column(column) + BLOCK_GAP;
        let width = (metrics.col_width - 2.0 * BLOCK_GAP).max(MIN_BLOCK_WIDTH);
        let rect = Rect::from_min_size(Pos2::new(left, top), Vec2::new(width, height));

        let (fill, border) = block_colors(&item.color);

        let time_label = show_times.then(|| {
            format!(
                "{} - {}",
                format_minutes(item.start as f32, options.time_format),
                format_minutes(item.end as f32, options.time_format)
            )
        });

        let handle = options.editable.then(|| {
            Rect::from_min_size(
                Pos2::new(rect.left(), rect.bottom() - HANDLE_HEIGHT),
                Vec2::new(rect.width(), HANDLE_HEIGHT),
            )
        });

        blocks.push(BlockVisual {
            id: item.id.clone(),
            day_index: item.day_index,
            column,
            rect,
            fill,
            border,
            title: item.text.clone(),
            time_label,
            handle,
        });
    }

    GridLayout {
        canvas_height: metrics.canvas_height(),
        col_width: metrics.col_width,
        hour_lines,
        day_headers: day_headers(meta, visible),
        blocks,
    }
}

/// Parse a `#RRGGBB` color string.
pub fn parse_color(hex: &str) -> Option<Color32> {
    let hex = hex.trim().trim_start_matches('#');
    // Byte slicing below needs ASCII; loaded documents can carry anything.
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Color32::from_rgb(r, g, b))
}

/// Translucent fill/border pair for a block color, falling back to the
/// default accent when the color is malformed.
pub fn block_colors(hex: &str) -> (Color32, Color32) {
    let base = parse_color(hex)
        .or_else(|| parse_color(DEFAULT_BLOCK_COLOR))
        .unwrap_or(Color32::BLACK);
    (with_alpha(base, FILL_ALPHA), with_alpha(base, BORDER_ALPHA))
}

fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (alpha * 255.0).round() as u8)
}

/// Build the day header row. Plain weekday labels normally; real dates
/// when `meta.show_dates` is set, resolved from `meta.week` (ISO week,
/// Monday start) or the current week.
fn day_headers(meta: &Meta, visible: &[u8]) -> Vec<DayHeader> {
    let week_start = if meta.show_dates == Some(true) {
        Some(
            meta.week
                .as_deref()
                .and_then(iso_week_start)
                .unwrap_or_else(current_week_start),
        )
    } else {
        None
    };

    visible
        .iter()
        .map(|&day| {
            let label = match week_start {
                Some(start) => {
                    let date = start + chrono::Days::new(day as u64);
                    date.format("%a %d %b").to_string()
                }
                None => meta
                    .days
                    .get(day as usize)
                    .cloned()
                    .unwrap_or_else(|| DAY_LABELS[day as usize].to_string()),
            };
            DayHeader {
                day_index: day,
                label,
            }
        })
        .collect()
}

/// Parse an ISO week selector like `2025-W51` into that week's Monday.
fn iso_week_start(week: &str) -> Option<NaiveDate> {
    let (year, week_no) = week.split_once("-W")?;
    let year: i32 = year.parse().ok()?;
    let week_no: u32 = week_no.parse().ok()?;
    NaiveDate::from_isoywd_opt(year, week_no, Weekday::Mon)
}

fn current_week_start() -> NaiveDate {
    let today = Local::now().date_naive();
    today - chrono::Days::new(today.weekday().num_days_from_monday() as u64)
}
