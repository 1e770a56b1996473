// Grid metrics
//
// One frame's geometry snapshot: the measured container rect, scroll
// offsets, and the meta-derived window/step/visible-day layout. All
// pointer → day/time mapping shared by clicks, drags and resizes lives
// here so the two paths can never disagree.

use egui::{Pos2, Rect, Vec2};

use crate::grid::visible_days;
use crate::models::schedule::Meta;
use crate::utils::time::{clamp, pixels_to_minutes, snap_to_window};

/// Vertical scale: one minute of schedule time in pixels.
pub const PX_PER_MINUTE: f32 = 1.6;

/// Column width used before the container has a measured width
/// (layout may not be committed on first paint).
pub const FALLBACK_COL_WIDTH: f32 = 120.0;

/// Geometry snapshot for one rendered frame of the grid.
#[derive(Debug, Clone)]
pub struct GridMetrics {
    container: Rect,
    scroll: Vec2,
    pub px_per_minute: f32,
    pub start_minute: i32,
    pub end_minute: i32,
    pub step: i32,
    visible: Vec<u8>,
    pub col_width: f32,
}

impl GridMetrics {
    /// Build metrics from the current meta and the measured container.
    /// `scroll` is the container's current scroll offset.
    pub fn new(meta: &Meta, container: Rect, scroll: Vec2) -> Self {
        let visible = visible_days::resolve(meta);
        let width = container.width();
        let col_width = if width > 0.0 {
            width / visible.len() as f32
        } else {
            FALLBACK_COL_WIDTH
        };

        Self {
            container,
            scroll,
            px_per_minute: PX_PER_MINUTE,
            start_minute: meta.start_minute,
            end_minute: meta.end_minute,
            step: meta.minute_step,
            visible,
            col_width,
        }
    }

    pub fn visible_days(&self) -> &[u8] {
        &self.visible
    }

    pub fn visible_day_count(&self) -> usize {
        self.visible.len()
    }

    /// Total canvas height covering the whole time window.
    pub fn canvas_height(&self) -> f32 {
        (self.end_minute - self.start_minute) as f32 * self.px_per_minute
    }

    /// Map a screen-space pointer position into canvas-local coordinates
    /// (scroll-adjusted, origin at the top-left of the first column).
    pub fn to_local(&self, pos: Pos2) -> Pos2 {
        Pos2::new(
            pos.x - self.container.left() + self.scroll.x,
            pos.y - self.container.top() + self.scroll.y,
        )
    }

    /// The contiguous column under a pointer, clamped into range.
    pub fn column_at(&self, pos: Pos2) -> usize {
        let local = self.to_local(pos);
        let col = (local.x / self.col_width).floor() as i64;
        clamp(col, 0, self.visible.len() as i64 - 1) as usize
    }

    /// The weekday identity under a pointer.
    pub fn day_at(&self, pos: Pos2) -> u8 {
        visible_days::day_at(&self.visible, self.column_at(pos))
    }

    /// Unsnapped minutes-of-day under a pointer.
    pub fn minutes_at(&self, pos: Pos2) -> f32 {
        let local = self.to_local(pos);
        self.start_minute as f32 + pixels_to_minutes(local.y, self.px_per_minute)
    }

    /// Minutes under a pointer, snapped to the step and clamped into the
    /// window.
    pub fn snapped_minutes_at(&self, pos: Pos2) -> i32 {
        let snapped = snap_to_window(self.minutes_at(pos), self.start_minute, self.step);
        clamp(snapped, self.start_minute, self.end_minute)
    }

    /// Like [`snapped_minutes_at`](Self::snapped_minutes_at), but reserving
    /// one step before the window end so a minimum-duration block anchored
    /// at the result always fits.
    pub fn snapped_start_at(&self, pos: Pos2) -> i32 {
        let snapped = snap_to_window(self.minutes_at(pos), self.start_minute, self.step);
        clamp(snapped, self.start_minute, self.end_minute - self.step)
    }

    /// Canvas-local y of a minutes-of-day value.
    pub fn top_of(&self, minutes: i32) -> f32 {
        (minutes - self.start_minute) as f32 * self.px_per_minute
    }

    /// Canvas-local x of a column's left edge.
    pub fn left_of_column(&self, column: usize) -> f32 {
        column as f32 * self.col_width
    }
}
