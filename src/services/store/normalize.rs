// Normalization pass
//
// Restores document-wide invariants after any change to the time window,
// the step, or a block's fields. Deterministic, total, and idempotent:
// applying it twice yields the same document as applying it once. Exact
// user-chosen boundaries are traded for the nearest valid snapped
// position; blocks fully outside the window are dropped.

use crate::grid::visible_days;
use crate::models::schedule::{
    Meta, Schedule, ALLOWED_STEPS, DAY_LABELS, DEFAULT_STEP, MINUTES_PER_DAY,
};
use crate::utils::time::{clamp, snap_to_window};

/// Repair meta fields that must always be well-formed: the weekday label
/// list, the step, and the stored visible-day list.
///
/// The stored list keeps the chosen weekday identities untouched; hiding
/// the weekend filters at resolve time only, so flipping `show_weekend`
/// back on restores the original columns.
pub fn ensure_meta_defaults(meta: &mut Meta) {
    if meta.days.len() != 7 {
        meta.days = DAY_LABELS.iter().map(|d| d.to_string()).collect();
    }
    if !ALLOWED_STEPS.contains(&meta.minute_step) {
        meta.minute_step = DEFAULT_STEP;
    }
    if let Some(days) = meta.visible_days.take() {
        meta.visible_days = Some(visible_days::sanitize(&days));
    }
}

/// Clamp the window into the day and keep it at least one step long.
pub fn normalize_meta(meta: &mut Meta) {
    let start = clamp(meta.start_minute, 0, MINUTES_PER_DAY);
    let end = clamp(meta.end_minute, 0, MINUTES_PER_DAY).max(start + meta.minute_step);
    meta.start_minute = start;
    meta.end_minute = end;
}

/// Clamp a block's bounds into the window, snap both to the step, and
/// re-clamp (rounding can push a value back outside the window).
pub fn snap_block_bounds(start: i32, end: i32, meta: &Meta) -> (i32, i32) {
    let step = meta.minute_step;
    let window_start = meta.start_minute;
    let window_end = meta.end_minute;

    let s = clamp(start, window_start, window_end - step);
    let e = clamp(end, s + step, window_end);

    let s = snap_to_window(s as f32, window_start, step);
    let e = snap_to_window(e as f32, window_start, step);

    let s = clamp(s, window_start, window_end - step);
    let e = clamp(e, s + step, window_end);
    (s, e)
}

/// Full normalization: repair meta, then clamp/snap/drop every block so
/// the document satisfies its invariants, preserving relative order.
pub fn normalize_schedule(schedule: &mut Schedule) {
    ensure_meta_defaults(&mut schedule.meta);
    normalize_meta(&mut schedule.meta);

    let meta = schedule.meta.clone();
    schedule.items.retain_mut(|item| {
        // Fully outside the new window: drop.
        if item.end <= meta.start_minute || item.start >= meta.end_minute {
            return false;
        }
        let (start, end) = snap_block_bounds(item.start, item.end, &meta);
        item.start = start;
        item.end = end;
        true
    });
}
