// Time and step helpers
// Pure, total functions shared by the store, the grid geometry, and the
// renderer. Callers clamp before calling where a narrower domain is needed.

use crate::models::settings::TimeFormat;

/// Constrain a value to `[lo, hi]`.
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

/// Round a value to the nearest multiple of `step`.
///
/// Ties round up to the larger multiple: `round_to_step(37.5, 15) == 45`.
pub fn round_to_step(v: f32, step: i32) -> i32 {
    if step <= 0 {
        return v as i32;
    }
    let multiple = (v / step as f32 + 0.5).floor() as i32;
    multiple * step
}

/// Snap minutes-of-day to the nearest step boundary, with boundaries
/// measured from the window start so snapped values stay step-aligned
/// relative to `start_minute`.
pub fn snap_to_window(v: f32, start_minute: i32, step: i32) -> i32 {
    start_minute + round_to_step(v - start_minute as f32, step)
}

/// Linear minutes → pixels scaling.
pub fn minutes_to_pixels(minutes: f32, px_per_minute: f32) -> f32 {
    minutes * px_per_minute
}

/// Linear pixels → minutes scaling.
pub fn pixels_to_minutes(px: f32, px_per_minute: f32) -> f32 {
    px / px_per_minute
}

/// Render minutes-of-day as a clock label in the given format.
///
/// 24h mode yields `HH:MM`, 12h mode `h:MM AM/PM`. Hours wrap at 24.
/// Non-finite input renders an empty string.
pub fn format_minutes(minutes: f32, format: TimeFormat) -> String {
    if !minutes.is_finite() {
        return String::new();
    }

    let total = minutes.round() as i64;
    let h24 = (total.div_euclid(60)) % 24;
    let m = total.rem_euclid(60);

    match format {
        TimeFormat::TwelveHour => {
            let period = if h24 >= 12 { "PM" } else { "AM" };
            let mut h12 = h24 % 12;
            if h12 == 0 {
                h12 = 12;
            }
            format!("{}:{:02} {}", h12, m, period)
        }
        TimeFormat::TwentyFourHour => format!("{:02}:{:02}", h24, m),
    }
}

/// Parse an `HH:MM` form-field value into minutes-of-day.
///
/// Malformed input yields 0, matching the permissive handling of time
/// inputs elsewhere (invalid values are corrected, never rejected).
pub fn time_input_to_minutes(value: &str) -> i32 {
    let Some((h, m)) = value.split_once(':') else {
        return 0;
    };
    let hours: i32 = h.trim().parse().unwrap_or(0);
    let minutes: i32 = m.trim().parse().unwrap_or(0);
    hours * 60 + minutes
}

/// Format minutes-of-day as an `HH:MM` form-field value.
pub fn minutes_to_time_input(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
