// Visible-day resolver
//
// A block's `day_index` is a stable weekday identity (0=Mon..6=Sun); which
// of those weekdays are shown, and in what left-to-right order, is a view
// concern resolved here. The renderer and the interaction engine translate
// between contiguous column indices (0..N-1) and sparse weekday identities
// through these functions so the two directions always agree.

use crate::models::schedule::Meta;

const WEEKDAYS_ONLY: [u8; 5] = [0, 1, 2, 3, 4];
const ALL_DAYS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

/// Drop out-of-range values and duplicates, then sort ascending.
pub fn sanitize(days: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::with_capacity(days.len());
    for &d in days {
        if d <= 6 && !out.contains(&d) {
            out.push(d);
        }
    }
    out.sort_unstable();
    out
}

/// Resolve which weekday columns to display, left to right.
///
/// Falls back to a legacy derivation from `show_weekend` when the explicit
/// list is absent, filters weekend indices out when the weekend is hidden,
/// and never returns an empty sequence.
pub fn resolve(meta: &Meta) -> Vec<u8> {
    let mut vis = match &meta.visible_days {
        Some(days) => sanitize(days),
        None => Vec::new(),
    };

    if vis.is_empty() {
        vis = if meta.show_weekend {
            ALL_DAYS.to_vec()
        } else {
            WEEKDAYS_ONLY.to_vec()
        };
    }

    if !meta.show_weekend {
        vis.retain(|&d| d < 5);
        if vis.is_empty() {
            vis = WEEKDAYS_ONLY.to_vec();
        }
    }

    vis
}

/// Reverse lookup: the contiguous column a weekday identity occupies,
/// or `None` when that weekday is currently hidden.
pub fn column_of(visible: &[u8], day_index: u8) -> Option<usize> {
    visible.iter().position(|&d| d == day_index)
}

/// Forward lookup: the weekday identity at a column, clamping columns past
/// the right edge to the last visible day. `visible` must be non-empty,
/// which [`resolve`] guarantees.
pub fn day_at(visible: &[u8], column: usize) -> u8 {
    let idx = column.min(visible.len().saturating_sub(1));
    visible[idx]
}
