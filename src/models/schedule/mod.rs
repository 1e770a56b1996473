// Schedule module
// Root aggregate persisted as one JSON document: grid metadata plus the
// list of scheduled time blocks. Field names serialize as camelCase so
// documents stay interchangeable with existing stored/shared snapshots.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full weekday labels, Monday-first. A block's `day_index` indexes into
/// this fixed order regardless of which columns are currently visible.
pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const MINUTES_PER_DAY: i32 = 24 * 60;

pub const DEFAULT_TITLE: &str = "My Schedule";
pub const DEFAULT_START_MINUTE: i32 = 8 * 60;
pub const DEFAULT_END_MINUTE: i32 = 20 * 60;
pub const DEFAULT_STEP: i32 = 15;
pub const DEFAULT_BLOCK_MINUTES: i32 = 60;
pub const DEFAULT_BLOCK_TEXT: &str = "Block";

/// Accent color used when a block carries no (or a malformed) color.
pub const DEFAULT_BLOCK_COLOR: &str = "#4f46e5";

/// Minute granularities the step selector offers.
pub const ALLOWED_STEPS: [i32; 5] = [5, 10, 15, 30, 60];

/// Grid metadata: the visible time window, snapping step, day visibility,
/// and display-only passthrough fields that never affect geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default = "default_title")]
    pub title: String,

    /// Seven weekday labels; repaired to the default set when a stored
    /// document carries a wrong-length list.
    #[serde(default = "default_day_labels")]
    pub days: Vec<String>,

    /// Weekday identities (0=Mon..6=Sun) currently shown as columns.
    /// Absent in legacy documents, which derive it from `show_weekend`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_days: Option<Vec<u8>>,

    #[serde(default = "default_start_minute")]
    pub start_minute: i32,
    #[serde(default = "default_end_minute")]
    pub end_minute: i32,
    #[serde(default = "default_step")]
    pub minute_step: i32,

    #[serde(default = "default_true")]
    pub show_weekend: bool,

    // Display-only passthrough fields, interpreted by the presentation
    // layer and carried verbatim through normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_time_in_events: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_dates: Option<bool>,
    /// ISO week selector like `2025-W51` for dated day headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_color: Option<bool>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_day_labels() -> Vec<String> {
    DAY_LABELS.iter().map(|d| d.to_string()).collect()
}

fn default_start_minute() -> i32 {
    DEFAULT_START_MINUTE
}

fn default_end_minute() -> i32 {
    DEFAULT_END_MINUTE
}

fn default_step() -> i32 {
    DEFAULT_STEP
}

fn default_true() -> bool {
    true
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            title: default_title(),
            days: default_day_labels(),
            visible_days: Some((0..7).collect()),
            start_minute: DEFAULT_START_MINUTE,
            end_minute: DEFAULT_END_MINUTE,
            minute_step: DEFAULT_STEP,
            show_weekend: true,
            show_time_in_events: None,
            show_dates: None,
            week: None,
            font_family: None,
            event_text_color: None,
            auto_color: None,
        }
    }
}

impl Meta {
    /// Length of the visible time window in minutes.
    pub fn window_minutes(&self) -> i32 {
        self.end_minute - self.start_minute
    }
}

/// A single scheduled time span on a specific weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Opaque unique identifier, generated by the store.
    pub id: String,
    /// Stable weekday identity (0=Mon..6=Sun), independent of visibility.
    pub day_index: u8,
    /// Start in minutes-of-day.
    pub start: i32,
    /// End in minutes-of-day, strictly after `start`.
    pub end: i32,
    pub text: String,
    /// `#RRGGBB` color; malformed values fall back to the default accent.
    pub color: String,
    #[serde(default)]
    pub notes: String,
}

impl Block {
    /// Create a block with a fresh id, applying the documented fallbacks
    /// for empty text and missing color.
    ///
    /// # Returns
    /// `Err` when `day_index` is out of range or `end <= start`; time
    /// snapping/clamping is the store's job, not the constructor's.
    pub fn new(
        day_index: u8,
        start: i32,
        end: i32,
        text: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, String> {
        let text = text.into();
        let color = color.into();

        let block = Self {
            id: generate_id(),
            day_index,
            start,
            end,
            text: if text.trim().is_empty() {
                DEFAULT_BLOCK_TEXT.to_string()
            } else {
                text
            },
            color: if is_hex_color(&color) {
                color
            } else {
                DEFAULT_BLOCK_COLOR.to_string()
            },
            notes: String::new(),
        };
        block.validate()?;
        Ok(block)
    }

    /// Validate the block against the document-wide invariants it can
    /// check in isolation.
    pub fn validate(&self) -> Result<(), String> {
        if self.day_index > 6 {
            return Err(format!("Day index {} is out of range 0..=6", self.day_index));
        }
        if self.end <= self.start {
            return Err("Block end must be after block start".to_string());
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end - self.start
    }
}

/// True when `value` is a `#RRGGBB` hex color.
pub fn is_hex_color(value: &str) -> bool {
    let hex = match value.strip_prefix('#') {
        Some(rest) => rest,
        None => return false,
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The whole schedule document: metadata plus ordered block list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub meta: Meta,
    pub items: Vec<Block>,
}

impl Schedule {
    /// Parse a serialized document, rejecting anything that is not the
    /// expected shape (a `meta` object and an `items` sequence).
    ///
    /// Returns `None` on parse failure or shape mismatch so callers fall
    /// back to a default document instead of partially applying one.
    pub fn from_json_str(raw: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        Self::from_json_value(value)
    }

    /// Shape-checked conversion from an already-parsed JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Option<Self> {
        if !value.get("meta").map_or(false, |m| m.is_object()) {
            return None;
        }
        if !value.get("items").map_or(false, |i| i.is_array()) {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Partial update applied to [`Meta`] by `ScheduleStore::set_meta`.
/// `None` fields are left untouched (shallow merge).
#[derive(Debug, Clone, Default)]
pub struct MetaPatch {
    pub title: Option<String>,
    pub days: Option<Vec<String>>,
    pub visible_days: Option<Vec<u8>>,
    pub start_minute: Option<i32>,
    pub end_minute: Option<i32>,
    pub minute_step: Option<i32>,
    pub show_weekend: Option<bool>,
    pub show_time_in_events: Option<bool>,
    pub show_dates: Option<bool>,
    pub week: Option<String>,
    pub font_family: Option<String>,
    pub event_text_color: Option<String>,
    pub auto_color: Option<bool>,
}

impl MetaPatch {
    pub fn apply(&self, meta: &mut Meta) {
        if let Some(title) = &self.title {
            meta.title = title.clone();
        }
        if let Some(days) = &self.days {
            meta.days = days.clone();
        }
        if let Some(visible_days) = &self.visible_days {
            meta.visible_days = Some(visible_days.clone());
        }
        if let Some(start_minute) = self.start_minute {
            meta.start_minute = start_minute;
        }
        if let Some(end_minute) = self.end_minute {
            meta.end_minute = end_minute;
        }
        if let Some(minute_step) = self.minute_step {
            meta.minute_step = minute_step;
        }
        if let Some(show_weekend) = self.show_weekend {
            meta.show_weekend = show_weekend;
        }
        if let Some(show_time_in_events) = self.show_time_in_events {
            meta.show_time_in_events = Some(show_time_in_events);
        }
        if let Some(show_dates) = self.show_dates {
            meta.show_dates = Some(show_dates);
        }
        if let Some(week) = &self.week {
            meta.week = Some(week.clone());
        }
        if let Some(font_family) = &self.font_family {
            meta.font_family = Some(font_family.clone());
        }
        if let Some(event_text_color) = &self.event_text_color {
            meta.event_text_color = Some(event_text_color.clone());
        }
        if let Some(auto_color) = self.auto_color {
            meta.auto_color = Some(auto_color);
        }
    }
}

/// Partial update applied to a [`Block`] by `ScheduleStore::update_item`.
#[derive(Debug, Clone, Default)]
pub struct BlockPatch {
    pub day_index: Option<u8>,
    pub start: Option<i32>,
    pub end: Option<i32>,
    pub text: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

impl BlockPatch {
    pub fn apply(&self, block: &mut Block) {
        if let Some(day_index) = self.day_index {
            block.day_index = day_index;
        }
        if let Some(start) = self.start {
            block.start = start;
        }
        if let Some(end) = self.end {
            block.end = end;
        }
        if let Some(text) = &self.text {
            block.text = text.clone();
        }
        if let Some(color) = &self.color {
            block.color = color.clone();
        }
        if let Some(notes) = &self.notes {
            block.notes = notes.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_success() {
        let block = Block::new(0, 480, 540, "Standup", "#ff5733").unwrap();
        assert_eq!(block.day_index, 0);
        assert_eq!(block.start, 480);
        assert_eq!(block.end, 540);
        assert_eq!(block.text, "Standup");
        assert_eq!(block.color, "#ff5733");
        assert!(!block.id.is_empty());
    }

    #[test]
    fn test_new_block_empty_text_falls_back() {
        let block = Block::new(0, 480, 540, "   ", "#ff5733").unwrap();
        assert_eq!(block.text, DEFAULT_BLOCK_TEXT);
    }

    #[test]
    fn test_new_block_bad_color_falls_back() {
        let block = Block::new(0, 480, 540, "Gym", "red").unwrap();
        assert_eq!(block.color, DEFAULT_BLOCK_COLOR);

        let block = Block::new(0, 480, 540, "Gym", "#ff573").unwrap();
        assert_eq!(block.color, DEFAULT_BLOCK_COLOR);
    }

    #[test]
    fn test_new_block_invalid_times() {
        assert!(Block::new(0, 540, 540, "X", "#ff5733").is_err());
        assert!(Block::new(0, 540, 480, "X", "#ff5733").is_err());
    }

    #[test]
    fn test_new_block_invalid_day() {
        assert!(Block::new(7, 480, 540, "X", "#ff5733").is_err());
    }

    #[test]
    fn test_validate_catches_out_of_range_fields() {
        // Deserialized blocks bypass the constructor, so validate is the
        // check callers run on documents from outside the store.
        let mut block = Block::new(0, 480, 540, "X", "#ff5733").unwrap();
        block.day_index = 9;
        assert!(block.validate().is_err());
        block.day_index = 6;
        assert!(block.validate().is_ok());
    }

    #[test]
    fn test_block_ids_are_unique() {
        let a = Block::new(0, 480, 540, "A", "#ff5733").unwrap();
        let b = Block::new(0, 480, 540, "B", "#ff5733").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_schedule_json_shape_check() {
        assert!(Schedule::from_json_str("{}").is_none());
        assert!(Schedule::from_json_str("not json").is_none());
        assert!(Schedule::from_json_str(r#"{"meta": {}, "items": {}}"#).is_none());
        assert!(Schedule::from_json_str(r#"{"meta": [], "items": []}"#).is_none());
        assert!(Schedule::from_json_str(r#"{"meta": {}, "items": []}"#).is_some());
    }

    #[test]
    fn test_schedule_round_trip_camel_case() {
        let mut schedule = Schedule::default();
        schedule
            .items
            .push(Block::new(6, 600, 660, "Brunch", "#22c55e").unwrap());

        let raw = schedule.to_json_string().unwrap();
        assert!(raw.contains("startMinute"));
        assert!(raw.contains("dayIndex"));
        assert!(raw.contains("showWeekend"));

        let parsed = Schedule::from_json_str(&raw).unwrap();
        assert_eq!(parsed, schedule);
    }

    #[test]
    fn test_legacy_document_without_visible_days() {
        let raw = r#"{
            "meta": {
                "title": "Legacy",
                "startMinute": 540,
                "endMinute": 1020,
                "minuteStep": 30,
                "showWeekend": false
            },
            "items": []
        }"#;
        let schedule = Schedule::from_json_str(raw).unwrap();
        assert_eq!(schedule.meta.visible_days, None);
        assert!(!schedule.meta.show_weekend);
        assert_eq!(schedule.meta.days.len(), 7);
    }

    #[test]
    fn test_meta_patch_shallow_merge() {
        let mut meta = Meta::default();
        let patch = MetaPatch {
            end_minute: Some(17 * 60),
            show_weekend: Some(false),
            ..Default::default()
        };
        patch.apply(&mut meta);

        assert_eq!(meta.end_minute, 17 * 60);
        assert!(!meta.show_weekend);
        assert_eq!(meta.start_minute, DEFAULT_START_MINUTE);
        assert_eq!(meta.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#4f46e5"));
        assert!(is_hex_color("#FFFFFF"));
        assert!(!is_hex_color("4f46e5"));
        assert!(!is_hex_color("#4f46e"));
        assert!(!is_hex_color("#4f46e5aa"));
        assert!(!is_hex_color("#zzzzzz"));
    }
}
