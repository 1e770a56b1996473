// Schedule data store
//
// Sole owner and mutator of the schedule aggregate. Every committed
// mutation runs synchronously to completion: normalize, persist, then
// notify subscribers, in that order. Pointer gestures use a separate
// fast path that skips normalization and persistence on intermediate
// frames (the interaction engine keeps those values valid by clamping on
// every move) and persists once on release.

pub mod normalize;

use crate::grid::visible_days;
use crate::models::schedule::{Block, BlockPatch, Meta, MetaPatch, Schedule, DAY_LABELS};
use crate::models::settings::TimeFormat;
use crate::services::persistence::SchedulePersistence;
use crate::utils::time::format_minutes;

pub type SubscriberId = u64;

type Listener = Box<dyn FnMut(&Schedule)>;

pub struct ScheduleStore {
    schedule: Schedule,
    persistence: Box<dyn SchedulePersistence>,
    listeners: Vec<(SubscriberId, Listener)>,
    next_subscriber_id: SubscriberId,
}

impl ScheduleStore {
    /// Restore the persisted schedule, or start from the default document
    /// when nothing valid is stored. The restored document is normalized
    /// so legacy or hand-edited files come up satisfying the invariants.
    pub fn new(persistence: Box<dyn SchedulePersistence>) -> Self {
        let schedule = persistence.load().unwrap_or_else(|| {
            log::info!("No stored schedule found, starting from defaults");
            Schedule::default()
        });

        let mut store = Self {
            schedule,
            persistence,
            listeners: Vec::new(),
            next_subscriber_id: 0,
        };
        normalize::normalize_schedule(&mut store.schedule);
        store
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn meta(&self) -> &Meta {
        &self.schedule.meta
    }

    pub fn find_item(&self, id: &str) -> Option<&Block> {
        self.schedule.items.iter().find(|b| b.id == id)
    }

    /// Register a listener invoked with the new state after every
    /// successful mutation (persistence happens first).
    pub fn subscribe(&mut self, listener: impl FnMut(&Schedule) + 'static) -> SubscriberId {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.listeners.retain(|(sid, _)| *sid != id);
    }

    /// Atomically swap in a whole document (e.g. a loaded remote
    /// snapshot), then normalize. Shape rejection of raw JSON happens at
    /// the deserialization boundary (`Schedule::from_json_value`); a typed
    /// `Schedule` is always structurally acceptable here.
    pub fn replace_all(&mut self, schedule: Schedule) {
        log::info!(
            "Replacing schedule with loaded document ({} blocks)",
            schedule.items.len()
        );
        self.schedule = schedule;
        normalize::normalize_schedule(&mut self.schedule);
        self.emit();
    }

    /// Replace the schedule with the default document, discarding blocks.
    pub fn reset(&mut self) {
        log::info!("Resetting schedule to defaults");
        self.schedule = Schedule::default();
        self.emit();
    }

    /// Shallow-merge meta fields, re-derive day visibility, and
    /// re-normalize every block against the possibly changed window/step.
    pub fn set_meta(&mut self, patch: &MetaPatch) {
        patch.apply(&mut self.schedule.meta);
        normalize::normalize_schedule(&mut self.schedule);
        self.emit();
    }

    /// Snap and clamp the requested span into the current window, then
    /// append a new block with a fresh id.
    pub fn add_item(
        &mut self,
        day_index: u8,
        start: i32,
        end: i32,
        text: &str,
        color: &str,
        notes: Option<&str>,
    ) -> Result<Block, String> {
        let (start, end) = normalize::snap_block_bounds(start, end, &self.schedule.meta);
        let mut block = Block::new(day_index, start, end, text, color)?;
        if let Some(notes) = notes {
            block.notes = notes.to_string();
        }

        self.schedule.items.push(block.clone());
        self.emit();
        Ok(block)
    }

    /// Merge fields into the matching block, then re-normalize all blocks.
    /// Unknown ids are a no-op; returns whether a block was updated.
    pub fn update_item(&mut self, id: &str, patch: &BlockPatch) -> bool {
        let Some(block) = self.schedule.items.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        patch.apply(block);
        normalize::normalize_schedule(&mut self.schedule);
        self.emit();
        true
    }

    /// Remove the matching block if present; returns whether it existed.
    pub fn delete_item(&mut self, id: &str) -> bool {
        let before = self.schedule.items.len();
        self.schedule.items.retain(|b| b.id != id);
        if self.schedule.items.len() == before {
            return false;
        }
        self.emit();
        true
    }

    /// Gesture fast path: write already-snapped, already-clamped bounds
    /// into the live block and notify subscribers without persisting.
    /// Returns false (and does nothing) when the block no longer exists,
    /// so a gesture racing a deletion is silently abandoned.
    pub fn apply_gesture(&mut self, id: &str, day_index: u8, start: i32, end: i32) -> bool {
        let Some(block) = self.schedule.items.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        block.day_index = day_index;
        block.start = start;
        block.end = end;
        self.notify();
        true
    }

    /// Persist the state a finished gesture left behind. The intermediate
    /// values were kept valid on every move, so no re-normalization runs.
    pub fn commit_gesture(&mut self) {
        self.persistence.save(&self.schedule);
    }

    /// The weekday columns currently displayed, left to right.
    pub fn visible_day_indices(&self) -> Vec<u8> {
        visible_days::resolve(&self.schedule.meta)
    }

    /// Header labels for the visible columns.
    pub fn visible_day_labels(&self) -> Vec<String> {
        let meta = &self.schedule.meta;
        self.visible_day_indices()
            .into_iter()
            .map(|d| {
                meta.days
                    .get(d as usize)
                    .cloned()
                    .unwrap_or_else(|| DAY_LABELS[d as usize].to_string())
            })
            .collect()
    }

    /// One-line window summary, e.g. `08:00 – 20:00 • 15 min steps`.
    pub fn meta_line(&self, format: TimeFormat) -> String {
        let meta = &self.schedule.meta;
        format!(
            "{} – {} • {} min steps",
            format_minutes(meta.start_minute as f32, format),
            format_minutes(meta.end_minute as f32, format),
            meta.minute_step
        )
    }

    fn emit(&mut self) {
        self.persistence.save(&self.schedule);
        self.notify();
    }

    fn notify(&mut self) {
        // Listeners only see &Schedule, so they cannot mutate the store
        // re-entrantly; taking the list keeps the borrow checker happy.
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(&self.schedule);
        }
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::persistence::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fresh_store() -> (ScheduleStore, MemoryStore) {
        let persistence = MemoryStore::new();
        let store = ScheduleStore::new(Box::new(persistence.clone()));
        (store, persistence)
    }

    #[test]
    fn test_new_store_uses_defaults() {
        let (store, _) = fresh_store();
        let meta = store.meta();
        assert_eq!(meta.start_minute, 8 * 60);
        assert_eq!(meta.end_minute, 20 * 60);
        assert_eq!(meta.minute_step, 15);
        assert!(meta.show_weekend);
        assert!(store.schedule().items.is_empty());
    }

    #[test]
    fn test_new_store_restores_persisted_document() {
        let persistence = MemoryStore::new();
        let mut seeded = Schedule::default();
        seeded.meta.title = "Stored".to_string();
        persistence.save(&seeded);

        let store = ScheduleStore::new(Box::new(persistence));
        assert_eq!(store.meta().title, "Stored");
    }

    #[test]
    fn test_add_item_snaps_and_clamps() {
        let (mut store, _) = fresh_store();
        let block = store
            .add_item(1, 8 * 60 + 7, 8 * 60 + 37, "Gym", "#22c55e", None)
            .unwrap();
        // 08:07 is below the 15-minute midpoint, 08:37 above it.
        assert_eq!(block.start, 8 * 60);
        assert_eq!(block.end, 8 * 60 + 30);
        assert_eq!(store.schedule().items.len(), 1);
    }

    #[test]
    fn test_add_item_empty_text_and_color_fall_back() {
        let (mut store, _) = fresh_store();
        let block = store.add_item(0, 480, 540, "", "nope", None).unwrap();
        assert_eq!(block.text, "Block");
        assert_eq!(block.color, "#4f46e5");
    }

    #[test]
    fn test_update_item_unknown_id_is_noop() {
        let (mut store, persistence) = fresh_store();
        let before = persistence.snapshot();
        assert!(!store.update_item("missing", &BlockPatch::default()));
        assert_eq!(persistence.snapshot(), before);
    }

    #[test]
    fn test_update_item_renormalizes() {
        let (mut store, _) = fresh_store();
        let block = store.add_item(0, 480, 540, "A", "#112233", None).unwrap();
        let patch = BlockPatch {
            end: Some(5000),
            ..Default::default()
        };
        assert!(store.update_item(&block.id, &patch));
        assert_eq!(store.find_item(&block.id).unwrap().end, 20 * 60);
    }

    #[test]
    fn test_delete_item() {
        let (mut store, _) = fresh_store();
        let block = store.add_item(0, 480, 540, "A", "#112233", None).unwrap();
        assert!(store.delete_item(&block.id));
        assert!(!store.delete_item(&block.id));
        assert!(store.schedule().items.is_empty());
    }

    #[test]
    fn test_listeners_notified_after_persistence() {
        let (mut store, persistence) = fresh_store();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_in_listener = Rc::clone(&seen);
        let persistence_in_listener = persistence.clone();
        store.subscribe(move |schedule| {
            // Persistence must already hold the new state when we run.
            assert_eq!(
                persistence_in_listener.snapshot().as_ref(),
                Some(schedule)
            );
            seen_in_listener.borrow_mut().push(schedule.items.len());
        });

        store.add_item(0, 480, 540, "A", "#112233", None).unwrap();
        store.reset();
        assert_eq!(*seen.borrow(), vec![1, 0]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let (mut store, _) = fresh_store();
        let count = Rc::new(RefCell::new(0));

        let count_in_listener = Rc::clone(&count);
        let id = store.subscribe(move |_| *count_in_listener.borrow_mut() += 1);

        store.reset();
        store.unsubscribe(id);
        store.reset();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_set_meta_shrink_window_drops_block() {
        let (mut store, _) = fresh_store();
        store
            .add_item(0, 18 * 60, 19 * 60, "Late", "#112233", None)
            .unwrap();

        let patch = MetaPatch {
            end_minute: Some(17 * 60),
            ..Default::default()
        };
        store.set_meta(&patch);
        assert!(store.schedule().items.is_empty());
    }

    #[test]
    fn test_set_meta_weekend_toggle_preserves_blocks() {
        let (mut store, _) = fresh_store();
        let block = store
            .add_item(6, 10 * 60, 11 * 60, "Sunday", "#112233", None)
            .unwrap();

        store.set_meta(&MetaPatch {
            show_weekend: Some(false),
            ..Default::default()
        });
        assert_eq!(store.visible_day_indices(), vec![0, 1, 2, 3, 4]);
        assert_eq!(store.schedule().items.len(), 1);

        store.set_meta(&MetaPatch {
            show_weekend: Some(true),
            ..Default::default()
        });
        assert_eq!(store.visible_day_indices().len(), 7);
        let restored = store.find_item(&block.id).unwrap();
        assert_eq!(restored.start, 10 * 60);
        assert_eq!(restored.end, 11 * 60);
        assert_eq!(restored.day_index, 6);
    }

    #[test]
    fn test_replace_all_normalizes_loaded_document() {
        let (mut store, _) = fresh_store();
        let raw = r##"{
            "meta": {"startMinute": 480, "endMinute": 1200, "minuteStep": 7},
            "items": [
                {"id": "x", "dayIndex": 0, "start": 100, "end": 200,
                 "text": "early", "color": "#112233"}
            ]
        }"##;
        let loaded = Schedule::from_json_str(raw).unwrap();
        store.replace_all(loaded);

        // Bad step repaired; out-of-window block dropped.
        assert_eq!(store.meta().minute_step, 15);
        assert!(store.schedule().items.is_empty());
    }

    #[test]
    fn test_gesture_fast_path_skips_persistence_until_commit() {
        let (mut store, persistence) = fresh_store();
        let block = store.add_item(0, 480, 540, "A", "#112233", None).unwrap();
        let persisted_before = persistence.snapshot().unwrap();

        assert!(store.apply_gesture(&block.id, 2, 600, 660));
        // Live move is visible in memory but not yet on "disk".
        assert_eq!(store.find_item(&block.id).unwrap().start, 600);
        assert_eq!(persistence.snapshot().unwrap(), persisted_before);

        store.commit_gesture();
        let persisted = persistence.snapshot().unwrap();
        assert_eq!(persisted.items[0].day_index, 2);
        assert_eq!(persisted.items[0].start, 600);
    }

    #[test]
    fn test_gesture_on_deleted_block_is_abandoned() {
        let (mut store, _) = fresh_store();
        assert!(!store.apply_gesture("gone", 0, 480, 540));
    }

    #[test]
    fn test_meta_line() {
        let (store, _) = fresh_store();
        assert_eq!(
            store.meta_line(TimeFormat::TwentyFourHour),
            "08:00 – 20:00 • 15 min steps"
        );
    }

    #[test]
    fn test_visible_day_labels() {
        let (mut store, _) = fresh_store();
        store.set_meta(&MetaPatch {
            visible_days: Some(vec![0, 4, 6]),
            ..Default::default()
        });
        assert_eq!(store.visible_day_labels(), vec!["Mon", "Fri", "Sun"]);
    }
}
