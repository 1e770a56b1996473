// Interaction engine
//
// Pointer-driven state machine over the rendered grid: Idle, Dragging
// (moving a block), Resizing (dragging a block's end boundary). One
// gesture at a time, driven only by events for its captured pointer id.
// Target day/time are always recomputed from the absolute pointer
// position against the gesture's original snapshot, never from
// incremental deltas, so repeated rounding cannot drift.
//
// Intermediate positions are snapped and clamped on every move and
// written through the store's gesture fast path; release persists the
// already-valid state. A cancelled gesture keeps its last applied
// position (no rollback).

use std::time::{Duration, Instant};

use egui::Pos2;

use crate::grid::metrics::GridMetrics;
use crate::grid::render::GridLayout;
use crate::models::schedule::DEFAULT_BLOCK_MINUTES;
use crate::services::store::ScheduleStore;
use crate::utils::time::{clamp, snap_to_window};

/// How long after a drag/resize completes that clicks stay suppressed,
/// so the gesture's terminal pointer-up is not read as click-to-edit.
pub const CLICK_SUPPRESSION: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureKind {
    /// Moving the whole block; `grab_offset_y` is the canvas-local
    /// distance from the block's top edge to where it was grabbed.
    Move { grab_offset_y: f32 },
    /// Dragging the end boundary.
    Resize,
}

#[derive(Debug, Clone)]
struct Gesture {
    kind: GestureKind,
    id: String,
    pointer_id: u64,
    original_start: i32,
    original_end: i32,
}

/// Block defaults armed by the "add block, then click a cell" workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAdd {
    pub text: String,
    pub color: String,
}

/// What the engine asks the surrounding editor to do in response to a
/// click. The editor owns the modal/edit UI; the engine only resolves
/// where on the grid the click landed.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionRequest {
    /// Open the add dialog for a default-duration span at the clicked
    /// cell, already snapped and clamped.
    AddBlock { day_index: u8, start: i32, end: i32 },
    /// Open the edit dialog for an existing block.
    EditBlock { id: String },
    /// Place the armed block defaults on the clicked day.
    PlaceArmedAdd { day_index: u8, pending: PendingAdd },
}

#[derive(Default)]
pub struct InteractionEngine {
    gesture: Option<Gesture>,
    pending_add: Option<PendingAdd>,
    selected: Option<String>,
    suppress_clicks_until: Option<Instant>,
}

impl InteractionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Arm block defaults to place on the next empty-cell click.
    pub fn arm_add(&mut self, pending: PendingAdd) {
        self.pending_add = Some(pending);
    }

    pub fn disarm_add(&mut self) {
        self.pending_add = None;
    }

    pub fn pending_add(&self) -> Option<&PendingAdd> {
        self.pending_add.as_ref()
    }

    /// Pointer-down over the grid. Starts a gesture when the position
    /// lands on a rendered block (Resizing on its handle, Dragging
    /// otherwise) and returns true so the caller captures the pointer.
    /// Empty-cell presses start nothing; adds happen on click.
    pub fn pointer_down(
        &mut self,
        pos: Pos2,
        pointer_id: u64,
        layout: &GridLayout,
        metrics: &GridMetrics,
        store: &ScheduleStore,
    ) -> bool {
        if self.gesture.is_some() {
            return false;
        }

        let local = metrics.to_local(pos);
        let Some(hit) = layout.hit_test(local) else {
            return false;
        };
        let Some(item) = store.find_item(&hit.id) else {
            return false;
        };

        self.selected = Some(hit.id.clone());

        let kind = if hit.on_handle {
            GestureKind::Resize
        } else {
            GestureKind::Move {
                grab_offset_y: local.y - metrics.top_of(item.start),
            }
        };

        self.gesture = Some(Gesture {
            kind,
            id: hit.id,
            pointer_id,
            original_start: item.start,
            original_end: item.end,
        });
        true
    }

    /// Pointer movement for the captured pointer: recompute the target
    /// day/time from the absolute position, snap, clamp, and write it
    /// through the store's gesture fast path. A gesture whose block has
    /// vanished is silently abandoned.
    pub fn pointer_move(
        &mut self,
        pos: Pos2,
        pointer_id: u64,
        metrics: &GridMetrics,
        store: &mut ScheduleStore,
    ) {
        let Some(gesture) = self.gesture.clone() else {
            return;
        };
        if gesture.pointer_id != pointer_id {
            return;
        }

        let Some(item) = store.find_item(&gesture.id) else {
            self.gesture = None;
            return;
        };
        let (item_day, item_start) = (item.day_index, item.start);

        let id = gesture.id;
        match gesture.kind {
            GestureKind::Move { grab_offset_y } => {
                let duration = gesture.original_end - gesture.original_start;
                let day_index = metrics.day_at(pos);

                let local_y = metrics.to_local(pos).y - grab_offset_y;
                let raw = metrics.start_minute as f32 + local_y / metrics.px_per_minute;
                let mut start = snap_to_window(raw, metrics.start_minute, metrics.step);
                // Keep the far edge inside the window.
                start = clamp(start, metrics.start_minute, metrics.end_minute - duration);

                store.apply_gesture(&id, day_index, start, start + duration);
            }
            GestureKind::Resize => {
                let end = clamp(
                    metrics.snapped_minutes_at(pos),
                    item_start + metrics.step,
                    metrics.end_minute,
                );
                store.apply_gesture(&id, item_day, item_start, end);
            }
        }

        self.suppress_clicks_until = Some(Instant::now() + CLICK_SUPPRESSION);
    }

    /// Pointer-up for the captured pointer: persist and return to Idle.
    pub fn pointer_up(&mut self, pointer_id: u64, store: &mut ScheduleStore) {
        let Some(gesture) = &self.gesture else {
            return;
        };
        if gesture.pointer_id != pointer_id {
            return;
        }
        store.commit_gesture();
        self.gesture = None;
    }

    /// Pointer-cancel behaves like release: the last applied position is
    /// already valid, so it is committed as-is.
    pub fn pointer_cancel(&mut self, pointer_id: u64, store: &mut ScheduleStore) {
        self.pointer_up(pointer_id, store);
    }

    /// A completed click (press+release without enough movement to count
    /// as a drag). Resolves to an edit request on a block, an add request
    /// on empty grid space, or nothing inside the post-drag suppression
    /// window.
    pub fn click(
        &mut self,
        pos: Pos2,
        layout: &GridLayout,
        metrics: &GridMetrics,
    ) -> Option<InteractionRequest> {
        if let Some(until) = self.suppress_clicks_until {
            if Instant::now() < until {
                return None;
            }
        }

        let local = metrics.to_local(pos);
        if let Some(hit) = layout.hit_test(local) {
            self.selected = Some(hit.id.clone());
            return Some(InteractionRequest::EditBlock { id: hit.id });
        }

        let day_index = metrics.day_at(pos);

        if let Some(pending) = self.pending_add.take() {
            return Some(InteractionRequest::PlaceArmedAdd { day_index, pending });
        }

        let start = metrics.snapped_start_at(pos);
        let end = clamp(
            snap_to_window(
                (start + DEFAULT_BLOCK_MINUTES) as f32,
                metrics.start_minute,
                metrics.step,
            ),
            start + metrics.step,
            metrics.end_minute,
        );

        Some(InteractionRequest::AddBlock {
            day_index,
            start,
            end,
        })
    }
}
