//! The undo/redo history engine: a bounded snapshot stack.
//!
//! Critical mutations snapshot the whole scene BEFORE they apply;
//! non-critical edits (continuous transform drags) are never recorded:
//! users rarely undo a drag, and a whole-list deep copy per mouse-move
//! frame would stall the frame loop. Two hooks refine the stack without a
//! second history design:
//!
//! - merge window: consecutive records with the same label within the
//!   window collapse into one entry holding the OLDEST pre-image, so a
//!   burst of edits undoes as a single step;
//! - groups: `begin_group`/`end_group` make a run of records one atomic
//!   entry.

use crate::snapshot::SceneSnapshot;
use easel_api_core::ObjectId;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// What a history entry was recorded for; merge identity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EditLabel {
    pub action: EditAction,
    pub target: Option<ObjectId>,
}

impl EditLabel {
    #[inline]
    pub fn new(action: EditAction, target: Option<ObjectId>) -> Self {
        Self { action, target }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EditAction {
    Add,
    Remove,
    Update,
    Reparent,
    Load,
}

impl EditAction {
    /// Whether consecutive records of this action may coalesce. Structural
    /// one-shots (add/remove/load) always get their own entry.
    #[inline]
    fn merges(&self) -> bool {
        matches!(self, EditAction::Update | EditAction::Reparent)
    }
}

/// One undoable step: the scene as it was before the edit.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub snapshot: SceneSnapshot,
    pub label: EditLabel,
    recorded_at_ms: u64,
}

/// Millisecond clock for merge-window decisions; swappable in tests.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since construction.
pub struct MonotonicClock(Instant);

impl MonotonicClock {
    pub fn new() -> Self {
        Self(Instant::now())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
}

#[derive(Clone, Debug)]
pub struct HistoryConfig {
    /// Bounded undo depth; the oldest entry is evicted on overflow.
    pub capacity: usize,
    /// Records with the same label within this window coalesce.
    pub merge_window_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            merge_window_ms: 500,
        }
    }
}

/// Bounded snapshot-stack history.
pub struct SceneHistory {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    config: HistoryConfig,
    clock: Box<dyn Clock>,
    restoring: Rc<Cell<bool>>,
    group_depth: u32,
    group_recorded: bool,
}

impl SceneHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_clock(config, Box::new(MonotonicClock::new()))
    }

    pub fn with_clock(config: HistoryConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            config,
            clock,
            restoring: Rc::new(Cell::new(false)),
            group_depth: 0,
            group_recorded: false,
        }
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[inline]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[inline]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    #[inline]
    pub fn is_restoring(&self) -> bool {
        self.restoring.get()
    }

    /// Record the pre-mutation scene state. Clears the redo stack (linear
    /// history). Ignored while a restore is in flight, absorbed by the top
    /// entry inside the merge window, and collapsed inside an open group.
    pub fn record(&mut self, snapshot: SceneSnapshot, label: EditLabel) {
        if self.restoring.get() {
            return;
        }
        self.redo.clear();

        if self.group_depth > 0 {
            if self.group_recorded {
                return;
            }
            self.group_recorded = true;
        } else if let Some(top) = self.undo.last_mut() {
            // Merge hook: same edit on the same target inside the window
            // keeps the oldest pre-image and refreshes the window.
            let now = self.clock.now_ms();
            if top.label == label
                && label.action.merges()
                && now.saturating_sub(top.recorded_at_ms) <= self.config.merge_window_ms
            {
                top.recorded_at_ms = now;
                return;
            }
        }

        self.undo.push(HistoryEntry {
            snapshot,
            label,
            recorded_at_ms: self.clock.now_ms(),
        });
        if self.undo.len() > self.config.capacity {
            log::debug!("history capacity reached, evicting oldest entry");
            self.undo.remove(0);
        }
    }

    /// Open a compound group: until `end_group`, all records collapse into
    /// the first one. Nested groups extend the outermost.
    pub fn begin_group(&mut self) {
        if self.group_depth == 0 {
            self.group_recorded = false;
        }
        self.group_depth += 1;
    }

    pub fn end_group(&mut self) {
        self.group_depth = self.group_depth.saturating_sub(1);
        if self.group_depth == 0 {
            self.group_recorded = false;
        }
    }

    /// Pop the entry to undo. The caller applies it and either commits the
    /// inverse with [`finish_undo`] or restores the stack with
    /// [`push_undo`] on failure.
    ///
    /// [`finish_undo`]: SceneHistory::finish_undo
    /// [`push_undo`]: SceneHistory::push_undo
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo.pop()
    }

    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo.pop()
    }

    /// Push an entry back onto the undo stack (failed apply).
    pub fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo.push(entry);
    }

    /// Push an entry back onto the redo stack (failed apply).
    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo.push(entry);
    }

    /// Commit a successful undo: the pre-undo state becomes redoable.
    pub fn finish_undo(&mut self, current: SceneSnapshot, label: EditLabel) {
        self.redo.push(HistoryEntry {
            snapshot: current,
            label,
            recorded_at_ms: self.clock.now_ms(),
        });
    }

    /// Commit a successful redo: the pre-redo state becomes undoable
    /// again (without clearing redo).
    pub fn finish_redo(&mut self, current: SceneSnapshot, label: EditLabel) {
        self.undo.push(HistoryEntry {
            snapshot: current,
            label,
            recorded_at_ms: self.clock.now_ms(),
        });
    }

    /// Mark a restore in flight for the returned scope; recording is
    /// suppressed until the guard drops (also on early exit or panic).
    pub fn restore_scope(&self) -> RestoreScope {
        self.restoring.set(true);
        RestoreScope {
            flag: Rc::clone(&self.restoring),
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for SceneHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

/// Clears the restoring flag on drop.
pub struct RestoreScope {
    flag: Rc<Cell<bool>>,
}

impl Drop for RestoreScope {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
