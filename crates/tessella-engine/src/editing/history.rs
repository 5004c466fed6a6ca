use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::blocks::BlockId;
use crate::editing::selection::Caret;

/// One captured state: full internal-markup snapshot plus the cursor and
/// multi-selection active when it was taken.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub markup: String,
    pub caret: Option<Caret>,
    pub selection: Vec<BlockId>,
}

/// Bounded undo/redo stacks over full-document snapshots.
///
/// Both sides are ring buffers: pushing past capacity evicts the oldest
/// entry. A push whose snapshot equals the current undo top is silently
/// dropped, so repeated immediate saves with no intervening mutation cost
/// nothing. There is no partial-failure state; an entry is either stored
/// whole or the push was a no-op.
#[derive(Debug)]
pub struct HistoryStack {
    undo: VecDeque<HistoryEntry>,
    redo: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a state. Clears the redo stack (a new edit invalidates any
    /// undone future). Returns false when the push was dropped as a
    /// duplicate of the current top.
    pub fn push(&mut self, entry: HistoryEntry) -> bool {
        if self.undo.back().is_some_and(|top| top.markup == entry.markup) {
            return false;
        }
        self.undo.push_back(entry);
        if self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        self.redo.clear();
        true
    }

    /// Pop the most recent undo entry, parking the live state on the
    /// (bounded) redo stack. `None` on an empty stack: a silent no-op for
    /// the caller.
    pub fn undo(&mut self, live: HistoryEntry) -> Option<HistoryEntry> {
        let entry = self.undo.pop_back()?;
        self.redo.push_back(live);
        if self.redo.len() > self.capacity {
            self.redo.pop_front();
        }
        Some(entry)
    }

    /// Symmetric to [`undo`](Self::undo).
    pub fn redo(&mut self, live: HistoryEntry) -> Option<HistoryEntry> {
        let entry = self.redo.pop_back()?;
        self.undo.push_back(live);
        if self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// Single-slot deferred snapshot for character-level edits.
///
/// The first qualifying edit of a burst captures the pre-burst state and
/// arms the deadline; every further edit just pushes the deadline out. The
/// host pumps [`poll`](Self::poll); structural edits and undo/redo flush
/// or cancel the slot before acting. No thread, no timer handle; the
/// cooperative model owns all scheduling.
#[derive(Debug)]
pub struct DebounceSlot {
    window: Duration,
    pending: Option<(Instant, HistoryEntry)>,
}

impl DebounceSlot {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Start the quiet window, capturing the pre-burst entry. Call only
    /// when idle; [`touch`](Self::touch) handles the armed case.
    pub fn arm(&mut self, now: Instant, entry: HistoryEntry) {
        self.pending = Some((now + self.window, entry));
    }

    /// Push the deadline out after a further edit. Returns false when the
    /// slot is idle (caller should [`arm`](Self::arm) with a fresh
    /// pre-burst capture instead).
    pub fn touch(&mut self, now: Instant) -> bool {
        match &mut self.pending {
            Some((deadline, _)) => {
                *deadline = now + self.window;
                true
            }
            None => false,
        }
    }

    /// Fire the pending entry if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<HistoryEntry> {
        if matches!(self.pending, Some((deadline, _)) if deadline <= now) {
            return self.pending.take().map(|(_, entry)| entry);
        }
        None
    }

    /// Flush regardless of deadline (structural edit or undo about to run).
    pub fn flush(&mut self) -> Option<HistoryEntry> {
        self.pending.take().map(|(_, entry)| entry)
    }

    /// Drop the pending entry without recording it (teardown).
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(markup: &str) -> HistoryEntry {
        HistoryEntry {
            markup: markup.to_string(),
            caret: None,
            selection: Vec::new(),
        }
    }

    #[test]
    fn push_caps_at_capacity_evicting_oldest() {
        let mut stack = HistoryStack::new(50);
        for i in 0..100 {
            stack.push(entry(&format!("s{i}")));
        }
        assert_eq!(stack.undo_len(), 50);
        // Undoing everything lands on the oldest retained entry.
        let mut last = None;
        let mut live = entry("live");
        while let Some(e) = stack.undo(live.clone()) {
            live = e.clone();
            last = Some(e);
        }
        assert_eq!(last.unwrap().markup, "s50");
    }

    #[test]
    fn duplicate_top_push_is_dropped() {
        let mut stack = HistoryStack::new(50);
        assert!(stack.push(entry("same")));
        assert!(!stack.push(entry("same")));
        assert_eq!(stack.undo_len(), 1);
    }

    #[test]
    fn undo_on_empty_stack_is_none() {
        let mut stack = HistoryStack::new(50);
        assert_eq!(stack.undo(entry("live")), None);
    }

    #[test]
    fn push_clears_redo() {
        let mut stack = HistoryStack::new(50);
        stack.push(entry("a"));
        stack.undo(entry("live")).unwrap();
        assert!(stack.can_redo());
        stack.push(entry("b"));
        assert!(!stack.can_redo());
    }

    #[test]
    fn undo_then_redo_restores_symmetrically() {
        let mut stack = HistoryStack::new(50);
        stack.push(entry("old"));
        let popped = stack.undo(entry("new")).unwrap();
        assert_eq!(popped.markup, "old");
        let back = stack.redo(popped).unwrap();
        assert_eq!(back.markup, "new");
        assert_eq!(stack.undo_len(), 1);
    }

    #[test]
    fn debounce_keeps_the_pre_burst_entry() {
        let mut slot = DebounceSlot::new(Duration::from_secs(1));
        let t0 = Instant::now();
        slot.arm(t0, entry("before burst"));
        assert!(slot.touch(t0 + Duration::from_millis(500)));
        let fired = slot.poll(t0 + Duration::from_millis(1600)).unwrap();
        assert_eq!(fired.markup, "before burst");
    }

    #[test]
    fn debounce_resets_deadline_on_every_edit() {
        let mut slot = DebounceSlot::new(Duration::from_secs(1));
        let t0 = Instant::now();
        slot.arm(t0, entry("x"));
        // Re-armed at 900ms, so polling at 1.5s (600ms later) fires nothing.
        slot.touch(t0 + Duration::from_millis(900));
        assert!(slot.poll(t0 + Duration::from_millis(1500)).is_none());
        assert!(slot.poll(t0 + Duration::from_millis(1900)).is_some());
    }

    #[test]
    fn touch_reports_idle_slot() {
        let mut slot = DebounceSlot::new(Duration::from_secs(1));
        assert!(!slot.touch(Instant::now()));
    }

    #[test]
    fn flush_returns_pending_before_deadline() {
        let mut slot = DebounceSlot::new(Duration::from_secs(1));
        slot.arm(Instant::now(), entry("pending"));
        assert_eq!(slot.flush().unwrap().markup, "pending");
        assert!(!slot.is_armed());
    }

    #[test]
    fn cancel_drops_pending_silently() {
        let mut slot = DebounceSlot::new(Duration::from_secs(1));
        slot.arm(Instant::now(), entry("pending"));
        slot.cancel();
        assert!(slot.flush().is_none());
    }
}
