use crate::blocks::BlockId;
use crate::editing::document::Document;
use crate::editing::selection::SelectionSet;

/// Host-measured geometry for one block, in container coordinates. The
/// engine never measures anything itself; the rendering surface reports
/// rectangles and the engine does pure arithmetic on them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutRect {
    pub id: BlockId,
    pub top: f64,
    pub height: f64,
}

impl LayoutRect {
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Visible scroll window of the block container.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub top: f64,
    pub height: f64,
}

/// Directive for the host's auto-scroll loop. Recomputed on every drag
/// move; the host starts/stops its own repeating scroll from this.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AutoScroll {
    #[default]
    None,
    Up,
    Down,
}

/// Transient placeholder position: insert before a given block, or at the
/// very end. Never a document block, so the placeholder cannot leak into
/// snapshots.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DropSlot {
    Before(BlockId),
    AtEnd,
}

/// State of one pointer-driven reorder gesture.
///
/// The move-set is fixed at gesture start: the grabbed block alone, or the
/// whole multi-selection (in document order, not selection order) when the
/// grabbed block belongs to a selection of two or more. Any end without a
/// valid release leaves the document untouched.
#[derive(Debug, Clone)]
pub struct DragSession {
    moved: Vec<BlockId>,
    slot: DropSlot,
    auto_scroll: AutoScroll,
}

impl DragSession {
    /// Begin a gesture on the block under the pointer. Returns `None` for
    /// an unknown block (no session, no styling to reset).
    pub fn start(doc: &Document, selection: &SelectionSet, grabbed: BlockId) -> Option<Self> {
        if !doc.contains(grabbed) {
            return None;
        }
        let moved = if selection.contains(grabbed) && selection.len() > 1 {
            selection.in_document_order(doc)
        } else {
            vec![grabbed]
        };
        // Placeholder starts immediately after the last dragged block.
        let last_position = doc.position(*moved.last().expect("move-set is non-empty"))?;
        let slot = match doc.id_at(last_position + 1) {
            Some(next) => DropSlot::Before(next),
            None => DropSlot::AtEnd,
        };
        Some(Self {
            moved,
            slot,
            auto_scroll: AutoScroll::None,
        })
    }

    pub fn moved(&self) -> &[BlockId] {
        &self.moved
    }

    pub fn slot(&self) -> DropSlot {
        self.slot
    }

    pub fn auto_scroll(&self) -> AutoScroll {
        self.auto_scroll
    }

    /// Track a pointer move: retarget the placeholder and recompute the
    /// auto-scroll directive.
    ///
    /// `layout` lists blocks top-to-bottom. Non-dragged blocks are scanned
    /// in order; the drop target is the first whose vertical midpoint lies
    /// below the pointer (insert before it). Past the last one, insertion
    /// goes after the last non-dragged block.
    pub fn track(
        &mut self,
        pointer_y: f64,
        layout: &[LayoutRect],
        viewport: Viewport,
        scroll_margin: f64,
    ) {
        self.slot = self.target_for(pointer_y, layout);
        self.auto_scroll = if pointer_y <= viewport.top + scroll_margin {
            AutoScroll::Up
        } else if pointer_y >= viewport.top + viewport.height - scroll_margin {
            AutoScroll::Down
        } else {
            AutoScroll::None
        };
    }

    fn target_for(&self, pointer_y: f64, layout: &[LayoutRect]) -> DropSlot {
        layout
            .iter()
            .filter(|rect| !self.moved.contains(&rect.id))
            .find(|rect| rect.midpoint() > pointer_y)
            .map(|rect| DropSlot::Before(rect.id))
            .unwrap_or(DropSlot::AtEnd)
    }

    /// Would placing the group at the placeholder split the dragged run,
    /// i.e. leave non-dragged content interleaved within it? When the
    /// insertion point falls strictly inside the span of dragged blocks,
    /// the gesture must be cancelled rather than partially executed.
    pub fn placement_splits_run(&self, doc: &Document) -> bool {
        let positions: Vec<usize> = self
            .moved
            .iter()
            .filter_map(|&id| doc.position(id))
            .collect();
        let (Some(&min), Some(&max)) = (positions.iter().min(), positions.iter().max()) else {
            return true; // dragged blocks vanished mid-gesture
        };
        let insert_at = match self.slot {
            DropSlot::Before(id) => match doc.position(id) {
                Some(position) => position,
                None => return true,
            },
            DropSlot::AtEnd => doc.len(),
        };
        min < insert_at && insert_at <= max
    }

    /// Commit the gesture: move the group, as a unit and in original
    /// relative order, to immediately precede the placeholder. Returns
    /// false (and mutates nothing) when the placement would split the run.
    pub fn commit(&self, doc: &mut Document) -> bool {
        if self.placement_splits_run(doc) {
            log::debug!("drag placement would split the selected run, cancelling");
            return false;
        }
        let before = match self.slot {
            DropSlot::Before(id) => Some(id),
            DropSlot::AtEnd => None,
        };
        doc.move_group(&self.moved, before);
        true
    }
}
