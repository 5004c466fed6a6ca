use std::time::Instant;

use crate::blocks::{BlockData, BlockId, Payload, Registry};
use crate::editing::document::{DeleteOutcome, Document, MoveDirection};
use crate::editing::dragdrop::{AutoScroll, DragSession, LayoutRect, Viewport};
use crate::editing::history::{DebounceSlot, HistoryEntry, HistoryStack};
use crate::editing::selection::{Caret, SelectionSet, capture_caret, restore_caret};
use crate::markup::{Node, is_block_tag, write_nodes};
use crate::media::PreviewFetcher;
use crate::options::EngineOptions;
use crate::sanitize::{SanitizePolicy, plain_to_nodes, sanitize};
use crate::serialize::{MarkupMode, blocks_to_markup, classify_element};
use crate::surface::EditSurface;

/// Parallel clipboard formats written by every copy/cut, so pasting into a
/// foreign host degrades gracefully to plain text.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipboardPayload {
    pub html: String,
    pub plain: String,
}

/// The engine facade: one live document, its registry, selection state,
/// history, and the transient drag session.
///
/// Control flow per gesture: read selection state, mutate the document,
/// push history, and only serialize when external output is requested.
/// Every operation runs synchronously to completion; the only deferred
/// work is the debounced character-edit snapshot pumped by [`tick`] and
/// caret restoration ordered strictly after an undo/redo swap.
///
/// [`tick`]: Editor::tick
pub struct Editor {
    registry: Registry,
    doc: Document,
    history: HistoryStack,
    debounce: DebounceSlot,
    selection: SelectionSet,
    drag: Option<DragSession>,
    policy: SanitizePolicy,
    options: EngineOptions,
}

impl Editor {
    pub fn new(registry: Registry, options: EngineOptions) -> Self {
        let doc = Document::new(&registry);
        Self::with_document(doc, registry, options)
    }

    /// Load canonical markup. Fresh ids are minted for every block.
    pub fn from_markup(markup: &str, registry: Registry, options: EngineOptions) -> Self {
        let doc = Document::from_markup(markup, &registry);
        Self::with_document(doc, registry, options)
    }

    fn with_document(doc: Document, registry: Registry, options: EngineOptions) -> Self {
        Self {
            history: HistoryStack::new(options.history_capacity),
            debounce: DebounceSlot::new(options.snapshot_debounce),
            selection: SelectionSet::default(),
            drag: None,
            policy: SanitizePolicy::default(),
            registry,
            doc,
            options,
        }
    }

    pub fn set_sanitize_policy(&mut self, policy: SanitizePolicy) {
        self.policy = policy;
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_len()
    }

    /// Export the whole document as portable canonical markup.
    pub fn export(&self) -> String {
        self.doc.to_markup(MarkupMode::External)
    }

    /// Mirror the document's editable text onto the surface (initial mount).
    pub fn mount(&self, surface: &mut dyn EditSurface) {
        for block in self.doc.iter() {
            surface.set_block_text(block.id, block.payload.primary_text().unwrap_or_default());
        }
    }

    // ---- history -------------------------------------------------------

    /// Snapshot the live state together with the current cursor/selection.
    fn snapshot_entry(&self, surface: &dyn EditSurface) -> HistoryEntry {
        HistoryEntry {
            markup: self.doc.to_markup(MarkupMode::Internal),
            caret: capture_caret(surface, &self.doc),
            selection: self.selection.in_document_order(&self.doc),
        }
    }

    /// The immediate history path preceding every structural mutation. A
    /// pending debounced entry is recorded first so the two never merge.
    fn push_structural(&mut self, surface: &dyn EditSurface) {
        if let Some(pending) = self.debounce.flush() {
            self.history.push(pending);
        }
        let entry = self.snapshot_entry(surface);
        self.history.push(entry);
    }

    /// Pump deferred work. Fires the debounced character-edit snapshot
    /// when its quiet window has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(entry) = self.debounce.poll(now) {
            self.history.push(entry);
        }
    }

    /// Cancel deferred work without recording it (host teardown).
    pub fn teardown(&mut self) {
        self.debounce.cancel();
        self.drag = None;
    }

    pub fn undo(&mut self, surface: &mut dyn EditSurface) -> bool {
        if let Some(pending) = self.debounce.flush() {
            self.history.push(pending);
        }
        let live = self.snapshot_entry(surface);
        let Some(entry) = self.history.undo(live) else {
            return false;
        };
        self.apply_entry(surface, entry);
        true
    }

    pub fn redo(&mut self, surface: &mut dyn EditSurface) -> bool {
        self.debounce.cancel();
        let live = self.snapshot_entry(surface);
        let Some(entry) = self.history.redo(live) else {
            return false;
        };
        self.apply_entry(surface, entry);
        true
    }

    /// Swap a history entry in as the live state, then restore its
    /// captured cursor, strictly afterwards, since restoration needs the
    /// target blocks to exist.
    fn apply_entry(&mut self, surface: &mut dyn EditSurface, entry: HistoryEntry) {
        let old_ids: Vec<BlockId> = self.doc.block_ids().to_vec();
        self.doc = Document::from_snapshot(&entry.markup, &self.registry);

        for id in old_ids {
            if !self.doc.contains(id) {
                surface.remove_block(id);
            }
        }
        self.mount(surface);

        let mut selection = SelectionSet::from(entry.selection);
        selection.retain_existing(&self.doc);
        self.selection = selection;

        if let Some(caret) = entry.caret {
            restore_caret(surface, &self.doc, caret);
        }
    }

    // ---- structural operations ----------------------------------------

    /// Insert a new block after `after` (or at the end). Fresh block, caret
    /// at its start.
    pub fn insert_block(
        &mut self,
        surface: &mut dyn EditSurface,
        tag: &str,
        after: Option<BlockId>,
        data: &BlockData,
    ) -> BlockId {
        self.push_structural(surface);
        let id = self.doc.insert_after(&self.registry, tag, after, data);
        let text = self
            .doc
            .get(id)
            .and_then(|b| b.payload.primary_text().map(str::to_string))
            .unwrap_or_default();
        surface.set_block_text(id, &text);
        surface.set_caret(id, 0);
        id
    }

    pub fn delete_block(&mut self, surface: &mut dyn EditSurface, id: BlockId) -> DeleteOutcome {
        if !self.doc.contains(id) {
            return DeleteOutcome::Missing;
        }
        self.push_structural(surface);
        let neighbor = self
            .doc
            .position(id)
            .and_then(|i| if i > 0 { self.doc.id_at(i - 1) } else { self.doc.id_at(i + 1) });
        let outcome = self.doc.delete(id);
        match outcome {
            DeleteOutcome::Removed => {
                surface.remove_block(id);
                let focus = neighbor.unwrap_or_else(|| self.doc.first_id());
                let offset = self
                    .doc
                    .get(focus)
                    .map(|b| b.payload.char_len())
                    .unwrap_or(0);
                surface.set_caret(focus, offset);
            }
            DeleteOutcome::ClearedLast => {
                surface.set_block_text(id, "");
                surface.set_caret(id, 0);
            }
            DeleteOutcome::Missing => {}
        }
        outcome
    }

    /// Swap with the adjacent sibling. A move at the document edge is a
    /// no-op with no history entry.
    pub fn move_block(
        &mut self,
        surface: &mut dyn EditSurface,
        id: BlockId,
        direction: MoveDirection,
    ) -> bool {
        let feasible = match (self.doc.position(id), direction) {
            (Some(0), MoveDirection::Up) => false,
            (Some(i), MoveDirection::Down) => i + 1 < self.doc.len(),
            (Some(_), MoveDirection::Up) => true,
            (None, _) => false,
        };
        if !feasible {
            return false;
        }
        self.push_structural(surface);
        self.doc.move_block(id, direction)
    }

    /// Change a block's type in place via its registered `reinterpret`.
    pub fn transform_block(
        &mut self,
        surface: &mut dyn EditSurface,
        id: BlockId,
        new_tag: &str,
        data: Option<&BlockData>,
    ) -> bool {
        if !self.doc.contains(id) {
            return false;
        }
        self.push_structural(surface);
        let changed = self.doc.transform(&self.registry, id, new_tag, data);
        if changed {
            let text = self
                .doc
                .get(id)
                .and_then(|b| b.payload.primary_text().map(str::to_string))
                .unwrap_or_default();
            surface.set_block_text(id, &text);
        }
        changed
    }

    pub fn duplicate_block(
        &mut self,
        surface: &mut dyn EditSurface,
        id: BlockId,
    ) -> Option<BlockId> {
        if !self.doc.contains(id) {
            return None;
        }
        self.push_structural(surface);
        let copy = self.doc.duplicate(id)?;
        let text = self
            .doc
            .get(copy)
            .and_then(|b| b.payload.primary_text().map(str::to_string))
            .unwrap_or_default();
        surface.set_block_text(copy, &text);
        Some(copy)
    }

    /// Backspace at block start: merge into the previous block, caret at
    /// the join point.
    pub fn merge_block_into_previous(
        &mut self,
        surface: &mut dyn EditSurface,
        id: BlockId,
    ) -> bool {
        // Feasibility first so an impossible merge records no history.
        let feasible = match self.doc.position(id) {
            Some(0) | None => false,
            Some(i) => {
                let prev = self.doc.id_at(i - 1);
                self.doc.get(id).and_then(|b| b.payload.primary_text()).is_some()
                    && prev
                        .and_then(|p| self.doc.get(p))
                        .and_then(|b| b.payload.primary_text())
                        .is_some()
            }
        };
        if !feasible {
            return false;
        }
        self.push_structural(surface);
        let Some((survivor, join_offset)) = self.doc.merge_into_previous(id) else {
            return false;
        };
        surface.remove_block(id);
        let text = self
            .doc
            .get(survivor)
            .and_then(|b| b.payload.primary_text().map(str::to_string))
            .unwrap_or_default();
        surface.set_block_text(survivor, &text);
        surface.set_caret(survivor, join_offset);
        true
    }

    /// Remove every selected block (last-block guarantee applies).
    pub fn delete_selection(&mut self, surface: &mut dyn EditSurface) -> bool {
        let ids = self.selection.in_document_order(&self.doc);
        if ids.is_empty() {
            return false;
        }
        self.push_structural(surface);
        self.doc.delete_many(&ids);
        for id in &ids {
            if !self.doc.contains(*id) {
                surface.remove_block(*id);
            }
        }
        self.selection.clear();
        let focus = self.doc.first_id();
        surface.set_block_text(
            focus,
            self.doc
                .get(focus)
                .and_then(|b| b.payload.primary_text())
                .unwrap_or_default(),
        );
        surface.set_caret(focus, 0);
        true
    }

    // ---- character-level edits ----------------------------------------

    /// Apply a character-level data update. The first edit of a burst
    /// captures the pre-burst snapshot; the entry is recorded once the
    /// quiet window elapses (see [`tick`](Editor::tick)).
    pub fn update_block_data(
        &mut self,
        surface: &mut dyn EditSurface,
        id: BlockId,
        data: &BlockData,
        now: Instant,
    ) -> bool {
        if !self.doc.contains(id) {
            return false;
        }
        if !self.debounce.touch(now) {
            let entry = self.snapshot_entry(surface);
            self.debounce.arm(now, entry);
        }
        let updated = self.doc.update_block(&self.registry, id, data);
        if updated {
            if let Some(text) = self.doc.get(id).and_then(|b| b.payload.primary_text()) {
                surface.set_block_text(id, text);
            }
        }
        updated
    }

    // ---- selection -----------------------------------------------------

    /// Place the caret, dropping any active multi-selection.
    pub fn set_caret(&mut self, surface: &mut dyn EditSurface, id: BlockId, offset: usize) {
        if !self.doc.contains(id) {
            return;
        }
        self.selection.clear();
        let clamped = self
            .doc
            .get(id)
            .map(|b| offset.min(b.payload.char_len()))
            .unwrap_or(0);
        surface.set_caret(id, clamped);
    }

    /// Modifier gesture: toggle a block in the multi-selection.
    pub fn toggle_select(&mut self, id: BlockId) {
        if self.doc.contains(id) {
            self.selection.toggle(id);
        }
    }

    pub fn select_range(&mut self, anchor: BlockId, focus: BlockId) {
        self.selection.select_range(&self.doc, anchor, focus);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.doc);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ---- clipboard -----------------------------------------------------

    /// Copy the active selection (or the caret block, or the whole
    /// document) as parallel html/plain formats. Always re-serializes
    /// through the external mode: raw internal markup never leaves the
    /// engine.
    pub fn copy(&self, surface: &dyn EditSurface) -> ClipboardPayload {
        let ids = self.copy_targets(surface);
        let blocks: Vec<_> = ids.iter().filter_map(|&id| self.doc.get(id)).collect();
        let html = blocks_to_markup(blocks.iter().copied(), MarkupMode::External);
        let plain = blocks
            .iter()
            .map(|b| block_plain_text(&b.payload))
            .collect::<Vec<_>>()
            .join("\n\n");
        ClipboardPayload { html, plain }
    }

    /// Cut: copy, then delete what was copied (one structural operation).
    pub fn cut(&mut self, surface: &mut dyn EditSurface) -> ClipboardPayload {
        let payload = self.copy(surface);
        let ids = self.copy_targets(surface);
        self.push_structural(surface);
        self.doc.delete_many(&ids);
        for id in &ids {
            if !self.doc.contains(*id) {
                surface.remove_block(*id);
            }
        }
        self.selection.clear();
        payload
    }

    fn copy_targets(&self, surface: &dyn EditSurface) -> Vec<BlockId> {
        if !self.selection.is_empty() {
            return self.selection.in_document_order(&self.doc);
        }
        if let Some(caret) = capture_caret(surface, &self.doc) {
            return vec![caret.block];
        }
        self.doc.block_ids().to_vec()
    }

    // ---- paste ---------------------------------------------------------

    /// Paste external markup at the caret. Input is sanitized first;
    /// block-level results go through classification and construction,
    /// inline-only results splice into the caret block's text.
    pub fn paste_markup(&mut self, surface: &mut dyn EditSurface, input: &str) {
        let nodes = sanitize(input, &self.policy);
        self.paste_nodes(surface, nodes);
    }

    /// Paste plain clipboard text (one paragraph per blank-line group).
    pub fn paste_plain(&mut self, surface: &mut dyn EditSurface, text: &str) {
        let nodes = plain_to_nodes(text);
        self.paste_nodes(surface, nodes);
    }

    fn paste_nodes(&mut self, surface: &mut dyn EditSurface, nodes: Vec<Node>) {
        if nodes.is_empty() {
            return;
        }
        let caret = capture_caret(surface, &self.doc);
        let has_block_level = nodes
            .iter()
            .any(|n| matches!(n, Node::Element(el) if is_block_tag(&el.tag)));

        if !has_block_level {
            self.paste_inline(surface, caret, &nodes);
            return;
        }

        self.push_structural(surface);
        let mut after = caret.map(|c| c.block);
        let mut last_inserted = None;
        for node in nodes {
            if node.is_blank_text() {
                continue;
            }
            let (tag, data) = match &node {
                Node::Element(el) if is_block_tag(&el.tag) => classify_element(el),
                // Stray inline content between block elements becomes its
                // own paragraph.
                other => (
                    "paragraph".to_string(),
                    BlockData::with_text(write_nodes(std::slice::from_ref(other))),
                ),
            };
            let id = self.doc.insert_after(&self.registry, &tag, after, &data);
            surface.set_block_text(
                id,
                self.doc
                    .get(id)
                    .and_then(|b| b.payload.primary_text())
                    .unwrap_or_default(),
            );
            after = Some(id);
            last_inserted = Some(id);
        }

        // Discard an empty block left behind at the paste point.
        if let Some(caret) = caret {
            let was_empty = self
                .doc
                .get(caret.block)
                .is_some_and(|b| b.payload.is_empty());
            if was_empty && self.doc.len() > 1 {
                self.doc.delete(caret.block);
                surface.remove_block(caret.block);
            }
        }

        if let Some(id) = last_inserted {
            let offset = self.doc.get(id).map(|b| b.payload.char_len()).unwrap_or(0);
            surface.set_caret(id, offset);
        }
    }

    /// Inline paste path: splice sanitized inline markup into the caret
    /// block's primary text at the caret's character offset.
    fn paste_inline(
        &mut self,
        surface: &mut dyn EditSurface,
        caret: Option<Caret>,
        nodes: &[Node],
    ) {
        let Some(caret) = caret else {
            return;
        };
        let Some(current) = self
            .doc
            .get(caret.block)
            .and_then(|b| b.payload.primary_text().map(str::to_string))
        else {
            return;
        };
        let insert = write_nodes(nodes);
        if insert.is_empty() {
            return;
        }
        self.push_structural(surface);
        let spliced = splice_chars(&current, caret.offset, &insert);
        self.doc
            .update_block(&self.registry, caret.block, &BlockData::with_text(spliced.clone()));
        surface.set_block_text(caret.block, &spliced);
        surface.set_caret(caret.block, caret.offset + insert.chars().count());
    }

    /// Insert a link-preview block for `url`, degrading to a plain link
    /// when the fetcher yields nothing.
    pub fn insert_embed(
        &mut self,
        surface: &mut dyn EditSurface,
        after: Option<BlockId>,
        url: &str,
        fetcher: Option<&dyn PreviewFetcher>,
    ) -> BlockId {
        let data = crate::media::embed_data_for(url, fetcher);
        self.insert_block(surface, "embed", after, &data)
    }

    // ---- drag and drop -------------------------------------------------

    /// Begin a drag on the block under the pointer. Returns false when the
    /// block is unknown (nothing to reset either).
    pub fn drag_start(&mut self, grabbed: BlockId) -> bool {
        self.drag = DragSession::start(&self.doc, &self.selection, grabbed);
        self.drag.is_some()
    }

    /// Pointer move during a drag: retarget the placeholder, return the
    /// auto-scroll directive for the host.
    pub fn drag_track(
        &mut self,
        pointer_y: f64,
        layout: &[LayoutRect],
        viewport: Viewport,
    ) -> AutoScroll {
        let margin = self.options.scroll_margin;
        match &mut self.drag {
            Some(session) => {
                session.track(pointer_y, layout, viewport, margin);
                session.auto_scroll()
            }
            None => AutoScroll::None,
        }
    }

    /// Release: commit the move atomically, or cancel without any mutation
    /// or history entry when the placement would split the dragged run.
    /// The placeholder is session state, never a block, so it cannot be
    /// captured by the snapshot.
    pub fn drag_drop(&mut self, surface: &mut dyn EditSurface) -> bool {
        let Some(session) = self.drag.take() else {
            return false;
        };
        if session.placement_splits_run(&self.doc) {
            return false;
        }
        self.push_structural(surface);
        session.commit(&mut self.doc)
    }

    /// Any end without a valid release: forget all transient state, leave
    /// the tree unchanged.
    pub fn drag_cancel(&mut self) {
        self.drag = None;
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }
}

/// Insert `insert` into `text` at a character offset (clamped).
fn splice_chars(text: &str, offset: usize, insert: &str) -> String {
    let byte_offset = text
        .char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..byte_offset]);
    out.push_str(insert);
    out.push_str(&text[byte_offset..]);
    out
}

/// Visible text of one block for the plain clipboard format.
fn block_plain_text(payload: &Payload) -> String {
    fn strip_inline(text: &str) -> String {
        let mut out = String::new();
        for node in crate::markup::parse(text) {
            out.push_str(&node.plain_text());
        }
        out
    }

    match payload {
        Payload::Paragraph { text } => strip_inline(text),
        Payload::Heading { text, .. } => strip_inline(text),
        Payload::List { items, .. } => items
            .iter()
            .map(|i| strip_inline(&i.text))
            .collect::<Vec<_>>()
            .join("\n"),
        Payload::Quote { text, caption } => {
            let mut out = strip_inline(text);
            if !caption.is_empty() {
                out.push_str("\n-- ");
                out.push_str(caption);
            }
            out
        }
        Payload::Code { source, .. } => source.clone(),
        Payload::Divider => "---".to_string(),
        Payload::Image { caption, url, .. } => {
            if caption.is_empty() {
                url.clone()
            } else {
                caption.clone()
            }
        }
        Payload::Table { rows, .. } => rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|c| strip_inline(c))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Payload::Embed { url, title, .. } => match title {
            Some(title) => format!("{title} ({url})"),
            None => url.clone(),
        },
        Payload::Custom { fields, .. } => fields.get("text").cloned().unwrap_or_default(),
    }
}
