use serde::{Deserialize, Serialize};

use crate::blocks::BlockId;
use crate::editing::document::Document;
use crate::surface::EditSurface;

/// Caret position addressed by block identity and character offset.
///
/// Lives independently of the host's native selection primitive so it can
/// sit inside a history entry and still be restored after the underlying
/// widgets were wholesale-replaced by an undo/redo swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caret {
    pub block: BlockId,
    /// Character count into the block's primary editable region.
    pub offset: usize,
    pub collapsed: bool,
}

/// Explicit multi-block selection, disjoint in meaning from the caret: a
/// document has an active caret or an active multi-selection, never a
/// meaningful combination of both.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: Vec<BlockId>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Add or remove one block (modifier-click gesture).
    pub fn toggle(&mut self, id: BlockId) {
        match self.ids.iter().position(|&s| s == id) {
            Some(index) => {
                self.ids.remove(index);
            }
            None => self.ids.push(id),
        }
    }

    /// Select the document-order span between two blocks, inclusive.
    pub fn select_range(&mut self, doc: &Document, anchor: BlockId, focus: BlockId) {
        let (Some(a), Some(b)) = (doc.position(anchor), doc.position(focus)) else {
            return;
        };
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        self.ids = doc.block_ids()[start..=end].to_vec();
    }

    pub fn select_all(&mut self, doc: &Document) {
        self.ids = doc.block_ids().to_vec();
    }

    /// Drop selected ids that no longer exist (after an undo swap).
    pub fn retain_existing(&mut self, doc: &Document) {
        self.ids.retain(|&id| doc.contains(id));
    }

    /// Selected ids reordered to match current document order, not
    /// selection order. Drag move-sets and serialization both need this.
    pub fn in_document_order(&self, doc: &Document) -> Vec<BlockId> {
        doc.block_ids()
            .iter()
            .copied()
            .filter(|id| self.contains(*id))
            .collect()
    }

    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }
}

impl From<Vec<BlockId>> for SelectionSet {
    fn from(ids: Vec<BlockId>) -> Self {
        Self { ids }
    }
}

/// Read the surface's active caret and resolve it against the document.
///
/// Returns `None` when the native anchor is outside any known block. The
/// offset is clamped to the block's current character length, so a stale
/// surface reading can never produce an out-of-range caret.
pub fn capture_caret(surface: &dyn EditSurface, doc: &Document) -> Option<Caret> {
    let (block, offset, collapsed) = surface.active_caret()?;
    let block_ref = doc.get(block)?;
    Some(Caret {
        block,
        offset: offset.min(block_ref.payload.char_len()),
        collapsed,
    })
}

/// Put a captured caret back onto the surface.
///
/// When the target block no longer exists (deleted by an intervening
/// history swap), falls back to focusing the first available editable
/// block rather than surfacing an error.
pub fn restore_caret(surface: &mut dyn EditSurface, doc: &Document, caret: Caret) {
    match doc.get(caret.block) {
        Some(block) => {
            let clamped = caret.offset.min(block.payload.char_len());
            surface.set_caret(caret.block, clamped);
        }
        None => {
            log::debug!(
                "caret target {} missing after swap, focusing first block",
                caret.block
            );
            surface.set_caret(doc.first_id(), 0);
        }
    }
}
