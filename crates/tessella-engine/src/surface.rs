use std::collections::HashMap;

use crate::blocks::BlockId;

/// Narrow contract over the host's rendering surface.
///
/// The engine assumes nothing about the rendering technology beyond this:
/// a tree of editable-text widgets it can read and write synchronously.
/// Caret offsets are character counts into a block's primary editable
/// region. Keeping the surface behind this seam is what makes the core
/// testable without a real renderer.
pub trait EditSurface {
    /// Current text of a block's editable region, if the surface knows the
    /// block.
    fn block_text(&self, id: BlockId) -> Option<String>;

    /// Write a block's editable region.
    fn set_block_text(&mut self, id: BlockId, text: &str);

    /// The active caret as `(block, character offset, collapsed)`, or
    /// `None` when the native anchor sits outside any block.
    fn active_caret(&self) -> Option<(BlockId, usize, bool)>;

    /// Place the caret. Offsets beyond the block's length are clamped by
    /// the caller, not the surface.
    fn set_caret(&mut self, id: BlockId, offset: usize);

    /// Drop a block's widget (after deletion).
    fn remove_block(&mut self, id: BlockId);
}

/// In-memory surface for headless hosts and tests.
#[derive(Default)]
pub struct MemorySurface {
    texts: HashMap<BlockId, String>,
    caret: Option<(BlockId, usize, bool)>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user placing a (possibly non-collapsed) native
    /// selection anchor.
    pub fn place_caret(&mut self, id: BlockId, offset: usize, collapsed: bool) {
        self.caret = Some((id, offset, collapsed));
    }

    /// Simulate a native anchor outside the document.
    pub fn blur(&mut self) {
        self.caret = None;
    }

    pub fn caret(&self) -> Option<(BlockId, usize, bool)> {
        self.caret
    }
}

impl EditSurface for MemorySurface {
    fn block_text(&self, id: BlockId) -> Option<String> {
        self.texts.get(&id).cloned()
    }

    fn set_block_text(&mut self, id: BlockId, text: &str) {
        self.texts.insert(id, text.to_string());
    }

    fn active_caret(&self) -> Option<(BlockId, usize, bool)> {
        self.caret
    }

    fn set_caret(&mut self, id: BlockId, offset: usize) {
        self.caret = Some((id, offset, true));
    }

    fn remove_block(&mut self, id: BlockId) {
        self.texts.remove(&id);
        if matches!(self.caret, Some((caret_id, _, _)) if caret_id == id) {
            self.caret = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_a_block_clears_its_caret() {
        let mut surface = MemorySurface::new();
        let id = BlockId::new();
        surface.set_block_text(id, "x");
        surface.place_caret(id, 1, true);
        surface.remove_block(id);
        assert_eq!(surface.active_caret(), None);
        assert_eq!(surface.block_text(id), None);
    }
}
