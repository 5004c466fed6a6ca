use std::collections::HashMap;

use crate::blocks::{Block, BlockData, BlockId, Registry};
use crate::serialize::{MarkupMode, blocks_from_markup, blocks_to_markup};

/// Direction for the sibling-swap move operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Outcome of a delete request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Block removed from the document.
    Removed,
    /// The sole remaining block was cleared instead of removed.
    ClearedLast,
    /// No block with that id exists.
    Missing,
}

/// Ordered sequence of blocks backed by an id-addressed arena.
///
/// `order` and `arena` always agree: every id in `order` resolves in
/// `arena` and vice versa. The document never becomes empty; the last
/// block is cleared, not removed. Every operation leaves a consistent,
/// renderable state before returning.
pub struct Document {
    pub(crate) order: Vec<BlockId>,
    pub(crate) arena: HashMap<BlockId, Block>,
    /// Incremented on each mutation (enables change detection).
    pub(crate) version: u64,
}

impl Document {
    /// A document holding one empty block of the registry's default type.
    pub fn new(registry: &Registry) -> Self {
        let block = Block::new(
            registry
                .get_or_default(registry.default_tag())
                .construct(&BlockData::default()),
        );
        Self::from_blocks(vec![block], registry)
    }

    /// Build from a block list; an empty list falls back to [`Document::new`].
    pub fn from_blocks(blocks: Vec<Block>, registry: &Registry) -> Self {
        if blocks.is_empty() {
            return Self::new(registry);
        }
        let order: Vec<BlockId> = blocks.iter().map(|b| b.id).collect();
        let arena: HashMap<BlockId, Block> = blocks.into_iter().map(|b| (b.id, b)).collect();
        Self {
            order,
            arena,
            version: 0,
        }
    }

    /// Load canonical markup (fresh ids).
    pub fn from_markup(markup: &str, registry: &Registry) -> Self {
        Self::from_blocks(
            blocks_from_markup(markup, registry, MarkupMode::External),
            registry,
        )
    }

    /// Restore internal snapshot markup (ids preserved).
    pub fn from_snapshot(markup: &str, registry: &Registry) -> Self {
        Self::from_blocks(
            blocks_from_markup(markup, registry, MarkupMode::Internal),
            registry,
        )
    }

    pub fn to_markup(&self, mode: MarkupMode) -> String {
        blocks_to_markup(self.iter(), mode)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// The invariant makes a document non-empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn block_ids(&self) -> &[BlockId] {
        &self.order
    }

    pub fn first_id(&self) -> BlockId {
        self.order[0]
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.arena.contains_key(&id)
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.arena.get(&id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.arena.get_mut(&id)
    }

    /// Index of a block in document order.
    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.order.iter().position(|&o| o == id)
    }

    pub fn id_at(&self, index: usize) -> Option<BlockId> {
        self.order.get(index).copied()
    }

    /// Blocks in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.order.iter().map(|id| &self.arena[id])
    }

    /// Insert a new block of `tag` after `after` (or at the end when
    /// `after` is absent or unknown). Returns the new block's id.
    pub fn insert_after(
        &mut self,
        registry: &Registry,
        tag: &str,
        after: Option<BlockId>,
        data: &BlockData,
    ) -> BlockId {
        let payload = registry.get_or_default(tag).construct(data);
        let block = Block::new(payload);
        let id = block.id;
        let index = after
            .and_then(|a| self.position(a))
            .map(|i| i + 1)
            .unwrap_or(self.order.len());
        self.order.insert(index, id);
        self.arena.insert(id, block);
        self.version += 1;
        id
    }

    /// Delete a block. The sole remaining block is cleared instead.
    pub fn delete(&mut self, id: BlockId) -> DeleteOutcome {
        if !self.contains(id) {
            return DeleteOutcome::Missing;
        }
        if self.order.len() == 1 {
            if let Some(block) = self.arena.get_mut(&id) {
                block.payload.clear();
            }
            self.version += 1;
            return DeleteOutcome::ClearedLast;
        }
        self.order.retain(|&o| o != id);
        self.arena.remove(&id);
        self.version += 1;
        DeleteOutcome::Removed
    }

    /// Delete several blocks at once (multi-selection removal), honoring
    /// the last-block guarantee: when the set covers the whole document,
    /// one block survives cleared.
    pub fn delete_many(&mut self, ids: &[BlockId]) {
        for &id in ids {
            self.delete(id);
        }
    }

    /// Swap a block with its adjacent sibling.
    pub fn move_block(&mut self, id: BlockId, direction: MoveDirection) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.order.len() => index + 1,
            _ => return false,
        };
        self.order.swap(index, target);
        self.version += 1;
        true
    }

    /// Change a block's type in place, delegating content carry-over to the
    /// source type's `reinterpret`. Caller-supplied data overlays whatever
    /// carried over. Returns false when the block does not exist.
    pub fn transform(
        &mut self,
        registry: &Registry,
        id: BlockId,
        new_tag: &str,
        extra: Option<&BlockData>,
    ) -> bool {
        let Some(block) = self.arena.get(&id) else {
            return false;
        };
        let old_tag = block.payload.type_tag().to_string();
        let carried = registry
            .get_or_default(&old_tag)
            .reinterpret(&block.payload, new_tag)
            .unwrap_or_default();
        let data = match extra {
            Some(extra) => carried.merged_with(extra),
            None => carried,
        };
        let new_payload = registry.get_or_default(new_tag).construct(&data);
        if let Some(block) = self.arena.get_mut(&id) {
            block.payload = new_payload;
        }
        self.version += 1;
        true
    }

    /// Apply a partial data update through the block's registered type.
    pub fn update_block(&mut self, registry: &Registry, id: BlockId, data: &BlockData) -> bool {
        let Some(block) = self.arena.get_mut(&id) else {
            return false;
        };
        let tag = block.payload.type_tag().to_string();
        registry.get_or_default(&tag).update(&mut block.payload, data);
        self.version += 1;
        true
    }

    /// Clone a block's content under a fresh id, inserted right after the
    /// source. Ids are never reused, so the copy gets a new identity.
    pub fn duplicate(&mut self, id: BlockId) -> Option<BlockId> {
        let index = self.position(id)?;
        let payload = self.arena.get(&id)?.payload.clone();
        let copy = Block::new(payload);
        let copy_id = copy.id;
        self.order.insert(index + 1, copy_id);
        self.arena.insert(copy_id, copy);
        self.version += 1;
        Some(copy_id)
    }

    /// Backspace-at-block-start: append this block's primary text to the
    /// previous block and delete it. Returns the surviving block's id and
    /// the character offset of the join point (the caret target). Blocks
    /// without a text region (or a first block) do not merge.
    pub fn merge_into_previous(&mut self, id: BlockId) -> Option<(BlockId, usize)> {
        let index = self.position(id)?;
        if index == 0 {
            return None;
        }
        let prev_id = self.order[index - 1];
        let current_text = self.arena.get(&id)?.payload.primary_text()?.to_string();
        let prev = self.arena.get_mut(&prev_id)?;
        let prev_text = prev.payload.primary_text()?.to_string();
        let join_offset = prev_text.chars().count();
        prev.payload
            .set_primary_text(&format!("{prev_text}{current_text}"));

        self.order.retain(|&o| o != id);
        self.arena.remove(&id);
        self.version += 1;
        Some((prev_id, join_offset))
    }

    /// Move a group of blocks, in their current relative order, to sit
    /// immediately before `before` (or at the end). Contiguity policy is
    /// the drag engine's job; this is the raw atomic move.
    pub fn move_group(&mut self, ids: &[BlockId], before: Option<BlockId>) {
        let moving: Vec<BlockId> = self
            .order
            .iter()
            .copied()
            .filter(|id| ids.contains(id))
            .collect();
        if moving.is_empty() {
            return;
        }
        self.order.retain(|id| !ids.contains(id));
        let index = before
            .and_then(|b| self.position(b))
            .unwrap_or(self.order.len());
        for (offset, id) in moving.into_iter().enumerate() {
            self.order.insert(index + offset, id);
        }
        self.version += 1;
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // Order, identity and content; version is bookkeeping.
        self.order == other.order
            && self.order.iter().all(|id| self.arena[id] == other.arena[id])
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("blocks", &self.len())
            .field("version", &self.version)
            .finish()
    }
}
