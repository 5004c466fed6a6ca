/*!
 * # Editing Core Module
 *
 * The live editing model: an ordered, id-addressed block arena with
 * selection tracking, snapshot history, and drag reordering layered on
 * top.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: the block arena
 * - The entire document lives in [`Document`]: an ordered `Vec<BlockId>`
 *   plus a `HashMap` arena of block records
 * - Blocks are addressed by stable [`BlockId`]s: no subtree search, and
 *   the rendering surface only ever holds a non-owning id per widget
 * - Ids survive every structural mutation and are never reused
 *
 * ### 2. Registry-Driven Block Behavior
 * - Every mutation of block *content* flows through the four-operation
 *   registry contract (construct / extract / update / reinterpret)
 * - Externally registered types take the same path as built-ins
 *
 * ### 3. Snapshot History
 * - [`HistoryStack`] holds bounded undo/redo rings of full-document
 *   snapshots with their captured cursor and selection
 * - Structural operations snapshot immediately, character edits debounce
 *   through a single-slot deadline pumped by the host
 *
 * ### 4. Selection Independent of the Surface
 * - [`Caret`] addresses a block id plus character offset, so captured
 *   positions survive wholesale widget replacement during undo/redo
 * - Multi-block selection is an explicit [`SelectionSet`], disjoint from
 *   the caret
 *
 * ### 5. Drag Reordering
 * - [`DragSession`] owns the transient gesture state; the placeholder is
 *   never a document block, so it can never leak into history
 *
 * [`BlockId`]: crate::blocks::BlockId
 */

pub mod document;
pub mod dragdrop;
pub mod editor;
pub mod history;
pub mod selection;

pub use document::{DeleteOutcome, Document, MoveDirection};
pub use dragdrop::{AutoScroll, DragSession, DropSlot, LayoutRect, Viewport};
pub use editor::{ClipboardPayload, Editor};
pub use history::{DebounceSlot, HistoryEntry, HistoryStack};
pub use selection::{Caret, SelectionSet, capture_caret, restore_caret};
