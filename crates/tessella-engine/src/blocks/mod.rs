//! Block model: stable ids, type-specific payloads, and the per-engine
//! registry implementing the four-operation contract
//! (construct / extract / update / reinterpret).

pub mod data;
pub mod kinds;
pub mod payload;
pub mod registry;

pub use data::BlockData;
pub use payload::{Block, BlockId, ListItem, ListKind, Payload};
pub use registry::{BlockType, Registry, RegistryError};
