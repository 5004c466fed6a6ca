use std::collections::HashMap;

use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;

/// The four-operation contract every block type supplies.
///
/// Built-in kinds and externally registered kinds implement the same trait;
/// once registered, the engine cannot tell them apart.
pub trait BlockType: std::fmt::Debug {
    /// Registry tag, e.g. `"paragraph"`.
    fn tag(&self) -> &str;

    /// Build a payload from initial data. Never fails: absent fields fall
    /// back to defaults.
    fn construct(&self, data: &BlockData) -> Payload;

    /// Pull the block's data back out, free of host decoration.
    fn extract(&self, payload: &Payload) -> BlockData;

    /// Apply a partial update in place. Only present fields of `data` are
    /// applied.
    fn update(&self, payload: &mut Payload, data: &BlockData);

    /// Produce carry-over data for converting this payload into `into_tag`.
    /// `None` means no meaningful carry-over exists; the caller then
    /// constructs the target type from scratch.
    fn reinterpret(&self, payload: &Payload, into_tag: &str) -> Option<BlockData> {
        let _ = into_tag;
        // Default carry-over: the primary text region survives.
        payload.primary_text().map(BlockData::with_text)
    }
}

/// Caller-visible registry failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("block type not registered: {0}")]
    NotRegistered(String),
}

/// Per-engine table mapping type tags to behavior.
///
/// Deliberately an instance, not a process-wide singleton, so independent
/// editors can carry different type tables without corrupting each other.
pub struct Registry {
    types: HashMap<String, Box<dyn BlockType>>,
    default_tag: String,
}

impl Registry {
    /// An empty registry with the given fallback tag. Mostly useful for
    /// tests; real engines start from [`Registry::with_builtins`].
    pub fn empty(default_tag: impl Into<String>) -> Self {
        Self {
            types: HashMap::new(),
            default_tag: default_tag.into(),
        }
    }

    /// Registry pre-populated with every built-in kind; `paragraph` is the
    /// fallback type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty(crate::blocks::kinds::DEFAULT_TAG);
        crate::blocks::kinds::register_builtins(&mut registry);
        registry
    }

    /// Register a block type. A later registration under the same tag
    /// replaces the earlier one.
    pub fn register(&mut self, block_type: Box<dyn BlockType>) {
        self.types.insert(block_type.tag().to_string(), block_type);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }

    /// Look up a type, surfacing `NotRegistered` to the caller.
    pub fn get(&self, tag: &str) -> Result<&dyn BlockType, RegistryError> {
        self.types
            .get(tag)
            .map(|b| b.as_ref())
            .ok_or_else(|| RegistryError::NotRegistered(tag.to_string()))
    }

    /// Look up a type, falling back to the default type when the tag is
    /// unknown. The miss is logged, never thrown; construction itself can
    /// then proceed unconditionally.
    pub fn get_or_default(&self, tag: &str) -> &dyn BlockType {
        match self.get(tag) {
            Ok(block_type) => block_type,
            Err(RegistryError::NotRegistered(_)) => {
                log::warn!(
                    "block type {tag:?} not registered, falling back to {:?}",
                    self.default_tag
                );
                self.types
                    .get(&self.default_tag)
                    .map(|b| b.as_ref())
                    .expect("registry default type must be registered")
            }
        }
    }

    /// All registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.types.keys().map(|k| k.as_str()).collect();
        tags.sort_unstable();
        tags
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("tags", &self.tags())
            .field("default_tag", &self.default_tag)
            .finish()
    }
}
