pub mod blocks;
pub mod editing;
pub mod markup;
pub mod media;
pub mod options;
pub mod sanitize;
pub mod serialize;
pub mod surface;

// Re-export key types for easier usage
pub use blocks::{
    Block, BlockData, BlockId, BlockType, ListItem, ListKind, Payload, Registry, RegistryError,
};
pub use editing::{
    AutoScroll, Caret, ClipboardPayload, DeleteOutcome, Document, Editor, LayoutRect,
    MoveDirection, SelectionSet, Viewport,
};
pub use media::{ImageStore, LinkPreview, PreviewFetcher, UploadError, UploadRequest, UploadedImage};
pub use options::EngineOptions;
pub use sanitize::SanitizePolicy;
pub use serialize::MarkupMode;
pub use surface::{EditSurface, MemorySurface};
