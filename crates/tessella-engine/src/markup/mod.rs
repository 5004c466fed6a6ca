//! Canonical markup support: a minimal node tree, a recovery-oriented
//! parser, and a writer that re-escapes on the way out.
//!
//! The same machinery serves two very different inputs: untrusted pasted
//! markup (which continues into the sanitizer) and the engine's own
//! canonical documents (which go straight to classification). The parser
//! therefore never fails; the worst malformed input degrades to text.

pub mod cursor;
pub mod dom;
pub mod parser;
pub mod writer;

pub use dom::{Element, Node, is_block_tag, is_void};
pub use parser::parse;
pub use writer::{write_node_to_string, write_nodes};
