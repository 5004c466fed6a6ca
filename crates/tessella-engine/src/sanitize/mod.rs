//! Paste sanitization pipeline.
//!
//! Untrusted external markup is reduced to a whitelisted vocabulary before
//! it can touch the document: an artifact pre-pass scrubs office/export
//! residue, the depth-bounded structural walk renames, unwraps and drops
//! elements, and attribute/style filters remove handlers and executable
//! schemes. Plain-text input takes its own path into paragraphs.

pub mod clean;
pub mod plaintext;
pub mod policy;

pub use clean::{sanitize, sanitize_to_string};
pub use plaintext::plain_to_nodes;
pub use policy::SanitizePolicy;
