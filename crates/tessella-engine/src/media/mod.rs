//! Injected external collaborators: image upload and link preview.
//!
//! The engine is agnostic to the backing store and the fetch transport;
//! hosts implement these traits however they like (including adapting
//! their own async machinery at the boundary; the engine itself stays
//! synchronous and single-threaded).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A file handed to the upload collaborator.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Result of a successful upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size: u64,
}

/// Typed upload failures. The engine never retries; retry policy belongs
/// to the host.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload collaborator is not configured")]
    NotConfigured,
    #[error("file exceeds the size limit ({size} > {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("unsupported file type: {mime_type}")]
    WrongType { mime_type: String },
    #[error("network failure: {0}")]
    Network(String),
}

/// Upload collaborator contract. `progress` receives 0..=100 as the host
/// sees fit; implementations may never call it.
pub trait ImageStore {
    fn upload(
        &self,
        request: &UploadRequest,
        progress: &mut dyn FnMut(u8),
    ) -> Result<UploadedImage, UploadError>;
}

/// Preview metadata for a link. All fields optional; an all-`None` preview
/// still renders as a plain link.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPreview {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Link-preview collaborator contract. A `None` result (failure included)
/// degrades to a plain link; it is never surfaced as an error.
pub trait PreviewFetcher {
    fn fetch(&self, url: &str) -> Option<LinkPreview>;
}

/// Build embed block data for a URL, degrading gracefully when the
/// fetcher is absent or returns nothing.
pub fn embed_data_for(url: &str, fetcher: Option<&dyn PreviewFetcher>) -> crate::blocks::BlockData {
    let preview = fetcher.and_then(|f| f.fetch(url)).unwrap_or_default();
    let mut data = crate::blocks::BlockData::default().url(url.to_string());
    data.title = preview.title;
    data.description = preview.description;
    data.image = preview.image;
    data
}
