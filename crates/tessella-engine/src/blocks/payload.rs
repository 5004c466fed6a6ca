use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a block that survives structural edits.
///
/// Ids are minted once (v4) and never reused for the lifetime of a document.
/// Re-importing exported markup always mints fresh ids, so identities from a
/// previous session can never collide with live ones.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its serialized form (internal snapshots only).
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One content block: stable identity plus type-specific payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub payload: Payload,
}

impl Block {
    pub fn new(payload: Payload) -> Self {
        Self {
            id: BlockId::new(),
            payload,
        }
    }
}

/// Marker kinds for list blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    Bullet,
    Ordered,
    Checklist,
}

/// A single item of a list block. `checked` is only meaningful for
/// checklists and stays `false` elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct ListItem {
    pub text: String,
    pub checked: bool,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked: false,
        }
    }
}

/// Type-specific block content.
///
/// Text-bearing fields hold *canonical inline markup* (already sanitized),
/// not raw user input; the serializer re-parses them when writing so entity
/// escaping stays correct.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Paragraph {
        text: String,
    },
    Heading {
        level: u8,
        text: String,
    },
    List {
        kind: ListKind,
        items: Vec<ListItem>,
    },
    Quote {
        text: String,
        caption: String,
    },
    Code {
        language: Option<String>,
        source: String,
    },
    Divider,
    Image {
        url: String,
        caption: String,
        width: Option<u32>,
        height: Option<u32>,
    },
    Table {
        header: bool,
        rows: Vec<Vec<String>>,
    },
    /// Link-preview card. Degrades to a plain link when no preview data
    /// could be fetched.
    Embed {
        url: String,
        title: Option<String>,
        description: Option<String>,
        image: Option<String>,
    },
    /// Externally registered block type. The engine stores its data
    /// opaquely as string fields.
    Custom {
        tag: String,
        fields: BTreeMap<String, String>,
    },
}

impl Payload {
    /// Registry tag of this payload.
    pub fn type_tag(&self) -> &str {
        match self {
            Payload::Paragraph { .. } => "paragraph",
            Payload::Heading { .. } => "heading",
            Payload::List { .. } => "list",
            Payload::Quote { .. } => "quote",
            Payload::Code { .. } => "code",
            Payload::Divider => "divider",
            Payload::Image { .. } => "image",
            Payload::Table { .. } => "table",
            Payload::Embed { .. } => "embed",
            Payload::Custom { tag, .. } => tag,
        }
    }

    /// The block's primary editable text region. Caret offsets address this
    /// region. Blocks without an editable region (divider, image) return
    /// `None` and pin the caret to offset 0.
    pub fn primary_text(&self) -> Option<&str> {
        match self {
            Payload::Paragraph { text } => Some(text),
            Payload::Heading { text, .. } => Some(text),
            Payload::List { items, .. } => items.first().map(|i| i.text.as_str()),
            Payload::Quote { text, .. } => Some(text),
            Payload::Code { source, .. } => Some(source),
            Payload::Embed { url, title, .. } => Some(title.as_deref().unwrap_or(url)),
            Payload::Table { rows, .. } => rows.first().and_then(|r| r.first()).map(|c| c.as_str()),
            Payload::Custom { fields, .. } => fields.get("text").map(|t| t.as_str()),
            Payload::Divider | Payload::Image { .. } => None,
        }
    }

    /// Replace the primary editable text region, where one exists.
    pub fn set_primary_text(&mut self, new_text: &str) {
        match self {
            Payload::Paragraph { text } => *text = new_text.to_string(),
            Payload::Heading { text, .. } => *text = new_text.to_string(),
            Payload::List { items, .. } => {
                if let Some(first) = items.first_mut() {
                    first.text = new_text.to_string();
                } else {
                    items.push(ListItem::new(new_text));
                }
            }
            Payload::Quote { text, .. } => *text = new_text.to_string(),
            Payload::Code { source, .. } => *source = new_text.to_string(),
            Payload::Embed { title, .. } => *title = Some(new_text.to_string()),
            Payload::Table { rows, .. } => {
                if let Some(cell) = rows.first_mut().and_then(|r| r.first_mut()) {
                    *cell = new_text.to_string();
                }
            }
            Payload::Custom { fields, .. } => {
                fields.insert("text".to_string(), new_text.to_string());
            }
            Payload::Divider | Payload::Image { .. } => {}
        }
    }

    /// Character length of the primary editable region (caret clamp bound).
    pub fn char_len(&self) -> usize {
        self.primary_text().map_or(0, |t| t.chars().count())
    }

    /// True when the block carries no visible content.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Paragraph { text } => text.trim().is_empty(),
            Payload::Heading { text, .. } => text.trim().is_empty(),
            Payload::List { items, .. } => items.iter().all(|i| i.text.trim().is_empty()),
            Payload::Quote { text, caption } => {
                text.trim().is_empty() && caption.trim().is_empty()
            }
            Payload::Code { source, .. } => source.trim().is_empty(),
            Payload::Divider => false,
            Payload::Image { url, .. } => url.is_empty(),
            Payload::Table { rows, .. } => rows
                .iter()
                .all(|r| r.iter().all(|c| c.trim().is_empty())),
            Payload::Embed { url, .. } => url.is_empty(),
            Payload::Custom { fields, .. } => fields.values().all(|v| v.trim().is_empty()),
        }
    }

    /// Empty the block's content in place, keeping its type. Used for the
    /// last-block guarantee: the sole remaining block is cleared, never
    /// removed.
    pub fn clear(&mut self) {
        match self {
            Payload::Paragraph { text } => text.clear(),
            Payload::Heading { text, .. } => text.clear(),
            Payload::List { items, .. } => {
                *items = vec![ListItem::default()];
            }
            Payload::Quote { text, caption } => {
                text.clear();
                caption.clear();
            }
            Payload::Code { source, .. } => source.clear(),
            Payload::Divider => {}
            Payload::Image { url, caption, width, height } => {
                url.clear();
                caption.clear();
                *width = None;
                *height = None;
            }
            Payload::Table { rows, .. } => {
                for row in rows.iter_mut() {
                    for cell in row.iter_mut() {
                        cell.clear();
                    }
                }
            }
            Payload::Embed { url, title, description, image } => {
                url.clear();
                *title = None;
                *description = None;
                *image = None;
            }
            Payload::Custom { fields, .. } => fields.clear(),
        }
    }
}
