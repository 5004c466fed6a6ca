use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blocks::payload::{ListItem, ListKind};

/// Type-agnostic block data used on both sides of the registry contract.
///
/// `construct` consumes it as initial data (absent fields default),
/// `extract` produces it, and `update` treats it as a partial patch (only
/// present fields are applied). Keeping one shape for all three keeps
/// externally registered types on the same footing as built-ins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    pub text: Option<String>,
    pub level: Option<u8>,
    pub list_kind: Option<ListKind>,
    pub items: Option<Vec<ListItem>>,
    pub language: Option<String>,
    pub url: Option<String>,
    pub caption: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub header: Option<bool>,
    pub rows: Option<Vec<Vec<String>>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Opaque fields for externally registered types.
    pub fields: BTreeMap<String, String>,
}

impl BlockData {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    pub fn list_kind(mut self, kind: ListKind) -> Self {
        self.list_kind = Some(kind);
        self
    }

    pub fn items(mut self, items: Vec<ListItem>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Merge another data record over this one. Present fields in `over`
    /// win; absent fields keep the receiver's value. Used by `transform` to
    /// layer caller-supplied data over reinterpreted carry-over data.
    pub fn merged_with(mut self, over: &BlockData) -> Self {
        if over.text.is_some() {
            self.text = over.text.clone();
        }
        if over.level.is_some() {
            self.level = over.level;
        }
        if over.list_kind.is_some() {
            self.list_kind = over.list_kind;
        }
        if over.items.is_some() {
            self.items = over.items.clone();
        }
        if over.language.is_some() {
            self.language = over.language.clone();
        }
        if over.url.is_some() {
            self.url = over.url.clone();
        }
        if over.caption.is_some() {
            self.caption = over.caption.clone();
        }
        if over.width.is_some() {
            self.width = over.width;
        }
        if over.height.is_some() {
            self.height = over.height;
        }
        if over.header.is_some() {
            self.header = over.header;
        }
        if over.rows.is_some() {
            self.rows = over.rows.clone();
        }
        if over.title.is_some() {
            self.title = over.title.clone();
        }
        if over.description.is_some() {
            self.description = over.description.clone();
        }
        if over.image.is_some() {
            self.image = over.image.clone();
        }
        for (k, v) in &over.fields {
            self.fields.insert(k.clone(), v.clone());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_present_fields_of_overlay() {
        let base = BlockData::with_text("old").level(1);
        let over = BlockData::with_text("new");
        let merged = base.merged_with(&over);
        assert_eq!(merged.text.as_deref(), Some("new"));
        assert_eq!(merged.level, Some(1));
    }

    #[test]
    fn merge_unions_custom_fields() {
        let mut base = BlockData::default();
        base.fields.insert("a".into(), "1".into());
        let mut over = BlockData::default();
        over.fields.insert("b".into(), "2".into());
        let merged = base.merged_with(&over);
        assert_eq!(merged.fields.len(), 2);
    }
}
