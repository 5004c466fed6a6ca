use crate::blocks::data::BlockData;
use crate::blocks::payload::{ListItem, ListKind, Payload};
use crate::blocks::registry::BlockType;

/// Bullet, ordered, or checklist block. Items are flat; nesting is a
/// rendering concern the engine does not model.
#[derive(Debug)]
pub struct List;

impl BlockType for List {
    fn tag(&self) -> &str {
        "list"
    }

    fn construct(&self, data: &BlockData) -> Payload {
        let items = match (&data.items, &data.text) {
            (Some(items), _) if !items.is_empty() => items.clone(),
            (_, Some(text)) if !text.is_empty() => vec![ListItem::new(text.clone())],
            _ => vec![ListItem::default()],
        };
        Payload::List {
            kind: data.list_kind.unwrap_or(ListKind::Bullet),
            items,
        }
    }

    fn extract(&self, payload: &Payload) -> BlockData {
        match payload {
            Payload::List { kind, items } => {
                BlockData::default().list_kind(*kind).items(items.clone())
            }
            _ => BlockData::default(),
        }
    }

    fn update(&self, payload: &mut Payload, data: &BlockData) {
        if let Payload::List { kind, items } = payload {
            if let Some(new_kind) = data.list_kind {
                *kind = new_kind;
                if new_kind != ListKind::Checklist {
                    for item in items.iter_mut() {
                        item.checked = false;
                    }
                }
            }
            if let Some(new_items) = &data.items {
                *items = new_items.clone();
            } else if let Some(text) = &data.text {
                // Text-only patch edits the primary region (first item).
                match items.first_mut() {
                    Some(first) => first.text = text.clone(),
                    None => items.push(ListItem::new(text.clone())),
                }
            }
        }
    }

    fn reinterpret(&self, payload: &Payload, into_tag: &str) -> Option<BlockData> {
        let Payload::List { kind, items } = payload else {
            return None;
        };
        if into_tag == "list" {
            return Some(BlockData::default().list_kind(*kind).items(items.clone()));
        }
        // A list collapsing into a text block keeps its sole remaining
        // item's text; multi-item lists join items with line breaks.
        let joined = items
            .iter()
            .map(|i| i.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("<br>");
        Some(BlockData::with_text(joined))
    }
}
