use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;
use crate::blocks::registry::BlockType;

/// Plain text paragraph, the default block type.
#[derive(Debug)]
pub struct Paragraph;

impl BlockType for Paragraph {
    fn tag(&self) -> &str {
        "paragraph"
    }

    fn construct(&self, data: &BlockData) -> Payload {
        Payload::Paragraph {
            text: data.text.clone().unwrap_or_default(),
        }
    }

    fn extract(&self, payload: &Payload) -> BlockData {
        match payload {
            Payload::Paragraph { text } => BlockData::with_text(text.clone()),
            _ => BlockData::default(),
        }
    }

    fn update(&self, payload: &mut Payload, data: &BlockData) {
        if let (Payload::Paragraph { text }, Some(new_text)) = (payload, &data.text) {
            *text = new_text.clone();
        }
    }
}
