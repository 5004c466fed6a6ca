use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;
use crate::blocks::registry::BlockType;

/// Block quote with an optional attribution caption.
#[derive(Debug)]
pub struct Quote;

impl BlockType for Quote {
    fn tag(&self) -> &str {
        "quote"
    }

    fn construct(&self, data: &BlockData) -> Payload {
        Payload::Quote {
            text: data.text.clone().unwrap_or_default(),
            caption: data.caption.clone().unwrap_or_default(),
        }
    }

    fn extract(&self, payload: &Payload) -> BlockData {
        match payload {
            Payload::Quote { text, caption } => {
                BlockData::with_text(text.clone()).caption(caption.clone())
            }
            _ => BlockData::default(),
        }
    }

    fn update(&self, payload: &mut Payload, data: &BlockData) {
        if let Payload::Quote { text, caption } = payload {
            if let Some(new_text) = &data.text {
                *text = new_text.clone();
            }
            if let Some(new_caption) = &data.caption {
                *caption = new_caption.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_survives_extract() {
        let payload = Quote.construct(&BlockData::with_text("words").caption("author"));
        let data = Quote.extract(&payload);
        assert_eq!(data.caption.as_deref(), Some("author"));
    }
}
