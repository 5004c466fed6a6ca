use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;
use crate::blocks::registry::BlockType;

/// Link-preview card. When the preview fetcher returns nothing the block
/// still renders as a plain link, so a failed fetch never surfaces an error.
#[derive(Debug)]
pub struct Embed;

impl BlockType for Embed {
    fn tag(&self) -> &str {
        "embed"
    }

    fn construct(&self, data: &BlockData) -> Payload {
        Payload::Embed {
            url: data.url.clone().unwrap_or_default(),
            title: data.title.clone().filter(|t| !t.is_empty()),
            description: data.description.clone().filter(|d| !d.is_empty()),
            image: data.image.clone().filter(|i| !i.is_empty()),
        }
    }

    fn extract(&self, payload: &Payload) -> BlockData {
        match payload {
            Payload::Embed {
                url,
                title,
                description,
                image,
            } => {
                let mut data = BlockData::default().url(url.clone());
                data.title = title.clone();
                data.description = description.clone();
                data.image = image.clone();
                data
            }
            _ => BlockData::default(),
        }
    }

    fn update(&self, payload: &mut Payload, data: &BlockData) {
        if let Payload::Embed {
            url,
            title,
            description,
            image,
        } = payload
        {
            if let Some(new_url) = &data.url {
                *url = new_url.clone();
            }
            if data.title.is_some() {
                *title = data.title.clone().filter(|t| !t.is_empty());
            }
            if data.description.is_some() {
                *description = data.description.clone().filter(|d| !d.is_empty());
            }
            if data.image.is_some() {
                *image = data.image.clone().filter(|i| !i.is_empty());
            }
        }
    }

    fn reinterpret(&self, payload: &Payload, _into_tag: &str) -> Option<BlockData> {
        match payload {
            Payload::Embed { url, title, .. } => Some(BlockData::with_text(
                title.clone().unwrap_or_else(|| url.clone()),
            )),
            _ => None,
        }
    }
}
