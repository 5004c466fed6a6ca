use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;
use crate::blocks::registry::BlockType;

/// Remote image reference with optional caption and intrinsic size. The
/// engine stores the reference only; fetching and uploading live behind the
/// injected media collaborators.
#[derive(Debug)]
pub struct Image;

impl BlockType for Image {
    fn tag(&self) -> &str {
        "image"
    }

    fn construct(&self, data: &BlockData) -> Payload {
        Payload::Image {
            url: data.url.clone().unwrap_or_default(),
            caption: data.caption.clone().unwrap_or_default(),
            width: data.width,
            height: data.height,
        }
    }

    fn extract(&self, payload: &Payload) -> BlockData {
        match payload {
            Payload::Image {
                url,
                caption,
                width,
                height,
            } => {
                let mut data = BlockData::default().url(url.clone()).caption(caption.clone());
                data.width = *width;
                data.height = *height;
                data
            }
            _ => BlockData::default(),
        }
    }

    fn update(&self, payload: &mut Payload, data: &BlockData) {
        if let Payload::Image {
            url,
            caption,
            width,
            height,
        } = payload
        {
            if let Some(new_url) = &data.url {
                *url = new_url.clone();
            }
            if let Some(new_caption) = &data.caption {
                *caption = new_caption.clone();
            }
            if data.width.is_some() {
                *width = data.width;
            }
            if data.height.is_some() {
                *height = data.height;
            }
        }
    }

    fn reinterpret(&self, payload: &Payload, _into_tag: &str) -> Option<BlockData> {
        // The caption is the only text worth carrying into a text block.
        match payload {
            Payload::Image { caption, .. } if !caption.is_empty() => {
                Some(BlockData::with_text(caption.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_carries_into_text_blocks() {
        let payload = Image.construct(&BlockData::default().url("u").caption("cap"));
        let carried = Image.reinterpret(&payload, "paragraph").unwrap();
        assert_eq!(carried.text.as_deref(), Some("cap"));
    }

    #[test]
    fn captionless_image_has_no_carry_over() {
        let payload = Image.construct(&BlockData::default().url("u"));
        assert!(Image.reinterpret(&payload, "paragraph").is_none());
    }
}
