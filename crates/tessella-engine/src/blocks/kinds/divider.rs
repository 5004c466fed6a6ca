use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;
use crate::blocks::registry::BlockType;

/// Horizontal rule. Carries no content and no editable region.
#[derive(Debug)]
pub struct Divider;

impl BlockType for Divider {
    fn tag(&self) -> &str {
        "divider"
    }

    fn construct(&self, _data: &BlockData) -> Payload {
        Payload::Divider
    }

    fn extract(&self, _payload: &Payload) -> BlockData {
        BlockData::default()
    }

    fn update(&self, _payload: &mut Payload, _data: &BlockData) {}

    fn reinterpret(&self, _payload: &Payload, _into_tag: &str) -> Option<BlockData> {
        // Nothing meaningful carries over from a rule.
        None
    }
}
