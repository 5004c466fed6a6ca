use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;
use crate::blocks::registry::BlockType;

/// Section heading, levels 1 through 6.
#[derive(Debug)]
pub struct Heading;

impl Heading {
    /// Levels outside 1..=6 are clamped, never rejected.
    fn clamp_level(level: u8) -> u8 {
        level.clamp(1, 6)
    }
}

impl BlockType for Heading {
    fn tag(&self) -> &str {
        "heading"
    }

    fn construct(&self, data: &BlockData) -> Payload {
        Payload::Heading {
            level: Self::clamp_level(data.level.unwrap_or(2)),
            text: data.text.clone().unwrap_or_default(),
        }
    }

    fn extract(&self, payload: &Payload) -> BlockData {
        match payload {
            Payload::Heading { level, text } => BlockData::with_text(text.clone()).level(*level),
            _ => BlockData::default(),
        }
    }

    fn update(&self, payload: &mut Payload, data: &BlockData) {
        if let Payload::Heading { level, text } = payload {
            if let Some(new_text) = &data.text {
                *text = new_text.clone();
            }
            if let Some(new_level) = data.level {
                *level = Self::clamp_level(new_level);
            }
        }
    }

    fn reinterpret(&self, payload: &Payload, into_tag: &str) -> Option<BlockData> {
        match payload {
            // Heading -> heading keeps the level so only the text moves.
            Payload::Heading { level, text } if into_tag == "heading" => {
                Some(BlockData::with_text(text.clone()).level(*level))
            }
            _ => payload.primary_text().map(BlockData::with_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_two() {
        let payload = Heading.construct(&BlockData::with_text("t"));
        assert_eq!(
            payload,
            Payload::Heading {
                level: 2,
                text: "t".to_string()
            }
        );
    }

    #[test]
    fn out_of_range_levels_are_clamped() {
        let payload = Heading.construct(&BlockData::default().level(9));
        match payload {
            Payload::Heading { level, .. } => assert_eq!(level, 6),
            _ => panic!("expected heading"),
        }
        let payload = Heading.construct(&BlockData::default().level(0));
        match payload {
            Payload::Heading { level, .. } => assert_eq!(level, 1),
            _ => panic!("expected heading"),
        }
    }

    #[test]
    fn update_can_change_level_alone() {
        let mut payload = Heading.construct(&BlockData::with_text("t").level(2));
        Heading.update(&mut payload, &BlockData::default().level(3));
        assert_eq!(
            payload,
            Payload::Heading {
                level: 3,
                text: "t".to_string()
            }
        );
    }
}
