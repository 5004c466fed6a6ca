use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;
use crate::blocks::registry::BlockType;

/// Verbatim code block with an optional language tag. The source is stored
/// raw; escaping happens in the serializer, never here.
#[derive(Debug)]
pub struct Code;

impl BlockType for Code {
    fn tag(&self) -> &str {
        "code"
    }

    fn construct(&self, data: &BlockData) -> Payload {
        Payload::Code {
            language: data.language.clone().filter(|l| !l.is_empty()),
            source: data.text.clone().unwrap_or_default(),
        }
    }

    fn extract(&self, payload: &Payload) -> BlockData {
        match payload {
            Payload::Code { language, source } => {
                let mut data = BlockData::with_text(source.clone());
                data.language = language.clone();
                data
            }
            _ => BlockData::default(),
        }
    }

    fn update(&self, payload: &mut Payload, data: &BlockData) {
        if let Payload::Code { language, source } = payload {
            if let Some(new_source) = &data.text {
                *source = new_source.clone();
            }
            if let Some(new_language) = &data.language {
                *language = if new_language.is_empty() {
                    None
                } else {
                    Some(new_language.clone())
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_language_normalizes_to_none() {
        let payload = Code.construct(&BlockData::with_text("x = 1").language(""));
        assert_eq!(
            payload,
            Payload::Code {
                language: None,
                source: "x = 1".to_string()
            }
        );
    }

    #[test]
    fn source_is_stored_unescaped() {
        let payload = Code.construct(&BlockData::with_text("if a < b { }"));
        assert_eq!(payload.primary_text(), Some("if a < b { }"));
    }
}
