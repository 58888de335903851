use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Language the captioning model writes in.
pub const SOURCE_LANG: &str = "en";

/// Caption straight from the captioning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    pub alt_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BilingualAltText {
    pub alt_text: AltTextPair,
}

/// Serialized as `{"en": <original>, "<target_lang>": <translated>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltTextPair {
    pub original: String,
    pub target_lang: String,
    pub translated: String,
}

impl BilingualAltText {
    pub fn new(original: String, target_lang: &str, translated: String) -> Self {
        Self {
            alt_text: AltTextPair {
                original,
                target_lang: target_lang.to_string(),
                translated,
            },
        }
    }
}

impl Serialize for AltTextPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(SOURCE_LANG, &self.original)?;
        map.serialize_entry(&self.target_lang, &self.translated)?;
        map.end()
    }
}
