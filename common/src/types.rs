use serde::{Deserialize, Serialize};

/// Decoded image attached to a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideImage {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl SlideImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// File extension matching the MIME type, used when writing images to disk.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }

    pub fn data_uri(&self) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// One slide: title, display bullets, the prompt its image was drawn from and
/// the image itself when one could be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// 1-based position in the deck.
    pub index: usize,
    pub title: String,
    pub bullets: Vec<String>,
    pub visual_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<SlideImage>,
}

impl SlideRecord {
    pub fn new(
        index: usize,
        title: impl Into<String>,
        bullets: Vec<String>,
        visual_prompt: impl Into<String>,
    ) -> Self {
        Self {
            index,
            title: title.into(),
            bullets,
            visual_prompt: visual_prompt.into(),
            image: None,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Ordered slides produced for one topic. Empty means generation failed.
///
/// A deck is never edited after assembly; a new request builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    topic: String,
    slides: Vec<SlideRecord>,
}

impl Deck {
    pub fn new(topic: impl Into<String>, slides: Vec<SlideRecord>) -> Self {
        Self {
            topic: topic.into(),
            slides,
        }
    }

    pub fn empty(topic: impl Into<String>) -> Self {
        Self::new(topic, Vec::new())
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn slides(&self) -> &[SlideRecord] {
        &self.slides
    }

    pub fn get(&self, position: usize) -> Option<&SlideRecord> {
        self.slides.get(position)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.slides.iter().filter(|s| s.has_image()).count()
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_survives_json_as_base64() {
        let mut slide = SlideRecord::new(1, "Intro", vec!["a".into()], "a cat");
        slide.image = Some(SlideImage::new("image/png", vec![0x89, b'P', b'N', b'G']));
        let deck = Deck::new("cats", vec![slide]);

        let json = serde_json::to_string(&deck).unwrap();
        assert!(json.contains("\"iVBORw==\""));

        let back: Deck = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deck);
    }

    #[test]
    fn missing_image_is_omitted() {
        let deck = Deck::new("t", vec![SlideRecord::new(1, "A", vec![], "")]);
        let json = serde_json::to_string(&deck).unwrap();
        assert!(!json.contains("image"));
        assert_eq!(deck.image_count(), 0);
    }

    #[test]
    fn data_uri_and_extension() {
        let image = SlideImage::new("image/jpeg", vec![1, 2, 3]);
        assert_eq!(image.extension(), "jpg");
        assert_eq!(image.data_uri(), "data:image/jpeg;base64,AQID");
        assert_eq!(SlideImage::new("application/x", vec![]).extension(), "bin");
    }
}
