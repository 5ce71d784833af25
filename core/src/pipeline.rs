use std::sync::Arc;
use storydeck_common::Deck;
use tracing::{info, warn};

use crate::assembly::{assemble_deck, AssemblyOptions, AssemblyReport};
use crate::client::{GeminiAdapter, ImageSource, TextGenerator};
use crate::config::Config;
use crate::error::DeckError;
use crate::parser::parse_slides;
use crate::prompt::{build_prompt, Topic};

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub deck: Deck,
    pub report: AssemblyReport,
}

/// Topic in, illustrated deck out: prompt, text call, parse, then one image
/// call per slide.
#[derive(Clone)]
pub struct DeckPipeline {
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageSource>,
    options: AssemblyOptions,
}

impl DeckPipeline {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageSource>,
        options: AssemblyOptions,
    ) -> Self {
        Self {
            text,
            images,
            options,
        }
    }

    /// Gemini for both calls. Fails fast when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self, DeckError> {
        let adapter = Arc::new(GeminiAdapter::from_config(config)?);
        Ok(Self::new(
            adapter.clone(),
            adapter,
            AssemblyOptions::from(config),
        ))
    }

    pub async fn generate(&self, topic: &Topic) -> Result<GeneratedDeck, DeckError> {
        info!(%topic, "generating deck");
        let prompt = build_prompt(topic);

        let raw = self.text.generate_text(&prompt).await.map_err(|e| {
            warn!(error = %e, "slide text generation failed");
            e
        })?;

        let records = match parse_slides(&raw) {
            Ok(records) => records,
            Err(e) => {
                let preview: String = raw.chars().take(PREVIEW_CHARS).collect();
                warn!(error = %e, response_len = raw.len(), %preview, "unparseable slide response");
                return Err(DeckError::UnparseableResponse);
            }
        };
        info!(slides = records.len(), "parsed slide text");

        let (deck, report) =
            assemble_deck(topic.as_str(), records, self.images.as_ref(), &self.options).await;
        Ok(GeneratedDeck { deck, report })
    }
}
