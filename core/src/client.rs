//! Seams between the deck pipeline and the generation backends.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use storydeck_common::SlideImage;
use storydeck_gemini::{GeminiClient, GeminiError};

use crate::config::Config;
use crate::error::DeckError;

/// Produces the raw slide text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, DeckError>;
}

/// Produces one image per visual prompt. Never fails: every problem is
/// reported as [`ImageFetch::NoImage`] with a reason.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, prompt: &str) -> ImageFetch;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFetch {
    Image(SlideImage),
    NoImage(NoImageReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoImageReason {
    EmptyPrompt,
    /// The call succeeded but no response part carried image data.
    NoImagePart,
    TimedOut(Duration),
    Failed(String),
}

impl fmt::Display for NoImageReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPrompt => f.write_str("slide has no visual prompt"),
            Self::NoImagePart => f.write_str("response contained no image"),
            Self::TimedOut(limit) => write!(f, "timed out after {}s", limit.as_secs()),
            Self::Failed(reason) => write!(f, "request failed: {reason}"),
        }
    }
}

/// Gemini-backed implementation of both seams.
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    client: GeminiClient,
    text_model: String,
    image_model: String,
}

impl GeminiAdapter {
    pub fn new(client: GeminiClient, text_model: String, image_model: String) -> Self {
        Self {
            client,
            text_model,
            image_model,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, DeckError> {
        let key = config.api_key.clone().ok_or(DeckError::MissingCredential)?;
        let client = GeminiClient::new(key)
            .map_err(|_| DeckError::MissingCredential)?
            .with_api_base(config.api_base.clone());
        Ok(Self::new(
            client,
            config.text_model.clone(),
            config.image_model.clone(),
        ))
    }
}

#[async_trait]
impl TextGenerator for GeminiAdapter {
    async fn generate_text(&self, prompt: &str) -> Result<String, DeckError> {
        self.client
            .generate_text(&self.text_model, prompt)
            .await
            .map_err(|e| match e {
                GeminiError::MissingApiKey => DeckError::MissingCredential,
                other => DeckError::GenerationUnavailable(other.to_string()),
            })
    }
}

#[async_trait]
impl ImageSource for GeminiAdapter {
    async fn fetch_image(&self, prompt: &str) -> ImageFetch {
        match self.client.generate_image(&self.image_model, prompt).await {
            Ok(Some(image)) => ImageFetch::Image(image),
            Ok(None) => ImageFetch::NoImage(NoImageReason::NoImagePart),
            Err(e) => ImageFetch::NoImage(NoImageReason::Failed(e.to_string())),
        }
    }
}
