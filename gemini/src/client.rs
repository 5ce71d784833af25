use base64::{engine::general_purpose::STANDARD, Engine as _};
use storydeck_common::SlideImage;
use tracing::debug;

use crate::error::GeminiError;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for `models/{model}:generateContent`, used for both slide text and
/// slide images.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, GeminiError> {
        if api_key.trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.api_base.trim_end_matches('/')
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = self.endpoint(model);
        debug!(%url, "sending generateContent request");

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "generateContent response");

        if !status.is_success() {
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Send a text prompt and return the reply text.
    pub async fn generate_text(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        let response = self
            .generate_content(model, &GenerateContentRequest::text(prompt))
            .await?;
        response.text().ok_or(GeminiError::EmptyResponse)
    }

    /// Ask for an image. `Ok(None)` means the call succeeded but no part
    /// carried image data.
    pub async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<Option<SlideImage>, GeminiError> {
        let response = self
            .generate_content(model, &GenerateContentRequest::image(prompt))
            .await?;

        match response.first_inline_image() {
            Some(inline) => {
                let data = STANDARD.decode(inline.data.as_bytes())?;
                Ok(Some(SlideImage::new(inline.mime_type.clone(), data)))
            }
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
