use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gemini http {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("inline image is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),

    #[error("response contained no text")]
    EmptyResponse,
}
