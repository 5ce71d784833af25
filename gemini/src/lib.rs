//! Minimal REST client for the Gemini `generateContent` endpoint.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeminiClient, DEFAULT_API_BASE};
pub use error::GeminiError;
