//! Deck generation core: prompt, response parsing, image attachment and
//! slide navigation.

pub mod assembly;
pub mod client;
pub mod config;
pub mod error;
pub mod navigation;
pub mod parser;
pub mod pipeline;
pub mod prompt;

pub use assembly::{assemble_deck, AssemblyOptions, AssemblyReport};
pub use client::{GeminiAdapter, ImageFetch, ImageSource, NoImageReason, TextGenerator};
pub use config::Config;
pub use error::{ConfigError, DeckError, ParseError};
pub use navigation::{NavCommand, NavState, Navigator};
pub use parser::parse_slides;
pub use pipeline::{DeckPipeline, GeneratedDeck};
pub use prompt::{build_prompt, Topic};
pub use storydeck_common::{Deck, SlideImage, SlideRecord};
