use thiserror::Error;

/// Failures that leave the caller without a deck.
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingCredential,

    #[error("could not generate deck: {0}")]
    GenerationUnavailable(String),

    #[error("model reply did not contain a usable slide list")]
    UnparseableResponse,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON array of objects found in response")]
    NoJsonArray,

    #[error("JSON array found but malformed: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
