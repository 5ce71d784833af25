//! Writing a deck to disk: Markdown with image files, self-contained HTML,
//! or JSON that `preview` can load again.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use storydeck_common::Deck;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Md,
    Html,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Html => "html",
            Self::Json => "json",
        }
    }

    pub fn default_path(self) -> PathBuf {
        PathBuf::from(format!("slide_deck.{}", self.extension()))
    }
}

/// Write `deck` to `path` and return the files created.
pub async fn export_deck(deck: &Deck, format: ExportFormat, path: &Path) -> Result<Vec<PathBuf>> {
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let mut written = Vec::new();

    let contents = match format {
        ExportFormat::Md => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("slide_deck");
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            let (markdown, images) = render_markdown(deck, stem, &generated_at);
            for (name, bytes) in images {
                let image_path = dir.join(name);
                tokio::fs::write(&image_path, bytes)
                    .await
                    .with_context(|| format!("writing {}", image_path.display()))?;
                written.push(image_path);
            }
            markdown
        }
        ExportFormat::Html => crate::html::render_document(deck, &generated_at),
        ExportFormat::Json => serde_json::to_string_pretty(deck)?,
    };

    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    written.push(path.to_path_buf());
    tracing::info!(path = %path.display(), ?format, files = written.len(), "exported deck");
    Ok(written)
}

pub async fn load_deck(path: &Path) -> Result<Deck> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a saved deck", path.display()))
}

/// Markdown text plus the image files it links to, named `<stem>-slide-NN.<ext>`.
fn render_markdown<'a>(
    deck: &'a Deck,
    stem: &str,
    generated_at: &str,
) -> (String, Vec<(String, &'a [u8])>) {
    let mut content = format!("# {}\n\n_Generated {generated_at}_\n\n", deck.topic());
    let mut images = Vec::new();

    if deck.is_empty() {
        content.push_str("No slides were generated.\n");
    }

    for slide in deck.slides() {
        content.push_str(&format!("## Slide {}: {}\n\n", slide.index, slide.title));
        for bullet in &slide.bullets {
            content.push_str(&format!("- {bullet}\n"));
        }
        content.push('\n');

        if let Some(image) = &slide.image {
            let name = format!("{stem}-slide-{:02}.{}", slide.index, image.extension());
            content.push_str(&format!("![slide {}]({name})\n\n", slide.index));
            images.push((name, image.data.as_slice()));
        }
    }
    (content, images)
}
