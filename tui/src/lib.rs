pub mod preview;

use anyhow::Result;
use storydeck_common::Deck;

pub use preview::DeckPreview;

/// Page through a deck in the terminal until the user quits.
pub async fn run_preview(deck: Deck) -> Result<()> {
    let mut preview = DeckPreview::new(deck);
    preview.run().await
}
