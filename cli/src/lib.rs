pub mod export;
pub mod html;
pub mod logging;
pub mod serve;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storydeck_core::{Config, DeckPipeline, GeneratedDeck, Topic};

use crate::export::ExportFormat;

#[derive(Parser)]
#[command(name = "storydeck")]
#[command(about = "Turn a topic into an illustrated, story-driven slide deck")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to a TOML config file (default: ./storydeck.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the slide text model
    #[arg(long, global = true)]
    pub text_model: Option<String>,

    /// Override the image model
    #[arg(long, global = true)]
    pub image_model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a deck and page through it in the terminal
    Generate {
        /// What the deck should teach
        topic: String,
        /// Also write the deck to a file
        #[arg(short, long, value_enum)]
        export: Option<ExportFormat>,
        /// Output path for --export (default: slide_deck.<ext>)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Skip the terminal viewer
        #[arg(long)]
        no_view: bool,
    },
    /// Page through a deck saved with --export json
    Preview {
        /// Path to the saved deck
        file: PathBuf,
    },
    /// Generate a deck and view it in the browser
    Serve {
        topic: String,
        #[arg(short, long, default_value = "8000")]
        port: u16,
        /// Don't open a browser window
        #[arg(long)]
        no_open: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(model) = cli.text_model {
        config.text_model = model;
    }
    if let Some(model) = cli.image_model {
        config.image_model = model;
    }
    logging::init(&config.log_path(), cli.debug)?;

    match cli.command {
        Commands::Generate {
            topic,
            export,
            out,
            no_view,
        } => {
            let generated = generate(&config, &topic).await?;
            if let Some(format) = export {
                let path = out.unwrap_or_else(|| format.default_path());
                for file in export::export_deck(&generated.deck, format, &path).await? {
                    println!("Wrote {}", file.display());
                }
            }
            if !no_view {
                storydeck_tui::run_preview(generated.deck).await?;
            }
        }
        Commands::Preview { file } => {
            let deck = export::load_deck(&file).await?;
            storydeck_tui::run_preview(deck).await?;
        }
        Commands::Serve {
            topic,
            port,
            no_open,
        } => {
            let generated = generate(&config, &topic).await?;
            serve::serve(generated.deck, port, !no_open).await?;
        }
    }

    Ok(())
}

async fn generate(config: &Config, topic: &str) -> Result<GeneratedDeck> {
    let topic = Topic::new(topic).ok_or_else(|| anyhow!("topic must not be empty"))?;
    let pipeline = DeckPipeline::from_config(config)?;

    println!("Generating deck for: {topic}");
    let generated = pipeline
        .generate(&topic)
        .await
        .context("deck generation failed")?;

    let deck = &generated.deck;
    if deck.is_empty() {
        println!("No slides were generated.");
    } else {
        println!(
            "Generated {} slides ({} with images)",
            deck.len(),
            deck.image_count()
        );
    }
    for (index, reason) in &generated.report.missing {
        println!("  slide {index}: no image ({reason})");
    }
    Ok(generated)
}
