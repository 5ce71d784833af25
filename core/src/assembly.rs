//! Attaches an image to each parsed slide and fixes up slide numbering.

use futures::stream::{self, StreamExt};
use std::time::Duration;
use storydeck_common::{Deck, SlideRecord};
use tracing::{debug, info, warn};

use crate::client::{ImageFetch, ImageSource, NoImageReason};
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    pub concurrency: usize,
    pub timeout: Duration,
    pub style: Option<String>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AssemblyOptions {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.image_concurrency,
            timeout: config.image_timeout(),
            style: config.image_style.clone(),
        }
    }
}

/// What happened to the images of an assembled deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub attached: usize,
    /// Slide index (1-based) and why it has no image, in slide order.
    pub missing: Vec<(usize, NoImageReason)>,
}

/// Fetch an image for every record and return the finished deck.
///
/// Fetches may complete in any order; each result is written back to the
/// slot of the slide it was requested for. A failed or slow fetch leaves that
/// slide without an image and never affects the others.
pub async fn assemble_deck(
    topic: &str,
    records: Vec<SlideRecord>,
    images: &dyn ImageSource,
    options: &AssemblyOptions,
) -> (Deck, AssemblyReport) {
    let mut slides: Vec<SlideRecord> = records
        .into_iter()
        .enumerate()
        .map(|(pos, mut slide)| {
            let index = pos + 1;
            if slide.index != index {
                debug!(declared = slide.index, index, "renumbering slide");
            }
            slide.index = index;
            slide.image = None;
            slide
        })
        .collect();

    let requests: Vec<(usize, Option<String>)> = slides
        .iter()
        .enumerate()
        .map(|(pos, slide)| (pos, styled_prompt(&slide.visual_prompt, options.style.as_deref())))
        .collect();

    let timeout = options.timeout;
    let results: Vec<(usize, ImageFetch)> = stream::iter(requests)
        .map(|(pos, prompt)| async move { (pos, fetch_one(images, prompt, timeout).await) })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    let mut report = AssemblyReport::default();
    for (pos, fetch) in results {
        let Some(slide) = slides.get_mut(pos) else {
            continue;
        };
        match fetch {
            ImageFetch::Image(image) => {
                slide.image = Some(image);
                report.attached += 1;
            }
            ImageFetch::NoImage(reason) => {
                warn!(slide = slide.index, %reason, "no image for slide");
                report.missing.push((slide.index, reason));
            }
        }
    }
    report.missing.sort_by_key(|(index, _)| *index);

    info!(
        slides = slides.len(),
        images = report.attached,
        "deck assembled"
    );
    (Deck::new(topic, slides), report)
}

fn styled_prompt(visual_prompt: &str, style: Option<&str>) -> Option<String> {
    let prompt = visual_prompt.trim();
    if prompt.is_empty() {
        return None;
    }
    match style.map(str::trim).filter(|s| !s.is_empty()) {
        Some(style) => Some(format!("{prompt}, {style}")),
        None => Some(prompt.to_string()),
    }
}

async fn fetch_one(
    images: &dyn ImageSource,
    prompt: Option<String>,
    limit: Duration,
) -> ImageFetch {
    let Some(prompt) = prompt else {
        return ImageFetch::NoImage(NoImageReason::EmptyPrompt);
    };
    match tokio::time::timeout(limit, images.fetch_image(&prompt)).await {
        Ok(fetch) => fetch,
        Err(_) => ImageFetch::NoImage(NoImageReason::TimedOut(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use storydeck_common::SlideImage;

    /// Answers with the prompt bytes as image data; slower for earlier slides
    /// so completions arrive out of order.
    struct EchoImages {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageSource for EchoImages {
        async fn fetch_image(&self, prompt: &str) -> ImageFetch {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(prompt.to_string());
            }
            let n: u64 = prompt
                .trim_start_matches("scene ")
                .split(',')
                .next()
                .and_then(|d| d.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(50 - n * 10)).await;
            ImageFetch::Image(SlideImage::new("image/png", prompt.as_bytes().to_vec()))
        }
    }

    fn records(n: usize) -> Vec<SlideRecord> {
        (1..=n)
            .map(|i| SlideRecord::new(i + 10, format!("T{i}"), vec![], format!("scene {i}")))
            .collect()
    }

    #[tokio::test]
    async fn images_land_on_their_own_slides() {
        let source = EchoImages { seen: Mutex::new(Vec::new()) };
        let options = AssemblyOptions {
            concurrency: 5,
            ..AssemblyOptions::default()
        };
        let (deck, report) = assemble_deck("t", records(5), &source, &options).await;

        assert_eq!(report.attached, 5);
        for (pos, slide) in deck.slides().iter().enumerate() {
            assert_eq!(slide.index, pos + 1);
            let image = slide.image.as_ref().unwrap();
            assert_eq!(image.data, format!("scene {}", pos + 1).into_bytes());
        }
    }

    #[tokio::test]
    async fn style_is_appended_and_blank_prompts_skip_the_call() {
        let source = EchoImages { seen: Mutex::new(Vec::new()) };
        let mut input = records(2);
        input[1].visual_prompt = "   ".to_string();
        let options = AssemblyOptions {
            concurrency: 1,
            style: Some("cartoon style".to_string()),
            ..AssemblyOptions::default()
        };

        let (deck, report) = assemble_deck("t", input, &source, &options).await;

        assert_eq!(*source.seen.lock().unwrap(), vec!["scene 1, cartoon style".to_string()]);
        assert!(deck.slides()[0].has_image());
        assert_eq!(report.missing, vec![(2, NoImageReason::EmptyPrompt)]);
    }

    struct NeverAnswers;

    #[async_trait]
    impl ImageSource for NeverAnswers {
        async fn fetch_image(&self, _prompt: &str) -> ImageFetch {
            std::future::pending::<()>().await;
            ImageFetch::NoImage(NoImageReason::NoImagePart)
        }
    }

    #[tokio::test]
    async fn slow_fetch_times_out_to_no_image() {
        let options = AssemblyOptions {
            concurrency: 2,
            timeout: Duration::from_millis(20),
            style: None,
        };
        let (deck, report) = assemble_deck("t", records(2), &NeverAnswers, &options).await;

        assert_eq!(deck.len(), 2);
        assert_eq!(deck.image_count(), 0);
        assert_eq!(
            report.missing,
            vec![
                (1, NoImageReason::TimedOut(Duration::from_millis(20))),
                (2, NoImageReason::TimedOut(Duration::from_millis(20))),
            ]
        );
    }

    #[tokio::test]
    async fn empty_input_is_empty_deck() {
        let (deck, report) =
            assemble_deck("t", Vec::new(), &NeverAnswers, &AssemblyOptions::default()).await;
        assert!(deck.is_empty());
        assert_eq!(report, AssemblyReport::default());
    }
}
