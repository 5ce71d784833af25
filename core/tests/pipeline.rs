use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use storydeck_core::{
    AssemblyOptions, DeckError, DeckPipeline, ImageFetch, ImageSource, NavCommand, NavState,
    Navigator, NoImageReason, SlideImage, TextGenerator, Topic,
};

struct CannedText(Result<String, String>);

#[async_trait]
impl TextGenerator for CannedText {
    async fn generate_text(&self, prompt: &str) -> Result<String, DeckError> {
        assert!(prompt.contains("storytelling educator"));
        self.0
            .clone()
            .map_err(DeckError::GenerationUnavailable)
    }
}

/// Fails for one prompt, succeeds for the rest.
struct FlakyImages {
    fail_on: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl ImageSource for FlakyImages {
    async fn fetch_image(&self, prompt: &str) -> ImageFetch {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt == self.fail_on {
            ImageFetch::NoImage(NoImageReason::Failed("connection reset".to_string()))
        } else {
            ImageFetch::Image(SlideImage::new("image/png", prompt.as_bytes().to_vec()))
        }
    }
}

fn slides_json(n: usize) -> String {
    let items: Vec<String> = (1..=n)
        .map(|i| {
            format!(
                r#"{{"slide": {i}, "title": "Chapter {i}", "bullets": ["Mia wonders", "Fact {i}"], "visual_prompt": "prompt {i}"}}"#
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

fn pipeline(text: Result<String, String>, images: Arc<FlakyImages>) -> DeckPipeline {
    let options = AssemblyOptions {
        concurrency: 3,
        timeout: Duration::from_secs(5),
        style: None,
    };
    DeckPipeline::new(Arc::new(CannedText(text)), images, options)
}

fn images(fail_on: &'static str) -> Arc<FlakyImages> {
    Arc::new(FlakyImages {
        fail_on,
        calls: AtomicUsize::new(0),
    })
}

fn topic() -> Topic {
    Topic::new("how vaccines work").unwrap()
}

#[tokio::test]
async fn failed_image_for_slide_three_keeps_all_five_slides() {
    let source = images("prompt 3");
    let reply = format!("Here is the carousel you asked for:\n```json\n{}\n```", slides_json(5));
    let generated = pipeline(Ok(reply), source.clone())
        .generate(&topic())
        .await
        .unwrap();

    let deck = &generated.deck;
    assert_eq!(deck.topic(), "how vaccines work");
    assert_eq!(deck.len(), 5);
    assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    for slide in deck.slides() {
        assert_eq!(slide.has_image(), slide.index != 3, "slide {}", slide.index);
    }
    assert_eq!(generated.report.attached, 4);
    assert_eq!(generated.report.missing.len(), 1);
    assert_eq!(generated.report.missing[0].0, 3);
}

#[tokio::test]
async fn partial_slide_is_dropped_and_rest_renumbered() {
    let reply = r#"[
        {"slide": 1, "title": "One", "bullets": ["a"], "visual_prompt": "p1"},
        {"slide": 2, "bullets": ["no title"], "visual_prompt": "p2"},
        {"slide": 3, "title": "Three", "bullets": ["c"], "visual_prompt": "p3"}
    ]"#;
    let generated = pipeline(Ok(reply.to_string()), images("none"))
        .generate(&topic())
        .await
        .unwrap();

    let titles: Vec<(usize, &str)> = generated
        .deck
        .slides()
        .iter()
        .map(|s| (s.index, s.title.as_str()))
        .collect();
    assert_eq!(titles, vec![(1, "One"), (2, "Three")]);
}

#[tokio::test]
async fn refusal_is_unparseable() {
    let err = pipeline(Ok("I cannot help with that.".to_string()), images("none"))
        .generate(&topic())
        .await
        .unwrap_err();
    assert!(matches!(err, DeckError::UnparseableResponse));
}

#[tokio::test]
async fn text_call_failure_propagates_without_image_calls() {
    let source = images("none");
    let err = pipeline(Err("quota exceeded".to_string()), source.clone())
        .generate(&topic())
        .await
        .unwrap_err();
    assert!(matches!(err, DeckError::GenerationUnavailable(ref m) if m == "quota exceeded"));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn new_deck_replaces_old_navigation() {
    let first = pipeline(Ok(slides_json(4)), images("none"))
        .generate(&topic())
        .await
        .unwrap();
    let mut nav = Navigator::for_deck(&first.deck);
    nav.apply(NavCommand::Last);
    assert_eq!(nav.state(), NavState::Viewing(3));

    let second = pipeline(Ok("[]".to_string()), images("none"))
        .generate(&topic())
        .await
        .unwrap();
    assert!(second.deck.is_empty());
    nav.load(&second.deck);
    assert_eq!(nav.state(), NavState::Empty);
}
