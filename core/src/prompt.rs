//! Instruction text for the slide-text generation call.

use std::fmt;

/// A non-empty, trimmed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic(String);

impl Topic {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const TEMPLATE: &str = r#"You are a storytelling educator.

Take this input: “{topic}”

You need to educate the reader about this concept.

Create a story-driven educational carousel in 15–20 slides. The story must centre around a fictional protagonist facing a problem
and solving that problem by exploring a real concept related to the topic. Through each slide, the character learns, explores or struggles.
The user (reader) follows along, engaging emotionally and intellectually.

Each slide must:
- Use story to emotionally engage
- Introduce or explain one key learning insight
- Optionally ask a question — but if a question is asked, the *very next slide must answer it clearly*

For each slide, provide:
1. Slide Title — short and engaging
2. Bullets (≤ 90 words total):
   - Line 1: Story moment
   - Line 2: Learning point or key fact
   - Line 3 (optional): A question — but ONLY if the next slide answers it
3. For the visual prompt:
    - Describe a cartoon-style scene with no background
    - If the subject includes a real person or a scientific/technical concept, request a **hyper-realistic** visual
    - Do **not** include written text, signs, documents with visible letters, or any symbols with text

Assume the reader is new to this topic. So use very simple terms and analogies wherever applicable,
and avoid jargon or complex sentences.

Final slide: summarise the protagonist’s journey and clearly state what the reader has learned or understood.

Respond in structured JSON format:
[
  {
    "slide": 1,
    "title": "...",
    "bullets": ["...", "..."],
    "visual_prompt": "..."
  },
  ...
]
"#;

pub fn build_prompt(topic: &Topic) -> String {
    TEMPLATE.replacen("{topic}", topic.as_str(), 1)
}
