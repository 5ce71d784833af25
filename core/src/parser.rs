//! Recovers slide records from a model reply that should be, but often isn't
//! only, a JSON array.
//!
//! The reply is first parsed whole. If that fails, candidate `[ { ... } ]`
//! spans are located with a bracket-matching scan that understands JSON
//! strings, and each candidate is parsed in turn. The first candidate that
//! yields at least one slide wins; a candidate that parses but holds no usable
//! slide (an echoed shape example, say) is passed over.

use serde_json::Value;
use storydeck_common::SlideRecord;
use tracing::{debug, warn};

use crate::error::ParseError;

/// Starting positions tried by the recovery scan. Each costs one linear scan,
/// so hostile input stays bounded; prose with more `[{` openers than this
/// ahead of the real array hides it.
const MAX_OPENERS: usize = 64;

/// Parse a raw reply into slide records.
///
/// Slides missing a title or bullets are skipped, not fatal. An error means no
/// slide array could be recovered at all.
pub fn parse_slides(raw: &str) -> Result<Vec<SlideRecord>, ParseError> {
    let text = raw.trim();
    if let Ok(values) = serde_json::from_str::<Vec<Value>>(text) {
        return Ok(records_from(&values));
    }

    let mut fallback = None;
    let mut last_error = None;
    let mut resume_at = 0;
    for (start, end) in array_spans(text) {
        if start < resume_at {
            continue;
        }
        match serde_json::from_str::<Vec<Value>>(&text[start..=end]) {
            Ok(values) => {
                let slides = records_from(&values);
                if !slides.is_empty() {
                    debug!(
                        offset = start,
                        slides = slides.len(),
                        "recovered slide array from surrounding text"
                    );
                    return Ok(slides);
                }
                debug!(offset = start, "candidate array has no usable slides");
                if fallback.is_none() {
                    fallback = Some(slides);
                }
                resume_at = end + 1;
            }
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    match (fallback, last_error) {
        (Some(slides), _) => Ok(slides),
        (None, Some(e)) => Err(ParseError::Malformed(e)),
        (None, None) => Err(ParseError::NoJsonArray),
    }
}

fn records_from(values: &[Value]) -> Vec<SlideRecord> {
    let mut slides = Vec::with_capacity(values.len());
    for (pos, value) in values.iter().enumerate() {
        match slide_from_value(value, pos + 1) {
            Ok(slide) => slides.push(slide),
            Err(missing) => warn!(position = pos + 1, missing, "skipping partial slide"),
        }
    }
    slides
}

/// Balanced `[ { ... } ]` spans, as inclusive byte ranges.
fn array_spans(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'[')
        .map(|(start, _)| start)
        .filter(move |&start| opens_object(bytes, start))
        .take(MAX_OPENERS)
        .filter_map(move |start| matching_close(bytes, start).map(|end| (start, end)))
}

fn opens_object(bytes: &[u8], start: usize) -> bool {
    bytes[start + 1..]
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'{')
}

/// Index of the bracket closing the one at `start`, or `None` if the span is
/// unbalanced or truncated.
fn matching_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => stack.push(b']'),
            b'{' => stack.push(b'}'),
            b']' | b'}' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Map one array element to a record, or name the field that made it unusable.
/// Text fields are kept exactly as written.
fn slide_from_value(value: &Value, position: usize) -> Result<SlideRecord, &'static str> {
    let obj = value.as_object().ok_or("object")?;

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .ok_or("title")?;

    let bullets = match obj.get("bullets") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or("bullets")?,
        Some(Value::String(line)) => vec![line.clone()],
        _ => return Err("bullets"),
    };

    let visual_prompt = obj
        .get("visual_prompt")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let index = obj
        .get("slide")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(position);

    Ok(SlideRecord::new(index, title, bullets, visual_prompt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_json(n: usize) -> String {
        format!(
            r#"{{"slide": {n}, "title": "Title {n}", "bullets": ["story {n}", "fact {n}"], "visual_prompt": "scene {n}"}}"#
        )
    }

    fn array_of(n: usize) -> String {
        let items: Vec<String> = (1..=n).map(slide_json).collect();
        format!("[{}]", items.join(",\n"))
    }

    #[test]
    fn parses_pure_json() {
        let slides = parse_slides(&array_of(3)).unwrap();
        assert_eq!(slides.len(), 3);
        assert_eq!(slides[1].title, "Title 2");
        assert_eq!(slides[1].bullets, vec!["story 2", "fact 2"]);
        assert_eq!(slides[1].visual_prompt, "scene 2");
        assert_eq!(slides[1].index, 2);
        assert!(slides[1].image.is_none());
    }

    #[test]
    fn recovers_array_wrapped_in_prose() {
        let raw = format!(
            "Sure! Here is your carousel [draft]:\n\n{}\n\nLet me know if you want {{changes}}.",
            array_of(5)
        );
        let slides = parse_slides(&raw).unwrap();
        assert_eq!(slides.len(), 5);
        for (i, slide) in slides.iter().enumerate() {
            assert_eq!(slide.title, format!("Title {}", i + 1));
            assert_eq!(slide.bullets, vec![format!("story {}", i + 1), format!("fact {}", i + 1)]);
            assert_eq!(slide.visual_prompt, format!("scene {}", i + 1));
        }
    }

    #[test]
    fn recovers_array_in_code_fence() {
        let raw = format!("```json\n{}\n```", array_of(2));
        assert_eq!(parse_slides(&raw).unwrap().len(), 2);
    }

    #[test]
    fn brackets_inside_strings_do_not_confuse_the_scan() {
        let raw = r#"Output: [{"title": "Arrays ] and { braces", "bullets": ["a \"quoted\" ] bracket"], "visual_prompt": "x"}] done"#;
        let slides = parse_slides(raw).unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Arrays ] and { braces");
        assert_eq!(slides[0].bullets, vec!["a \"quoted\" ] bracket"]);
    }

    #[test]
    fn skips_unparseable_candidate_and_uses_next() {
        let raw = format!("Example: [{{not json}}]\nActual:\n{}", array_of(2));
        assert_eq!(parse_slides(&raw).unwrap().len(), 2);
    }

    #[test]
    fn refusal_text_is_not_a_crash() {
        assert_eq!(parse_slides("I cannot help with that."), Err(ParseError::NoJsonArray));
        assert_eq!(parse_slides(""), Err(ParseError::NoJsonArray));
    }

    #[test]
    fn truncated_array_is_not_recovered() {
        let full = array_of(3);
        let truncated = &full[..full.len() - 20];
        assert!(parse_slides(truncated).is_err());
    }

    #[test]
    fn malformed_candidate_reports_malformed() {
        let err = parse_slides("here: [{\"title\": oops}]").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn one_missing_title_keeps_the_other_four() {
        let mut items: Vec<String> = (1..=5).map(slide_json).collect();
        items[2] = r#"{"slide": 3, "bullets": ["orphan"], "visual_prompt": "y"}"#.to_string();
        let raw = format!("[{}]", items.join(","));

        let slides = parse_slides(&raw).unwrap();
        assert_eq!(slides.len(), 4);
        assert!(slides.iter().all(|s| s.title != "Title 3"));
    }

    #[test]
    fn missing_bullets_or_non_object_is_skipped() {
        let raw = r#"[{"title": "No bullets"}, 42, {"title": "Ok", "bullets": "single line"}]"#;
        let slides = parse_slides(raw).unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Ok");
        assert_eq!(slides[0].bullets, vec!["single line"]);
        assert_eq!(slides[0].index, 3);
        assert_eq!(slides[0].visual_prompt, "");
    }

    #[test]
    fn empty_array_is_an_empty_deck() {
        assert_eq!(parse_slides("[]").unwrap(), Vec::new());
    }

    #[test]
    fn text_fields_come_back_exactly_as_written() {
        let raw = r#"Here you go:
[{"slide": 1, "title": "  Intro  ", "bullets": ["Mia wakes", "", "  indented fact"], "visual_prompt": " a sunrise "}]
Enjoy!"#;
        let slides = parse_slides(raw).unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "  Intro  ");
        assert_eq!(slides[0].bullets, vec!["Mia wakes", "", "  indented fact"]);
        assert_eq!(slides[0].visual_prompt, " a sunrise ");
    }

    #[test]
    fn non_string_bullet_makes_the_slide_partial() {
        let raw = r#"[{"title": "Mixed", "bullets": ["ok", 7]}, {"title": "Clean", "bullets": ["ok"]}]"#;
        let slides = parse_slides(raw).unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Clean");
    }

    #[test]
    fn echoed_shape_example_is_passed_over() {
        let raw = format!(
            "You asked for this shape: [{{\"note\": \"example\"}}]\n\nHere it is:\n{}",
            array_of(2)
        );
        let slides = parse_slides(&raw).unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title, "Title 1");
    }

    #[test]
    fn array_without_usable_slides_is_an_empty_deck() {
        let raw = r#"Shape: [{"note": "example"}] and nothing else"#;
        assert_eq!(parse_slides(raw).unwrap(), Vec::new());
    }

    #[test]
    fn bad_snippets_in_prose_do_not_hide_the_array() {
        let raw = format!("{}\nFinally:\n{}", "Try [{x}] ".repeat(8), array_of(3));
        assert_eq!(parse_slides(&raw).unwrap().len(), 3);
    }

    #[test]
    fn candidate_scan_is_bounded() {
        let hostile = "[{".repeat(10_000);
        assert!(parse_slides(&hostile).is_err());
    }
}
