//! Web video extraction: caption fetch + transcript reflow.
//!
//! Raw caption segments are short, unpunctuated fragments. The reflow pass
//! turns them into readable paragraphs using two timing heuristics: a
//! missing sentence end is inferred from the following segment, and a long
//! silence starts a new paragraph.

use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::{Backends, CaptionSegment};
use crate::domain::Resource;

use super::Extraction;

/// Gap beyond which a segment without terminal punctuation gets a period.
const SENTENCE_GAP_SECS: f64 = 2.0;

/// Gap beyond which a new paragraph starts.
const PARAGRAPH_GAP_SECS: f64 = 3.0;

/// The URL did not contain a recognizable video id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not extract a video id from URL: {0}")]
pub struct UnparseableUrl(pub String);

/// Extract the 11-character video id from the accepted URL shapes:
///
/// - `https://www.youtube.com/watch?v=VIDEO_ID`
/// - `https://youtu.be/VIDEO_ID`
/// - `https://youtube.com/embed/VIDEO_ID`
/// - `https://m.youtube.com/watch?v=VIDEO_ID`
pub fn parse_video_id(url: &str) -> Result<String, UnparseableUrl> {
    for marker in ["youtu.be/", "youtube.com/embed/"] {
        if let Some(pos) = url.find(marker) {
            if let Some(id) = take_video_id(&url[pos + marker.len()..]) {
                return Ok(id);
            }
        }
    }

    if let Some(pos) = url.find("youtube.com/watch?") {
        let query = &url[pos + "youtube.com/watch?".len()..];
        for param in query.split('&') {
            if let Some(value) = param.strip_prefix("v=") {
                if let Some(id) = take_video_id(value) {
                    return Ok(id);
                }
            }
        }
    }

    Err(UnparseableUrl(url.to_string()))
}

/// Take exactly 11 id characters from the front of `rest`.
fn take_video_id(rest: &str) -> Option<String> {
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(11)
        .collect();
    (id.len() == 11).then_some(id)
}

/// Reflow caption segments into readable paragraphs.
pub fn reflow_segments(segments: &[CaptionSegment]) -> String {
    let kept: Vec<&CaptionSegment> = segments
        .iter()
        .filter(|seg| !seg.text.trim().is_empty())
        .collect();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut previous_end: Option<f64> = None;

    for (i, segment) in kept.iter().enumerate() {
        let mut text = segment.text.trim().to_string();

        // A long silence since the previous segment ends the paragraph
        // before this segment opens the next one.
        if let Some(end) = previous_end {
            if segment.start - end > PARAGRAPH_GAP_SECS && !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        }

        // Infer a missing sentence end: the next segment starting with a
        // capital, or a long pause before it, closes this sentence.
        if !text.ends_with(['.', '!', '?']) {
            if let Some(next) = kept.get(i + 1) {
                let next_text = next.text.trim();
                let gap = next.start - (segment.start + segment.duration);
                let next_capitalized = next_text
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_uppercase());
                if next_capitalized || gap > SENTENCE_GAP_SECS {
                    text.push('.');
                }
            }
        }

        // Capitalize the first letter if it is lowercase.
        if let Some(first) = text.chars().next() {
            if first.is_lowercase() {
                let rest: String = text.chars().skip(1).collect();
                text = first.to_uppercase().collect::<String>() + &rest;
            }
        }

        current.push(text);
        previous_end = Some(segment.start + segment.duration);
    }

    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
        .iter()
        .map(|p| tidy_paragraph(p))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Collapse redundant whitespace and normalize spacing around punctuation.
fn tidy_paragraph(paragraph: &str) -> String {
    let collapsed = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = collapsed
        .replace(" .", ".")
        .replace(" !", "!")
        .replace(" ?", "?");

    // Re-insert the space after sentence punctuation when the next word
    // starts lowercase (lost in caption boundaries).
    let mut out = String::with_capacity(collapsed.len());
    let mut previous: Option<char> = None;
    for c in collapsed.chars() {
        if matches!(previous, Some('.' | '!' | '?')) && c.is_ascii_lowercase() {
            out.push(' ');
        }
        out.push(c);
        previous = Some(c);
    }

    out.trim().to_string()
}

pub(super) async fn extract(resource: &Resource, backends: &Backends) -> Extraction {
    let url = match resource.source_locator.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => {
            return Extraction::Degraded(
                "Transcript not available: no video URL on this resource".to_string(),
            )
        }
    };

    let video_id = match parse_video_id(url) {
        Ok(id) => id,
        Err(e) => {
            warn!(url, "unparseable video URL");
            return Extraction::Degraded(format!("Transcript not available: {e}"));
        }
    };

    info!(%video_id, "fetching captions");
    match backends.captions.fetch(&video_id).await {
        Ok(segments) => {
            let transcript = reflow_segments(&segments);
            if transcript.is_empty() {
                Extraction::Degraded(
                    "Transcript not available: the video's captions contain no text".to_string(),
                )
            } else {
                info!(chars = transcript.len(), "caption transcript formatted");
                Extraction::Complete(transcript)
            }
        }
        Err(e) => {
            warn!(error = %e, "caption fetch failed");
            Extraction::Degraded(format!("Transcript not available: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, start: f64, duration: f64) -> CaptionSegment {
        CaptionSegment {
            text: text.to_string(),
            start,
            duration,
        }
    }

    #[test]
    fn parses_all_accepted_url_shapes() {
        for url in [
            "https://youtu.be/abcDEFghi12",
            "https://www.youtube.com/watch?v=abcDEFghi12",
            "https://m.youtube.com/watch?v=abcDEFghi12",
            "https://youtube.com/embed/abcDEFghi12",
            "https://www.youtube.com/watch?feature=shared&v=abcDEFghi12",
        ] {
            assert_eq!(parse_video_id(url).as_deref(), Ok("abcDEFghi12"), "{url}");
        }
    }

    #[test]
    fn rejects_urls_without_an_id() {
        assert!(parse_video_id("https://www.youtube.com/watch?v=short").is_err());
        assert!(parse_video_id("https://example.com/watch?v=abcDEFghi12").is_err());
        assert!(parse_video_id("https://youtu.be/").is_err());
    }

    #[test]
    fn long_gap_breaks_paragraph_and_closes_sentence() {
        let segments = vec![seg("hello world", 0.0, 1.0), seg("Next thought", 5.0, 1.0)];

        let text = reflow_segments(&segments);
        let paragraphs: Vec<&str> = text.split("\n\n").collect();

        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0], "Hello world.");
        assert!(paragraphs[1].starts_with("Next thought"));
    }

    #[test]
    fn short_gaps_stay_in_one_paragraph() {
        let segments = vec![
            seg("the mitochondria is", 0.0, 2.0),
            seg("the powerhouse of the cell", 2.1, 2.0),
        ];

        let text = reflow_segments(&segments);
        assert!(!text.contains("\n\n"));
        assert_eq!(text, "The mitochondria is the powerhouse of the cell");
    }

    #[test]
    fn period_added_when_next_segment_is_capitalized() {
        let segments = vec![seg("first point", 0.0, 1.0), seg("Second point", 1.1, 1.0)];

        let text = reflow_segments(&segments);
        assert_eq!(text, "First point. Second point");
    }

    #[test]
    fn existing_punctuation_is_left_alone() {
        let segments = vec![seg("is that clear?", 0.0, 1.0), seg("Good.", 1.1, 1.0)];

        assert_eq!(reflow_segments(&segments), "Is that clear? Good.");
    }

    #[test]
    fn empty_segments_are_dropped() {
        let segments = vec![seg("  ", 0.0, 1.0), seg("only this", 1.0, 1.0)];

        assert_eq!(reflow_segments(&segments), "Only this");
    }

    #[test]
    fn whitespace_is_normalized() {
        let segments = vec![seg("too   many    spaces .", 0.0, 1.0)];

        assert_eq!(reflow_segments(&segments), "Too many spaces.");
    }
}
