//! Best-effort extraction of the "Objects:" list from a free-text analysis reply.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! Objects:
//! - cat (95%)
//! - dog
//! * bicycle (0.8)
//! ```
//!
//! A bullet's confidence is optional; unannotated bullets get [`DEFAULT_CONFIDENCE`].
//! Nothing here returns an error. Input that does not fit degrades to fewer objects.

use super::types::DetectedObject;
use regex::Regex;

pub const DEFAULT_CONFIDENCE: f32 = 0.9;

const BULLET_PATTERN: &str =
    r"^\s*[-*•]\s+(?P<label>.*?)\s*(?:\(\s*(?P<score>\d+(?:\.\d+)?)\s*(?P<pct>%)?\s*\))?\s*$";

/// Parse the object list out of a reply.
///
/// Returns `None` when the reply has no "Objects:" header, and `Some` (possibly empty)
/// when it does.
pub fn parse_objects(reply: &str) -> Option<Vec<DetectedObject>> {
    let Ok(bullet) = Regex::new(BULLET_PATTERN) else {
        return None;
    };

    let mut lines = reply.lines().skip_while(|line| !is_objects_header(line));
    lines.next()?;

    let mut objects = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let Some(caps) = bullet.captures(line) else {
            break;
        };

        let label = caps["label"].trim().trim_matches('*').trim();
        if label.is_empty() {
            continue;
        }

        let confidence = caps
            .name("score")
            .and_then(|m| m.as_str().parse::<f32>().ok())
            .map(|score| {
                if caps.name("pct").is_some() || score > 1.0 {
                    score / 100.0
                } else {
                    score
                }
            })
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);

        objects.push(DetectedObject {
            label: label.to_string(),
            confidence,
        });
    }

    Some(objects)
}

// Accepts `Objects:`, `**Objects:**`, `**Objects**:` and `## Objects`.
fn is_objects_header(line: &str) -> bool {
    let stripped: String = line.chars().filter(|c| *c != '*' && *c != '#').collect();
    let stripped = stripped.trim();
    let stripped = stripped.strip_suffix(':').unwrap_or(stripped).trim_end();
    stripped.eq_ignore_ascii_case("objects")
}
