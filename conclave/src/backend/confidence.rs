//! Heuristic confidence scraping from free-text replies.
//!
//! Patterns are tried in priority order: Russian label, English label,
//! Russian suffix form, English suffix form. The first pattern that yields a
//! value within 0–100 wins. No match means no confidence.

use once_cell::sync::Lazy;
use regex::Regex;

// Label forms allow markdown emphasis between the label and the number,
// e.g. "**Confidence:** 85%".
static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)уверенность[\s:*_]+(\d+(?:[.,]\d+)?)\s*%",
        r"(?i)confidence[\s:*_]+(\d+(?:[.,]\d+)?)\s*%",
        r"(?i)(\d+(?:[.,]\d+)?)\s*%\s+уверенност",
        r"(?i)(\d+(?:[.,]\d+)?)\s*%\s+confiden",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

pub fn extract_confidence(text: &str) -> Option<f64> {
    PATTERNS.iter().find_map(|re| {
        re.captures_iter(text).find_map(|caps| {
            let value: f64 = caps[1].replace(',', ".").parse().ok()?;
            (0.0..=100.0).contains(&value).then_some(value)
        })
    })
}
