//! Location extraction from free-form weather questions.

use std::sync::LazyLock;

use regex::Regex;

/// Phrasings tried in order; the first capture wins.
static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:what(?:'s| is)?\s+the\s+(?:weather|temperature|forecast|climate))(?:\s+(?:like|going to be|for))?\s+(?:in|at|for)\s+([\w\s,]+)(?:\?|\.)?$",
        r"how(?:'s| is)?\s+the\s+(?:weather|temperature)(?:\s+(?:like|going to be))?\s+(?:in|at|for)\s+([\w\s,]+)(?:\?|\.)?$",
        r"(?:current|today(?:'s)?)\s+(?:weather|temperature|forecast)(?:\s+(?:in|at|for))?\s+([\w\s,]+)(?:\?|\.)?$",
        r"(?:weather|temperature|forecast)(?:\s+in|\s+for|\s+at)?\s+([\w\s,]+)(?:\?|\.)?$",
        r"([\w\s,]+)\s+(?:weather|temperature|forecast|climate)(?:\?|\.)?$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("location regex is valid"))
    .collect()
});

static TRAILING_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?!.,]$").expect("trailing punctuation regex is valid"));

const FILLER_PHRASES: [&str; 28] = [
    "what is the current",
    "what's the current",
    "what is the",
    "what's the",
    "how is the",
    "how's the",
    "current",
    "today's",
    "today",
    "weather in",
    "weather for",
    "weather at",
    "weather",
    "temperature in",
    "temperature for",
    "temperature at",
    "temperature",
    "forecast in",
    "forecast for",
    "forecast at",
    "forecast",
    "climate in",
    "climate for",
    "climate at",
    "climate",
    "like in",
    "like at",
    "going to be in",
];

const WEATHER_KEYWORDS: [&str; 4] = ["weather", "temperature", "forecast", "climate"];

fn strip_trailing_punct(text: &str) -> String {
    TRAILING_PUNCT_RE.replace(text, "").trim().to_string()
}

/// Pulls a place name out of a weather question.
///
/// The result is lower-cased. Anything of length one or less should be
/// treated as "no location" (see [`is_plausible_location`]).
pub fn extract_location(message: &str) -> String {
    let text = message.to_lowercase();
    let text = text.trim();

    for pattern in LOCATION_PATTERNS.iter() {
        if let Some(group) = pattern.captures(text).and_then(|c| c.get(1)) {
            return strip_trailing_punct(group.as_str().trim());
        }
    }

    let mut fillers = FILLER_PHRASES.to_vec();
    fillers.sort_by_key(|f| std::cmp::Reverse(f.len()));

    let mut remainder = text.to_string();
    for filler in fillers {
        remainder = remainder.replace(filler, "");
    }
    strip_trailing_punct(remainder.trim())
}

/// Returns true when an extracted location is worth a direct lookup.
pub fn is_plausible_location(location: &str) -> bool {
    location.chars().count() > 1
}

/// Keyword test for weather intent.
///
/// This is a plain substring check: "I don't care about the weather" counts.
pub fn is_weather_query(message: &str) -> bool {
    let text = message.to_lowercase();
    WEATHER_KEYWORDS.iter().any(|k| text.contains(k))
}
