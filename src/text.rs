//! Text normalization and whole-word keyword matching.

use regex::{Match, Regex};
use serde_json::Value;

/// Raw user input as it arrives from a caller.
///
/// Request bodies are loosely typed, so a "message" may be missing, `null`,
/// or not a string at all. All of those normalize to empty text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput<'a> {
    Text(&'a str),
    Missing,
    NonText,
}

impl<'a> UserInput<'a> {
    /// The text, if the input is a string.
    #[must_use]
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            UserInput::Text(text) => Some(text),
            UserInput::Missing | UserInput::NonText => None,
        }
    }
}

impl<'a> From<&'a str> for UserInput<'a> {
    fn from(text: &'a str) -> Self {
        UserInput::Text(text)
    }
}

impl<'a> From<&'a String> for UserInput<'a> {
    fn from(text: &'a String) -> Self {
        UserInput::Text(text)
    }
}

impl<'a> From<Option<&'a str>> for UserInput<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(UserInput::Missing, UserInput::Text)
    }
}

impl<'a> From<&'a Value> for UserInput<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(text) => UserInput::Text(text),
            Value::Null => UserInput::Missing,
            _ => UserInput::NonText,
        }
    }
}

impl<'a> From<Option<&'a Value>> for UserInput<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        value.map_or(UserInput::Missing, UserInput::from)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lower-case `text`, turn punctuation into spaces and collapse whitespace.
///
/// Apostrophes survive only between two word characters ("i'm", "don't");
/// quotes around a word are stripped. `’` counts as an apostrophe.
#[must_use]
pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text
        .to_lowercase()
        .chars()
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .collect();

    let mut cleaned = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        let keep = if c == '\'' {
            let before = i.checked_sub(1).and_then(|j| chars.get(j));
            let after = chars.get(i + 1);
            matches!((before, after), (Some(&b), Some(&a)) if is_word_char(b) && is_word_char(a))
        } else {
            is_word_char(c)
        };
        cleaned.push(if keep { c } else { ' ' });
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Matches any of a fixed set of keywords as whole words.
///
/// Keywords are normalized like input text, so "Night  Out!" and
/// "night out" are the same keyword. Longer keywords are tried first, so
/// "work out" wins over "work" at the same position. An empty keyword set
/// never matches.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    pattern: Option<Regex>,
}

impl WordMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, regex::Error> {
        let mut normalized: Vec<String> = keywords
            .iter()
            .map(|keyword| normalize(keyword.as_ref()))
            .filter(|keyword| !keyword.is_empty())
            .collect();
        normalized.sort_by(|a, b| b.len().cmp(&a.len()));
        let alternatives: Vec<String> = normalized.iter().map(|k| regex::escape(k)).collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// First keyword found in already-normalized `text`.
    #[must_use]
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .as_ref()
            .and_then(|pattern| pattern.find(text))
            .map(|m| m.as_str())
    }

    /// Every non-overlapping keyword occurrence in already-normalized `text`.
    pub fn find_all<'s, 't: 's>(&'s self, text: &'t str) -> impl Iterator<Item = Match<'t>> + 's {
        self.pattern
            .iter()
            .flat_map(move |pattern| pattern.find_iter(text))
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  I'm   Feeling\tSAD\n today "), "i'm feeling sad today");
    }

    #[test]
    fn test_normalize_replaces_punctuation_with_spaces() {
        assert_eq!(normalize("party!!!time,now...ok?"), "party time now ok");
        assert_eq!(normalize("rock&roll / jazz-fusion"), "rock roll jazz fusion");
    }

    #[test]
    fn test_normalize_keeps_contractions_only() {
        assert_eq!(normalize("Don't stop, I can’t"), "don't stop i can't");
        assert_eq!(normalize("'sad' songs"), "sad songs");
        assert_eq!(normalize("rock 'n' roll"), "rock n roll");
    }

    #[test]
    fn test_normalize_empty_and_symbol_only_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!... ---"), "");
    }

    #[test]
    fn test_normalize_keeps_underscores_and_unicode_letters() {
        assert_eq!(normalize("Café_Music ÉTÉ"), "café_music été");
    }

    #[test]
    fn test_user_input_from_json_values() {
        assert_eq!(UserInput::from(&json!("hi")), UserInput::Text("hi"));
        assert_eq!(UserInput::from(&json!(null)), UserInput::Missing);
        assert_eq!(UserInput::from(&json!(123)), UserInput::NonText);
        assert_eq!(UserInput::from(&json!(["sad"])), UserInput::NonText);

        let body = json!({"other": 1});
        assert_eq!(UserInput::from(body.get("message")), UserInput::Missing);
        assert_eq!(UserInput::from(None::<&str>), UserInput::Missing);
    }

    #[test]
    fn test_word_matcher_respects_word_boundaries() {
        let matcher = WordMatcher::new(&["cat", "low"]).unwrap();

        assert!(matcher.is_match("the cat sleeps"));
        assert!(!matcher.is_match("pick a category"));
        assert!(!matcher.is_match("slowly does it"));
        assert!(matcher.is_match("feeling low"));
    }

    #[test]
    fn test_word_matcher_handles_phrases() {
        let matcher = WordMatcher::new(&["Night Out", "beast mode"]).unwrap();

        assert_eq!(matcher.find("planning a night out tonight"), Some("night out"));
        assert!(matcher.is_match("full beast mode"));
        assert!(!matcher.is_match("beast modes"));
    }

    #[test]
    fn test_word_matcher_prefers_longer_keywords() {
        let matcher = WordMatcher::new(&["work", "work out"]).unwrap();
        assert_eq!(matcher.find("time to work out"), Some("work out"));

        let spans: Vec<(usize, usize)> = matcher
            .find_all("work then work out")
            .map(|m| (m.start(), m.end()))
            .collect();
        assert_eq!(spans, vec![(0, 4), (10, 18)]);
    }

    #[test]
    fn test_word_matcher_escapes_regex_metacharacters() {
        let matcher = WordMatcher::new(&["r.b"]).unwrap();
        // Keywords are normalized, so the dot becomes a word break.
        assert!(matcher.is_match("r b"));
        assert!(!matcher.is_match("rnb"));
    }

    #[test]
    fn test_empty_word_matcher_never_matches() {
        let matcher = WordMatcher::new::<&str>(&[]).unwrap();
        assert!(!matcher.is_match("anything at all"));
        assert!(!matcher.is_match(""));

        let blank = WordMatcher::new(&["", "  ", "!!"]).unwrap();
        assert!(!blank.is_match("anything"));
    }
}
