//! Polarity estimation for the emotion fallback.
//!
//! Keyword-weighted and fast: no model, no I/O. Each known word carries a
//! polarity in [-1, 1]; a preceding intensifier scales it and a preceding
//! negation flips and halves it. The text's polarity is the mean over the
//! words that carried one.

use crate::error::AnalysisError;
use std::collections::HashMap;

/// Estimates how positive or negative a piece of text is.
pub trait SentimentAnalyzer: Send + Sync {
    /// Polarity in [-1.0, 1.0]; 0.0 for neutral or unknown text.
    fn polarity(&self, text: &str) -> Result<f64, AnalysisError>;
}

const POLARITY_WORDS: &[(&str, f64)] = &[
    // positive
    ("good", 0.7),
    ("great", 0.8),
    ("nice", 0.6),
    ("lovely", 0.5),
    ("pleasant", 0.73),
    ("fantastic", 0.4),
    ("wonderful", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("excellent", 1.0),
    ("perfect", 1.0),
    ("beautiful", 0.85),
    ("brilliant", 0.9),
    ("best", 1.0),
    ("better", 0.5),
    ("fun", 0.3),
    ("funny", 0.25),
    ("glad", 0.5),
    ("happy", 0.8),
    ("joy", 0.8),
    ("love", 0.5),
    ("loved", 0.7),
    ("like", 0.2),
    ("enjoy", 0.4),
    ("enjoying", 0.4),
    ("cool", 0.35),
    ("fine", 0.4),
    ("fresh", 0.3),
    ("sunny", 0.4),
    ("bright", 0.7),
    ("warm", 0.6),
    ("cozy", 0.5),
    ("calm", 0.3),
    ("peaceful", 0.5),
    ("exciting", 0.3),
    ("incredible", 0.9),
    ("superb", 1.0),
    ("delightful", 1.0),
    ("thanks", 0.2),
    ("yay", 0.8),
    // negative
    ("bad", -0.7),
    ("awful", -1.0),
    ("terrible", -1.0),
    ("horrible", -1.0),
    ("dreadful", -1.0),
    ("worst", -1.0),
    ("worse", -0.4),
    ("sad", -0.5),
    ("unhappy", -0.6),
    ("angry", -0.5),
    ("annoyed", -0.4),
    ("annoying", -0.8),
    ("boring", -1.0),
    ("bored", -0.5),
    ("tired", -0.4),
    ("exhausted", -0.5),
    ("stressed", -0.6),
    ("anxious", -0.25),
    ("worried", -0.4),
    ("hate", -0.8),
    ("ugly", -0.7),
    ("lonely", -0.5),
    ("miserable", -1.0),
    ("painful", -0.7),
    ("sick", -0.7),
    ("rainy", -0.2),
    ("cold", -0.6),
    ("dark", -0.15),
    ("gloomy", -0.7),
    ("frustrated", -0.7),
    ("frustrating", -0.7),
    ("disappointing", -0.6),
    ("disappointed", -0.75),
    ("stupid", -0.8),
    ("wrong", -0.5),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.2),
    ("so", 1.2),
    ("super", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("absolutely", 1.4),
    ("totally", 1.2),
    ("quite", 1.1),
    ("pretty", 1.1),
    ("slightly", 0.6),
    ("somewhat", 0.7),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "hardly", "don't", "doesn't", "didn't", "isn't",
    "wasn't", "aren't", "can't", "won't", "ain't",
];

/// How many tokens back a negation still applies.
const NEGATION_WINDOW: usize = 2;

/// Word-list polarity estimator.
#[derive(Debug, Clone)]
pub struct LexiconSentiment {
    words: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self {
            words: POLARITY_WORDS.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|token| {
            token
                .trim_matches(|c: char| c == '\'' || c == '\u{2019}')
                .replace('\u{2019}', "'")
        })
        .filter(|token| !token.is_empty())
        .collect()
}

impl LexiconSentiment {
    fn score_token(&self, tokens: &[String], index: usize) -> Option<f64> {
        let base = *self.words.get(tokens[index].as_str())?;

        let intensity = index
            .checked_sub(1)
            .and_then(|prev| self.intensifiers.get(tokens[prev].as_str()))
            .copied()
            .unwrap_or(1.0);

        let negated = tokens[index.saturating_sub(NEGATION_WINDOW)..index]
            .iter()
            .any(|token| NEGATIONS.contains(&token.as_str()));

        let score = (base * intensity).clamp(-1.0, 1.0);
        Some(if negated { score * -0.5 } else { score })
    }
}

impl SentimentAnalyzer for LexiconSentiment {
    fn polarity(&self, text: &str) -> Result<f64, AnalysisError> {
        let tokens = tokenize(text);
        let scores: Vec<f64> = (0..tokens.len())
            .filter_map(|i| self.score_token(&tokens, i))
            .collect();

        if scores.is_empty() {
            return Ok(0.0);
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        log::trace!("Polarity {mean:.3} from {} scored words", scores.len());
        Ok(mean.clamp(-1.0, 1.0))
    }
}
