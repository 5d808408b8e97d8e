//! Conversational replies built from an [`AnalysisResult`].

use crate::analyzer::{AnalysisResult, DEFAULT_GENRES};
use crate::error::AnalysisError;
use crate::lexicon::{Emotion, Genre};
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How many genres a reply carries at most.
pub const REPLY_GENRES: usize = 3;

const EMOTIONS_PLACEHOLDER: &str = "{emotions}";

const NO_EMOTION_MESSAGE: &str = "I'd love to help you find the perfect music! Could you tell me more about how you're feeling or what you're doing?";
const NO_EMOTION_FOLLOW_UP: &str = "What's your mood like today?";

const GENERIC_MESSAGE: &str = "I'm here to help you find great music! What are you in the mood for?";
const GENERIC_FOLLOW_UP: &str = "Tell me about your current mood or what you're doing.";

/// Follow-up used when the primary emotion has no entry of its own.
pub const DEFAULT_FOLLOW_UP: &str =
    "How do these recommendations sound? I can adjust based on your feedback!";

const DEFAULT_TEMPLATES: &[&str] = &[
    "I can sense you're feeling {emotions}. Here are some songs that might resonate with your mood:",
    "Based on your {emotions} vibe, I've found some perfect matches:",
    "Feeling {emotions}? These songs should hit the right note:",
];

lazy_static::lazy_static! {
    static ref FOLLOW_UPS: Vec<(Emotion, &'static str)> = vec![
        (Emotion::Sad, "Would you like something to help you process these feelings, or perhaps something to lift your spirits?"),
        (Emotion::Happy, "Should I find more upbeat tracks to keep this energy going?"),
        (Emotion::Romantic, "Are you looking for something for a special someone or just feeling the love?"),
        (Emotion::Energetic, "Need something for a workout or just want to keep the energy high?"),
        (Emotion::Relaxed, "Perfect for unwinding! Want something for background or active listening?"),
        (Emotion::Motivated, "Looking for something to keep you driven and focused?"),
        (Emotion::Party, "Ready to get the party started? Want some dance-worthy tracks?"),
        (Emotion::Nostalgic, "Want to take a trip down memory lane with some classic vibes?"),
        (Emotion::Melancholy, "Sometimes introspective music hits just right. Want something thoughtful?"),
        (Emotion::Focus, "Need some background music that won't distract from your tasks?"),
    ];
}

/// Reply to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub message: String,
    pub genres: Vec<Genre>,
    pub follow_up: Option<String>,
}

impl ResponseEnvelope {
    /// Envelope used when reply generation itself failed.
    #[must_use]
    pub fn generic() -> Self {
        Self {
            message: GENERIC_MESSAGE.to_string(),
            genres: DEFAULT_GENRES.to_vec(),
            follow_up: Some(GENERIC_FOLLOW_UP.to_string()),
        }
    }
}

/// Join emotion names the way a person would say them.
///
/// `["sad"]` → `"sad"`, `["sad", "happy"]` → `"sad and happy"`, three or
/// more use a serial comma. An empty list reads as `"neutral"`.
#[must_use]
pub fn format_emotions<S: AsRef<str>>(emotions: &[S]) -> String {
    match emotions {
        [] => "neutral".to_string(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|emotion| emotion.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Follow-up question for the first (primary) emotion.
#[must_use]
pub fn follow_up(emotions: &[Emotion]) -> &'static str {
    emotions
        .first()
        .and_then(|primary| {
            FOLLOW_UPS
                .iter()
                .find(|(emotion, _)| emotion == primary)
                .map(|(_, text)| *text)
        })
        .unwrap_or(DEFAULT_FOLLOW_UP)
}

/// Template-based reply builder.
///
/// Templates contain an `{emotions}` placeholder which is replaced by the
/// formatted emotion list.
#[derive(Debug, Clone)]
pub struct ResponseGenerator {
    templates: Vec<String>,
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATES.iter().map(|t| (*t).to_string()).collect())
    }
}

impl ResponseGenerator {
    #[must_use]
    pub fn new(templates: Vec<String>) -> Self {
        Self { templates }
    }

    /// Build the reply for `analysis`. Never fails.
    ///
    /// `rng` picks the message template.
    pub fn generate_response<R: Rng + ?Sized>(
        &self,
        analysis: &AnalysisResult,
        _original_text: &str,
        rng: &mut R,
    ) -> ResponseEnvelope {
        self.try_generate(analysis, rng).unwrap_or_else(|err| {
            warn!("Reply generation degraded to generic envelope: {err}");
            ResponseEnvelope::generic()
        })
    }

    pub fn try_generate<R: Rng + ?Sized>(
        &self,
        analysis: &AnalysisResult,
        rng: &mut R,
    ) -> Result<ResponseEnvelope, AnalysisError> {
        if analysis.emotions.is_empty() {
            let genres = if analysis.recommended_genres.is_empty() {
                DEFAULT_GENRES.to_vec()
            } else {
                top_genres(&analysis.recommended_genres)
            };
            return Ok(ResponseEnvelope {
                message: NO_EMOTION_MESSAGE.to_string(),
                genres,
                follow_up: Some(NO_EMOTION_FOLLOW_UP.to_string()),
            });
        }

        let template = self.templates.choose(rng).ok_or(AnalysisError::NoTemplates)?;
        let message = template.replace(EMOTIONS_PLACEHOLDER, &format_emotions(&analysis.emotions));

        Ok(ResponseEnvelope {
            message,
            genres: top_genres(&analysis.recommended_genres),
            follow_up: Some(follow_up(&analysis.emotions).to_string()),
        })
    }
}

fn top_genres(genres: &[Genre]) -> Vec<Genre> {
    genres.iter().take(REPLY_GENRES).copied().collect()
}
