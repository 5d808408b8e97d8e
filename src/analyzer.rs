//! Mood analysis: text in, emotions/activities/genres out.
//!
//! The pipeline is normalize → detect emotions (keywords, then sentiment
//! fallback) → detect activities → rank genres → score confidence. A
//! [`MoodAnalyzer`] is immutable once built and can be shared freely across
//! threads.

use crate::error::{AnalysisError, LexiconError};
use crate::lexicon::{Activity, Emotion, Genre, Lexicon};
use crate::sentiment::{LexiconSentiment, SentimentAnalyzer};
use crate::text::{normalize, UserInput, WordMatcher};
use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Genres recommended when nothing was detected.
pub const DEFAULT_GENRES: [Genre; 3] = [
    Genre::TrendingMusic,
    Genre::TopMusic,
    Genre::DevelopersChoiceMusic,
];

/// Upper bound on recommended genres.
pub const MAX_GENRES: usize = 5;

/// Polarity above which the fallback picks `happy`, and below whose
/// negation it picks `sad`.
pub const POLARITY_THRESHOLD: f64 = 0.2;

/// Confidence reported by the fallback result.
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

const BASE_CONFIDENCE: f64 = 0.3;
const EMOTION_WEIGHT: f64 = 0.2;
const ACTIVITY_WEIGHT: f64 = 0.15;

/// Outcome of analysing one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub emotions: Vec<Emotion>,
    pub activities: Vec<Activity>,
    pub recommended_genres: Vec<Genre>,
    pub confidence: f64,
}

impl AnalysisResult {
    /// Result used for empty input and for any internal failure.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            emotions: Vec::new(),
            activities: Vec::new(),
            recommended_genres: DEFAULT_GENRES.to_vec(),
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}

/// `0.3 + 0.2 per emotion + 0.15 per activity`, capped at 1.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn confidence(emotions: usize, activities: usize) -> f64 {
    (BASE_CONFIDENCE + EMOTION_WEIGHT * emotions as f64 + ACTIVITY_WEIGHT * activities as f64)
        .min(1.0)
}

/// Rank genres by how often they occur, most frequent first.
///
/// Ties keep first-seen order. Returns at most [`MAX_GENRES`] entries, or
/// [`DEFAULT_GENRES`] when `genres` is empty.
#[must_use]
pub fn rank_genres<I: IntoIterator<Item = Genre>>(genres: I) -> Vec<Genre> {
    let mut counts: Vec<(Genre, usize)> = Vec::new();
    for genre in genres {
        match counts.iter_mut().find(|(seen, _)| *seen == genre) {
            Some((_, count)) => *count += 1,
            None => counts.push((genre, 1)),
        }
    }

    if counts.is_empty() {
        return DEFAULT_GENRES.to_vec();
    }

    // `sort_by` is stable, so equal counts stay in first-seen order.
    counts.sort_by(|(_, a), (_, b)| b.cmp(a));
    counts
        .into_iter()
        .take(MAX_GENRES)
        .map(|(genre, _)| genre)
        .collect()
}

/// Rule-based mood classifier and genre recommender.
pub struct MoodAnalyzer {
    lexicon: Lexicon,
    emotion_matchers: Vec<(Emotion, WordMatcher)>,
    activity_matchers: Vec<(Activity, WordMatcher)>,
    /// Every multi-word keyword of either table.
    phrases: WordMatcher,
    sentiment: Box<dyn SentimentAnalyzer>,
}

impl std::fmt::Debug for MoodAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoodAnalyzer")
            .field("emotions", &self.emotion_matchers.len())
            .field("activities", &self.activity_matchers.len())
            .finish_non_exhaustive()
    }
}

impl MoodAnalyzer {
    /// Compile `lexicon` into keyword matchers.
    pub fn new(lexicon: Lexicon, sentiment: Box<dyn SentimentAnalyzer>) -> Result<Self, LexiconError> {
        let emotion_matchers = lexicon
            .emotion_keywords
            .iter()
            .map(|(emotion, keywords)| {
                WordMatcher::new(keywords)
                    .map(|matcher| (*emotion, matcher))
                    .map_err(|source| LexiconError::Pattern {
                        label: emotion.as_str(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let activity_matchers = lexicon
            .activity_keywords
            .iter()
            .map(|(activity, keywords)| {
                WordMatcher::new(keywords)
                    .map(|matcher| (*activity, matcher))
                    .map_err(|source| LexiconError::Pattern {
                        label: activity.as_str(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let phrase_keywords: Vec<&String> = lexicon
            .emotion_keywords
            .values()
            .chain(lexicon.activity_keywords.values())
            .flatten()
            .filter(|keyword| normalize(keyword).contains(' '))
            .collect();
        let phrases = WordMatcher::new(&phrase_keywords).map_err(|source| LexiconError::Pattern {
            label: "phrases",
            source,
        })?;

        debug!(
            "Mood analyzer ready: {} emotion and {} activity matchers",
            emotion_matchers.len(),
            activity_matchers.len()
        );

        Ok(Self {
            lexicon,
            emotion_matchers,
            activity_matchers,
            phrases,
            sentiment,
        })
    }

    /// Analyzer over the built-in lexicon and word-list sentiment.
    pub fn with_builtin_lexicon() -> Result<Self, LexiconError> {
        Self::new(Lexicon::builtin(), Box::new(LexiconSentiment::default()))
    }

    /// Emotions present in `text`, in lexicon order.
    ///
    /// Falls back to a sentiment-derived emotion when no keyword matches,
    /// so non-empty text always yields at least one emotion, even text that
    /// is only whitespace or punctuation. Empty text yields none.
    #[must_use]
    pub fn detect_emotions(&self, text: &str) -> Vec<Emotion> {
        if text.is_empty() {
            return Vec::new();
        }
        self.emotions_in(text, &normalize(text))
    }

    /// Activities present in `text`, in lexicon order. No fallback.
    #[must_use]
    pub fn detect_activities(&self, text: &str) -> Vec<Activity> {
        self.activities_in(&normalize(text))
    }

    /// Spans of multi-word keywords in `normalized`.
    fn phrase_spans(&self, normalized: &str) -> Vec<Range<usize>> {
        self.phrases.find_all(normalized).map(|m| m.range()).collect()
    }

    /// First keyword of `matcher` that is not part of a longer phrase.
    fn keyword_hit<'t>(
        matcher: &WordMatcher,
        normalized: &'t str,
        phrases: &[Range<usize>],
    ) -> Option<&'t str> {
        matcher
            .find_all(normalized)
            .find(|hit| {
                !phrases.iter().any(|phrase| {
                    phrase.start <= hit.start()
                        && hit.end() <= phrase.end
                        && phrase.len() > hit.range().len()
                })
            })
            .map(|hit| hit.as_str())
    }

    fn emotions_in(&self, original: &str, normalized: &str) -> Vec<Emotion> {
        let phrases = self.phrase_spans(normalized);
        let detected: Vec<Emotion> = self
            .emotion_matchers
            .iter()
            .filter_map(|(emotion, matcher)| {
                Self::keyword_hit(matcher, normalized, &phrases).map(|keyword| {
                    trace!("Keyword `{keyword}` -> {emotion}");
                    *emotion
                })
            })
            .collect();

        if !detected.is_empty() {
            return detected;
        }

        vec![self.sentiment_fallback(original)]
    }

    fn activities_in(&self, normalized: &str) -> Vec<Activity> {
        let phrases = self.phrase_spans(normalized);
        self.activity_matchers
            .iter()
            .filter_map(|(activity, matcher)| {
                Self::keyword_hit(matcher, normalized, &phrases).map(|keyword| {
                    trace!("Keyword `{keyword}` -> {activity}");
                    *activity
                })
            })
            .collect()
    }

    fn sentiment_fallback(&self, original: &str) -> Emotion {
        match self.sentiment.polarity(original) {
            Ok(polarity) if polarity > POLARITY_THRESHOLD => Emotion::Happy,
            Ok(polarity) if polarity < -POLARITY_THRESHOLD => Emotion::Sad,
            Ok(polarity) => {
                debug!("Neutral polarity {polarity:.3}, assuming relaxed");
                Emotion::Relaxed
            }
            Err(err) => {
                warn!("Sentiment fallback degraded to relaxed: {err}");
                Emotion::Relaxed
            }
        }
    }

    /// Genres for the detected tags, ranked by frequency.
    ///
    /// Each emotion contributes its whole genre list, then each activity
    /// does. A tag the lexicon has no genre list for is an error.
    pub fn recommend_genres(
        &self,
        emotions: &[Emotion],
        activities: &[Activity],
    ) -> Result<Vec<Genre>, AnalysisError> {
        let mut pooled: Vec<Genre> = Vec::new();

        for &emotion in emotions {
            let genres = self
                .lexicon
                .genres_for_emotion(emotion)
                .ok_or(AnalysisError::MissingGenreMapping(emotion.as_str()))?;
            pooled.extend_from_slice(genres);
        }
        for &activity in activities {
            let genres = self
                .lexicon
                .genres_for_activity(activity)
                .ok_or(AnalysisError::MissingGenreMapping(activity.as_str()))?;
            pooled.extend_from_slice(genres);
        }

        Ok(rank_genres(pooled))
    }

    /// Full analysis of already-present text, surfacing internal errors.
    pub fn try_process(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        if text.is_empty() {
            return Ok(AnalysisResult::fallback());
        }
        let normalized = normalize(text);

        let emotions = self.emotions_in(text, &normalized);
        let activities = self.activities_in(&normalized);
        let recommended_genres = self.recommend_genres(&emotions, &activities)?;
        let confidence = confidence(emotions.len(), activities.len());

        debug!(
            "Analysed message: emotions={emotions:?} activities={activities:?} genres={recommended_genres:?} confidence={confidence:.2}"
        );

        Ok(AnalysisResult {
            emotions,
            activities,
            recommended_genres,
            confidence,
        })
    }

    /// Analyse one message. Never fails.
    ///
    /// Missing, non-text and empty input, as well as any internal failure,
    /// produce [`AnalysisResult::fallback`].
    pub fn process_user_message<'a>(&self, input: impl Into<UserInput<'a>>) -> AnalysisResult {
        let input: UserInput<'a> = input.into();
        let Some(text) = input.as_text() else {
            debug!("No text to analyse, using fallback result");
            return AnalysisResult::fallback();
        };

        self.try_process(text).unwrap_or_else(|err| {
            warn!("Analysis degraded to fallback result: {err}");
            AnalysisResult::fallback()
        })
    }

    /// Analyse many messages in parallel. Output order matches input order.
    #[must_use]
    pub fn process_batch<S: AsRef<str> + Sync>(&self, messages: &[S]) -> Vec<AnalysisResult> {
        messages
            .par_iter()
            .map(|message| self.process_user_message(message.as_ref()))
            .collect()
    }
}
