//! Recommendation contracts: the chat reply and the mood-to-songs lookup.
//!
//! Both take loosely typed user input, run the analyzer, and resolve the
//! recommended genres to concrete songs through a [`SongSource`].

use crate::analyzer::{AnalysisResult, MoodAnalyzer};
use crate::error::ServiceError;
use crate::lexicon::{Activity, Emotion, Genre};
use crate::response::ResponseGenerator;
use crate::text::UserInput;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Songs fetched per genre for a chat reply.
pub const CHAT_SONGS_PER_GENRE: usize = 5;
/// Songs returned by a chat reply at most.
pub const CHAT_MAX_SONGS: usize = 10;
/// Songs returned by a mood lookup when no limit is given.
pub const DEFAULT_MOOD_LIMIT: usize = 10;

const MESSAGE_REQUIRED: &str = "Message is required";
const MOOD_REQUIRED: &str = "Mood text is required";
const INVALID_LIMIT: &str = "Limit must be a non-negative integer";

/// Where songs for a genre come from.
pub trait SongSource {
    /// Up to `limit` non-empty songs of `genre`, in catalogue order.
    fn genre_songs(&self, genre: Genre, limit: usize) -> anyhow::Result<Vec<String>>;
}

/// The analysis part of a [`ChatReply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub emotions: Vec<Emotion>,
    pub activities: Vec<Activity>,
    pub confidence: f64,
}

impl From<&AnalysisResult> for AnalysisSummary {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            emotions: result.emotions.clone(),
            activities: result.activities.clone(),
            confidence: result.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub bot_message: String,
    pub recommended_songs: Vec<String>,
    pub genres: Vec<Genre>,
    pub follow_up: String,
    pub analysis: AnalysisSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSongs {
    pub songs: Vec<String>,
    pub detected_emotions: Vec<Emotion>,
    pub confidence: f64,
    pub recommended_genres: Vec<Genre>,
}

/// Body of a chat request. `message` stays a raw JSON value so that
/// `null` and non-string messages can be told apart from missing ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
}

/// Body of a mood lookup request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoodRequest {
    #[serde(default)]
    pub mood: Option<Value>,
    #[serde(default)]
    pub limit: Option<Value>,
}

impl MoodRequest {
    /// The requested limit, or [`DEFAULT_MOOD_LIMIT`] when absent or null.
    pub fn limit(&self) -> Result<usize, ServiceError> {
        match &self.limit {
            None | Some(Value::Null) => Ok(DEFAULT_MOOD_LIMIT),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or(ServiceError::InvalidInput(INVALID_LIMIT)),
            Some(_) => Err(ServiceError::InvalidInput(INVALID_LIMIT)),
        }
    }
}

fn push_unique(songs: &mut Vec<String>, seen: &mut HashSet<String>, batch: Vec<String>) {
    for song in batch {
        if seen.insert(song.clone()) {
            songs.push(song);
        }
    }
}

/// Text of `input` if it is a non-empty string.
fn required_text<'a>(input: UserInput<'a>, missing: &'static str) -> Result<&'a str, ServiceError> {
    input
        .as_text()
        .filter(|text| !text.is_empty())
        .ok_or(ServiceError::InvalidInput(missing))
}

/// Analyzer, reply generator and song source bundled together.
pub struct MoodService<S> {
    analyzer: MoodAnalyzer,
    responses: ResponseGenerator,
    songs: S,
}

impl<S: SongSource> MoodService<S> {
    pub fn new(analyzer: MoodAnalyzer, responses: ResponseGenerator, songs: S) -> Self {
        Self {
            analyzer,
            responses,
            songs,
        }
    }

    /// Chat reply for `message`.
    ///
    /// Songs are taken from the reply's genres, up to
    /// [`CHAT_SONGS_PER_GENRE`] each, duplicates dropped (first occurrence
    /// wins), at most [`CHAT_MAX_SONGS`] in total.
    pub fn chat<'a, R: Rng + ?Sized>(
        &self,
        message: impl Into<UserInput<'a>>,
        rng: &mut R,
    ) -> Result<ChatReply, ServiceError> {
        let text = required_text(message.into(), MESSAGE_REQUIRED)?;

        let analysis = self.analyzer.process_user_message(text);
        let envelope = self.responses.generate_response(&analysis, text, rng);

        let mut songs = Vec::new();
        let mut seen = HashSet::new();
        for &genre in &envelope.genres {
            let batch = self
                .songs
                .genre_songs(genre, CHAT_SONGS_PER_GENRE)
                .map_err(ServiceError::Catalogue)?;
            push_unique(&mut songs, &mut seen, batch);
        }
        songs.truncate(CHAT_MAX_SONGS);

        info!(
            "Chat reply with {} songs from genres {:?}",
            songs.len(),
            envelope.genres
        );

        Ok(ChatReply {
            bot_message: envelope.message,
            recommended_songs: songs,
            genres: envelope.genres,
            follow_up: envelope.follow_up.unwrap_or_default(),
            analysis: AnalysisSummary::from(&analysis),
        })
    }

    /// Songs matching the mood described by `mood`.
    ///
    /// Each recommended genre contributes up to `limit / genres + 2` songs.
    /// The pooled songs are deduplicated, shuffled with `rng` and cut to
    /// `limit`.
    pub fn songs_by_mood<'a, R: Rng + ?Sized>(
        &self,
        mood: impl Into<UserInput<'a>>,
        limit: Option<usize>,
        rng: &mut R,
    ) -> Result<MoodSongs, ServiceError> {
        let text = required_text(mood.into(), MOOD_REQUIRED)?;
        let limit = limit.unwrap_or(DEFAULT_MOOD_LIMIT);

        let analysis = self.analyzer.process_user_message(text);
        let genres = analysis.recommended_genres;
        let per_genre = (limit / genres.len().max(1)).saturating_add(2);
        debug!("Fetching {per_genre} songs for each of {} genres", genres.len());

        let mut songs = Vec::new();
        let mut seen = HashSet::new();
        for &genre in &genres {
            let batch = self
                .songs
                .genre_songs(genre, per_genre)
                .map_err(ServiceError::Catalogue)?;
            push_unique(&mut songs, &mut seen, batch);
        }

        songs.shuffle(rng);
        songs.truncate(limit);

        Ok(MoodSongs {
            songs,
            detected_emotions: analysis.emotions,
            confidence: analysis.confidence,
            recommended_genres: genres,
        })
    }

    /// [`MoodService::chat`] over a JSON request body.
    pub fn chat_from_json<R: Rng + ?Sized>(
        &self,
        body: &str,
        rng: &mut R,
    ) -> Result<ChatReply, ServiceError> {
        let request: ChatRequest = serde_json::from_str(body)
            .map_err(|_| ServiceError::InvalidInput(MESSAGE_REQUIRED))?;
        self.chat(request.message.as_ref(), rng)
    }

    /// [`MoodService::songs_by_mood`] over a JSON request body.
    pub fn songs_by_mood_from_json<R: Rng + ?Sized>(
        &self,
        body: &str,
        rng: &mut R,
    ) -> Result<MoodSongs, ServiceError> {
        let request: MoodRequest = serde_json::from_str(body)
            .map_err(|_| ServiceError::InvalidInput(MOOD_REQUIRED))?;
        let limit = request.limit()?;
        self.songs_by_mood(request.mood.as_ref(), Some(limit), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    /// Every genre holds `per_genre` songs named after the genre, plus any
    /// songs added explicitly.
    #[derive(Default)]
    struct MemorySource {
        songs: HashMap<Genre, Vec<String>>,
    }

    impl MemorySource {
        fn filled(per_genre: usize) -> Self {
            let songs = Genre::ALL
                .iter()
                .map(|genre| {
                    let list: Vec<String> = (1..=per_genre).map(|i| format!("{genre} #{i}")).collect();
                    (*genre, list)
                })
                .collect();
            Self { songs }
        }

        fn with(mut self, genre: Genre, songs: &[&str]) -> Self {
            self.songs
                .insert(genre, songs.iter().map(|s| (*s).to_string()).collect());
            self
        }
    }

    impl SongSource for MemorySource {
        fn genre_songs(&self, genre: Genre, limit: usize) -> anyhow::Result<Vec<String>> {
            Ok(self
                .songs
                .get(&genre)
                .map(|songs| songs.iter().take(limit).cloned().collect())
                .unwrap_or_default())
        }
    }

    struct FailingSource;

    impl SongSource for FailingSource {
        fn genre_songs(&self, _genre: Genre, _limit: usize) -> anyhow::Result<Vec<String>> {
            Err(anyhow!("database is locked"))
        }
    }

    fn service<S: SongSource>(songs: S) -> MoodService<S> {
        MoodService::new(
            MoodAnalyzer::with_builtin_lexicon().unwrap(),
            ResponseGenerator::default(),
            songs,
        )
    }

    #[test]
    fn test_chat_reply_shape() {
        let service = service(MemorySource::filled(8));
        let reply = service
            .chat("I'm feeling really sad today", &mut StepRng::new(0, 0))
            .unwrap();

        assert_eq!(
            reply.genres,
            vec![Genre::SadMusic, Genre::BluesMusic, Genre::MelancholyMusic]
        );
        assert_eq!(reply.recommended_songs.len(), CHAT_MAX_SONGS);
        assert_eq!(reply.recommended_songs[0], "sad_music #1");
        assert_eq!(reply.recommended_songs[5], "blues_music #1");
        assert!(reply.bot_message.contains("sad"));
        assert!(!reply.follow_up.is_empty());
        assert_eq!(reply.analysis.emotions, vec![Emotion::Sad]);
        assert!((reply.analysis.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_chat_deduplicates_songs() {
        let source = MemorySource::default()
            .with(Genre::SadMusic, &["Hurt", "Creep", "Hurt"])
            .with(Genre::BluesMusic, &["Creep", "The Thrill Is Gone"])
            .with(Genre::MelancholyMusic, &["Hurt"]);
        let reply = service(source)
            .chat("so sad", &mut StepRng::new(0, 0))
            .unwrap();

        assert_eq!(
            reply.recommended_songs,
            vec!["Hurt", "Creep", "The Thrill Is Gone"]
        );
    }

    #[test]
    fn test_chat_rejects_missing_message() {
        let service = service(MemorySource::filled(3));
        let mut rng = StepRng::new(0, 0);

        for input in [
            UserInput::from(""),
            UserInput::Missing,
            UserInput::NonText,
        ] {
            let err = service.chat(input, &mut rng).unwrap_err();
            assert!(err.is_client_error());
            assert_eq!(err.to_string(), "Message is required");
        }
    }

    #[test]
    fn test_chat_accepts_whitespace_message() {
        let service = service(MemorySource::filled(3));
        let reply = service.chat("   ", &mut StepRng::new(0, 0)).unwrap();

        assert_eq!(reply.analysis.emotions, vec![Emotion::Relaxed]);
        assert_eq!(reply.recommended_songs.len(), 9);
    }

    #[test]
    fn test_chat_from_json_bodies() {
        let service = service(MemorySource::filled(3));
        let mut rng = StepRng::new(0, 0);

        let reply = service
            .chat_from_json(r#"{"message": "party at the club tonight"}"#, &mut rng)
            .unwrap();
        assert_eq!(reply.analysis.emotions, vec![Emotion::Party]);
        assert_eq!(reply.analysis.activities, vec![Activity::Party]);

        for body in [r#"{}"#, r#"{"message": null}"#, r#"{"message": 123}"#, "not json"] {
            let err = service.chat_from_json(body, &mut rng).unwrap_err();
            assert!(err.is_client_error(), "{body}");
        }
    }

    #[test]
    fn test_songs_by_mood_limits_and_deduplicates() {
        let service = service(MemorySource::filled(20));
        let mut rng = StdRng::seed_from_u64(3);

        let result = service
            .songs_by_mood("Need some workout music for the gym", Some(6), &mut rng)
            .unwrap();

        assert_eq!(result.songs.len(), 6);
        let unique: HashSet<_> = result.songs.iter().collect();
        assert_eq!(unique.len(), result.songs.len());
        assert_eq!(result.detected_emotions, vec![Emotion::Energetic]);
        assert_eq!(result.recommended_genres[0], Genre::WorkoutMusic);
        for song in &result.songs {
            let genre = song.split(" #").next().unwrap().parse::<Genre>().unwrap();
            assert!(result.recommended_genres.contains(&genre));
        }
    }

    #[test]
    fn test_songs_by_mood_per_genre_quota() {
        let service = service(MemorySource::filled(50));
        // 100 / 3 + 2 = 35 songs from each of 3 genres, 105 pooled
        let result = service
            .songs_by_mood("so sad", Some(100), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(result.songs.len(), 100);

        // 10 / 3 + 2 = 5 each, 15 pooled
        let small = service
            .songs_by_mood("so sad", None, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(small.songs.len(), DEFAULT_MOOD_LIMIT);
    }

    #[test]
    fn test_songs_by_mood_shuffle_is_seeded() {
        let service = service(MemorySource::filled(20));
        let first = service
            .songs_by_mood("happy", Some(8), &mut StdRng::seed_from_u64(99))
            .unwrap();
        let second = service
            .songs_by_mood("happy", Some(8), &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_songs_by_mood_zero_limit() {
        let service = service(MemorySource::filled(5));
        let result = service
            .songs_by_mood("happy", Some(0), &mut StepRng::new(0, 0))
            .unwrap();
        assert!(result.songs.is_empty());
        assert_eq!(result.detected_emotions, vec![Emotion::Happy]);
    }

    #[test]
    fn test_songs_by_mood_from_json() {
        let service = service(MemorySource::filled(10));
        let mut rng = StepRng::new(0, 0);

        let result = service
            .songs_by_mood_from_json(r#"{"mood": "chill evening", "limit": 4}"#, &mut rng)
            .unwrap();
        assert_eq!(result.songs.len(), 4);
        assert_eq!(result.detected_emotions, vec![Emotion::Relaxed]);

        let defaulted = service
            .songs_by_mood_from_json(r#"{"mood": "chill evening", "limit": null}"#, &mut rng)
            .unwrap();
        assert_eq!(defaulted.songs.len(), DEFAULT_MOOD_LIMIT);

        let err = service
            .songs_by_mood_from_json(r#"{"mood": ""}"#, &mut rng)
            .unwrap_err();
        assert_eq!(err.to_string(), "Mood text is required");

        for body in [
            r#"{"mood": "happy", "limit": -1}"#,
            r#"{"mood": "happy", "limit": "ten"}"#,
            r#"{"mood": "happy", "limit": 2.5}"#,
        ] {
            let err = service.songs_by_mood_from_json(body, &mut rng).unwrap_err();
            assert!(err.is_client_error(), "{body}");
        }
    }

    #[test]
    fn test_catalogue_failure_is_a_server_error() {
        let service = service(FailingSource);
        let mut rng = StepRng::new(0, 0);

        let err = service.chat("so sad", &mut rng).unwrap_err();
        assert!(!err.is_client_error());
        assert!(matches!(err, ServiceError::Catalogue(_)));

        let err = service.songs_by_mood("so sad", None, &mut rng).unwrap_err();
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_punctuation_only_message_is_relaxed() {
        // No keywords and no scored words, so the neutral polarity picks relaxed.
        let service = service(MemorySource::filled(3));
        let reply = service.chat("???", &mut StepRng::new(0, 0)).unwrap();

        assert_eq!(reply.analysis.emotions, vec![Emotion::Relaxed]);
        assert!((reply.analysis.confidence - 0.5).abs() < 1e-9);
        assert_eq!(
            reply.genres,
            vec![Genre::FocusMusic, Genre::InstrumentalMusic, Genre::ClassicalMusic]
        );
        assert_eq!(reply.recommended_songs.len(), 9);
        assert_eq!(
            reply.follow_up,
            "Perfect for unwinding! Want something for background or active listening?"
        );
    }

    #[test]
    fn test_huge_limit_with_single_genre_does_not_overflow() {
        let mut lexicon = crate::lexicon::Lexicon::builtin();
        lexicon.emotion_genres.insert(Emotion::Sad, vec![Genre::SadMusic]);
        let analyzer =
            MoodAnalyzer::new(lexicon, Box::new(crate::sentiment::LexiconSentiment::default()))
                .unwrap();
        let service = MoodService::new(analyzer, ResponseGenerator::default(), MemorySource::filled(4));

        let result = service
            .songs_by_mood_from_json(
                r#"{"mood": "so sad", "limit": 18446744073709551615}"#,
                &mut StepRng::new(0, 0),
            )
            .unwrap();
        assert_eq!(result.recommended_genres, vec![Genre::SadMusic]);
        assert_eq!(result.songs.len(), 4);

        let direct = service
            .songs_by_mood("so sad", Some(usize::MAX), &mut StepRng::new(0, 0))
            .unwrap();
        assert_eq!(direct.songs.len(), 4);
    }
}
