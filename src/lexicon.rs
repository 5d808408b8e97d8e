//! # Lexicon Module
//!
//! Closed label sets (emotions, activities, catalogue genres) and the
//! immutable keyword/genre tables the analyzer works from.
//!
//! Every table is keyed by an enum, so a lexicon can never name a genre the
//! catalogue does not have. The built-in tables live in process-wide
//! read-only statics; a lexicon can also be loaded from a JSON file with the
//! same shape as [`Lexicon`]'s serialized form.

use crate::error::{GenreParseError, LexiconError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Mood categories the analyzer can detect.
///
/// Declaration order is the canonical lexicon order: detected emotions are
/// always reported in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Sad,
    Happy,
    Romantic,
    Energetic,
    Relaxed,
    Nostalgic,
    Motivated,
    Party,
    Melancholy,
    Focus,
}

impl Emotion {
    pub const ALL: [Emotion; 10] = [
        Emotion::Sad,
        Emotion::Happy,
        Emotion::Romantic,
        Emotion::Energetic,
        Emotion::Relaxed,
        Emotion::Nostalgic,
        Emotion::Motivated,
        Emotion::Party,
        Emotion::Melancholy,
        Emotion::Focus,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Emotion::Sad => "sad",
            Emotion::Happy => "happy",
            Emotion::Romantic => "romantic",
            Emotion::Energetic => "energetic",
            Emotion::Relaxed => "relaxed",
            Emotion::Nostalgic => "nostalgic",
            Emotion::Motivated => "motivated",
            Emotion::Party => "party",
            Emotion::Melancholy => "melancholy",
            Emotion::Focus => "focus",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Emotion {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Contextual activities mentioned alongside a mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Workout,
    Study,
    Party,
    Driving,
    Cooking,
    Cleaning,
    Sleeping,
    Working,
}

impl Activity {
    pub const ALL: [Activity; 8] = [
        Activity::Workout,
        Activity::Study,
        Activity::Party,
        Activity::Driving,
        Activity::Cooking,
        Activity::Cleaning,
        Activity::Sleeping,
        Activity::Working,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Activity::Workout => "workout",
            Activity::Study => "study",
            Activity::Party => "party",
            Activity::Driving => "driving",
            Activity::Cooking => "cooking",
            Activity::Cleaning => "cleaning",
            Activity::Sleeping => "sleeping",
            Activity::Working => "working",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A genre bucket of the song catalogue. Each variant is one column of the
/// `music_recommendations` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    SadMusic,
    RomanticMusic,
    PartyMusic,
    HappyMusic,
    MelancholyMusic,
    FocusMusic,
    InstrumentalMusic,
    KPopMusic,
    ElectronicMusic,
    RnbMusic,
    BluesMusic,
    PersonalFav,
    NativeMusic,
    ClassicalMusic,
    WorkoutMusic,
    RockMusic,
    RapMusic,
    PopMusic,
    JazzMusic,
    MotivationalMusic,
    TrendingMusic,
    LatestMusic,
    TopMusic,
    HiddenGemsMusic,
    DevelopersChoiceMusic,
}

impl Genre {
    /// Every catalogue column, in table order.
    pub const ALL: [Genre; 25] = [
        Genre::SadMusic,
        Genre::RomanticMusic,
        Genre::PartyMusic,
        Genre::HappyMusic,
        Genre::MelancholyMusic,
        Genre::FocusMusic,
        Genre::InstrumentalMusic,
        Genre::KPopMusic,
        Genre::ElectronicMusic,
        Genre::RnbMusic,
        Genre::BluesMusic,
        Genre::PersonalFav,
        Genre::NativeMusic,
        Genre::ClassicalMusic,
        Genre::WorkoutMusic,
        Genre::RockMusic,
        Genre::RapMusic,
        Genre::PopMusic,
        Genre::JazzMusic,
        Genre::MotivationalMusic,
        Genre::TrendingMusic,
        Genre::LatestMusic,
        Genre::TopMusic,
        Genre::HiddenGemsMusic,
        Genre::DevelopersChoiceMusic,
    ];

    /// Tag string, identical to the catalogue column name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Genre::SadMusic => "sad_music",
            Genre::RomanticMusic => "romantic_music",
            Genre::PartyMusic => "party_music",
            Genre::HappyMusic => "happy_music",
            Genre::MelancholyMusic => "melancholy_music",
            Genre::FocusMusic => "focus_music",
            Genre::InstrumentalMusic => "instrumental_music",
            Genre::KPopMusic => "k_pop_music",
            Genre::ElectronicMusic => "electronic_music",
            Genre::RnbMusic => "rnb_music",
            Genre::BluesMusic => "blues_music",
            Genre::PersonalFav => "personal_fav",
            Genre::NativeMusic => "native_music",
            Genre::ClassicalMusic => "classical_music",
            Genre::WorkoutMusic => "workout_music",
            Genre::RockMusic => "rock_music",
            Genre::RapMusic => "rap_music",
            Genre::PopMusic => "pop_music",
            Genre::JazzMusic => "jazz_music",
            Genre::MotivationalMusic => "motivational_music",
            Genre::TrendingMusic => "trending_music",
            Genre::LatestMusic => "latest_music",
            Genre::TopMusic => "top_music",
            Genre::HiddenGemsMusic => "hidden_gems_music",
            Genre::DevelopersChoiceMusic => "developers_choice_music",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = GenreParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.as_str() == s)
            .ok_or_else(|| GenreParseError(s.to_string()))
    }
}

/// Immutable keyword and genre tables.
///
/// Keywords are matched as whole words against normalized text, so they
/// should be lower-case; multi-word phrases ("night out") are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    pub emotion_keywords: BTreeMap<Emotion, Vec<String>>,
    pub activity_keywords: BTreeMap<Activity, Vec<String>>,
    pub emotion_genres: BTreeMap<Emotion, Vec<Genre>>,
    pub activity_genres: BTreeMap<Activity, Vec<Genre>>,
}

const EMOTION_KEYWORDS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Sad,
        &[
            "sad", "depressed", "down", "blue", "crying", "heartbroken", "lonely", "upset",
            "hurt", "low", "awful", "terrible", "bad", "miserable", "gloomy", "devastated",
            "broken", "disappointed", "hopeless", "grief", "sorrow", "despair", "melancholic",
        ],
    ),
    (
        Emotion::Happy,
        &[
            "happy", "joyful", "excited", "cheerful", "glad", "upbeat", "positive", "elated",
            "thrilled", "ecstatic", "fantastic", "wonderful", "amazing", "great", "awesome",
            "excellent", "delighted", "overjoyed", "euphoric", "blissful",
        ],
    ),
    (
        Emotion::Romantic,
        &[
            "love", "romantic", "date", "crush", "valentine", "intimate", "romance",
            "affection", "passion", "relationship", "boyfriend", "girlfriend", "husband",
            "wife", "partner", "soulmate", "sweetheart", "darling", "beloved", "dinner",
            "anniversary", "proposal", "wedding", "honeymoon",
        ],
    ),
    (
        Emotion::Energetic,
        &[
            "energetic", "pumped", "hyped", "active", "workout", "gym", "running",
            "exercise", "fitness", "cardio", "training", "intense", "powerful", "strong",
            "adrenaline", "boost", "energy", "pump", "beast mode", "sweat", "lift",
            "weights", "crossfit", "hiit", "run", "jog", "sprint", "work out",
        ],
    ),
    (
        Emotion::Relaxed,
        &[
            "chill", "relax", "calm", "peaceful", "meditation", "zen", "quiet", "tranquil",
            "serene", "mellow", "soothing", "unwind", "decompress", "breathe", "mindful",
            "spa", "massage", "ambient", "soft", "gentle", "laid back",
        ],
    ),
    (
        Emotion::Nostalgic,
        &[
            "nostalgic", "nostalgia", "memories", "memory lane", "throwback", "old times",
            "old days", "childhood", "reminisce", "reminiscing", "retro", "vintage",
            "oldies", "back in the day",
        ],
    ),
    (
        Emotion::Motivated,
        &[
            "motivated", "motivation", "determined", "driven", "inspired", "ambitious",
            "hustle", "grind", "goals", "unstoppable", "push through",
        ],
    ),
    (
        Emotion::Party,
        &[
            "party", "club", "dancing", "celebration", "fun", "wild", "night out", "dance",
            "nightclub", "disco", "rave", "festival", "concert", "dj", "bass", "beat",
            "groove", "vibe", "turn up", "lit", "banging", "banger",
        ],
    ),
    (
        Emotion::Melancholy,
        &[
            "melancholy", "wistful", "pensive", "bittersweet", "somber", "sombre",
            "introspective", "reflective", "longing", "moody",
        ],
    ),
    (
        Emotion::Focus,
        &[
            "study", "work", "concentrate", "focus", "productivity", "background",
            "studying", "working", "office", "homework", "exam", "concentration", "reading",
            "writing", "coding", "programming", "task", "project", "deep work",
        ],
    ),
];

const ACTIVITY_KEYWORDS: &[(Activity, &[&str])] = &[
    (
        Activity::Workout,
        &["workout", "work out", "exercise", "exercising", "running", "gym", "lifting", "cardio"],
    ),
    (
        Activity::Study,
        &["study", "studying", "homework", "exam", "exams", "revision", "revising"],
    ),
    (Activity::Party, &["party", "partying", "club", "clubbing", "nightclub"]),
    (Activity::Driving, &["driving", "drive", "road trip", "commute", "commuting"]),
    (Activity::Cooking, &["cooking", "cook", "baking", "kitchen"]),
    (Activity::Cleaning, &["cleaning", "chores", "tidying", "vacuuming", "laundry"]),
    (Activity::Sleeping, &["sleeping", "sleep", "bedtime", "nap", "insomnia"]),
    (Activity::Working, &["working", "work", "office", "deadline"]),
];

const EMOTION_GENRES: &[(Emotion, [Genre; 3])] = &[
    (Emotion::Sad, [Genre::SadMusic, Genre::BluesMusic, Genre::MelancholyMusic]),
    (Emotion::Happy, [Genre::HappyMusic, Genre::PopMusic, Genre::PartyMusic]),
    (Emotion::Romantic, [Genre::RomanticMusic, Genre::RnbMusic, Genre::JazzMusic]),
    (Emotion::Energetic, [Genre::WorkoutMusic, Genre::ElectronicMusic, Genre::RockMusic]),
    (Emotion::Relaxed, [Genre::FocusMusic, Genre::InstrumentalMusic, Genre::ClassicalMusic]),
    (Emotion::Nostalgic, [Genre::BluesMusic, Genre::JazzMusic, Genre::ClassicalMusic]),
    (Emotion::Motivated, [Genre::MotivationalMusic, Genre::WorkoutMusic, Genre::RapMusic]),
    (Emotion::Party, [Genre::PartyMusic, Genre::ElectronicMusic, Genre::PopMusic]),
    (Emotion::Melancholy, [Genre::MelancholyMusic, Genre::SadMusic, Genre::BluesMusic]),
    (Emotion::Focus, [Genre::FocusMusic, Genre::InstrumentalMusic, Genre::ClassicalMusic]),
];

const ACTIVITY_GENRES: &[(Activity, [Genre; 3])] = &[
    (Activity::Workout, [Genre::WorkoutMusic, Genre::ElectronicMusic, Genre::MotivationalMusic]),
    (Activity::Study, [Genre::FocusMusic, Genre::InstrumentalMusic, Genre::ClassicalMusic]),
    (Activity::Party, [Genre::PartyMusic, Genre::ElectronicMusic, Genre::PopMusic]),
    (Activity::Driving, [Genre::RockMusic, Genre::PopMusic, Genre::RapMusic]),
    (Activity::Cooking, [Genre::JazzMusic, Genre::RnbMusic, Genre::PopMusic]),
    (Activity::Cleaning, [Genre::PopMusic, Genre::ElectronicMusic, Genre::MotivationalMusic]),
    (Activity::Sleeping, [Genre::InstrumentalMusic, Genre::ClassicalMusic, Genre::FocusMusic]),
    (Activity::Working, [Genre::FocusMusic, Genre::InstrumentalMusic, Genre::ClassicalMusic]),
];

lazy_static::lazy_static! {
    /// The canonical lexicon, built once per process.
    static ref BUILTIN_LEXICON: Lexicon = Lexicon {
        emotion_keywords: owned_keywords(EMOTION_KEYWORDS),
        activity_keywords: owned_keywords(ACTIVITY_KEYWORDS),
        emotion_genres: EMOTION_GENRES.iter().map(|(e, g)| (*e, g.to_vec())).collect(),
        activity_genres: ACTIVITY_GENRES.iter().map(|(a, g)| (*a, g.to_vec())).collect(),
    };
}

fn owned_keywords<L: Ord + Copy>(table: &[(L, &[&str])]) -> BTreeMap<L, Vec<String>> {
    table
        .iter()
        .map(|(label, words)| (*label, words.iter().map(|w| (*w).to_string()).collect()))
        .collect()
}

impl Lexicon {
    /// The built-in canonical lexicon.
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN_LEXICON.clone()
    }

    /// Read a lexicon from a JSON file.
    ///
    /// Unknown emotion, activity or genre names are rejected by
    /// deserialization, which keeps the catalogue invariant intact for
    /// user-supplied tables.
    pub fn from_json_file(path: &Path) -> Result<Self, LexiconError> {
        let text = std::fs::read_to_string(path).map_err(|source| LexiconError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let lexicon: Lexicon = serde_json::from_str(&text).map_err(|source| LexiconError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Loaded lexicon from {}: {} emotions, {} activities",
            path.display(),
            lexicon.emotion_keywords.len(),
            lexicon.activity_keywords.len()
        );
        Ok(lexicon)
    }

    /// Genres mapped to `emotion`, if the lexicon has an entry for it.
    #[must_use]
    pub fn genres_for_emotion(&self, emotion: Emotion) -> Option<&[Genre]> {
        self.emotion_genres.get(&emotion).map(Vec::as_slice)
    }

    /// Genres mapped to `activity`, if the lexicon has an entry for it.
    #[must_use]
    pub fn genres_for_activity(&self, activity: Activity) -> Option<&[Genre]> {
        self.activity_genres.get(&activity).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_tags_round_trip_through_from_str() {
        for genre in Genre::ALL {
            assert_eq!(genre.as_str().parse::<Genre>().unwrap(), genre);
        }
        assert!("jazz".parse::<Genre>().is_err());
        assert!("".parse::<Genre>().is_err());
    }

    #[test]
    fn test_serde_names_match_column_names() {
        for genre in Genre::ALL {
            let json = serde_json::to_string(&genre).unwrap();
            assert_eq!(json, format!("\"{}\"", genre.as_str()));
        }
        for emotion in Emotion::ALL {
            let json = serde_json::to_string(&emotion).unwrap();
            assert_eq!(json, format!("\"{}\"", emotion.as_str()));
        }
        for activity in Activity::ALL {
            let json = serde_json::to_string(&activity).unwrap();
            assert_eq!(json, format!("\"{}\"", activity.as_str()));
        }
    }

    #[test]
    fn test_builtin_lexicon_is_complete() {
        let lexicon = Lexicon::builtin();

        for emotion in Emotion::ALL {
            assert!(
                !lexicon.emotion_keywords[&emotion].is_empty(),
                "{emotion} should have keywords"
            );
            assert!(!lexicon.genres_for_emotion(emotion).unwrap().is_empty());
        }
        for activity in Activity::ALL {
            assert!(!lexicon.activity_keywords[&activity].is_empty());
            assert!(!lexicon.genres_for_activity(activity).unwrap().is_empty());
        }
    }

    #[test]
    fn test_builtin_keywords_are_not_shared_between_emotions() {
        let lexicon = Lexicon::builtin();
        let mut seen = std::collections::HashMap::new();

        for (emotion, keywords) in &lexicon.emotion_keywords {
            for keyword in keywords {
                if let Some(other) = seen.insert(keyword.as_str(), *emotion) {
                    panic!("keyword `{keyword}` used by both {other} and {emotion}");
                }
            }
        }
    }

    #[test]
    fn test_builtin_keywords_are_not_shared_between_activities() {
        let lexicon = Lexicon::builtin();
        let mut seen = std::collections::HashMap::new();

        for (activity, keywords) in &lexicon.activity_keywords {
            for keyword in keywords {
                if let Some(other) = seen.insert(keyword.as_str(), *activity) {
                    panic!("keyword `{keyword}` used by both {other} and {activity}");
                }
            }
        }
    }

    #[test]
    fn test_lexicon_json_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lexicon.json");
        let lexicon = Lexicon::builtin();
        std::fs::write(&path, serde_json::to_string_pretty(&lexicon).unwrap()).unwrap();

        let loaded = Lexicon::from_json_file(&path).unwrap();
        assert_eq!(loaded, lexicon);
    }

    #[test]
    fn test_lexicon_file_with_unknown_genre_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lexicon.json");
        std::fs::write(
            &path,
            r#"{
                "emotion_keywords": {"sad": ["sad"]},
                "activity_keywords": {},
                "emotion_genres": {"sad": ["polka_music"]},
                "activity_genres": {}
            }"#,
        )
        .unwrap();

        assert!(matches!(
            Lexicon::from_json_file(&path),
            Err(LexiconError::Parse { .. })
        ));
    }
}
