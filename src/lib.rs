//! Mood-aware music recommendations from a genre-bucketed song catalogue.
//!
//! Core modules:
//! - [`analyzer`] - Emotion/activity detection, genre ranking, confidence
//! - [`response`] - Conversational replies from an analysis
//! - [`service`] - Chat and mood-to-songs contracts over a song source
//! - [`db`] - SQLite song catalogue
//!
//! ### Supporting Modules
//!
//! - [`lexicon`] - Emotion, activity and genre labels plus keyword tables
//! - [`text`] - Text normalization and whole-word keyword matching
//! - [`sentiment`] - Polarity estimation for the emotion fallback
//! - [`config`] - Data directory and runtime configuration
//! - [`error`] - Error types
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```
//! use moodtune::analyzer::MoodAnalyzer;
//! use moodtune::lexicon::{Emotion, Genre};
//! use moodtune::response::ResponseGenerator;
//! use rand::SeedableRng;
//!
//! let analyzer = MoodAnalyzer::with_builtin_lexicon()?;
//! let analysis = analyzer.process_user_message("I'm feeling really sad today");
//! assert_eq!(analysis.emotions, vec![Emotion::Sad]);
//! assert_eq!(analysis.recommended_genres[0], Genre::SadMusic);
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let reply = ResponseGenerator::default().generate_response(&analysis, "", &mut rng);
//! assert!(reply.message.contains("sad"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Analysis Pipeline
//!
//! 1. Normalize: lower-case, punctuation to spaces, whitespace collapsed
//! 2. Emotions: whole-word keyword matches; if none, sentiment polarity
//!    picks `happy` (> 0.2), `sad` (< -0.2) or `relaxed`
//! 3. Activities: whole-word keyword matches, no fallback
//! 4. Genres: every tag's genre list pooled, ranked by frequency, top 5
//! 5. Confidence: `0.3 + 0.2 per emotion + 0.15 per activity`, capped at 1
//!
//! The analyzer never fails from the caller's point of view: empty input and
//! internal errors both produce [`analyzer::AnalysisResult::fallback`].
//!
//! ## Catalogue
//!
//! ```no_run
//! use moodtune::db::{init_catalogue, NewRow};
//! use moodtune::lexicon::Genre;
//! use std::path::Path;
//!
//! let mut catalogue = init_catalogue(Path::new("catalogue.db"), false)?;
//! let row: NewRow = [(Genre::JazzMusic, "So What".to_string())].into_iter().collect();
//! catalogue.import_rows(&[row])?;
//!
//! let page = catalogue.songs_by_genre(Genre::JazzMusic, 0, 10)?;
//! println!("{} of {} jazz songs", page.length, page.total_items);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod analyzer;
pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod lexicon;
pub mod response;
pub mod sentiment;
pub mod service;
pub mod text;
