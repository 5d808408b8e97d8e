//! # Command-Line Interface Module
//!
//! Clap definitions for the `moodtune` binary. Every command prints pretty
//! JSON on stdout, except `analyze` which prints one JSON object per line.
//!
//! ## Commands
//!
//! - `init-db`: Create the catalogue database, optionally seeding it
//! - `import`: Append rows from a JSON file
//! - `list`: Print every catalogue row
//! - `genre`: Page through one genre column
//! - `chat`: Conversational recommendation for a message
//! - `by-mood`: Songs for a described mood
//! - `analyze`: Batch mood analysis, one message per line
//! - `genres`: Print the known genre tags
//!
//! ## Examples
//!
//! ```bash
//! moodtune init-db --seed songs.json
//! moodtune genre sad_music --offset 10 --limit 10
//! moodtune chat "I'm feeling really sad today"
//! moodtune by-mood "pumped for the gym" --limit 5
//! ```

use crate::config::{DB_ENV, LEXICON_ENV};
use crate::db::DEFAULT_PAGE_LIMIT;
use crate::service::DEFAULT_MOOD_LIMIT;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shells that completion scripts can be generated for.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Shell {
    /// Bourne Again `SHell` (bash)
    Bash,
    /// Z `SHell` (zsh)
    Zsh,
    /// Friendly Interactive `SHell` (fish)
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// The database and lexicon locations are global so they can be given
/// before or after the subcommand.
#[derive(Parser, Debug)]
#[command(name = "moodtune")]
#[command(about = "moodtune: mood-aware music recommendations from a genre catalogue")]
#[command(version)]
pub struct Args {
    /// Path to the catalogue database
    ///
    /// Defaults to `catalogue.db` in the platform data directory.
    #[arg(long, global = true, env = DB_ENV, value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// JSON lexicon to use instead of the built-in keyword tables
    #[arg(long, global = true, env = LEXICON_ENV, value_hint = clap::ValueHint::FilePath)]
    pub lexicon: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the catalogue database
    ///
    /// Creates the `music_recommendations` table with one column per genre.
    /// Refuses to touch an existing database unless `--force` is given.
    InitDb {
        /// Drop and recreate an existing database
        #[arg(long)]
        force: bool,

        /// JSON file of rows to import right after creation
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        seed: Option<PathBuf>,
    },

    /// Append catalogue rows from a JSON file
    ///
    /// The file holds an array of objects keyed by genre tag, for example
    /// `[{"sad_music": "Hurt", "jazz_music": "So What"}]`.
    Import {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print every catalogue row
    List,

    /// Page through the songs of one genre
    Genre {
        /// Genre tag, e.g. `sad_music` (see `moodtune genres`)
        genre: String,

        /// Number of songs to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Page size
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: usize,
    },

    /// Chat-style recommendation for a free-text message
    ///
    /// Prints the reply message, up to ten songs, the genres used, a
    /// follow-up question and the analysis behind it.
    Chat {
        message: String,

        /// Seed for template selection, for reproducible output
        #[arg(long)]
        rng_seed: Option<u64>,
    },

    /// Songs for a described mood
    ByMood {
        mood: String,

        /// Maximum number of songs
        #[arg(long, default_value_t = DEFAULT_MOOD_LIMIT)]
        limit: usize,

        /// Seed for the shuffle, for reproducible output
        #[arg(long)]
        rng_seed: Option<u64>,
    },

    /// Analyse messages in bulk, one per line
    ///
    /// Lines are analysed in parallel. Output is one JSON object per input
    /// line, in input order. Use `-` to read standard input.
    Analyze {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print every known genre tag
    Genres,

    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_genre_with_defaults() {
        let args = Args::try_parse_from(["moodtune", "genre", "sad_music"]).unwrap();
        match args.command {
            Command::Genre {
                genre,
                offset,
                limit,
            } => {
                assert_eq!(genre, "sad_music");
                assert_eq!(offset, 0);
                assert_eq!(limit, DEFAULT_PAGE_LIMIT);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let args =
            Args::try_parse_from(["moodtune", "list", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(args.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_genre_argument_accepts_any_text() {
        // Unknown tags are reported by the command itself as JSON errors.
        let args = Args::try_parse_from(["moodtune", "genre", "polka_music"]).unwrap();
        assert!(matches!(args.command, Command::Genre { .. }));
    }

    #[test]
    fn test_by_mood_rejects_negative_limit() {
        assert!(Args::try_parse_from(["moodtune", "by-mood", "happy", "--limit", "-3"]).is_err());
    }
}
