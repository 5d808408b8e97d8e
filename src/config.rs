//! # Configuration Module
//!
//! Data directory layout and runtime settings for moodtune.
//!
//! ## Data Storage
//!
//! The catalogue lives in the platform-standard data directory:
//! - Linux: `~/.local/share/moodtune/catalogue.db`
//! - macOS: `~/Library/Application Support/moodtune/catalogue.db`
//! - Windows: `%APPDATA%\moodtune\catalogue.db`
//!
//! Both the database path and an optional lexicon file can be overridden
//! from the command line or through `MOODTUNE_DB` / `MOODTUNE_LEXICON`.

use crate::analyzer::MoodAnalyzer;
use crate::lexicon::Lexicon;
use crate::sentiment::LexiconSentiment;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the catalogue path.
pub const DB_ENV: &str = "MOODTUNE_DB";
/// Environment variable pointing at a lexicon JSON file.
pub const LEXICON_ENV: &str = "MOODTUNE_LEXICON";

const APP_DIR: &str = "moodtune";
const DB_FILE: &str = "catalogue.db";

/// Returns the moodtune data directory, creating it if needed.
///
/// # Errors
///
/// - The system data directory cannot be determined
/// - The `moodtune` subdirectory cannot be created
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Pass --db or set {DB_ENV} instead."
        )
    })?;

    let app_dir = data_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create moodtune data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Returns the default catalogue path inside [`get_data_dir`].
///
/// ```no_run
/// use moodtune::config::get_db_path;
///
/// let db_path = get_db_path()?;
/// println!("Catalogue location: {}", db_path.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(DB_FILE))
}

/// Settings resolved from flags, environment and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the catalogue database
    pub db_path: PathBuf,
    /// Lexicon JSON file; the built-in lexicon when `None`
    pub lexicon_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Configuration with explicit paths. A missing `db_path` falls back to
    /// [`get_db_path`].
    pub fn resolve(db_path: Option<PathBuf>, lexicon_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => get_db_path()?,
        };
        Ok(Self {
            db_path,
            lexicon_path,
        })
    }

    /// The configured lexicon: the file at `lexicon_path`, or the built-in.
    pub fn load_lexicon(&self) -> Result<Lexicon> {
        match &self.lexicon_path {
            Some(path) => load_lexicon_file(path),
            None => Ok(Lexicon::builtin()),
        }
    }

    /// An analyzer over [`RuntimeConfig::load_lexicon`].
    pub fn build_analyzer(&self) -> Result<MoodAnalyzer> {
        let lexicon = self.load_lexicon()?;
        MoodAnalyzer::new(lexicon, Box::new(LexiconSentiment::default()))
            .context("Failed to compile lexicon keywords")
    }
}

fn load_lexicon_file(path: &Path) -> Result<Lexicon> {
    Lexicon::from_json_file(path).context("Failed to load custom lexicon")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_db_path_structure() {
        let path = get_db_path().expect("Should get valid path");

        assert_eq!(path.file_name().unwrap(), "catalogue.db");
        let parent = path.parent().expect("Should have parent directory");
        assert_eq!(parent.file_name().unwrap(), "moodtune");
        assert!(parent.is_dir());
    }

    #[test]
    fn test_resolve_prefers_explicit_paths() {
        let config = RuntimeConfig::resolve(
            Some(PathBuf::from("/tmp/custom.db")),
            Some(PathBuf::from("/tmp/lexicon.json")),
        )
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.lexicon_path, Some(PathBuf::from("/tmp/lexicon.json")));
    }

    #[test]
    fn test_builtin_lexicon_without_path() {
        let config = RuntimeConfig::resolve(Some(PathBuf::from("unused.db")), None).unwrap();
        assert_eq!(config.load_lexicon().unwrap(), Lexicon::builtin());
        assert!(config.build_analyzer().is_ok());
    }

    #[test]
    fn test_custom_lexicon_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.json");
        fs::write(
            &path,
            r#"{
                "emotion_keywords": {"happy": ["sunshine"]},
                "activity_keywords": {"driving": ["road"]},
                "emotion_genres": {"happy": ["k_pop_music"]},
                "activity_genres": {"driving": ["rock_music"]}
            }"#,
        )
        .unwrap();

        let config = RuntimeConfig {
            db_path: dir.path().join("catalogue.db"),
            lexicon_path: Some(path),
        };
        let analyzer = config.build_analyzer().unwrap();
        let result = analyzer.process_user_message("sunshine on the open road");

        assert_eq!(result.emotions, vec![crate::lexicon::Emotion::Happy]);
        assert_eq!(
            result.recommended_genres,
            vec![crate::lexicon::Genre::KPopMusic, crate::lexicon::Genre::RockMusic]
        );
    }

    #[test]
    fn test_missing_lexicon_file_is_an_error() {
        let config = RuntimeConfig {
            db_path: PathBuf::from("unused.db"),
            lexicon_path: Some(PathBuf::from("/definitely/not/here.json")),
        };
        assert!(config.load_lexicon().is_err());
    }
}
