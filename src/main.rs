//! # moodtune
//!
//! Command-line front end for the moodtune library: catalogue management,
//! genre paging and mood-based recommendations. All output is JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Create and seed the catalogue
//! moodtune init-db --seed songs.json
//!
//! # Browse a genre
//! moodtune genre jazz_music --limit 5
//!
//! # Ask for recommendations
//! moodtune chat "cooking dinner for my girlfriend"
//! moodtune by-mood "tired but need to focus" --limit 8
//!
//! # Bulk analysis
//! moodtune analyze messages.txt > analysis.jsonl
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use moodtune::analyzer::AnalysisResult;
use moodtune::cli::{self, Command};
use moodtune::completion;
use moodtune::config::RuntimeConfig;
use moodtune::db::{self, Catalogue};
use moodtune::error::{GenreParseError, ServiceError};
use moodtune::lexicon::Genre;
use moodtune::response::ResponseGenerator;
use moodtune::service::MoodService;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Exit status for invalid user input.
const CLIENT_ERROR_EXIT: i32 = 2;

/// One line of `analyze` output.
#[derive(Serialize)]
struct AnalyzedLine<'a> {
    message: &'a str,
    #[serde(flatten)]
    analysis: AnalysisResult,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn open_service(config: &RuntimeConfig) -> Result<MoodService<Catalogue>> {
    let analyzer = config.build_analyzer()?;
    let catalogue = Catalogue::open(&config.db_path)?;
    Ok(MoodService::new(analyzer, ResponseGenerator::default(), catalogue))
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    if path == Path::new("-") {
        return io::stdin()
            .lock()
            .lines()
            .collect::<Result<_, _>>()
            .context("Failed to read standard input");
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Message to report for errors caused by the caller's input.
fn client_error_message(err: &anyhow::Error) -> Option<String> {
    if let Some(service_err) = err.downcast_ref::<ServiceError>() {
        return service_err.is_client_error().then(|| service_err.to_string());
    }
    err.downcast_ref::<GenreParseError>().map(ToString::to_string)
}

fn run(args: cli::Args) -> Result<()> {
    let config = RuntimeConfig::resolve(args.db, args.lexicon)?;
    debug!("Runtime configuration: {config:?}");

    match args.command {
        Command::InitDb { force, seed } => {
            let mut catalogue = db::init_catalogue(&config.db_path, force)?;
            let imported = match seed {
                Some(path) => catalogue.import_json(&path)?,
                None => 0,
            };
            print_json(&serde_json::json!({
                "database": config.db_path,
                "imported": imported,
            }))?;
        }
        Command::Import { file } => {
            let mut catalogue = Catalogue::open(&config.db_path)?;
            let imported = catalogue.import_json(&file)?;
            print_json(&serde_json::json!({
                "imported": imported,
                "total_rows": catalogue.count_rows()?,
            }))?;
        }
        Command::List => {
            let catalogue = Catalogue::open(&config.db_path)?;
            print_json(&catalogue.list_songs()?)?;
        }
        Command::Genre {
            genre,
            offset,
            limit,
        } => {
            let genre: Genre = genre.parse()?;
            let catalogue = Catalogue::open(&config.db_path)?;
            print_json(&catalogue.songs_by_genre(genre, offset, limit)?)?;
        }
        Command::Chat { message, rng_seed } => {
            let service = open_service(&config)?;
            let reply = service.chat(message.as_str(), &mut seeded_rng(rng_seed))?;
            print_json(&reply)?;
        }
        Command::ByMood {
            mood,
            limit,
            rng_seed,
        } => {
            let service = open_service(&config)?;
            let songs = service.songs_by_mood(mood.as_str(), Some(limit), &mut seeded_rng(rng_seed))?;
            print_json(&songs)?;
        }
        Command::Analyze { file } => {
            let analyzer = config.build_analyzer()?;
            let lines = read_lines(&file)?;
            info!("Analysing {} messages", lines.len());

            let results = analyzer.process_batch(&lines);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for (message, analysis) in lines.iter().zip(results) {
                let line = AnalyzedLine { message, analysis };
                serde_json::to_writer(&mut out, &line).context("Failed to write analysis")?;
                writeln!(out)?;
            }
        }
        Command::Genres => {
            print_json(&completion::genre_completions())?;
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
    }

    Ok(())
}

/// Initializes logging, parses arguments and runs the command.
///
/// Logging is controlled via `RUST_LOG`, e.g. `RUST_LOG=moodtune=debug`.
/// Input errors print `{"error": ...}` on stderr and exit with status 2;
/// any other failure is reported by `anyhow` with its context chain.
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match run(args) {
        Err(err) => match client_error_message(&err) {
            Some(message) => {
                eprintln!("{}", serde_json::json!({ "error": message }));
                std::process::exit(CLIENT_ERROR_EXIT);
            }
            None => Err(err),
        },
        ok => ok,
    }
}
