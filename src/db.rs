//! # Catalogue Module
//!
//! SQLite storage for the song catalogue. The catalogue is a single table,
//! `music_recommendations`, with an integer `id` and one nullable `TEXT`
//! column per [`Genre`]. A row is a bucket of songs, one per genre column;
//! most rows fill only a few columns.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE music_recommendations (
//!     id INTEGER PRIMARY KEY,
//!     sad_music TEXT,
//!     romantic_music TEXT,
//!     -- ... one column per genre tag ...
//!     developers_choice_music TEXT
//! )
//! ```
//!
//! Column names are taken from [`Genre::as_str`], never from user input, so
//! they can be interpolated into SQL directly.

use crate::lexicon::Genre;
use crate::service::SongSource;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Name of the catalogue table.
pub const TABLE: &str = "music_recommendations";

/// Default page size for [`Catalogue::songs_by_genre`].
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Songs of one catalogue row, keyed by genre column.
pub type NewRow = BTreeMap<Genre, String>;

/// A stored catalogue row. Only non-null columns are present in `songs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueRow {
    pub id: i64,
    #[serde(flatten)]
    pub songs: BTreeMap<Genre, String>,
}

/// One page of a genre column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenrePage {
    /// Non-null values of the column, in row order.
    pub results: Vec<String>,
    pub next_offset: usize,
    /// `None` on the first page.
    pub prev_offset: Option<usize>,
    /// Number of non-null values in the whole column.
    pub total_items: usize,
    pub has_more: bool,
    /// `results.len()`
    pub length: usize,
}

fn create_table_sql() -> String {
    let columns: Vec<String> = Genre::ALL
        .iter()
        .map(|genre| format!("    {genre} TEXT"))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {TABLE} (\n    id INTEGER PRIMARY KEY,\n{}\n)",
        columns.join(",\n")
    )
}

fn insert_sql() -> String {
    let columns: Vec<&str> = Genre::ALL.iter().map(|genre| genre.as_str()).collect();
    let placeholders: Vec<String> = (1..=Genre::ALL.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {TABLE} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn to_sql_int(value: usize, what: &str) -> Result<i64> {
    i64::try_from(value).with_context(|| format!("{what} {value} is out of range"))
}

/// Creates a new catalogue database at `path`.
///
/// Parent directories are created as needed. If a file already exists at
/// `path` this fails, unless `force` is set, in which case the old file is
/// removed first.
///
/// # Errors
///
/// - The database already exists and `force` is not set
/// - The old database cannot be removed
/// - SQLite cannot create the file or the schema
///
/// # Examples
///
/// ```no_run
/// use moodtune::db::init_catalogue;
/// use std::path::Path;
///
/// let catalogue = init_catalogue(Path::new("/tmp/catalogue.db"), true)?;
/// assert_eq!(catalogue.count_rows()?, 0);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_catalogue(path: &Path, force: bool) -> Result<Catalogue> {
    if path.exists() {
        if !force {
            bail!(
                "Catalogue already exists at {}. Use --force to recreate it.",
                path.display()
            );
        }
        info!("Removing existing catalogue at {}", path.display());
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove old catalogue at {}", path.display()))?;
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to create catalogue at {}", path.display()))?;
    let catalogue = Catalogue::with_schema(conn)?;
    info!("Initialized catalogue at {}", path.display());
    Ok(catalogue)
}

/// Handle to an open catalogue database.
#[derive(Debug)]
pub struct Catalogue {
    conn: Connection,
}

impl Catalogue {
    /// Opens an existing catalogue and checks that its table has every
    /// genre column.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "No catalogue found at {}. Run `moodtune init-db` first.",
                path.display()
            );
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalogue at {}", path.display()))?;
        let catalogue = Self { conn };
        catalogue
            .validate_schema()
            .with_context(|| format!("Invalid catalogue at {}", path.display()))?;
        debug!("Opened catalogue at {}", path.display());
        Ok(catalogue)
    }

    /// Empty catalogue that lives only as long as the handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_schema(conn)
    }

    fn with_schema(conn: Connection) -> Result<Self> {
        conn.execute(&create_table_sql(), ())
            .with_context(|| format!("Failed to create table {TABLE}"))?;
        Ok(Self { conn })
    }

    fn validate_schema(&self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({TABLE})"))
            .context("Failed to read table info")?;
        let columns: BTreeSet<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()
            .context("Failed to read column names")?;

        if columns.is_empty() {
            bail!("Table {TABLE} does not exist");
        }

        let missing: Vec<&str> = Genre::ALL
            .iter()
            .map(|genre| genre.as_str())
            .filter(|name| !columns.contains(*name))
            .collect();
        if !missing.is_empty() {
            bail!("Table {TABLE} is missing columns: {}", missing.join(", "));
        }
        Ok(())
    }

    /// Inserts `rows` in a single transaction and returns how many were
    /// written. Genres absent from a row are stored as NULL.
    pub fn import_rows(&mut self, rows: &[NewRow]) -> Result<usize> {
        let tx = self.conn.transaction()?;

        {
            let mut stmt = tx
                .prepare(&insert_sql())
                .context("Invalid SQL statement when preparing catalogue INSERT")?;

            for row in rows {
                stmt.execute(params_from_iter(Genre::ALL.iter().map(|genre| row.get(genre))))
                    .with_context(|| format!("Failed to insert catalogue row {row:?}"))?;
            }
        }

        tx.commit().context("Committing catalogue import failed")?;
        info!("Imported {} catalogue rows", rows.len());
        Ok(rows.len())
    }

    /// Imports a JSON file holding an array of objects keyed by genre tag.
    ///
    /// ```json
    /// [
    ///   {"sad_music": "Someone Like You", "jazz_music": "So What"},
    ///   {"party_music": "Uptown Funk", "pop_music": null}
    /// ]
    /// ```
    ///
    /// `null` values are skipped. Unknown keys are an error.
    pub fn import_json(&mut self, path: &Path) -> Result<usize> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raw: Vec<BTreeMap<Genre, Option<String>>> = serde_json::from_str(&text)
            .with_context(|| format!("Invalid catalogue JSON in {}", path.display()))?;

        let rows: Vec<NewRow> = raw
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .filter_map(|(genre, song)| song.map(|song| (genre, song)))
                    .collect()
            })
            .collect();

        self.import_rows(&rows)
    }

    /// Every row, ordered by id.
    pub fn list_songs(&self) -> Result<Vec<CatalogueRow>> {
        let columns: Vec<&str> = Genre::ALL.iter().map(|genre| genre.as_str()).collect();
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, {} FROM {TABLE} ORDER BY id",
                columns.join(", ")
            ))
            .context("Invalid SQL statement when listing catalogue")?;

        let rows = stmt
            .query_map([], |row| {
                let mut songs = BTreeMap::new();
                for (i, genre) in Genre::ALL.iter().enumerate() {
                    if let Some(song) = row.get::<_, Option<String>>(i + 1)? {
                        songs.insert(*genre, song);
                    }
                }
                Ok(CatalogueRow {
                    id: row.get(0)?,
                    songs,
                })
            })
            .context("Cannot query catalogue rows")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read catalogue row")?;

        Ok(rows)
    }

    /// One page of the non-null values of `genre`'s column.
    ///
    /// `next_offset` is always `offset + limit`; `has_more` tells whether
    /// anything lives there. `prev_offset` is `offset - limit` clamped to 0,
    /// or `None` when `offset` is 0.
    pub fn songs_by_genre(&self, genre: Genre, offset: usize, limit: usize) -> Result<GenrePage> {
        let total_items: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {TABLE} WHERE {genre} IS NOT NULL"),
                [],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to count {genre} songs"))?;
        let total_items = usize::try_from(total_items)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {genre} FROM {TABLE} WHERE {genre} IS NOT NULL ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let results: Vec<String> = stmt
            .query_map(
                [to_sql_int(limit, "limit")?, to_sql_int(offset, "offset")?],
                |row| row.get(0),
            )
            .with_context(|| format!("Cannot query {genre} songs"))?
            .collect::<Result<_, _>>()?;

        let next_offset = offset.saturating_add(limit);
        Ok(GenrePage {
            length: results.len(),
            results,
            next_offset,
            prev_offset: (offset > 0).then(|| offset.saturating_sub(limit)),
            total_items,
            has_more: next_offset < total_items,
        })
    }

    /// Number of rows in the catalogue. Doubles as a connectivity check.
    pub fn count_rows(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| row.get(0))
            .context("Failed to count catalogue rows")?;
        Ok(usize::try_from(count)?)
    }
}

impl SongSource for Catalogue {
    fn genre_songs(&self, genre: Genre, limit: usize) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {genre} FROM {TABLE} WHERE {genre} IS NOT NULL AND {genre} <> '' ORDER BY id LIMIT ?1"
        ))?;
        let songs = stmt
            .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()
            .with_context(|| format!("Failed to read {genre} songs"))?;
        Ok(songs)
    }
}
