pub mod dates;
pub mod models;

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config::DatasetFiles;
pub use models::{DatasetStats, Table, Track};

/// Columns the tracks dataset must provide. Extra columns are ignored.
pub const TRACK_COLUMNS: &[&str] = &[
    "name",
    "artist",
    "genre",
    "year",
    "popularity",
    "release_date",
];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{} line {line}: invalid {field} {value:?}", path.display())]
    InvalidField {
        path: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Raw tracks row before coercion.
#[derive(Debug, Deserialize)]
struct TrackRow {
    name: String,
    artist: String,
    genre: String,
    year: String,
    popularity: String,
    #[serde(default)]
    release_date: Option<String>,
}

/// The loaded datasets. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    tracks: Vec<Track>,
    artists: Table,
    playlists: Table,
}

impl DataStore {
    /// Load all three datasets from `dir`. Any failure is fatal.
    pub fn open(dir: &Path, files: &DatasetFiles) -> Result<Self> {
        let tracks_path = dir.join(&files.tracks);
        let tracks = parse_tracks(open_file(&tracks_path)?, &tracks_path)?;

        let artists_path = dir.join(&files.artists);
        let artists = parse_table(open_file(&artists_path)?, &artists_path)?;

        let playlists_path = dir.join(&files.playlists);
        let playlists = parse_table(open_file(&playlists_path)?, &playlists_path)?;

        log::info!(
            "Loaded {} tracks, {} artists, {} playlists from {}",
            tracks.len(),
            artists.len(),
            playlists.len(),
            dir.display()
        );
        Ok(Self::from_parts(tracks, artists, playlists))
    }

    pub fn from_parts(tracks: Vec<Track>, artists: Table, playlists: Table) -> Self {
        Self {
            tracks,
            artists,
            playlists,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn artists(&self) -> &Table {
        &self.artists
    }

    pub fn playlists(&self) -> &Table {
        &self.playlists
    }

    pub fn stats(&self) -> DatasetStats {
        let genres: HashSet<&str> = self.tracks.iter().map(|t| t.genre.as_str()).collect();
        let artists: HashSet<&str> = self.tracks.iter().map(|t| t.artist.as_str()).collect();

        DatasetStats {
            total_tracks: self.tracks.len(),
            missing_release_dates: self
                .tracks
                .iter()
                .filter(|t| t.release_date.is_none())
                .count(),
            distinct_genres: genres.len(),
            distinct_artists: artists.len(),
            year_bounds: crate::filter::year_bounds(&self.tracks).map(|r| (r.min, r.max)),
            artist_rows: self.artists.len(),
            artist_columns: self.artists.headers.clone(),
            playlist_rows: self.playlists.len(),
            playlist_columns: self.playlists.headers.clone(),
        }
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader)
}

/// Parse the tracks dataset. `origin` is only used in error messages.
pub fn parse_tracks<R: Read>(reader: R, origin: &Path) -> Result<Vec<Track>> {
    let csv_err = |source| LoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut rdr = csv_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();
    for column in TRACK_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(LoadError::MissingColumn {
                path: origin.to_path_buf(),
                column,
            });
        }
    }

    let mut tracks = Vec::new();
    let mut missing_dates = 0usize;
    let mut skipped = 0usize;

    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: TrackRow = record.deserialize(Some(&headers)).map_err(csv_err)?;

        let invalid = |field: &'static str, value: &str| LoadError::InvalidField {
            path: origin.to_path_buf(),
            line,
            field,
            value: value.to_string(),
        };

        let year = match numeric_cell(&row.year, parse_year) {
            Cell::Value(y) => y,
            Cell::Blank => {
                log::warn!("line {}: no year for {:?}, skipping row", line, row.name);
                skipped += 1;
                continue;
            }
            Cell::Invalid => return Err(invalid("year", &row.year)),
        };
        let popularity = match numeric_cell(&row.popularity, parse_popularity) {
            Cell::Value(p) => p,
            Cell::Blank => {
                log::warn!("line {}: no popularity for {:?}, skipping row", line, row.name);
                skipped += 1;
                continue;
            }
            Cell::Invalid => return Err(invalid("popularity", &row.popularity)),
        };

        let raw_date = row.release_date.unwrap_or_default();
        let release_date = dates::parse_release_date(&raw_date);
        if release_date.is_none() {
            log::debug!("line {}: unreadable release_date {:?}", line, raw_date);
            missing_dates += 1;
        }

        tracks.push(Track {
            name: row.name,
            artist: row.artist,
            genre: row.genre,
            year,
            popularity,
            release_date,
        });
    }

    if skipped > 0 {
        log::warn!(
            "{}: skipped {} rows with a blank year or popularity",
            origin.display(),
            skipped
        );
    }
    if missing_dates > 0 {
        log::info!(
            "{}: {} of {} tracks have no usable release date",
            origin.display(),
            missing_dates,
            tracks.len()
        );
    }
    Ok(tracks)
}

/// A numeric cell: a value, an empty/NaN cell, or unparseable text.
#[derive(Debug, PartialEq)]
enum Cell<T> {
    Value(T),
    Blank,
    Invalid,
}

/// Blank and `NaN` cells count as absent values, anything else must parse.
fn numeric_cell<T>(raw: &str, parse: fn(&str) -> Option<T>) -> Cell<T> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Cell::Blank;
    }
    match parse(s) {
        Some(v) => Cell::Value(v),
        None => Cell::Invalid,
    }
}

/// Integer years; integral floats ("2020.0") are accepted too.
fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f: f64 = s.parse().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn parse_popularity(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Parse an auxiliary dataset without interpreting its columns.
pub fn parse_table<R: Read>(reader: R, origin: &Path) -> Result<Table> {
    let csv_err = |source| LoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut rdr = csv_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let rows = rdr
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, _>>()
        .map_err(csv_err)?;

    Ok(Table { headers, rows })
}
