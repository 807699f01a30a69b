use chrono::{Datelike, NaiveDate, Weekday};

/// One song row from the tracks dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub genre: String,
    pub year: i32,
    pub popularity: f64,
    /// `None` when the source value could not be read as a date.
    pub release_date: Option<NaiveDate>,
}

impl Track {
    /// Weekday of the release date, absent when the date is missing.
    pub fn day_of_week(&self) -> Option<Weekday> {
        self.release_date.map(|d| d.weekday())
    }
}

/// A CSV table kept verbatim (artists and playlists datasets).
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Dataset statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub total_tracks: usize,
    pub missing_release_dates: usize,
    pub distinct_genres: usize,
    pub distinct_artists: usize,
    pub year_bounds: Option<(i32, i32)>,
    pub artist_rows: usize,
    pub artist_columns: Vec<String>,
    pub playlist_rows: usize,
    pub playlist_columns: Vec<String>,
}
