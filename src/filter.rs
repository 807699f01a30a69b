use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::data::Track;

/// Inclusive year range. User input goes through `select_year_range`,
/// which guarantees `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("invalid year range: from {from} is after to {to}")]
    InvertedYearRange { from: i32, to: i32 },
}

/// Turn the year controls into a range.
///
/// Omitted ends default to the dataset bounds (unbounded when there is no
/// data). Ends are clamped to the bounds; a range lying wholly outside the
/// data is kept as given so that it selects nothing.
pub fn select_year_range(
    from: Option<i32>,
    to: Option<i32>,
    bounds: Option<YearRange>,
) -> Result<YearRange, SelectionError> {
    let min = from.or(bounds.map(|b| b.min)).unwrap_or(i32::MIN);
    let max = to.or(bounds.map(|b| b.max)).unwrap_or(i32::MAX);
    if min > max {
        return Err(SelectionError::InvertedYearRange { from: min, to: max });
    }

    let requested = YearRange { min, max };
    let Some(b) = bounds else {
        return Ok(requested);
    };
    let clamped = YearRange {
        min: min.max(b.min),
        max: max.min(b.max),
    };
    if clamped.min > clamped.max {
        log::debug!("Year range {}..={} lies outside the data", min, max);
        Ok(requested)
    } else {
        Ok(clamped)
    }
}

/// The user's current selection. Empty sets mean "no restriction".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub genres: BTreeSet<String>,
    pub artists: BTreeSet<String>,
    pub year_range: YearRange,
}

impl FilterCriteria {
    /// Nothing selected, year range spanning `bounds`.
    pub fn unrestricted(bounds: YearRange) -> Self {
        Self {
            genres: BTreeSet::new(),
            artists: BTreeSet::new(),
            year_range: bounds,
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists = artists.into_iter().map(Into::into).collect();
        self
    }
}

/// Tracks matching a `FilterCriteria`, borrowed from the store in their
/// original order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSet<'a> {
    rows: Vec<&'a Track>,
}

impl<'a> FilteredSet<'a> {
    pub fn rows(&self) -> &[&'a Track] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Track> + '_ {
        self.rows.iter().copied()
    }
}

fn genre_selected(track: &Track, genres: &BTreeSet<String>) -> bool {
    genres.is_empty() || genres.contains(&track.genre)
}

fn artist_selected(track: &Track, artists: &BTreeSet<String>) -> bool {
    artists.is_empty() || artists.contains(&track.artist)
}

/// Apply genre, then artist, then year restrictions.
pub fn apply_filters<'a>(tracks: &'a [Track], criteria: &FilterCriteria) -> FilteredSet<'a> {
    let rows: Vec<&Track> = tracks
        .iter()
        .filter(|t| genre_selected(t, &criteria.genres))
        .filter(|t| artist_selected(t, &criteria.artists))
        .filter(|t| criteria.year_range.contains(t.year))
        .collect();

    log::debug!(
        "Filter kept {} of {} tracks (genres={}, artists={}, years={}..={})",
        rows.len(),
        tracks.len(),
        criteria.genres.len(),
        criteria.artists.len(),
        criteria.year_range.min,
        criteria.year_range.max
    );
    FilteredSet { rows }
}

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Genres offered for selection.
pub fn genre_options(tracks: &[Track]) -> Vec<String> {
    distinct(tracks.iter().map(|t| t.genre.as_str()))
}

/// Artists offered for selection, limited to the selected genres (all
/// artists when no genre is selected).
pub fn artist_options(tracks: &[Track], genres: &BTreeSet<String>) -> Vec<String> {
    distinct(
        tracks
            .iter()
            .filter(|t| genre_selected(t, genres))
            .map(|t| t.artist.as_str()),
    )
}

/// Observed year span of the collection, `None` when it is empty.
pub fn year_bounds(tracks: &[Track]) -> Option<YearRange> {
    let min = tracks.iter().map(|t| t.year).min()?;
    let max = tracks.iter().map(|t| t.year).max()?;
    Some(YearRange { min, max })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn make_track(
        name: &str,
        artist: &str,
        genre: &str,
        year: i32,
        popularity: f64,
        release_date: Option<&str>,
    ) -> Track {
        Track {
            name: name.to_string(),
            artist: artist.to_string(),
            genre: genre.to_string(),
            year,
            popularity,
            release_date: release_date
                .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
        }
    }

    /// The three-row example: two pop tracks and one rock track.
    pub(crate) fn sample_tracks() -> Vec<Track> {
        vec![
            make_track("Row One", "A", "pop", 2020, 80.0, Some("2020-01-06")),
            make_track("Row Two", "B", "pop", 2021, 60.0, Some("2021-03-15")),
            make_track("Row Three", "C", "rock", 2020, 90.0, Some("2020-06-01")),
        ]
    }

    fn wide_tracks() -> Vec<Track> {
        vec![
            make_track("t1", "A", "pop", 2018, 50.0, None),
            make_track("t2", "B", "rock", 2019, 70.0, Some("2019-02-01")),
            make_track("t3", "A", "pop", 2020, 40.0, Some("2020-03-03")),
            make_track("t4", "D", "jazz", 2021, 65.0, Some("2021-07-07")),
            make_track("t5", "B", "pop", 2022, 85.0, Some("2022-12-24")),
            make_track("t6", "E", "rock", 2020, 30.0, None),
        ]
    }

    /// No genre or artist selection over `min..=max`.
    pub(crate) fn years(min: i32, max: i32) -> FilterCriteria {
        FilterCriteria::unrestricted(YearRange::new(min, max))
    }

    fn criteria(genres: &[&str], artists: &[&str], min: i32, max: i32) -> FilterCriteria {
        years(min, max)
            .with_genres(genres.iter().copied())
            .with_artists(artists.iter().copied())
    }

    fn names(set: &FilteredSet<'_>) -> Vec<String> {
        set.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn genre_selection_with_full_year_range() {
        let tracks = sample_tracks();
        let set = apply_filters(&tracks, &criteria(&["pop"], &[], 2020, 2021));
        assert_eq!(names(&set), vec!["Row One", "Row Two"]);
    }

    #[test]
    fn year_range_outside_data_is_empty() {
        let tracks = sample_tracks();
        let set = apply_filters(&tracks, &criteria(&[], &[], 2022, 2023));
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn single_year_range() {
        let tracks = wide_tracks();
        let set = apply_filters(&tracks, &criteria(&[], &[], 2020, 2020));
        assert_eq!(names(&set), vec!["t3", "t6"]);
        assert!(set.iter().all(|t| t.year == 2020));
    }

    #[test]
    fn every_row_satisfies_active_predicates() {
        let tracks = wide_tracks();
        let cases = [
            criteria(&[], &[], 2018, 2022),
            criteria(&["pop"], &[], 2018, 2022),
            criteria(&["pop", "rock"], &["B"], 2019, 2022),
            criteria(&[], &["A", "E"], 2020, 2020),
            criteria(&["jazz"], &["A"], 2018, 2022),
        ];
        for c in &cases {
            let set = apply_filters(&tracks, c);
            assert!(set.len() <= tracks.len());
            for t in set.iter() {
                assert!(c.genres.is_empty() || c.genres.contains(&t.genre));
                assert!(c.artists.is_empty() || c.artists.contains(&t.artist));
                assert!(c.year_range.contains(t.year));
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let tracks = wide_tracks();
        let c = criteria(&["pop", "rock"], &["B"], 2019, 2022);
        assert_eq!(apply_filters(&tracks, &c), apply_filters(&tracks, &c));
        assert_eq!(names(&apply_filters(&tracks, &c)), vec!["t2", "t5"]);
    }

    #[test]
    fn artist_outside_selected_genres_matches_nothing() {
        let tracks = wide_tracks();
        let set = apply_filters(&tracks, &criteria(&["jazz"], &["A"], 2018, 2022));
        assert!(set.is_empty());
    }

    #[test]
    fn options_are_distinct_in_first_seen_order() {
        let tracks = wide_tracks();
        assert_eq!(genre_options(&tracks), vec!["pop", "rock", "jazz"]);
        assert_eq!(
            artist_options(&tracks, &BTreeSet::new()),
            vec!["A", "B", "D", "E"]
        );
    }

    #[test]
    fn artist_options_follow_genre_selection() {
        let tracks = wide_tracks();
        let rock: BTreeSet<String> = ["rock".to_string()].into_iter().collect();
        assert_eq!(artist_options(&tracks, &rock), vec!["B", "E"]);

        let pop_jazz: BTreeSet<String> = ["pop", "jazz"].iter().map(|s| s.to_string()).collect();
        assert_eq!(artist_options(&tracks, &pop_jazz), vec!["A", "D", "B"]);
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let bounds = Some(YearRange::new(2000, 2020));
        assert_eq!(
            select_year_range(Some(2015), Some(2010), bounds),
            Err(SelectionError::InvertedYearRange {
                from: 2015,
                to: 2010
            })
        );
        // An omitted end takes the bound before the check
        assert!(select_year_range(Some(2021), None, bounds).is_err());
    }

    #[test]
    fn omitted_years_take_dataset_bounds() {
        let bounds = Some(YearRange::new(2018, 2022));
        assert_eq!(
            select_year_range(None, None, bounds),
            Ok(YearRange::new(2018, 2022))
        );
        assert_eq!(
            select_year_range(Some(2020), None, bounds),
            Ok(YearRange::new(2020, 2022))
        );
        assert_eq!(
            select_year_range(None, Some(2019), bounds),
            Ok(YearRange::new(2018, 2019))
        );
    }

    #[test]
    fn no_data_means_unbounded_years() {
        assert_eq!(
            select_year_range(None, None, None),
            Ok(YearRange::new(i32::MIN, i32::MAX))
        );
        assert_eq!(
            select_year_range(Some(1990), Some(1995), None),
            Ok(YearRange::new(1990, 1995))
        );
    }

    #[test]
    fn years_are_clamped_to_bounds() {
        let bounds = Some(YearRange::new(2018, 2022));
        assert_eq!(
            select_year_range(Some(1900), Some(2100), bounds),
            Ok(YearRange::new(2018, 2022))
        );
        assert_eq!(
            select_year_range(Some(2010), Some(2019), bounds),
            Ok(YearRange::new(2018, 2019))
        );
    }

    #[test]
    fn range_outside_data_still_selects_nothing() {
        let tracks = wide_tracks();
        let range = select_year_range(Some(1950), Some(1960), year_bounds(&tracks)).unwrap();
        assert_eq!(range, YearRange::new(1950, 1960));
        assert!(apply_filters(&tracks, &FilterCriteria::unrestricted(range)).is_empty());
    }

    #[test]
    fn bounds_of_collection() {
        assert_eq!(year_bounds(&wide_tracks()), Some(YearRange::new(2018, 2022)));
        assert_eq!(year_bounds(&[]), None);
    }
}
