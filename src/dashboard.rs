//! One full recomputation pass: filter, aggregate, recommend.
//!
//! `render` is pure. The caller re-runs it whenever the selection changes.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{self, GroupMean, MonthMean, WeekdayCount};
use crate::data::DataStore;
use crate::filter::{self, FilterCriteria, YearRange};
use crate::recommend::{self, Recommendation};

pub const NO_DATA_MESSAGE: &str =
    "No data available for the selected filters. Please adjust your selections.";

/// Everything the presentation layer needs for one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub genre_options: Vec<String>,
    pub artist_options: Vec<String>,
    pub year_bounds: Option<YearRange>,
    pub criteria: FilterCriteria,
    pub content: DashboardContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardContent {
    NoData { message: String },
    Summary(Box<Summary>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub track_count: usize,
    /// Present only when genres were selected.
    pub genre_popularity: Option<Vec<GroupMean>>,
    /// Present only when artists were selected.
    pub artist_popularity: Option<Vec<GroupMean>>,
    pub monthly_trend: Vec<MonthMean>,
    pub weekday_counts: Vec<WeekdayCount>,
    pub most_popular: TrackReadout,
    pub recommendations: Vec<Recommendation>,
}

/// The "most popular track" readout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReadout {
    pub name: String,
    pub artist: String,
    pub popularity: f64,
    pub release_date: Option<NaiveDate>,
}

impl ViewModel {
    pub fn summary(&self) -> Option<&Summary> {
        match &self.content {
            DashboardContent::Summary(s) => Some(s.as_ref()),
            DashboardContent::NoData { .. } => None,
        }
    }
}

pub fn render(store: &DataStore, criteria: &FilterCriteria, recommendations: usize) -> ViewModel {
    let tracks = store.tracks();
    let set = filter::apply_filters(tracks, criteria);

    let content = match aggregate::most_popular(&set) {
        None => DashboardContent::NoData {
            message: NO_DATA_MESSAGE.to_string(),
        },
        Some(top) => {
            let genre_popularity = (!criteria.genres.is_empty())
                .then(|| aggregate::mean_popularity_by_genre(&set));
            let artist_popularity = (!criteria.artists.is_empty())
                .then(|| aggregate::mean_popularity_by_artist(&set));

            DashboardContent::Summary(Box::new(Summary {
                track_count: set.len(),
                genre_popularity,
                artist_popularity,
                monthly_trend: aggregate::monthly_trend(&set),
                weekday_counts: aggregate::weekday_counts(&set),
                most_popular: TrackReadout {
                    name: top.name.clone(),
                    artist: top.artist.clone(),
                    popularity: top.popularity,
                    release_date: top.release_date,
                },
                recommendations: recommend::recommend(&set, recommendations),
            }))
        }
    };

    ViewModel {
        genre_options: filter::genre_options(tracks),
        artist_options: filter::artist_options(tracks, &criteria.genres),
        year_bounds: filter::year_bounds(tracks),
        criteria: criteria.clone(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Table;
    use crate::filter::tests::{sample_tracks, years};

    fn store() -> DataStore {
        DataStore::from_parts(sample_tracks(), Table::default(), Table::default())
    }

    #[test]
    fn pop_selection_end_to_end() {
        let store = store();
        let c = years(2020, 2021).with_genres(["pop"]);
        let view = render(&store, &c, 1);

        assert_eq!(view.genre_options, vec!["pop", "rock"]);
        assert_eq!(view.artist_options, vec!["A", "B"]);
        assert_eq!(view.year_bounds, Some(YearRange::new(2020, 2021)));

        let summary = view.summary().expect("expected data");
        assert_eq!(summary.track_count, 2);

        let genres = summary.genre_popularity.as_ref().unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].key, "pop");
        assert!((genres[0].mean - 70.0).abs() < 1e-9);

        // No artist selection, so no artist chart
        assert!(summary.artist_popularity.is_none());

        assert_eq!(summary.most_popular.name, "Row One");
        assert_eq!(summary.most_popular.artist, "A");
        assert_eq!(summary.recommendations.len(), 1);
        assert_eq!(summary.recommendations[0].artist, "A");
        assert!((summary.recommendations[0].popularity - 80.0).abs() < 1e-9);

        assert_eq!(summary.monthly_trend.len(), 2);
        // Both pop releases fell on a Monday
        assert_eq!(summary.weekday_counts.len(), 1);
        assert_eq!(summary.weekday_counts[0].day, "Monday");
        assert_eq!(summary.weekday_counts[0].count, 2);
    }

    #[test]
    fn empty_range_takes_no_data_path() {
        let store = store();
        let view = render(&store, &years(2022, 2023), 5);
        assert_eq!(
            view.content,
            DashboardContent::NoData {
                message: NO_DATA_MESSAGE.to_string()
            }
        );
        assert!(view.summary().is_none());
        // Options are still offered
        assert_eq!(view.genre_options.len(), 2);
    }

    #[test]
    fn unrestricted_selection_skips_group_charts() {
        let store = store();
        let view = render(&store, &years(2020, 2021), 5);
        let summary = view.summary().unwrap();
        assert!(summary.genre_popularity.is_none());
        assert!(summary.artist_popularity.is_none());
        assert_eq!(summary.most_popular.name, "Row Three");
        assert_eq!(summary.recommendations.len(), 3);
    }

    #[test]
    fn artist_selection_adds_artist_chart() {
        let store = store();
        let c = years(2020, 2021).with_artists(["B", "C"]);
        let view = render(&store, &c, 5);
        let artists = view.summary().unwrap().artist_popularity.as_ref().unwrap();
        let keys: Vec<_> = artists.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["C", "B"]);
    }

    #[test]
    fn empty_store_has_no_bounds_and_no_data() {
        let store = DataStore::default();
        let view = render(&store, &years(2000, 2001), 5);
        assert!(view.year_bounds.is_none());
        assert!(view.genre_options.is_empty());
        assert!(view.summary().is_none());
    }

    #[test]
    fn view_model_serializes_with_state_tag() {
        let store = store();
        let view = render(&store, &years(2022, 2023), 5);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["content"]["state"], "no_data");

        let view = render(&store, &years(2020, 2021), 5);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["content"]["state"], "summary");
        assert_eq!(json["content"]["most_popular"]["release_date"], "2020-06-01");
        assert_eq!(json["content"]["monthly_trend"][0]["month"], "2020-01");
    }
}
