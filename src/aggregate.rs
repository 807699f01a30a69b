//! Grouped statistics over a filtered track set.
//!
//! Callers check `FilteredSet::is_empty` before calling any of these; on an
//! empty set they return empty results rather than dividing by zero.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::Datelike;
use serde::{Serialize, Serializer};

use crate::data::Track;
use crate::data::dates::{WEEK, weekday_name};
use crate::filter::FilteredSet;

/// Mean popularity of one genre or artist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: String,
    pub mean: f64,
    pub count: usize,
}

/// A calendar month, ordered chronologically. Serializes as "YYYY-MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthMean {
    pub month: YearMonth,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub day: &'static str,
    pub count: usize,
}

/// Group by `key`, average popularity, sort by mean descending.
/// Ties keep the order in which groups were first seen.
fn mean_popularity_by<'a, F>(set: &FilteredSet<'a>, key: F) -> Vec<GroupMean>
where
    F: Fn(&'a Track) -> &'a str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();

    for track in set.iter() {
        let k = key(track);
        let i = *index.entry(k).or_insert_with(|| {
            groups.push((k, 0.0, 0));
            groups.len() - 1
        });
        groups[i].1 += track.popularity;
        groups[i].2 += 1;
    }

    let mut means: Vec<GroupMean> = groups
        .into_iter()
        .map(|(k, sum, count)| GroupMean {
            key: k.to_string(),
            mean: sum / count as f64,
            count,
        })
        .collect();

    // sort_by is stable, so equal means stay in first-seen order
    means.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    means
}

pub fn mean_popularity_by_genre(set: &FilteredSet<'_>) -> Vec<GroupMean> {
    mean_popularity_by(set, |t| t.genre.as_str())
}

pub fn mean_popularity_by_artist(set: &FilteredSet<'_>) -> Vec<GroupMean> {
    mean_popularity_by(set, |t| t.artist.as_str())
}

/// Mean popularity per release month, oldest first. Tracks without a
/// release date are left out.
pub fn monthly_trend(set: &FilteredSet<'_>) -> Vec<MonthMean> {
    let mut months: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();

    for track in set.iter() {
        let Some(date) = track.release_date else {
            continue;
        };
        let ym = YearMonth {
            year: date.year(),
            month: date.month(),
        };
        let entry = months.entry(ym).or_insert((0.0, 0));
        entry.0 += track.popularity;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|(month, (sum, count))| MonthMean {
            month,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

/// Track counts per release weekday, Monday first. Weekdays with no
/// tracks are omitted.
pub fn weekday_counts(set: &FilteredSet<'_>) -> Vec<WeekdayCount> {
    let mut counts = [0usize; 7];
    for day in set.iter().filter_map(Track::day_of_week) {
        counts[day.num_days_from_monday() as usize] += 1;
    }

    WEEK.iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(day, count)| WeekdayCount {
            day: weekday_name(*day),
            count,
        })
        .collect()
}

/// Highest-popularity track; the earliest row wins a tie.
pub fn most_popular<'a>(set: &FilteredSet<'a>) -> Option<&'a Track> {
    set.iter().fold(None::<&'a Track>, |best, track| match best {
        Some(b) if b.popularity >= track.popularity => Some(b),
        _ => Some(track),
    })
}
