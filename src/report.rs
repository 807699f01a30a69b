//! Terminal rendering of a `ViewModel`.

use std::io::{self, Write};

use crate::aggregate::GroupMean;
use crate::dashboard::{DashboardContent, Summary, ViewModel};
use crate::data::DatasetStats;
use crate::recommend::Recommendation;

/// Width of the longest bar in a chart.
const BAR_WIDTH: usize = 40;
/// Label column width; longer labels are truncated.
const LABEL_WIDTH: usize = 25;

/// A horizontal bar scaled against `max`.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.clamp(1, BAR_WIDTH))
}

fn truncate(label: &str) -> String {
    if label.chars().count() > LABEL_WIDTH {
        let head: String = label.chars().take(LABEL_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}

/// Print a labelled bar chart.
fn write_chart<W: Write>(
    out: &mut W,
    title: &str,
    rows: &[(String, f64)],
    decimals: usize,
) -> io::Result<()> {
    writeln!(out, "### {}", title)?;
    let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    for (label, value) in rows {
        writeln!(
            out,
            "{:<width$} {:>7.prec$}  {}",
            truncate(label),
            value,
            bar(*value, max),
            width = LABEL_WIDTH,
            prec = decimals,
        )?;
    }
    writeln!(out)
}

fn mean_rows(groups: &[GroupMean]) -> Vec<(String, f64)> {
    groups.iter().map(|g| (g.key.clone(), g.mean)).collect()
}

pub fn write_dashboard<W: Write>(out: &mut W, view: &ViewModel) -> io::Result<()> {
    let c = &view.criteria;
    writeln!(out, "Track Popularity Dashboard")?;
    writeln!(out, "==========================")?;
    writeln!(
        out,
        "Genres: {} | Artists: {} | Years: {}-{}",
        selection_label(&c.genres),
        selection_label(&c.artists),
        c.year_range.min,
        c.year_range.max
    )?;
    writeln!(out)?;

    match &view.content {
        DashboardContent::NoData { message } => writeln!(out, "{}", message)?,
        DashboardContent::Summary(summary) => write_summary(out, summary)?,
    }

    writeln!(out)?;
    writeln!(out, "Adjust --genre, --artist, --from and --to to compare genres or artists")?;
    writeln!(out, "and see how popularity changes over time.")
}

fn selection_label(set: &std::collections::BTreeSet<String>) -> String {
    if set.is_empty() {
        "all".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn write_summary<W: Write>(out: &mut W, s: &Summary) -> io::Result<()> {
    writeln!(out, "{} tracks match the selection.", s.track_count)?;
    writeln!(out)?;

    if let Some(genres) = &s.genre_popularity {
        write_chart(out, "Popularity by Genre", &mean_rows(genres), 1)?;
    }
    if let Some(artists) = &s.artist_popularity {
        write_chart(out, "Popularity by Artist", &mean_rows(artists), 1)?;
    }

    if s.monthly_trend.is_empty() {
        writeln!(out, "### Popularity Trends Over Time")?;
        writeln!(out, "No release dates available.")?;
        writeln!(out)?;
    } else {
        let rows: Vec<_> = s
            .monthly_trend
            .iter()
            .map(|m| (m.month.to_string(), m.mean))
            .collect();
        write_chart(out, "Popularity Trends Over Time", &rows, 1)?;
    }

    let rows: Vec<_> = s
        .weekday_counts
        .iter()
        .map(|d| (d.day.to_string(), d.count as f64))
        .collect();
    write_chart(out, "Tracks by Day of the Week", &rows, 0)?;

    let top = &s.most_popular;
    writeln!(out, "### Most Popular Track")?;
    writeln!(out, "Track Name:       {}", top.name)?;
    writeln!(out, "Artist:           {}", top.artist)?;
    writeln!(out, "Popularity Score: {}", top.popularity)?;
    match top.release_date {
        Some(d) => writeln!(out, "Release Date:     {}", d)?,
        None => writeln!(out, "Release Date:     unknown")?,
    }
    writeln!(out)?;

    write_recommendations(out, &s.recommendations)
}

pub fn write_recommendations<W: Write>(out: &mut W, recs: &[Recommendation]) -> io::Result<()> {
    writeln!(out, "Recommended Songs:")?;
    for (i, r) in recs.iter().enumerate() {
        writeln!(
            out,
            "  {}. {} by {} (Popularity: {})",
            i + 1,
            r.name,
            r.artist,
            r.popularity
        )?;
    }
    Ok(())
}

pub fn write_stats<W: Write>(out: &mut W, stats: &DatasetStats) -> io::Result<()> {
    writeln!(out, "Dataset Statistics")?;
    writeln!(out, "==================")?;
    writeln!(out, "Total tracks:       {}", stats.total_tracks)?;
    writeln!(out, "Missing dates:      {}", stats.missing_release_dates)?;
    writeln!(out, "Distinct genres:    {}", stats.distinct_genres)?;
    writeln!(out, "Distinct artists:   {}", stats.distinct_artists)?;
    match stats.year_bounds {
        Some((min, max)) => writeln!(out, "Years:              {}-{}", min, max)?,
        None => writeln!(out, "Years:              -")?,
    }
    writeln!(out)?;
    writeln!(
        out,
        "artists table:      {} rows [{}]",
        stats.artist_rows,
        stats.artist_columns.join(", ")
    )?;
    writeln!(
        out,
        "playlists table:    {} rows [{}]",
        stats.playlist_rows,
        stats.playlist_columns.join(", ")
    )
}
