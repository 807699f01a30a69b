use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use trackboard::dashboard;
use trackboard::data::DataStore;
use trackboard::filter::{self, FilterCriteria, YearRange};

#[derive(Parser)]
#[command(name = "trackboard", version, about = "Track popularity dashboard")]
struct Cli {
    /// Directory containing tracks.csv, artists.csv and playlists.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Selection controls shared by the dashboard views.
#[derive(Args)]
struct FilterArgs {
    /// Restrict to a genre (repeatable)
    #[arg(short, long = "genre")]
    genres: Vec<String>,

    /// Restrict to an artist (repeatable)
    #[arg(short, long = "artist")]
    artists: Vec<String>,

    /// First year of the range (defaults to the earliest year in the data)
    #[arg(long)]
    from: Option<i32>,

    /// Last year of the range (defaults to the latest year in the data)
    #[arg(long)]
    to: Option<i32>,
}

impl FilterArgs {
    /// Build criteria, defaulting the year range to the dataset bounds.
    fn criteria(&self, bounds: Option<YearRange>) -> Result<FilterCriteria> {
        let years = filter::select_year_range(self.from, self.to, bounds)
            .context("Check --from and --to")?;
        Ok(FilterCriteria::unrestricted(years)
            .with_genres(self.genres.iter().cloned())
            .with_artists(self.artists.iter().cloned()))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the full dashboard for a selection
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of recommended songs (defaults to config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the view model as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the genres available for selection
    Genres,

    /// List the artists available for a genre selection
    Artists {
        /// Only artists with tracks in this genre (repeatable)
        #[arg(short, long = "genre")]
        genres: Vec<String>,
    },

    /// Show the most popular tracks for a selection
    Top {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of results (defaults to config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show dataset statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = trackboard::config::AppConfig::load();

    // Resolve data directory: CLI > config > current directory
    let data_dir = config.resolve_data_dir(cli.data_dir);
    log::info!("Data directory: {}", data_dir.display());

    let store = DataStore::open(&data_dir, &config.files)
        .with_context(|| format!("Failed to load datasets from {}", data_dir.display()))?;
    let bounds = filter::year_bounds(store.tracks());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Dashboard { filters, limit, json } => {
            let criteria = filters.criteria(bounds)?;
            let n = limit.unwrap_or(config.recommendations);
            let view = dashboard::render(&store, &criteria, n);

            if json {
                serde_json::to_writer_pretty(&mut out, &view)
                    .context("Failed to write JSON")?;
                writeln!(out)?;
            } else {
                trackboard::report::write_dashboard(&mut out, &view)?;
            }
        }

        Commands::Genres => {
            for genre in filter::genre_options(store.tracks()) {
                writeln!(out, "{}", genre)?;
            }
        }

        Commands::Artists { genres } => {
            let genres: BTreeSet<String> = genres.into_iter().collect();
            let artists = filter::artist_options(store.tracks(), &genres);
            if artists.is_empty() {
                writeln!(out, "No artists found for the selected genres.")?;
                return Ok(());
            }
            for artist in artists {
                writeln!(out, "{}", artist)?;
            }
        }

        Commands::Top { filters, limit } => {
            let criteria = filters.criteria(bounds)?;
            let set = filter::apply_filters(store.tracks(), &criteria);
            if set.is_empty() {
                writeln!(out, "{}", dashboard::NO_DATA_MESSAGE)?;
                return Ok(());
            }
            let n = limit.unwrap_or(config.recommendations);
            let recs = trackboard::recommend::recommend(&set, n);
            trackboard::report::write_recommendations(&mut out, &recs)?;
        }

        Commands::Stats => {
            trackboard::report::write_stats(&mut out, &store.stats())?;
        }
    }

    Ok(())
}
