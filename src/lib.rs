pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod filter;
pub mod recommend;
pub mod report;

/// Application name for XDG paths
pub const APP_NAME: &str = "trackboard";

/// Number of recommendations shown when neither CLI nor config says otherwise
pub const DEFAULT_RECOMMENDATIONS: usize = 5;
