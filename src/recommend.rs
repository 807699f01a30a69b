use serde::Serialize;

use crate::filter::FilteredSet;

/// A recommended track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub artist: String,
    pub popularity: f64,
}

/// The `n` most popular tracks of the set, most popular first.
/// Equal popularity keeps the set's original order.
pub fn recommend(set: &FilteredSet<'_>, n: usize) -> Vec<Recommendation> {
    let mut ranked: Vec<_> = set.iter().collect();
    ranked.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    ranked
        .into_iter()
        .take(n)
        .map(|t| Recommendation {
            name: t.name.clone(),
            artist: t.artist.clone(),
            popularity: t.popularity,
        })
        .collect()
}
