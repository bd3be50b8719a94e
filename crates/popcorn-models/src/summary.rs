use serde::Serialize;
use crate::watched::WatchedEntry;

/// Aggregates shown above the watched list.
///
/// Averages are `None` when there is nothing to average.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: Option<f64>,
    pub avg_user_rating: Option<f64>,
    pub avg_runtime: Option<f64>,
}

impl WatchedSummary {
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        Self {
            count: entries.len(),
            avg_imdb_rating: average(entries.iter().filter_map(|e| e.imdb_rating)),
            avg_user_rating: average(entries.iter().map(|e| f64::from(e.user_rating.get()))),
            avg_runtime: average(entries.iter().map(|e| f64::from(e.runtime_minutes))),
        }
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::UserRating;

    fn entry(id: &str, runtime: u32, imdb: Option<f64>, user: u8) -> WatchedEntry {
        WatchedEntry {
            id: id.to_string(),
            title: id.to_string(),
            year: "2000".to_string(),
            poster_url: String::new(),
            runtime_minutes: runtime,
            imdb_rating: imdb,
            user_rating: UserRating::new(user).unwrap(),
        }
    }

    #[test]
    fn test_empty_list_reports_no_data() {
        let summary = WatchedSummary::from_entries(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.avg_imdb_rating, None);
        assert_eq!(summary.avg_user_rating, None);
        assert_eq!(summary.avg_runtime, None);
    }

    #[test]
    fn test_averages() {
        let entries = vec![
            entry("tt1375666", 148, Some(8.8), 10),
            entry("tt0088763", 116, Some(8.5), 9),
        ];
        let summary = WatchedSummary::from_entries(&entries);
        assert_eq!(summary.count, 2);
        assert!((summary.avg_imdb_rating.unwrap() - 8.65).abs() < 1e-9);
        assert_eq!(summary.avg_user_rating, Some(9.5));
        assert_eq!(summary.avg_runtime, Some(132.0));
    }

    #[test]
    fn test_missing_imdb_ratings_are_skipped() {
        let entries = vec![entry("a", 100, None, 5), entry("b", 100, Some(6.0), 5)];
        let summary = WatchedSummary::from_entries(&entries);
        assert_eq!(summary.avg_imdb_rating, Some(6.0));
    }
}
