// Pitch-type frequency: matchup share vs. overall share per category.

use std::collections::BTreeMap;

use crate::record::PitchRecord;

/// One bar pair in the frequency chart.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub category: String,
    /// Share of the matchup set belonging to this category.
    pub matchup: f64,
    /// Share of the reference set belonging to this category.
    pub overall: f64,
}

/// Frequency rows ordered by category name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequencyTable {
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    /// Build a table from a reference set and a matchup set.
    ///
    /// Categories are the distinct keys of `reference`, sorted. Matchup keys
    /// absent from the reference set are not reported. When either set is
    /// empty its proportions are all zero.
    pub fn compute<T, K, F>(reference: &[T], matchup: &[T], key: F) -> Self
    where
        K: Ord + ToString,
        F: Fn(&T) -> K,
    {
        let overall_counts = count_by(reference, &key);
        let matchup_counts = count_by(matchup, &key);

        let rows = overall_counts
            .iter()
            .map(|(category, &count)| FrequencyRow {
                category: category.to_string(),
                matchup: proportion(
                    matchup_counts.get(category).copied().unwrap_or(0),
                    matchup.len(),
                ),
                overall: proportion(count, reference.len()),
            })
            .collect();

        FrequencyTable { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.category.as_str()).collect()
    }

    pub fn row(&self, category: &str) -> Option<&FrequencyRow> {
        self.rows.iter().find(|r| r.category == category)
    }
}

/// Frequency table keyed by pitch display name, as charted by the dashboard.
pub fn pitch_frequency(reference: &[PitchRecord], matchup: &[PitchRecord]) -> FrequencyTable {
    FrequencyTable::compute(reference, matchup, |r| r.pitch_name())
}

fn count_by<T, K, F>(items: &[T], key: &F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

fn proportion(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
