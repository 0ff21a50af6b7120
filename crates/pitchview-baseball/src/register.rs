// Player register: name search over the Chadwick Bureau people register.
//
// The register publishes one row per person across all sports databases,
// split into shards `people-0.csv` .. `people-f.csv`. Only people with an
// MLBAM id who actually appeared in an MLB game are kept; those rows are
// cached locally in a compact CSV with the `RegisterEntry` columns.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A searchable MLB player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEntry {
    pub mlbam_id: u64,
    pub name_first: String,
    pub name_last: String,
    pub played_first: Option<u16>,
    pub played_last: Option<u16>,
}

/// A selectable search result: display label plus MLBAM id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerIdentity {
    pub id: u64,
    pub label: String,
}

impl PlayerIdentity {
    /// Build the selector label `"{First} {Last} - {id}"`, title-cased.
    pub fn from_entry(entry: &RegisterEntry) -> Self {
        let label = title_case(&format!(
            "{} {} - {}",
            entry.name_first.trim(),
            entry.name_last.trim(),
            entry.mlbam_id
        ));
        PlayerIdentity {
            id: entry.mlbam_id,
            label,
        }
    }

    /// Player name without the trailing `" - {id}"`.
    pub fn name(&self) -> &str {
        self.label
            .split(" -")
            .next()
            .unwrap_or(self.label.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// In-memory register of MLB players.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegister {
    entries: Vec<RegisterEntry>,
}

impl PlayerRegister {
    pub fn new(mut entries: Vec<RegisterEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.name_last
                .to_lowercase()
                .cmp(&b.name_last.to_lowercase())
                .then_with(|| a.name_first.to_lowercase().cmp(&b.name_first.to_lowercase()))
                .then(a.mlbam_id.cmp(&b.mlbam_id))
        });
        entries.dedup_by_key(|e| e.mlbam_id);
        PlayerRegister { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find players by last name and, optionally, first name. Both compare
    /// case-insensitively after trimming; an empty first name matches anyone.
    pub fn search(&self, first: Option<&str>, last: &str) -> Vec<PlayerIdentity> {
        let last = last.trim().to_lowercase();
        if last.is_empty() {
            return Vec::new();
        }
        let first = first
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());

        self.entries
            .iter()
            .filter(|e| e.name_last.trim().to_lowercase() == last)
            .filter(|e| {
                first
                    .as_deref()
                    .map_or(true, |f| e.name_first.trim().to_lowercase() == f)
            })
            .map(PlayerIdentity::from_entry)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Chadwick shard parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPerson {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    key_mlbam: Option<u64>,
    #[serde(default)]
    name_first: String,
    #[serde(default)]
    name_last: String,
    // Written as "2008" or "2008.0" depending on the export.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    mlb_played_first: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    mlb_played_last: Option<f64>,
}

fn year(v: Option<f64>) -> Option<u16> {
    v.filter(|y| y.is_finite() && *y > 0.0 && *y < f64::from(u16::MAX))
        .map(|y| y.round() as u16)
}

/// Read one register shard, keeping MLB players only.
pub fn read_chadwick_shard<R: Read>(rdr: R) -> Result<Vec<RegisterEntry>, RegisterError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RawPerson>() {
        match result {
            Ok(raw) => {
                let (Some(id), Some(first_year)) = (raw.key_mlbam, year(raw.mlb_played_first))
                else {
                    continue;
                };
                if raw.name_last.trim().is_empty() {
                    continue;
                }
                entries.push(RegisterEntry {
                    mlbam_id: id,
                    name_first: raw.name_first.trim().to_string(),
                    name_last: raw.name_last.trim().to_string(),
                    played_first: Some(first_year),
                    played_last: year(raw.mlb_played_last),
                });
            }
            Err(e) => warn!("skipping malformed register row: {}", e),
        }
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Local cache
// ---------------------------------------------------------------------------

pub fn read_cache<R: Read>(rdr: R) -> Result<Vec<RegisterEntry>, RegisterError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RegisterEntry>() {
        entries.push(result?);
    }
    Ok(entries)
}

pub fn write_cache<W: Write>(wtr: W, entries: &[RegisterEntry]) -> Result<(), RegisterError> {
    let mut writer = csv::Writer::from_writer(wtr);
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Capitalize the first letter of every alphabetic run and lower-case the
/// rest, so "o'NEILL" becomes "O'Neill".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SHARD: &str = "\
key_person,key_uuid,key_mlbam,key_retro,key_bbref,name_last,name_first,name_given,mlb_played_first,mlb_played_last
aaaa0001,u1,477132,kersc001,kershcl01,Kershaw,Clayton,Clayton Edward,2008,2024
aaaa0002,u2,,,,Kershaw,Minor,Minor League,,
aaaa0003,u3,545361,troum001,troutmi01,Trout,Mike,Michael Nelson,2011.0,2024.0
aaaa0004,u4,999999,,,Trout,Steve,Steven,,
aaaa0005,u5,605141,bettm001,bettsmo01,Betts,Mookie,Markus Lynn,2014,2024
";

    fn register() -> PlayerRegister {
        PlayerRegister::new(read_chadwick_shard(SHARD.as_bytes()).unwrap())
    }

    #[test]
    fn shard_keeps_only_mlb_players() {
        let entries = read_chadwick_shard(SHARD.as_bytes()).unwrap();
        let ids: Vec<u64> = entries.iter().map(|e| e.mlbam_id).collect();
        assert_eq!(ids, vec![477132, 545361, 605141]);
        assert_eq!(entries[1].played_first, Some(2011));
        assert_eq!(entries[1].played_last, Some(2024));
    }

    #[test]
    fn search_by_last_name_only() {
        let results = register().search(None, "trout");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 545361);
        assert_eq!(results[0].label, "Mike Trout - 545361");
    }

    #[test]
    fn empty_first_name_matches_anyone() {
        assert_eq!(register().search(Some("  "), "Kershaw").len(), 1);
    }

    #[test]
    fn first_name_narrows_results() {
        let reg = register();
        assert_eq!(reg.search(Some("clayton"), "KERSHAW").len(), 1);
        assert!(reg.search(Some("Mike"), "Kershaw").is_empty());
    }

    #[test]
    fn empty_last_name_finds_nothing() {
        assert!(register().search(Some("Mike"), "").is_empty());
    }

    #[test]
    fn identity_name_strips_id_suffix() {
        let id = PlayerIdentity {
            id: 477132,
            label: "Clayton Kershaw - 477132".into(),
        };
        assert_eq!(id.name(), "Clayton Kershaw");
    }

    #[test]
    fn title_case_handles_punctuation() {
        assert_eq!(title_case("o'neill"), "O'Neill");
        assert_eq!(title_case("JEAN-PAUL smith - 12"), "Jean-Paul Smith - 12");
        assert_eq!(title_case("j.d. martinez"), "J.D. Martinez");
    }

    #[test]
    fn cache_round_trip_preserves_entries() {
        let entries = read_chadwick_shard(SHARD.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_cache(&mut buf, &entries).unwrap();
        let restored = read_cache(buf.as_slice()).unwrap();
        assert_eq!(restored, entries);
    }

    #[test]
    fn register_deduplicates_ids() {
        let mut entries = read_chadwick_shard(SHARD.as_bytes()).unwrap();
        entries.extend(entries.clone());
        assert_eq!(PlayerRegister::new(entries).len(), 3);
    }
}
