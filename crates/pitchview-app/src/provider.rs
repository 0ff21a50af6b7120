// Statistics retrieval: the `StatsProvider` seam and its Baseball Savant
// implementation.
//
// Pitch data comes from Savant's `statcast_search/csv` endpoint, one request
// per player. Name search runs against the Chadwick Bureau people register,
// which is downloaded shard by shard on first use and cached on disk so later
// sessions search offline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use pitchview_baseball::record::{parse_pitches, PitchRecord, RecordError};
use pitchview_baseball::register::{
    read_cache, read_chadwick_shard, write_cache, PlayerIdentity, PlayerRegister, RegisterEntry,
    RegisterError,
};

use crate::config::{Config, RegisterConfig};

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("start date {start} is after end date {end}")]
    Reversed { start: NaiveDate, end: NaiveDate },

    #[error("start date {start} is before the earliest supported date {earliest}")]
    BeforeEarliest { start: NaiveDate, earliest: NaiveDate },

    #[error("end date {end} is in the future")]
    AfterToday { end: NaiveDate, today: NaiveDate },
}

/// Inclusive game-date range for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        earliest: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        if start < earliest {
            return Err(RangeError::BeforeEarliest { start, earliest });
        }
        if end > today {
            return Err(RangeError::AfterToday { end, today });
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unreadable pitch data: {0}")]
    Parse(#[from] RecordError),

    #[error("unreadable player register: {0}")]
    Register(#[from] RegisterError),

    #[error("player register cache {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Source of player identities and pitch-by-pitch data.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Players whose last name equals `last` and, when `first` is non-empty,
    /// whose first name equals `first`. Case-insensitive.
    async fn search_players(
        &self,
        first: &str,
        last: &str,
    ) -> Result<Vec<PlayerIdentity>, FetchError>;

    /// Every pitch thrown by pitcher `id` within `range`.
    async fn pitches_by_pitcher(
        &self,
        id: u64,
        range: DateRange,
    ) -> Result<Vec<PitchRecord>, FetchError>;

    /// Every pitch faced by batter `id` within `range`.
    async fn pitches_faced_by_batter(
        &self,
        id: u64,
        range: DateRange,
    ) -> Result<Vec<PitchRecord>, FetchError>;
}

// ---------------------------------------------------------------------------
// Savant client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerType {
    Pitcher,
    Batter,
}

impl PlayerType {
    fn as_str(self) -> &'static str {
        match self {
            PlayerType::Pitcher => "pitcher",
            PlayerType::Batter => "batter",
        }
    }

    fn lookup_param(self) -> &'static str {
        match self {
            PlayerType::Pitcher => "pitchers_lookup[]",
            PlayerType::Batter => "batters_lookup[]",
        }
    }
}

/// Query parameters for one player's pitches over `range`: regular season,
/// postseason and spring training, every pitch listed individually.
pub fn savant_query(
    player_type: PlayerType,
    id: u64,
    range: DateRange,
) -> Vec<(&'static str, String)> {
    vec![
        ("all", "true".into()),
        ("type", "details".into()),
        ("player_type", player_type.as_str().into()),
        (player_type.lookup_param(), id.to_string()),
        ("game_date_gt", range.start().format("%Y-%m-%d").to_string()),
        ("game_date_lt", range.end().format("%Y-%m-%d").to_string()),
        ("hfGT", "R|PO|S|".into()),
        ("min_pitches", "0".into()),
        ("min_results", "0".into()),
        ("group_by", "name".into()),
        ("sort_col", "pitches".into()),
        ("sort_order", "desc".into()),
        ("min_abs", "0".into()),
    ]
}

/// Production provider backed by Baseball Savant and the Chadwick register.
pub struct SavantClient {
    http: reqwest::Client,
    savant_url: String,
    register_config: RegisterConfig,
    cache_dir: Option<PathBuf>,
    register: OnceCell<PlayerRegister>,
}

impl SavantClient {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.savant.timeout_secs))
            .user_agent(concat!("pitchview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        let cache_dir = directories::ProjectDirs::from("", "", "pitchview")
            .map(|dirs| dirs.cache_dir().to_path_buf());
        if cache_dir.is_none() {
            warn!("no platform cache directory; the player register will not be cached");
        }

        Ok(SavantClient {
            http,
            savant_url: config.savant.base_url.clone(),
            register_config: config.register.clone(),
            cache_dir,
            register: OnceCell::new(),
        })
    }

    /// Override where the player register cache lives.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    fn cache_path(&self) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(&self.register_config.cache_file))
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_pitches(
        &self,
        player_type: PlayerType,
        id: u64,
        range: DateRange,
    ) -> Result<Vec<PitchRecord>, FetchError> {
        let query = savant_query(player_type, id, range);
        let body = self.get_text(&self.savant_url, &query).await?;
        let pitches = parse_pitches(&body)?;
        debug!(
            "Fetched {} pitches for {} {} ({} to {})",
            pitches.len(),
            player_type.as_str(),
            id,
            range.start(),
            range.end()
        );
        Ok(pitches)
    }

    async fn player_register(&self) -> Result<&PlayerRegister, FetchError> {
        self.register.get_or_try_init(|| self.load_register()).await
    }

    /// Load the register from the local cache, downloading and caching it
    /// when the cache is absent or unreadable.
    async fn load_register(&self) -> Result<PlayerRegister, FetchError> {
        if let Some(path) = self.cache_path() {
            match read_cache_file(&path).await {
                Ok(Some(entries)) => {
                    info!(
                        "Loaded {} players from register cache {}",
                        entries.len(),
                        path.display()
                    );
                    return Ok(PlayerRegister::new(entries));
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable register cache: {}", e),
            }
        }

        let mut entries = Vec::new();
        for shard in self.register_config.shards.chars() {
            let url = format!(
                "{}/people-{}.csv",
                self.register_config.base_url.trim_end_matches('/'),
                shard
            );
            let body = self.get_text(&url, &[]).await?;
            let mut shard_entries = read_chadwick_shard(body.as_bytes())?;
            debug!("Register shard {}: {} MLB players", shard, shard_entries.len());
            entries.append(&mut shard_entries);
        }
        info!("Downloaded player register: {} MLB players", entries.len());

        if let Some(path) = self.cache_path() {
            if let Err(e) = write_cache_file(&path, &entries).await {
                warn!("Failed to write register cache: {}", e);
            }
        }

        Ok(PlayerRegister::new(entries))
    }
}

#[async_trait]
impl StatsProvider for SavantClient {
    async fn search_players(
        &self,
        first: &str,
        last: &str,
    ) -> Result<Vec<PlayerIdentity>, FetchError> {
        let register = self.player_register().await?;
        Ok(register.search(Some(first), last))
    }

    async fn pitches_by_pitcher(
        &self,
        id: u64,
        range: DateRange,
    ) -> Result<Vec<PitchRecord>, FetchError> {
        self.fetch_pitches(PlayerType::Pitcher, id, range).await
    }

    async fn pitches_faced_by_batter(
        &self,
        id: u64,
        range: DateRange,
    ) -> Result<Vec<PitchRecord>, FetchError> {
        self.fetch_pitches(PlayerType::Batter, id, range).await
    }
}

// ---------------------------------------------------------------------------
// Register cache file
// ---------------------------------------------------------------------------

/// `Ok(None)` when no cache file exists yet.
async fn read_cache_file(
    path: &Path,
) -> Result<Option<Vec<RegisterEntry>>, FetchError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(FetchError::Cache {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let entries = read_cache(bytes.as_slice())?;
    if entries.is_empty() {
        return Ok(None);
    }
    Ok(Some(entries))
}

async fn write_cache_file(
    path: &Path,
    entries: &[RegisterEntry],
) -> Result<(), FetchError> {
    let mut buf = Vec::new();
    write_cache(&mut buf, entries)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FetchError::Cache {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, buf)
        .await
        .map_err(|source| FetchError::Cache {
            path: path.to_path_buf(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
