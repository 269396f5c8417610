//! Record store over exported JSON collections.
//!
//! Stands in for the document database: each collection is a JSON array in
//! the data directory, loaded wholesale and filtered in memory.

use crate::analysis::DefaultSiteCache;
use crate::config::DataConfig;
use crate::models::{FeedbackRecord, UserRecord, Website};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while reading the record exports.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("user not found: {0}")]
    UserNotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Inclusive creation-time range. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Range covering whole UTC days from `from` through `to`.
    pub fn from_dates(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            start: from.map(|d| d.and_time(NaiveTime::MIN).and_utc()),
            end: to
                .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
                .map(|dt| dt.and_utc()),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

/// Predicate for feedback queries. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub user_id: Option<String>,
    pub range: DateRange,
    pub processed: Option<bool>,
}

impl FeedbackFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        self.user_id.as_ref().map_or(true, |u| &record.user_id == u)
            && self.range.contains(record.created_at)
            && self.processed.map_or(true, |p| record.processed == p)
    }
}

/// Read-only access to the exported collections.
#[derive(Debug, Clone)]
pub struct RecordStore {
    users_path: PathBuf,
    feedback_path: PathBuf,
    websites_path: PathBuf,
}

impl RecordStore {
    /// Create a store for the files named in `config`.
    pub fn new(config: &DataConfig) -> Self {
        Self {
            users_path: config.dir.join(&config.users_file),
            feedback_path: config.dir.join(&config.feedback_file),
            websites_path: config.dir.join(&config.websites_file),
        }
    }

    /// Users created within `range`.
    pub async fn fetch_users(&self, range: &DateRange) -> StoreResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = load_collection(&self.users_path).await?;
        users.retain(|u| range.contains(u.created_at));
        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    /// Feedback matching `filter`.
    pub async fn fetch_feedback(&self, filter: &FeedbackFilter) -> StoreResult<Vec<FeedbackRecord>> {
        let mut feedback: Vec<FeedbackRecord> = load_collection(&self.feedback_path).await?;
        feedback.retain(|f| filter.matches(f));
        debug!("Fetched {} feedback records", feedback.len());
        Ok(feedback)
    }

    /// A user's websites, newest first.
    pub async fn fetch_websites(&self, user_id: &str) -> StoreResult<Vec<Website>> {
        let mut websites: Vec<Website> = load_collection(&self.websites_path).await?;
        websites.retain(|w| w.user_id == user_id);
        websites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!("Fetched {} websites for user {}", websites.len(), user_id);
        Ok(websites)
    }

    /// The user's default website, read through `cache`.
    pub async fn default_website(
        &self,
        user_id: &str,
        cache: &mut DefaultSiteCache,
    ) -> StoreResult<Option<Website>> {
        cache
            .get_or_resolve(user_id, || self.fetch_websites(user_id))
            .await
    }

    /// Look up a single user by id.
    pub async fn find_user(&self, user_id: &str) -> StoreResult<UserRecord> {
        let users: Vec<UserRecord> = load_collection(&self.users_path).await?;
        users
            .into_iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))
    }
}

/// Load a JSON array. A missing file is an empty collection.
async fn load_collection<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("{} not found, treating as empty", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
