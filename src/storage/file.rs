// src/storage/file.rs

use crate::error::Result;
use crate::storage::window::window_start;
use crate::storage::{NewUser, NewVisitor, Period, User, Visitor, VisitorCounts, VisitorStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{info, trace, warn};
use uuid::Uuid;

/// File-backed implementation of visitor storage.
///
/// All state lives in one JSON document with two arrays. The document is
/// read fully into memory when the store is opened and rewritten fully on
/// every mutation; reads never touch the file again. Mutations take the
/// writer lock for the whole read-mutate-rewrite sequence, so concurrent
/// writers cannot lose each other's records.
pub struct FileStore {
    path: PathBuf,
    data: RwLock<StoreDocument>,
}

/// The persisted document shape: `{"users": [...], "visitors": [...]}`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    visitors: Vec<StoredVisitor>,
}

/// A visitor record as it sits in the file. The timestamp stays a raw
/// string at this boundary so one malformed record cannot invalidate the
/// whole document; it is parsed back on the read path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct StoredVisitor {
    id: String,
    user_id: Option<String>,
    page: String,
    referrer: Option<String>,
    user_agent: Option<String>,
    ip: Option<String>,
    timestamp: String,
}

impl StoredVisitor {
    fn to_visitor(&self) -> Option<Visitor> {
        Some(Visitor {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            page: self.page.clone(),
            referrer: self.referrer.clone(),
            user_agent: self.user_agent.clone(),
            ip: self.ip.clone(),
            timestamp: parse_timestamp(&self.timestamp)?,
        })
    }
}

/// Parse a stored ISO-8601 timestamp. Accepts both an explicit offset
/// (including the trailing `Z` marker) and the naive offset-less form found
/// in older backing files; naive values are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

impl FileStore {
    /// Open the store at `path`, loading the existing document into memory.
    ///
    /// Self-healing startup: a missing file or one that fails to parse
    /// initializes an empty document which is immediately persisted, so
    /// the file always exists and parses afterwards.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<StoreDocument>(&bytes) {
                Ok(document) => document,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Backing file is not a valid store document. Reinitializing.");
                    StoreDocument::default()
                }
            },
            Err(e) => {
                info!(path = %path.display(), error = %e, "Backing file not readable. Initializing empty store.");
                StoreDocument::default()
            }
        };

        let store = Self {
            path,
            data: RwLock::new(document),
        };
        // Persist immediately so a fresh or healed store is on disk before
        // the first mutation.
        if let Err(e) = store.persist(&*store.data.read().await).await {
            warn!(path = %store.path.display(), error = %e, "Failed to persist initial store document");
        }
        Ok(store)
    }

    async fn persist(&self, document: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    /// Rewrite the whole backing file. A failed rewrite is logged and
    /// swallowed: the in-memory mutation stands and the caller still gets
    /// its result back (accepted inconsistency window).
    async fn persist_after_mutation(&self, document: &StoreDocument) {
        if let Err(e) = self.persist(document).await {
            warn!(path = %self.path.display(), error = %e, "Failed to rewrite backing file after mutation");
        }
    }

    fn counts_with_now(
        visitors: &[StoredVisitor],
        period: Option<Period>,
        now: DateTime<Utc>,
    ) -> VisitorCounts {
        let requested: &[Period] = match period {
            Some(ref p) => std::slice::from_ref(p),
            None => &Period::ALL,
        };

        requested
            .iter()
            .map(|&p| (p, count_since(visitors, window_start(p, now))))
            .collect()
    }
}

fn count_since(visitors: &[StoredVisitor], start: DateTime<Utc>) -> u64 {
    visitors
        .iter()
        .filter(|v| parse_timestamp(&v.timestamp).is_some_and(|t| t >= start))
        .count() as u64
}

#[async_trait]
impl VisitorStore for FileStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let guard = self.data.read().await;
        Ok(guard.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let guard = self.data.read().await;
        Ok(guard.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new_user.username,
            password: new_user.password,
        };

        let mut guard = self.data.write().await;
        guard.users.push(user.clone());
        self.persist_after_mutation(&guard).await;
        Ok(user)
    }

    async fn track_visitor(&self, visit: NewVisitor) -> Result<Visitor> {
        let now = Utc::now();
        let visitor = Visitor {
            id: Uuid::new_v4().to_string(),
            user_id: visit.user_id,
            page: visit.page,
            referrer: visit.referrer,
            user_agent: visit.user_agent,
            ip: visit.ip,
            timestamp: now,
        };
        let stored = StoredVisitor {
            id: visitor.id.clone(),
            user_id: visitor.user_id.clone(),
            page: visitor.page.clone(),
            referrer: visitor.referrer.clone(),
            user_agent: visitor.user_agent.clone(),
            ip: visitor.ip.clone(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        let mut guard = self.data.write().await;
        guard.visitors.push(stored);
        self.persist_after_mutation(&guard).await;
        trace!(visitor.id = %visitor.id, visitor.page = %visitor.page, "Tracked visitor in file store");
        Ok(visitor)
    }

    async fn visitor_counts(&self, period: Option<Period>) -> Result<VisitorCounts> {
        let guard = self.data.read().await;
        Ok(Self::counts_with_now(&guard.visitors, period, Utc::now()))
    }

    async fn all_visitors(&self) -> Result<Vec<Visitor>> {
        let guard = self.data.read().await;
        Ok(guard.visitors.iter().filter_map(StoredVisitor::to_visitor).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap(),
        )
    }

    fn stored(id: &str, timestamp: &str) -> StoredVisitor {
        StoredVisitor {
            id: id.to_string(),
            user_id: None,
            page: "/home".to_string(),
            referrer: None,
            user_agent: None,
            ip: None,
            timestamp: timestamp.to_string(),
        }
    }

    // Thursday, so the week window opens on Monday the 3rd.
    fn fixed_now() -> DateTime<Utc> {
        utc(2026, 8, 6, 15, 0, 0)
    }

    #[test]
    fn parses_rfc3339_with_trailing_z() {
        let parsed = parse_timestamp("2026-08-06T12:00:00Z").unwrap();
        assert_eq!(parsed, utc(2026, 8, 6, 12, 0, 0));
    }

    #[test]
    fn parses_explicit_offset() {
        let parsed = parse_timestamp("2026-08-06T14:00:00+02:00").unwrap();
        assert_eq!(parsed, utc(2026, 8, 6, 12, 0, 0));
    }

    #[test]
    fn parses_naive_timestamp_as_utc() {
        // Older backing files carry offset-less timestamps.
        let parsed = parse_timestamp("2026-08-06T12:00:00.123456").unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("not-a-timestamp").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn event_on_window_start_is_counted() {
        let visitors = vec![stored("v1", "2026-08-06T00:00:00Z")];
        let counts = FileStore::counts_with_now(&visitors, Some(Period::Today), fixed_now());
        assert_eq!(counts[&Period::Today], 1);
    }

    #[test]
    fn events_distribute_across_windows() {
        let visitors = vec![
            // Today.
            stored("v1", "2026-08-06T10:00:00Z"),
            // Tuesday this week, before today.
            stored("v2", "2026-08-04T09:00:00Z"),
            // Earlier this month, before this week.
            stored("v3", "2026-08-01T09:00:00Z"),
            // Earlier this year, before this month.
            stored("v4", "2026-03-15T09:00:00Z"),
            // Last year: outside every window.
            stored("v5", "2025-12-31T23:59:59Z"),
        ];

        let counts = FileStore::counts_with_now(&visitors, None, fixed_now());
        assert_eq!(counts[&Period::Today], 1);
        assert_eq!(counts[&Period::Week], 2);
        assert_eq!(counts[&Period::Month], 3);
        assert_eq!(counts[&Period::Year], 4);
    }

    #[test]
    fn counts_widen_monotonically() {
        let visitors = vec![
            stored("v1", "2026-08-06T10:00:00Z"),
            stored("v2", "2026-08-04T09:00:00Z"),
            stored("v3", "2026-02-01T00:00:00Z"),
        ];
        let counts = FileStore::counts_with_now(&visitors, None, fixed_now());
        assert!(counts[&Period::Today] <= counts[&Period::Week]);
        assert!(counts[&Period::Week] <= counts[&Period::Month]);
        assert!(counts[&Period::Month] <= counts[&Period::Year]);
    }

    #[test]
    fn unparsable_timestamps_are_excluded_from_every_window() {
        let visitors = vec![
            stored("v1", "2026-08-06T10:00:00Z"),
            stored("v2", "garbage"),
            stored("v3", ""),
        ];

        let counts = FileStore::counts_with_now(&visitors, None, fixed_now());
        for period in Period::ALL {
            assert_eq!(counts[&period], 1, "bad timestamps leaked into {period}");
        }
    }

    #[test]
    fn single_period_query_returns_single_entry_map() {
        let visitors = vec![stored("v1", "2026-08-06T10:00:00Z")];
        let counts = FileStore::counts_with_now(&visitors, Some(Period::Week), fixed_now());
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&Period::Week], 1);
    }

    #[test]
    fn scalar_counts_match_bulk_counts() {
        let visitors = vec![
            stored("v1", "2026-08-06T10:00:00Z"),
            stored("v2", "2026-08-04T09:00:00Z"),
            stored("v3", "2026-03-15T09:00:00Z"),
        ];
        let bulk = FileStore::counts_with_now(&visitors, None, fixed_now());
        for period in Period::ALL {
            let scalar = FileStore::counts_with_now(&visitors, Some(period), fixed_now());
            assert_eq!(scalar[&period], bulk[&period]);
        }
    }
}
