// src/storage/traits.rs

use crate::error::Result;
use crate::storage::{NewUser, NewVisitor, Period, User, Visitor, VisitorCounts};
use async_trait::async_trait;

/// Capability contract for visitor storage.
///
/// Both backends honor identical input/output semantics: a file-backed
/// store that scans an in-memory document and a MongoDB-backed store that
/// translates each call into native queries. Callers depend only on this
/// trait; the concrete backend is chosen once at startup.
#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Look a user up by id. Absence is a normal outcome, not an error.
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Look a user up by username. Uniqueness of usernames is not enforced;
    /// with duplicates this returns an arbitrary one of them.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Create a user with a server-generated id and persist it before
    /// returning.
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    /// Record a visit. The store assigns the id and the UTC timestamp and
    /// returns the full stored record.
    async fn track_visitor(&self, visit: NewVisitor) -> Result<Visitor>;

    /// Aggregate counts per window. `None` returns all four windows in one
    /// mapping; `Some(period)` returns a single-entry mapping for just that
    /// window. An event counts toward a window iff its timestamp is on or
    /// after the window start.
    async fn visitor_counts(&self, period: Option<Period>) -> Result<VisitorCounts>;

    /// Every tracked visit in insertion order, unrestricted size.
    async fn all_visitors(&self) -> Result<Vec<Visitor>>;
}
