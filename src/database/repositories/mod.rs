use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::{
    ActionContext, NewOvertimeRecord, OvertimeAuditEntry, OvertimeChanges, OvertimeDayStats,
    OvertimeFilter, OvertimePage, OvertimeRecord, OvertimeStatus, Pagination,
};

pub mod memory;
pub mod overtime;

pub use memory::InMemoryOvertimeStore;
pub use overtime::PgOvertimeRepository;

/// Persistence boundary for overtime records.
///
/// Every mutating call writes its audit entry as part of the same unit of
/// work, so a failed mutation leaves no audit row behind and vice versa.
#[async_trait]
pub trait OvertimeStore: Send + Sync {
    /// Persists all records or none of them.
    async fn insert_many(
        &self,
        records: Vec<NewOvertimeRecord>,
        ctx: &ActionContext,
    ) -> Result<Vec<OvertimeRecord>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OvertimeRecord>>;

    /// Applies `changes` only while the record is still PENDING and unchanged
    /// since `changes.expected_updated_at`. Returns `None` otherwise.
    async fn update_pending(
        &self,
        id: Uuid,
        changes: OvertimeChanges,
        ctx: &ActionContext,
    ) -> Result<Option<OvertimeRecord>>;

    /// Compare-and-swap on status: moves the record from `from` to `to` only
    /// if its current status is `from`. Returns `None` otherwise.
    async fn transition(
        &self,
        id: Uuid,
        from: OvertimeStatus,
        to: OvertimeStatus,
        reason: Option<String>,
        ctx: &ActionContext,
        action: &str,
    ) -> Result<Option<OvertimeRecord>>;

    async fn list(&self, filter: &OvertimeFilter, page: Pagination) -> Result<OvertimePage>;

    async fn count_by_status(&self, status: OvertimeStatus) -> Result<i64>;

    /// Newest pending records first.
    async fn latest_pending(&self, limit: u32) -> Result<Vec<OvertimeRecord>>;

    /// One entry per work date that has records, ascending.
    async fn daily_totals(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<OvertimeDayStats>>;

    async fn audit_trail(&self, record_id: Uuid) -> Result<Vec<OvertimeAuditEntry>>;
}
