use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::OvertimeStore;
use crate::database::models::{
    ActionContext, NewOvertimeRecord, OvertimeAction, OvertimeAuditEntry, OvertimeChanges,
    OvertimeDayStats, OvertimeFilter, OvertimePage, OvertimeRecord, OvertimeStatus, Pagination,
    metadata,
};

#[derive(Default)]
struct Tables {
    // insertion order doubles as creation order
    records: Vec<OvertimeRecord>,
    audit: Vec<OvertimeAuditEntry>,
}

/// Process-local store. Every operation holds the lock for its full
/// duration, so conditional updates are atomic.
#[derive(Default)]
pub struct InMemoryOvertimeStore {
    tables: RwLock<Tables>,
}

impl InMemoryOvertimeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(filter: &OvertimeFilter, record: &OvertimeRecord) -> bool {
    filter.from.is_none_or(|from| record.work_date >= from)
        && filter.to.is_none_or(|to| record.work_date <= to)
        && filter.status.is_none_or(|status| record.status == status)
        && filter
            .employee_id
            .as_ref()
            .is_none_or(|employee| &record.employee_id == employee)
}

#[async_trait]
impl OvertimeStore for InMemoryOvertimeStore {
    async fn insert_many(
        &self,
        records: Vec<NewOvertimeRecord>,
        ctx: &ActionContext,
    ) -> Result<Vec<OvertimeRecord>> {
        let now = Utc::now();
        let created: Vec<OvertimeRecord> = records
            .into_iter()
            .map(|new| OvertimeRecord {
                id: Uuid::new_v4(),
                employee_id: new.employee_id,
                work_date: new.work_date,
                shift: new.shift,
                in_time: new.in_time.to_string(),
                out_time: new.out_time.to_string(),
                reason: new.reason,
                status: OvertimeStatus::Pending,
                is_triple_day: new.is_triple_day,
                normal_minutes: new.breakdown.normal_minutes,
                double_minutes: new.breakdown.double_minutes,
                triple_minutes: new.breakdown.triple_minutes,
                is_night: new.breakdown.is_night,
                decided_by: None,
                decision_reason: None,
                decided_at: None,
                created_by: ctx.actor_id.clone(),
                updated_by: ctx.actor_id.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        let mut tables = self.tables.write().await;
        for record in &created {
            let entry = ctx.audit_entry(
                record.id,
                OvertimeAction::CREATED,
                Some(metadata(vec![
                    ("employeeId", record.employee_id.clone()),
                    ("workDate", record.work_date.to_string()),
                ])),
                now,
            );
            tables.audit.push(entry);
        }
        tables.records.extend(created.iter().cloned());

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OvertimeRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.records.iter().find(|r| r.id == id).cloned())
    }

    async fn update_pending(
        &self,
        id: Uuid,
        changes: OvertimeChanges,
        ctx: &ActionContext,
    ) -> Result<Option<OvertimeRecord>> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;

        let Some(record) = tables
            .records
            .iter_mut()
            .find(|r| {
                r.id == id
                    && r.status == OvertimeStatus::Pending
                    && r.updated_at == changes.expected_updated_at
            })
        else {
            return Ok(None);
        };

        record.shift = changes.shift;
        record.in_time = changes.in_time.to_string();
        record.out_time = changes.out_time.to_string();
        record.reason = changes.reason;
        record.normal_minutes = changes.breakdown.normal_minutes;
        record.double_minutes = changes.breakdown.double_minutes;
        record.triple_minutes = changes.breakdown.triple_minutes;
        record.is_night = changes.breakdown.is_night;
        record.updated_by = ctx.actor_id.clone();
        record.updated_at = now;
        let updated = record.clone();

        tables.audit.push(ctx.audit_entry(
            updated.id,
            OvertimeAction::UPDATED,
            Some(metadata(vec![
                ("shift", updated.shift.clone()),
                ("inTime", updated.in_time.clone()),
                ("outTime", updated.out_time.clone()),
            ])),
            now,
        ));

        Ok(Some(updated))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OvertimeStatus,
        to: OvertimeStatus,
        reason: Option<String>,
        ctx: &ActionContext,
        action: &str,
    ) -> Result<Option<OvertimeRecord>> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;

        let Some(record) = tables
            .records
            .iter_mut()
            .find(|r| r.id == id && r.status == from)
        else {
            return Ok(None);
        };

        record.status = to;
        record.decided_by = Some(ctx.actor_id.clone());
        record.decision_reason = reason.clone();
        record.decided_at = Some(now);
        record.updated_by = ctx.actor_id.clone();
        record.updated_at = now;
        let updated = record.clone();

        let mut pairs = vec![("from", from.to_string()), ("to", to.to_string())];
        if let Some(reason) = reason {
            pairs.push(("reason", reason));
        }
        tables
            .audit
            .push(ctx.audit_entry(updated.id, action, Some(metadata(pairs)), now));

        Ok(Some(updated))
    }

    async fn list(&self, filter: &OvertimeFilter, page: Pagination) -> Result<OvertimePage> {
        let tables = self.tables.read().await;
        let matching: Vec<&OvertimeRecord> =
            tables.records.iter().filter(|r| matches(filter, r)).collect();

        let items = matching
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .map(|r| (*r).clone())
            .collect();

        Ok(OvertimePage {
            items,
            total: matching.len() as i64,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn count_by_status(&self, status: OvertimeStatus) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.records.iter().filter(|r| r.status == status).count() as i64)
    }

    async fn latest_pending(&self, limit: u32) -> Result<Vec<OvertimeRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .iter()
            .rev()
            .filter(|r| r.is_pending())
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn daily_totals(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<OvertimeDayStats>> {
        let tables = self.tables.read().await;
        let mut by_date: BTreeMap<NaiveDate, OvertimeDayStats> = BTreeMap::new();
        for record in tables
            .records
            .iter()
            .filter(|r| r.work_date >= from && r.work_date <= to)
        {
            by_date
                .entry(record.work_date)
                .or_insert_with(|| OvertimeDayStats::empty(record.work_date))
                .add(record);
        }

        Ok(by_date.into_values().collect())
    }

    async fn audit_trail(&self, record_id: Uuid) -> Result<Vec<OvertimeAuditEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .audit
            .iter()
            .filter(|e| e.record_id == record_id)
            .cloned()
            .collect())
    }
}
