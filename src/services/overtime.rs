use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::{
    ActionContext, Decision, NewOvertimeRecord, OvertimeAuditEntry, OvertimeChanges,
    OvertimeFilter, OvertimePage, OvertimeRecord, OvertimeStatus, Pagination, PendingCount,
};
use crate::database::repositories::OvertimeStore;
use crate::error::AppError;
use crate::services::ot_calc::{ClockTime, OtInput, classify};

pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 8;
pub const MAX_NOTIFICATION_LIMIT: u32 = 20;

/// One employee's hours within a bulk submission.
#[derive(Debug, Clone, PartialEq)]
pub struct OvertimeRowInput {
    pub employee_id: String,
    pub shift: String,
    pub in_time: ClockTime,
    pub out_time: ClockTime,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkCreateInput {
    pub work_date: NaiveDate,
    /// Holiday policy for the date, decided by the caller.
    pub is_triple_day: bool,
    pub rows: Vec<OvertimeRowInput>,
}

impl BulkCreateInput {
    /// Checks every row and reports the first violation.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.rows.is_empty() {
            return Err(AppError::validation("rows must not be empty"));
        }
        for (index, row) in self.rows.iter().enumerate() {
            if row.employee_id.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "rows[{}].employeeId must not be empty",
                    index
                )));
            }
            if row.shift.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "rows[{}].shift must not be empty",
                    index
                )));
            }
        }
        Ok(())
    }
}

/// Partial update of a pending record. `reason: Some("")` clears the reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OvertimePatch {
    pub shift: Option<String>,
    pub in_time: Option<ClockTime>,
    pub out_time: Option<ClockTime>,
    pub reason: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn stored_clock(record: &OvertimeRecord, value: &str) -> Result<ClockTime, AppError> {
    value.parse().map_err(|e| {
        AppError::internal_server_error_message(format!("record {} holds {}", record.id, e))
    })
}

/// Overtime record lifecycle: creation, edits while pending, and the one-way
/// approve/reject decision.
#[derive(Clone)]
pub struct OvertimeService {
    store: Arc<dyn OvertimeStore>,
}

impl OvertimeService {
    pub fn new(store: Arc<dyn OvertimeStore>) -> Self {
        Self { store }
    }

    pub async fn create_bulk(
        &self,
        input: BulkCreateInput,
        ctx: &ActionContext,
    ) -> Result<Vec<OvertimeRecord>, AppError> {
        input.validate()?;

        let work_date = input.work_date;
        let records: Vec<NewOvertimeRecord> = input
            .rows
            .into_iter()
            .map(|row| {
                let breakdown = classify(&OtInput {
                    work_date,
                    shift: &row.shift,
                    in_time: row.in_time,
                    out_time: row.out_time,
                    is_triple_day: input.is_triple_day,
                });
                NewOvertimeRecord {
                    employee_id: row.employee_id.trim().to_string(),
                    work_date,
                    shift: row.shift.trim().to_string(),
                    in_time: row.in_time,
                    out_time: row.out_time,
                    reason: non_blank(row.reason),
                    is_triple_day: input.is_triple_day,
                    breakdown,
                }
            })
            .collect();

        let created = self.store.insert_many(records, ctx).await?;
        log::info!(
            "Created {} overtime records for {} by {}",
            created.len(),
            work_date,
            ctx.actor_id
        );

        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<OvertimeRecord, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Overtime record {} not found", id)))
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: OvertimePatch,
        ctx: &ActionContext,
    ) -> Result<OvertimeRecord, AppError> {
        let existing = self.get(id).await?;
        if !existing.is_pending() {
            return Err(AppError::InvalidStateTransition(format!(
                "Overtime record {} is {} and can no longer be edited",
                id, existing.status
            )));
        }

        if let Some(shift) = &patch.shift {
            if shift.trim().is_empty() {
                return Err(AppError::validation("shift must not be empty"));
            }
        }

        let current_in = stored_clock(&existing, &existing.in_time)?;
        let current_out = stored_clock(&existing, &existing.out_time)?;

        let shift = patch
            .shift
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| existing.shift.clone());
        let in_time = patch.in_time.unwrap_or(current_in);
        let out_time = patch.out_time.unwrap_or(current_out);
        let reason = match patch.reason {
            Some(reason) => non_blank(Some(reason)),
            None => existing.reason.clone(),
        };

        let reclassify =
            shift != existing.shift || in_time != current_in || out_time != current_out;
        let breakdown = if reclassify {
            classify(&OtInput {
                work_date: existing.work_date,
                shift: &shift,
                in_time,
                out_time,
                is_triple_day: existing.is_triple_day,
            })
        } else {
            existing.breakdown()
        };

        let changes = OvertimeChanges {
            expected_updated_at: existing.updated_at,
            shift,
            in_time,
            out_time,
            reason,
            breakdown,
        };

        match self.store.update_pending(id, changes, ctx).await? {
            Some(updated) => {
                log::info!("Updated overtime record {} by {}", id, ctx.actor_id);
                Ok(updated)
            }
            None => Err(self.conflict_or_missing(id).await),
        }
    }

    pub async fn approve(
        &self,
        id: Uuid,
        reason: Option<String>,
        ctx: &ActionContext,
    ) -> Result<OvertimeRecord, AppError> {
        self.decide(id, Decision::Approve, reason, ctx).await
    }

    pub async fn reject(
        &self,
        id: Uuid,
        reason: Option<String>,
        ctx: &ActionContext,
    ) -> Result<OvertimeRecord, AppError> {
        self.decide(id, Decision::Reject, reason, ctx).await
    }

    async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        reason: Option<String>,
        ctx: &ActionContext,
    ) -> Result<OvertimeRecord, AppError> {
        let target = decision.target_status();
        let current = self.get(id).await?;

        if !current.status.can_transition_to(target) {
            log::warn!(
                "Refused {} -> {} on overtime record {} by {}",
                current.status,
                target,
                id,
                ctx.actor_id
            );
            return Err(AppError::InvalidStateTransition(format!(
                "Overtime record {} is already {}",
                id, current.status
            )));
        }

        let decided = self
            .store
            .transition(
                id,
                current.status,
                target,
                non_blank(reason),
                ctx,
                decision.action(),
            )
            .await?;

        match decided {
            Some(record) => {
                log::info!(
                    "Overtime record {} {} by {}",
                    id,
                    decision.action(),
                    ctx.actor_id
                );
                Ok(record)
            }
            // Lost a race with another decision or edit on the same record.
            None => Err(self.conflict_or_missing(id).await),
        }
    }

    async fn conflict_or_missing(&self, id: Uuid) -> AppError {
        match self.store.find_by_id(id).await {
            Ok(Some(record)) => {
                log::warn!(
                    "Concurrent change on overtime record {} (now {})",
                    id,
                    record.status
                );
                if record.is_pending() {
                    AppError::InvalidStateTransition(format!(
                        "Overtime record {} was changed by another request, reload and retry",
                        id
                    ))
                } else {
                    AppError::InvalidStateTransition(format!(
                        "Overtime record {} is already {}",
                        id, record.status
                    ))
                }
            }
            Ok(None) => AppError::NotFound(format!("Overtime record {} not found", id)),
            Err(e) => e.into(),
        }
    }

    pub async fn list(
        &self,
        filter: OvertimeFilter,
        page: Pagination,
    ) -> Result<OvertimePage, AppError> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(AppError::validation("from must not be after to"));
            }
        }
        Ok(self.store.list(&filter, page).await?)
    }

    pub async fn pending_count(&self) -> Result<PendingCount, AppError> {
        let count = self.store.count_by_status(OvertimeStatus::Pending).await?;
        Ok(PendingCount { count })
    }

    /// Newest pending records for operator alerts, at most
    /// `MAX_NOTIFICATION_LIMIT` of them.
    pub async fn pending_notifications(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<OvertimeRecord>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
            .min(MAX_NOTIFICATION_LIMIT);
        Ok(self.store.latest_pending(limit).await?)
    }

    pub async fn audit_trail(&self, id: Uuid) -> Result<Vec<OvertimeAuditEntry>, AppError> {
        self.get(id).await?;
        Ok(self.store.audit_trail(id).await?)
    }
}
