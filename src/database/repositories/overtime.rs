use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::OvertimeStore;
use crate::database::{
    models::{
        ActionContext, NewOvertimeRecord, OvertimeAction, OvertimeAuditEntry, OvertimeChanges,
        OvertimeDayStats, OvertimeFilter, OvertimePage, OvertimeRecord, OvertimeStatus, Pagination,
        metadata,
    },
    utils::sql,
};

const RECORD_COLUMNS: &str = r#"
    id,
    employee_id,
    work_date,
    shift,
    in_time,
    out_time,
    reason,
    status,
    is_triple_day,
    normal_minutes,
    double_minutes,
    triple_minutes,
    is_night,
    decided_by,
    decision_reason,
    decided_at,
    created_by,
    updated_by,
    created_at,
    updated_at
"#;

// Shared WHERE clause for filtered listing; unset filters bind NULL.
const FILTER_CLAUSE: &str = r#"
    WHERE
        (?::date IS NULL OR work_date >= ?::date)
        AND (?::date IS NULL OR work_date <= ?::date)
        AND (?::varchar IS NULL OR status = ?::varchar)
        AND (?::varchar IS NULL OR employee_id = ?::varchar)
"#;

#[derive(Clone)]
pub struct PgOvertimeRepository {
    pool: PgPool,
}

impl PgOvertimeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_audit(
        tx: &mut Transaction<'_, Postgres>,
        entry: OvertimeAuditEntry,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(&sql(r#"
            INSERT INTO
                overtime_audit (
                    id,
                    record_id,
                    action,
                    actor_id,
                    ip_address,
                    user_agent,
                    route,
                    metadata,
                    created_at
                )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#))
        .bind(entry.id)
        .bind(entry.record_id)
        .bind(entry.action)
        .bind(entry.actor_id)
        .bind(entry.ip_address)
        .bind(entry.user_agent)
        .bind(entry.route)
        .bind(entry.metadata)
        .bind(entry.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OvertimeStore for PgOvertimeRepository {
    async fn insert_many(
        &self,
        records: Vec<NewOvertimeRecord>,
        ctx: &ActionContext,
    ) -> Result<Vec<OvertimeRecord>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(records.len());

        let insert = sql(&format!(
            r#"
            INSERT INTO
                overtime_records (
                    id,
                    employee_id,
                    work_date,
                    shift,
                    in_time,
                    out_time,
                    reason,
                    status,
                    is_triple_day,
                    normal_minutes,
                    double_minutes,
                    triple_minutes,
                    is_night,
                    created_by,
                    updated_by,
                    created_at,
                    updated_at
                )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {RECORD_COLUMNS}
            "#
        ));

        for record in records {
            let row = sqlx::query_as::<_, OvertimeRecord>(&insert)
                .bind(Uuid::new_v4())
                .bind(&record.employee_id)
                .bind(record.work_date)
                .bind(&record.shift)
                .bind(record.in_time.to_string())
                .bind(record.out_time.to_string())
                .bind(&record.reason)
                .bind(OvertimeStatus::Pending)
                .bind(record.is_triple_day)
                .bind(record.breakdown.normal_minutes)
                .bind(record.breakdown.double_minutes)
                .bind(record.breakdown.triple_minutes)
                .bind(record.breakdown.is_night)
                .bind(&ctx.actor_id)
                .bind(&ctx.actor_id)
                .bind(now)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;

            let audit = ctx.audit_entry(
                row.id,
                OvertimeAction::CREATED,
                Some(metadata(vec![
                    ("employeeId", row.employee_id.clone()),
                    ("workDate", row.work_date.to_string()),
                ])),
                now,
            );
            Self::insert_audit(&mut tx, audit).await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OvertimeRecord>> {
        let record = sqlx::query_as::<_, OvertimeRecord>(&sql(&format!(
            "SELECT {RECORD_COLUMNS} FROM overtime_records WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update_pending(
        &self,
        id: Uuid,
        changes: OvertimeChanges,
        ctx: &ActionContext,
    ) -> Result<Option<OvertimeRecord>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, OvertimeRecord>(&sql(&format!(
            r#"
            UPDATE
                overtime_records
            SET
                shift = ?,
                in_time = ?,
                out_time = ?,
                reason = ?,
                normal_minutes = ?,
                double_minutes = ?,
                triple_minutes = ?,
                is_night = ?,
                updated_by = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
                AND updated_at = ?
            RETURNING {RECORD_COLUMNS}
            "#
        )))
        .bind(&changes.shift)
        .bind(changes.in_time.to_string())
        .bind(changes.out_time.to_string())
        .bind(&changes.reason)
        .bind(changes.breakdown.normal_minutes)
        .bind(changes.breakdown.double_minutes)
        .bind(changes.breakdown.triple_minutes)
        .bind(changes.breakdown.is_night)
        .bind(&ctx.actor_id)
        .bind(now)
        .bind(id)
        .bind(OvertimeStatus::Pending)
        .bind(changes.expected_updated_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        let audit = ctx.audit_entry(
            record.id,
            OvertimeAction::UPDATED,
            Some(metadata(vec![
                ("shift", record.shift.clone()),
                ("inTime", record.in_time.clone()),
                ("outTime", record.out_time.clone()),
            ])),
            now,
        );
        Self::insert_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(Some(record))
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
        let mut tx = self.pool.begin().await?;

        // The status predicate makes this a single conditional write: of two
        // racing decisions only one can match.
        let updated = sqlx::query_as::<_, OvertimeRecord>(&sql(&format!(
            r#"
            UPDATE
                overtime_records
            SET
                status = ?,
                decided_by = ?,
                decision_reason = ?,
                decided_at = ?,
                updated_by = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING {RECORD_COLUMNS}
            "#
        )))
        .bind(to)
        .bind(&ctx.actor_id)
        .bind(&reason)
        .bind(now)
        .bind(&ctx.actor_id)
        .bind(now)
        .bind(id)
        .bind(from)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        let mut pairs = vec![("from", from.to_string()), ("to", to.to_string())];
        if let Some(reason) = reason {
            pairs.push(("reason", reason));
        }
        let audit = ctx.audit_entry(record.id, action, Some(metadata(pairs)), now);
        Self::insert_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(Some(record))
    }

    async fn list(&self, filter: &OvertimeFilter, page: Pagination) -> Result<OvertimePage> {
        let total: i64 = sqlx::query_scalar(&sql(&format!(
            "SELECT COUNT(*) FROM overtime_records {FILTER_CLAUSE}"
        )))
        .bind(filter.from)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.to)
        .bind(filter.status)
        .bind(filter.status)
        .bind(&filter.employee_id)
        .bind(&filter.employee_id)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, OvertimeRecord>(&sql(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM overtime_records
            {FILTER_CLAUSE}
            ORDER BY seq ASC
            LIMIT ? OFFSET ?
            "#
        )))
        .bind(filter.from)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.to)
        .bind(filter.status)
        .bind(filter.status)
        .bind(&filter.employee_id)
        .bind(&filter.employee_id)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(OvertimePage {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn count_by_status(&self, status: OvertimeStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM overtime_records WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn latest_pending(&self, limit: u32) -> Result<Vec<OvertimeRecord>> {
        let records = sqlx::query_as::<_, OvertimeRecord>(&sql(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM overtime_records
            WHERE status = ?
            ORDER BY seq DESC
            LIMIT ?
            "#
        )))
        .bind(OvertimeStatus::Pending)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn daily_totals(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<OvertimeDayStats>> {
        let rows = sqlx::query_as::<_, OvertimeDayStats>(&sql(r#"
            SELECT
                work_date AS date,
                COUNT(*)::BIGINT AS total,
                COUNT(*) FILTER (WHERE status = 'PENDING')::BIGINT AS pending,
                COUNT(*) FILTER (WHERE status = 'APPROVED')::BIGINT AS approved,
                COUNT(*) FILTER (WHERE status = 'REJECTED')::BIGINT AS rejected,
                COALESCE(SUM(normal_minutes), 0)::BIGINT AS normal_minutes,
                COALESCE(SUM(double_minutes), 0)::BIGINT AS double_minutes,
                COALESCE(SUM(triple_minutes), 0)::BIGINT AS triple_minutes
            FROM
                overtime_records
            WHERE
                work_date BETWEEN ? AND ?
            GROUP BY
                work_date
            ORDER BY
                work_date ASC
        "#))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn audit_trail(&self, record_id: Uuid) -> Result<Vec<OvertimeAuditEntry>> {
        let entries = sqlx::query_as::<_, OvertimeAuditEntry>(&sql(r#"
            SELECT
                id,
                record_id,
                action,
                actor_id,
                ip_address,
                user_agent,
                route,
                metadata,
                created_at
            FROM
                overtime_audit
            WHERE
                record_id = ?
            ORDER BY
                seq ASC
        "#))
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
