use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{ActionContext, OvertimeFilter, OvertimeStatus, Pagination};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::RequestInfo;
use crate::services::ot_calc::ClockTime;
use crate::services::overtime::{BulkCreateInput, OvertimePatch, OvertimeRowInput};
use crate::services::{Actor, OvertimeService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
    pub employee_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRowBody {
    pub employee_id: String,
    pub shift: String,
    pub in_time: String,
    pub out_time: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateBody {
    pub work_date: String,
    #[serde(default)]
    pub is_triple_day: bool,
    pub rows: Vec<BulkRowBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    pub shift: Option<String>,
    pub in_time: Option<String>,
    pub out_time: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DecisionBody {
    pub reason: Option<String>,
}

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    if value.len() < 10 {
        return Err(AppError::validation(format!(
            "{} must be a YYYY-MM-DD date",
            field
        )));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("{} must be a YYYY-MM-DD date", field)))
}

fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| parse_date(field, v))
        .transpose()
}

fn parse_clock(field: &str, value: &str) -> Result<ClockTime, AppError> {
    if value.trim().len() < 4 {
        return Err(AppError::validation(format!("{} must be HH:MM", field)));
    }
    value
        .parse()
        .map_err(|_| AppError::validation(format!("{} must be HH:MM", field)))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    require_non_empty("id", raw)?;
    Uuid::parse_str(raw).map_err(|_| AppError::validation(format!("invalid record id '{}'", raw)))
}

impl ListQuery {
    pub fn validate(&self) -> Result<(OvertimeFilter, Pagination), AppError> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<OvertimeStatus>().map_err(AppError::Validation))
            .transpose()?;

        let filter = OvertimeFilter {
            from: parse_optional_date("from", self.from.as_deref())?,
            to: parse_optional_date("to", self.to.as_deref())?,
            status,
            employee_id: self
                .employee_id
                .as_ref()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        };

        Ok((filter, Pagination::new(self.page, self.limit)))
    }
}

impl BulkCreateBody {
    /// Validates every row before anything is created; the first problem wins.
    pub fn validate(self) -> Result<BulkCreateInput, AppError> {
        let work_date = parse_date("workDate", &self.work_date)?;

        let rows = self
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| -> Result<OvertimeRowInput, AppError> {
                require_non_empty(&format!("rows[{}].employeeId", i), &row.employee_id)?;
                require_non_empty(&format!("rows[{}].shift", i), &row.shift)?;
                Ok(OvertimeRowInput {
                    in_time: parse_clock(&format!("rows[{}].inTime", i), &row.in_time)?,
                    out_time: parse_clock(&format!("rows[{}].outTime", i), &row.out_time)?,
                    employee_id: row.employee_id,
                    shift: row.shift,
                    reason: row.reason,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let input = BulkCreateInput {
            work_date,
            is_triple_day: self.is_triple_day,
            rows,
        };
        input.validate()?;
        Ok(input)
    }
}

impl UpdateBody {
    pub fn validate(self) -> Result<OvertimePatch, AppError> {
        if let Some(shift) = &self.shift {
            require_non_empty("shift", shift)?;
        }
        Ok(OvertimePatch {
            shift: self.shift,
            in_time: self
                .in_time
                .as_deref()
                .map(|v| parse_clock("inTime", v))
                .transpose()?,
            out_time: self
                .out_time
                .as_deref()
                .map(|v| parse_clock("outTime", v))
                .transpose()?,
            reason: self.reason,
        })
    }
}

fn action_context(actor: Actor, info: RequestInfo) -> ActionContext {
    ActionContext::new(actor.id, info.into())
}

/// List overtime records
pub async fn list_overtime(
    _actor: Actor,
    service: web::Data<OvertimeService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let (filter, page) = query.validate()?;
    let records = service.list(filter, page).await?;
    Ok(ApiResponse::success(records))
}

pub async fn pending_count(
    _actor: Actor,
    service: web::Data<OvertimeService>,
) -> Result<HttpResponse, AppError> {
    Ok(ApiResponse::success(service.pending_count().await?))
}

/// Newest pending records for the operator alert panel
pub async fn pending_notifications(
    _actor: Actor,
    service: web::Data<OvertimeService>,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse, AppError> {
    let records = service.pending_notifications(query.limit).await?;
    Ok(ApiResponse::success(records))
}

/// Create one pending record per row for a shared work date
pub async fn bulk_create(
    actor: Actor,
    info: RequestInfo,
    service: web::Data<OvertimeService>,
    body: web::Json<BulkCreateBody>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().validate()?;
    let created = service
        .create_bulk(input, &action_context(actor, info))
        .await?;
    Ok(ApiResponse::created(created))
}

pub async fn get_overtime(
    _actor: Actor,
    service: web::Data<OvertimeService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    Ok(ApiResponse::success(service.get(id).await?))
}

pub async fn get_audit_trail(
    _actor: Actor,
    service: web::Data<OvertimeService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    Ok(ApiResponse::success(service.audit_trail(id).await?))
}

/// Patch a pending record
pub async fn update_overtime(
    actor: Actor,
    info: RequestInfo,
    service: web::Data<OvertimeService>,
    path: web::Path<String>,
    body: web::Json<UpdateBody>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    let patch = body.into_inner().validate()?;
    let updated = service
        .update(id, patch, &action_context(actor, info))
        .await?;
    Ok(ApiResponse::success(updated))
}

pub async fn approve_overtime(
    actor: Actor,
    info: RequestInfo,
    service: web::Data<OvertimeService>,
    path: web::Path<String>,
    body: Option<web::Json<DecisionBody>>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    let reason = body.and_then(|b| b.into_inner().reason);
    let record = service
        .approve(id, reason, &action_context(actor, info))
        .await?;
    Ok(ApiResponse::success(record))
}

pub async fn reject_overtime(
    actor: Actor,
    info: RequestInfo,
    service: web::Data<OvertimeService>,
    path: web::Path<String>,
    body: Option<web::Json<DecisionBody>>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    let reason = body.and_then(|b| b.into_inner().reason);
    let record = service
        .reject(id, reason, &action_context(actor, info))
        .await?;
    Ok(ApiResponse::success(record))
}
