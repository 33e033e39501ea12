use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::database::models::OvertimeRangeStats;
use crate::error::AppError;
use crate::handlers::overtime::parse_date;
use crate::handlers::shared::ApiResponse;
use crate::services::{Actor, OvertimeStatsService};

#[derive(Debug, Deserialize)]
pub struct DayStatsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeStatsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("{} is required", field)))
}

/// Counts and minute totals for a single work date
pub async fn get_day_stats(
    _actor: Actor,
    service: web::Data<OvertimeStatsService>,
    query: web::Query<DayStatsQuery>,
) -> Result<HttpResponse, AppError> {
    let date = parse_date("date", required("date", &query.date)?)?;
    Ok(ApiResponse::success(service.day_stats(date).await?))
}

/// Per-day stats across an inclusive date range
pub async fn get_week_stats(
    _actor: Actor,
    service: web::Data<OvertimeStatsService>,
    query: web::Query<RangeStatsQuery>,
) -> Result<HttpResponse, AppError> {
    let from = parse_date("from", required("from", &query.from)?)?;
    let to = parse_date("to", required("to", &query.to)?)?;
    let items = service.range_stats(from, to).await?;
    Ok(ApiResponse::success(OvertimeRangeStats { items }))
}
