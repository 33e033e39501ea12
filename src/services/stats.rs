use std::sync::Arc;

use chrono::NaiveDate;

use crate::database::models::OvertimeDayStats;
use crate::database::repositories::OvertimeStore;
use crate::error::AppError;

/// Longest range a single stats request may cover, in days.
pub const MAX_RANGE_DAYS: i64 = 92;

#[derive(Clone)]
pub struct OvertimeStatsService {
    store: Arc<dyn OvertimeStore>,
}

impl OvertimeStatsService {
    pub fn new(store: Arc<dyn OvertimeStore>) -> Self {
        Self { store }
    }

    pub async fn day_stats(&self, date: NaiveDate) -> Result<OvertimeDayStats, AppError> {
        let totals = self.store.daily_totals(date, date).await?;
        Ok(totals
            .into_iter()
            .find(|s| s.date == date)
            .unwrap_or_else(|| OvertimeDayStats::empty(date)))
    }

    /// One entry per calendar day in `[from, to]`, ascending, with days that
    /// have no records reported as zeros.
    pub async fn range_stats(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OvertimeDayStats>, AppError> {
        if from > to {
            return Err(AppError::validation("from must not be after to"));
        }
        if (to - from).num_days() >= MAX_RANGE_DAYS {
            return Err(AppError::validation(format!(
                "range must not exceed {} days",
                MAX_RANGE_DAYS
            )));
        }

        let mut totals = self.store.daily_totals(from, to).await?.into_iter().peekable();
        let mut items = Vec::new();
        for date in from.iter_days().take_while(|d| *d <= to) {
            match totals.next_if(|s| s.date == date) {
                Some(stats) => items.push(stats),
                None => items.push(OvertimeDayStats::empty(date)),
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ActionContext, ActionMeta};
    use crate::database::repositories::InMemoryOvertimeStore;
    use crate::services::overtime::{BulkCreateInput, OvertimeRowInput, OvertimeService};
    use pretty_assertions::assert_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    async fn fixture() -> (OvertimeService, OvertimeStatsService) {
        let store: Arc<dyn OvertimeStore> = Arc::new(InMemoryOvertimeStore::new());
        let svc = OvertimeService::new(store.clone());
        let ctx = ActionContext::new("lead", ActionMeta::route("/api/v1/ot"));

        for (day, out_time) in [(10, "23:00"), (10, "18:00"), (12, "22:00")] {
            let created = svc
                .create_bulk(
                    BulkCreateInput {
                        work_date: date(day),
                        is_triple_day: false,
                        rows: vec![OvertimeRowInput {
                            employee_id: "E-1".to_string(),
                            shift: "Shift 2".to_string(),
                            in_time: "08:00".parse().unwrap(),
                            out_time: out_time.parse().unwrap(),
                            reason: None,
                        }],
                    },
                    &ctx,
                )
                .await
                .unwrap();
            if out_time == "18:00" {
                svc.approve(created[0].id, None, &ctx).await.unwrap();
            }
        }

        (svc, OvertimeStatsService::new(store))
    }

    #[tokio::test]
    async fn day_stats_sum_counts_and_minutes() {
        let (_, stats) = fixture().await;
        let day = stats.day_stats(date(10)).await.unwrap();

        assert_eq!(day.total, 2);
        assert_eq!(day.pending, 1);
        assert_eq!(day.approved, 1);
        assert_eq!(day.rejected, 0);
        assert_eq!(day.normal_minutes, 750 + (18 * 60 - 510));
        assert_eq!(day.double_minutes, 120);
        assert_eq!(day.triple_minutes, 0);
    }

    #[tokio::test]
    async fn day_without_records_is_zero() {
        let (_, stats) = fixture().await;
        assert_eq!(
            stats.day_stats(date(20)).await.unwrap(),
            OvertimeDayStats::empty(date(20))
        );
    }

    #[tokio::test]
    async fn range_stats_are_dense_and_ascending() {
        let (_, stats) = fixture().await;
        let items = stats.range_stats(date(9), date(13)).await.unwrap();

        let dates: Vec<NaiveDate> = items.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(9), date(10), date(11), date(12), date(13)]);
        assert_eq!(items[1].total, 2);
        assert_eq!(items[2].total, 0);
        assert_eq!(items[3].double_minutes, 60);
    }

    #[tokio::test]
    async fn range_stats_validate_bounds() {
        let (_, stats) = fixture().await;
        assert!(matches!(
            stats.range_stats(date(13), date(9)).await,
            Err(AppError::Validation(_))
        ));
        let far = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(matches!(
            stats.range_stats(date(1), far).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(stats.range_stats(date(10), date(10)).await.unwrap().len(), 1);
    }
}
