use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{OvertimeRecord, OvertimeStatus};

/// Per-date counts by status and minute totals by pay tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeDayStats {
    pub date: NaiveDate,
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub normal_minutes: i64,
    pub double_minutes: i64,
    pub triple_minutes: i64,
}

impl OvertimeDayStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            pending: 0,
            approved: 0,
            rejected: 0,
            normal_minutes: 0,
            double_minutes: 0,
            triple_minutes: 0,
        }
    }

    pub fn add(&mut self, record: &OvertimeRecord) {
        self.total += 1;
        match record.status {
            OvertimeStatus::Pending => self.pending += 1,
            OvertimeStatus::Approved => self.approved += 1,
            OvertimeStatus::Rejected => self.rejected += 1,
        }
        self.normal_minutes += i64::from(record.normal_minutes);
        self.double_minutes += i64::from(record.double_minutes);
        self.triple_minutes += i64::from(record.triple_minutes);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeRangeStats {
    pub items: Vec<OvertimeDayStats>,
}
