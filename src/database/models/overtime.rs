use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::services::ot_calc::{ClockTime, OtBreakdown};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRecord {
    pub id: Uuid,
    pub employee_id: String,
    pub work_date: NaiveDate,
    pub shift: String,
    pub in_time: String,  // HH:MM
    pub out_time: String, // HH:MM, earlier than in_time for overnight work
    pub reason: Option<String>,
    pub status: OvertimeStatus,
    pub is_triple_day: bool,
    pub normal_minutes: i32,
    pub double_minutes: i32,
    pub triple_minutes: i32,
    pub is_night: bool,
    pub decided_by: Option<String>,
    pub decision_reason: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OvertimeRecord {
    pub fn breakdown(&self) -> OtBreakdown {
        OtBreakdown {
            normal_minutes: self.normal_minutes,
            double_minutes: self.double_minutes,
            triple_minutes: self.triple_minutes,
            is_night: self.is_night,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OvertimeStatus::Pending
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum OvertimeStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

/// Every permitted status change. Anything not listed is refused.
const ALLOWED_TRANSITIONS: &[(OvertimeStatus, OvertimeStatus)] = &[
    (OvertimeStatus::Pending, OvertimeStatus::Approved),
    (OvertimeStatus::Pending, OvertimeStatus::Rejected),
];

impl OvertimeStatus {
    pub fn can_transition_to(self, next: OvertimeStatus) -> bool {
        ALLOWED_TRANSITIONS.contains(&(self, next))
    }
}

/// A fully classified row ready to be persisted as a PENDING record.
#[derive(Debug, Clone)]
pub struct NewOvertimeRecord {
    pub employee_id: String,
    pub work_date: NaiveDate,
    pub shift: String,
    pub in_time: ClockTime,
    pub out_time: ClockTime,
    pub reason: Option<String>,
    pub is_triple_day: bool,
    pub breakdown: OtBreakdown,
}

/// Merged field values written back by a patch. The breakdown always matches
/// the shift and times carried alongside it.
#[derive(Debug, Clone)]
pub struct OvertimeChanges {
    /// `updated_at` of the version the patch was merged onto; the write only
    /// applies while the record still carries it.
    pub expected_updated_at: DateTime<Utc>,
    pub shift: String,
    pub in_time: ClockTime,
    pub out_time: ClockTime,
    pub reason: Option<String>,
    pub breakdown: OtBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> OvertimeStatus {
        match self {
            Decision::Approve => OvertimeStatus::Approved,
            Decision::Reject => OvertimeStatus::Rejected,
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            Decision::Approve => OvertimeAction::APPROVED,
            Decision::Reject => OvertimeAction::REJECTED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OvertimeFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<OvertimeStatus>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Builds a pagination window, falling back to defaults for missing or
    /// zero values and capping the page size.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimePage {
    pub items: Vec<OvertimeRecord>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingCount {
    pub count: i64,
}

// Audit action names
#[allow(non_snake_case)]
pub mod OvertimeAction {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pending_can_be_decided_either_way() {
        assert!(OvertimeStatus::Pending.can_transition_to(OvertimeStatus::Approved));
        assert!(OvertimeStatus::Pending.can_transition_to(OvertimeStatus::Rejected));
        assert!(!OvertimeStatus::Pending.can_transition_to(OvertimeStatus::Pending));
    }

    #[test]
    fn decided_statuses_are_final() {
        for from in [OvertimeStatus::Approved, OvertimeStatus::Rejected] {
            for to in OvertimeStatus::ALL {
                assert!(!from.can_transition_to(*to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("approved".parse::<OvertimeStatus>(), Ok(OvertimeStatus::Approved));
        assert_eq!("PENDING".parse::<OvertimeStatus>(), Ok(OvertimeStatus::Pending));
        assert!("denied".parse::<OvertimeStatus>().is_err());
        assert_eq!(OvertimeStatus::Rejected.to_string(), "REJECTED");
    }

    #[test]
    fn status_serializes_in_upper_case() {
        let json = serde_json::to_string(&OvertimeStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }

    #[test]
    fn pagination_defaults_and_caps() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(3), Some(500)).limit, 100);
        assert_eq!(Pagination::new(Some(3), Some(10)).offset(), 20);
    }
}
