//! Overtime pay-tier classification.
//!
//! A worked span (clock-in to clock-out, wrapping past midnight when the
//! out time is earlier than the in time) is split into normal, double and
//! triple minutes depending on the day type, the shift's overtime start
//! threshold and the 21:00 night cutoff.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: i32 = 24 * 60;
/// 21:00. Weekday overtime after this is paid double.
pub const NIGHT_CUTOFF: i32 = 21 * 60;
/// 06:30. Overtime start for first-shift rosters.
pub const FIRST_SHIFT_OT_START: i32 = 6 * 60 + 30;
/// 08:30. Overtime start for every other shift.
pub const DEFAULT_OT_START: i32 = 8 * 60 + 30;

/// A wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(i32);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self::from)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> i32 {
        self.0
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as i32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time '{0}', expected HH:MM")]
pub struct ClockTimeError(pub String);

impl FromStr for ClockTime {
    type Err = ClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self::from)
            .map_err(|_| ClockTimeError(s.to_string()))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
}

impl DayType {
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat => DayType::Saturday,
            Weekday::Sun => DayType::Sunday,
            _ => DayType::Weekday,
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, DayType::Saturday | DayType::Sunday)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtBreakdown {
    pub normal_minutes: i32,
    pub double_minutes: i32,
    pub triple_minutes: i32,
    pub is_night: bool,
}

impl OtBreakdown {
    pub fn total(&self) -> i32 {
        self.normal_minutes + self.double_minutes + self.triple_minutes
    }
}

/// Everything the classifier looks at. Two records with equal inputs always
/// carry equal breakdowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtInput<'a> {
    pub work_date: NaiveDate,
    pub shift: &'a str,
    pub in_time: ClockTime,
    pub out_time: ClockTime,
    pub is_triple_day: bool,
}

/// The overtime start threshold for a shift label. Labels mentioning "1"
/// belong to the early roster.
pub fn ot_start_for_shift(shift: &str) -> i32 {
    if shift.to_lowercase().contains('1') {
        FIRST_SHIFT_OT_START
    } else {
        DEFAULT_OT_START
    }
}

/// Out time in minutes, pushed into the next day when the shift crosses midnight.
fn wrapped_end(in_time: ClockTime, out_time: ClockTime) -> i32 {
    if out_time < in_time {
        out_time.minutes() + MINUTES_PER_DAY
    } else {
        out_time.minutes()
    }
}

pub fn classify(input: &OtInput<'_>) -> OtBreakdown {
    let start = input.in_time.minutes();
    let end = wrapped_end(input.in_time, input.out_time);
    let is_night = end >= NIGHT_CUTOFF;

    if input.is_triple_day {
        return OtBreakdown {
            normal_minutes: 0,
            double_minutes: 0,
            triple_minutes: end - start,
            is_night,
        };
    }

    let start_ot = start.max(ot_start_for_shift(input.shift));
    let ot_span = (end - start_ot).max(0);

    if DayType::of(input.work_date).is_weekend() {
        return OtBreakdown {
            normal_minutes: 0,
            double_minutes: ot_span,
            triple_minutes: 0,
            is_night,
        };
    }

    OtBreakdown {
        normal_minutes: (end.min(NIGHT_CUTOFF) - start_ot).max(0),
        double_minutes: (end - start_ot.max(NIGHT_CUTOFF)).max(0),
        triple_minutes: 0,
        is_night,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn run(work_date: &str, shift: &str, in_time: &str, out_time: &str, triple: bool) -> OtBreakdown {
        classify(&OtInput {
            work_date: date(work_date),
            shift,
            in_time: t(in_time),
            out_time: t(out_time),
            is_triple_day: triple,
        })
    }

    #[test]
    fn parses_and_formats_clock_times() {
        assert_eq!(t("08:30").minutes(), 510);
        assert_eq!(t("8:05").to_string(), "08:05");
        assert_eq!(t("23:59").minutes(), 1439);
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("12:60".parse::<ClockTime>().is_err());
        assert!("noon".parse::<ClockTime>().is_err());
        assert!("12:00:00".parse::<ClockTime>().is_err());
        assert!("".parse::<ClockTime>().is_err());
    }

    #[test]
    fn day_type_uses_calendar_weekday() {
        assert_eq!(DayType::of(date("2024-06-10")), DayType::Weekday);
        assert_eq!(DayType::of(date("2024-06-08")), DayType::Saturday);
        assert_eq!(DayType::of(date("2024-06-09")), DayType::Sunday);
    }

    #[test]
    fn shift_threshold_depends_on_label() {
        assert_eq!(ot_start_for_shift("Shift 1"), FIRST_SHIFT_OT_START);
        assert_eq!(ot_start_for_shift("S1-night"), FIRST_SHIFT_OT_START);
        assert_eq!(ot_start_for_shift("Shift 2"), DEFAULT_OT_START);
        assert_eq!(ot_start_for_shift("day"), DEFAULT_OT_START);
    }

    #[test]
    fn weekday_splits_at_night_cutoff() {
        let b = run("2024-06-10", "Shift 2", "08:00", "23:00", false);
        assert_eq!(
            b,
            OtBreakdown {
                normal_minutes: 750,
                double_minutes: 120,
                triple_minutes: 0,
                is_night: true,
            }
        );
    }

    #[test]
    fn saturday_is_all_double() {
        let b = run("2024-06-08", "Shift 1", "06:00", "14:00", false);
        assert_eq!(b.double_minutes, 450);
        assert_eq!(b.normal_minutes, 0);
        assert_eq!(b.triple_minutes, 0);
        assert!(!b.is_night);
    }

    #[test]
    fn sunday_is_all_double_even_after_cutoff() {
        let b = run("2024-06-09", "Shift 2", "18:00", "22:00", false);
        assert_eq!(b.double_minutes, 240);
        assert_eq!(b.normal_minutes, 0);
        assert!(b.is_night);
    }

    #[test]
    fn overnight_weekday_counts_into_next_day() {
        let b = run("2024-06-11", "Shift 2", "22:00", "02:00", false);
        assert_eq!(b.normal_minutes, 0);
        assert_eq!(b.double_minutes, 240);
        assert_eq!(b.triple_minutes, 0);
        assert!(b.is_night);
    }

    #[test]
    fn overnight_crossing_cutoff_splits_both_tiers() {
        let b = run("2024-06-12", "Shift 2", "19:00", "01:00", false);
        assert_eq!(b.normal_minutes, 120);
        assert_eq!(b.double_minutes, 240);
    }

    #[test]
    fn triple_day_overrides_everything() {
        for d in ["2024-06-08", "2024-06-09", "2024-06-10"] {
            let b = run(d, "Shift 1", "05:00", "23:30", true);
            assert_eq!(b.triple_minutes, 18 * 60 + 30);
            assert_eq!(b.normal_minutes, 0);
            assert_eq!(b.double_minutes, 0);
            assert!(b.is_night);
        }
    }

    #[test]
    fn triple_day_overnight_span() {
        let b = run("2024-06-10", "Shift 2", "22:00", "02:00", true);
        assert_eq!(b.triple_minutes, 240);
    }

    #[test]
    fn work_before_threshold_is_not_overtime() {
        let b = run("2024-06-10", "Shift 2", "05:00", "08:00", false);
        assert_eq!(b, OtBreakdown::default());
        let weekend = run("2024-06-08", "Shift 1", "04:00", "06:30", false);
        assert_eq!(weekend.total(), 0);
    }

    #[test]
    fn zero_length_span_is_all_zero() {
        let b = run("2024-06-10", "Shift 2", "10:00", "10:00", false);
        assert_eq!(b.total(), 0);
        assert!(!b.is_night);
    }

    #[test]
    fn weekday_span_after_threshold_is_fully_covered() {
        let b = run("2024-06-13", "Shift 1", "07:00", "22:15", false);
        assert_eq!(b.total(), 22 * 60 + 15 - 7 * 60);
        assert_eq!(b.triple_minutes, 0);
    }

    #[test]
    fn night_flag_tracks_wrapped_end() {
        assert!(run("2024-06-10", "Shift 2", "09:00", "21:00", false).is_night);
        assert!(!run("2024-06-10", "Shift 2", "09:00", "20:59", false).is_night);
        assert!(run("2024-06-10", "Shift 2", "09:00", "00:30", false).is_night);
    }

    #[test]
    fn classification_is_deterministic() {
        let input = OtInput {
            work_date: date("2024-06-10"),
            shift: "Shift 2",
            in_time: t("08:00"),
            out_time: t("23:00"),
            is_triple_day: false,
        };
        assert_eq!(classify(&input), classify(&input));
    }

    #[test]
    fn clock_time_json_round_trip_uses_hh_mm() {
        let json = serde_json::to_string(&t("7:05")).unwrap();
        assert_eq!(json, "\"07:05\"");
        let back: ClockTime = serde_json::from_str("\"21:00\"").unwrap();
        assert_eq!(back.minutes(), NIGHT_CUTOFF);
        assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
    }
}
