//! Roster analytics.
//!
//! Counts, percentages and averages over the enhanced roster, plus the dashboard insights.
//! Percentages and averages are rounded half-up to one decimal place.

use crate::constants::{EXTENDED_STAY_DAYS, HIGH_SCORE_THRESHOLD};
use crate::derived::EnhancedPatient;
use crate::patient::DischargeStatus;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Rounds half-up (away from zero) to one decimal place.
pub fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole * 100`, rounded to one decimal. An empty whole yields `0.0`.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    one_decimal(part as f64 / whole as f64 * 100.0)
}

/// Whole days since admission, rounded up. Admission is taken at UTC midnight.
pub fn length_of_stay(admission_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let admitted = admission_date.and_time(NaiveTime::MIN).and_utc();
    let elapsed = now.signed_duration_since(admitted).num_milliseconds() as f64;
    (elapsed / MILLIS_PER_DAY).ceil() as i64
}

fn average<I>(values: I) -> f64
where
    I: ExactSizeIterator<Item = f64>,
{
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Aggregate figures over the whole roster at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub total: usize,
    pub ready: usize,
    pub pending: usize,
    pub delayed: usize,
    pub ready_percent: f64,
    pub pending_percent: f64,
    pub delayed_percent: f64,
    pub average_urgency: f64,
    pub average_complexity: f64,
    /// Unrounded; callers round for display.
    pub average_length_of_stay: f64,
    pub high_urgency: usize,
    pub high_complexity: usize,
}

impl RosterSummary {
    pub fn compute(patients: &[EnhancedPatient], now: DateTime<Utc>) -> Self {
        let count = |status: DischargeStatus| {
            patients
                .iter()
                .filter(|p| p.discharge_status == status)
                .count()
        };
        let total = patients.len();
        let ready = count(DischargeStatus::Ready);
        let pending = count(DischargeStatus::Pending);
        let delayed = count(DischargeStatus::Delayed);

        Self {
            total,
            ready,
            pending,
            delayed,
            ready_percent: percentage(ready, total),
            pending_percent: percentage(pending, total),
            delayed_percent: percentage(delayed, total),
            average_urgency: one_decimal(average(patients.iter().map(|p| f64::from(p.urgency)))),
            average_complexity: one_decimal(average(
                patients.iter().map(|p| f64::from(p.complexity)),
            )),
            average_length_of_stay: average(
                patients
                    .iter()
                    .map(|p| length_of_stay(p.admission_date, now) as f64),
            ),
            high_urgency: patients
                .iter()
                .filter(|p| p.urgency >= HIGH_SCORE_THRESHOLD)
                .count(),
            high_complexity: patients
                .iter()
                .filter(|p| p.complexity >= HIGH_SCORE_THRESHOLD)
                .count(),
        }
    }

    pub fn count(&self, status: DischargeStatus) -> usize {
        match status {
            DischargeStatus::Ready => self.ready,
            DischargeStatus::Pending => self.pending,
            DischargeStatus::Delayed => self.delayed,
        }
    }

    /// Dashboard insights in display order: delays, ready, extended stay, pending.
    pub fn insights(&self) -> Vec<Insight> {
        let mut insights = Vec::new();

        if self.delayed > 0 {
            insights.push(Insight {
                kind: InsightKind::Alert,
                title: "Delayed Discharges",
                message: format!(
                    "{} experiencing discharge delays.",
                    patients_are(self.delayed)
                ),
                priority: InsightPriority::High,
            });
        }
        if self.ready > 0 {
            insights.push(Insight {
                kind: InsightKind::Success,
                title: "Ready for Discharge",
                message: format!("{} ready for discharge.", patients_are(self.ready)),
                priority: InsightPriority::Medium,
            });
        }
        if self.average_length_of_stay > EXTENDED_STAY_DAYS {
            insights.push(Insight {
                kind: InsightKind::Warning,
                title: "Extended Stay Alert",
                message: format!(
                    "Average length of stay ({} days) is above optimal range.",
                    one_decimal(self.average_length_of_stay)
                ),
                priority: InsightPriority::Medium,
            });
        }
        if self.pending > 0 {
            insights.push(Insight {
                kind: InsightKind::Info,
                title: "Pending Discharges",
                message: format!("{} pending discharge actions.", patients_are(self.pending)),
                priority: InsightPriority::Low,
            });
        }

        insights
    }
}

fn patients_are(n: usize) -> String {
    if n > 1 {
        format!("{n} patients are")
    } else {
        format!("{n} patient is")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Alert,
    Success,
    Warning,
    Info,
}

impl InsightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

impl InsightPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// One dashboard insight card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: &'static str,
    pub message: String,
    pub priority: InsightPriority,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::PatientRegistry;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn seed() -> Vec<EnhancedPatient> {
        EnhancedPatient::from_registry(&PatientRegistry::seed())
    }

    #[test]
    fn two_of_six_is_thirty_three_point_three() {
        assert_eq!(percentage(2, 6), 33.3);
        assert_eq!(format!("{:.1}", percentage(2, 6)), "33.3");
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 12.5);
        assert_eq!(percentage(1, 16), 6.3);
        assert_eq!(percentage(4, 6), 66.7);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn length_of_stay_rounds_partial_days_up() {
        let admitted = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(length_of_stay(admitted, at(2025, 1, 15, 0)), 0);
        assert_eq!(length_of_stay(admitted, at(2025, 1, 15, 1)), 1);
        assert_eq!(length_of_stay(admitted, at(2025, 1, 17, 0)), 2);
        assert_eq!(length_of_stay(admitted, at(2025, 1, 17, 12)), 3);
    }

    #[test]
    fn summarises_seed_roster() {
        let summary = RosterSummary::compute(&seed(), at(2025, 1, 21, 12));
        assert_eq!(summary.total, 6);
        assert_eq!((summary.ready, summary.pending, summary.delayed), (2, 2, 2));
        assert_eq!(summary.ready_percent, 33.3);
        // urgencies 5+8+10+5+7+8 = 43, complexities 4+5+4+4+4+3 = 24
        assert_eq!(summary.average_urgency, 7.2);
        assert_eq!(summary.average_complexity, 4.0);
        assert_eq!(summary.high_urgency, 3);
        assert_eq!(summary.high_complexity, 0);
        // stays of 7, 6, 5, 4, 3, 2 days
        assert_eq!(summary.average_length_of_stay, 4.5);
    }

    #[test]
    fn insights_follow_dashboard_order() {
        let summary = RosterSummary::compute(&seed(), at(2025, 3, 1, 0));
        let titles: Vec<&str> = summary.insights().iter().map(|i| i.title).collect();
        assert_eq!(
            titles,
            [
                "Delayed Discharges",
                "Ready for Discharge",
                "Extended Stay Alert",
                "Pending Discharges"
            ]
        );
        let first = &summary.insights()[0];
        assert_eq!(first.message, "2 patients are experiencing discharge delays.");
        assert_eq!(first.priority, InsightPriority::High);
    }

    #[test]
    fn short_stays_do_not_raise_extended_stay_alert() {
        let summary = RosterSummary::compute(&seed(), at(2025, 1, 21, 12));
        assert!(summary
            .insights()
            .iter()
            .all(|i| i.kind != InsightKind::Warning));
    }

    #[test]
    fn singular_wording_for_one_patient() {
        let one: Vec<EnhancedPatient> = seed().into_iter().take(1).collect();
        let summary = RosterSummary::compute(&one, at(2025, 1, 16, 0));
        assert_eq!(summary.insights()[0].message, "1 patient is ready for discharge.");
    }
}
