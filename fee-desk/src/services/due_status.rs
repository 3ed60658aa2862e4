//! Due-date classification shared by the collection and pending-fee views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueUrgency {
    Overdue,
    DueToday,
    Upcoming,
    Unscheduled,
}

impl DueUrgency {
    pub fn color_class(&self) -> &'static str {
        match self {
            DueUrgency::Overdue => "text-red-600",
            DueUrgency::DueToday => "text-orange-600",
            DueUrgency::Upcoming => "text-green-600",
            DueUrgency::Unscheduled => "text-gray-500",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueStatus {
    pub urgency: DueUrgency,
    pub color_class: String,
    pub label: String,
    pub days_overdue: i64,
}

impl DueStatus {
    fn new(urgency: DueUrgency, label: String, days_overdue: i64) -> Self {
        Self {
            urgency,
            color_class: urgency.color_class().to_string(),
            label,
            days_overdue,
        }
    }
}

fn days(n: i64) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

/// Classify a due date relative to `today`.
///
/// Callers pass the current date on every evaluation; nothing here is cached.
pub fn classify_due_date(due: Option<NaiveDate>, today: NaiveDate) -> DueStatus {
    let Some(due) = due else {
        return DueStatus::new(DueUrgency::Unscheduled, "No Due Date".to_string(), 0);
    };

    let diff = (due - today).num_days();

    if diff < 0 {
        let overdue = diff.abs();
        DueStatus::new(
            DueUrgency::Overdue,
            format!("Overdue ({})", days(overdue)),
            overdue,
        )
    } else if diff == 0 {
        DueStatus::new(DueUrgency::DueToday, "Due Today".to_string(), 0)
    } else {
        DueStatus::new(DueUrgency::Upcoming, format!("Due in {}", days(diff)), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_overdue() {
        let status = classify_due_date(Some(today() - Duration::days(3)), today());
        assert_eq!(status.urgency, DueUrgency::Overdue);
        assert_eq!(status.days_overdue, 3);
        assert!(status.label.contains("Overdue (3 days)"));
        assert_eq!(status.color_class, "text-red-600");
    }

    #[test]
    fn test_overdue_crosses_month_boundary() {
        // 2024 is a leap year: Feb 29 is one day before Mar 1.
        let status = classify_due_date(NaiveDate::from_ymd_opt(2024, 2, 29), today());
        assert_eq!(status.days_overdue, 1);
        assert_eq!(status.label, "Overdue (1 day)");
    }

    #[test]
    fn test_due_today() {
        let status = classify_due_date(Some(today()), today());
        assert_eq!(status.urgency, DueUrgency::DueToday);
        assert_eq!(status.label, "Due Today");
        assert_eq!(status.days_overdue, 0);
    }

    #[test]
    fn test_upcoming() {
        let status = classify_due_date(Some(today() + Duration::days(5)), today());
        assert_eq!(status.urgency, DueUrgency::Upcoming);
        assert_eq!(status.label, "Due in 5 days");
        assert_eq!(status.days_overdue, 0);
    }

    #[test]
    fn test_no_due_date() {
        let status = classify_due_date(None, today());
        assert_eq!(status.urgency, DueUrgency::Unscheduled);
        assert_eq!(status.label, "No Due Date");
        assert_eq!(status.days_overdue, 0);
    }
}
