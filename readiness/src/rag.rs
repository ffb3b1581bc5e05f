//! RAG bucketing and due-date urgency for compliance-control reporting.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

/// Red/Amber/Green health indicator.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RagStatus {
    Red,
    Amber,
    Green,
}

/// Bucket a completion percentage, where higher is healthier.
///
/// `percentage >= green_floor` is green, `>= amber_floor` amber, else red.
pub fn rag_for_percentage(percentage: u8, amber_floor: u8, green_floor: u8) -> RagStatus {
    if percentage >= green_floor {
        RagStatus::Green
    } else if percentage >= amber_floor {
        RagStatus::Amber
    } else {
        RagStatus::Red
    }
}

/// Bucket a key-risk-indicator reading, where a higher reading is worse.
///
/// `value >= red_ceiling` is red, `>= amber_ceiling` amber, else green.
pub fn rag_for_kri(value: f64, amber_ceiling: f64, red_ceiling: f64) -> RagStatus {
    if value >= red_ceiling {
        RagStatus::Red
    } else if value >= amber_ceiling {
        RagStatus::Amber
    } else {
        RagStatus::Green
    }
}

/// Due-date urgency bucket for scheduled control tests.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Urgency {
    Overdue,
    DueSoon,
    OnTrack,
}

/// Classify a due date relative to `today`.
///
/// A due date strictly before today is overdue; within
/// `soon_window_days` (inclusive of today) it is due soon.
pub fn urgency_for_due_date(today: NaiveDate, due: NaiveDate, soon_window_days: i64) -> Urgency {
    let days_left = (due - today).num_days();
    if days_left < 0 {
        Urgency::Overdue
    } else if days_left <= soon_window_days {
        Urgency::DueSoon
    } else {
        Urgency::OnTrack
    }
}

/// Order items most-urgent first: overdue, then ascending due date, items
/// without a due date last. The sort is stable, so ties keep their
/// incoming order.
pub fn sort_by_urgency<T>(items: &mut [T], due_date: impl Fn(&T) -> Option<NaiveDate>) {
    items.sort_by_key(|item| {
        let due = due_date(item);
        (due.is_none(), due)
    });
}
