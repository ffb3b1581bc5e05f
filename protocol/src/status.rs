//! Status vocabularies for the item collections a workspace page tracks.
//!
//! Each collection family (checklist, evidence, review gates, tasks,
//! narrative text) carries its own small closed status enumeration. A
//! collection's state is a plain `HashMap<ItemId, S>`; an absent key means
//! the item is still at the kind's default status, never an error.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;
use strum_macros::EnumString;

/// Identifier of one trackable item within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The collection families served by the persistence endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Checklist,
    Evidence,
    ReviewGate,
    Task,
    Narrative,
}

/// A status enumeration tracked per item in one collection family.
///
/// `from_wire` is deliberately forgiving: a literal the enumeration does
/// not know (stale client, server schema drift) falls back to the kind's
/// default status instead of failing the whole collection.
pub trait TrackedStatus: Clone + Default + Eq + std::hash::Hash + fmt::Display {
    /// The collection family this status vocabulary belongs to.
    const KIND: ItemKind;

    /// Parse a wire literal, falling back to the default status.
    fn from_wire(raw: &str) -> Self;

    /// The wire form of this status.
    fn as_wire(&self) -> String {
        self.to_string()
    }

    /// The statuses counted as "complete" for readiness purposes.
    fn complete_statuses() -> HashSet<Self>;
}

/// Authorisation-pack checklist item lifecycle.
#[derive(
    Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChecklistItemStatus {
    #[default]
    NotStarted,
    InProgress,
    DraftReady,
    Reviewed,
    FinalReady,
    Submitted,
}

impl TrackedStatus for ChecklistItemStatus {
    const KIND: ItemKind = ItemKind::Checklist;

    fn from_wire(raw: &str) -> Self {
        Self::from_str(raw).unwrap_or_default()
    }

    fn complete_statuses() -> HashSet<Self> {
        HashSet::from([Self::FinalReady, Self::Submitted])
    }
}

/// Evidence-library upload state.
#[derive(
    Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EvidenceStatus {
    #[default]
    Required,
    Pending,
    Uploaded,
}

impl TrackedStatus for EvidenceStatus {
    const KIND: ItemKind = ItemKind::Evidence;

    fn from_wire(raw: &str) -> Self {
        Self::from_str(raw).unwrap_or_default()
    }

    fn complete_statuses() -> HashSet<Self> {
        HashSet::from([Self::Uploaded])
    }
}

/// Review-gate state for a section awaiting sign-off.
#[derive(
    Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReviewGateState {
    #[default]
    Pending,
    InReview,
    ChangesRequested,
    Approved,
}

impl TrackedStatus for ReviewGateState {
    const KIND: ItemKind = ItemKind::ReviewGate;

    fn from_wire(raw: &str) -> Self {
        Self::from_str(raw).unwrap_or_default()
    }

    fn complete_statuses() -> HashSet<Self> {
        HashSet::from([Self::Approved])
    }
}

/// Remediation/action task state.
#[derive(
    Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

impl TrackedStatus for TaskStatus {
    const KIND: ItemKind = ItemKind::Task;

    fn from_wire(raw: &str) -> Self {
        Self::from_str(raw).unwrap_or_default()
    }

    fn complete_statuses() -> HashSet<Self> {
        HashSet::from([Self::Done])
    }
}

/// Free-text narrative fields are tracked like any other collection, but a
/// narrative is never "complete" and every wire literal is a valid value.
impl TrackedStatus for String {
    const KIND: ItemKind = ItemKind::Narrative;

    fn from_wire(raw: &str) -> Self {
        raw.to_string()
    }

    fn complete_statuses() -> HashSet<Self> {
        HashSet::new()
    }
}

/// Parse a raw wire collection into a typed status map.
///
/// Unknown status literals degrade to the kind's default per item; the
/// rest of the collection is unaffected.
pub fn parse_status_map<S: TrackedStatus>(raw: &HashMap<String, String>) -> HashMap<ItemId, S> {
    raw.iter()
        .map(|(id, status)| (ItemId::new(id.clone()), S::from_wire(status)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_round_trip_is_snake_case() {
        assert_eq!(ChecklistItemStatus::FinalReady.as_wire(), "final_ready");
        assert_eq!(
            ChecklistItemStatus::from_wire("final_ready"),
            ChecklistItemStatus::FinalReady
        );
        assert_eq!(ReviewGateState::ChangesRequested.as_wire(), "changes_requested");
    }

    #[test]
    fn unknown_wire_literal_falls_back_to_default() {
        assert_eq!(
            ChecklistItemStatus::from_wire("definitely_not_a_status"),
            ChecklistItemStatus::NotStarted
        );
        assert_eq!(EvidenceStatus::from_wire(""), EvidenceStatus::Required);
        assert_eq!(TaskStatus::from_wire("DONE"), TaskStatus::Open);
    }

    #[test]
    fn serde_uses_snake_case_literals() {
        let json = serde_json::to_string(&EvidenceStatus::Uploaded).expect("serialize");
        assert_eq!(json, "\"uploaded\"");
        let back: EvidenceStatus = serde_json::from_str("\"pending\"").expect("deserialize");
        assert_eq!(back, EvidenceStatus::Pending);
    }

    #[test]
    fn parse_status_map_degrades_unknown_entries_individually() {
        let raw = HashMap::from([
            ("a".to_string(), "uploaded".to_string()),
            ("b".to_string(), "mystery".to_string()),
        ]);

        let parsed: HashMap<ItemId, EvidenceStatus> = parse_status_map(&raw);

        assert_eq!(parsed[&ItemId::from("a")], EvidenceStatus::Uploaded);
        assert_eq!(parsed[&ItemId::from("b")], EvidenceStatus::Required);
    }

    #[test]
    fn narrative_text_is_never_complete() {
        assert!(String::complete_statuses().is_empty());
        assert_eq!(String::from_wire("draft wording"), "draft wording");
    }

    #[test]
    fn item_id_serde_is_transparent() {
        let id = ItemId::from("smf-apportionment");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"smf-apportionment\"");
    }
}
