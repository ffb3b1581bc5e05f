//! Completion counting and percentage math.

use std::collections::HashMap;
use std::collections::HashSet;
use std::hash::Hash;

use nasara_protocol::ItemId;
use tracing::warn;

/// Derived completion summary for one collection or group.
///
/// `total` may exceed the status map's key count: items the user has not
/// touched yet have no map entry but still count toward the denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub completed: usize,
    pub total: usize,
    /// Rounded half-up; always within `0..=100`.
    pub percentage: u8,
}

impl Readiness {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

fn readiness_from_counts(completed: usize, total: usize) -> Readiness {
    if total == 0 {
        return Readiness {
            completed,
            total,
            percentage: 0,
        };
    }
    if completed > total {
        // Inconsistent caller input (stale map keys counted against a
        // smaller universe). Surface it, clamp, keep rendering.
        warn!(completed, total, "completed count exceeds total; clamping percentage to 100");
        return Readiness {
            completed,
            total,
            percentage: 100,
        };
    }
    let percentage = ((completed * 200 + total) / (total * 2)) as u8;
    Readiness {
        completed,
        total,
        percentage,
    }
}

/// Count how many entries of `status_map` hold a complete status.
///
/// Pure and total: malformed or unexpected statuses simply fail the
/// membership test and count as not complete. Callers passing a `total`
/// smaller than the map's key universe should pre-filter the map or use
/// [`compute_completion_within`].
pub fn compute_completion<S>(
    status_map: &HashMap<ItemId, S>,
    total: usize,
    complete: &HashSet<S>,
) -> Readiness
where
    S: Eq + Hash,
{
    let completed = status_map.values().filter(|s| complete.contains(s)).count();
    readiness_from_counts(completed, total)
}

/// Like [`compute_completion`], but only keys inside `allowed_ids` are
/// considered and the denominator is the universe size.
///
/// This is the stale-key guard: after a template change the status map may
/// still hold entries for items that no longer exist, and those must not
/// inflate the numerator.
pub fn compute_completion_within<S>(
    status_map: &HashMap<ItemId, S>,
    allowed_ids: &HashSet<ItemId>,
    complete: &HashSet<S>,
) -> Readiness
where
    S: Eq + Hash,
{
    let completed = status_map
        .iter()
        .filter(|(id, status)| allowed_ids.contains(id) && complete.contains(status))
        .count();
    readiness_from_counts(completed, allowed_ids.len())
}

/// Per-group completion, e.g. checklist categories or timeline phases.
///
/// Groups appear in first-encounter order of `group_key` over `items`;
/// no sorting is applied.
pub fn compute_grouped_completion<'a, I, G, S>(
    items: &'a [I],
    status_map: &HashMap<ItemId, S>,
    group_key: impl Fn(&'a I) -> G,
    item_id: impl Fn(&'a I) -> &'a ItemId,
    complete: &HashSet<S>,
) -> Vec<(G, Readiness)>
where
    G: PartialEq,
    S: Eq + Hash,
{
    let mut counts: Vec<(G, usize, usize)> = Vec::new();
    for item in items {
        let key = group_key(item);
        let done = status_map
            .get(item_id(item))
            .is_some_and(|s| complete.contains(s));
        match counts.iter().position(|(g, _, _)| *g == key) {
            Some(idx) => {
                let (_, completed, total) = &mut counts[idx];
                *total += 1;
                if done {
                    *completed += 1;
                }
            }
            None => counts.push((key, usize::from(done), 1)),
        }
    }
    counts
        .into_iter()
        .map(|(key, completed, total)| (key, readiness_from_counts(completed, total)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nasara_protocol::ChecklistItemStatus;
    use nasara_protocol::EvidenceStatus;
    use nasara_protocol::TrackedStatus;
    use pretty_assertions::assert_eq;

    fn checklist_map(entries: &[(&str, ChecklistItemStatus)]) -> HashMap<ItemId, ChecklistItemStatus> {
        entries
            .iter()
            .map(|(id, status)| (ItemId::from(*id), *status))
            .collect()
    }

    #[test]
    fn counts_only_complete_statuses() {
        let map = checklist_map(&[
            ("a", ChecklistItemStatus::NotStarted),
            ("b", ChecklistItemStatus::FinalReady),
        ]);

        let result = compute_completion(&map, 3, &ChecklistItemStatus::complete_statuses());

        assert_eq!(
            result,
            Readiness {
                completed: 1,
                total: 3,
                percentage: 33,
            }
        );
    }

    #[test]
    fn empty_map_and_zero_total_yield_zero_percentage() {
        let map: HashMap<ItemId, ChecklistItemStatus> = HashMap::new();

        let result = compute_completion(&map, 0, &ChecklistItemStatus::complete_statuses());

        assert_eq!(result.percentage, 0);
        assert_eq!(result.completed, 0);
    }

    #[test]
    fn percentage_rounds_half_up() {
        let map = checklist_map(&[("a", ChecklistItemStatus::Submitted)]);

        // 1 of 8 complete: 12.5% rounds to 13.
        let result = compute_completion(&map, 8, &ChecklistItemStatus::complete_statuses());

        assert_eq!(result.percentage, 13);
    }

    #[test]
    fn full_completion_is_exactly_one_hundred() {
        let map = checklist_map(&[
            ("a", ChecklistItemStatus::Submitted),
            ("b", ChecklistItemStatus::FinalReady),
        ]);

        let result = compute_completion(&map, 2, &ChecklistItemStatus::complete_statuses());

        assert_eq!(result.percentage, 100);
        assert!(result.is_complete());
    }

    #[test]
    fn inconsistent_counts_clamp_to_one_hundred() {
        let map = checklist_map(&[
            ("a", ChecklistItemStatus::Submitted),
            ("b", ChecklistItemStatus::Submitted),
            ("c", ChecklistItemStatus::Submitted),
        ]);

        // Caller claims a universe of 2 but the map holds 3 complete items.
        let result = compute_completion(&map, 2, &ChecklistItemStatus::complete_statuses());

        assert_eq!(result.percentage, 100);
        assert_eq!(result.completed, 3);
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let map = checklist_map(&[("a", ChecklistItemStatus::FinalReady)]);
        let complete = ChecklistItemStatus::complete_statuses();

        assert_eq!(
            compute_completion(&map, 4, &complete),
            compute_completion(&map, 4, &complete)
        );
    }

    #[test]
    fn within_ignores_stale_keys_outside_the_universe() {
        let map = checklist_map(&[
            ("kept", ChecklistItemStatus::Submitted),
            ("removed-by-template-change", ChecklistItemStatus::Submitted),
        ]);
        let universe = HashSet::from([ItemId::from("kept"), ItemId::from("untouched")]);

        let result =
            compute_completion_within(&map, &universe, &ChecklistItemStatus::complete_statuses());

        assert_eq!(
            result,
            Readiness {
                completed: 1,
                total: 2,
                percentage: 50,
            }
        );
    }

    #[test]
    fn grouped_results_keep_first_encounter_order() {
        struct Item {
            id: ItemId,
            phase: &'static str,
        }
        let items = vec![
            Item { id: ItemId::from("a"), phase: "scoping" },
            Item { id: ItemId::from("b"), phase: "drafting" },
            Item { id: ItemId::from("c"), phase: "scoping" },
        ];
        let map: HashMap<ItemId, EvidenceStatus> =
            HashMap::from([(ItemId::from("a"), EvidenceStatus::Uploaded)]);

        let grouped = compute_grouped_completion(
            &items,
            &map,
            |i| i.phase,
            |i| &i.id,
            &EvidenceStatus::complete_statuses(),
        );

        let keys: Vec<&str> = grouped.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["scoping", "drafting"]);
        assert_eq!(grouped[0].1.completed, 1);
        assert_eq!(grouped[0].1.total, 2);
        assert_eq!(grouped[1].1.total, 1);
    }

    #[test]
    fn items_missing_from_the_map_count_toward_totals_only() {
        let map = checklist_map(&[("b", ChecklistItemStatus::FinalReady)]);
        let universe = HashSet::from([ItemId::from("a"), ItemId::from("b"), ItemId::from("c")]);

        let result =
            compute_completion_within(&map, &universe, &ChecklistItemStatus::complete_statuses());

        assert_eq!(result.completed, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.percentage, 33);
    }
}
