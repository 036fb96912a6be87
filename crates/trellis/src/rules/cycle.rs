//! Cycle detection over the directed graph implied by a context's
//! connectors.
//!
//! The adjacency view (source id → destination ids) is built once per
//! call from the flat connector list, with the untested candidate edge
//! included — omitting it would only find cycles that already existed,
//! not the one the candidate would create. The traversal is a
//! depth-first walk with two marks per node: on the current stack, and
//! fully explored. Hitting an on-stack node proves a cycle; hitting a
//! fully-explored node prunes the branch. O(V+E) per call.

use std::collections::{HashMap, HashSet};

use trellis_core::component::Component;

/// Whether adding the edge `candidate_from → candidate_to` to the
/// context's committed connectors would close a directed cycle.
///
/// `candidate_id` excludes the candidate's own committed copy from the
/// adjacency, so re-validating an already-accepted connector does not see
/// its edge twice.
pub fn creates_cycle(
    existing: &[&Component],
    candidate_id: &str,
    candidate_from: &str,
    candidate_to: &str,
) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for component in existing {
        if component.id() == candidate_id {
            continue;
        }
        if let Some(fields) = component.connector() {
            adjacency
                .entry(fields.from_id.as_str())
                .or_default()
                .push(fields.to_id.as_str());
        }
    }
    adjacency
        .entry(candidate_from)
        .or_default()
        .push(candidate_to);

    // Only nodes reachable from the candidate's source can close a cycle
    // through the new edge, so the walk starts there.
    let mut on_stack = HashSet::new();
    let mut explored = HashSet::new();
    walk(candidate_from, &adjacency, &mut on_stack, &mut explored)
}

fn walk<'a>(
    node: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    on_stack: &mut HashSet<&'a str>,
    explored: &mut HashSet<&'a str>,
) -> bool {
    if on_stack.contains(node) {
        return true;
    }
    if explored.contains(node) {
        return false;
    }

    on_stack.insert(node);
    if let Some(targets) = adjacency.get(node) {
        for &target in targets {
            if walk(target, adjacency, on_stack, explored) {
                return true;
            }
        }
    }
    on_stack.remove(node);
    explored.insert(node);

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::factory;

    #[test]
    fn closing_edge_over_a_chain_is_a_cycle() {
        let ab = factory::connector("a", "b");
        let bc = factory::connector("b", "c");
        let existing = [&ab, &bc];

        assert!(creates_cycle(&existing, "candidate", "c", "a"));
        assert!(!creates_cycle(&existing, "candidate", "c", "d"));
    }

    #[test]
    fn two_node_cycle_is_still_a_cycle() {
        let ab = factory::connector("a", "b");
        assert!(creates_cycle(&[&ab], "candidate", "b", "a"));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let ab = factory::connector("a", "b");
        let ac = factory::connector("a", "c");
        let bd = factory::connector("b", "d");
        let existing = [&ab, &ac, &bd];

        // c -> d converges with b -> d without closing a loop.
        assert!(!creates_cycle(&existing, "candidate", "c", "d"));
    }

    #[test]
    fn revalidating_a_committed_edge_ignores_its_own_copy() {
        let ab = factory::connector("a", "b");
        let existing = [&ab];
        assert!(!creates_cycle(&existing, ab.id(), "a", "b"));
    }

    #[test]
    fn cycle_elsewhere_in_the_graph_is_invisible_from_the_source() {
        // x <-> y is already cyclic, but the candidate cannot reach it.
        let xy = factory::connector("x", "y");
        let yx = factory::connector("y", "x");
        let existing = [&xy, &yx];

        assert!(!creates_cycle(&existing, "candidate", "a", "b"));
    }
}
