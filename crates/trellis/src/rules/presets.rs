//! Ready-made rule sets for common diagram disciplines.
//!
//! Each preset is a plain [`ConnectorRule`] value; callers register one
//! under a context id and may further restrict it with the `with_*`
//! combinators before registering.

use trellis_core::component::ComponentKind;

use super::cycle::creates_cycle;
use super::{Candidate, ConnectorRule, RejectReason};

fn reject_cycles(candidate: &Candidate<'_>) -> Result<(), RejectReason> {
    if creates_cycle(
        candidate.existing,
        candidate.connector.id(),
        &candidate.fields.from_id,
        &candidate.fields.to_id,
    ) {
        Err(RejectReason::CycleDetected)
    } else {
        Ok(())
    }
}

/// No contextual restriction; intrinsic validation only.
pub fn permissive() -> ConnectorRule {
    ConnectorRule::new()
}

/// Tree discipline: at most one incoming edge per node, no cycles.
pub fn strict_tree() -> ConnectorRule {
    ConnectorRule::new().with_max_to(1).with_predicate(reject_cycles)
}

/// Directed acyclic graph: cycles rejected, fan-in unrestricted.
pub fn dag() -> ConnectorRule {
    ConnectorRule::new().with_predicate(reject_cycles)
}

/// Sequential chain: at most one incoming and one outgoing edge per node.
pub fn sequential() -> ConnectorRule {
    ConnectorRule::new().with_max_from(1).with_max_to(1)
}

/// Classic flowchart discipline: the four flow kinds on both ends, no
/// terminator-to-terminator connections, generous fan limits.
pub fn flowchart() -> ConnectorRule {
    let flow_kinds = [
        ComponentKind::StartEnd,
        ComponentKind::Process,
        ComponentKind::Decision,
        ComponentKind::Data,
    ];
    ConnectorRule::new()
        .with_allowed_from(flow_kinds)
        .with_allowed_to(flow_kinds)
        .with_forbidden_pair(ComponentKind::StartEnd, ComponentKind::StartEnd)
        .with_max_from(10)
        .with_max_to(10)
}

/// Process network: process-to-process links only, and a one-way edge is
/// rejected when the reverse edge already exists — the pair must be
/// replaced by a single bidirectional connector.
pub fn process_network() -> ConnectorRule {
    ConnectorRule::new()
        .with_allowed_from([ComponentKind::Process])
        .with_allowed_to([ComponentKind::Process])
        .with_predicate(|candidate| {
            let reverse_exists = candidate
                .existing
                .iter()
                .filter_map(|c| c.connector())
                .any(|f| {
                    f.from_id == candidate.fields.to_id && f.to_id == candidate.fields.from_id
                });
            if reverse_exists && !candidate.fields.bidirectional {
                Err(RejectReason::Custom(
                    "a reverse connection already exists; use a bidirectional connector"
                        .to_string(),
                ))
            } else {
                Ok(())
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::validate_connector;
    use trellis_core::factory;

    #[test]
    fn dag_rejects_the_closing_edge_of_a_chain() {
        let a = factory::process();
        let b = factory::process();
        let c = factory::process();
        let d = factory::process();
        let rule = dag();

        let ab = factory::connector(a.id(), b.id());
        let bc = factory::connector(b.id(), c.id());
        let committed = [&ab, &bc];

        let closing = factory::connector(c.id(), a.id());
        let err = validate_connector(&closing, &c, &a, &committed, Some(&rule)).unwrap_err();
        assert_eq!(err.reason, RejectReason::CycleDetected);

        let branching = factory::connector(c.id(), d.id());
        assert!(validate_connector(&branching, &c, &d, &committed, Some(&rule)).is_ok());
    }

    #[test]
    fn strict_tree_caps_fan_in_before_checking_cycles() {
        let a = factory::process();
        let b = factory::process();
        let c = factory::process();
        let rule = strict_tree();

        let ab = factory::connector(a.id(), b.id());
        let cb = factory::connector(c.id(), b.id());

        let err = validate_connector(&cb, &c, &b, &[&ab], Some(&rule)).unwrap_err();
        assert_eq!(err.reason, RejectReason::FanInExceeded { limit: 1 });
    }

    #[test]
    fn sequential_allows_one_edge_each_way_per_node() {
        let a = factory::process();
        let b = factory::process();
        let c = factory::process();
        let rule = sequential();

        let ab = factory::connector(a.id(), b.id());
        let bc = factory::connector(b.id(), c.id());
        assert!(validate_connector(&bc, &b, &c, &[&ab], Some(&rule)).is_ok());

        let ac = factory::connector(a.id(), c.id());
        let err = validate_connector(&ac, &a, &c, &[&ab, &bc], Some(&rule)).unwrap_err();
        assert_eq!(err.reason, RejectReason::FanOutExceeded { limit: 1 });
    }

    #[test]
    fn flowchart_forbids_terminator_to_terminator() {
        let start = factory::start();
        let end = factory::end();
        let rule = flowchart();

        let connector = factory::connector(start.id(), end.id());
        let err = validate_connector(&connector, &start, &end, &[], Some(&rule)).unwrap_err();
        assert!(matches!(err.reason, RejectReason::ForbiddenPair { .. }));
    }

    #[test]
    fn flowchart_rejects_custom_components() {
        let custom = factory::custom();
        let process = factory::process();
        let rule = flowchart();

        let connector = factory::connector(custom.id(), process.id());
        let err =
            validate_connector(&connector, &custom, &process, &[], Some(&rule)).unwrap_err();
        assert_eq!(
            err.reason,
            RejectReason::SourceKindNotAllowed(ComponentKind::Custom)
        );
    }

    #[test]
    fn process_network_requires_bidirectional_over_reverse_edges() {
        let a = factory::process();
        let b = factory::process();
        let rule = process_network();

        let ab = factory::connector(a.id(), b.id());
        let ba = factory::connector(b.id(), a.id());
        let err = validate_connector(&ba, &b, &a, &[&ab], Some(&rule)).unwrap_err();
        assert!(matches!(err.reason, RejectReason::Custom(_)));

        let mut ba_bidi = factory::connector(b.id(), a.id());
        ba_bidi.set_bidirectional(true).unwrap();
        assert!(validate_connector(&ba_bidi, &b, &a, &[&ab], Some(&rule)).is_ok());
    }
}
