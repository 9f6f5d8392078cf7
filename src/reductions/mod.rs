//! Optimality-preserving graph rewriting rules and their fixed-point driver.
//!
//! Rules are ordered cheapest-first; the driver restarts the scan from the
//! top after every successful application, so expensive rules only ever see
//! graphs the cheap rules are already done with.

use crate::error::Result;
use crate::instance::Instance;
use log::trace;
use serde::Serialize;

mod alber_main;
mod alber_simple;
mod contract;
mod disregard;
mod force_edge;
mod local_bruteforce;
mod same_dominators;

/// A reduction rule: `apply` returns true iff it changed the graph, and on
/// every true some well-ordered measure of the instance strictly shrinks, so
/// the driver's fixed point terminates.
///
/// `complexity_dense`/`complexity_sparse` classify the worst-case cost as
/// O(|G|^c) on dense respectively sparse graphs; the driver filters on the
/// dense class.
#[derive(Clone, Copy)]
pub struct ReductionRule {
    pub name: &'static str,
    pub complexity_dense: u32,
    pub complexity_sparse: u32,
    apply: fn(&mut Instance) -> Result<bool>,
}

impl std::fmt::Debug for ReductionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReductionRule")
            .field("name", &self.name)
            .field("complexity_dense", &self.complexity_dense)
            .field("complexity_sparse", &self.complexity_sparse)
            .finish()
    }
}

impl ReductionRule {
    pub fn apply(&self, g: &mut Instance) -> Result<bool> {
        trace!(
            "trying {} (n={}, m={}, f={}, d={})",
            self.name,
            g.node_count(),
            g.edge_count(),
            g.forced_edge_count(),
            g.disregarded_node_count(),
        );
        let applied = (self.apply)(g)?;
        if applied {
            trace!(
                "applied {} (n={}, m={}, f={})",
                self.name,
                g.node_count(),
                g.edge_count(),
                g.forced_edge_count(),
            );
        }
        Ok(applied)
    }
}

/// Per-rule hit counters, reported at the end of a run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RuleCounter {
    pub name: String,
    pub applications: u64,
    pub successes: u64,
}

pub fn new_counters(rules: &[ReductionRule]) -> Vec<RuleCounter> {
    rules
        .iter()
        .map(|rule| RuleCounter {
            name: rule.name.to_string(),
            ..RuleCounter::default()
        })
        .collect()
}

/// Runs the rules to a fixed point, skipping those whose dense complexity
/// class exceeds `max_complexity`. Declaration order is the priority order.
pub fn reduce(
    g: &mut Instance,
    rules: &[ReductionRule],
    max_complexity: u32,
    counters: &mut [RuleCounter],
) -> Result<()> {
    debug_assert_eq!(rules.len(), counters.len());
    'restart: loop {
        for (rule, counter) in rules.iter().zip(counters.iter_mut()) {
            if rule.complexity_dense > max_complexity {
                continue;
            }
            counter.applications += 1;
            if rule.apply(g)? {
                counter.successes += 1;
                continue 'restart;
            }
        }
        return Ok(());
    }
}

/// One-shot variant for callers that don't track counters.
pub fn reduce_uncounted(
    g: &mut Instance,
    rules: &[ReductionRule],
    max_complexity: u32,
) -> Result<()> {
    let mut counters = new_counters(rules);
    reduce(g, rules, max_complexity, &mut counters)
}

pub const FORCE_EDGE_RULE: ReductionRule = ReductionRule {
    name: "ForceEdgeRule",
    complexity_dense: 1,
    complexity_sparse: 1,
    apply: force_edge::apply,
};

pub const DISREGARD_RULE: ReductionRule = ReductionRule {
    name: "DisregardRule",
    complexity_dense: 2,
    complexity_sparse: 1,
    apply: disregard::apply_disregard,
};

pub const DOMINATED_NEIGHBOURHOOD_MARKING_RULE: ReductionRule = ReductionRule {
    name: "DominatedNeighbourhoodMarkingRule",
    complexity_dense: 2,
    complexity_sparse: 1,
    apply: disregard::apply_dominated_neighbourhood_marking,
};

pub const REMOVE_DISREGARDED_RULE: ReductionRule = ReductionRule {
    name: "RemoveDisregardedRule",
    complexity_dense: 2,
    complexity_sparse: 1,
    apply: disregard::apply_remove_disregarded,
};

pub const SINGLE_DOMINATOR_RULE: ReductionRule = ReductionRule {
    name: "SingleDominatorRule",
    complexity_dense: 2,
    complexity_sparse: 1,
    apply: disregard::apply_single_dominator,
};

pub const SAME_DOMINATORS_RULE: ReductionRule = ReductionRule {
    name: "SameDominatorsRule",
    complexity_dense: 3,
    complexity_sparse: 2,
    apply: same_dominators::apply,
};

pub const ALBER_SIMPLE_RULE_1: ReductionRule = ReductionRule {
    name: "AlberSimpleRule1 (dominated edge removal)",
    complexity_dense: 2,
    complexity_sparse: 1,
    apply: alber_simple::apply_rule_1,
};

pub const ALBER_SIMPLE_RULE_2: ReductionRule = ReductionRule {
    name: "AlberSimpleRule2 (dominated leaf removal)",
    complexity_dense: 2,
    complexity_sparse: 1,
    apply: alber_simple::apply_rule_2,
};

pub const ALBER_SIMPLE_RULE_3: ReductionRule = ReductionRule {
    name: "AlberSimpleRule3 (dominated degree 2 vertex removal)",
    complexity_dense: 2,
    complexity_sparse: 1,
    apply: alber_simple::apply_rule_3,
};

pub const ALBER_SIMPLE_RULE_4: ReductionRule = ReductionRule {
    name: "AlberSimpleRule4 (dominated degree 3 vertex removal)",
    complexity_dense: 2,
    complexity_sparse: 1,
    apply: alber_simple::apply_rule_4,
};

pub const ALBER_MAIN_RULE_1: ReductionRule = ReductionRule {
    name: "AlberMainRule1",
    complexity_dense: 3,
    complexity_sparse: 1,
    apply: alber_main::apply_rule_1,
};

pub const ALBER_MAIN_RULE_2: ReductionRule = ReductionRule {
    name: "AlberMainRule2",
    complexity_dense: 4,
    complexity_sparse: 2,
    apply: alber_main::apply_rule_2,
};

pub const CONTRACT_RULE: ReductionRule = ReductionRule {
    name: "ContractRule",
    complexity_dense: 1,
    complexity_sparse: 1,
    apply: contract::apply,
};

pub const LOCAL_BRUTEFORCE_RULE: ReductionRule = ReductionRule {
    name: "LocalBruteforceRule",
    complexity_dense: 1,
    complexity_sparse: 1,
    apply: local_bruteforce::apply,
};

/// The default presolve library, cheapest rules first.
pub fn default_rules() -> Vec<ReductionRule> {
    vec![
        FORCE_EDGE_RULE,
        // Rules deciding membership without touching the structure.
        DISREGARD_RULE,
        DOMINATED_NEIGHBOURHOOD_MARKING_RULE,
        REMOVE_DISREGARDED_RULE,
        SINGLE_DOMINATOR_RULE,
        SAME_DOMINATORS_RULE,
        // Cheap rules that only remove vertices.
        ALBER_SIMPLE_RULE_1,
        ALBER_SIMPLE_RULE_2,
        ALBER_SIMPLE_RULE_3,
        ALBER_SIMPLE_RULE_4,
        // Then the expensive neighborhood rules.
        ALBER_MAIN_RULE_1,
        ALBER_MAIN_RULE_2,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::assert_consistent;
    use crate::instance::NodeId;

    #[test]
    fn fixed_point_is_idempotent() {
        // A graph every default rule gets a chance to chew on: a star with a
        // pendant path.
        let mut g = Instance::from_edges(
            7,
            &[(1, 2), (1, 3), (1, 4), (1, 5), (5, 6), (6, 7)],
        )
        .unwrap();
        let rules = default_rules();
        reduce_uncounted(&mut g, &rules, u32::MAX).unwrap();
        assert_consistent(&g);

        let nodes_before = g.nodes.clone();
        let ds_before = g.ds.clone();
        let mut counters = new_counters(&rules);
        reduce(&mut g, &rules, u32::MAX, &mut counters).unwrap();
        assert_eq!(g.nodes, nodes_before);
        assert_eq!(g.ds, ds_before);
        assert!(counters.iter().all(|c| c.successes == 0));
    }

    #[test]
    fn complexity_budget_skips_expensive_rules() {
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (3, 4)]).unwrap();
        let rules = [SAME_DOMINATORS_RULE];
        let mut counters = new_counters(&rules);
        reduce(&mut g, &rules, 2, &mut counters).unwrap();
        assert_eq!(counters[0].applications, 0);
    }

    #[test]
    fn reductions_solve_a_star_outright() {
        let mut g = Instance::from_edges(5, &[(1, 2), (1, 3), (1, 4), (1, 5)]).unwrap();
        reduce_uncounted(&mut g, &default_rules(), u32::MAX).unwrap();
        assert!(g.nodes.is_empty());
        assert_eq!(g.ds, vec![NodeId::from(1_u32)]);
    }
}
