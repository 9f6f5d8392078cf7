//! Local exhaustive trimming: pick a small vertex region, enumerate every
//! assignment of the surrounding separator, and fix the variables that agree
//! across all optimal extensions.
//!
//! Candidate regions come from decomposer bags and from small BFS balls; the
//! separator is handled through its two extreme assignments (take nothing of
//! it vs. take all of it), which bracket every real assignment.

use crate::error::Result;
use crate::instance::{EdgeStatus, Instance, NodeId};
use crate::set_ops;
use crate::small_indices::IdxHashSet;
use crate::treewidth::decomposer::{Decomposer, EliminationDecomposer};
use std::time::Duration;

const MAX_VARIABLES: usize = 10;
const BAG_HUNT_BUDGET: Duration = Duration::from_secs(1);

struct Peg {
    prison: Vec<NodeId>,
    exit: Vec<NodeId>,
    guard: Vec<NodeId>,
}

/// Exit/guard/prison partition of the open neighborhood of `region`: exits
/// can escape the closed ball (a forced edge counts as an escape), guards
/// see an exit, prisoners see neither.
fn peg(g: &Instance, region: &[NodeId]) -> Peg {
    let mut n_closed = Vec::new();
    for &v in region {
        n_closed = set_ops::unite(&n_closed, &g[v].n_closed);
    }
    let n_open = set_ops::difference(&n_closed, region);

    let exit: Vec<NodeId> = n_open
        .iter()
        .copied()
        .filter(|&u| {
            g[u].adj.iter().any(|ep| {
                !set_ops::contains_sorted(&n_closed, &ep.to)
                    || ep.status == EdgeStatus::Forced
            })
        })
        .collect();

    let mut guard = Vec::new();
    let mut prison = Vec::new();
    for u in set_ops::difference(&n_open, &exit) {
        if set_ops::intersect(&g[u].n_open, &exit).is_empty() {
            prison.push(u);
        } else {
            guard.push(u);
        }
    }

    Peg {
        prison,
        exit,
        guard,
    }
}

#[derive(Clone)]
struct Statuses {
    dominated: IdxHashSet<NodeId>,
    taken: IdxHashSet<NodeId>,
}

/// Separator takes nothing: every vertex of `n` must be covered from inside.
fn hard_case(g: &Instance, n: &[NodeId]) -> Statuses {
    Statuses {
        dominated: n.iter().copied().filter(|&v| g.is_dominated(v)).collect(),
        taken: IdxHashSet::default(),
    }
}

/// Separator takes everything it can; untakeable exits count as dominated if
/// anything outside the ball could cover them.
fn easy_case(g: &Instance, n: &[NodeId], exit: &[NodeId]) -> Statuses {
    let mut st = hard_case(g, n);
    for &u in exit {
        if g.is_disregarded(u) {
            let coverable = set_ops::difference(&g[u].n_open, n)
                .into_iter()
                .any(|v| !g.is_disregarded(v));
            if coverable {
                st.dominated.insert(u);
            }
        } else {
            st.taken.insert(u);
            st.dominated.extend(g[u].n_closed.iter().copied());
        }
    }
    st
}

/// A variable left untaken with a forced edge into a disregarded partner can
/// never be part of a feasible assignment.
fn is_compatible(g: &Instance, vars: &[NodeId], mask: usize) -> bool {
    vars.iter().enumerate().all(|(i, &u)| {
        mask >> i & 1 == 1
            || !g[u]
                .adj
                .iter()
                .any(|ep| ep.status == EdgeStatus::Forced && g.is_disregarded(ep.to))
    })
}

/// Cost of the assignment `mask` over `vars`, or -1 when it fails to
/// dominate `n` or violates a forced edge inside the ball.
fn solve_mask(
    g: &Instance,
    vars: &[NodeId],
    n: &[NodeId],
    mask: usize,
    base: &Statuses,
) -> i64 {
    if !is_compatible(g, vars, mask) {
        return -1;
    }
    let mut st = base.clone();
    let mut ds_size = 0;
    for (i, &u) in vars.iter().enumerate() {
        if mask >> i & 1 == 1 {
            ds_size += 1;
            st.taken.insert(u);
            st.dominated.extend(g[u].n_closed.iter().copied());
        }
    }

    for &u in n {
        if !st.dominated.contains(&u) {
            return -1;
        }
        for ep in &g[u].adj {
            if ep.status == EdgeStatus::Forced
                && set_ops::contains_sorted(n, &ep.to)
                && !st.taken.contains(&u)
                && !st.taken.contains(&ep.to)
            {
                return -1;
            }
        }
    }

    ds_size
}

/// Commits the agreed-upon bits: `y` selects the decided variables, `x`
/// their values.
fn trim(g: &mut Instance, vars: &[NodeId], x: usize, y: usize) -> Result<bool> {
    let mut did_something = false;
    for (i, &u) in vars.iter().enumerate() {
        if y >> i & 1 == 0 {
            continue;
        }
        if x >> i & 1 == 1 {
            if g.has_node(u) {
                g.take(u)?;
                did_something = true;
            }
        } else if g.has_node(u) && !g.is_disregarded(u) {
            g.mark_disregarded(u);
            did_something = true;
            let forced: Vec<NodeId> = g[u]
                .adj
                .iter()
                .filter(|ep| ep.status == EdgeStatus::Forced)
                .map(|ep| ep.to)
                .collect();
            for w in forced {
                if g.has_node(w) {
                    g.take(w)?;
                }
            }
        }
    }
    Ok(did_something)
}

fn trim_subset(g: &mut Instance, region: &[NodeId]) -> Result<bool> {
    if region.is_empty()
        || region.len() > MAX_VARIABLES
        || region.iter().any(|&v| !g.has_node(v))
    {
        return Ok(false);
    }

    let parts = peg(g, region);
    let interior = set_ops::unite(&parts.prison, &set_ops::unite(&parts.guard, region));
    let n = set_ops::unite(&interior, &parts.exit);
    let vars: Vec<NodeId> = interior
        .iter()
        .copied()
        .filter(|&v| !g.is_disregarded(v))
        .collect();
    if vars.len() > MAX_VARIABLES {
        return Ok(false);
    }

    let hard = hard_case(g, &n);
    let easy = easy_case(g, &n, &parts.exit);

    let sz = 1_usize << vars.len();
    let results: Vec<(i64, i64)> = (0..sz)
        .map(|mask| {
            (
                solve_mask(g, &vars, &n, mask, &hard),
                solve_mask(g, &vars, &n, mask, &easy),
            )
        })
        .collect();

    // A pattern (x over the bits y) wins if the best matching assignment is
    // no worse than the best deviating one under both separator extremes.
    for y in 1..sz {
        for x in [0, y] {
            let (mut mx_hard, mut mx_easy) = (i64::MIN, i64::MIN);
            let (mut mi_hard, mut mi_easy) = (i64::MAX, i64::MAX);
            for (mask, &(hard_cost, easy_cost)) in results.iter().enumerate() {
                if mask & y == x {
                    if hard_cost >= 0 {
                        mx_hard = mx_hard.max(hard_cost);
                    }
                    if easy_cost >= 0 {
                        mx_easy = mx_easy.max(easy_cost);
                    }
                } else {
                    if hard_cost >= 0 {
                        mi_hard = mi_hard.min(hard_cost);
                    }
                    if easy_cost >= 0 {
                        mi_easy = mi_easy.min(easy_cost);
                    }
                }
            }
            if mx_easy <= mi_easy && mx_hard <= mi_hard && mx_hard >= 0 && trim(g, &vars, x, y)? {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

fn expand(g: &Instance, region: &[NodeId]) -> Vec<NodeId> {
    let mut res = region.to_vec();
    for &v in region {
        res = set_ops::unite(&res, &g[v].n_closed);
    }
    res
}

pub(super) fn apply(g: &mut Instance) -> Result<bool> {
    let mut reduced = false;

    let decomposer = EliminationDecomposer::new(0, BAG_HUNT_BUDGET, MAX_VARIABLES);
    if let Some(td) = decomposer.decompose(g) {
        for bag in &td.bags {
            if bag.len() > MAX_VARIABLES {
                continue;
            }
            let mut bag = bag.clone();
            bag.sort_unstable();
            for mask in 0..(1_usize << bag.len()) {
                let region: Vec<NodeId> = bag
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| mask >> j & 1 == 1)
                    .map(|(_, &v)| v)
                    .collect();
                if trim_subset(g, &region)? {
                    reduced = true;
                }
            }
        }
    }

    let nodes = g.nodes.clone();
    for u in nodes {
        if !g.has_node(u) {
            continue;
        }
        let mut ball = vec![u];
        for _ in 0..3 {
            ball = expand(g, &ball);
        }
        if trim_subset(g, &ball)? {
            reduced = true;
        }
    }

    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::assert_consistent;

    #[test]
    fn isolated_vertex_is_forced_in() {
        // Every feasible assignment of the region {1} takes 1.
        let mut g = Instance::from_edges(3, &[(2, 3)]).unwrap();
        assert!(trim_subset(&mut g, &[NodeId(1)]).unwrap());
        assert_eq!(g.ds, vec![NodeId(1)]);
        assert_consistent(&g);
    }

    #[test]
    fn avoidable_endpoint_is_disregarded() {
        // On a path 1-2-3 no optimal extension ever needs the endpoint 1.
        let mut g = Instance::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        assert!(trim_subset(&mut g, &[NodeId(1), NodeId(2), NodeId(3)]).unwrap());
        assert!(g.is_disregarded(NodeId(1)));
        assert_consistent(&g);
    }

    #[test]
    fn rule_solves_a_path_to_the_optimum() {
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (3, 4)]).unwrap();
        assert!(apply(&mut g).unwrap());
        // The path has domination number 2; local trimming alone must not
        // overshoot it.
        assert!(g.ds.len() <= 2);
        assert_consistent(&g);
    }
}
