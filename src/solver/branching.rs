//! Bound-pruned recursive branching, the fallback when the treewidth DP is
//! out of budget. Clones the instance per branch and re-runs the cheap
//! reductions between branches.

use super::SolverConfig;
use crate::bounds;
use crate::error::{Error, Result};
use crate::instance::{EdgeStatus, Instance, NodeId};
use crate::reductions::{self, ReductionRule, RuleCounter};
use log::{debug, info};
use std::time::{Duration, Instant};

const ITER_LOG_GAP: Duration = Duration::from_secs(60);

struct State<'a> {
    rules: &'a [ReductionRule],
    max_complexity: u32,
    deadline: Option<Instant>,
    counters: Vec<RuleCounter>,
    best: Option<Vec<NodeId>>,
    truncated: bool,
    iterations: u64,
    last_iter_log: Instant,
}

/// Returns a minimum dominating set of the active subgraph (appended to the
/// decided set), or best-so-far with the truncation flag once the deadline
/// passes. Errs with `TimeBudgetExceeded` when not even one solution was
/// completed in time.
pub fn solve(
    g: &Instance,
    cfg: &SolverConfig,
    deadline: Option<Instant>,
) -> Result<(Vec<NodeId>, bool)> {
    let mut state = State {
        rules: &cfg.reduction_rules,
        max_complexity: cfg.max_branching_reductions_complexity,
        deadline,
        counters: reductions::new_counters(&cfg.reduction_rules),
        best: None,
        truncated: false,
        iterations: 0,
        last_iter_log: Instant::now(),
    };

    // Seed the bound with the greedy solution so pruning bites immediately.
    if g.is_solvable() {
        state.best = Some(bounds::greedy_dominating_set(g));
    }

    solve_recursive(g.clone(), &mut state)?;
    debug!("branching finished after {} iterations", state.iterations);

    match state.best {
        Some(best) => Ok((best, state.truncated)),
        None => Err(Error::TimeBudgetExceeded),
    }
}

fn solve_recursive(mut g: Instance, state: &mut State) -> Result<()> {
    state.iterations += 1;
    if let Some(deadline) = state.deadline {
        if Instant::now() >= deadline {
            state.truncated = true;
            return Ok(());
        }
    }
    if state.last_iter_log.elapsed() >= ITER_LOG_GAP {
        info!("branching at {} iterations", state.iterations);
        state.last_iter_log = Instant::now();
    }

    reductions::reduce(&mut g, state.rules, state.max_complexity, &mut state.counters)?;
    if !g.is_solvable() {
        return Ok(());
    }
    if let Some(best) = &state.best {
        if g.ds.len() + bounds::lower_bound(&g) >= best.len() {
            return Ok(());
        }
    }

    match select_node(&g) {
        None => {
            // Everything is dominated and no forced edge is open.
            info!("branching found a solution of size {}", g.ds.len());
            state.best = Some(g.ds);
            Ok(())
        }
        Some(v) => branch(&g, v, state),
    }
}

/// Undominated closed-neighborhood degree, the branching priority.
fn undominated_degree(g: &Instance, v: NodeId) -> usize {
    g[v].n_closed.iter().filter(|&&u| !g.is_dominated(u)).count()
}

/// Picks the vertex with the most open forced edges, falling back to the
/// undominated vertex whose closed neighborhood needs the most coverage.
fn select_node(g: &Instance) -> Option<NodeId> {
    let forced = g
        .nodes
        .iter()
        .copied()
        .max_by_key(|&v| g.forced_deg(v))
        .filter(|&v| g.forced_deg(v) > 0);
    if forced.is_some() {
        return forced;
    }

    g.nodes
        .iter()
        .copied()
        .filter(|&v| !g.is_dominated(v))
        .max_by_key(|&v| undominated_degree(g, v))
}

fn branch(g: &Instance, v: NodeId, state: &mut State) -> Result<()> {
    let forced_partners: Vec<NodeId> = g[v]
        .adj
        .iter()
        .filter(|ep| ep.status == EdgeStatus::Forced)
        .map(|ep| ep.to)
        .collect();

    if forced_partners.is_empty() {
        // v is undominated, so one of its dominators is in any solution.
        // The leaf case skips v itself: its neighbor dominates strictly more.
        for u in g[v].dominators.clone() {
            if u == v && g.deg(v) == 1 {
                continue;
            }
            let mut taken = g.clone();
            taken.take(u)?;
            solve_recursive(taken, state)?;
        }
        return Ok(());
    }

    // Either v is taken, or all its forced partners are.
    let partners_takeable = forced_partners.iter().all(|&u| !g.is_disregarded(u));
    if !g.is_disregarded(v) && (g.deg(v) != 1 || !partners_takeable) {
        let mut taken = g.clone();
        taken.take(v)?;
        solve_recursive(taken, state)?;
    }
    if partners_takeable {
        let mut taken = g.clone();
        for u in forced_partners {
            if taken.has_node(u) && !taken.is_taken(u) {
                taken.take(u)?;
            }
        }
        solve_recursive(taken, state)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch_opt(g: &Instance) -> usize {
        let cfg = SolverConfig::default();
        let (ds, truncated) = solve(g, &cfg, None).unwrap();
        assert!(!truncated);
        ds.len()
    }

    #[test]
    fn solves_small_graphs_optimally() {
        let p5 = Instance::from_edges(5, &[(1, 2), (2, 3), (3, 4), (4, 5)]).unwrap();
        assert_eq!(branch_opt(&p5), 2);

        let c6 = Instance::from_edges(6, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (1, 6)]).unwrap();
        assert_eq!(branch_opt(&c6), 2);

        let k4 = Instance::from_edges(4, &[(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)]).unwrap();
        assert_eq!(branch_opt(&k4), 1);
    }

    #[test]
    fn honors_forced_edges() {
        let mut g = Instance::from_edges(4, &[(1, 2), (1, 3), (2, 3), (3, 4)]).unwrap();
        g.force_edge(NodeId(1), NodeId(2)).unwrap();
        assert_eq!(branch_opt(&g), 2);
    }

    #[test]
    fn elapsed_deadline_yields_best_so_far() {
        let g = Instance::from_edges(5, &[(1, 2), (2, 3), (3, 4), (4, 5)]).unwrap();
        let cfg = SolverConfig::default();
        let deadline = Some(Instant::now() - Duration::from_secs(1));
        let (ds, truncated) = solve(&g, &cfg, deadline).unwrap();
        assert!(truncated);
        // The greedy seed is still a valid dominating set.
        crate::solver::verifier::verify_solution(&g, &sorted(ds)).unwrap();
    }

    fn sorted(mut ds: Vec<NodeId>) -> Vec<NodeId> {
        ds.sort_unstable();
        ds
    }
}
