//! Solver orchestration: presolve to a fixed point, split into connected
//! components, pick a back-end per component, verify the result against the
//! untouched input.

pub mod branching;
pub mod bruteforce;
pub mod vc;
pub mod verifier;

use crate::error::{Error, Result};
use crate::instance::{Instance, NodeId};
use crate::reductions::{self, ReductionRule, RuleCounter};
use crate::treewidth::TreewidthSolver;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverType {
    Default,
    TreewidthDP,
    Branching,
    Bruteforce,
    ReduceToVertexCover,
}

impl FromStr for SolverType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "default" => Ok(SolverType::Default),
            "treewidth" => Ok(SolverType::TreewidthDP),
            "branching" => Ok(SolverType::Branching),
            "bruteforce" => Ok(SolverType::Bruteforce),
            "vertex-cover" => Ok(SolverType::ReduceToVertexCover),
            other => Err(format!("unknown solver type `{other}`")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresolverType {
    Full,
    Cheap,
    None,
}

impl FromStr for PresolverType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "full" => Ok(PresolverType::Full),
            "cheap" => Ok(PresolverType::Cheap),
            "none" => Ok(PresolverType::None),
            other => Err(format!("unknown presolver type `{other}`")),
        }
    }
}

fn presolve_complexity(presolver_type: PresolverType) -> u32 {
    match presolver_type {
        PresolverType::Full => u32::MAX,
        PresolverType::Cheap => 2,
        PresolverType::None => 0,
    }
}

#[derive(Clone, Debug)]
pub struct SolverConfig {
    pub reduction_rules: Vec<ReductionRule>,
    pub solver_type: SolverType,
    pub presolver_type: PresolverType,
    pub decomposition_time_budget: Duration,
    pub decomposer_path: Option<PathBuf>,
    pub random_seed: u64,
    pub good_enough_treewidth: usize,
    pub max_treewidth: usize,
    pub max_memory_in_bytes: u64,
    /// Complexity ceiling for the reductions re-run between branches.
    pub max_branching_reductions_complexity: u32,
    /// Overall wall-clock budget; branching yields best-so-far past it.
    pub time_budget: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            reduction_rules: reductions::default_rules(),
            solver_type: SolverType::Default,
            presolver_type: PresolverType::Full,
            decomposition_time_budget: Duration::from_secs(300),
            decomposer_path: None,
            random_seed: 0,
            good_enough_treewidth: 14,
            max_treewidth: 18,
            max_memory_in_bytes: 1 << 30,
            max_branching_reductions_complexity: 2,
            time_budget: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub ds: Vec<NodeId>,
    /// True when a deadline cut the search short; the solution is feasible
    /// but possibly not optimal.
    pub truncated: bool,
    pub presolve_time: Duration,
    pub solve_time: Duration,
}

pub struct Solver {
    pub cfg: SolverConfig,
    pub rule_counters: Vec<RuleCounter>,
}

impl Solver {
    pub fn new(cfg: SolverConfig) -> Self {
        let rule_counters = reductions::new_counters(&cfg.reduction_rules);
        Solver { cfg, rule_counters }
    }

    /// Solves `g` to optimality (barring an elapsed time budget) and
    /// verifies the solution against the input instance.
    pub fn solve(&mut self, g: Instance) -> Result<Solution> {
        let solve_start = Instant::now();
        let deadline = self.cfg.time_budget.map(|budget| solve_start + budget);
        let initial_instance = g.clone();
        let mut g = g;

        let (n_before, m_before) = (g.node_count(), g.edge_count());
        self.presolve(&mut g)?;
        let presolve_time = solve_start.elapsed();
        info!(
            "presolve reduced n {} -> {}, m {} -> {} ({} forced, {} disregarded) in {:.2?}",
            n_before,
            m_before,
            g.node_count(),
            g.edge_count(),
            g.forced_edge_count(),
            g.disregarded_node_count(),
            presolve_time,
        );

        let mut truncated = false;
        if !g.nodes.is_empty() {
            match self.cfg.solver_type {
                SolverType::Default => {
                    let components = g.split();
                    if components.len() > 1 {
                        info!("split into {} components", components.len());
                        for component in &components {
                            let mut sub = g.component(component);
                            truncated |= self.solve_connected(&mut sub, deadline)?;
                            g.ds.append(&mut sub.ds);
                        }
                    } else {
                        truncated = self.solve_connected(&mut g, deadline)?;
                    }
                }
                SolverType::TreewidthDP => {
                    info!("running treewidth solver");
                    TreewidthSolver::new(&self.cfg).solve(&mut g)?;
                }
                SolverType::Bruteforce => {
                    info!("running bruteforce solver");
                    bruteforce::solve(&mut g)?;
                }
                SolverType::Branching => {
                    info!("running branching solver");
                    let (ds, cut_short) = branching::solve(&g, &self.cfg, deadline)?;
                    g.ds = ds;
                    truncated = cut_short;
                }
                SolverType::ReduceToVertexCover => {
                    if g.forced_edge_count() != g.edge_count() {
                        return Err(Error::invariant(
                            "instance has unconstrained edges, vertex cover reduction inapplicable",
                        ));
                    }
                    info!("running vertex cover solver");
                    vc::solve(&mut g)?;
                }
            }
        }

        g.ds.sort_unstable();
        verifier::verify_solution(&initial_instance, &g.ds)?;
        let solve_time = solve_start.elapsed();
        info!("solution of size {} verified ({:.2?})", g.ds.len(), solve_time);

        Ok(Solution {
            ds: g.ds,
            truncated,
            presolve_time,
            solve_time,
        })
    }

    pub fn presolve(&mut self, g: &mut Instance) -> Result<()> {
        reductions::reduce(
            g,
            &self.cfg.reduction_rules,
            presolve_complexity(self.cfg.presolver_type),
            &mut self.rule_counters,
        )
    }

    /// Default pipeline for one connected component: vertex cover when only
    /// forced edges remain, treewidth DP otherwise, branching as fallback.
    /// Returns whether the search was cut short.
    fn solve_connected(&self, g: &mut Instance, deadline: Option<Instant>) -> Result<bool> {
        if g.forced_edge_count() == g.edge_count() {
            info!("only forced edges left, running vertex cover solver");
            vc::solve(g)?;
            return Ok(false);
        }

        match TreewidthSolver::new(&self.cfg).solve(g) {
            Ok(()) => Ok(false),
            Err(Error::UnsolvableByBackend) => {
                info!("treewidth solver gave up, falling back to branching");
                let (ds, truncated) = branching::solve(g, &self.cfg, deadline)?;
                g.ds = ds;
                Ok(truncated)
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::NodeId;

    fn solve_default(g: &Instance) -> Solution {
        Solver::new(SolverConfig::default()).solve(g.clone()).unwrap()
    }

    #[test]
    fn empty_after_presolve_returns_reduction_ds() {
        // A star is fully decided by the reductions.
        let g = Instance::from_edges(5, &[(1, 2), (1, 3), (1, 4), (1, 5)]).unwrap();
        let solution = solve_default(&g);
        assert_eq!(solution.ds, vec![NodeId::from(1_u32)]);
        assert!(!solution.truncated);
    }

    #[test]
    fn components_are_solved_independently() {
        let mut cfg = SolverConfig::default();
        cfg.presolver_type = PresolverType::None;
        let g = Instance::from_edges(6, &[(1, 2), (2, 3), (1, 3), (4, 5), (5, 6), (4, 6)]).unwrap();
        let solution = Solver::new(cfg).solve(g).unwrap();
        assert_eq!(solution.ds.len(), 2);
    }

    #[test]
    fn solver_type_parsing() {
        assert_eq!("default".parse::<SolverType>().unwrap(), SolverType::Default);
        assert_eq!(
            "vertex-cover".parse::<SolverType>().unwrap(),
            SolverType::ReduceToVertexCover
        );
        assert!("frobnicate".parse::<SolverType>().is_err());
        assert_eq!("cheap".parse::<PresolverType>().unwrap(), PresolverType::Cheap);
    }
}
