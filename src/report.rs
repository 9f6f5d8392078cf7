use crate::reductions::RuleCounter;
use crate::solver::{PresolverType, Solution, Solver, SolverConfig, SolverType};
use serde::{Serialize, Serializer};
use std::time::Duration;

fn serialize_duration_as_seconds<S>(duration: &Duration, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.serialize_f64(duration.as_secs_f64())
}

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStats {
    #[serde(serialize_with = "serialize_duration_as_seconds")]
    pub total: Duration,

    #[serde(serialize_with = "serialize_duration_as_seconds")]
    pub presolve: Duration,
}

/// The scalar knobs of the run, echoed into the report.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub solver_type: SolverType,
    pub presolver_type: PresolverType,
    pub random_seed: u64,
    pub good_enough_treewidth: usize,
    pub max_treewidth: usize,
    pub max_memory_in_bytes: u64,
}

impl From<&SolverConfig> for Settings {
    fn from(cfg: &SolverConfig) -> Self {
        Settings {
            solver_type: cfg.solver_type,
            presolver_type: cfg.presolver_type,
            random_seed: cfg.random_seed,
            good_enough_treewidth: cfg.good_enough_treewidth,
            max_treewidth: cfg.max_treewidth,
            max_memory_in_bytes: cfg.max_memory_in_bytes,
        }
    }
}

/// JSON summary of one solver run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub file_name: String,
    pub opt: usize,
    pub truncated: bool,
    pub settings: Settings,
    pub runtimes: RuntimeStats,
    pub reductions: Vec<RuleCounter>,
}

impl Report {
    pub fn new(file_name: String, solver: &Solver, solution: &Solution) -> Self {
        Report {
            file_name,
            opt: solution.ds.len(),
            truncated: solution.truncated,
            settings: Settings::from(&solver.cfg),
            runtimes: RuntimeStats {
                total: solution.solve_time,
                presolve: solution.presolve_time,
            },
            reductions: solver.rule_counters.clone(),
        }
    }
}
