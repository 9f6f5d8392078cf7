#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::similar_names, clippy::cast_possible_truncation)]
use anyhow::{Context, Result};
use findminds::instance::Instance;
use findminds::report::Report;
use findminds::solver::{PresolverType, Solver, SolverConfig, SolverType};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "findminds", about = "Exact minimum dominating set solver")]
struct Opts {
    /// Input instance in .gr (p ds) or .ads format.
    input_file: PathBuf,

    /// Back-end: default, treewidth, branching, bruteforce or vertex-cover.
    #[structopt(long, default_value = "default")]
    solver: SolverType,

    /// Presolve effort: full, cheap or none.
    #[structopt(long, default_value = "full")]
    presolver: PresolverType,

    /// RNG seed for the built-in decomposer.
    #[structopt(long, default_value = "0")]
    seed: u64,

    /// External treewidth decomposer executable (PACE .td interface).
    #[structopt(long)]
    decomposer: Option<PathBuf>,

    /// Seconds the decomposer may spend hunting for a better width.
    #[structopt(long, default_value = "300")]
    decomposition_time_budget: u64,

    /// Overall wall-clock budget in seconds; past it the branching solver
    /// reports best-so-far.
    #[structopt(long)]
    time_budget: Option<u64>,

    /// Width beyond which the DP back-end refuses an instance.
    #[structopt(long, default_value = "18")]
    max_treewidth: usize,

    /// Width at which the decomposer stops searching for better orders.
    #[structopt(long, default_value = "14")]
    good_enough_treewidth: usize,

    /// Memory ceiling for the DP tables, in bytes.
    #[structopt(long, default_value = "1073741824")]
    max_memory: u64,

    /// Write a JSON run report to this path.
    #[structopt(long)]
    report: Option<PathBuf>,

    /// Presolve only and dump the reduced instance in .ads format.
    #[structopt(long)]
    export_ads: Option<PathBuf>,
}

impl Opts {
    fn config(&self) -> SolverConfig {
        SolverConfig {
            solver_type: self.solver,
            presolver_type: self.presolver,
            decomposition_time_budget: Duration::from_secs(self.decomposition_time_budget),
            decomposer_path: self.decomposer.clone(),
            random_seed: self.seed,
            good_enough_treewidth: self.good_enough_treewidth,
            max_treewidth: self.max_treewidth,
            max_memory_in_bytes: self.max_memory,
            time_budget: self.time_budget.map(Duration::from_secs),
            ..SolverConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("FINDMINDS_LOG", "info"))
        .format_timestamp_millis()
        .init();

    let opts = Opts::from_args();
    let file = BufReader::new(
        File::open(&opts.input_file)
            .with_context(|| format!("opening {}", opts.input_file.display()))?,
    );
    let instance = Instance::load(file)?;
    let mut solver = Solver::new(opts.config());

    if let Some(path) = &opts.export_ads {
        let mut instance = instance;
        solver.presolve(&mut instance)?;
        let mut out = BufWriter::new(File::create(path)?);
        instance.export_ads(&mut out)?;
        info!("reduced instance written to {}", path.display());
        return Ok(());
    }

    let solution = solver.solve(instance)?;
    if solution.truncated {
        info!("time budget elapsed, solution is best-so-far");
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{}", solution.ds.len())?;
    for v in &solution.ds {
        writeln!(out, "{v}")?;
    }
    out.flush()?;

    if let Some(path) = &opts.report {
        let report = Report::new(
            opts.input_file.display().to_string(),
            &solver,
            &solution,
        );
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &report)?;
        info!("report written to {}", path.display());
    }

    Ok(())
}
