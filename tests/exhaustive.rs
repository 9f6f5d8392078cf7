//! Exhaustive agreement check over all small graphs: the bruteforce solver,
//! bruteforce on the reduced instance, and the default pipeline must report
//! the same optimum on every edge subset.

use findminds::instance::Instance;
use findminds::solver::{PresolverType, Solver, SolverConfig, SolverType};

fn opt(g: &Instance, solver_type: SolverType, presolver_type: PresolverType) -> usize {
    let cfg = SolverConfig {
        solver_type,
        presolver_type,
        ..SolverConfig::default()
    };
    Solver::new(cfg)
        .solve(g.clone())
        .expect("solvable instance")
        .ds
        .len()
}

fn check_all_graphs(n: u32) {
    let max_edges = (n * (n - 1) / 2) as usize;
    let mut pairs = Vec::new();
    for i in 1..=n {
        for j in (i + 1)..=n {
            pairs.push((i, j));
        }
    }

    for mask in 0..(1_u64 << max_edges) {
        let edges: Vec<(u32, u32)> = pairs
            .iter()
            .enumerate()
            .filter(|&(e, _)| mask >> e & 1 == 1)
            .map(|(_, &pair)| pair)
            .collect();
        let g = Instance::from_edges(n, &edges).unwrap();

        let reference = opt(&g, SolverType::Bruteforce, PresolverType::None);
        let reduced = opt(&g, SolverType::Bruteforce, PresolverType::Full);
        assert_eq!(
            reduced, reference,
            "reductions changed the optimum on n={n}, mask={mask:#b}"
        );
        let pipeline = opt(&g, SolverType::Default, PresolverType::Full);
        assert_eq!(
            pipeline, reference,
            "default pipeline off optimum on n={n}, mask={mask:#b}"
        );
    }
}

#[test]
fn all_graphs_up_to_five_vertices() {
    for n in 1..=5 {
        check_all_graphs(n);
    }
}

#[test]
#[ignore = "minutes of runtime; run explicitly with --ignored"]
fn all_graphs_on_six_vertices() {
    check_all_graphs(6);
}

#[test]
#[ignore = "hours of runtime; run explicitly with --ignored"]
fn all_graphs_on_seven_vertices() {
    check_all_graphs(7);
}
