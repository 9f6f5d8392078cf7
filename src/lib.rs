#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! An exact solver for the minimum dominating set problem on PACE-style
//! instances, built around a reduce-then-decompose pipeline: graph-rewriting
//! reduction rules shrink the annotated instance to a fixed point, and a
//! 3-coloring dynamic program over a nice tree decomposition finishes the
//! rest, with bound-pruned branching as the fallback.

pub mod bounds;
pub mod error;
pub mod instance;
pub mod reductions;
pub mod report;
pub mod set_ops;
pub mod small_indices;
pub mod solver;
pub mod treewidth;

pub use error::{Error, Result};
pub use instance::Instance;
pub use solver::{Solution, Solver, SolverConfig};
