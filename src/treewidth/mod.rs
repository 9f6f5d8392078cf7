//! Treewidth back-end: 3-coloring dynamic programming over a nice tree
//! decomposition, with forced-edge support and solution recovery.

pub mod decomposer;
pub mod exec;
pub mod nice;
pub mod rooted;
pub mod ternary;
pub mod tree_decomposition;

use crate::error::{Error, Result};
use crate::instance::{EdgeStatus, Instance, NodeId};
use crate::solver::SolverConfig;
use decomposer::{Decomposer, EliminationDecomposer};
use exec::ExecDecomposer;
use log::{debug, info};
use nice::{NiceNodeKind, NiceTreeDecomposition};
use ternary::{at, cut, insert, set, Color, TernaryFun, MAX_EXPONENT, POW3};

type Cost = u32;
const INF: Cost = 1_000_000_000;
const UNSET: Cost = Cost::MAX;

/// Solves an instance exactly by dynamic programming over a nice tree
/// decomposition. Reports `UnsolvableByBackend` when no decomposition under
/// the width ceiling is found or the DP table would exceed the memory
/// budget.
pub struct TreewidthSolver<'a> {
    cfg: &'a SolverConfig,
    decomposer: Box<dyn Decomposer + 'a>,
}

impl<'a> TreewidthSolver<'a> {
    pub fn new(cfg: &'a SolverConfig) -> Self {
        let decomposer: Box<dyn Decomposer> = match &cfg.decomposer_path {
            Some(path) => Box::new(ExecDecomposer {
                path: path.clone(),
                time_budget: cfg.decomposition_time_budget,
            }),
            None => Box::new(EliminationDecomposer::new(
                cfg.random_seed,
                cfg.decomposition_time_budget,
                cfg.good_enough_treewidth,
            )),
        };
        TreewidthSolver { cfg, decomposer }
    }

    /// Extends `g.ds` with an optimum dominating set of the active subgraph.
    pub fn solve(&self, g: &mut Instance) -> Result<()> {
        let td = self
            .decomposer
            .decompose(g)
            .ok_or(Error::UnsolvableByBackend)?;
        if td.width > self.cfg.max_treewidth {
            info!("decomposition width {} over the ceiling", td.width);
            return Err(Error::UnsolvableByBackend);
        }

        let nice = NiceTreeDecomposition::nicify(g, &td);
        if nice.max_bag_size() > MAX_EXPONENT {
            return Err(Error::UnsolvableByBackend);
        }
        let memory = table_memory(&nice);
        if memory > self.cfg.max_memory_in_bytes {
            info!("DP table would take {memory} bytes, over the budget");
            return Err(Error::UnsolvableByBackend);
        }
        debug!(
            "running DP over {} nice nodes, width {}, {} bytes",
            nice.len(),
            td.width,
            memory
        );

        let mut dp = Dp {
            g: &*g,
            td: &nice,
            c: vec![Vec::new(); nice.len()],
        };
        let best = dp.cost(nice.root, 0);
        if best >= INF {
            return Err(Error::invariant(
                "treewidth DP found no feasible coloring for a live instance",
            ));
        }

        let mut ds = Vec::new();
        dp.recover(nice.root, 0, &mut ds)?;
        debug_assert_eq!(ds.len(), best as usize);
        g.ds.extend(ds);
        Ok(())
    }
}

/// Memory the lazily allocated DP tables can reach, in bytes.
fn table_memory(td: &NiceTreeDecomposition) -> u64 {
    (0..td.len())
        .map(|t| {
            POW3[td.node(t).bag.len()] as u64 * std::mem::size_of::<Cost>() as u64
                + std::mem::size_of::<Vec<Cost>>() as u64
        })
        .sum()
}

struct Dp<'a> {
    g: &'a Instance,
    td: &'a NiceTreeDecomposition,
    c: Vec<Vec<Cost>>,
}

fn bag_pos(bag: &[NodeId], v: NodeId) -> usize {
    bag.binary_search(&v).expect("vertex not in bag")
}

/// Price of taking a vertex at its Forget node. Extra vertices only encode
/// constraints and can never enter the solution themselves.
fn vertex_cost(g: &Instance, v: NodeId) -> Cost {
    if g[v].is_extra {
        INF
    } else {
        1
    }
}

impl Dp<'_> {
    /// Minimum number of taken vertices in the subtree of `t` consistent
    /// with the bag coloring `f`. Memoized; values are clamped at INF.
    fn cost(&mut self, t: usize, f: TernaryFun) -> Cost {
        let (g, td) = (self.g, self.td);
        let node = td.node(t);
        debug_assert!(f < POW3[node.bag.len()]);
        if !self.c[t].is_empty() && self.c[t][f] != UNSET {
            return self.c[t][f];
        }
        if self.c[t].is_empty() {
            self.c[t] = vec![UNSET; POW3[node.bag.len()]];
        }

        let result = match node.kind {
            NiceNodeKind::Leaf => 0,
            NiceNodeKind::IntroduceVertex { v, child } => {
                let pos = bag_pos(&node.bag, v);
                // A vertex pre-dominated by the reductions may enter WHITE;
                // anything else WHITE can no longer be covered below.
                if at(f, pos) == Color::White && !g.is_dominated(v) {
                    INF
                } else {
                    self.cost(child, cut(f, pos))
                }
            }
            NiceNodeKind::IntroduceEdge { u, v, child } => {
                let pos_u = bag_pos(&node.bag, u);
                let pos_v = bag_pos(&node.bag, v);
                let (f_u, f_v) = (at(f, pos_u), at(f, pos_v));
                let forced =
                    g.edge_status(u, v).expect("introduced edge exists") == EdgeStatus::Forced;

                match (f_u, f_v) {
                    (Color::Black, Color::White) => {
                        self.cost(child, set(f, pos_v, Color::Gray))
                    }
                    (Color::White, Color::Black) => {
                        self.cost(child, set(f, pos_u, Color::Gray))
                    }
                    (Color::Black, _) | (_, Color::Black) => self.cost(child, f),
                    // The forced edge needs a taken endpoint.
                    _ if forced => INF,
                    _ => self.cost(child, f),
                }
            }
            NiceNodeKind::Forget { v, child } => {
                let pos = node
                    .bag
                    .binary_search(&v)
                    .expect_err("forgotten vertex still in bag");
                let black = vertex_cost(g, v)
                    .saturating_add(self.cost(child, insert(f, pos, Color::Black)));
                let white = self.cost(child, insert(f, pos, Color::White));
                black.min(white)
            }
            NiceNodeKind::Join { left, right } => {
                let whites: Vec<usize> = (0..node.bag.len())
                    .filter(|&i| at(f, i) == Color::White)
                    .collect();

                // Each WHITE position is owned by exactly one child; the
                // other sees it GRAY.
                let mut best = INF;
                for mask in 0..(1_u64 << whites.len()) {
                    let (mut f_1, mut f_2) = (f, f);
                    for (bit, &pos) in whites.iter().enumerate() {
                        if mask >> bit & 1 == 1 {
                            f_1 = set(f_1, pos, Color::Gray);
                        } else {
                            f_2 = set(f_2, pos, Color::Gray);
                        }
                    }
                    best = best.min(self.cost(left, f_1) + self.cost(right, f_2));
                }
                best
            }
        };

        let result = result.min(INF);
        self.c[t][f] = result;
        result
    }

    /// Top-down replay of the winning transitions; at every Forget the BLACK
    /// branch wins ties.
    fn recover(&mut self, t: usize, f: TernaryFun, ds: &mut Vec<NodeId>) -> Result<()> {
        let (g, td) = (self.g, self.td);
        let node = td.node(t);
        debug_assert!(!self.c[t].is_empty() && self.c[t][f] != UNSET);

        match node.kind {
            NiceNodeKind::Leaf => Ok(()),
            NiceNodeKind::IntroduceVertex { v, child } => {
                let pos = bag_pos(&node.bag, v);
                self.recover(child, cut(f, pos), ds)
            }
            NiceNodeKind::IntroduceEdge { u, v, child } => {
                let pos_u = bag_pos(&node.bag, u);
                let pos_v = bag_pos(&node.bag, v);
                match (at(f, pos_u), at(f, pos_v)) {
                    (Color::Black, Color::White) => {
                        self.recover(child, set(f, pos_v, Color::Gray), ds)
                    }
                    (Color::White, Color::Black) => {
                        self.recover(child, set(f, pos_u, Color::Gray), ds)
                    }
                    _ => self.recover(child, f, ds),
                }
            }
            NiceNodeKind::Forget { v, child } => {
                let pos = node
                    .bag
                    .binary_search(&v)
                    .expect_err("forgotten vertex still in bag");
                let black_state = insert(f, pos, Color::Black);
                let black = vertex_cost(g, v)
                    .saturating_add(self.cost(child, black_state))
                    .min(INF);
                if self.c[t][f] == black {
                    ds.push(v);
                    self.recover(child, black_state, ds)
                } else {
                    self.recover(child, insert(f, pos, Color::White), ds)
                }
            }
            NiceNodeKind::Join { left, right } => {
                let whites: Vec<usize> = (0..node.bag.len())
                    .filter(|&i| at(f, i) == Color::White)
                    .collect();

                for mask in 0..(1_u64 << whites.len()) {
                    let (mut f_1, mut f_2) = (f, f);
                    for (bit, &pos) in whites.iter().enumerate() {
                        if mask >> bit & 1 == 1 {
                            f_1 = set(f_1, pos, Color::Gray);
                        } else {
                            f_2 = set(f_2, pos, Color::Gray);
                        }
                    }
                    if (self.cost(left, f_1) + self.cost(right, f_2)).min(INF) == self.c[t][f] {
                        self.recover(left, f_1, ds)?;
                        return self.recover(right, f_2, ds);
                    }
                }
                Err(Error::invariant("no join partition realizes the optimum"))
            }
        }
    }
}
