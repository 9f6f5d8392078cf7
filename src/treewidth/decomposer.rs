use super::tree_decomposition::TreeDecomposition;
use crate::instance::{Instance, NodeId};
use crate::small_indices::{IdxHashSet, SmallIdx};
use log::debug;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Produces tree decompositions for the DP back-end. `None` means no
/// decomposition was found within the budget; the caller falls back to
/// branching.
pub trait Decomposer {
    fn decompose(&self, g: &Instance) -> Option<TreeDecomposition>;
}

/// Built-in heuristic decomposer: greedy min-degree elimination orderings
/// with randomized tie-breaking, retried until the width is good enough or
/// the time budget runs out. Deterministic for a fixed seed.
pub struct EliminationDecomposer {
    pub seed: u64,
    pub time_budget: Duration,
    pub good_enough_width: usize,
}

impl EliminationDecomposer {
    pub fn new(seed: u64, time_budget: Duration, good_enough_width: usize) -> Self {
        EliminationDecomposer {
            seed,
            time_budget,
            good_enough_width,
        }
    }
}

impl Decomposer for EliminationDecomposer {
    fn decompose(&self, g: &Instance) -> Option<TreeDecomposition> {
        let start = Instant::now();
        let mut rng = rand_pcg::Pcg64Mcg::seed_from_u64(self.seed);

        let mut best: Option<TreeDecomposition> = None;
        loop {
            let td = eliminate_min_degree(g, &mut rng);
            let width = td.width;
            if best.as_ref().map_or(true, |b| width < b.width) {
                best = Some(td);
            }
            let best_width = best.as_ref().map_or(usize::MAX, |b| b.width);
            if best_width <= self.good_enough_width || start.elapsed() >= self.time_budget {
                break;
            }
        }

        if let Some(td) = &best {
            debug!(
                "elimination decomposer found width {} with {} bags in {:.2?}",
                td.width,
                td.len(),
                start.elapsed(),
            );
        }
        best
    }
}

/// One elimination pass: repeatedly pick a minimum-degree vertex (random
/// tie-break), emit the bag of it and its current neighbors, and turn the
/// neighborhood into a clique. Bags are attached to the bag of the
/// earliest-eliminated neighbor, which preserves the subtree property.
fn eliminate_min_degree(g: &Instance, rng: &mut rand_pcg::Pcg64Mcg) -> TreeDecomposition {
    let n = g.node_count();
    if n == 0 {
        return TreeDecomposition {
            width: 0,
            bags: vec![Vec::new()],
            adj: vec![Vec::new()],
        };
    }

    // Compact adjacency over the alive vertices.
    let mut position = vec![usize::MAX; g.id_limit()];
    for (i, &v) in g.nodes.iter().enumerate() {
        position[v.idx()] = i;
    }
    let mut adj: Vec<IdxHashSet<usize>> = g
        .nodes
        .iter()
        .map(|&v| g[v].n_open.iter().map(|&u| position[u.idx()]).collect())
        .collect();

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut eliminated_at = vec![usize::MAX; n];
    let mut bag_members: Vec<Vec<usize>> = Vec::with_capacity(n);
    let mut alive: Vec<usize> = (0..n).collect();

    for step in 0..n {
        // Minimum degree among alive vertices; `order` randomizes ties.
        let &v = alive
            .iter()
            .min_by_key(|&&v| (adj[v].len(), order[v]))
            .expect("alive vertices remain");
        eliminated_at[v] = step;

        let neighbors: Vec<usize> = adj[v].iter().copied().collect();
        let mut bag = neighbors.clone();
        bag.push(v);
        bag_members.push(bag);

        for (i, &a) in neighbors.iter().enumerate() {
            adj[a].remove(&v);
            for &b in &neighbors[i + 1..] {
                adj[a].insert(b);
                adj[b].insert(a);
            }
        }
        adj[v].clear();
        alive.retain(|&u| u != v);
    }

    // Bag `step` hangs below the bag of the earliest-eliminated neighbor in
    // it; bags without one (component roots) chain to the next bag so the
    // tree stays connected.
    let mut td = TreeDecomposition {
        width: 0,
        bags: Vec::with_capacity(n),
        adj: vec![Vec::new(); n],
    };
    for (step, bag) in bag_members.iter().enumerate() {
        let mut ids: Vec<NodeId> = bag.iter().map(|&i| g.nodes[i]).collect();
        ids.sort_unstable();
        td.width = td.width.max(ids.len().saturating_sub(1));
        td.bags.push(ids);

        let parent = bag
            .iter()
            .map(|&u| eliminated_at[u])
            .filter(|&at| at > step)
            .min();
        match parent {
            Some(parent) => td.add_edge(step, parent),
            None if step + 1 < n => td.add_edge(step, step + 1),
            None => {}
        }
    }
    td
}
