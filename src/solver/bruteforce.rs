use crate::error::{Error, Result};
use crate::instance::{EdgeStatus, Instance, NodeId};
use crate::small_indices::SmallIdx;

const MAX_BRUTEFORCE_NODES: usize = 30;

/// Enumerates all subsets of the takeable active vertices and keeps the
/// smallest one that, together with the pre-set statuses, dominates the
/// instance and satisfies every forced edge. Reference solver for tests and
/// tiny residual instances.
pub fn solve(g: &mut Instance) -> Result<()> {
    let nodes: Vec<NodeId> = g
        .nodes
        .iter()
        .copied()
        .filter(|&v| !g.is_disregarded(v))
        .collect();
    if nodes.len() > MAX_BRUTEFORCE_NODES {
        return Err(Error::UnsolvableByBackend);
    }

    let mut base_dominated = vec![false; g.id_limit()];
    for &v in &g.nodes {
        base_dominated[v.idx()] = g.is_dominated(v);
    }

    let mut best: Option<Vec<NodeId>> = None;
    for mask in 0..(1_u64 << nodes.len()) {
        if let Some(best) = &best {
            if (mask.count_ones() as usize) >= best.len() {
                continue;
            }
        }

        let mut dominated = base_dominated.clone();
        let mut taken = vec![false; g.id_limit()];
        let mut ds = Vec::new();
        for (i, &v) in nodes.iter().enumerate() {
            if mask >> i & 1 == 1 {
                ds.push(v);
                taken[v.idx()] = true;
                for &u in &g[v].n_closed {
                    dominated[u.idx()] = true;
                }
            }
        }

        let feasible = g.nodes.iter().all(|&v| {
            dominated[v.idx()]
                && g[v].adj.iter().all(|ep| {
                    ep.status != EdgeStatus::Forced || taken[v.idx()] || taken[ep.to.idx()]
                })
        });
        if feasible {
            best = Some(ds);
        }
    }

    match best {
        Some(mut ds) => {
            g.ds.append(&mut ds);
            Ok(())
        }
        None => Err(Error::invariant("no dominating set exists for this instance")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(n: u32, edges: &[(u32, u32)]) -> usize {
        let mut g = Instance::from_edges(n, edges).unwrap();
        solve(&mut g).unwrap();
        g.ds.len()
    }

    #[test]
    fn known_optima() {
        assert_eq!(opt(5, &[(1, 2), (2, 3), (3, 4), (4, 5)]), 2);
        assert_eq!(opt(5, &[(1, 2), (1, 3), (1, 4), (1, 5)]), 1);
        assert_eq!(
            opt(6, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (1, 6)]),
            2
        );
        assert_eq!(opt(4, &[(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)]), 1);
    }

    #[test]
    fn respects_forced_edges_and_statuses() {
        let mut g = Instance::from_edges(4, &[(1, 2), (1, 3), (2, 3), (3, 4)]).unwrap();
        g.force_edge(NodeId(1), NodeId(2)).unwrap();
        solve(&mut g).unwrap();
        assert_eq!(g.ds.len(), 2);
        assert!(g.ds.contains(&NodeId(1)) || g.ds.contains(&NodeId(2)));
    }

    #[test]
    fn respects_disregarded_vertices() {
        let mut g = Instance::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        g.mark_disregarded(NodeId(2));
        solve(&mut g).unwrap();
        // Without 2 the only cover is both endpoints.
        let mut ds = g.ds.clone();
        ds.sort_unstable();
        assert_eq!(ds, vec![NodeId(1), NodeId(3)]);
    }
}
