//! Back-end for instances where every remaining edge is forced: "at least
//! one endpoint of every edge" is exactly minimum vertex cover, solved here
//! by a small branch-and-bound.

use crate::error::{Error, Result};
use crate::instance::{Instance, NodeId};
use crate::small_indices::{IdxHashSet, SmallIdx};
use log::debug;

pub fn solve(g: &mut Instance) -> Result<()> {
    debug_assert_eq!(g.edge_count(), g.forced_edge_count());

    // Forcing an edge dominates both endpoints, so an undominated vertex
    // here is isolated and can only cover itself.
    let lonely: Vec<NodeId> = g
        .nodes
        .iter()
        .copied()
        .filter(|&v| !g.is_dominated(v))
        .collect();
    for v in lonely {
        if g.deg(v) != 0 {
            return Err(Error::invariant(
                "undominated vertex with forced edges in vertex cover reduction",
            ));
        }
        g.take(v)?;
    }

    // Edges at disregarded vertices can only be covered from the other side.
    let pinned: Vec<NodeId> = g
        .nodes
        .iter()
        .copied()
        .filter(|&u| g.is_disregarded(u) && g.deg(u) > 0)
        .collect();
    for u in pinned {
        if !g.has_node(u) {
            continue;
        }
        let partners = g[u].n_open.clone();
        for w in partners {
            if g.has_node(w) {
                if g.is_disregarded(w) {
                    return Err(Error::invariant(
                        "forced edge between two disregarded vertices",
                    ));
                }
                g.take(w)?;
            }
        }
    }

    // Compact the remaining forced graph and branch on it.
    let active: Vec<NodeId> = g
        .nodes
        .iter()
        .copied()
        .filter(|&v| g.deg(v) > 0)
        .collect();
    if active.is_empty() {
        return Ok(());
    }
    let mut position = vec![usize::MAX; g.id_limit()];
    for (i, &v) in active.iter().enumerate() {
        position[v.idx()] = i;
    }
    let adj: Vec<IdxHashSet<usize>> = active
        .iter()
        .map(|&v| g[v].n_open.iter().map(|&u| position[u.idx()]).collect())
        .collect();

    let mut best = None;
    branch_cover(adj, Vec::new(), &mut best);
    let cover = best.ok_or_else(|| Error::invariant("vertex cover search found nothing"))?;
    debug!("vertex cover of size {} over {} vertices", cover.len(), active.len());
    for i in cover {
        g.take(active[i])?;
    }
    Ok(())
}

fn remove_vertex(adj: &mut [IdxHashSet<usize>], v: usize) {
    let neighbors: Vec<usize> = adj[v].iter().copied().collect();
    for w in neighbors {
        adj[w].remove(&v);
    }
    adj[v].clear();
}

/// Greedy maximal matching; its size lower-bounds any vertex cover.
fn matching_bound(adj: &[IdxHashSet<usize>]) -> usize {
    let mut matched = vec![false; adj.len()];
    let mut size = 0;
    for v in 0..adj.len() {
        if matched[v] {
            continue;
        }
        if let Some(&w) = adj[v].iter().find(|&&w| !matched[w]) {
            matched[v] = true;
            matched[w] = true;
            size += 1;
        }
    }
    size
}

fn branch_cover(
    mut adj: Vec<IdxHashSet<usize>>,
    mut cover: Vec<usize>,
    best: &mut Option<Vec<usize>>,
) {
    // Degree-1 vertices always let the far endpoint cover their edge.
    loop {
        let leaf = (0..adj.len()).find(|&v| adj[v].len() == 1);
        match leaf {
            Some(v) => {
                let w = *adj[v].iter().next().expect("degree checked");
                remove_vertex(&mut adj, w);
                cover.push(w);
            }
            None => break,
        }
    }

    if let Some(best) = best.as_ref() {
        if cover.len() + matching_bound(&adj) >= best.len() {
            return;
        }
    }

    let pivot = (0..adj.len()).max_by_key(|&v| adj[v].len());
    let pivot = match pivot {
        Some(v) if !adj[v].is_empty() => v,
        _ => {
            // No edges left: the cover is complete.
            if best.as_ref().map_or(true, |b| cover.len() < b.len()) {
                *best = Some(cover);
            }
            return;
        }
    };

    // Branch 1: pivot in the cover.
    let mut with_pivot = adj.clone();
    remove_vertex(&mut with_pivot, pivot);
    let mut cover_with = cover.clone();
    cover_with.push(pivot);
    branch_cover(with_pivot, cover_with, best);

    // Branch 2: pivot stays out, all its neighbors go in.
    let neighbors: Vec<usize> = adj[pivot].iter().copied().collect();
    for &w in &neighbors {
        remove_vertex(&mut adj, w);
    }
    cover.extend(neighbors);
    branch_cover(adj, cover, best);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forced_instance(n: u32, edges: &[(u32, u32)]) -> Instance {
        let mut g = Instance::from_edges(n, edges).unwrap();
        for &(a, b) in edges {
            g.force_edge(NodeId(a), NodeId(b)).unwrap();
        }
        g
    }

    #[test]
    fn forced_path_is_covered_minimally() {
        // Vertex cover of P4 has size 2.
        let mut g = forced_instance(4, &[(1, 2), (2, 3), (3, 4)]);
        solve(&mut g).unwrap();
        assert_eq!(g.ds.len(), 2);
    }

    #[test]
    fn forced_star_takes_the_center() {
        let mut g = forced_instance(4, &[(1, 2), (1, 3), (1, 4)]);
        solve(&mut g).unwrap();
        assert_eq!(g.ds, vec![NodeId(1)]);
    }

    #[test]
    fn isolated_undominated_vertices_take_themselves() {
        let mut g = Instance::from_edges(3, &[(1, 2)]).unwrap();
        g.force_edge(NodeId(1), NodeId(2)).unwrap();
        solve(&mut g).unwrap();
        let mut ds = g.ds.clone();
        ds.sort_unstable();
        // 3 covers itself, one endpoint covers the forced edge.
        assert_eq!(ds.len(), 2);
        assert!(ds.contains(&NodeId(3)));
    }

    #[test]
    fn disregarded_endpoint_forces_partner() {
        let mut g = forced_instance(2, &[(1, 2)]);
        g.mark_disregarded(NodeId(1));
        solve(&mut g).unwrap();
        assert_eq!(g.ds, vec![NodeId(2)]);
    }
}
