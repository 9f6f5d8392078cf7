use crate::error::Result;
use crate::instance::{Instance, NodeId};
use crate::set_ops;

/// If every remaining dominator of w also dominates u, any solution that
/// covers w covers u for free, so u's own domination constraint is void.
fn subsumed(g: &Instance, u: NodeId, w: NodeId) -> bool {
    u != w
        && !g.is_dominated(u)
        && !g.is_dominated(w)
        && set_ops::contains_all(&g[u].dominators, &g[w].dominators)
}

/// Scans all pairs at graph distance at most two; only such pairs can have
/// nested dominator sets.
pub(super) fn apply(g: &mut Instance) -> Result<bool> {
    let mut reduced = false;
    let nodes = g.nodes.clone();
    for u in nodes {
        if g.is_dominated(u) {
            continue;
        }
        let mut subsumed_by_witness = false;
        'search: for &v in &g[u].n_open {
            for &w in &g[v].n_closed {
                if subsumed(g, u, w) {
                    subsumed_by_witness = true;
                    break 'search;
                }
            }
        }
        if subsumed_by_witness {
            g.mark_dominated(u);
            reduced = true;
        }
    }
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::assert_consistent;

    #[test]
    fn nested_dominators_mark_superset_side() {
        // dominators[1] = {1, 2} ⊆ dominators[2] = {1, 2, 3, 4}: whatever
        // covers the leaf covers its support. The twins 3 and 4 have equal
        // dominator sets, so exactly one of them keeps its constraint.
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (2, 4), (3, 4)]).unwrap();
        assert!(apply(&mut g).unwrap());
        assert!(!g.is_dominated(NodeId(1)));
        assert!(g.is_dominated(NodeId(2)));
        assert!(g.is_dominated(NodeId(3)));
        assert!(!g.is_dominated(NodeId(4)));
        assert_consistent(&g);
    }

    #[test]
    fn incomparable_dominators_stay() {
        // On a four-cycle all dominator sets are pairwise incomparable.
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (3, 4), (1, 4)]).unwrap();
        assert!(!apply(&mut g).unwrap());
        assert!(g.nodes.iter().all(|&v| !g.is_dominated(v)));
    }
}
