use crate::error::Result;
use crate::instance::{Instance, NodeId};

/// Contracts one window x - u - v - y with u, v internal of degree two and
/// the whole window free of statuses and forced edges.
///
/// The window always spends exactly one dominator on the inside, so the
/// endpoints can be identified and the middle dropped. When the endpoints
/// coincide the window is a cycle through x and taking x is optimal
/// outright.
fn try_window(g: &mut Instance, u: NodeId) -> Result<bool> {
    if g.deg(u) != 2 || g.forced_deg(u) != 0 {
        return Ok(false);
    }
    let (mut x, mut v) = (g[u].n_open[0], g[u].n_open[1]);
    if g.deg(v) != 2 || g.forced_deg(v) != 0 {
        std::mem::swap(&mut x, &mut v);
    }
    if g.deg(v) != 2 || g.forced_deg(v) != 0 {
        return Ok(false);
    }
    let mut y = g[v].n_open[0];
    if y == u {
        y = g[v].n_open[1];
    }

    for node in [x, u, v, y] {
        if g.is_disregarded(node) || g.is_dominated(node) {
            return Ok(false);
        }
    }

    if x == y {
        g.take(x)?;
        g.remove_node(u)?;
        g.remove_node(v)?;
        return Ok(true);
    }

    g.contract(x, u)?;
    g.contract(x, v)?;
    g.contract(x, y)?;
    Ok(true)
}

/// Degree-2 corridor contraction. Not part of the default library: the
/// contracted window owes one implicit dominator that the decided set does
/// not record, so callers using it must account for the window count
/// themselves.
pub(super) fn apply(g: &mut Instance) -> Result<bool> {
    let mut reduced = false;
    let nodes = g.nodes.clone();
    for u in nodes {
        if g.has_node(u) && try_window(g, u)? {
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
    fn cycle_window_takes_shared_endpoint() {
        // x = y: triangle-like window 1 - 2 - 3 - 1.
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (1, 3), (1, 4)]).unwrap();
        assert!(apply(&mut g).unwrap());
        assert_eq!(g.ds, vec![NodeId(1)]);
        assert!(!g.has_node(NodeId(2)));
        assert!(!g.has_node(NodeId(3)));
        assert_consistent(&g);
    }

    #[test]
    fn corridor_is_contracted() {
        // 1 - 2 - 3 - 4 with hubs on both ends.
        let mut g =
            Instance::from_edges(6, &[(5, 1), (1, 2), (2, 3), (3, 4), (4, 6)]).unwrap();
        assert!(apply(&mut g).unwrap());
        assert!(!g.has_node(NodeId(2)));
        assert!(!g.has_node(NodeId(3)));
        assert_consistent(&g);
    }

    #[test]
    fn statuses_block_contraction() {
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (3, 4)]).unwrap();
        g.mark_dominated(NodeId(2));
        assert!(!apply(&mut g).unwrap());
        assert_eq!(g.node_count(), 4);
    }
}
