//! The four "simple" neighborhood rules of Alber, Fellows and Niedermeier
//! (DOI 10.1007/s10479-006-0045-4), extended to respect forced edges and
//! disregarded vertices. All of them only ever delete already-dominated
//! vertices or edges between dominated vertices.

use crate::error::Result;
use crate::instance::{EdgeStatus, Instance, NodeId};
use crate::set_ops;

/// Removes every unconstrained edge between two dominated endpoints. Such an
/// edge can still put an endpoint into the dominating set, but never needs
/// to: each endpoint keeps its own closed neighborhood.
pub(super) fn apply_rule_1(g: &mut Instance) -> Result<bool> {
    let mut to_remove = Vec::new();
    for &v in &g.nodes {
        for ep in &g[v].adj {
            if v > ep.to || ep.status == EdgeStatus::Forced {
                continue;
            }
            if g.is_dominated(v) && g.is_dominated(ep.to) {
                to_remove.push((v, ep.to));
            }
        }
    }
    for &(v, w) in &to_remove {
        g.remove_edge(v, w)?;
    }
    Ok(!to_remove.is_empty())
}

/// Dominated leaf removal. A forced leaf edge is discharged by taking the
/// other endpoint; between two dominated forced leaves the smaller id acts.
pub(super) fn apply_rule_2(g: &mut Instance) -> Result<bool> {
    let nodes = g.nodes.clone();
    let mut reduced = false;
    for v in nodes {
        if !g.has_node(v) || !g.is_dominated(v) || g.deg(v) > 1 {
            continue;
        }
        if g.deg(v) == 0 {
            g.remove_node(v)?;
            reduced = true;
            continue;
        }
        let ep = g[v].adj[0];
        if ep.status == EdgeStatus::Forced {
            if g.is_disregarded(ep.to) {
                continue;
            }
            // The forced edge needs an endpoint, and the other end can only
            // dominate more.
            if g.deg(ep.to) == 1 && g.is_dominated(ep.to) && v > ep.to {
                continue;
            }
            g.take(ep.to)?;
        }
        g.remove_node(v)?;
        reduced = true;
    }
    Ok(reduced)
}

fn non_disregarded_common_neighbor(g: &Instance, u1: NodeId, u2: NodeId, v: NodeId) -> bool {
    set_ops::intersect(&g[u1].n_open, &g[u2].n_open)
        .into_iter()
        .any(|w| w != v && !g.is_disregarded(w))
}

/// Dominated degree-2 vertex between two undominated neighbors that are
/// adjacent or share another takeable common neighbor: the vertex itself can
/// never be the better dominator choice.
pub(super) fn apply_rule_3(g: &mut Instance) -> Result<bool> {
    let nodes = g.nodes.clone();
    for v in nodes {
        if !g.has_node(v) || !g.is_dominated(v) || g.deg(v) != 2 {
            continue;
        }
        let e1 = g[v].adj[0];
        let e2 = g[v].adj[1];
        // With both edges forced it might genuinely be optimal to take v.
        if e1.status == EdgeStatus::Forced && e2.status == EdgeStatus::Forced {
            continue;
        }
        let should_remove = !g.is_dominated(e1.to)
            && !g.is_dominated(e2.to)
            && (g.has_edge(e1.to, e2.to)
                || non_disregarded_common_neighbor(g, e1.to, e2.to, v));
        if !should_remove {
            continue;
        }
        if e1.status == EdgeStatus::Forced {
            if g.is_disregarded(e1.to) {
                continue;
            }
            g.take(e1.to)?;
        }
        if e2.status == EdgeStatus::Forced {
            if g.is_disregarded(e2.to) {
                continue;
            }
            g.take(e2.to)?;
        }
        g.remove_node(v)?;
        return Ok(true);
    }
    Ok(false)
}

/// Dominated degree-3 vertex whose three undominated neighbors hang on a
/// midpoint adjacent to the other two: the midpoint dominates everything v
/// could. At most one incident edge may be forced, and it must reach the
/// midpoint (which is then taken).
pub(super) fn apply_rule_4(g: &mut Instance) -> Result<bool> {
    let nodes = g.nodes.clone();
    for v in nodes {
        if !g.has_node(v) || !g.is_dominated(v) || g.deg(v) != 3 {
            continue;
        }
        let eps = [g[v].adj[0], g[v].adj[1], g[v].adj[2]];
        let n_forced = eps
            .iter()
            .filter(|ep| ep.status == EdgeStatus::Forced)
            .count();
        if n_forced > 1 || eps.iter().any(|ep| g.is_dominated(ep.to)) {
            continue;
        }

        for mid in 0..3 {
            let (m, a, b) = (eps[mid], eps[(mid + 1) % 3], eps[(mid + 2) % 3]);
            if !g.has_edge(m.to, a.to) || !g.has_edge(m.to, b.to) {
                continue;
            }
            // A forced edge not ending in the midpoint pins v.
            if n_forced == 1 && m.status != EdgeStatus::Forced {
                break;
            }
            if m.status == EdgeStatus::Forced {
                if g.is_disregarded(m.to) {
                    break;
                }
                g.take(m.to)?;
            }
            g.remove_node(v)?;
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::assert_consistent;

    #[test]
    fn rule_1_strips_dominated_edges() {
        let mut g = Instance::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        g.mark_dominated(NodeId(1));
        g.mark_dominated(NodeId(2));
        assert!(apply_rule_1(&mut g).unwrap());
        assert!(!g.has_edge(NodeId(1), NodeId(2)));
        assert!(g.has_edge(NodeId(2), NodeId(3)));
        assert_consistent(&g);
    }

    #[test]
    fn rule_2_removes_dominated_leaf() {
        let mut g = Instance::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        g.mark_dominated(NodeId(1));
        assert!(apply_rule_2(&mut g).unwrap());
        assert!(!g.has_node(NodeId(1)));
        assert_eq!(g.ds, Vec::new());
        assert_consistent(&g);
    }

    #[test]
    fn rule_2_forced_leaf_takes_partner() {
        let mut g = Instance::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        g.force_edge(NodeId(1), NodeId(2)).unwrap();
        assert!(apply_rule_2(&mut g).unwrap());
        assert!(!g.has_node(NodeId(1)));
        assert_eq!(g.ds, vec![NodeId(2)]);
        assert_consistent(&g);
    }

    #[test]
    fn rule_2_forced_leaf_pair_tie_breaks_by_id() {
        let mut g = Instance::from_edges(2, &[(1, 2)]).unwrap();
        g.force_edge(NodeId(1), NodeId(2)).unwrap();
        assert!(apply_rule_2(&mut g).unwrap());
        // The smaller endpoint acted and took 2; both vertices are gone.
        assert_eq!(g.ds, vec![NodeId(2)]);
        assert!(g.nodes.is_empty());
        assert_consistent(&g);
    }

    #[test]
    fn rule_3_removes_dominated_bridge() {
        // 2 is dominated, its neighbors 1 and 3 are adjacent.
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (1, 3), (3, 4)]).unwrap();
        g.mark_dominated(NodeId(2));
        assert!(apply_rule_3(&mut g).unwrap());
        assert!(!g.has_node(NodeId(2)));
        assert_consistent(&g);
    }

    #[test]
    fn rule_3_needs_takeable_common_neighbor() {
        // 1 and 3 share only the common neighbor 4 besides v = 2.
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (1, 4), (3, 4)]).unwrap();
        g.mark_dominated(NodeId(2));
        assert!(apply_rule_3(&mut g).unwrap());
        assert!(!g.has_node(NodeId(2)));

        let mut h = Instance::from_edges(4, &[(1, 2), (2, 3), (1, 4), (3, 4)]).unwrap();
        h.mark_dominated(NodeId(2));
        h.mark_disregarded(NodeId(4));
        assert!(!apply_rule_3(&mut h).unwrap());
        assert!(h.has_node(NodeId(2)));
    }

    #[test]
    fn rule_4_removes_around_midpoint() {
        // 4 is dominated with neighbors 1, 2, 3; midpoint 2 sees 1 and 3.
        let mut g =
            Instance::from_edges(5, &[(1, 4), (2, 4), (3, 4), (1, 2), (2, 3), (2, 5)]).unwrap();
        g.mark_dominated(NodeId(4));
        assert!(apply_rule_4(&mut g).unwrap());
        assert!(!g.has_node(NodeId(4)));
        assert!(g.ds.is_empty());
        assert_consistent(&g);
    }
}
