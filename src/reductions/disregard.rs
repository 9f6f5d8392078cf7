use crate::error::Result;
use crate::instance::{EdgeStatus, Instance, MembershipStatus, NodeId};
use crate::set_ops;

fn has_forced_edge_to_other(g: &Instance, u: NodeId, excluded: NodeId) -> bool {
    g[u].adj
        .iter()
        .any(|ep| ep.to != excluded && ep.status == EdgeStatus::Forced)
}

/// If `N[v] ⊇ N[u]`, anything u could dominate v dominates too, so an
/// undecided u never needs to enter the dominating set. Forced edges pin u
/// unless they point at v itself.
pub(super) fn apply_disregard(g: &mut Instance) -> Result<bool> {
    let mut candidate = None;
    'scan: for &u in &g.nodes {
        if g[u].membership_status != MembershipStatus::Undecided {
            continue;
        }
        for ep in &g[u].adj {
            let v = ep.to;
            if !g.is_disregarded(v)
                && set_ops::contains_all(&g[v].n_closed, &g[u].n_closed)
                && !has_forced_edge_to_other(g, u, v)
            {
                candidate = Some(u);
                break 'scan;
            }
        }
    }

    match candidate {
        Some(u) => {
            g.mark_disregarded(u);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// A vertex whose whole open neighborhood is already dominated cannot be the
/// unique reason to take itself, as long as some takeable neighbor remains to
/// cover it and at most one forced edge (with a takeable far end) pins it.
pub(super) fn apply_dominated_neighbourhood_marking(g: &mut Instance) -> Result<bool> {
    let nodes = g.nodes.clone();
    let mut reduced = false;
    for u in nodes {
        if g.is_disregarded(u) {
            continue;
        }
        let all_dominated = g[u].n_open.iter().all(|&v| g.is_dominated(v));
        let takeable_neighbor = g[u].n_open.iter().any(|&v| !g.is_disregarded(v));
        if !all_dominated || !takeable_neighbor {
            continue;
        }
        let forced: Vec<NodeId> = g[u]
            .adj
            .iter()
            .filter(|ep| ep.status == EdgeStatus::Forced)
            .map(|ep| ep.to)
            .collect();
        let pinned = match forced.as_slice() {
            [] => false,
            [w] => g.is_disregarded(*w),
            _ => true,
        };
        if !pinned {
            g.mark_disregarded(u);
            reduced = true;
        }
    }
    Ok(reduced)
}

/// Disregarded vertices that are also dominated carry no information anymore;
/// their forced edges are discharged by taking the far endpoints.
pub(super) fn apply_remove_disregarded(g: &mut Instance) -> Result<bool> {
    let to_remove: Vec<NodeId> = g
        .nodes
        .iter()
        .copied()
        .filter(|&u| g.is_disregarded(u) && g.is_dominated(u))
        .collect();
    for &u in &to_remove {
        g.ignore(u)?;
    }
    Ok(!to_remove.is_empty())
}

/// An undominated vertex with a single remaining dominator leaves no choice.
pub(super) fn apply_single_dominator(g: &mut Instance) -> Result<bool> {
    let nodes = g.nodes.clone();
    let mut reduced = false;
    for v in nodes {
        if g.has_node(v) && !g.is_dominated(v) && g[v].dominators.len() == 1 {
            let dominator = g[v].dominators[0];
            g.take(dominator)?;
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
    fn subsumed_vertex_is_disregarded() {
        // N[1] = {1, 2} ⊆ N[2] = {1, 2, 3}: vertex 1 never needs taking.
        let mut g = Instance::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        assert!(apply_disregard(&mut g).unwrap());
        assert!(g.is_disregarded(NodeId(1)));
        assert_consistent(&g);
    }

    #[test]
    fn forced_edge_pins_subsumed_vertex() {
        // N[2] ⊋ N[1], but 1 carries a forced edge to 3 ≠ 2 and must stay
        // undecided; the scan falls through to 3, whose forced edge points at
        // its own subsumer 1.
        let mut g = Instance::from_edges(
            5,
            &[(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (2, 5)],
        )
        .unwrap();
        g.force_edge(NodeId(1), NodeId(3)).unwrap();
        assert!(apply_disregard(&mut g).unwrap());
        assert!(!g.is_disregarded(NodeId(1)));
        assert!(g.is_disregarded(NodeId(3)));
        assert_consistent(&g);
    }

    #[test]
    fn dominated_neighbourhood_marks_center() {
        let mut g = Instance::from_edges(4, &[(1, 2), (1, 3), (1, 4), (2, 3)]).unwrap();
        g.mark_dominated(NodeId(2));
        g.mark_dominated(NodeId(3));
        g.mark_dominated(NodeId(4));
        assert!(apply_dominated_neighbourhood_marking(&mut g).unwrap());
        assert!(g.is_disregarded(NodeId(1)));
        assert_consistent(&g);
    }

    #[test]
    fn remove_disregarded_takes_forced_partner() {
        let mut g = Instance::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        g.force_edge(NodeId(1), NodeId(2)).unwrap();
        g.mark_disregarded(NodeId(1));
        assert!(apply_remove_disregarded(&mut g).unwrap());
        assert!(!g.has_node(NodeId(1)));
        assert_eq!(g.ds, vec![NodeId(2)]);
        assert_consistent(&g);
    }

    #[test]
    fn single_dominator_gets_taken() {
        let mut g = Instance::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        g.mark_disregarded(NodeId(1));
        g.mark_disregarded(NodeId(3));
        // 1 is undominated and only 2 can still cover it.
        assert!(apply_single_dominator(&mut g).unwrap());
        assert_eq!(g.ds, vec![NodeId(2)]);
        assert_consistent(&g);
    }

    #[test]
    fn isolated_undominated_vertex_takes_itself() {
        let mut g = Instance::from_edges(1, &[]).unwrap();
        assert!(apply_single_dominator(&mut g).unwrap());
        assert_eq!(g.ds, vec![NodeId(1)]);
        assert!(g.nodes.is_empty());
    }
}
