//! Alber, Fellows and Niedermeier's main neighborhood rules
//! (DOI 10.1007/s10479-006-0045-4, p. 4), extended to forced edges and
//! disregarded vertices.
//!
//! Both rules carve the open neighborhood of one (rule 1) or two (rule 2)
//! vertices into *exit*, *guard* and *prison* sets: exits can reach the rest
//! of the graph, guards see an exit, prisoners see neither. A prisoner that
//! still needs domination can only be covered from inside the ball, which
//! pins the center vertices.

use crate::error::Result;
use crate::instance::{EdgeStatus, Instance, NodeId};
use crate::set_ops;
use crate::small_indices::SmallIdx;
use std::collections::VecDeque;

/// Is `u` an exit with respect to the ball around `v`? A forced edge to
/// anything but `v` also counts: its far endpoint may be satisfied from
/// outside, which is as good as an escape route.
fn is_exit_1(g: &Instance, u: NodeId, v: NodeId) -> bool {
    g[u].adj.iter().any(|ep| {
        ep.to != v && (!g.has_edge(v, ep.to) || ep.status == EdgeStatus::Forced)
    })
}

fn exit_neighbourhood(g: &Instance, u: NodeId) -> Vec<NodeId> {
    g[u].n_open
        .iter()
        .copied()
        .filter(|&v| is_exit_1(g, v, u))
        .collect()
}

/// Closed-neighborhood prison/guard/exit partition for a single center u:
/// take u whenever some prisoner is still undominated.
pub(super) fn apply_rule_1(g: &mut Instance) -> Result<bool> {
    let nodes = g.nodes.clone();
    let mut reduced = false;

    for u in nodes {
        if !g.has_node(u) || g.is_disregarded(u) {
            continue;
        }

        let n_exit = exit_neighbourhood(g, u);
        let mut n_guard = Vec::new();
        for v in set_ops::difference(&g[u].n_open, &n_exit) {
            if !set_ops::intersect(&g[v].n_open, &n_exit).is_empty() {
                n_guard.push(v);
            }
        }
        let n_prison =
            set_ops::difference(&set_ops::difference(&g[u].n_open, &n_exit), &n_guard);

        if !n_prison.is_empty() && n_prison.iter().any(|&v| !g.is_dominated(v)) {
            g.take(u)?;
            g.remove_nodes(&n_prison)?;
            g.remove_nodes(&n_guard)?;
            reduced = true;
        }
    }

    Ok(reduced)
}

/// Is `u` an exit with respect to the joint ball around `v` and `w`?
fn is_exit_2(g: &Instance, u: NodeId, v: NodeId, w: NodeId) -> bool {
    g[u].adj.iter().any(|ep| {
        ep.to != v
            && ep.to != w
            && ((!g.has_edge(ep.to, v) && !g.has_edge(ep.to, w))
                || ep.status == EdgeStatus::Forced)
    })
}

fn forced_partners(g: &Instance, v: NodeId) -> usize {
    g[v].adj
        .iter()
        .filter(|ep| ep.status == EdgeStatus::Forced)
        .count()
}

struct Ball {
    n_v: Vec<NodeId>,
    n_w: Vec<NodeId>,
    exit: Vec<NodeId>,
    guard: Vec<NodeId>,
    prison: Vec<NodeId>,
}

fn joint_ball(g: &Instance, v: NodeId, w: NodeId) -> Ball {
    let n_v = g[v].n_open.clone();
    let n_w = g[w].n_open.clone();
    let mut pair = vec![v, w];
    pair.sort_unstable();
    let n_vw = set_ops::difference(&set_ops::unite(&n_v, &n_w), &pair);

    let exit: Vec<NodeId> = n_vw
        .iter()
        .copied()
        .filter(|&u| is_exit_2(g, u, v, w))
        .collect();
    let mut guard = Vec::new();
    for u in set_ops::difference(&n_vw, &exit) {
        if !set_ops::intersect(&g[u].n_open, &exit).is_empty() {
            guard.push(u);
        }
    }
    let prison = set_ops::difference(&set_ops::difference(&n_vw, &exit), &guard);

    Ball {
        n_v,
        n_w,
        exit,
        guard,
        prison,
    }
}

/// Tries to apply main rule 2 to the pair (v, w). Mutates the graph only
/// when it returns true.
fn try_pair(g: &mut Instance, v: NodeId, w: NodeId) -> Result<bool> {
    let ball = joint_ball(g, v, w);

    // Forced edges out of the exit set must end in {v, w}: anything else
    // escapes the case analysis below.
    for &from in &ball.exit {
        for ep in &g[from].adj {
            if ep.status == EdgeStatus::Forced && ep.to != v && ep.to != w {
                return Ok(false);
            }
        }
    }

    let prison_undominated: Vec<NodeId> = ball
        .prison
        .iter()
        .copied()
        .filter(|&u| !g.is_dominated(u))
        .collect();
    if prison_undominated.is_empty() {
        return Ok(false);
    }

    // A single guard or prisoner covering all undominated prisoners makes
    // the rule inapplicable.
    let single_cover = |nodes: &[NodeId]| {
        nodes
            .iter()
            .any(|&x| set_ops::contains_all(&g[x].n_closed, &prison_undominated))
    };
    if single_cover(&ball.guard) || single_cover(&ball.prison) {
        return Ok(false);
    }

    let red_v = forced_partners(g, v);
    let red_w = forced_partners(g, w);
    let can_v = set_ops::contains_all(&ball.n_v, &prison_undominated);
    let can_w = set_ops::contains_all(&ball.n_w, &prison_undominated);

    if can_v && can_w && red_v == 0 && red_w == 0 {
        return case_either(g, v, w, &ball);
    }
    if can_v && red_w == 0 {
        return case_only(g, v, &ball.n_v, &ball);
    }
    if can_w && red_v == 0 {
        return case_only(g, w, &ball.n_w, &ball);
    }
    if !can_v && !can_w {
        return case_both(g, v, w, &ball);
    }
    Ok(false)
}

/// Case 1.1: either endpoint alone can cover the prison. Encoded as "at
/// least one of v, w is taken", via a forced edge when they are adjacent and
/// via a three-vertex gadget otherwise.
fn case_either(g: &mut Instance, v: NodeId, w: NodeId, ball: &Ball) -> Result<bool> {
    let removable_guards =
        set_ops::intersect(&set_ops::intersect(&ball.guard, &ball.n_v), &ball.n_w);

    if g.has_edge(v, w) {
        if g.edge_status(v, w)? == EdgeStatus::Unconstrained {
            g.force_edge(v, w)?;
        }
    } else {
        // Not worth a gadget unless it shrinks the graph.
        if ball.prison.len() + removable_guards.len() <= 3 {
            return Ok(false);
        }
        for _ in 0..3 {
            let z = g.add_extra_node();
            g.add_edge(v, z, EdgeStatus::Unconstrained)?;
            g.add_edge(w, z, EdgeStatus::Unconstrained)?;
        }
    }
    g.remove_nodes(&ball.prison)?;
    g.remove_nodes(&removable_guards)?;
    Ok(true)
}

/// Cases 1.2/1.3: only one endpoint can cover the prison on its own.
fn case_only(g: &mut Instance, x: NodeId, n_x: &[NodeId], ball: &Ball) -> Result<bool> {
    g.take(x)?;
    g.remove_nodes(&ball.prison)?;
    g.remove_nodes(&set_ops::intersect(n_x, &ball.guard))?;
    Ok(true)
}

/// Case 2: the prison needs both endpoints.
fn case_both(g: &mut Instance, v: NodeId, w: NodeId, ball: &Ball) -> Result<bool> {
    // Taking v may remove w's edges, so fix the statuses up front.
    let mut n_vw = set_ops::unite(&ball.n_v, &ball.n_w);
    let mut pair = vec![v, w];
    pair.sort_unstable();
    n_vw = set_ops::difference(&n_vw, &pair);
    for u in n_vw {
        g.mark_dominated(u);
    }
    g.take(v)?;
    g.take(w)?;
    g.remove_nodes(&ball.prison)?;
    g.remove_nodes(&ball.guard)?;
    Ok(true)
}

/// Scans pairs of takeable vertices within graph distance 3 with a bounded
/// breadth-first search and fires on the first applicable pair.
pub(super) fn apply_rule_2(g: &mut Instance) -> Result<bool> {
    const BFS_INF: u32 = u32::MAX;
    let mut dis = vec![BFS_INF; g.id_limit()];

    // Reuse the distance array across sources by shifting what counts as
    // zero, since only distances up to 3 matter.
    let mut zero_dist = BFS_INF - 4;
    let nodes = g.nodes.clone();
    for v in nodes {
        if g.is_disregarded(v) {
            continue;
        }
        let mut queue = VecDeque::from([v]);
        dis[v.idx()] = zero_dist;
        while let Some(w) = queue.pop_front() {
            if dis[w.idx()] > zero_dist && !g.is_disregarded(w) && try_pair(g, v, w)? {
                return Ok(true);
            }
            if dis[w.idx()] < zero_dist + 4 {
                for ep in &g[w].adj {
                    let x = ep.to;
                    if dis[x.idx()] > dis[w.idx()] + 1 {
                        dis[x.idx()] = dis[w.idx()] + 1;
                        queue.push_back(x);
                    }
                }
            }
        }
        zero_dist -= 4;
    }

    Ok(false)
}
