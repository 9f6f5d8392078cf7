use crate::error::{Error, Result};
use crate::instance::{EdgeStatus, Instance, NodeId};
use crate::small_indices::SmallIdx;

/// Replays `solution` against `g` (normally the untouched input instance):
/// every active vertex must end up dominated, no disregarded vertex or
/// duplicate may appear, and every forced edge needs a taken endpoint.
pub fn verify_solution(g: &Instance, solution: &[NodeId]) -> Result<()> {
    let mut dominated = vec![false; g.id_limit()];
    for &u in &g.nodes {
        if g.is_dominated(u) {
            dominated[u.idx()] = true;
        }
    }

    let mut taken = vec![false; g.id_limit()];
    for &u in solution {
        if u.idx() >= g.id_limit() || !g.has_node(u) {
            return Err(Error::Verification(format!(
                "solution contains unknown vertex {u}"
            )));
        }
        if g.is_disregarded(u) {
            return Err(Error::Verification(format!(
                "solution contains disregarded vertex {u}"
            )));
        }
        if taken[u.idx()] {
            return Err(Error::Verification(format!(
                "solution contains vertex {u} twice"
            )));
        }
        taken[u.idx()] = true;
        for &v in &g[u].n_closed {
            dominated[v.idx()] = true;
        }
    }

    for &u in &g.nodes {
        if !dominated[u.idx()] {
            return Err(Error::Verification(format!(
                "solution does not dominate vertex {u}"
            )));
        }
        for ep in &g[u].adj {
            if ep.status == EdgeStatus::Forced && !taken[u.idx()] && !taken[ep.to.idx()] {
                return Err(Error::Verification(format!(
                    "forced edge ({u}, {}) has no taken endpoint",
                    ep.to
                )));
            }
        }
    }

    Ok(())
}
