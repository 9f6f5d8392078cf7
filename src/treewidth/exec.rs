//! Decomposer that shells out to an external PACE-style treewidth solver.

use super::decomposer::Decomposer;
use super::tree_decomposition::TreeDecomposition;
use crate::instance::{Instance, NodeId};
use crate::small_indices::SmallIdx;
use log::{debug, warn};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub struct ExecDecomposer {
    pub path: PathBuf,
    pub time_budget: Duration,
}

impl Decomposer for ExecDecomposer {
    /// Feeds the graph to the child in `p tw` format (ids compacted to
    /// 1..n), polls for exit under the deadline with a small sleep, and
    /// parses its `.td` output. The child is killed and reaped on timeout.
    fn decompose(&self, g: &Instance) -> Option<TreeDecomposition> {
        let mut child = match Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                warn!("failed to spawn decomposer {}: {err}", self.path.display());
                return None;
            }
        };

        {
            let mut stdin = child.stdin.take().expect("stdin was piped");
            let mut input = format!("p tw {} {}\n", g.node_count(), g.edge_count());
            let mut compacted = vec![0_usize; g.id_limit()];
            for (i, &v) in g.nodes.iter().enumerate() {
                compacted[v.idx()] = i + 1;
            }
            for &u in &g.nodes {
                for &v in &g[u].n_open {
                    if u < v {
                        input.push_str(&format!(
                            "{} {}\n",
                            compacted[u.idx()],
                            compacted[v.idx()]
                        ));
                    }
                }
            }
            if let Err(err) = stdin.write_all(input.as_bytes()) {
                warn!("failed to write to decomposer: {err}");
            }
            // Dropping stdin closes the pipe and signals end of input.
        }

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => break,
                Ok(Some(status)) => {
                    warn!("decomposer exited with {status}");
                    return None;
                }
                Ok(None) => {
                    if start.elapsed() > self.time_budget {
                        debug!("decomposer timed out, killing it");
                        let _ = child.kill();
                        let _ = child.wait();
                        return None;
                    }
                    thread::sleep(Duration::from_millis(30));
                }
                Err(err) => {
                    warn!("waiting for decomposer failed: {err}");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
            }
        }

        let mut output = String::new();
        child
            .stdout
            .take()
            .expect("stdout was piped")
            .read_to_string(&mut output)
            .ok()?;
        parse_td(&output, &g.nodes)
    }
}

/// Parses PACE `.td` output; `back` maps the child's 1-based vertex ids back
/// onto instance node ids.
fn parse_td(output: &str, back: &[NodeId]) -> Option<TreeDecomposition> {
    let mut td = TreeDecomposition::default();
    let mut n_bags = 0;

    for line in output.lines() {
        let mut tokens = line.split_ascii_whitespace();
        match tokens.next() {
            None | Some("c") => {}
            Some("s") => {
                // s td <#bags> <max bag size> <#vertices>
                if tokens.next() != Some("td") {
                    return None;
                }
                n_bags = tokens.next()?.parse().ok()?;
                let max_bag: usize = tokens.next()?.parse().ok()?;
                td.width = max_bag.saturating_sub(1);
                td.bags = vec![Vec::new(); n_bags];
                td.adj = vec![Vec::new(); n_bags];
            }
            Some("b") => {
                let bag_id: usize = tokens.next()?.parse().ok()?;
                if bag_id == 0 || bag_id > n_bags {
                    return None;
                }
                for token in tokens {
                    let v: usize = token.parse().ok()?;
                    td.bags[bag_id - 1].push(*back.get(v.checked_sub(1)?)?);
                }
                td.bags[bag_id - 1].sort_unstable();
            }
            Some(a) => {
                let a: usize = a.parse().ok()?;
                let b: usize = tokens.next()?.parse().ok()?;
                if a == 0 || a > n_bags || b == 0 || b > n_bags {
                    return None;
                }
                td.add_edge(a - 1, b - 1);
            }
        }
    }

    if td.bags.is_empty() {
        return None;
    }
    Some(td)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_td_output() {
        let back: Vec<NodeId> = (1..=4_u32).map(NodeId::from).collect();
        let output = "c comment\ns td 3 2 4\nb 1 1 2\nb 2 2 3\nb 3 3 4\n1 2\n2 3\n";
        let td = parse_td(output, &back).unwrap();
        assert_eq!(td.len(), 3);
        assert_eq!(td.width, 1);
        assert_eq!(td.bags[0], vec![NodeId::from(1_u32), NodeId::from(2_u32)]);
        assert_eq!(td.adj[1], vec![0, 2]);
    }

    #[test]
    fn rejects_malformed_output() {
        let back: Vec<NodeId> = (1..=2_u32).map(NodeId::from).collect();
        assert!(parse_td("", &back).is_none());
        assert!(parse_td("s td 1 1 2\nb 1 7\n", &back).is_none());
        assert!(parse_td("s cactus 1 1 2\n", &back).is_none());
    }
}
