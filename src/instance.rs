use crate::create_idx_struct;
use crate::error::{Error, Result};
use crate::set_ops;
use crate::small_indices::SmallIdx;
use log::info;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::ops::Index;
use std::time::Instant;

create_idx_struct!(pub NodeId);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DominationStatus {
    Undominated,
    Dominated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MembershipStatus {
    Undecided,
    Disregarded,
    Taken,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeStatus {
    Unconstrained,
    Forced,
}

/// Half of an undirected edge as seen from one endpoint. Multi-edges are
/// disallowed, so endpoints are identified by the far node id alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub to: NodeId,
    pub status: EdgeStatus,
}

/// Vertex state plus the cached neighbor sets, all sorted ascending and kept
/// in lockstep with the edge list.
///
/// `n_closed`, `dominators` and `dominatees` contain the vertex itself while
/// its status allows it; `n_open` never does. `dominators[v]` empties exactly
/// when v becomes dominated, `dominatees[v]` exactly when v becomes
/// disregarded.
#[derive(Clone, Debug)]
pub struct Node {
    pub adj: Vec<Endpoint>,
    pub n_open: Vec<NodeId>,
    pub n_closed: Vec<NodeId>,
    pub dominators: Vec<NodeId>,
    pub dominatees: Vec<NodeId>,
    pub domination_status: DominationStatus,
    pub membership_status: MembershipStatus,
    pub is_extra: bool,
}

impl Default for Node {
    /// A cleared arena slot: statuses chosen so a removed vertex can never
    /// look like it still needs domination or may be taken.
    fn default() -> Self {
        Node {
            adj: Vec::new(),
            n_open: Vec::new(),
            n_closed: Vec::new(),
            dominators: Vec::new(),
            dominatees: Vec::new(),
            domination_status: DominationStatus::Dominated,
            membership_status: MembershipStatus::Disregarded,
            is_extra: false,
        }
    }
}

impl Node {
    fn new(v: NodeId, is_extra: bool) -> Self {
        Node {
            adj: Vec::new(),
            n_open: Vec::new(),
            n_closed: vec![v],
            dominators: vec![v],
            dominatees: vec![v],
            domination_status: DominationStatus::Undominated,
            membership_status: MembershipStatus::Undecided,
            is_extra,
        }
    }
}

/// Undirected graph annotated for dominating-set solving.
///
/// The vertex table is an arena indexed by id: removed vertices leave a
/// cleared slot behind and ids are never recycled, so ids stay stable across
/// arbitrary reduction sequences. `nodes` is the sorted list of alive ids and
/// `ds` accumulates every vertex committed to the dominating set so far.
#[derive(Clone, Debug)]
pub struct Instance {
    pub nodes: Vec<NodeId>,
    all_nodes: Vec<Node>,
    pub ds: Vec<NodeId>,
}

impl Index<NodeId> for Instance {
    type Output = Node;

    fn index(&self, v: NodeId) -> &Node {
        &self.all_nodes[v.idx()]
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl Instance {
    pub fn new() -> Self {
        Instance {
            nodes: Vec::new(),
            // Dummy slot so external 1-based ids index directly.
            all_nodes: vec![Node::default()],
            ds: Vec::new(),
        }
    }

    /// Builds an instance with vertices `1..=n` and the given edge list.
    pub fn from_edges(n: u32, edges: &[(u32, u32)]) -> Result<Self> {
        let mut g = Self::new();
        for i in 1..=n {
            g.nodes.push(NodeId(i));
            g.all_nodes.push(Node::new(NodeId(i), false));
        }
        for &(a, b) in edges {
            g.init_add_edge(NodeId(a), NodeId(b), EdgeStatus::Unconstrained, n)?;
        }
        g.finish_init()?;
        Ok(g)
    }

    /// Parses a `.gr` (`p ds`) or `.ads` (`p ads`) instance.
    pub fn load(reader: impl BufRead) -> Result<Self> {
        let time_before = Instant::now();
        let mut lines = reader.lines();

        let header = loop {
            let line = match lines.next() {
                Some(line) => line.map_err(|e| Error::parse(e.to_string()))?,
                None => return Err(Error::parse("missing problem header")),
            };
            if line.starts_with('c') || line.trim().is_empty() {
                continue;
            }
            if line.starts_with('p') {
                break line;
            }
            return Err(Error::parse(format!("unexpected line before header: {line}")));
        };

        let mut tokens = header.split_ascii_whitespace().skip(1);
        let problem = tokens
            .next()
            .ok_or_else(|| Error::parse("missing problem kind in header"))?
            .to_string();
        let mut numbers = tokens.map(str::parse::<u32>);
        let mut next_number = |what: &str| {
            numbers
                .next()
                .ok_or_else(|| Error::parse(format!("missing {what} in header")))?
                .map_err(|e| Error::parse(format!("bad {what} in header: {e}")))
        };
        let n_nodes = next_number("node count")?;
        let n_edges = next_number("edge count")?;

        let mut g = Self::new();
        match problem.as_str() {
            "ds" => {
                for i in 1..=n_nodes {
                    g.nodes.push(NodeId(i));
                    g.all_nodes.push(Node::new(NodeId(i), false));
                }
                g.parse_ds_edges(&mut lines, n_nodes, n_edges)?;
            }
            "ads" => {
                let n_decided = next_number("decided count")?;
                g.parse_ads(&mut lines, n_nodes, n_edges, n_decided)?;
            }
            other => return Err(Error::parse(format!("unknown problem kind `{other}`"))),
        }

        g.finish_init()?;
        info!(
            "Loaded `{}` instance with {} nodes, {} edges in {:.2?}",
            problem,
            g.node_count(),
            n_edges,
            Instant::now() - time_before,
        );
        Ok(g)
    }

    fn parse_ds_edges(
        &mut self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        n_nodes: u32,
        header_edges: u32,
    ) -> Result<()> {
        let mut read_edges = 0;
        for line in lines {
            let line = line.map_err(|e| Error::parse(e.to_string()))?;
            if line.starts_with('c') || line.trim().is_empty() {
                continue;
            }
            let mut tokens = line.split_ascii_whitespace().map(str::parse::<u32>);
            let (a, b) = match (tokens.next(), tokens.next()) {
                (Some(Ok(a)), Some(Ok(b))) => (a, b),
                _ => return Err(Error::parse(format!("malformed edge line: {line}"))),
            };
            self.init_add_edge(NodeId(a), NodeId(b), EdgeStatus::Unconstrained, n_nodes)?;
            read_edges += 1;
        }
        if read_edges != header_edges {
            return Err(Error::parse(format!(
                "expected {header_edges} edges, found {read_edges}"
            )));
        }
        Ok(())
    }

    fn parse_ads(
        &mut self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        n_nodes: u32,
        header_edges: u32,
        n_decided: u32,
    ) -> Result<()> {
        let mut next_line = |lines: &mut dyn Iterator<Item = io::Result<String>>,
                             what: &str|
         -> Result<String> {
            match lines.next() {
                Some(line) => line.map_err(|e| Error::parse(e.to_string())),
                None => Err(Error::parse(format!("missing {what}"))),
            }
        };

        let decided = next_line(lines, "decided vertex line")?;
        for token in decided.split_ascii_whitespace() {
            let v: u32 = token
                .parse()
                .map_err(|e| Error::parse(format!("bad decided vertex: {e}")))?;
            self.ds.push(NodeId(v));
        }
        if self.ds.len() != n_decided as usize {
            return Err(Error::parse(format!(
                "expected {} decided vertices, found {}",
                n_decided,
                self.ds.len()
            )));
        }

        for _ in 0..n_nodes {
            let line = next_line(lines, "node description line")?;
            let mut tokens = line.split_ascii_whitespace().map(str::parse::<u32>);
            let (v, s_d, s_m, e) = match (tokens.next(), tokens.next(), tokens.next(), tokens.next())
            {
                (Some(Ok(v)), Some(Ok(s_d)), Some(Ok(s_m)), Some(Ok(e))) => (v, s_d, s_m, e),
                _ => return Err(Error::parse(format!("malformed node line: {line}"))),
            };
            while self.all_nodes.len() <= v as usize {
                self.all_nodes.push(Node::default());
            }
            self.nodes.push(NodeId(v));
            self.all_nodes[v as usize] = Node::new(NodeId(v), false);
            let node = &mut self.all_nodes[v as usize];
            node.domination_status = match s_d {
                0 => DominationStatus::Undominated,
                1 => DominationStatus::Dominated,
                _ => return Err(Error::parse(format!("bad domination status {s_d}"))),
            };
            node.membership_status = match s_m {
                0 => MembershipStatus::Undecided,
                1 => MembershipStatus::Disregarded,
                2 => MembershipStatus::Taken,
                _ => return Err(Error::parse(format!("bad membership status {s_m}"))),
            };
            node.is_extra = match e {
                0 => false,
                1 => true,
                _ => return Err(Error::parse(format!("bad extra flag {e}"))),
            };
            if node.domination_status == DominationStatus::Dominated {
                node.dominators.clear();
            }
            if node.membership_status == MembershipStatus::Disregarded {
                node.dominatees.clear();
            }
        }
        self.nodes.sort_unstable();

        let max_id = self.all_nodes.len() as u32 - 1;
        for _ in 0..header_edges {
            let line = next_line(lines, "edge description line")?;
            let mut tokens = line.split_ascii_whitespace().map(str::parse::<u32>);
            let (a, b, f) = match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(Ok(a)), Some(Ok(b)), Some(Ok(f))) => (a, b, f),
                _ => return Err(Error::parse(format!("malformed edge line: {line}"))),
            };
            let status = match f {
                0 => EdgeStatus::Unconstrained,
                1 => EdgeStatus::Forced,
                _ => return Err(Error::parse(format!("bad edge status {f}"))),
            };
            self.init_add_edge(NodeId(a), NodeId(b), status, max_id)?;
        }
        Ok(())
    }

    /// Writes the instance in `.ads` format.
    pub fn export_ads(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "p ads {} {} {}",
            self.node_count(),
            self.edge_count(),
            self.ds.len()
        )?;
        let decided: Vec<String> = self.ds.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", decided.join(" "))?;

        for &v in &self.nodes {
            let node = &self[v];
            writeln!(
                out,
                "{} {} {} {}",
                v,
                (node.domination_status == DominationStatus::Dominated) as u8,
                match node.membership_status {
                    MembershipStatus::Undecided => 0,
                    MembershipStatus::Disregarded => 1,
                    MembershipStatus::Taken => 2,
                },
                u8::from(node.is_extra),
            )?;
        }

        for &u in &self.nodes {
            for ep in &self[u].adj {
                if u < ep.to {
                    writeln!(
                        out,
                        "{} {} {}",
                        u,
                        ep.to,
                        (ep.status == EdgeStatus::Forced) as u8
                    )?;
                }
            }
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, counted as half the degree sum. O(n).
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|&v| self.deg(v)).sum::<usize>() / 2
    }

    pub fn forced_edge_count(&self) -> usize {
        self.nodes.iter().map(|&v| self.forced_deg(v)).sum::<usize>() / 2
    }

    pub fn disregarded_node_count(&self) -> usize {
        self.nodes.iter().filter(|&&v| self.is_disregarded(v)).count()
    }

    /// Upper bound (exclusive) on ids handed out so far.
    pub fn id_limit(&self) -> usize {
        self.all_nodes.len()
    }

    pub fn has_node(&self, v: NodeId) -> bool {
        v.idx() < self.all_nodes.len() && !self.all_nodes[v.idx()].n_closed.is_empty()
    }

    pub fn deg(&self, v: NodeId) -> usize {
        self[v].adj.len()
    }

    pub fn forced_deg(&self, v: NodeId) -> usize {
        self[v]
            .adj
            .iter()
            .filter(|ep| ep.status == EdgeStatus::Forced)
            .count()
    }

    pub fn is_dominated(&self, v: NodeId) -> bool {
        self[v].domination_status == DominationStatus::Dominated
    }

    pub fn is_taken(&self, v: NodeId) -> bool {
        self[v].membership_status == MembershipStatus::Taken
    }

    pub fn is_disregarded(&self, v: NodeId) -> bool {
        self[v].membership_status == MembershipStatus::Disregarded
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        set_ops::contains_sorted(&self[u].n_open, &v)
    }

    pub fn edge_status(&self, u: NodeId, v: NodeId) -> Result<EdgeStatus> {
        self[u]
            .adj
            .binary_search_by_key(&v, |ep| ep.to)
            .map(|pos| self[u].adj[pos].status)
            .map_err(|_| Error::invariant(format!("no edge ({u}, {v})")))
    }

    /// Marks v as no longer requiring domination and drops it from the
    /// dominatee sets of everything that could have covered it.
    pub fn mark_dominated(&mut self, v: NodeId) {
        if self.is_dominated(v) {
            return;
        }
        self.all_nodes[v.idx()].domination_status = DominationStatus::Dominated;
        let dominators = std::mem::take(&mut self.all_nodes[v.idx()].dominators);
        for u in dominators {
            set_ops::remove_sorted(&mut self.all_nodes[u.idx()].dominatees, v);
        }
    }

    /// Forbids v from entering the dominating set; it keeps participating in
    /// the graph for domination purposes.
    pub fn mark_disregarded(&mut self, v: NodeId) {
        if self.is_disregarded(v) {
            return;
        }
        self.all_nodes[v.idx()].membership_status = MembershipStatus::Disregarded;
        let dominatees = std::mem::take(&mut self.all_nodes[v.idx()].dominatees);
        for u in dominatees {
            set_ops::remove_sorted(&mut self.all_nodes[u.idx()].dominators, v);
        }
    }

    /// Creates a fresh vertex and returns its id.
    pub fn add_node(&mut self) -> NodeId {
        self.push_node(false)
    }

    /// Creates a synthetic branching-gadget vertex. Extra vertices are never
    /// taken directly; taking one expands to taking all its neighbors.
    pub fn add_extra_node(&mut self) -> NodeId {
        self.push_node(true)
    }

    fn push_node(&mut self, is_extra: bool) -> NodeId {
        let v = NodeId::from(self.all_nodes.len());
        self.nodes.push(v);
        self.all_nodes.push(Node::new(v, is_extra));
        v
    }

    /// Adds an undirected edge. O(deg).
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, status: EdgeStatus) -> Result<()> {
        if u == v {
            return Err(Error::invariant(format!("self-loop at {u}")));
        }
        if !self.has_node(u) || !self.has_node(v) {
            return Err(Error::invariant(format!("add_edge({u}, {v}) on missing node")));
        }
        if self.has_edge(u, v) {
            return Err(Error::invariant(format!("edge ({u}, {v}) already present")));
        }
        self.add_directed_edge(u, v);
        self.add_directed_edge(v, u);
        if status == EdgeStatus::Forced {
            self.force_edge(u, v)?;
        }
        Ok(())
    }

    /// Removes an unconstrained edge. Forced edges can only leave the graph
    /// through `take` of an endpoint.
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        let status = self.edge_status(u, v)?;
        if status == EdgeStatus::Forced && !self.is_taken(u) && !self.is_taken(v) {
            return Err(Error::invariant(format!(
                "removing forced edge ({u}, {v}) without taking an endpoint"
            )));
        }
        self.remove_directed_edge(u, v);
        self.remove_directed_edge(v, u);
        Ok(())
    }

    /// Upgrades an existing edge to FORCED: at least one endpoint must end up
    /// in the dominating set. Both endpoints and every common neighbor are
    /// thereby dominated.
    pub fn force_edge(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        let status = self.edge_status(u, v)?;
        if status == EdgeStatus::Forced {
            return Err(Error::invariant(format!("edge ({u}, {v}) already forced")));
        }
        self.set_edge_status(u, v, EdgeStatus::Forced);
        self.mark_dominated(u);
        self.mark_dominated(v);

        // Whichever endpoint wins covers all common neighbors.
        let common = set_ops::intersect(&self[u].n_open, &self[v].n_open);
        for w in common {
            self.mark_dominated(w);
        }
        Ok(())
    }

    /// Removes v from the graph. Errs on an un-taken forced edge; use
    /// `ignore` to discharge those by taking the far endpoints.
    pub fn remove_node(&mut self, v: NodeId) -> Result<()> {
        if !self.has_node(v) {
            return Ok(());
        }
        if !self.is_taken(v) {
            if let Some(ep) = self[v].adj.iter().find(|ep| ep.status == EdgeStatus::Forced) {
                return Err(Error::invariant(format!(
                    "removing node {v} with untaken forced edge to {}",
                    ep.to
                )));
            }
        }
        self.clear_node(v);
        Ok(())
    }

    pub fn remove_nodes(&mut self, l: &[NodeId]) -> Result<()> {
        for &v in l {
            self.remove_node(v)?;
        }
        Ok(())
    }

    /// Removes v, discharging each forced edge by taking its far endpoint.
    pub fn ignore(&mut self, v: NodeId) -> Result<()> {
        if !self.has_node(v) {
            return Ok(());
        }
        let to_take: Vec<NodeId> = if self.is_taken(v) {
            Vec::new()
        } else {
            self[v]
                .adj
                .iter()
                .filter(|ep| ep.status == EdgeStatus::Forced)
                .map(|ep| ep.to)
                .collect()
        };
        self.clear_node(v);
        for u in to_take {
            if self.has_node(u) {
                self.take(u)?;
            }
        }
        Ok(())
    }

    fn clear_node(&mut self, v: NodeId) {
        let adj = std::mem::take(&mut self.all_nodes[v.idx()].adj);
        for ep in &adj {
            self.remove_directed_edge(ep.to, v);
        }
        self.all_nodes[v.idx()] = Node::default();
        set_ops::remove_sorted(&mut self.nodes, v);
    }

    /// Inserts v into the dominating set, dominates its dominatees and
    /// removes it from the graph. For extra vertices this expands to taking
    /// every current neighbor instead.
    pub fn take(&mut self, v: NodeId) -> Result<()> {
        if !self.has_node(v) {
            return Err(Error::invariant(format!("taking missing node {v}")));
        }
        if self.is_taken(v) {
            return Err(Error::invariant(format!("taking already taken node {v}")));
        }
        if self.is_disregarded(v) {
            return Err(Error::invariant(format!("taking disregarded node {v}")));
        }

        if self[v].is_extra {
            let n_open = self[v].n_open.clone();
            for u in n_open {
                if self.has_node(u) && !self.is_taken(u) {
                    self.take(u)?;
                }
            }
            return self.remove_node(v);
        }

        self.all_nodes[v.idx()].membership_status = MembershipStatus::Taken;
        self.ds.push(v);
        let dominatees = self[v].dominatees.clone();
        for u in dominatees {
            self.mark_dominated(u);
        }
        self.remove_node(v)
    }

    /// Merges `merge` into `keep`: neighbors of `merge` become neighbors of
    /// `keep`. Only legal while `merge` carries no forced edge and no status.
    pub fn contract(&mut self, keep: NodeId, merge: NodeId) -> Result<()> {
        if !self.has_node(keep) || !self.has_node(merge) {
            return Err(Error::invariant(format!(
                "contract({keep}, {merge}) on missing node"
            )));
        }
        if self.forced_deg(merge) != 0 {
            return Err(Error::invariant(format!(
                "contracting {merge} with incident forced edges"
            )));
        }
        let neighbors = self[merge].n_open.clone();
        self.remove_node(merge)?;
        for w in neighbors {
            if w != keep && !self.has_edge(keep, w) {
                self.add_edge(keep, w, EdgeStatus::Unconstrained)?;
            }
        }
        Ok(())
    }

    /// Partitions the alive vertices into connected components via
    /// breadth-first search. O(n + m).
    pub fn split(&self) -> Vec<Vec<NodeId>> {
        let mut component = vec![usize::MAX; self.all_nodes.len()];
        let mut n_components = 0;

        for &v in &self.nodes {
            if component[v.idx()] != usize::MAX {
                continue;
            }
            component[v.idx()] = n_components;
            let mut queue = VecDeque::from([v]);
            while let Some(w) = queue.pop_front() {
                for &u in &self[w].n_open {
                    if component[u.idx()] == usize::MAX {
                        component[u.idx()] = n_components;
                        queue.push_back(u);
                    }
                }
            }
            n_components += 1;
        }

        let mut result = vec![Vec::new(); n_components];
        for &v in &self.nodes {
            result[component[v.idx()]].push(v);
        }
        result
    }

    /// Restriction of this instance to one component returned by `split`,
    /// with an empty decided set so per-component solutions accumulate.
    pub fn component(&self, nodes: &[NodeId]) -> Instance {
        let mut sub = self.clone();
        sub.nodes = nodes.to_vec();
        sub.ds.clear();
        sub
    }

    /// False iff some vertex can no longer be dominated by anything.
    pub fn is_solvable(&self) -> bool {
        self.nodes
            .iter()
            .all(|&v| self.is_dominated(v) || !self[v].dominators.is_empty())
    }

    fn set_edge_status(&mut self, u: NodeId, v: NodeId, status: EdgeStatus) {
        for (a, b) in [(u, v), (v, u)] {
            let pos = self.all_nodes[a.idx()]
                .adj
                .binary_search_by_key(&b, |ep| ep.to)
                .expect("set_edge_status on missing edge");
            self.all_nodes[a.idx()].adj[pos].status = status;
        }
    }

    fn add_directed_edge(&mut self, u: NodeId, v: NodeId) {
        let v_dominated = self.is_dominated(v);
        let v_disregarded = self.is_disregarded(v);
        let node = &mut self.all_nodes[u.idx()];
        let pos = node
            .adj
            .binary_search_by_key(&v, |ep| ep.to)
            .expect_err("multi-edge");
        node.adj.insert(
            pos,
            Endpoint {
                to: v,
                status: EdgeStatus::Unconstrained,
            },
        );
        set_ops::insert_sorted(&mut node.n_open, v);
        set_ops::insert_sorted(&mut node.n_closed, v);
        if node.domination_status == DominationStatus::Undominated && !v_disregarded {
            set_ops::insert_sorted(&mut node.dominators, v);
        }
        if node.membership_status != MembershipStatus::Disregarded && !v_dominated {
            set_ops::insert_sorted(&mut node.dominatees, v);
        }
    }

    fn remove_directed_edge(&mut self, u: NodeId, v: NodeId) {
        let node = &mut self.all_nodes[u.idx()];
        if let Ok(pos) = node.adj.binary_search_by_key(&v, |ep| ep.to) {
            node.adj.remove(pos);
        }
        set_ops::remove_sorted(&mut node.n_open, v);
        set_ops::remove_sorted(&mut node.n_closed, v);
        set_ops::remove_sorted(&mut node.dominators, v);
        set_ops::remove_sorted(&mut node.dominatees, v);
    }

    /// Unsorted bulk insert used while parsing; `finish_init` sorts once.
    fn init_add_edge(
        &mut self,
        u: NodeId,
        v: NodeId,
        status: EdgeStatus,
        max_id: u32,
    ) -> Result<()> {
        if u.0 == 0 || u.0 > max_id || v.0 == 0 || v.0 > max_id {
            return Err(Error::parse(format!("edge ({u}, {v}) out of range")));
        }
        if u == v {
            return Err(Error::parse(format!("self-loop at {u}")));
        }
        self.init_add_directed_edge(u, v, status);
        self.init_add_directed_edge(v, u, status);
        Ok(())
    }

    fn init_add_directed_edge(&mut self, u: NodeId, v: NodeId, status: EdgeStatus) {
        let v_dominated = self.is_dominated(v);
        let v_disregarded = self.is_disregarded(v);
        let node = &mut self.all_nodes[u.idx()];
        node.adj.push(Endpoint { to: v, status });
        node.n_open.push(v);
        node.n_closed.push(v);
        if node.domination_status == DominationStatus::Undominated && !v_disregarded {
            node.dominators.push(v);
        }
        if node.membership_status != MembershipStatus::Disregarded && !v_dominated {
            node.dominatees.push(v);
        }
    }

    fn finish_init(&mut self) -> Result<()> {
        for node in &mut self.all_nodes {
            node.adj.sort_unstable_by_key(|ep| ep.to);
            node.n_open.sort_unstable();
            node.n_closed.sort_unstable();
            node.dominators.sort_unstable();
            node.dominatees.sort_unstable();
        }
        for &v in &self.nodes {
            if self[v].n_open.windows(2).any(|w| w[0] == w[1]) {
                return Err(Error::parse(format!("duplicate edge at node {v}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Checks the derived-set invariants the hard way. Every mutator test
    /// funnels through this.
    pub(crate) fn assert_consistent(g: &Instance) {
        for &v in &g.nodes {
            let node = &g[v];
            assert!(node.adj.windows(2).all(|w| w[0].to < w[1].to));
            assert!(node.n_open.windows(2).all(|w| w[0] < w[1]));
            let open: Vec<NodeId> = node.adj.iter().map(|ep| ep.to).collect();
            assert_eq!(open, node.n_open, "adj and n_open disagree at {v}");
            assert_eq!(
                set_ops::unite(&node.n_open, &[v]),
                node.n_closed,
                "n_closed wrong at {v}"
            );

            let expected_dominators = if g.is_dominated(v) {
                Vec::new()
            } else {
                node.n_closed
                    .iter()
                    .copied()
                    .filter(|&u| !g.is_disregarded(u))
                    .collect()
            };
            assert_eq!(node.dominators, expected_dominators, "dominators wrong at {v}");

            let expected_dominatees = if g.is_disregarded(v) {
                Vec::new()
            } else {
                node.n_closed
                    .iter()
                    .copied()
                    .filter(|&u| !g.is_dominated(u))
                    .collect()
            };
            assert_eq!(node.dominatees, expected_dominatees, "dominatees wrong at {v}");

            for ep in &node.adj {
                assert_eq!(
                    g.edge_status(ep.to, v).unwrap(),
                    ep.status,
                    "asymmetric edge status ({v}, {})",
                    ep.to
                );
                if ep.status == EdgeStatus::Forced {
                    assert!(g.is_dominated(v) && g.is_dominated(ep.to));
                }
            }
        }
    }

    fn path5() -> Instance {
        Instance::from_edges(5, &[(1, 2), (2, 3), (3, 4), (4, 5)]).unwrap()
    }

    #[test]
    fn fresh_instance_is_consistent() {
        let g = path5();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.forced_edge_count(), 0);
        assert_consistent(&g);
    }

    #[test]
    fn parse_gr() {
        let input = "c example\np ds 3 2\n1 2\nc mid comment\n2 3\n";
        let g = Instance::load(input.as_bytes()).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_consistent(&g);
    }

    #[test]
    fn parse_errors() {
        for bad in [
            "p ds 3 2\n1 2\n",         // edge count mismatch
            "p ds 3 1\n1 4\n",         // out of range
            "p ds 3 1\n2 2\n",         // self loop
            "p ds 3 2\n1 2\n1 2\n",    // duplicate edge
            "p tw 3 0\n",              // unknown kind
            "1 2\n",                   // missing header
        ] {
            assert!(
                matches!(Instance::load(bad.as_bytes()), Err(Error::Parse(_))),
                "accepted: {bad:?}"
            );
        }
    }

    #[test]
    fn take_dominates_neighbors() {
        let mut g = path5();
        g.take(NodeId(2)).unwrap();
        assert_eq!(g.ds, vec![NodeId(2)]);
        assert!(!g.has_node(NodeId(2)));
        assert!(g.is_dominated(NodeId(1)));
        assert!(g.is_dominated(NodeId(3)));
        assert!(!g.is_dominated(NodeId(4)));
        assert_consistent(&g);
    }

    #[test]
    fn take_taken_is_invariant_error() {
        let mut g = path5();
        g.take(NodeId(2)).unwrap();
        assert!(matches!(g.take(NodeId(2)), Err(Error::Invariant(_))));
    }

    #[test]
    fn force_edge_closure() {
        let mut g = Instance::from_edges(4, &[(1, 2), (1, 3), (2, 3), (3, 4)]).unwrap();
        g.force_edge(NodeId(1), NodeId(2)).unwrap();
        assert_eq!(g.edge_status(NodeId(1), NodeId(2)).unwrap(), EdgeStatus::Forced);
        // Common neighbor 3 is covered by whichever endpoint wins.
        assert!(g.is_dominated(NodeId(3)));
        assert!(!g.is_dominated(NodeId(4)));
        assert_consistent(&g);
    }

    #[test]
    fn forced_edge_blocks_removal() {
        let mut g = path5();
        g.force_edge(NodeId(2), NodeId(3)).unwrap();
        assert!(matches!(
            g.remove_edge(NodeId(2), NodeId(3)),
            Err(Error::Invariant(_))
        ));
        assert!(matches!(g.remove_node(NodeId(2)), Err(Error::Invariant(_))));
        // Taking an endpoint discharges the constraint.
        g.take(NodeId(2)).unwrap();
        assert_consistent(&g);
    }

    #[test]
    fn ignore_takes_forced_partners() {
        let mut g = path5();
        g.force_edge(NodeId(2), NodeId(3)).unwrap();
        g.ignore(NodeId(3)).unwrap();
        assert!(!g.has_node(NodeId(3)));
        assert_eq!(g.ds, vec![NodeId(2)]);
        assert_consistent(&g);
    }

    #[test]
    fn disregarded_leaves_graph_but_not_ds() {
        let mut g = path5();
        g.mark_disregarded(NodeId(3));
        assert!(g.has_node(NodeId(3)));
        assert!(g[NodeId(3)].dominatees.is_empty());
        assert!(!g[NodeId(2)].dominators.contains(&NodeId(3)));
        assert!(matches!(g.take(NodeId(3)), Err(Error::Invariant(_))));
        assert_consistent(&g);
    }

    #[test]
    fn extra_take_expands_to_neighbors() {
        let mut g = path5();
        let z = g.add_extra_node();
        g.add_edge(z, NodeId(1), EdgeStatus::Unconstrained).unwrap();
        g.add_edge(z, NodeId(3), EdgeStatus::Unconstrained).unwrap();
        g.take(z).unwrap();
        assert!(!g.has_node(z));
        assert_eq!(g.ds, vec![NodeId(1), NodeId(3)]);
        assert_consistent(&g);
    }

    #[test]
    fn contract_merges_windows() {
        // Path 1-2-3-4; contracting 2 and 3 into 1 leaves edge (1, 4).
        let mut g = Instance::from_edges(4, &[(1, 2), (2, 3), (3, 4)]).unwrap();
        g.contract(NodeId(1), NodeId(2)).unwrap();
        g.contract(NodeId(1), NodeId(3)).unwrap();
        assert!(g.has_edge(NodeId(1), NodeId(4)));
        assert_eq!(g.node_count(), 2);
        assert_consistent(&g);
    }

    #[test]
    fn split_partitions_components() {
        let g = Instance::from_edges(6, &[(1, 2), (2, 3), (1, 3), (4, 5), (5, 6), (4, 6)]).unwrap();
        let components = g.split();
        assert_eq!(components.len(), 2);
        let all: Vec<NodeId> = components.iter().flatten().copied().collect();
        assert_eq!(set_ops::unite(&components[0], &components[1]), g.nodes);
        for &v in &components[0] {
            for &u in &g[v].n_open {
                assert!(components[0].contains(&u));
            }
        }
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn ads_round_trip() {
        let mut g = path5();
        g.take(NodeId(2)).unwrap();
        g.mark_disregarded(NodeId(4));
        g.force_edge(NodeId(4), NodeId(5)).unwrap();

        let mut buf = Vec::new();
        g.export_ads(&mut buf).unwrap();
        let h = Instance::load(&buf[..]).unwrap();

        assert_eq!(g.nodes, h.nodes);
        assert_eq!(g.ds, h.ds);
        for &v in &g.nodes {
            assert_eq!(g[v].adj, h[v].adj, "adj differs at {v}");
            assert_eq!(g[v].domination_status, h[v].domination_status);
            assert_eq!(g[v].membership_status, h[v].membership_status);
            assert_eq!(g[v].is_extra, h[v].is_extra);
        }
        assert_consistent(&h);
    }
}
