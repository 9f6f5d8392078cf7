use crate::instance::NodeId;

/// A plain tree decomposition: bags of instance node ids plus the tree
/// adjacency between them. Decomposition nodes are numbered 0..len().
#[derive(Clone, Debug, Default)]
pub struct TreeDecomposition {
    pub width: usize,
    pub bags: Vec<Vec<NodeId>>,
    pub adj: Vec<Vec<usize>>,
}

impl TreeDecomposition {
    pub fn len(&self) -> usize {
        self.bags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    pub fn add_edge(&mut self, a: usize, b: usize) {
        debug_assert!(!self.adj[a].contains(&b));
        debug_assert!(!self.adj[b].contains(&a));
        self.adj[a].push(b);
        self.adj[b].push(a);
    }

    pub fn biggest_bag(&self) -> usize {
        self.bags.iter().map(Vec::len).max().unwrap_or(0)
    }
}
