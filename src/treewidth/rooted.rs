use super::tree_decomposition::TreeDecomposition;
use crate::instance::NodeId;

/// A rooted view of a tree decomposition, with the normalization passes that
/// prepare it for nicification: sorted bags, join children with bags equal
/// to their parent, binary joins, and empty bags at the root and below every
/// leaf.
#[derive(Clone, Debug)]
pub struct RootedTreeDecomposition {
    pub root: usize,
    nodes: Vec<RootedNode>,
}

#[derive(Clone, Debug)]
pub struct RootedNode {
    pub parent: Option<usize>,
    pub bag: Vec<NodeId>,
    pub children: Vec<usize>,
}

impl RootedTreeDecomposition {
    /// Roots `td` at decomposition node 0.
    pub fn new(td: &TreeDecomposition) -> Self {
        if td.is_empty() {
            return RootedTreeDecomposition {
                root: 0,
                nodes: vec![RootedNode {
                    parent: None,
                    bag: Vec::new(),
                    children: Vec::new(),
                }],
            };
        }

        let mut nodes: Vec<RootedNode> = td
            .bags
            .iter()
            .map(|bag| RootedNode {
                parent: None,
                bag: bag.clone(),
                children: Vec::new(),
            })
            .collect();

        // Orient the tree away from the root without recursing.
        let mut stack = vec![(0_usize, usize::MAX)];
        let mut seen = vec![false; td.len()];
        seen[0] = true;
        while let Some((u, parent)) = stack.pop() {
            for &v in &td.adj[u] {
                if v != parent {
                    debug_assert!(!seen[v], "decomposition contains a cycle");
                    seen[v] = true;
                    nodes[v].parent = Some(u);
                    nodes[u].children.push(v);
                    stack.push((v, u));
                }
            }
        }

        RootedTreeDecomposition { root: 0, nodes }
    }

    pub fn node(&self, id: usize) -> &RootedNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn sort_bags(&mut self) {
        for node in &mut self.nodes {
            node.bag.sort_unstable();
        }
    }

    /// Gives every child of a would-be join node a copy of the parent's bag,
    /// so the eventual Join sees identical bags on both sides.
    pub fn equalize_join_children(&mut self) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            for i in 0..self.nodes[id].children.len() {
                let child = self.nodes[id].children[i];
                stack.push(child);
                let copy = self.push_node(Some(id), self.nodes[id].bag.clone(), vec![child]);
                self.nodes[child].parent = Some(copy);
                self.nodes[id].children[i] = copy;
            }
        }
    }

    /// Splits nodes with more than two children by pairing children under
    /// fresh copies of the bag until the tree is binary.
    pub fn binarize_joins(&mut self) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            stack.extend(self.nodes[id].children.iter().copied());
            while self.nodes[id].children.len() > 2 {
                let l = self.nodes[id].children.pop().expect("checked len");
                let r = self.nodes[id].children.pop().expect("checked len");
                let mid = self.push_node(Some(id), self.nodes[id].bag.clone(), vec![l, r]);
                self.nodes[l].parent = Some(mid);
                self.nodes[r].parent = Some(mid);
                self.nodes[id].children.push(mid);
            }
        }
    }

    /// Hangs an empty bag below every leaf and a fresh empty root above the
    /// old one, so nicification starts and ends with empty bags.
    pub fn force_empty_root_and_leaves(&mut self) {
        for id in 0..self.nodes.len() {
            if self.nodes[id].children.is_empty() {
                let leaf = self.push_node(Some(id), Vec::new(), Vec::new());
                self.nodes[id].children.push(leaf);
            }
        }

        let old_root = self.root;
        let new_root = self.push_node(None, Vec::new(), vec![old_root]);
        self.nodes[old_root].parent = Some(new_root);
        self.root = new_root;
    }

    fn push_node(
        &mut self,
        parent: Option<usize>,
        bag: Vec<NodeId>,
        children: Vec<usize>,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(RootedNode {
            parent,
            bag,
            children,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star_decomposition() -> TreeDecomposition {
        // Center bag 0 joined to three leaf bags.
        let mut td = TreeDecomposition {
            width: 1,
            bags: vec![
                vec![NodeId::from(2_u32), NodeId::from(1_u32)],
                vec![NodeId::from(1_u32), NodeId::from(3_u32)],
                vec![NodeId::from(1_u32), NodeId::from(4_u32)],
                vec![NodeId::from(1_u32), NodeId::from(5_u32)],
            ],
            adj: vec![Vec::new(); 4],
        };
        td.add_edge(0, 1);
        td.add_edge(0, 2);
        td.add_edge(0, 3);
        td
    }

    #[test]
    fn normalization_produces_binary_equal_joins() {
        let mut rooted = RootedTreeDecomposition::new(&star_decomposition());
        rooted.sort_bags();
        rooted.equalize_join_children();
        rooted.binarize_joins();
        rooted.force_empty_root_and_leaves();

        for id in 0..rooted.len() {
            let node = rooted.node(id);
            assert!(node.children.len() <= 2);
            assert!(node.bag.windows(2).all(|w| w[0] < w[1]));
            if node.children.len() == 2 {
                for &child in &node.children {
                    assert_eq!(rooted.node(child).bag, node.bag);
                }
            }
        }
        assert!(rooted.node(rooted.root).bag.is_empty());
    }

    #[test]
    fn empty_decomposition_gets_a_root() {
        let rooted = RootedTreeDecomposition::new(&TreeDecomposition::default());
        assert_eq!(rooted.len(), 1);
        assert!(rooted.node(rooted.root).bag.is_empty());
    }
}
