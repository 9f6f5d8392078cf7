use super::rooted::RootedTreeDecomposition;
use super::tree_decomposition::TreeDecomposition;
use crate::instance::{Instance, NodeId};
use crate::set_ops;

/// Node kinds of a nice tree decomposition. Every edge of the graph is
/// activated by exactly one `IntroduceEdge` node, placed directly above the
/// introduction of its later endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NiceNodeKind {
    Leaf,
    IntroduceVertex { v: NodeId, child: usize },
    IntroduceEdge { u: NodeId, v: NodeId, child: usize },
    Forget { v: NodeId, child: usize },
    Join { left: usize, right: usize },
}

#[derive(Clone, Debug)]
pub struct NiceNode {
    pub kind: NiceNodeKind,
    pub bag: Vec<NodeId>,
}

/// A rooted tree decomposition consisting solely of Leaf, IntroduceVertex,
/// IntroduceEdge, Forget and Join nodes, with empty bags at the root and the
/// leaves.
#[derive(Clone, Debug)]
pub struct NiceTreeDecomposition {
    pub root: usize,
    nodes: Vec<NiceNode>,
}

impl NiceTreeDecomposition {
    /// Converts `td` into nice form: root at node 0, sort bags, equalize and
    /// binarize joins, pad with empty bags, then emit Forget and Introduce
    /// sequences along every parent-child bag difference.
    pub fn nicify(g: &Instance, td: &TreeDecomposition) -> Self {
        let mut rooted = RootedTreeDecomposition::new(td);
        rooted.sort_bags();
        rooted.equalize_join_children();
        rooted.binarize_joins();
        rooted.force_empty_root_and_leaves();

        let mut builder = Builder {
            g,
            rooted: &rooted,
            nodes: Vec::new(),
        };
        let (root, bag) = builder.build(rooted.root);
        debug_assert!(bag.is_empty());
        NiceTreeDecomposition {
            root,
            nodes: builder.nodes,
        }
    }

    pub fn node(&self, id: usize) -> &NiceNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_bag_size(&self) -> usize {
        self.nodes.iter().map(|node| node.bag.len()).max().unwrap_or(0)
    }
}

struct Builder<'a> {
    g: &'a Instance,
    rooted: &'a RootedTreeDecomposition,
    nodes: Vec<NiceNode>,
}

impl Builder<'_> {
    fn push(&mut self, kind: NiceNodeKind, bag: Vec<NodeId>) -> usize {
        self.nodes.push(NiceNode { kind, bag });
        self.nodes.len() - 1
    }

    /// Returns the nice node realizing the subtree under `id` together with
    /// its bag.
    fn build(&mut self, id: usize) -> (usize, Vec<NodeId>) {
        let rooted = self.rooted;
        let rooted_node = rooted.node(id);
        match rooted_node.children.as_slice() {
            [] => {
                debug_assert!(rooted_node.bag.is_empty());
                (self.push(NiceNodeKind::Leaf, Vec::new()), Vec::new())
            }
            &[child] => {
                let (tail_id, tail_bag) = self.build(child);
                if tail_bag == rooted_node.bag {
                    (tail_id, tail_bag)
                } else {
                    self.introduce_forget_sequence(rooted_node.bag.clone(), tail_bag, tail_id)
                }
            }
            &[left, right] => {
                debug_assert_eq!(rooted.node(left).bag, rooted_node.bag);
                debug_assert_eq!(rooted.node(right).bag, rooted_node.bag);
                let (l, l_bag) = self.build(left);
                let (r, _r_bag) = self.build(right);
                let join = self.push(
                    NiceNodeKind::Join { left: l, right: r },
                    rooted_node.bag.clone(),
                );
                (join, l_bag)
            }
            _ => unreachable!("joins were binarized"),
        }
    }

    /// Emits Forgets for the vertices leaving `tail_bag`, then an
    /// IntroduceVertex for each vertex entering, immediately followed by
    /// IntroduceEdge nodes towards all bag members it is adjacent to.
    fn introduce_forget_sequence(
        &mut self,
        head_bag: Vec<NodeId>,
        mut tail_bag: Vec<NodeId>,
        mut tail_id: usize,
    ) -> (usize, Vec<NodeId>) {
        let intersection = set_ops::intersect(&head_bag, &tail_bag);

        let mut to_forget = set_ops::difference(&tail_bag, &intersection);
        while let Some(forgotten) = to_forget.pop() {
            set_ops::remove_sorted(&mut tail_bag, forgotten);
            tail_id = self.push(
                NiceNodeKind::Forget {
                    v: forgotten,
                    child: tail_id,
                },
                tail_bag.clone(),
            );
        }
        debug_assert_eq!(tail_bag, intersection);

        let mut to_introduce = set_ops::difference(&head_bag, &intersection);
        while let Some(introduced) = to_introduce.pop() {
            let neighbors_in_bag = set_ops::intersect(&self.g[introduced].n_open, &tail_bag);
            set_ops::insert_sorted(&mut tail_bag, introduced);
            tail_id = self.push(
                NiceNodeKind::IntroduceVertex {
                    v: introduced,
                    child: tail_id,
                },
                tail_bag.clone(),
            );
            for to in neighbors_in_bag {
                tail_id = self.push(
                    NiceNodeKind::IntroduceEdge {
                        u: introduced,
                        v: to,
                        child: tail_id,
                    },
                    tail_bag.clone(),
                );
            }
        }

        debug_assert_eq!(tail_bag, head_bag);
        (tail_id, tail_bag)
    }
}
