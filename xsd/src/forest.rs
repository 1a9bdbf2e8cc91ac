//! Rooted trees built incrementally from `(parent, child)` edges whose roots are not known in
//! advance.
//!
//! Payloads are compared by value: two independently constructed payloads that compare equal
//! denote the same node. Every payload occupies at most one position in the forest.

use std::fmt;

use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeId(usize);

#[derive(Clone, Debug)]
struct Node<T> {
    payload: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An ordered list of rooted trees stored in a single arena.
#[derive(Clone, Debug)]
pub struct Forest<T> {
    nodes: Vec<Node<T>>,
    roots: Vec<NodeId>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }
}

impl<T: PartialEq + fmt::Debug> Forest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `child` as an immediate child of `parent`.
    ///
    /// If `parent` is not in the forest yet it becomes a new root. If `child` is currently the
    /// root of another tree, that whole tree is moved below `parent`; otherwise a new leaf is
    /// created. Self edges, edges that would close a cycle and edges to a node that already has
    /// a different parent are ignored.
    pub fn add_edge(&mut self, parent: T, child: T) {
        if parent == child {
            debug!(payload = ?parent, "ignoring self edge");
            return;
        }

        let child_id = self.find(&child);
        if let Some(existing_parent) = child_id.and_then(|id| self.node(id).parent) {
            if self.node(existing_parent).payload != parent {
                debug!(?parent, ?child, "ignoring edge, child already has a parent");
            }
            return;
        }

        let parent_id = match self.find(&parent) {
            Some(id) => id,
            None => {
                let id = self.push(parent, None);
                self.roots.push(id);
                id
            }
        };

        match child_id {
            None => {
                let id = self.push(child, Some(parent_id));
                self.nodes[parent_id.0].children.push(id);
            }
            Some(child_id) => {
                if self.root_of(parent_id) == child_id {
                    debug!(?child, "ignoring edge that would close a cycle");
                    return;
                }
                self.roots.retain(|&root| root != child_id);
                self.nodes[child_id.0].parent = Some(parent_id);
                self.nodes[parent_id.0].children.push(child_id);
            }
        }
    }

    pub fn contains(&self, payload: &T) -> bool {
        self.find(payload).is_some()
    }

    /// Ancestors of `payload`, from the root of its tree down to its parent. Empty for roots and
    /// for payloads that are not in the forest.
    pub fn ancestry(&self, payload: &T) -> Vec<&T> {
        let Some(id) = self.find(payload) else {
            return Vec::new();
        };
        let mut ancestors = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(id) = current {
            let node = self.node(id);
            ancestors.push(&node.payload);
            current = node.parent;
        }
        ancestors.reverse();
        ancestors
    }

    pub fn is_immediate_child(&self, child: &T, parent: &T) -> bool {
        self.find(parent).map_or(false, |id| {
            self.node(id)
                .children
                .iter()
                .any(|&c| self.node(c).payload == *child)
        })
    }

    /// Every payload that has at least one child, in pre-order.
    pub fn parent_payloads(&self) -> Vec<&T> {
        self.pre_order_ids()
            .into_iter()
            .map(|id| self.node(id))
            .filter(|node| !node.children.is_empty())
            .map(|node| &node.payload)
            .collect()
    }

    /// Each parent payload with the payloads of its direct children (no transitive closure).
    pub fn immediate_children_by_parent(&self) -> Vec<(&T, Vec<&T>)> {
        self.pre_order_ids()
            .into_iter()
            .map(|id| self.node(id))
            .filter(|node| !node.children.is_empty())
            .map(|node| {
                let children = node
                    .children
                    .iter()
                    .map(|&c| &self.node(c).payload)
                    .collect();
                (&node.payload, children)
            })
            .collect()
    }

    /// Direct children of `parent`, in insertion order.
    pub fn children_of(&self, parent: &T) -> Vec<&T> {
        self.find(parent).map_or_else(Vec::new, |id| {
            self.node(id)
                .children
                .iter()
                .map(|&c| &self.node(c).payload)
                .collect()
        })
    }

    /// All payloads, tree by tree, each tree depth-first. A payload never precedes any of its
    /// ancestors.
    pub fn pre_order(&self) -> Vec<&T> {
        self.pre_order_ids()
            .into_iter()
            .map(|id| &self.node(id).payload)
            .collect()
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.0]
    }

    fn push(&mut self, payload: T, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            payload,
            parent,
            children: Vec::new(),
        });
        id
    }

    fn find(&self, payload: &T) -> Option<NodeId> {
        // Linear pre-order scan; schemas stay in the hundreds of types.
        self.pre_order_ids()
            .into_iter()
            .find(|&id| self.node(id).payload == *payload)
    }

    fn root_of(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.node(id).parent {
            id = parent;
        }
        id
    }

    fn pre_order_ids(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        for &root in &self.roots {
            stack.push(root);
            while let Some(id) = stack.pop() {
                order.push(id);
                stack.extend(self.node(id).children.iter().rev().copied());
            }
        }
        order
    }
}

impl<T: fmt::Display> fmt::Display for Forest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show<T: fmt::Display>(
            forest: &Forest<T>,
            id: NodeId,
            level: usize,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            let node = &forest.nodes[id.0];
            writeln!(f, "{:indent$}{}", "", node.payload, indent = level * 4)?;
            for &child in &node.children {
                show(forest, child, level + 1, f)?;
            }
            Ok(())
        }

        for &root in &self.roots {
            show(self, root, 0, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use proptest::sample::Index;

    fn roots<T>(forest: &Forest<T>) -> Vec<&T> {
        forest
            .roots
            .iter()
            .map(|&id| &forest.nodes[id.0].payload)
            .collect()
    }

    #[test]
    fn forward_edges_build_one_tree() {
        let mut forest = Forest::new();
        forest.add_edge("a", "b");
        forest.add_edge("b", "c");
        forest.add_edge("a", "d");

        assert_eq!(forest.pre_order(), vec![&"a", &"b", &"c", &"d"]);
        assert_eq!(forest.ancestry(&"c"), vec![&"a", &"b"]);
        assert_eq!(roots(&forest), vec![&"a"]);
    }

    #[test]
    fn backward_edge_reattaches_previous_root() {
        let mut forest = Forest::new();
        forest.add_edge("b", "c");
        assert_eq!(roots(&forest), vec![&"b"]);

        forest.add_edge("a", "b");
        assert_eq!(forest.ancestry(&"b"), vec![&"a"]);
        assert_eq!(forest.ancestry(&"c"), vec![&"a", &"b"]);
        assert_eq!(roots(&forest), vec![&"a"]);
        assert_eq!(forest.nodes.len(), 3);
    }

    #[test]
    fn joins_two_existing_trees() {
        let mut forest = Forest::new();
        forest.add_edge("x", "y");
        forest.add_edge("a", "b");
        forest.add_edge("y", "a");

        assert_eq!(roots(&forest), vec![&"x"]);
        assert_eq!(forest.ancestry(&"b"), vec![&"x", &"y", &"a"]);
        assert!(forest.is_immediate_child(&"a", &"y"));
        assert!(!forest.is_immediate_child(&"b", &"y"));
    }

    #[test]
    fn unseen_payload_has_no_ancestry() {
        let mut forest = Forest::new();
        forest.add_edge(1, 2);
        assert!(forest.ancestry(&3).is_empty());
        assert!(forest.ancestry(&1).is_empty());
        assert!(!forest.contains(&3));
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Named {
        name: String,
        weight: u32,
    }

    fn named(name: &str, weight: u32) -> Named {
        Named {
            name: name.into(),
            weight,
        }
    }

    #[test]
    fn equal_payloads_are_the_same_node() {
        let mut forest = Forest::new();
        forest.add_edge(named("a", 1), named("b", 2));
        forest.add_edge(named("a", 1), named("b", 2));

        assert_eq!(forest.nodes.len(), 2);
        assert_eq!(forest.children_of(&named("a", 1)), vec![&named("b", 2)]);

        // Same name but different contents is a different payload.
        forest.add_edge(named("a", 1), named("b", 3));
        assert_eq!(forest.children_of(&named("a", 1)).len(), 2);
    }

    #[test]
    fn ignores_edges_breaking_the_single_position_invariant() {
        let mut forest = Forest::new();
        forest.add_edge("a", "b");
        forest.add_edge("c", "b");
        forest.add_edge("b", "a");
        forest.add_edge("a", "a");

        assert_eq!(forest.pre_order(), vec![&"a", &"b"]);
        assert!(!forest.contains(&"c"));
        assert!(forest.ancestry(&"a").is_empty());
    }

    #[test]
    fn parents_and_children() {
        let mut forest = Forest::new();
        forest.add_edge("head", "m1");
        forest.add_edge("head", "m2");
        forest.add_edge("m2", "m3");
        forest.add_edge("other", "m4");

        assert_eq!(forest.parent_payloads(), vec![&"head", &"m2", &"other"]);
        assert_eq!(
            forest.immediate_children_by_parent(),
            vec![
                (&"head", vec![&"m1", &"m2"]),
                (&"m2", vec![&"m3"]),
                (&"other", vec![&"m4"]),
            ]
        );
    }

    #[test]
    fn display_indents_levels() {
        let mut forest = Forest::new();
        forest.add_edge("a", "b");
        forest.add_edge("b", "c");
        assert_eq!(forest.to_string(), "a\n    b\n        c\n");
    }

    /// Edges of a random forest over nodes `0..n`: each node after the first either starts a new
    /// tree or picks a parent among the nodes before it.
    fn forest_edges() -> impl Strategy<Value = Vec<(u32, u32)>> {
        prop::collection::vec((any::<bool>(), any::<Index>()), 1..16).prop_map(|picks| {
            picks
                .into_iter()
                .enumerate()
                .filter(|(_, (is_root, _))| !is_root)
                .map(|(i, (_, parent))| {
                    let child = i as u32 + 1;
                    (parent.index(child as usize) as u32, child)
                })
                .collect()
        })
    }

    fn build(edges: &[(u32, u32)]) -> Forest<u32> {
        let mut forest = Forest::new();
        for &(parent, child) in edges {
            forest.add_edge(parent, child);
        }
        forest
    }

    fn sorted_children(forest: &Forest<u32>) -> Vec<(u32, Vec<u32>)> {
        let mut children: Vec<_> = forest
            .immediate_children_by_parent()
            .into_iter()
            .map(|(parent, kids)| {
                let mut kids: Vec<u32> = kids.into_iter().copied().collect();
                kids.sort_unstable();
                (*parent, kids)
            })
            .collect();
        children.sort();
        children
    }

    proptest! {
        #[test]
        fn edge_order_does_not_matter(
            (first, second) in forest_edges().prop_flat_map(|edges| {
                (Just(edges.clone()).prop_shuffle(), Just(edges).prop_shuffle())
            })
        ) {
            let a = build(&first);
            let b = build(&second);

            let mut payloads_a: Vec<u32> = a.pre_order().into_iter().copied().collect();
            let mut payloads_b: Vec<u32> = b.pre_order().into_iter().copied().collect();
            payloads_a.sort_unstable();
            payloads_b.sort_unstable();
            prop_assert_eq!(&payloads_a, &payloads_b);

            for payload in &payloads_a {
                prop_assert_eq!(a.ancestry(payload), b.ancestry(payload));
            }
            prop_assert_eq!(sorted_children(&a), sorted_children(&b));
        }

        #[test]
        fn pre_order_lists_each_payload_once_after_its_ancestors(
            edges in forest_edges().prop_flat_map(|edges| Just(edges).prop_shuffle())
        ) {
            let forest = build(&edges);
            let order = forest.pre_order();
            prop_assert_eq!(order.len(), forest.nodes.len());

            let mut expected: Vec<u32> = edges.iter().flat_map(|&(p, c)| [p, c]).collect();
            expected.sort_unstable();
            expected.dedup();
            let mut seen: Vec<u32> = order.iter().map(|&&p| p).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, expected);

            for (position, payload) in order.iter().enumerate() {
                for ancestor in forest.ancestry(payload) {
                    let ancestor_position = order.iter().position(|p| *p == ancestor).unwrap();
                    prop_assert!(ancestor_position < position);
                }
            }
        }

        #[test]
        fn attaching_a_root_makes_it_a_child(
            edges in forest_edges(),
            parent in 100u32..200,
        ) {
            let mut forest = build(&edges);
            let root = roots(&forest).first().copied().copied();
            if let Some(root) = root {
                forest.add_edge(parent, root);
                prop_assert_eq!(forest.ancestry(&root), vec![&parent]);
                prop_assert!(!roots(&forest).contains(&&root));
            }
        }
    }
}
