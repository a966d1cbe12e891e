//! A red-black tree layered over [`OrderedTree`]. Placement, search and unlinking are the
//! ordered tree's; this module colours the nodes and rotates them back into shape after each
//! insertion.
//!
//! # Examples
//!
//! ```
//! use weighted_tree::{BalancedTree, Color};
//!
//! let mut tree: BalancedTree<i64> = (1..=7).collect();
//!
//! // Sorted insertions don't degrade into a list.
//! let root = tree.root().unwrap();
//! assert_eq!(root.weight(), 2);
//! assert_eq!(root.color(), Color::Black);
//! assert!(tree.validate());
//! ```
//!
//! # Deletion
//!
//! [`BalancedTree::delete`] runs the insertion fixup on the unlinked node. That resolves red
//! nodes meeting but not the black-height deficit that removing a black node leaves behind, so
//! a tree that has seen deletions keeps its ordering but may no longer be balanced.

use std::fmt;

use log::trace;

use crate::error::TreeError;
use crate::node::{Direction, Node, NodeId, NodeRef};
use crate::ordered::{OrderedTree, Target};
use crate::traverse::{Traverse, Values};

/// The colour of a red-black node. New nodes are red.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    /// Freshly inserted, or promoted by a recolouring.
    #[default]
    Red,
    /// Counted by the black-height.
    Black,
}

impl<T> NodeRef<'_, T, Color> {
    /// The colour of this node.
    pub fn color(&self) -> Color {
        self.node().color
    }

    /// Whether this node is red.
    pub fn is_red(&self) -> bool {
        self.color() == Color::Red
    }
}

impl<T> Node<T, Color> {
    /// The colour of this node.
    pub fn color(&self) -> Color {
        self.color
    }
}

/// A self-balancing [`OrderedTree`]. After any sequence of insertions:
///
/// 1. the root is black,
/// 2. a red node never has a red child,
/// 3. every path from a node down to a missing child crosses the same number of black nodes.
#[derive(Clone)]
pub struct BalancedTree<T> {
    tree: OrderedTree<T, Color>,
}

impl<T> Default for BalancedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for BalancedTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BalancedTree")
            .field("size", &self.tree.len())
            .field("root", &self.tree.root())
            .finish()
    }
}

impl<T> BalancedTree<T> {
    /// Generate a new, empty `BalancedTree`.
    pub fn new() -> Self {
        Self {
            tree: OrderedTree::new(),
        }
    }

    /// Adds a payload or a [`Node`] as a red leaf, then rebalances. Returns the handle of the
    /// new node.
    ///
    /// # Examples
    ///
    /// ```
    /// use weighted_tree::{BalancedTree, Color};
    ///
    /// let mut tree: BalancedTree<i64> = BalancedTree::new();
    /// let ten = tree.add(10);
    /// let five = tree.add(5);
    ///
    /// assert_eq!(tree.get(ten).map(|n| n.color()), Some(Color::Black));
    /// assert_eq!(tree.get(five).map(|n| n.color()), Some(Color::Red));
    /// ```
    pub fn add(&mut self, node: impl Into<Node<T, Color>>) -> NodeId {
        let mut node = node.into();
        node.color = Color::Red;
        let id = self.tree.add(node);
        self.fixup(id);

        if cfg!(debug_assertions) {
            let root = self.tree.root().expect("Just added a node");
            assert_eq!(root.color(), Color::Black);
        }

        id
    }

    /// Restores the red-black rules around `id` after it was made red, walking up while it and
    /// its parent are both red. The root always ends up black.
    ///
    /// Each step looks at the uncle, the grandparent's child on the side away from the parent.
    /// A red uncle means recolouring and moving up to the grandparent. A black or missing uncle
    /// means rotating: an inner grandchild first straightens the path by rotating the parent, then
    /// the grandparent rotates towards the uncle and trades colours with the raised parent, which
    /// ends the walk.
    ///
    /// Returns [`TreeError::StaleNode`] without touching the tree if `id` isn't one of its nodes.
    pub fn balance(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.tree.contains(id) {
            return Err(TreeError::StaleNode(id));
        }
        self.fixup(id);
        Ok(())
    }

    /// The walk behind [`balance`][Self::balance]. `id` must still have a slot, though it may
    /// already be unlinked.
    fn fixup(&mut self, mut id: NodeId) {
        while self.tree.root_id() != Some(id) {
            let Some(parent) = self.tree.link(id).parent else {
                break;
            };
            if !(self.red(id) && self.red(parent)) {
                break;
            }
            let Some(grandparent) = self.tree.link(parent).parent else {
                break;
            };

            let uncle_side = if self.tree.link(grandparent).left == Some(parent) {
                Direction::Right
            } else {
                Direction::Left
            };
            let uncle = self.tree.link(grandparent).child(uncle_side);

            match uncle.filter(|&uncle| self.red(uncle)) {
                Some(uncle) => {
                    trace!("red uncle {uncle}: recolouring below {grandparent}");
                    self.paint(parent, Color::Black);
                    self.paint(uncle, Color::Black);
                    self.paint(grandparent, Color::Red);
                    id = grandparent;
                }
                None => {
                    let mut parent = parent;
                    if self.tree.link(parent).child(uncle_side) == Some(id) {
                        trace!("{id} is an inner grandchild: straightening");
                        self.tree
                            .rotate(parent, uncle_side.opposite())
                            .expect("An inner grandchild is its parent's pivot");
                        parent = id;
                    }
                    trace!("rotating {grandparent} towards its {uncle_side} side");
                    self.tree
                        .rotate(grandparent, uncle_side)
                        .expect("The parent is its grandparent's pivot");
                    self.swap_colors(parent, grandparent);
                    id = parent;
                }
            }
        }

        if let Some(root) = self.tree.root_id() {
            self.paint(root, Color::Black);
        }
    }

    /// Deletes a node, given by handle or by weight, and returns it. Removal is the same as
    /// [`OrderedTree::delete`]; the insertion fixup then runs from the unlinked node, whose
    /// parent link still names where it used to hang. See the [module docs](self) for what
    /// that does and doesn't repair.
    pub fn delete(&mut self, target: impl Into<Target>) -> Option<Node<T, Color>> {
        let id = self.tree.detach(target.into())?;
        self.fixup(id);
        Some(self.tree.release(id))
    }

    /// Checks the tree against a subset of the red-black rules: no red node has a red child,
    /// no weight in the root's left subtree is above the root's and no weight in its right subtree
    /// is below it. Equal weights may sit on either side since rotations move them across the
    /// root. Black-heights and ordering below the root's children are not checked, so a `true`
    /// here doesn't prove the tree valid.
    pub fn validate(&self) -> bool {
        let Some(root) = self.tree.root() else {
            return true;
        };

        let red_clash = self.tree.bfs(None).any(|node| {
            node.is_red()
                && [node.left(), node.right()]
                    .into_iter()
                    .flatten()
                    .any(|child| child.is_red())
        });
        if red_clash {
            return false;
        }

        let pivot = root.weight();
        let left_ordered = root.left().map_or(true, |left| {
            self.tree.bfs(Some(left.id())).all(|n| n.weight() <= pivot)
        });
        let right_ordered = root.right().map_or(true, |right| {
            self.tree.bfs(Some(right.id())).all(|n| n.weight() >= pivot)
        });
        left_ordered && right_ordered
    }

    /// Swaps the colours of two live nodes.
    fn swap_colors(&mut self, a: NodeId, b: NodeId) {
        let a_color = self.tree.link(a).color;
        let b_color = self.tree.link(b).color;
        self.paint(a, b_color);
        self.paint(b, a_color);
    }

    /// Swaps the colours of two nodes, or reports the first handle that isn't part of the tree
    /// and leaves both colours alone.
    pub fn try_swap_colors(&mut self, a: NodeId, b: NodeId) -> Result<(), TreeError> {
        for id in [a, b] {
            if !self.tree.contains(id) {
                return Err(TreeError::StaleNode(id));
            }
        }
        self.swap_colors(a, b);
        Ok(())
    }

    /// The ordered tree underneath, for read-only access.
    pub fn as_ordered(&self) -> &OrderedTree<T, Color> {
        &self.tree
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The root node.
    pub fn root(&self) -> Option<NodeRef<'_, T, Color>> {
        self.tree.root()
    }

    /// The node behind `id`, if it is still part of this tree.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, T, Color>> {
        self.tree.get(id)
    }

    /// See [`OrderedTree::find_closest_weight`].
    pub fn find_closest_weight(
        &self,
        weight: i64,
        start: Option<NodeId>,
    ) -> Option<NodeRef<'_, T, Color>> {
        self.tree.find_closest_weight(weight, start)
    }

    /// See [`OrderedTree::find_weight`].
    pub fn find_weight(
        &self,
        weight: i64,
        start: Option<NodeId>,
    ) -> Option<NodeRef<'_, T, Color>> {
        self.tree.find_weight(weight, start)
    }

    /// Whether any node weighs exactly `weight`.
    pub fn has_weight(&self, weight: i64) -> bool {
        self.tree.has_weight(weight)
    }

    /// See [`OrderedTree::get_max`].
    pub fn get_max(&self, start: Option<NodeId>) -> Option<NodeRef<'_, T, Color>> {
        self.tree.get_max(start)
    }

    /// See [`OrderedTree::get_min`].
    pub fn get_min(&self, start: Option<NodeId>) -> Option<NodeRef<'_, T, Color>> {
        self.tree.get_min(start)
    }

    /// See [`OrderedTree::find_value`].
    pub fn find_value(&self, value: &T, start: Option<NodeId>) -> Option<NodeRef<'_, T, Color>>
    where
        T: PartialEq,
    {
        self.tree.find_value(value, start)
    }

    /// Whether any node holds `value`.
    pub fn has_value(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.tree.has_value(value)
    }

    /// See [`OrderedTree::dfs`].
    pub fn dfs(&self, start: Option<NodeId>) -> Traverse<'_, T, Color> {
        self.tree.dfs(start)
    }

    /// See [`OrderedTree::bfs`].
    pub fn bfs(&self, start: Option<NodeId>) -> Traverse<'_, T, Color> {
        self.tree.bfs(start)
    }

    /// Depth-first traversal of the whole tree.
    pub fn iter(&self) -> Traverse<'_, T, Color> {
        self.tree.iter()
    }

    /// The payloads of the tree, in depth-first order.
    pub fn values(&self) -> Values<'_, T, Color> {
        self.tree.values()
    }

    /// Calls `f` on every node, in depth-first order.
    pub fn for_each(&self, f: impl FnMut(NodeRef<'_, T, Color>)) {
        self.tree.for_each(f)
    }

    /// Calls `f` on every node, in depth-first order, stopping at the first error and returning
    /// it.
    pub fn try_for_each<E>(
        &self,
        f: impl FnMut(NodeRef<'_, T, Color>) -> Result<(), E>,
    ) -> Result<(), E> {
        self.tree.try_for_each(f)
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    fn red(&self, id: NodeId) -> bool {
        self.tree.link(id).color == Color::Red
    }

    fn paint(&mut self, id: NodeId, color: Color) {
        self.tree.link_mut(id).color = color;
    }
}

impl<T, V> FromIterator<V> for BalancedTree<T>
where
    V: Into<Node<T, Color>>,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T, V> Extend<V> for BalancedTree<T>
where
    V: Into<Node<T, Color>>,
{
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a BalancedTree<T> {
    type Item = NodeRef<'a, T, Color>;
    type IntoIter = Traverse<'a, T, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::invariants::{is_ordered, is_red_black, weights};

    fn tree_of(weights: &[i64]) -> BalancedTree<i64> {
        let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Trace, Default::default());
        let mut tree = BalancedTree::new();
        for &weight in weights {
            tree.add(weight);
        }
        tree
    }

    fn color_of(tree: &BalancedTree<i64>, weight: i64) -> Option<Color> {
        tree.find_weight(weight, None).map(|n| n.color())
    }

    #[test]
    fn single_node_is_black() {
        let tree = tree_of(&[1]);

        assert_eq!(color_of(&tree, 1), Some(Color::Black));
        assert!(tree.validate());
    }

    #[test]
    fn red_uncle_recolours() {
        let tree = tree_of(&[10, 5, 15, 3]);

        assert_eq!(tree.root().map(|n| n.weight()), Some(10));
        assert_eq!(color_of(&tree, 10), Some(Color::Black));
        assert_eq!(color_of(&tree, 5), Some(Color::Black));
        assert_eq!(color_of(&tree, 15), Some(Color::Black));
        assert_eq!(color_of(&tree, 3), Some(Color::Red));
        assert!(is_red_black(&tree));
    }

    #[test]
    fn outer_grandchild_rotates_once() {
        let tree = tree_of(&[3, 2, 1]);
        let root = tree.root().unwrap();

        assert_eq!(root.weight(), 2);
        assert_eq!(root.color(), Color::Black);
        assert_eq!(root.left().map(|n| (n.weight(), n.color())), Some((1, Color::Red)));
        assert_eq!(root.right().map(|n| (n.weight(), n.color())), Some((3, Color::Red)));
    }

    #[test]
    fn inner_grandchild_straightens_first() {
        let tree = tree_of(&[3, 1, 2]);
        let root = tree.root().unwrap();

        assert_eq!(root.weight(), 2);
        assert_eq!(root.color(), Color::Black);
        assert_eq!(root.left().map(|n| n.weight()), Some(1));
        assert_eq!(root.right().map(|n| n.weight()), Some(3));
        assert!(root.left().unwrap().is_red());
        assert!(root.right().unwrap().is_red());
    }

    #[test]
    fn right_leaning_mirror() {
        let tree = tree_of(&[1, 3, 2]);
        let root = tree.root().unwrap();

        assert_eq!(root.weight(), 2);
        assert_eq!(weights(&tree), vec![1, 2, 3]);
        assert!(is_red_black(&tree));
    }

    #[test]
    fn always_adding_right() {
        let mut tree = tree_of(&[]);
        for weight in 1..=64 {
            tree.add(weight);
            assert!(is_red_black(&tree), "invalid after adding {weight}");
            assert!(tree.validate());
        }
        assert_eq!(tree.len(), 64);
        assert_eq!(weights(&tree), (1..=64).collect::<Vec<_>>());
    }

    #[test]
    fn always_adding_left() {
        let mut tree = tree_of(&[]);
        for weight in (1..=64).rev() {
            tree.add(weight);
            assert!(is_red_black(&tree), "invalid after adding {weight}");
        }
        assert_eq!(weights(&tree), (1..=64).collect::<Vec<_>>());
    }

    #[test]
    fn scenario_delete_two_children() {
        let mut tree = tree_of(&[10, 5, 15, 3, 7, 12, 18]);

        let root = tree.root().unwrap();
        assert_eq!(root.weight(), 10);
        assert_eq!(root.color(), Color::Black);
        assert_eq!(tree.get_max(None).map(|n| n.weight()), Some(18));
        assert_eq!(tree.get_min(None).map(|n| n.weight()), Some(3));

        let deleted = tree.delete(5).unwrap();
        assert_eq!(deleted.weight(), 5);
        assert_eq!(tree.len(), 6);
        assert_eq!(weights(&tree), vec![3, 7, 10, 12, 15, 18]);
        assert!(is_ordered(tree.as_ordered(), true));
        assert!(tree.validate());
    }

    #[test]
    fn delete_everything() {
        let mut tree = tree_of(&[10, 5, 15, 3, 7, 12, 18]);

        for weight in [10, 3, 18, 7, 15, 12, 5] {
            assert_eq!(tree.delete(weight).map(|n| n.weight()), Some(weight));
            assert!(is_ordered(tree.as_ordered(), true));
        }
        assert!(tree.is_empty());
        assert!(tree.delete(10).is_none());
        assert!(tree.validate());
    }

    #[test]
    fn delete_keeps_root_black() {
        let mut tree = tree_of(&[2, 1, 3, 4]);

        tree.delete(2);
        assert_eq!(tree.root().map(|n| n.color()), Some(Color::Black));
        assert_eq!(weights(&tree), vec![1, 3, 4]);
    }

    #[test]
    fn validate_catches_red_red() {
        let mut tree = tree_of(&[10, 5, 15, 3]);
        let five = tree.find_weight(5, None).unwrap().id();
        let three = tree.find_weight(3, None).unwrap().id();

        // Paint 5 red over its red child.
        tree.swap_colors(five, three);
        tree.paint(three, Color::Red);
        assert!(!tree.validate());
        assert!(!is_red_black(&tree));
    }

    #[test]
    fn validate_catches_misplaced_weights() {
        let mut tree = tree_of(&[10, 5, 15]);
        let five = tree.find_weight(5, None).unwrap().id();

        tree.tree.link_mut(five).weight = 11;
        assert!(!tree.validate());
    }

    #[test]
    fn validate_accepts_rotated_duplicates() {
        let tree = tree_of(&[0, -32, -32]);

        let root = tree.root().unwrap();
        assert_eq!(root.weight(), -32);
        assert_eq!(root.left().map(|n| n.weight()), Some(-32));
        assert_eq!(root.right().map(|n| n.weight()), Some(0));
        assert!(is_red_black(&tree));
        assert!(tree.validate());
    }

    #[test]
    fn validate_accepts_repeated_weights() {
        for weights in [[0, 0, 0], [13, 13, 13], [-29, -29, 0]] {
            let tree = tree_of(&weights);
            assert!(is_red_black(&tree), "{weights:?}");
            assert!(tree.validate(), "{weights:?}");
        }
    }

    #[test]
    fn balance_rejects_stale_handles() {
        let mut tree = tree_of(&[10, 5, 15, 3, 7]);
        let seven = tree.find_weight(7, None).unwrap().id();
        let ten = tree.root().unwrap().id();
        tree.delete(seven);

        assert_eq!(tree.balance(seven), Err(TreeError::StaleNode(seven)));
        assert_eq!(weights(&tree), vec![3, 5, 10, 15]);
        assert_eq!(tree.balance(ten), Ok(()));
        assert!(tree.validate());
    }

    #[test]
    fn try_swap_colors_rejects_stale_handles() {
        let mut tree = tree_of(&[10, 5, 15]);
        let ten = tree.root().unwrap().id();
        let five = tree.find_weight(5, None).unwrap().id();
        tree.delete(five);

        assert_eq!(tree.try_swap_colors(ten, five), Err(TreeError::StaleNode(five)));
        assert_eq!(tree.root().map(|n| n.color()), Some(Color::Black));
    }

    #[test]
    fn payloads_without_weight() {
        let mut tree: BalancedTree<&str> = BalancedTree::new();
        for word in ["a", "b", "c", "d", "e"] {
            tree.add(word);
        }

        assert_eq!(tree.len(), 5);
        assert!(tree.has_value(&"c"));
        assert!(is_red_black(&tree));
        assert_eq!(tree.get_min(None).map(|n| n.weight()), Some(0));
    }
}
