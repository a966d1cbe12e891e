//! A plain ordered tree. Nodes are placed by weight and never rebalanced, so inserting weights
//! in sorted order degrades it into a list.
//!
//! # Examples
//!
//! ```
//! use weighted_tree::OrderedTree;
//!
//! let mut tree: OrderedTree<i64> = [10, 5, 15, 3, 7].into_iter().collect();
//! assert_eq!(tree.len(), 5);
//!
//! // An exact lookup misses, the closest lookup stops where `6` would be attached.
//! assert!(tree.find_weight(6, None).is_none());
//! assert_eq!(tree.find_closest_weight(6, None).map(|n| n.weight()), Some(7));
//!
//! // Deleting hands the node back.
//! let deleted = tree.delete(5).unwrap();
//! assert_eq!(deleted.into_payload(), 5);
//! assert!(!tree.has_value(&5));
//! assert_eq!(tree.len(), 4);
//! ```

use std::fmt;
use std::mem;
use std::ops::Index;

use log::{debug, trace};

use crate::error::TreeError;
use crate::node::{Direction, Node, NodeId, NodeRef};
use crate::traverse::{Order, Traverse, Values};

/// What [`OrderedTree::delete`] should remove: a node by handle, or the first node found with a
/// weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// A node handle.
    Node(NodeId),
    /// A weight, resolved through [`OrderedTree::find_weight`].
    Weight(i64),
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<i64> for Target {
    fn from(weight: i64) -> Self {
        Self::Weight(weight)
    }
}

#[derive(Clone)]
struct Slot<T, C> {
    generation: u32,
    node: Option<Node<T, C>>,
}

/// A binary tree ordering its nodes by weight. A node's left subtree holds smaller weights and
/// its right subtree holds greater or equal ones. Deleting duplicated weights may leave an equal
/// weight on the left, but an in-order walk always sees non-decreasing weights.
///
/// Nodes live in an arena owned by the tree and refer to each other through [`NodeId`]s.
#[derive(Clone)]
pub struct OrderedTree<T, C = ()> {
    slots: Vec<Slot<T, C>>,
    free: Vec<usize>,
    root: Option<NodeId>,
    size: usize,
}

impl<T, C> Default for OrderedTree<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> fmt::Debug for OrderedTree<T, C>
where
    T: fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedTree")
            .field("size", &self.size)
            .field("root", &self.root())
            .finish()
    }
}

impl<T, C> OrderedTree<T, C> {
    /// Generate a new, empty `OrderedTree`.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            size: 0,
        }
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The root node.
    pub fn root(&self) -> Option<NodeRef<'_, T, C>> {
        self.root.map(|id| NodeRef::new(self, id))
    }

    /// The node behind `id`, if it is still part of this tree.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, T, C>> {
        self.contains(id).then(|| NodeRef::new(self, id))
    }

    /// Whether `id` names a node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Adds a payload or a [`Node`] to the tree and returns its handle. This always succeeds.
    ///
    /// The new node becomes a leaf: the search starts at the closest weight and keeps going right
    /// through equal weights, so earlier nodes of the same weight are never displaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use weighted_tree::{Node, OrderedTree};
    ///
    /// let mut tree: OrderedTree<char> = OrderedTree::new();
    /// let root = tree.add(Node::with_weight('m', 13));
    /// let a = tree.add(Node::with_weight('a', 1));
    /// let z = tree.add(Node::with_weight('z', 26));
    ///
    /// let root = tree.get(root).unwrap();
    /// assert_eq!(root.left().map(|n| n.id()), Some(a));
    /// assert_eq!(root.right().map(|n| n.id()), Some(z));
    /// ```
    pub fn add(&mut self, node: impl Into<Node<T, C>>) -> NodeId {
        let mut node = node.into();
        node.parent = None;
        node.left = None;
        node.right = None;
        let weight = node.weight;

        let Some(root) = self.root else {
            let id = self.alloc(node);
            self.root = Some(id);
            self.size += 1;
            return id;
        };

        let mut closest = self.closest(weight, root);
        let side = loop {
            let side = if weight >= self.link(closest).weight {
                Direction::Right
            } else {
                Direction::Left
            };
            match self.link(closest).child(side) {
                Some(occupied) => closest = self.closest(weight, occupied),
                None => break side,
            }
        };

        node.parent = Some(closest);
        let id = self.alloc(node);
        *self.link_mut(closest).child_mut(side) = Some(id);
        self.size += 1;

        if cfg!(debug_assertions) {
            let parent = self.link(closest);
            match side {
                Direction::Left => assert!(weight < parent.weight),
                Direction::Right => assert!(weight >= parent.weight),
            }
        }

        id
    }

    /// Walks from `start` (the root when `None`) towards `weight` and returns the node it ends
    /// on: a node with that exact weight, or the node the weight would be attached to. `None`
    /// only when the tree is empty or `start` is stale.
    ///
    /// # Examples
    ///
    /// ```
    /// use weighted_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<i64> = [10, 5, 15, 3, 7].into_iter().collect();
    ///
    /// assert_eq!(tree.find_closest_weight(6, None).map(|n| n.weight()), Some(7));
    /// assert_eq!(tree.find_closest_weight(15, None).map(|n| n.weight()), Some(15));
    /// assert_eq!(tree.find_closest_weight(100, None).map(|n| n.weight()), Some(15));
    /// ```
    pub fn find_closest_weight(
        &self,
        weight: i64,
        start: Option<NodeId>,
    ) -> Option<NodeRef<'_, T, C>> {
        let start = self.start(start)?;
        Some(NodeRef::new(self, self.closest(weight, start)))
    }

    /// Like [`find_closest_weight`][Self::find_closest_weight] but only returns a node with
    /// exactly `weight`.
    pub fn find_weight(&self, weight: i64, start: Option<NodeId>) -> Option<NodeRef<'_, T, C>> {
        let start = self.start(start)?;
        self.exact(weight, start).map(|id| NodeRef::new(self, id))
    }

    /// Whether any node weighs exactly `weight`.
    pub fn has_weight(&self, weight: i64) -> bool {
        self.find_weight(weight, None).is_some()
    }

    /// The rightmost node below `start` (the root when `None`).
    pub fn get_max(&self, start: Option<NodeId>) -> Option<NodeRef<'_, T, C>> {
        let start = self.start(start)?;
        Some(NodeRef::new(self, self.extreme(start, Direction::Right)))
    }

    /// The leftmost node below `start` (the root when `None`).
    pub fn get_min(&self, start: Option<NodeId>) -> Option<NodeRef<'_, T, C>> {
        let start = self.start(start)?;
        Some(NodeRef::new(self, self.extreme(start, Direction::Left)))
    }

    /// The first node, in depth-first order from `start`, whose payload equals `value`.
    pub fn find_value(&self, value: &T, start: Option<NodeId>) -> Option<NodeRef<'_, T, C>>
    where
        T: PartialEq,
    {
        self.dfs(start).find(|node| node.payload() == value)
    }

    /// Whether any node holds `value`.
    pub fn has_value(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.find_value(value, None).is_some()
    }

    /// Deletes a node, given by handle or by weight, and returns it. Returns `None` without
    /// touching the tree when nothing matches.
    ///
    /// A node with two children isn't unlinked itself: it trades payload and weight with its
    /// predecessor (the heaviest node of its left subtree) which is then unlinked instead. The
    /// returned node therefore always carries the payload and weight that were deleted, while
    /// the handle of the targeted node stays valid and now names the predecessor's payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use weighted_tree::OrderedTree;
    ///
    /// let mut tree: OrderedTree<i64> = [10, 5, 15, 3, 7].into_iter().collect();
    /// let five = tree.find_weight(5, None).unwrap().id();
    ///
    /// assert_eq!(tree.delete(five).map(|n| n.weight()), Some(5));
    /// // The node that held `5` now holds its predecessor.
    /// assert_eq!(tree.get(five).map(|n| n.weight()), Some(3));
    /// assert!(tree.delete(5).is_none());
    /// ```
    pub fn delete(&mut self, target: impl Into<Target>) -> Option<Node<T, C>> {
        let id = self.detach(target.into())?;
        Some(self.release(id))
    }

    /// Rotates `id` in `direction`: the child on the other side takes its place and `id` becomes
    /// that child's child. The in-order sequence of weights is unchanged.
    ///
    /// # Diagram
    ///
    /// Rotating `node` to the right:
    ///
    /// ```text
    ///    Option<parent>            Option<parent>
    ///      /                         /
    ///    node                      pivot
    ///    /   \                     /   \
    ///  pivot  z     rotate ->     x    node
    ///  /   \                           /  \
    /// x     y                         y    z
    /// ```
    pub fn rotate(&mut self, id: NodeId, direction: Direction) -> Result<(), TreeError> {
        let node = self.node(id).ok_or(TreeError::StaleNode(id))?;
        let pivot = node
            .child(direction.opposite())
            .ok_or(TreeError::MissingPivot { node: id, direction })?;
        let parent = node.parent;
        trace!("rotating {id} {direction}, raising {pivot}");

        let inner = self.link(pivot).child(direction);
        *self.link_mut(id).child_mut(direction.opposite()) = inner;
        if let Some(inner) = inner {
            self.link_mut(inner).parent = Some(id);
        }

        self.link_mut(pivot).parent = parent;
        self.replace_child(parent, id, Some(pivot));

        *self.link_mut(pivot).child_mut(direction) = Some(id);
        self.link_mut(id).parent = Some(pivot);

        Ok(())
    }

    /// [`rotate`][Self::rotate] to the left, raising the right child.
    pub fn rotate_left(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.rotate(id, Direction::Left)
    }

    /// [`rotate`][Self::rotate] to the right, raising the left child.
    pub fn rotate_right(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.rotate(id, Direction::Right)
    }

    /// Depth-first traversal from `start` (the root when `None`): a node is visited, then its
    /// left subtree, then its right subtree. This is not sorted order.
    pub fn dfs(&self, start: Option<NodeId>) -> Traverse<'_, T, C> {
        Traverse::new(self, self.start(start), Order::DepthFirst)
    }

    /// Breadth-first traversal from `start` (the root when `None`). Each level is visited right
    /// to left.
    pub fn bfs(&self, start: Option<NodeId>) -> Traverse<'_, T, C> {
        Traverse::new(self, self.start(start), Order::BreadthFirst)
    }

    /// Depth-first traversal of the whole tree.
    pub fn iter(&self) -> Traverse<'_, T, C> {
        self.dfs(None)
    }

    /// The payloads of the tree, in depth-first order.
    pub fn values(&self) -> Values<'_, T, C> {
        Values::new(self.iter())
    }

    /// Calls `f` on every node, in depth-first order.
    pub fn for_each(&self, f: impl FnMut(NodeRef<'_, T, C>)) {
        self.iter().for_each(f)
    }

    /// Calls `f` on every node, in depth-first order, stopping at the first error and returning
    /// it.
    pub fn try_for_each<E>(
        &self,
        f: impl FnMut(NodeRef<'_, T, C>) -> Result<(), E>,
    ) -> Result<(), E> {
        self.iter().try_for_each(f)
    }

    /// Removes every node. Every handle handed out so far goes stale.
    pub fn clear(&mut self) {
        debug!("clearing a tree of {} nodes", self.size);
        // Bump generations rather than dropping the slots so old handles can't alias new nodes.
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
            }
        }
        self.root = None;
        self.size = 0;
    }

    /// Unlinks the targeted node without releasing it, so a caller can still inspect its stale
    /// `parent` link. Two-child nodes trade contents with their predecessor first and the
    /// predecessor is unlinked instead. Returns the handle of the unlinked node.
    pub(crate) fn detach(&mut self, target: Target) -> Option<NodeId> {
        let id = match target {
            Target::Node(id) => self.contains(id).then_some(id)?,
            Target::Weight(weight) => self.exact(weight, self.root?)?,
        };

        let node = self.link(id);
        match (node.left, node.right) {
            (Some(left), Some(_)) => {
                let predecessor = self.extreme(left, Direction::Right);
                trace!("deleting {id} through its predecessor {predecessor}");
                self.swap_contents(id, predecessor);
                self.unlink(predecessor);
                Some(predecessor)
            }
            _ => {
                self.unlink(id);
                Some(id)
            }
        }
    }

    /// Takes an unlinked node out of the arena.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<T, C> {
        let slot = &mut self.slots[id.index];
        let mut node = slot.node.take().expect("Released nodes are live");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        node.parent = None;
        node
    }

    pub(crate) fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// The node behind a handle the tree itself handed out and still links to.
    pub(crate) fn link(&self, id: NodeId) -> &Node<T, C> {
        self.node(id).expect("Linked nodes are live")
    }

    pub(crate) fn link_mut(&mut self, id: NodeId) -> &mut Node<T, C> {
        self.node_mut(id).expect("Linked nodes are live")
    }

    fn node(&self, id: NodeId) -> Option<&Node<T, C>> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T, C>> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn alloc(&mut self, node: Node<T, C>) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Resolves an optional starting point, defaulting to the root.
    fn start(&self, start: Option<NodeId>) -> Option<NodeId> {
        match start {
            Some(id) => self.contains(id).then_some(id),
            None => self.root,
        }
    }

    fn closest(&self, weight: i64, start: NodeId) -> NodeId {
        let mut id = start;
        loop {
            let node = self.link(id);
            let next = if weight > node.weight {
                node.right
            } else if weight < node.weight {
                node.left
            } else {
                None
            };
            match next {
                Some(next) => id = next,
                None => return id,
            }
        }
    }

    fn exact(&self, weight: i64, start: NodeId) -> Option<NodeId> {
        let id = self.closest(weight, start);
        (self.link(id).weight == weight).then_some(id)
    }

    fn extreme(&self, start: NodeId, side: Direction) -> NodeId {
        let mut id = start;
        while let Some(next) = self.link(id).child(side) {
            id = next;
        }
        id
    }

    fn swap_contents(&mut self, a: NodeId, b: NodeId) {
        let mut moved = self.slots[b.index]
            .node
            .take()
            .expect("Swapped nodes are live");
        let target = self.link_mut(a);
        mem::swap(&mut target.payload, &mut moved.payload);
        mem::swap(&mut target.weight, &mut moved.weight);
        self.slots[b.index].node = Some(moved);
    }

    /// Unlinks a node with at most one child, splicing the child into its place. The node keeps
    /// its `parent` link.
    fn unlink(&mut self, id: NodeId) {
        let node = self.link(id);
        assert!(
            node.left.is_none() || node.right.is_none(),
            "Only nodes with at most one child can be unlinked"
        );
        let parent = node.parent;
        let child = node.left.or(node.right);
        trace!(
            "unlinking {id} (weight {}), {} in its place",
            node.weight,
            if child.is_some() { "splicing its child" } else { "leaving nothing" }
        );

        if let Some(child) = child {
            self.link_mut(child).parent = parent;
        }
        self.replace_child(parent, id, child);

        let node = self.link_mut(id);
        node.left = None;
        node.right = None;
        self.size -= 1;
    }

    /// Points whichever link of `parent` held `old` at `new`. No parent means `old` was the root.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        let Some(parent) = parent else {
            self.root = new;
            return;
        };
        let parent = self.link_mut(parent);
        if parent.left == Some(old) {
            parent.left = new;
        } else {
            assert_eq!(parent.right, Some(old), "Parent links back to its child");
            parent.right = new;
        }
    }
}

impl<T, C, V> FromIterator<V> for OrderedTree<T, C>
where
    V: Into<Node<T, C>>,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T, C, V> Extend<V> for OrderedTree<T, C>
where
    V: Into<Node<T, C>>,
{
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T, C> Index<NodeId> for OrderedTree<T, C> {
    type Output = Node<T, C>;

    /// # Panics
    ///
    /// When `id` is not part of this tree.
    fn index(&self, id: NodeId) -> &Self::Output {
        self.node(id).expect("NodeId is not part of this tree")
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedTree<T, C> {
    type Item = NodeRef<'a, T, C>;
    type IntoIter = Traverse<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
