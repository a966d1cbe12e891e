//! The atomic unit stored by every tree in this crate.
//!
//! A [`Node`] owns its payload and weight. Its links to the rest of the tree are [`NodeId`]
//! handles into the arena of the tree that owns it, so a parent link never keeps anything alive
//! and a node can be moved in and out of a tree without fixing up pointers.
//!
//! # Examples
//!
//! ```
//! use weighted_tree::{Node, OrderedTree};
//!
//! let mut tree: OrderedTree<&str> = OrderedTree::new();
//!
//! // `&str` payloads weigh nothing unless they are given a weight.
//! let id = tree.add(Node::with_weight("ten", 10));
//! tree.add("zero");
//!
//! assert_eq!(tree.get(id).map(|n| n.weight()), Some(10));
//! assert_eq!(tree.get_min(None).map(|n| *n.payload()), Some("zero"));
//! ```

use std::fmt;

use crate::ordered::OrderedTree;

/// Derives the weight of a payload that is added without an explicit one.
///
/// Numeric payloads weigh their own value (floats are truncated, `u64`/`usize` values above
/// `i64::MAX` wrap). Every other type weighs `0`, which is the default of [`Weighted::weight`],
/// so `impl Weighted for MyType {}` is all that is needed to store `MyType`. Payloads that all
/// weigh the same are chained to the right in insertion order.
pub trait Weighted {
    /// The weight this payload is placed by.
    fn weight(&self) -> i64 {
        0
    }
}

macro_rules! weighs_itself {
    ($($t:ty),* $(,)?) => {
        $(
            impl Weighted for $t {
                fn weight(&self) -> i64 {
                    *self as i64
                }
            }
        )*
    };
}

weighs_itself!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Weighted for bool {}
impl Weighted for char {}
impl Weighted for str {}
impl Weighted for String {}
impl Weighted for () {}
impl<T> Weighted for Vec<T> {}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn weight(&self) -> i64 {
        (**self).weight()
    }
}

impl<T: Weighted + ?Sized> Weighted for Box<T> {
    fn weight(&self) -> i64 {
        (**self).weight()
    }
}

/// Handle to a node living in a tree.
///
/// Handles are generational: once a node is deleted its handle stops resolving, even if the slot
/// it lived in is reused by a later insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A side of a node. Doubles as the direction of a rotation: rotating a node to the
/// [`Left`][Direction::Left] moves it down to the left and raises its right child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The left side, holding smaller weights.
    Left,
    /// The right side, holding greater or equal weights.
    Right,
}

impl Direction {
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// A payload, its weight, and the links placing it in a tree.
///
/// `C` is the colour bit of trees that track one (see [`Color`][crate::Color]); plain ordered
/// trees use `()`.
#[derive(Clone)]
pub struct Node<T, C = ()> {
    pub(crate) payload: T,
    pub(crate) weight: i64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) color: C,
}

impl<T, C: Default> Node<T, C> {
    /// Wraps `payload`, weighing it with [`Weighted::weight`].
    pub fn new(payload: T) -> Self
    where
        T: Weighted,
    {
        let weight = payload.weight();
        Self::with_weight(payload, weight)
    }

    /// Wraps `payload` with an explicit weight.
    pub fn with_weight(payload: T, weight: i64) -> Self {
        Self {
            payload,
            weight,
            parent: None,
            left: None,
            right: None,
            color: C::default(),
        }
    }
}

impl<T, C> Node<T, C> {
    /// The stored value.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Mutable access to the stored value. The weight is unaffected.
    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    /// The weight this node is ordered by.
    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// Unwraps the stored value.
    pub fn into_payload(self) -> T {
        self.payload
    }

    pub(crate) fn child(&self, side: Direction) -> Option<NodeId> {
        match side {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub(crate) fn child_mut(&mut self, side: Direction) -> &mut Option<NodeId> {
        match side {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

impl<T: Weighted, C: Default> From<T> for Node<T, C> {
    fn from(payload: T) -> Self {
        Self::new(payload)
    }
}

impl<T, C> fmt::Debug for Node<T, C>
where
    T: fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("weight", &self.weight)
            .field("payload", &self.payload)
            .field("color", &self.color)
            .finish()
    }
}

/// A read-only cursor on a node of a tree, returned by every lookup.
///
/// It borrows the tree, so the tree can't change while the cursor is alive. Keep the
/// [`id`][NodeRef::id] around to refer to the node across mutations.
pub struct NodeRef<'a, T, C = ()> {
    tree: &'a OrderedTree<T, C>,
    id: NodeId,
}

impl<T, C> Clone for NodeRef<'_, T, C> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T, C> Copy for NodeRef<'_, T, C> {}

impl<'a, T, C> NodeRef<'a, T, C> {
    pub(crate) fn new(tree: &'a OrderedTree<T, C>, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub(crate) fn node(&self) -> &'a Node<T, C> {
        self.tree.link(self.id)
    }

    /// The handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The stored value.
    pub fn payload(&self) -> &'a T {
        &self.node().payload
    }

    /// The weight this node is ordered by.
    pub fn weight(&self) -> i64 {
        self.node().weight
    }

    /// The parent of this node, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|id| Self::new(self.tree, id))
    }

    /// The left child.
    pub fn left(&self) -> Option<Self> {
        self.node().left.map(|id| Self::new(self.tree, id))
    }

    /// The right child.
    pub fn right(&self) -> Option<Self> {
        self.node().right.map(|id| Self::new(self.tree, id))
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        let node = self.node();
        node.left.is_none() && node.right.is_none()
    }

    /// Whether this node is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }
}

impl<T, C> fmt::Debug for NodeRef<'_, T, C>
where
    T: fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        f.debug_struct("Node")
            .field("weight", &node.weight)
            .field("payload", &node.payload)
            .field("color", &node.color)
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}
