//! This crate stores arbitrary payloads in binary trees ordered by an integer weight, with an
//! optional red-black variant that keeps itself balanced.
//!
//! ## Weighted trees
//!
//! Every [`Node`] carries a payload and a signed weight. Numeric payloads weigh themselves,
//! anything else weighs `0` unless it implements [`Weighted`] or is added with
//! [`Node::with_weight`]. The trees keep one invariant:
//!
//! 1. For every `Node`, all the `Node`s in its left subtree have a smaller weight.
//! 2. For every `Node`, all the `Node`s in its right subtree have a greater or equal weight.
//!
//! Equal weights are added to the right. Deleting a node with two children promotes its
//! predecessor, and rotations move subtrees around, so once a tree holds duplicate weights an
//! equal weight may also end up on the left. An in-order walk is still non-decreasing.
//!
//! Searching for a weight takes `O(height)`. An [`OrderedTree`] never rebalances, so its height
//! depends on the order weights arrive in. A [`BalancedTree`] colours its nodes red or black and
//! rotates them after each insertion so its height stays `O(lg N)`.
//!
//! ## Handles
//!
//! Nodes live in an arena owned by their tree. [`OrderedTree::add`] hands back a [`NodeId`] that
//! can be used for lookups, rotations and deletion; lookups hand back a [`NodeRef`], a cursor that
//! can walk to a node's parent and children.
//!
//! ```
//! use weighted_tree::{BalancedTree, Color};
//!
//! let mut tree: BalancedTree<i64> = [10, 5, 15, 3, 7, 12, 18].into_iter().collect();
//!
//! let root = tree.root().unwrap();
//! assert_eq!((root.weight(), root.color()), (10, Color::Black));
//! assert_eq!(tree.get_max(None).map(|n| n.weight()), Some(18));
//!
//! let deleted = tree.delete(5).unwrap();
//! assert_eq!(deleted.into_payload(), 5);
//! assert_eq!(tree.len(), 6);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod balanced;
mod error;
pub mod node;
pub mod ordered;
pub mod traverse;

pub use balanced::{BalancedTree, Color};
pub use error::TreeError;
pub use node::{Direction, Node, NodeId, NodeRef, Weighted};
pub use ordered::{OrderedTree, Target};
pub use traverse::{Traverse, Values};
