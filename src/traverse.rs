//! Lazy traversals. Each one owns its own list of pending nodes and only ever reads the tree, so
//! it can be dropped half way or restarted by asking the tree for a new one.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::node::{NodeId, NodeRef};
use crate::ordered::OrderedTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Order {
    /// Pending nodes form a stack.
    DepthFirst,
    /// Pending nodes form a queue.
    BreadthFirst,
}

/// A depth-first or breadth-first walk over a tree, yielding every node below its start exactly
/// once. Created by [`OrderedTree::dfs`] and [`OrderedTree::bfs`].
///
/// Visiting a node queues its right child, then its left child.
pub struct Traverse<'a, T, C = ()> {
    tree: &'a OrderedTree<T, C>,
    pending: VecDeque<NodeId>,
    order: Order,
}

impl<T, C> Clone for Traverse<'_, T, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            pending: self.pending.clone(),
            order: self.order,
        }
    }
}

impl<'a, T, C> Traverse<'a, T, C> {
    pub(crate) fn new(tree: &'a OrderedTree<T, C>, start: Option<NodeId>, order: Order) -> Self {
        Self {
            tree,
            pending: start.into_iter().collect(),
            order,
        }
    }
}

impl<'a, T, C> Iterator for Traverse<'a, T, C> {
    type Item = NodeRef<'a, T, C>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = match self.order {
            Order::DepthFirst => self.pending.pop_back(),
            Order::BreadthFirst => self.pending.pop_front(),
        }?;

        let node = self.tree.link(id);
        self.pending.extend(node.right);
        self.pending.extend(node.left);
        Some(NodeRef::new(self.tree, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.tree.len()))
    }
}

impl<T, C> FusedIterator for Traverse<'_, T, C> {}

/// The payloads of a tree in depth-first order. Created by [`OrderedTree::values`].
pub struct Values<'a, T, C = ()> {
    inner: Traverse<'a, T, C>,
}

impl<T, C> Clone for Values<'_, T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T, C> Values<'a, T, C> {
    pub(crate) fn new(inner: Traverse<'a, T, C>) -> Self {
        Self { inner }
    }
}

impl<'a, T, C> Iterator for Values<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|node| node.payload())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, C> FusedIterator for Values<'_, T, C> {}
