use thiserror::Error;

use crate::node::{Direction, NodeId};

/// Errors raised by structural operations on a tree.
///
/// Lookups and deletions don't fail: finding nothing is reported with `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The handle does not name a live node of this tree. The node was deleted, the tree was
    /// cleared, or the handle came from another tree.
    #[error("node {0} is not part of this tree")]
    StaleNode(NodeId),
    /// A rotation needs a child on the side opposite to its direction to raise in its place.
    #[error("cannot rotate node {node} {direction}: it has no {pivot_side} child", pivot_side = .direction.opposite())]
    MissingPivot {
        /// The node that was asked to rotate.
        node: NodeId,
        /// The requested rotation.
        direction: Direction,
    },
}
