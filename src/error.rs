use thiserror::Error;

use crate::NodeId;

/// Errors from explicitly requested structural changes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuadtreeError {
    #[error("node {0} is already subdivided")]
    AlreadySubdivided(NodeId),

    #[error("node {0} is too small to split into four quadrants")]
    Indivisible(NodeId),

    #[error("no node with id {0} in this tree")]
    UnknownNode(NodeId),
}
