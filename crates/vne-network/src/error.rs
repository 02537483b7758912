//! Errors raised while building substrate and request graphs.

use thiserror::Error;

use crate::node::NodeId;

/// Malformed topology input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A node with this id was already added.
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
    /// A link refers to a node that was never added.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    /// The pair of nodes is already connected.
    #[error("link {0} <-> {1} already exists")]
    DuplicateLink(NodeId, NodeId),
    /// Both endpoints of a link are the same node.
    #[error("self-loop on node {0} is not allowed")]
    SelfLoop(NodeId),
    /// The graph consists of more than one connected component.
    #[error("graph is not connected")]
    Disconnected,
    /// Generator parameters that cannot produce a graph.
    #[error("invalid topology parameters: {0}")]
    InvalidParameters(String),
}
