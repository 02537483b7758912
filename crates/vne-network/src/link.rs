//! Substrate and virtual links.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Index of a substrate link.
pub type LinkId = usize;

/// Key of a virtual link: the unordered endpoint pair stored as `(min, max)`.
pub type VirtualLinkId = (NodeId, NodeId);

/// Builds the normalized key for the undirected link between `a` and `b`.
pub fn link_key(a: NodeId, b: NodeId) -> VirtualLinkId {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Undirected physical link with finite bandwidth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubstrateLink {
    /// Link index inside the substrate.
    pub id: LinkId,
    /// Endpoints in the order the link was added.
    pub endpoints: (NodeId, NodeId),
    /// Total bandwidth.
    pub bandwidth_total: u32,
    /// Bandwidth not consumed by embedded requests.
    pub bandwidth_available: u32,
    /// Administrative cost, informational only.
    pub cost: Option<u32>,
}

impl SubstrateLink {
    /// Creates a link with all bandwidth available.
    pub fn new(id: LinkId, from: NodeId, to: NodeId, bandwidth_total: u32, cost: Option<u32>) -> Self {
        Self {
            id,
            endpoints: (from, to),
            bandwidth_total,
            bandwidth_available: bandwidth_total,
            cost,
        }
    }

    /// Returns the endpoint opposite to `node`.
    pub fn other_end(&self, node: NodeId) -> NodeId {
        if self.endpoints.0 == node {
            self.endpoints.1
        } else {
            self.endpoints.0
        }
    }

    /// Bandwidth consumed by embedded requests.
    pub fn bandwidth_used(&self) -> u32 {
        self.bandwidth_total - self.bandwidth_available
    }

    /// Fraction of bandwidth in use, zero for links without capacity.
    pub fn bandwidth_load(&self) -> f64 {
        if self.bandwidth_total == 0 {
            return 0.;
        }
        self.bandwidth_used() as f64 / self.bandwidth_total as f64
    }
}

/// Undirected link of a virtual network request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualLink {
    /// Endpoints in the order the link was added.
    pub endpoints: (NodeId, NodeId),
    /// Required bandwidth.
    pub bandwidth_req: u32,
}

impl VirtualLink {
    /// Normalized key of this link.
    pub fn id(&self) -> VirtualLinkId {
        link_key(self.endpoints.0, self.endpoints.1)
    }
}
