//! Substrate and virtual nodes.

use serde::{Deserialize, Serialize};

/// Node identifier, unique within a single graph.
pub type NodeId = u32;

/// Physical node with finite CPU capacity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubstrateNode {
    /// Node id.
    pub id: NodeId,
    /// Total CPU capacity.
    pub cpu_total: u32,
    /// CPU capacity not consumed by embedded requests.
    pub cpu_available: u32,
}

impl SubstrateNode {
    /// Creates a node with all capacity available.
    pub fn new(id: NodeId, cpu_total: u32) -> Self {
        Self {
            id,
            cpu_total,
            cpu_available: cpu_total,
        }
    }

    /// CPU capacity consumed by embedded requests.
    pub fn cpu_used(&self) -> u32 {
        self.cpu_total - self.cpu_available
    }

    /// Fraction of CPU capacity in use, zero for nodes without capacity.
    pub fn cpu_load(&self) -> f64 {
        if self.cpu_total == 0 {
            return 0.;
        }
        self.cpu_used() as f64 / self.cpu_total as f64
    }
}

/// Node of a virtual network request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualNode {
    /// Node id, unique within the request.
    pub id: NodeId,
    /// Required CPU.
    pub cpu_req: u32,
}
