//! Greedy embedding: largest-CPU-first node placement, shortest-path link routing.

use vne_network::{Embedding, NodeId, PathAllocator, PathSearch, SubstrateNetwork, VirtualNetworkRequest};

use crate::embedding_algorithm::{EmbeddingAlgorithm, EmbeddingFailure};

/// Places each virtual node on the unused substrate node with the most available CPU that can
/// host it, then routes every virtual link along its shortest substrate path.
///
/// There is no backtracking: the first unplaceable node or unroutable link fails the request.
pub struct Greedy;

impl Greedy {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for Greedy {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingAlgorithm for Greedy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn embed(
        &self,
        request: &VirtualNetworkRequest,
        substrate: &SubstrateNetwork,
    ) -> Result<Embedding, EmbeddingFailure> {
        let mut hosts: Vec<NodeId> = substrate.nodes().map(|n| n.id).collect();
        hosts.sort_by(|a, b| substrate.node_available(*b).cmp(&substrate.node_available(*a)));

        let mut embedding = Embedding::new();
        for node in request.nodes() {
            let host = hosts
                .iter()
                .copied()
                .find(|host| !embedding.hosts(*host) && substrate.node_available(*host) >= node.cpu_req)
                .ok_or(EmbeddingFailure::InfeasibleRequest { node: node.id })?;
            embedding.map_node(node.id, host);
        }

        let mut allocator = PathAllocator::new(substrate, PathSearch::Shortest);
        for link in request.links() {
            let (a, b) = link.endpoints;
            let path = allocator
                .route(embedding.node_mapping[&a], embedding.node_mapping[&b], link.bandwidth_req)
                .ok_or(EmbeddingFailure::NoPath { link: link.id() })?;
            embedding.map_link(a, b, path);
        }
        Ok(embedding)
    }
}
