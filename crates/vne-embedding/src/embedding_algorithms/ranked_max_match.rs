//! Rank-ordered one-to-one matching ("large to large, small to small").

use vne_network::{Embedding, NodeId, PathAllocator, PathSearch, ResourceView, SubstrateNetwork, VirtualNetworkRequest};

use crate::embedding_algorithm::{EmbeddingAlgorithm, EmbeddingFailure};
use crate::noderank::{compute_noderank, NodeRankConfig};

/// Matches virtual nodes in descending rank order to the highest-ranked unused substrate node
/// with enough CPU, then routes every virtual link over the first feasible of its `k` shortest
/// substrate paths.
pub struct RankedMaxMatch {
    k_paths: usize,
    noderank: NodeRankConfig,
}

impl RankedMaxMatch {
    pub fn new(k_paths: usize, noderank: NodeRankConfig) -> Self {
        Self { k_paths, noderank }
    }
}

impl EmbeddingAlgorithm for RankedMaxMatch {
    fn name(&self) -> &'static str {
        "RankedMaxMatch"
    }

    fn embed(
        &self,
        request: &VirtualNetworkRequest,
        substrate: &SubstrateNetwork,
    ) -> Result<Embedding, EmbeddingFailure> {
        let substrate_ranks = compute_noderank(substrate, ResourceView::Available, &self.noderank)
            .ok_or(EmbeddingFailure::UndefinedRank)?;
        let request_ranks = compute_noderank(request, ResourceView::Required, &self.noderank)
            .ok_or(EmbeddingFailure::UndefinedRank)?;
        let hosts: Vec<NodeId> = substrate_ranks.descending();

        let mut embedding = Embedding::new();
        for node in request_ranks.descending() {
            let cpu_req = request.cpu_req(node);
            let host = hosts
                .iter()
                .copied()
                .find(|host| !embedding.hosts(*host) && substrate.node_available(*host) >= cpu_req)
                .ok_or(EmbeddingFailure::InfeasibleRequest { node })?;
            embedding.map_node(node, host);
        }

        let mut allocator = PathAllocator::new(substrate, PathSearch::KShortest(self.k_paths));
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
