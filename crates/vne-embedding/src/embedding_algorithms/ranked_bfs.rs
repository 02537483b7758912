//! Rank-guided breadth-first embedding with bounded backtracking.

use std::collections::{BTreeMap, BTreeSet};

use vne_network::paths::hop_distances;
use vne_network::{
    link_key, Embedding, NodeId, Path, PathAllocator, PathSearch, ResourceView, SubstrateNetwork, VirtualLinkId,
    VirtualNetworkRequest,
};

use crate::embedding_algorithm::{EmbeddingAlgorithm, EmbeddingFailure};
use crate::noderank::{compute_noderank, NodeRankConfig, NodeRanks};

/// Visits virtual nodes in breadth-first order from the highest-ranked one and places each on
/// the best-ranked substrate candidate that lies close to the host of its tree parent and can
/// route the links to already placed neighbors.
///
/// The hop limit to the parent's host is relaxed from 1 up to `max_hop`. When a node cannot be
/// placed the search steps back to the previous node and excludes its current host; at most
/// `max_backtrack` such steps are made per request. Stepping back forgets the exclusions of all
/// later nodes, so a candidate may be revisited after another backtrack.
pub struct RankedBfs {
    max_hop: usize,
    max_backtrack: usize,
    noderank: NodeRankConfig,
}

/// Breadth-first visiting order of a request with tree parents.
struct BfsTree {
    order: Vec<NodeId>,
    parents: BTreeMap<NodeId, NodeId>,
}

impl BfsTree {
    /// Builds the tree from the highest-ranked node, each level sorted by descending rank.
    fn build(request: &VirtualNetworkRequest, ranks: &NodeRanks) -> Self {
        let mut order = Vec::new();
        let mut parents = BTreeMap::new();
        let Some(root) = ranks.top() else {
            return Self { order, parents };
        };
        let mut visited = BTreeSet::from([root]);
        let mut level = vec![root];
        while !level.is_empty() {
            ranks.sort_descending(&mut level);
            order.extend(level.iter().copied());
            let mut next_level = Vec::new();
            for &node in &level {
                for neighbor in request.node_neighbors(node) {
                    if visited.insert(neighbor) {
                        parents.insert(neighbor, node);
                        next_level.push(neighbor);
                    }
                }
            }
            level = next_level;
        }
        Self { order, parents }
    }
}

/// Mutable part of one embedding attempt.
struct SearchState<'a> {
    allocator: PathAllocator<'a>,
    embedding: Embedding,
    tried: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl RankedBfs {
    pub fn new(max_hop: usize, max_backtrack: usize, noderank: NodeRankConfig) -> Self {
        Self {
            max_hop,
            max_backtrack,
            noderank,
        }
    }

    /// Substrate nodes able to host each virtual node by CPU and total incident bandwidth,
    /// by descending substrate rank.
    fn candidate_lists(
        &self,
        request: &VirtualNetworkRequest,
        substrate: &SubstrateNetwork,
        ranks: &NodeRanks,
    ) -> BTreeMap<NodeId, Vec<NodeId>> {
        request
            .nodes()
            .map(|node| {
                let bandwidth_req = request.incident_bandwidth_req(node.id);
                let mut candidates: Vec<NodeId> = substrate
                    .nodes()
                    .filter(|host| {
                        host.cpu_available >= node.cpu_req
                            && substrate.incident_bandwidth_available(host.id) >= bandwidth_req
                    })
                    .map(|host| host.id)
                    .collect();
                ranks.sort_descending(&mut candidates);
                (node.id, candidates)
            })
            .collect()
    }

    /// Finds a host for `node` among `candidates` and reserves paths for its links to placed
    /// neighbors.
    fn match_node(
        &self,
        node: NodeId,
        candidates: &[NodeId],
        request: &VirtualNetworkRequest,
        tree: &BfsTree,
        state: &mut SearchState,
    ) -> Option<(NodeId, Vec<(VirtualLinkId, Path)>)> {
        let substrate = state.allocator.substrate();
        let cpu_req = request.cpu_req(node);
        if state.embedding.node_mapping.is_empty() {
            return candidates
                .iter()
                .copied()
                .find(|host| substrate.node_available(*host) >= cpu_req)
                .map(|host| (host, Vec::new()));
        }

        let distances = tree
            .parents
            .get(&node)
            .and_then(|parent| state.embedding.host_of(*parent))
            .map(|parent_host| hop_distances(substrate, parent_host));
        let mut rejected = BTreeSet::new();
        for hop_limit in 1..=self.max_hop {
            for &host in candidates {
                if state.embedding.hosts(host) || rejected.contains(&host) {
                    continue;
                }
                if substrate.node_available(host) < cpu_req {
                    continue;
                }
                let within_reach = match &distances {
                    Some(distances) => distances.get(&host).map_or(false, |d| *d <= hop_limit),
                    None => true,
                };
                if !within_reach {
                    continue;
                }
                match Self::route_links(node, host, request, state) {
                    Some(links) => return Some((host, links)),
                    None => {
                        rejected.insert(host);
                    }
                }
            }
        }
        None
    }

    /// Reserves paths from `host` to the hosts of all placed neighbors of `node`, releasing
    /// everything reserved here if one of them cannot be routed.
    fn route_links(
        node: NodeId,
        host: NodeId,
        request: &VirtualNetworkRequest,
        state: &mut SearchState,
    ) -> Option<Vec<(VirtualLinkId, Path)>> {
        let mut routed: Vec<(VirtualLinkId, Path, u32)> = Vec::new();
        for neighbor in request.node_neighbors(node) {
            let Some(neighbor_host) = state.embedding.host_of(neighbor) else {
                continue;
            };
            let bandwidth = request.bandwidth_req(node, neighbor);
            match state.allocator.route(host, neighbor_host, bandwidth) {
                Some(mut path) => {
                    if request.link(node, neighbor).map_or(false, |link| link.endpoints.0 != node) {
                        path.reverse();
                    }
                    routed.push((link_key(node, neighbor), path, bandwidth));
                }
                None => {
                    for (_, path, bandwidth) in &routed {
                        state.allocator.release(path, *bandwidth);
                    }
                    return None;
                }
            }
        }
        Some(routed.into_iter().map(|(key, path, _)| (key, path)).collect())
    }
}

impl EmbeddingAlgorithm for RankedBfs {
    fn name(&self) -> &'static str {
        "RankedBFS"
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

        let tree = BfsTree::build(request, &request_ranks);
        if tree.order.len() != request.node_count() {
            return Err(EmbeddingFailure::DisconnectedRequest);
        }
        let candidates = self.candidate_lists(request, substrate, &substrate_ranks);

        let mut state = SearchState {
            allocator: PathAllocator::new(substrate, PathSearch::Shortest),
            embedding: Embedding::new(),
            tried: tree.order.iter().map(|node| (*node, BTreeSet::new())).collect(),
        };
        let mut backtracks = 0;
        let mut index = 0;
        while index < tree.order.len() {
            let node = tree.order[index];
            let untried: Vec<NodeId> = candidates[&node]
                .iter()
                .copied()
                .filter(|host| !state.tried[&node].contains(host))
                .collect();
            if let Some((host, links)) = self.match_node(node, &untried, request, &tree, &mut state) {
                state.embedding.map_node(node, host);
                state.embedding.link_mapping.extend(links);
                index += 1;
                continue;
            }

            if index == 0 {
                return Err(EmbeddingFailure::InfeasibleRequest { node });
            }
            if backtracks >= self.max_backtrack {
                return Err(EmbeddingFailure::SearchExhausted { node, backtracks });
            }
            for later in &tree.order[index..] {
                if let Some(tried) = state.tried.get_mut(later) {
                    tried.clear();
                }
            }
            index -= 1;
            let previous = tree.order[index];
            if let Some(host) = state.embedding.unmap_node(previous) {
                if let Some(tried) = state.tried.get_mut(&previous) {
                    tried.insert(host);
                }
            }
            for ((a, b), path) in state.embedding.unmap_links_of(previous) {
                state.allocator.release(&path, request.bandwidth_req(a, b));
            }
            backtracks += 1;
            log::trace!(
                "request {}: backtracking from virtual node {} to {}",
                request.id,
                node,
                previous
            );
        }
        Ok(state.embedding)
    }
}
