//! NodeRank: resource-weighted centrality of graph nodes.
//!
//! Every node gets a weight `H(u) = cpu(u) * sum of bandwidth on links incident to u`. Initial
//! ranks are the normalized weights, and each iteration mixes a global jump term proportional to
//! the node's weight with a forward term collected from its neighbors. Nodes are always visited
//! in ascending id order, so results are bit-for-bit reproducible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use vne_network::{NodeId, ResourceGraph, ResourceView};

/// Iteration parameters of NodeRank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeRankConfig {
    pub max_iterations: usize,
    pub epsilon: f64,
    pub p_jump: f64,
    pub p_forward: f64,
}

impl Default for NodeRankConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            epsilon: 0.0001,
            p_jump: 0.15,
            p_forward: 0.85,
        }
    }
}

/// Rank of every node of a graph.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRanks {
    ranks: BTreeMap<NodeId, f64>,
    iterations: usize,
    converged: bool,
}

impl NodeRanks {
    /// Rank of `node`, zero for nodes outside the graph.
    pub fn get(&self, node: NodeId) -> f64 {
        self.ranks.get(&node).copied().unwrap_or(0.)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.ranks.iter().map(|(node, rank)| (*node, *rank))
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.ranks.values().sum()
    }

    /// Number of refinement rounds performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the ranks stabilized before the iteration limit.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Sorts nodes by descending rank, keeping the given order among equal ranks.
    pub fn sort_descending(&self, nodes: &mut [NodeId]) {
        nodes.sort_by(|a, b| self.get(*b).total_cmp(&self.get(*a)));
    }

    /// All ranked nodes by descending rank, equal ranks in ascending id order.
    pub fn descending(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.ranks.keys().copied().collect();
        self.sort_descending(&mut nodes);
        nodes
    }

    /// Node with the highest rank, the smallest id among equal ranks.
    pub fn top(&self) -> Option<NodeId> {
        self.descending().first().copied()
    }
}

/// Resource weight `H(u)` of every node under the given view.
pub fn resource_weights<G: ResourceGraph + ?Sized>(graph: &G, view: ResourceView) -> BTreeMap<NodeId, f64> {
    graph
        .node_ids()
        .into_iter()
        .map(|node| {
            let weight = graph.cpu(node, view) as f64 * graph.incident_bandwidth(node, view) as f64;
            (node, weight)
        })
        .collect()
}

/// Normalized resource weights, `None` if the total weight is zero.
pub fn initial_noderank<G: ResourceGraph + ?Sized>(graph: &G, view: ResourceView) -> Option<BTreeMap<NodeId, f64>> {
    let weights = resource_weights(graph, view);
    let total: f64 = weights.values().sum();
    if total == 0. {
        return None;
    }
    Some(weights.into_iter().map(|(node, weight)| (node, weight / total)).collect())
}

/// Computes NodeRank of every node, `None` if the graph has no resource weight at all.
pub fn compute_noderank<G: ResourceGraph + ?Sized>(
    graph: &G,
    view: ResourceView,
    config: &NodeRankConfig,
) -> Option<NodeRanks> {
    let weights = resource_weights(graph, view);
    let total: f64 = weights.values().sum();
    if total == 0. {
        return None;
    }
    let neighbors: BTreeMap<NodeId, Vec<NodeId>> = weights.keys().map(|node| (*node, graph.neighbors(*node))).collect();
    let neighbor_weight: BTreeMap<NodeId, f64> = neighbors
        .iter()
        .map(|(node, nbrs)| (*node, nbrs.iter().map(|w| weights[w]).sum()))
        .collect();

    let mut ranks: BTreeMap<NodeId, f64> = weights.iter().map(|(node, weight)| (*node, weight / total)).collect();
    let mut iterations = 0;
    let mut converged = false;
    while iterations < config.max_iterations {
        iterations += 1;
        let rank_sum: f64 = ranks.values().sum();
        let mut next = BTreeMap::new();
        for (&v, &weight) in &weights {
            let global = weight / total * config.p_jump * rank_sum;
            let mut local = 0.;
            for u in &neighbors[&v] {
                let denominator = neighbor_weight[u];
                if denominator > 0. {
                    local += weight / denominator * config.p_forward * ranks[u];
                }
            }
            next.insert(v, global + local);
        }
        let diff: f64 = ranks.iter().map(|(node, rank)| (next[node] - rank).abs()).sum();
        ranks = next;
        if diff < config.epsilon {
            converged = true;
            break;
        }
    }
    log::trace!("noderank finished after {} iterations, converged: {}", iterations, converged);
    Some(NodeRanks {
        ranks,
        iterations,
        converged,
    })
}
