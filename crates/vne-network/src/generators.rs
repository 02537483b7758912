//! Seeded random generators of substrates and requests.
//!
//! Every generator draws from a caller-supplied RNG and request ids come from an explicit
//! [`IdCounter`], so the same seed always yields the same graphs.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::node::NodeId;
use crate::request::{RequestId, VirtualNetworkRequest};
use crate::substrate::SubstrateNetwork;

/// Hands out consecutive request ids.
#[derive(Clone, Debug)]
pub struct IdCounter {
    next: RequestId,
}

impl IdCounter {
    pub fn new(start: RequestId) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> RequestId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> RequestId {
        self.next
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Shape of a generated substrate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SubstrateTopology {
    /// Path backbone plus each remaining node pair connected with probability `edge_prob`.
    ErdosRenyi { edge_prob: f64 },
    /// Preferential attachment, every new node brings `m` links.
    BarabasiAlbert { m: usize },
    /// Square grid of `floor(sqrt(nodes))^2` nodes.
    Grid,
}

impl Default for SubstrateTopology {
    fn default() -> Self {
        SubstrateTopology::ErdosRenyi { edge_prob: 0.15 }
    }
}

/// Shape of a generated request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RequestTopology {
    /// Random graph with link probability `edge_prob`, components are stitched together.
    Random { edge_prob: f64 },
    Star,
    Linear,
    Tree,
}

impl Default for RequestTopology {
    fn default() -> Self {
        RequestTopology::Random { edge_prob: 0.5 }
    }
}

/// Parameters of a generated request, unset values are drawn at random.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    pub nodes: Option<usize>,
    #[serde(default)]
    pub topology: RequestTopology,
    pub arrival_time: Option<f64>,
    pub lifetime: Option<f64>,
}

/// Generates a connected substrate with node CPU and link bandwidth drawn uniformly from 50..=100.
///
/// Node ids run from 0 to `nodes - 1`.
pub fn generate_substrate<R: Rng>(
    rng: &mut R,
    nodes: usize,
    topology: SubstrateTopology,
) -> Result<SubstrateNetwork, TopologyError> {
    let (node_count, edges) = match topology {
        SubstrateTopology::ErdosRenyi { edge_prob } => {
            let mut edges = path_edges(nodes);
            for i in 0..nodes {
                for j in i + 2..nodes {
                    if rng.gen::<f64>() < edge_prob {
                        edges.push((i, j));
                    }
                }
            }
            (nodes, edges)
        }
        SubstrateTopology::BarabasiAlbert { m } => (nodes, barabasi_albert_edges(rng, nodes, m)?),
        SubstrateTopology::Grid => {
            let side = (nodes as f64).sqrt() as usize;
            (side * side, grid_edges(side))
        }
    };
    let mut substrate = SubstrateNetwork::new();
    for node in 0..node_count {
        substrate.add_node(node as NodeId, rng.gen_range(50..=100))?;
    }
    for (a, b) in edges {
        substrate.add_link(a as NodeId, b as NodeId, rng.gen_range(50..=100), None)?;
    }
    substrate.validate()?;
    log::debug!(
        "generated {:?} substrate: {} nodes, {} links",
        topology,
        substrate.node_count(),
        substrate.link_count()
    );
    Ok(substrate)
}

/// Generates a connected request with node CPU from 10..=50 and link bandwidth from 5..=30.
///
/// Without an explicit size the request gets between 2 and `min(6, substrate_nodes / 2)` nodes.
pub fn generate_request<R: Rng>(
    rng: &mut R,
    ids: &mut IdCounter,
    substrate_nodes: usize,
    params: &RequestParams,
) -> Result<VirtualNetworkRequest, TopologyError> {
    let nodes = match params.nodes {
        Some(nodes) => nodes,
        None => rng.gen_range(2..=(substrate_nodes / 2).min(6).max(2)),
    };
    if nodes == 0 {
        return Err(TopologyError::InvalidParameters("request must have at least one node".to_string()));
    }
    let edges = match params.topology {
        RequestTopology::Random { edge_prob } => {
            let mut edges = Vec::new();
            for i in 0..nodes {
                for j in i + 1..nodes {
                    if rng.gen::<f64>() < edge_prob {
                        edges.push((i, j));
                    }
                }
            }
            let components = components(nodes, &edges);
            for pair in components.windows(2) {
                let u = pair[0][rng.gen_range(0..pair[0].len())];
                let v = pair[1][rng.gen_range(0..pair[1].len())];
                edges.push((u, v));
            }
            edges
        }
        RequestTopology::Star => (1..nodes).map(|leaf| (0, leaf)).collect(),
        RequestTopology::Linear => path_edges(nodes),
        RequestTopology::Tree => (1..nodes).map(|child| (rng.gen_range(0..child), child)).collect(),
    };

    let mut cpu = Vec::with_capacity(nodes);
    for _ in 0..nodes {
        cpu.push(rng.gen_range(10..=50));
    }
    let mut bandwidth = Vec::with_capacity(edges.len());
    for _ in 0..edges.len() {
        bandwidth.push(rng.gen_range(5..=30));
    }
    let arrival_time = match params.arrival_time {
        Some(time) => time,
        None => rng.gen_range(0..=100) as f64,
    };
    let lifetime = match params.lifetime {
        Some(lifetime) => lifetime,
        None => rng.gen_range(20..=60) as f64,
    };

    let mut request = VirtualNetworkRequest::new(ids.next_id(), arrival_time, lifetime);
    for (node, cpu) in cpu.into_iter().enumerate() {
        request.add_node(node as NodeId, cpu)?;
    }
    for ((a, b), bandwidth) in edges.into_iter().zip(bandwidth) {
        request.add_link(a as NodeId, b as NodeId, bandwidth)?;
    }
    Ok(request)
}

/// Generates `count` requests, the `i`-th one arriving at `trunc(arrival_rate * i + jitter)`
/// with jitter drawn from 0..=5.
pub fn generate_request_batch<R: Rng>(
    rng: &mut R,
    ids: &mut IdCounter,
    substrate_nodes: usize,
    count: usize,
    arrival_rate: f64,
    params: &RequestParams,
) -> Result<Vec<VirtualNetworkRequest>, TopologyError> {
    let mut requests = Vec::with_capacity(count);
    for i in 0..count {
        let jitter = rng.gen_range(0..=5) as f64;
        let params = RequestParams {
            arrival_time: Some((arrival_rate * i as f64 + jitter).trunc()),
            ..params.clone()
        };
        requests.push(generate_request(rng, ids, substrate_nodes, &params)?);
    }
    log::debug!("generated {} requests with arrival rate {}", count, arrival_rate);
    Ok(requests)
}

fn path_edges(nodes: usize) -> Vec<(usize, usize)> {
    (1..nodes).map(|i| (i - 1, i)).collect()
}

fn grid_edges(side: usize) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for row in 0..side {
        for col in 0..side {
            let node = row * side + col;
            if col + 1 < side {
                edges.push((node, node + 1));
            }
            if row + 1 < side {
                edges.push((node, node + side));
            }
        }
    }
    edges
}

fn barabasi_albert_edges<R: Rng>(rng: &mut R, nodes: usize, m: usize) -> Result<Vec<(usize, usize)>, TopologyError> {
    if m == 0 || m >= nodes {
        return Err(TopologyError::InvalidParameters(format!(
            "preferential attachment needs 1 <= m < nodes, got m = {}, nodes = {}",
            m, nodes
        )));
    }
    let mut edges = Vec::new();
    let mut targets: Vec<usize> = (0..m).collect();
    let mut repeated: Vec<usize> = Vec::new();
    for source in m..nodes {
        for &target in &targets {
            edges.push((target, source));
        }
        repeated.extend(targets.iter().copied());
        repeated.extend(std::iter::repeat(source).take(m));
        let mut chosen = BTreeSet::new();
        while chosen.len() < m {
            chosen.insert(repeated[rng.gen_range(0..repeated.len())]);
        }
        targets = chosen.into_iter().collect();
    }
    Ok(edges)
}

/// Connected components ordered by their smallest node.
fn components(nodes: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &(a, b) in edges {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }
    let mut seen = BTreeSet::new();
    let mut result = Vec::new();
    for start in 0..nodes {
        if !seen.insert(start) {
            continue;
        }
        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &next in adjacency.get(&node).into_iter().flatten() {
                if seen.insert(next) {
                    component.push(next);
                    queue.push_back(next);
                }
            }
        }
        component.sort_unstable();
        result.push(component);
    }
    result
}
