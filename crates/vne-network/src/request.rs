//! Virtual network requests.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Serialize, Serializer};

use crate::error::TopologyError;
use crate::link::{link_key, VirtualLink, VirtualLinkId};
use crate::node::{NodeId, VirtualNode};
use crate::view::{ResourceGraph, ResourceView};

/// Request identifier.
pub type RequestId = u32;

/// Virtual network request: a small graph of CPU and bandwidth demands with an arrival time
/// and a lifetime.
///
/// Requests are immutable once built, embedding never changes them.
#[derive(Clone, Debug, Serialize)]
pub struct VirtualNetworkRequest {
    /// Request id.
    pub id: RequestId,
    /// Time the request enters the system.
    pub arrival_time: f64,
    /// Duration the request holds its resources after being embedded.
    pub lifetime: f64,
    #[serde(serialize_with = "serialize_values")]
    nodes: BTreeMap<NodeId, VirtualNode>,
    #[serde(serialize_with = "serialize_values")]
    links: BTreeMap<VirtualLinkId, VirtualLink>,
    #[serde(skip)]
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl VirtualNetworkRequest {
    /// Creates a request without nodes.
    pub fn new(id: RequestId, arrival_time: f64, lifetime: f64) -> Self {
        Self {
            id,
            arrival_time,
            lifetime,
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            adjacency: BTreeMap::new(),
        }
    }

    /// Builds a request from node `(id, cpu)` and link `(a, b, bandwidth)` lists.
    pub fn from_parts(
        id: RequestId,
        arrival_time: f64,
        lifetime: f64,
        nodes: &[(NodeId, u32)],
        links: &[(NodeId, NodeId, u32)],
    ) -> Result<Self, TopologyError> {
        let mut request = Self::new(id, arrival_time, lifetime);
        for &(node, cpu) in nodes {
            request.add_node(node, cpu)?;
        }
        for &(a, b, bandwidth) in links {
            request.add_link(a, b, bandwidth)?;
        }
        Ok(request)
    }

    /// Adds a virtual node.
    pub fn add_node(&mut self, id: NodeId, cpu_req: u32) -> Result<(), TopologyError> {
        if self.nodes.contains_key(&id) {
            return Err(TopologyError::DuplicateNode(id));
        }
        self.nodes.insert(id, VirtualNode { id, cpu_req });
        self.adjacency.insert(id, BTreeSet::new());
        Ok(())
    }

    /// Adds a virtual link between two existing nodes.
    pub fn add_link(&mut self, a: NodeId, b: NodeId, bandwidth_req: u32) -> Result<(), TopologyError> {
        if a == b {
            return Err(TopologyError::SelfLoop(a));
        }
        for node in [a, b] {
            if !self.nodes.contains_key(&node) {
                return Err(TopologyError::UnknownNode(node));
            }
        }
        let key = link_key(a, b);
        if self.links.contains_key(&key) {
            return Err(TopologyError::DuplicateLink(a, b));
        }
        self.links.insert(
            key,
            VirtualLink {
                endpoints: (a, b),
                bandwidth_req,
            },
        );
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        Ok(())
    }

    /// Number of virtual nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of virtual links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Virtual nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &VirtualNode> {
        self.nodes.values()
    }

    /// Virtual links in ascending key order.
    pub fn links(&self) -> impl Iterator<Item = &VirtualLink> {
        self.links.values()
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&VirtualNode> {
        self.nodes.get(&id)
    }

    /// Returns the link between `a` and `b`.
    pub fn link(&self, a: NodeId, b: NodeId) -> Option<&VirtualLink> {
        self.links.get(&link_key(a, b))
    }

    /// Required CPU of `node`.
    ///
    /// Panics if the node does not exist.
    pub fn cpu_req(&self, node: NodeId) -> u32 {
        self.nodes
            .get(&node)
            .unwrap_or_else(|| panic!("request {} has no node {}", self.id, node))
            .cpu_req
    }

    /// Required bandwidth of the link `a`-`b`.
    ///
    /// Panics if the link does not exist.
    pub fn bandwidth_req(&self, a: NodeId, b: NodeId) -> u32 {
        self.link(a, b)
            .unwrap_or_else(|| panic!("request {} has no link {} <-> {}", self.id, a, b))
            .bandwidth_req
    }

    /// Neighbors of `node` in ascending id order.
    pub fn node_neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.get(&node).into_iter().flat_map(|n| n.iter().copied())
    }

    /// Total bandwidth required by the links incident to `node`.
    pub fn incident_bandwidth_req(&self, node: NodeId) -> u64 {
        self.node_neighbors(node)
            .map(|n| self.bandwidth_req(node, n) as u64)
            .sum()
    }

    /// Time the request releases its resources if embedded at `embedding_time`.
    pub fn departure_time(&self, embedding_time: f64) -> f64 {
        embedding_time + self.lifetime
    }

    /// Sum of CPU requirements.
    pub fn total_cpu_req(&self) -> u64 {
        self.nodes.values().map(|n| n.cpu_req as u64).sum()
    }

    /// Sum of bandwidth requirements.
    pub fn total_bandwidth_req(&self) -> u64 {
        self.links.values().map(|l| l.bandwidth_req as u64).sum()
    }

    /// Revenue of serving the request: total CPU plus total bandwidth.
    pub fn revenue(&self) -> u64 {
        self.total_cpu_req() + self.total_bandwidth_req()
    }

    /// Smallest CPU requirement among the nodes, `None` for an empty request.
    pub fn min_cpu_req(&self) -> Option<u32> {
        self.nodes.values().map(|n| n.cpu_req).min()
    }

    /// Checks whether every node is reachable from every other node.
    pub fn is_connected(&self) -> bool {
        let Some(&start) = self.nodes.keys().next() else {
            return true;
        };
        let mut visited = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for next in self.node_neighbors(node) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited.len() == self.nodes.len()
    }
}

impl ResourceGraph for VirtualNetworkRequest {
    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.node_neighbors(node).collect()
    }

    fn node_attribute(&self, node: NodeId, view: ResourceView) -> Option<u32> {
        match view {
            ResourceView::Required => self.nodes.get(&node).map(|n| n.cpu_req),
            _ => None,
        }
    }

    fn link_attribute(&self, a: NodeId, b: NodeId, view: ResourceView) -> Option<u32> {
        match view {
            ResourceView::Required => self.link(a, b).map(|l| l.bandwidth_req),
            _ => None,
        }
    }
}

fn serialize_values<K, V: Serialize, S: Serializer>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(map.values())
}
