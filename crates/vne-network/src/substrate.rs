//! Physical network with CPU on nodes and bandwidth on links.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use crate::error::TopologyError;
use crate::link::{LinkId, SubstrateLink};
use crate::mapping::Embedding;
use crate::node::{NodeId, SubstrateNode};
use crate::request::VirtualNetworkRequest;
use crate::view::{ResourceGraph, ResourceView};

/// Adjacency of the substrate: node -> neighbor -> link.
pub type NodeLinksMap = BTreeMap<NodeId, BTreeMap<NodeId, LinkId>>;

/// Outcome of checking whether an embedding fits into the remaining resources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AllocationVerdict {
    Success,
    NodeNotFound(NodeId),
    NotEnoughCpu(NodeId),
    NotAdjacent(NodeId, NodeId),
    NotEnoughBandwidth(LinkId),
}

/// Substrate network: the shared resource graph requests are embedded into.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SubstrateNetwork {
    nodes: BTreeMap<NodeId, SubstrateNode>,
    links: Vec<SubstrateLink>,
    #[serde(skip)]
    node_links_map: NodeLinksMap,
}

impl SubstrateNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a network from node `(id, cpu)` and link `(a, b, bandwidth, cost)` lists.
    pub fn from_parts(
        nodes: &[(NodeId, u32)],
        links: &[(NodeId, NodeId, u32, Option<u32>)],
    ) -> Result<Self, TopologyError> {
        let mut substrate = Self::new();
        for &(node, cpu) in nodes {
            substrate.add_node(node, cpu)?;
        }
        for &(a, b, bandwidth, cost) in links {
            substrate.add_link(a, b, bandwidth, cost)?;
        }
        Ok(substrate)
    }

    /// Adds a node with all capacity available.
    pub fn add_node(&mut self, id: NodeId, cpu: u32) -> Result<(), TopologyError> {
        if self.nodes.contains_key(&id) {
            return Err(TopologyError::DuplicateNode(id));
        }
        self.nodes.insert(id, SubstrateNode::new(id, cpu));
        self.node_links_map.insert(id, BTreeMap::new());
        Ok(())
    }

    /// Connects two existing nodes and returns the new link id.
    pub fn add_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        bandwidth: u32,
        cost: Option<u32>,
    ) -> Result<LinkId, TopologyError> {
        if a == b {
            return Err(TopologyError::SelfLoop(a));
        }
        for node in [a, b] {
            if !self.nodes.contains_key(&node) {
                return Err(TopologyError::UnknownNode(node));
            }
        }
        if self.link_id_between(a, b).is_some() {
            return Err(TopologyError::DuplicateLink(a, b));
        }
        let link_id = self.links.len();
        self.links.push(SubstrateLink::new(link_id, a, b, bandwidth, cost));
        self.node_links_map.entry(a).or_default().insert(b, link_id);
        self.node_links_map.entry(b).or_default().insert(a, link_id);
        Ok(link_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &SubstrateNode> {
        self.nodes.values()
    }

    /// Links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &SubstrateLink> {
        self.links.iter()
    }

    pub fn node(&self, id: NodeId) -> Option<&SubstrateNode> {
        self.nodes.get(&id)
    }

    /// Returns the link with the given id.
    ///
    /// Panics if the link does not exist.
    pub fn link(&self, id: LinkId) -> &SubstrateLink {
        &self.links[id]
    }

    pub fn link_id_between(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        self.node_links_map.get(&a).and_then(|links| links.get(&b)).copied()
    }

    pub fn link_between(&self, a: NodeId, b: NodeId) -> Option<&SubstrateLink> {
        self.link_id_between(a, b).map(|id| &self.links[id])
    }

    pub fn node_links_map(&self) -> &NodeLinksMap {
        &self.node_links_map
    }

    /// Neighbors of `node` in ascending id order.
    pub fn node_neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node_links_map
            .get(&node)
            .into_iter()
            .flat_map(|links| links.keys().copied())
    }

    /// Available CPU of `node`.
    ///
    /// Panics if the node does not exist.
    pub fn node_available(&self, node: NodeId) -> u32 {
        self.node_ref(node).cpu_available
    }

    /// Available bandwidth of the link `a`-`b`.
    ///
    /// Panics if the nodes are not adjacent.
    pub fn link_available(&self, a: NodeId, b: NodeId) -> u32 {
        self.links[self.adjacent_link(a, b)].bandwidth_available
    }

    /// Total available bandwidth on the links incident to `node`.
    pub fn incident_bandwidth_available(&self, node: NodeId) -> u64 {
        self.node_links_map
            .get(&node)
            .into_iter()
            .flat_map(|links| links.values())
            .map(|id| self.links[*id].bandwidth_available as u64)
            .sum()
    }

    /// Link ids traversed by a node path.
    ///
    /// Panics if two consecutive nodes are not adjacent.
    pub fn path_links(&self, path: &[NodeId]) -> Vec<LinkId> {
        path.windows(2).map(|w| self.adjacent_link(w[0], w[1])).collect()
    }

    /// Smallest available bandwidth along the path, `u32::MAX` for a path without links.
    pub fn path_bandwidth_available(&self, path: &[NodeId]) -> u32 {
        self.path_links(path)
            .into_iter()
            .map(|id| self.links[id].bandwidth_available)
            .min()
            .unwrap_or(u32::MAX)
    }

    /// Restores every node and link to full capacity.
    pub fn reset_available(&mut self) {
        for node in self.nodes.values_mut() {
            node.cpu_available = node.cpu_total;
        }
        for link in self.links.iter_mut() {
            link.bandwidth_available = link.bandwidth_total;
        }
    }

    /// Checks whether `embedding` of `request` fits into the remaining resources.
    pub fn can_allocate(&self, embedding: &Embedding, request: &VirtualNetworkRequest) -> AllocationVerdict {
        let mut cpu: BTreeMap<NodeId, u64> = BTreeMap::new();
        for (vnode, host) in &embedding.node_mapping {
            if !self.nodes.contains_key(host) {
                return AllocationVerdict::NodeNotFound(*host);
            }
            *cpu.entry(*host).or_default() += request.cpu_req(*vnode) as u64;
        }
        for (host, demand) in cpu {
            if (self.nodes[&host].cpu_available as u64) < demand {
                return AllocationVerdict::NotEnoughCpu(host);
            }
        }
        let mut bandwidth: BTreeMap<LinkId, u64> = BTreeMap::new();
        for (&(a, b), path) in &embedding.link_mapping {
            let demand = request.bandwidth_req(a, b) as u64;
            for w in path.windows(2) {
                match self.link_id_between(w[0], w[1]) {
                    Some(id) => *bandwidth.entry(id).or_default() += demand,
                    None => return AllocationVerdict::NotAdjacent(w[0], w[1]),
                }
            }
        }
        for (id, demand) in bandwidth {
            if (self.links[id].bandwidth_available as u64) < demand {
                return AllocationVerdict::NotEnoughBandwidth(id);
            }
        }
        AllocationVerdict::Success
    }

    /// Consumes the resources of an embedding.
    ///
    /// Panics if any availability would drop below zero.
    pub fn allocate(&mut self, embedding: &Embedding, request: &VirtualNetworkRequest) {
        for (vnode, host) in &embedding.node_mapping {
            self.allocate_cpu(*host, request.cpu_req(*vnode));
        }
        for (&(a, b), path) in &embedding.link_mapping {
            self.allocate_bandwidth(path, request.bandwidth_req(a, b));
        }
    }

    /// Returns the resources of an embedding, the exact inverse of [`allocate`](Self::allocate).
    ///
    /// Panics if any availability would exceed its capacity.
    pub fn deallocate(&mut self, embedding: &Embedding, request: &VirtualNetworkRequest) {
        for (vnode, host) in &embedding.node_mapping {
            self.release_cpu(*host, request.cpu_req(*vnode));
        }
        for (&(a, b), path) in &embedding.link_mapping {
            self.release_bandwidth(path, request.bandwidth_req(a, b));
        }
    }

    pub fn allocate_cpu(&mut self, node: NodeId, amount: u32) {
        let host = self.node_mut(node);
        let available = host.cpu_available;
        host.cpu_available = available
            .checked_sub(amount)
            .unwrap_or_else(|| panic!("not enough cpu on node {}: {} < {}", node, available, amount));
    }

    pub fn release_cpu(&mut self, node: NodeId, amount: u32) {
        let host = self.node_mut(node);
        let total = host.cpu_total;
        host.cpu_available = host
            .cpu_available
            .checked_add(amount)
            .filter(|cpu| *cpu <= total)
            .unwrap_or_else(|| panic!("cpu released on node {} exceeds its capacity", node));
    }

    /// Consumes `amount` of bandwidth on every link of the path.
    pub fn allocate_bandwidth(&mut self, path: &[NodeId], amount: u32) {
        for id in self.path_links(path) {
            let link = &mut self.links[id];
            let (a, b) = link.endpoints;
            let available = link.bandwidth_available;
            link.bandwidth_available = available.checked_sub(amount).unwrap_or_else(|| {
                panic!("not enough bandwidth on link {} <-> {}: {} < {}", a, b, available, amount)
            });
        }
    }

    /// Returns `amount` of bandwidth to every link of the path.
    pub fn release_bandwidth(&mut self, path: &[NodeId], amount: u32) {
        for id in self.path_links(path) {
            let link = &mut self.links[id];
            let (a, b) = link.endpoints;
            let total = link.bandwidth_total;
            link.bandwidth_available = link
                .bandwidth_available
                .checked_add(amount)
                .filter(|bw| *bw <= total)
                .unwrap_or_else(|| panic!("bandwidth released on link {} <-> {} exceeds its capacity", a, b));
        }
    }

    pub fn total_cpu(&self) -> u64 {
        self.nodes.values().map(|n| n.cpu_total as u64).sum()
    }

    pub fn available_cpu(&self) -> u64 {
        self.nodes.values().map(|n| n.cpu_available as u64).sum()
    }

    pub fn total_bandwidth(&self) -> u64 {
        self.links.iter().map(|l| l.bandwidth_total as u64).sum()
    }

    pub fn available_bandwidth(&self) -> u64 {
        self.links.iter().map(|l| l.bandwidth_available as u64).sum()
    }

    /// Average CPU load over all nodes.
    pub fn node_utilization(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.;
        }
        self.nodes.values().map(|n| n.cpu_load()).sum::<f64>() / self.nodes.len() as f64
    }

    /// Average bandwidth load over all links.
    pub fn link_utilization(&self) -> f64 {
        if self.links.is_empty() {
            return 0.;
        }
        self.links.iter().map(|l| l.bandwidth_load()).sum::<f64>() / self.links.len() as f64
    }

    /// Checks that every availability lies between zero and its capacity.
    pub fn capacity_invariant_holds(&self) -> bool {
        self.nodes.values().all(|n| n.cpu_available <= n.cpu_total)
            && self.links.iter().all(|l| l.bandwidth_available <= l.bandwidth_total)
    }

    /// Checks that nothing is allocated.
    pub fn is_fully_available(&self) -> bool {
        self.nodes.values().all(|n| n.cpu_available == n.cpu_total)
            && self.links.iter().all(|l| l.bandwidth_available == l.bandwidth_total)
    }

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

    /// Fails with [`TopologyError::Disconnected`] unless the network is connected.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(TopologyError::Disconnected)
        }
    }

    fn node_ref(&self, node: NodeId) -> &SubstrateNode {
        self.nodes
            .get(&node)
            .unwrap_or_else(|| panic!("substrate has no node {}", node))
    }

    fn node_mut(&mut self, node: NodeId) -> &mut SubstrateNode {
        self.nodes
            .get_mut(&node)
            .unwrap_or_else(|| panic!("substrate has no node {}", node))
    }

    fn adjacent_link(&self, a: NodeId, b: NodeId) -> LinkId {
        self.link_id_between(a, b)
            .unwrap_or_else(|| panic!("substrate nodes {} and {} are not adjacent", a, b))
    }
}

impl ResourceGraph for SubstrateNetwork {
    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.node_neighbors(node).collect()
    }

    fn node_attribute(&self, node: NodeId, view: ResourceView) -> Option<u32> {
        let node = self.nodes.get(&node)?;
        match view {
            ResourceView::Available => Some(node.cpu_available),
            ResourceView::Required => None,
            ResourceView::Capacity => Some(node.cpu_total),
        }
    }

    fn link_attribute(&self, a: NodeId, b: NodeId, view: ResourceView) -> Option<u32> {
        let link = self.link_between(a, b)?;
        match view {
            ResourceView::Available => Some(link.bandwidth_available),
            ResourceView::Required => None,
            ResourceView::Capacity => Some(link.bandwidth_total),
        }
    }
}
