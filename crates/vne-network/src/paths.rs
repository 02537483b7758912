//! Path search over the substrate and bandwidth bookkeeping for link mapping.
//!
//! All searches count hops and explore neighbors in ascending id order, so equal-length paths
//! are always resolved the same way.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::link::LinkId;
use crate::node::NodeId;
use crate::substrate::SubstrateNetwork;

/// Sequence of substrate nodes, consecutive nodes are adjacent.
pub type Path = Vec<NodeId>;

/// Returns a minimum-hop path between two nodes.
pub fn shortest_path(substrate: &SubstrateNetwork, src: NodeId, dst: NodeId) -> Option<Path> {
    bfs_path(substrate, src, dst, &BTreeSet::new(), &BTreeSet::new())
}

/// Hop count of the shortest path between two nodes.
pub fn hop_distance(substrate: &SubstrateNetwork, src: NodeId, dst: NodeId) -> Option<usize> {
    shortest_path(substrate, src, dst).map(|path| path.len() - 1)
}

/// Hop counts from `src` to every reachable node.
pub fn hop_distances(substrate: &SubstrateNetwork, src: NodeId) -> BTreeMap<NodeId, usize> {
    let mut distances = BTreeMap::new();
    if substrate.node(src).is_none() {
        return distances;
    }
    distances.insert(src, 0);
    let mut queue = VecDeque::from([src]);
    while let Some(node) = queue.pop_front() {
        let distance = distances[&node];
        for next in substrate.node_neighbors(node) {
            if !distances.contains_key(&next) {
                distances.insert(next, distance + 1);
                queue.push_back(next);
            }
        }
    }
    distances
}

/// Returns up to `k` loopless paths in order of increasing hop count (Yen's algorithm).
///
/// Paths of equal length are ordered lexicographically by node ids.
pub fn k_shortest_paths(substrate: &SubstrateNetwork, src: NodeId, dst: NodeId, k: usize) -> Vec<Path> {
    let mut found: Vec<Path> = Vec::new();
    if k == 0 {
        return found;
    }
    match shortest_path(substrate, src, dst) {
        Some(path) => found.push(path),
        None => return found,
    }
    let mut candidates: Vec<Path> = Vec::new();
    while found.len() < k {
        let last = found[found.len() - 1].clone();
        for i in 0..last.len() - 1 {
            let spur = last[i];
            let root = &last[..=i];
            let banned_links: BTreeSet<LinkId> = found
                .iter()
                .filter(|p| p.len() > i + 1 && &p[..=i] == root)
                .filter_map(|p| substrate.link_id_between(p[i], p[i + 1]))
                .collect();
            let banned_nodes: BTreeSet<NodeId> = root[..i].iter().copied().collect();
            if let Some(spur_path) = bfs_path(substrate, spur, dst, &banned_nodes, &banned_links) {
                let mut path = root[..i].to_vec();
                path.extend(spur_path);
                if !found.contains(&path) && !candidates.contains(&path) {
                    candidates.push(path);
                }
            }
        }
        if candidates.is_empty() {
            break;
        }
        candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        found.push(candidates.remove(0));
    }
    found
}

fn bfs_path(
    substrate: &SubstrateNetwork,
    src: NodeId,
    dst: NodeId,
    banned_nodes: &BTreeSet<NodeId>,
    banned_links: &BTreeSet<LinkId>,
) -> Option<Path> {
    if substrate.node(src).is_none() || substrate.node(dst).is_none() {
        return None;
    }
    if src == dst {
        return Some(vec![src]);
    }
    let mut parents: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut visited = BTreeSet::from([src]);
    let mut queue = VecDeque::from([src]);
    while let Some(node) = queue.pop_front() {
        let Some(links) = substrate.node_links_map().get(&node) else {
            continue;
        };
        for (&next, link) in links {
            if banned_links.contains(link) || banned_nodes.contains(&next) || !visited.insert(next) {
                continue;
            }
            parents.insert(next, node);
            if next == dst {
                let mut path = vec![dst];
                let mut current = dst;
                while let Some(&parent) = parents.get(&current) {
                    path.push(parent);
                    current = parent;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

/// How candidate paths for a virtual link are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSearch {
    /// Only the single shortest path is considered.
    Shortest,
    /// The first feasible among the `k` shortest loopless paths.
    KShortest(usize),
}

/// Routes virtual links over a read-only substrate while tracking the bandwidth already
/// promised to links routed earlier in the same embedding attempt.
///
/// The substrate itself is never modified, so an abandoned attempt leaves no trace.
pub struct PathAllocator<'a> {
    substrate: &'a SubstrateNetwork,
    search: PathSearch,
    reserved: BTreeMap<LinkId, u32>,
}

impl<'a> PathAllocator<'a> {
    pub fn new(substrate: &'a SubstrateNetwork, search: PathSearch) -> Self {
        Self {
            substrate,
            search,
            reserved: BTreeMap::new(),
        }
    }

    pub fn substrate(&self) -> &'a SubstrateNetwork {
        self.substrate
    }

    /// Bandwidth reserved on the link by this allocator.
    pub fn reserved_bandwidth(&self, link: LinkId) -> u32 {
        self.reserved.get(&link).copied().unwrap_or(0)
    }

    /// Available bandwidth of the link minus the bandwidth reserved by this allocator.
    pub fn residual_bandwidth(&self, link: LinkId) -> u32 {
        self.substrate
            .link(link)
            .bandwidth_available
            .saturating_sub(self.reserved_bandwidth(link))
    }

    /// Checks whether every link of the path can carry `bandwidth` more.
    pub fn is_feasible(&self, path: &[NodeId], bandwidth: u32) -> bool {
        path.windows(2).all(|w| match self.substrate.link_id_between(w[0], w[1]) {
            Some(link) => self.residual_bandwidth(link) >= bandwidth,
            None => false,
        })
    }

    /// Finds a feasible path without reserving it.
    pub fn find_path(&self, src: NodeId, dst: NodeId, bandwidth: u32) -> Option<Path> {
        match self.search {
            PathSearch::Shortest => {
                shortest_path(self.substrate, src, dst).filter(|path| self.is_feasible(path, bandwidth))
            }
            PathSearch::KShortest(k) => k_shortest_paths(self.substrate, src, dst, k)
                .into_iter()
                .find(|path| self.is_feasible(path, bandwidth)),
        }
    }

    /// Finds a feasible path and reserves `bandwidth` along it.
    pub fn route(&mut self, src: NodeId, dst: NodeId, bandwidth: u32) -> Option<Path> {
        let path = self.find_path(src, dst, bandwidth)?;
        self.reserve(&path, bandwidth);
        Some(path)
    }

    pub fn reserve(&mut self, path: &[NodeId], bandwidth: u32) {
        for link in self.substrate.path_links(path) {
            *self.reserved.entry(link).or_default() += bandwidth;
        }
    }

    /// Returns a reservation made by [`reserve`](Self::reserve) or [`route`](Self::route).
    ///
    /// Panics if more bandwidth is released than was reserved.
    pub fn release(&mut self, path: &[NodeId], bandwidth: u32) {
        for link in self.substrate.path_links(path) {
            let reserved = self.reserved.entry(link).or_default();
            *reserved = reserved
                .checked_sub(bandwidth)
                .unwrap_or_else(|| panic!("released more bandwidth than reserved on link {}", link));
        }
    }
}
