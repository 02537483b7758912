//! Result of embedding a single request.

use std::collections::BTreeMap;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::link::{link_key, VirtualLinkId};
use crate::node::NodeId;
use crate::paths::Path;

/// Node and link mapping of a virtual network request onto the substrate.
///
/// Paths are stored as substrate node sequences oriented from the host of the first endpoint
/// of the virtual link to the host of the other one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Embedding {
    /// Virtual node -> hosting substrate node.
    pub node_mapping: BTreeMap<NodeId, NodeId>,
    /// Virtual link -> substrate path.
    #[serde(serialize_with = "serialize_link_mapping")]
    pub link_mapping: BTreeMap<VirtualLinkId, Path>,
}

impl Embedding {
    /// Creates an empty embedding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places virtual node `node` on substrate node `host`.
    pub fn map_node(&mut self, node: NodeId, host: NodeId) {
        self.node_mapping.insert(node, host);
    }

    /// Routes the virtual link `a`-`b` along `path`.
    pub fn map_link(&mut self, a: NodeId, b: NodeId, path: Path) {
        self.link_mapping.insert(link_key(a, b), path);
    }

    /// Substrate node hosting `node`, if it is mapped.
    pub fn host_of(&self, node: NodeId) -> Option<NodeId> {
        self.node_mapping.get(&node).copied()
    }

    /// Substrate path of the virtual link `a`-`b`, if it is mapped.
    pub fn path_of(&self, a: NodeId, b: NodeId) -> Option<&Path> {
        self.link_mapping.get(&link_key(a, b))
    }

    /// Checks whether some virtual node is placed on `host`.
    pub fn hosts(&self, host: NodeId) -> bool {
        self.node_mapping.values().any(|h| *h == host)
    }

    /// Checks that no two virtual nodes share a substrate node.
    pub fn is_node_disjoint(&self) -> bool {
        let mut hosts: Vec<NodeId> = self.node_mapping.values().copied().collect();
        hosts.sort_unstable();
        hosts.windows(2).all(|w| w[0] != w[1])
    }

    /// Removes the placement of `node` and returns its former host.
    pub fn unmap_node(&mut self, node: NodeId) -> Option<NodeId> {
        self.node_mapping.remove(&node)
    }

    /// Removes all mapped links incident to virtual node `node` and returns them.
    pub fn unmap_links_of(&mut self, node: NodeId) -> Vec<(VirtualLinkId, Path)> {
        let keys: Vec<VirtualLinkId> = self
            .link_mapping
            .keys()
            .filter(|(a, b)| *a == node || *b == node)
            .copied()
            .collect();
        keys.into_iter()
            .filter_map(|key| self.link_mapping.remove(&key).map(|path| (key, path)))
            .collect()
    }

    /// Total number of substrate hops over all mapped links.
    pub fn total_hops(&self) -> usize {
        self.link_mapping.values().map(|p| p.len().saturating_sub(1)).sum()
    }

    /// Checks whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.node_mapping.is_empty() && self.link_mapping.is_empty()
    }
}

#[derive(Serialize)]
struct MappedLink<'a> {
    link: &'a VirtualLinkId,
    path: &'a Path,
}

fn serialize_link_mapping<S: Serializer>(
    mapping: &BTreeMap<VirtualLinkId, Path>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(mapping.len()))?;
    for (link, path) in mapping {
        seq.serialize_element(&MappedLink { link, path })?;
    }
    seq.end()
}
