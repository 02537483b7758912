//! Uniform read access to node and link resources.
//!
//! Substrate nodes and links carry capacity and availability, request nodes and links carry
//! requirements. Algorithms that work on both kinds of graphs (NodeRank in particular) read
//! resources through a [`ResourceView`], which resolves to the first attribute present on the
//! element along the view's fallback chain.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Selects which resource attribute of a graph element is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceView {
    /// Remaining capacity, falling back to the requirement and then to the total capacity.
    Available,
    /// Requirement, falling back to the total capacity.
    Required,
    /// Total capacity.
    Capacity,
}

impl ResourceView {
    /// Attribute lookup order for this view.
    pub fn fallback_chain(self) -> &'static [ResourceView] {
        match self {
            ResourceView::Available => &[ResourceView::Available, ResourceView::Required, ResourceView::Capacity],
            ResourceView::Required => &[ResourceView::Required, ResourceView::Capacity],
            ResourceView::Capacity => &[ResourceView::Capacity],
        }
    }
}

/// Undirected graph whose nodes and links carry CPU and bandwidth attributes.
pub trait ResourceGraph {
    /// Ids of all nodes in ascending order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Neighbors of `node` in ascending id order.
    fn neighbors(&self, node: NodeId) -> Vec<NodeId>;

    /// Raw CPU attribute of `node` for exactly this view, `None` if the element lacks it.
    fn node_attribute(&self, node: NodeId, view: ResourceView) -> Option<u32>;

    /// Raw bandwidth attribute of the link `a`-`b` for exactly this view, `None` if the link
    /// does not exist or lacks the attribute.
    fn link_attribute(&self, a: NodeId, b: NodeId, view: ResourceView) -> Option<u32>;

    /// CPU of `node` resolved along the fallback chain of `view`, zero if nothing is present.
    fn cpu(&self, node: NodeId, view: ResourceView) -> u32 {
        view.fallback_chain()
            .iter()
            .find_map(|v| self.node_attribute(node, *v))
            .unwrap_or(0)
    }

    /// Bandwidth of the link `a`-`b` resolved along the fallback chain of `view`.
    fn bandwidth(&self, a: NodeId, b: NodeId, view: ResourceView) -> u32 {
        view.fallback_chain()
            .iter()
            .find_map(|v| self.link_attribute(a, b, *v))
            .unwrap_or(0)
    }

    /// Sum of bandwidth over all links incident to `node`.
    fn incident_bandwidth(&self, node: NodeId, view: ResourceView) -> u64 {
        self.neighbors(node)
            .into_iter()
            .map(|n| self.bandwidth(node, n, view) as u64)
            .sum()
    }
}
