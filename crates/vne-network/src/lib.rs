#![doc = include_str!("../README.md")]

pub mod error;
pub mod generators;
pub mod link;
pub mod mapping;
pub mod node;
pub mod paths;
pub mod request;
pub mod substrate;
pub mod topologies;
pub mod view;

pub use error::TopologyError;
pub use link::{link_key, LinkId, SubstrateLink, VirtualLink, VirtualLinkId};
pub use mapping::Embedding;
pub use node::{NodeId, SubstrateNode, VirtualNode};
pub use paths::{Path, PathAllocator, PathSearch};
pub use request::{RequestId, VirtualNetworkRequest};
pub use substrate::{AllocationVerdict, SubstrateNetwork};
pub use view::{ResourceGraph, ResourceView};
