//! Simulation configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vne_embedding::{strategy_resolver, AlgorithmParams, NodeRankConfig, ResolveError, Strategy};
use vne_network::{NodeId, RequestId, SubstrateNetwork, TopologyError, VirtualNetworkRequest};

use crate::events::TieBreak;

/// Error of loading a simulation setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Holds raw simulation config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawSimulationConfig {
    pub algorithm: Option<String>,
    pub time_window: Option<f64>,
    pub k_paths: Option<usize>,
    pub max_hop: Option<usize>,
    pub max_backtrack: Option<usize>,
    pub noderank: Option<NodeRankConfig>,
    pub tie_break: Option<TieBreak>,
    pub substrate: Option<SubstrateConfig>,
    pub requests: Option<Vec<RequestConfig>>,
}

/// Node with its CPU amount: capacity for substrate nodes, demand for virtual ones.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct NodeConfig {
    pub id: NodeId,
    pub cpu: u32,
}

/// Undirected link with its bandwidth.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct LinkConfig {
    pub from: NodeId,
    pub to: NodeId,
    pub bandwidth: u32,
    /// Link cost, read for substrate links only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
}

/// Holds configuration of the substrate network.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SubstrateConfig {
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

/// Holds configuration of a single virtual network request.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct RequestConfig {
    pub id: RequestId,
    pub arrival_time: f64,
    pub lifetime: f64,
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

/// Represents simulation configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Embedding algorithm config string, e.g. `RankedBFS[max_hop=2]`.
    pub algorithm: String,
    /// Window length of the chunked baseline.
    pub time_window: f64,
    /// Number of shortest paths tried per virtual link.
    pub k_paths: usize,
    /// Hop limit between a virtual node and its BFS parent (RankedBFS).
    pub max_hop: usize,
    /// Total number of backtracks allowed per request (RankedBFS).
    pub max_backtrack: usize,
    /// NodeRank iteration parameters.
    pub noderank: NodeRankConfig,
    /// Order of an arrival and a departure at the same time.
    pub tie_break: TieBreak,
    /// Substrate network, if described inline.
    pub substrate: Option<SubstrateConfig>,
    /// Virtual network requests.
    pub requests: Vec<RequestConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::from_raw(RawSimulationConfig {
            algorithm: None,
            time_window: None,
            k_paths: None,
            max_hop: None,
            max_backtrack: None,
            noderank: None,
            tie_break: None,
            substrate: None,
            requests: None,
        })
    }
}

impl SimulationConfig {
    /// Creates simulation config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(file_name).map_err(|source| ConfigError::Io {
            path: file_name.to_string(),
            source,
        })?;
        data.parse()
    }

    fn from_raw(raw: RawSimulationConfig) -> Self {
        let params = AlgorithmParams::default();
        Self {
            algorithm: raw.algorithm.unwrap_or_else(|| "RankedBFS".to_string()),
            time_window: raw.time_window.unwrap_or(params.time_window),
            k_paths: raw.k_paths.unwrap_or(params.k_paths),
            max_hop: raw.max_hop.unwrap_or(params.max_hop),
            max_backtrack: raw.max_backtrack.unwrap_or(params.max_backtrack),
            noderank: raw.noderank.unwrap_or_default(),
            tie_break: raw.tie_break.unwrap_or_default(),
            substrate: raw.substrate,
            requests: raw.requests.unwrap_or_default(),
        }
    }

    /// Algorithm parameters before the options of the algorithm string are applied.
    pub fn algorithm_params(&self) -> AlgorithmParams {
        AlgorithmParams {
            k_paths: self.k_paths,
            max_hop: self.max_hop,
            max_backtrack: self.max_backtrack,
            time_window: self.time_window,
            noderank: self.noderank.clone(),
        }
    }

    /// Resolves the configured embedding algorithm.
    pub fn build_strategy(&self) -> Result<Strategy, ConfigError> {
        Ok(strategy_resolver(&self.algorithm, &self.algorithm_params())?)
    }

    /// Builds the inline substrate network, `None` if the config has none.
    ///
    /// The substrate must be connected.
    pub fn build_substrate(&self) -> Result<Option<SubstrateNetwork>, ConfigError> {
        let Some(config) = &self.substrate else {
            return Ok(None);
        };
        let mut substrate = SubstrateNetwork::new();
        for node in &config.nodes {
            substrate.add_node(node.id, node.cpu)?;
        }
        for link in &config.links {
            substrate.add_link(link.from, link.to, link.bandwidth, link.cost)?;
        }
        substrate.validate()?;
        Ok(Some(substrate))
    }

    /// Builds the configured requests in config order.
    pub fn build_requests(&self) -> Result<Vec<VirtualNetworkRequest>, ConfigError> {
        let mut requests = Vec::with_capacity(self.requests.len());
        for config in &self.requests {
            if !config.arrival_time.is_finite() || config.arrival_time < 0. {
                return Err(ConfigError::InvalidValue(format!(
                    "arrival time of request {} must be a non-negative number, got {}",
                    config.id, config.arrival_time
                )));
            }
            if !config.lifetime.is_finite() || config.lifetime <= 0. {
                return Err(ConfigError::InvalidValue(format!(
                    "lifetime of request {} must be positive, got {}",
                    config.id, config.lifetime
                )));
            }
            if requests.iter().any(|r: &VirtualNetworkRequest| r.id == config.id) {
                return Err(ConfigError::InvalidValue(format!("duplicate request id {}", config.id)));
            }
            let mut request = VirtualNetworkRequest::new(config.id, config.arrival_time, config.lifetime);
            for node in &config.nodes {
                request.add_node(node.id, node.cpu)?;
            }
            for link in &config.links {
                request.add_link(link.from, link.to, link.bandwidth)?;
            }
            requests.push(request);
        }
        Ok(requests)
    }
}

impl FromStr for SimulationConfig {
    type Err = ConfigError;

    /// Parses simulation config from YAML string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawSimulationConfig = serde_yaml::from_str(s)?;
        Ok(Self::from_raw(raw))
    }
}
