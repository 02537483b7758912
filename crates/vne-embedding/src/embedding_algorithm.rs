//! Virtual network embedding algorithms.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use vne_network::{Embedding, NodeId, SubstrateNetwork, VirtualLinkId, VirtualNetworkRequest};

use crate::embedding_algorithms::chunked_baseline::ChunkedBaseline;
use crate::embedding_algorithms::greedy::Greedy;
use crate::embedding_algorithms::ranked_bfs::RankedBfs;
use crate::embedding_algorithms::ranked_max_match::RankedMaxMatch;
use crate::noderank::NodeRankConfig;
use crate::options::{parse_config_value, parse_options};
use crate::result::RequestResult;

/// Reason a request could not be embedded.
///
/// All variants describe expected outcomes under the current resources, none of them is an
/// error of the simulation itself.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum EmbeddingFailure {
    #[error("no substrate node can host virtual node {node}")]
    InfeasibleRequest { node: NodeId },
    #[error("node ranks are undefined: the graph has no resource weight")]
    UndefinedRank,
    #[error("no feasible substrate path for virtual link {}-{}", link.0, link.1)]
    NoPath { link: VirtualLinkId },
    #[error("placement of virtual node {node} failed after {backtracks} backtracks")]
    SearchExhausted { node: NodeId, backtracks: usize },
    #[error("request topology is not connected")]
    DisconnectedRequest,
}

/// Trait for implementation of online embedding algorithms.
///
/// The algorithm is a function of a single request and the current substrate state, which
/// returns the node and link mapping or the reason of failure. The substrate is only read:
/// committing the returned embedding is the caller's job, so a failed attempt never leaves
/// partial allocations behind.
pub trait EmbeddingAlgorithm {
    fn name(&self) -> &'static str;

    fn embed(
        &self,
        request: &VirtualNetworkRequest,
        substrate: &SubstrateNetwork,
    ) -> Result<Embedding, EmbeddingFailure>;
}

/// Trait for algorithms that process the whole request sequence at once, managing allocations
/// and departures on their own.
pub trait BatchEmbeddingAlgorithm {
    fn name(&self) -> &'static str;

    /// Embeds `requests` into `substrate` and returns one result per request.
    fn embed_batch(&self, requests: &[VirtualNetworkRequest], substrate: &mut SubstrateNetwork) -> Vec<RequestResult>;
}

/// Embedding algorithm selected for a run.
pub enum Strategy {
    Online(Box<dyn EmbeddingAlgorithm>),
    Batch(Box<dyn BatchEmbeddingAlgorithm>),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Online(algorithm) => algorithm.name(),
            Strategy::Batch(algorithm) => algorithm.name(),
        }
    }
}

/// Error of resolving an algorithm from its config string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown embedding algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("unknown option {0}")]
    UnknownOption(String),
    #[error("invalid value {value:?} for option {name}")]
    InvalidOption { name: String, value: String },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Tunable parameters shared by all algorithms, each algorithm reads the ones it needs.
#[derive(Clone, Debug, PartialEq)]
pub struct AlgorithmParams {
    /// Number of shortest paths tried per virtual link.
    pub k_paths: usize,
    pub max_hop: usize,
    pub max_backtrack: usize,
    /// Length of a batch window.
    pub time_window: f64,
    pub noderank: NodeRankConfig,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            k_paths: 3,
            max_hop: 3,
            max_backtrack: 3,
            time_window: 25.,
            noderank: NodeRankConfig::default(),
        }
    }
}

impl AlgorithmParams {
    /// Overrides parameters with options parsed from a config string.
    pub fn apply_options(&mut self, options: &HashMap<String, String>) -> Result<(), ResolveError> {
        let mut names: Vec<&String> = options.keys().collect();
        names.sort();
        for name in names {
            let value = &options[name];
            match name.as_str() {
                "k" | "k_paths" => self.k_paths = parse_option(name, value)?,
                "max_hop" => self.max_hop = parse_option(name, value)?,
                "max_backtrack" => self.max_backtrack = parse_option(name, value)?,
                "time_window" => self.time_window = parse_option(name, value)?,
                "max_iterations" => self.noderank.max_iterations = parse_option(name, value)?,
                "epsilon" => self.noderank.epsilon = parse_option(name, value)?,
                "p_jump" => self.noderank.p_jump = parse_option(name, value)?,
                "p_forward" => self.noderank.p_forward = parse_option(name, value)?,
                _ => return Err(ResolveError::UnknownOption(name.clone())),
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.k_paths == 0 {
            return Err(ResolveError::InvalidParameter("k_paths must be positive".to_string()));
        }
        if !(self.time_window > 0.) {
            return Err(ResolveError::InvalidParameter("time_window must be positive".to_string()));
        }
        if !(self.noderank.epsilon >= 0.) {
            return Err(ResolveError::InvalidParameter("epsilon must be non-negative".to_string()));
        }
        Ok(())
    }
}

fn parse_option<T: FromStr>(name: &str, value: &str) -> Result<T, ResolveError> {
    value.parse().map_err(|_| ResolveError::InvalidOption {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Builds the algorithm named in `config_str`, e.g. `RankedBFS[max_hop=2,max_backtrack=5]`.
///
/// Options in brackets override the corresponding fields of `params`.
pub fn strategy_resolver(config_str: &str, params: &AlgorithmParams) -> Result<Strategy, ResolveError> {
    let (algorithm_name, options) = parse_config_value(config_str);
    let mut params = params.clone();
    if let Some(options) = options {
        params.apply_options(&parse_options(&options))?;
    }
    params.validate()?;
    match algorithm_name.as_str() {
        "Greedy" => Ok(Strategy::Online(Box::new(Greedy::new()))),
        "RankedBFS" | "RW-BFS" => Ok(Strategy::Online(Box::new(RankedBfs::new(
            params.max_hop,
            params.max_backtrack,
            params.noderank,
        )))),
        "RankedMaxMatch" | "RW-MaxMatch" => Ok(Strategy::Online(Box::new(RankedMaxMatch::new(
            params.k_paths,
            params.noderank,
        )))),
        "ChunkedBaseline" | "Yu2008" => Ok(Strategy::Batch(Box::new(ChunkedBaseline::new(
            params.time_window,
            params.k_paths,
        )))),
        _ => Err(ResolveError::UnknownAlgorithm(config_str.to_string())),
    }
}
