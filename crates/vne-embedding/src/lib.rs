#![doc = include_str!("../README.md")]

pub mod embedding_algorithm;
pub mod embedding_algorithms;
pub mod noderank;
pub mod options;
pub mod result;

pub use embedding_algorithm::{
    strategy_resolver, AlgorithmParams, BatchEmbeddingAlgorithm, EmbeddingAlgorithm, EmbeddingFailure, ResolveError,
    Strategy,
};
pub use noderank::{compute_noderank, NodeRankConfig, NodeRanks};
pub use result::RequestResult;
