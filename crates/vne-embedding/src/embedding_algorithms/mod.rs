//! Implementations of embedding algorithms.

pub mod chunked_baseline;
pub mod greedy;
pub mod ranked_bfs;
pub mod ranked_max_match;
