//! Per-request embedding outcome.

use serde::Serialize;

use vne_network::{Embedding, RequestId, VirtualNetworkRequest};

use crate::embedding_algorithm::EmbeddingFailure;

/// Outcome of processing one request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestResult {
    pub request_id: RequestId,
    pub arrival_time: f64,
    /// Time the verdict was made: the arrival time for online strategies, a chunk boundary for
    /// batch ones.
    pub decision_time: f64,
    /// Time the request was embedded, set only on success.
    pub embedding_time: Option<f64>,
    pub success: bool,
    pub embedding: Option<Embedding>,
    pub failure: Option<EmbeddingFailure>,
    /// Number of embedded requests holding resources right after the verdict.
    pub active_requests: usize,
}

impl RequestResult {
    pub fn embedded(request: &VirtualNetworkRequest, embedding: Embedding, time: f64, active_requests: usize) -> Self {
        Self {
            request_id: request.id,
            arrival_time: request.arrival_time,
            decision_time: time,
            embedding_time: Some(time),
            success: true,
            embedding: Some(embedding),
            failure: None,
            active_requests,
        }
    }

    pub fn rejected(
        request: &VirtualNetworkRequest,
        failure: EmbeddingFailure,
        time: f64,
        active_requests: usize,
    ) -> Self {
        Self {
            request_id: request.id,
            arrival_time: request.arrival_time,
            decision_time: time,
            embedding_time: None,
            success: false,
            embedding: None,
            failure: Some(failure),
            active_requests,
        }
    }

    /// Time between arrival and embedding, `None` for rejected requests.
    pub fn waiting_time(&self) -> Option<f64> {
        self.embedding_time.map(|time| time - self.arrival_time)
    }
}
