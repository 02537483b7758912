//! Reporting metrics over simulation results.
//!
//! None of these values feed back into embedding decisions.

use std::collections::BTreeMap;

use serde::Serialize;

use vne_embedding::RequestResult;
use vne_network::{Embedding, RequestId, SubstrateNetwork, VirtualNetworkRequest};

/// Revenue of a request: its total CPU and bandwidth demand.
pub fn revenue(request: &VirtualNetworkRequest) -> u64 {
    request.revenue()
}

/// Substrate resources consumed by an embedding.
///
/// CPU of mapped nodes plus bandwidth of every mapped link times its hop count. A link whose
/// endpoints share a host counts as one hop.
pub fn cost(request: &VirtualNetworkRequest, embedding: &Embedding) -> u64 {
    let cpu: u64 = embedding
        .node_mapping
        .keys()
        .map(|&node| request.cpu_req(node) as u64)
        .sum();
    let bandwidth: u64 = embedding
        .link_mapping
        .iter()
        .map(|(&(a, b), path)| {
            let hops = path.len().saturating_sub(1).max(1) as u64;
            request.bandwidth_req(a, b) as u64 * hops
        })
        .sum();
    cpu + bandwidth
}

/// Share of embedded requests, 0 for an empty result set.
pub fn acceptance_ratio(results: &[RequestResult]) -> f64 {
    if results.is_empty() {
        return 0.;
    }
    results.iter().filter(|r| r.success).count() as f64 / results.len() as f64
}

/// Share of rejected requests, 0 for an empty result set.
pub fn blocking_probability(results: &[RequestResult]) -> f64 {
    if results.is_empty() {
        return 0.;
    }
    results.iter().filter(|r| !r.success).count() as f64 / results.len() as f64
}

pub fn revenue_cost_ratio(revenue: u64, cost: u64) -> f64 {
    if cost == 0 {
        0.
    } else {
        revenue as f64 / cost as f64
    }
}

/// Aggregated metrics of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_requests: usize,
    pub accepted_requests: usize,
    pub blocked_requests: usize,
    pub acceptance_ratio: f64,
    pub blocking_probability: f64,
    /// Revenue of embedded requests.
    pub total_revenue: u64,
    pub total_cost: u64,
    pub revenue_cost_ratio: f64,
    /// Mean time between arrival and embedding of accepted requests.
    pub average_waiting_time: f64,
    /// Largest number of simultaneously active requests seen in the results.
    pub peak_active_requests: usize,
}

impl MetricsSummary {
    /// Computes metrics of `results`, looking requests up by id in `requests`.
    ///
    /// Results of requests missing from `requests` count towards ratios only.
    pub fn from_results(results: &[RequestResult], requests: &[VirtualNetworkRequest]) -> Self {
        let by_id: BTreeMap<RequestId, &VirtualNetworkRequest> = requests.iter().map(|r| (r.id, r)).collect();
        let mut total_revenue = 0;
        let mut total_cost = 0;
        let mut waiting_time = 0.;
        let mut accepted = 0;
        for result in results.iter().filter(|r| r.success) {
            accepted += 1;
            waiting_time += result.waiting_time().unwrap_or(0.);
            let (Some(request), Some(embedding)) = (by_id.get(&result.request_id), &result.embedding) else {
                continue;
            };
            total_revenue += revenue(request);
            total_cost += cost(request, embedding);
        }
        Self {
            total_requests: results.len(),
            accepted_requests: accepted,
            blocked_requests: results.len() - accepted,
            acceptance_ratio: acceptance_ratio(results),
            blocking_probability: blocking_probability(results),
            total_revenue,
            total_cost,
            revenue_cost_ratio: revenue_cost_ratio(total_revenue, total_cost),
            average_waiting_time: if accepted == 0 {
                0.
            } else {
                waiting_time / accepted as f64
            },
            peak_active_requests: results.iter().map(|r| r.active_requests).max().unwrap_or(0),
        }
    }
}

/// Average utilization of a substrate state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UtilizationSnapshot {
    pub time: f64,
    pub node_utilization: f64,
    pub link_utilization: f64,
}

impl UtilizationSnapshot {
    pub fn of(substrate: &SubstrateNetwork, time: f64) -> Self {
        Self {
            time,
            node_utilization: substrate.node_utilization(),
            link_utilization: substrate.link_utilization(),
        }
    }
}
