//! Time-window batch embedding with revenue ordering and a single retry.

use std::collections::BTreeMap;

use vne_network::{Embedding, NodeId, PathAllocator, PathSearch, SubstrateNetwork, VirtualNetworkRequest};

use crate::embedding_algorithm::{BatchEmbeddingAlgorithm, EmbeddingFailure};
use crate::result::RequestResult;

/// Groups requests into windows of `time_window` and embeds each window at its closing
/// boundary.
///
/// Within a window requests are handled by descending weighted revenue: first all node
/// mappings, then the link mappings of requests whose nodes were placed. Resources are consumed
/// as soon as each element is mapped and given back if the request fails later. A failed request
/// is moved to the next window once, a second failure blocks it for good.
pub struct ChunkedBaseline {
    time_window: f64,
    k_paths: usize,
}

struct ActiveEmbedding {
    request: usize,
    embedding: Embedding,
    departure_time: f64,
}

impl ChunkedBaseline {
    /// Panics if `time_window` is not positive.
    pub fn new(time_window: f64, k_paths: usize) -> Self {
        assert!(time_window > 0., "Time window must be > 0");
        Self { time_window, k_paths }
    }

    /// Index of the window a request arriving at `time` belongs to: window `i` covers
    /// `(i * time_window, (i + 1) * time_window]`, the first one also takes earlier arrivals.
    ///
    /// Arrivals past the last representable window share it.
    pub fn window_of(&self, time: f64) -> usize {
        if time <= self.time_window {
            return 0;
        }
        let index = (time / self.time_window).ceil() - 1.;
        if index < (usize::MAX - 1) as f64 {
            index as usize
        } else {
            usize::MAX - 1
        }
    }

    /// Closing boundary of window `index`, the time its requests are embedded at.
    pub fn window_end(&self, index: usize) -> f64 {
        (index as f64 + 1.) * self.time_window
    }

    /// Groups request indices by window, keeping only windows that received requests.
    pub fn create_chunks(&self, requests: &[VirtualNetworkRequest]) -> BTreeMap<usize, Vec<usize>> {
        let mut order: Vec<usize> = (0..requests.len()).collect();
        order.sort_by(|a, b| requests[*a].arrival_time.total_cmp(&requests[*b].arrival_time));
        let mut chunks: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for index in order {
            chunks
                .entry(self.window_of(requests[index].arrival_time))
                .or_default()
                .push(index);
        }
        chunks
    }

    /// Places all nodes of `request`, consuming CPU immediately and giving it back on failure.
    fn map_nodes(
        &self,
        request: &VirtualNetworkRequest,
        substrate: &mut SubstrateNetwork,
    ) -> Result<Embedding, EmbeddingFailure> {
        let min_cpu = request.min_cpu_req().unwrap_or(0);
        let mut hosts: Vec<NodeId> = substrate
            .nodes()
            .filter(|host| host.cpu_available >= min_cpu)
            .map(|host| host.id)
            .collect();
        hosts.sort_by_key(|host| {
            std::cmp::Reverse(substrate.incident_bandwidth_available(*host) * substrate.node_available(*host) as u64)
        });

        let mut embedding = Embedding::new();
        for node in request.nodes() {
            let host = hosts
                .iter()
                .copied()
                .find(|host| !embedding.hosts(*host) && substrate.node_available(*host) >= node.cpu_req);
            match host {
                Some(host) => {
                    substrate.allocate_cpu(host, node.cpu_req);
                    embedding.map_node(node.id, host);
                }
                None => {
                    substrate.deallocate(&embedding, request);
                    return Err(EmbeddingFailure::InfeasibleRequest { node: node.id });
                }
            }
        }
        Ok(embedding)
    }

    /// Routes all links of `request`, consuming bandwidth immediately. On failure every resource
    /// of the request, CPU included, is given back.
    fn map_links(
        &self,
        request: &VirtualNetworkRequest,
        mut embedding: Embedding,
        substrate: &mut SubstrateNetwork,
    ) -> Result<Embedding, EmbeddingFailure> {
        for link in request.links() {
            let (a, b) = link.endpoints;
            let path = PathAllocator::new(substrate, PathSearch::KShortest(self.k_paths)).find_path(
                embedding.node_mapping[&a],
                embedding.node_mapping[&b],
                link.bandwidth_req,
            );
            match path {
                Some(path) => {
                    substrate.allocate_bandwidth(&path, link.bandwidth_req);
                    embedding.map_link(a, b, path);
                }
                None => {
                    substrate.deallocate(&embedding, request);
                    return Err(EmbeddingFailure::NoPath { link: link.id() });
                }
            }
        }
        Ok(embedding)
    }
}

/// Revenue with CPU weighted twice, used to order requests inside a window.
pub fn weighted_revenue(request: &VirtualNetworkRequest) -> u64 {
    2 * request.total_cpu_req() + request.total_bandwidth_req()
}

impl BatchEmbeddingAlgorithm for ChunkedBaseline {
    fn name(&self) -> &'static str {
        "ChunkedBaseline"
    }

    fn embed_batch(&self, requests: &[VirtualNetworkRequest], substrate: &mut SubstrateNetwork) -> Vec<RequestResult> {
        let mut chunks = self.create_chunks(requests);
        let order: Vec<usize> = chunks.values().flatten().copied().collect();
        let mut retried = vec![false; requests.len()];
        let mut outcomes: BTreeMap<usize, RequestResult> = BTreeMap::new();
        let mut active: Vec<ActiveEmbedding> = Vec::new();

        while let Some((chunk_index, mut chunk)) = chunks.pop_first() {
            // only the shared last window can close before its arrivals
            let now = chunk
                .iter()
                .map(|index| requests[*index].arrival_time)
                .fold(self.window_end(chunk_index), f64::max);
            active.retain(|entry| {
                if entry.departure_time <= now {
                    substrate.deallocate(&entry.embedding, &requests[entry.request]);
                    false
                } else {
                    true
                }
            });

            chunk.sort_by_key(|index| std::cmp::Reverse(weighted_revenue(&requests[*index])));

            let mut failures: Vec<(usize, EmbeddingFailure, usize)> = Vec::new();
            let mut node_mapped = Vec::new();
            for index in chunk {
                match self.map_nodes(&requests[index], substrate) {
                    Ok(embedding) => node_mapped.push((index, embedding)),
                    Err(failure) => failures.push((index, failure, active.len())),
                }
            }

            for (index, embedding) in node_mapped {
                let request = &requests[index];
                match self.map_links(request, embedding, substrate) {
                    Ok(embedding) => {
                        active.push(ActiveEmbedding {
                            request: index,
                            embedding: embedding.clone(),
                            departure_time: request.departure_time(now),
                        });
                        log::debug!("request {} embedded at {:.3}", request.id, now);
                        outcomes.insert(index, RequestResult::embedded(request, embedding, now, active.len()));
                    }
                    Err(failure) => failures.push((index, failure, active.len())),
                }
            }

            let mut deferred = Vec::new();
            for (index, failure, active_requests) in failures {
                if retried[index] {
                    log::debug!("request {} blocked at {:.3}: {}", requests[index].id, now, failure);
                } else {
                    log::debug!("request {} deferred at {:.3}: {}", requests[index].id, now, failure);
                    retried[index] = true;
                    deferred.push(index);
                }
                outcomes.insert(
                    index,
                    RequestResult::rejected(&requests[index], failure, now, active_requests),
                );
            }

            if !deferred.is_empty() {
                chunks.entry(chunk_index + 1).or_default().extend(deferred);
            }
        }

        order
            .into_iter()
            .filter_map(|index| outcomes.remove(&index))
            .collect()
    }
}
