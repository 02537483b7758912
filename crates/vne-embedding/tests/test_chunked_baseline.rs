use vne_embedding::embedding_algorithms::chunked_baseline::{weighted_revenue, ChunkedBaseline};
use vne_embedding::{BatchEmbeddingAlgorithm, EmbeddingFailure};
use vne_network::topologies::{german_network, reference_requests};
use vne_network::{SubstrateNetwork, VirtualNetworkRequest};

// Two 50-CPU nodes: a request of two 40-CPU nodes blocks every other such request.
fn pair_substrate() -> SubstrateNetwork {
    SubstrateNetwork::from_parts(&[(1, 50), (2, 50)], &[(1, 2, 100, None)]).unwrap()
}

fn pair_request(id: u32, arrival_time: f64, lifetime: f64) -> VirtualNetworkRequest {
    VirtualNetworkRequest::from_parts(id, arrival_time, lifetime, &[(1, 40), (2, 40)], &[(1, 2, 10)]).unwrap()
}

#[test]
fn test_windows() {
    let baseline = ChunkedBaseline::new(25., 3);
    assert_eq!(baseline.window_of(0.), 0);
    assert_eq!(baseline.window_of(25.), 0);
    assert_eq!(baseline.window_of(25.5), 1);
    assert_eq!(baseline.window_of(50.), 1);
    assert_eq!(baseline.window_of(80.), 3);
    assert_eq!(baseline.window_end(3), 100.);

    let requests: Vec<VirtualNetworkRequest> = [80., 25.5, 0., 25.]
        .iter()
        .enumerate()
        .map(|(i, time)| pair_request(i as u32 + 1, *time, 10.))
        .collect();
    let chunks = baseline.create_chunks(&requests);
    assert_eq!(chunks.keys().copied().collect::<Vec<_>>(), vec![0, 1, 3]);
    assert_eq!(chunks[&0], vec![2, 3]);
    assert_eq!(chunks[&1], vec![1]);
    assert_eq!(chunks[&3], vec![0]);
}

// Windows far apart are visited directly. Arrivals past the last representable window share it
// and are still embedded no earlier than they arrive.
#[test]
fn test_widely_spaced_arrivals() {
    let baseline = ChunkedBaseline::new(25., 3);
    assert_eq!(baseline.window_of(2.5e8), 9_999_999);
    assert_eq!(baseline.window_of(1e21), usize::MAX - 1);

    let requests = vec![pair_request(1, 1., 30.), pair_request(2, 2.5e8, 10.), pair_request(3, 1e21, 10.)];
    let chunks = baseline.create_chunks(&requests);
    assert_eq!(chunks.keys().copied().collect::<Vec<_>>(), vec![0, 9_999_999, usize::MAX - 1]);

    let mut substrate = pair_substrate();
    let results = baseline.embed_batch(&requests, &mut substrate);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(results[0].embedding_time, Some(25.));
    assert_eq!(results[1].embedding_time, Some(2.5e8));
    assert_eq!(results[2].embedding_time, Some(1e21));
}

#[test]
fn test_weighted_revenue() {
    let request = reference_requests().unwrap().remove(0);
    assert_eq!(weighted_revenue(&request), 2 * 60 + 25);
}

// The second request fails in its own window and in the next one, and stays blocked even
// though the resources are free again in the third window.
#[test]
fn test_single_retry() {
    let mut substrate = pair_substrate();
    let requests = vec![pair_request(1, 1., 30.), pair_request(2, 2., 10.), pair_request(3, 60., 10.)];
    let results = ChunkedBaseline::new(25., 3).embed_batch(&requests, &mut substrate);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].request_id, 1);
    assert!(results[0].success);
    assert_eq!(results[0].embedding_time, Some(25.));
    assert_eq!(results[0].arrival_time, 1.);

    assert_eq!(results[1].request_id, 2);
    assert!(!results[1].success);
    assert_eq!(results[1].decision_time, 50.);
    assert_eq!(results[1].embedding_time, None);
    assert_eq!(results[1].failure, Some(EmbeddingFailure::InfeasibleRequest { node: 1 }));
    assert_eq!(results[1].active_requests, 1);

    assert_eq!(results[2].request_id, 3);
    assert!(results[2].success);
    assert_eq!(results[2].embedding_time, Some(75.));
    assert_eq!(results[2].active_requests, 1);

    // only the last request still holds resources
    assert_eq!(substrate.available_cpu(), 20);
}

#[test]
fn test_retry_succeeds_after_departure() {
    let mut substrate = pair_substrate();
    let requests = vec![pair_request(1, 1., 20.), pair_request(2, 2., 10.)];
    let results = ChunkedBaseline::new(25., 3).embed_batch(&requests, &mut substrate);
    assert!(results[0].success);
    assert!(results[1].success);
    assert_eq!(results[1].embedding_time, Some(50.));
    assert_eq!(results[1].waiting_time(), Some(48.));
}

// Requests are served by weighted revenue, not by arrival order.
#[test]
fn test_revenue_order_within_window() {
    let mut substrate = pair_substrate();
    let small = pair_request(1, 1., 100.);
    let large =
        VirtualNetworkRequest::from_parts(2, 2., 100., &[(1, 45), (2, 45)], &[(1, 2, 10)]).unwrap();
    let results = ChunkedBaseline::new(25., 3).embed_batch(&[small, large], &mut substrate);
    assert!(!results[0].success);
    assert!(results[1].success);
}

// A request whose link cannot be routed gives back the CPU of its nodes.
#[test]
fn test_link_failure_rolls_back() {
    let mut substrate = SubstrateNetwork::from_parts(&[(1, 50), (2, 50)], &[(1, 2, 5, None)]).unwrap();
    let results = ChunkedBaseline::new(25., 3).embed_batch(&[pair_request(1, 0., 10.)], &mut substrate);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].failure, Some(EmbeddingFailure::NoPath { link: (1, 2) }));
    assert_eq!(results[0].decision_time, 50.);
    assert!(substrate.is_fully_available());
}

#[test]
fn test_reference_queue() {
    let mut substrate = german_network().unwrap();
    let requests = reference_requests().unwrap();
    let results = ChunkedBaseline::new(25., 3).embed_batch(&requests, &mut substrate);
    assert_eq!(results.len(), requests.len());
    assert!(substrate.capacity_invariant_holds());
    for (result, request) in results.iter().zip(&requests) {
        assert_eq!(result.request_id, request.id);
        if let (Some(time), Some(embedding)) = (result.embedding_time, &result.embedding) {
            assert!(time >= request.arrival_time);
            assert!(embedding.is_node_disjoint());
            assert_eq!(embedding.node_mapping.len(), request.node_count());
            assert_eq!(embedding.link_mapping.len(), request.link_count());
        }
    }
}

#[test]
#[should_panic(expected = "Time window must be > 0")]
fn test_zero_window() {
    ChunkedBaseline::new(0., 3);
}
