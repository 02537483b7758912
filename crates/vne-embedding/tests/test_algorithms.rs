use rstest::rstest;

use vne_embedding::embedding_algorithms::greedy::Greedy;
use vne_embedding::embedding_algorithms::ranked_bfs::RankedBfs;
use vne_embedding::embedding_algorithms::ranked_max_match::RankedMaxMatch;
use vne_embedding::{EmbeddingAlgorithm, EmbeddingFailure, NodeRankConfig};
use vne_network::topologies::{german_network, italian_network, reference_requests};
use vne_network::{AllocationVerdict, Embedding, SubstrateNetwork, VirtualNetworkRequest};

fn assert_feasible(embedding: &Embedding, request: &VirtualNetworkRequest, substrate: &SubstrateNetwork) {
    assert!(embedding.is_node_disjoint());
    assert_eq!(embedding.node_mapping.len(), request.node_count());
    assert_eq!(embedding.link_mapping.len(), request.link_count());
    for link in request.links() {
        let (a, b) = link.endpoints;
        let path = embedding.path_of(a, b).unwrap();
        assert_eq!(path.first(), Some(&embedding.node_mapping[&a]));
        assert_eq!(path.last(), Some(&embedding.node_mapping[&b]));
    }
    assert_eq!(substrate.can_allocate(embedding, request), AllocationVerdict::Success);
}

fn first_request() -> VirtualNetworkRequest {
    reference_requests().unwrap().remove(0)
}

// Two nodes with a single link, too thin for the requested bandwidth.
fn thin_link_substrate() -> SubstrateNetwork {
    SubstrateNetwork::from_parts(&[(1, 100), (2, 100)], &[(1, 2, 5, None)]).unwrap()
}

// The largest node (2, 150 CPU) takes the first virtual node, then 7 and 4 follow.
#[test]
fn test_greedy_reference_scenario() {
    let substrate = german_network().unwrap();
    let request = first_request();
    let embedding = Greedy::new().embed(&request, &substrate).unwrap();
    assert_eq!(embedding.host_of(1), Some(2));
    assert_eq!(embedding.host_of(2), Some(7));
    assert_eq!(embedding.host_of(3), Some(4));
    assert_eq!(embedding.path_of(1, 2), Some(&vec![2, 4, 7]));
    assert_eq!(embedding.path_of(2, 3), Some(&vec![7, 4]));
    assert_feasible(&embedding, &request, &substrate);
}

#[test]
fn test_ranked_bfs_reference_scenario() {
    let substrate = german_network().unwrap();
    let request = first_request();
    let embedding = RankedBfs::new(3, 3, NodeRankConfig::default())
        .embed(&request, &substrate)
        .unwrap();
    assert_eq!(embedding.host_of(2), Some(2));
    assert_eq!(embedding.host_of(3), Some(4));
    assert_eq!(embedding.host_of(1), Some(5));
    assert_eq!(embedding.path_of(2, 3), Some(&vec![2, 4]));
    assert_eq!(embedding.path_of(1, 2), Some(&vec![5, 2]));
}

#[test]
fn test_ranked_max_match_reference_scenario() {
    let substrate = german_network().unwrap();
    let request = first_request();
    let embedding = RankedMaxMatch::new(3, NodeRankConfig::default())
        .embed(&request, &substrate)
        .unwrap();
    assert_eq!(embedding.host_of(2), Some(2));
    assert_eq!(embedding.host_of(3), Some(4));
    assert_eq!(embedding.host_of(1), Some(5));
    assert_eq!(embedding.path_of(1, 2), Some(&vec![5, 2]));
}

#[rstest]
#[case::greedy(Box::new(Greedy::new()))]
#[case::ranked_bfs(Box::new(RankedBfs::new(3, 3, NodeRankConfig::default())))]
#[case::ranked_max_match(Box::new(RankedMaxMatch::new(3, NodeRankConfig::default())))]
fn test_embeddings_are_feasible(#[case] algorithm: Box<dyn EmbeddingAlgorithm>) {
    for mut substrate in [german_network().unwrap(), italian_network().unwrap()] {
        let mut embedded = 0;
        for request in reference_requests().unwrap() {
            if let Ok(embedding) = algorithm.embed(&request, &substrate) {
                assert_feasible(&embedding, &request, &substrate);
                substrate.allocate(&embedding, &request);
                assert!(substrate.capacity_invariant_holds());
                embedded += 1;
            }
        }
        assert!(embedded > 0);
    }
}

#[rstest]
#[case::greedy(Box::new(Greedy::new()))]
#[case::ranked_bfs(Box::new(RankedBfs::new(3, 3, NodeRankConfig::default())))]
#[case::ranked_max_match(Box::new(RankedMaxMatch::new(3, NodeRankConfig::default())))]
fn test_embeddings_are_deterministic(#[case] algorithm: Box<dyn EmbeddingAlgorithm>) {
    let substrate = italian_network().unwrap();
    for request in reference_requests().unwrap() {
        assert_eq!(
            algorithm.embed(&request, &substrate),
            algorithm.embed(&request, &substrate)
        );
    }
}

#[rstest]
#[case::greedy(Box::new(Greedy::new()))]
#[case::ranked_bfs(Box::new(RankedBfs::new(3, 3, NodeRankConfig::default())))]
#[case::ranked_max_match(Box::new(RankedMaxMatch::new(3, NodeRankConfig::default())))]
fn test_thin_link_is_rejected(#[case] algorithm: Box<dyn EmbeddingAlgorithm>) {
    let substrate = thin_link_substrate();
    let request = VirtualNetworkRequest::from_parts(1, 0., 10., &[(1, 10), (2, 10)], &[(1, 2, 10)]).unwrap();
    let result = algorithm.embed(&request, &substrate);
    assert!(matches!(
        result,
        Err(EmbeddingFailure::NoPath { .. }) | Err(EmbeddingFailure::InfeasibleRequest { .. })
    ));
    assert!(substrate.is_fully_available());
}

#[test]
fn test_zero_capacity_substrate() {
    let substrate =
        SubstrateNetwork::from_parts(&[(1, 0), (2, 0), (3, 0)], &[(1, 2, 100, None), (2, 3, 100, None)]).unwrap();
    for request in reference_requests().unwrap() {
        assert_eq!(
            RankedBfs::new(3, 3, NodeRankConfig::default()).embed(&request, &substrate),
            Err(EmbeddingFailure::UndefinedRank)
        );
        assert_eq!(
            RankedMaxMatch::new(3, NodeRankConfig::default()).embed(&request, &substrate),
            Err(EmbeddingFailure::UndefinedRank)
        );
        assert!(Greedy::new().embed(&request, &substrate).is_err());
    }
}

// Bandwidth promised to an earlier link of the same request is not available to later ones.
#[test]
fn test_links_share_bandwidth_within_request() {
    let substrate =
        SubstrateNetwork::from_parts(&[(1, 100), (2, 90), (3, 80)], &[(1, 2, 100, None), (2, 3, 100, None)]).unwrap();
    let request =
        VirtualNetworkRequest::from_parts(1, 0., 10., &[(1, 10), (2, 10), (3, 10)], &[(1, 2, 60), (1, 3, 60)])
            .unwrap();
    assert_eq!(
        Greedy::new().embed(&request, &substrate),
        Err(EmbeddingFailure::NoPath { link: (1, 3) })
    );
}

// Node 1 has the highest rank, but its neighbors are too small for the second virtual node.
// Ranks: 1 > 4 > 2 > 5 > 3, candidates for both virtual nodes: 1, 4, 5.
fn backtracking_substrate() -> SubstrateNetwork {
    SubstrateNetwork::from_parts(
        &[(1, 100), (2, 5), (3, 5), (4, 60), (5, 60)],
        &[(1, 2, 100, None), (1, 3, 100, None), (2, 4, 100, None), (4, 5, 50, None)],
    )
    .unwrap()
}

fn pair_request() -> VirtualNetworkRequest {
    VirtualNetworkRequest::from_parts(1, 0., 10., &[(1, 50), (2, 50)], &[(1, 2, 10)]).unwrap()
}

#[test]
fn test_ranked_bfs_backtracks() {
    let substrate = backtracking_substrate();
    let embedding = RankedBfs::new(1, 3, NodeRankConfig::default())
        .embed(&pair_request(), &substrate)
        .unwrap();
    assert_eq!(embedding.host_of(1), Some(4));
    assert_eq!(embedding.host_of(2), Some(5));
    assert_eq!(embedding.path_of(1, 2), Some(&vec![4, 5]));
}

#[test]
fn test_ranked_bfs_backtrack_limit() {
    let substrate = backtracking_substrate();
    assert_eq!(
        RankedBfs::new(1, 0, NodeRankConfig::default()).embed(&pair_request(), &substrate),
        Err(EmbeddingFailure::SearchExhausted { node: 2, backtracks: 0 })
    );
}

#[test]
fn test_ranked_bfs_relaxes_hop_limit() {
    let substrate = backtracking_substrate();
    let embedding = RankedBfs::new(2, 0, NodeRankConfig::default())
        .embed(&pair_request(), &substrate)
        .unwrap();
    assert_eq!(embedding.host_of(1), Some(1));
    assert_eq!(embedding.host_of(2), Some(4));
    assert_eq!(embedding.path_of(1, 2), Some(&vec![1, 2, 4]));
}

// Substrate path 1-3-2-4 with a thick first link, so node 1 outranks node 2. With one hop
// allowed the hub of the star request fits on 1 or 2, but only 2 reaches a host for every leaf.
fn revisit_substrate() -> SubstrateNetwork {
    SubstrateNetwork::from_parts(
        &[(1, 100), (2, 60), (3, 45), (4, 35)],
        &[(1, 3, 100, None), (3, 2, 30, None), (2, 4, 30, None)],
    )
    .unwrap()
}

fn star_request() -> VirtualNetworkRequest {
    VirtualNetworkRequest::from_parts(1, 0., 10., &[(1, 50), (2, 40), (3, 30)], &[(1, 2, 10), (1, 3, 10)]).unwrap()
}

// Virtual node 2 lands on 3 first, then fails to move elsewhere. The second backtrack moves the hub
// to 2 and forgets that 3 was tried, so virtual node 2 is placed on 3 again.
#[rstest]
#[case(2)]
#[case(5)]
fn test_ranked_bfs_revisits_candidates(#[case] max_backtrack: usize) {
    let substrate = revisit_substrate();
    let request = star_request();
    let embedding = RankedBfs::new(1, max_backtrack, NodeRankConfig::default())
        .embed(&request, &substrate)
        .unwrap();
    assert_eq!(embedding.host_of(1), Some(2));
    assert_eq!(embedding.host_of(2), Some(3));
    assert_eq!(embedding.host_of(3), Some(4));
    assert_eq!(embedding.path_of(1, 2), Some(&vec![2, 3]));
    assert_eq!(embedding.path_of(1, 3), Some(&vec![2, 4]));
    assert_feasible(&embedding, &request, &substrate);
}

#[test]
fn test_ranked_bfs_revisit_needs_two_backtracks() {
    assert_eq!(
        RankedBfs::new(1, 1, NodeRankConfig::default()).embed(&star_request(), &revisit_substrate()),
        Err(EmbeddingFailure::SearchExhausted { node: 2, backtracks: 1 })
    );
}

#[test]
fn test_disconnected_request() {
    let substrate = german_network().unwrap();
    let request =
        VirtualNetworkRequest::from_parts(1, 0., 10., &[(1, 10), (2, 10), (3, 10), (4, 10)], &[(1, 2, 5), (3, 4, 5)])
            .unwrap();
    assert_eq!(
        RankedBfs::new(3, 3, NodeRankConfig::default()).embed(&request, &substrate),
        Err(EmbeddingFailure::DisconnectedRequest)
    );
}
