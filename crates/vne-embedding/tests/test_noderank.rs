use approx::assert_abs_diff_eq;

use vne_embedding::noderank::{initial_noderank, resource_weights};
use vne_embedding::{compute_noderank, NodeRankConfig};
use vne_network::topologies::{german_network, reference_requests};
use vne_network::{ResourceView, SubstrateNetwork};

#[test]
fn test_initial_ranks_are_normalized() {
    let substrate = german_network().unwrap();
    let ranks = initial_noderank(&substrate, ResourceView::Available).unwrap();
    assert_abs_diff_eq!(ranks.values().sum::<f64>(), 1., epsilon = 1e-12);
    assert!(ranks.values().all(|rank| *rank >= 0.));

    for request in reference_requests().unwrap() {
        let ranks = initial_noderank(&request, ResourceView::Required).unwrap();
        assert_abs_diff_eq!(ranks.values().sum::<f64>(), 1., epsilon = 1e-12);
    }
}

#[test]
fn test_resource_weights() {
    let request = reference_requests().unwrap().remove(0);
    let weights = resource_weights(&request, ResourceView::Required);
    assert_eq!(weights[&1], 15. * 10.);
    assert_eq!(weights[&2], 25. * 25.);
    assert_eq!(weights[&3], 20. * 15.);
}

#[test]
fn test_substrate_ranking() {
    let substrate = german_network().unwrap();
    let ranks = compute_noderank(&substrate, ResourceView::Available, &NodeRankConfig::default()).unwrap();
    assert!(ranks.converged());
    assert_eq!(ranks.len(), 7);
    assert_eq!(ranks.descending(), vec![2, 4, 5, 1, 3, 7, 6]);
    assert_abs_diff_eq!(ranks.sum(), 1., epsilon = 1e-3);
    assert_eq!(ranks.get(42), 0.);
}

#[test]
fn test_request_ranking() {
    let request = reference_requests().unwrap().remove(0);
    let ranks = compute_noderank(&request, ResourceView::Required, &NodeRankConfig::default()).unwrap();
    assert_eq!(ranks.top(), Some(2));
    assert_eq!(ranks.descending(), vec![2, 3, 1]);
    assert_abs_diff_eq!(ranks.get(2), 0.5066, epsilon = 1e-3);
}

// Consumed resources shift the ranking towards free nodes.
#[test]
fn test_ranking_follows_available_resources() {
    let mut substrate = german_network().unwrap();
    substrate.allocate_cpu(2, 150);
    let ranks = compute_noderank(&substrate, ResourceView::Available, &NodeRankConfig::default()).unwrap();
    assert_eq!(ranks.get(2), 0.);
    let capacity_ranks = compute_noderank(&substrate, ResourceView::Capacity, &NodeRankConfig::default()).unwrap();
    assert_eq!(capacity_ranks.top(), Some(2));
}

#[test]
fn test_no_iterations_returns_initial_ranks() {
    let substrate = german_network().unwrap();
    let config = NodeRankConfig {
        max_iterations: 0,
        ..Default::default()
    };
    let ranks = compute_noderank(&substrate, ResourceView::Available, &config).unwrap();
    let initial = initial_noderank(&substrate, ResourceView::Available).unwrap();
    assert_eq!(ranks.iterations(), 0);
    assert!(!ranks.converged());
    for (node, rank) in ranks.iter() {
        assert_eq!(rank, initial[&node]);
    }
}

#[test]
fn test_deterministic() {
    let substrate = german_network().unwrap();
    let first = compute_noderank(&substrate, ResourceView::Available, &NodeRankConfig::default());
    let second = compute_noderank(&substrate, ResourceView::Available, &NodeRankConfig::default());
    assert_eq!(first, second);
}

#[test]
fn test_zero_capacity_is_undefined() {
    let substrate =
        SubstrateNetwork::from_parts(&[(1, 0), (2, 0), (3, 0)], &[(1, 2, 100, None), (2, 3, 100, None)]).unwrap();
    assert_eq!(
        compute_noderank(&substrate, ResourceView::Available, &NodeRankConfig::default()),
        None
    );
    assert_eq!(initial_noderank(&substrate, ResourceView::Capacity), None);
}
