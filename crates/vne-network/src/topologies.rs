//! Reference substrates and request queue used in experiments.

use crate::error::TopologyError;
use crate::node::NodeId;
use crate::request::{RequestId, VirtualNetworkRequest};
use crate::substrate::SubstrateNetwork;

type RequestData = (
    RequestId,
    f64,
    f64,
    &'static [(NodeId, u32)],
    &'static [(NodeId, NodeId, u32)],
);

/// 7-node German reference network with link costs.
pub fn german_network() -> Result<SubstrateNetwork, TopologyError> {
    SubstrateNetwork::from_parts(
        &[(1, 100), (2, 150), (3, 80), (4, 120), (5, 90), (6, 110), (7, 140)],
        &[
            (1, 2, 100, Some(2)),
            (1, 3, 80, Some(3)),
            (2, 4, 120, Some(1)),
            (2, 5, 90, Some(4)),
            (2, 6, 135, Some(1)),
            (3, 4, 100, Some(2)),
            (4, 5, 110, Some(1)),
            (6, 1, 95, Some(3)),
            (7, 5, 105, Some(1)),
            (7, 4, 125, Some(2)),
            (2, 3, 85, Some(3)),
        ],
    )
}

/// 10-node Italian reference network with link costs.
pub fn italian_network() -> Result<SubstrateNetwork, TopologyError> {
    SubstrateNetwork::from_parts(
        &[
            (1, 100),
            (2, 150),
            (3, 80),
            (4, 120),
            (5, 90),
            (6, 110),
            (7, 140),
            (8, 200),
            (9, 170),
            (10, 130),
        ],
        &[
            (1, 2, 100, Some(2)),
            (1, 3, 80, Some(3)),
            (1, 7, 120, Some(1)),
            (2, 4, 90, Some(4)),
            (2, 7, 135, Some(1)),
            (3, 5, 100, Some(2)),
            (4, 8, 110, Some(1)),
            (5, 6, 95, Some(3)),
            (5, 7, 105, Some(1)),
            (6, 7, 125, Some(2)),
            (6, 9, 85, Some(3)),
            (7, 8, 145, Some(5)),
            (7, 9, 185, Some(3)),
            (8, 10, 70, Some(1)),
            (9, 10, 200, Some(4)),
        ],
    )
}

const REFERENCE_REQUESTS: &[RequestData] = &[
    // 3-node path
    (1, 5., 20., &[(1, 15), (2, 25), (3, 20)], &[(1, 2, 10), (2, 3, 15)]),
    // 3-node triangle
    (2, 10., 30., &[(1, 20), (2, 15), (3, 25)], &[(1, 2, 8), (2, 3, 12), (1, 3, 10)]),
    // 4-node path
    (3, 15., 25., &[(1, 18), (2, 22), (3, 16), (4, 28)], &[(1, 2, 12), (2, 3, 9), (3, 4, 14)]),
    // 4-node star
    (4, 20., 35., &[(1, 30), (2, 12), (3, 18), (4, 14)], &[(1, 2, 16), (1, 3, 11), (1, 4, 13)]),
    // 5-node path
    (5, 25., 40., &[(1, 14), (2, 26), (3, 19), (4, 23), (5, 17)], &[(1, 2, 7), (2, 3, 11), (3, 4, 9), (4, 5, 13)]),
    // 3-node path (high requirements)
    (6, 30., 15., &[(1, 35), (2, 40), (3, 32)], &[(1, 2, 25), (2, 3, 20)]),
    // 4-node cycle
    (7, 35., 28., &[(1, 21), (2, 17), (3, 24), (4, 19)], &[(1, 2, 8), (2, 3, 12), (3, 4, 10), (4, 1, 15)]),
    // 5-node star
    (8, 40., 45., &[(1, 35), (2, 10), (3, 12), (4, 15), (5, 11)], &[(1, 2, 14), (1, 3, 9), (1, 4, 17), (1, 5, 12)]),
    // 3-node triangle (low requirements)
    (9, 45., 22., &[(1, 8), (2, 12), (3, 10)], &[(1, 2, 5), (2, 3, 6), (1, 3, 4)]),
    // 4-node partial mesh
    (10, 50., 33., &[(1, 22), (2, 18), (3, 25), (4, 20)], &[(1, 2, 11), (1, 3, 14), (2, 4, 9), (3, 4, 16), (1, 4, 12)]),
    // 5-node cycle
    (
        11,
        55.,
        38.,
        &[(1, 16), (2, 21), (3, 14), (4, 19), (5, 23)],
        &[(1, 2, 7), (2, 3, 10), (3, 4, 8), (4, 5, 12), (5, 1, 9)],
    ),
    // 3-node path
    (12, 60., 18., &[(1, 13), (2, 27), (3, 15)], &[(1, 2, 18), (2, 3, 11)]),
    // 4-node tree
    (13, 65., 42., &[(1, 24), (2, 16), (3, 29), (4, 12)], &[(1, 2, 13), (1, 3, 15), (2, 4, 8)]),
    // 5-node partial mesh
    (
        14,
        70.,
        50.,
        &[(1, 20), (2, 15), (3, 25), (4, 18), (5, 22)],
        &[(1, 2, 10), (1, 3, 14), (2, 4, 7), (3, 5, 11), (4, 5, 13), (1, 5, 9)],
    ),
    // 3-node triangle (medium requirements)
    (15, 75., 26., &[(1, 18), (2, 22), (3, 16)], &[(1, 2, 12), (2, 3, 14), (1, 3, 8)]),
    // 4-node path (high bandwidth)
    (16, 80., 35., &[(1, 17), (2, 21), (3, 14), (4, 26)], &[(1, 2, 22), (2, 3, 18), (3, 4, 25)]),
    // 5-node tree
    (17, 85., 44., &[(1, 28), (2, 13), (3, 19), (4, 15), (5, 11)], &[(1, 2, 16), (1, 3, 12), (2, 4, 9), (2, 5, 7)]),
    // 3-node path (short lifetime)
    (18, 90., 12., &[(1, 31), (2, 19), (3, 24)], &[(1, 2, 17), (2, 3, 21)]),
    // 4-node diamond
    (19, 95., 37., &[(1, 20), (2, 14), (3, 18), (4, 25)], &[(1, 2, 10), (1, 3, 12), (2, 4, 14), (3, 4, 11)]),
    // 5-node line with branch
    (20, 100., 48., &[(1, 16), (2, 23), (3, 20), (4, 17), (5, 21)], &[(1, 2, 8), (2, 3, 13), (3, 4, 15), (3, 5, 10)]),
];

/// Fixed queue of 20 requests arriving every 5 time units from t = 5 to t = 100.
pub fn reference_requests() -> Result<Vec<VirtualNetworkRequest>, TopologyError> {
    REFERENCE_REQUESTS
        .iter()
        .map(|&(id, arrival_time, lifetime, nodes, links)| {
            VirtualNetworkRequest::from_parts(id, arrival_time, lifetime, nodes, links)
        })
        .collect()
}
