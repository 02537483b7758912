use vne_embedding::{NodeRankConfig, ResolveError};
use vne_network::TopologyError;
use vne_sim::{ConfigError, SimulationConfig, TieBreak, VneSimulation};

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

#[test]
fn test_defaults() {
    let config: SimulationConfig = "{}".parse().unwrap();
    assert_eq!(config, SimulationConfig::default());
    assert_eq!(config.algorithm, "RankedBFS");
    assert_eq!(config.time_window, 25.);
    assert_eq!(config.k_paths, 3);
    assert_eq!(config.max_hop, 3);
    assert_eq!(config.max_backtrack, 3);
    assert_eq!(config.noderank, NodeRankConfig::default());
    assert_eq!(config.tie_break, TieBreak::DeparturesFirst);
    assert!(config.substrate.is_none());
    assert!(config.requests.is_empty());
}

#[test]
fn test_tuned_config() {
    let config = SimulationConfig::from_file(&name_wrapper("tuned.yaml")).unwrap();
    assert_eq!(config.time_window, 10.);
    assert_eq!(config.k_paths, 5);
    assert_eq!(config.noderank.max_iterations, 50);
    assert_eq!(config.noderank.epsilon, 0.001);
    assert_eq!(config.noderank.p_jump, 0.15);
    assert_eq!(config.tie_break, TieBreak::ArrivalsFirst);

    // Options of the algorithm string are applied only when the strategy is resolved.
    let params = config.algorithm_params();
    assert_eq!(params.max_hop, 3);
    assert_eq!(params.k_paths, 5);
    assert_eq!(config.build_strategy().unwrap().name(), "RankedBFS");
    assert!(config.build_substrate().unwrap().is_none());
}

#[test]
fn test_simulation_from_config() {
    let config = SimulationConfig::from_file(&name_wrapper("two_nodes.yaml")).unwrap();
    assert_eq!(config.requests.len(), 3);
    let substrate = config.build_substrate().unwrap().unwrap();
    assert_eq!(substrate.total_cpu(), 100);
    assert_eq!(substrate.link_between(2, 1).unwrap().bandwidth_total, 100);

    let mut sim = VneSimulation::from_config(&config).unwrap();
    let outcomes: Vec<bool> = sim.run().iter().map(|r| r.success).collect();
    assert_eq!(outcomes, vec![true, false, true]);
    assert_eq!(sim.time(), 20.);
}

#[test]
fn test_batch_from_config() {
    let config = SimulationConfig::from_file(&name_wrapper("batch.yaml")).unwrap();
    let mut sim = VneSimulation::from_config(&config).unwrap();
    assert_eq!(sim.strategy_name(), "ChunkedBaseline");
    let results = sim.run().to_vec();
    assert_eq!(results.len(), 2);
    let first = results.iter().find(|r| r.request_id == 1).unwrap();
    assert!(first.success);
    assert_eq!(first.embedding_time, Some(20.));
    // The second request is retried once in the following window and blocked there.
    let second = results.iter().find(|r| r.request_id == 2).unwrap();
    assert!(!second.success);
    assert_eq!(second.decision_time, 40.);
    assert_eq!(sim.time(), 40.);
}

#[test]
fn test_config_errors() {
    assert!(matches!(
        SimulationConfig::from_file(&name_wrapper("missing.yaml")),
        Err(ConfigError::Io { .. })
    ));
    assert!(matches!(
        "algorithm: [unclosed".parse::<SimulationConfig>(),
        Err(ConfigError::Yaml(_))
    ));
    assert!(matches!("k_paths: -1".parse::<SimulationConfig>(), Err(ConfigError::Yaml(_))));

    let config: SimulationConfig = "algorithm: FirstFit".parse().unwrap();
    assert!(matches!(
        config.build_strategy(),
        Err(ConfigError::Resolve(ResolveError::UnknownAlgorithm(_)))
    ));

    let config: SimulationConfig = "algorithm: Greedy[speed=2]".parse().unwrap();
    assert!(matches!(
        config.build_strategy(),
        Err(ConfigError::Resolve(ResolveError::UnknownOption(_)))
    ));

    let config: SimulationConfig = "time_window: 0".parse().unwrap();
    assert!(matches!(
        config.build_strategy(),
        Err(ConfigError::Resolve(ResolveError::InvalidParameter(_)))
    ));

    let config = SimulationConfig::from_file(&name_wrapper("disconnected.yaml")).unwrap();
    assert!(matches!(
        config.build_substrate(),
        Err(ConfigError::Topology(TopologyError::Disconnected))
    ));

    // Without a substrate there is nothing to simulate.
    let config: SimulationConfig = "algorithm: Greedy".parse().unwrap();
    assert!(matches!(
        VneSimulation::from_config(&config),
        Err(ConfigError::InvalidValue(_))
    ));
}

#[test]
fn test_invalid_requests() {
    let config: SimulationConfig = r#"
requests:
  - { id: 1, arrival_time: 0, lifetime: 0, nodes: [{ id: 1, cpu: 5 }] }
"#
    .parse()
    .unwrap();
    assert!(matches!(config.build_requests(), Err(ConfigError::InvalidValue(_))));

    let config: SimulationConfig = r#"
requests:
  - { id: 1, arrival_time: 0, lifetime: 5, nodes: [{ id: 1, cpu: 5 }] }
  - { id: 1, arrival_time: 1, lifetime: 5, nodes: [{ id: 1, cpu: 5 }] }
"#
    .parse()
    .unwrap();
    assert!(matches!(config.build_requests(), Err(ConfigError::InvalidValue(_))));

    let config: SimulationConfig = r#"
requests:
  - id: 1
    arrival_time: 0
    lifetime: 5
    nodes: [{ id: 1, cpu: 5 }]
    links: [{ from: 1, to: 2, bandwidth: 5 }]
"#
    .parse()
    .unwrap();
    assert!(matches!(
        config.build_requests(),
        Err(ConfigError::Topology(TopologyError::UnknownNode(2)))
    ));
}
