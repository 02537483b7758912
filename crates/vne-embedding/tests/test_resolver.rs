use vne_embedding::options::parse_config_value;
use vne_embedding::{strategy_resolver, AlgorithmParams, ResolveError, Strategy};

#[test]
fn test_parse_config_value() {
    assert_eq!(parse_config_value("Greedy"), ("Greedy".to_string(), None));
    assert_eq!(
        parse_config_value("RankedBFS[max_hop=2,max_backtrack=5]"),
        ("RankedBFS".to_string(), Some("max_hop=2,max_backtrack=5".to_string()))
    );
}

#[test]
fn test_resolve_algorithms() {
    let params = AlgorithmParams::default();
    for (config, name) in [
        ("Greedy", "Greedy"),
        ("RankedBFS", "RankedBFS"),
        ("RW-BFS[max_hop=2]", "RankedBFS"),
        ("RankedMaxMatch[k=2]", "RankedMaxMatch"),
        ("RW-MaxMatch", "RankedMaxMatch"),
    ] {
        let strategy = strategy_resolver(config, &params).unwrap();
        assert!(matches!(strategy, Strategy::Online(_)));
        assert_eq!(strategy.name(), name);
    }
    for config in ["ChunkedBaseline", "Yu2008[time_window=10]"] {
        let strategy = strategy_resolver(config, &params).unwrap();
        assert!(matches!(strategy, Strategy::Batch(_)));
        assert_eq!(strategy.name(), "ChunkedBaseline");
    }
}

#[test]
fn test_resolve_errors() {
    let params = AlgorithmParams::default();
    assert_eq!(
        strategy_resolver("FirstFit", &params).err(),
        Some(ResolveError::UnknownAlgorithm("FirstFit".to_string()))
    );
    assert_eq!(
        strategy_resolver("Greedy[k=abc]", &params).err(),
        Some(ResolveError::InvalidOption {
            name: "k".to_string(),
            value: "abc".to_string()
        })
    );
    assert_eq!(
        strategy_resolver("Greedy[depth=1]", &params).err(),
        Some(ResolveError::UnknownOption("depth".to_string()))
    );
    assert!(matches!(
        strategy_resolver("ChunkedBaseline[time_window=0]", &params),
        Err(ResolveError::InvalidParameter(_))
    ));
}

#[test]
fn test_options_override_params() {
    let mut params = AlgorithmParams::default();
    let options = vne_embedding::options::parse_options("max_hop=5, p_jump=0.2, k_paths=1");
    params.apply_options(&options).unwrap();
    assert_eq!(params.max_hop, 5);
    assert_eq!(params.k_paths, 1);
    assert_eq!(params.noderank.p_jump, 0.2);
    assert_eq!(params.max_backtrack, 3);
}
