use immunotree_core::{ContagionModel, NodeSet, SearchConfig, SearchTree, search};
use immunotree_env::{ContactGraph, Dynamics, EnvError, EnvParams, Environment, FinalValue, Strategy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn set(nodes: &[usize]) -> NodeSet {
    nodes.iter().copied().collect()
}

fn certain(false_negative_probability: f64) -> Dynamics {
    Dynamics {
        infect_probability: 1.0,
        false_negative_probability,
    }
}

fn single_edge(rng: &mut ChaCha8Rng) -> Environment {
    let graph = ContactGraph::from_edges(2, &[(0, 1)]).expect("valid graph");
    Environment::with_graph(graph, set(&[0]), certain(0.0), rng).expect("valid environment")
}

#[test]
fn isolated_infection_is_already_stable() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let graph = ContactGraph::empty(3).expect("valid graph");
    let env = Environment::with_graph(graph, set(&[0]), certain(0.0), &mut rng)
        .expect("valid environment");

    assert!(env.has_stabilized());
    assert_eq!(
        env.value().expect("stabilized"),
        FinalValue {
            infected_count: 1,
            resistant_count: 0,
            value: -1,
        }
    );
}

#[test]
fn unchecked_round_spreads_along_certain_edge() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut env = single_edge(&mut rng);
    assert!(!env.has_stabilized());
    assert!(matches!(env.value(), Err(EnvError::NotStabilized)));

    env.step(None, &mut rng).expect("no-op step");

    assert_eq!(env.infected(), set(&[0, 1]));
    assert!(env.has_stabilized());
    let value = env.value().expect("stabilized");
    assert_eq!(
        (value.infected_count, value.resistant_count, value.value),
        (2, 0, -2)
    );
}

#[test]
fn immunizing_the_neighbour_blocks_spread() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut env = single_edge(&mut rng);

    let counterfactual = env
        .simulate_step(env.infected(), env.resistant(), 1, &mut rng)
        .expect("valid action");
    assert_eq!(counterfactual.reward, -1);

    env.step(Some(1), &mut rng).expect("valid action");

    assert_eq!(env.infected(), set(&[0]));
    assert_eq!(env.resistant(), set(&[1]));
    assert!(env.has_stabilized());
    let value = env.value().expect("stabilized");
    assert_eq!(
        (value.infected_count, value.resistant_count, value.value),
        (1, 1, -2)
    );
}

#[test]
fn curing_the_source_is_free() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let env = single_edge(&mut rng);

    let transition = env
        .simulate_step(set(&[0]), NodeSet::empty(), 0, &mut rng)
        .expect("valid action");

    assert_eq!(transition.infected, NodeSet::empty());
    assert_eq!(transition.resistant, set(&[0]));
    assert_eq!(transition.reward, 0);
}

#[test]
fn counterfactual_step_leaves_real_state_untouched() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let graph = ContactGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).expect("valid graph");
    let env = Environment::with_graph(graph, set(&[1]), certain(0.0), &mut rng)
        .expect("valid environment");
    let before = (env.infected(), env.resistant(), env.observed_infected());

    let transition = env
        .simulate_step(set(&[1, 2]), set(&[0]), 3, &mut rng)
        .expect("valid action");

    assert_eq!(transition.infected, set(&[1, 2]));
    assert_eq!(transition.resistant, set(&[0, 3]));
    assert_eq!(transition.reward, -1);
    assert_eq!(
        (env.infected(), env.resistant(), env.observed_infected()),
        before
    );
}

#[test]
fn returned_sets_are_independent_copies() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let env = single_edge(&mut rng);

    let mut observed = env.observed_infected();
    let mut resistant = env.resistant();
    observed.insert(1);
    resistant.insert(0);

    assert_eq!(env.observed_infected(), set(&[0]));
    assert_eq!(env.resistant(), NodeSet::empty());
}

#[test]
fn observation_noise_extremes() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let graph = ContactGraph::empty(5).expect("valid graph");

    let exact = Environment::with_graph(graph.clone(), set(&[0, 2, 4]), certain(0.0), &mut rng)
        .expect("valid environment");
    assert_eq!(exact.observed_infected(), set(&[0, 2, 4]));

    let blind = Environment::with_graph(graph, set(&[0, 2, 4]), certain(1.0), &mut rng)
        .expect("valid environment");
    assert_eq!(blind.observed_infected(), NodeSet::empty());
    assert_eq!(blind.infected(), set(&[0, 2, 4]));
}

#[test]
fn stabilization_override_checks_the_given_sets() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let env = single_edge(&mut rng);

    assert!(!env.has_stabilized_with(None, None));
    assert!(env.has_stabilized_with(None, Some(set(&[1]))));
    assert!(env.has_stabilized_with(Some(set(&[0, 1])), None));
    assert!(env.has_stabilized_with(Some(NodeSet::empty()), None));
}

#[test]
fn invalid_actions_are_rejected_without_mutation() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut env = single_edge(&mut rng);

    let err = env.step(Some(2), &mut rng).expect_err("node 2 does not exist");
    assert!(matches!(err, EnvError::InvalidNode { node: 2, nodes: 2 }));
    assert_eq!(env.infected(), set(&[0]));

    assert!(
        env.simulate_step(set(&[0]), NodeSet::empty(), 7, &mut rng)
            .is_err()
    );
}

#[test]
fn construction_validates_parameters() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let base = EnvParams::default();

    let too_many = EnvParams {
        nodes: 3,
        initially_infected: 4,
        ..base.clone()
    };
    assert!(matches!(
        Environment::new(&too_many, &mut rng),
        Err(EnvError::TooManyInfected { .. })
    ));

    let empty = EnvParams {
        nodes: 0,
        initially_infected: 0,
        ..base.clone()
    };
    assert!(matches!(
        Environment::new(&empty, &mut rng),
        Err(EnvError::EmptyGraph)
    ));

    let huge = EnvParams {
        nodes: NodeSet::CAPACITY + 1,
        ..base.clone()
    };
    assert!(matches!(
        Environment::new(&huge, &mut rng),
        Err(EnvError::TooManyNodes { .. })
    ));

    for (edge, infect, hidden) in [(1.5, 0.5, 0.5), (0.1, -0.1, 0.5), (0.1, 0.5, f64::NAN)] {
        let params = EnvParams {
            edge_probability: edge,
            infect_probability: infect,
            false_negative_probability: hidden,
            ..base.clone()
        };
        assert!(matches!(
            Environment::new(&params, &mut rng),
            Err(EnvError::InvalidProbability { .. })
        ));
    }

    assert!(matches!(
        ContactGraph::from_edges(3, &[(1, 1)]),
        Err(EnvError::InvalidEdge { a: 1, b: 1, nodes: 3 })
    ));
    let graph = ContactGraph::empty(2).expect("valid graph");
    assert!(matches!(
        Environment::with_graph(graph, set(&[5]), certain(0.0), &mut rng),
        Err(EnvError::InvalidNode { node: 5, nodes: 2 })
    ));
}

#[test]
fn random_environment_matches_parameters() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let params = EnvParams {
        nodes: 40,
        initially_infected: 7,
        edge_probability: 0.2,
        ..EnvParams::default()
    };
    let env = Environment::new(&params, &mut rng).expect("valid parameters");

    assert_eq!(env.graph().node_count(), 40);
    assert_eq!(env.infected().len(), 7);
    assert!(env.resistant().is_empty());
    assert!(env.observed_infected().is_subset(&env.infected()));
    assert!(env.graph().edge_count() > 0);

    let all_infected = EnvParams {
        nodes: 5,
        initially_infected: 5,
        ..EnvParams::default()
    };
    let env = Environment::new(&all_infected, &mut rng).expect("m == n is valid");
    assert_eq!(env.infected(), NodeSet::full(5));
    assert!(env.has_stabilized());
}

#[test]
fn default_params_yaml_parses_and_round_trips() {
    let params = EnvParams::from_default_yaml().expect("default yaml should parse");
    assert_eq!(params, EnvParams::default());

    let yaml = params.to_yaml().expect("params serialize");
    assert_eq!(EnvParams::from_yaml_str(&yaml).expect("reparse"), params);
    assert!(EnvParams::from_yaml_str("initially_infected: 31").is_err());
}

#[test]
fn baselines_read_only_the_observation() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    // Node 1 touches 3 susceptible nodes, node 0 touches 1.
    let graph = ContactGraph::from_edges(6, &[(0, 5), (1, 2), (1, 3), (1, 4)]).expect("valid");
    let env = Environment::with_graph(graph, set(&[0, 1]), certain(0.0), &mut rng)
        .expect("valid environment");

    assert_eq!(
        Strategy::MostSusceptibleNeighbors.choose(&env, &mut rng),
        Some(1)
    );
    for _ in 0..20 {
        let picked = Strategy::RandomInfected
            .choose(&env, &mut rng)
            .expect("observed infection exists");
        assert!(env.observed_infected().contains(picked));
        let picked = Strategy::Random.choose(&env, &mut rng).expect("candidates exist");
        assert!(picked < 6);
    }
}

#[test]
fn baselines_pass_once_the_observation_is_stable() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let graph = ContactGraph::from_edges(2, &[(0, 1)]).expect("valid graph");
    // Node 0 is infected but hidden, so the observed state looks stable.
    let env = Environment::with_graph(graph, set(&[0]), certain(1.0), &mut rng)
        .expect("valid environment");

    assert!(!env.has_stabilized());
    for strategy in [
        Strategy::Random,
        Strategy::RandomInfected,
        Strategy::MostSusceptibleNeighbors,
    ] {
        assert_eq!(strategy.choose(&env, &mut rng), None, "{}", strategy.name());
    }
}

#[test]
fn environment_drives_the_planner_to_equilibrium() {
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    let params = EnvParams {
        nodes: 12,
        initially_infected: 2,
        edge_probability: 0.3,
        infect_probability: 0.5,
        false_negative_probability: 0.2,
    };
    let config = SearchConfig {
        time_budget_ms: 60_000,
        batch_size: 20,
        exploration: 0.8,
        max_simulations: Some(60),
    };
    let mut env = Environment::new(&params, &mut rng).expect("valid parameters");
    let mut tree = SearchTree::new();
    let mut rounds = 0;

    while !env.has_stabilized() {
        let outcome = search(&env, &mut tree, &config, &mut rng).expect("search should succeed");
        if let Some(action) = outcome.action {
            assert!(!env.resistant().contains(action));
            assert_eq!(outcome.simulations, 60);
        } else {
            assert_eq!(outcome.simulations, 0);
        }
        env.step(outcome.action, &mut rng).expect("valid action");
        rounds += 1;
        assert!(rounds <= 10 * params.nodes, "trial failed to stabilize");
    }

    let value = env.value().expect("stabilized");
    assert_eq!(
        value.value,
        -((value.infected_count + value.resistant_count) as i64)
    );
    assert_eq!(ContagionModel::node_count(&env), 12);
}
