// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use topogen::io::{load_edge_list, save_clustered, save_coordinates, save_edge_list};
use topogen::{CablingScheme, Config, Descriptor, Error, Layout, Network};

fn build(nodes: usize, rack_size: usize, tokens: &[&str], config: &Config) -> Network {
    let layout = Layout::generate(nodes, rack_size, &config.floor).unwrap();
    let mut network = Network::new(layout, config);
    let descriptors = tokens
        .iter()
        .map(|t| Descriptor::parse(t).unwrap())
        .collect::<Vec<_>>();
    network.wire_all(&descriptors).unwrap();
    network
}

#[test]
fn same_seed_same_wiring() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let config = Config {
        seed: 42,
        ..Config::default()
    };
    let tokens = ["df", "do-2-300", "r-2"];
    let a = build(64, 8, &tokens, &config);
    let b = build(64, 8, &tokens, &config);
    assert_eq!(a.topology().edges(), b.topology().edges());
    assert_eq!(a.cable_total(), b.cable_total());
    assert_eq!(a.cost_summary(), b.cost_summary());

    let dir = tempfile::tempdir().unwrap();
    for (name, network) in [("a", &a), ("b", &b)].iter() {
        save_edge_list(network, &dir.path().join(format!("{}.edges", name))).unwrap();
        save_coordinates(network.layout(), &dir.path().join(format!("{}.coord", name))).unwrap();
    }
    for ext in ["edges", "coord"].iter() {
        let read = |name: &str| std::fs::read(dir.path().join(format!("{}.{}", name, ext))).unwrap();
        assert_eq!(read("a"), read("b"), "{} files differ", ext);
    }

    let other = Config {
        seed: 43,
        ..Config::default()
    };
    let c = build(64, 8, &["rr-4"], &other);
    let d = build(64, 8, &["rr-4"], &config);
    assert_ne!(c.topology().edges(), d.topology().edges());
}

#[test]
fn saved_files_reload() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        seed: 7,
        ..Config::default()
    };
    let network = build(32, 8, &["df", "rr-2"], &config);

    let edges = dir.path().join("32r8+df+rr-2.edges");
    let coord = dir.path().join("32r8.coord");
    save_edge_list(&network, &edges).unwrap();
    save_coordinates(network.layout(), &coord).unwrap();

    let layout = Layout::load(&coord, &config.floor, Some(4)).unwrap();
    let weighted = load_edge_list(&edges).unwrap();
    for &(i, j, w) in &weighted {
        assert_eq!(layout.cable_length(i, j), w);
    }
    let reloaded = Network::from_edge_list(
        layout,
        weighted.into_iter().map(|(i, j, _)| (i, j)),
        &config,
    )
    .unwrap();
    assert_eq!(reloaded.topology().edges(), network.topology().edges());
    assert_eq!(reloaded.cable_total(), network.cable_total());
    assert_eq!(reloaded.cost_summary(), network.cost_summary());

    // more wiring on top of a reloaded list
    let mut extended = reloaded.clone();
    extended
        .wire(&Descriptor::parse("do-1-200").unwrap())
        .unwrap();
    assert!(extended.topology().edge_count() >= reloaded.topology().edge_count());

    let clustered = dir.path().join("32r8+df+rr-2.clu.edges");
    save_clustered(&network, &clustered).unwrap();
    let log = std::fs::read_to_string(dir.path().join("32r8+df+rr-2.clu.log")).unwrap();
    assert!(log.starts_with("#node      = 32\n"));
}

#[test]
fn saved_arcs_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        seed: 3,
        directed: true,
        ..Config::default()
    };
    let network = build(16, 8, &["ring", "ur-1", "ucut-10%"], &config);
    let arcs = dir.path().join("16r8+ring+ur-1+ucut-10%.arcs");
    save_edge_list(&network, &arcs).unwrap();

    let weighted = load_edge_list(&arcs).unwrap();
    assert_eq!(weighted.len(), network.topology().edge_count());
    let reloaded = Network::from_edge_list(
        network.layout().clone(),
        weighted.into_iter().map(|(i, j, _)| (i, j)),
        &config,
    )
    .unwrap();
    assert_eq!(reloaded.topology().edges(), network.topology().edges());
    assert_eq!(reloaded.cable_total(), network.cable_total());
}

#[test]
fn edges_outside_layout() {
    let config = Config::default();
    let layout = Layout::generate(16, 8, &config.floor).unwrap();
    assert!(matches!(
        Network::from_edge_list(layout, vec![(0, 1), (3, 20)], &config),
        Err(Error::GeometryMismatch {
            expected: 16,
            found: 21,
            ..
        })
    ));
}

#[test]
fn yaml_configuration() {
    let config = Config::from_str(
        "floor:\n  overhead_outer: 300\n  overhead_inner: 100\n  cabling: euclidean\ntrials: 3\nseed: 11\n",
    )
    .unwrap();
    assert_eq!(config.floor.cabling, CablingScheme::Euclidean);
    assert_eq!(config.floor.overhead_outer, 300);
    assert_eq!(config.trials, 3);

    let network = build(16, 8, &["ring"], &config);
    assert_eq!(network.topology().edge_count(), 16);
    assert_eq!(network.config().seed, 11);
    assert!(matches!(
        Config::from_str("floor:\n  overhead_outer: 100\n  overhead_inner: 300\n"),
        Err(Error::Configuration { .. })
    ));
}
