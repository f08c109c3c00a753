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

use bencher::Bencher;
use bencher::{benchmark_group, benchmark_main};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use topogen::random::random_matching;
use topogen::{Config, Descriptor, Layout, Network, RandomRegular, Topology};

const NODES: usize = 1024;
const RACK_SIZE: usize = 16;

fn matching(bench: &mut Bencher) {
    let pool = (0..NODES).collect::<Vec<_>>();
    let mut rng = Xoshiro256StarStar::seed_from_u64(0);
    bench.iter(|| random_matching(&pool, &mut rng, |a, b| a / RACK_SIZE != b / RACK_SIZE));
}

fn regular(bench: &mut Bencher) {
    let vertices = (0..NODES).collect::<Vec<_>>();
    let base = Topology::simple();
    let builder = RandomRegular {
        degree: 4,
        trials: 10,
        min_achievement: None,
        clamp: true,
    };
    let mut rng = Xoshiro256StarStar::seed_from_u64(0);
    bench.iter(|| builder.build(&base, &vertices, &mut rng, |_, _| true));
}

fn wire(bench: &mut Bencher, tokens: &[&str]) {
    let config = Config::default();
    let layout = Layout::generate(NODES, RACK_SIZE, &config.floor).unwrap();
    let descriptors = tokens
        .iter()
        .map(|t| Descriptor::parse(t).unwrap())
        .collect::<Vec<_>>();
    bench.iter(|| {
        let mut network = Network::new(layout.clone(), &config);
        network.wire_all(&descriptors).unwrap();
        network.cable_total()
    });
}

fn dragonfly_random_outside(bench: &mut Bencher) {
    wire(bench, &["df", "do-2-300"]);
}

fn skywalk(bench: &mut Bencher) {
    wire(bench, &["sky"]);
}

benchmark_group!(builders, matching, regular);
benchmark_group!(networks, dragonfly_random_outside, skywalk);
benchmark_main!(builders, networks);
