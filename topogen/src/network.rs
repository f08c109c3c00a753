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

//! a wired floor
//!
//! A `Network` owns the rack layout, the node graph and the random generator,
//! and applies topology descriptors to it one after another. The X axis is
//! the rack depth direction, Y the rack width direction and Z the position
//! inside a rack.
//!
//! A directed network stores arcs. Its links are pairs of opposite arcs, each
//! arc a cable of its own, and only directed networks accept unidirectional
//! topologies.

use crate::config::Config;
use crate::cost::CostSummary;
use crate::floor::{Layout, Length};
use crate::graph::{GraphKind, Topology};
use crate::lattice::{self, Pairs, Wiring};
use crate::random::{self, BuildReport, RandomRegular};
use crate::topology::{Descriptor, Direction, TopologyKind};
use crate::{Error, Result};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use std::borrow::Cow;
use std::collections::HashMap;

/// Hands out the members of each rack in turn, wrapping around, so that
/// rack-level links are spread over the nodes of a rack.
#[derive(Clone, Debug)]
pub struct RackCursor {
    positions: Vec<usize>,
}

impl RackCursor {
    pub fn new(layout: &Layout) -> Self {
        Self {
            positions: vec![0; layout.rack_count()],
        }
    }

    pub fn next(&mut self, layout: &Layout, rack: usize) -> Option<usize> {
        let nodes = &layout.rack(rack).nodes;
        if nodes.is_empty() {
            return None;
        }
        let position = &mut self.positions[rack];
        let node = nodes[*position % nodes.len()];
        *position = (*position + 1) % nodes.len();
        Some(node)
    }
}

/// Which node pairs a node-level random build may link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeConstraint {
    Any,
    DifferentRack,
    SameRowOrColumn,
}

impl NodeConstraint {
    fn accepts(self, layout: &Layout, n1: usize, n2: usize) -> bool {
        let (r1, r2) = (layout.rack_of(n1), layout.rack_of(n2));
        match self {
            Self::Any => true,
            Self::DifferentRack => r1 != r2,
            Self::SameRowOrColumn => {
                let ((x1, y1), (x2, y2)) = (layout.coord_of(r1), layout.coord_of(r2));
                x1 == x2 || y1 == y2
            }
        }
    }
}

/// Which rack pairs a rack-level build may link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RackConstraint {
    max_distance: Option<Length>,
    direction: Direction,
}

impl RackConstraint {
    const ANY: Self = Self {
        max_distance: None,
        direction: Direction::Any,
    };

    fn accepts(&self, layout: &Layout, r1: usize, r2: usize) -> bool {
        let ((x1, y1), (x2, y2)) = (layout.coord_of(r1), layout.coord_of(r2));
        let aligned = x1 == x2 || y1 == y2;
        let direction = match self.direction {
            Direction::Any => true,
            Direction::Straight => aligned,
            Direction::Diagonal => !aligned,
        };
        direction
            && self
                .max_distance
                .map_or(true, |limit| layout.distance(r1, r2) <= limit)
    }
}

/// links a node received within one rack-level build
struct LinkCounter {
    map: HashMap<usize, usize>,
}

impl LinkCounter {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    fn get(&self, node: usize) -> usize {
        self.map.get(&node).copied().unwrap_or(0)
    }

    fn bump(&mut self, node: usize) {
        *self.map.entry(node).or_insert(0) += 1;
    }
}

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

fn sizes_or(sizes: &[usize], default: &[usize]) -> Vec<usize> {
    if sizes.is_empty() {
        default.to_vec()
    } else {
        sizes.to_vec()
    }
}

/// the adjacent pairs, whatever the direction of their arcs
fn links(topology: &Topology) -> Cow<'_, Topology> {
    if topology.is_directed() {
        Cow::Owned(topology.undirected())
    } else {
        Cow::Borrowed(topology)
    }
}

/// `ceil(count * fraction)`, at most `count`
fn share_of(count: usize, fraction: f64) -> usize {
    ((count as f64 * fraction).ceil() as usize).min(count)
}

/// smallest `d` with `2^d >= n`
fn ceil_log2(n: usize) -> usize {
    let mut d = 0;
    while (1usize << d) < n {
        d += 1;
    }
    d
}

#[derive(Clone, Debug)]
pub struct Network {
    config: Config,
    layout: Layout,
    topology: Topology,
    cable_total: Length,
    rng: Xoshiro256StarStar,
    reports: Vec<BuildReport>,
}

impl Network {
    pub fn new(layout: Layout, config: &Config) -> Self {
        let topology = if config.directed {
            Topology::directed()
        } else {
            Topology::simple()
        };
        Self {
            config: config.clone(),
            layout,
            topology,
            cable_total: 0,
            rng: Xoshiro256StarStar::seed_from_u64(config.seed),
            reports: Vec::new(),
        }
    }

    /// Starts from an existing edge list; every endpoint must be a node of
    /// `layout`. A directed network reads every pair as an arc.
    pub fn from_edge_list(
        layout: Layout,
        edges: impl IntoIterator<Item = (usize, usize)>,
        config: &Config,
    ) -> Result<Self> {
        let mut network = Self::new(layout, config);
        let node_count = network.layout.node_count();
        for (n1, n2) in edges {
            let highest = n1.max(n2);
            if highest >= node_count {
                return Err(Error::GeometryMismatch {
                    what: "nodes",
                    expected: node_count,
                    found: highest + 1,
                });
            }
            if network.topology.is_directed() {
                network.add_arc(n1, n2);
            } else {
                network.add_link(n1, n2);
            }
        }
        Ok(network)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// total cable length of all links [cm]
    pub fn cable_total(&self) -> Length {
        self.cable_total
    }

    /// outcomes of the randomized builds so far, in order
    pub fn reports(&self) -> &[BuildReport] {
        &self.reports
    }

    /// Links `n1` and `n2`, with an arc each way on a directed network.
    /// Returns true if the wiring changed.
    pub fn add_link(&mut self, n1: usize, n2: usize) -> bool {
        if self.topology.is_directed() {
            let forward = self.add_arc(n1, n2);
            self.add_arc(n2, n1) || forward
        } else {
            self.add_arc(n1, n2)
        }
    }

    fn add_arc(&mut self, n1: usize, n2: usize) -> bool {
        let added = self.topology.add_edge(n1, n2);
        if added {
            self.cable_total += self.layout.cable_length(n1, n2);
            log::trace!("  {}--{}", n1, n2);
        }
        added
    }

    pub fn add_links(&mut self, pairs: impl IntoIterator<Item = (usize, usize)>) -> usize {
        pairs
            .into_iter()
            .filter(|&(n1, n2)| self.add_link(n1, n2))
            .count()
    }

    /// Unlinks `n1` and `n2`, both arcs on a directed network.
    pub fn delete_link(&mut self, n1: usize, n2: usize) -> bool {
        if self.topology.is_directed() {
            let forward = self.delete_arc(n1, n2);
            self.delete_arc(n2, n1) || forward
        } else {
            self.delete_arc(n1, n2)
        }
    }

    fn delete_arc(&mut self, n1: usize, n2: usize) -> bool {
        let deleted = self.topology.delete_edge(n1, n2);
        if deleted {
            self.cable_total -= self.layout.cable_length(n1, n2);
        }
        deleted
    }

    /// cables per link
    fn arcs_per_link(&self) -> Length {
        if self.topology.is_directed() {
            2
        } else {
            1
        }
    }

    /// Rack-to-rack graph of the current wiring, intra-rack links excluded.
    /// A multigraph counts the node links between each pair of racks.
    pub fn rack_graph(&self, kind: GraphKind) -> Topology {
        let mut racks = Topology::new(kind);
        for (n1, n2, _) in self.topology.edges() {
            racks.add_edge(self.layout.rack_of(n1), self.layout.rack_of(n2));
        }
        racks
    }

    pub fn cost_summary(&self) -> CostSummary {
        CostSummary::evaluate(&self.layout, &self.topology, &self.config.cost)
    }

    pub fn wire_all<'a>(&mut self, descriptors: impl IntoIterator<Item = &'a Descriptor>) -> Result<()> {
        for descriptor in descriptors {
            self.wire(descriptor)?;
        }
        Ok(())
    }

    /// Applies one descriptor on top of the current wiring. On error the
    /// network is left as it was before the call.
    pub fn wire(&mut self, descriptor: &Descriptor) -> Result<()> {
        let edges_before = self.topology.edge_count();
        let saved = (
            self.topology.clone(),
            self.cable_total,
            self.rng.clone(),
            self.reports.len(),
        );
        if let Err(error) = self.apply(descriptor) {
            let (topology, cable_total, rng, reports) = saved;
            self.topology = topology;
            self.cable_total = cable_total;
            self.rng = rng;
            self.reports.truncate(reports);
            log::debug!("'{}' rolled back", descriptor);
            return Err(error);
        }

        log::info!(
            "'{}': {} -> {} edges, cable {}cm",
            descriptor,
            edges_before,
            self.topology.edge_count(),
            self.cable_total
        );
        Ok(())
    }

    fn apply(&mut self, descriptor: &Descriptor) -> Result<()> {
        let token = descriptor.token();
        let node_count = self.layout.node_count();
        let rack_size = self.layout.rack_size();
        let (nx, ny) = self.layout.grid_shape();

        if descriptor.kind().is_unidirectional() && !self.topology.is_directed() {
            return Err(Error::configuration(
                token,
                "unidirectional links need a directed network",
            ));
        }

        match descriptor.kind() {
            TopologyKind::Hypercube { dimension } => {
                let dimension = dimension.unwrap_or_else(|| ceil_log2(node_count));
                self.cube(token, &vec![2; dimension], Wiring::Line)?;
            }
            TopologyKind::Mesh { sizes } => {
                self.cube(token, &sizes_or(sizes, &[nx, ny, rack_size]), Wiring::Line)?
            }
            TopologyKind::Torus { sizes } => {
                self.cube(token, &sizes_or(sizes, &[nx, ny, rack_size]), Wiring::Ring)?
            }
            TopologyKind::FoldedTorus { sizes } => {
                self.cube(token, &sizes_or(sizes, &[nx, ny, rack_size]), Wiring::Folded)?
            }
            TopologyKind::Ring => self.cube(token, &[node_count], Wiring::Ring)?,
            TopologyKind::RandomRing { degree } => {
                self.cube(token, &[node_count], Wiring::Ring)?;
                let nodes = self.layout.nodes().collect::<Vec<_>>();
                self.random(&nodes, degree - 2, NodeConstraint::Any)?;
            }
            TopologyKind::RandomRingUpto { budget } => {
                self.check_budget(descriptor, *budget)?;
                self.cube(token, &[node_count], Wiring::Ring)?;
                let nodes = self.layout.nodes().collect::<Vec<_>>();
                self.random_upto(&nodes, *budget, NodeConstraint::Any);
            }
            TopologyKind::Skywalk { budget } => {
                if let Some(budget) = budget {
                    self.check_budget(descriptor, *budget)?;
                }
                self.skywalk(*budget);
            }
            TopologyKind::HyperX => {
                for slice in self.layout.nodes_along_z() {
                    self.add_links(lattice::full(&slice));
                }
                for slice in self.layout.nodes_along_y() {
                    self.add_links(lattice::full(&slice));
                }
                for slice in self.layout.nodes_along_x() {
                    self.add_links(lattice::full(&slice));
                }
            }
            TopologyKind::Dragonfly => {
                for slice in self.layout.nodes_along_z() {
                    self.add_links(lattice::full(&slice));
                }
                let mut cursor = RackCursor::new(&self.layout);
                let racks = self.layout.rack_ids();
                self.quasi_full(&racks, &mut cursor, &RackConstraint::ANY);
            }
            TopologyKind::DragonflyInside { degree } => {
                for slice in self.layout.nodes_along_z() {
                    if degree + 1 < rack_size {
                        self.random(&slice, *degree, NodeConstraint::Any)?;
                    } else {
                        self.add_links(lattice::full(&slice));
                    }
                }
            }
            TopologyKind::DragonflyOutside {
                degree,
                radius,
                direction,
            } => self.dragonfly_outside(*degree, *radius, *direction)?,
            TopologyKind::DragonflyHypercube { dimension } => {
                let dimension = dimension.unwrap_or_else(|| ceil_log2(self.layout.rack_count()));
                self.quasi_cube(token, &vec![2; dimension], false)?;
            }
            TopologyKind::DragonflyMesh { sizes } => {
                self.quasi_cube(token, &sizes_or(sizes, &[nx, ny]), false)?
            }
            TopologyKind::DragonflyTorus { sizes } => {
                self.quasi_cube(token, &sizes_or(sizes, &[nx, ny]), true)?
            }
            TopologyKind::ExpressCube { degrees, random } => {
                self.cube(token, &[nx, ny, rack_size], Wiring::Ring)?;
                let express = [degrees[0] - 2, degrees[1] - 2, degrees[2] - 2];
                self.straight(express, *random)?;
            }
            TopologyKind::Straight { degrees, random } => self.straight(*degrees, *random)?,
            TopologyKind::Random { degree } => {
                let nodes = self.layout.nodes().collect::<Vec<_>>();
                self.random(&nodes, *degree, NodeConstraint::Any)?;
            }
            TopologyKind::RandomInside { degree } => {
                for slice in self.layout.nodes_along_z() {
                    self.random(&slice, *degree, NodeConstraint::Any)?;
                }
            }
            TopologyKind::RandomOutside { degree } => {
                let nodes = self.layout.nodes().collect::<Vec<_>>();
                self.random(&nodes, *degree, NodeConstraint::DifferentRack)?;
            }
            TopologyKind::UnidirectionalRandom { degree } => self.random_arcs(*degree)?,
            TopologyKind::DeBruijn { base, digits } => self.de_bruijn(token, *base, *digits)?,
            TopologyKind::Cut { fraction } => {
                let pairs = links(&self.topology)
                    .edges()
                    .into_iter()
                    .map(|(n1, n2, _)| (n1, n2))
                    .collect::<Pairs>();
                let count = share_of(pairs.len(), *fraction);
                let cut = pairs
                    .choose_multiple(&mut self.rng, count)
                    .copied()
                    .collect::<Pairs>();
                for (n1, n2) in cut {
                    self.delete_link(n1, n2);
                }
            }
            TopologyKind::UnidirectionalCut { fraction } => {
                let arcs = self.topology.edges();
                let count = share_of(arcs.len(), *fraction);
                let cut = arcs
                    .choose_multiple(&mut self.rng, count)
                    .map(|&(n1, n2, _)| (n1, n2))
                    .collect::<Pairs>();
                for (n1, n2) in cut {
                    self.delete_arc(n1, n2);
                }
            }
        }
        Ok(())
    }

    fn check_budget(&self, descriptor: &Descriptor, budget: Length) -> Result<()> {
        let inner = self.layout.floor().overhead_inner;
        if budget < inner {
            return Err(Error::configuration(
                descriptor.token(),
                format!(
                    "cable length {}cm is shorter than the intra-rack overhead {}cm",
                    budget, inner
                ),
            ));
        }
        Ok(())
    }

    fn cube(&mut self, token: &str, sizes: &[usize], wiring: Wiring) -> Result<()> {
        let nodes = self.layout.nodes().collect::<Vec<_>>();
        let pairs = lattice::cube(&nodes, sizes, wiring)
            .ok_or_else(|| Error::configuration(token, too_large(sizes)))?;
        self.add_links(pairs);
        Ok(())
    }

    fn random(&mut self, vertices: &[usize], degree: usize, constraint: NodeConstraint) -> Result<()> {
        let builder = RandomRegular {
            degree,
            trials: self.config.trials,
            min_achievement: Some(self.config.min_achievement),
            clamp: true,
        };
        let build = {
            let base = links(&self.topology);
            let layout = &self.layout;
            builder.build(&base, vertices, &mut self.rng, |n1, n2| {
                constraint.accepts(layout, n1, n2)
            })?
        };
        self.reports.push(build.report);
        self.add_links(build.edges);
        Ok(())
    }

    /// `2 * degree` matching rounds of arcs over all nodes
    fn random_arcs(&mut self, degree: usize) -> Result<()> {
        let builder = RandomRegular {
            degree: 2 * degree,
            trials: self.config.trials,
            min_achievement: Some(self.config.min_achievement),
            clamp: true,
        };
        let nodes = self.layout.nodes().collect::<Vec<_>>();
        let build = builder.build(&self.topology, &nodes, &mut self.rng, |_, _| true)?;
        self.reports.push(build.report);
        for (n1, n2) in build.edges {
            self.add_arc(n1, n2);
        }
        Ok(())
    }

    /// arcs `i -> (i * base + d) mod base^digits`, self-loops dropped
    fn de_bruijn(&mut self, token: &str, base: usize, digits: u32) -> Result<()> {
        let node_count = self.layout.node_count();
        let order = base
            .checked_pow(digits)
            .filter(|&order| order == node_count)
            .ok_or_else(|| {
                Error::configuration(
                    token,
                    format!("needs exactly {}^{} nodes, the floor has {}", base, digits, node_count),
                )
            })?;
        for i in 0..order {
            for d in 0..base {
                // i * base + d without overflow: order is a multiple of base
                let j = (i % (order / base)) * base + d;
                self.add_arc(i, j);
            }
        }
        Ok(())
    }

    fn random_upto(&mut self, vertices: &[usize], budget: Length, constraint: NodeConstraint) {
        let arcs = self.arcs_per_link();
        let edges = {
            let base = links(&self.topology);
            let layout = &self.layout;
            random::random_upto(
                &base,
                vertices,
                budget,
                self.cable_total,
                self.config.trials,
                &mut self.rng,
                |n1, n2| arcs * layout.cable_length(n1, n2),
                |n1, n2| constraint.accepts(layout, n1, n2),
            )
        };
        self.add_links(edges);
    }

    fn unlink_downto(&mut self, budget: Length, constraint: NodeConstraint) {
        let edges = links(&self.topology)
            .edges()
            .into_iter()
            .map(|(n1, n2, _)| (n1, n2))
            .collect::<Pairs>();
        let arcs = self.arcs_per_link();
        let layout = &self.layout;
        let removed = random::unlink_random_downto(
            &edges,
            budget,
            self.cable_total,
            &mut self.rng,
            |n1, n2| arcs * layout.cable_length(n1, n2),
            |n1, n2| constraint.accepts(layout, n1, n2),
        );
        log::debug!("{} links removed to fit {}cm", removed.len(), budget);
        for (n1, n2) in removed {
            self.delete_link(n1, n2);
        }
    }

    /// full mesh inside each rack plus rack-level full meshes along every row
    /// and column
    fn skywalk(&mut self, budget: Option<Length>) {
        for slice in self.layout.nodes_along_z() {
            self.add_links(lattice::full(&slice));
        }
        let mut cursor = RackCursor::new(&self.layout);
        for racks in self.layout.racks_along_y() {
            self.quasi_full(&racks, &mut cursor, &RackConstraint::ANY);
        }
        for racks in self.layout.racks_along_x() {
            self.quasi_full(&racks, &mut cursor, &RackConstraint::ANY);
        }

        let budget = match budget {
            Some(budget) => budget,
            None => return,
        };
        if self.cable_total + self.layout.floor().overhead_inner < budget {
            let nodes = self.layout.nodes().collect::<Vec<_>>();
            self.random_upto(&nodes, budget, NodeConstraint::SameRowOrColumn);
        } else if self.cable_total > budget {
            self.unlink_downto(budget, NodeConstraint::DifferentRack);
        }
    }

    fn dragonfly_outside(&mut self, degree: usize, radius: Option<usize>, direction: Direction) -> Result<()> {
        let rack_size = self.layout.rack_size();
        let (nx, ny) = self.layout.grid_shape();
        let constraint = RackConstraint {
            max_distance: radius.map(|r| self.layout.max_distance() * r as Length / 100),
            direction,
        };
        let racks = self.layout.rack_ids();
        let mut cursor = RackCursor::new(&self.layout);
        match direction {
            Direction::Any => {
                if degree < ceil_div(nx * ny - 1, rack_size) {
                    self.quasi_random(&racks, degree, &mut cursor, &constraint)?;
                } else {
                    self.quasi_full(&racks, &mut cursor, &constraint);
                }
            }
            Direction::Straight => {
                if degree < ceil_div(nx - 1 + ny - 1, rack_size) {
                    self.quasi_random(&racks, degree, &mut cursor, &constraint)?;
                } else {
                    for row in self.layout.racks_along_y() {
                        self.quasi_full(&row, &mut cursor, &constraint);
                    }
                    for column in self.layout.racks_along_x() {
                        self.quasi_full(&column, &mut cursor, &constraint);
                    }
                }
            }
            Direction::Diagonal => self.quasi_random(&racks, degree, &mut cursor, &constraint)?,
        }
        Ok(())
    }

    /// `degrees` extra links along X, Y and Z, uniform or random
    fn straight(&mut self, degrees: [usize; 3], random: bool) -> Result<()> {
        let slices = [
            (self.layout.nodes_along_z(), degrees[2]),
            (self.layout.nodes_along_y(), degrees[1]),
            (self.layout.nodes_along_x(), degrees[0]),
        ];
        for (axis, degree) in slices.iter() {
            for slice in axis {
                if random {
                    self.random(slice, *degree, NodeConstraint::Any)?;
                } else {
                    self.add_links(lattice::uniform(slice, *degree));
                }
            }
        }
        Ok(())
    }

    /// Links every pair of `racks`, through the next node of each rack. The
    /// cursors advance even for pairs `constraint` refuses.
    fn quasi_full(&mut self, racks: &[usize], cursor: &mut RackCursor, constraint: &RackConstraint) {
        for (r1, r2) in racks.iter().copied().tuple_combinations::<(_, _)>() {
            let n1 = cursor.next(&self.layout, r1);
            let n2 = cursor.next(&self.layout, r2);
            if let (Some(n1), Some(n2)) = (n1, n2) {
                if constraint.accepts(&self.layout, r1, r2) {
                    self.add_link(n1, n2);
                }
            }
        }
    }

    /// Random rack-level wiring: `degree * rack_size` matching rounds over
    /// the rack pairs not linked yet, realised through the rack cursors. A
    /// node takes at most `degree` links from one call.
    fn quasi_random(
        &mut self,
        racks: &[usize],
        degree: usize,
        cursor: &mut RackCursor,
        constraint: &RackConstraint,
    ) -> Result<()> {
        if degree == 0 {
            return Ok(());
        }
        let plan = self.rack_graph(GraphKind::Simple);
        let builder = RandomRegular {
            degree: degree * self.layout.rack_size(),
            trials: self.config.trials,
            min_achievement: None,
            clamp: false,
        };
        let layout = &self.layout;
        let build = builder.build(&plan, racks, &mut self.rng, |r1, r2| {
            constraint.accepts(layout, r1, r2)
        })?;
        self.reports.push(build.report);

        let mut links = LinkCounter::new();
        for (r1, r2) in build.edges {
            let (n1, n2) = match (cursor.next(&self.layout, r1), cursor.next(&self.layout, r2)) {
                (Some(n1), Some(n2)) => (n1, n2),
                _ => continue,
            };
            if links.get(n1) < degree && links.get(n2) < degree {
                self.add_link(n1, n2);
                links.bump(n1);
                links.bump(n2);
            } else {
                log::warn!(
                    "racks {}--{} nodes {}--{} links ({})--({}): over degree",
                    r1,
                    r2,
                    n1,
                    n2,
                    links.get(n1),
                    links.get(n2)
                );
            }
        }
        Ok(())
    }

    /// Rack-level mesh or torus, realised through fresh rack cursors.
    fn quasi_cube(&mut self, token: &str, sizes: &[usize], ring: bool) -> Result<()> {
        let racks = self.layout.rack_ids();
        let mut cursor = RackCursor::new(&self.layout);
        let pairs = lattice::cube_pairs(racks.len(), sizes, ring)
            .ok_or_else(|| Error::configuration(token, too_large(sizes)))?;
        for (i, j) in pairs {
            let n1 = cursor.next(&self.layout, racks[i]);
            let n2 = cursor.next(&self.layout, racks[j]);
            if let (Some(n1), Some(n2)) = (n1, n2) {
                self.add_link(n1, n2);
            }
        }
        Ok(())
    }
}

fn too_large(sizes: &[usize]) -> String {
    format!("a grid of {} axes with these sizes has too many positions", sizes.len())
}
