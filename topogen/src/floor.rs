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

//! rack placement on the machine-room floor
//!
//! The rack depth direction is X, the rack width direction is Y and the
//! position inside a rack is Z.

use crate::config::{CablingScheme, FloorConfig, LayoutScheme};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lengths and coordinates, in centimetres.
pub type Length = u64;

/// `(x, y)` position of a rack.
pub type Coordinate = (Length, Length);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rack {
    pub id: usize,
    /// member nodes in ascending order
    pub nodes: Vec<usize>,
    pub coord: Coordinate,
}

/// Node-to-rack assignment and rack coordinates. Read-only once built.
#[derive(Clone, Debug)]
pub struct Layout {
    floor: FloorConfig,
    racks: Vec<Rack>,
    rack_of: Vec<usize>,
    rack_size: usize,
    xs: Vec<Length>,
    ys: Vec<Length>,
    rack_at: HashMap<Coordinate, usize>,
    max_distance: Length,
}

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// number of racks along X for `rack_count` racks
fn rows(rack_count: usize, floor: &FloorConfig) -> usize {
    match floor.layout {
        LayoutScheme::Mesh => (rack_count as f64).sqrt().ceil() as usize,
        LayoutScheme::Room => {
            let side = (rack_count as f64 * floor.rack_width as f64 * floor.rack_depth as f64).sqrt();
            ((side / floor.rack_depth as f64).floor() as usize).max(1)
        }
    }
}

impl Layout {
    /// Spreads `node_count` nodes over `ceil(node_count / rack_size)` racks
    /// and places the racks on a grid.
    pub fn generate(node_count: usize, rack_size: usize, floor: &FloorConfig) -> Result<Self> {
        if node_count == 0 || rack_size == 0 {
            return Err(Error::configuration(
                format!("{}r{}", node_count, rack_size),
                "node count and rack size must be positive",
            ));
        }
        let rack_count = ceil_div(node_count, rack_size);
        let nx = rows(rack_count, floor);
        let ny = ceil_div(rack_count, nx);
        log::debug!(
            "{} nodes in {} racks on a {}x{} grid",
            node_count,
            rack_count,
            nx,
            ny
        );

        let mut racks = (0..rack_count)
            .map(|r| Rack {
                id: r,
                nodes: Vec::new(),
                coord: (
                    (r / ny) as Length * floor.rack_depth,
                    (r % ny) as Length * floor.rack_width,
                ),
            })
            .collect::<Vec<_>>();
        let rack_of = (0..node_count)
            .map(|n| n * rack_count / node_count)
            .collect::<Vec<_>>();
        for (n, &r) in rack_of.iter().enumerate() {
            racks[r].nodes.push(n);
        }
        Self::assemble(floor, racks, rack_of)
    }

    /// Rebuilds a layout from `(node, rack, coordinate)` placements.
    ///
    /// Node ids must cover `0..n` and rack ids `0..r` without gaps. A node
    /// may be repeated within its rack but not placed in two racks.
    pub fn from_placements(
        floor: &FloorConfig,
        placements: impl IntoIterator<Item = (usize, usize, Coordinate)>,
    ) -> Result<Self> {
        let mut nodes_in: BTreeMap<usize, (Coordinate, Vec<usize>)> = BTreeMap::new();
        let mut rack_by_node: BTreeMap<usize, usize> = BTreeMap::new();
        for (node, rack, coord) in placements {
            let entry = nodes_in.entry(rack).or_insert((coord, Vec::new()));
            if entry.0 != coord {
                return Err(Error::configuration(
                    format!("rack {}", rack),
                    format!("placed at both {:?} and {:?}", entry.0, coord),
                ));
            }
            match rack_by_node.insert(node, rack) {
                None => entry.1.push(node),
                Some(previous) if previous != rack => {
                    return Err(Error::configuration(
                        format!("node {}", node),
                        format!("placed in both rack {} and rack {}", previous, rack),
                    ));
                }
                Some(_) => {}
            }
        }
        if let Some((&last, _)) = nodes_in.iter().next_back() {
            if last + 1 != nodes_in.len() {
                return Err(Error::GeometryMismatch {
                    what: "racks",
                    expected: last + 1,
                    found: nodes_in.len(),
                });
            }
        }
        if let Some((&last, _)) = rack_by_node.iter().next_back() {
            if last + 1 != rack_by_node.len() {
                return Err(Error::GeometryMismatch {
                    what: "nodes",
                    expected: last + 1,
                    found: rack_by_node.len(),
                });
            }
        }
        if rack_by_node.is_empty() {
            return Err(Error::configuration("layout", "no node placed"));
        }

        let rack_of = rack_by_node.into_iter().map(|(_, r)| r).collect();
        let racks = nodes_in
            .into_iter()
            .map(|(id, (coord, mut nodes))| {
                nodes.sort_unstable();
                Rack { id, nodes, coord }
            })
            .collect();
        Self::assemble(floor, racks, rack_of)
    }

    fn assemble(floor: &FloorConfig, racks: Vec<Rack>, rack_of: Vec<usize>) -> Result<Self> {
        let mut rack_at = HashMap::new();
        for rack in &racks {
            if let Some(other) = rack_at.insert(rack.coord, rack.id) {
                return Err(Error::configuration(
                    format!("rack {}", rack.id),
                    format!("shares coordinate {:?} with rack {}", rack.coord, other),
                ));
            }
        }
        let rack_size = racks.iter().map(|r| r.nodes.len()).max().unwrap_or(0);
        let mut xs = racks.iter().map(|r| r.coord.0).collect::<Vec<_>>();
        let mut ys = racks.iter().map(|r| r.coord.1).collect::<Vec<_>>();
        xs.sort_unstable();
        xs.dedup();
        ys.sort_unstable();
        ys.dedup();

        let mut layout = Self {
            floor: floor.clone(),
            racks,
            rack_of,
            rack_size,
            xs,
            ys,
            rack_at,
            max_distance: 0,
        };
        layout.max_distance = layout
            .racks
            .iter()
            .map(|r| layout.distance(0, r.id))
            .max()
            .unwrap_or(0);
        Ok(layout)
    }

    /// Reads `<node> <rack> <y> <x>` lines; lines with fewer fields are skipped.
    pub fn read_coordinates(reader: impl BufRead, floor: &FloorConfig) -> Result<Self> {
        let mut placements = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(Error::io(Path::new("<coordinates>")))?;
            let fields = line.split_whitespace().collect::<Vec<_>>();
            if fields.len() < 4 {
                continue;
            }
            let parse_err = || Error::Parse {
                line: line_no + 1,
                content: line.clone(),
            };
            let node = fields[0].parse::<usize>().map_err(|_| parse_err())?;
            let rack = fields[1].parse::<usize>().map_err(|_| parse_err())?;
            let y = fields[2].parse::<Length>().map_err(|_| parse_err())?;
            let x = fields[3].parse::<Length>().map_err(|_| parse_err())?;
            placements.push((node, rack, (x, y)));
        }
        Self::from_placements(floor, placements)
    }

    /// Loads a coordinate file and checks its rack count when one is expected.
    pub fn load(path: &Path, floor: &FloorConfig, expected_racks: Option<usize>) -> Result<Self> {
        let file = File::open(path).map_err(Error::io(path))?;
        let layout = Self::read_coordinates(BufReader::new(file), floor)?;
        if let Some(expected) = expected_racks {
            if layout.rack_count() != expected {
                return Err(Error::GeometryMismatch {
                    what: "racks",
                    expected,
                    found: layout.rack_count(),
                });
            }
        }
        log::info!(
            "loaded {} nodes in {} racks from {}",
            layout.node_count(),
            layout.rack_count(),
            path.display()
        );
        Ok(layout)
    }

    pub fn floor(&self) -> &FloorConfig {
        &self.floor
    }

    pub fn node_count(&self) -> usize {
        self.rack_of.len()
    }

    pub fn nodes(&self) -> std::ops::Range<usize> {
        0..self.node_count()
    }

    pub fn rack_count(&self) -> usize {
        self.racks.len()
    }

    /// the largest rack population
    pub fn rack_size(&self) -> usize {
        self.rack_size
    }

    pub fn racks(&self) -> &[Rack] {
        &self.racks
    }

    pub fn rack(&self, rack: usize) -> &Rack {
        &self.racks[rack]
    }

    pub fn rack_ids(&self) -> Vec<usize> {
        (0..self.racks.len()).collect()
    }

    pub fn rack_of(&self, node: usize) -> usize {
        self.rack_of[node]
    }

    pub fn coord_of(&self, rack: usize) -> Coordinate {
        self.racks[rack].coord
    }

    pub fn rack_at(&self, coord: Coordinate) -> Option<usize> {
        self.rack_at.get(&coord).copied()
    }

    /// `(distinct x count, distinct y count)`
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.xs.len(), self.ys.len())
    }

    pub fn max_distance(&self) -> Length {
        self.max_distance
    }

    pub fn distance(&self, rack_a: usize, rack_b: usize) -> Length {
        let (x1, y1) = self.coord_of(rack_a);
        let (x2, y2) = self.coord_of(rack_b);
        let (dx, dy) = (abs_diff(x1, x2), abs_diff(y1, y2));
        match self.floor.cabling {
            CablingScheme::Manhattan => dx + dy,
            CablingScheme::Euclidean => ((dx * dx + dy * dy) as f64).sqrt().round() as Length,
        }
    }

    pub fn cable_length(&self, n1: usize, n2: usize) -> Length {
        match self.distance(self.rack_of(n1), self.rack_of(n2)) {
            0 => self.floor.overhead_inner,
            d => self.floor.overhead_outer + d,
        }
    }

    /// for each y, the racks ordered by x
    pub fn racks_along_x(&self) -> Vec<Vec<usize>> {
        self.ys
            .iter()
            .map(|&y| self.xs.iter().filter_map(|&x| self.rack_at((x, y))).collect())
            .collect()
    }

    /// for each x, the racks ordered by y
    pub fn racks_along_y(&self) -> Vec<Vec<usize>> {
        self.xs
            .iter()
            .map(|&x| self.ys.iter().filter_map(|&y| self.rack_at((x, y))).collect())
            .collect()
    }

    pub fn nodes_along_x(&self) -> Vec<Vec<usize>> {
        self.slot_slices(self.racks_along_x())
    }

    pub fn nodes_along_y(&self) -> Vec<Vec<usize>> {
        self.slot_slices(self.racks_along_y())
    }

    pub fn nodes_along_z(&self) -> Vec<Vec<usize>> {
        self.racks.iter().map(|r| r.nodes.clone()).collect()
    }

    // the z-th member of every rack in the slice, for every slot z
    fn slot_slices(&self, rack_slices: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        let mut slices = Vec::with_capacity(rack_slices.len() * self.rack_size);
        for racks in rack_slices {
            for z in 0..self.rack_size {
                slices.push(
                    racks
                        .iter()
                        .filter_map(|&r| self.racks[r].nodes.get(z).copied())
                        .collect(),
                );
            }
        }
        slices
    }
}

fn abs_diff(a: Length, b: Length) -> Length {
    if a > b {
        a - b
    } else {
        b - a
    }
}

#[cfg(test)]
mod floor_tests {
    use super::*;
    use std::collections::HashSet;

    fn floor() -> FloorConfig {
        FloorConfig::default()
    }

    #[test]
    fn hundred_nodes_in_racks_of_eight() {
        let layout = Layout::generate(100, 8, &floor()).unwrap();
        assert_eq!(layout.rack_count(), 13);
        assert_eq!(layout.grid_shape(), (4, 4));
        assert!(layout.racks().iter().all(|r| r.nodes.len() <= 8));
        assert_eq!(layout.racks().iter().map(|r| r.nodes.len()).sum::<usize>(), 100);
        let coords = layout.racks().iter().map(|r| r.coord).collect::<HashSet<_>>();
        assert_eq!(coords.len(), 13);
        for n in layout.nodes() {
            assert!(layout.rack(layout.rack_of(n)).nodes.contains(&n));
        }
    }

    #[test]
    fn rack_coordinates() {
        let layout = Layout::generate(32, 8, &floor()).unwrap();
        let coords = layout.racks().iter().map(|r| r.coord).collect::<Vec<_>>();
        assert_eq!(coords, vec![(0, 0), (0, 60), (210, 0), (210, 60)]);
        assert_eq!(layout.rack(1).nodes, (8..16).collect::<Vec<_>>());
        assert_eq!(layout.max_distance(), 270);
    }

    #[test]
    fn room_layout() {
        let room = FloorConfig {
            layout: LayoutScheme::Room,
            ..floor()
        };
        let layout = Layout::generate(128, 8, &room).unwrap();
        // sqrt(16 * 60 * 210) / 210 = 2.13
        assert_eq!(layout.grid_shape(), (2, 8));
        let layout = Layout::generate(128, 8, &floor()).unwrap();
        assert_eq!(layout.grid_shape(), (4, 4));
    }

    #[test]
    fn cable_lengths() {
        let layout = Layout::generate(32, 8, &floor()).unwrap();
        assert_eq!(layout.cable_length(0, 7), 200);
        assert_eq!(layout.cable_length(0, 8), 400 + 60);
        assert_eq!(layout.cable_length(0, 16), 400 + 210);
        assert_eq!(layout.cable_length(0, 24), 400 + 270);
        assert_eq!(layout.cable_length(24, 0), layout.cable_length(0, 24));
    }

    #[test]
    fn euclidean_distance() {
        let diagonal = FloorConfig {
            cabling: CablingScheme::Euclidean,
            ..floor()
        };
        let layout = Layout::generate(64, 8, &diagonal).unwrap();
        // rack 4 sits at (210, 60) on a 3x3 grid
        assert_eq!(layout.coord_of(4), (210, 60));
        assert_eq!(layout.distance(0, 4), 218);
        assert_eq!(layout.distance(0, 1), 60);
    }

    #[test]
    fn slices() {
        // 3 racks on a 2x2 grid, the last one short
        let layout = Layout::generate(6, 2, &floor()).unwrap();
        assert_eq!(layout.racks_along_x(), vec![vec![0, 2], vec![1]]);
        assert_eq!(layout.racks_along_y(), vec![vec![0, 1], vec![2]]);
        assert_eq!(
            layout.nodes_along_x(),
            vec![vec![0, 4], vec![1, 5], vec![2], vec![3]]
        );
        assert_eq!(
            layout.nodes_along_y(),
            vec![vec![0, 2], vec![1, 3], vec![4], vec![5]]
        );
        assert_eq!(layout.nodes_along_z(), vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
    }

    #[test]
    fn short_racks_are_skipped() {
        let layout = Layout::generate(7, 4, &floor()).unwrap();
        assert_eq!(layout.rack_count(), 2);
        assert_eq!(layout.rack(0).nodes, vec![0, 1, 2, 3]);
        assert_eq!(layout.rack(1).nodes, vec![4, 5, 6]);
        let along_x = layout.nodes_along_x();
        assert_eq!(along_x, vec![vec![0, 4], vec![1, 5], vec![2, 6], vec![3]]);
        assert_eq!(along_x.iter().map(|s| s.len()).sum::<usize>(), 7);
    }

    #[test]
    fn zero_geometry() {
        assert!(matches!(
            Layout::generate(0, 8, &floor()),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Layout::generate(16, 0, &floor()),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn read_coordinates() {
        let text = "0 0 0 0\n1 0 0 0\n2 1 60 0\n3 1 60 0\n\n";
        let layout = Layout::read_coordinates(text.as_bytes(), &floor()).unwrap();
        assert_eq!(layout.node_count(), 4);
        assert_eq!(layout.rack_count(), 2);
        assert_eq!(layout.rack_size(), 2);
        assert_eq!(layout.coord_of(1), (0, 60));
        assert_eq!(layout.cable_length(0, 2), 460);
    }

    #[test]
    fn reject_sparse_coordinates() {
        let gap = "0 0 0 0\n1 2 60 0\n";
        assert!(matches!(
            Layout::read_coordinates(gap.as_bytes(), &floor()),
            Err(Error::GeometryMismatch { what: "racks", .. })
        ));
        let missing_node = "0 0 0 0\n2 1 60 0\n";
        assert!(matches!(
            Layout::read_coordinates(missing_node.as_bytes(), &floor()),
            Err(Error::GeometryMismatch { what: "nodes", .. })
        ));
        let garbage = "0 0 0 zero\n";
        assert!(matches!(
            Layout::read_coordinates(garbage.as_bytes(), &floor()),
            Err(Error::Parse { line: 1, .. })
        ));
        let shared = "0 0 0 0\n1 1 0 0\n";
        assert!(matches!(
            Layout::read_coordinates(shared.as_bytes(), &floor()),
            Err(Error::Configuration { .. })
        ));
        let two_racks = "0 0 0 0\n1 0 0 0\n1 1 60 0\n2 1 60 0\n";
        assert!(matches!(
            Layout::read_coordinates(two_racks.as_bytes(), &floor()),
            Err(Error::Configuration { descriptor, .. }) if descriptor == "node 1"
        ));
        let repeated = "0 0 0 0\n1 0 0 0\n1 0 0 0\n";
        let layout = Layout::read_coordinates(repeated.as_bytes(), &floor()).unwrap();
        assert_eq!(layout.node_count(), 2);
    }
}
