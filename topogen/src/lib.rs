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

//! Rack-aware interconnect synthesis: place nodes in racks on a machine-room
//! floor, wire them with composable topology descriptors and price the cables
//! and switches.

mod config;
mod cost;
mod error;
mod floor;
mod graph;
pub mod io;
pub mod lattice;
mod network;
pub mod random;
mod topology;

pub use crate::config::{CablingScheme, Config, FloorConfig, LayoutScheme};
pub use crate::config::{OVERHEAD_INNER, OVERHEAD_OUTER, RACK_DEPTH, RACK_WIDTH, RANDOM_TRIALS};
pub use crate::cost::{CostModel, CostSummary, LinearPrice, OpticalRegime};
pub use crate::error::{Error, Result};
pub use crate::floor::{Coordinate, Layout, Length, Rack};
pub use crate::graph::{canonical, GraphKind, Topology};
pub use crate::network::{Network, RackCursor};
pub use crate::random::{BuildReport, RandomBuild, RandomRegular};
pub use crate::topology::{parse_fraction, parse_length, Descriptor, Direction, FloorSpec, TopologyKind};
