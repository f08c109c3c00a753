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

use crate::cost::CostModel;
use crate::floor::Length;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// Rack width [cm]
pub const RACK_WIDTH: Length = 60;
/// Rack depth including the aisle [cm]
pub const RACK_DEPTH: Length = 210;
/// Inter-rack cabling overhead [cm]
pub const OVERHEAD_OUTER: Length = 400;
/// Intra-rack cabling overhead [cm]
pub const OVERHEAD_INNER: Length = 200;
/// Number of random matching trials
pub const RANDOM_TRIALS: usize = 10;

/// How the rack grid is shaped from the rack count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutScheme {
    /// square number of racks, e.g. 4 x 4
    Mesh,
    /// square room weighted by the rack footprint, e.g. 2 x 8
    Room,
}

impl Default for LayoutScheme {
    fn default() -> Self {
        Self::Mesh
    }
}

impl FromStr for LayoutScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mesh" => Ok(Self::Mesh),
            "room" => Ok(Self::Room),
            _ => Err(Error::configuration(s, "layout must be 'mesh' or 'room'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CablingScheme {
    /// rectilinear cabling
    Manhattan,
    /// diagonal cabling, rounded to the centimetre
    Euclidean,
}

impl Default for CablingScheme {
    fn default() -> Self {
        Self::Manhattan
    }
}

/// Physical floor parameters, all lengths in centimetres.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FloorConfig {
    pub rack_width: Length,
    pub rack_depth: Length,
    pub overhead_outer: Length,
    pub overhead_inner: Length,
    pub layout: LayoutScheme,
    pub cabling: CablingScheme,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            rack_width: RACK_WIDTH,
            rack_depth: RACK_DEPTH,
            overhead_outer: OVERHEAD_OUTER,
            overhead_inner: OVERHEAD_INNER,
            layout: LayoutScheme::default(),
            cabling: CablingScheme::default(),
        }
    }
}

/// provides the parameters of a run
///
/// constructed programmatically or read from a YAML file. Once built it is
/// only ever borrowed.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub floor: FloorConfig,
    pub trials: usize,
    pub seed: u64,
    /// fraction of the theoretical maximum edge count a node-level random
    /// build has to reach before it is reported as infeasible.
    pub min_achievement: f64,
    /// links are pairs of arcs, and unidirectional topologies are allowed
    pub directed: bool,
    pub cost: CostModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            floor: FloorConfig::default(),
            trials: RANDOM_TRIALS,
            seed: 0,
            min_achievement: 0.25,
            directed: false,
            cost: CostModel::default(),
        }
    }
}

impl Config {
    pub fn from_file(file_name: &Path) -> Result<Self> {
        let file = File::open(file_name).map_err(Error::io(file_name))?;
        let reader = BufReader::new(file);
        let config: Config = serde_yaml::from_reader(reader)
            .map_err(|e| Error::configuration(file_name.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(config: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(config)
            .map_err(|e| Error::configuration("<yaml>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses the `OUTER,INNER` overhead option into the floor configuration.
    pub fn with_overhead(mut self, overhead: &str) -> Result<Self> {
        let values = overhead
            .split(',')
            .map(|v| v.trim().parse::<Length>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::configuration(overhead, e.to_string()))?;
        match values.as_slice() {
            [outer, inner] => {
                self.floor.overhead_outer = *outer;
                self.floor.overhead_inner = *inner;
                Ok(self)
            }
            _ => Err(Error::configuration(
                overhead,
                "expected two lengths: OUTER,INNER",
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let floor = &self.floor;
        if floor.rack_width == 0 || floor.rack_depth == 0 {
            return Err(Error::configuration(
                "floor",
                "rack width and depth must be positive",
            ));
        }
        if floor.overhead_inner > floor.overhead_outer {
            return Err(Error::configuration(
                "floor",
                format!(
                    "intra-rack overhead {} exceeds inter-rack overhead {}",
                    floor.overhead_inner, floor.overhead_outer
                ),
            ));
        }
        if self.trials == 0 {
            return Err(Error::configuration("trials", "at least one trial is required"));
        }
        if !(0.0..=1.0).contains(&self.min_achievement) {
            return Err(Error::configuration(
                "min_achievement",
                format!("{} is not a fraction", self.min_achievement),
            ));
        }
        Ok(())
    }
}
