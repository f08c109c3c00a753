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

//! cabling and switch cost model
//!
//! Prices are configuration, not code: [`CostModel::mudigonda`] follows
//! Mudigonda et al., "Taming the flying cable monster" (2011) and
//! [`CostModel::slim_fly`] follows Besta et al., "Slim Fly" (2014).

use crate::floor::{Layout, Length};
use crate::graph::Topology;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `per_metre * metres + fixed`
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct LinearPrice {
    pub per_metre: f64,
    pub fixed: f64,
}

impl LinearPrice {
    pub fn price(&self, length: Length) -> f64 {
        length as f64 / 100.0 * self.per_metre + self.fixed
    }
}

/// Selects between the electrical and optical price once a cable leaves the rack.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpticalRegime {
    /// electrical up to this length [cm], optical beyond
    Threshold(Length),
    /// whichever is cheaper
    Cheapest,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CostModel {
    pub electrical: LinearPrice,
    pub optical: LinearPrice,
    /// multiplier on the regime price (manufacturing overhead, or bandwidth in Gbps)
    pub bandwidth_scale: f64,
    pub intra_rack_fee: f64,
    pub inter_rack_fee: f64,
    pub optical_regime: OpticalRegime,
    pub switch_per_port: f64,
    pub switch_fixed: f64,
    /// Watts per switch port
    pub power_per_port: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::mudigonda()
    }
}

impl CostModel {
    /// Quad-channel custom cables, copper up to 5m and fiber beyond, plus 25%
    /// manufacturing and a deployment fee; $500 per switch port.
    pub fn mudigonda() -> Self {
        Self {
            electrical: LinearPrice {
                per_metre: 16.0,
                fixed: 40.0,
            },
            optical: LinearPrice {
                per_metre: 5.0,
                fixed: 376.0,
            },
            bandwidth_scale: 1.25,
            intra_rack_fee: 2.50,
            inter_rack_fee: 6.25,
            optical_regime: OpticalRegime::Threshold(500),
            switch_per_port: 500.0,
            switch_fixed: 0.0,
            power_per_port: 4.0 * 0.7,
        }
    }

    /// 40 Gbps links priced per Gbps; the cheaper medium wins outside the rack.
    pub fn slim_fly() -> Self {
        Self {
            electrical: LinearPrice {
                per_metre: 0.4079,
                fixed: 0.5771,
            },
            optical: LinearPrice {
                per_metre: 0.0919,
                fixed: 7.2745,
            },
            bandwidth_scale: 40.0,
            intra_rack_fee: 0.0,
            inter_rack_fee: 0.0,
            optical_regime: OpticalRegime::Cheapest,
            switch_per_port: 350.4,
            switch_fixed: -892.3,
            power_per_port: 4.0 * 0.7,
        }
    }

    /// Price of one cable, rounded to the cent.
    ///
    /// Cables no longer than `overhead_inner` are treated as intra-rack.
    pub fn cable_cost(&self, length: Length, overhead_inner: Length) -> f64 {
        let electrical = self.electrical.price(length) * self.bandwidth_scale;
        let dollar = if length <= overhead_inner {
            electrical + self.intra_rack_fee
        } else {
            let optical = self.optical.price(length) * self.bandwidth_scale;
            let regime = match self.optical_regime {
                OpticalRegime::Threshold(limit) if length <= limit => electrical,
                OpticalRegime::Threshold(_) => optical,
                OpticalRegime::Cheapest => electrical.min(optical),
            };
            regime + self.inter_rack_fee
        };
        round_cents(dollar)
    }

    pub fn switch_cost(&self, ports: usize) -> f64 {
        ports as f64 * self.switch_per_port + self.switch_fixed
    }

    pub fn switch_power(&self, ports: usize) -> f64 {
        ports as f64 * self.power_per_port
    }
}

fn round_cents(dollar: f64) -> f64 {
    (dollar * 100.0).round() / 100.0
}

/// Aggregated cost of a wired floor.
#[derive(Clone, Debug, PartialEq)]
pub struct CostSummary {
    pub total_cost: f64,
    pub cable_cost: f64,
    pub switch_cost: f64,
    /// total cable length [cm]
    pub cable_amount: Length,
    pub cable_count: usize,
    pub switch_power: f64,
}

impl CostSummary {
    /// One switch per node with as many ports as the node degree, one cable
    /// per edge or arc. A port of a directed network carries one arc each
    /// way, so a node needs half its arc count, rounded up.
    pub fn evaluate(layout: &Layout, topology: &Topology, model: &CostModel) -> Self {
        let overhead_inner = layout.floor().overhead_inner;
        let mut cable_cost = 0.0;
        let mut cable_amount = 0;
        let mut cable_count = 0;
        for (n1, n2, _) in topology.edges() {
            let length = layout.cable_length(n1, n2);
            cable_count += 1;
            cable_amount += length;
            cable_cost += model.cable_cost(length, overhead_inner);
        }
        let (switch_cost, switch_power) = layout
            .nodes()
            .map(|n| {
                if topology.is_directed() {
                    (topology.degree(n) + 1) / 2
                } else {
                    topology.degree(n)
                }
            })
            .fold((0.0, 0.0), |(cost, power), ports| {
                (
                    cost + model.switch_cost(ports),
                    power + model.switch_power(ports),
                )
            });
        Self {
            total_cost: cable_cost + switch_cost,
            cable_cost,
            switch_cost,
            cable_amount,
            cable_count,
            switch_power,
        }
    }

    pub fn average_cable(&self) -> Length {
        if self.cable_count == 0 {
            0
        } else {
            self.cable_amount / self.cable_count as Length
        }
    }
}

/// tab separated: total, cable and switch cost, cable length, cable count,
/// mean cable length, switch power
impl fmt::Display for CostSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.2}\t{:.2}\t{:.2}\t{}\t{}\t{}\t{:.2}",
            self.total_cost,
            self.cable_cost,
            self.switch_cost,
            self.cable_amount,
            self.cable_count,
            self.average_cable(),
            self.switch_power
        )
    }
}
