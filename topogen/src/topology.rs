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

//! topology descriptors
//!
//! A descriptor is `<name>[-<int>...]`, or `<name>~<length>` for the cable
//! limited variants, e.g. `torus-4-4-8`, `do-3-50`, `sky~30km`. Link
//! failures take a fraction instead: `cut-25%` or `cut-0.25`.

use crate::floor::Length;
use crate::{Error, Result};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Which rack pairs a partial dragonfly may link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Any,
    /// racks sharing a row or a column
    Straight,
    /// racks sharing neither row nor column
    Diagonal,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TopologyKind {
    /// `None` sizes itself to the node count
    Hypercube { dimension: Option<usize> },
    /// empty sizes mean `[nx, ny, rack_size]`
    Mesh { sizes: Vec<usize> },
    Torus { sizes: Vec<usize> },
    /// torus wired as folded rings, no link skips more than one position
    FoldedTorus { sizes: Vec<usize> },
    Ring,
    /// ring plus random links of degree `degree - 2`
    RandomRing { degree: usize },
    /// ring plus random links up to a total cable length
    RandomRingUpto { budget: Length },
    Skywalk { budget: Option<Length> },
    HyperX,
    Dragonfly,
    DragonflyInside { degree: usize },
    DragonflyOutside {
        degree: usize,
        /// percentage of the largest rack distance
        radius: Option<usize>,
        direction: Direction,
    },
    DragonflyHypercube { dimension: Option<usize> },
    /// empty sizes mean `[nx, ny]`
    DragonflyMesh { sizes: Vec<usize> },
    DragonflyTorus { sizes: Vec<usize> },
    /// torus plus express links of degree `E - 2` along X, Y and Z
    ExpressCube { degrees: [usize; 3], random: bool },
    /// links of the given degree along X, Y and Z
    Straight { degrees: [usize; 3], random: bool },
    Random { degree: usize },
    RandomInside { degree: usize },
    RandomOutside { degree: usize },
    /// random arcs, `2 * degree` matching rounds
    UnidirectionalRandom { degree: usize },
    /// arcs `i -> (i * base + d) mod base^digits` for every digit `d`
    DeBruijn { base: usize, digits: u32 },
    /// removes `ceil(links * fraction)` random links
    Cut { fraction: f64 },
    /// removes `ceil(arcs * fraction)` random arcs
    UnidirectionalCut { fraction: f64 },
}

impl TopologyKind {
    /// whether the topology adds or removes single arcs
    pub fn is_unidirectional(&self) -> bool {
        matches!(
            self,
            Self::UnidirectionalRandom { .. } | Self::DeBruijn { .. } | Self::UnidirectionalCut { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor {
    token: String,
    kind: TopologyKind,
}

/// `<digits>(km|m|cm)` in centimetres
pub fn parse_length(text: &str) -> Option<Length> {
    let split = text.find(|c: char| !c.is_ascii_digit())?;
    let (value, unit) = text.split_at(split);
    let scale = match unit {
        "km" => 100_000,
        "m" => 100,
        "cm" => 1,
        _ => return None,
    };
    value.parse::<Length>().ok()?.checked_mul(scale)
}

/// `25%` or `0.25`, between 0 and 1
pub fn parse_fraction(text: &str) -> Option<f64> {
    let fraction = match text.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().ok()? / 100.0,
        None => text.parse::<f64>().ok()?,
    };
    if (0.0..=1.0).contains(&fraction) {
        Some(fraction)
    } else {
        None
    }
}

impl Descriptor {
    pub fn parse(token: &str) -> Result<Self> {
        let err = |reason: &str| Error::configuration(token, reason);

        if let Some((name @ ("cut" | "ucut"), fraction)) = token.split_once('-') {
            let fraction = parse_fraction(fraction)
                .ok_or_else(|| err("the share of links to cut must look like 25% or 0.25"))?;
            let kind = if name == "cut" {
                TopologyKind::Cut { fraction }
            } else {
                TopologyKind::UnidirectionalCut { fraction }
            };
            return Ok(Self {
                token: token.to_string(),
                kind,
            });
        }

        if let Some((name, length)) = token.split_once('~') {
            let budget = parse_length(length)
                .ok_or_else(|| err("cable length must look like 900m, 30km or 500cm"))?;
            let kind = match name {
                "rr" => TopologyKind::RandomRingUpto { budget },
                "sky" => TopologyKind::Skywalk {
                    budget: Some(budget),
                },
                _ => return Err(err("only 'rr' and 'sky' take a cable length")),
            };
            return Ok(Self {
                token: token.to_string(),
                kind,
            });
        }

        let mut parts = token.split('-');
        let name = parts.next().unwrap_or_default();
        let params = parts
            .map(|p| p.parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| err("parameters must be non-negative integers"))?;

        let arity = |min: usize, max: usize| {
            if params.len() < min || params.len() > max {
                let expected = if min == max {
                    format!("{}", min)
                } else {
                    format!("{} to {}", min, max)
                };
                Err(err(&format!(
                    "expected {} parameters, found {}",
                    expected,
                    params.len()
                )))
            } else {
                Ok(())
            }
        };
        let sizes = || {
            if params.contains(&0) {
                Err(err("every size must be positive"))
            } else {
                Ok(params.clone())
            }
        };
        let triple = |min: usize| {
            arity(3, 3)?;
            if params.iter().any(|&e| e < min) {
                return Err(err(&format!("every degree must be at least {}", min)));
            }
            Ok([params[0], params[1], params[2]])
        };
        let outside = |direction| {
            arity(1, 2)?;
            let radius = params.get(1).copied();
            if radius == Some(0) {
                return Err(err("radius must be positive"));
            }
            Ok(TopologyKind::DragonflyOutside {
                degree: params[0],
                radius,
                direction,
            })
        };

        let kind = match name {
            "hc" => {
                arity(0, 1)?;
                TopologyKind::Hypercube {
                    dimension: params.first().copied(),
                }
            }
            "mesh" => TopologyKind::Mesh { sizes: sizes()? },
            "torus" => TopologyKind::Torus { sizes: sizes()? },
            "ftorus" => TopologyKind::FoldedTorus { sizes: sizes()? },
            "ring" => {
                arity(0, 0)?;
                TopologyKind::Ring
            }
            "rr" => {
                arity(1, 1)?;
                if params[0] < 2 {
                    return Err(err("a random ring needs degree 2 or more"));
                }
                TopologyKind::RandomRing { degree: params[0] }
            }
            "sky" => {
                arity(0, 0)?;
                TopologyKind::Skywalk { budget: None }
            }
            "hx" => {
                arity(0, 0)?;
                TopologyKind::HyperX
            }
            "df" => {
                arity(0, 0)?;
                TopologyKind::Dragonfly
            }
            "di" => {
                arity(1, 1)?;
                TopologyKind::DragonflyInside { degree: params[0] }
            }
            "do" => outside(Direction::Any)?,
            "ds" => outside(Direction::Straight)?,
            "da" => outside(Direction::Diagonal)?,
            "dh" => {
                arity(0, 1)?;
                TopologyKind::DragonflyHypercube {
                    dimension: params.first().copied(),
                }
            }
            "dm" => TopologyKind::DragonflyMesh { sizes: sizes()? },
            "dt" => TopologyKind::DragonflyTorus { sizes: sizes()? },
            "xc" | "rxc" => TopologyKind::ExpressCube {
                degrees: triple(2)?,
                random: name == "rxc",
            },
            "s" | "rs" => TopologyKind::Straight {
                degrees: triple(0)?,
                random: name == "rs",
            },
            "r" | "ri" | "ro" => {
                arity(1, 1)?;
                let degree = params[0];
                match name {
                    "r" => TopologyKind::Random { degree },
                    "ri" => TopologyKind::RandomInside { degree },
                    _ => TopologyKind::RandomOutside { degree },
                }
            }
            "ur" => {
                arity(1, 1)?;
                TopologyKind::UnidirectionalRandom { degree: params[0] }
            }
            "db" => {
                arity(2, 2)?;
                if params[0] < 2 || params[1] == 0 {
                    return Err(err("a De Bruijn graph needs base 2 or more and at least one digit"));
                }
                let digits = u32::try_from(params[1]).map_err(|_| err("too many digits"))?;
                TopologyKind::DeBruijn {
                    base: params[0],
                    digits,
                }
            }
            _ => return Err(err("unknown topology")),
        };
        Ok(Self {
            token: token.to_string(),
            kind,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn kind(&self) -> &TopologyKind {
        &self.kind
    }
}

impl FromStr for Descriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

/// `<N>r<Z>`: N nodes in racks of Z
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloorSpec {
    pub nodes: usize,
    pub rack_size: usize,
}

impl FloorSpec {
    pub fn parse(token: &str) -> Result<Self> {
        let (nodes, rack_size) = token
            .split_once('r')
            .and_then(|(n, z)| Some((n.parse::<usize>().ok()?, z.parse::<usize>().ok()?)))
            .ok_or_else(|| Error::configuration(token, "a floor looks like <N>r<Z>, e.g. 128r8"))?;
        if nodes == 0 || rack_size == 0 {
            return Err(Error::configuration(
                token,
                "node count and rack size must be positive",
            ));
        }
        Ok(Self { nodes, rack_size })
    }
}

impl FromStr for FloorSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FloorSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}r{}", self.nodes, self.rack_size)
    }
}
