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

//! randomized wiring
//!
//! All builders take the generator explicitly and only return the pairs to
//! link or unlink; the caller applies them.

use crate::floor::Length;
use crate::graph::Topology;
use crate::lattice::Pairs;
use crate::{Error, Result};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;

/// Greedy random matching over `pool`.
///
/// The pool is shuffled, then the first element is paired with the first
/// remaining element `accept` agrees to. Unmatched elements are dropped.
pub fn random_matching<T, R>(pool: &[T], rng: &mut R, mut accept: impl FnMut(T, T) -> bool) -> Vec<(T, T)>
where
    T: Copy,
    R: Rng + ?Sized,
{
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    let mut pool = VecDeque::from(shuffled);
    let mut pairs = Vec::with_capacity(pool.len() / 2);
    while let Some(x) = pool.pop_front() {
        if let Some(i) = pool.iter().position(|&y| accept(x, y)) {
            if let Some(y) = pool.remove(i) {
                pairs.push((x, y));
            }
        }
    }
    pairs
}

/// Outcome of a randomized build, kept for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildReport {
    pub vertices: usize,
    pub requested_degree: usize,
    pub effective_degree: usize,
    pub achieved_edges: usize,
    /// `floor(vertices / 2) * effective_degree`, capped by the admissible pairs
    pub max_edges: usize,
    pub trials_run: usize,
}

impl BuildReport {
    pub fn achievement(&self) -> f64 {
        if self.max_edges == 0 {
            1.0
        } else {
            self.achieved_edges as f64 / self.max_edges as f64
        }
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} vertices, degree {}",
            self.vertices, self.effective_degree
        )?;
        if self.effective_degree != self.requested_degree {
            write!(f, " (requested {})", self.requested_degree)?;
        }
        write!(
            f,
            ": {} of {} edges after {} trials",
            self.achieved_edges, self.max_edges, self.trials_run
        )
    }
}

#[derive(Clone, Debug)]
pub struct RandomBuild {
    pub edges: Pairs,
    pub report: BuildReport,
}

/// Approximately degree-regular random wiring: `degree` rounds of random
/// matching, best of `trials` attempts. The result is not guaranteed to be
/// exactly regular.
#[derive(Clone, Copy, Debug)]
pub struct RandomRegular {
    pub degree: usize,
    pub trials: usize,
    /// Fraction of `max_edges` the best trial has to reach. `None` only
    /// reports the outcome.
    pub min_achievement: Option<f64>,
    /// Clamp `degree` to `|vertices| - 1`. Without clamping `degree` is the
    /// number of matching rounds per trial.
    pub clamp: bool,
}

impl RandomRegular {
    /// Builds links among `vertices` on top of `base`. Pairs already adjacent
    /// in `base`, or refused by `accept`, are never proposed. On a directed
    /// base each returned pair is an arc.
    pub fn build<R>(
        &self,
        base: &Topology,
        vertices: &[usize],
        rng: &mut R,
        mut accept: impl FnMut(usize, usize) -> bool,
    ) -> Result<RandomBuild>
    where
        R: Rng + ?Sized,
    {
        let n = vertices.len();
        // arcs may join a pair once in each direction
        let limit = if base.is_directed() {
            2 * n.saturating_sub(1)
        } else {
            n.saturating_sub(1)
        };
        let degree = if self.clamp && self.degree > limit {
            log::warn!("degree {} clamped to {} for {} vertices", self.degree, limit, n);
            limit
        } else {
            self.degree
        };
        let mut report = BuildReport {
            vertices: n,
            requested_degree: self.degree,
            effective_degree: degree,
            achieved_edges: 0,
            max_edges: 0,
            trials_run: 0,
        };
        if degree == 0 {
            return Ok(RandomBuild {
                edges: Vec::new(),
                report,
            });
        }

        // a directed base admits each ordering of a pair on its own
        let admissible = vertices
            .iter()
            .copied()
            .tuple_combinations::<(_, _)>()
            .map(|(a, b)| {
                let forward = usize::from(!base.has_edge(a, b) && accept(a, b));
                if base.is_directed() {
                    forward + usize::from(!base.has_edge(b, a) && accept(b, a))
                } else {
                    forward
                }
            })
            .sum::<usize>();
        report.max_edges = (n / 2 * degree).min(admissible);

        let mut best = Vec::new();
        let mut rejected = false;
        for trial in 0..self.trials {
            let mut scratch = base.clone();
            let mut edges = Vec::new();
            for _ in 0..degree {
                let matching = random_matching(vertices, rng, |a, b| {
                    if scratch.has_edge(a, b) {
                        false
                    } else if !accept(a, b) {
                        rejected = true;
                        false
                    } else {
                        true
                    }
                });
                scratch.add_edges(matching.iter().copied());
                edges.extend(matching);
            }
            log::trace!("trial {}: {} edges", trial, edges.len());
            report.trials_run = trial + 1;
            if edges.len() > best.len() {
                best = edges;
            }
            if best.len() >= report.max_edges {
                break;
            }
        }
        report.achieved_edges = best.len();

        if report.achieved_edges < report.max_edges {
            log::warn!("random wiring below maximum: {}", report);
        } else {
            log::debug!("random wiring: {}", report);
        }
        if let Some(min_achievement) = self.min_achievement {
            if best.is_empty() && rejected {
                return Err(Error::DegreeInfeasible {
                    requested: self.degree,
                    achieved: 0,
                    reason: format!("no pair among {} vertices is acceptable", n),
                });
            }
            if report.achievement() < min_achievement {
                return Err(Error::DegreeInfeasible {
                    requested: self.degree,
                    achieved: report.achieved_edges,
                    reason: format!(
                        "best of {} trials reached {} of {} edges",
                        report.trials_run, report.achieved_edges, report.max_edges
                    ),
                });
            }
        }
        Ok(RandomBuild {
            edges: best,
            report,
        })
    }
}

/// Random links among `vertices` while the running cable total stays within
/// `budget`. Stops after `trials` matchings that add nothing, or once the
/// vertices are fully connected.
#[allow(clippy::too_many_arguments)]
pub fn random_upto<R>(
    base: &Topology,
    vertices: &[usize],
    budget: Length,
    cable_total: Length,
    trials: usize,
    rng: &mut R,
    cable: impl Fn(usize, usize) -> Length,
    mut accept: impl FnMut(usize, usize) -> bool,
) -> Pairs
where
    R: Rng + ?Sized,
{
    let complete = vertices.len() * vertices.len().saturating_sub(1) / 2;
    let existing = vertices
        .iter()
        .copied()
        .tuple_combinations::<(_, _)>()
        .filter(|&(a, b)| base.has_edge(a, b))
        .count();
    let mut total = cable_total;
    let mut scratch = base.clone();
    let mut edges = Vec::new();
    let mut empty_passes = 0;
    while empty_passes < trials && existing + edges.len() < complete {
        let matching = random_matching(vertices, rng, |a, b| {
            if scratch.has_edge(a, b) || !accept(a, b) {
                return false;
            }
            let extended = total + cable(a, b);
            if extended > budget {
                false
            } else {
                total = extended;
                true
            }
        });
        if matching.is_empty() {
            empty_passes += 1;
        }
        scratch.add_edges(matching.iter().copied());
        edges.extend(matching);
    }
    log::debug!(
        "{} links within {}cm, total {}cm",
        edges.len(),
        budget,
        total
    );
    edges
}

/// Picks existing links to remove, in random order, until the cable total
/// drops below `budget`. Only links `accept` agrees to are removed.
pub fn unlink_random_downto<R>(
    edges: &[(usize, usize)],
    budget: Length,
    cable_total: Length,
    rng: &mut R,
    cable: impl Fn(usize, usize) -> Length,
    mut accept: impl FnMut(usize, usize) -> bool,
) -> Pairs
where
    R: Rng + ?Sized,
{
    let mut pool = edges.to_vec();
    pool.shuffle(rng);
    let mut total = cable_total;
    let mut removed = Vec::new();
    for (a, b) in pool {
        if total < budget {
            break;
        }
        if accept(a, b) {
            removed.push((a, b));
            total = total.saturating_sub(cable(a, b));
        }
    }
    removed
}

#[cfg(test)]
mod random_tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn rng(seed: u64) -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(seed)
    }

    fn regular(degree: usize, trials: usize) -> RandomRegular {
        RandomRegular {
            degree,
            trials,
            min_achievement: Some(0.25),
            clamp: true,
        }
    }

    #[test]
    fn matching_is_disjoint() {
        let pool = (0..11).collect::<Vec<usize>>();
        let pairs = random_matching(&pool, &mut rng(1), |_, _| true);
        assert_eq!(pairs.len(), 5);
        let mut seen = pairs.iter().flat_map(|&(a, b)| vec![a, b]).collect::<Vec<_>>();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 10);

        let odd_even = random_matching(&pool, &mut rng(2), |a, b| (a + b) % 2 == 1);
        assert!(odd_even.iter().all(|&(a, b)| (a + b) % 2 == 1));
        assert!(random_matching(&pool, &mut rng(3), |_, _| false).is_empty());
    }

    #[test]
    fn degree_three_on_eight() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let vertices = (0..8).collect::<Vec<_>>();
        let base = Topology::simple();
        let mut previous = 0;
        for trials in [1, 5, 10].iter() {
            let build = regular(3, *trials)
                .build(&base, &vertices, &mut rng(7), |_, _| true)
                .unwrap();
            let mut g = base.clone();
            g.add_edges(build.edges.iter().copied());
            assert_eq!(g.edge_count(), build.edges.len(), "duplicate pair in {:?}", build.edges);
            assert!(g.edge_count() <= 12);
            assert!(vertices.iter().all(|&v| g.degree(v) <= 3));
            assert!(g.edge_count() >= previous);
            assert_eq!(build.report.max_edges, 12);
            assert!(build.report.trials_run <= *trials);
            previous = g.edge_count();
        }
    }

    #[test]
    fn respects_base_and_predicate() {
        let vertices = (0..6).collect::<Vec<_>>();
        let mut base = Topology::simple();
        base.add_edges(vec![(0, 1), (2, 3), (4, 5)]);
        let build = regular(2, 10)
            .build(&base, &vertices, &mut rng(11), |a, b| a / 2 != b / 2 || a % 2 == b % 2)
            .unwrap();
        for &(a, b) in &build.edges {
            assert!(!base.has_edge(a, b));
        }
    }

    #[test]
    fn clamp_degree() {
        let vertices = vec![3, 5, 9, 11];
        let build = regular(10, 10)
            .build(&Topology::simple(), &vertices, &mut rng(5), |_, _| true)
            .unwrap();
        assert_eq!(build.report.requested_degree, 10);
        assert_eq!(build.report.effective_degree, 3);
        assert!(build.edges.len() <= 6);
        assert!(build.edges.iter().all(|(a, b)| vertices.contains(a) && vertices.contains(b)));
    }

    #[test]
    fn unclamped_rounds() {
        // five vertices need five matchings to become complete
        let vertices = (0..5).collect::<Vec<_>>();
        let rounds = RandomRegular {
            clamp: false,
            ..regular(16, 10)
        };
        let build = rounds
            .build(&Topology::simple(), &vertices, &mut rng(4), |_, _| true)
            .unwrap();
        assert_eq!(build.report.effective_degree, 16);
        assert_eq!(build.report.max_edges, 10);
        assert_eq!(build.edges.len(), 10);
    }

    #[test]
    fn trivial_builds() {
        let build = regular(0, 10)
            .build(&Topology::simple(), &[1, 2, 3], &mut rng(0), |_, _| true)
            .unwrap();
        assert!(build.edges.is_empty());
        let build = regular(2, 10)
            .build(&Topology::simple(), &[4], &mut rng(0), |_, _| true)
            .unwrap();
        assert!(build.edges.is_empty());
        assert_eq!(build.report.effective_degree, 0);
    }

    #[test]
    fn infeasible_predicate() {
        let vertices = (0..8).collect::<Vec<_>>();
        let result = regular(2, 10).build(&Topology::simple(), &vertices, &mut rng(0), |_, _| false);
        assert!(matches!(
            result,
            Err(Error::DegreeInfeasible { achieved: 0, .. })
        ));
        let lenient = RandomRegular {
            min_achievement: None,
            ..regular(2, 10)
        };
        let build = lenient
            .build(&Topology::simple(), &vertices, &mut rng(0), |_, _| false)
            .unwrap();
        assert!(build.edges.is_empty());
    }

    #[test]
    fn saturated_graph_is_not_infeasible() {
        let vertices = (0..4).collect::<Vec<_>>();
        let mut base = Topology::simple();
        base.add_edges(crate::lattice::full(&vertices));
        let build = regular(2, 10)
            .build(&base, &vertices, &mut rng(0), |_, _| true)
            .unwrap();
        assert!(build.edges.is_empty());
        assert_eq!(build.report.max_edges, 0);
    }

    #[test]
    fn arcs_on_directed_base() {
        let vertices = (0..4).collect::<Vec<_>>();
        let mut base = Topology::directed();
        base.add_edge(0, 1);
        let build = regular(7, 10)
            .build(&base, &vertices, &mut rng(6), |_, _| true)
            .unwrap();
        assert_eq!(build.report.effective_degree, 6);
        assert_eq!(build.report.max_edges, 11);
        assert!(!build.edges.contains(&(0, 1)));
        let mut g = base.clone();
        assert_eq!(g.add_edges(build.edges.iter().copied()), build.edges.len());
        assert!(vertices.iter().all(|&v| g.degree(v) <= 6 + 1));
    }

    #[test]
    fn upto_budget() {
        let vertices = (0..16).collect::<Vec<_>>();
        let cable = |a: usize, b: usize| 100 + (a as Length).max(b as Length);
        let edges = random_upto(
            &Topology::simple(),
            &vertices,
            2000,
            500,
            10,
            &mut rng(3),
            cable,
            |_, _| true,
        );
        let spent = edges.iter().map(|&(a, b)| cable(a, b)).sum::<Length>();
        assert!(500 + spent <= 2000);
        assert!(!edges.is_empty());

        // enough budget for everything: stops at the complete graph
        let edges = random_upto(
            &Topology::simple(),
            &vertices[..5],
            1_000_000,
            0,
            10,
            &mut rng(3),
            cable,
            |_, _| true,
        );
        assert_eq!(edges.len(), 10);
    }

    #[test]
    fn downto_budget() {
        let edges = crate::lattice::full(&[0, 1, 2, 3, 4]);
        let removed = unlink_random_downto(&edges, 500, 1000, &mut rng(9), |_, _| 100, |a, _| a != 0);
        assert_eq!(removed.len(), 6);
        assert!(removed.iter().all(|&(a, _)| a != 0));
        let removed = unlink_random_downto(&edges, 750, 1000, &mut rng(9), |_, _| 100, |_, _| true);
        assert_eq!(removed.len(), 3);
        assert!(unlink_random_downto(&edges, 1001, 1000, &mut rng(9), |_, _| 100, |_, _| true).is_empty());
    }
}
