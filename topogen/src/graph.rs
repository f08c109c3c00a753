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

//! interconnect graph
//!
//! Undirected edges are stored once per unordered pair. A simple graph keeps
//! at most one edge per pair; a multigraph counts the parallel links in the
//! edge weight (used for rack-level graphs). A directed graph keeps at most
//! one arc per ordered pair. Self-loops are never stored.

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction::{Incoming, Outgoing};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphKind {
    Simple,
    Multi,
    /// unidirectional arcs, no parallel arcs
    Directed,
}

#[derive(Clone, Debug)]
pub struct Topology {
    kind: GraphKind,
    graph: DiGraphMap<usize, usize>,
}

/// the canonical `(min, max)` form of a pair
pub fn canonical(i: usize, j: usize) -> (usize, usize) {
    if i < j {
        (i, j)
    } else {
        (j, i)
    }
}

impl Topology {
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            graph: DiGraphMap::new(),
        }
    }

    pub fn simple() -> Self {
        Self::new(GraphKind::Simple)
    }

    pub fn multi() -> Self {
        Self::new(GraphKind::Multi)
    }

    pub fn directed() -> Self {
        Self::new(GraphKind::Directed)
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind == GraphKind::Directed
    }

    fn key(&self, i: usize, j: usize) -> (usize, usize) {
        if self.is_directed() {
            (i, j)
        } else {
            canonical(i, j)
        }
    }

    /// For a directed graph, whether the arc `i -> j` exists.
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        let (a, b) = self.key(i, j);
        self.graph.contains_edge(a, b)
    }

    /// number of parallel links between `i` and `j`, 0 if not adjacent
    pub fn multiplicity(&self, i: usize, j: usize) -> usize {
        let (a, b) = self.key(i, j);
        self.graph.edge_weight(a, b).copied().unwrap_or(0)
    }

    /// Returns true if the graph changed.
    pub fn add_edge(&mut self, i: usize, j: usize) -> bool {
        if i == j {
            return false;
        }
        let (a, b) = self.key(i, j);
        let multi = self.kind == GraphKind::Multi;
        match self.graph.edge_weight_mut(a, b) {
            Some(count) if multi => {
                *count += 1;
                true
            }
            Some(_) => false,
            None => {
                self.graph.add_edge(a, b, 1);
                true
            }
        }
    }

    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = (usize, usize)>) -> usize {
        edges
            .into_iter()
            .filter(|&(i, j)| self.add_edge(i, j))
            .count()
    }

    /// Returns true if the graph changed.
    pub fn delete_edge(&mut self, i: usize, j: usize) -> bool {
        let (a, b) = self.key(i, j);
        match self.graph.edge_weight_mut(a, b) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => self.graph.remove_edge(a, b).is_some(),
            None => false,
        }
    }

    pub fn delete_edges(&mut self, edges: impl IntoIterator<Item = (usize, usize)>) -> usize {
        edges
            .into_iter()
            .filter(|&(i, j)| self.delete_edge(i, j))
            .count()
    }

    /// arcs leaving `i`, or links stored from `i` for undirected graphs
    fn weight_out(&self, i: usize) -> usize {
        self.graph
            .neighbors_directed(i, Outgoing)
            .map(|j| self.graph.edge_weight(i, j).copied().unwrap_or(0))
            .sum()
    }

    fn weight_in(&self, i: usize) -> usize {
        self.graph
            .neighbors_directed(i, Incoming)
            .map(|j| self.graph.edge_weight(j, i).copied().unwrap_or(0))
            .sum()
    }

    /// Distinct neighbours (simple), the sum of multiplicities (multigraph),
    /// or incoming plus outgoing arcs (directed).
    pub fn degree(&self, i: usize) -> usize {
        if !self.graph.contains_node(i) {
            return 0;
        }
        self.weight_out(i) + self.weight_in(i)
    }

    /// arcs leaving `i`; the degree for undirected graphs
    pub fn out_degree(&self, i: usize) -> usize {
        match self.kind {
            GraphKind::Directed if self.graph.contains_node(i) => self.weight_out(i),
            GraphKind::Directed => 0,
            _ => self.degree(i),
        }
    }

    /// arcs entering `i`; the degree for undirected graphs
    pub fn in_degree(&self, i: usize) -> usize {
        match self.kind {
            GraphKind::Directed if self.graph.contains_node(i) => self.weight_in(i),
            GraphKind::Directed => 0,
            _ => self.degree(i),
        }
    }

    /// adjacent vertices in ascending order, in either direction
    pub fn neighbors(&self, i: usize) -> Vec<usize> {
        if !self.graph.contains_node(i) {
            return Vec::new();
        }
        let mut adjacent = self
            .graph
            .neighbors_directed(i, Outgoing)
            .chain(self.graph.neighbors_directed(i, Incoming))
            .collect::<Vec<_>>();
        adjacent.sort_unstable();
        adjacent.dedup();
        adjacent
    }

    /// number of distinct adjacent pairs, or of arcs
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// sum of multiplicities over all pairs
    pub fn link_count(&self) -> usize {
        self.graph.all_edges().map(|(_, _, &w)| w).sum()
    }

    /// `(i, j, multiplicity)` triples, sorted; `i < j` unless directed
    pub fn edges(&self) -> Vec<(usize, usize, usize)> {
        let mut edges = self
            .graph
            .all_edges()
            .map(|(a, b, &w)| (a, b, w))
            .collect::<Vec<_>>();
        edges.sort_unstable();
        edges
    }

    /// the simple graph of adjacent pairs, arcs in both directions merged
    pub fn undirected(&self) -> Topology {
        let mut projected = Topology::simple();
        projected.add_edges(self.graph.all_edges().map(|(a, b, _)| (a, b)));
        projected
    }
}

impl Display for Topology {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, j, w) in self.edges() {
            match self.kind {
                GraphKind::Simple => writeln!(f, "{} -- {}", i, j)?,
                GraphKind::Multi => writeln!(f, "{} -- {} x{}", i, j, w)?,
                GraphKind::Directed => writeln!(f, "{} -> {}", i, j)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod graph_tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn simple_graph() {
        let mut g = Topology::simple();
        assert!(g.add_edge(3, 1));
        assert!(!g.add_edge(1, 3));
        assert!(!g.add_edge(2, 2));
        assert!(g.has_edge(1, 3));
        assert!(g.has_edge(3, 1));
        assert!(!g.has_edge(2, 2));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.multiplicity(3, 1), 1);
        assert_eq!(g.edges(), vec![(1, 3, 1)]);

        assert!(g.delete_edge(3, 1));
        assert!(!g.delete_edge(1, 3));
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.degree(1), 0);
        assert_eq!(g.degree(42), 0);
        assert!(g.neighbors(42).is_empty());
    }

    #[test]
    fn degree_matches_neighbors() {
        let mut g = Topology::simple();
        let added = g.add_edges((0..6).tuple_combinations().filter(|(i, j)| (i + j) % 3 != 0));
        assert_eq!(added, g.edge_count());
        for i in 0..6 {
            assert_eq!(g.degree(i), g.neighbors(i).len());
            for j in g.neighbors(i) {
                assert!(g.has_edge(j, i));
            }
        }
        assert_eq!(g.neighbors(0), vec![1, 2, 4, 5]);
        let edges = g.edges();
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        assert!(edges.iter().all(|&(i, j, _)| i < j));
    }

    #[test]
    fn multigraph() {
        let mut g = Topology::multi();
        assert!(g.add_edge(0, 1));
        assert!(g.add_edge(1, 0));
        assert!(g.add_edge(0, 2));
        assert!(!g.add_edge(2, 2));
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.link_count(), 3);
        assert_eq!(g.multiplicity(0, 1), 2);
        assert_eq!(g.degree(0), 3);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.edges(), vec![(0, 1, 2), (0, 2, 1)]);

        assert!(g.delete_edge(0, 1));
        assert_eq!(g.multiplicity(0, 1), 1);
        assert!(g.delete_edge(0, 1));
        assert!(!g.has_edge(0, 1));
        assert_eq!(g.delete_edges(vec![(0, 2), (0, 2)]), 1);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn display() {
        let mut g = Topology::multi();
        g.add_edges(vec![(2, 1), (1, 2), (0, 1)]);
        assert_eq!(g.to_string(), "0 -- 1 x1\n1 -- 2 x2\n");

        let mut g = Topology::directed();
        g.add_edges(vec![(2, 1), (1, 2), (0, 1)]);
        assert_eq!(g.to_string(), "0 -> 1\n1 -> 2\n2 -> 1\n");
    }

    #[test]
    fn directed_graph() {
        let mut g = Topology::directed();
        assert!(g.add_edge(0, 1));
        assert!(!g.add_edge(0, 1));
        assert!(g.add_edge(1, 0));
        assert!(g.add_edge(2, 0));
        assert!(!g.add_edge(3, 3));
        assert!(g.has_edge(2, 0) && !g.has_edge(0, 2));
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edges(), vec![(0, 1, 1), (1, 0, 1), (2, 0, 1)]);
        assert_eq!(g.out_degree(0), 1);
        assert_eq!(g.in_degree(0), 2);
        assert_eq!(g.degree(0), 3);
        assert_eq!(g.neighbors(0), vec![1, 2]);
        assert_eq!(g.in_degree(7), 0);

        let projected = g.undirected();
        assert_eq!(projected.edges(), vec![(0, 1, 1), (0, 2, 1)]);

        assert!(g.delete_edge(1, 0));
        assert!(!g.delete_edge(0, 2));
        assert!(g.has_edge(0, 1));
        assert_eq!(g.degree(1), 1);
    }
}
