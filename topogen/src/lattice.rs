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

//! deterministic wiring patterns over an ordered list of vertices
//!
//! Every builder returns the pairs to link; the caller owns the graph.
//! Multi-dimensional grids are row-major: the last axis varies fastest.

use itertools::Itertools;

pub type Pairs = Vec<(usize, usize)>;

/// consecutive pairs, closed into a ring if `ring`
pub fn line(vertices: &[usize], ring: bool) -> Pairs {
    if vertices.len() < 2 {
        return Vec::new();
    }
    let mut pairs = vertices
        .iter()
        .copied()
        .tuple_windows::<(_, _)>()
        .collect::<Pairs>();
    if ring {
        pairs.push((vertices[0], vertices[vertices.len() - 1]));
    }
    pairs
}

/// a ring laid out so that no link skips more than one vertex
pub fn folded_ring(vertices: &[usize]) -> Pairs {
    if vertices.len() < 2 {
        return Vec::new();
    }
    let mut pairs = vec![(vertices[0], vertices[1])];
    pairs.extend(
        vertices
            .iter()
            .copied()
            .tuple_windows::<(_, _, _)>()
            .map(|(a, _, c)| (a, c)),
    );
    pairs.push((vertices[vertices.len() - 2], vertices[vertices.len() - 1]));
    pairs
}

pub fn full(vertices: &[usize]) -> Pairs {
    vertices.iter().copied().tuple_combinations::<(_, _)>().collect()
}

/// `strides[d]` is the linear distance between neighbours along axis `d`
pub fn strides(sizes: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; sizes.len()];
    for d in (0..sizes.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * sizes[d + 1];
    }
    strides
}

/// return the linear index of the element in a multi-dimensional grid
pub fn linearize_index(elem: &[usize], sizes: &[usize]) -> usize {
    elem.iter()
        .zip(strides(sizes))
        .map(|(c, stride)| c * stride)
        .sum()
}

/// given a linear index, return the coordinates in a grid of `sizes`
pub fn delinearize_index(index: usize, sizes: &[usize]) -> Vec<usize> {
    strides(sizes)
        .iter()
        .zip(sizes)
        .map(|(stride, size)| index / stride % size)
        .collect()
}

/// how the vertices along one axis of a [`cube`] are linked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wiring {
    Line,
    Ring,
    /// a ring without the long wrap-around link, see [`folded_ring`]
    Folded,
}

impl Wiring {
    fn link(self, members: &[usize]) -> Pairs {
        match self {
            Self::Line => line(members, false),
            Self::Ring => line(members, true),
            Self::Folded => folded_ring(members),
        }
    }
}

/// strides and total size of a grid, `None` if the size overflows
fn checked_strides(sizes: &[usize]) -> Option<(Vec<usize>, usize)> {
    let mut strides = vec![1; sizes.len()];
    let mut total = 1usize;
    for d in (0..sizes.len()).rev() {
        strides[d] = total;
        total = total.checked_mul(sizes[d])?;
    }
    Some((strides, total))
}

/// Mesh, torus or folded torus of the given sizes.
///
/// Along each axis the present vertices are linked as a line or a ring;
/// positions past the end of `vertices` are skipped. A hypercube is a cube
/// with every size 2. Returns `None` if the grid size overflows.
pub fn cube(vertices: &[usize], sizes: &[usize], wiring: Wiring) -> Option<Pairs> {
    let (strides, total) = checked_strides(sizes)?;
    let n = vertices.len();
    let mut pairs = Vec::new();
    for (axis, (&size, &stride)) in sizes.iter().zip(&strides).enumerate() {
        for base in (0..total.min(n)).filter(|b| b / stride % size == 0) {
            let members = (0..size)
                .map(|c| base + c * stride)
                .take_while(|&position| position < n)
                .map(|position| vertices[position])
                .collect::<Vec<_>>();
            log::trace!("axis {} from {}: {:?}", axis, base, members);
            pairs.extend(wiring.link(&members));
        }
    }
    Some(pairs)
}

/// Index pairs of a mesh or torus over `count` positions, in the order a
/// depth-first walk of the grid would wire them: each block is finished along
/// its inner axes before it is joined along the outer one.
///
/// Unlike [`cube`], pairs touching a position at or past `count` are dropped
/// instead of closing the ring over the present ones. Blocks starting past
/// `count` are never visited. Returns `None` if the grid size overflows.
pub fn cube_pairs(count: usize, sizes: &[usize], ring: bool) -> Option<Pairs> {
    let mut pairs = Vec::new();
    let last = match sizes.len().checked_sub(1) {
        Some(last) if count > 0 => last,
        _ => return Some(pairs),
    };
    let (strides, _) = checked_strides(sizes)?;
    // (axis, first position of the block, inner blocks already queued)
    let mut stack = vec![(0, 0, false)];
    while let Some((axis, base, expanded)) = stack.pop() {
        let (size, stride) = (sizes[axis], strides[axis]);
        if axis < last && !expanded {
            stack.push((axis, base, true));
            let inner = (0..size)
                .map(|c| base + c * stride)
                .take_while(|&b| b < count)
                .collect::<Vec<_>>();
            stack.extend(inner.into_iter().rev().map(|b| (axis + 1, b, false)));
            continue;
        }
        let span = stride.min(count - base);
        let first = if ring { 0 } else { 1 };
        for k in first..size {
            if base + k * stride >= count {
                break;
            }
            let prev = if k == 0 { size - 1 } else { k - 1 };
            for offset in 0..span {
                let i = base + prev * stride + offset;
                let j = base + k * stride + offset;
                if i != j && i < count && j < count {
                    pairs.push((i, j));
                }
            }
        }
    }
    Some(pairs)
}

/// Express links: for each `d < degree`, the ends of every window of `span`
/// consecutive vertices, with spans spread evenly between 2 and the length.
pub fn uniform(vertices: &[usize], degree: usize) -> Pairs {
    if vertices.len() < 2 {
        return Vec::new();
    }
    let mut pairs = Vec::new();
    for d in 0..degree {
        let span = ((vertices.len() - 2) as f64 * (d + 1) as f64 / (degree + 1) as f64).round()
            as usize
            + 2;
        pairs.extend(vertices.windows(span).map(|w| (w[0], w[span - 1])));
    }
    pairs
}
