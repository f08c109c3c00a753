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

//! edge-list, coordinate and clustered output files
//!
//! Files are whitespace separated text. Writes go to a temporary file next
//! to the destination which then replaces it.

use crate::floor::{Layout, Length};
use crate::graph::GraphKind;
use crate::network::Network;
use crate::{Error, Result};
use itertools::Itertools;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// `(i, j, weight)`
pub type WeightedEdge = (usize, usize, Length);

/// Reads `<i> <j> [<w>]` lines. The weight defaults to 1 and lines with fewer
/// than two fields are skipped.
pub fn read_edge_list(reader: impl BufRead) -> Result<Vec<WeightedEdge>> {
    let mut edges = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(Error::io(Path::new("<edges>")))?;
        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.len() < 2 {
            continue;
        }
        let parse_err = || Error::Parse {
            line: line_no + 1,
            content: line.clone(),
        };
        let i = fields[0].parse::<usize>().map_err(|_| parse_err())?;
        let j = fields[1].parse::<usize>().map_err(|_| parse_err())?;
        let w = match fields.get(2) {
            Some(w) => w.parse::<Length>().map_err(|_| parse_err())?,
            None => 1,
        };
        edges.push((i, j, w));
    }
    Ok(edges)
}

pub fn load_edge_list(path: &Path) -> Result<Vec<WeightedEdge>> {
    let file = File::open(path).map_err(Error::io(path))?;
    read_edge_list(BufReader::new(file))
}

/// sorted `<i> <j> <cable length>` lines
pub fn write_edge_list(network: &Network, out: &mut dyn Write) -> io::Result<()> {
    let layout = network.layout();
    for (i, j, _) in network.topology().edges() {
        writeln!(out, "{} {} {}", i, j, layout.cable_length(i, j))?;
    }
    Ok(())
}

/// `<node> <rack> <y> <x>` lines in node order
pub fn write_coordinates(layout: &Layout, out: &mut dyn Write) -> io::Result<()> {
    for node in layout.nodes() {
        let rack = layout.rack_of(node);
        let (x, y) = layout.coord_of(rack);
        writeln!(out, "{} {} {} {}", node, rack, y, x)?;
    }
    Ok(())
}

/// Rack-to-rack link counts (`<r1> <r2> <count>`) and a summary log.
pub fn write_clustered(network: &Network, edges_out: &mut dyn Write, log_out: &mut dyn Write) -> io::Result<()> {
    let layout = network.layout();
    let racks = network.rack_graph(GraphKind::Multi);
    for (r1, r2, count) in racks.edges() {
        writeln!(edges_out, "{} {} {}", r1, r2, count)?;
    }
    writeln!(log_out, "#node      = {}", layout.node_count())?;
    writeln!(log_out, "#edge      = {}", network.topology().edge_count())?;
    writeln!(log_out, "#rack      = {}", layout.rack_count())?;
    writeln!(log_out, "#tube      = {}", racks.edge_count())?;
    writeln!(log_out, "#link      = {}", racks.link_count())?;
    writeln!(
        log_out,
        "membership = {}",
        layout.nodes().map(|n| layout.rack_of(n)).join(",")
    )
}

/// Fills a temporary file in the destination directory, then moves it over
/// `path`.
pub fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(Error::io(path))?;
    {
        let mut writer = BufWriter::new(&mut file);
        fill(&mut writer).map_err(Error::io(path))?;
        writer.flush().map_err(Error::io(path))?;
    }
    file.persist(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

pub fn save_edge_list(network: &Network, path: &Path) -> Result<()> {
    write_atomically(path, |out| write_edge_list(network, out))
}

pub fn save_coordinates(layout: &Layout, path: &Path) -> Result<()> {
    write_atomically(path, |out| write_coordinates(layout, out))
}

/// Writes the clustered edge list to `path` and its log next to it, with the
/// extension replaced by `.log`.
pub fn save_clustered(network: &Network, path: &Path) -> Result<()> {
    write_atomically(path, |out| {
        let racks = network.rack_graph(GraphKind::Multi);
        for (r1, r2, count) in racks.edges() {
            writeln!(out, "{} {} {}", r1, r2, count)?;
        }
        Ok(())
    })?;
    write_atomically(&path.with_extension("log"), |out| {
        write_clustered(network, &mut io::sink(), out)
    })
}
