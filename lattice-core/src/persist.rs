//! Lattice persistence container.
//!
//! A small binary format mirroring `butterfly-route`'s `formats::ebg_csr`
//! module: fixed header, flat arrays, CRC-64 footer over everything that
//! precedes it. Lets a `precompute` step cache the lattice for reuse across
//! `optimize` calls without rebuilding it.

use crate::crc;
use crate::lattice::{Edge, LatticeGraph, PrimitiveKind, VertexKey};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: u32 = 0x4C415443; // "LATC"
const VERSION: u16 = 1;
const HEADER_LEN: usize = 32;

/// Persist `graph` to `path` in the lattice container format.
pub fn write_lattice<P: AsRef<Path>>(path: P, graph: &LatticeGraph) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut digest = crc::Digest::new();

    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(&MAGIC.to_le_bytes());
    header[4..6].copy_from_slice(&VERSION.to_le_bytes());
    header[8..12].copy_from_slice(&(graph.n_vertices() as u32).to_le_bytes());
    header[12..20].copy_from_slice(&(graph.edges.len() as u64).to_le_bytes());
    header[20..24].copy_from_slice(&graph.node_spacing.to_le_bytes());
    header[24..28].copy_from_slice(&(graph.n_headings() as u32).to_le_bytes());
    writer.write_all(&header)?;
    digest.update(&header);

    for &h in &graph.headings {
        let bytes = h.to_le_bytes();
        writer.write_all(&bytes)?;
        digest.update(&bytes);
    }

    for v in &graph.vertices {
        let mut buf = [0u8; 18];
        buf[0..8].copy_from_slice(&v.ix.to_le_bytes());
        buf[8..16].copy_from_slice(&v.iy.to_le_bytes());
        buf[16..18].copy_from_slice(&v.heading_bin.to_le_bytes());
        writer.write_all(&buf)?;
        digest.update(&buf);
    }

    for &o in &graph.offsets {
        let bytes = o.to_le_bytes();
        writer.write_all(&bytes)?;
        digest.update(&bytes);
    }

    for e in &graph.edges {
        let mut buf = [0u8; 13];
        buf[0..4].copy_from_slice(&e.target.to_le_bytes());
        buf[4..12].copy_from_slice(&e.cost.to_le_bytes());
        buf[12] = kind_to_byte(e.kind);
        writer.write_all(&buf)?;
        digest.update(&buf);
    }

    let footer = digest.finalize().to_le_bytes();
    writer.write_all(&footer)?;
    writer.flush()
}

/// Load a lattice previously written by [`write_lattice`]. Returns an I/O
/// error (not a [`crate::error::PlanError`], since this module sits at the
/// storage boundary, not the planning kernel) if the container is truncated
/// or its CRC footer doesn't match the body.
pub fn read_lattice<P: AsRef<Path>>(path: P) -> io::Result<LatticeGraph> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;

    let magic = u32::from_le_bytes(header[0..4].try_into().unwrap());
    if magic != MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "bad lattice file magic"));
    }
    let n_vertices = u32::from_le_bytes(header[8..12].try_into().unwrap()) as usize;
    let n_edges = u64::from_le_bytes(header[12..20].try_into().unwrap()) as usize;
    let node_spacing = u32::from_le_bytes(header[20..24].try_into().unwrap());
    let n_headings = u32::from_le_bytes(header[24..28].try_into().unwrap()) as usize;

    let mut digest = crc::Digest::new();
    digest.update(&header);

    let mut headings = Vec::with_capacity(n_headings);
    for _ in 0..n_headings {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        digest.update(&buf);
        headings.push(f64::from_le_bytes(buf));
    }

    let mut vertices = Vec::with_capacity(n_vertices);
    let mut index = rustc_hash::FxHashMap::default();
    for id in 0..n_vertices {
        let mut buf = [0u8; 18];
        reader.read_exact(&mut buf)?;
        digest.update(&buf);
        let ix = i64::from_le_bytes(buf[0..8].try_into().unwrap());
        let iy = i64::from_le_bytes(buf[8..16].try_into().unwrap());
        let heading_bin = u16::from_le_bytes(buf[16..18].try_into().unwrap());
        index.insert((ix, iy, heading_bin), id as u32);
        vertices.push(VertexKey { ix, iy, heading_bin });
    }

    let mut offsets = Vec::with_capacity(n_vertices + 1);
    for _ in 0..=n_vertices {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        digest.update(&buf);
        offsets.push(u32::from_le_bytes(buf));
    }

    let mut edges = Vec::with_capacity(n_edges);
    for _ in 0..n_edges {
        let mut buf = [0u8; 13];
        reader.read_exact(&mut buf)?;
        digest.update(&buf);
        let target = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let cost = f64::from_le_bytes(buf[4..12].try_into().unwrap());
        let kind = byte_to_kind(buf[12])
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "bad primitive kind byte"))?;
        edges.push(Edge { target, cost, kind });
    }

    let mut footer = [0u8; 8];
    reader.read_exact(&mut footer)?;
    let expected = u64::from_le_bytes(footer);
    if digest.finalize() != expected {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "lattice file CRC mismatch"));
    }

    Ok(LatticeGraph::from_parts(node_spacing, headings, vertices, offsets, edges, index))
}

fn kind_to_byte(kind: PrimitiveKind) -> u8 {
    match kind {
        PrimitiveKind::Straight => 0,
        PrimitiveKind::Left => 1,
        PrimitiveKind::Right => 2,
        PrimitiveKind::StraightReverse => 3,
        PrimitiveKind::LeftReverse => 4,
        PrimitiveKind::RightReverse => 5,
    }
}

fn byte_to_kind(b: u8) -> Option<PrimitiveKind> {
    match b {
        0 => Some(PrimitiveKind::Straight),
        1 => Some(PrimitiveKind::Left),
        2 => Some(PrimitiveKind::Right),
        3 => Some(PrimitiveKind::StraightReverse),
        4 => Some(PrimitiveKind::LeftReverse),
        5 => Some(PrimitiveKind::RightReverse),
        _ => None,
    }
}
