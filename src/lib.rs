// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! stlmesh
//!
//! Reads and writes STL meshes (binary and ASCII), converts between triangle
//! soups and deduplicated indexed meshes, and splits meshes into groups of
//! faces connected through shared vertices.
//!
//! ```no_run
//! use stlmesh::{find_connected_components, read, to_indexed};
//!
//! let triangles = read("model.stl");
//! let mesh = to_indexed(&triangles);
//! let parts = find_connected_components(&mesh.vertices, &mesh.faces);
//! println!("{} parts", parts.len());
//! ```

pub mod geometry;
pub mod io;

pub use geometry::{
    find_connected_components, find_unique_vertices, to_indexed, to_soup, Component, ConvertError,
    DisjointSet, Face, IndexedMesh, Triangle, TriangleSoup, Vec3,
};
pub use io::{read, try_read, try_write, write, StlError, StlFormat, WriteOptions};

/// Read an STL file straight into an indexed mesh
///
/// Follows [`read`]: a missing or malformed file gives an empty mesh.
pub fn read_indexed<P: AsRef<std::path::Path>>(path: P) -> IndexedMesh {
    to_indexed(&read(path))
}
