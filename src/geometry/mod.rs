// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, conversion and connectivity

mod mesh;
pub mod convert;
pub mod topology;

pub use convert::{find_unique_vertices, to_indexed, to_soup, ConvertError, VertexPool};
pub use mesh::{Component, Face, IndexedMesh, Triangle, TriangleSoup, Vec3};
pub use topology::{
    find_connected_components, find_connected_components_union_find, DisjointSet, VertexFaceIndex,
};
