// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representations: triangle soup records and indexed meshes

use super::convert::{self, ConvertError};
use super::topology;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Single-precision 3D vector, the native STL coordinate type
pub type Vec3 = Vector3<f32>;

/// Unstructured list of triangles, each owning its three positions
pub type TriangleSoup = Vec<Triangle>;

/// A group of faces that are transitively connected through shared vertices
pub type Component = Vec<Face>;

/// One STL facet: a normal, three vertex positions and the binary attribute field
///
/// The attribute only exists in binary STL. It is written and read back
/// unchanged by the binary codec, and is always 0 after an ASCII round trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub normal: Vec3,
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    #[serde(default)]
    pub attribute: u16,
}

impl Triangle {
    pub fn new(normal: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self::with_attribute(normal, v0, v1, v2, 0)
    }

    pub fn with_attribute(normal: Vec3, v0: Vec3, v1: Vec3, v2: Vec3, attribute: u16) -> Self {
        Self {
            normal,
            v0,
            v1,
            v2,
            attribute,
        }
    }

    /// Vertex positions in stored order
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Unnormalized geometric normal `(v1 - v0) x (v2 - v0)`
    pub fn face_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }
}

/// Triangle defined by three indices into a vertex pool
///
/// Vertex order inside a face is not canonical, so equality and hashing
/// compare the sorted triple: `[0, 1, 2] == [2, 0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face {
    pub indices: [u32; 3],
}

impl Face {
    pub fn new(indices: [u32; 3]) -> Self {
        Self { indices }
    }

    /// Indices in ascending order
    pub fn sorted(&self) -> [u32; 3] {
        let mut sorted = self.indices;
        sorted.sort_unstable();
        sorted
    }

    /// Largest referenced vertex index
    pub fn max_index(&self) -> u32 {
        self.indices[0].max(self.indices[1]).max(self.indices[2])
    }
}

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for Face {}

impl Hash for Face {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl From<[u32; 3]> for Face {
    fn from(indices: [u32; 3]) -> Self {
        Self::new(indices)
    }
}

/// Deduplicated vertex pool plus faces indexing into it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl IndexedMesh {
    /// Build an indexed mesh by deduplicating the positions of a triangle soup
    pub fn from_soup(triangles: &[Triangle]) -> Self {
        convert::to_indexed(triangles)
    }

    /// Expand back into one triangle per face
    pub fn to_soup(&self) -> Result<TriangleSoup, ConvertError> {
        convert::to_soup(&self.vertices, &self.faces)
    }

    /// Group faces by shared-vertex connectivity
    pub fn connected_components(&self) -> Vec<Component> {
        topology::find_connected_components(&self.vertices, &self.faces)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Check that every face index lies within the vertex pool
    pub fn validate(&self) -> Result<(), ConvertError> {
        convert::check_indices(self.vertices.len(), &self.faces)
    }
}
