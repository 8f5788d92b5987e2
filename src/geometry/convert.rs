// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Conversion between triangle soups and indexed meshes

use super::mesh::{Face, IndexedMesh, Triangle, TriangleSoup, Vec3};
use ahash::AHashMap;
use thiserror::Error;

/// Errors raised when expanding an indexed mesh
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Exact-equality hash key for a position
///
/// Keys on the raw bit pattern so lookups are O(1) without an epsilon.
/// Both zeros map to the same key since `0.0 == -0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey([u32; 3]);

impl VertexKey {
    fn new(position: &Vec3) -> Self {
        Self([
            canonical_bits(position.x),
            canonical_bits(position.y),
            canonical_bits(position.z),
        ])
    }
}

fn canonical_bits(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

/// Pool of unique positions; the first occurrence of a position fixes its index
#[derive(Debug, Default)]
pub struct VertexPool {
    lookup: AHashMap<VertexKey, u32>,
    vertices: Vec<Vec3>,
}

impl VertexPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lookup: AHashMap::with_capacity(capacity),
            vertices: Vec::with_capacity(capacity),
        }
    }

    /// Return the index of `position`, inserting it if unseen
    pub fn insert(&mut self, position: Vec3) -> u32 {
        let next = self.vertices.len() as u32;
        let index = *self.lookup.entry(VertexKey::new(&position)).or_insert(next);
        if index == next {
            self.vertices.push(position);
        }
        index
    }

    pub fn get(&self, position: &Vec3) -> Option<u32> {
        self.lookup.get(&VertexKey::new(position)).copied()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<Vec3> {
        self.vertices
    }
}

/// Deduplicate the positions of a triangle soup into an indexed mesh
///
/// Triangles are scanned in order and each produces exactly one face, so
/// `faces[i]` always corresponds to `triangles[i]`. Normals and attributes
/// are dropped.
pub fn to_indexed(triangles: &[Triangle]) -> IndexedMesh {
    let mut pool = VertexPool::with_capacity(triangles.len());
    let mut faces = Vec::with_capacity(triangles.len());

    for triangle in triangles {
        faces.push(Face::new([
            pool.insert(triangle.v0),
            pool.insert(triangle.v1),
            pool.insert(triangle.v2),
        ]));
    }

    log::debug!(
        "indexed {} triangles into {} unique vertices",
        triangles.len(),
        pool.len()
    );

    IndexedMesh {
        vertices: pool.into_vertices(),
        faces,
    }
}

/// Unique positions of a triangle soup in first-occurrence order
pub fn find_unique_vertices(triangles: &[Triangle]) -> Vec<Vec3> {
    let mut pool = VertexPool::with_capacity(triangles.len());
    for triangle in triangles {
        for vertex in triangle.vertices() {
            pool.insert(vertex);
        }
    }
    pool.into_vertices()
}

/// Expand an indexed mesh into one triangle per face
///
/// The emitted normal is the unnormalized cross product of the two edges
/// leaving `v0`; the attribute is 0.
pub fn to_soup(vertices: &[Vec3], faces: &[Face]) -> Result<TriangleSoup, ConvertError> {
    check_indices(vertices.len(), faces)?;

    Ok(faces
        .iter()
        .map(|face| {
            let [i0, i1, i2] = face.indices;
            let v0 = vertices[i0 as usize];
            let v1 = vertices[i1 as usize];
            let v2 = vertices[i2 as usize];
            Triangle::new((v1 - v0).cross(&(v2 - v0)), v0, v1, v2)
        })
        .collect())
}

pub(crate) fn check_indices(vertex_count: usize, faces: &[Face]) -> Result<(), ConvertError> {
    for (face_idx, face) in faces.iter().enumerate() {
        if let Some(&index) = face
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            return Err(ConvertError::IndexOutOfRange {
                face: face_idx,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn test_empty_soup() {
        let mesh = to_indexed(&[]);
        assert!(mesh.vertices.is_empty());
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn test_shared_vertices_are_merged() {
        let n = v(0.0, 0.0, 1.0);
        let triangles = vec![
            Triangle::new(n, v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)),
            Triangle::new(n, v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(0.0, 1.0, 0.0)),
        ];
        let mesh = to_indexed(&triangles);

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces[0].indices, [0, 1, 2]);
        assert_eq!(mesh.faces[1].indices, [1, 3, 2]);
    }

    #[test]
    fn test_identical_triangles_share_one_pool() {
        let t = Triangle::new(
            v(0.0, 0.0, 1.0),
            v(1.0, 1.0, 1.0),
            v(2.0, 2.0, 2.0),
            v(3.0, 3.0, 3.0),
        );
        let mesh = to_indexed(&vec![t; 1000]);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.faces.len(), 1000);
        assert!(mesh.faces.iter().all(|f| f.indices == [0, 1, 2]));
    }

    #[test]
    fn test_normal_is_not_a_vertex() {
        let n = v(0.0, 0.0, 1.0);
        let v0 = v(1.0, 2.0, 3.0);
        let v1 = v(4.0, 5.0, 6.0);
        let v2 = v(7.0, 8.0, 9.0);
        let v3 = v(10.0, 20.0, 30.0);
        let triangles = vec![
            Triangle::new(n, v0, v1, v2),
            Triangle::new(n, v0, v1, v2),
            Triangle::new(n, v3, v3, v3),
        ];

        let unique = find_unique_vertices(&triangles);
        assert_eq!(unique, vec![v0, v1, v2, v3]);
        assert!(!unique.contains(&n));
    }

    #[test]
    fn test_signed_zero_is_one_vertex() {
        let mut pool = VertexPool::new();
        let a = pool.insert(v(0.0, 1.0, 0.0));
        let b = pool.insert(v(-0.0, 1.0, -0.0));
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_no_epsilon_merging() {
        let mut pool = VertexPool::new();
        pool.insert(v(1.0, 0.0, 0.0));
        pool.insert(v(1.0 + f32::EPSILON, 0.0, 0.0));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(&v(1.0, 0.0, 0.0)), Some(0));
    }

    #[test]
    fn test_to_soup_computes_cross_product_normal() {
        let vertices = vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)];
        let soup = to_soup(&vertices, &[Face::new([0, 1, 2])]).unwrap();

        assert_eq!(soup.len(), 1);
        assert_eq!(soup[0].normal, v(0.0, 0.0, 1.0));
        assert_eq!(soup[0].v1, v(1.0, 0.0, 0.0));
        assert_eq!(soup[0].attribute, 0);
    }

    #[test]
    fn test_to_soup_empty_faces() {
        let soup = to_soup(&[v(1.0, 1.0, 1.0)], &[]).unwrap();
        assert!(soup.is_empty());
    }

    #[test]
    fn test_to_soup_rejects_out_of_range_index() {
        let vertices = vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)];
        let faces = [Face::new([0, 1, 2]), Face::new([1, 2, 7])];
        let err = to_soup(&vertices, &faces).unwrap_err();
        assert_eq!(
            err,
            ConvertError::IndexOutOfRange {
                face: 1,
                index: 7,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_round_trip_preserves_faces() {
        let vertices = vec![
            v(0.0, 0.0, 0.0),
            v(1.0, 1.0, 1.0),
            v(2.0, 2.0, 2.0),
            v(3.0, 3.0, 3.0),
        ];
        let faces = vec![Face::new([0, 1, 2]), Face::new([1, 3, 2])];

        let soup = to_soup(&vertices, &faces).unwrap();
        let mesh = to_indexed(&soup);

        assert_eq!(mesh.vertices.len(), vertices.len());
        assert_eq!(mesh.faces.len(), faces.len());
        for (original, result) in faces.iter().zip(&mesh.faces) {
            let mut expected: Vec<_> = original.indices.iter().map(|&i| vertices[i as usize]).collect();
            let mut actual: Vec<_> = result.indices.iter().map(|&i| mesh.vertices[i as usize]).collect();
            expected.sort_by(|a, b| a.as_slice().partial_cmp(b.as_slice()).unwrap());
            actual.sort_by(|a, b| a.as_slice().partial_cmp(b.as_slice()).unwrap());
            assert_eq!(expected, actual);
        }
    }
}
