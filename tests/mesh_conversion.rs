// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle soup <-> indexed mesh conversion tests

use anyhow::Result;
use std::collections::HashSet;
use stlmesh::io::{self, StlFormat};
use stlmesh::{to_indexed, to_soup, ConvertError, Face, IndexedMesh, Triangle, Vec3};
use tempfile::NamedTempFile;

/// Unordered position triple of a face, as raw bits for exact comparison
fn position_triple(vertices: &[Vec3], face: &Face) -> Vec<[u32; 3]> {
    let mut triple: Vec<[u32; 3]> = face
        .indices
        .iter()
        .map(|&i| {
            let v = vertices[i as usize];
            [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
        })
        .collect();
    triple.sort_unstable();
    triple
}

#[test]
fn test_empty_soup_gives_empty_mesh() {
    let mesh = to_indexed(&[]);
    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(mesh.face_count(), 0);
    assert!(mesh.is_empty());
    assert!(to_soup(&mesh.vertices, &mesh.faces).unwrap().is_empty());
}

#[test]
fn test_distinct_vertices_are_never_merged() {
    let n = 50;
    let triangles: Vec<Triangle> = (0..n)
        .map(|i| {
            let base = i as f32 * 10.0;
            Triangle::new(
                Vec3::zeros(),
                Vec3::new(base, 0.0, 0.0),
                Vec3::new(base + 1.0, 0.0, 0.0),
                Vec3::new(base, 1.0, 0.0),
            )
        })
        .collect();

    let mesh = to_indexed(&triangles);
    assert_eq!(mesh.vertex_count(), 3 * n);
    assert_eq!(mesh.face_count(), n);
    for face in &mesh.faces {
        let unique: HashSet<u32> = face.indices.iter().copied().collect();
        assert_eq!(unique.len(), 3);
        assert!(face.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }
    assert!(mesh.validate().is_ok());
}

#[test]
fn test_first_occurrence_index_wins() {
    let a = Vec3::new(0.0, 0.0, 0.0);
    let b = Vec3::new(1.0, 0.0, 0.0);
    let c = Vec3::new(0.0, 1.0, 0.0);
    let d = Vec3::new(1.0, 1.0, 0.0);
    let triangles = vec![
        Triangle::new(Vec3::z(), a, b, c),
        Triangle::new(Vec3::z(), d, c, b),
    ];

    let mesh = to_indexed(&triangles);
    assert_eq!(mesh.vertices, vec![a, b, c, d]);
    assert_eq!(mesh.faces[1].indices, [3, 2, 1]);
}

#[test]
fn test_indexed_round_trip() {
    let vertices = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(2.0, 2.0, 2.0),
        Vec3::new(3.0, 3.0, 3.0),
    ];
    let faces = vec![Face::new([0, 1, 2]), Face::new([1, 3, 2])];

    let soup = to_soup(&vertices, &faces).unwrap();
    let mesh = to_indexed(&soup);

    assert_eq!(mesh.vertex_count(), vertices.len());
    assert_eq!(mesh.face_count(), faces.len());

    let original: HashSet<[u32; 3]> = vertices
        .iter()
        .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
        .collect();
    let recovered: HashSet<[u32; 3]> = mesh
        .vertices
        .iter()
        .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
        .collect();
    assert_eq!(original, recovered);

    for (source, result) in faces.iter().zip(&mesh.faces) {
        assert_eq!(
            position_triple(&vertices, source),
            position_triple(&mesh.vertices, result)
        );
    }
}

#[test]
fn test_round_trip_through_binary_file() -> Result<()> {
    let mesh = IndexedMesh {
        vertices: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ],
        faces: vec![
            Face::new([0, 2, 1]),
            Face::new([0, 1, 3]),
            Face::new([0, 3, 2]),
            Face::new([1, 2, 3]),
        ],
    };

    let file = NamedTempFile::with_suffix(".stl")?;
    assert!(io::write(file.path(), &mesh.to_soup()?, StlFormat::Binary));

    let loaded = stlmesh::read_indexed(file.path());
    assert_eq!(loaded.vertex_count(), 4);
    assert_eq!(loaded.face_count(), 4);
    for (source, result) in mesh.faces.iter().zip(&loaded.faces) {
        assert_eq!(
            position_triple(&mesh.vertices, source),
            position_triple(&loaded.vertices, result)
        );
    }
    assert_eq!(loaded.connected_components().len(), 1);

    Ok(())
}

#[test]
fn test_pool_rebuilt_in_first_occurrence_order() {
    let vertices = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
    let soup = to_soup(&vertices, &[Face::new([2, 0, 1])]).unwrap();
    let mesh = to_indexed(&soup);

    assert_eq!(mesh.faces[0].indices, [0, 1, 2]);
    assert_eq!(mesh.vertices[0], vertices[2]);
}

#[test]
fn test_to_soup_out_of_range() {
    let vertices = vec![Vec3::zeros(); 3];
    let result = to_soup(&vertices, &[Face::new([0, 1, 3])]);
    assert!(matches!(
        result,
        Err(ConvertError::IndexOutOfRange { index: 3, .. })
    ));
}
