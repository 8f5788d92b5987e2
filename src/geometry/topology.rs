// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face connectivity analysis
//!
//! Two faces are adjacent when they share at least one vertex index. A single
//! shared vertex ("hinge") is enough; no shared edge is required.

use super::mesh::{Component, Face, Vec3};
use ahash::AHashMap;
use std::collections::VecDeque;

/// Inverted index from vertex index to the faces referencing it
///
/// Every referenced index maps to a dense slot. Indices inside the vertex
/// pool use their own value; indices beyond it get slots after the pool in
/// first-seen order, so memory is bounded by the pool size plus the number
/// of face corners. The faces of a slot are stored in compressed-row form,
/// in ascending face order.
#[derive(Debug, Clone)]
pub struct VertexFaceIndex {
    vertex_count: usize,
    overflow: AHashMap<u32, usize>,
    face_slots: Vec<[usize; 3]>,
    offsets: Vec<usize>,
    faces: Vec<usize>,
}

impl VertexFaceIndex {
    /// Build the index for `faces` over a pool of `vertex_count` vertices
    pub fn build(vertex_count: usize, faces: &[Face]) -> Self {
        let mut overflow = AHashMap::new();
        let face_slots: Vec<[usize; 3]> = faces
            .iter()
            .map(|face| {
                face.indices.map(|v| {
                    if (v as usize) < vertex_count {
                        v as usize
                    } else {
                        let next = vertex_count + overflow.len();
                        *overflow.entry(v).or_insert(next)
                    }
                })
            })
            .collect();

        let slots = vertex_count + overflow.len();
        let mut offsets = vec![0usize; slots + 1];
        for corners in &face_slots {
            for &slot in corners {
                offsets[slot + 1] += 1;
            }
        }
        for i in 0..slots {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut incident = vec![0usize; offsets[slots]];
        for (face_idx, corners) in face_slots.iter().enumerate() {
            for &slot in corners {
                incident[cursor[slot]] = face_idx;
                cursor[slot] += 1;
            }
        }

        if !overflow.is_empty() {
            log::debug!(
                "{} vertex indices lie beyond the pool of {}",
                overflow.len(),
                vertex_count
            );
        }

        Self {
            vertex_count,
            overflow,
            face_slots,
            offsets,
            faces: incident,
        }
    }

    /// Number of slots: the vertex pool plus out-of-pool indices
    pub fn vertex_slots(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Slot assigned to a vertex index, if it has one
    pub fn slot(&self, vertex: u32) -> Option<usize> {
        if (vertex as usize) < self.vertex_count {
            Some(vertex as usize)
        } else {
            self.overflow.get(&vertex).copied()
        }
    }

    /// Faces referencing `vertex`; empty for unknown or unreferenced vertices
    pub fn faces_of(&self, vertex: u32) -> &[usize] {
        self.slot(vertex).map_or(&[], |slot| self.faces_of_slot(slot))
    }

    /// Faces referencing the vertex stored in `slot`
    pub fn faces_of_slot(&self, slot: usize) -> &[usize] {
        match (self.offsets.get(slot), self.offsets.get(slot + 1)) {
            (Some(&start), Some(&end)) => &self.faces[start..end],
            _ => &[],
        }
    }

    /// Slots of the three corners of face `face_idx`
    ///
    /// Panics if `face_idx` is out of range.
    pub fn corner_slots(&self, face_idx: usize) -> [usize; 3] {
        self.face_slots[face_idx]
    }
}

/// Partition `faces` into maximal groups connected through shared vertices
///
/// Faces are scanned in order; the first face not yet assigned seeds a new
/// component, which absorbs every reachable face (breadth-first) before the
/// scan continues. Components are therefore ordered by their lowest face
/// index and the result is identical across runs.
///
/// Vertices referenced by no face are ignored, and an empty face list yields
/// no components. Indices beyond `vertices` are grouped by index identity.
pub fn find_connected_components(vertices: &[Vec3], faces: &[Face]) -> Vec<Component> {
    if faces.is_empty() {
        return Vec::new();
    }

    let index = VertexFaceIndex::build(vertices.len(), faces);
    let mut assigned = vec![false; faces.len()];
    // Each slot's face list is walked once in total.
    let mut expanded = vec![false; index.vertex_slots()];
    let mut queue = VecDeque::new();
    let mut components = Vec::new();

    for seed in 0..faces.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        queue.push_back(seed);

        let mut component = Vec::new();
        while let Some(face_idx) = queue.pop_front() {
            component.push(faces[face_idx]);

            for slot in index.corner_slots(face_idx) {
                if expanded[slot] {
                    continue;
                }
                expanded[slot] = true;

                for &neighbor in index.faces_of_slot(slot) {
                    if !assigned[neighbor] {
                        assigned[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        components.push(component);
    }

    log::debug!(
        "found {} components across {} faces",
        components.len(),
        faces.len()
    );

    components
}

/// Same partition as [`find_connected_components`], computed with union-find
///
/// Components keep the same order (by lowest face index), but faces inside a
/// component are listed in their input order rather than traversal order.
pub fn find_connected_components_union_find(vertices: &[Vec3], faces: &[Face]) -> Vec<Component> {
    if faces.is_empty() {
        return Vec::new();
    }

    let index = VertexFaceIndex::build(vertices.len(), faces);
    let mut sets = DisjointSet::new(faces.len());
    for slot in 0..index.vertex_slots() {
        if let Some((&first, rest)) = index.faces_of_slot(slot).split_first() {
            for &other in rest {
                sets.unite(first, other);
            }
        }
    }

    let mut slot_of_root = vec![usize::MAX; faces.len()];
    let mut components: Vec<Component> = Vec::new();
    for (face_idx, face) in faces.iter().enumerate() {
        let root = sets.find(face_idx);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = components.len();
            components.push(Vec::new());
        }
        components[slot_of_root[root]].push(*face);
    }

    components
}

/// Union-find over `0..n` with path compression and union by rank
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    /// Representative of the set containing `x`
    ///
    /// Panics if `x` is out of range.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets containing `a` and `b`
    pub fn unite(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}
