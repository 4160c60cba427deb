use std::sync::Arc;

use crate::gfx::resources::{Material, TextureMaps};

use super::vertex::Vertex3D;

/// Immutable vertex/index data of a mesh.
///
/// Shared between clones of a model; nothing mutates geometry after load.
#[derive(Debug, PartialEq)]
pub struct MeshGeometry {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Vertex data as raw bytes for buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes for buffer upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// A named mesh with its own materials
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub geometry: Arc<MeshGeometry>,
    pub materials: Vec<Material>,
}

impl Mesh {
    pub fn new(name: &str, geometry: MeshGeometry, material: Material) -> Self {
        Self {
            name: name.to_string(),
            geometry: Arc::new(geometry),
            materials: vec![material],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.geometry.indices.len() / 3
    }
}

/// A loaded 3D model: the node a placed object owns.
///
/// `Clone` produces a structurally independent copy: materials are duplicated,
/// geometry and texture images are shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Source URL the model was loaded from
    pub source: String,
    pub meshes: Vec<Mesh>,
}

impl Model {
    pub fn new(source: &str, meshes: Vec<Mesh>) -> Self {
        Self {
            source: source.to_string(),
            meshes,
        }
    }

    /// Assigns texture maps to every material of every mesh, or only to the
    /// meshes named `material_filter` when one is given.
    ///
    /// Returns how many materials were updated.
    pub fn apply_maps(&mut self, maps: &TextureMaps, material_filter: Option<&str>) -> usize {
        let mut updated = 0;
        for mesh in &mut self.meshes {
            if material_filter.is_some_and(|filter| filter != mesh.name) {
                continue;
            }
            for material in &mut mesh.materials {
                material.assign_maps(maps);
                updated += 1;
            }
        }
        updated
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.meshes.iter().flat_map(|mesh| mesh.materials.iter())
    }

    pub fn materials_mut(&mut self) -> impl Iterator<Item = &mut Material> {
        self.meshes
            .iter_mut()
            .flat_map(|mesh| mesh.materials.iter_mut())
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}
