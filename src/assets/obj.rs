//! Wavefront OBJ parsing into [`Model`]s

use std::io::BufReader;

use log::debug;

use crate::error::LoadError;
use crate::gfx::resources::Material;
use crate::gfx::scene::model::{Mesh, MeshGeometry, Model};
use crate::gfx::scene::vertex::Vertex3D;

/// Parses OBJ bytes fetched from `url`.
///
/// Material libraries are not followed; each mesh gets a default material
/// named after the mesh so texture variants can target it by name.
pub fn parse_obj(url: &str, bytes: &[u8]) -> Result<Model, LoadError> {
    let mut reader = BufReader::new(bytes);
    let (models, _materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .map_err(|e| LoadError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if models.is_empty() {
        return Err(LoadError::Parse {
            url: url.to_string(),
            reason: "no geometry".to_string(),
        });
    }

    let meshes = models
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let name = if m.name.is_empty() {
                format!("mesh_{}", i)
            } else {
                m.name.clone()
            };
            let mesh = &m.mesh;

            // Use normals from OBJ if available, otherwise calculate them
            let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
                mesh.normals.clone()
            } else {
                debug!("{}: mesh `{}` has no normals, computing them", url, name);
                smooth_normals(&mesh.positions, &mesh.indices)
            };

            let vertices = (0..mesh.positions.len() / 3)
                .map(|v| Vertex3D {
                    position: [
                        mesh.positions[v * 3],
                        mesh.positions[v * 3 + 1],
                        mesh.positions[v * 3 + 2],
                    ],
                    normal: [normals[v * 3], normals[v * 3 + 1], normals[v * 3 + 2]],
                    tex_coords: if mesh.texcoords.len() >= (v + 1) * 2 {
                        [mesh.texcoords[v * 2], mesh.texcoords[v * 2 + 1]]
                    } else {
                        [0.0, 0.0]
                    },
                })
                .collect();

            Mesh::new(
                &name,
                MeshGeometry::new(vertices, mesh.indices.clone()),
                Material::new(&name, [0.8, 0.8, 0.8, 1.0], 0.0, 0.5),
            )
        })
        .collect();

    Ok(Model::new(url, meshes))
}

/// Averages face normals into per-vertex normals.
fn smooth_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut normals = vec![0.0; positions.len()];

    let position = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
            continue;
        }
        let (v0, v1, v2) = (position(i0), position(i1), position(i2));

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for &vertex_idx in &[i0, i1, i2] {
            normals[vertex_idx * 3] += face_normal[0];
            normals[vertex_idx * 3 + 1] += face_normal[1];
            normals[vertex_idx * 3 + 2] += face_normal[2];
        }
    }

    for normal in normals.chunks_exact_mut(3) {
        let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
        if length > 0.0 {
            normal.iter_mut().for_each(|n| *n /= length);
        }
    }

    normals
}
