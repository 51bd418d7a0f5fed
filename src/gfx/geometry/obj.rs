//! Wavefront OBJ import

use std::path::Path;

use anyhow::Context;
use log::debug;

use super::{buffer_geometry::BufferGeometry, GeometryData};

/// Converts one loaded model into indexed geometry
pub fn geometry_data(mesh: &tobj::Mesh) -> GeometryData {
    let vertices = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect::<Vec<_>>();
    let tex_coords = if mesh.texcoords.len() / 2 == vertices.len() {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| [t[0], t[1]])
            .collect()
    } else {
        Vec::new()
    };

    GeometryData {
        vertices,
        tex_coords,
        indices: mesh.indices.clone(),
    }
}

/// Loads every model of an OBJ file as a named triangle list
///
/// Faces are triangulated and de-indexed; materials from MTL files are ignored.
pub fn load_obj(path: impl AsRef<Path>) -> anyhow::Result<Vec<(String, BufferGeometry)>> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("Failed to load OBJ file {}", path.display()))?;

    Ok(models
        .iter()
        .enumerate()
        .map(|(i, model)| {
            let name = if model.name.is_empty() {
                format!("mesh_{}", i)
            } else {
                model.name.clone()
            };
            let data = geometry_data(&model.mesh);
            debug!(
                "OBJ model '{}': {} vertices, {} triangles",
                name,
                data.vertex_count(),
                data.triangle_count()
            );
            (name, data.to_buffer_geometry())
        })
        .collect())
}
