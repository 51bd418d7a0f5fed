//! # Geometry
//!
//! Vertex data for meshes.
//!
//! - [`BufferAttribute`] - a typed vertex buffer with layout and dirty tracking
//! - [`BufferGeometry`] - named attributes drawn as a triangle list, with derived
//!   normals, tangents and bitangents
//! - [`primitives`] - procedural box, sphere and plane
//! - [`obj`] - Wavefront OBJ import
//!
//! ## Usage
//!
//! ```rust
//! use marionette::gfx::geometry::{box_geometry, buffer_geometry::POSITION};
//!
//! let mut geometry = box_geometry(150.0, 150.0, 150.0);
//! geometry.ensure_derived();
//! assert_eq!(geometry.attribute(POSITION).unwrap().count(), 36);
//! ```

pub mod buffer_attribute;
pub mod buffer_geometry;
pub mod obj;
pub mod primitives;

pub use buffer_attribute::{AttributeData, BufferAttribute, DataType};
pub use buffer_geometry::BufferGeometry;
pub use primitives::*;

/// Indexed geometry as produced by generators and loaders
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Expands the indices into a flat triangle list with `position` and,
    /// when every vertex has one, `texcoord`
    pub fn to_buffer_geometry(&self) -> BufferGeometry {
        let mut positions = Vec::with_capacity(self.indices.len() * 3);
        let mut tex_coords = Vec::with_capacity(self.indices.len() * 2);
        let has_tex_coords = self.tex_coords.len() == self.vertices.len();

        for &index in &self.indices {
            let index = index as usize;
            let Some(position) = self.vertices.get(index) else {
                continue;
            };
            positions.extend_from_slice(position);
            if has_tex_coords {
                tex_coords.extend_from_slice(&self.tex_coords[index]);
            }
        }

        let mut geometry = BufferGeometry::new();
        geometry.set_attribute(buffer_geometry::POSITION, BufferAttribute::new(positions, 3));
        if has_tex_coords {
            geometry.set_attribute(buffer_geometry::TEXCOORD, BufferAttribute::new(tex_coords, 2));
        }
        geometry
    }
}
