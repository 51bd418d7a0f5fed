//! # Primitive Shape Generation
//!
//! Procedural shapes for the editor's "add" command. Generators build indexed
//! [`GeometryData`]; the `*_geometry` helpers expand it into a drawable
//! [`BufferGeometry`] with `position` and `texcoord` attributes. Normals are
//! derived later from the triangles.

use std::f32::consts::PI;

use super::{buffer_geometry::BufferGeometry, GeometryData};

/// Box centered at the origin
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z],
        // Back face
        [-x, -y, -z], [-x,  y, -z], [ x,  y, -z], [ x, -y, -z],
        // Left face
        [-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z],
        // Right face
        [ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z],
        // Top face
        [-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z],
        // Bottom face
        [-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z],
    ];

    #[rustfmt::skip]
    let tex_coords = [
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0],
        [1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ];

    data.vertices = positions.to_vec();
    data.tex_coords = tex_coords.to_vec();
    data.indices = (0..6u32)
        .flat_map(|face| {
            let i = face * 4;
            [i, i + 1, i + 2, i + 2, i + 3, i]
        })
        .collect();
    data
}

/// UV sphere of `radius` centered at the origin, Y up
pub fn generate_sphere(radius: f32, longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            data.vertices.push([
                radius * sin_theta * cos_phi,
                radius * cos_theta,
                radius * sin_theta * sin_phi,
            ]);
            data.tex_coords.push([
                long as f32 / long_segs as f32,
                lat as f32 / lat_segs as f32,
            ]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            // the pole rows collapse to a point, so one triangle of each pole quad has no area
            if lat != 0 {
                data.indices.extend_from_slice(&[first, first + 1, second]);
            }
            if lat != lat_segs - 1 {
                data.indices.extend_from_slice(&[second, first + 1, second + 1]);
            }
        }
    }

    data
}

/// Plane in the XY plane facing +Z
pub fn generate_plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    for y in 0..=h_segs {
        let v = y as f32 / h_segs as f32;
        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            data.vertices.push([(u - 0.5) * width, (v - 0.5) * height, 0.0]);
            data.tex_coords.push([u, v]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[next_row, i + 1, next_row + 1]);
        }
    }

    data
}

pub fn box_geometry(width: f32, height: f32, depth: f32) -> BufferGeometry {
    generate_box(width, height, depth).to_buffer_geometry()
}

pub fn sphere_geometry(radius: f32, longitude_segments: u32, latitude_segments: u32) -> BufferGeometry {
    generate_sphere(radius, longitude_segments, latitude_segments).to_buffer_geometry()
}

pub fn plane_geometry(width: f32, height: f32, width_segments: u32, height_segments: u32) -> BufferGeometry {
    generate_plane(width, height, width_segments, height_segments).to_buffer_geometry()
}
