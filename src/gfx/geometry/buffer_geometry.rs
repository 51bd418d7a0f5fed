//! Named attribute collections and derived surface data

use std::collections::BTreeMap;

use cgmath::InnerSpace;

use super::buffer_attribute::{AttributeData, BufferAttribute};
use crate::gfx::math::Vec3;

pub const POSITION: &str = "position";
pub const TEXCOORD: &str = "texcoord";
pub const NORMAL: &str = "normal";
pub const TANGENT: &str = "tangent";
pub const BITANGENT: &str = "bitangent";

/// A set of named vertex attributes drawn as a non-indexed triangle list
///
/// `normal`, `tangent` and `bitangent` are derived from `position` and
/// `texcoord` by [`BufferGeometry::calculate_normals`]; they are a cache and
/// are regenerated whenever their sources change.
#[derive(Debug, Clone, Default)]
pub struct BufferGeometry {
    attributes: BTreeMap<String, BufferAttribute>,
    indices: Option<BufferAttribute>,
    derived_from: Option<(u64, Option<u64>)>,
}

impl BufferGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add an attribute
    pub fn with_attribute(mut self, name: &str, attribute: BufferAttribute) -> Self {
        self.set_attribute(name, attribute);
        self
    }

    pub fn attributes(&self) -> &BTreeMap<String, BufferAttribute> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, BufferAttribute> {
        &mut self.attributes
    }

    pub fn indices(&self) -> Option<&BufferAttribute> {
        self.indices.as_ref()
    }

    pub fn set_indices(&mut self, indices: BufferAttribute) -> &mut Self {
        self.indices = Some(indices);
        self
    }

    pub fn remove_indices(&mut self) -> &mut Self {
        self.indices = None;
        self
    }

    pub fn set_attribute(&mut self, name: &str, attribute: BufferAttribute) -> &mut Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        self.attributes.get(name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut BufferAttribute> {
        self.attributes.get_mut(name)
    }

    pub fn delete_attribute(&mut self, name: &str) -> Option<BufferAttribute> {
        self.attributes.remove(name)
    }

    /// Number of vertices to draw
    pub fn vertex_count(&self) -> usize {
        self.attribute(POSITION).map_or(0, BufferAttribute::count)
    }

    /// Forces every attribute to re-upload on next bind
    pub fn set_dirty(&mut self) {
        for attribute in self.attributes.values_mut() {
            attribute.mark_dirty();
        }
    }

    fn source_versions(&self) -> Option<(u64, Option<u64>)> {
        let position = self.attribute(POSITION)?.version();
        Some((position, self.attribute(TEXCOORD).map(|t| t.version())))
    }

    /// Recomputes derived attributes only when `position` or `texcoord` changed
    /// since the last derivation. Returns whether anything was recomputed.
    ///
    /// Attribute versions are unique across all attributes, so replacing
    /// `position` with a new attribute counts as a change.
    pub fn ensure_derived(&mut self) -> bool {
        let versions = self.source_versions();
        if versions.is_none() {
            return false;
        }
        let normals_fit = self
            .attribute(NORMAL)
            .is_some_and(|normal| normal.count() == self.vertex_count());
        if versions == self.derived_from && normals_fit {
            return false;
        }
        self.calculate_normals(false);
        true
    }

    /// Derives per-face `normal` from `position`, and per-face `tangent` /
    /// `bitangent` from `position` + `texcoord` when texture coordinates exist.
    ///
    /// Every consecutive vertex triple is one triangle. Existing derived
    /// attributes are reused unless `force_new_attribute` is set or their
    /// length no longer matches.
    pub fn calculate_normals(&mut self, force_new_attribute: bool) {
        let vertex_count = self.vertex_count();
        if !self.attributes.contains_key(POSITION) {
            return;
        }
        let triangle_vertices = vertex_count - vertex_count % 3;
        let has_texcoord = self
            .attribute(TEXCOORD)
            .is_some_and(|t| t.count() >= triangle_vertices);

        let mut normal = self.take_reusable(NORMAL, vertex_count, force_new_attribute);
        let mut tangents = has_texcoord.then(|| {
            (
                self.take_reusable(TANGENT, vertex_count, force_new_attribute),
                self.take_reusable(BITANGENT, vertex_count, force_new_attribute),
            )
        });
        if tangents.is_none() {
            self.attributes.remove(TANGENT);
            self.attributes.remove(BITANGENT);
        }

        let Some(position) = self.attributes.get(POSITION) else {
            return;
        };
        for i in (0..triangle_vertices).step_by(3) {
            let face = face_normal([position.get_vec3(i), position.get_vec3(i + 1), position.get_vec3(i + 2)]);
            for j in 0..3 {
                normal.set(i + j, &[face.x, face.y, face.z]);
            }
        }

        let texcoord = self.attributes.get(TEXCOORD);
        if let (Some(texcoord), Some((tangent, bitangent))) = (texcoord, tangents.as_mut()) {
            for i in (0..triangle_vertices).step_by(3) {
                let (t, b) = face_tangents(
                    [position.get_vec3(i), position.get_vec3(i + 1), position.get_vec3(i + 2)],
                    [texcoord.get_vec3(i), texcoord.get_vec3(i + 1), texcoord.get_vec3(i + 2)],
                );
                for j in 0..3 {
                    tangent.set(i + j, &[t.x, t.y, t.z]);
                    bitangent.set(i + j, &[b.x, b.y, b.z]);
                }
            }
        }

        self.attributes.insert(NORMAL.to_string(), normal);
        if let Some((tangent, bitangent)) = tangents {
            self.attributes.insert(TANGENT.to_string(), tangent);
            self.attributes.insert(BITANGENT.to_string(), bitangent);
        }
        self.derived_from = self.source_versions();
    }

    /// Takes a derived attribute out for rewriting, or a fresh one when it
    /// does not fit `vertex_count`
    fn take_reusable(&mut self, name: &str, vertex_count: usize, force_new: bool) -> BufferAttribute {
        match self.attributes.remove(name) {
            Some(existing) if !force_new && existing.count() == vertex_count && existing.size() == 3 => existing,
            _ => BufferAttribute::new(AttributeData::F32(vec![0.0; vertex_count * 3]), 3),
        }
    }
}

/// Squared sine below which a face counts as having no area
const DEGENERATE_FACE: f32 = 1e-10;

/// Unit normal of a counter-clockwise triangle, or zero for a degenerate one
///
/// The threshold is relative to the longest edge so it holds at any scale.
fn face_normal(p: [Vec3; 3]) -> Vec3 {
    let face = (p[1] - p[0]).cross(p[2] - p[0]);
    let longest = (p[1] - p[0])
        .magnitude2()
        .max((p[2] - p[0]).magnitude2())
        .max((p[2] - p[1]).magnitude2());
    if face.magnitude2() <= DEGENERATE_FACE * longest * longest || longest == 0.0 {
        return Vec3::new(0.0, 0.0, 0.0);
    }
    face.normalize()
}

/// Solves the inverse UV Jacobian of one triangle for its tangent and bitangent
fn face_tangents(p: [Vec3; 3], uv: [Vec3; 3]) -> (Vec3, Vec3) {
    let e1 = p[1] - p[0];
    let e2 = p[2] - p[0];
    let d_uv1 = uv[1] - uv[0];
    let d_uv2 = uv[2] - uv[0];

    let det = d_uv1.x * d_uv2.y - d_uv2.x * d_uv1.y;
    if det.abs() <= f32::EPSILON {
        return (Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0));
    }
    let f = 1.0 / det;
    let tangent = (e1 * d_uv2.y - e2 * d_uv1.y) * f;
    let bitangent = (e2 * d_uv1.x - e1 * d_uv2.x) * f;
    (tangent, bitangent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> BufferGeometry {
        BufferGeometry::new()
            .with_attribute(
                POSITION,
                BufferAttribute::new(vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], 3),
            )
            .with_attribute(
                TEXCOORD,
                BufferAttribute::new(vec![0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0], 2),
            )
    }

    #[test]
    fn test_normals_follow_winding() {
        let mut geometry = triangle();
        geometry.calculate_normals(false);
        let normal = geometry.attribute(NORMAL).unwrap();
        for i in 0..3 {
            assert_eq!(normal.get(i, None), vec![0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_tangent_space_aligned_with_uv() {
        let mut geometry = triangle();
        geometry.calculate_normals(false);
        let tangent = geometry.attribute(TANGENT).unwrap();
        let bitangent = geometry.attribute(BITANGENT).unwrap();
        assert_eq!(tangent.get(0, None), vec![1.0, 0.0, 0.0]);
        assert_eq!(bitangent.get(2, None), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_normals_without_texcoord() {
        let mut geometry = triangle();
        geometry.delete_attribute(TEXCOORD);
        geometry.calculate_normals(false);
        assert!(geometry.attribute(NORMAL).is_some());
        assert!(geometry.attribute(TANGENT).is_none());
    }

    #[test]
    fn test_degenerate_uv_gives_zero_tangent() {
        let mut geometry = triangle();
        geometry.set_attribute(TEXCOORD, BufferAttribute::new(vec![0.0f32; 6], 2));
        geometry.calculate_normals(false);
        let tangent = geometry.attribute(TANGENT).unwrap();
        assert!(tangent.get(0, None).iter().all(|c| c.is_finite() && *c == 0.0));
    }

    #[test]
    fn test_ensure_derived_only_when_sources_change() {
        let mut geometry = triangle();
        assert!(geometry.ensure_derived());
        assert!(!geometry.ensure_derived());

        geometry
            .attribute_mut(POSITION)
            .unwrap()
            .set(2, &[0.0, -1.0, 0.0]);
        assert!(geometry.ensure_derived());
        let normal = geometry.attribute(NORMAL).unwrap();
        assert_eq!(normal.get(0, None), vec![0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_replaced_position_rederives_normals() {
        let mut geometry = crate::gfx::geometry::primitives::box_geometry(1.0, 1.0, 1.0);
        assert!(geometry.ensure_derived());
        assert!(geometry.attribute(NORMAL).unwrap().count() > 3);

        geometry.set_attribute(
            POSITION,
            BufferAttribute::new(vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], 3),
        );
        geometry.delete_attribute(TEXCOORD);
        assert!(geometry.ensure_derived());
        let normal = geometry.attribute(NORMAL).unwrap();
        assert_eq!(normal.count(), 3);
        assert_eq!(normal.get(2, None), vec![0.0, 0.0, 1.0]);
        assert!(geometry.attribute(TANGENT).is_none());
        assert!(!geometry.ensure_derived());
    }

    #[test]
    fn test_stale_normals_are_rebuilt() {
        let mut geometry = triangle();
        assert!(geometry.ensure_derived());
        geometry.set_attribute(NORMAL, BufferAttribute::new(vec![0.0f32; 3], 3));
        assert!(geometry.ensure_derived());
        assert_eq!(geometry.attribute(NORMAL).unwrap().count(), 3);
    }

    #[test]
    fn test_set_dirty_marks_all() {
        let mut geometry = triangle();
        for attribute in geometry.attributes_mut().values_mut() {
            attribute.consume();
        }
        geometry.set_dirty();
        assert!(geometry.attributes().values().all(BufferAttribute::is_dirty));
    }
}
