//! Typed vertex data buffers with layout metadata and upload tracking

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::gfx::{math::Vec3, rendering::rasterizer::BufferHandle};

/// Component type of an attribute buffer
///
/// The numeric codes match the `componentType` values of the document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
}

impl DataType {
    pub fn code(self) -> u32 {
        match self {
            DataType::Byte => 5120,
            DataType::UnsignedByte => 5121,
            DataType::Short => 5122,
            DataType::UnsignedShort => 5123,
            DataType::Int => 5124,
            DataType::UnsignedInt => 5125,
            DataType::Float => 5126,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            5120 => Some(DataType::Byte),
            5121 => Some(DataType::UnsignedByte),
            5122 => Some(DataType::Short),
            5123 => Some(DataType::UnsignedShort),
            5124 => Some(DataType::Int),
            5125 => Some(DataType::UnsignedInt),
            5126 => Some(DataType::Float),
            _ => None,
        }
    }

    /// Size of one component in bytes
    pub fn byte_size(self) -> usize {
        match self {
            DataType::Byte | DataType::UnsignedByte => 1,
            DataType::Short | DataType::UnsignedShort => 2,
            DataType::Int | DataType::UnsignedInt | DataType::Float => 4,
        }
    }
}

/// Owned typed storage behind a [`BufferAttribute`]
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

macro_rules! each_variant {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            AttributeData::I8($v) => $body,
            AttributeData::U8($v) => $body,
            AttributeData::I16($v) => $body,
            AttributeData::U16($v) => $body,
            AttributeData::I32($v) => $body,
            AttributeData::U32($v) => $body,
            AttributeData::F32($v) => $body,
        }
    };
}

impl AttributeData {
    /// Zero-filled storage of `len` components
    pub fn zeroed(dtype: DataType, len: usize) -> Self {
        match dtype {
            DataType::Byte => AttributeData::I8(vec![0; len]),
            DataType::UnsignedByte => AttributeData::U8(vec![0; len]),
            DataType::Short => AttributeData::I16(vec![0; len]),
            DataType::UnsignedShort => AttributeData::U16(vec![0; len]),
            DataType::Int => AttributeData::I32(vec![0; len]),
            DataType::UnsignedInt => AttributeData::U32(vec![0; len]),
            DataType::Float => AttributeData::F32(vec![0.0; len]),
        }
    }

    /// Builds storage of the given type from loosely typed numbers (as found in JSON)
    pub fn from_values(dtype: DataType, values: &[f64]) -> Self {
        let mut data = Self::zeroed(dtype, values.len());
        for (i, value) in values.iter().enumerate() {
            data.set(i, *value as f32);
        }
        data
    }

    pub fn dtype(&self) -> DataType {
        match self {
            AttributeData::I8(_) => DataType::Byte,
            AttributeData::U8(_) => DataType::UnsignedByte,
            AttributeData::I16(_) => DataType::Short,
            AttributeData::U16(_) => DataType::UnsignedShort,
            AttributeData::I32(_) => DataType::Int,
            AttributeData::U32(_) => DataType::UnsignedInt,
            AttributeData::F32(_) => DataType::Float,
        }
    }

    pub fn len(&self) -> usize {
        each_variant!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Component `i` widened to `f32`
    pub fn get(&self, i: usize) -> f32 {
        each_variant!(self, v => v[i] as f32)
    }

    /// Stores `value` at component `i`, converting with `as` semantics
    pub fn set(&mut self, i: usize, value: f32) {
        match self {
            AttributeData::I8(v) => v[i] = value as i8,
            AttributeData::U8(v) => v[i] = value as u8,
            AttributeData::I16(v) => v[i] = value as i16,
            AttributeData::U16(v) => v[i] = value as u16,
            AttributeData::I32(v) => v[i] = value as i32,
            AttributeData::U32(v) => v[i] = value as u32,
            AttributeData::F32(v) => v[i] = value,
        }
    }

    /// Raw bytes for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        each_variant!(self, v => bytemuck::cast_slice(v.as_slice()))
    }

    /// Components widened to `f64` for serialization
    pub fn to_f64_vec(&self) -> Vec<f64> {
        each_variant!(self, v => v.iter().map(|x| *x as f64).collect())
    }

    /// Same components re-stored as another component type
    pub fn convert(&self, dtype: DataType) -> Self {
        Self::from_values(dtype, &self.to_f64_vec())
    }
}

impl From<Vec<f32>> for AttributeData {
    fn from(v: Vec<f32>) -> Self {
        AttributeData::F32(v)
    }
}

impl From<Vec<u8>> for AttributeData {
    fn from(v: Vec<u8>) -> Self {
        AttributeData::U8(v)
    }
}

impl From<Vec<u16>> for AttributeData {
    fn from(v: Vec<u16>) -> Self {
        AttributeData::U16(v)
    }
}

impl From<Vec<u32>> for AttributeData {
    fn from(v: Vec<u32>) -> Self {
        AttributeData::U32(v)
    }
}

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// A typed vertex buffer plus the layout needed to feed it to a shader attribute
///
/// Every mutation marks the attribute dirty; the attribute setter re-uploads
/// dirty data and then calls [`BufferAttribute::consume`]. Attributes start
/// dirty so the first bind always uploads.
#[derive(Debug)]
pub struct BufferAttribute {
    data: AttributeData,
    size: usize,
    normalize: bool,
    stride: usize,
    offset: usize,
    dirty: bool,
    version: u64,
    pub(crate) gpu_buffer: Option<BufferHandle>,
}

/// A clone owns no GPU buffer and uploads its own copy on first bind
impl Clone for BufferAttribute {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            size: self.size,
            normalize: self.normalize,
            stride: self.stride,
            offset: self.offset,
            dirty: true,
            version: self.version,
            gpu_buffer: None,
        }
    }
}

impl PartialEq for BufferAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
            && self.size == other.size
            && self.normalize == other.normalize
            && self.stride == other.stride
            && self.offset == other.offset
    }
}

impl BufferAttribute {
    /// Creates an attribute with `size` components per element
    pub fn new(data: impl Into<AttributeData>, size: usize) -> Self {
        Self {
            data: data.into(),
            size: size.max(1),
            normalize: false,
            stride: 0,
            offset: 0,
            dirty: true,
            version: next_version(),
            gpu_buffer: None,
        }
    }

    /// Builder pattern: normalize integer data to [0, 1] / [-1, 1] when read by the shader
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Builder pattern: byte stride and byte offset for interleaved buffers
    pub fn with_layout(mut self, stride: usize, offset: usize) -> Self {
        self.stride = stride;
        self.offset = offset;
        self
    }

    pub fn data(&self) -> &AttributeData {
        &self.data
    }

    /// Mutable access to the storage; marks the attribute dirty
    pub fn data_mut(&mut self) -> &mut AttributeData {
        self.touch();
        &mut self.data
    }

    pub fn set_data(&mut self, data: impl Into<AttributeData>) {
        self.data = data.into();
        self.touch();
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = size.max(1);
        self.touch();
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    /// Re-stores the data as another component type
    pub fn set_dtype(&mut self, dtype: DataType) {
        if dtype != self.dtype() {
            self.data = self.data.convert(dtype);
        }
        self.touch();
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
        self.touch();
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn set_stride(&mut self, stride: usize) {
        self.stride = stride;
        self.touch();
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
        self.touch();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces a re-upload on next bind
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Marks the data as uploaded. Only the attribute setter calls this.
    pub fn consume(&mut self) {
        self.dirty = false;
    }

    /// Stamp renewed by every data or layout mutation, unique across all attributes
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.version = next_version();
    }

    /// Distance between consecutive elements, in components
    fn element_stride(&self) -> usize {
        if self.stride == 0 {
            self.size
        } else {
            (self.stride / self.dtype().byte_size()).max(1)
        }
    }

    fn element_offset(&self) -> usize {
        self.offset / self.dtype().byte_size()
    }

    /// Number of elements (vertices) in the buffer
    pub fn count(&self) -> usize {
        let len = self.data.len();
        match self.element_offset().checked_add(self.size) {
            Some(end) if end <= len => (len - end) / self.element_stride() + 1,
            _ => 0,
        }
    }

    /// Number of components in the buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte length of the underlying storage
    pub fn byte_length(&self) -> usize {
        self.data.len() * self.dtype().byte_size()
    }

    /// Writes `values` into element `index`
    pub fn set(&mut self, index: usize, values: &[f32]) {
        let base = self.element_offset() + index * self.element_stride();
        for (i, value) in values.iter().take(self.size).enumerate() {
            self.data.set(base + i, *value);
        }
        self.touch();
    }

    /// Reads `size` components (default: the element size) of element `index`
    pub fn get(&self, index: usize, size: Option<usize>) -> Vec<f32> {
        let base = self.element_offset() + index * self.element_stride();
        let size = size.unwrap_or(self.size);
        (0..size).map(|i| self.data.get(base + i)).collect()
    }

    /// Element `index` as a vector, zero-padding missing components
    pub fn get_vec3(&self, index: usize) -> Vec3 {
        let base = self.element_offset() + index * self.element_stride();
        let component = |i: usize| {
            if i < self.size {
                self.data.get(base + i)
            } else {
                0.0
            }
        };
        Vec3::new(component(0), component(1), component(2))
    }

    /// Raw bytes for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Vertex format describing one element, when the GPU can consume it directly
    pub fn vertex_format(&self) -> Option<wgpu::VertexFormat> {
        use wgpu::VertexFormat as F;
        let n = self.normalize;
        let format = match (self.dtype(), self.size) {
            (DataType::Float, 1) => F::Float32,
            (DataType::Float, 2) => F::Float32x2,
            (DataType::Float, 3) => F::Float32x3,
            (DataType::Float, 4) => F::Float32x4,
            (DataType::UnsignedByte, 2) => if n { F::Unorm8x2 } else { F::Uint8x2 },
            (DataType::UnsignedByte, 4) => if n { F::Unorm8x4 } else { F::Uint8x4 },
            (DataType::Byte, 2) => if n { F::Snorm8x2 } else { F::Sint8x2 },
            (DataType::Byte, 4) => if n { F::Snorm8x4 } else { F::Sint8x4 },
            (DataType::UnsignedShort, 2) => if n { F::Unorm16x2 } else { F::Uint16x2 },
            (DataType::UnsignedShort, 4) => if n { F::Unorm16x4 } else { F::Uint16x4 },
            (DataType::Short, 2) => if n { F::Snorm16x2 } else { F::Sint16x2 },
            (DataType::Short, 4) => if n { F::Snorm16x4 } else { F::Sint16x4 },
            (DataType::UnsignedInt, 1) => F::Uint32,
            (DataType::UnsignedInt, 2) => F::Uint32x2,
            (DataType::UnsignedInt, 3) => F::Uint32x3,
            (DataType::UnsignedInt, 4) => F::Uint32x4,
            (DataType::Int, 1) => F::Sint32,
            (DataType::Int, 2) => F::Sint32x2,
            (DataType::Int, 3) => F::Sint32x3,
            (DataType::Int, 4) => F::Sint32x4,
            _ => return None,
        };
        Some(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_attribute_is_dirty() {
        let mut attr = BufferAttribute::new(vec![0.0f32; 9], 3);
        assert!(attr.is_dirty());
        attr.consume();
        assert!(!attr.is_dirty());
        attr.set(1, &[1.0, 2.0, 3.0]);
        assert!(attr.is_dirty());
        assert_eq!(attr.get(1, None), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clone_owns_no_gpu_buffer() {
        let mut attr = BufferAttribute::new(vec![0.0f32; 9], 3);
        attr.gpu_buffer = Some(crate::gfx::rendering::rasterizer::BufferHandle(7));
        attr.consume();

        let copy = attr.clone();
        assert!(copy.gpu_buffer.is_none());
        assert!(copy.is_dirty());
        assert_eq!(copy, attr);
        assert_eq!(attr.gpu_buffer, Some(crate::gfx::rendering::rasterizer::BufferHandle(7)));
    }

    #[test]
    fn test_every_setter_marks_dirty() {
        let mut attr = BufferAttribute::new(vec![0u8; 8], 4);
        attr.consume();
        attr.set_normalize(true);
        assert!(attr.is_dirty());
        attr.consume();
        attr.set_size(2);
        assert!(attr.is_dirty());
        attr.consume();
        attr.data_mut().set(0, 7.0);
        assert!(attr.is_dirty());
        assert_eq!(attr.data().get(0), 7.0);
    }

    #[test]
    fn test_count_and_len() {
        let attr = BufferAttribute::new(vec![0.0f32; 12], 3);
        assert_eq!(attr.count(), 4);
        assert_eq!(attr.len(), 12);
        assert_eq!(attr.byte_length(), 48);
    }

    #[test]
    fn test_interleaved_layout() {
        // xyz uv | xyz uv
        let data = vec![1.0f32, 2.0, 3.0, 0.1, 0.2, 4.0, 5.0, 6.0, 0.3, 0.4];
        let position = BufferAttribute::new(data.clone(), 3).with_layout(20, 0);
        let uv = BufferAttribute::new(data, 2).with_layout(20, 12);
        assert_eq!(position.count(), 2);
        assert_eq!(uv.count(), 2);
        assert_eq!(position.get(1, None), vec![4.0, 5.0, 6.0]);
        assert_eq!(uv.get(1, None), vec![0.3, 0.4]);
    }

    #[test]
    fn test_dtype_codes_roundtrip() {
        for code in 5120..=5126 {
            assert_eq!(DataType::from_code(code).map(|d| d.code()), Some(code));
        }
        assert_eq!(DataType::from_code(1), None);
    }

    #[test]
    fn test_set_dtype_converts() {
        let mut attr = BufferAttribute::new(vec![1.0f32, 2.0, 255.0], 1);
        attr.set_dtype(DataType::UnsignedByte);
        assert_eq!(attr.data(), &AttributeData::U8(vec![1, 2, 255]));
    }

    #[test]
    fn test_vertex_format() {
        let attr = BufferAttribute::new(vec![0.0f32; 6], 3);
        assert_eq!(attr.vertex_format(), Some(wgpu::VertexFormat::Float32x3));
        let colors = BufferAttribute::new(vec![0u8; 8], 4).with_normalize(true);
        assert_eq!(colors.vertex_format(), Some(wgpu::VertexFormat::Unorm8x4));
    }

    #[test]
    fn test_as_bytes_matches_length() {
        let attr = BufferAttribute::new(vec![1.0f32, 2.0], 2);
        assert_eq!(attr.as_bytes().len(), 8);
        assert_eq!(&attr.as_bytes()[0..4], &1.0f32.to_ne_bytes());
    }
}
