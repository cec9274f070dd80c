use std::borrow::Cow;
use std::ops::Range;

use anyhow::Result;
use gltf::json;
use gltf::json::accessor::{ComponentType, Type};
use gltf::json::validation::Checked;

use crate::error::Error;

pub fn component_size(component_type: ComponentType) -> usize {
    match component_type {
        ComponentType::I8 | ComponentType::U8 => 1,
        ComponentType::I16 | ComponentType::U16 => 2,
        ComponentType::U32 | ComponentType::F32 => 4,
    }
}

pub fn component_count(type_: Type) -> usize {
    match type_ {
        Type::Scalar => 1,
        Type::Vec2 => 2,
        Type::Vec3 => 3,
        Type::Vec4 | Type::Mat2 => 4,
        Type::Mat3 => 9,
        Type::Mat4 => 16,
    }
}

pub fn get_accessor(root: &json::Root, accessor_id: usize) -> Result<&json::Accessor> {
    match root.accessors.get(accessor_id) {
        Some(accessor) => Ok(accessor),
        None => Err(Error::format(format!(
            "The given accessor ID is invalid: {accessor_id}"
        ))
        .into()),
    }
}

pub fn get_buffer_view(root: &json::Root, view_id: usize) -> Result<&json::buffer::View> {
    match root.buffer_views.get(view_id) {
        Some(view) => Ok(view),
        None => Err(Error::format(format!(
            "The given buffer view ID is invalid: {view_id}"
        ))
        .into()),
    }
}

pub fn accessor_component_type(root: &json::Root, accessor_id: usize) -> Result<ComponentType> {
    match get_accessor(root, accessor_id)?.component_type {
        Checked::Valid(json::accessor::GenericComponentType(component_type)) => Ok(component_type),
        Checked::Invalid => Err(Error::format(format!(
            "Accessor {accessor_id} has an invalid component type"
        ))
        .into()),
    }
}

pub fn accessor_type(root: &json::Root, accessor_id: usize) -> Result<Type> {
    match get_accessor(root, accessor_id)?.type_ {
        Checked::Valid(type_) => Ok(type_),
        Checked::Invalid => {
            Err(Error::format(format!("Accessor {accessor_id} has an invalid type")).into())
        }
    }
}

/// Location of an accessor's elements inside its backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorSpan {
    pub accessor: usize,
    pub buffer: usize,
    pub offset: usize,
    /// Packed length: `count * element_size`
    pub length: usize,
    pub count: usize,
    pub element_size: usize,
    /// Set only when the view interleaves elements with other data
    pub stride: Option<usize>,
}

impl AccessorSpan {
    /// Number of buffer bytes touched by the span, including stride gaps.
    pub fn extent(&self) -> usize {
        match (self.stride, self.count) {
            (_, 0) => 0,
            (Some(stride), count) => stride * (count - 1) + self.element_size,
            (None, _) => self.length,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.extent()
    }

    /// Reads the span out of `data`, de-interleaving strided elements.
    pub fn read<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        if self.range().end > data.len() {
            return Err(Error::format(format!(
                "Accessor {} reads bytes {:?} past the end of buffer {} ({} bytes)",
                self.accessor,
                self.range(),
                self.buffer,
                data.len()
            ))
            .into());
        }

        match self.stride {
            None => Ok(Cow::Borrowed(&data[self.range()])),
            Some(stride) => {
                let mut packed = Vec::with_capacity(self.length);
                for element in 0..self.count {
                    let start = self.offset + element * stride;
                    packed.extend_from_slice(&data[start..start + self.element_size]);
                }

                Ok(Cow::Owned(packed))
            }
        }
    }
}

/// Computes where the given accessor's data lives.
pub fn resolve(root: &json::Root, accessor_id: usize) -> Result<AccessorSpan> {
    let accessor = get_accessor(root, accessor_id)?;

    if accessor.sparse.is_some() {
        return Err(Error::UnsupportedAccessor {
            accessor_id,
            reason: String::from("sparse accessors are not supported"),
        }
        .into());
    }

    let view_id = match accessor.buffer_view {
        Some(view) => view.value(),
        None => {
            return Err(Error::UnsupportedAccessor {
                accessor_id,
                reason: String::from("accessors without a buffer view are not supported"),
            }
            .into())
        }
    };
    let view = get_buffer_view(root, view_id)?;

    let element_size = component_count(accessor_type(root, accessor_id)?)
        * component_size(accessor_component_type(root, accessor_id)?);
    let count = accessor.count.0 as usize;
    let accessor_offset = accessor.byte_offset.map_or(0, |offset| offset.0 as usize);
    let view_offset = view.byte_offset.map_or(0, |offset| offset.0 as usize);

    let stride = match view.byte_stride {
        Some(json::buffer::Stride(stride)) if stride > element_size => Some(stride),
        _ => None,
    };

    let span = AccessorSpan {
        accessor: accessor_id,
        buffer: view.buffer.value(),
        offset: view_offset + accessor_offset,
        length: count * element_size,
        count,
        element_size,
        stride,
    };

    let view_length = view.byte_length.0 as usize;
    if accessor_offset + span.extent() > view_length {
        return Err(Error::format(format!(
            "Accessor {accessor_id} needs {} bytes at offset {accessor_offset} but buffer view {view_id} is only {view_length} bytes long",
            span.extent()
        ))
        .into());
    }

    if let Some(buffer) = root.buffers.get(span.buffer) {
        let buffer_length = buffer.byte_length.0 as usize;
        if view_offset + view_length > buffer_length {
            return Err(Error::format(format!(
                "Buffer view {view_id} exceeds buffer {} ({buffer_length} bytes)",
                span.buffer
            ))
            .into());
        }
    } else {
        return Err(Error::format(format!(
            "Buffer view {view_id} references a missing buffer: {}",
            span.buffer
        ))
        .into());
    }

    Ok(span)
}

/// Reinterprets little-endian bytes as a packed array of `T`.
pub fn decode<T: bytemuck::Pod>(accessor_id: usize, bytes: &[u8]) -> Result<Vec<T>> {
    let element_size = std::mem::size_of::<T>();
    if bytes.len() % element_size != 0 {
        return Err(Error::SizeMismatch {
            accessor_id,
            length: bytes.len(),
            element_size,
        }
        .into());
    }

    Ok(bytes
        .chunks_exact(element_size)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

/// Writes `values` over `target`, which must have exactly the same byte length.
pub fn encode<T: bytemuck::Pod>(values: &[T], target: &mut [u8]) {
    target.copy_from_slice(bytemuck::cast_slice(values));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::AssetBuilder;

    #[test]
    fn span_length_matches_accessor_layout() {
        let mut builder = AssetBuilder::new();
        let _padding = builder.push_u16_indices(&[9, 9, 9]);
        let positions = builder.push_vec3(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let (root, _) = builder.finish();

        let span = resolve(&root, positions).unwrap();

        assert_eq!(span.length, 2 * 3 * 4);
        assert_eq!(span.offset % 4, 0);
        assert!(span.range().end <= root.buffers[0].byte_length.0 as usize);
    }

    #[test]
    fn accessor_without_view_is_unsupported() {
        let root: json::Root = serde_json::from_str(
            r#"{
                "asset": { "version": "2.0" },
                "accessors": [{ "componentType": 5126, "count": 3, "type": "VEC3" }]
            }"#,
        )
        .unwrap();

        let error = resolve(&root, 0).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::UnsupportedAccessor { accessor_id: 0, .. })
        ));
    }

    #[test]
    fn span_outside_view_is_rejected() {
        let root: json::Root = serde_json::from_str(
            r#"{
                "asset": { "version": "2.0" },
                "buffers": [{ "byteLength": 24 }],
                "bufferViews": [{ "buffer": 0, "byteLength": 24 }],
                "accessors": [{ "bufferView": 0, "byteOffset": 4, "componentType": 5126, "count": 2, "type": "VEC3" }]
            }"#,
        )
        .unwrap();

        let error = resolve(&root, 0).unwrap_err();

        assert!(matches!(error.downcast_ref::<Error>(), Some(Error::Format(_))));
    }

    #[test]
    fn strided_view_is_gathered() {
        let root: json::Root = serde_json::from_str(
            r#"{
                "asset": { "version": "2.0" },
                "buffers": [{ "byteLength": 12 }],
                "bufferViews": [{ "buffer": 0, "byteLength": 12, "byteStride": 4 }],
                "accessors": [{ "bufferView": 0, "byteOffset": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }]
            }"#,
        )
        .unwrap();
        let data: Vec<u8> = vec![0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0];

        let span = resolve(&root, 0).unwrap();
        let bytes = span.read(&data).unwrap();

        assert_eq!(span.stride, Some(4));
        assert_eq!(decode::<u16>(0, &bytes).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn decode_rejects_partial_elements() {
        let bytes = [0u8; 8];

        let error = decode::<[f32; 3]>(7, &bytes).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::SizeMismatch {
                accessor_id: 7,
                length: 8,
                element_size: 12
            })
        ));
    }

    #[test]
    fn encode_overwrites_target() {
        let mut target = [0u8; 6];

        encode(&[1u16, 2, 3], &mut target);

        assert_eq!(decode::<u16>(0, &target).unwrap(), vec![1, 2, 3]);
    }
}
