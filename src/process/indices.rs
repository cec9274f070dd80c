use anyhow::Result;
use gltf::json;
use gltf::json::accessor::{ComponentType, Type};

use crate::error::Error;
use crate::process::accessor;
use crate::resource::gltf::loader::GltfLoader;

/// The index encodings the passes understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    I16,
    U16,
    U32,
}

impl IndexFormat {
    pub fn of_accessor(root: &json::Root, accessor_id: usize) -> Result<Self> {
        let type_ = accessor::accessor_type(root, accessor_id)?;
        if type_ != Type::Scalar {
            return Err(Error::UnsupportedIndexType {
                accessor_id,
                encoding: format!("{type_:?}"),
            }
            .into());
        }

        match accessor::accessor_component_type(root, accessor_id)? {
            ComponentType::I16 => Ok(Self::I16),
            ComponentType::U16 => Ok(Self::U16),
            ComponentType::U32 => Ok(Self::U32),
            component_type => Err(Error::UnsupportedIndexType {
                accessor_id,
                encoding: format!("{component_type:?}"),
            }
            .into()),
        }
    }
}

/// Index accessor of the given primitive, validated to be a supported encoding.
pub fn index_accessor(
    root: &json::Root,
    primitive: &json::mesh::Primitive,
) -> Result<(usize, IndexFormat)> {
    let accessor_id = match primitive.indices {
        Some(indices) => indices.value(),
        None => return Err(Error::MissingIndices.into()),
    };

    Ok((accessor_id, IndexFormat::of_accessor(root, accessor_id)?))
}

/// Reads the primitive's indices widened to `u32`, order preserved.
pub fn load_indices(
    root: &json::Root,
    loader: &mut impl GltfLoader,
    primitive: &json::mesh::Primitive,
) -> Result<Vec<u32>> {
    let (accessor_id, format) = index_accessor(root, primitive)?;

    let indices = match format {
        IndexFormat::I16 => loader
            .load_accessor_as::<i16>(root, accessor_id)?
            .into_iter()
            .map(|index| index as u16 as u32)
            .collect(),
        IndexFormat::U16 => loader
            .load_accessor_as::<u16>(root, accessor_id)?
            .into_iter()
            .map(u32::from)
            .collect(),
        IndexFormat::U32 => loader.load_accessor_as::<u32>(root, accessor_id)?,
    };

    Ok(indices)
}
