use std::collections::HashSet;

use anyhow::Result;
use gltf::json;
use gltf::json::validation::{Checked, USize64};

use crate::error::Error;
use crate::process::accessor;
use crate::process::tangent::TangentChannel;
use crate::resource::gltf::loader::GltfLoader;

/// Buffer, buffer views and accessors rebuilt around new tangent channels.
pub struct RebuiltGraph {
    pub data: Vec<u8>,
    pub buffer_views: Vec<json::buffer::View>,
    pub accessors: Vec<json::Accessor>,
    /// Tangent accessor of each channel, in channel order
    pub tangent_accessors: Vec<usize>,
    /// `(image, buffer view)` pairs for images embedded in the buffer
    pub image_views: Vec<(usize, usize)>,
}

#[derive(Default)]
struct BufferWriter {
    data: Vec<u8>,
    views: Vec<json::buffer::View>,
}

impl BufferWriter {
    fn push_view(
        &mut self,
        bytes: &[u8],
        name: Option<String>,
        target: Option<Checked<json::buffer::Target>>,
    ) -> usize {
        self.data.resize(self.data.len().next_multiple_of(4), 0);
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: USize64::from(bytes.len()),
            byte_offset: Some(USize64::from(offset)),
            byte_stride: None,
            name,
            target,
            extensions: Default::default(),
            extras: Default::default(),
        });

        self.views.len() - 1
    }
}

/// Decides which accessor receives each channel's tangents.
///
/// A channel reuses the tangent accessor its primitive already has, unless an
/// earlier channel claimed it; everything else is appended after the existing
/// accessors.
fn assign_tangent_accessors(
    accessor_count: usize,
    channels: &[TangentChannel],
) -> (Vec<usize>, HashSet<usize>) {
    let mut overwritten = HashSet::new();
    let mut next = accessor_count;

    let targets = channels
        .iter()
        .map(|channel| match channel.existing {
            Some(existing) if existing < accessor_count && overwritten.insert(existing) => existing,
            _ => {
                next += 1;
                next - 1
            }
        })
        .collect();

    (targets, overwritten)
}

fn tangent_accessor(template: Option<&json::Accessor>, view_id: usize, count: usize) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(view_id as u32)),
        byte_offset: Some(USize64(0)),
        count: USize64::from(count),
        component_type: Checked::Valid(json::accessor::GenericComponentType(
            json::accessor::ComponentType::F32,
        )),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Checked::Valid(json::accessor::Type::Vec4),
        min: None,
        max: None,
        name: template.and_then(|accessor| accessor.name.clone()),
        normalized: false,
        sparse: None,
    }
}

/// Copies every surviving accessor into a fresh single buffer and appends the
/// tangent channels.
///
/// `root` is not modified; all buffers it references must already be loaded.
pub fn rebuild(
    root: &json::Root,
    loader: &impl GltfLoader,
    channels: &[TangentChannel],
) -> Result<RebuiltGraph> {
    let (tangent_accessors, overwritten) =
        assign_tangent_accessors(root.accessors.len(), channels);

    let mut writer = BufferWriter::default();
    let mut accessors = Vec::with_capacity(root.accessors.len() + channels.len());

    for (accessor_id, accessor) in root.accessors.iter().enumerate() {
        if overwritten.contains(&accessor_id) {
            accessors.push(accessor.clone());
            continue;
        }

        let bytes = loader.read_bytes_from_accessor(root, accessor_id)?;
        let (name, target) = match accessor.buffer_view {
            Some(view) => {
                let view = accessor::get_buffer_view(root, view.value())?;
                (view.name.clone(), view.target)
            }
            None => (None, None),
        };
        let view_id = writer.push_view(&bytes, name, target);

        let mut accessor = accessor.clone();
        accessor.buffer_view = Some(json::Index::new(view_id as u32));
        accessor.byte_offset = Some(USize64(0));
        accessors.push(accessor);
    }

    for (channel, &accessor_id) in channels.iter().zip(&tangent_accessors) {
        let view_id = writer.push_view(
            bytemuck::cast_slice(&channel.tangents),
            None,
            Some(Checked::Valid(json::buffer::Target::ArrayBuffer)),
        );

        if accessor_id < accessors.len() {
            let rewritten =
                tangent_accessor(Some(&accessors[accessor_id]), view_id, channel.tangents.len());
            accessors[accessor_id] = rewritten;
        } else {
            accessors.push(tangent_accessor(None, view_id, channel.tangents.len()));
        }
    }

    let mut image_views = vec![];
    for (image_id, image) in root.images.iter().enumerate() {
        let view_id = match image.buffer_view {
            Some(view_id) => view_id.value(),
            None => continue,
        };

        let view = accessor::get_buffer_view(root, view_id)?;
        let data = loader.read_buffer(view.buffer.value())?;
        let offset = view.byte_offset.map_or(0, |offset| offset.0 as usize);
        let length = view.byte_length.0 as usize;
        if offset + length > data.len() {
            return Err(Error::format(format!(
                "Buffer view {view_id} of image {image_id} exceeds its buffer"
            ))
            .into());
        }

        let new_view_id = writer.push_view(&data[offset..offset + length], view.name.clone(), None);
        image_views.push((image_id, new_view_id));
    }

    Ok(RebuiltGraph {
        data: writer.data,
        buffer_views: writer.views,
        accessors,
        tangent_accessors,
        image_views,
    })
}

impl RebuiltGraph {
    /// Replaces the document's buffer graph and the cached buffers with this one.
    pub fn install(
        self,
        root: &mut json::Root,
        loader: &mut impl GltfLoader,
        channels: &[TangentChannel],
    ) {
        for (channel, &accessor_id) in channels.iter().zip(&self.tangent_accessors) {
            if let Some(primitive) = root
                .meshes
                .get_mut(channel.mesh)
                .and_then(|mesh| mesh.primitives.get_mut(channel.primitive))
            {
                primitive.attributes.insert(
                    Checked::Valid(json::mesh::Semantic::Tangents),
                    json::Index::new(accessor_id as u32),
                );
            }
        }

        for (image_id, view_id) in self.image_views {
            root.images[image_id].buffer_view = Some(json::Index::new(view_id as u32));
        }

        let mut buffer = match root.buffers.first() {
            Some(buffer) => buffer.clone(),
            None => json::Buffer {
                byte_length: USize64(0),
                name: None,
                uri: None,
                extensions: Default::default(),
                extras: Default::default(),
            },
        };
        buffer.byte_length = USize64::from(self.data.len());

        root.buffers = vec![buffer];
        root.buffer_views = self.buffer_views;
        root.accessors = self.accessors;

        loader.clear();
        loader.set_buffer(0, self.data);
    }
}
