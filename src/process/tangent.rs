use anyhow::Result;
use gltf::json;
use gltf::json::accessor::{ComponentType, Type};
use gltf::json::validation::Checked;

use crate::data::attributes::{AttributeLookup, NORMAL, POSITION, TANGENT, TEXCOORD};
use crate::error::Error;
use crate::process::{accessor, graph, indices, mesh_label};
use crate::resource::gltf::loader::GltfLoader;

/// Tangent for vertices that no triangle references.
const DEFAULT_TANGENT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Freshly generated tangents for one primitive.
#[derive(Debug, Clone)]
pub struct TangentChannel {
    pub mesh: usize,
    pub primitive: usize,
    /// Tangent accessor the primitive referenced before generation
    pub existing: Option<usize>,
    /// One tangent per vertex, `w` holding the bitangent sign
    pub tangents: Vec<[f32; 4]>,
}

#[derive(Debug, PartialEq, Eq)]
enum Ineligible {
    Topology,
    Positions,
    Normals,
    TexCoords,
    Indices,
}

impl std::fmt::Display for Ineligible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ineligible::Topology => write!(f, "it is not a triangle list"),
            Ineligible::Positions => write!(f, "it lacks positions channel"),
            Ineligible::Normals => write!(f, "it lacks normals channel"),
            Ineligible::TexCoords => write!(f, "it lacks uvs channel"),
            Ineligible::Indices => write!(f, "it lacks indices"),
        }
    }
}

fn check_eligibility(primitive: &json::mesh::Primitive) -> Result<(), Ineligible> {
    if !matches!(primitive.mode, Checked::Valid(json::mesh::Mode::Triangles)) {
        return Err(Ineligible::Topology);
    }

    if !primitive.has_attribute(POSITION) {
        return Err(Ineligible::Positions);
    }

    if !primitive.has_attribute(NORMAL) {
        return Err(Ineligible::Normals);
    }

    if !primitive.has_attribute(TEXCOORD) {
        return Err(Ineligible::TexCoords);
    }

    if primitive.indices.is_none() {
        return Err(Ineligible::Indices);
    }

    Ok(())
}

/// Generates tangents for every eligible primitive and rebuilds the buffer
/// graph around them. Returns the number of primitives that received tangents.
pub fn generate_tangent_frames(
    root: &mut json::Root,
    loader: &mut impl GltfLoader,
) -> Result<usize> {
    let channels = collect_tangent_channels(root, loader)?;
    if channels.is_empty() {
        log::info!("No primitive qualifies for tangent generation");
        return Ok(0);
    }

    loader.load_buffers(root)?;
    let rebuilt = graph::rebuild(root, loader, &channels)?;
    rebuilt.install(root, loader, &channels);

    Ok(channels.len())
}

pub fn collect_tangent_channels(
    root: &json::Root,
    loader: &mut impl GltfLoader,
) -> Result<Vec<TangentChannel>> {
    let mut channels = vec![];

    for (mesh_id, mesh) in root.meshes.iter().enumerate() {
        let label = mesh_label(mesh, mesh_id);

        for (primitive_id, primitive) in mesh.primitives.iter().enumerate() {
            if let Err(reason) = check_eligibility(primitive) {
                log::warn!(
                    "Could not generate tangents for mesh {label} primitive {primitive_id} since {reason}"
                );
                continue;
            }

            let existing = primitive.find_attribute(TANGENT);
            if existing.is_some() {
                log::warn!(
                    "Mesh {label} primitive {primitive_id} already has a tangent channel, it will be overwritten"
                );
            }

            log::debug!("Generating tangents for mesh {label} primitive {primitive_id}");

            let tangents = match compute_primitive_tangents(root, loader, primitive)? {
                Some(tangents) => tangents,
                None => {
                    return Err(Error::TangentGenerationFailure {
                        mesh: label,
                        primitive: primitive_id,
                    }
                    .into())
                }
            };

            channels.push(TangentChannel {
                mesh: mesh_id,
                primitive: primitive_id,
                existing,
                tangents,
            });
        }
    }

    Ok(channels)
}

fn required_attribute(primitive: &json::mesh::Primitive, prefix: &str) -> Result<usize> {
    match primitive.find_attribute(prefix) {
        Some(accessor_id) => Ok(accessor_id),
        None => Err(Error::format(format!(
            "Couldn't find mandatory primitive attribute {prefix}"
        ))
        .into()),
    }
}

/// Returns `None` when the tangent space generator gives up.
fn compute_primitive_tangents(
    root: &json::Root,
    loader: &mut impl GltfLoader,
    primitive: &json::mesh::Primitive,
) -> Result<Option<Vec<[f32; 4]>>> {
    let positions: Vec<[f32; 3]> =
        loader.load_accessor_as(root, required_attribute(primitive, POSITION)?)?;
    let tex_coords = load_tex_coords(root, loader, required_attribute(primitive, TEXCOORD)?)?;
    let normals: Vec<[f32; 3]> =
        loader.load_accessor_as(root, required_attribute(primitive, NORMAL)?)?;
    let indices = indices::load_indices(root, loader, primitive)?;

    if positions.len() != normals.len() || positions.len() != tex_coords.len() {
        return Err(Error::format(format!(
            "Inconsistent channel sizes: {} positions, {} normals, {} uvs",
            positions.len(),
            normals.len(),
            tex_coords.len()
        ))
        .into());
    }

    if let Some(index) = indices
        .iter()
        .find(|index| **index as usize >= positions.len())
    {
        return Err(Error::format(format!(
            "Index {index} is out of range for {} vertices",
            positions.len()
        ))
        .into());
    }

    if indices.len() % 3 != 0 {
        log::warn!(
            "Ignoring {} trailing indices that do not form a triangle",
            indices.len() % 3
        );
    }

    Ok(calculate_tangents(&positions, &normals, &tex_coords, &indices))
}

/// Reads a `TEXCOORD_n` accessor as floats, decoding normalized integer storage.
fn load_tex_coords(
    root: &json::Root,
    loader: &mut impl GltfLoader,
    accessor_id: usize,
) -> Result<Vec<[f32; 2]>> {
    let component_type = accessor::accessor_component_type(root, accessor_id)?;
    if accessor::accessor_type(root, accessor_id)? != Type::Vec2 {
        return Err(Error::UnsupportedAccessor {
            accessor_id,
            reason: String::from("texture coordinates must be two component vectors"),
        }
        .into());
    }

    match component_type {
        ComponentType::F32 => loader.load_accessor_as(root, accessor_id),
        ComponentType::U8 => Ok(loader
            .load_accessor_as::<[u8; 2]>(root, accessor_id)?
            .into_iter()
            .map(|uv| uv.map(|value| value as f32 / 255.0))
            .collect()),
        ComponentType::U16 => Ok(loader
            .load_accessor_as::<[u16; 2]>(root, accessor_id)?
            .into_iter()
            .map(|uv| uv.map(|value| value as f32 / 65535.0))
            .collect()),
        component_type => Err(Error::UnsupportedAccessor {
            accessor_id,
            reason: format!("texture coordinates stored as {component_type:?}"),
        }
        .into()),
    }
}

struct TangentGeometry<'a> {
    positions: &'a [[f32; 3]],
    normals: &'a [[f32; 3]],
    tex_coords: &'a [[f32; 2]],
    indices: &'a [u32],
    tangents: Vec<[f32; 4]>,
}

impl TangentGeometry<'_> {
    fn vertex(&self, face: usize, vert: usize) -> usize {
        self.indices[face * 3 + vert] as usize
    }
}

impl mikktspace::Geometry for TangentGeometry<'_> {
    fn num_faces(&self) -> usize {
        self.indices.len() / 3
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.positions[self.vertex(face, vert)]
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.normals[self.vertex(face, vert)]
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.tex_coords[self.vertex(face, vert)]
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        let vertex = self.vertex(face, vert);
        self.tangents[vertex] = tangent;
    }
}

/// Runs MikkTSpace over an indexed triangle list.
///
/// Every index must be smaller than the number of vertices.
pub fn calculate_tangents(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    indices: &[u32],
) -> Option<Vec<[f32; 4]>> {
    let mut geometry = TangentGeometry {
        positions,
        normals,
        tex_coords,
        indices,
        tangents: vec![DEFAULT_TANGENT; positions.len()],
    };

    if !mikktspace::generate_tangents(&mut geometry) {
        return None;
    }

    Some(geometry.tangents)
}
