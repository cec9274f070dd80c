use gltf::json;

pub mod accessor;
pub mod consolidate;
pub mod graph;
pub mod indices;
pub mod tangent;
pub mod winding;

pub fn mesh_label(mesh: &json::Mesh, mesh_id: usize) -> String {
    format!("{} - [{mesh_id}]", mesh.name.as_deref().unwrap_or("<UNNAMED>"))
}
