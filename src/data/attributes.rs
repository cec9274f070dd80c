use gltf::json;
use gltf::json::validation::Checked;

pub const POSITION: &str = "POSITION";
pub const NORMAL: &str = "NORMAL";
pub const TEXCOORD: &str = "TEXCOORD_";
pub const TANGENT: &str = "TANGENT";

/// Attribute lookup by semantic name prefix.
///
/// Attributes are iterated in the order of the primitive's attribute map, so
/// the first matching semantic is always the same one for a given primitive.
pub trait AttributeLookup {
    fn find_attribute(&self, prefix: &str) -> Option<usize>;

    fn has_attribute(&self, prefix: &str) -> bool {
        self.find_attribute(prefix).is_some()
    }
}

impl AttributeLookup for json::mesh::Primitive {
    fn find_attribute(&self, prefix: &str) -> Option<usize> {
        self.attributes
            .iter()
            .find_map(|(semantic, accessor)| match semantic {
                Checked::Valid(semantic) if semantic.to_string().starts_with(prefix) => {
                    Some(accessor.value())
                }
                _ => None,
            })
    }
}
