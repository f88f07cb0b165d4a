//! Generated geometry that does not come from a model file.

use crate::data_structures::model::{Geometry, ModelVertex};

/// Axis aligned box centred on the origin with the given extents.
///
/// Each face has its own four vertices so the faces can carry separate texture
/// coordinates.
pub fn cuboid(name: &str, width: f32, height: f32, depth: f32) -> Geometry {
    let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
    // corners of each face, counter-clockwise when seen from outside
    let faces: [[[f32; 3]; 4]; 6] = [
        // +x
        [[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]],
        // -x
        [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]],
        // +y
        [[-x, y, z], [x, y, z], [x, y, -z], [-x, y, -z]],
        // -y
        [[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]],
        // +z
        [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]],
        // -z
        [[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]],
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for face in faces {
        let base = vertices.len() as u32;
        vertices.extend(face.iter().zip(uvs).map(|(&position, tex_coords)| ModelVertex {
            position,
            tex_coords,
        }));
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry::new(name, vertices, indices)
}
