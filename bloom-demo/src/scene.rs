//! Geometry for the cube field rendered into the scene target.

use bloom_gpu::wgpu;

/// Per-vertex data. Matches the `VertexInput` struct in `scene.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Per-instance data. Matches the `InstanceInput` struct in `scene.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneInstance {
    pub offset: [f32; 3],
    pub color: [f32; 3],
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32x3];

pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SceneVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SceneInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRIBUTES,
    }
}

/// Axis-aligned cube centered at the origin, 24 vertices with one normal
/// per face.
pub fn cube_vertices(half_extent: f32) -> Vec<SceneVertex> {
    // (face normal, four corners wound counter-clockwise seen from outside)
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
        ),
        (
            [0.0, 0.0, -1.0],
            [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
        ),
        (
            [1.0, 0.0, 0.0],
            [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
        ),
        (
            [-1.0, 0.0, 0.0],
            [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
        ),
        (
            [0.0, 1.0, 0.0],
            [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
        ),
        (
            [0.0, -1.0, 0.0],
            [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
        ),
    ];

    FACES
        .iter()
        .flat_map(|(normal, corners)| {
            corners.iter().map(move |corner| SceneVertex {
                position: [
                    corner[0] * half_extent,
                    corner[1] * half_extent,
                    corner[2] * half_extent,
                ],
                normal: *normal,
            })
        })
        .collect()
}

/// Two triangles per face over the 24-vertex cube.
pub fn cube_indices() -> Vec<u16> {
    (0..6u16)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect()
}

/// A loose ring of cubes around the origin.
pub fn instances() -> Vec<SceneInstance> {
    vec![
        SceneInstance {
            offset: [0.0, 0.0, 0.0],
            color: [0.95, 0.95, 0.9],
        },
        SceneInstance {
            offset: [-6.0, 0.5, -3.0],
            color: [0.9, 0.3, 0.25],
        },
        SceneInstance {
            offset: [6.0, -0.5, -3.0],
            color: [0.3, 0.5, 0.95],
        },
        SceneInstance {
            offset: [-3.5, -1.0, 4.0],
            color: [0.35, 0.85, 0.4],
        },
        SceneInstance {
            offset: [3.5, 1.0, 4.0],
            color: [0.95, 0.8, 0.3],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_mesh_is_consistent() {
        let vertices = cube_vertices(1.5);
        let indices = cube_indices();

        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn face_normals_are_unit_axes() {
        for vertex in cube_vertices(2.0) {
            let length_sq: f32 = vertex.normal.iter().map(|c| c * c).sum();
            assert_eq!(length_sq, 1.0);
        }
    }
}
