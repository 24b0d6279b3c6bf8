#[repr(C)] // 'C-like' layout so the attribute pointer offsets match the struct
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
}

impl Vertex {
    /// Number of float components in a position.
    pub const COMPONENTS: i32 = 2;
    /// Byte distance between two consecutive vertices.
    pub const STRIDE: i32 = std::mem::size_of::<Vertex>() as i32;
}

pub const VERTICES: &[Vertex] = &[
    Vertex {
        position: [-0.5, -0.5],
    }, // bottom left
    Vertex {
        position: [0.5, -0.5],
    }, // bottom right
    Vertex {
        position: [0.5, 0.5],
    }, // top right
    Vertex {
        position: [-0.5, 0.5],
    }, // top left
];

pub const INDICES: &[u32] = &[0, 1, 2, 2, 3, 0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_stay_inside_the_vertex_array() {
        assert!(INDICES.iter().all(|&i| (i as usize) < VERTICES.len()));
    }

    #[test]
    fn quad_is_two_triangles() {
        assert_eq!(VERTICES.len(), 4);
        assert_eq!(INDICES.len() % 3, 0);
        assert_eq!(INDICES.len() / 3, 2);
    }

    #[test]
    fn vertex_is_two_packed_floats() {
        assert_eq!(Vertex::STRIDE, 8);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(VERTICES).len(), 32);
    }
}
