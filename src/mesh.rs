use anyhow::anyhow;
use glow::HasContext;

use crate::gl_debug::gl_call;
use crate::utils::Vertex;

/// Attribute slot the vertex shader reads positions from.
const POSITION_LOCATION: u32 = 0;

/// Static indexed geometry resident on the GPU.
pub struct Mesh {
    vertex_array: glow::VertexArray,
    vertex_buffer: glow::Buffer,
    index_buffer: glow::Buffer,
    num_elements: i32,
}

impl Mesh {
    /// Uploads `vertices` and `indices` once with static usage.
    ///
    /// The vertex array stays bound afterwards so the index buffer binding is
    /// recorded in it.
    pub fn upload(gl: &glow::Context, vertices: &[Vertex], indices: &[u32]) -> anyhow::Result<Mesh> {
        unsafe {
            let vertex_array = gl
                .create_vertex_array()
                .map_err(|e| anyhow!("failed to create vertex array: {e}"))?;
            gl.bind_vertex_array(Some(vertex_array));

            let vertex_buffer = gl
                .create_buffer()
                .map_err(|e| anyhow!("failed to create vertex buffer: {e}"))?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertex_buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );

            gl.enable_vertex_attrib_array(POSITION_LOCATION);
            gl.vertex_attrib_pointer_f32(
                POSITION_LOCATION,
                Vertex::COMPONENTS,
                glow::FLOAT,
                false,
                Vertex::STRIDE,
                0,
            );

            let index_buffer = gl
                .create_buffer()
                .map_err(|e| anyhow!("failed to create index buffer: {e}"))?;
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(index_buffer));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );

            log::debug!(
                "uploaded mesh: {} vertices, {} indices",
                vertices.len(),
                indices.len()
            );

            Ok(Mesh {
                vertex_array,
                vertex_buffer,
                index_buffer,
                num_elements: indices.len() as i32,
            })
        }
    }

    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vertex_array));
            gl_call!(
                gl,
                gl.draw_elements(glow::TRIANGLES, self.num_elements, glow::UNSIGNED_INT, 0)
            );
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_buffer(self.index_buffer);
            gl.delete_buffer(self.vertex_buffer);
            gl.delete_vertex_array(self.vertex_array);
        }
    }
}
