use std::fmt;
use std::path::Path;

use anyhow::anyhow;
use glow::HasContext;

use crate::resources;

/// Line prefix that switches which stage the following lines belong to.
const STAGE_MARKER: &str = "#shader";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Vertex and fragment source text split out of one shader file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderProgramSource {
    pub vertex_source: String,
    pub fragment_source: String,
}

impl ShaderProgramSource {
    /// Routes every line to the stage named by the last `#shader` marker.
    ///
    /// Marker lines themselves are dropped, as is anything before the first
    /// marker. A marker naming neither stage leaves the routing unchanged.
    pub fn parse(text: &str) -> Self {
        let mut source = Self::default();
        let mut stage = None;

        for line in text.lines() {
            if line.contains(STAGE_MARKER) {
                if line.contains("vertex") {
                    stage = Some(ShaderStage::Vertex);
                } else if line.contains("fragment") {
                    stage = Some(ShaderStage::Fragment);
                }
                continue;
            }

            let bucket = match stage {
                Some(ShaderStage::Vertex) => &mut source.vertex_source,
                Some(ShaderStage::Fragment) => &mut source.fragment_source,
                None => continue,
            };
            bucket.push_str(line);
            bucket.push('\n');
        }

        source
    }
}

/// Reads and splits a shader file.
pub fn parse_shader(file_path: impl AsRef<Path>) -> anyhow::Result<ShaderProgramSource> {
    let text = resources::load_string(file_path)?;
    Ok(ShaderProgramSource::parse(&text))
}

/// A linked GPU program. Owned by the application and deleted on teardown.
pub struct ShaderProgram {
    program: glow::Program,
}

impl ShaderProgram {
    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}

/// Compiles one stage. Failures are logged and the shader object deleted.
pub fn compile_shader(gl: &glow::Context, stage: ShaderStage, source: &str) -> Option<glow::Shader> {
    unsafe {
        let shader = match gl.create_shader(stage.gl_type()) {
            Ok(shader) => shader,
            Err(e) => {
                log::error!("Failed to create {stage} shader: {e}");
                return None;
            }
        };

        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let message = gl.get_shader_info_log(shader);
            log::error!("Failed to compile {stage} shader!\n{message}");
            gl.delete_shader(shader);
            return None;
        }

        Some(shader)
    }
}

/// Compiles both stages and links them into a program.
///
/// A stage that fails to compile is left out and a failed link is only
/// logged, so the returned program may be unusable. Only failing to allocate
/// the program object is an error.
pub fn create_shader(
    gl: &glow::Context,
    vertex_shader: &str,
    fragment_shader: &str,
) -> anyhow::Result<ShaderProgram> {
    unsafe {
        let program = gl
            .create_program()
            .map_err(|e| anyhow!("failed to create shader program: {e}"))?;

        let stages = [
            compile_shader(gl, ShaderStage::Vertex, vertex_shader),
            compile_shader(gl, ShaderStage::Fragment, fragment_shader),
        ];

        for shader in stages.iter().flatten() {
            gl.attach_shader(program, *shader);
        }

        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            log::error!(
                "Failed to link shader program!\n{}",
                gl.get_program_info_log(program)
            );
        }

        // the linked program keeps its own copy of the binaries
        for shader in stages.into_iter().flatten() {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }

        Ok(ShaderProgram { program })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_vertex_and_fragment_blocks() {
        let source = ShaderProgramSource::parse(
            "#shader vertex\nvoid main() { v(); }\n#shader fragment\nvoid main() { f(); }\n",
        );

        assert_eq!(source.vertex_source, "void main() { v(); }\n");
        assert_eq!(source.fragment_source, "void main() { f(); }\n");
    }

    #[test]
    fn text_before_first_marker_is_dropped() {
        let source = ShaderProgramSource::parse("// header\n#version 330 core\n#shader fragment\nout\n");

        assert_eq!(source.vertex_source, "");
        assert_eq!(source.fragment_source, "out\n");
    }

    #[test]
    fn blocks_may_appear_in_any_order() {
        let source = ShaderProgramSource::parse("#shader fragment\nf\n#shader vertex\nv\n");

        assert_eq!(source.vertex_source, "v\n");
        assert_eq!(source.fragment_source, "f\n");
    }

    #[test]
    fn unknown_marker_keeps_current_stage() {
        let source = ShaderProgramSource::parse("#shader vertex\na\n#shader geometry\nb\n");

        assert_eq!(source.vertex_source, "a\nb\n");
        assert_eq!(source.fragment_source, "");
    }

    #[test]
    fn repeated_marker_appends_to_the_same_stage() {
        let source = ShaderProgramSource::parse("#shader vertex\na\n#shader fragment\nb\n#shader vertex\nc\n");

        assert_eq!(source.vertex_source, "a\nc\n");
        assert_eq!(source.fragment_source, "b\n");
    }

    #[test]
    fn empty_input_gives_empty_sources() {
        assert_eq!(ShaderProgramSource::parse(""), ShaderProgramSource::default());
    }

    #[test]
    fn parses_shipped_shader_file() {
        let source = parse_shader("res/shaders/basic.shader").unwrap();

        assert!(source.vertex_source.starts_with("#version 330 core"));
        assert!(source.vertex_source.contains("gl_Position"));
        assert!(source.fragment_source.contains("out vec4 color"));
        assert!(!source.fragment_source.contains(STAGE_MARKER));
    }

    #[test]
    fn stage_names() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
