use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use eframe::glow::{self, HasContext};
use hyprviz_messages::SnapshotStore;
use log::{debug, info};

use crate::bindings::{InjectReport, UniformHost, Visualizer};

const DESKTOP_HEADER: &str = "#version 330\n";
const EMBEDDED_HEADER: &str = "#version 300 es\nprecision mediump float;\n";

// Both shaders get their `#version` line from `with_version_header`.
const VERTEX_SHADER: &str = r#"
const vec2 verts[3] = vec2[3](
    vec2(-1.0, -1.0),
    vec2(3.0, -1.0),
    vec2(-1.0, 3.0)
);
out vec2 v_uv;
void main() {
    vec2 pos = verts[gl_VertexID];
    v_uv = pos * 0.5 + 0.5;
    gl_Position = vec4(pos, 0.0, 1.0);
}
"#;

const BUILTIN_FRAGMENT_SHADER: &str = r#"
uniform float loudness;
uniform float bands[12];
in vec2 v_uv;
out vec4 out_color;
void main() {
    int index = int(clamp(v_uv.x * 12.0, 0.0, 11.0));
    float bar = step(v_uv.y, bands[index]);
    float r = sin(v_uv.x * 10.0 + loudness * 5.0);
    float g = sin(v_uv.y * 10.0 + loudness * 10.0);
    vec3 background = vec3(r, g, loudness) * 0.4;
    out_color = vec4(mix(background, vec3(0.2, 0.9, 0.5), bar * 0.8), 1.0);
}
"#;

/// Prefix `source` with the GLSL version the context speaks, unless it
/// already names one.
fn with_version_header(source: &str, embedded: bool) -> Cow<'_, str> {
    if source.trim_start().starts_with("#version") {
        return Cow::Borrowed(source);
    }
    let header = if embedded { EMBEDDED_HEADER } else { DESKTOP_HEADER };
    Cow::Owned(format!("{header}{source}"))
}

/// Where the fragment shader comes from. File shaders are re-read on reload.
///
/// Sources without a `#version` line get one matching the GL context.
#[derive(Debug, Clone, Default)]
pub enum ShaderSource {
    #[default]
    Builtin,
    File(PathBuf),
}

impl ShaderSource {
    pub fn load(&self) -> Result<String> {
        match self {
            Self::Builtin => Ok(BUILTIN_FRAGMENT_SHADER.to_owned()),
            Self::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read shader {}", path.display())),
        }
    }
}

/// [`UniformHost`] over a glow context.
pub struct GlowHost<'a> {
    gl: &'a glow::Context,
}

impl<'a> GlowHost<'a> {
    pub fn new(gl: &'a glow::Context) -> Self {
        Self { gl }
    }
}

impl UniformHost for GlowHost<'_> {
    type Program = glow::Program;
    type Slot = glow::UniformLocation;

    fn resolve(&self, program: glow::Program, name: &str) -> Option<glow::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn set_float(&self, slot: &glow::UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(slot), value) }
    }
}

/// Fullscreen shader effect driven by the latest snapshot.
pub struct ShaderScene {
    program: glow::Program,
    vertex_array: glow::VertexArray,
    visualizer: Visualizer<glow::Program, glow::UniformLocation>,
    last_report: InjectReport,
}

impl ShaderScene {
    pub fn new(gl: &glow::Context, fragment: &str, store: Arc<SnapshotStore>) -> Result<Self> {
        let program = compile_program(gl, fragment)?;
        let vertex_array = unsafe { gl.create_vertex_array() }
            .map_err(|e| anyhow!("Cannot create vertex array: {e}"))?;

        Ok(Self {
            program,
            vertex_array,
            visualizer: Visualizer::new(store),
            last_report: InjectReport::default(),
        })
    }

    /// Compile `fragment` and swap it in. On failure the current program stays.
    ///
    /// GL may hand the new program the name of the one just deleted, so the
    /// uniform cache is invalidated explicitly rather than relying on the
    /// handle changing.
    pub fn reload(&mut self, gl: &glow::Context, fragment: &str) -> Result<()> {
        let program = compile_program(gl, fragment)?;
        unsafe { gl.delete_program(self.program) };
        self.program = program;
        self.visualizer.invalidate();
        info!("Shader reloaded as program {:?}", program);
        Ok(())
    }

    pub fn paint(&mut self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
        self.last_report = self
            .visualizer
            .on_program_activated(&GlowHost::new(gl), self.program);
        unsafe {
            gl.bind_vertex_array(Some(self.vertex_array));
            gl.draw_arrays(glow::TRIANGLES, 0, 3);
        }
    }

    pub fn last_report(&self) -> InjectReport {
        self.last_report
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vertex_array);
        }
    }
}

fn compile_program(gl: &glow::Context, fragment: &str) -> Result<glow::Program> {
    unsafe {
        let program = gl
            .create_program()
            .map_err(|e| anyhow!("Cannot create program: {e}"))?;

        let embedded = gl.version().is_embedded;
        let sources = [
            (glow::VERTEX_SHADER, with_version_header(VERTEX_SHADER, embedded)),
            (glow::FRAGMENT_SHADER, with_version_header(fragment, embedded)),
        ];
        let mut shaders = Vec::with_capacity(sources.len());
        for (kind, source) in sources {
            let shader = match gl.create_shader(kind) {
                Ok(shader) => shader,
                Err(e) => {
                    release(gl, program, &shaders);
                    bail!("Cannot create shader: {e}");
                }
            };
            gl.shader_source(shader, &source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                release(gl, program, &shaders);
                let stage = if kind == glow::VERTEX_SHADER { "VERT" } else { "FRAG" };
                bail!("[{stage}] Shader compile failed: {log}");
            }
            gl.attach_shader(program, shader);
            shaders.push(shader);
        }

        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            release(gl, program, &shaders);
            bail!("Shader link failed: {log}");
        }

        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        debug!("Linked program {:?}", program);
        Ok(program)
    }
}

unsafe fn release(gl: &glow::Context, program: glow::Program, shaders: &[glow::Shader]) {
    unsafe {
        for &shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        gl.delete_program(program);
    }
}
