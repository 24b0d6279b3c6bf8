mod gl_debug;
mod mesh;
mod resources;
mod shader;
mod utils;

const WINDOW_TITLE: &str = "Hello World";
const WINDOW_WIDTH: u32 = 640;
const WINDOW_HEIGHT: u32 = 480;
const SHADER_PATH: &str = "res/shaders/basic.shader";
const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

use std::num::NonZeroU32;

use anyhow::{anyhow, Context};
use glow::HasContext;
use glutin::{
    config::{Config, ConfigTemplateBuilder},
    display::GetGlDisplay,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    prelude::*,
    surface::{Surface, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasRawWindowHandle;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

use mesh::Mesh;
use shader::ShaderProgram;

// Drop order matters: GL objects go first (see Drop), then the context, the
// surface it renders to, and finally the window backing that surface.
struct Application {
    mesh: Mesh,
    program: ShaderProgram,
    gl: glow::Context,
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
    window: Window,
}

impl Application {
    fn new(event_loop: &EventLoop<()>) -> anyhow::Result<Application> {
        // --WINDOW & CONTEXT-- //
        let window_builder = WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let (window, gl_config) = display_builder
            .build(event_loop, ConfigTemplateBuilder::new(), gl_config_picker)
            .map_err(|e| anyhow!("failed to create window: {e}"))?;
        let window = window.context("display builder returned no window")?;

        let raw_window_handle = Some(window.raw_window_handle());
        let gl_display = gl_config.display();

        // ask for 3.3 core first, the shaders are written against it
        let core_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(raw_window_handle);
        let fallback_attributes = ContextAttributesBuilder::new().build(raw_window_handle);

        // --SAFETY--
        // The raw window handle belongs to `window`, which Application keeps
        // alive for longer than the context and surface.
        let not_current_context = unsafe {
            gl_display
                .create_context(&gl_config, &core_attributes)
                .or_else(|e| {
                    log::warn!("OpenGL 3.3 core unavailable ({e}), using the default context");
                    gl_display.create_context(&gl_config, &fallback_attributes)
                })
                .context("failed to create OpenGL context")?
        };

        let surface_attributes = window.build_surface_attributes(Default::default());
        let gl_surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &surface_attributes)
                .context("failed to create window surface")?
        };

        let gl_context = not_current_context
            .make_current(&gl_surface)
            .context("failed to make OpenGL context current")?;

        // --FUNCTION LOADING-- //
        if gl_display.get_proc_address(c"glGetString").is_null() {
            log::error!("Error: failed to load OpenGL function pointers!");
            std::process::abort();
        }
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };

        log::info!("{}", unsafe { gl.get_parameter_string(glow::VERSION) });

        // --GEOMETRY-- //
        let mesh = Mesh::upload(&gl, utils::VERTICES, utils::INDICES)?;

        // --SHADERS-- //
        let source = shader::parse_shader(SHADER_PATH)?;
        let program = shader::create_shader(&gl, &source.vertex_source, &source.fragment_source)?;
        program.bind(&gl);

        unsafe {
            let [r, g, b, a] = CLEAR_COLOR;
            gl.clear_color(r, g, b, a);
        }

        Ok(Application {
            mesh,
            program,
            gl,
            gl_context,
            gl_surface,
            window,
        })
    }

    fn run(mut self, event_loop: EventLoop<()>) -> anyhow::Result<()> {
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run(move |event, elwt| match event {
                Event::WindowEvent {
                    window_id,
                    ref event,
                } if window_id == self.window.id() => match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key: Key::Named(NamedKey::Escape),
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    } => {
                        elwt.exit();
                    }

                    WindowEvent::Resized(physical_size) => {
                        self.resize(*physical_size);
                    }

                    WindowEvent::RedrawRequested => {
                        let now = instant::Instant::now();

                        if let Err(e) = self.render() {
                            log::error!("{e:?}");
                            elwt.exit();
                        }

                        log::trace!("frame took {}ms", now.elapsed().as_millis());
                    }

                    _ => (),
                },

                // redraw continuously
                Event::AboutToWait => self.window.request_redraw(),

                _ => (),
            })
            .map_err(|e| anyhow!("event loop failed: {e}"))
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        // minimized windows report a zero size
        let (Some(width), Some(height)) = (
            NonZeroU32::new(new_size.width),
            NonZeroU32::new(new_size.height),
        ) else {
            return;
        };

        self.gl_surface.resize(&self.gl_context, width, height);
        unsafe {
            self.gl
                .viewport(0, 0, new_size.width as i32, new_size.height as i32)
        };
    }

    fn render(&mut self) -> anyhow::Result<()> {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) };

        self.mesh.draw(&self.gl);

        self.gl_surface
            .swap_buffers(&self.gl_context)
            .context("failed to swap buffers")
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        log::debug!("releasing GPU resources");
        self.program.destroy(&self.gl);
        self.mesh.destroy(&self.gl);
    }
}

/// Prefers the config with the most samples.
fn gl_config_picker(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|accum, config| {
            if config.num_samples() > accum.num_samples() {
                config
            } else {
                accum
            }
        })
        // glutin reports an error instead of calling the picker with no configs
        .expect("display offered no OpenGL configs")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("opengl_learning=info"),
    )
    .init();

    let event_loop = EventLoop::new().map_err(|e| anyhow!("failed to create event loop: {e}"))?;
    let application = Application::new(&event_loop)?;
    application.run(event_loop)
}
