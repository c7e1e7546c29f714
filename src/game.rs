use gl;
use na::Matrix4;
use sdl2;
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Mod};
use sdl2::video::{GLContext, Window};
use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::time::Duration;

use config::{Config, WindowConfig};
use geometry;
use render_gl::{self, GlError, Program, VertexArray, VertexBuffer};
use resources::Resources;
use timer::FrameTimer;
use transform::{self, CubeTransform};

const CUBE_PROGRAM: &str = "shaders/cube";

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Could not initialize SDL: {}", _0)]
    SdlInit(String),
    #[fail(display = "SDL_CreateWindow failed: {}", _0)]
    WindowCreation(String),
    #[fail(display = "Failed to create OpenGL context: {}", _0)]
    ContextCreation(String),
    #[fail(display = "Failed to get SDL event pump: {}", _0)]
    EventPump(String),
    #[fail(display = "Failed to set up shader program")]
    Program(#[cause] render_gl::Error),
    #[fail(display = "OpenGL call failed")]
    Gl(#[cause] GlError),
}

impl From<render_gl::Error> for Error {
    fn from(other: render_gl::Error) -> Self {
        Error::Program(other)
    }
}

impl From<GlError> for Error {
    fn from(other: GlError) -> Self {
        Error::Gl(other)
    }
}

/// True for the events that end the main loop: Escape, Ctrl+Q and window close.
pub fn is_exit_event(event: &Event) -> bool {
    match *event {
        Event::Quit { .. } => true,
        Event::KeyDown { keycode: Some(Keycode::Escape), .. } => true,
        Event::KeyDown { keycode: Some(Keycode::Q), keymod, .. } => {
            keymod.intersects(Mod::LCTRLMOD | Mod::RCTRLMOD)
        }
        _ => false,
    }
}

// Fields drop in declaration order: GL objects go before the context, the context before the window.
pub struct Game {
    _positions: VertexBuffer,
    _normals: VertexBuffer,
    vao: VertexArray,
    program: Program,
    vertex_count: gl::types::GLsizei,
    gl: gl::Gl,
    _gl_context: GLContext,
    window: Window,
    sdl: sdl2::Sdl,

    cube: CubeTransform,
    view: Matrix4<f32>,
    timer: FrameTimer,
}

impl Game {
    pub fn new(config: &Config, res: &Resources) -> Result<Game, Error> {
        let sdl = sdl2::init().map_err(Error::SdlInit)?;
        let video = sdl.video().map_err(Error::SdlInit)?;

        set_context_attributes(&video, &config.window);

        let window = video
            .window(&config.window.title, config.window.width, config.window.height)
            .opengl()
            .position_centered()
            .build()
            .map_err(|e| Error::WindowCreation(e.to_string()))?;

        let gl_context = window.gl_create_context().map_err(Error::ContextCreation)?;
        let gl = gl::Gl::load_with(|s| video.gl_get_proc_address(s) as *const c_void);
        // loading may leave a stale error behind
        unsafe { gl.GetError(); }

        info!(
            "OpenGL {} ({})",
            gl_string(&gl, gl::VERSION),
            gl_string(&gl, gl::RENDERER)
        );

        set_gl_states(&gl, config);
        assert_gl!(gl)?;

        let projection = transform::projection(config.window.width, config.window.height);
        let view = transform::view();
        let cube = CubeTransform::new(config.degrees_per_second);

        let program = Program::from_res(&gl, res, CUBE_PROGRAM)?;
        debug!("Program {} built from {}", program.id(), CUBE_PROGRAM);
        program.set_used();
        program.set_uniform_mat4("projection_matrix", &projection)?;
        program.set_uniform_mat4("model_matrix", &cube.model())?;
        program.set_uniform_mat4("view_matrix", &view)?;
        program.set_unused();
        assert_gl!(gl)?;

        let mesh = geometry::cube();
        let vao = VertexArray::new(&gl);
        vao.bind();

        let positions = VertexBuffer::new(&gl, &mesh.positions);
        positions.bind();
        vao.float_attrib(program.attrib_location("in_Position")?, 3);
        assert_gl!(gl)?;

        let normals = VertexBuffer::new(&gl, &mesh.normals);
        normals.bind();
        vao.float_attrib(program.attrib_location("in_Normal")?, 3);
        assert_gl!(gl)?;

        normals.unbind();
        vao.unbind();
        assert_gl!(gl)?;

        debug!("Uploaded cube mesh with {} vertices", mesh.vertex_count());

        Ok(Game {
            _positions: positions,
            _normals: normals,
            vao,
            program,
            vertex_count: mesh.vertex_count() as gl::types::GLsizei,
            gl,
            _gl_context: gl_context,
            window,
            sdl,
            cube,
            view,
            timer: FrameTimer::new(),
        })
    }

    pub fn render(&mut self, elapsed: Duration) -> Result<(), Error> {
        self.cube.advance(elapsed);
        let model = self.cube.model();
        let normal_matrix = transform::normal_matrix(&self.view, &model);

        unsafe {
            self.gl.Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }
        self.program.set_used();
        self.program.set_uniform_mat4("model_matrix", &model)?;
        self.program.set_uniform_mat3("normal_matrix", &normal_matrix)?;

        self.vao.bind();
        unsafe {
            self.gl.DrawArrays(gl::TRIANGLES, 0, self.vertex_count);
        }
        self.vao.unbind();
        self.program.set_unused();

        assert_gl!(self.gl)?;
        Ok(())
    }

    /// Runs the main loop until an exit event arrives.
    pub fn play(&mut self) -> Result<(), Error> {
        let mut event_pump = self.sdl.event_pump().map_err(Error::EventPump)?;

        // time spent setting up should not show up as a jump in the first frame
        self.timer.restart();

        'main: loop {
            for event in event_pump.poll_iter() {
                if is_exit_event(&event) {
                    debug!("Exit requested by {:?}", event);
                    break 'main;
                }
            }

            let elapsed = self.timer.elapsed_and_restart();
            self.render(elapsed)?;
            self.window.gl_swap_window();
        }

        self.quit();
        Ok(())
    }

    fn quit(&self) {
        println!("Bye bye...");
    }
}

fn set_context_attributes(video: &sdl2::VideoSubsystem, window: &WindowConfig) {
    let gl_attr = video.gl_attr();

    let (major, minor) = window.gl_version;
    gl_attr.set_context_version(major, minor);

    gl_attr.set_double_buffer(true);
    gl_attr.set_depth_size(window.depth_bits);
    gl_attr.set_red_size(window.color_bits);
    gl_attr.set_green_size(window.color_bits);
    gl_attr.set_blue_size(window.color_bits);
    gl_attr.set_alpha_size(window.color_bits);

    if window.multisample_samples > 0 {
        gl_attr.set_multisample_buffers(1);
        gl_attr.set_multisample_samples(window.multisample_samples);
    } else {
        gl_attr.set_multisample_buffers(0);
    }
}

fn set_gl_states(gl: &gl::Gl, config: &Config) {
    let [r, g, b, a] = config.clear_color;
    unsafe {
        gl.Enable(gl::DEPTH_TEST);
        gl.DepthFunc(gl::LEQUAL);
        gl.Enable(gl::CULL_FACE);
        gl.ClearColor(r, g, b, a);
        gl.Viewport(
            0,
            0,
            config.window.width as gl::types::GLsizei,
            config.window.height as gl::types::GLsizei,
        );
    }
}

fn gl_string(gl: &gl::Gl, name: gl::types::GLenum) -> String {
    let ptr = unsafe { gl.GetString(name) };
    if ptr.is_null() {
        return "unknown".into();
    }
    unsafe { CStr::from_ptr(ptr as *const c_char) }.to_string_lossy().into_owned()
}
