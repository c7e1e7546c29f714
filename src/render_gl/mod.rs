#[macro_use]
mod gl_check;
pub use self::gl_check::{check_gl_error, GlError};

mod shader;
pub use self::shader::{Program, Error};

mod buffer;
pub use self::buffer::{VertexArray, VertexBuffer};
