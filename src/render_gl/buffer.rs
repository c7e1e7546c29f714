use gl;
use std;

pub struct VertexBuffer {
    gl: gl::Gl,
    vbo: gl::types::GLuint,
}

impl VertexBuffer {
    /// Uploads `data` into a new `ARRAY_BUFFER` with `STATIC_DRAW` usage. The buffer is left unbound.
    pub fn new(gl: &gl::Gl, data: &[f32]) -> VertexBuffer {
        let mut vbo: gl::types::GLuint = 0;

        unsafe {
            gl.GenBuffers(1, &mut vbo);
            gl.BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl.BufferData(
                gl::ARRAY_BUFFER,
                (data.len() * std::mem::size_of::<f32>()) as gl::types::GLsizeiptr,
                data.as_ptr() as *const gl::types::GLvoid,
                gl::STATIC_DRAW,
            );
            gl.BindBuffer(gl::ARRAY_BUFFER, 0);
        }

        VertexBuffer { gl: gl.clone(), vbo }
    }

    pub fn bind(&self) {
        unsafe {
            self.gl.BindBuffer(gl::ARRAY_BUFFER, self.vbo);
        }
    }

    pub fn unbind(&self) {
        unsafe {
            self.gl.BindBuffer(gl::ARRAY_BUFFER, 0);
        }
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.DeleteBuffers(1, &self.vbo);
        }
    }
}

pub struct VertexArray {
    gl: gl::Gl,
    vao: gl::types::GLuint,
}

impl VertexArray {
    pub fn new(gl: &gl::Gl) -> VertexArray {
        let mut vao: gl::types::GLuint = 0;
        unsafe {
            gl.GenVertexArrays(1, &mut vao);
        }

        VertexArray { gl: gl.clone(), vao }
    }

    pub fn bind(&self) {
        unsafe {
            self.gl.BindVertexArray(self.vao);
        }
    }

    pub fn unbind(&self) {
        unsafe {
            self.gl.BindVertexArray(0);
        }
    }

    /// Points `location` at tightly packed floats in the currently bound `ARRAY_BUFFER`.
    /// The vertex array must be bound.
    pub fn float_attrib(&self, location: gl::types::GLuint, components: gl::types::GLint) {
        unsafe {
            self.gl.VertexAttribPointer(
                location,
                components,
                gl::FLOAT,
                gl::FALSE,
                0,
                std::ptr::null(),
            );
            self.gl.EnableVertexAttribArray(location);
        }
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe {
            self.gl.DeleteVertexArrays(1, &self.vao);
        }
    }
}
