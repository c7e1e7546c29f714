use gl;
use na;
use std;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use resources::{self, Resources};

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Failed to load resource {}", name)]
    ResourceLoad { name: String, #[cause] inner: resources::Error },
    #[fail(display = "Can not determine shader type for resource {}", name)]
    CanNotDetermineShaderTypeForResource { name: String },
    #[fail(display = "Failed to compile shader {}: {}", name, message)]
    CompileError { name: String, message: String },
    #[fail(display = "Failed to link program {}: {}", name, message)]
    LinkError { name: String, message: String },
    #[fail(display = "Uniform {} is not active in the program", name)]
    UniformNotFound { name: String },
    #[fail(display = "Uniform {} is not a {}", name, expected)]
    UniformTypeMismatch { name: String, expected: &'static str },
    #[fail(display = "Attribute {} is not active in the program", name)]
    AttribNotFound { name: String },
}

#[derive(Debug, Clone, Copy)]
struct Uniform {
    location: gl::types::GLint,
    typ: gl::types::GLenum,
}

pub struct Program {
    gl: gl::Gl,
    id: gl::types::GLuint,

    uniforms: HashMap<String, Uniform>,
}

impl Program {
    pub fn from_res(gl: &gl::Gl, res: &Resources, name: &str) -> Result<Program, Error> {
        const POSSIBLE_EXT: [&str; 2] = [
            ".vert",
            ".frag",
        ];

        let resource_names = POSSIBLE_EXT.iter()
            .map(|file_extension| format!("{}{}", name, file_extension))
            .collect::<Vec<String>>();

        let shaders = resource_names.iter()
            .map(|resource_name| {
                Shader::from_res(gl, res, resource_name)
            })
            .collect::<Result<Vec<Shader>, Error>>()?;

        Program::from_shaders(gl, &shaders[..])
            .map_err(|message| Error::LinkError { name: name.into(), message })
    }

    pub fn from_shaders(gl: &gl::Gl, shaders: &[Shader]) -> Result<Program, String> {
        let program_id = unsafe { gl.CreateProgram() };

        for shader in shaders {
            unsafe { gl.AttachShader(program_id, shader.id()); }
        }

        unsafe { gl.LinkProgram(program_id); }

        let mut success: gl::types::GLint = 1;
        unsafe {
            gl.GetProgramiv(program_id, gl::LINK_STATUS, &mut success);
        }

        if success == 0 {
            let mut len: gl::types::GLint = 0;
            unsafe {
                gl.GetProgramiv(program_id, gl::INFO_LOG_LENGTH, &mut len);
            }

            let mut log = String::new();
            if len > 0 {
                let mut buffer = info_log_buffer(len);
                unsafe {
                    gl.GetProgramInfoLog(
                        program_id,
                        len,
                        std::ptr::null_mut(),
                        buffer.as_mut_ptr() as *mut gl::types::GLchar
                    );
                }
                log = info_log_to_string(&buffer);
            }

            unsafe { gl.DeleteProgram(program_id); }
            return Err(link_failure_message(&log));
        }

        for shader in shaders {
            unsafe { gl.DetachShader(program_id, shader.id()); }
        }

        let uniforms = Program::get_uniforms(gl, program_id);
        debug!("Linked program {} with {} active uniforms", program_id, uniforms.len());

        Ok(Program { gl: gl.clone(), id: program_id, uniforms })
    }

    pub fn id(&self) -> gl::types::GLuint {
        self.id
    }

    pub fn set_used(&self) {
        unsafe {
            self.gl.UseProgram(self.id);
        }
    }

    pub fn set_unused(&self) {
        unsafe {
            self.gl.UseProgram(0);
        }
    }

    fn get_uniforms(gl: &gl::Gl, id: gl::types::GLuint) -> HashMap<String, Uniform> {
        const MAX_NAME_LEN: usize = 256;

        let mut uniforms = HashMap::new();

        let mut total: gl::types::GLint = 0;
        unsafe {
            gl.GetProgramiv(id, gl::ACTIVE_UNIFORMS, &mut total);
        }

        for u in 0..total {
            let mut name_len: gl::types::GLsizei = 0;
            let mut size: gl::types::GLint = 0;
            let mut typ: gl::types::GLenum = gl::ZERO;
            let mut name_buf: Vec<u8> = vec![0; MAX_NAME_LEN];

            unsafe {
                gl.GetActiveUniform(
                    id,
                    u as gl::types::GLuint,
                    MAX_NAME_LEN as gl::types::GLsizei,
                    &mut name_len,
                    &mut size,
                    &mut typ,
                    name_buf.as_mut_ptr() as *mut gl::types::GLchar,
                );
            }
            name_buf.truncate(name_len.max(0) as usize);

            let name = match CString::new(name_buf) {
                Ok(name) => name,
                Err(_) => continue,
            };
            let location = unsafe { gl.GetUniformLocation(id, name.as_ptr()) };

            uniforms.insert(
                name.to_string_lossy().into_owned(),
                Uniform { location, typ },
            );
        }

        uniforms
    }

    fn uniform(&self, name: &str, typ: gl::types::GLenum, expected: &'static str)
        -> Result<Uniform, Error>
    {
        lookup_uniform(&self.uniforms, name, typ, expected)
    }

    /// Uploads a 4x4 matrix. The program must be in use.
    pub fn set_uniform_mat4(&self, name: &str, value: &na::Matrix4<f32>) -> Result<(), Error> {
        let uniform = self.uniform(name, gl::FLOAT_MAT4, "mat4")?;
        unsafe {
            self.gl.UniformMatrix4fv(uniform.location, 1, gl::FALSE, value.as_ptr());
        }
        Ok(())
    }

    /// Uploads a 3x3 matrix. The program must be in use.
    pub fn set_uniform_mat3(&self, name: &str, value: &na::Matrix3<f32>) -> Result<(), Error> {
        let uniform = self.uniform(name, gl::FLOAT_MAT3, "mat3")?;
        unsafe {
            self.gl.UniformMatrix3fv(uniform.location, 1, gl::FALSE, value.as_ptr());
        }
        Ok(())
    }

    pub fn attrib_location(&self, name: &str) -> Result<gl::types::GLuint, Error> {
        let c_name = CString::new(name)
            .map_err(|_| Error::AttribNotFound { name: name.into() })?;

        let location = unsafe { self.gl.GetAttribLocation(self.id, c_name.as_ptr()) };
        if location < 0 {
            return Err(Error::AttribNotFound { name: name.into() });
        }
        Ok(location as gl::types::GLuint)
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe {
            self.gl.DeleteProgram(self.id);
        }
    }
}

pub struct Shader {
    gl: gl::Gl,
    id: gl::types::GLuint,
}

impl Shader {
    pub fn from_res(gl: &gl::Gl, res: &Resources, name: &str) -> Result<Shader, Error> {
        const POSSIBLE_EXT: [(&str, gl::types::GLenum); 2] = [
            (".vert", gl::VERTEX_SHADER),
            (".frag", gl::FRAGMENT_SHADER),
        ];

        let shader_kind = shader_kind_for(&POSSIBLE_EXT, name)
            .ok_or_else(|| Error::CanNotDetermineShaderTypeForResource { name: name.into() })?;

        let source = res.load_cstring(name)
            .map_err(|e| Error::ResourceLoad { name: name.into(), inner: e })?;

        Shader::from_source(gl, &source, shader_kind)
            .map_err(|message| Error::CompileError { name: name.into(), message })
    }

    pub fn from_source(
        gl: &gl::Gl,
        source: &CStr,
        kind: gl::types::GLenum
    ) -> Result<Shader, String> {
        let id = shader_from_source(gl, source, kind)?;
        Ok(Shader { gl: gl.clone(), id })
    }

    pub fn id(&self) -> gl::types::GLuint {
        self.id
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.DeleteShader(self.id);
        }
    }
}

fn lookup_uniform(
    uniforms: &HashMap<String, Uniform>,
    name: &str,
    typ: gl::types::GLenum,
    expected: &'static str,
) -> Result<Uniform, Error> {
    let uniform = uniforms.get(name)
        .cloned()
        .ok_or_else(|| Error::UniformNotFound { name: name.into() })?;

    if uniform.typ != typ {
        return Err(Error::UniformTypeMismatch { name: name.into(), expected });
    }
    Ok(uniform)
}

fn shader_kind_for(
    extensions: &[(&str, gl::types::GLenum)],
    name: &str,
) -> Option<gl::types::GLenum> {
    extensions.iter()
        .find(|&&(file_extension, _)| name.ends_with(file_extension))
        .map(|&(_, kind)| kind)
}

fn shader_from_source(
    gl: &gl::Gl,
    source: &CStr,
    kind: gl::types::GLenum
) -> Result<gl::types::GLuint, String> {
    let id = unsafe { gl.CreateShader(kind) };
    if id == 0 {
        return Err(format!("Failed to create shader of type {}", kind));
    }

    unsafe {
        gl.ShaderSource(id, 1, &source.as_ptr(), std::ptr::null());
        gl.CompileShader(id);
    }

    let mut success: gl::types::GLint = 1;
    unsafe {
        gl.GetShaderiv(id, gl::COMPILE_STATUS, &mut success);
    }

    if success == 0 {
        let mut len: gl::types::GLint = 0;
        unsafe {
            gl.GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len);
        }

        let mut log = String::new();
        if len > 0 {
            let mut buffer = info_log_buffer(len);
            unsafe {
                gl.GetShaderInfoLog(
                    id,
                    len,
                    std::ptr::null_mut(),
                    buffer.as_mut_ptr() as *mut gl::types::GLchar
                );
            }
            log = info_log_to_string(&buffer);
        }

        unsafe { gl.DeleteShader(id); }
        return Err(compile_failure_message(&source.to_string_lossy(), &log));
    }

    Ok(id)
}

/// Failure report for a shader that did not compile: the offending source followed by the driver log.
pub fn compile_failure_message(source: &str, log: &str) -> String {
    let mut message = String::from("Compilation failed!\n");
    message.push_str("--- source code ---\n");
    message.push_str(source);
    message.push('\n');
    push_log_section(&mut message, log);
    message
}

pub fn link_failure_message(log: &str) -> String {
    let mut message = String::from("Linking failed!\n");
    push_log_section(&mut message, log);
    message
}

fn push_log_section(message: &mut String, log: &str) {
    if log.is_empty() {
        message.push_str("--- empty log message ---\n");
    } else {
        message.push_str("--- error log ---\n");
        message.push_str(log);
        message.push('\n');
    }
    message.push_str("Exiting.\n");
}

// Drivers write a NUL-terminated log into the buffer; drop it and anything after.
fn info_log_to_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_owned()
}

// `len` as reported by INFO_LOG_LENGTH already counts the terminating NUL.
fn info_log_buffer(len: gl::types::GLint) -> Vec<u8> {
    vec![0; len.max(0) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_failure_includes_source_and_log() {
        let message = compile_failure_message("void main() { oops }", "0:1(15): error: syntax error");
        assert_eq!(
            message,
            "Compilation failed!\n\
             --- source code ---\n\
             void main() { oops }\n\
             --- error log ---\n\
             0:1(15): error: syntax error\n\
             Exiting.\n"
        );
    }

    #[test]
    fn compile_failure_with_empty_log() {
        let message = compile_failure_message("x", "");
        assert!(message.contains("--- empty log message ---"));
        assert!(!message.contains("--- error log ---"));
        assert!(message.ends_with("Exiting.\n"));
    }

    #[test]
    fn link_failure_has_no_source_section() {
        let message = link_failure_message("error: in_Position not written");
        assert!(message.starts_with("Linking failed!\n"));
        assert!(message.contains("--- error log ---\nerror: in_Position not written\n"));
        assert!(!message.contains("source code"));
    }

    #[test]
    fn shader_kind_follows_extension() {
        let exts = [(".vert", gl::VERTEX_SHADER), (".frag", gl::FRAGMENT_SHADER)];
        assert_eq!(shader_kind_for(&exts, "shaders/cube.vert"), Some(gl::VERTEX_SHADER));
        assert_eq!(shader_kind_for(&exts, "shaders/cube.frag"), Some(gl::FRAGMENT_SHADER));
        assert_eq!(shader_kind_for(&exts, "shaders/cube.geom"), None);
    }

    #[test]
    fn info_log_stops_at_nul() {
        assert_eq!(info_log_to_string(b"link error\n\0   "), "link error");
    }

    #[test]
    fn untouched_log_buffer_reads_as_empty() {
        let buffer = info_log_buffer(16);
        assert_eq!(buffer.len(), 16);
        assert_eq!(info_log_to_string(&buffer), "");
        assert!(info_log_buffer(-1).is_empty());
    }

    #[test]
    fn driver_written_log_buffer_is_decoded() {
        let mut buffer = info_log_buffer(12);
        buffer[..6].copy_from_slice(b"error\n");
        assert_eq!(info_log_to_string(&buffer), "error");
    }

    fn cube_uniforms() -> HashMap<String, Uniform> {
        let mut uniforms = HashMap::new();
        uniforms.insert("model_matrix".to_owned(), Uniform { location: 1, typ: gl::FLOAT_MAT4 });
        uniforms.insert("normal_matrix".to_owned(), Uniform { location: 3, typ: gl::FLOAT_MAT3 });
        uniforms
    }

    #[test]
    fn lookup_finds_uniform_of_matching_type() {
        let uniforms = cube_uniforms();
        let uniform = lookup_uniform(&uniforms, "normal_matrix", gl::FLOAT_MAT3, "mat3").unwrap();
        assert_eq!(uniform.location, 3);
    }

    #[test]
    fn lookup_reports_missing_uniform() {
        let uniforms = cube_uniforms();
        match lookup_uniform(&uniforms, "light_position", gl::FLOAT_MAT4, "mat4") {
            Err(Error::UniformNotFound { ref name }) => assert_eq!(name, "light_position"),
            other => panic!("expected UniformNotFound, got {:?}", other),
        }
    }

    #[test]
    fn lookup_rejects_mat3_uploaded_as_mat4() {
        let uniforms = cube_uniforms();
        let err = lookup_uniform(&uniforms, "normal_matrix", gl::FLOAT_MAT4, "mat4").unwrap_err();
        match err {
            Error::UniformTypeMismatch { ref name, expected } => {
                assert_eq!(name, "normal_matrix");
                assert_eq!(expected, "mat4");
            }
            ref other => panic!("expected UniformTypeMismatch, got {:?}", other),
        }
        assert_eq!(err.to_string(), "Uniform normal_matrix is not a mat4");
    }
}
