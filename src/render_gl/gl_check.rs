use gl;

#[derive(Debug, Fail)]
#[fail(display = "{}@{}: OpenGL error: {:#x} {}", file, line, code, description)]
pub struct GlError {
    pub file: &'static str,
    pub line: u32,
    pub code: gl::types::GLenum,
    pub description: &'static str,
}

/// Checks `glGetError` and reports the first pending error with its source location.
#[macro_export]
macro_rules! assert_gl {
    ($gl:expr) => {
        $crate::render_gl::check_gl_error(&$gl, file!(), line!())
    };
}

pub fn check_gl_error(gl: &gl::Gl, file: &'static str, line: u32) -> Result<(), GlError> {
    let code = unsafe { gl.GetError() };
    if code == gl::NO_ERROR {
        return Ok(());
    }

    Err(GlError {
        file,
        line,
        code,
        description: error_description(code),
    })
}

pub fn error_description(code: gl::types::GLenum) -> &'static str {
    match code {
        gl::NO_ERROR => "no error",
        gl::INVALID_ENUM => "invalid enumerant",
        gl::INVALID_VALUE => "invalid value",
        gl::INVALID_OPERATION => "invalid operation",
        gl::INVALID_FRAMEBUFFER_OPERATION => "invalid framebuffer operation",
        gl::OUT_OF_MEMORY => "out of memory",
        gl::STACK_OVERFLOW => "stack overflow",
        gl::STACK_UNDERFLOW => "stack underflow",
        _ => "unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_core_error_codes() {
        assert_eq!(error_description(gl::INVALID_ENUM), "invalid enumerant");
        assert_eq!(error_description(gl::INVALID_OPERATION), "invalid operation");
        assert_eq!(error_description(gl::OUT_OF_MEMORY), "out of memory");
        assert_eq!(error_description(0xdead), "unknown error");
    }

    #[test]
    fn error_display_has_location_and_hex_code() {
        let err = GlError {
            file: "src/game.rs",
            line: 42,
            code: gl::INVALID_VALUE,
            description: error_description(gl::INVALID_VALUE),
        };
        assert_eq!(
            err.to_string(),
            "src/game.rs@42: OpenGL error: 0x501 invalid value"
        );
    }
}
