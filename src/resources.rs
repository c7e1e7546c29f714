use std::ffi;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "I/O error")]
    Io(#[cause] io::Error),
    #[fail(display = "Failed to read CString from file that contains 0")]
    FileContainsNil,
    #[fail(display = "Failed get executable path")]
    FailedToGetExePath,
}

impl From<io::Error> for Error {
    fn from(other: io::Error) -> Self {
        Error::Io(other)
    }
}

/// Read-only view of an asset directory. Resource names use `/` regardless of platform.
pub struct Resources {
    root_path: PathBuf,
}

impl Resources {
    pub fn from_relative_exe_path(rel_path: &Path) -> Result<Resources, Error> {
        let exe_file_name = ::std::env::current_exe()
            .map_err(|_| Error::FailedToGetExePath)?;

        let exe_path = exe_file_name.parent()
            .ok_or(Error::FailedToGetExePath)?;

        Ok(Resources {
            root_path: exe_path.join(rel_path),
        })
    }

    pub fn from_dir<P: Into<PathBuf>>(root_path: P) -> Resources {
        Resources { root_path: root_path.into() }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn load_cstring(&self, resource_name: &str) -> Result<ffi::CString, Error> {
        let mut file = fs::File::open(
            resource_name_to_path(&self.root_path, resource_name)
        )?;

        let mut buffer: Vec<u8> = Vec::with_capacity(
            file.metadata()?.len() as usize + 1
        );
        file.read_to_end(&mut buffer)?;

        if buffer.iter().any(|i| *i == 0) {
            return Err(Error::FileContainsNil);
        }

        Ok(unsafe { ffi::CString::from_vec_unchecked(buffer) })
    }
}

fn resource_name_to_path(root_dir: &Path, location: &str) -> PathBuf {
    let mut path: PathBuf = root_dir.into();

    for part in location.split('/') {
        path = path.join(part);
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile;

    #[test]
    fn resource_name_is_split_on_slashes() {
        let path = resource_name_to_path(Path::new("root"), "shaders/cube.vert");
        assert_eq!(path, Path::new("root").join("shaders").join("cube.vert"));
    }

    #[test]
    fn loads_file_as_cstring() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("shaders")).unwrap();
        let mut f = fs::File::create(dir.path().join("shaders").join("a.vert")).unwrap();
        f.write_all(b"#version 130\nvoid main() {}\n").unwrap();

        let res = Resources::from_dir(dir.path());
        let loaded = res.load_cstring("shaders/a.vert").unwrap();
        assert_eq!(loaded.to_str().unwrap(), "#version 130\nvoid main() {}\n");
    }

    #[test]
    fn rejects_file_with_interior_nul() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.frag"), b"void\0main").unwrap();

        let res = Resources::from_dir(dir.path());
        match res.load_cstring("bad.frag") {
            Err(Error::FileContainsNil) => {}
            other => panic!("expected FileContainsNil, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = Resources::from_dir(dir.path());
        match res.load_cstring("nope.vert") {
            Err(Error::Io(ref e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn exe_relative_root_is_next_to_executable() {
        let res = Resources::from_relative_exe_path(Path::new("assets")).unwrap();
        assert!(res.root_path().ends_with("assets"));
    }
}
