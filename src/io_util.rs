use std::{path::Path, fs::read_to_string, io::ErrorKind};

use anyhow::{Result, anyhow, Context};

/// Read a file; a missing file (or a directory standing in its place)
/// is `Ok(None)`. Other I/O errors stay errors.
pub fn read_to_string_if_exists<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(None)
    }
    match read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            _ => Err(e).with_context(
                || anyhow!("opening path for reading: {:?}", path))
        }
    }
}
