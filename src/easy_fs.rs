use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use anyhow::{Result, Context, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Dir,
    File,
    Other
}

pub fn easy_filenames_in_dir<P>(
    path: P
) -> Result<impl Iterator<Item = Result<(OsString, FileKind)>>>
where PathBuf: From<P>
{
    let pathbuf: PathBuf = path.into();
    Ok(fs::read_dir(&pathbuf).with_context(
        || anyhow!("can't open directory for reading: {:?}",
                   pathbuf.to_string_lossy()))?
       .map(
           move |entry_result: Result<fs::DirEntry, std::io::Error>|
                                      -> Result<(OsString, FileKind)>
           {
               let entry = entry_result.with_context(
                   || anyhow!("reading directory: {:?}", pathbuf.to_string_lossy()))?;
               let ft = entry.file_type().with_context(
                   || anyhow!("getting file type in: {:?}", pathbuf.to_string_lossy()))?;
               let filename = entry.file_name();
               Ok(
                   (
                       filename,
                       if ft.is_dir() {
                           FileKind::Dir
                       } else if ft.is_file() {
                           FileKind::File
                       } else {
                           FileKind::Other
                       }
                   ))
           }))
}

/// Paths of the plain files in `dir` with the given extension,
/// sorted by file name.
pub fn sorted_files_with_extension<P>(dir: P, extension: &str) -> Result<Vec<PathBuf>>
where PathBuf: From<P>,
      P: Clone
{
    let base: PathBuf = dir.clone().into();
    let mut paths = Vec::new();
    for item in easy_filenames_in_dir(dir)? {
        let (name, kind) = item?;
        if kind != FileKind::File {
            continue
        }
        let path = base.join(&name);
        if path.extension().map_or(false, |e| e == extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
