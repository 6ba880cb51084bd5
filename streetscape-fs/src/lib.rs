//! Capability-based filesystem helpers for the streetscape tools.
//!
//! Paths arrive as UTF-8 [`camino`] paths and are resolved against an
//! ambient directory handle from `cap-std`, so every read and write goes
//! through an explicit directory capability.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// Split `path` into the directory that holds it and its file name.
fn parent_and_name(path: &Utf8Path) -> io::Result<(&Utf8Path, &str)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    Ok((parent, name))
}

/// Open the directory holding `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or its directory cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let (parent, name) = parent_and_name(path)?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name.to_owned()))
}

/// Read a whole UTF-8 text file.
///
/// # Errors
/// Propagates open and read failures.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read_to_string(name.as_str())
}

/// Whether `path` exists and is a regular file.
///
/// # Errors
/// Fails when the containing directory cannot be opened; a missing file in
/// an existing directory is `Ok(false)`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Create every missing directory above `path`.
///
/// # Errors
/// Propagates failures to open the base directory or create children.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = base_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Create or truncate `path`, creating its parent directories first.
///
/// # Errors
/// Propagates directory and file creation failures.
pub fn create_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(name.as_str())
}

/// Split a directory path into an ambient base handle and the relative rest.
///
/// Absolute paths are anchored at the root (or the drive prefix on
/// Windows); relative paths at the current directory.
fn base_dir_and_relative(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let (base, rest) = match std_dir.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR.to_string());
            let rest = std_dir
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_dir.strip_prefix(prefix))
                .map_err(|_| io::Error::other(format!("cannot strip prefix from {dir}")))?
                .to_path_buf();
            (base, rest)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let rest = std_dir
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other(format!("cannot strip root from {dir}")))?
                .to_path_buf();
            (base, rest)
        }
        _ => (Utf8PathBuf::from("."), std_dir.to_path_buf()),
    };
    let handle = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let rest =
        Utf8PathBuf::from_path_buf(rest).map_err(|_| io::Error::other("non-UTF-8 directory path"))?;
    Ok((handle, rest))
}
