//! Test helpers for laying out map command inputs on disk.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Temporary directory holding the command's input and output files.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 tempdir");
        Self { _dir: dir, root }
    }

    /// An extract with no blocks at all, which decodes to no elements.
    pub(super) fn empty_extract(&self) -> Utf8PathBuf {
        let path = self.root.join("empty.osm.pbf");
        fs::write(&path, b"").expect("write extract");
        path
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).expect("write file");
        path
    }

    pub(super) fn output(&self) -> Utf8PathBuf {
        self.root.join("out/public_space.geojson")
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }
}
