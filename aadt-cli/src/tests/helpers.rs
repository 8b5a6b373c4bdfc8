//! Test helpers for writing layer exports into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A station export holding one count station just north-east of 35.0, -80.0.
pub(super) const STATION_EXPORT: &str = r#"{
    "features": [
        {"attributes": {"AADT": 12000, "AADT_YEAR": 2022}, "geometry": {"x": -80.001, "y": 35.001}}
    ]
}"#;

/// A road-segment export holding one busier but more distant segment.
pub(super) const SEGMENT_EXPORT: &str = r#"{
    "features": [
        {"attributes": {"AADT_2023": 18000}, "geometry": {"paths": [[[-80.01, 35.01], [-80.02, 35.02]]]}}
    ]
}"#;

/// An export with no features.
pub(super) const EMPTY_EXPORT: &str = r#"{"features": []}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
}

/// Temporary directory addressed through UTF-8 paths.
#[derive(Debug)]
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
            .unwrap_or_else(|path| panic!("non UTF-8 workspace {path:?}"));
        Self { _tmp: tmp, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}
