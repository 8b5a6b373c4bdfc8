//! Offline feature source reading exported layer responses from disk.

use std::io::{self, BufReader};

use aadt_core::{
    FeatureCollections, FeatureQuery, FeatureSet, FeatureSource, FeatureSourceError, RawFeature,
    Source,
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::debug;

/// `FeatureSource` backed by two JSON files holding saved `query` responses.
///
/// Each file uses the ArcGIS `{"features": [...]}` envelope. The files are
/// re-read on every fetch and returned as-is: the query only selects the
/// reference point, so exports should already be limited to the area of
/// interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFeatureSource {
    points: Utf8PathBuf,
    lines: Utf8PathBuf,
}

impl FileFeatureSource {
    /// Read station points from `points` and road segments from `lines`.
    #[must_use]
    pub const fn new(points: Utf8PathBuf, lines: Utf8PathBuf) -> Self {
        Self { points, lines }
    }

    /// Path of the station export.
    #[must_use]
    pub fn points_path(&self) -> &Utf8Path {
        &self.points
    }

    /// Path of the road-segment export.
    #[must_use]
    pub fn lines_path(&self) -> &Utf8Path {
        &self.lines
    }
}

impl FeatureSource for FileFeatureSource {
    fn fetch_features(
        &self,
        _query: &FeatureQuery,
    ) -> Result<FeatureCollections, FeatureSourceError> {
        let points = load_layer(Source::Station, &self.points)?;
        let lines = load_layer(Source::VolumeMap, &self.lines)?;
        Ok(FeatureCollections::new(points, lines))
    }
}

fn load_layer(layer: Source, path: &Utf8Path) -> Result<Vec<RawFeature>, FeatureSourceError> {
    let file = open_utf8_file(path).map_err(|err| FeatureSourceError::Io {
        layer,
        path: path.to_string(),
        message: err.to_string(),
    })?;
    let set: FeatureSet = serde_json::from_reader(BufReader::new(file)).map_err(|err| {
        FeatureSourceError::Parse {
            layer,
            message: format!("{path}: {err}"),
        }
    })?;
    debug!("loaded {} {layer} features from {path}", set.features.len());
    Ok(set.features)
}

/// Open a UTF-8 file path using ambient authority.
fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return whether a path exists and is a regular file.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name).map(|meta| meta.is_file())
}
