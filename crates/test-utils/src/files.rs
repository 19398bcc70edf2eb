//! Temporary files for tests that read and write GeoJSON.

use std::io::Write;

use tempfile::{NamedTempFile, TempDir};

/// Writes `contents` to a temporary `.geojson` file.
///
/// The file is removed when the handle is dropped.
pub fn temp_geojson(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".geojson")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp file");
    file
}

/// A scratch directory removed on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_geojson_roundtrip() {
        let file = temp_geojson("{\"type\":\"FeatureCollection\",\"features\":[]}");
        let read = std::fs::read_to_string(file.path()).unwrap();
        assert!(read.contains("FeatureCollection"));
        assert!(file.path().extension().is_some_and(|e| e == "geojson"));
    }
}
