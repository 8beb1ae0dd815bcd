use std::path::PathBuf;

/// Root directory for runtime data (sqlite database, uploaded files).
///
/// `TASKHIVE_DATA_DIR` overrides the platform data directory, which is what
/// the test suites use to point at a temp dir.
pub fn asset_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TASKHIVE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("taskhive")
}

/// Directory uploaded profile images are written to and served from.
pub fn upload_dir() -> PathBuf {
    asset_dir().join("uploads")
}
