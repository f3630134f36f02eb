use std::path::PathBuf;

/// Root cache directory for clipqa artifacts.
pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("clipqa")
}

/// Default directory for extracted clips when none is given on the CLI.
pub fn default_clips_dir() -> PathBuf {
    get_root_cache_dir().join("clips")
}
