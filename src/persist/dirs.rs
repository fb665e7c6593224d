use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "GOLDSPLIT_DATA_DIR";

/// Resolve the directory holding templates, attempts and settings
pub fn default_base_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "goldsplit").map(|dirs| dirs.data_dir().to_path_buf())
}
