//! Command implementations.

pub mod build;
pub mod check;
pub mod init;

use std::path::{Path, PathBuf};

/// Directory that relative paths in the configuration resolve against:
/// the directory holding the configuration file.
pub fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root() {
        assert_eq!(project_root(Path::new("folio.toml")), PathBuf::from("."));
        assert_eq!(
            project_root(Path::new("site/folio.toml")),
            PathBuf::from("site")
        );
    }
}
