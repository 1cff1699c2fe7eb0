//! File discovery for arrange
//!
//! Walks the given roots and keeps files matching the configured
//! include/exclude globs. Globs are matched against paths relative to the
//! root being walked. Explicitly named files are always kept.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{FileMatcher, FilesConfiguration};
use crate::error::ArrangeError;
use crate::result::Result;

/// Discovers source files below a set of roots
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    matcher: FileMatcher,
}

impl FileDiscovery {
    pub fn new(files: &FilesConfiguration) -> Result<Self> {
        Ok(Self {
            matcher: files.matcher()?,
        })
    }

    /// Discover files under each root, sorted and deduplicated
    pub fn discover(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for root in roots {
            if root.is_file() {
                files.push(root.clone());
                continue;
            }
            if !root.is_dir() {
                return Err(ArrangeError::io_error(
                    root,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "path does not exist"),
                ));
            }

            info!("Discovering files in {}", root.display());
            for entry in WalkDir::new(root).follow_links(false) {
                let entry = entry.map_err(|e| {
                    let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    ArrangeError::io_error(path, std::io::Error::other(e.to_string()))
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                if self.matcher.is_match(relative) {
                    files.push(entry.path().to_path_buf());
                } else {
                    debug!("Skipping {}", entry.path().display());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class A { }\n").unwrap();
    }

    #[test]
    fn test_discover_with_default_patterns() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Program.cs");
        touch(temp_dir.path(), "Models/User.cs");
        touch(temp_dir.path(), "obj/Debug/Gen.cs");
        touch(temp_dir.path(), "Views/Index.g.cs");
        touch(temp_dir.path(), "notes.txt");

        let discovery = FileDiscovery::new(&FilesConfiguration::default()).unwrap();
        let files = discovery.discover(&[temp_dir.path().to_path_buf()]).unwrap();

        let relative: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(temp_dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(relative, vec!["Models/User.cs", "Program.cs"]);
    }

    #[test]
    fn test_explicit_file_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "obj/Keep.cs");
        let explicit = temp_dir.path().join("obj/Keep.cs");

        let discovery = FileDiscovery::new(&FilesConfiguration::default()).unwrap();
        let files = discovery
            .discover(&[explicit.clone(), explicit.clone()])
            .unwrap();
        assert_eq!(files, vec![explicit]);
    }

    #[test]
    fn test_missing_root() {
        let discovery = FileDiscovery::new(&FilesConfiguration::default()).unwrap();
        let result = discovery.discover(&[PathBuf::from("no/such/dir")]);
        assert!(matches!(result, Err(ArrangeError::IoError { .. })));
    }
}
