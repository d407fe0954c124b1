//! Resolving command-line inputs to document files
//!
//! Files named explicitly are taken as-is; directories are walked and only
//! files with a known document extension are kept.

use crate::error::{HashPathError, Result};
use crate::io::format::Format;
use log::{debug, trace};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for file resolution
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Follow symbolic links
    pub follow_links: bool,
    /// Maximum recursion depth for directory traversal
    pub max_depth: Option<usize>,
    /// Include hidden files (starting with .)
    pub include_hidden: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: None,
            include_hidden: false,
        }
    }
}

/// Turns paths given on the command line into document files
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    config: ResolverConfig,
}

impl FileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve files and directories, deduplicated and sorted
    pub fn resolve_paths<P>(&self, paths: &[P]) -> Result<Vec<PathBuf>>
    where
        P: AsRef<Path>,
    {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for path in paths {
            for file in self.resolve_single_path(path.as_ref())? {
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        }

        files.sort();
        debug!("resolved {} document files", files.len());
        Ok(files)
    }

    fn resolve_single_path(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if path.is_file() {
            Ok(vec![path.to_path_buf()])
        } else if path.is_dir() {
            self.traverse_directory(path)
        } else {
            Err(HashPathError::file_not_found(path))
        }
    }

    fn traverse_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(dir)
            .follow_links(self.config.follow_links)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX));

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.config.include_hidden && is_hidden(path) {
                trace!("skipping hidden {}", path.display());
                continue;
            }
            if Format::from_path(path).is_none() {
                continue;
            }
            files.push(path.to_path_buf());
        }
        Ok(files)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
