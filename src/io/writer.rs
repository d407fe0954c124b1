//! Writing documents back with atomic replacement, backups and previews

use crate::error::{HashPathError, Result};
use crate::io::reader::Document;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Per-write options
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Compute the result and diff without touching the file
    pub dry_run: bool,
    /// Copy the original to `<file><suffix>` before replacing it
    pub backup_suffix: Option<String>,
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Outcome of a write
#[derive(Debug)]
pub struct WriteResult {
    /// Whether the rendered content differs from what was on disk
    pub modified: bool,
    pub output_path: PathBuf,
    pub backup_path: Option<PathBuf>,
    /// Line diff between the old and new content, when they differ
    pub diff: Option<String>,
}

/// Render `document` and write it to its own path
pub fn write_document(document: &Document, options: &WriteOptions) -> Result<WriteResult> {
    let path = document
        .path()
        .ok_or_else(|| HashPathError::validation("document has no file path to write to"))?;
    write_document_to(document, path, options)
}

/// Render `document` and write it to `path`
pub fn write_document_to(
    document: &Document,
    path: &Path,
    options: &WriteOptions,
) -> Result<WriteResult> {
    let new_content = document.render(options.pretty)?;
    let original = if path.exists() {
        Some(fs::read_to_string(path)?)
    } else {
        None
    };

    let modified = original.as_deref() != Some(new_content.as_str());
    let diff = generate_diff(original.as_deref().unwrap_or(""), &new_content, path);
    let mut result = WriteResult {
        modified,
        output_path: path.to_path_buf(),
        backup_path: None,
        diff,
    };

    if options.dry_run || !modified {
        debug!(
            "{}: {}",
            path.display(),
            if modified { "dry run, not written" } else { "unchanged" }
        );
        return Ok(result);
    }

    if let (Some(suffix), true) = (&options.backup_suffix, original.is_some()) {
        result.backup_path = Some(create_backup(path, suffix)?);
    }
    write_atomic(path, &new_content)?;
    info!("wrote {}", path.display());
    Ok(result)
}

/// Replace `path` with `content` through a temporary file in the same directory
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    temp_file.persist(path).map_err(|e| HashPathError::Io(e.error))?;
    Ok(())
}

fn create_backup(path: &Path, suffix: &str) -> Result<PathBuf> {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    let backup_path = PathBuf::from(name);
    fs::copy(path, &backup_path)?;
    debug!("backed up {} to {}", path.display(), backup_path.display());
    Ok(backup_path)
}

/// Minimal unified-style diff: the changed middle between common head and tail
fn generate_diff(old: &str, new: &str, path: &Path) -> Option<String> {
    if old == new {
        return None;
    }
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let prefix = old_lines
        .iter()
        .zip(&new_lines)
        .take_while(|(a, b)| a == b)
        .count();
    let old_rest = &old_lines[prefix..];
    let new_rest = &new_lines[prefix..];
    let suffix = old_rest
        .iter()
        .rev()
        .zip(new_rest.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let old_middle = &old_rest[..old_rest.len() - suffix];
    let new_middle = &new_rest[..new_rest.len() - suffix];

    let mut lines = vec![
        format!("--- {}", path.display()),
        format!("+++ {}", path.display()),
        format!(
            "@@ -{},{} +{},{} @@",
            prefix + 1,
            old_middle.len(),
            prefix + 1,
            new_middle.len()
        ),
    ];
    lines.extend(old_middle.iter().map(|line| format!("-{}", line)));
    lines.extend(new_middle.iter().map(|line| format!("+{}", line)));
    Some(lines.join("\n"))
}
