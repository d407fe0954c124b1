//! Loading YAML and JSON documents from disk

use crate::io::format::Format;
use crate::error::{HashPathError, Result};
use log::debug;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed document and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub format: Format,
    pub value: Value,
}

impl Document {
    /// A document not backed by a file
    pub fn new(value: Value, format: Format) -> Self {
        Self {
            path: None,
            format,
            value,
        }
    }

    /// Parse text in the given format
    pub fn parse(text: &str, format: Format) -> Result<Self> {
        Ok(Self::new(format.parse(text)?, format))
    }

    /// Replace the value, keeping path and format
    pub fn with_value(&self, value: Value) -> Self {
        Self {
            path: self.path.clone(),
            format: self.format,
            value,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Render the value in the document's own format
    pub fn render(&self, pretty: bool) -> Result<String> {
        self.format.render(&self.value, pretty)
    }
}

/// Read and parse a document, choosing the format by extension
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(HashPathError::file_not_found(path));
    }
    let format = Format::detect(path)?;
    let text = fs::read_to_string(path)?;
    debug!("read {} ({} bytes, {})", path.display(), text.len(), format);

    let value = format.parse(&text)?;
    Ok(Document {
        path: Some(path.to_path_buf()),
        format,
        value,
    })
}

/// Parse a document read from a stream, in an explicit format
pub fn read_from<R: std::io::Read>(mut reader: R, format: Format) -> Result<Document> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Document::parse(&text, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_yaml_and_json() {
        let dir = TempDir::new().unwrap();
        let yaml_path = dir.path().join("a.yaml");
        let json_path = dir.path().join("b.json");
        fs::write(&yaml_path, "user:\n  name: Bob\n").unwrap();
        fs::write(&json_path, r#"{"user": {"name": "Bob"}}"#).unwrap();

        let yaml = read_document(&yaml_path).unwrap();
        let json = read_document(&json_path).unwrap();
        assert_eq!(yaml.format, Format::Yaml);
        assert_eq!(json.format, Format::Json);
        assert_eq!(yaml.value, json.value);
        assert_eq!(yaml.path(), Some(yaml_path.as_path()));
    }

    #[test]
    fn test_read_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            read_document(&missing),
            Err(HashPathError::FileNotFound { .. })
        ));

        let text = dir.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        assert!(matches!(
            read_document(&text),
            Err(HashPathError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_read_from_stream() {
        let doc = read_from("[1, 2]".as_bytes(), Format::Yaml).unwrap();
        assert!(doc.path.is_none());
        assert_eq!(doc.value, serde_yaml::from_str::<Value>("[1, 2]").unwrap());
    }
}
