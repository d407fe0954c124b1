//! Document formats the CLI reads and writes

use crate::core::convert::{from_json, to_json};
use crate::error::{HashPathError, Result};
use serde_yaml::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl Format {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Like [`Format::from_path`], but an unknown extension is an error
    pub fn detect(path: &Path) -> Result<Self> {
        Self::from_path(path).ok_or_else(|| HashPathError::unsupported_format(path))
    }

    pub fn parse(&self, text: &str) -> Result<Value> {
        match self {
            Self::Yaml if text.trim().is_empty() => Ok(Value::Null),
            Self::Yaml => Ok(serde_yaml::from_str(text)?),
            Self::Json => {
                let json: serde_json::Value = serde_json::from_str(text)?;
                Ok(from_json(&json))
            }
        }
    }

    /// Render a value; `pretty` only affects JSON
    pub fn render(&self, value: &Value, pretty: bool) -> Result<String> {
        match self {
            Self::Yaml => Ok(serde_yaml::to_string(value)?),
            Self::Json => {
                let json = to_json(value)?;
                let mut out = if pretty {
                    serde_json::to_string_pretty(&json)?
                } else {
                    serde_json::to_string(&json)?
                };
                out.push('\n');
                Ok(out)
            }
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format `{}` (expected yaml or json)", other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection() {
        assert_eq!(Format::from_path(Path::new("a/b.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("b.YAML")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("b.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("b.md")), None);
        assert!(Format::detect(Path::new("noext")).is_err());
    }

    #[test]
    fn test_parse_and_render() {
        let value = Format::Json.parse(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(Format::Yaml.render(&value, false).unwrap(), "a:\n- 1\n- 2\n");
        assert_eq!(Format::Json.render(&value, false).unwrap(), "{\"a\":[1,2]}\n");
        assert_eq!(Format::Yaml.parse("  \n").unwrap(), Value::Null);
        assert!(Format::Json.parse("{").is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert!("toml".parse::<Format>().is_err());
    }
}
