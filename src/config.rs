use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

use crate::error::Result;

/// Command-line settings; every field falls back to its default when the
/// YAML omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub package: PackageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            package: PackageConfig::default(),
        }
    }
}

/// Layout of a Data Package archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Archive entry holding the descriptor.
    pub descriptor_name: String,
    /// Archive directory the CSV files are stored under.
    pub data_dir: String,
    pub compression: Compression,
    /// Pretty-print the descriptor.
    pub pretty: bool,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            descriptor_name: "datapackage.json".into(),
            data_dir: "data".into(),
            compression: Compression::Deflated,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Stored,
    Deflated,
}

impl Compression {
    pub fn method(self) -> zip::CompressionMethod {
        match self {
            Compression::Stored => zip::CompressionMethod::Stored,
            Compression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read the config at `path`, or the defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_yaml_str(&fs::read_to_string(path)?)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml_str("package:\n  compression: stored\n").unwrap();
        assert_eq!(cfg.log_filter, "info");
        assert_eq!(cfg.package.compression, Compression::Stored);
        assert_eq!(cfg.package.descriptor_name, "datapackage.json");
        assert!(cfg.package.pretty);
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "log_filter: debug\npackage:\n  data_dir: csv\n  pretty: false")?;
        let cfg = Config::load(Some(tmp.path()))?;
        assert_eq!(cfg.log_filter, "debug");
        assert_eq!(cfg.package.data_dir, "csv");
        assert!(!cfg.package.pretty);
        assert_eq!(Config::load(None)?, Config::default());
        Ok(())
    }

    #[test]
    fn test_unknown_compression_is_rejected() {
        assert!(Config::from_yaml_str("package:\n  compression: zstd\n").is_err());
    }
}
