use glob::glob;
use serde_json::{json, Value};
use std::{
    collections::HashSet,
    fs::File,
    io::{self, Seek, Write},
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};
use zip::{write::SimpleFileOptions, ZipWriter};

use crate::config::PackageConfig;
use crate::error::{Error, Result};
use crate::schema::{infer_schema, TableSchema};
use crate::tdf::{convert_dataset_attributes, Attributes};

/// One CSV file of a Data Package, with its inferred schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    pub path: PathBuf,
    pub schema: TableSchema,
}

impl Resource {
    /// Infer the schema of the CSV at `path`; the resource is named after the
    /// file stem.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let schema = infer_schema(&path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name: resource_name(&stem),
            path,
            schema,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.csv", self.name))
    }

    fn descriptor(&self, data_dir: &str) -> Result<Value> {
        Ok(json!({
            "name": self.name,
            "path": format!("{}/{}", data_dir, self.file_name()),
            "format": "csv",
            "mediatype": "text/csv",
            "schema": serde_json::to_value(&self.schema)?,
        }))
    }
}

/// Lowercase, with anything outside `[a-z0-9._-]` replaced by `-`.
fn resource_name(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Expand glob patterns into paths; arguments without glob characters are
/// taken literally.
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        let before = paths.len();
        paths.extend(glob(pattern)?.filter_map(|entry| entry.ok()));
        if paths.len() == before {
            warn!(pattern, "pattern matched no files");
        }
    }
    Ok(paths)
}

/// Resource names and archive entries must be unique across the package.
fn check_unique(resources: &[Resource], config: &PackageConfig) -> Result<()> {
    let mut names = HashSet::new();
    let mut entries = HashSet::new();
    for resource in resources {
        if !names.insert(resource.name.as_str()) {
            return Err(Error::DuplicateEntry(format!("resource {}", resource.name)));
        }
        let entry = format!("{}/{}", config.data_dir, resource.file_name());
        if !entries.insert(entry.clone()) {
            return Err(Error::DuplicateEntry(entry));
        }
    }
    Ok(())
}

/// A Data Package descriptor: the dataset's TDF attributes plus one entry per
/// resource under `resources`.
pub fn build_descriptor(
    dataset: &Attributes,
    resources: &[Resource],
    config: &PackageConfig,
) -> Result<Attributes> {
    check_unique(resources, config)?;
    let mut descriptor = convert_dataset_attributes(dataset)?;
    let entries = resources
        .iter()
        .map(|r| r.descriptor(&config.data_dir))
        .collect::<Result<Vec<_>>>()?;
    descriptor.insert("resources".into(), Value::Array(entries));
    Ok(descriptor)
}

/// Write `descriptor` and every resource's CSV into a zip archive and hand the
/// writer back.
#[instrument(level = "info", skip_all, fields(resources = resources.len()))]
pub fn write_zip<W: Write + Seek>(
    writer: W,
    descriptor: &Attributes,
    resources: &[Resource],
    config: &PackageConfig,
) -> Result<W> {
    check_unique(resources, config)?;
    let options = SimpleFileOptions::default().compression_method(config.compression.method());
    let mut zip = ZipWriter::new(writer);

    let body = if config.pretty {
        serde_json::to_vec_pretty(descriptor)?
    } else {
        serde_json::to_vec(descriptor)?
    };
    zip.start_file(config.descriptor_name.as_str(), options)?;
    zip.write_all(&body)?;

    for resource in resources {
        let entry = format!("{}/{}", config.data_dir, resource.file_name());
        zip.start_file(entry.as_str(), options)?;
        let mut csv = File::open(&resource.path)?;
        let bytes = io::copy(&mut csv, &mut zip)?;
        info!(entry = %entry, bytes, "added resource");
    }

    Ok(zip.finish()?)
}
