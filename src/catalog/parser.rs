//! Catalog tree parsing
//!
//! A catalog checkout uses the universe layout:
//!
//! ```text
//! [repo/]packages/<Letter>/<package>/<revision>/
//!     package.json              (required)
//!     config.json               (optional)
//!     marathon.json.mustache    (or marathon.json, required)
//! ```
//!
//! Revisions are read in numeric order. When two revisions of a catalog
//! declare the same `(name, version)`, the higher revision wins.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::schema::ConfigSchema;
use super::template::JobTemplate;
use super::version::compare_versions;
use super::{PackageDefinition, PackageMetadata};
use crate::error::{self, Result};
use crate::source::PackageSource;

const PACKAGES_DIR: &str = "packages";
const PACKAGE_FILE: &str = "package.json";
const CONFIG_FILE: &str = "config.json";
const TEMPLATE_FILES: [&str; 2] = ["marathon.json.mustache", "marathon.json"];

/// Definitions found in one catalog
#[derive(Debug, Default)]
pub struct ParsedCatalog {
    pub definitions: Vec<PackageDefinition>,
    /// Package directories that could not be turned into a definition
    pub skipped: usize,
    /// Definitions replaced by a higher revision declaring the same version
    pub superseded: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageFile {
    name: Option<String>,
    version: Option<String>,
    #[serde(flatten)]
    metadata: PackageMetadata,
}

/// Locate the `packages` directory of a catalog checkout
fn packages_dir(root: &Path) -> Option<PathBuf> {
    [root.join(PACKAGES_DIR), root.join("repo").join(PACKAGES_DIR)]
        .into_iter()
        .find(|p| p.is_dir())
}

/// Parse every package revision under `root` for `source`
pub fn parse_catalog(root: &Path, source: &PackageSource) -> Result<ParsedCatalog> {
    let packages = packages_dir(root).ok_or_else(|| {
        error::source::catalog_parse_failed(root.display().to_string(), "no 'packages' directory")
    })?;

    let mut revisions: Vec<PathBuf> = WalkDir::new(&packages)
        .min_depth(3)
        .max_depth(3)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect();
    revisions.sort_by(|a, b| revision_order(a, b));

    let mut parsed = ParsedCatalog::default();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for path in revisions {
        match parse_revision(&path, source) {
            Ok(definition) => {
                let key = (definition.name.clone(), definition.version.clone());
                match positions.get(&key) {
                    Some(&at) => {
                        debug!(
                            source = %source.name(),
                            name = %key.0,
                            version = %key.1,
                            path = %path.display(),
                            "Superseding an earlier revision"
                        );
                        parsed.definitions[at] = definition;
                        parsed.superseded += 1;
                    }
                    None => {
                        positions.insert(key, parsed.definitions.len());
                        parsed.definitions.push(definition);
                    }
                }
            }
            Err(reason) => {
                warn!(
                    source = %source.name(),
                    path = %path.display(),
                    %reason,
                    "Skipping package"
                );
                parsed.skipped += 1;
            }
        }
    }

    debug!(
        source = %source.name(),
        definitions = parsed.definitions.len(),
        skipped = parsed.skipped,
        superseded = parsed.superseded,
        "Parsed catalog"
    );
    Ok(parsed)
}

/// Package directory first, then revision number (`2` before `10`)
fn revision_order(a: &Path, b: &Path) -> Ordering {
    a.parent().cmp(&b.parent()).then_with(|| {
        let name = |p: &Path| p.file_name().map(|n| n.to_string_lossy().into_owned());
        compare_versions(&name(a).unwrap_or_default(), &name(b).unwrap_or_default())
    })
}

fn parse_revision(dir: &Path, source: &PackageSource) -> std::result::Result<PackageDefinition, String> {
    let package_path = dir.join(PACKAGE_FILE);
    let content = fs::read_to_string(&package_path)
        .map_err(|e| format!("cannot read {PACKAGE_FILE}: {e}"))?;
    let package: PackageFile = serde_json::from_str(&content)
        .map_err(|e| format!("invalid {PACKAGE_FILE}: {e}"))?;

    let name = match package.name {
        Some(name) if !name.is_empty() => name,
        _ => dir
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_lowercase())
            .ok_or_else(|| "package has no name".to_string())?,
    };
    let version = package
        .version
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("{PACKAGE_FILE} has no version"))?;

    let template_path = TEMPLATE_FILES
        .iter()
        .map(|f| dir.join(f))
        .find(|p| p.is_file())
        .ok_or_else(|| "no job template".to_string())?;
    let template = fs::read_to_string(&template_path)
        .map_err(|e| format!("cannot read {}: {e}", template_path.display()))?;

    let config_path = dir.join(CONFIG_FILE);
    let config_schema = if config_path.is_file() {
        let content = fs::read_to_string(&config_path)
            .map_err(|e| format!("cannot read {CONFIG_FILE}: {e}"))?;
        let schema: Value = serde_json::from_str(&content)
            .map_err(|e| format!("invalid {CONFIG_FILE}: {e}"))?;
        ConfigSchema::from_json_schema(&schema)
    } else {
        ConfigSchema::default()
    };

    Ok(PackageDefinition {
        name,
        version,
        source_index: source.index(),
        source_name: source.name().to_string(),
        metadata: package.metadata,
        config_schema,
        job_template: JobTemplate::new(template),
    })
}
