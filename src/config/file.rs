//! Optional YAML configuration file
//!
//! ```yaml
//! registryRoot: pkgplane
//! sources:
//!   - name: mesosphere
//!     path: https://github.com/mesosphere/universe.git
//!     type: git
//!     index: 0
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{self, Result};
use crate::source::PackageSource;

/// Contents of a `--config` file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    /// Key namespace in the registry
    pub registry_root: Option<String>,
    /// Package sources replacing the built-in list
    pub sources: Option<Vec<PackageSource>>,
}

impl ConfigFile {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let content =
            fs::read_to_string(path).map_err(|e| error::config::read_failed(&display, e.to_string()))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| error::config::parse_failed(&display, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self
            .registry_root
            .as_deref()
            .is_some_and(|root| root.trim_matches('/').is_empty())
        {
            return Err(error::config::invalid("registryRoot must not be empty"));
        }

        let Some(sources) = &self.sources else {
            return Ok(());
        };
        let mut names = HashSet::new();
        let mut locations = HashSet::new();
        for source in sources {
            if source.name().trim().is_empty() {
                return Err(error::config::invalid("source name must not be empty"));
            }
            if source.path().trim().is_empty() {
                return Err(error::config::invalid(format!(
                    "source '{}' has an empty path",
                    source.name()
                )));
            }
            if !names.insert(source.name()) {
                return Err(error::config::invalid(format!(
                    "duplicate source name '{}'",
                    source.name()
                )));
            }
            if !locations.insert((source.index(), source.path())) {
                return Err(error::config::invalid(format!(
                    "source '{}' duplicates index {} and path '{}' of another source",
                    source.name(),
                    source.index(),
                    source.path()
                )));
            }
        }
        Ok(())
    }
}
