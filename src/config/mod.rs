//! Runtime configuration
//!
//! [`Settings`] is built once at startup from command line flags (or their
//! `PKGPLANE_*` environment variables) and an optional YAML file, then
//! passed by reference to whatever needs it. Nothing here changes after
//! startup.

pub mod file;
pub mod logging;

use std::path::PathBuf;
use std::time::Duration;

pub use file::ConfigFile;
pub use logging::{LogFormat, LoggingConfig};

use crate::cache;
use crate::cli::GlobalArgs;
use crate::error::Result;
use crate::registry::consul::DEFAULT_ROOT;
use crate::source::{PackageSource, default_sources};

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingConfig,
    /// Consul agent address
    pub consul: String,
    /// Key namespace in the registry
    pub registry_root: String,
    pub cache_dir: PathBuf,
    /// Timeout for each registry and scheduler request
    pub request_timeout: Duration,
    /// Package sources in precedence order
    pub sources: Vec<PackageSource>,
}

impl Settings {
    /// Build settings from the global flags, reading `--config` if given
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let cache_dir = match &args.cache_dir {
            Some(dir) => dir.clone(),
            None => cache::default_cache_dir()?,
        };

        Ok(Self {
            logging: LoggingConfig::new(&args.log_level, &args.log_format),
            consul: args.consul.clone(),
            registry_root: file
                .registry_root
                .unwrap_or_else(|| DEFAULT_ROOT.to_string()),
            cache_dir,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            sources: file.sources.unwrap_or_else(default_sources),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn global(args: &[&str]) -> GlobalArgs {
        let mut argv = vec!["pkgplane"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load(&global(&["--cache-dir", "/tmp/pkgplane-cache"])).unwrap();
        assert_eq!(settings.consul, "http://localhost:8500");
        assert_eq!(settings.registry_root, DEFAULT_ROOT);
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/pkgplane-cache"));
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.sources, default_sources());
        assert_eq!(settings.logging, LoggingConfig::default());
    }

    #[test]
    fn test_config_file_overrides_sources_and_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pkgplane.yaml");
        std::fs::write(
            &path,
            "registryRoot: mantl\nsources:\n  - {name: local, path: /srv/universe, index: 3}\n",
        )
        .unwrap();

        let settings = Settings::load(&global(&[
            "--config",
            path.to_str().unwrap(),
            "--cache-dir",
            "/tmp/c",
            "--consul",
            "http://consul:8500",
            "--log-format",
            "json",
        ]))
        .unwrap();

        assert_eq!(settings.registry_root, "mantl");
        assert_eq!(settings.consul, "http://consul:8500");
        assert_eq!(settings.sources, vec![PackageSource::git("local", "/srv/universe", 3)]);
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let result = Settings::load(&global(&["--config", "/nonexistent/pkgplane.yaml"]));
        assert!(result.is_err());
    }
}
