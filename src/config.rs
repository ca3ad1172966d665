use crate::core::{Result, TrafficError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ingest: Option<IngestConfig>,
}

/// Location of the SQLite store.
#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// CSV exports of the spreadsheet sheets, one per table.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub uk: PathBuf,
    pub london_cars: PathBuf,
    pub london_all: PathBuf,
}

impl Config {
    /// Resolves relative paths against `base`, normally the config file's directory.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() && p.as_os_str() != crate::core::db::MEMORY_LOCATOR {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.database.path);
        if let Some(ingest) = self.ingest.as_mut() {
            resolve(&mut ingest.uk);
            resolve(&mut ingest.london_cars);
            resolve(&mut ingest.london_all);
        }
        self
    }
}

/// Default configuration location: `<config dir>/trafficdb/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trafficdb").join("config.toml"))
}

/// Loads configuration from a TOML file at the given path.
///
/// Relative paths inside the file are taken relative to the file itself.
///
/// # Example
///
/// ```no_run
/// let config = trafficdb::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config.database.path);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| TrafficError::Config(format!("{}: {}", path.display(), e)))?;
    let config = parse_config(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.resolve_relative_to(base))
}

/// Parses configuration from TOML text without touching relative paths.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| TrafficError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[database]
path = "traffic.db"

[ingest]
uk = "data/uk.csv"
london_cars = "data/london_cars.csv"
london_all = "/srv/data/london_all.csv"
"#;

    #[test]
    fn test_parse_config() {
        let config = parse_config(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.database.path, PathBuf::from("traffic.db"));
        let ingest = config.ingest.expect("Ingest configuration not found");
        assert_eq!(ingest.uk, PathBuf::from("data/uk.csv"));
        assert_eq!(ingest.london_cars, PathBuf::from("data/london_cars.csv"));
    }

    #[test]
    fn test_ingest_section_is_optional() {
        let config = parse_config("[database]\npath = \":memory:\"\n").unwrap();
        assert!(config.ingest.is_none());
    }

    #[test]
    fn test_missing_database_section() {
        assert!(matches!(parse_config("[ingest]\n"), Err(TrafficError::Config(_))));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let config = parse_config(SAMPLE_CONFIG)
            .unwrap()
            .resolve_relative_to(Path::new("/etc/trafficdb"));
        assert_eq!(config.database.path, PathBuf::from("/etc/trafficdb/traffic.db"));
        let ingest = config.ingest.unwrap();
        assert_eq!(ingest.uk, PathBuf::from("/etc/trafficdb/data/uk.csv"));
        assert_eq!(ingest.london_all, PathBuf::from("/srv/data/london_all.csv"));
    }

    #[test]
    fn test_memory_locator_is_not_resolved() {
        let config = parse_config("[database]\npath = \":memory:\"\n")
            .unwrap()
            .resolve_relative_to(Path::new("/etc/trafficdb"));
        assert_eq!(config.database.path, PathBuf::from(":memory:"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.database.path, dir.path().join("traffic.db"));
        assert!(matches!(
            load_config(dir.path().join("missing.toml")),
            Err(TrafficError::Config(_))
        ));
    }
}
