use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use ::config::ConfigError;

/// Looked up in the working directory with any extension `config` understands.
pub const DEFAULT_CONFIG_NAME: &str = "pixelwall";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackingStoreKind {
    Disk,
    Ram,
}

impl std::fmt::Display for BackingStoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackingStoreKind::Disk => f.write_str("disk"),
            BackingStoreKind::Ram => f.write_str("ram"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backing_store: BackingStoreKind,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

/// Layers built-in defaults, the configuration file and `PIXELWALL_*` environment variables
/// (`PIXELWALL_SERVER__PORT=8000`), later sources winning.
///
/// An explicit `path` must exist; the default `pixelwall.*` file is optional.
pub fn get_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => ::config::File::from(path).required(true),
        None => ::config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };
    let settings = ::config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 7753_i64)?
        .set_default("storage.backing_store", "disk")?
        .set_default("storage.data_dir", "data")?
        .add_source(file)
        .add_source(
            ::config::Environment::with_prefix("PIXELWALL")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_config(name: &str, content: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "pixelwall-{}-{}-{:x}.yaml",
            name,
            std::process::id(),
            nanos
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = get_config(None).unwrap();
        assert_eq!(config.server.port, 7753);
        assert_eq!(config.storage.backing_store, BackingStoreKind::Disk);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_config(
            "override",
            "server:\n  port: 9000\nstorage:\n  backing_store: ram\n",
        );
        let config = get_config(Some(&path)).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backing_store, BackingStoreKind::Ram);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_unknown_backing_store() {
        let path = write_config("unknown", "storage:\n  backing_store: mongo\n");
        assert!(get_config(Some(&path)).is_err());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_explicit_file() {
        let path = std::env::temp_dir().join("pixelwall-definitely-missing.yaml");
        assert!(get_config(Some(&path)).is_err());
    }
}
