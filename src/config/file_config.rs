use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_path: Option<String>,
    /// "development" or "production"
    pub env: Option<String>,
    pub logging_level: Option<String>,
    pub parent_ipc: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_known_keys() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "database = \"/data/library.db\"\nport = 8080\nenv = \"development\"\n",
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();

        assert_eq!(config.database.as_deref(), Some("/data/library.db"));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.env.as_deref(), Some("development"));
        assert!(config.host.is_none());
    }

    #[test]
    fn load_rejects_bad_toml() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "port = \"not a number\"").unwrap();

        let err = FileConfig::load(file.path()).unwrap_err();

        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
