use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::model::DatasetName;

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// File name of each logical dataset at the configured source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetFiles {
    pub ptar: String,
    pub actri: String,
    pub ptci: String,
    pub amtri: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        DatasetFiles {
            ptar: "PTAR.csv".to_string(),
            actri: "ACTRI.csv".to_string(),
            ptci: "PTCI.csv".to_string(),
            amtri: "AMTRI.csv".to_string(),
        }
    }
}

impl DatasetFiles {
    pub fn get(&self, name: DatasetName) -> &str {
        match name {
            DatasetName::Ptar => &self.ptar,
            DatasetName::Actri => &self.actri,
            DatasetName::Ptci => &self.ptci,
            DatasetName::Amtri => &self.amtri,
        }
    }
}

/// Dashboard configuration, read from `sicoin.json` when present.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the dataset files are retrieved from.
    pub data_dir: PathBuf,
    pub files: DatasetFiles,
    /// Cache TTL: data is refetched after this many seconds.
    pub refresh_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("data"),
            files: DatasetFiles::default(),
            refresh_secs: 3600,
        }
    }
}

const CONFIG_FILE: &str = "sicoin.json";
const CONFIG_ENV: &str = "SICOIN_CONFIG";

impl AppConfig {
    /// Load configuration from `$SICOIN_CONFIG`, else `./sicoin.json`, else
    /// defaults. A present-but-malformed file is an error rather than a
    /// silent fallback.
    pub fn load() -> Result<AppConfig> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(CONFIG_FILE),
        };
        if !path.is_file() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_all_four_datasets() {
        let cfg = AppConfig::default();
        for name in DatasetName::ALL {
            assert!(cfg.files.get(name).ends_with(".csv"));
        }
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn partial_config_files_keep_defaults_for_the_rest() {
        let path = std::env::temp_dir().join(format!("sicoin-cfg-{}.json", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(br#"{ "data_dir": "/srv/sicoin", "files": { "ptar": "PTAR.parquet" } }"#)
            .unwrap();

        let cfg = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.data_dir, PathBuf::from("/srv/sicoin"));
        assert_eq!(cfg.files.ptar, "PTAR.parquet");
        assert_eq!(cfg.files.actri, "ACTRI.csv");
        assert_eq!(cfg.refresh_secs, 3600);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let path = std::env::temp_dir().join(format!("sicoin-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
