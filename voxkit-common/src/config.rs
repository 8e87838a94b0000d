//! Configuration loading and data-root resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Optional settings read from `voxkit.toml`
///
/// All fields are optional; absent fields fall back to resolution defaults
/// (`resolve_data_root`) or to `params` constants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder for registry and pipeline output
    pub data_root: Option<PathBuf>,
    /// Fallback reference sample used by registry repair
    pub fallback_sample: Option<PathBuf>,
    /// Working sample rate all decoded audio is resampled to
    pub target_sample_rate: Option<u32>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Data root resolution priority order:
/// 1. Explicit argument from the embedding service (highest priority)
/// 2. `VOXKIT_DATA` environment variable
/// 3. `data_root` key in the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_root(explicit: Option<&Path>) -> PathBuf {
    // Priority 1: Explicit argument
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("VOXKIT_DATA") {
        if !path.trim().is_empty() {
            debug!(path, "Data root from VOXKIT_DATA");
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = config_file_path() {
        if let Some(data_root) = data_root_from_config(&config_path) {
            return data_root;
        }
    }

    // Priority 4: OS-dependent compiled default
    let fallback = default_data_root();
    debug!(path = %fallback.display(), "Data root from compiled default");
    fallback
}

/// `data_root` from a config file, if it parses and carries the key
///
/// An unreadable or malformed file is logged and skipped so resolution
/// falls through to the compiled default.
fn data_root_from_config(path: &Path) -> Option<PathBuf> {
    match TomlConfig::load(path) {
        Ok(config) => {
            if let Some(ref data_root) = config.data_root {
                debug!(
                    path = %path.display(),
                    data_root = %data_root.display(),
                    "Data root from config file"
                );
            }
            config.data_root
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
            None
        }
    }
}

/// Get default configuration file path for the platform
pub fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/voxkit/voxkit.toml first, then /etc/voxkit/voxkit.toml
        let user_config = dirs::config_dir().map(|d| d.join("voxkit").join("voxkit.toml"));
        let system_config = PathBuf::from("/etc/voxkit/voxkit.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("voxkit").join("voxkit.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default data root path
pub fn default_data_root() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/voxkit (or /var/lib/voxkit for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("voxkit"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/voxkit"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/voxkit
        dirs::data_dir()
            .map(|d| d.join("voxkit"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/voxkit"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\voxkit
        dirs::data_local_dir()
            .map(|d| d.join("voxkit"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\voxkit"))
    } else {
        PathBuf::from("./voxkit_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn test_explicit_argument_wins() {
        std::env::set_var("VOXKIT_DATA", "/tmp/from_env");
        let resolved = resolve_data_root(Some(Path::new("/tmp/explicit")));
        std::env::remove_var("VOXKIT_DATA");

        assert_eq!(resolved, PathBuf::from("/tmp/explicit"));
    }

    #[test]
    #[serial]
    fn test_env_var_used_when_no_explicit() {
        std::env::set_var("VOXKIT_DATA", "/tmp/from_env");
        let resolved = resolve_data_root(None);
        std::env::remove_var("VOXKIT_DATA");

        assert_eq!(resolved, PathBuf::from("/tmp/from_env"));
    }

    #[test]
    #[serial]
    fn test_empty_env_var_ignored() {
        std::env::set_var("VOXKIT_DATA", "   ");
        let resolved = resolve_data_root(None);
        std::env::remove_var("VOXKIT_DATA");

        // Falls through to TOML/default, never an empty path
        assert!(!resolved.as_os_str().is_empty());
    }

    #[test]
    fn test_toml_config_parse() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("voxkit.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "data_root = \"/srv/voxkit\"").unwrap();
        writeln!(file, "fallback_sample = \"/srv/voxkit/sample.wav\"").unwrap();
        writeln!(file, "target_sample_rate = 22050").unwrap();

        let config = TomlConfig::load(&path).expect("Failed to parse config");
        assert_eq!(config.data_root, Some(PathBuf::from("/srv/voxkit")));
        assert_eq!(
            config.fallback_sample,
            Some(PathBuf::from("/srv/voxkit/sample.wav"))
        );
        assert_eq!(config.target_sample_rate, Some(22050));
    }

    #[test]
    fn test_toml_config_partial() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("voxkit.toml");
        std::fs::write(&path, "target_sample_rate = 44100\n").unwrap();

        let config = TomlConfig::load(&path).expect("Failed to parse config");
        assert!(config.data_root.is_none());
        assert!(config.fallback_sample.is_none());
        assert_eq!(config.target_sample_rate, Some(44100));
    }

    #[test]
    fn test_toml_config_missing_file() {
        let result = TomlConfig::load(Path::new("/nonexistent/voxkit.toml"));
        assert!(result.is_err(), "Missing config file should be an error");
    }

    #[test]
    fn test_data_root_read_from_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("voxkit.toml");
        std::fs::write(&path, "data_root = \"/srv/voxkit\"\n").unwrap();

        assert_eq!(
            data_root_from_config(&path),
            Some(PathBuf::from("/srv/voxkit"))
        );
    }

    #[test]
    fn test_malformed_config_file_skipped() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("voxkit.toml");
        std::fs::write(&path, "data_root = [not toml").unwrap();

        // Resolution must fall through, never abort on a bad file
        assert_eq!(data_root_from_config(&path), None);
    }

    #[test]
    fn test_config_file_without_data_root_skipped() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("voxkit.toml");
        std::fs::write(&path, "target_sample_rate = 22050\n").unwrap();

        assert_eq!(data_root_from_config(&path), None);
    }
}
