//! Config for ykushctl binary
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Defaults applied when the matching flag is not passed on the command line
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct Config {
    /// Hub ordinal acted on when `--hub` is not passed
    pub default_hub: usize,
    /// Encode command frames with byte 0 repeated in byte 1 (legacy firmware
    /// frame layout)
    pub mirror_byte: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            default_hub: 1,
            mirror_byte: false,
        }
    }
}

impl Config {
    /// Default new
    pub fn new() -> Config {
        Config {
            ..Default::default()
        }
    }

    /// Attempt to read from .json format config at `file_path`
    pub fn from_file(file_path: &Path) -> Result<Config> {
        let f = File::open(file_path)?;
        let mut br = BufReader::new(f);
        let mut data = String::new();

        br.read_to_string(&mut data)?;
        Ok(serde_json::from_str::<Config>(&data)?)
    }

    /// Config path used when none is supplied: `ykushctl/config.json` under
    /// the user config dir
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|x| x.join("ykushctl").join("config.json"))
    }

    /// Get [`Config`] from the default file path, `Config::new()` if it does
    /// not exist
    pub fn sys_config() -> Result<Config> {
        match Config::config_file_path() {
            Some(path) if path.exists() => {
                log::info!("Using config {:?}", path);
                Config::from_file(&path)
            }
            _ => Ok(Config::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_partial_config() {
        let config = serde_json::from_str::<Config>(r#"{"mirror-byte": true}"#).unwrap();
        assert_eq!(
            config,
            Config {
                default_hub: 1,
                mirror_byte: true,
            }
        );
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(serde_json::from_str::<Config>(r#"{"port-count": 9}"#).is_err());
    }
}
