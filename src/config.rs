//! Tool configuration
//!
//! Every field has a default, so a config file only needs the fields it
//! changes:
//!
//! ```json
//! {
//!   "instrument": { "recorder_name": "__rec", "test_sequencing": "comma" },
//!   "limits": { "max_steps": 50000 }
//! }
//! ```

use crate::instrument::InstrumentOptions;
use crate::interpreter::ExecutionLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub instrument: InstrumentOptions,
    pub limits: ExecutionLimits,
}

impl TraceConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::TestSequencing;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(TraceConfig::from_json("{}").unwrap(), TraceConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = TraceConfig::from_json(
            r#"{ "instrument": { "test_sequencing": "comma" }, "limits": { "max_steps": 10 } }"#,
        )
        .unwrap();
        assert_eq!(config.instrument.test_sequencing, TestSequencing::Comma);
        assert_eq!(config.instrument.recorder_name, "__trace");
        assert_eq!(config.limits.max_steps, 10);
        assert_eq!(config.limits.max_call_depth, 256);
    }

    #[test]
    fn test_unknown_sequencing_is_rejected() {
        assert!(TraceConfig::from_json(r#"{ "instrument": { "test_sequencing": "and" } }"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = TraceConfig::load(Path::new("/nonexistent/trace-context.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
