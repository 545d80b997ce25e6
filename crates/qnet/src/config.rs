use crate::error::{QNetError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width of the single hidden layer unless configured otherwise.
pub const DEFAULT_HIDDEN_SIZE: usize = 32;

/// Construction parameters for a [`crate::QNetwork`].
///
/// ```json
/// { "state_size": 8, "action_size": 4, "seed": 0 }
/// ```
///
/// `hidden_size` and `seed` may be omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QNetworkConfig {
    pub state_size: usize,
    pub action_size: usize,
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
    #[serde(default)]
    pub seed: u64,
}

fn default_hidden_size() -> usize {
    DEFAULT_HIDDEN_SIZE
}

impl QNetworkConfig {
    #[must_use]
    pub fn new(state_size: usize, action_size: usize, seed: u64) -> Self {
        Self { state_size, action_size, hidden_size: DEFAULT_HIDDEN_SIZE, seed }
    }

    #[must_use]
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    /// Rejects zero-sized layers, sizes the kernels cannot address (above
    /// `u32::MAX`) and weight matrices whose element count overflows `usize`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("state_size", self.state_size),
            ("action_size", self.action_size),
            ("hidden_size", self.hidden_size),
        ] {
            if value == 0 {
                return Err(QNetError::InvalidConfig(format!("{name} must be positive")));
            }
            if u32::try_from(value).is_err() {
                return Err(QNetError::InvalidConfig(format!(
                    "{name} {value} exceeds the largest supported dimension {}",
                    u32::MAX
                )));
            }
        }
        for (name, rows, cols) in [
            ("hidden_size * state_size", self.hidden_size, self.state_size),
            ("action_size * hidden_size", self.action_size, self.hidden_size),
        ] {
            if rows.checked_mul(cols).is_none() {
                return Err(QNetError::InvalidConfig(format!(
                    "{name} ({rows} * {cols}) overflows"
                )));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = QNetworkConfig::from_json_str(r#"{"state_size": 4, "action_size": 2}"#).unwrap();
        assert_eq!(config, QNetworkConfig::new(4, 2, 0));
        assert_eq!(config.hidden_size, 32);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(QNetworkConfig::new(0, 2, 0).validate().is_err());
        assert!(QNetworkConfig::new(4, 0, 0).validate().is_err());
        assert!(QNetworkConfig::new(4, 2, 0).with_hidden_size(0).validate().is_err());
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let huge = usize::MAX / 16;
        assert!(matches!(
            QNetworkConfig::new(huge, 4, 0).validate(),
            Err(QNetError::InvalidConfig(_))
        ));
        assert!(matches!(
            QNetworkConfig::new(4, 2, 0).with_hidden_size(huge).validate(),
            Err(QNetError::InvalidConfig(_))
        ));
        let limit = u32::MAX as usize;
        assert!(QNetworkConfig::new(limit, 1, 0).with_hidden_size(1).validate().is_ok());
    }
}
