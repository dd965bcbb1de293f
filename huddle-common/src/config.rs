//! Configuration loading and resolution
//!
//! Configuration is resolved in priority order:
//! 1. Command-line argument (highest priority, handled by the binary)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scope of the friend-interest signal.
///
/// The original deployment treated every other user as a friend; proper
/// friend-graph scoping is the intended production behavior. Which one
/// applies is a deployment decision, not a code constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendScope {
    /// Only users in the viewer's declared friend list count.
    DeclaredFriends,
    /// Every other user counts as a friend.
    AllUsers,
}

/// Coordination engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Port the HTTP API listens on
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Interest count at which a venue activates a group action item
    pub activation_threshold: i64,

    /// Which users count toward the friend-interest signal
    pub friend_scope: FriendScope,

    /// Distance beyond which the proximity score component is zero
    pub proximity_cutoff_km: f64,

    /// Interval between background action-item expiration sweeps
    pub expiration_sweep_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            port: 5850,
            database_path: PathBuf::from("huddle.db"),
            activation_threshold: 3,
            friend_scope: FriendScope::AllUsers,
            proximity_cutoff_km: 10.0,
            expiration_sweep_interval_secs: 3600,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: EngineConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.activation_threshold < 1 {
            return Err(Error::Config(
                "activation_threshold must be at least 1".to_string(),
            ));
        }
        if self.proximity_cutoff_km <= 0.0 {
            return Err(Error::Config(
                "proximity_cutoff_km must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Locate a config file when none was passed on the command line:
/// `HUDDLE_CONFIG` environment variable first, then the per-user config
/// directory (`~/.config/huddle/config.toml` on Linux).
pub fn default_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("HUDDLE_CONFIG") {
        return Some(PathBuf::from(path));
    }

    let candidate = dirs::config_dir()?.join("huddle").join("config.toml");
    if candidate.exists() {
        Some(candidate)
    } else {
        None
    }
}
