//! Configuration for the mgmt client.
//!
//! Tuning knobs for command correlation: the completion timeout, the
//! sweep cadence for expired entries, and queue depths. Values load from
//! a TOML file resolved through the usual environment chain, or default
//! in code.

use std::{
   env, fs,
   path::{Path, PathBuf},
   time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::{MgmtError, Result};

/// Client configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientConfig {
   /// How long a command may stay pending before it fails with a
   /// timeout, in milliseconds.
   #[serde(default = "default_command_timeout_ms")]
   pub command_timeout_ms: u64,

   /// Interval between sweeps for expired pending commands.
   #[serde(default = "default_sweep_interval_ms")]
   pub sweep_interval_ms: u64,

   /// Unsolicited events buffered before the oldest are dropped.
   #[serde(default = "default_event_queue_depth")]
   pub event_queue_depth: usize,

   /// Frames buffered between the reader task and the correlator.
   #[serde(default = "default_frame_channel_depth")]
   pub frame_channel_depth: usize,
}

const fn default_command_timeout_ms() -> u64 {
   2000
}

const fn default_sweep_interval_ms() -> u64 {
   250
}

const fn default_event_queue_depth() -> usize {
   256
}

const fn default_frame_channel_depth() -> usize {
   128
}

impl Default for ClientConfig {
   fn default() -> Self {
      Self {
         command_timeout_ms: default_command_timeout_ms(),
         sweep_interval_ms: default_sweep_interval_ms(),
         event_queue_depth: default_event_queue_depth(),
         frame_channel_depth: default_frame_channel_depth(),
      }
   }
}

impl ClientConfig {
   /// Loads configuration from disk, or returns defaults if the file
   /// does not exist.
   pub fn load() -> Result<Self> {
      let config_path = Self::config_path()?;
      if config_path.exists() {
         Self::load_from(&config_path)
      } else {
         Ok(Self::default())
      }
   }

   /// Loads configuration from an explicit path.
   pub fn load_from(path: &Path) -> Result<Self> {
      let contents = fs::read_to_string(path)?;
      Ok(toml::from_str(&contents)?)
   }

   /// Saves the current configuration to disk.
   pub fn save(&self) -> Result<()> {
      let config_path = Self::config_path()?;
      if let Some(parent) = config_path.parent() {
         fs::create_dir_all(parent)?;
      }
      fs::write(&config_path, toml::to_string_pretty(self)?)?;
      Ok(())
   }

   fn config_path() -> Result<PathBuf> {
      let config_dir = if let Ok(home) = env::var("BTMGMT_HOME") {
         PathBuf::from(home)
      } else if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
         PathBuf::from(config_home)
      } else if let Ok(home) = env::var("HOME") {
         PathBuf::from(home).join(".config")
      } else {
         return Err(MgmtError::ConfigDirNotFound);
      };

      Ok(config_dir.join("btmgmt").join("config.toml"))
   }

   pub const fn command_timeout(&self) -> Duration {
      Duration::from_millis(self.command_timeout_ms)
   }

   pub const fn sweep_interval(&self) -> Duration {
      Duration::from_millis(self.sweep_interval_ms)
   }
}
