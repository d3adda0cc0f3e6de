//! Error types for the mgmt client.
//!
//! This module defines all error types that can occur while talking to
//! the Bluetooth management socket, from wire decode failures to command
//! correlation and transport errors.

use thiserror::Error;

/// Main error type for the mgmt client.
#[derive(Error, Debug)]
pub enum MgmtError {
   /// A payload slice did not have the exact (or minimum) length the
   /// protocol mandates for the structure being decoded.
   #[error("malformed {what} payload: {actual} bytes")]
   PayloadFormat { what: &'static str, actual: usize },

   /// A command completed with a non-zero mgmt status code.
   #[error("command 0x{opcode:04x} failed with status 0x{status:02x}")]
   CommandFailed { opcode: u16, status: u8 },

   /// No matching completion event arrived within the configured window.
   #[error("command timed out")]
   CommandTimeout,

   /// A command for the same (opcode, controller index) pair is already
   /// outstanding. The kernel offers no transaction id, so a second send
   /// would be indistinguishable on the wire.
   #[error("command 0x{opcode:04x} already in flight on controller {index}")]
   CommandInFlight { opcode: u16, index: u16 },

   /// The underlying frame transport failed. All pending commands are
   /// failed with this error when the read side dies.
   #[error("transport error: {0}")]
   Transport(std::io::Error),

   /// The client actor has shut down.
   #[error("client has been shut down")]
   ClientShutdown,

   /// A local name exceeded the wire-format limit.
   #[error("name too long: {actual} bytes (max {max})")]
   NameTooLong { actual: usize, max: usize },

   #[error("could not determine config directory")]
   ConfigDirNotFound,

   #[error("I/O error: {0}")]
   Io(#[from] std::io::Error),

   #[error("TOML parsing error: {0}")]
   TomlParse(#[from] toml::de::Error),

   #[error("TOML serialization error: {0}")]
   TomlSerialize(#[from] toml::ser::Error),
}

impl MgmtError {
   pub(crate) const fn payload(what: &'static str, actual: usize) -> Self {
      Self::PayloadFormat { what, actual }
   }
}

/// Convenience type alias for Results with `MgmtError`.
pub type Result<T> = std::result::Result<T, MgmtError>;
