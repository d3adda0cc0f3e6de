//! Async client for the Linux Bluetooth management ("mgmt") socket
//! protocol.
//!
//! The mgmt interface is a fixed-header, length-prefixed binary protocol
//! spoken over a privileged kernel socket. This crate implements the
//! wire codec for its commands, events and domain structures, and an
//! actor-based client that correlates asynchronous CommandStatus and
//! CommandComplete events back to the command that triggered them while
//! forwarding everything else to subscribers.
//!
//! The transport is pluggable via [`transport::Transport`]; the crate
//! ships an in-memory implementation for tests and loopback use.

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod mgmt;
pub mod transport;

pub use client::MgmtClient;
pub use config::ClientConfig;
pub use error::{MgmtError, Result};
pub use event::{EventQueue, UnsolicitedEvent};
pub use mgmt::{
   command::{CommandCode, INDEX_NONE, MgmtStatus},
   event::{CommandCompleteEvent, CommandStatusEvent, EventCode, EventEnvelope, MgmtEvent},
   types::{
      Address, AddressType, ConnectionAddress, ConnectionInfoList, ControllerIndexList,
      ControllerInformation, ControllerSettings, DeviceClass, SupportedCommands,
      VersionInformation,
   },
};
pub use transport::{ChannelTransport, Packet, Transport, channel_pair};
