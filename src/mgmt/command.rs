//! mgmt command opcodes, status codes and frame encoding.
//!
//! Opcode and status values follow `bluez/doc/mgmt-api.txt`. Only the
//! subset with typed helpers on the client is enumerated here; raw
//! opcodes can always be sent through `MgmtClient::raw_command`.

use smallvec::SmallVec;

use crate::transport::Packet;

/// Controller index targeting no specific controller.
pub const INDEX_NONE: u16 = 0xFFFF;

/// Maximum local name length, excluding the terminating NUL.
pub const NAME_MAX: usize = 248;
/// Maximum short name length, excluding the terminating NUL.
pub const SHORT_NAME_MAX: usize = 10;

/// mgmt command opcodes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr, strum::Display)]
pub enum CommandCode {
   ReadVersionInformation = 0x0001,
   ReadSupportedCommands = 0x0002,
   ReadControllerIndexList = 0x0003,
   ReadControllerInformation = 0x0004,
   SetPowered = 0x0005,
   SetDiscoverable = 0x0006,
   SetConnectable = 0x0007,
   SetFastConnectable = 0x0008,
   SetBondable = 0x0009,
   SetLinkSecurity = 0x000A,
   SetSecureSimplePairing = 0x000B,
   SetHighSpeed = 0x000C,
   SetLowEnergy = 0x000D,
   SetDeviceClass = 0x000E,
   SetLocalName = 0x000F,
   Disconnect = 0x0014,
   GetConnections = 0x0015,
}

/// mgmt command status codes, as carried by CommandStatus and
/// CommandComplete events.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::FromRepr, strum::Display)]
pub enum MgmtStatus {
   Success = 0x00,
   UnknownCommand = 0x01,
   NotConnected = 0x02,
   Failed = 0x03,
   ConnectFailed = 0x04,
   AuthenticationFailed = 0x05,
   NotPaired = 0x06,
   NoResources = 0x07,
   Timeout = 0x08,
   AlreadyConnected = 0x09,
   Busy = 0x0A,
   Rejected = 0x0B,
   NotSupported = 0x0C,
   InvalidParams = 0x0D,
   Disconnected = 0x0E,
   NotPowered = 0x0F,
   Cancelled = 0x10,
   InvalidIndex = 0x11,
   RfKilled = 0x12,
   AlreadyPaired = 0x13,
   PermissionDenied = 0x14,
}

/// Encodes one command frame:
/// `opcode:u16 | controller_index:u16 | param_len:u16 | params`.
pub fn encode_command(opcode: u16, index: u16, params: &[u8]) -> Packet {
   let mut frame = SmallVec::with_capacity(6 + params.len());
   frame.extend_from_slice(&opcode.to_le_bytes());
   frame.extend_from_slice(&index.to_le_bytes());
   frame.extend_from_slice(&(params.len() as u16).to_le_bytes());
   frame.extend_from_slice(params);
   frame
}
