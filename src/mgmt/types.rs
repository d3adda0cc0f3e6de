//! Domain value types decoded from mgmt payloads.
//!
//! Each type is an immutable value object built fresh from one payload
//! slice by its `parse` constructor. Decoding is byte-exact: field order
//! and offsets are fixed by the protocol. A failed parse never yields a
//! partially-initialized value.

use std::fmt;

use smol_str::SmolStr;

use crate::{
   error::{MgmtError, Result},
   mgmt::codec,
};

/// A 6-byte Bluetooth hardware address, held in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Address([u8; 6]);

impl Address {
   pub const fn new(octets: [u8; 6]) -> Self {
      Self(octets)
   }

   /// Decodes a 6-byte wire span, reversing the octet order.
   pub fn parse(pay: &[u8]) -> Result<Self> {
      Ok(Self(codec::reversed(pay, "address")?))
   }

   pub const fn octets(&self) -> [u8; 6] {
      self.0
   }

   /// Re-encodes into wire order (reversed).
   pub fn to_wire(&self) -> [u8; 6] {
      let mut out = self.0;
      out.reverse();
      out
   }
}

impl fmt::Display for Address {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let [a, b, c, d, e, g] = self.0;
      write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
   }
}

/// A 3-byte class-of-device value, held in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct DeviceClass([u8; 3]);

impl DeviceClass {
   pub const fn new(octets: [u8; 3]) -> Self {
      Self(octets)
   }

   /// Decodes a 3-byte wire span, reversing the octet order.
   pub fn parse(pay: &[u8]) -> Result<Self> {
      Ok(Self(codec::reversed(pay, "device class")?))
   }

   pub const fn octets(&self) -> [u8; 3] {
      self.0
   }

   pub fn to_wire(&self) -> [u8; 3] {
      let mut out = self.0;
      out.reverse();
      out
   }
}

impl fmt::Display for DeviceClass {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "0x{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
   }
}

/// Controller settings word, decoded bit-by-bit.
///
/// Bits 16..=31 of the wire word are currently unused and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerSettings {
   pub powered: bool,
   pub connectable: bool,
   pub fast_connectable: bool,
   pub discoverable: bool,
   pub bondable: bool,
   pub link_level_security: bool,
   pub secure_simple_pairing: bool,
   pub br_edr: bool,
   pub high_speed: bool,
   pub low_energy: bool,
   pub advertising: bool,
   pub secure_connections: bool,
   pub debug_keys: bool,
   pub privacy: bool,
   pub controller_configuration: bool,
   pub static_address: bool,
}

impl ControllerSettings {
   /// Decodes a 4-byte little-endian settings word.
   pub fn parse(pay: &[u8]) -> Result<Self> {
      codec::expect_len(pay, 4, "controller settings")?;
      Ok(Self::from_word(codec::read_u32(pay, 0, "controller settings")?))
   }

   pub const fn from_word(word: u32) -> Self {
      use codec::test_bit;
      Self {
         powered: test_bit(word, 0),
         connectable: test_bit(word, 1),
         fast_connectable: test_bit(word, 2),
         discoverable: test_bit(word, 3),
         bondable: test_bit(word, 4),
         link_level_security: test_bit(word, 5),
         secure_simple_pairing: test_bit(word, 6),
         br_edr: test_bit(word, 7),
         high_speed: test_bit(word, 8),
         low_energy: test_bit(word, 9),
         advertising: test_bit(word, 10),
         secure_connections: test_bit(word, 11),
         debug_keys: test_bit(word, 12),
         privacy: test_bit(word, 13),
         controller_configuration: test_bit(word, 14),
         static_address: test_bit(word, 15),
      }
   }

   pub const fn to_word(&self) -> u32 {
      (self.powered as u32)
         | (self.connectable as u32) << 1
         | (self.fast_connectable as u32) << 2
         | (self.discoverable as u32) << 3
         | (self.bondable as u32) << 4
         | (self.link_level_security as u32) << 5
         | (self.secure_simple_pairing as u32) << 6
         | (self.br_edr as u32) << 7
         | (self.high_speed as u32) << 8
         | (self.low_energy as u32) << 9
         | (self.advertising as u32) << 10
         | (self.secure_connections as u32) << 11
         | (self.debug_keys as u32) << 12
         | (self.privacy as u32) << 13
         | (self.controller_configuration as u32) << 14
         | (self.static_address as u32) << 15
   }
}

/// Size of a ControllerInformation response payload.
const CONTROLLER_INFO_LEN: usize = 280;

/// Basic state and identity of one controller, as returned by
/// ReadControllerInformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInformation {
   pub address: Address,
   pub bluetooth_version: u8,
   pub manufacturer: u16,
   pub supported_settings: ControllerSettings,
   pub current_settings: ControllerSettings,
   pub class_of_device: DeviceClass,
   pub name: SmolStr,
   pub short_name: SmolStr,
}

impl ControllerInformation {
   /// Decodes the fixed 280-byte record. Offsets: address 0, version 6,
   /// manufacturer 7, supported settings 9, current settings 13, class
   /// 17, name 20 (249 bytes), short name 269 (11 bytes).
   pub fn parse(pay: &[u8]) -> Result<Self> {
      codec::expect_len(pay, CONTROLLER_INFO_LEN, "controller information")?;
      Ok(Self {
         address: Address::parse(&pay[0..6])?,
         bluetooth_version: pay[6],
         manufacturer: codec::read_u16(pay, 7, "controller information")?,
         supported_settings: ControllerSettings::parse(&pay[9..13])?,
         current_settings: ControllerSettings::parse(&pay[13..17])?,
         class_of_device: DeviceClass::parse(&pay[17..20])?,
         name: codec::zero_terminated_str(&pay[20..269]),
         short_name: codec::zero_terminated_str(&pay[269..280]),
      })
   }

   /// Re-encodes into the 280-byte wire record.
   pub fn to_payload(&self) -> Vec<u8> {
      let mut pay = vec![0u8; CONTROLLER_INFO_LEN];
      pay[0..6].copy_from_slice(&self.address.to_wire());
      pay[6] = self.bluetooth_version;
      pay[7..9].copy_from_slice(&self.manufacturer.to_le_bytes());
      pay[9..13].copy_from_slice(&self.supported_settings.to_word().to_le_bytes());
      pay[13..17].copy_from_slice(&self.current_settings.to_word().to_le_bytes());
      pay[17..20].copy_from_slice(&self.class_of_device.to_wire());
      let name = self.name.as_bytes();
      pay[20..20 + name.len().min(248)].copy_from_slice(&name[..name.len().min(248)]);
      let short = self.short_name.as_bytes();
      pay[269..269 + short.len().min(10)].copy_from_slice(&short[..short.len().min(10)]);
      pay
   }
}

impl fmt::Display for ControllerInformation {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(
         f,
         "addr {} version {} manufacturer {} class {} name {:?} short name {:?}",
         self.address,
         self.bluetooth_version,
         self.manufacturer,
         self.class_of_device,
         self.name,
         self.short_name
      )
   }
}

/// The list of known controller indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerIndexList {
   pub indices: Vec<u16>,
}

impl ControllerIndexList {
   pub fn parse(pay: &[u8]) -> Result<Self> {
      let (count, body) = codec::counted_block(pay, 2, "controller index list")?;
      let indices = (0..count)
         .map(|i| codec::read_u16(body, i * 2, "controller index list"))
         .collect::<Result<_>>()?;
      Ok(Self { indices })
   }
}

impl fmt::Display for ControllerIndexList {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "Controller Index List:")?;
      for idx in &self.indices {
         write!(f, " {idx}")?;
      }
      Ok(())
   }
}

/// Opcodes and event codes the kernel supports.
///
/// The response is a single contiguous region: the commands block first,
/// then the events block. The split point is computed from the two
/// counts, never assumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedCommands {
   pub commands: Vec<u16>,
   pub events: Vec<u16>,
}

impl SupportedCommands {
   pub fn parse(pay: &[u8]) -> Result<Self> {
      let num_commands = codec::read_u16(pay, 0, "supported commands")? as usize;
      let num_events = codec::read_u16(pay, 2, "supported commands")? as usize;
      let need = 4 + 2 * (num_commands + num_events);
      if pay.len() < need {
         return Err(MgmtError::payload("supported commands", pay.len()));
      }

      let mut off = 4;
      let mut read_block = |n: usize| -> Result<Vec<u16>> {
         let block = (0..n)
            .map(|i| codec::read_u16(pay, off + i * 2, "supported commands"))
            .collect::<Result<_>>()?;
         off += n * 2;
         Ok(block)
      };
      let commands = read_block(num_commands)?;
      let events = read_block(num_events)?;
      Ok(Self { commands, events })
   }
}

/// mgmt protocol version and revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInformation {
   pub version: u8,
   pub revision: u16,
}

impl VersionInformation {
   pub fn parse(pay: &[u8]) -> Result<Self> {
      codec::expect_len(pay, 3, "version information")?;
      Ok(Self {
         version: pay[0],
         revision: codec::read_u16(pay, 1, "version information")?,
      })
   }
}

impl fmt::Display for VersionInformation {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "Version {}.{}", self.version, self.revision)
   }
}

/// Address kind carried next to a connection address.
///
/// Type bytes the kernel may grow in the future decode as `Unknown`
/// rather than failing the surrounding payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
   BrEdr,
   LePublic,
   LeRandom,
   Unknown(u8),
}

impl AddressType {
   pub const fn from_raw(raw: u8) -> Self {
      match raw {
         0x00 => Self::BrEdr,
         0x01 => Self::LePublic,
         0x02 => Self::LeRandom,
         other => Self::Unknown(other),
      }
   }

   pub const fn to_raw(self) -> u8 {
      match self {
         Self::BrEdr => 0x00,
         Self::LePublic => 0x01,
         Self::LeRandom => 0x02,
         Self::Unknown(raw) => raw,
      }
   }
}

impl fmt::Display for AddressType {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(match self {
         Self::BrEdr => "BR/EDR",
         Self::LePublic => "LE public",
         Self::LeRandom => "LE random",
         Self::Unknown(_) => "unknown",
      })
   }
}

/// One connected peer: reversed address plus address type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionAddress {
   pub address: Address,
   pub address_type: AddressType,
}

impl ConnectionAddress {
   pub fn parse(pay: &[u8]) -> Result<Self> {
      codec::expect_len(pay, 7, "connection address")?;
      Ok(Self {
         address: Address::parse(&pay[0..6])?,
         address_type: AddressType::from_raw(pay[6]),
      })
   }
}

impl fmt::Display for ConnectionAddress {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{} [{}]", self.address, self.address_type)
   }
}

/// Active connections as returned by GetConnections.
///
/// Each entry occupies an 8-byte slot on the wire of which only the
/// first 7 bytes are meaningful; the decoder advances by 8 per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfoList {
   pub connections: Vec<ConnectionAddress>,
}

impl ConnectionInfoList {
   pub fn parse(pay: &[u8]) -> Result<Self> {
      let (count, body) = codec::counted_block(pay, 8, "connection list")?;
      let connections = (0..count)
         .map(|i| ConnectionAddress::parse(&body[i * 8..i * 8 + 7]))
         .collect::<Result<_>>()?;
      Ok(Self { connections })
   }
}

impl fmt::Display for ConnectionInfoList {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "Connection List:")?;
      for conn in &self.connections {
         write!(f, " {conn}")?;
      }
      Ok(())
   }
}
