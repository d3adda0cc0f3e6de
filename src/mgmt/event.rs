//! Event frame decoding for the mgmt protocol.
//!
//! The envelope decoder strips the fixed six-byte header and hands the
//! payload to the per-event decoders. Unknown event codes still decode
//! successfully; their payload is surfaced raw so a single unrecognized
//! notification can never kill the read loop.

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::{
   error::{MgmtError, Result},
   mgmt::{
      codec,
      types::{ConnectionAddress, ControllerSettings, DeviceClass},
   },
   transport::Packet,
};

/// mgmt event codes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::FromRepr, strum::Display)]
pub enum EventCode {
   CommandComplete = 0x0001,
   CommandStatus = 0x0002,
   ControllerError = 0x0003,
   IndexAdded = 0x0004,
   IndexRemoved = 0x0005,
   NewSettings = 0x0006,
   ClassOfDeviceChanged = 0x0007,
   LocalNameChanged = 0x0008,
   DeviceConnected = 0x000B,
   DeviceDisconnected = 0x000C,
   ConnectFailed = 0x000D,
}

/// The generic event frame header plus its payload slice:
/// `event_code:u16 | controller_index:u16 | param_len:u16 | payload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope {
   pub code: u16,
   pub index: u16,
   pub payload: Packet,
}

impl EventEnvelope {
   /// Decodes one raw frame. The payload must span exactly the declared
   /// length; no semantic interpretation happens here.
   pub fn parse(frame: &[u8]) -> Result<Self> {
      let code = codec::read_u16(frame, 0, "event frame")?;
      let index = codec::read_u16(frame, 2, "event frame")?;
      let len = codec::read_u16(frame, 4, "event frame")? as usize;
      if frame.len() != 6 + len {
         return Err(MgmtError::payload("event frame", frame.len()));
      }
      Ok(Self {
         code,
         index,
         payload: SmallVec::from_slice(&frame[6..]),
      })
   }
}

/// Intermediate acknowledgment of a command, carrying only a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatusEvent {
   pub opcode: u16,
   pub status: u8,
}

impl CommandStatusEvent {
   /// Exactly 3 bytes, in contrast to CommandComplete.
   pub fn parse(pay: &[u8]) -> Result<Self> {
      codec::expect_len(pay, 3, "command status")?;
      Ok(Self {
         opcode: codec::read_u16(pay, 0, "command status")?,
         status: pay[2],
      })
   }
}

/// Final completion of a command, carrying its return parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompleteEvent {
   pub opcode: u16,
   pub status: u8,
   pub return_params: Vec<u8>,
}

impl CommandCompleteEvent {
   pub fn parse(pay: &[u8]) -> Result<Self> {
      if pay.len() < 3 {
         return Err(MgmtError::payload("command complete", pay.len()));
      }
      Ok(Self {
         opcode: codec::read_u16(pay, 0, "command complete")?,
         status: pay[2],
         return_params: pay[3..].to_vec(),
      })
   }
}

/// A classified mgmt event.
///
/// Codes without a dedicated decoder land in `Unknown` with the raw
/// payload attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MgmtEvent {
   CommandComplete(CommandCompleteEvent),
   CommandStatus(CommandStatusEvent),
   ControllerError { code: u8 },
   IndexAdded,
   IndexRemoved,
   NewSettings(ControllerSettings),
   ClassOfDeviceChanged(DeviceClass),
   LocalNameChanged { name: SmolStr, short_name: SmolStr },
   DeviceConnected(ConnectionAddress),
   DeviceDisconnected { peer: ConnectionAddress, reason: u8 },
   ConnectFailed { peer: ConnectionAddress, status: u8 },
   Unknown { code: u16, payload: Vec<u8> },
}

impl MgmtEvent {
   /// Interprets an envelope payload according to its event code.
   pub fn parse(envelope: &EventEnvelope) -> Result<Self> {
      let pay = &envelope.payload[..];
      let event = match EventCode::from_repr(envelope.code) {
         Some(EventCode::CommandComplete) => {
            Self::CommandComplete(CommandCompleteEvent::parse(pay)?)
         },
         Some(EventCode::CommandStatus) => Self::CommandStatus(CommandStatusEvent::parse(pay)?),
         Some(EventCode::ControllerError) => {
            codec::expect_len(pay, 1, "controller error")?;
            Self::ControllerError { code: pay[0] }
         },
         Some(EventCode::IndexAdded) => {
            codec::expect_len(pay, 0, "index added")?;
            Self::IndexAdded
         },
         Some(EventCode::IndexRemoved) => {
            codec::expect_len(pay, 0, "index removed")?;
            Self::IndexRemoved
         },
         Some(EventCode::NewSettings) => Self::NewSettings(ControllerSettings::parse(pay)?),
         Some(EventCode::ClassOfDeviceChanged) => {
            Self::ClassOfDeviceChanged(DeviceClass::parse(pay)?)
         },
         Some(EventCode::LocalNameChanged) => {
            codec::expect_len(pay, 260, "local name changed")?;
            Self::LocalNameChanged {
               name: codec::zero_terminated_str(&pay[0..249]),
               short_name: codec::zero_terminated_str(&pay[249..260]),
            }
         },
         Some(EventCode::DeviceConnected) => {
            // addr + type, followed by flags and EIR data
            if pay.len() < 7 {
               return Err(MgmtError::payload("device connected", pay.len()));
            }
            Self::DeviceConnected(ConnectionAddress::parse(&pay[0..7])?)
         },
         Some(EventCode::DeviceDisconnected) => {
            codec::expect_len(pay, 8, "device disconnected")?;
            Self::DeviceDisconnected {
               peer: ConnectionAddress::parse(&pay[0..7])?,
               reason: pay[7],
            }
         },
         Some(EventCode::ConnectFailed) => {
            codec::expect_len(pay, 8, "connect failed")?;
            Self::ConnectFailed {
               peer: ConnectionAddress::parse(&pay[0..7])?,
               status: pay[7],
            }
         },
         None => Self::Unknown {
            code: envelope.code,
            payload: pay.to_vec(),
         },
      };
      Ok(event)
   }
}
