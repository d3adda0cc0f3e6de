//! Wire-level mgmt protocol: primitives, commands, events and the
//! domain structures decoded from their payloads.

pub mod codec;
pub mod command;
pub mod event;
pub mod types;
