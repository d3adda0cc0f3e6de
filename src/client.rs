//! Async mgmt client: command submission and event correlation.
//!
//! A single actor owns the pending-command map. Commands are keyed by
//! (opcode, controller index) because the protocol has no transaction
//! id; a second send for an already-pending key is rejected rather than
//! queued. A dedicated reader task feeds frames from the transport so a
//! caller awaiting a slow command can never stall the read path.

use std::{collections::HashMap, io, sync::Arc, time::Instant};

use log::{debug, info, warn};
use smallvec::SmallVec;
use smol_str::SmolStr;
use tokio::{
   select,
   sync::{mpsc, oneshot},
   task::JoinSet,
   time::{self, MissedTickBehavior},
};

use crate::{
   config::ClientConfig,
   error::{MgmtError, Result},
   event::{EventQueue, UnsolicitedEvent},
   mgmt::{
      codec,
      command::{CommandCode, INDEX_NONE, NAME_MAX, SHORT_NAME_MAX, encode_command},
      event::{CommandCompleteEvent, CommandStatusEvent, EventEnvelope, MgmtEvent},
      types::{
         ConnectionAddress, ConnectionInfoList, ControllerIndexList, ControllerInformation,
         ControllerSettings, SupportedCommands, VersionInformation,
      },
   },
   transport::{Packet, Transport},
};

/// Commands accepted by the client inbox.
const COMMAND_CHANNEL_SIZE: usize = 64;

enum ClientCommand {
   Submit {
      opcode: u16,
      index: u16,
      params: Packet,
      reply: oneshot::Sender<Result<Vec<u8>>>,
   },
}

struct Pending {
   reply: oneshot::Sender<Result<Vec<u8>>>,
   deadline: Instant,
   status_acked: bool,
}

/// Handle to a running mgmt client.
///
/// Dropping the handle shuts the client down: the reader and correlator
/// tasks are aborted.
pub struct MgmtClient {
   inbox: mpsc::Sender<ClientCommand>,
   events: Arc<EventQueue>,
   _tasks: JoinSet<()>,
}

impl MgmtClient {
   /// Starts the client over the given transport. Must be called from
   /// within a tokio runtime.
   pub fn new<T: Transport>(transport: T, config: ClientConfig) -> Self {
      let transport = Arc::new(transport);
      let events = EventQueue::new(config.event_queue_depth);
      let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
      let (frame_tx, frame_rx) = mpsc::channel(config.frame_channel_depth.max(1));

      let mut tasks = JoinSet::new();
      tasks.spawn(recv_loop(transport.clone(), frame_tx));
      tasks.spawn(
         ClientActor {
            transport,
            command_rx,
            frame_rx,
            events: events.clone(),
            pending: HashMap::new(),
            config,
         }
         .run(),
      );

      Self {
         inbox: command_tx,
         events,
         _tasks: tasks,
      }
   }

   /// Queue of events the kernel sent unsolicited.
   pub fn events(&self) -> Arc<EventQueue> {
      self.events.clone()
   }

   /// Sends a raw command frame and awaits its completion, returning the
   /// raw return parameters.
   ///
   /// At most one command per (opcode, controller index) pair may be
   /// outstanding; a concurrent duplicate fails fast with
   /// [`MgmtError::CommandInFlight`].
   pub async fn raw_command(&self, opcode: u16, index: u16, params: &[u8]) -> Result<Vec<u8>> {
      let (tx, rx) = oneshot::channel();
      self
         .inbox
         .send(ClientCommand::Submit {
            opcode,
            index,
            params: Packet::from_slice(params),
            reply: tx,
         })
         .await
         .map_err(|_| MgmtError::ClientShutdown)?;
      rx.await.map_err(|_| MgmtError::ClientShutdown)?
   }

   /// Reads the mgmt protocol version and revision.
   pub async fn read_version_information(&self) -> Result<VersionInformation> {
      let ret = self
         .raw_command(CommandCode::ReadVersionInformation as u16, INDEX_NONE, &[])
         .await?;
      VersionInformation::parse(&ret)
   }

   /// Reads the opcodes and event codes the kernel supports.
   pub async fn read_supported_commands(&self) -> Result<SupportedCommands> {
      let ret = self
         .raw_command(CommandCode::ReadSupportedCommands as u16, INDEX_NONE, &[])
         .await?;
      SupportedCommands::parse(&ret)
   }

   /// Reads the list of known controller indices.
   pub async fn read_controller_index_list(&self) -> Result<ControllerIndexList> {
      let ret = self
         .raw_command(CommandCode::ReadControllerIndexList as u16, INDEX_NONE, &[])
         .await?;
      ControllerIndexList::parse(&ret)
   }

   /// Reads state and identity of one controller.
   pub async fn read_controller_information(&self, index: u16) -> Result<ControllerInformation> {
      let ret = self
         .raw_command(CommandCode::ReadControllerInformation as u16, index, &[])
         .await?;
      ControllerInformation::parse(&ret)
   }

   /// Powers a controller on or off. Returns the new current settings.
   pub async fn set_powered(&self, index: u16, powered: bool) -> Result<ControllerSettings> {
      self
         .set_mode(CommandCode::SetPowered, index, &[u8::from(powered)])
         .await
   }

   /// Sets the discoverable property. `timeout_secs` is only meaningful
   /// when enabling.
   pub async fn set_discoverable(
      &self,
      index: u16,
      discoverable: bool,
      timeout_secs: u16,
   ) -> Result<ControllerSettings> {
      let timeout = timeout_secs.to_le_bytes();
      self
         .set_mode(
            CommandCode::SetDiscoverable,
            index,
            &[u8::from(discoverable), timeout[0], timeout[1]],
         )
         .await
   }

   pub async fn set_connectable(&self, index: u16, connectable: bool) -> Result<ControllerSettings> {
      self
         .set_mode(CommandCode::SetConnectable, index, &[u8::from(connectable)])
         .await
   }

   pub async fn set_bondable(&self, index: u16, bondable: bool) -> Result<ControllerSettings> {
      self
         .set_mode(CommandCode::SetBondable, index, &[u8::from(bondable)])
         .await
   }

   pub async fn set_secure_simple_pairing(
      &self,
      index: u16,
      enabled: bool,
   ) -> Result<ControllerSettings> {
      self
         .set_mode(
            CommandCode::SetSecureSimplePairing,
            index,
            &[u8::from(enabled)],
         )
         .await
   }

   pub async fn set_low_energy(&self, index: u16, enabled: bool) -> Result<ControllerSettings> {
      self
         .set_mode(CommandCode::SetLowEnergy, index, &[u8::from(enabled)])
         .await
   }

   /// Sets the local name and short name. Returns the names the kernel
   /// echoed back.
   pub async fn set_local_name(
      &self,
      index: u16,
      name: &str,
      short_name: Option<&str>,
   ) -> Result<(SmolStr, SmolStr)> {
      if name.len() > NAME_MAX {
         return Err(MgmtError::NameTooLong {
            actual: name.len(),
            max: NAME_MAX,
         });
      }
      let short = short_name.unwrap_or("");
      if short.len() > SHORT_NAME_MAX {
         return Err(MgmtError::NameTooLong {
            actual: short.len(),
            max: SHORT_NAME_MAX,
         });
      }

      // 249-byte zero-terminated name followed by an 11-byte short name
      let mut params = [0u8; 260];
      params[..name.len()].copy_from_slice(name.as_bytes());
      params[249..249 + short.len()].copy_from_slice(short.as_bytes());

      let ret = self
         .raw_command(CommandCode::SetLocalName as u16, index, &params)
         .await?;
      codec::expect_len(&ret, 260, "local name response")?;
      Ok((
         codec::zero_terminated_str(&ret[..249]),
         codec::zero_terminated_str(&ret[249..260]),
      ))
   }

   /// Lists active connections of one controller.
   pub async fn get_connections(&self, index: u16) -> Result<ConnectionInfoList> {
      let ret = self
         .raw_command(CommandCode::GetConnections as u16, index, &[])
         .await?;
      ConnectionInfoList::parse(&ret)
   }

   /// Forces disconnection of a peer. Returns the address the kernel
   /// acted on.
   pub async fn disconnect(&self, index: u16, peer: ConnectionAddress) -> Result<ConnectionAddress> {
      let mut params = SmallVec::<[u8; 8]>::new();
      params.extend_from_slice(&peer.address.to_wire());
      params.push(peer.address_type.to_raw());
      let ret = self
         .raw_command(CommandCode::Disconnect as u16, index, &params)
         .await?;
      ConnectionAddress::parse(&ret)
   }

   async fn set_mode(
      &self,
      code: CommandCode,
      index: u16,
      params: &[u8],
   ) -> Result<ControllerSettings> {
      let ret = self.raw_command(code as u16, index, params).await?;
      ControllerSettings::parse(&ret)
   }
}

impl Drop for MgmtClient {
   fn drop(&mut self) {
      // The actor task is aborted with us and never reaches its own
      // close, so release any subscriber blocked in recv here.
      self.events.close();
   }
}

/// Feeds raw frames from the transport into the correlator. A transport
/// error is forwarded once, then the task ends.
async fn recv_loop<T: Transport>(transport: Arc<T>, tx: mpsc::Sender<io::Result<Packet>>) {
   loop {
      match transport.recv().await {
         Ok(frame) => {
            if tx.send(Ok(frame)).await.is_err() {
               return;
            }
         },
         Err(e) => {
            let _ = tx.send(Err(e)).await;
            return;
         },
      }
   }
}

struct ClientActor<T: Transport> {
   transport: Arc<T>,
   command_rx: mpsc::Receiver<ClientCommand>,
   frame_rx: mpsc::Receiver<io::Result<Packet>>,
   events: Arc<EventQueue>,
   pending: HashMap<(u16, u16), Pending>,
   config: ClientConfig,
}

impl<T: Transport> ClientActor<T> {
   async fn run(mut self) {
      info!("mgmt client starting up");

      let mut sweep = time::interval(self.config.sweep_interval());
      sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

      loop {
         select! {
             _ = sweep.tick() => {
                 self.sweep_expired();
             }
             frame = self.frame_rx.recv() => {
                 match frame {
                     Some(Ok(frame)) => self.on_frame(&frame),
                     Some(Err(e)) => {
                         self.fail_all(e.kind(), e.to_string());
                         break;
                     }
                     None => {
                         self.fail_all(io::ErrorKind::UnexpectedEof, "reader task gone".into());
                         break;
                     }
                 }
             }
             cmd = self.command_rx.recv() => {
                 let Some(cmd) = cmd else {
                     debug!("mgmt client handle dropped, shutting down");
                     break;
                 };
                 self.handle_command(cmd).await;
             }
         }
      }

      self.events.close();
   }

   async fn handle_command(&mut self, cmd: ClientCommand) {
      match cmd {
         ClientCommand::Submit {
            opcode,
            index,
            params,
            reply,
         } => {
            let key = (opcode, index);
            if self.pending.contains_key(&key) {
               let _ = reply.send(Err(MgmtError::CommandInFlight { opcode, index }));
               return;
            }

            let frame = encode_command(opcode, index, &params);
            debug!("→ {}", hex::encode(&frame));
            if let Err(e) = self.transport.send(&frame).await {
               let _ = reply.send(Err(MgmtError::Transport(e)));
               return;
            }

            self.pending.insert(
               key,
               Pending {
                  reply,
                  deadline: Instant::now() + self.config.command_timeout(),
                  status_acked: false,
               },
            );
         },
      }
   }

   fn on_frame(&mut self, frame: &[u8]) {
      debug!("← {}", hex::encode(frame));

      let envelope = match EventEnvelope::parse(frame) {
         Ok(envelope) => envelope,
         Err(e) => {
            warn!("Dropping malformed frame: {e}");
            return;
         },
      };

      // A recognized event code with a bad payload still gets forwarded
      // raw; only correlation is off the table for it.
      let event = match MgmtEvent::parse(&envelope) {
         Ok(event) => event,
         Err(e) => {
            warn!("Failed to decode event 0x{:04x}: {e}", envelope.code);
            MgmtEvent::Unknown {
               code: envelope.code,
               payload: envelope.payload.to_vec(),
            }
         },
      };

      match event {
         MgmtEvent::CommandComplete(cc) => self.on_command_complete(envelope.index, cc),
         MgmtEvent::CommandStatus(cs) => self.on_command_status(envelope.index, cs),
         other => self.events.push(UnsolicitedEvent {
            index: envelope.index,
            event: other,
         }),
      }
   }

   fn on_command_complete(&mut self, index: u16, cc: CommandCompleteEvent) {
      let key = (cc.opcode, index);
      let Some(pending) = self.pending.remove(&key) else {
         debug!(
            "Unmatched command complete for 0x{:04x} on controller {index}",
            cc.opcode
         );
         self.events.push(UnsolicitedEvent {
            index,
            event: MgmtEvent::CommandComplete(cc),
         });
         return;
      };

      let result = if cc.status == 0 {
         Ok(cc.return_params)
      } else {
         Err(MgmtError::CommandFailed {
            opcode: cc.opcode,
            status: cc.status,
         })
      };
      let _ = pending.reply.send(result);
   }

   fn on_command_status(&mut self, index: u16, cs: CommandStatusEvent) {
      let key = (cs.opcode, index);
      if cs.status != 0 {
         if let Some(pending) = self.pending.remove(&key) {
            let _ = pending.reply.send(Err(MgmtError::CommandFailed {
               opcode: cs.opcode,
               status: cs.status,
            }));
            return;
         }
      } else if let Some(pending) = self.pending.get_mut(&key) {
         // Intermediate ack; the completion event is still outstanding.
         pending.status_acked = true;
         return;
      }

      debug!(
         "Unmatched command status for 0x{:04x} on controller {index}",
         cs.opcode
      );
      self.events.push(UnsolicitedEvent {
         index,
         event: MgmtEvent::CommandStatus(cs),
      });
   }

   fn sweep_expired(&mut self) {
      let now = Instant::now();
      let stale: Vec<_> = self
         .pending
         .iter()
         .filter(|(_, p)| p.reply.is_closed() || now >= p.deadline)
         .map(|(key, _)| *key)
         .collect();

      for key in stale {
         let Some(pending) = self.pending.remove(&key) else {
            continue;
         };
         if pending.reply.is_closed() {
            debug!(
               "Command 0x{:04x} on controller {} cancelled by caller",
               key.0, key.1
            );
         } else {
            warn!(
               "Command 0x{:04x} on controller {} timed out{}",
               key.0,
               key.1,
               if pending.status_acked {
                  " after status ack"
               } else {
                  ""
               }
            );
            let _ = pending.reply.send(Err(MgmtError::CommandTimeout));
         }
      }
   }

   fn fail_all(&mut self, kind: io::ErrorKind, msg: String) {
      warn!("Transport failed ({msg}), failing {} pending commands", self.pending.len());
      for (_, pending) in self.pending.drain() {
         let _ = pending
            .reply
            .send(Err(MgmtError::Transport(io::Error::new(kind, msg.clone()))));
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::transport::{ChannelTransport, channel_pair};

   fn event_frame(code: u16, index: u16, payload: &[u8]) -> Vec<u8> {
      let mut out = Vec::with_capacity(6 + payload.len());
      out.extend_from_slice(&code.to_le_bytes());
      out.extend_from_slice(&index.to_le_bytes());
      out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
      out.extend_from_slice(payload);
      out
   }

   fn complete_frame(opcode: u16, index: u16, status: u8, ret: &[u8]) -> Vec<u8> {
      let mut payload = Vec::with_capacity(3 + ret.len());
      payload.extend_from_slice(&opcode.to_le_bytes());
      payload.push(status);
      payload.extend_from_slice(ret);
      event_frame(0x0001, index, &payload)
   }

   fn status_frame(opcode: u16, index: u16, status: u8) -> Vec<u8> {
      let mut payload = Vec::with_capacity(3);
      payload.extend_from_slice(&opcode.to_le_bytes());
      payload.push(status);
      event_frame(0x0002, index, &payload)
   }

   // RUST_LOG=debug surfaces the frame dumps when a test misbehaves.
   fn init_logging() {
      let _ = env_logger::builder().is_test(true).try_init();
   }

   fn quick_config() -> ClientConfig {
      init_logging();
      ClientConfig {
         command_timeout_ms: 200,
         sweep_interval_ms: 20,
         ..Default::default()
      }
   }

   async fn expect_command(kernel: &ChannelTransport, opcode: u16, index: u16) -> Vec<u8> {
      let frame = kernel.recv().await.unwrap();
      assert_eq!(u16::from_le_bytes([frame[0], frame[1]]), opcode);
      assert_eq!(u16::from_le_bytes([frame[2], frame[3]]), index);
      let len = u16::from_le_bytes([frame[4], frame[5]]) as usize;
      assert_eq!(frame.len(), 6 + len);
      frame[6..].to_vec()
   }

   #[tokio::test]
   async fn test_command_complete_resolves_caller() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      let kernel_task = tokio::spawn(async move {
         let params = expect_command(&kernel, 0x0001, INDEX_NONE).await;
         assert!(params.is_empty());
         kernel
            .send(&complete_frame(0x0001, INDEX_NONE, 0, &[0x01, 0x0e, 0x00]))
            .await
            .unwrap();
         kernel
      });

      let version = client.read_version_information().await.unwrap();
      assert_eq!(version.version, 1);
      assert_eq!(version.revision, 14);
      kernel_task.await.unwrap();
   }

   #[tokio::test]
   async fn test_nonzero_status_is_command_failed() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      tokio::spawn(async move {
         expect_command(&kernel, 0x0004, 5).await;
         kernel
            .send(&complete_frame(0x0004, 5, 0x11, &[]))
            .await
            .unwrap();
         // keep the kernel side alive until the assertion ran
         kernel.recv().await.ok();
      });

      let err = client.read_controller_information(5).await.unwrap_err();
      assert!(matches!(
         err,
         MgmtError::CommandFailed {
            opcode: 0x0004,
            status: 0x11,
         }
      ));
   }

   #[tokio::test]
   async fn test_status_ack_then_complete() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      tokio::spawn(async move {
         let params = expect_command(&kernel, 0x0005, 0).await;
         assert_eq!(params, vec![0x01]);
         kernel.send(&status_frame(0x0005, 0, 0)).await.unwrap();
         kernel
            .send(&complete_frame(0x0005, 0, 0, &0x0281u32.to_le_bytes()))
            .await
            .unwrap();
         kernel.recv().await.ok();
      });

      let settings = client.set_powered(0, true).await.unwrap();
      assert!(settings.powered && settings.br_edr && settings.low_energy);
   }

   #[tokio::test]
   async fn test_failing_status_resolves_early() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      tokio::spawn(async move {
         expect_command(&kernel, 0x0005, 0).await;
         kernel.send(&status_frame(0x0005, 0, 0x0F)).await.unwrap();
         kernel.recv().await.ok();
      });

      let err = client.set_powered(0, true).await.unwrap_err();
      assert!(matches!(
         err,
         MgmtError::CommandFailed {
            opcode: 0x0005,
            status: 0x0F,
         }
      ));
   }

   #[tokio::test]
   async fn test_unsolicited_event_forwarded_without_touching_pending() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());
      let events = client.events();

      tokio::spawn(async move {
         expect_command(&kernel, 0x0015, 0).await;
         // unsolicited events arrive before the completion
         kernel
            .send(&event_frame(0x0006, 0, &0x0201u32.to_le_bytes()))
            .await
            .unwrap();
         kernel.send(&event_frame(0x4242, 3, &[0xAB])).await.unwrap();
         kernel
            .send(&complete_frame(0x0015, 0, 0, &[0x00, 0x00]))
            .await
            .unwrap();
         kernel.recv().await.ok();
      });

      let connections = client.get_connections(0).await.unwrap();
      assert!(connections.connections.is_empty());

      let first = events.recv().await.unwrap();
      assert_eq!(first.index, 0);
      let MgmtEvent::NewSettings(settings) = first.event else {
         panic!("expected NewSettings");
      };
      assert!(settings.powered && settings.low_energy);

      let second = events.recv().await.unwrap();
      assert_eq!(second.index, 3);
      assert_eq!(
         second.event,
         MgmtEvent::Unknown {
            code: 0x4242,
            payload: vec![0xAB],
         }
      );
   }

   #[tokio::test]
   async fn test_duplicate_pair_rejected_while_outstanding() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      let kernel_task = tokio::spawn(async move {
         expect_command(&kernel, 0x0003, INDEX_NONE).await;
         kernel
            .send(&complete_frame(0x0003, INDEX_NONE, 0, &[0x00, 0x00]))
            .await
            .unwrap();
         kernel
      });

      let (first, second) = tokio::join!(
         client.raw_command(0x0003, INDEX_NONE, &[]),
         client.raw_command(0x0003, INDEX_NONE, &[]),
      );

      assert_eq!(first.unwrap(), vec![0x00, 0x00]);
      assert!(matches!(
         second.unwrap_err(),
         MgmtError::CommandInFlight {
            opcode: 0x0003,
            index: INDEX_NONE,
         }
      ));
      kernel_task.await.unwrap();
   }

   #[tokio::test]
   async fn test_distinct_controllers_run_concurrently() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      let kernel_task = tokio::spawn(async move {
         expect_command(&kernel, 0x0015, 0).await;
         expect_command(&kernel, 0x0015, 1).await;
         // answer in reverse order of submission
         kernel
            .send(&complete_frame(
               0x0015,
               1,
               0,
               &[
                  0x01, 0x00, // one connection
                  0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x00, 0x00,
               ],
            ))
            .await
            .unwrap();
         kernel
            .send(&complete_frame(0x0015, 0, 0, &[0x00, 0x00]))
            .await
            .unwrap();
         kernel
      });

      let (zero, one) = tokio::join!(client.get_connections(0), client.get_connections(1));
      assert!(zero.unwrap().connections.is_empty());
      let one = one.unwrap();
      assert_eq!(one.connections.len(), 1);
      assert_eq!(
         one.connections[0].address.to_string(),
         "06:05:04:03:02:01"
      );
      kernel_task.await.unwrap();
   }

   #[tokio::test]
   async fn test_unanswered_command_times_out() {
      init_logging();
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(
         ours,
         ClientConfig {
            command_timeout_ms: 50,
            sweep_interval_ms: 10,
            ..Default::default()
         },
      );

      tokio::spawn(async move {
         expect_command(&kernel, 0x0004, 0).await;
         // never answer
         kernel.recv().await.ok();
      });

      let err = client.read_controller_information(0).await.unwrap_err();
      assert!(matches!(err, MgmtError::CommandTimeout));
   }

   #[tokio::test]
   async fn test_transport_death_fails_pending_commands() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      tokio::spawn(async move {
         expect_command(&kernel, 0x0004, 0).await;
         drop(kernel);
      });

      let err = client.read_controller_information(0).await.unwrap_err();
      assert!(matches!(err, MgmtError::Transport(_)));
   }

   #[tokio::test]
   async fn test_set_local_name_roundtrip() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      let kernel_task = tokio::spawn(async move {
         let params = expect_command(&kernel, 0x000F, 0).await;
         assert_eq!(params.len(), 260);
         assert_eq!(&params[..4], b"Pwn\0");
         assert_eq!(&params[249..252], b"Pw\0");
         kernel
            .send(&complete_frame(0x000F, 0, 0, &params))
            .await
            .unwrap();
         kernel
      });

      let (name, short) = client.set_local_name(0, "Pwn", Some("Pw")).await.unwrap();
      assert_eq!(name, "Pwn");
      assert_eq!(short, "Pw");
      kernel_task.await.unwrap();
   }

   #[tokio::test]
   async fn test_set_local_name_length_limits() {
      let (ours, _kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());

      let long = "x".repeat(249);
      assert!(matches!(
         client.set_local_name(0, &long, None).await.unwrap_err(),
         MgmtError::NameTooLong { max: 248, .. }
      ));
      assert!(matches!(
         client
            .set_local_name(0, "ok", Some("elevenchars"))
            .await
            .unwrap_err(),
         MgmtError::NameTooLong { max: 10, .. }
      ));
   }

   #[tokio::test]
   async fn test_unmatched_complete_is_forwarded() {
      let (ours, kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());
      let events = client.events();

      kernel
         .send(&complete_frame(0x0042, 0, 0, &[0x01]))
         .await
         .unwrap();

      let forwarded = events.recv().await.unwrap();
      let MgmtEvent::CommandComplete(cc) = forwarded.event else {
         panic!("expected forwarded CommandComplete");
      };
      assert_eq!(cc.opcode, 0x0042);
      assert_eq!(cc.return_params, vec![0x01]);
      drop(client);
   }

   #[tokio::test]
   async fn test_events_recv_ends_after_client_drop() {
      let (ours, _kernel) = channel_pair(16);
      let client = MgmtClient::new(ours, quick_config());
      let events = client.events();
      let extra = client.events();

      drop(client);
      assert_eq!(events.recv().await, None);
      drop(extra);
   }
}
