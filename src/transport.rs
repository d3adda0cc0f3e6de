//! Frame transport boundary.
//!
//! The mgmt client is transport-agnostic: anything that can move one
//! whole frame at a time in each direction works. On a real system that
//! is the privileged `HCI_CHANNEL_CONTROL` socket; in tests it is the
//! in-memory [`channel_pair`] below.

use std::io;

use smallvec::SmallVec;
use tokio::sync::{Mutex, mpsc};

/// One wire frame, command or event.
pub type Packet = SmallVec<[u8; 32]>;

/// A bidirectional, frame-oriented byte pipe.
///
/// `recv` must yield exactly one frame per call and may suspend
/// indefinitely. Both methods take `&self` so a single transport can be
/// shared between the client's read and write paths.
pub trait Transport: Send + Sync + 'static {
   fn send(&self, frame: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
   fn recv(&self) -> impl Future<Output = io::Result<Packet>> + Send;
}

/// In-memory transport backed by a pair of channels.
///
/// Closing either end surfaces as an I/O error on the peer, mirroring a
/// dead socket.
#[derive(Debug)]
pub struct ChannelTransport {
   tx: mpsc::Sender<Packet>,
   rx: Mutex<mpsc::Receiver<Packet>>,
}

/// Creates two connected [`ChannelTransport`] halves.
pub fn channel_pair(depth: usize) -> (ChannelTransport, ChannelTransport) {
   let (a_tx, a_rx) = mpsc::channel(depth);
   let (b_tx, b_rx) = mpsc::channel(depth);
   (
      ChannelTransport {
         tx: a_tx,
         rx: Mutex::new(b_rx),
      },
      ChannelTransport {
         tx: b_tx,
         rx: Mutex::new(a_rx),
      },
   )
}

impl Transport for ChannelTransport {
   async fn send(&self, frame: &[u8]) -> io::Result<()> {
      self
         .tx
         .send(Packet::from_slice(frame))
         .await
         .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer closed"))
   }

   async fn recv(&self) -> io::Result<Packet> {
      self
         .rx
         .lock()
         .await
         .recv()
         .await
         .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed"))
   }
}
