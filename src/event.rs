//! Unsolicited event delivery.
//!
//! Events that do not resolve a pending command are pushed onto a
//! lock-free queue and drained by whoever holds the queue handle. The
//! push side never blocks, so a slow consumer can only cost itself
//! events, never stall command correlation.

use std::{
   sync::{
      Arc,
      atomic::{AtomicBool, Ordering},
   },
   time::Duration,
};

use crossbeam::queue::SegQueue;
use log::warn;
use tokio::{sync::Notify, time};

use crate::mgmt::event::MgmtEvent;

/// An event the kernel sent on its own, tagged with the controller it
/// concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsolicitedEvent {
   pub index: u16,
   pub event: MgmtEvent,
}

/// Bounded fire-and-forget queue between the read loop and subscribers.
///
/// When the queue exceeds its depth the oldest entries are discarded;
/// losing a stale notification beats blocking the read loop.
#[derive(Debug)]
pub struct EventQueue {
   queue: SegQueue<UnsolicitedEvent>,
   notifier: Notify,
   depth: usize,
   closed: AtomicBool,
}

impl EventQueue {
   pub fn new(depth: usize) -> Arc<Self> {
      Arc::new(Self {
         queue: SegQueue::new(),
         notifier: Notify::new(),
         depth,
         closed: AtomicBool::new(false),
      })
   }

   /// Enqueues an event without blocking.
   pub fn push(&self, event: UnsolicitedEvent) {
      self.queue.push(event);
      while self.queue.len() > self.depth {
         if let Some(dropped) = self.queue.pop() {
            warn!("Unsolicited event queue full, dropping {:?}", dropped.event);
         }
      }
      self.notifier.notify_waiters();
   }

   /// Marks the queue closed. Events already enqueued stay readable;
   /// `recv` returns `None` once they drain.
   pub fn close(&self) {
      self.closed.store(true, Ordering::Release);
      self.notifier.notify_waiters();
   }

   /// Receives the next unsolicited event.
   ///
   /// Returns `None` once the queue is closed (or every other handle is
   /// gone) and the backlog has drained.
   pub async fn recv(self: &Arc<Self>) -> Option<UnsolicitedEvent> {
      loop {
         if let Some(event) = self.queue.pop() {
            return Some(event);
         }
         let notify = self.notifier.notified();
         if let Some(event) = self.queue.pop() {
            return Some(event);
         }
         // The strong-count check only works when this is the sole
         // remaining handle; the closed flag covers consumers holding
         // several clones.
         if self.closed.load(Ordering::Acquire) || Arc::strong_count(self) == 1 {
            return None;
         }
         let _ = time::timeout(Duration::from_secs(1), notify).await;
      }
   }

   pub fn len(&self) -> usize {
      self.queue.len()
   }

   pub fn is_empty(&self) -> bool {
      self.queue.is_empty()
   }
}
