//! # Push Producers
//!
//! A [`Producer`] pushes chunks into a [`Sink`] on its own schedule. The push
//! driver owns the receiving end and applies backpressure through
//! [`FlowControl`]:
//!
//! - the producer starts paused and is resumed once the reducer asks for a pair
//! - handing a chunk to [`Sink::data`] pauses the producer on the spot
//! - the driver resumes it only after the reducer has processed that chunk and
//!   asked for another
//! - once the reduction is over the sink closes and [`Sink::ready`] returns
//!   `false`; the producer is expected to stop there
//!
//! ## Events
//!
//! Every producer ends with exactly one of [`Sink::end`] or [`Sink::error`].
//! A producer that drops its sink without either makes the reduction fail with
//! [`ReduceError::Disconnected`](crate::error::ReduceError::Disconnected).
//!
//! ## Built-in Producers
//!
//! - **[`IterProducer`]**: pushes an in-memory sequence one chunk at a time
//! - **[`StreamProducer`]**: adapts any `futures::Stream` of chunks
//! - **[`ReaderProducer`]**: pushes byte chunks read from an `AsyncRead`
//!
//! Closures taking a [`Sink`] are producers too:
//!
//! ```rust
//! use reduce_any::producers::Sink;
//! use reduce_any::source::Source;
//! use reduce_any::value::value;
//!
//! let source = Source::stream(|sink: Sink| {
//!   tokio::spawn(async move {
//!     for word in ["one", "two"] {
//!       if !sink.ready().await || !sink.data(value(word)) {
//!         return;
//!       }
//!     }
//!     sink.end();
//!   });
//! });
//! ```

use crate::error::Fault;
use crate::value::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Iterator-backed producer.
pub mod iter_producer;
/// Byte chunks from an async reader.
pub mod reader_producer;
/// Adapter over `futures::Stream`.
pub mod stream_producer;

pub use iter_producer::IterProducer;
pub use reader_producer::ReaderProducer;
pub use stream_producer::StreamProducer;

/// A push-based source of chunks.
pub trait Producer: Send + 'static {
  /// Starts pushing into `sink`.
  ///
  /// Called once, from inside the runtime driving the reduction; long-running
  /// producers spawn a task and return.
  fn subscribe(self: Box<Self>, sink: Sink);
}

impl<F> Producer for F
where
  F: FnOnce(Sink) + Send + 'static,
{
  fn subscribe(self: Box<Self>, sink: Sink) {
    (*self)(sink)
  }
}

/// What a producer reports.
#[derive(Clone, Debug)]
pub enum Event {
  /// A chunk of data.
  Data(Value),
  /// The producer failed.
  Error(Fault),
  /// No more chunks will follow.
  End,
}

/// Shared pause/resume switch between a producer and the push driver.
#[derive(Clone, Debug)]
pub struct FlowControl {
  paused: Arc<watch::Sender<bool>>,
}

impl FlowControl {
  /// Creates a switch in the given state.
  pub fn new(paused: bool) -> Self {
    let (paused, _) = watch::channel(paused);
    Self {
      paused: Arc::new(paused),
    }
  }

  /// Asks the producer to stop pushing.
  pub fn pause(&self) {
    self.paused.send_replace(true);
  }

  /// Lets the producer push again.
  pub fn resume(&self) {
    self.paused.send_replace(false);
  }

  /// Current state of the switch.
  pub fn is_paused(&self) -> bool {
    *self.paused.borrow()
  }

  /// Observes state changes.
  pub fn watch(&self) -> watch::Receiver<bool> {
    self.paused.subscribe()
  }
}

/// The producer's end of a push subscription.
#[derive(Clone, Debug)]
pub struct Sink {
  events: mpsc::UnboundedSender<Event>,
  flow: FlowControl,
}

impl Sink {
  pub(crate) fn new(events: mpsc::UnboundedSender<Event>, flow: FlowControl) -> Self {
    Self { events, flow }
  }

  /// Waits until the driver accepts data.
  ///
  /// Returns `false` once the driver is gone, after which nothing more will be
  /// consumed.
  pub async fn ready(&self) -> bool {
    let mut paused = self.flow.watch();
    tokio::select! {
      resumed = paused.wait_for(|paused| !*paused) => resumed.is_ok() && !self.events.is_closed(),
      _ = self.events.closed() => false,
    }
  }

  /// Pushes a chunk, pausing the producer as it is handed over.
  ///
  /// Returns `false` if the driver is gone and the chunk was dropped.
  pub fn data(&self, chunk: Value) -> bool {
    self.flow.pause();
    self.events.send(Event::Data(chunk)).is_ok()
  }

  /// Reports a failure.
  pub fn error(&self, fault: Fault) -> bool {
    self.events.send(Event::Error(fault)).is_ok()
  }

  /// Signals end-of-source.
  pub fn end(&self) -> bool {
    self.events.send(Event::End).is_ok()
  }

  /// True while the driver holds the producer back.
  pub fn is_paused(&self) -> bool {
    self.flow.is_paused()
  }

  /// True once the driver stopped listening.
  pub fn is_closed(&self) -> bool {
    self.events.is_closed()
  }

  /// The flow switch this sink honors.
  pub fn flow(&self) -> &FlowControl {
    &self.flow
  }
}
