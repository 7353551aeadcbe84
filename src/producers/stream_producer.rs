//! Producer adapting a `futures::Stream` of chunks.
//!
//! The stream is only polled while the driver accepts data, so a lazy stream
//! (a file, a socket, a channel) is read no further than the reducer asks for.
//! An `Err` item is reported as the producer's error and ends the stream.

use crate::config::ProducerConfig;
use crate::error::Fault;
use crate::producers::{Producer, Sink};
use crate::value::Value;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tracing::trace;

/// Pushes the items of a stream.
pub struct StreamProducer {
  stream: BoxStream<'static, Result<Value, Fault>>,
  config: ProducerConfig,
}

impl StreamProducer {
  /// Wraps a stream of chunks.
  pub fn new<S>(stream: S) -> Self
  where
    S: Stream<Item = Result<Value, Fault>> + Send + 'static,
  {
    Self {
      stream: stream.boxed(),
      config: ProducerConfig::default(),
    }
  }

  /// Sets the name for this producer.
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.config = self.config.with_name(name);
    self
  }

  /// Replaces the whole configuration.
  pub fn with_config(mut self, config: ProducerConfig) -> Self {
    self.config = config;
    self
  }
}

impl Producer for StreamProducer {
  fn subscribe(self: Box<Self>, sink: Sink) {
    let StreamProducer { mut stream, config } = *self;
    let name = config.name_or("stream_producer");
    tokio::spawn(async move {
      loop {
        if !sink.ready().await {
          trace!("StreamProducer::subscribe(name={}, abandoned)", name);
          return;
        }
        match stream.next().await {
          Some(Ok(chunk)) => {
            if !sink.data(chunk) {
              return;
            }
          }
          Some(Err(fault)) => {
            trace!("StreamProducer::subscribe(name={}, error={})", name, fault);
            sink.error(fault);
            return;
          }
          None => {
            trace!("StreamProducer::subscribe(name={}, ended)", name);
            sink.end();
            return;
          }
        }
      }
    });
  }
}
