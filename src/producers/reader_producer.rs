//! Producer reading byte chunks from any `tokio::io::AsyncRead`.
//!
//! Chunks are [`bytes::Bytes`] of at most
//! [`ProducerConfig::chunk_size`](crate::config::ProducerConfig) bytes; I/O
//! errors become the producer's error.

use crate::config::ProducerConfig;
use crate::error::Fault;
use crate::producers::{Producer, Sink, StreamProducer};
use crate::value::value;
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Pushes what an async reader yields.
///
/// # Example
///
/// ```rust
/// use reduce_any::producers::ReaderProducer;
/// use reduce_any::source::Source;
///
/// let source = Source::stream(ReaderProducer::new(&b"hello world"[..]).with_chunk_size(5));
/// ```
pub struct ReaderProducer<R> {
  reader: R,
  config: ProducerConfig,
}

impl<R> ReaderProducer<R>
where
  R: AsyncRead + Send + 'static,
{
  /// Wraps a reader.
  pub fn new(reader: R) -> Self {
    Self {
      reader,
      config: ProducerConfig::default(),
    }
  }

  /// Sets the name for this producer.
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.config = self.config.with_name(name);
    self
  }

  /// Sets the maximum chunk size in bytes.
  pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
    self.config = self.config.with_chunk_size(chunk_size);
    self
  }
}

impl<R> Producer for ReaderProducer<R>
where
  R: AsyncRead + Send + 'static,
{
  fn subscribe(self: Box<Self>, sink: Sink) {
    let ReaderProducer { reader, config } = *self;
    let chunks = ReaderStream::with_capacity(reader, config.chunk_size)
      .map(|chunk| chunk.map(value).map_err(Fault::from));
    let config = ProducerConfig {
      name: Some(config.name_or("reader_producer")),
      ..config
    };
    Box::new(StreamProducer::new(chunks).with_config(config)).subscribe(sink);
  }
}
