//! Producer that pushes an in-memory sequence one chunk at a time.
//!
//! This is the push counterpart of a positional source: the same elements,
//! but delivered through the stream driver with full pause/resume handling.
//! Handy for tests and for feeding pre-computed data to stream-oriented code.

use crate::config::ProducerConfig;
use crate::producers::{Producer, Sink};
use crate::value::{Value, value};
use std::any::Any;
use tracing::trace;

/// Pushes the items of an iterator, then ends.
///
/// # Example
///
/// ```rust
/// use reduce_any::producers::IterProducer;
/// use reduce_any::source::Source;
///
/// let source = Source::stream(IterProducer::new(vec!["one", "two", "three"]).with_name("words"));
/// ```
pub struct IterProducer {
  items: Box<dyn Iterator<Item = Value> + Send>,
  config: ProducerConfig,
}

impl IterProducer {
  /// Creates a producer over `items`.
  pub fn new<T, I>(items: I) -> Self
  where
    T: Any + Send + Sync,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
  {
    Self {
      items: Box::new(items.into_iter().map(value)),
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

  /// The producer's configuration.
  pub fn config(&self) -> &ProducerConfig {
    &self.config
  }
}

impl Producer for IterProducer {
  fn subscribe(self: Box<Self>, sink: Sink) {
    let IterProducer { items, config } = *self;
    let name = config.name_or("iter_producer");
    tokio::spawn(async move {
      let mut pushed = 0usize;
      for item in items {
        if !sink.ready().await || !sink.data(item) {
          trace!("IterProducer::subscribe(name={}, abandoned_after={})", name, pushed);
          return;
        }
        pushed += 1;
      }
      trace!("IterProducer::subscribe(name={}, ended_after={})", name, pushed);
      sink.end();
    });
  }
}
