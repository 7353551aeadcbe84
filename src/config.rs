//! Configuration for reductions and built-in producers.
//!
//! Both follow the same builder pattern: start from `Default`, chain `with_*`
//! calls, read back through accessors.

/// Default chunk size, in bytes, for [`ReaderProducer`](crate::producers::ReaderProducer).
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Configuration for a single reduction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceConfig {
  /// Optional name identifying the reduction in logs.
  pub name: Option<String>,
}

impl ReduceConfig {
  /// Sets the name for this reduction.
  ///
  /// # Arguments
  ///
  /// * `name` - The name to show in the reduction's tracing span.
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Returns the configured name, or `"reduce_any"`.
  pub fn name(&self) -> String {
    self
      .name
      .clone()
      .unwrap_or_else(|| "reduce_any".to_string())
  }
}

/// Configuration for a built-in producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
  /// Optional name for identifying this producer in logs.
  pub name: Option<String>,
  /// Read buffer size for byte producers.
  pub chunk_size: usize,
}

impl Default for ProducerConfig {
  fn default() -> Self {
    Self {
      name: None,
      chunk_size: DEFAULT_CHUNK_SIZE,
    }
  }
}

impl ProducerConfig {
  /// Sets the name for this producer configuration.
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Sets the read buffer size. Zero is bumped to one byte.
  pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
    self.chunk_size = chunk_size.max(1);
    self
  }

  /// Returns the configured name, or `fallback`.
  pub fn name_or(&self, fallback: &str) -> String {
    self.name.clone().unwrap_or_else(|| fallback.to_string())
  }
}
