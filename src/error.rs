//! # Error Handling
//!
//! Two layers of failure exist in a reduction:
//!
//! - **[`Fault`]**: an arbitrary thrown payload. Reducers raise faults, deferred
//!   values reject with faults and faults are injected back into reducers at
//!   their suspension points. Faults keep their identity, so the object a
//!   reducer throws is the very object the caller receives.
//! - **[`ReduceError`]**: what a reduction as a whole fails with. It tells apart
//!   shape mismatches, reducer failures, producer failures and producers that
//!   vanished without signalling their end.
//!
//! No failure is retried or swallowed; every one surfaces to the caller either
//! synchronously or as the rejection of the deferred result.

use crate::value::{Value, describe, value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// An opaque failure payload raised by a reducer, a deferred value or a producer.
#[derive(Clone)]
pub struct Fault(Value);

impl Fault {
  /// Wraps any payload.
  pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
    Self(value(payload))
  }

  /// Wraps an existing value without re-boxing it, preserving its identity.
  pub fn from_value(payload: Value) -> Self {
    Self(payload)
  }

  /// Creates a fault carrying a message.
  pub fn msg(message: impl Into<String>) -> Self {
    Self::new(message.into())
  }

  /// The thrown payload.
  pub fn payload(&self) -> &Value {
    &self.0
  }

  /// Downcasts the payload.
  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.0.downcast_ref::<T>()
  }

  /// Returns true if both faults carry the very same payload.
  pub fn is(&self, other: &Fault) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for Fault {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Fault({})", describe(&self.0))
  }
}

impl fmt::Display for Fault {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(message) = self.downcast_ref::<String>() {
      f.write_str(message)
    } else if let Some(io) = self.downcast_ref::<std::io::Error>() {
      write!(f, "{}", io)
    } else {
      f.write_str(&describe(&self.0))
    }
  }
}

impl std::error::Error for Fault {}

impl From<std::io::Error> for Fault {
  fn from(error: std::io::Error) -> Self {
    Fault::new(error)
  }
}

/// Error type for a whole reduction.
#[derive(Error, Debug, Clone)]
pub enum ReduceError {
  /// The source is neither an enumerable shape nor a stream.
  #[error("object cannot be enumerated: {0}")]
  NotEnumerable(String),
  /// The reducer raised a fault it did not handle, either its own or one
  /// injected from a rejected deferred value.
  #[error("reducer failed: {0}")]
  Reducer(Fault),
  /// The push producer reported an error.
  #[error("source failed: {0}")]
  Source(Fault),
  /// The push producer went away without signalling end-of-source.
  #[error("producer disconnected before end of source")]
  Disconnected,
  /// The reducer kept asking for pairs after the source was exhausted.
  #[error("reducer did not return after the source was exhausted")]
  Unterminated,
}

impl ReduceError {
  /// The fault behind this error, if any.
  pub fn fault(&self) -> Option<&Fault> {
    match self {
      ReduceError::Reducer(fault) | ReduceError::Source(fault) => Some(fault),
      ReduceError::NotEnumerable(_) => None,
      ReduceError::Disconnected | ReduceError::Unterminated => None,
    }
  }
}
