//! # Reducer Protocol
//!
//! A reducer is a suspendable computation modelled as an explicit state
//! machine. The engine starts it, then resumes it either with a value or with
//! an injected [`Fault`]; after each resumption the reducer reports whether it
//! suspended (yielding a value) or terminated (with its result).
//!
//! What a reducer yields decides how it is resumed:
//!
//! - the reduction's [`Next`](crate::value::Next) marker: resumed with the next
//!   [`Pair`](crate::value::Pair), or with `None` once the source is exhausted
//! - a [`Deferred`](crate::deferred::Deferred): resumed with its resolution,
//!   or with its rejection injected as a fault
//! - anything else: resumed right away with that same value
//!
//! Reducers written as async blocks can use
//! [`Coroutine`](crate::coroutine::Coroutine) instead of implementing the trait
//! by hand.

use crate::error::Fault;
use crate::value::Value;
use std::fmt;

/// Where a reducer stands after a resumption.
#[derive(Clone)]
pub enum State {
  /// Paused, carrying the yielded value.
  Suspended(Value),
  /// Finished, carrying the terminal result.
  Terminated(Value),
}

impl fmt::Debug for State {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      State::Suspended(v) => write!(f, "Suspended({})", crate::value::describe(v)),
      State::Terminated(v) => write!(f, "Terminated({})", crate::value::describe(v)),
    }
  }
}

/// A suspendable computation driven by the engine.
///
/// An `Err` from any method is a fault raised by the computation itself; the
/// computation is finished afterwards.
pub trait Reducer: Send {
  /// Runs the computation up to its first suspension.
  fn start(&mut self) -> Result<State, Fault> {
    self.resume_with_value(None)
  }

  /// Resumes the computation at its current suspension with `input`.
  ///
  /// `None` means "no value", which is how source exhaustion is signalled.
  fn resume_with_value(&mut self, input: Option<Value>) -> Result<State, Fault>;

  /// Raises `fault` at the current suspension point.
  fn resume_with_failure(&mut self, fault: Fault) -> Result<State, Fault>;
}

impl<R: Reducer + ?Sized> Reducer for Box<R> {
  fn start(&mut self) -> Result<State, Fault> {
    (**self).start()
  }

  fn resume_with_value(&mut self, input: Option<Value>) -> Result<State, Fault> {
    (**self).resume_with_value(input)
  }

  fn resume_with_failure(&mut self, fault: Fault) -> Result<State, Fault> {
    (**self).resume_with_failure(fault)
  }
}

/// How the engine resumes a reducer on its next step.
#[derive(Clone, Debug)]
pub enum Resume {
  /// First resumption of a fresh reducer.
  Start,
  /// Deliver a value, or `None` for "no value".
  Value(Option<Value>),
  /// Raise a fault at the suspension point.
  Failure(Fault),
}

impl Resume {
  pub(crate) fn apply(self, reducer: &mut dyn Reducer) -> Result<State, Fault> {
    match self {
      Resume::Start => reducer.start(),
      Resume::Value(input) => reducer.resume_with_value(input),
      Resume::Failure(fault) => reducer.resume_with_failure(fault),
    }
  }
}
