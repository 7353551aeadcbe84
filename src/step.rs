//! # Step Protocol
//!
//! [`step`] resumes a reducer once and keeps going until the reducer either
//! terminates or asks for a pair:
//!
//! - **Terminated** → [`Outcome::Done`]
//! - **Yielded the reduction's `Next`** → [`Outcome::NeedsPair`]
//! - **Yielded a deferred value** → waits for it and resumes with its
//!   resolution, or injects its rejection as a fault; the step turns pending
//! - **Yielded anything else** → resumes at once with that same value
//!
//! The reducer is moved into the step and handed back with the outcome, so a
//! suspension point can never be resumed twice or by two steps at once.

use crate::deferred::{Deferred, Eventual};
use crate::error::Fault;
use crate::reducer::{Reducer, Resume, State};
use crate::value::{Next, Value, describe};
use tracing::trace;

/// What a completed step asks of its driver.
#[derive(Clone)]
pub enum Outcome {
  /// The reducer terminated with this result.
  Done(Value),
  /// The reducer wants the next pair, or to learn that there is none.
  NeedsPair,
}

impl std::fmt::Debug for Outcome {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Outcome::Done(result) => write!(f, "Done({})", describe(result)),
      Outcome::NeedsPair => write!(f, "NeedsPair"),
    }
  }
}

/// The reducer, handed back to the driver, with how its step ended.
///
/// `Err` is a fault the reducer raised and did not handle.
pub type Stepped = (Box<dyn Reducer>, Result<Outcome, Fault>);

/// Runs one logical step of `reducer`.
///
/// Completes synchronously unless the reducer waits on a deferred value along
/// the way.
pub fn step(mut reducer: Box<dyn Reducer>, next: Next, mut resume: Resume) -> Eventual<Stepped> {
  loop {
    let yielded = match resume.apply(reducer.as_mut()) {
      Err(fault) => {
        trace!("step(raised={:?})", fault);
        return Eventual::Ready((reducer, Err(fault)));
      }
      Ok(State::Terminated(result)) => {
        trace!("step(terminated={})", describe(&result));
        return Eventual::Ready((reducer, Ok(Outcome::Done(result))));
      }
      Ok(State::Suspended(yielded)) => yielded,
    };

    if next.is(&yielded) {
      trace!("step(needs_pair)");
      return Eventual::Ready((reducer, Ok(Outcome::NeedsPair)));
    }

    if let Some(deferred) = Deferred::probe(&yielded) {
      trace!("step(awaiting={:?})", deferred);
      return Eventual::Pending(Box::pin(async move {
        let resume = match deferred.await {
          Ok(resolved) => Resume::Value(Some(resolved)),
          Err(fault) => Resume::Failure(fault),
        };
        step(reducer, next, resume).settle().await
      }));
    }

    trace!("step(pass_through={})", describe(&yielded));
    resume = Resume::Value(Some(yielded));
  }
}
